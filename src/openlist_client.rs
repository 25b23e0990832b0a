use std::time::Duration;

use log::info;
use reqwest::blocking::Client;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::rename_engine::{Authenticator, BatchRenamer, DirectoryLister, FsEntry, RenameMapping};

const LOGIN_TIMEOUT: Duration = Duration::from_secs(30);
const LIST_TIMEOUT: Duration = Duration::from_secs(30);
const RENAME_TIMEOUT: Duration = Duration::from_secs(60);

/// How the JWT is sent in the `Authorization` header. OpenList deployments
/// differ: some expect the raw token, some a `Bearer ` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthScheme {
    #[default]
    Raw,
    Bearer,
}

/// Blocking client for the OpenList REST API, holding the JWT obtained at
/// login. Implements the Authenticator, DirectoryLister and BatchRenamer
/// collaborator contracts.
pub struct OpenListClient {
    http: Client,
    base_url: String,
    username: String,
    password: String,
    auth_scheme: AuthScheme,
    token: Option<String>,
}

// Envelope every OpenList endpoint wraps its payload in; `code` is the
// application-level status, 200 meaning success.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    code: i32,
    #[serde(default)]
    message: String,
    data: Option<T>,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginData {
    token: String,
}

#[derive(Debug, Serialize)]
struct FsListRequest<'a> {
    path: &'a str,
}

#[derive(Debug, Deserialize)]
struct FsListData {
    #[serde(default)]
    content: Option<Vec<FsEntry>>,
}

#[derive(Debug, Serialize)]
struct RenameObject<'a> {
    src_name: &'a str,
    new_name: &'a str,
}

#[derive(Debug, Serialize)]
struct BatchRenameRequest<'a> {
    src_dir: &'a str,
    rename_objects: Vec<RenameObject<'a>>,
}

// Acknowledged with the bare envelope, no payload.
#[derive(Debug, Deserialize)]
struct Empty {}

impl OpenListClient {
    pub fn new(base_url: &str, username: &str, password: &str, auth_scheme: AuthScheme) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: password.to_string(),
            auth_scheme,
            token: None,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn auth_header(&self) -> Result<String> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| Error::Auth("not logged in".to_string()))?;
        Ok(match self.auth_scheme {
            AuthScheme::Raw => token.to_string(),
            AuthScheme::Bearer => format!("Bearer {token}"),
        })
    }

    /// Obtain a JWT from `/api/auth/login` and keep it for later requests.
    pub fn login(&mut self) -> Result<()> {
        let request = LoginRequest {
            username: &self.username,
            password: &self.password,
        };
        let response = self
            .http
            .post(self.url("/api/auth/login"))
            .timeout(LOGIN_TIMEOUT)
            .json(&request)
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|err| Error::Auth(err.to_string()))?;
        let body: ApiResponse<LoginData> = response
            .json()
            .map_err(|err| Error::Auth(err.to_string()))?;
        if body.code != 200 {
            return Err(Error::Auth(body.message));
        }
        let data = body
            .data
            .ok_or_else(|| Error::Auth("login response carried no token".to_string()))?;
        self.token = Some(data.token);
        info!("logged in to {} as {}", self.base_url, self.username);
        Ok(())
    }

    /// Fetch the contents of a remote directory via `/api/fs/list`.
    pub fn list(&self, path: &str) -> Result<Vec<FsEntry>> {
        let authorization = self.auth_header()?;
        let response = self
            .http
            .post(self.url("/api/fs/list"))
            .timeout(LIST_TIMEOUT)
            .header(AUTHORIZATION, authorization)
            .json(&FsListRequest { path })
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|err| Error::List(err.to_string()))?;
        let body: ApiResponse<FsListData> = response
            .json()
            .map_err(|err| Error::List(err.to_string()))?;
        if body.code != 200 {
            return Err(Error::List(body.message));
        }
        Ok(body.data.and_then(|data| data.content).unwrap_or_default())
    }

    /// Submit one atomic batch of renames via `/api/fs/batch_rename`.
    pub fn batch_rename(&self, src_dir: &str, mapping: &RenameMapping) -> Result<()> {
        let authorization = self.auth_header()?;
        let request = BatchRenameRequest {
            src_dir,
            rename_objects: mapping
                .iter()
                .map(|(src_name, new_name)| RenameObject { src_name, new_name })
                .collect(),
        };
        let response = self
            .http
            .post(self.url("/api/fs/batch_rename"))
            .timeout(RENAME_TIMEOUT)
            .header(AUTHORIZATION, authorization)
            .json(&request)
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|err| Error::Rename(err.to_string()))?;
        let body: ApiResponse<Empty> = response
            .json()
            .map_err(|err| Error::Rename(err.to_string()))?;
        if body.code != 200 {
            return Err(Error::Rename(body.message));
        }
        info!("batch rename processed {} files", request.rename_objects.len());
        Ok(())
    }
}

impl Authenticator for OpenListClient {
    fn login(&mut self) -> Result<()> {
        OpenListClient::login(self)
    }
}

impl DirectoryLister for OpenListClient {
    fn list(&self, path: &str) -> Result<Vec<FsEntry>> {
        OpenListClient::list(self, path)
    }
}

impl BatchRenamer for OpenListClient {
    fn rename_batch(&self, src_dir: &str, mapping: &RenameMapping) -> Result<()> {
        OpenListClient::batch_rename(self, src_dir, mapping)
    }
}
