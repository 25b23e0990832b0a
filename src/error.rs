#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Credentials rejected, or the login request itself failed.
    #[error("login failed: {0}")]
    Auth(String),

    #[error("directory listing failed: {0}")]
    List(String),

    /// Template substitution failed; callers degrade to the raw title.
    #[error("template formatting failed: {0}")]
    Format(String),

    #[error("batch rename failed: {0}")]
    Rename(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
