use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};

use openlist_rename::openlist_client::{AuthScheme, OpenListClient};
use openlist_rename::rename_engine::{
    RenameMapping, plan_or_execute, rename_episodes_by_pattern,
};

#[derive(Parser)]
#[command(name = "openlist-rename", version)]
#[command(about = "Batch-rename episode files on an OpenList server")]
struct Cli {
    /// Base URL of the OpenList server, e.g. http://192.168.1.1:5244
    #[arg(long)]
    base_url: String,

    #[arg(long)]
    username: String,

    /// Prompted for interactively when omitted
    #[arg(long)]
    password: Option<String>,

    /// Send the token as "Bearer <token>" instead of the raw value
    #[arg(long)]
    bearer: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Infer episode numbers from filenames and rename a directory
    Rename {
        /// Remote directory path, e.g. /media/tv/Show/Season 1
        path: String,

        /// Naming template with {title}, {season} and {episode} placeholders
        #[arg(long, default_value = "S{season}E{episode:02d}_{title}")]
        template: String,

        /// Number files 1..N in sorted order instead of parsing filenames
        #[arg(long)]
        sequential: bool,

        /// Print the rename plan without sending the request
        #[arg(long)]
        dry_run: bool,
    },
    /// Rename a directory using an explicit mapping from a JSON file
    Apply {
        /// Remote directory path
        path: String,

        /// JSON object file of {"old name": "new name"} pairs
        #[arg(long)]
        mapping: PathBuf,

        /// Print the rename plan without sending the request
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the contents of a remote directory
    List {
        /// Remote directory path
        path: String,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let password = match cli.password {
        Some(password) => password,
        None => rpassword::prompt_password("Password: ").context("failed to read password")?,
    };
    let scheme = if cli.bearer {
        AuthScheme::Bearer
    } else {
        AuthScheme::Raw
    };
    let mut client = OpenListClient::new(&cli.base_url, &cli.username, &password, scheme);

    let renamed = match cli.command {
        Command::Rename {
            path,
            template,
            sequential,
            dry_run,
        } => rename_episodes_by_pattern(&mut client, &path, &template, sequential, dry_run)?,
        Command::Apply {
            path,
            mapping,
            dry_run,
        } => {
            let raw = fs::read_to_string(&mapping)
                .with_context(|| format!("failed to read {}", mapping.display()))?;
            let mapping: RenameMapping = serde_json::from_str(&raw)
                .context("mapping file must be a JSON object of old -> new names")?;
            client.login()?;
            plan_or_execute(&client, &path, &mapping, dry_run)?
        }
        Command::List { path } => {
            client.login()?;
            for entry in client.list(&path)? {
                if entry.is_dir {
                    println!("{}/", entry.name);
                } else {
                    println!("{}", entry.name);
                }
            }
            return Ok(ExitCode::SUCCESS);
        }
    };

    Ok(if renamed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
