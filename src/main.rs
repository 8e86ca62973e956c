use std::io::BufRead;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use unixdir::auth::pam::PamAuthenticator;
use unixdir::config::Configuration;
use unixdir::{AuthError, BackendError, Handler, Lookup, UnixHandler, ldif};
use validator::Validate;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file.
    #[arg(long, short, default_value = "config.yaml")]
    config: PathBuf,
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Print every posix account entry.
    Users {
        /// Organizational units between the primary group and the base DN.
        #[arg(long)]
        hierarchy: Option<String>,
    },
    /// Print every posix group entry.
    Groups {
        #[arg(long)]
        hierarchy: Option<String>,
    },
    /// Look up a single user.
    User { name: String },
    /// Look up a single group.
    Group { name: String },
    /// Check a password, read from stdin, for a user.
    Auth { name: String },
}

fn run(args: Args) -> Result<ExitCode, BackendError> {
    let config = Configuration::default().path(args.config).read()?;
    config.validate()?;

    let authenticator = Arc::new(PamAuthenticator::new(config.backend.pam_service.clone()));
    let handler = UnixHandler::new(config.backend, authenticator);

    match args.cmd {
        Commands::Users { hierarchy } => {
            let entries = handler.find_posix_accounts(hierarchy.as_deref().unwrap_or_default())?;
            print!("{}", ldif::render_all(&entries));
        },
        Commands::Groups { hierarchy } => {
            let entries = handler.find_posix_groups(hierarchy.as_deref().unwrap_or_default())?;
            print!("{}", ldif::render_all(&entries));
        },
        Commands::User { name } => match handler.find_user(&name, false) {
            Lookup::Found(user) => {
                println!("name: {}", user.name);
                println!("givenName: {}", user.given_name);
                println!("uidNumber: {}", user.uid_number);
                println!("gidNumber: {}", user.primary_group);
                println!("groups: {:?}", user.other_groups);
                println!("homeDirectory: {}", user.homedir);
                println!("capabilities: {:?}", user.capabilities);
            },
            Lookup::NotFound => return Ok(ExitCode::FAILURE),
            Lookup::Failed(err) => return Err(err),
        },
        Commands::Group { name } => match handler.find_group(&name) {
            Lookup::Found(group) => {
                println!("name: {}", group.name);
                println!("gidNumber: {}", group.gid_number);
            },
            Lookup::NotFound => return Ok(ExitCode::FAILURE),
            Lookup::Failed(err) => return Err(err),
        },
        Commands::Auth { name } => {
            let mut password = String::new();
            std::io::stdin()
                .lock()
                .read_line(&mut password)
                .map_err(|err| BackendError::io("<stdin>", err))?;
            let password = password.trim_end_matches(['\r', '\n']);

            let user = match handler.find_user(&name, false) {
                Lookup::Found(user) => user,
                Lookup::NotFound => return Err(AuthError::UnknownUser(name).into()),
                Lookup::Failed(err) => return Err(err),
            };

            user.authenticate(password)?;
            tracing::info!(user = %user.name, "authenticated");
        },
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Args::parse()) {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            ExitCode::FAILURE
        },
    }
}
