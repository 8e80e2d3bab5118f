//! tokenmint: issue and verify RS256 identity tokens from the command line.
//! Used by: binary entrypoint.

use std::io::BufRead;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tokenmint::config::{parse_lifetime, Config};
use tokenmint::error::{Error, Result};
use tokenmint::token::Profile;
use tokenmint::{console, state};

#[derive(Debug, Parser)]
#[command(name = "tokenmint", about = "Issue and verify RS256 identity tokens")]
struct Cli {
    /// PKCS#8 private key (overrides TOKENMINT_PRIVATE_KEY)
    #[arg(long, global = true)]
    private_key: Option<PathBuf>,

    /// X.509 public key (overrides TOKENMINT_PUBLIC_KEY)
    #[arg(long, global = true)]
    public_key: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Mint a token for an already-authenticated subject
    Issue {
        subject: String,
        #[arg(long)]
        issuer: Option<String>,
        /// Lifetime in seconds
        #[arg(long, value_parser = parse_lifetime_arg)]
        lifetime: Option<u32>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        given_name: Option<String>,
        #[arg(long)]
        family_name: Option<String>,
    },
    /// Check a token and print its claims as JSON (`-` reads it from stdin)
    Verify {
        token: String,
        #[arg(long)]
        issuer: Option<String>,
    },
}

fn parse_lifetime_arg(value: &str) -> std::result::Result<u32, String> {
    parse_lifetime("--lifetime", value).map_err(|e| e.to_string())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match &e {
                Error::Verify(reason) => console::log_rejected(reason),
                other => console::log_failure(&other.to_string()),
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::from_env()?;
    if let Some(path) = cli.private_key {
        config.private_key_path = path;
    }
    if let Some(path) = cli.public_key {
        config.public_key_path = path;
    }

    match cli.command {
        Commands::Issue {
            subject,
            issuer,
            lifetime,
            email,
            given_name,
            family_name,
        } => {
            let engine = state::build_engine(&config)?;
            let issuer = issuer.unwrap_or_else(|| config.issuer.clone());
            let lifetime = lifetime.unwrap_or(config.lifetime_seconds);
            let profile = Profile {
                email,
                given_name,
                family_name,
            };
            let token = engine.issue(&subject, &issuer, lifetime, profile)?;
            console::log_issue(&subject, &issuer, lifetime);
            println!("{token}");
        }
        Commands::Verify { token, issuer } => {
            let engine = state::build_verifier(&config)?;
            let token = if token == "-" { read_stdin_token()? } else { token };
            let issuer = issuer.unwrap_or_else(|| config.issuer.clone());
            let claims = engine.verify(token.as_str(), &issuer)?;
            console::log_verified(&claims);
            let json = serde_json::to_string_pretty(&claims).map_err(Error::Output)?;
            println!("{json}");
        }
    }
    Ok(())
}

fn read_stdin_token() -> Result<String> {
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(Error::Stdin)?;
    Ok(line.trim().to_owned())
}
