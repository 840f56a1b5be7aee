//! jobtoken CLI
//!
//! Command-line interface for the jobtoken OIDC provider.

use anyhow::Result;
use clap::{Parser, Subcommand};
use jobtoken_core::KeyAlgorithm;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "jobtoken")]
#[command(author, version, about = "jobtoken: OIDC ID tokens for CI jobs", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Settings file name, with or without extension
    #[arg(long, global = true, default_value = "jobtoken")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the jobtoken server
    Server {
        /// Address to bind to (overrides settings)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Manage credentials in the store
    Credential {
        #[command(subcommand)]
        action: CredentialAction,
    },

    /// Issue an ID token
    Token {
        /// Credential ID
        id: String,

        /// Scope holding the credential
        #[arg(short, long, default_value = "")]
        scope: String,

        /// URL of the job the token is issued for
        #[arg(long, requires = "build")]
        subject: Option<String>,

        /// Run number of the job
        #[arg(long, requires = "subject")]
        build: Option<u64>,

        /// Print the claims instead of the token
        #[arg(long)]
        claims: bool,
    },

    /// Print the discovery document of an issuer
    Discovery {
        /// Scope of the issuer
        #[arg(short, long, default_value = "", conflicts_with = "issuer")]
        scope: String,

        /// Externally hosted issuer URL
        #[arg(long)]
        issuer: Option<String>,
    },

    /// Print the JWKS of an issuer
    Jwks {
        /// Scope of the issuer
        #[arg(short, long, default_value = "")]
        scope: String,

        /// Only the key of this credential, served from its issuer override
        #[arg(long, requires = "issuer")]
        id: Option<String>,

        /// Issuer override of the credential
        #[arg(long, requires = "id")]
        issuer: Option<String>,
    },

    /// Check an issuer URL for a credential
    CheckIssuer {
        /// Scope the credential is saved in
        #[arg(short, long, default_value = "")]
        scope: String,

        /// Credential ID
        #[arg(long, default_value = "")]
        id: String,

        /// Issuer override to check; empty shows the default issuer
        #[arg(long)]
        issuer: Option<String>,
    },

    /// List supported signing algorithms
    Algorithms,
}

#[derive(Subcommand)]
enum CredentialAction {
    /// Create a credential with a fresh key pair
    Create {
        /// Credential ID
        id: String,

        /// Signing algorithm
        #[arg(short, long, default_value = "RS256")]
        algorithm: KeyAlgorithm,

        /// Scope to save the credential in
        #[arg(short, long, default_value = "")]
        scope: String,

        /// Serve tokens under this externally hosted issuer URL
        #[arg(long)]
        issuer: Option<String>,

        /// Audience claim
        #[arg(long)]
        audience: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// List credentials by scope
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| {
                format!("jobtoken={0},jobtoken_server={0},tower_http={0}", log_level)
            }),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let settings = commands::settings(&cli.config)?;

    match cli.command {
        Commands::Server { bind } => {
            commands::server::run(settings, bind).await?;
        }
        Commands::Credential { action } => match action {
            CredentialAction::Create {
                id,
                algorithm,
                scope,
                issuer,
                audience,
                description,
            } => {
                commands::credential::create(
                    &settings,
                    commands::credential::NewCredential {
                        id,
                        algorithm,
                        scope,
                        issuer,
                        audience,
                        description,
                    },
                )?;
            }
            CredentialAction::List => commands::credential::list(&settings)?,
        },
        Commands::Token {
            id,
            scope,
            subject,
            build,
            claims,
        } => {
            let job = subject.zip(build);
            commands::token::issue(&settings, &scope, &id, job, claims)?;
        }
        Commands::Discovery { scope, issuer } => {
            commands::metadata::discovery(&settings, &scope, issuer.as_deref())?;
        }
        Commands::Jwks { scope, id, issuer } => {
            commands::metadata::jwks(&settings, &scope, id.zip(issuer))?;
        }
        Commands::CheckIssuer { scope, id, issuer } => {
            commands::metadata::check_issuer(&settings, &scope, &id, issuer.as_deref())?;
        }
        Commands::Algorithms => commands::metadata::algorithms(),
    }

    Ok(())
}
