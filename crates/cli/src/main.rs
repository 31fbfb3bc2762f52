//! Detailer CLI - tenant and routing diagnostics.
//!
//! # Usage
//!
//! ```bash
//! # Which subdomain does a host name?
//! dt-cli host classify foo.meusaas.com.br
//! dt-cli host classify localhost:3000 --subdomain foo
//!
//! # Resolve a tenant against the backend (needs BACKEND_URL)
//! dt-cli tenant resolve foo.meusaas.com.br
//!
//! # Where does a role land?
//! dt-cli route --role EMPLOYEE
//! ```
//!
//! # Commands
//!
//! - `host classify` - Extract the tenant subdomain from a host
//! - `tenant resolve` - Look the tenant up through the backend
//! - `route` - Show the landing route of a role

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "dt-cli")]
#[command(author, version, about = "Detailer CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect request hosts
    Host {
        #[command(subcommand)]
        action: HostAction,
    },
    /// Resolve tenants through the backend
    Tenant {
        #[command(subcommand)]
        action: TenantAction,
    },
    /// Show where a role lands after sign-in
    Route {
        /// User role (`SUPER_ADMIN`, `TENANT_ADMIN`, `EMPLOYEE`, `CLIENT`);
        /// omit for an anonymous visitor
        #[arg(short, long)]
        role: Option<String>,

        /// Fallback path for anonymous visitors and unknown roles
        #[arg(short, long, default_value = "/")]
        default_path: String,
    },
}

#[derive(Subcommand)]
enum HostAction {
    /// Extract the tenant subdomain from a host
    Classify {
        /// Host as sent by the browser, port allowed
        host: String,

        /// Subdomain for loopback hosts (the dev query parameter)
        #[arg(short, long)]
        subdomain: Option<String>,

        /// Comma-separated reserved labels
        #[arg(long, default_value = "www,app")]
        reserved: String,
    },
}

#[derive(Subcommand)]
enum TenantAction {
    /// Resolve the tenant of a host
    Resolve {
        /// Host as sent by the browser, port allowed
        host: String,

        /// Subdomain for loopback hosts (the dev query parameter)
        #[arg(short, long)]
        subdomain: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Command output goes through tracing, so default to info
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Host { action } => match action {
            HostAction::Classify {
                host,
                subdomain,
                reserved,
            } => {
                commands::host::classify(&host, subdomain.as_deref(), &reserved)?;
            }
        },
        Commands::Tenant { action } => match action {
            TenantAction::Resolve { host, subdomain } => {
                commands::tenant::resolve(&host, subdomain.as_deref()).await?;
            }
        },
        Commands::Route { role, default_path } => {
            commands::route::show(role.as_deref(), &default_path);
        }
    }
    Ok(())
}
