//! `doctor-crm` command line client.
//!
//! ```text
//! doctor-crm login --email doc@clinic.test --password secret
//! doctor-crm me
//! doctor-crm get /doctor/appointments/ --param status=SCHEDULED
//! doctor-crm search ivanov
//! doctor-crm lang en
//! doctor-crm logout
//! ```
//!
//! The session is kept in the configured file storage between invocations.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;

use doctor_crm_client::api::CommonApi;
use doctor_crm_client::config::load_or_default;
use doctor_crm_client::observability::logging::init_logging;
use doctor_crm_client::{ApiClient, ApiRequest, AuthSession};

#[derive(Parser)]
#[command(name = "doctor-crm")]
#[command(about = "Command line client for the Doctor CRM API", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign out and forget the session
    Logout,
    /// Show the signed-in user
    Me,
    /// GET any API path
    Get {
        path: String,
        /// Query parameter as key=value; repeatable
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
    /// Global search across patients, services and appointments
    Search {
        q: String,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Set the preferred response language
    Lang { code: String },
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_or_default(cli.config.as_deref())?;
    init_logging(&config.observability);

    tracing::debug!(
        path = ?cli.config,
        base_url = %config.api.base_url,
        "Configuration loaded"
    );

    let client = ApiClient::from_config(&config)?;
    let session = AuthSession::new(client.clone());

    match cli.command {
        Commands::Login { email, password } => {
            let user = session.login(&email, &password).await?;
            print_json(&user)?;
        }
        Commands::Logout => {
            session.logout().await;
            println!("Signed out");
        }
        Commands::Me => {
            let user = CommonApi::new(client).me().await?;
            print_json(&user)?;
        }
        Commands::Get { path, params } => {
            let data: Value = client.fetch(ApiRequest::get(path).params(params)).await?;
            print_json(&data)?;
        }
        Commands::Search { q, limit } => {
            let results = CommonApi::new(client).search(&q, limit).await?;
            print_json(&results)?;
        }
        Commands::Lang { code } => {
            client.language().set_language(&code);
            println!("Language set to {}", client.language().resolve());
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
