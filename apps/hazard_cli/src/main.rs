use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use form_core::{
    load_settings, ClientSettings, FormSession, FormTransport, HttpTransport, SubmissionStatus,
};
use shared::catalog::HazardCatalog;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod draft;

use draft::Draft;

#[derive(Parser, Debug)]
#[command(about = "Fill out and submit a site specific hazard assessment")]
struct Cli {
    /// Base URL of the form backend; overrides hazard.toml and HAZARD_API_URL.
    #[arg(long)]
    api_url: Option<String>,
    /// TOML hazard catalog to use instead of the built-in one.
    #[arg(long)]
    catalog: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print hazards with their controls, and the PPE list.
    Catalog,
    /// Probe the backend's health endpoint.
    Health,
    /// Load a draft, submit it and print the resulting status.
    Submit {
        #[arg(long)]
        draft: PathBuf,
        /// Fill an empty date with today's date.
        #[arg(long)]
        today: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings()?;
    if let Some(url) = cli.api_url {
        settings.api_url = Some(url);
    }
    if let Some(path) = cli.catalog {
        settings.catalog_path = Some(path);
    }

    match cli.command {
        Command::Catalog => {
            print_catalog(&settings.load_catalog()?);
        }
        Command::Health => {
            let transport = build_transport(&settings)?;
            let body = transport
                .health_check()
                .await
                .context("health check failed")?;
            println!("{body}");
        }
        Command::Submit { draft, today } => {
            let catalog = Arc::new(settings.load_catalog()?);
            let transport = Arc::new(build_transport(&settings)?);
            let mut session = FormSession::new(catalog, transport);
            Draft::load(&draft)?.apply(&mut session)?;
            if today {
                draft::fill_missing_date(&mut session.selection, Local::now().date_naive());
            }

            info!(session = %session.id(), draft = %draft.display(), "submitting draft");
            let status = session.submit().await?;
            println!("{status}");
            if status == SubmissionStatus::Failed {
                bail!("hazard form was not accepted");
            }
        }
    }

    Ok(())
}

fn build_transport(settings: &ClientSettings) -> Result<HttpTransport> {
    let api_url = settings.api_url()?;
    let transport = match settings.request_timeout() {
        Some(timeout) => HttpTransport::with_timeout(api_url, timeout)?,
        None => HttpTransport::new(api_url),
    };
    Ok(transport)
}

fn print_catalog(catalog: &HazardCatalog) {
    for entry in catalog.entries() {
        println!("{}", entry.hazard);
        for control in &entry.controls {
            println!("  - {control}");
        }
    }
    println!();
    println!("PPE");
    for item in catalog.ppe_options() {
        println!("  - {item}");
    }
}
