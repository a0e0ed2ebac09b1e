use std::path::PathBuf;

use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;

mod aggregate;
mod api;
mod config;
mod demo;
mod export;
mod models;
mod report;
mod resolver;
mod score;
mod session;

use crate::aggregate::DashboardData;
use crate::api::{ApiError, HttpApi};
use crate::config::Config;
use crate::models::Provenance;
use crate::resolver::Resolution;
use crate::session::{SessionContext, TokenStore};

#[derive(Parser)]
#[command(name = "opportunity-heatmap")]
#[command(about = "Opportunity breakdowns by time, source, category, stage, and score", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and remember the access token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored access token
    Logout,
    /// Fetch opportunities and print the dashboard
    Dashboard {
        /// Print the dashboard data as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown report
    Report {
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Export chart data as CSV
    Export {
        #[arg(long, default_value = "charts.csv")]
        out: PathBuf,
    },
    /// Print a batch of sample opportunities as JSON
    Demo {
        #[arg(long)]
        seed: Option<u64>,
    },
}

struct LoadedDashboard {
    data: DashboardData,
    provenance: Provenance,
    failure: Option<ApiError>,
}

async fn load_dashboard(config: &Config, store: &TokenStore) -> anyhow::Result<LoadedDashboard> {
    let session = SessionContext::new(store.load()?);
    let api = HttpApi::new(config).context("failed to build HTTP client")?;

    let (session, resolution) = resolver::resolve(session, &api, &mut rand::thread_rng()).await;
    if resolution.is_auth_failure() {
        log::warn!("Stored token was rejected; run `login` again");
    }
    if session.is_using_demo_data() {
        log::warn!("Demo mode: showing sample data ({})", resolution.provenance);
    }

    let Resolution {
        opportunities,
        provenance,
        failure,
    } = resolution;

    Ok(LoadedDashboard {
        data: DashboardData::build(opportunities),
        provenance,
        failure,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let store = TokenStore::new(config.token_path.clone());

    match cli.command {
        Commands::Login { email, password } => {
            let api = HttpApi::new(&config).context("failed to build HTTP client")?;
            let session = resolver::login(SessionContext::default(), &api, &email, &password)
                .await
                .context("Login failed. Please check your credentials.")?;
            store.persist(&session)?;
            println!("Logged in. Token stored at {}.", store.path().display());
        }
        Commands::Logout => {
            let session = SessionContext::new(store.load()?).logout();
            store.persist(&session)?;
            println!("Logged out.");
        }
        Commands::Dashboard { json } => {
            let loaded = load_dashboard(&config, &store).await?;
            if json {
                let payload = serde_json::json!({
                    "dataSource": loaded.provenance,
                    "error": loaded.failure.as_ref().map(|err| err.to_string()),
                    "dashboard": &loaded.data,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                let report = report::build_report(
                    &loaded.data,
                    loaded.provenance,
                    loaded.failure.as_ref(),
                );
                print!("{report}");
            }
        }
        Commands::Report { out } => {
            let loaded = load_dashboard(&config, &store).await?;
            let report =
                report::build_report(&loaded.data, loaded.provenance, loaded.failure.as_ref());
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Export { out } => {
            let loaded = load_dashboard(&config, &store).await?;
            let rows = export::export_csv(&out, &loaded.data)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Exported {rows} chart rows to {}.", out.display());
        }
        Commands::Demo { seed } => {
            let opportunities = match seed {
                Some(seed) => demo::generate(&mut StdRng::seed_from_u64(seed), Local::now()),
                None => demo::generate_demo_data(),
            };
            println!("{}", serde_json::to_string_pretty(&opportunities)?);
        }
    }

    Ok(())
}
