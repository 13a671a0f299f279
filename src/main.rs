use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

mod class_average;
mod config;
mod db;
mod error;
mod import;
mod memory;
mod models;
mod report;
mod routes_grades;
mod routes_stats;
mod server;
mod state;
mod stats;
mod store;
mod weights;

use crate::config::AppConfig;
use crate::db::PgGradeStore;
use crate::error::GradeError;
use crate::memory::InMemoryGradeStore;
use crate::models::GradeFilter;
use crate::state::AppState;
use crate::store::GradeStore;

#[derive(Parser)]
#[command(name = "gradebook")]
#[command(about = "Grade records with weighted averages and pass-rate statistics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load sample grade records
    Seed,
    /// Import scores from a CSV file (learner_id,class_id,type,score)
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Serve the HTTP API
    Serve {
        #[arg(long)]
        bind: Option<String>,
        /// Keep records in memory instead of Postgres
        #[arg(long)]
        memory: bool,
    },
    /// Print pass-rate statistics
    Stats {
        #[arg(long)]
        class: Option<i64>,
    },
    /// Print the weighted average of a class
    Average {
        #[arg(long)]
        class: i64,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        class: Option<i64>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(long, default_value = "grades-report.md")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let cfg = AppConfig::from_env()?;

    if let Commands::Serve { bind, memory: true } = &cli.command {
        info!("using in-memory grade store");
        let state = Arc::new(AppState::new(Arc::new(InMemoryGradeStore::new())));
        let bind_addr = bind.as_deref().unwrap_or(&cfg.bind_addr);
        return server::serve(state, bind_addr).await;
    }

    let pool = db::connect(cfg.database_url()?, cfg.max_connections).await?;
    let store = PgGradeStore::new(pool.clone());

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv } => {
            let file = std::fs::File::open(&csv)
                .with_context(|| format!("failed to open {}", csv.display()))?;
            let imported = import::import_csv(&store, file).await?;
            println!("Imported {imported} scores from {}.", csv.display());
        }
        Commands::Serve { bind, .. } => {
            let state = Arc::new(AppState::new(Arc::new(store)));
            let bind_addr = bind.unwrap_or(cfg.bind_addr);
            server::serve(state, &bind_addr).await?;
        }
        Commands::Stats { class } => {
            let filter = GradeFilter {
                learner_id: None,
                class_id: class,
            };
            let records = store.find(filter).await?;
            let summary = stats::compute_stats(&records, class);
            println!(
                "{} of {} learners above 50 ({:.1}%)",
                summary.learners_above50, summary.total_learners, summary.percentage_above50
            );
        }
        Commands::Average { class } => {
            let records = store.find(GradeFilter::class(class)).await?;
            match class_average::compute_class_average(&records) {
                Ok(average) => println!("Class {class} average: {average:.2}"),
                Err(err @ (GradeError::NotFound | GradeError::NoValidScores)) => {
                    println!("Class {class}: {err}");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Commands::Report { class, limit, out } => {
            let filter = GradeFilter {
                learner_id: None,
                class_id: class,
            };
            let records = store.find(filter).await?;
            let report = report::build_report(
                class,
                chrono::Utc::now().date_naive(),
                &records,
                limit,
            );
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
