use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::{pin_mut, StreamExt};
use queue_scout::config::{default_database_path, ScraperConfig};
use queue_scout::scrapers::{StudentbostaderScraper, Transport};
use queue_scout::{Accommodation, AccommodationStore, Error};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "queue-scout",
    about = "Track studentbostader.se listings and their interest queues"
)]
struct Cli {
    /// SQLite database file (default: <documents>/apaato/accommodations_db.sqlite)
    #[arg(long, global = true, env = "QUEUE_SCOUT_DB")]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every listing into a fresh database
    Load {
        /// Skip listings whose details cannot be fetched instead of stopping
        #[arg(long)]
        keep_going: bool,
    },
    /// Show stored listings
    List {
        /// Only listings with this deadline; SQL LIKE wildcards allowed (e.g. 2021-05-%)
        #[arg(short, long)]
        date: Option<String>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let database = match cli.database {
        Some(path) => path,
        None => default_database_path()
            .context("Could not locate a documents directory, pass --database")?,
    };

    match cli.command {
        Commands::Load { keep_going } => load(&database, keep_going).await,
        Commands::List { date, json } => list(&database, date.as_deref(), json),
    }
}

async fn load(database: &Path, keep_going: bool) -> Result<()> {
    let scraper = StudentbostaderScraper::with_config(ScraperConfig::default())
        .context("Failed to create HTTP client")?;

    let stored = load_into(&scraper, database, keep_going).await?;
    info!("💾 Saved {} listings to {}", stored, database.display());
    Ok(())
}

/// Fetch every listing, then replace the database contents with them.
///
/// Nothing is written until the whole fetch has succeeded, so a failed run
/// leaves the previous data in place. Returns the number of stored rows.
async fn load_into<T: Transport>(
    scraper: &StudentbostaderScraper<T>,
    database: &Path,
    keep_going: bool,
) -> Result<usize> {
    let index = scraper
        .fetch_index()
        .await
        .context("Failed to fetch listing index")?;
    info!("Loading {} listings", index.len());

    let stream = index.accommodations();
    pin_mut!(stream);

    let mut accommodations = Vec::with_capacity(index.len());
    let mut skipped = 0usize;
    while let Some(result) = stream.next().await {
        match result {
            Ok(accommodation) => {
                info!(
                    "[{}/{}] {}",
                    accommodations.len() + skipped + 1,
                    index.len(),
                    accommodation.address
                );
                accommodations.push(accommodation);
            }
            Err(e) if keep_going => {
                warn!("Skipping listing: {}", e);
                skipped += 1;
            }
            Err(e) => return Err(e).context("Failed to fetch listing details"),
        }
    }
    if skipped > 0 {
        warn!("Skipped {} listings", skipped);
    }

    let mut store =
        AccommodationStore::open(database, true).context("Failed to initialize database")?;
    store.insert_all(&accommodations)?;
    Ok(store.count()?)
}

fn list(database: &Path, date: Option<&str>, json: bool) -> Result<()> {
    let store = match AccommodationStore::open(database, false) {
        Ok(store) => store,
        Err(Error::Setup { .. }) => {
            eprintln!("No database found. Please run 'queue-scout load'.");
            std::process::exit(1);
        }
        Err(e) => return Err(e).context("Failed to open database"),
    };

    let accommodations = match date {
        Some(pattern) => store.by_date(pattern)?.collect::<queue_scout::Result<Vec<_>>>()?,
        None => store.all()?.collect::<queue_scout::Result<Vec<_>>>()?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&accommodations)?);
        return Ok(());
    }

    if accommodations.is_empty() {
        println!("No listings found.");
        return Ok(());
    }

    for (i, accommodation) in accommodations.iter().enumerate() {
        print_accommodation(i + 1, accommodation);
    }
    println!("{} of {} stored listings", accommodations.len(), store.count()?);
    Ok(())
}

fn print_accommodation(n: usize, accommodation: &Accommodation) {
    println!("{}. {} ({} m²)", n, accommodation.address, accommodation.size);
    match accommodation.deadline_date() {
        Some(date) => println!("   Deadline: {}", date.format("%a %-d %b %Y")),
        None if accommodation.is_direct_allocation() => println!("   Direct allocation"),
        None => println!("   Deadline: {}", accommodation.deadline),
    }

    let points: Vec<String> = accommodation
        .queue_points
        .iter()
        .map(|p| p.to_string())
        .collect();
    println!(
        "   Applicants: {}, top queue points: {}",
        accommodation.applicants,
        points.join(" / ")
    );
    println!("   Refid: {}", accommodation.refid);
    println!();
}
