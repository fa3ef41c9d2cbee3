//! Salary survey seeder
//!
//! Converts the survey form CSV export into data/salaries.json for the API.

use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "seed", about = "Import the salary survey CSV export")]
struct Args {
    /// CSV export of the survey form
    #[arg(default_value = "salary-form.csv")]
    csv: PathBuf,

    /// Where to write the JSON data set
    #[arg(long, default_value = "data/salaries.json")]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let args = Args::parse();
    info!("🔍 Importing survey answers from {:?}...", args.csv);

    let count = seed::import(&args.csv, &args.out)?;

    info!("✨ Seeding complete: {count} records");
    Ok(())
}
