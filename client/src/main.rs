//! Salary dashboard
//!
//! Boots the terminal UI, fetches survey data from the API and renders it.

use std::io;

use clap::{Args, Parser, Subcommand};
use client::{
    ClientConfig, SalaryClient,
    ui::{App, ROOT_ANCHOR, Theme, Ui, UiConfig, View},
};
use common::{FilterKey, Filters};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(name = "salary-dashboard", about = "Browse the salary survey")]
struct Cli {
    /// Backend address (overrides SALARY_API_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Use the dark theme for this run
    #[arg(long, global = true)]
    dark: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List survey answers matching the filters
    Salaries(FilterArgs),
    /// Show the most common pay ranges for the filters
    Summary(FilterArgs),
}

/// One flag per filter. Unset flags stay empty and are dropped before the request.
#[derive(Args, Debug)]
struct FilterArgs {
    #[arg(long, default_value = "")]
    title: String,
    #[arg(long, default_value = "")]
    min_company_size: String,
    #[arg(long, default_value = "")]
    max_company_size: String,
    #[arg(long, default_value = "")]
    min_experience: String,
    #[arg(long, default_value = "")]
    max_experience: String,
    #[arg(long, default_value = "")]
    area: String,
    #[arg(long, default_value = "")]
    currency: String,
    #[arg(long, default_value = "")]
    work_area: String,
}

impl From<FilterArgs> for Filters {
    fn from(args: FilterArgs) -> Self {
        Filters::from_iter([
            (FilterKey::Title, args.title),
            (FilterKey::MinCompanySize, args.min_company_size),
            (FilterKey::MaxCompanySize, args.max_company_size),
            (FilterKey::MinExperience, args.min_experience),
            (FilterKey::MaxExperience, args.max_experience),
            (FilterKey::Area, args.area),
            (FilterKey::Currency, args.currency),
            (FilterKey::WorkArea, args.work_area),
        ])
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env();
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    let client = SalaryClient::new(config)?;

    let theme = if cli.dark { Theme::Dark } else { Theme::Light };
    let ui = Ui::new(UiConfig {
        theme,
        ..UiConfig::default()
    });
    let mut app = App::new(ui).mount(ROOT_ANCHOR, io::stdout())?;
    debug!(theme = ?app.ui().theme(), base_url = client.base_url(), "Mounted at {ROOT_ANCHOR}");

    app.render(&View::status("loading", format!("Fetching from {}", client.base_url())))?;

    let fetched = match cli.command {
        Command::Salaries(filters) => client
            .fetch_salaries(&filters.into())
            .await
            .map(View::Salaries),
        Command::Summary(filters) => client
            .fetch_pay_range_summary(&filters.into())
            .await
            .map(View::Summary),
    };

    match fetched {
        Ok(view) => app.render(&view)?,
        Err(e) => {
            app.render(&View::status("error", e.to_string()))?;
            return Err(e.into());
        }
    }

    Ok(())
}
