use anyhow::Context;
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use portal_client::{PortalClient, SiteApi};
use portal_core::config::api_timeout_from_env_value;
use portal_core::constants::{DEFAULT_API_BASE_URL, DEFAULT_SITE_URL};
use portal_core::content::filter_centers;
use portal_core::schedule::evaluate;
use portal_core::structure::{MemoryNavigation, UnitId};
use portal_core::{Navigator, PortalConfig};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "portal")]
#[command(about = "Health authority portal operator CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the remote API answers
    Health,
    /// Print the organisational structure
    Structure {
        /// Filter units by name, type, contact, or employee
        #[arg(long)]
        query: Option<String>,
        /// Select a unit and expand the path to it
        #[arg(long)]
        unit: Option<String>,
        /// Expand every unit
        #[arg(long)]
        all: bool,
        /// Print the canonical forest as JSON instead of a tree
        #[arg(long)]
        json: bool,
    },
    /// Report which centers are open
    Centers {
        /// Only centers in this city
        #[arg(long)]
        city: Option<String>,
        /// Reference time (YYYY-MM-DD HH:MM), defaults to now
        #[arg(long)]
        at: Option<String>,
    },
}

fn config_from_env() -> anyhow::Result<PortalConfig> {
    let api = std::env::var("PORTAL_API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.into());
    let site = std::env::var("PORTAL_SITE_URL").unwrap_or_else(|_| DEFAULT_SITE_URL.into());
    let timeout = api_timeout_from_env_value(std::env::var("PORTAL_API_TIMEOUT_SECS").ok())?;
    Ok(PortalConfig::new(&api, &site, timeout)?)
}

fn parse_at(value: Option<&str>) -> anyhow::Result<NaiveDateTime> {
    match value {
        Some(v) => NaiveDateTime::parse_from_str(v.trim(), "%Y-%m-%d %H:%M")
            .with_context(|| format!("--at must look like 2024-06-02 09:30, got {v:?}")),
        None => Ok(chrono::Local::now().naive_local()),
    }
}

async fn structure(
    client: &PortalClient,
    query: Option<String>,
    unit: Option<String>,
    all: bool,
    json: bool,
) -> anyhow::Result<()> {
    let forest = client.structures().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&forest)?);
        return Ok(());
    }

    let navigation = match unit.as_deref() {
        Some(id) => MemoryNavigation::for_unit(&UnitId::from(id)),
        None => MemoryNavigation::new(None),
    };
    let mut nav = Navigator::new(forest, navigation);
    if let Some(q) = query.as_deref() {
        nav.set_query(q);
    }
    // A filtered forest only keeps match paths, so show all of it.
    if all || !nav.query().is_empty() {
        nav.expand_all();
    }

    let rows = nav.visible_rows();
    if rows.is_empty() {
        println!("No matching units.");
        return Ok(());
    }
    for row in rows {
        let marker = match (row.unit.has_children(), row.expanded) {
            (false, _) => "-",
            (true, true) => "v",
            (true, false) => ">",
        };
        let selected = if row.selected { " *" } else { "" };
        println!(
            "{}{marker} {} [{}] ({}){selected}",
            "  ".repeat(row.depth),
            row.unit.name,
            row.unit.kind.as_str(),
            row.unit.id
        );
    }
    Ok(())
}

async fn centers(
    client: &PortalClient,
    city: Option<String>,
    at: Option<String>,
) -> anyhow::Result<()> {
    let now = parse_at(at.as_deref())?;
    let all = client.centers().await?;
    let city = city.as_deref().map(str::trim).filter(|c| !c.is_empty());
    let selected = filter_centers(&all, city, "");
    if selected.is_empty() {
        println!("No centers found.");
        return Ok(());
    }

    println!("Centers at {}", now.format("%A %Y-%m-%d %H:%M"));
    for center in selected {
        let status = evaluate(&center.schedules, now);
        let hours = if status.today_ranges.is_empty() {
            "no hours today".to_string()
        } else {
            status.today_ranges.join(", ")
        };
        println!(
            "{:<6} {} ({}): {}",
            if status.open { "OPEN" } else { "CLOSED" },
            center.name,
            center.city.as_deref().unwrap_or("-"),
            hours
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("portal=warn".parse()?))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("Use 'portal --help' for commands");
        return Ok(());
    };

    let config = config_from_env()?;
    let client = PortalClient::new(&config)?;

    match command {
        Commands::Health => match client.stats().await {
            Ok(_) => println!("API reachable at {}", config.api_base_url()),
            Err(e) => anyhow::bail!("API at {} is unreachable: {e}", config.api_base_url()),
        },
        Commands::Structure {
            query,
            unit,
            all,
            json,
        } => structure(&client, query, unit, all, json).await?,
        Commands::Centers { city, at } => centers(&client, city, at).await?,
    }

    Ok(())
}
