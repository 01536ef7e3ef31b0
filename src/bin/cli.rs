//! newwork CLI
//!
//! Scrapes the tracked sites, updates the lockfile and shows which sites
//! have new work.

use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{Parser, Subcommand};
use newwork::{
    error::{AppError, Result},
    models::{Config, Site, SiteList, TrackingMode},
    pipeline::{StatusReport, Tracker},
    services::{HttpFetcher, PageFetcher, extract},
    storage::{LocalStore, StateStore},
    utils::{fs::write_atomic, url::normalize_url},
    view::{HtmlView, TextView, View, relative_age},
};

/// newwork - see which sites have new work
#[derive(Parser, Debug)]
#[command(name = "newwork", version, about = "Tracks web pages for new work")]
struct Cli {
    /// Directory holding config.toml, the site list and the lockfile
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape, update, and serve a new-work page (default)
    Serve {
        /// Port to bind (default: server.port from config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Scrape, update, and save a new-work page to disk
    Build {
        /// Output HTML file (default: paths.output_file from config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Scrape, update, and print a status table
    Status,

    /// Add a URL to the list of sites
    Add {
        url: String,

        /// Display name (default: the page title)
        #[arg(long)]
        name: Option<String>,

        /// Grouping label
        #[arg(long)]
        category: Option<String>,

        /// CSS selector of the element to diff for changes
        #[arg(long)]
        selector: Option<String>,
    },

    /// Remove a URL from the list of sites
    Remove { url: String },

    /// List all tracked sites
    List,

    /// Validate configuration and site list
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(cli.storage_dir.join("config.toml"));
    let base = cli.storage_dir.as_path();
    let sites_path = config.paths.sites_path(base);
    let store = LocalStore::new(config.paths.lockfile_path(base));

    init_storage(&sites_path, &store).await?;

    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => {
            let (page, report) = render_page(&config, base, &sites_path).await?;
            summarize(&report);
            let port = port.unwrap_or(config.server.port);
            serve(page, port).await?;
        }

        Command::Build { output } => {
            let (page, report) = render_page(&config, base, &sites_path).await?;
            summarize(&report);
            let output = output.unwrap_or_else(|| config.paths.output_path(base));
            write_atomic(&output, page.as_bytes())?;
            log::info!("Wrote new-work page to {}", output.display());
        }

        Command::Status => {
            let sites = SiteList::load(&sites_path)?;
            let tracker = Tracker::from_config(&config, base)?;
            let report = tracker.status(&sites.sites).await?;
            print!("{}", TextView::default().render(&report.sites));
            summarize(&report);
        }

        Command::Add {
            url,
            name,
            category,
            selector,
        } => {
            add_site(&config, &sites_path, url, name, category, selector).await?;
        }

        Command::Remove { url } => {
            let mut sites = SiteList::load(&sites_path)?;
            let removed = sites.remove(&url)?;
            sites.save(&sites_path)?;
            log::info!("Removed {} from {}", removed.url, sites_path.display());

            if store.remove(&removed.url).await? {
                log::info!("Removed {} from {}", removed.url, store.location());
            }
        }

        Command::List => {
            let sites = SiteList::load(&sites_path)?;
            for site in &sites.sites {
                let category = site.category.as_deref().unwrap_or("");
                println!("{}\t{}\t{}", site.name, site.url, category);
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");

            let sites = SiteList::load(&sites_path)?;
            if let Err(e) = sites.validate() {
                log::error!("Site list validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ {} sites OK", sites.len());

            store.load().await?;
            log::info!("✓ Lockfile OK");
        }
    }

    Ok(())
}

/// Create an empty site list and lockfile on first use.
async fn init_storage(sites_path: &Path, store: &LocalStore) -> Result<()> {
    if !sites_path.exists() {
        SiteList::default().save(sites_path)?;
        log::info!("Created empty site list at {}", sites_path.display());
    }
    store.init().await
}

async fn render_page(
    config: &Config,
    base: &Path,
    sites_path: &Path,
) -> Result<(String, StatusReport)> {
    let sites = SiteList::load(sites_path)?;
    if sites.is_empty() {
        log::warn!("No sites tracked yet. Use 'newwork add <url>'.");
    }
    let tracker = Tracker::from_config(config, base)?;
    tracker.render(&sites.sites, &HtmlView::default()).await
}

fn summarize(report: &StatusReport) {
    for failure in &report.failures {
        log::error!("{} ({}): {}", failure.site.name, failure.error.kind(), failure.error);
    }
    log::info!(
        "{} of {} sites have new work",
        report.new_count(),
        report.sites.len()
    );
}

#[cfg(feature = "serve")]
async fn serve(page: String, port: u16) -> Result<()> {
    newwork::server::serve(page, port).await
}

#[cfg(not(feature = "serve"))]
async fn serve(_page: String, _port: u16) -> Result<()> {
    Err(AppError::config(
        "built without the 'serve' feature, use 'newwork build'",
    ))
}

/// Fetch the URL once, check it can be tracked, and add it to the list.
async fn add_site(
    config: &Config,
    sites_path: &Path,
    url: String,
    name: Option<String>,
    category: Option<String>,
    selector: Option<String>,
) -> Result<()> {
    let url = normalize_url(&url)?;
    let mut sites = SiteList::load(sites_path)?;
    if sites.find(&url).is_some() {
        return Err(AppError::DuplicateSite(url));
    }

    let fetcher = HttpFetcher::new(&config.crawler)?;
    let page = fetcher.fetch(&url).await?;

    let name = name
        .or_else(|| page.title())
        .unwrap_or_else(|| url.clone());
    let site = Site {
        name,
        url,
        category,
        selector,
    };
    site.validate()?;

    let observation = extract(&site, &page)?;
    match site.tracking_mode() {
        TrackingMode::Selector(selector) => {
            log::info!("Tracking '{}' on {}", selector, site.url);
        }
        TrackingMode::Timestamp => {
            if let Some(ts) = observation.last_modified {
                log::info!(
                    "Site was last modified {} ({})",
                    relative_age(ts, Utc::now()),
                    ts.to_rfc3339()
                );
            }
        }
    }

    let added = site.url.clone();
    sites.add(site)?;
    sites.save(sites_path)?;
    log::info!("Added {} to {}", added, sites_path.display());
    Ok(())
}
