use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lily_scraper::{
    config::Config, AssetKind, ImportSession, Library, ReqwestFetcher, ScraperRegistry,
    TextureStore,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the config file
    #[arg(short, long)]
    config: Option<String>,

    /// Directory receiving downloaded textures (overrides the config file)
    #[arg(long)]
    texture_root: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the known asset sources
    Sources {
        #[arg(long, value_enum)]
        kind: Option<AssetKind>,
    },
    /// List the variants available at a URL
    Variants {
        url: String,
        #[arg(long, value_enum)]
        kind: Option<AssetKind>,
    },
    /// Download one variant of the asset at a URL
    Fetch {
        url: String,
        #[arg(long, value_enum)]
        kind: Option<AssetKind>,
        /// Variant label, e.g. "4k (hdr)"
        #[arg(long)]
        variant: Option<String>,
        /// Variant position in the list printed by `variants`
        #[arg(long, conflicts_with = "variant")]
        index: Option<usize>,
        /// Download again even if the files are already present
        #[arg(long)]
        reinstall: bool,
    },
    /// List assets already downloaded from a source
    Library { source: String },
}

fn get_config_path(args: &Args) -> Option<String> {
    if let Some(path) = &args.config {
        return Some(path.clone());
    }

    if let Ok(path) = std::env::var("LILY_SCRAPER_CONFIG") {
        return Some(path);
    }

    if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
        let config_path = format!("{}/lily-scraper/config.toml", xdg_config_home);
        if std::path::Path::new(&config_path).exists() {
            return Some(config_path);
        }
    }

    if let Some(home) = dirs::home_dir() {
        let config_path = format!("{}/.config/lily-scraper/config.toml", home.display());
        if std::path::Path::new(&config_path).exists() {
            return Some(config_path);
        }
    }

    None
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match get_config_path(&args) {
        Some(path) => Config::from_file(&path)
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => Config::default(),
    };

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    if config.get_logging_format() == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let texture_root = args
        .texture_root
        .clone()
        .unwrap_or_else(|| config.texture_root());
    info!("Using texture root {}", texture_root.display());

    let registry = ScraperRegistry::with_defaults();

    match args.command {
        Command::Sources { kind } => {
            for factory in registry.list(kind) {
                let info = factory.info();
                let kinds: Vec<String> = info.scraped_types.iter().map(|k| k.to_string()).collect();
                println!(
                    "{:<20} {:<24} {:<10} {}",
                    info.id,
                    info.source_name,
                    kinds.join(","),
                    info.home_url
                );
            }
        }
        Command::Variants { url, kind } => {
            let store = build_store(&config, texture_root, false)?;
            let session = ImportSession::open(&registry, &store, &url, kind)?;
            for (index, label) in session.variants().iter().enumerate() {
                let mark = if session.is_downloaded(label) { "*" } else { " " };
                println!("{mark} {index:>3}  {label}");
            }
        }
        Command::Fetch {
            url,
            kind,
            variant,
            index,
            reinstall,
        } => {
            let store = build_store(&config, texture_root, reinstall)?;
            let mut session = ImportSession::open(&registry, &store, &url, kind)?;

            let index = match index.or_else(|| session.select(variant.as_deref())) {
                Some(index) => index,
                None => anyhow::bail!(
                    "Several variants available, pick one with --variant or --index: {}",
                    session.variants().join(", ")
                ),
            };

            let data = session.fetch(index)?;
            println!("{}", data.name);
            for (slot, path) in &data.maps {
                println!("  {slot}: {}", path.display());
            }
        }
        Command::Library { source } => {
            let factory = registry
                .find_by_id(&source)
                .with_context(|| format!("Unknown source: {source}"))?;
            let mut library = Library::new(texture_root);
            for entry in library.scan(factory.info())? {
                println!("{:<32} {}", entry.name, entry.fetch_url);
            }
        }
    }

    Ok(())
}

fn build_store(config: &Config, root: PathBuf, reinstall: bool) -> Result<TextureStore> {
    let fetcher = ReqwestFetcher::new(config.http.timeout(), &config.http.user_agent)?;
    Ok(TextureStore::new(root, Arc::new(fetcher)).with_reinstall(reinstall))
}
