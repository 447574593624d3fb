use clap::Parser;
use defects::api::DefectsApi;
use defects::config::DefectsConfig;
use defects::error::{DefectError, Result};
use defects::http;
use defects::store::fs::FileStore;
use std::env;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod args;
use args::{Cli, Commands, ServeArgs};

const DEFAULT_DATA_DIR: &str = "data";

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let data_dir = resolve_data_dir(&cli);
    let mut config = match &cli.config {
        Some(path) => DefectsConfig::load_file(path)?,
        None => DefectsConfig::load(&data_dir)?,
    };
    if let Some(policy) = cli.on_corrupt {
        config.records.on_corrupt = policy;
    }

    match cli.command {
        Some(Commands::Serve(serve)) => handle_serve(&data_dir, config, serve),
        Some(Commands::Check) => handle_check(&data_dir, &config),
        None => handle_serve(&data_dir, config, ServeArgs::default()),
    }
}

fn resolve_data_dir(cli: &Cli) -> PathBuf {
    cli.data_dir
        .clone()
        .or_else(|| env::var_os("DEFECTS_DATA_DIR").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

fn open_store(data_dir: &Path, config: &DefectsConfig) -> FileStore {
    FileStore::new(data_dir)
        .with_records_file(data_dir.join(&config.records.file_name))
        .with_images_dir(data_dir.join(&config.images.dir_name))
}

fn handle_serve(data_dir: &Path, mut config: DefectsConfig, args: ServeArgs) -> Result<()> {
    if let Some(port) = env_port()? {
        config.server.port = port;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }

    let api = DefectsApi::open(open_store(data_dir, &config), &config)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(DefectError::Io)?;
    runtime.block_on(http::serve(api, &config.server))
}

fn handle_check(data_dir: &Path, config: &DefectsConfig) -> Result<()> {
    let store = open_store(data_dir, config);
    let location = store.records_file().display().to_string();
    let api = DefectsApi::open(store, config)?;
    println!("{} defects in {}", api.defect_count(), location);
    Ok(())
}

fn env_port() -> Result<Option<u16>> {
    match env::var("PORT") {
        Ok(value) => value
            .parse::<u16>()
            .map(Some)
            .map_err(|_| DefectError::Config(format!("PORT is not a valid port: {}", value))),
        Err(_) => Ok(None),
    }
}

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if env_bool("DEFECTS_LOG_JSON", false) {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
