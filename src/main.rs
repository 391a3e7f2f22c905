//! target-scope - explore devices, apps, processes and their class hierarchies
//!
//! This is the binary entry point. All tree logic lives in the `tscope-*` crates.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};

use tscope_core::ProviderMode;
use tscope_driver::{Driver, DriverClient};
use tscope_tree::{
    config_path, load_settings, render_text, save_settings, walk, DevicesProvider, Resources,
    TreeSnapshot,
};

/// target-scope - lazy device / app / class-hierarchy explorer
#[derive(Parser, Debug)]
#[command(name = "tscope")]
#[command(about = "Explore devices, apps, processes and their class hierarchies", long_about = None)]
struct Args {
    /// Driver address (host:port). Overrides the config file.
    #[arg(long, value_name = "ADDR")]
    connect: Option<String>,

    /// List installed apps ("apps") or running processes ("ps") under each device
    #[arg(long, value_name = "MODE")]
    mode: Option<ProviderMode>,

    /// Number of tree levels to expand (1 = devices only)
    #[arg(long, default_value_t = 2)]
    depth: usize,

    /// Print the tree as JSON instead of an indented outline
    #[arg(long)]
    json: bool,

    /// Directory containing .tscope/config.toml (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Write the effective settings (file plus flags) back to the config file and exit
    #[arg(long)]
    save_config: bool,
}

/// JSON output envelope
#[derive(Serialize)]
struct Output<'a> {
    mode: ProviderMode,
    connected: bool,
    devices: &'a [TreeSnapshot],
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    tscope_core::logging::init()?;

    let base_path = args
        .config_dir
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    let mut settings = load_settings(&base_path);
    if let Some(address) = args.connect {
        settings.driver.address = address;
    }
    if let Some(mode) = args.mode {
        settings.view.mode = mode;
    }

    if args.save_config {
        save_settings(&base_path, &settings)?;
        println!("{}", config_path(&base_path).display());
        return Ok(());
    }

    let address = settings.driver.address.clone();
    let mode = settings.view.mode;

    // An unreachable driver is the "not attached" state: the root stays empty.
    let client = match DriverClient::connect_tcp(&address, settings.driver.timeout()).await {
        Ok(client) => client,
        Err(e) => {
            warn!("Driver not reachable at {}: {}", address, e);
            eprintln!("Driver not reachable at {}: {}", address, e);
            DriverClient::detached()
        }
    };

    let provider = DevicesProvider::new(
        Arc::new(client),
        mode,
        Resources::new(settings.resources.dir.clone()),
    );

    info!("Walking {} tree, depth {}", mode, args.depth);
    let snapshots = match walk(&provider, args.depth).await {
        Ok(snapshots) => snapshots,
        // The driver answered but could not list devices: report it, show an empty tree.
        Err(e) if e.is_recoverable() => {
            warn!("Device listing failed: {}", e);
            eprintln!("Device listing failed: {}", e.reason());
            Vec::new()
        }
        Err(e) => return Err(e.into()),
    };

    if args.json {
        let output = Output {
            mode,
            connected: provider.driver().connected(),
            devices: &snapshots,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if snapshots.is_empty() {
        eprintln!("No devices.");
    } else {
        print!("{}", render_text(&snapshots));
    }

    Ok(())
}
