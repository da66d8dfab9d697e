//! clearanced - clearance zone service daemon
//!
//! This daemon:
//! 1. Serves the clearance analysis API (validation, detection, zone geometry)
//! 2. Delegates obstruction detection to the configured vision worker
//! 3. Relays bug reports to the configured mail endpoint

use anyhow::Result;
use clap::Parser;
use std::sync::mpsc;

use clearance_engine::{
    api::{ApiConfig, ApiServer},
    config::ClearancedConfig,
    detect::RemoteDetector,
    report::Mailer,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Listen address for the clearance API.
    #[arg(long)]
    addr: Option<String>,
    /// Vision worker endpoint for automatic obstruction detection.
    #[arg(long)]
    detection_url: Option<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = ClearancedConfig::load()?;
    if let Some(addr) = args.addr {
        config.api_addr = addr;
    }
    if let Some(url) = args.detection_url {
        config.detection_url = url;
    }

    let provider = RemoteDetector::new(&config.detection_url)?;
    let mailer = Mailer::new(config.mail.clone());
    let api_config = ApiConfig {
        addr: config.api_addr.clone(),
    };
    let api_handle = ApiServer::new(api_config, Box::new(provider), mailer).spawn()?;
    log::info!("clearance api listening on {}", api_handle.addr);
    log::info!("detection worker: {}", config.detection_url);
    log::info!("bug reports to: {}", config.mail.to);

    let (tx, rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = tx.send(());
    })
    .expect("error setting Ctrl-C handler");

    log::info!("clearanced waiting for shutdown signal (Ctrl-C)...");
    let _ = rx.recv();
    log::info!("shutdown signal received, stopping API server...");
    api_handle.stop()?;

    Ok(())
}
