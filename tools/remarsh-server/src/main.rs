// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 remarsh contributors

//! remarsh Echo Server
//!
//! Hosts the echo servant for conformance runs: activates the root
//! identity, binds it in the in-process name service, and serves until
//! interrupted.
//!
//! # Usage
//!
//! ```bash
//! # Start with the default binding name ("test")
//! remarsh-server
//!
//! # Custom binding name and config
//! remarsh-server --name conformance --config server.json
//! ```

use clap::Parser;
use remarsh::{
    dispatch_guarded, EchoService, InProcessNameService, NameService, ObjectRegistry, Request,
    Servant, Value,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

mod config;

pub use config::ServerConfig;

/// remarsh Echo Server - Hosts the round-trip conformance servant
#[derive(Parser, Debug)]
#[command(name = "remarsh-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Name to bind the root servant under
    #[arg(short, long)]
    name: Option<String>,

    /// Configuration file (JSON format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip the startup operation self-check
    #[arg(long, default_value = "false")]
    no_self_check: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = if let Some(config_path) = args.config {
        info!("Loading config from {:?}", config_path);
        ServerConfig::from_file(&config_path)?
    } else {
        ServerConfig::default()
    };
    if let Some(name) = args.name {
        config.root_name = name;
    }
    if args.no_self_check {
        config.self_check = false;
    }
    config.validate()?;

    let registry = ObjectRegistry::new();
    let root = Arc::new(EchoService::new(registry.clone()));
    let root_ref = registry.activate(root.clone())?;

    let naming = InProcessNameService::new();
    // A failed bind is fatal; the harness cannot find the servant
    // without it.
    if let Err(err) = naming.rebind(&config.root_name, root_ref) {
        error!("failed to bind \"{}\": {}", config.root_name, err);
        std::process::exit(1);
    }

    info!(
        "remarsh echo server v{} serving \"{}\" as {}",
        env!("CARGO_PKG_VERSION"),
        config.root_name,
        root_ref.id()
    );

    if config.self_check {
        self_check(root.as_ref())?;
    }

    let running = Arc::new(AtomicBool::new(true));
    let flag = running.clone();
    ctrlc::set_handler(move || {
        flag.store(false, Ordering::SeqCst);
    })?;

    let poll = Duration::from_millis(config.poll_interval_ms);
    while running.load(Ordering::SeqCst) {
        std::thread::sleep(poll);
    }

    info!("Shutdown signal received, stopping server");
    registry.close();
    info!("Echo server stopped ({} identities active)", registry.len());
    Ok(())
}

/// Exercise a few operations through the dispatch boundary so a broken
/// deployment fails at startup instead of mid-run.
fn self_check(root: &dyn Servant) -> Result<(), Box<dyn std::error::Error>> {
    let checks: [(&str, Vec<Value>); 3] = [
        ("echo_long", vec![Value::Long(13)]),
        ("echo_text", vec![Value::wide_text("self-check")]),
        ("wrap_aliased_long", vec![Value::Long(47)]),
    ];
    for (operation, sample_args) in checks {
        let request = Request::new(operation, sample_args);
        if let Err(err) = dispatch_guarded(root, &request) {
            error!("self-check operation {} failed: {}", operation, err);
            return Err(Box::new(err));
        }
    }
    info!("operation self-check passed");
    Ok(())
}
