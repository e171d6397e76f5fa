//! DeltaDAV command-line tool
//!
//! Runs DeltaV reports against a repository fixture and prints the
//! resulting multi-status document.

mod fixture;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use deltadav_core::{QualifiedName, VersionStore};
use deltadav_webdav::{
    Config, DefaultLockEntry, Depth, LockScope, LockType, Report, ReportInfo,
    SessionScopedLockEntry, SupportedLock, VersionTreeReport,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::fixture::Fixture;

#[derive(Parser, Debug)]
#[command(name = "deltadav")]
#[command(author = "DeltaDAV Contributors")]
#[command(version = "0.1.0")]
#[command(about = "DeltaV version reporting over a repository fixture")]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a DAV:version-tree report
    Report {
        /// Repository fixture (JSON)
        #[arg(short, long)]
        fixture: PathBuf,

        /// Target resource
        #[arg(long)]
        href: String,

        /// Depth: 0, 1, ... or infinity (defaults to the configured depth)
        #[arg(short, long)]
        depth: Option<String>,

        /// Requested property, `{namespace}name` or a bare DAV: name
        #[arg(short, long = "prop")]
        props: Vec<String>,

        /// REPORT request body; replaces --prop
        #[arg(short, long)]
        body: Option<PathBuf>,

        /// Configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the DAV:supportedlock advertisement
    SupportedLock,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config is loaded before the subscriber; it can turn on debug logging
    let config = match &cli.command {
        Commands::Report { config: Some(path), .. } => Config::load(path)?,
        _ => Config::default(),
    };

    let env_filter = if debug_enabled(cli.debug, &config) {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::INFO.into())
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();

    match cli.command {
        Commands::Report { fixture, href, depth, props, body, .. } => {
            let depth = Depth::from_header(depth.as_deref(), config.default_depth)?;

            let info = match body {
                Some(path) => {
                    let text = std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read request body {:?}", path))?;
                    ReportInfo::from_xml(&text, depth)?
                }
                None => {
                    let mut info = ReportInfo::version_tree(depth);
                    for prop in &props {
                        let name = QualifiedName::parse(prop)
                            .with_context(|| format!("Invalid property name: {}", prop))?;
                        info.add_property(name);
                    }
                    info
                }
            };

            info!("Loading fixture {:?}", fixture);
            let store: Arc<dyn VersionStore> =
                Arc::new(Fixture::load(&fixture)?.into_store().await?);
            let resource = store.resource(&href).await?;

            let mut report = VersionTreeReport::with_config(store, config);
            report.set_resource(resource)?;
            report.set_info(info)?;

            // Abort the traversal on Ctrl-C
            let cancel = CancellationToken::new();
            let trigger = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    trigger.cancel();
                }
            });

            let xml = report.to_xml(&cancel).await?;
            println!("{}", xml);
        }

        Commands::SupportedLock => {
            let supported = SupportedLock::new()
                .with_entry(&DefaultLockEntry::new(LockScope::Exclusive, LockType::Write))
                .with_entry(&SessionScopedLockEntry);
            let prop = supported.to_property()?;
            println!("{}", prop.value.unwrap_or_default());
        }
    }

    Ok(())
}

/// Debug logging is on if either the flag or the configuration asks for it
fn debug_enabled(flag: bool, config: &Config) -> bool {
    flag || config.debug
}
