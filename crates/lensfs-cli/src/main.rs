//! lensfs CLI entry point.
//!
//! Usage:
//!   lensfs ls [VPATH]            # List a virtual directory
//!   lensfs tree [VPATH]          # Render the filtered tree
//!   lensfs stat VPATH            # Show metadata for a virtual path
//!   lensfs cat VPATH             # Print a file's contents
//!   lensfs add REAL_PATH         # Derive and store a filter from a real path
//!   lensfs rm FILTER             # Remove the literal filter string
//!   lensfs filters               # List active filters
//!   lensfs watch                 # Stream root changes until Ctrl-C
//!
//! The profile (filters + named roots) lives in a JSON file, by default at
//! `$XDG_CONFIG_HOME/lensfs/profile.json`.

use std::io::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use directories::BaseDirs;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use lensfs_core::{
    ChangeKind, ChannelObserver, EntryType, JsonFileStore, Lens, LensConfig, LensError,
    LocalFs, ViewEvent,
};

#[derive(Debug, Parser)]
#[command(name = "lensfs", version, about = "Filtered virtual view over real directory trees")]
struct Cli {
    /// Path to the profile JSON file.
    #[arg(long, global = true)]
    profile: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List a virtual directory.
    Ls {
        /// Virtual path (defaults to the synthetic root).
        #[arg(default_value = "/")]
        vpath: String,
    },
    /// Render the filtered tree below a virtual path.
    Tree {
        #[arg(default_value = "/")]
        vpath: String,
    },
    /// Show metadata for a virtual path.
    Stat { vpath: String },
    /// Print a virtual file's contents.
    Cat { vpath: String },
    /// Add a filter derived from a real path (file or directory).
    Add { real_path: String },
    /// Remove the exact filter string.
    Rm { filter: String },
    /// List the active filters.
    Filters,
    /// Watch the registered roots, printing virtual-path changes until Ctrl-C.
    Watch,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Respects RUST_LOG; silent by default.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let profile_path = match cli.profile {
        Some(path) => path,
        None => default_profile_path()?,
    };

    let store = Arc::new(JsonFileStore::new(&profile_path));
    let config = LensConfig {
        watch_roots: matches!(cli.command, Command::Watch),
    };
    let (observer, rx) = ChannelObserver::new();
    let mut lens = Lens::new(config, Arc::new(LocalFs::new()), store, observer);
    lens.start()
        .await
        .with_context(|| format!("loading profile from {}", profile_path.display()))?;

    match cli.command {
        Command::Ls { vpath } => ls(&mut lens, &vpath).await,
        Command::Tree { vpath } => tree(&mut lens, &vpath).await,
        Command::Stat { vpath } => stat(&lens, &vpath).await,
        Command::Cat { vpath } => cat(&lens, &vpath).await,
        Command::Add { real_path } => add(&mut lens, &real_path).await,
        Command::Rm { filter } => rm(&mut lens, &filter).await,
        Command::Filters => {
            for filter in lens.filters() {
                println!("{filter}");
            }
            Ok(())
        }
        Command::Watch => watch(&lens, rx).await,
    }
}

/// Drain change batches from the engine's observer until interrupted.
async fn watch(
    lens: &Lens,
    mut rx: tokio::sync::mpsc::UnboundedReceiver<ViewEvent>,
) -> Result<()> {
    if lens.roots().is_empty() {
        eprintln!("no roots registered; nothing to watch");
        return Ok(());
    }
    eprintln!("watching {} root(s); Ctrl-C to stop", lens.roots().len());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => return Ok(()),
            event = rx.recv() => match event {
                Some(ViewEvent::ViewChanged(batch)) => {
                    for change in batch {
                        let tag = match change.kind {
                            ChangeKind::Created => "created",
                            ChangeKind::Changed => "changed",
                            ChangeKind::Deleted => "deleted",
                        };
                        println!("{tag}  {}", change.path);
                    }
                }
                Some(_) => {}
                None => return Ok(()),
            },
        }
    }
}

/// `$XDG_CONFIG_HOME/lensfs/profile.json`, or a home-relative fallback.
fn default_profile_path() -> Result<PathBuf> {
    let base = BaseDirs::new().context("cannot determine home directory")?;
    Ok(base.config_dir().join("lensfs").join("profile.json"))
}

async fn ls(lens: &mut Lens, vpath: &str) -> Result<()> {
    let entries = lens.list_dir(vpath).await?;
    for entry in entries {
        match entry.entry_type {
            EntryType::Directory => println!("{}/", entry.name),
            EntryType::File => println!("{}", entry.name),
        }
    }
    Ok(())
}

async fn tree(lens: &mut Lens, vpath: &str) -> Result<()> {
    println!("{}", if vpath == "/" { "/" } else { vpath });
    render_subtree(lens, vpath, "").await
}

/// Depth-first render with the usual box-drawing connectors.
async fn render_subtree(lens: &mut Lens, vpath: &str, indent: &str) -> Result<()> {
    let entries = lens.list_dir(vpath).await?;
    let count = entries.len();

    for (i, entry) in entries.into_iter().enumerate() {
        let last = i + 1 == count;
        let connector = if last { "└── " } else { "├── " };
        let child = if vpath.trim_matches('/').is_empty() {
            format!("/{}", entry.name)
        } else {
            format!("{}/{}", vpath.trim_end_matches('/'), entry.name)
        };

        match entry.entry_type {
            EntryType::Directory => {
                println!("{indent}{connector}{}/", entry.name);
                let next_indent = format!("{indent}{}", if last { "    " } else { "│   " });
                Box::pin(render_subtree(lens, &child, &next_indent)).await?;
            }
            EntryType::File => println!("{indent}{connector}{}", entry.name),
        }
    }
    Ok(())
}

async fn stat(lens: &Lens, vpath: &str) -> Result<()> {
    let meta = lens.stat(vpath).await?;
    let kind = if meta.is_dir { "directory" } else { "file" };
    println!("path:     {vpath}");
    println!("kind:     {kind}");
    println!("size:     {}", meta.size);
    if let Some(modified) = meta.modified {
        println!("modified: {modified:?}");
    }
    if meta.read_only {
        println!("access:   read-only");
    }
    Ok(())
}

async fn cat(lens: &Lens, vpath: &str) -> Result<()> {
    let data = lens.read(vpath).await?;
    std::io::stdout().write_all(&data)?;
    Ok(())
}

async fn add(lens: &mut Lens, real_path: &str) -> Result<()> {
    match lens.add_prefix(real_path).await {
        Ok(filter) => {
            println!("added filter: {filter}");
            Ok(())
        }
        // User picked an unsupported target; report, don't propagate a fault.
        Err(LensError::UnsupportedSource(scheme)) => {
            eprintln!("only local file paths can be added (got scheme: {scheme})");
            Ok(())
        }
        Err(e) => bail!(e),
    }
}

async fn rm(lens: &mut Lens, filter: &str) -> Result<()> {
    let had = lens.filters().iter().any(|f| f == filter);
    lens.remove_prefix(filter).await?;
    if had {
        println!("removed filter: {filter}");
    } else {
        println!("no such filter: {filter}");
    }
    Ok(())
}
