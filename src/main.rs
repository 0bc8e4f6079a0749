//! `vfs-shell` binary: an interactive prompt over an in-memory namespace.
//!
//! Usage:
//!   # Fresh, empty namespace
//!   cargo run
//!
//!   # Resume a saved session and save it again on exit
//!   cargo run -- --load session.json --save session.json

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anstyle::{AnsiColor, Style};
use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use vfs_shell::{Shell, TreeFS, session};

/// In-memory file system with a Unix-like shell.
#[derive(Parser, Debug)]
#[command(name = "vfs-shell")]
#[command(about = "In-memory file system with a Unix-like shell")]
struct Args {
    /// Session file to restore before the first prompt
    #[arg(short, long)]
    load: Option<PathBuf>,

    /// Session file to write when the shell exits
    #[arg(short, long)]
    save: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: tracing::Level,
}

const BANNER: &str = "In-Memory File System";

/// Prints `message`, styled only when stdout is a terminal.
fn say(message: &str, style: Style) {
    if io::stdout().is_terminal() {
        println!("{}{message}{}", style.render(), style.render_reset());
    } else {
        println!("{message}");
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr, stdout is the shell output
    let filter = EnvFilter::builder()
        .with_default_directive(args.log_level.into())
        .from_env_lossy();
    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();

    say(BANNER, Style::new().bold());
    println!();

    let vfs = match &args.load {
        Some(path) => {
            let vfs = session::load(path)?;
            say(
                "Loading the existing session.",
                AnsiColor::Green.on_default(),
            );
            vfs
        }
        None => {
            say("Creating a new session.", Style::new());
            TreeFS::new()
        }
    };

    let mut shell = Shell::new(vfs);
    shell.run(io::stdin().lock(), &mut io::stdout())?;

    if let Some(path) = &args.save {
        session::save(shell.vfs(), path)?;
        println!("Session saved to {}.", path.display());
    }
    Ok(())
}
