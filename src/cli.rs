//! Command-line interface for the omok binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Omok - five-in-a-row engine and match relay
#[derive(Parser, Debug)]
#[command(name = "omok")]
#[command(about = "15x15 five-in-a-row engine with an alpha-beta AI and a match relay", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to $OMOK_CONFIG, then ./omok.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the match relay server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Let the AI play itself and print the final board
    Selfplay {
        /// Search depth below each root move
        #[arg(short, long)]
        depth: Option<u8>,

        /// Stop after this many stones
        #[arg(long, default_value = "225")]
        max_moves: usize,

        /// Seed for the starting coin flip
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Join matchmaking on a relay and play one game with the AI
    Bot {
        /// Relay address (host:port)
        #[arg(short, long)]
        server: Option<String>,

        /// Email to matchmake under
        #[arg(short, long)]
        email: String,

        /// Search depth below each root move
        #[arg(short, long)]
        depth: Option<u8>,
    },
}
