//! Omok command-line entry point
//!
//! Runs the match relay, an AI self-play game, or an AI bot that joins a relay.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use omok::cli::{Cli, Command};
use omok::game::{self_play, FormattedClock, GameStatus};
use omok::net::{run_bot, Connection, InMemoryAccounts, MatchCoordinator, RelayServer};
use omok::{OmokConfig, Stone};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = OmokConfig::load_or_default(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Command::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server().host().clone());
            let port = port.unwrap_or(*config.server().port());
            let addr = format!("{}:{}", host, port);

            let server = Arc::new(RelayServer::new(
                Arc::new(MatchCoordinator::new()),
                Arc::new(InMemoryAccounts::new()),
            ));
            info!(%addr, "starting relay");
            server.bind_and_serve(&addr).await.context("relay server failed")?;
        }

        Command::Selfplay {
            depth,
            max_moves,
            seed,
        } => {
            let config = match depth {
                Some(depth) => config.with_depth(depth),
                None => config,
            };
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };

            let (session, report) =
                tokio::task::spawn_blocking(move || self_play(&config, max_moves, &mut rng)).await?;

            println!("{}", session.board());
            println!("moves: {}  nodes: {}", report.moves.len(), report.nodes);
            println!(
                "clocks: black {}  white {}",
                FormattedClock(session.remaining(Stone::Black)),
                FormattedClock(session.remaining(Stone::White))
            );
            match report.status {
                GameStatus::Won { winner, line } => {
                    let line: Vec<String> = line.iter().map(ToString::to_string).collect();
                    println!("{:?} wins with {}", winner, line.join(" "));
                }
                GameStatus::Draw => println!("draw"),
                GameStatus::Resigned { loser } => println!("{:?} resigned", loser),
                other => println!("stopped: {:?}", other),
            }
        }

        Command::Bot {
            server,
            email,
            depth,
        } => {
            let config = match depth {
                Some(depth) => config.with_depth(depth),
                None => config,
            };
            let addr = server.unwrap_or_else(|| config.server().addr());
            let conn = Connection::connect(&addr)
                .await
                .with_context(|| format!("connecting to {}", addr))?;
            let status = run_bot(conn, &email, &config).await?;
            println!("{:?}", status);
        }
    }

    Ok(())
}
