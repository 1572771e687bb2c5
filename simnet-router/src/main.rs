//! simnet-router: forwarding-table and scheduler driver.
//!
//! Loads routes and packet batches from JSON files and prints routing
//! decisions, the sorted forwarding table, or the transmission order.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use simnet_router::config::{PacketsFile, RoutesFile};
use simnet_router::{Discipline, ForwardingTable, Packet, forward, schedule};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Simulated IP router
#[derive(Parser, Debug)]
#[command(name = "simnet-router", version, about)]
struct Args {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "simnet_router=info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the forwarding table, longest prefix first
    Table {
        /// Route file (JSON)
        #[arg(short, long)]
        routes: PathBuf,
    },
    /// Look up the output link for destination addresses
    Route {
        /// Route file (JSON)
        #[arg(short, long)]
        routes: PathBuf,

        /// Destination addresses
        #[arg(required = true)]
        addresses: Vec<String>,
    },
    /// Print the transmission order of a packet batch
    Schedule {
        /// Packet file (JSON), in arrival order
        #[arg(short, long)]
        packets: PathBuf,

        #[arg(short, long, value_enum, default_value_t = Discipline::Fifo)]
        discipline: Discipline,
    },
    /// Route a packet batch and print each link's queue
    Forward {
        /// Route file (JSON)
        #[arg(short, long)]
        routes: PathBuf,

        /// Packet file (JSON), in arrival order
        #[arg(short, long)]
        packets: PathBuf,

        #[arg(short, long, value_enum, default_value_t = Discipline::Priority)]
        discipline: Discipline,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match args.command {
        Command::Table { routes } => {
            let table = load_table(&routes)?;
            info!(entries = table.len(), "Loaded forwarding table");
            print!("{table}");
        }
        Command::Route { routes, addresses } => {
            let table = load_table(&routes)?;
            for addr in &addresses {
                let link = table
                    .route(addr)
                    .with_context(|| format!("Failed to route '{addr}'"))?;
                println!("{addr} -> {link}");
            }
        }
        Command::Schedule {
            packets,
            discipline,
        } => {
            let batch = load_packets(&packets)?;
            info!(packets = batch.len(), %discipline, "Scheduling batch");
            print_packets(&schedule(&batch, discipline));
        }
        Command::Forward {
            routes,
            packets,
            discipline,
        } => {
            let table = load_table(&routes)?;
            let batch = load_packets(&packets)?;
            for queue in forward(&table, &batch, discipline) {
                println!("{}:", queue.link);
                print_packets(&queue.packets);
            }
        }
    }

    Ok(())
}

fn load_table(path: &Path) -> Result<ForwardingTable> {
    let file = RoutesFile::load(path)?;
    file.build_table()
        .with_context(|| format!("Invalid route in {}", path.display()))
}

fn load_packets(path: &Path) -> Result<Vec<Packet>> {
    Ok(PacketsFile::load(path)?.packets)
}

fn print_packets(packets: &[Packet]) {
    for (i, packet) in packets.iter().enumerate() {
        println!(
            "  {:>3}. [{}] {} -> {}  {}",
            i + 1,
            packet.priority,
            packet.source,
            packet.destination,
            packet.payload
        );
    }
}
