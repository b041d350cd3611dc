use clap::{Parser, Subcommand};
use color_print::cformat;
use dining_ring::{collective, log, topology, transport, Config, Philosopher, Result, Table};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "dining-ring", about = "Dining philosophers over message passing")]
struct Cli {
    /// TOML file with run settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a whole ring inside this process
    Simulate {
        #[arg(short = 'n', long)]
        philosophers: Option<usize>,
    },
    /// Run one philosopher of a ring spread over several processes
    Node {
        #[arg(long)]
        rank: usize,
        /// Listen addresses of every rank, in rank order
        #[arg(long, value_delimiter = ',', required = true)]
        peers: Vec<String>,
        /// Requested ring size (defaults to the number of peers)
        #[arg(short = 'n', long)]
        philosophers: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    log::init();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error(&format!("{e}"));
            if e.is_configuration() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

/// Ring size a node asks for: `-n` wins, then the config file, then the
/// number of peers given on the command line.
fn requested_philosophers(flag: Option<usize>, file: Option<&Config>, peers: usize) -> usize {
    flag.or(file.map(|config| config.philosophers)).unwrap_or(peers)
}

async fn run(cli: Cli) -> Result<()> {
    let file = cli.config.as_deref().map(Config::load).transpose()?;
    let config = file.clone().unwrap_or_default();

    match cli.command {
        Command::Simulate { philosophers } => {
            let config = match philosophers {
                Some(n) => config.with_philosophers(n),
                None => config,
            };
            let deadlock = Table::dine(config).await?;
            println!("{}", report(deadlock));
        }
        Command::Node {
            rank,
            peers,
            philosophers,
        } => {
            let requested = requested_philosophers(philosophers, file.as_ref(), peers.len());
            let config = config.with_philosophers(requested);
            topology::validate(config.philosophers, peers.len())?;

            let mut endpoint = transport::tcp::connect(rank, &peers, &config).await?;
            collective::start_barrier(&mut endpoint).await?;
            log::info("Received starting flag.");

            let mut philosopher = Philosopher::new(endpoint, &config)?;
            let outcome = philosopher.run().await?;
            philosopher.into_endpoint().shutdown().await;

            if rank == collective::COORDINATOR {
                println!("{}", report(outcome.deadlock_detected));
            }
            println!("{}", serde_json::to_string(&outcome)?);
        }
    }

    Ok(())
}

fn report(deadlock: bool) -> String {
    if deadlock {
        cformat!("deadlock detected: <red, bold>true</red, bold>")
    } else {
        cformat!("deadlock detected: <green, bold>false</green, bold>")
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
