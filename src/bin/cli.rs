//! hashdex CLI Client
//!
//! Command-line interface for interacting with a hashdex server. Hashes are
//! given and printed as hex, the form they appear in asset tooling; on the
//! wire they travel in decimal, but that is the client's concern.

use clap::{Parser, Subcommand};

use hashdex::network::Client;
use hashdex::{Result, StoreError};

/// hashdex CLI
#[derive(Parser, Debug)]
#[command(name = "hashdex-cli")]
#[command(about = "CLI for the hashdex hash-reversal store")]
#[command(version)]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:50051")]
    server: String,

    /// Request timeout in milliseconds
    #[arg(long, default_value = "5000")]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Look up the string a hash reverses to
    Get {
        /// The hash, in hex (with or without a 0x prefix)
        hash: String,

        /// Hashtable to query
        #[arg(short, long, default_value = "game")]
        table: String,
    },

    /// Hash a string and store the mapping
    Add {
        /// The string to hash and store
        value: String,

        /// Hashtable to store into
        #[arg(short, long, default_value = "game")]
        table: String,
    },

    /// Drop every table's in-memory contents on the server
    Unload,

    /// Eagerly load every table on the server
    Load,

    /// Ping the server
    Ping,
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut client = Client::connect(&args.server)?;
    client.set_timeout(args.timeout_ms)?;

    match args.command {
        Commands::Get { hash, table } => {
            let hash = parse_hex_hash(&hash)?;
            let value = client.get_string(&table, hash)?;
            println!("{}", value);
        }
        Commands::Add { value, table } => {
            let result = client.add_hash(&table, &value)?;
            println!("{:x} {}", result.hash, result.outcome);
            if !result.durable {
                eprintln!(
                    "warning: mapping is live in memory but was not persisted; \
                     re-running the add retries the append"
                );
                std::process::exit(1);
            }
        }
        Commands::Unload => {
            client.unload_hashes()?;
            println!("OK");
        }
        Commands::Load => {
            let summary = client.load_hashes()?;
            println!("{}", summary);
        }
        Commands::Ping => {
            client.ping()?;
            println!("PONG");
        }
    }

    Ok(())
}

/// Parse a hex hash as asset tooling writes it, e.g. "19c59f42a9fee0e8"
/// or "0x19c59f42a9fee0e8"
fn parse_hex_hash(text: &str) -> Result<u64> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    u64::from_str_radix(digits, 16)
        .map_err(|_| StoreError::InvalidValue(format!("'{}' is not a hex hash", text)))
}
