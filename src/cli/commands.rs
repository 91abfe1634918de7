use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "qwallet", about = "Diagnostic client for a ledger node")]
pub struct Opt {
    #[arg(long, global = true, help = "Node ip-address (defaults to the config)")]
    pub address: Option<String>,
    #[arg(long, global = true, help = "Node port (defaults to the config)")]
    pub port: Option<u16>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(name = "tick", about = "Print the node's current tick info")]
    Tick,
    #[command(name = "system-info", about = "Print the node's system info")]
    SystemInfo,
    #[command(name = "tick-data", about = "Print the transaction digests of a tick")]
    TickData {
        #[arg(help = "Tick number")]
        tick: u32,
    },
    #[command(name = "entity", about = "Print the entity of a public key")]
    Entity {
        #[arg(long = "public-key", help = "Public key as 64 hex characters")]
        public_key: String,
    },
    #[command(name = "airdrop-fees", about = "Print the airdrop contract fees")]
    AirdropFees,
    #[command(name = "check-address", about = "Check an ip-address is well formed")]
    CheckAddress {
        #[arg(help = "The ip-address")]
        address: String,
    },
}
