//! # qwallet - light client for a tick based ledger
//!
//! Talks to one node over TCP with the node's binary wire protocol. It can
//! query ticks, entities and system info, sign and broadcast transfers and
//! contract calls, follow broadcast transactions until they land in a tick,
//! and brute force vanity identities.
//!
//! ## Layout
//! - `network/`: the TCP connection, packet framing and the wire payloads
//! - `crypto/`: the `CryptoGateway` trait plus seed and identity checks
//! - `wallet/`: keys derived from a seed
//! - `query/`: tick, entity and system info requests
//! - `core/`: transactions, receipts, confirmation tracking, airdrop calls
//! - `search/`: parallel vanity identity search
//! - `config/`, `cli/`, `utils/`, `error/`: the supporting pieces
//!
//! The key derivation, signature and hash primitives are not part of this
//! crate. Callers plug them in by implementing `CryptoGateway`.

pub mod cli;
pub mod config;
pub mod core;
pub mod crypto;
pub mod error;
pub mod network;
pub mod query;
pub mod search;
pub mod utils;
pub mod wallet;

#[cfg(test)]
pub mod testnet;

// Re-export commonly used types for convenience
pub use cli::{Command, Opt};
pub use config::{Config, Settings, GLOBAL_CONFIG};
pub use crate::core::{
    broadcast_transaction, broadcast_transaction_with, distribute_token,
    distribute_token_at_tick, get_airdrop_fees, start_airdrop, transfer_token, AirdropAsset,
    ConfirmationTracker, ContractCallResult, PollOutcome, Receipt, SignedTransaction, Status,
    TickTarget, TransactionBuilder, TransactionOptions, DEFAULT_TICK_OFFSET,
};
pub use crypto::{is_valid_seed, validate_identity, validate_seed, CryptoGateway};
pub use error::{ConnectionError, Error, Result, TransactionError, ValidationError};
pub use network::{is_valid_ip, Connection, ConnectionPtr, Digest, PublicKey};
pub use query::{
    contains_transaction, get_balance, get_current_tick_info, get_entity,
    get_entity_by_public_key, get_epoch, get_initial_tick, get_number_of_aligned_votes,
    get_number_of_misaligned_votes, get_system_info, get_tick, get_tick_data, get_tick_duration,
};
pub use search::{search_prefix, BruteForceJob};
pub use utils::{to_comma_separated, CancellationToken};
pub use wallet::Wallet;
