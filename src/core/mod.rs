//! Transaction engine
//!
//! Signing and broadcasting transfers, contract procedure calls, and the
//! tracker that moves broadcast receipts to their final status.

pub mod airdrop;
pub mod confirmation;
pub mod receipt;
pub mod transaction;

pub use airdrop::{
    distribute_token, distribute_token_at_tick, get_airdrop_fees, start_airdrop, transfer_token,
    AirdropAsset, ContractCallResult, FeesOutput, AIRDROP_CONTRACT_INDEX,
};
pub use confirmation::{ConfirmationTracker, PollOutcome, DEFAULT_POLL_INTERVAL};
pub use receipt::{Receipt, Status};
pub use transaction::{
    broadcast_transaction, broadcast_transaction_with, contract_public_key, SignedTransaction,
    TickTarget, TransactionBuilder, TransactionOptions, DEFAULT_TICK_OFFSET,
};
