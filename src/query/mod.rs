//! Read-only queries against a node
//!
//! Each query sends one request tagged with a fresh dejavu and extracts the
//! typed reply from whatever the node sends back. Transport and codec errors
//! are passed through unchanged.

pub mod entity;
pub mod system;
pub mod tick;

pub use entity::{get_balance, get_entity, get_entity_by_public_key};
pub use system::get_system_info;
pub use tick::{
    contains_transaction, get_current_tick_info, get_epoch, get_initial_tick,
    get_number_of_aligned_votes, get_number_of_misaligned_votes, get_tick, get_tick_data,
    get_tick_duration,
};
