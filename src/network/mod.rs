//! Node transport and wire protocol
//!
//! `connection` owns the TCP socket, `codec` frames and scans packets, and
//! `messages` holds the message type ids and fixed-layout payloads.

pub mod codec;
pub mod connection;
pub mod messages;

pub use codec::{
    find_payload, find_payload_where, random_dejavu, Packet, RequestResponseHeader, HEADER_SIZE,
    MAX_MESSAGE_SIZE,
};
pub use connection::{is_valid_ip, Connection, ConnectionPtr, DEFAULT_IO_TIMEOUT};
pub use messages::{
    CurrentTickInfo, Digest, Entity, PublicKey, RequestContractFunction, RequestedEntity,
    RequestedTickData, RespondedEntity, SystemInfo, TickData, Transaction,
};
