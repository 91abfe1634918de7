//! Message types and fixed-layout payloads exchanged with a node
//!
//! All multi-byte integers are little-endian. The byte-order wrappers from
//! `zerocopy` have alignment 1, so `#[repr(C)]` here produces exactly the
//! packed layout the node writes.

use static_assertions::assert_eq_size;
use zerocopy::byteorder::{LittleEndian, I16, I32, I64, U16, U32};
use zerocopy::{AsBytes, FromBytes, FromZeroes};

pub const BROADCAST_FUTURE_TICK_DATA: u8 = 8;
pub const REQUEST_TICK_DATA: u8 = 16;
pub const BROADCAST_TRANSACTION: u8 = 24;
pub const REQUEST_CURRENT_TICK_INFO: u8 = 27;
pub const RESPOND_CURRENT_TICK_INFO: u8 = 28;
pub const REQUEST_ENTITY: u8 = 31;
pub const RESPOND_ENTITY: u8 = 32;
pub const END_RESPONSE: u8 = 35;
pub const REQUEST_CONTRACT_FUNCTION: u8 = 42;
pub const RESPOND_CONTRACT_FUNCTION: u8 = 43;
pub const REQUEST_SYSTEM_INFO: u8 = 46;
pub const RESPOND_SYSTEM_INFO: u8 = 47;

pub const PUBLIC_KEY_SIZE: usize = 32;
pub const DIGEST_SIZE: usize = 32;
pub const SIGNATURE_SIZE: usize = 64;
pub const SPECTRUM_DEPTH: usize = 24;
pub const NUMBER_OF_TRANSACTIONS_PER_TICK: usize = 1024;
pub const MAX_NUMBER_OF_CONTRACTS: usize = 1024;

pub type PublicKey = [u8; PUBLIC_KEY_SIZE];
pub type Digest = [u8; DIGEST_SIZE];

type Le16 = U16<LittleEndian>;
type LeI16 = I16<LittleEndian>;
type Le32 = U32<LittleEndian>;
type LeI32 = I32<LittleEndian>;
type LeI64 = I64<LittleEndian>;

/// Reply to `REQUEST_CURRENT_TICK_INFO`
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsBytes, FromBytes, FromZeroes)]
#[repr(C)]
pub struct CurrentTickInfo {
    tick_duration: Le16,
    epoch: Le16,
    tick: Le32,
    number_of_aligned_votes: Le16,
    number_of_misaligned_votes: Le16,
    initial_tick: Le32,
}

assert_eq_size!(CurrentTickInfo, [u8; 16]);

impl CurrentTickInfo {
    pub fn new(
        tick_duration: u16,
        epoch: u16,
        tick: u32,
        number_of_aligned_votes: u16,
        number_of_misaligned_votes: u16,
        initial_tick: u32,
    ) -> CurrentTickInfo {
        CurrentTickInfo {
            tick_duration: U16::new(tick_duration),
            epoch: U16::new(epoch),
            tick: U32::new(tick),
            number_of_aligned_votes: U16::new(number_of_aligned_votes),
            number_of_misaligned_votes: U16::new(number_of_misaligned_votes),
            initial_tick: U32::new(initial_tick),
        }
    }

    pub fn tick_duration(&self) -> u16 {
        self.tick_duration.get()
    }

    pub fn epoch(&self) -> u16 {
        self.epoch.get()
    }

    pub fn tick(&self) -> u32 {
        self.tick.get()
    }

    pub fn number_of_aligned_votes(&self) -> u16 {
        self.number_of_aligned_votes.get()
    }

    pub fn number_of_misaligned_votes(&self) -> u16 {
        self.number_of_misaligned_votes.get()
    }

    pub fn initial_tick(&self) -> u32 {
        self.initial_tick.get()
    }
}

/// Payload of `REQUEST_ENTITY`
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsBytes, FromBytes, FromZeroes)]
#[repr(C)]
pub struct RequestedEntity {
    pub public_key: PublicKey,
}

assert_eq_size!(RequestedEntity, [u8; 32]);

/// Balance sheet of one public key
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsBytes, FromBytes, FromZeroes)]
#[repr(C)]
pub struct Entity {
    public_key: PublicKey,
    incoming_amount: LeI64,
    outgoing_amount: LeI64,
    number_of_incoming_transfers: Le32,
    number_of_outgoing_transfers: Le32,
    latest_incoming_transfer_tick: Le32,
    latest_outgoing_transfer_tick: Le32,
}

assert_eq_size!(Entity, [u8; 64]);

impl Entity {
    pub fn new(public_key: PublicKey, incoming_amount: i64, outgoing_amount: i64) -> Entity {
        Entity {
            public_key,
            incoming_amount: I64::new(incoming_amount),
            outgoing_amount: I64::new(outgoing_amount),
            number_of_incoming_transfers: U32::new(0),
            number_of_outgoing_transfers: U32::new(0),
            latest_incoming_transfer_tick: U32::new(0),
            latest_outgoing_transfer_tick: U32::new(0),
        }
    }

    pub fn with_transfers(
        mut self,
        incoming: u32,
        outgoing: u32,
        latest_incoming_tick: u32,
        latest_outgoing_tick: u32,
    ) -> Entity {
        self.number_of_incoming_transfers = U32::new(incoming);
        self.number_of_outgoing_transfers = U32::new(outgoing);
        self.latest_incoming_transfer_tick = U32::new(latest_incoming_tick);
        self.latest_outgoing_transfer_tick = U32::new(latest_outgoing_tick);
        self
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn incoming_amount(&self) -> i64 {
        self.incoming_amount.get()
    }

    pub fn outgoing_amount(&self) -> i64 {
        self.outgoing_amount.get()
    }

    /// Incoming minus outgoing
    pub fn balance(&self) -> i64 {
        self.incoming_amount().wrapping_sub(self.outgoing_amount())
    }

    pub fn number_of_incoming_transfers(&self) -> u32 {
        self.number_of_incoming_transfers.get()
    }

    pub fn number_of_outgoing_transfers(&self) -> u32 {
        self.number_of_outgoing_transfers.get()
    }

    pub fn latest_incoming_transfer_tick(&self) -> u32 {
        self.latest_incoming_transfer_tick.get()
    }

    pub fn latest_outgoing_transfer_tick(&self) -> u32 {
        self.latest_outgoing_transfer_tick.get()
    }
}

/// Reply to `REQUEST_ENTITY`: the entity plus its spectrum proof
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsBytes, FromBytes, FromZeroes)]
#[repr(C)]
pub struct RespondedEntity {
    pub entity: Entity,
    tick: Le32,
    spectrum_index: LeI32,
    pub siblings: [Digest; SPECTRUM_DEPTH],
}

assert_eq_size!(RespondedEntity, [u8; 840]);

impl RespondedEntity {
    pub fn new(entity: Entity, tick: u32, spectrum_index: i32) -> RespondedEntity {
        RespondedEntity {
            entity,
            tick: U32::new(tick),
            spectrum_index: I32::new(spectrum_index),
            siblings: [[0; DIGEST_SIZE]; SPECTRUM_DEPTH],
        }
    }

    pub fn tick(&self) -> u32 {
        self.tick.get()
    }

    /// Negative when the key is not in the spectrum
    pub fn spectrum_index(&self) -> i32 {
        self.spectrum_index.get()
    }
}

/// Payload of `REQUEST_TICK_DATA`
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsBytes, FromBytes, FromZeroes)]
#[repr(C)]
pub struct RequestedTickData {
    tick: Le32,
}

assert_eq_size!(RequestedTickData, [u8; 4]);

impl RequestedTickData {
    pub fn new(tick: u32) -> RequestedTickData {
        RequestedTickData { tick: U32::new(tick) }
    }

    pub fn tick(&self) -> u32 {
        self.tick.get()
    }
}

/// Contents of one tick as broadcast by its computor.
///
/// About 40 KiB; keep it boxed when it has to move around.
#[derive(Clone, PartialEq, Eq, AsBytes, FromBytes, FromZeroes)]
#[repr(C)]
pub struct TickData {
    computor_index: Le16,
    epoch: Le16,
    tick: Le32,
    millisecond: Le16,
    pub second: u8,
    pub minute: u8,
    pub hour: u8,
    pub day: u8,
    pub month: u8,
    pub year: u8,
    pub timelock: Digest,
    pub transaction_digests: [Digest; NUMBER_OF_TRANSACTIONS_PER_TICK],
    pub contract_fees: [LeI64; MAX_NUMBER_OF_CONTRACTS],
    pub signature: [u8; SIGNATURE_SIZE],
}

assert_eq_size!(TickData, [u8; 41072]);

impl TickData {
    pub fn computor_index(&self) -> u16 {
        self.computor_index.get()
    }

    pub fn epoch(&self) -> u16 {
        self.epoch.get()
    }

    pub fn tick(&self) -> u32 {
        self.tick.get()
    }

    pub fn set_tick(&mut self, tick: u32) {
        self.tick = U32::new(tick);
    }

    pub fn millisecond(&self) -> u16 {
        self.millisecond.get()
    }

    /// Digests up to the first all-zero slot
    pub fn digests(&self) -> impl Iterator<Item = &Digest> {
        self.transaction_digests
            .iter()
            .take_while(|digest| digest.iter().any(|&b| b != 0))
    }

    pub fn contract_fee(&self, contract_index: usize) -> Option<i64> {
        self.contract_fees.get(contract_index).map(|fee| fee.get())
    }
}

impl std::fmt::Debug for TickData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickData")
            .field("computor_index", &self.computor_index())
            .field("epoch", &self.epoch())
            .field("tick", &self.tick())
            .field("transactions", &self.digests().count())
            .finish()
    }
}

/// Reply to `REQUEST_SYSTEM_INFO`
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsBytes, FromBytes, FromZeroes)]
#[repr(C)]
pub struct SystemInfo {
    version: LeI16,
    epoch: Le16,
    tick: Le32,
    initial_tick: Le32,
    latest_created_tick: Le32,
    initial_millisecond: Le16,
    pub initial_second: u8,
    pub initial_minute: u8,
    pub initial_hour: u8,
    pub initial_day: u8,
    pub initial_month: u8,
    pub initial_year: u8,
    number_of_entities: Le32,
    number_of_transactions: Le32,
    pub random_mining_seed: Digest,
    solution_threshold: LeI32,
}

assert_eq_size!(SystemInfo, [u8; 68]);

impl SystemInfo {
    pub fn new(version: i16, epoch: u16, tick: u32, initial_tick: u32) -> SystemInfo {
        let mut info = SystemInfo::new_zeroed();
        info.version = I16::new(version);
        info.epoch = U16::new(epoch);
        info.tick = U32::new(tick);
        info.initial_tick = U32::new(initial_tick);
        info
    }

    pub fn version(&self) -> i16 {
        self.version.get()
    }

    pub fn epoch(&self) -> u16 {
        self.epoch.get()
    }

    pub fn tick(&self) -> u32 {
        self.tick.get()
    }

    pub fn initial_tick(&self) -> u32 {
        self.initial_tick.get()
    }

    pub fn latest_created_tick(&self) -> u32 {
        self.latest_created_tick.get()
    }

    pub fn initial_millisecond(&self) -> u16 {
        self.initial_millisecond.get()
    }

    pub fn number_of_entities(&self) -> u32 {
        self.number_of_entities.get()
    }

    pub fn number_of_transactions(&self) -> u32 {
        self.number_of_transactions.get()
    }

    pub fn solution_threshold(&self) -> i32 {
        self.solution_threshold.get()
    }
}

/// Transfer body; optional operation input and the 64 byte signature follow it
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsBytes, FromBytes, FromZeroes)]
#[repr(C)]
pub struct Transaction {
    pub source_public_key: PublicKey,
    pub destination_public_key: PublicKey,
    amount: LeI64,
    tick: Le32,
    input_type: Le16,
    input_size: Le16,
}

assert_eq_size!(Transaction, [u8; 80]);

impl Transaction {
    pub fn new(
        source_public_key: PublicKey,
        destination_public_key: PublicKey,
        amount: i64,
        tick: u32,
    ) -> Transaction {
        Transaction {
            source_public_key,
            destination_public_key,
            amount: I64::new(amount),
            tick: U32::new(tick),
            input_type: U16::new(0),
            input_size: U16::new(0),
        }
    }

    pub fn with_input(mut self, input_type: u16, input_size: u16) -> Transaction {
        self.input_type = U16::new(input_type);
        self.input_size = U16::new(input_size);
        self
    }

    pub fn amount(&self) -> i64 {
        self.amount.get()
    }

    pub fn tick(&self) -> u32 {
        self.tick.get()
    }

    pub fn input_type(&self) -> u16 {
        self.input_type.get()
    }

    pub fn input_size(&self) -> u16 {
        self.input_size.get()
    }
}

/// Payload of `REQUEST_CONTRACT_FUNCTION`; the input block follows it
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsBytes, FromBytes, FromZeroes)]
#[repr(C)]
pub struct RequestContractFunction {
    contract_index: Le32,
    input_type: Le16,
    input_size: Le16,
}

assert_eq_size!(RequestContractFunction, [u8; 8]);

impl RequestContractFunction {
    pub fn new(contract_index: u32, input_type: u16, input_size: u16) -> RequestContractFunction {
        RequestContractFunction {
            contract_index: U32::new(contract_index),
            input_type: U16::new(input_type),
            input_size: U16::new(input_size),
        }
    }

    pub fn contract_index(&self) -> u32 {
        self.contract_index.get()
    }

    pub fn input_type(&self) -> u16 {
        self.input_type.get()
    }

    pub fn input_size(&self) -> u16 {
        self.input_size.get()
    }
}
