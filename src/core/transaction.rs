// Building, signing and broadcasting transactions.
// A transfer moves TransactionBuilder -> SignedTransaction -> Receipt, and each
// step only produces the next one, so nothing unsigned can reach the wire.

use crate::core::receipt::Receipt;
use crate::crypto::{validate_identity, CryptoGateway};
use crate::error::{ConnectionError, TransactionError, ValidationError};
use crate::network::messages::{Digest, PublicKey, Transaction, BROADCAST_TRANSACTION};
use crate::network::{Connection, Packet};
use crate::query::{get_balance, get_tick};
use crate::wallet::Wallet;
use log::info;
use zerocopy::AsBytes;

/// Ticks between the current tick and the one a transaction is scheduled for
pub const DEFAULT_TICK_OFFSET: u32 = 5;

/// Which tick a transaction is scheduled for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickTarget {
    /// Current tick plus the offset, resolved just before signing
    Offset(u32),
    /// An absolute tick
    At(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionOptions {
    pub tick_offset: u32,
    /// Refuse to broadcast when the sender's balance cannot cover the amount
    pub check_balance: bool,
}

impl Default for TransactionOptions {
    fn default() -> Self {
        TransactionOptions {
            tick_offset: DEFAULT_TICK_OFFSET,
            check_balance: false,
        }
    }
}

/// Destination key of a contract: its index in the first four bytes
pub fn contract_public_key(contract_index: u32) -> PublicKey {
    let mut key = [0u8; 32];
    key[..4].copy_from_slice(&contract_index.to_le_bytes());
    key
}

/// A validated but unsigned transaction
#[derive(Debug, Clone)]
pub struct TransactionBuilder<'a> {
    wallet: &'a Wallet,
    destination: PublicKey,
    recipient: String,
    amount: i64,
    input_type: u16,
    input: Vec<u8>,
    target: TickTarget,
}

impl<'a> TransactionBuilder<'a> {
    /// Plain value transfer to a 60 character identity
    pub fn transfer(
        gateway: &dyn CryptoGateway,
        wallet: &'a Wallet,
        recipient: &str,
        amount: i64,
    ) -> Result<TransactionBuilder<'a>, ValidationError> {
        validate_identity(recipient)?;
        let destination = gateway
            .public_key_from_identity(recipient)
            .ok_or_else(|| ValidationError::InvalidIdentity(recipient.to_string()))?;
        TransactionBuilder::new(wallet, destination, recipient.to_string(), amount)
    }

    /// Procedure call on a contract; `input` follows the transaction body
    pub fn contract_call<T: AsBytes>(
        gateway: &dyn CryptoGateway,
        wallet: &'a Wallet,
        contract_index: u32,
        input_type: u16,
        input: &T,
        amount: i64,
    ) -> Result<TransactionBuilder<'a>, ValidationError> {
        let input = input.as_bytes();
        u16::try_from(input.len()).map_err(|_| ValidationError::InputSize(input.len()))?;

        let destination = contract_public_key(contract_index);
        let recipient = gateway.encode_identity(&destination, false);
        let mut builder = TransactionBuilder::new(wallet, destination, recipient, amount)?;
        builder.input_type = input_type;
        builder.input = input.to_vec();
        Ok(builder)
    }

    fn new(
        wallet: &'a Wallet,
        destination: PublicKey,
        recipient: String,
        amount: i64,
    ) -> Result<TransactionBuilder<'a>, ValidationError> {
        if amount < 0 {
            return Err(ValidationError::NegativeAmount(amount));
        }
        Ok(TransactionBuilder {
            wallet,
            destination,
            recipient,
            amount,
            input_type: 0,
            input: Vec::new(),
            target: TickTarget::Offset(DEFAULT_TICK_OFFSET),
        })
    }

    pub fn tick_offset(mut self, offset: u32) -> TransactionBuilder<'a> {
        self.target = TickTarget::Offset(offset);
        self
    }

    pub fn at_tick(mut self, tick: u32) -> TransactionBuilder<'a> {
        self.target = TickTarget::At(tick);
        self
    }

    pub fn target(&self) -> TickTarget {
        self.target
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    /// Resolve the tick to schedule for, asking the node if needed
    pub fn scheduled_tick(&self, connection: &Connection) -> Result<u32, ConnectionError> {
        match self.target {
            TickTarget::Offset(offset) => Ok(get_tick(connection)?.saturating_add(offset)),
            TickTarget::At(tick) => Ok(tick),
        }
    }

    /// Serialise for `tick`, digest the body, sign it and append the signature
    pub fn sign(self, gateway: &dyn CryptoGateway, tick: u32) -> SignedTransaction {
        let transaction = Transaction::new(
            *self.wallet.raw_public_key(),
            self.destination,
            self.amount,
            tick,
        )
        // input length was checked against u16 in contract_call
        .with_input(self.input_type, self.input.len() as u16);

        let mut bytes = Vec::with_capacity(transaction.as_bytes().len() + self.input.len() + 64);
        bytes.extend_from_slice(transaction.as_bytes());
        bytes.extend_from_slice(&self.input);

        let body_digest = gateway.digest32(&bytes);
        let signature = gateway.sign(
            self.wallet.subseed(),
            self.wallet.raw_public_key(),
            &body_digest,
        );
        bytes.extend_from_slice(&signature);

        // The transaction id covers the signature too
        let digest = gateway.digest32(&bytes);
        let hash = gateway.encode_identity(&digest, true);

        SignedTransaction {
            bytes,
            digest,
            hash,
            tick,
            sender: self.wallet.identity().to_string(),
            recipient: self.recipient,
            amount: self.amount,
        }
    }
}

/// Transaction body, input and signature, ready to broadcast
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    bytes: Vec<u8>,
    digest: Digest,
    hash: String,
    tick: u32,
    sender: String,
    recipient: String,
    amount: i64,
}

impl SignedTransaction {
    /// Signed bytes without the packet header
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn digest(&self) -> &Digest {
        &self.digest
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn tick(&self) -> u32 {
        self.tick
    }

    /// Broadcast packet: header with dejavu zero, then the signed bytes
    pub fn packet(&self) -> Result<Vec<u8>, ConnectionError> {
        Packet::broadcast(BROADCAST_TRANSACTION)
            .push_bytes(&self.bytes)
            .into_bytes()
    }

    /// Hand the packet to the transport. The receipt exists from here on.
    pub fn broadcast(self, connection: &Connection) -> Result<Receipt, TransactionError> {
        let packet = self.packet().map_err(TransactionError::SendFailed)?;
        connection
            .send(&packet)
            .map_err(TransactionError::SendFailed)?;

        info!(
            "Broadcast transaction {} of {} to {} for tick {}",
            self.hash, self.amount, self.recipient, self.tick
        );
        Ok(Receipt::new(
            self.sender,
            self.recipient,
            self.hash,
            self.digest,
            self.amount,
            self.tick,
        ))
    }
}

/// Transfer `amount` to `recipient`, scheduled `tick_offset` ticks ahead
pub fn broadcast_transaction(
    connection: &Connection,
    gateway: &dyn CryptoGateway,
    wallet: &Wallet,
    recipient: &str,
    amount: i64,
    tick_offset: u32,
) -> Result<Receipt, TransactionError> {
    let options = TransactionOptions {
        tick_offset,
        check_balance: false,
    };
    broadcast_transaction_with(connection, gateway, wallet, recipient, amount, &options)
}

pub fn broadcast_transaction_with(
    connection: &Connection,
    gateway: &dyn CryptoGateway,
    wallet: &Wallet,
    recipient: &str,
    amount: i64,
    options: &TransactionOptions,
) -> Result<Receipt, TransactionError> {
    let builder = TransactionBuilder::transfer(gateway, wallet, recipient, amount)?
        .tick_offset(options.tick_offset);

    if options.check_balance {
        let available = get_balance(connection, gateway, wallet.identity())?;
        if available < amount {
            return Err(TransactionError::InsufficientBalance {
                required: amount,
                available,
            });
        }
    }

    let tick = builder.scheduled_tick(connection)?;
    builder.sign(gateway, tick).broadcast(connection)
}
