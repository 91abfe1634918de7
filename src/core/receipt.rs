use crate::network::messages::Digest;
use serde::Serialize;
use std::fmt;

/// Where a broadcast transaction stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Confirming,
    Success,
    Failed,
}

impl Status {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Status::Confirming)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Confirming => write!(f, "confirming"),
            Status::Success => write!(f, "success"),
            Status::Failed => write!(f, "failed"),
        }
    }
}

/// Record of one transaction handed to the network.
///
/// Created in `Confirming`. Only the confirmation tracker moves it to a
/// terminal status, and a terminal receipt never changes again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    sender: String,
    recipient: String,
    hash: String,
    #[serde(skip)]
    digest: Digest,
    amount: i64,
    tick: u32,
    status: Status,
}

impl Receipt {
    pub(crate) fn new(
        sender: String,
        recipient: String,
        hash: String,
        digest: Digest,
        amount: i64,
        tick: u32,
    ) -> Receipt {
        Receipt {
            sender,
            recipient,
            hash,
            digest,
            amount,
            tick,
            status: Status::Confirming,
        }
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    /// Lowercase identity encoding of the signed transaction digest
    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn digest(&self) -> &Digest {
        &self.digest
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// Tick the transaction was scheduled for
    pub fn tick(&self) -> u32 {
        self.tick
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_pending(&self) -> bool {
        self.status == Status::Confirming
    }

    /// Move a confirming receipt to `status`. Returns false and leaves the
    /// receipt untouched if it is already terminal.
    pub(crate) fn resolve(&mut self, status: Status) -> bool {
        if self.status.is_terminal() || !status.is_terminal() {
            return false;
        }
        self.status = status;
        true
    }
}
