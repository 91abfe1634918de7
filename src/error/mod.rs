//! Error handling for the wallet client
//!
//! Every fallible operation returns one of the typed errors below. None of
//! them are fatal: a bad seed, an unreachable node or a malformed reply are
//! all reported back to the caller with a message that can be shown as is.

use std::fmt;

/// Result type alias for the ambient layers (config, CLI, randomness)
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while talking to a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// The address string is not an IP address
    InvalidAddress(String),
    /// The TCP connection could not be established
    ConnectFailed { address: String, reason: String },
    /// Writing to the socket failed
    SendFailed(String),
    /// Reading from the socket failed
    ReceiveFailed(String),
    /// The node did not answer within the timeout
    NoResponse,
    /// The response did not contain a message of the requested type
    TypeNotFound(u8),
    /// A message of the requested type had an unexpected payload size
    SizeMismatch {
        message_type: u8,
        actual: usize,
        expected: usize,
    },
    /// A header declared a size that cannot be honoured
    MalformedResponse(String),
    /// Tick data arrived, but only for other ticks than the one requested
    TickMismatch { requested: u32, received: u32 },
    /// An identity could not be turned into a public key
    InvalidIdentity(String),
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionError::InvalidAddress(addr) => write!(f, "Invalid ip-address: {addr}"),
            ConnectionError::ConnectFailed { address, reason } => {
                write!(f, "Failed to connect with: {address} ({reason})")
            }
            ConnectionError::SendFailed(msg) => write!(f, "Failed to send: {msg}"),
            ConnectionError::ReceiveFailed(msg) => write!(f, "Failed to receive: {msg}"),
            ConnectionError::NoResponse => write!(f, "Connection failed to get a response"),
            ConnectionError::TypeNotFound(message_type) => {
                write!(f, "Response did not contain header type: {message_type}")
            }
            ConnectionError::SizeMismatch {
                message_type,
                actual,
                expected,
            } => write!(
                f,
                "Response of type {message_type} had the size: {actual} instead of expected size: {expected}"
            ),
            ConnectionError::MalformedResponse(msg) => write!(f, "Malformed response: {msg}"),
            ConnectionError::TickMismatch {
                requested,
                received,
            } => write!(
                f,
                "Requested data of tick {requested} but received tick {received}"
            ),
            ConnectionError::InvalidIdentity(identity) => {
                write!(f, "Failed to compute public key from identity: {identity}")
            }
        }
    }
}

impl std::error::Error for ConnectionError {}

/// Shape violations in caller supplied values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    SeedLength(usize),
    SeedCharacters,
    IdentityLength(usize),
    InvalidIdentity(String),
    NegativeAmount(i64),
    AssetNameLength(usize),
    UnitOfMeasurement(String),
    InvalidPrefix(String),
    /// Operation input block does not fit the 16-bit size field
    InputSize(usize),
    /// The crypto gateway rejected an input it should have accepted
    Crypto(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::SeedLength(_) => write!(f, "The seed length is invalid"),
            ValidationError::SeedCharacters => write!(f, "Seed contains invalid characters"),
            ValidationError::IdentityLength(len) => {
                write!(f, "Identity has an invalid length: {len}")
            }
            ValidationError::InvalidIdentity(identity) => {
                write!(f, "Failed to compute public key from identity: {identity}")
            }
            ValidationError::NegativeAmount(amount) => {
                write!(f, "Amount must not be negative: {amount}")
            }
            ValidationError::AssetNameLength(len) => {
                write!(f, "Asset name has an invalid length: {len}")
            }
            ValidationError::UnitOfMeasurement(unit) => {
                write!(f, "Unit of measurement is invalid: {unit}")
            }
            ValidationError::InvalidPrefix(prefix) => {
                write!(f, "Prefix must be at most 60 uppercase letters: {prefix}")
            }
            ValidationError::InputSize(len) => {
                write!(f, "Operation input of {len} bytes is too large")
            }
            ValidationError::Crypto(msg) => write!(f, "Cryptographic error: {msg}"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Errors raised while building or submitting a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    Connection(ConnectionError),
    Validation(ValidationError),
    InsufficientBalance { required: i64, available: i64 },
    /// The signed packet could not be handed to the transport
    SendFailed(ConnectionError),
}

impl fmt::Display for TransactionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionError::Connection(err) => write!(f, "{err}"),
            TransactionError::Validation(err) => write!(f, "{err}"),
            TransactionError::InsufficientBalance {
                required,
                available,
            } => write!(
                f,
                "Insufficient balance: required {required}, available {available}"
            ),
            TransactionError::SendFailed(err) => {
                write!(f, "Failed to send transaction to the network: {err}")
            }
        }
    }
}

impl std::error::Error for TransactionError {}

impl From<ConnectionError> for TransactionError {
    fn from(err: ConnectionError) -> Self {
        TransactionError::Connection(err)
    }
}

impl From<ValidationError> for TransactionError {
    fn from(err: ValidationError) -> Self {
        TransactionError::Validation(err)
    }
}

/// Crate level error used by configuration and the front end
#[derive(Debug, Clone)]
pub enum Error {
    Connection(ConnectionError),
    Validation(ValidationError),
    Transaction(TransactionError),
    /// Configuration errors
    Config(String),
    /// File I/O errors
    Io(String),
    /// Randomness or other primitive failures
    Crypto(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Connection(err) => write!(f, "Connection error: {err}"),
            Error::Validation(err) => write!(f, "Validation error: {err}"),
            Error::Transaction(err) => write!(f, "Transaction error: {err}"),
            Error::Config(msg) => write!(f, "Configuration error: {msg}"),
            Error::Io(msg) => write!(f, "I/O error: {msg}"),
            Error::Crypto(msg) => write!(f, "Cryptographic error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<ConnectionError> for Error {
    fn from(err: ConnectionError) -> Self {
        Error::Connection(err)
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Error::Validation(err)
    }
}

impl From<TransactionError> for Error {
    fn from(err: TransactionError) -> Self {
        Error::Transaction(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}
