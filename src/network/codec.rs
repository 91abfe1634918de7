//! Packet framing for the node protocol.
//!
//! Every message starts with an 8 byte header: a 24-bit little-endian size
//! that covers the whole message (header and signature included), a one
//! byte message type and a 32-bit "dejavu" correlation tag. A single
//! receive may carry several messages back to back, so extracting a reply
//! means walking the buffer header by header.

use crate::error::ConnectionError;
use log::debug;
use rand::Rng;
use static_assertions::assert_eq_size;
use zerocopy::byteorder::{LittleEndian, U32};
use zerocopy::{AsBytes, FromBytes, FromZeroes};

/// Size of the packet header in bytes
pub const HEADER_SIZE: usize = 8;

/// Largest size the 24-bit size field can express
pub const MAX_MESSAGE_SIZE: usize = 0x00FF_FFFF;

/// The header that prefixes every request and response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsBytes, FromBytes, FromZeroes)]
#[repr(C)]
pub struct RequestResponseHeader {
    size: [u8; 3],
    message_type: u8,
    dejavu: U32<LittleEndian>,
}

assert_eq_size!(RequestResponseHeader, [u8; HEADER_SIZE]);

impl RequestResponseHeader {
    pub fn new(message_type: u8, size: usize, dejavu: u32) -> RequestResponseHeader {
        let mut header = RequestResponseHeader {
            size: [0; 3],
            message_type,
            dejavu: U32::new(dejavu),
        };
        header.set_size(size);
        header
    }

    /// Read a header from the start of `bytes`
    pub fn parse(bytes: &[u8]) -> Option<RequestResponseHeader> {
        RequestResponseHeader::read_from_prefix(bytes)
    }

    pub fn size(&self) -> usize {
        (self.size[0] as usize) | ((self.size[1] as usize) << 8) | ((self.size[2] as usize) << 16)
    }

    /// Only the low 24 bits are kept
    pub fn set_size(&mut self, size: usize) {
        self.size = [
            (size & 0xFF) as u8,
            ((size >> 8) & 0xFF) as u8,
            ((size >> 16) & 0xFF) as u8,
        ];
    }

    pub fn message_type(&self) -> u8 {
        self.message_type
    }

    pub fn dejavu(&self) -> u32 {
        self.dejavu.get()
    }

    pub fn set_dejavu(&mut self, dejavu: u32) {
        self.dejavu = U32::new(dejavu);
    }

    pub fn randomize_dejavu(&mut self) {
        self.set_dejavu(random_dejavu());
    }

    pub fn is_dejavu_zero(&self) -> bool {
        self.dejavu() == 0
    }

    pub fn payload_size(&self) -> usize {
        self.size().saturating_sub(HEADER_SIZE)
    }

    pub fn check_payload_size(&self, expected: usize) -> bool {
        self.size() == expected + HEADER_SIZE
    }
}

/// Random non-zero correlation tag for query packets
pub fn random_dejavu() -> u32 {
    let mut rng = rand::thread_rng();
    loop {
        let value: u32 = rng.gen();
        if value != 0 {
            return value;
        }
    }
}

/// Builder for an outgoing packet: header first, payload structs appended
/// in order. The size field is filled in when the packet is finished.
pub struct Packet {
    header: RequestResponseHeader,
    body: Vec<u8>,
}

impl Packet {
    /// A request that expects a reply, tagged with a fresh random dejavu
    pub fn query(message_type: u8) -> Packet {
        Packet {
            header: RequestResponseHeader::new(message_type, HEADER_SIZE, random_dejavu()),
            body: Vec::new(),
        }
    }

    /// A one-way broadcast, dejavu fixed at zero
    pub fn broadcast(message_type: u8) -> Packet {
        Packet {
            header: RequestResponseHeader::new(message_type, HEADER_SIZE, 0),
            body: Vec::new(),
        }
    }

    pub fn push<T: AsBytes>(mut self, payload: &T) -> Packet {
        self.body.extend_from_slice(payload.as_bytes());
        self
    }

    pub fn push_bytes(mut self, bytes: &[u8]) -> Packet {
        self.body.extend_from_slice(bytes);
        self
    }

    pub fn header(&self) -> &RequestResponseHeader {
        &self.header
    }

    pub fn into_bytes(mut self) -> Result<Vec<u8>, ConnectionError> {
        let size = HEADER_SIZE + self.body.len();
        if size > MAX_MESSAGE_SIZE {
            return Err(ConnectionError::SendFailed(format!(
                "packet of {size} bytes exceeds the maximum of {MAX_MESSAGE_SIZE}"
            )));
        }
        self.header.set_size(size);

        let mut bytes = Vec::with_capacity(size);
        bytes.extend_from_slice(self.header.as_bytes());
        bytes.extend_from_slice(&self.body);
        Ok(bytes)
    }
}

/// Find the first message of `message_type` in `buffer` and decode its
/// payload as `T`.
///
/// Messages of other types are skipped by their declared size. The matched
/// payload must be exactly `size_of::<T>()` bytes.
pub fn find_payload<T: FromBytes>(buffer: &[u8], message_type: u8) -> Result<T, ConnectionError> {
    find_payload_where(buffer, message_type, |_: &T| true)
}

/// Like [`find_payload`], but only a decoded payload that `accept` approves
/// ends the scan. Rejected payloads are skipped like messages of other types.
pub fn find_payload_where<T, F>(
    buffer: &[u8],
    message_type: u8,
    mut accept: F,
) -> Result<T, ConnectionError>
where
    T: FromBytes,
    F: FnMut(&T) -> bool,
{
    let expected = std::mem::size_of::<T>();
    let mut offset = 0;

    while offset < buffer.len() {
        let remaining = &buffer[offset..];
        let header = match RequestResponseHeader::parse(remaining) {
            Some(header) => header,
            None => {
                debug!(
                    "Ignoring {} trailing bytes at offset {offset}",
                    remaining.len()
                );
                break;
            }
        };

        let size = header.size();
        if size < HEADER_SIZE {
            return Err(ConnectionError::MalformedResponse(format!(
                "header at offset {offset} declares size {size}"
            )));
        }

        if header.message_type() == message_type {
            let actual = header.payload_size();
            if actual != expected {
                return Err(ConnectionError::SizeMismatch {
                    message_type,
                    actual,
                    expected,
                });
            }
            let payload = remaining.get(HEADER_SIZE..size).ok_or_else(|| {
                ConnectionError::MalformedResponse(format!(
                    "message of type {message_type} declares {size} bytes but only {} arrived",
                    remaining.len()
                ))
            })?;
            let candidate = T::read_from(payload).ok_or_else(|| {
                ConnectionError::MalformedResponse(format!(
                    "payload of type {message_type} could not be decoded"
                ))
            })?;
            if accept(&candidate) {
                return Ok(candidate);
            }
            debug!("Skipping rejected message of type {message_type} at offset {offset}");
            offset += size;
            continue;
        }

        if size > remaining.len() {
            debug!(
                "Message of type {} at offset {offset} is truncated ({size} > {})",
                header.message_type(),
                remaining.len()
            );
            break;
        }
        offset += size;
    }

    Err(ConnectionError::TypeNotFound(message_type))
}
