//! Test doubles: a deterministic crypto gateway and a scripted node

use crate::crypto::{validate_seed, CryptoGateway};
use crate::network::codec::{Packet, RequestResponseHeader, HEADER_SIZE};
use crate::network::messages::{CurrentTickInfo, Digest, PublicKey, SIGNATURE_SIZE};
use crate::network::{Connection, ConnectionPtr};
use ring::digest::{digest, SHA256, SHA512};
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use zerocopy::AsBytes;

/// Socket timeout used against the mock node, short to keep tests fast
pub const TEST_IO_TIMEOUT: Duration = Duration::from_millis(100);

const CHARS_PER_CHUNK: usize = 14;
const CHECKSUM_CHARS: usize = 4;

fn sha256(parts: &[&[u8]]) -> [u8; 32] {
    let mut bytes = Vec::new();
    for part in parts {
        bytes.extend_from_slice(part);
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(digest(&SHA256, &bytes).as_ref());
    out
}

fn checksum(key: &[u8; 32]) -> u32 {
    let hash = sha256(&[key]);
    u32::from_le_bytes([hash[0], hash[1], hash[2], 0]) & 0x3FFFF
}

/// Deterministic stand-in for the real primitives, built on SHA-2.
///
/// Identities use the same shape as the real encoding: four base-26 groups
/// of 14 letters, one per 8 byte chunk, plus a 4 letter checksum.
#[derive(Default)]
pub struct FakeGateway {
    pub subseed_calls: AtomicUsize,
    pub private_key_calls: AtomicUsize,
    pub public_key_calls: AtomicUsize,
    pub sign_calls: AtomicUsize,
}

impl FakeGateway {
    pub fn new() -> FakeGateway {
        FakeGateway::default()
    }

    pub fn shared() -> Arc<FakeGateway> {
        Arc::new(FakeGateway::new())
    }
}

impl CryptoGateway for FakeGateway {
    fn derive_subseed(&self, seed: &str) -> Option<[u8; 32]> {
        self.subseed_calls.fetch_add(1, Ordering::SeqCst);
        validate_seed(seed).ok()?;
        Some(sha256(&[b"subseed", seed.as_bytes()]))
    }

    fn derive_private_key(&self, subseed: &[u8; 32]) -> [u8; 32] {
        self.private_key_calls.fetch_add(1, Ordering::SeqCst);
        sha256(&[b"private", subseed])
    }

    fn derive_public_key(&self, private_key: &[u8; 32]) -> PublicKey {
        self.public_key_calls.fetch_add(1, Ordering::SeqCst);
        sha256(&[b"public", private_key])
    }

    fn encode_identity(&self, key: &[u8; 32], lowercase: bool) -> String {
        let base = if lowercase { b'a' } else { b'A' };
        let mut identity = String::with_capacity(60);
        for chunk in key.chunks_exact(8) {
            let mut value = u64::from_le_bytes(chunk.try_into().unwrap());
            for _ in 0..CHARS_PER_CHUNK {
                identity.push(char::from(base + (value % 26) as u8));
                value /= 26;
            }
        }
        let mut check = checksum(key);
        for _ in 0..CHECKSUM_CHARS {
            identity.push(char::from(base + (check % 26) as u8));
            check /= 26;
        }
        identity
    }

    fn sign(
        &self,
        subseed: &[u8; 32],
        public_key: &PublicKey,
        digest_bytes: &Digest,
    ) -> [u8; SIGNATURE_SIZE] {
        self.sign_calls.fetch_add(1, Ordering::SeqCst);
        let mut bytes = Vec::with_capacity(96);
        bytes.extend_from_slice(subseed);
        bytes.extend_from_slice(public_key);
        bytes.extend_from_slice(digest_bytes);
        let mut signature = [0u8; SIGNATURE_SIZE];
        signature.copy_from_slice(digest(&SHA512, &bytes).as_ref());
        signature
    }

    fn digest(&self, bytes: &[u8], out_len: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(out_len);
        let mut counter = 0u32;
        while out.len() < out_len {
            let block = sha256(&[&counter.to_le_bytes(), bytes]);
            let take = (out_len - out.len()).min(block.len());
            out.extend_from_slice(&block[..take]);
            counter += 1;
        }
        out
    }

    fn public_key_from_identity(&self, identity: &str) -> Option<PublicKey> {
        let bytes = identity.as_bytes();
        if bytes.len() != 60 || !bytes.iter().all(|b| b.is_ascii_uppercase()) {
            return None;
        }

        let mut key = [0u8; 32];
        for (i, chunk) in bytes[..56].chunks_exact(CHARS_PER_CHUNK).enumerate() {
            let mut value: u128 = 0;
            for &c in chunk.iter().rev() {
                value = value * 26 + u128::from(c - b'A');
            }
            let value = u64::try_from(value).ok()?;
            key[i * 8..(i + 1) * 8].copy_from_slice(&value.to_le_bytes());
        }

        let mut check = 0u32;
        for &c in bytes[56..].iter().rev() {
            check = check * 26 + u32::from(c - b'A');
        }
        (check == checksum(&key)).then_some(key)
    }
}

/// A request as the mock node saw it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub message_type: u8,
    pub dejavu: u32,
    pub body: Vec<u8>,
}

type Handler = dyn Fn(&RecordedRequest) -> Vec<u8> + Send + Sync;

/// In-process node on an ephemeral port. Every request is recorded and
/// answered with whatever bytes the handler returns (possibly none).
pub struct MockNode {
    port: u16,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockNode {
    pub fn start<F>(handler: F) -> MockNode
    where
        F: Fn(&RecordedRequest) -> Vec<u8> + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let handler: Arc<Handler> = Arc::new(handler);

        let log = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                let log = Arc::clone(&log);
                let handler = Arc::clone(&handler);
                thread::spawn(move || serve(stream, log, handler));
            }
        });

        MockNode { port, requests }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn connect(&self) -> ConnectionPtr {
        Connection::connect_with_timeout("127.0.0.1", self.port, TEST_IO_TIMEOUT).unwrap()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, message_type: u8) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.message_type == message_type)
            .count()
    }

    /// Broadcasts get no reply, so wait for the node to have read them
    pub fn wait_for(&self, message_type: u8, count: usize) -> bool {
        for _ in 0..100 {
            if self.count(message_type) >= count {
                return true;
            }
            thread::sleep(Duration::from_millis(10));
        }
        false
    }
}

fn serve(mut stream: TcpStream, log: Arc<Mutex<Vec<RecordedRequest>>>, handler: Arc<Handler>) {
    loop {
        let mut header_bytes = [0u8; HEADER_SIZE];
        if stream.read_exact(&mut header_bytes).is_err() {
            return;
        }
        let Some(header) = RequestResponseHeader::parse(&header_bytes) else {
            return;
        };
        let mut body = vec![0u8; header.payload_size()];
        if stream.read_exact(&mut body).is_err() {
            return;
        }

        let request = RecordedRequest {
            message_type: header.message_type(),
            dejavu: header.dejavu(),
            body,
        };
        let response = handler(&request);
        log.lock().unwrap().push(request);

        if !response.is_empty() && stream.write_all(&response).is_err() {
            return;
        }
    }
}

/// One complete message carrying `payload`
pub fn frame<T: AsBytes + ?Sized>(message_type: u8, payload: &T) -> Vec<u8> {
    Packet::broadcast(message_type)
        .push_bytes(payload.as_bytes())
        .into_bytes()
        .unwrap()
}

pub fn tick_info(tick: u32) -> CurrentTickInfo {
    CurrentTickInfo::new(2, 110, tick, 451, 0, tick.saturating_sub(1_000))
}

/// A valid seed that differs per `n`
pub fn test_seed(n: u8) -> String {
    let mut seed = "a".repeat(54);
    seed.push(char::from(b'a' + n % 26));
    seed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::messages::{REQUEST_CURRENT_TICK_INFO, RESPOND_CURRENT_TICK_INFO};

    #[test]
    fn test_fake_identity_decodes_and_checks_checksum() {
        let gateway = FakeGateway::new();
        let key = sha256(&[b"some key"]);
        let identity = gateway.encode_identity(&key, false);
        assert_eq!(gateway.public_key_from_identity(&identity), Some(key));

        let mut corrupted = identity.into_bytes();
        corrupted[59] = if corrupted[59] == b'A' { b'B' } else { b'A' };
        let corrupted = String::from_utf8(corrupted).unwrap();
        assert_eq!(gateway.public_key_from_identity(&corrupted), None);
        assert_eq!(gateway.public_key_from_identity("TOO SHORT"), None);
    }

    #[test]
    fn test_fake_subseed_rejects_bad_seed() {
        let gateway = FakeGateway::new();
        assert!(gateway.derive_subseed("abc").is_none());
        assert!(gateway.derive_subseed(&test_seed(1)).is_some());
    }

    #[test]
    fn test_mock_node_answers_and_records() {
        let node = MockNode::start(|request| match request.message_type {
            REQUEST_CURRENT_TICK_INFO => frame(RESPOND_CURRENT_TICK_INFO, &tick_info(42)),
            _ => Vec::new(),
        });
        let connection = node.connect();
        let request = Packet::query(REQUEST_CURRENT_TICK_INFO).into_bytes().unwrap();
        connection.send(&request).unwrap();
        let info: CurrentTickInfo = connection.receive_as(RESPOND_CURRENT_TICK_INFO).unwrap();
        assert_eq!(info.tick(), 42);
        assert_eq!(node.count(REQUEST_CURRENT_TICK_INFO), 1);
        assert_ne!(node.requests()[0].dejavu, 0);
    }
}
