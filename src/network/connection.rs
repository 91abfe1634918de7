use crate::error::ConnectionError;
use crate::network::codec::find_payload_where;
use log::debug;
use std::io::{ErrorKind, Read, Write};
use std::net::{IpAddr, Shutdown, SocketAddr, TcpStream};
use std::sync::Arc;
use std::time::Duration;
use zerocopy::FromBytes;

/// Default socket timeout for connect, send and receive
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_millis(1000);

/// Size of the scratch buffer each read fills
const RECEIVE_CHUNK_SIZE: usize = 1024;

pub type ConnectionPtr = Arc<Connection>;

/// Check that `address` is a literal IPv4 or IPv6 address
pub fn is_valid_ip(address: &str) -> bool {
    address.parse::<IpAddr>().is_ok()
}

/// One live TCP connection to a node.
///
/// The socket closes when the last handle is dropped. Reads and writes go
/// through `&TcpStream`, so a shared `ConnectionPtr` can be used from
/// several places, but callers must not interleave requests on it.
#[derive(Debug)]
pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
}

impl Connection {
    pub fn connect(address: &str, port: u16) -> Result<ConnectionPtr, ConnectionError> {
        Connection::connect_with_timeout(address, port, DEFAULT_IO_TIMEOUT)
    }

    pub fn connect_with_timeout(
        address: &str,
        port: u16,
        timeout: Duration,
    ) -> Result<ConnectionPtr, ConnectionError> {
        let ip: IpAddr = address
            .parse()
            .map_err(|_| ConnectionError::InvalidAddress(address.to_string()))?;
        let peer = SocketAddr::new(ip, port);

        let stream = TcpStream::connect_timeout(&peer, timeout).map_err(|e| {
            ConnectionError::ConnectFailed {
                address: peer.to_string(),
                reason: e.to_string(),
            }
        })?;

        let configure = |e: std::io::Error| ConnectionError::ConnectFailed {
            address: peer.to_string(),
            reason: format!("Failed to configure socket: {e}"),
        };
        stream.set_read_timeout(Some(timeout)).map_err(configure)?;
        stream.set_write_timeout(Some(timeout)).map_err(configure)?;
        stream.set_nodelay(true).map_err(configure)?;

        debug!("Connected to {peer}");
        Ok(Arc::new(Connection { stream, peer }))
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Write every byte of `bytes`, retrying partial writes
    pub fn send(&self, bytes: &[u8]) -> Result<(), ConnectionError> {
        let mut stream = &self.stream;
        let mut written = 0;
        while written < bytes.len() {
            match stream.write(&bytes[written..]) {
                Ok(0) => {
                    return Err(ConnectionError::SendFailed(format!(
                        "connection to {} closed after {written} of {} bytes",
                        self.peer,
                        bytes.len()
                    )))
                }
                Ok(n) => written += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(ConnectionError::SendFailed(e.to_string())),
            }
        }
        stream
            .flush()
            .map_err(|e| ConnectionError::SendFailed(e.to_string()))?;

        debug!("Sent {written} bytes to {}", self.peer);
        Ok(())
    }

    /// Collect everything the node sends until it goes quiet.
    ///
    /// Reads stop at end of stream or at the first read that times out. The
    /// result may hold zero, one or several messages.
    pub fn receive(&self) -> Result<Vec<u8>, ConnectionError> {
        let mut stream = &self.stream;
        let mut buffer = Vec::new();
        let mut chunk = [0u8; RECEIVE_CHUNK_SIZE];

        loop {
            match stream.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => buffer.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => break,
                Err(e) => {
                    if buffer.is_empty() {
                        return Err(ConnectionError::ReceiveFailed(e.to_string()));
                    }
                    debug!("Receive from {} ended early: {e}", self.peer);
                    break;
                }
            }
        }

        debug!("Received {} bytes from {}", buffer.len(), self.peer);
        Ok(buffer)
    }

    /// Receive and extract the first message of `message_type` as `T`
    pub fn receive_as<T: FromBytes>(&self, message_type: u8) -> Result<T, ConnectionError> {
        self.receive_where(message_type, |_: &T| true)
    }

    /// Receive and extract the first message of `message_type` that `accept`
    /// approves
    pub fn receive_where<T, F>(&self, message_type: u8, accept: F) -> Result<T, ConnectionError>
    where
        T: FromBytes,
        F: FnMut(&T) -> bool,
    {
        let buffer = self.receive()?;
        if buffer.is_empty() {
            return Err(ConnectionError::NoResponse);
        }
        find_payload_where(&buffer, message_type, accept)
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}
