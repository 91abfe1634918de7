use crate::error::ConnectionError;
use crate::network::messages::{SystemInfo, REQUEST_SYSTEM_INFO, RESPOND_SYSTEM_INFO};
use crate::network::{Connection, Packet};

/// Node build and spectrum summary
pub fn get_system_info(connection: &Connection) -> Result<SystemInfo, ConnectionError> {
    let packet = Packet::query(REQUEST_SYSTEM_INFO).into_bytes()?;
    connection.send(&packet)?;
    connection.receive_as(RESPOND_SYSTEM_INFO)
}
