use crate::error::ConnectionError;
use crate::network::messages::{
    CurrentTickInfo, Digest, RequestedTickData, TickData, BROADCAST_FUTURE_TICK_DATA,
    REQUEST_CURRENT_TICK_INFO, REQUEST_TICK_DATA, RESPOND_CURRENT_TICK_INFO,
};
use crate::network::{Connection, Packet};
use log::debug;

pub fn get_current_tick_info(connection: &Connection) -> Result<CurrentTickInfo, ConnectionError> {
    let packet = Packet::query(REQUEST_CURRENT_TICK_INFO).into_bytes()?;
    connection.send(&packet)?;
    connection.receive_as(RESPOND_CURRENT_TICK_INFO)
}

pub fn get_tick(connection: &Connection) -> Result<u32, ConnectionError> {
    get_current_tick_info(connection).map(|info| info.tick())
}

pub fn get_epoch(connection: &Connection) -> Result<u16, ConnectionError> {
    get_current_tick_info(connection).map(|info| info.epoch())
}

pub fn get_tick_duration(connection: &Connection) -> Result<u16, ConnectionError> {
    get_current_tick_info(connection).map(|info| info.tick_duration())
}

pub fn get_number_of_aligned_votes(connection: &Connection) -> Result<u16, ConnectionError> {
    get_current_tick_info(connection).map(|info| info.number_of_aligned_votes())
}

pub fn get_number_of_misaligned_votes(connection: &Connection) -> Result<u16, ConnectionError> {
    get_current_tick_info(connection).map(|info| info.number_of_misaligned_votes())
}

pub fn get_initial_tick(connection: &Connection) -> Result<u32, ConnectionError> {
    get_current_tick_info(connection).map(|info| info.initial_tick())
}

/// Fetch the tick data broadcast for `tick`.
///
/// The node may push future tick data for other ticks in the same read, so
/// only a frame whose tick equals `tick` is taken. Frames for other ticks
/// alone give `TickMismatch`. A tick that has not been produced yet yields
/// no matching message, which surfaces as `TypeNotFound` or `NoResponse`.
pub fn get_tick_data(connection: &Connection, tick: u32) -> Result<Box<TickData>, ConnectionError> {
    let packet = Packet::query(REQUEST_TICK_DATA)
        .push(&RequestedTickData::new(tick))
        .into_bytes()?;
    connection.send(&packet)?;

    let mut other_tick = None;
    let received = connection.receive_where(BROADCAST_FUTURE_TICK_DATA, |data: &TickData| {
        if data.tick() == tick {
            return true;
        }
        debug!("Ignoring data of tick {} while waiting for tick {tick}", data.tick());
        other_tick = Some(data.tick());
        false
    });
    let data = received.map_err(|e| match (e, other_tick) {
        (ConnectionError::TypeNotFound(_), Some(received)) => ConnectionError::TickMismatch {
            requested: tick,
            received,
        },
        (e, _) => e,
    })?;
    debug!("Tick {} holds {} transactions", data.tick(), data.digests().count());
    Ok(Box::new(data))
}

/// Check `digest` against the tick's digests, stopping at the first empty slot
pub fn contains_transaction(tick_data: &TickData, digest: &Digest) -> bool {
    tick_data.digests().any(|candidate| candidate == digest)
}
