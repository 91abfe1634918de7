use crate::crypto::{validate_identity, CryptoGateway};
use crate::error::ConnectionError;
use crate::network::messages::{
    PublicKey, RequestedEntity, RespondedEntity, REQUEST_ENTITY, RESPOND_ENTITY,
};
use crate::network::{Connection, Packet};

/// Look up the entity of a 60 character identity
pub fn get_entity(
    connection: &Connection,
    gateway: &dyn CryptoGateway,
    identity: &str,
) -> Result<RespondedEntity, ConnectionError> {
    validate_identity(identity).map_err(|_| {
        ConnectionError::InvalidIdentity(format!("{identity} (expected 60 characters)"))
    })?;
    let public_key = gateway
        .public_key_from_identity(identity)
        .ok_or_else(|| ConnectionError::InvalidIdentity(identity.to_string()))?;
    get_entity_by_public_key(connection, &public_key)
}

pub fn get_entity_by_public_key(
    connection: &Connection,
    public_key: &PublicKey,
) -> Result<RespondedEntity, ConnectionError> {
    let request = RequestedEntity {
        public_key: *public_key,
    };
    let packet = Packet::query(REQUEST_ENTITY).push(&request).into_bytes()?;
    connection.send(&packet)?;
    connection.receive_as(RESPOND_ENTITY)
}

/// Incoming minus outgoing amount of the identity
pub fn get_balance(
    connection: &Connection,
    gateway: &dyn CryptoGateway,
    identity: &str,
) -> Result<i64, ConnectionError> {
    get_entity(connection, gateway, identity).map(|responded| responded.entity.balance())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::messages::Entity;
    use crate::testnet::{frame, FakeGateway, MockNode};

    fn entity_node() -> MockNode {
        MockNode::start(|request| {
            let public_key: PublicKey = request.body[..32].try_into().unwrap();
            let entity = Entity::new(public_key, 10_000, 2_500).with_transfers(4, 1, 900, 950);
            frame(RESPOND_ENTITY, &RespondedEntity::new(entity, 1_000, 17))
        })
    }

    #[test]
    fn test_get_entity_sends_decoded_public_key() {
        let gateway = FakeGateway::new();
        let key = [0x42; 32];
        let identity = gateway.encode_identity(&key, false);
        let node = entity_node();

        let responded = get_entity(&node.connect(), &gateway, &identity).unwrap();
        assert_eq!(responded.entity.public_key(), &key);
        assert_eq!(responded.tick(), 1_000);
        assert_eq!(responded.spectrum_index(), 17);
        assert_eq!(responded.entity.number_of_incoming_transfers(), 4);
        assert_eq!(node.requests()[0].body, key.to_vec());
    }

    #[test]
    fn test_get_balance() {
        let gateway = FakeGateway::new();
        let identity = gateway.encode_identity(&[7; 32], false);
        let node = entity_node();
        assert_eq!(get_balance(&node.connect(), &gateway, &identity).unwrap(), 7_500);
    }

    #[test]
    fn test_identity_with_wrong_length_is_not_sent() {
        let gateway = FakeGateway::new();
        let node = entity_node();
        let err = get_entity(&node.connect(), &gateway, "ABC").unwrap_err();
        assert!(matches!(err, ConnectionError::InvalidIdentity(_)));
        assert!(node.requests().is_empty());
    }

    #[test]
    fn test_undecodable_identity() {
        let gateway = FakeGateway::new();
        let node = entity_node();
        let identity = "a".repeat(60);
        let err = get_entity(&node.connect(), &gateway, &identity).unwrap_err();
        assert_eq!(err, ConnectionError::InvalidIdentity(identity));
    }
}
