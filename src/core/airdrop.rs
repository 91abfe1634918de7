// Calls into the airdrop contract.
// Fees are read with a contract function request; everything else is a
// procedure call, i.e. a signed transaction to the contract's key with an
// input block, after which the node may answer with the procedure output.

use crate::core::receipt::Receipt;
use crate::core::transaction::{TickTarget, TransactionBuilder};
use crate::crypto::{validate_identity, CryptoGateway};
use crate::error::{ConnectionError, TransactionError, ValidationError};
use crate::network::messages::{
    PublicKey, RequestContractFunction, REQUEST_CONTRACT_FUNCTION, RESPOND_CONTRACT_FUNCTION,
};
use crate::network::{Connection, Packet};
use crate::wallet::Wallet;
use log::{debug, info};
use static_assertions::assert_eq_size;
use zerocopy::byteorder::{LittleEndian, I64, U32, U64};
use zerocopy::{AsBytes, FromBytes, FromZeroes};

pub const AIRDROP_CONTRACT_INDEX: u32 = 5;

const FUNCTION_FEES: u16 = 1;
const PROCEDURE_START_AIRDROP: u16 = 1;
const PROCEDURE_DISTRIBUTE_TOKEN: u16 = 2;
const PROCEDURE_TRANSFER_TOKEN: u16 = 3;

pub const MAX_ASSET_NAME_LENGTH: usize = 7;
pub const MAX_UNIT_OF_MEASUREMENT_LENGTH: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsBytes, FromBytes, FromZeroes)]
#[repr(C)]
pub struct FeesOutput {
    airdrop_start_fee: U32<LittleEndian>,
    transfer_fee: U32<LittleEndian>,
}

assert_eq_size!(FeesOutput, [u8; 8]);

impl FeesOutput {
    pub fn new(airdrop_start_fee: u32, transfer_fee: u32) -> FeesOutput {
        FeesOutput {
            airdrop_start_fee: U32::new(airdrop_start_fee),
            transfer_fee: U32::new(transfer_fee),
        }
    }

    pub fn airdrop_start_fee(&self) -> u32 {
        self.airdrop_start_fee.get()
    }

    pub fn transfer_fee(&self) -> u32 {
        self.transfer_fee.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsBytes, FromBytes, FromZeroes)]
#[repr(C)]
pub struct StartAirdropInput {
    asset_name: U64<LittleEndian>,
    number_of_shares: I64<LittleEndian>,
    number_of_decimal_places: i8,
    _padding: [u8; 7],
    unit_of_measurement: U64<LittleEndian>,
}

assert_eq_size!(StartAirdropInput, [u8; 32]);

impl StartAirdropInput {
    pub fn asset_name(&self) -> u64 {
        self.asset_name.get()
    }

    pub fn number_of_shares(&self) -> i64 {
        self.number_of_shares.get()
    }

    pub fn number_of_decimal_places(&self) -> i8 {
        self.number_of_decimal_places
    }

    pub fn unit_of_measurement(&self) -> u64 {
        self.unit_of_measurement.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsBytes, FromBytes, FromZeroes)]
#[repr(C)]
pub struct StartAirdropOutput {
    issued_number_of_shares: I64<LittleEndian>,
}

impl StartAirdropOutput {
    pub fn new(issued_number_of_shares: i64) -> StartAirdropOutput {
        StartAirdropOutput {
            issued_number_of_shares: I64::new(issued_number_of_shares),
        }
    }

    pub fn issued_number_of_shares(&self) -> i64 {
        self.issued_number_of_shares.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsBytes, FromBytes, FromZeroes)]
#[repr(C)]
pub struct DistributeTokenInput {
    pub issuer: PublicKey,
    asset_name: U64<LittleEndian>,
}

assert_eq_size!(DistributeTokenInput, [u8; 40]);

/// Output of both token distribution and token transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsBytes, FromBytes, FromZeroes)]
#[repr(C)]
pub struct TransferredAmountOutput {
    transferred_amount: I64<LittleEndian>,
}

impl TransferredAmountOutput {
    pub fn new(transferred_amount: i64) -> TransferredAmountOutput {
        TransferredAmountOutput {
            transferred_amount: I64::new(transferred_amount),
        }
    }

    pub fn transferred_amount(&self) -> i64 {
        self.transferred_amount.get()
    }
}

pub type DistributeTokenOutput = TransferredAmountOutput;
pub type TransferTokenOutput = TransferredAmountOutput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsBytes, FromBytes, FromZeroes)]
#[repr(C)]
pub struct TransferTokenInput {
    pub issuer: PublicKey,
    asset_name: U64<LittleEndian>,
    amount: U64<LittleEndian>,
    pub receiver: PublicKey,
}

assert_eq_size!(TransferTokenInput, [u8; 80]);

/// Parameters of a new airdrop asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirdropAsset {
    pub name: String,
    /// Up to seven decimal digits
    pub unit_of_measurement: String,
    pub number_of_shares: i64,
    pub number_of_decimal_places: i8,
}

/// Result of a procedure call. The hash and tick are always known once the
/// transaction is out; `output` is `None` if the node did not answer in time.
#[derive(Debug, Clone)]
pub struct ContractCallResult<T> {
    pub output: Option<T>,
    pub receipt: Receipt,
}

impl<T> ContractCallResult<T> {
    pub fn hash(&self) -> &str {
        self.receipt.hash()
    }

    pub fn tick(&self) -> u32 {
        self.receipt.tick()
    }
}

/// Pack a 1 to 7 character asset name into the low bytes of a u64
pub fn encode_asset_name(name: &str) -> Result<u64, ValidationError> {
    let bytes = name.as_bytes();
    if bytes.is_empty() || bytes.len() > MAX_ASSET_NAME_LENGTH {
        return Err(ValidationError::AssetNameLength(bytes.len()));
    }
    let mut packed = [0u8; 8];
    packed[..bytes.len()].copy_from_slice(bytes);
    Ok(u64::from_le_bytes(packed))
}

/// One digit value per byte, e.g. "0100000" -> 00 01 00 00 00 00 00 00
pub fn encode_unit_of_measurement(unit: &str) -> Result<u64, ValidationError> {
    let bytes = unit.as_bytes();
    if bytes.is_empty()
        || bytes.len() > MAX_UNIT_OF_MEASUREMENT_LENGTH
        || !bytes.iter().all(u8::is_ascii_digit)
    {
        return Err(ValidationError::UnitOfMeasurement(unit.to_string()));
    }
    let mut packed = [0u8; 8];
    for (slot, digit) in packed.iter_mut().zip(bytes) {
        *slot = digit - b'0';
    }
    Ok(u64::from_le_bytes(packed))
}

pub fn get_airdrop_fees(connection: &Connection) -> Result<FeesOutput, ConnectionError> {
    let request = RequestContractFunction::new(AIRDROP_CONTRACT_INDEX, FUNCTION_FEES, 0);
    let packet = Packet::query(REQUEST_CONTRACT_FUNCTION)
        .push(&request)
        .into_bytes()?;
    connection.send(&packet)?;
    connection.receive_as(RESPOND_CONTRACT_FUNCTION)
}

/// Issue a new asset; pays the contract's airdrop start fee
pub fn start_airdrop(
    connection: &Connection,
    gateway: &dyn CryptoGateway,
    issuer: &Wallet,
    asset: &AirdropAsset,
    tick_offset: u32,
) -> Result<ContractCallResult<StartAirdropOutput>, TransactionError> {
    let input = StartAirdropInput {
        asset_name: U64::new(encode_asset_name(&asset.name)?),
        number_of_shares: I64::new(asset.number_of_shares),
        number_of_decimal_places: asset.number_of_decimal_places,
        _padding: [0; 7],
        unit_of_measurement: U64::new(encode_unit_of_measurement(&asset.unit_of_measurement)?),
    };
    // The amount is whatever start fee the contract quotes now, not a fixed sum
    let fees = get_airdrop_fees(connection)?;
    call_procedure(
        connection,
        gateway,
        issuer,
        PROCEDURE_START_AIRDROP,
        &input,
        i64::from(fees.airdrop_start_fee()),
        TickTarget::Offset(tick_offset),
    )
}

/// Distribute the asset to its holders, scheduled `tick_offset` ticks ahead
pub fn distribute_token(
    connection: &Connection,
    gateway: &dyn CryptoGateway,
    issuer: &Wallet,
    asset_name: &str,
    tick_offset: u32,
) -> Result<ContractCallResult<DistributeTokenOutput>, TransactionError> {
    distribute(
        connection,
        gateway,
        issuer,
        asset_name,
        TickTarget::Offset(tick_offset),
    )
}

/// Distribute the asset at an absolute tick
pub fn distribute_token_at_tick(
    connection: &Connection,
    gateway: &dyn CryptoGateway,
    issuer: &Wallet,
    asset_name: &str,
    tick: u32,
) -> Result<ContractCallResult<DistributeTokenOutput>, TransactionError> {
    distribute(connection, gateway, issuer, asset_name, TickTarget::At(tick))
}

fn distribute(
    connection: &Connection,
    gateway: &dyn CryptoGateway,
    issuer: &Wallet,
    asset_name: &str,
    target: TickTarget,
) -> Result<ContractCallResult<DistributeTokenOutput>, TransactionError> {
    let input = DistributeTokenInput {
        issuer: *issuer.raw_public_key(),
        asset_name: U64::new(encode_asset_name(asset_name)?),
    };
    let fees = get_airdrop_fees(connection)?;
    call_procedure(
        connection,
        gateway,
        issuer,
        PROCEDURE_DISTRIBUTE_TOKEN,
        &input,
        i64::from(fees.transfer_fee()),
        target,
    )
}

/// Move `number_of_units` of the issuer's asset to `new_owner`
pub fn transfer_token(
    connection: &Connection,
    gateway: &dyn CryptoGateway,
    issuer: &Wallet,
    asset_name: &str,
    new_owner: &str,
    number_of_units: i64,
    tick_offset: u32,
) -> Result<ContractCallResult<TransferTokenOutput>, TransactionError> {
    let units =
        u64::try_from(number_of_units).map_err(|_| ValidationError::NegativeAmount(number_of_units))?;
    validate_identity(new_owner)?;
    let receiver = gateway
        .public_key_from_identity(new_owner)
        .ok_or_else(|| ValidationError::InvalidIdentity(new_owner.to_string()))?;

    let input = TransferTokenInput {
        issuer: *issuer.raw_public_key(),
        asset_name: U64::new(encode_asset_name(asset_name)?),
        amount: U64::new(units),
        receiver,
    };
    let fees = get_airdrop_fees(connection)?;
    call_procedure(
        connection,
        gateway,
        issuer,
        PROCEDURE_TRANSFER_TOKEN,
        &input,
        i64::from(fees.transfer_fee()),
        TickTarget::Offset(tick_offset),
    )
}

fn call_procedure<I: AsBytes, O: FromBytes>(
    connection: &Connection,
    gateway: &dyn CryptoGateway,
    issuer: &Wallet,
    input_type: u16,
    input: &I,
    amount: i64,
    target: TickTarget,
) -> Result<ContractCallResult<O>, TransactionError> {
    let builder = TransactionBuilder::contract_call(
        gateway,
        issuer,
        AIRDROP_CONTRACT_INDEX,
        input_type,
        input,
        amount,
    )?;
    let builder = match target {
        TickTarget::Offset(offset) => builder.tick_offset(offset),
        TickTarget::At(tick) => builder.at_tick(tick),
    };

    let tick = builder.scheduled_tick(connection)?;
    let receipt = builder.sign(gateway, tick).broadcast(connection)?;
    info!(
        "Airdrop procedure {input_type} sent as {} for tick {tick}",
        receipt.hash()
    );

    // The output may arrive later than the timeout; the call still went out
    let output = match connection.receive_as::<O>(RESPOND_CONTRACT_FUNCTION) {
        Ok(output) => Some(output),
        Err(e) => {
            debug!("No output for {} yet: {e}", receipt.hash());
            None
        }
    };

    Ok(ContractCallResult { output, receipt })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transaction::contract_public_key;
    use crate::network::messages::{
        Transaction, BROADCAST_TRANSACTION, REQUEST_CURRENT_TICK_INFO, RESPOND_CURRENT_TICK_INFO,
    };
    use crate::testnet::{frame, test_seed, tick_info, FakeGateway, MockNode, RecordedRequest};

    fn airdrop_node(answer_procedures: bool) -> MockNode {
        MockNode::start(move |request: &RecordedRequest| match request.message_type {
            REQUEST_CONTRACT_FUNCTION => {
                frame(RESPOND_CONTRACT_FUNCTION, &FeesOutput::new(1_000_000, 100))
            }
            REQUEST_CURRENT_TICK_INFO => frame(RESPOND_CURRENT_TICK_INFO, &tick_info(2_000)),
            BROADCAST_TRANSACTION if answer_procedures => {
                let transaction = Transaction::read_from(&request.body[..80]).unwrap();
                match transaction.input_type() {
                    PROCEDURE_START_AIRDROP => {
                        frame(RESPOND_CONTRACT_FUNCTION, &StartAirdropOutput::new(21_000_000))
                    }
                    _ => frame(RESPOND_CONTRACT_FUNCTION, &TransferredAmountOutput::new(69)),
                }
            }
            _ => Vec::new(),
        })
    }

    fn broadcast_of(node: &MockNode) -> (Transaction, Vec<u8>) {
        assert!(node.wait_for(BROADCAST_TRANSACTION, 1));
        let request = node
            .requests()
            .into_iter()
            .find(|r| r.message_type == BROADCAST_TRANSACTION)
            .unwrap();
        let transaction = Transaction::read_from(&request.body[..80]).unwrap();
        let input = request.body[80..request.body.len() - 64].to_vec();
        (transaction, input)
    }

    fn asset() -> AirdropAsset {
        AirdropAsset {
            name: "QTOOL".to_string(),
            unit_of_measurement: "0100000".to_string(),
            number_of_shares: 21_000_000,
            number_of_decimal_places: 2,
        }
    }

    #[test]
    fn test_encode_asset_name() {
        assert_eq!(
            encode_asset_name("QTOOL").unwrap().to_le_bytes(),
            [b'Q', b'T', b'O', b'O', b'L', 0, 0, 0]
        );
        assert_eq!(encode_asset_name(""), Err(ValidationError::AssetNameLength(0)));
        assert_eq!(
            encode_asset_name("TOOLONG1"),
            Err(ValidationError::AssetNameLength(8))
        );
    }

    #[test]
    fn test_encode_unit_of_measurement() {
        assert_eq!(
            encode_unit_of_measurement("0100000").unwrap().to_le_bytes(),
            [0, 1, 0, 0, 0, 0, 0, 0]
        );
        assert_eq!(
            encode_unit_of_measurement("9").unwrap().to_le_bytes(),
            [9, 0, 0, 0, 0, 0, 0, 0]
        );
        assert!(encode_unit_of_measurement("").is_err());
        assert!(encode_unit_of_measurement("12345678").is_err());
        assert!(encode_unit_of_measurement("12a").is_err());
    }

    #[test]
    fn test_get_airdrop_fees() {
        let node = airdrop_node(false);
        let fees = get_airdrop_fees(&node.connect()).unwrap();
        assert_eq!(fees.airdrop_start_fee(), 1_000_000);
        assert_eq!(fees.transfer_fee(), 100);

        let request = &node.requests()[0];
        let function = RequestContractFunction::read_from(&request.body[..]).unwrap();
        assert_eq!(function.contract_index(), AIRDROP_CONTRACT_INDEX);
        assert_eq!(function.input_type(), FUNCTION_FEES);
        assert_eq!(function.input_size(), 0);
    }

    #[test]
    fn test_start_airdrop() {
        let gateway = FakeGateway::new();
        let issuer = Wallet::from_seed(&gateway, &test_seed(1)).unwrap();
        let node = airdrop_node(true);

        let result = start_airdrop(&node.connect(), &gateway, &issuer, &asset(), 5).unwrap();
        assert_eq!(result.tick(), 2_005);
        assert_eq!(result.hash(), result.receipt.hash());
        assert_eq!(
            result.output.map(|o| o.issued_number_of_shares()),
            Some(21_000_000)
        );

        let (transaction, input) = broadcast_of(&node);
        assert_eq!(transaction.destination_public_key, contract_public_key(5));
        assert_eq!(transaction.amount(), 1_000_000);
        assert_eq!(transaction.input_type(), PROCEDURE_START_AIRDROP);
        assert_eq!(transaction.input_size(), 32);

        let input = StartAirdropInput::read_from(&input[..]).unwrap();
        assert_eq!(input.asset_name(), encode_asset_name("QTOOL").unwrap());
        assert_eq!(input.number_of_shares(), 21_000_000);
        assert_eq!(input.number_of_decimal_places(), 2);
        assert_eq!(input.unit_of_measurement().to_le_bytes()[1], 1);
    }

    #[test]
    fn test_start_airdrop_pays_quoted_start_fee() {
        let gateway = FakeGateway::new();
        let issuer = Wallet::from_seed(&gateway, &test_seed(1)).unwrap();
        let node = MockNode::start(|request: &RecordedRequest| match request.message_type {
            REQUEST_CONTRACT_FUNCTION => {
                frame(RESPOND_CONTRACT_FUNCTION, &FeesOutput::new(1_234_567, 100))
            }
            REQUEST_CURRENT_TICK_INFO => frame(RESPOND_CURRENT_TICK_INFO, &tick_info(2_000)),
            _ => Vec::new(),
        });

        let result = start_airdrop(&node.connect(), &gateway, &issuer, &asset(), 5).unwrap();
        assert_eq!(result.receipt.amount(), 1_234_567);
        let (transaction, _) = broadcast_of(&node);
        assert_eq!(transaction.amount(), 1_234_567);
    }

    #[test]
    fn test_missing_output_is_not_an_error() {
        let gateway = FakeGateway::new();
        let issuer = Wallet::from_seed(&gateway, &test_seed(1)).unwrap();
        let node = airdrop_node(false);

        let result = distribute_token(&node.connect(), &gateway, &issuer, "QTOOL", 5).unwrap();
        assert!(result.output.is_none());
        assert_eq!(result.tick(), 2_005);
        assert!(!result.hash().is_empty());
    }

    #[test]
    fn test_distribute_token_at_tick() {
        let gateway = FakeGateway::new();
        let issuer = Wallet::from_seed(&gateway, &test_seed(1)).unwrap();
        let node = airdrop_node(true);

        let result =
            distribute_token_at_tick(&node.connect(), &gateway, &issuer, "QTOOL", 9_999).unwrap();
        assert_eq!(result.tick(), 9_999);
        assert_eq!(result.output.map(|o| o.transferred_amount()), Some(69));
        assert_eq!(node.count(REQUEST_CURRENT_TICK_INFO), 0);

        let (transaction, input) = broadcast_of(&node);
        assert_eq!(transaction.amount(), 100);
        assert_eq!(transaction.input_type(), PROCEDURE_DISTRIBUTE_TOKEN);
        let input = DistributeTokenInput::read_from(&input[..]).unwrap();
        assert_eq!(&input.issuer, issuer.raw_public_key());
    }

    #[test]
    fn test_transfer_token() {
        let gateway = FakeGateway::new();
        let issuer = Wallet::from_seed(&gateway, &test_seed(1)).unwrap();
        let owner = Wallet::from_seed(&gateway, &test_seed(2)).unwrap();
        let node = airdrop_node(true);

        let result = transfer_token(
            &node.connect(),
            &gateway,
            &issuer,
            "QTOOL",
            owner.identity(),
            69,
            5,
        )
        .unwrap();
        assert_eq!(result.output.map(|o| o.transferred_amount()), Some(69));

        let (transaction, input) = broadcast_of(&node);
        assert_eq!(transaction.input_type(), PROCEDURE_TRANSFER_TOKEN);
        assert_eq!(transaction.input_size(), 80);
        let input = TransferTokenInput::read_from(&input[..]).unwrap();
        assert_eq!(&input.receiver, owner.raw_public_key());
        assert_eq!(input.amount.get(), 69);
    }

    #[test]
    fn test_invalid_inputs_send_nothing() {
        let gateway = FakeGateway::new();
        let issuer = Wallet::from_seed(&gateway, &test_seed(1)).unwrap();
        let node = airdrop_node(true);
        let connection = node.connect();

        let mut bad_name = asset();
        bad_name.name = "TOOLONGNAME".to_string();
        assert!(matches!(
            start_airdrop(&connection, &gateway, &issuer, &bad_name, 5),
            Err(TransactionError::Validation(ValidationError::AssetNameLength(11)))
        ));

        let mut bad_unit = asset();
        bad_unit.unit_of_measurement = "kg".to_string();
        assert!(matches!(
            start_airdrop(&connection, &gateway, &issuer, &bad_unit, 5),
            Err(TransactionError::Validation(ValidationError::UnitOfMeasurement(_)))
        ));

        assert!(matches!(
            transfer_token(&connection, &gateway, &issuer, "QTOOL", issuer.identity(), -1, 5),
            Err(TransactionError::Validation(ValidationError::NegativeAmount(-1)))
        ));

        assert!(node.requests().is_empty());
    }
}
