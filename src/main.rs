// Diagnostic front end: talks to one node and prints what it answers as JSON.
// Nothing here needs a seed, so no crypto gateway is involved.
use clap::Parser;
use log::{error, LevelFilter};
use qwallet::{
    get_airdrop_fees, get_current_tick_info, get_entity_by_public_key, get_system_info,
    get_tick_data, is_valid_ip, to_comma_separated, Command, Connection, ConnectionPtr, Opt,
    PublicKey, GLOBAL_CONFIG,
};
use serde_json::{json, Value};
use std::process;

fn main() {
    // Info by default, RUST_LOG still wins
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let opt = Opt::parse();

    if let Err(e) = run_command(&opt) {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn connect(opt: &Opt) -> Result<ConnectionPtr, Box<dyn std::error::Error>> {
    let settings = GLOBAL_CONFIG.settings();
    let address = opt.address.clone().unwrap_or(settings.node_address.clone());
    let port = opt.port.unwrap_or(settings.node_port);
    Ok(Connection::connect_with_timeout(
        &address,
        port,
        settings.io_timeout(),
    )?)
}

fn print_json(value: &Value) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_public_key(text: &str) -> Result<PublicKey, Box<dyn std::error::Error>> {
    let bytes = hex::decode(text)?;
    let key = bytes
        .as_slice()
        .try_into()
        .map_err(|_| format!("Public key must be 32 bytes, got {}", bytes.len()))?;
    Ok(key)
}

fn run_command(opt: &Opt) -> Result<(), Box<dyn std::error::Error>> {
    match &opt.command {
        Command::Tick => {
            let info = get_current_tick_info(&*connect(opt)?)?;
            print_json(&json!({
                "tick": info.tick(),
                "epoch": info.epoch(),
                "tick_duration": info.tick_duration(),
                "number_of_aligned_votes": info.number_of_aligned_votes(),
                "number_of_misaligned_votes": info.number_of_misaligned_votes(),
                "initial_tick": info.initial_tick(),
            }))?;
        }
        Command::SystemInfo => {
            let info = get_system_info(&*connect(opt)?)?;
            print_json(&json!({
                "version": info.version(),
                "epoch": info.epoch(),
                "tick": info.tick(),
                "initial_tick": info.initial_tick(),
                "latest_created_tick": info.latest_created_tick(),
                "initial_millisecond": info.initial_millisecond(),
                "number_of_entities": info.number_of_entities(),
                "number_of_transactions": info.number_of_transactions(),
                "solution_threshold": info.solution_threshold(),
            }))?;
        }
        Command::TickData { tick } => {
            let data = get_tick_data(&*connect(opt)?, *tick)?;
            let digests: Vec<String> = data.digests().map(hex::encode).collect();
            print_json(&json!({
                "tick": data.tick(),
                "epoch": data.epoch(),
                "computor_index": data.computor_index(),
                "transaction_digests": digests,
            }))?;
        }
        Command::Entity { public_key } => {
            let key = parse_public_key(public_key)?;
            let responded = get_entity_by_public_key(&*connect(opt)?, &key)?;
            let entity = &responded.entity;
            print_json(&json!({
                "public_key": hex::encode(entity.public_key()),
                "incoming_amount": entity.incoming_amount(),
                "outgoing_amount": entity.outgoing_amount(),
                "balance": entity.balance(),
                "balance_display": to_comma_separated(entity.balance()),
                "number_of_incoming_transfers": entity.number_of_incoming_transfers(),
                "number_of_outgoing_transfers": entity.number_of_outgoing_transfers(),
                "latest_incoming_transfer_tick": entity.latest_incoming_transfer_tick(),
                "latest_outgoing_transfer_tick": entity.latest_outgoing_transfer_tick(),
                "tick": responded.tick(),
                "spectrum_index": responded.spectrum_index(),
            }))?;
        }
        Command::AirdropFees => {
            let fees = get_airdrop_fees(&*connect(opt)?)?;
            print_json(&json!({
                "airdrop_start_fee": fees.airdrop_start_fee(),
                "transfer_fee": fees.transfer_fee(),
            }))?;
        }
        Command::CheckAddress { address } => {
            if !is_valid_ip(address) {
                return Err(format!("Invalid ip-address: {address}").into());
            }
            println!("{address} is a valid ip-address");
        }
    }
    Ok(())
}
