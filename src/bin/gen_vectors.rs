//! Generate golden address vectors
//!
//! Builds the Orchard UFVK for a fixed seed with upstream `orchard`, derives the
//! first addresses with this crate, and checks each one against the upstream
//! derivation before printing them as JSON.
//!
//! Usage: gen_vectors [mainnet|testnet|regtest]

use std::env;
use std::error::Error as StdError;

use juno_addrgen::{zip316, Addrgen, AddrgenConfig, Network};
use orchard::keys::{FullViewingKey, Scope, SpendingKey};
use serde::Serialize;
use zip32::AccountId;

/// SLIP-44 coin type registered for Juno Cash
const JUNO_COIN_TYPE: u32 = 8133;

const SEED: [u8; 64] = [7u8; 64];

const VECTOR_COUNT: u32 = 100;

#[derive(Serialize)]
struct Vectors {
    version: u32,
    network: Network,
    ufvk: String,
    addresses: Vec<String>,
}

fn parse_network(arg: Option<String>) -> Result<Network, String> {
    match arg.as_deref() {
        None | Some("mainnet") => Ok(Network::Mainnet),
        Some("testnet") => Ok(Network::Testnet),
        Some("regtest") => Ok(Network::Regtest),
        Some(other) => Err(format!("unknown network: {other}")),
    }
}

fn main() -> Result<(), Box<dyn StdError>> {
    let network = parse_network(env::args().nth(1))?;

    let account = AccountId::try_from(0).map_err(|_| "invalid account")?;
    let sk = SpendingKey::from_zip32_seed(&SEED, JUNO_COIN_TYPE, account)
        .map_err(|e| format!("zip32 derivation failed: {e:?}"))?;
    let fvk = FullViewingKey::from(&sk);

    let ufvk = zip316::encode_unified_container(network.ufvk_hrp(), &[(3, &fvk.to_bytes())])?;
    let engine = Addrgen::new(AddrgenConfig::for_network(network))?;
    let addresses = engine.batch(&ufvk, 0, VECTOR_COUNT)?;

    for (j, ours) in (0..VECTOR_COUNT).zip(&addresses) {
        let raw = fvk.address_at(j, Scope::External).to_raw_address_bytes();
        let upstream = zip316::encode_unified_container(network.address_hrp(), &[(3, &raw)])?;
        if *ours != upstream {
            return Err(format!("index {j}: derived {ours}, upstream {upstream}").into());
        }
    }

    let vectors = Vectors {
        version: 1,
        network,
        ufvk,
        addresses,
    };
    println!("{}", serde_json::to_string_pretty(&vectors)?);
    Ok(())
}
