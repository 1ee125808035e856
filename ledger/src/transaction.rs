//! Structural transaction records.
//!
//! Field names follow the node's verbose transaction JSON. Everything
//! defaults when missing, so a minimal mempool view deserializes into a
//! record with empty inputs rather than failing.

use serde::{Deserialize, Serialize};

use pulse_types::{Amount, TxHash};

/// A transaction as reported by the ledger source.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TxRecord {
    pub txid: TxHash,
    #[serde(default)]
    pub version: Option<u32>,
    #[serde(default)]
    pub expiry: Option<u32>,
    #[serde(default)]
    pub vin: Vec<TxInput>,
    #[serde(default)]
    pub vout: Vec<TxOutput>,
}

/// A transaction input.
///
/// Regular inputs reference a previous output by `txid`/`vout`. Treasury
/// spends carry a `treasuryspend` script instead, and votes carry a
/// `stakebase` marker on their first input.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TxInput {
    #[serde(default, rename = "treasuryspend", skip_serializing_if = "Option::is_none")]
    pub treasury_spend: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stakebase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vout: Option<u32>,
}

/// A transaction output.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TxOutput {
    /// Output value in coins.
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default, rename = "scriptPubKey")]
    pub script_pub_key: Option<ScriptPubKey>,
}

/// The locking script of an output.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptPubKey {
    /// Script class descriptor, e.g. `nulldata` or `treasurygen-pubkeyhash`.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Raw script bytes, hex-encoded.
    #[serde(default)]
    pub hex: Option<String>,
    #[serde(default)]
    pub addresses: Vec<String>,
}

impl TxRecord {
    /// Sum of every output value.
    pub fn total_output(&self) -> Amount {
        self.vout
            .iter()
            .filter_map(|out| out.value)
            .map(Amount::from_coins)
            .sum()
    }

    /// First address found across the outputs, in output order.
    pub fn first_payee(&self) -> Option<&str> {
        self.vout
            .iter()
            .filter_map(|out| out.script_pub_key.as_ref())
            .find_map(|script| script.addresses.first())
            .map(String::as_str)
    }
}

impl TxOutput {
    /// Script class descriptor, if the node reported one.
    pub fn script_kind(&self) -> Option<&str> {
        self.script_pub_key.as_ref()?.kind.as_deref()
    }

    /// Raw script hex, if the node reported one.
    pub fn script_hex(&self) -> Option<&str> {
        self.script_pub_key.as_ref()?.hex.as_deref()
    }
}
