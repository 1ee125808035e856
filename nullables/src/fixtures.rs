//! Transaction builders shaped like the node's verbose output.

use pulse_governance::{encode_vote_bits, VoteChoice};
use pulse_ledger::{ScriptPubKey, TxInput, TxOutput, TxRecord};
use pulse_types::TxHash;

/// Deterministic transaction id from a seed.
pub fn tx_id(seed: u64) -> TxHash {
    let mut bytes = [0u8; 32];
    bytes[..8].copy_from_slice(&seed.to_be_bytes());
    bytes[31] = 0x7a;
    TxHash::new(bytes)
}

fn output(value: f64, kind: &str, hex: Option<String>, addresses: &[&str]) -> TxOutput {
    TxOutput {
        value: Some(value),
        script_pub_key: Some(ScriptPubKey {
            kind: Some(kind.to_string()),
            hex,
            addresses: addresses.iter().map(|a| a.to_string()).collect(),
        }),
    }
}

/// An ordinary payment spending a previous output.
pub fn regular_tx(txid: TxHash) -> TxRecord {
    TxRecord {
        txid,
        version: Some(1),
        expiry: Some(0),
        vin: vec![TxInput {
            txid: Some(tx_id(u64::MAX).to_string()),
            vout: Some(0),
            ..TxInput::default()
        }],
        vout: vec![output(1.25, "pubkeyhash", None, &["DsRegularPayee"])],
    }
}

/// A treasury spend carrying the `treasuryspend` input marker.
pub fn treasury_spend(txid: TxHash, expiry: u32, payouts: &[(f64, &str)]) -> TxRecord {
    let mut tx = minimal_treasury_spend(txid, expiry, payouts);
    tx.vin = vec![TxInput {
        treasury_spend: Some("c2".repeat(33)),
        ..TxInput::default()
    }];
    tx
}

/// A treasury spend as a minimal view reports it: no input marker, only
/// version 3 and `treasurygen` payouts.
pub fn minimal_treasury_spend(txid: TxHash, expiry: u32, payouts: &[(f64, &str)]) -> TxRecord {
    let mut vout = vec![output(0.0, "nulldata", Some(format!("6a20{}", "00".repeat(32))), &[])];
    vout.extend(
        payouts
            .iter()
            .map(|(value, payee)| output(*value, "treasurygen-pubkeyhash", None, &[*payee])),
    );
    TxRecord {
        txid,
        version: Some(3),
        expiry: Some(expiry),
        vin: Vec::new(),
        vout,
    }
}

/// A vote transaction casting `choice` on `target`.
///
/// `VoteChoice::Unknown` produces a vote with no treasury vote output.
pub fn vote(txid: TxHash, target: &TxHash, choice: VoteChoice) -> TxRecord {
    let mut vout = vec![
        output(0.0, "nulldata", Some(format!("6a24{}", "11".repeat(36))), &[]),
        output(0.0, "nulldata", Some("6a06010009000000".to_string()), &[]),
        output(1.5, "stakegen-pubkeyhash", None, &["DsTicketOwner"]),
    ];
    if let Some(script) = encode_vote_bits(target, choice) {
        vout.push(output(0.0, "nulldata", Some(script), &[]));
    }
    TxRecord {
        txid,
        version: Some(3),
        expiry: Some(0),
        vin: vec![
            TxInput {
                stakebase: Some("0000".into()),
                ..TxInput::default()
            },
            TxInput {
                txid: Some(tx_id(u64::MAX - 1).to_string()),
                vout: Some(0),
                ..TxInput::default()
            },
        ],
        vout,
    }
}

/// A ticket purchase: lives in the stake tree but is not a vote.
pub fn ticket(txid: TxHash) -> TxRecord {
    TxRecord {
        txid,
        version: Some(1),
        expiry: Some(0),
        vin: vec![TxInput {
            txid: Some(tx_id(u64::MAX - 2).to_string()),
            vout: Some(1),
            ..TxInput::default()
        }],
        vout: vec![output(150.0, "stakesubmission-pubkeyhash", None, &["DsTicket"])],
    }
}
