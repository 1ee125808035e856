use proptest::prelude::*;

use pulse_governance::{decode_vote_bits, encode_vote_bits, is_treasury_spend, VoteChoice};
use pulse_ledger::{ScriptPubKey, TxInput, TxOutput, TxRecord};
use pulse_types::TxHash;

fn choice() -> impl Strategy<Value = VoteChoice> {
    prop_oneof![
        Just(VoteChoice::Abstain),
        Just(VoteChoice::Yes),
        Just(VoteChoice::No),
        Just(VoteChoice::Invalid),
    ]
}

fn plain_output() -> impl Strategy<Value = TxOutput> {
    (
        proptest::option::of(0.0f64..1000.0),
        proptest::option::of("(pubkeyhash|scripthash|nulldata|stakegen|sstxchange)"),
    )
        .prop_map(|(value, kind)| TxOutput {
            value,
            script_pub_key: Some(ScriptPubKey {
                kind,
                hex: None,
                addresses: vec![],
            }),
        })
}

proptest! {
    /// Encoding a choice and decoding against the same hash returns the choice.
    #[test]
    fn vote_bits_roundtrip(bytes in prop::array::uniform32(0u8..), c in choice()) {
        let hash = TxHash::new(bytes);
        let script = encode_vote_bits(&hash, c).unwrap();
        prop_assert_eq!(decode_vote_bits(&script, &hash), c);
    }

    /// Decoding against any other hash is unknown.
    #[test]
    fn vote_bits_other_hash_unknown(
        a in prop::array::uniform32(0u8..),
        b in prop::array::uniform32(0u8..),
        c in choice(),
    ) {
        prop_assume!(a != b);
        let script = encode_vote_bits(&TxHash::new(a), c).unwrap();
        prop_assert_eq!(decode_vote_bits(&script, &TxHash::new(b)), VoteChoice::Unknown);
    }

    /// The decoder never panics on arbitrary text.
    #[test]
    fn vote_bits_tolerates_garbage(s in ".{0,120}", bytes in prop::array::uniform32(0u8..)) {
        let _ = decode_vote_bits(&s, &TxHash::new(bytes));
    }

    /// A treasury spend input marker always classifies as a spend.
    #[test]
    fn marker_input_always_matches(
        version in proptest::option::of(0u32..10),
        outputs in prop::collection::vec(plain_output(), 0..4),
        position in 0usize..3,
    ) {
        let mut vin = vec![TxInput::default(); 3];
        vin[position].treasury_spend = Some("c2".into());
        let tx = TxRecord { version, vin, vout: outputs, ..TxRecord::default() };
        prop_assert!(is_treasury_spend(&tx));
    }

    /// Without either signal nothing classifies as a spend.
    #[test]
    fn no_signal_never_matches(
        version in proptest::option::of(0u32..10),
        outputs in prop::collection::vec(plain_output(), 0..4),
    ) {
        let tx = TxRecord {
            version,
            vin: vec![TxInput::default()],
            vout: outputs,
            ..TxRecord::default()
        };
        prop_assert!(!is_treasury_spend(&tx));
    }
}
