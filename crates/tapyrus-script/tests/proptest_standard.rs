use proptest::prelude::*;

use tapyrus_script::standard::{
    extract_destination, script_for_destination, script_for_multisig, solve, Destination,
    ScriptType,
};
use tapyrus_script::Script;

/// Small multiples of the secp256k1 generator; all pass full validation.
const KEYS: [&str; 5] = [
    "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798",
    "02c6047f9441ed7d6d3045406e95c07cd85c778e4b8cef3ca7abac09b95c709ee5",
    "02f9308a019258c31049344f85f89d5229b531c845836f99b08601f113bce036f9",
    "02e493dbf1c10d80f3581e4904930b1404cc6c13900ee0758474fa94abe8c4cd13",
    "022f8bde4d1a07209355b4a7250a5c5128e88b84bddc619ab7cba8d569b240efe4",
];

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn solver_is_total_and_pure(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let script = Script::from_bytes(&data);
        let first = solve(&script);
        let second = solve(&script);
        // A type tag is always set and identical input yields identical output.
        prop_assert_eq!(&first, &second);
        // The failure flag only ever pairs with NonStandard and no solutions.
        if !first.valid {
            prop_assert_eq!(first.script_type, ScriptType::NonStandard);
            prop_assert!(first.solutions.is_empty());
        }
    }

    #[test]
    fn key_hash_destination_roundtrip(hash in any::<[u8; 20]>()) {
        let destination = Destination::KeyHash(hash);
        let script = script_for_destination(&destination);
        prop_assert_eq!(solve(&script).script_type, ScriptType::PubKeyHash);
        prop_assert_eq!(extract_destination(&script).unwrap(), destination);
    }

    #[test]
    fn script_hash_destination_roundtrip(hash in any::<[u8; 20]>()) {
        let destination = Destination::ScriptHash(hash);
        let script = script_for_destination(&destination);
        prop_assert_eq!(solve(&script).script_type, ScriptType::ScriptHash);
        prop_assert_eq!(extract_destination(&script).unwrap(), destination);
    }

    #[test]
    fn multisig_build_solve_roundtrip(count in 1usize..=5, threshold in 1usize..=5) {
        prop_assume!(threshold <= count);
        let keys: Vec<Vec<u8>> = KEYS[..count]
            .iter()
            .map(|k| hex::decode(k).unwrap())
            .collect();
        let script = script_for_multisig(threshold, &keys).unwrap();
        let solution = solve(&script);
        prop_assert!(solution.valid);
        prop_assert_eq!(solution.script_type, ScriptType::Multisig);
        prop_assert_eq!(solution.solutions.len(), count + 2);
        prop_assert_eq!(&solution.solutions[0], &vec![threshold as u8]);
        prop_assert_eq!(&solution.solutions[count + 1], &vec![count as u8]);
        for (i, key) in keys.iter().enumerate() {
            prop_assert_eq!(&solution.solutions[i + 1], key);
        }
    }

    #[test]
    fn script_hex_roundtrip(data in prop::collection::vec(any::<u8>(), 0..256)) {
        let script = Script::from_bytes(&data);
        let script2 = Script::from_hex(&script.to_hex()).unwrap();
        prop_assert_eq!(script.to_bytes(), script2.to_bytes());
    }
}
