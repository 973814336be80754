// Dictionary property tests.
//
// Property: update over arbitrary (key, value) pairs on top of an arbitrary
// starting dictionary.
//  - Model: std HashMap, updated with last-write-wins per pair.
//  - Invariant: every key holds the model's value; len equals the count of
//    distinct keys across the start state and the input.
//
// Property: strict erase.
//  - erase(k) is Ok iff the model held k; Err is InvalidKey(k).
use chained_hashmap::{Dictionary, DictionaryError};
use proptest::prelude::*;
use std::collections::HashMap;

fn arb_pairs(max: usize) -> impl Strategy<Value = Vec<(String, String)>> {
    proptest::collection::vec(("[a-f]{1,2}", "[0-9]{0,3}"), 0..max)
}

proptest! {
    #[test]
    fn prop_update_matches_model(start in arb_pairs(40), input in arb_pairs(80)) {
        let mut d: Dictionary = start.iter().cloned().collect();
        let mut model: HashMap<String, String> = start.into_iter().collect();

        d.update(input.clone());
        for (k, v) in input {
            model.insert(k, v);
        }

        prop_assert_eq!(d.len(), model.len());
        for (k, v) in &model {
            prop_assert_eq!(d.at(k.as_str()), Ok(v));
        }
        prop_assert_eq!(d.iter().count(), model.len());
    }

    #[test]
    fn prop_erase_is_strict(start in arb_pairs(40), probes in proptest::collection::vec("[a-f]{1,2}", 0..40)) {
        let mut d: Dictionary = start.iter().cloned().collect();
        let mut model: HashMap<String, String> = start.into_iter().collect();

        for k in probes {
            match d.erase(&k) {
                Ok(()) => prop_assert!(model.remove(&k).is_some()),
                Err(DictionaryError::InvalidKey(bad)) => {
                    prop_assert_eq!(&bad, &k);
                    prop_assert!(!model.contains_key(&k));
                }
                Err(other) => prop_assert!(false, "unexpected error {:?}", other),
            }
            prop_assert_eq!(d.len(), model.len());
        }
    }
}
