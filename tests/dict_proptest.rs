use proptest::prelude::*;
use shard_dict::ConcurrentDict;
use std::collections::HashMap;

// Model operations on ConcurrentDict against std HashMap and assert every
// return value and len() agree after each step.
proptest! {
    #[test]
    fn prop_dict_matches_model(
        shards in 0usize..100,
        ops in proptest::collection::vec((0u8..=4u8, 0usize..20usize, any::<i32>()), 1..200),
    ) {
        let d: ConcurrentDict<i32> = ConcurrentDict::new(shards);
        let mut model: HashMap<String, i32> = HashMap::new();

        for (op, raw_k, v) in ops {
            let key = format!("k{}", raw_k);
            match op {
                // Put: fresh iff absent in the model
                0 => {
                    let fresh = d.put(key.as_str(), v);
                    prop_assert_eq!(fresh, model.insert(key.clone(), v).is_none());
                }
                // Get
                1 => {
                    prop_assert_eq!(d.get(&key), model.get(&key).copied());
                }
                // Remove returns the previous value
                2 => {
                    prop_assert_eq!(d.remove(&key), model.remove(&key));
                }
                // Put if absent
                3 => {
                    let inserted = d.put_if_absent(key.as_str(), v);
                    let expect = !model.contains_key(&key);
                    if expect {
                        model.insert(key.clone(), v);
                    }
                    prop_assert_eq!(inserted, expect);
                }
                // Put if exists
                4 => {
                    let updated = d.put_if_exists(&key, v);
                    let expect = model.contains_key(&key);
                    if expect {
                        model.insert(key.clone(), v);
                    }
                    prop_assert_eq!(updated, expect);
                }
                _ => unreachable!(),
            }
            prop_assert_eq!(d.len(), model.len());
            prop_assert_eq!(d.contains_key(&key), model.contains_key(&key));
        }

        // Final invariant: iteration sees exactly the model's keys
        let mut keys: Vec<Vec<u8>> = d.keys();
        keys.sort();
        let mut expected: Vec<Vec<u8>> = model.keys().map(|k| k.as_bytes().to_vec()).collect();
        expected.sort();
        prop_assert_eq!(keys, expected);
    }
}
