use super::*;

use bytes::BytesMut;
use proptest::prelude::*;
use std::collections::BTreeMap;

use crate::ErrorKind;

fn validate_tree<V>(t: &RadixTree<V>) {
    if let Err(err) = t.check_well_formed() {
        panic!("malformed tree: {}", err);
    }
}

fn sorted_entries(t: &RadixTree<u32>) -> Vec<(Vec<u8>, u32)> {
    let mut entries: Vec<(Vec<u8>, u32)> = t.iter().map(|(k, v)| (k, *v)).collect();
    entries.sort();
    entries
}

#[derive(Clone, Debug)]
enum Op {
    Insert(Vec<u8>, u32),
    Remove(Vec<u8>),
    Get(Vec<u8>),
}

fn key_strategy() -> impl Strategy<Value = Vec<u8>> + Clone {
    // A small alphabet makes keys share prefixes, which is where splits and
    // merges happen.
    prop::collection::vec(b'a'..=b'd', 0..=8)
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let key = key_strategy();
    let op = prop_oneof![
        50 => (key.clone(), any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        30 => key.clone().prop_map(Op::Remove),
        20 => key.prop_map(Op::Get),
    ];
    prop::collection::vec(op, 0..=500)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence(ops in ops_strategy()) {
        let mut t: RadixTree<u32> = RadixTree::new();
        let mut m: BTreeMap<Vec<u8>, u32> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(key, value) => {
                    if key.is_empty() {
                        match t.insert(&key, value) {
                            Err(crate::Error(ErrorKind::EmptyKey, _)) => {}
                            other => panic!("empty key accepted: {:?}", other),
                        }
                    } else {
                        let old_t = t.insert(&key, value).unwrap();
                        let old_m = m.insert(key, value);
                        prop_assert_eq!(old_t, old_m);
                    }
                }
                Op::Remove(key) => {
                    let old_t = t.remove(&key);
                    let old_m = m.remove(key.as_slice());
                    prop_assert_eq!(old_t, old_m);
                }
                Op::Get(key) => {
                    let got_t = t.get(&key).copied();
                    let got_m = m.get(key.as_slice()).copied();
                    prop_assert_eq!(got_t, got_m);
                }
            }

            prop_assert_eq!(t.len(), m.len());
            validate_tree(&t);
        }

        let expected: Vec<(Vec<u8>, u32)> = m.iter().map(|(k, v)| (k.clone(), *v)).collect();
        prop_assert_eq!(sorted_entries(&t), expected);
    }

    #[test]
    fn prop_prefix_iter_matches_model(
        keys in prop::collection::btree_set(key_strategy(), 0..=64),
        prefix in key_strategy(),
    ) {
        let mut t: RadixTree<u32> = RadixTree::new();
        for (idx, key) in keys.iter().enumerate().filter(|(_, k)| !k.is_empty()) {
            t.insert(key, idx as u32).unwrap();
        }

        let mut got: Vec<Vec<u8>> = t.iter_prefix(&prefix).map(|(k, _)| k).collect();
        got.sort();
        let expected: Vec<Vec<u8>> = keys
            .iter()
            .filter(|k| !k.is_empty() && k.starts_with(&prefix))
            .cloned()
            .collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_complete_keeps_candidates(
        keys in prop::collection::btree_set(key_strategy(), 1..=64),
        prefix in key_strategy(),
    ) {
        let mut t: RadixTree<u32> = RadixTree::new();
        for key in keys.iter().filter(|k| !k.is_empty()) {
            t.insert(key, 1).unwrap();
        }

        let candidates = |p: &[u8]| -> Vec<Vec<u8>> {
            keys.iter()
                .filter(|k| !k.is_empty() && k.starts_with(p))
                .cloned()
                .collect()
        };

        let mut buf = BytesMut::from(&prefix[..]);
        if t.complete(&mut buf) {
            prop_assert!(buf.len() > prefix.len());
            prop_assert!(buf.starts_with(&prefix));
            // Extending never drops a key that matched before.
            prop_assert_eq!(candidates(&buf), candidates(&prefix));
            prop_assert!(!candidates(&buf).is_empty());

            let settled = buf.clone();
            prop_assert!(!t.complete(&mut buf));
            prop_assert_eq!(buf, settled);
        } else {
            prop_assert_eq!(&buf[..], &prefix[..]);
        }
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

fn small_keys() -> Vec<Vec<u8>> {
    vec![
        b"a".to_vec(),
        b"b".to_vec(),
        b"ab".to_vec(),
        b"abc".to_vec(),
        b"abd".to_vec(),
        b"ba".to_vec(),
    ]
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys = small_keys();

    for_each_permutation(&keys, |perm| {
        let mut t: RadixTree<u32> = RadixTree::new();
        let mut m: BTreeMap<Vec<u8>, u32> = BTreeMap::new();

        for (i, k) in perm.into_iter().enumerate() {
            let v = i as u32;
            assert_eq!(t.insert(&k, v).unwrap(), m.insert(k, v));
            validate_tree(&t);
        }

        let expected: Vec<(Vec<u8>, u32)> = m.iter().map(|(k, v)| (k.clone(), *v)).collect();
        assert_eq!(sorted_entries(&t), expected);
    });
}

#[test]
fn exhaustive_remove_order_small_set() {
    let keys = small_keys();

    // Insert in a fixed order, then remove in all permutations.
    let mut base_tree: RadixTree<u32> = RadixTree::new();
    let mut base_map: BTreeMap<Vec<u8>, u32> = BTreeMap::new();
    for (i, k) in keys.iter().enumerate() {
        let v = i as u32;
        assert_eq!(base_tree.insert(k, v).unwrap(), base_map.insert(k.clone(), v));
    }

    for_each_permutation(&keys, |perm| {
        let mut t = base_tree.clone();
        let mut m = base_map.clone();

        for k in perm {
            assert_eq!(t.remove(&k), m.remove(k.as_slice()));
            assert_eq!(t.len(), m.len());
            validate_tree(&t);

            for (key, value) in m.iter() {
                assert_eq!(t.get(key), Some(value));
            }
        }
        assert!(t.is_empty());
        assert_eq!(t.iter().count(), 0);
    });
}
