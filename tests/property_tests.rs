//! Property-based tests for the round trip guarantees of the writer and reader.
//!
//! These complement the pinned format tests by running generated values
//! through both the compact and the fully formatted layouts.

use korm::{from_str, to_string, to_string_with_options, KormOptions};
use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

fn roundtrip_with<T: Serialize + for<'de> Deserialize<'de> + PartialEq + std::fmt::Debug>(
    value: &T,
    options: KormOptions,
) -> bool {
    match to_string_with_options(value, options) {
        Ok(serialized) => match from_str::<T>(&serialized) {
            Ok(deserialized) => *value == deserialized,
            Err(e) => {
                eprintln!("Deserialize failed: {}", e);
                eprintln!("Serialized was: {}", serialized);
                false
            }
        },
        Err(e) => {
            eprintln!("Serialize failed: {}", e);
            false
        }
    }
}

fn roundtrip<T: Serialize + for<'de> Deserialize<'de> + PartialEq + std::fmt::Debug>(
    value: &T,
) -> bool {
    roundtrip_with(value, KormOptions::none())
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
struct Profile {
    id: u32,
    name: String,
    score: Option<i64>,
    tags: Vec<String>,
}

fn profile() -> impl Strategy<Value = Profile> {
    (
        any::<u32>(),
        any::<String>(),
        proptest::option::of(any::<i64>()),
        prop::collection::vec("[a-z]{0,8}", 0..5),
    )
        .prop_map(|(id, name, score, tags)| Profile {
            id,
            name,
            score,
            tags,
        })
}

proptest! {
    #[test]
    fn prop_i32(n in any::<i32>()) {
        prop_assert!(roundtrip(&n));
    }

    #[test]
    fn prop_i64(n in any::<i64>()) {
        prop_assert!(roundtrip(&n));
    }

    #[test]
    fn prop_u64(n in any::<u64>()) {
        prop_assert!(roundtrip(&n));
    }

    #[test]
    fn prop_bool(b in any::<bool>()) {
        prop_assert!(roundtrip(&b));
    }

    #[test]
    fn prop_f64(f in -1e12f64..1e12f64) {
        prop_assert!(roundtrip(&f));
    }

    #[test]
    fn prop_string(s in any::<String>()) {
        prop_assert!(roundtrip(&s));
    }

    #[test]
    fn prop_char(c in any::<char>()) {
        prop_assert!(roundtrip(&c));
    }

    #[test]
    fn prop_vec_i32(v in prop::collection::vec(any::<i32>(), 0..20)) {
        prop_assert!(roundtrip(&v));
    }

    #[test]
    fn prop_option_i32(opt in proptest::option::of(any::<i32>())) {
        prop_assert!(roundtrip(&opt));
    }

    #[test]
    fn prop_tuple_i32_bool(t in (any::<i32>(), any::<bool>())) {
        prop_assert!(roundtrip(&t));
    }

    #[test]
    fn prop_string_keyed_map(
        m in prop::collection::btree_map(any::<String>(), any::<i32>(), 0..8)
    ) {
        prop_assert!(roundtrip(&m));
    }

    #[test]
    fn prop_int_keyed_map(m in prop::collection::hash_map(any::<i32>(), "[ -~]{0,12}", 0..8)) {
        let m: HashMap<i32, String> = m;
        prop_assert!(roundtrip(&m));
    }

    #[test]
    fn prop_struct(p in profile()) {
        prop_assert!(roundtrip(&p));
    }

    #[test]
    fn prop_struct_formatted(p in profile()) {
        prop_assert!(roundtrip_with(&p, KormOptions::max()));
    }

    #[test]
    fn prop_records_by_name_formatted(
        m in prop::collection::btree_map("[a-z]{1,6}", profile(), 0..4)
    ) {
        let m: BTreeMap<String, Profile> = m;
        prop_assert!(roundtrip_with(&m, KormOptions::max()));
    }
}
