//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the invariants the tiers rely on.

use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};

use crate::cache::{codec, CacheEntry, CacheIdentifier, ExpiresAfter, MemoryTier};

// == Strategies ==
fn key_strategy() -> impl Strategy<Value = String> {
    ".{0,64}".prop_map(|s| s)
}

fn expires_strategy() -> impl Strategy<Value = ExpiresAfter> {
    (0u32..3, 0u32..24, 0u32..40, 0u32..48, 0u32..120, 0u32..120).prop_map(
        |(years, months, days, hours, minutes, seconds)| ExpiresAfter {
            years,
            months,
            days,
            hours,
            minutes,
            seconds,
        },
    )
}

#[derive(Debug, Clone)]
enum MemoryOp {
    Put { key: String, value: u32 },
    Get { key: String },
    Remove { key: String },
    Evict { key: String },
}

fn memory_op_strategy() -> impl Strategy<Value = MemoryOp> {
    let key = "[a-e]{1,2}";
    prop_oneof![
        (key, any::<u32>()).prop_map(|(key, value)| MemoryOp::Put { key, value }),
        key.prop_map(|key| MemoryOp::Get { key }),
        key.prop_map(|key| MemoryOp::Remove { key }),
        key.prop_map(|key| MemoryOp::Evict { key }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Hashing is deterministic and always yields a filesystem-safe name.
    #[test]
    fn prop_identifier_stable_and_safe(key in key_strategy()) {
        let first = CacheIdentifier::from_key(&key).unwrap();
        let second = CacheIdentifier::from_key(&key).unwrap();

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.as_str().len(), 40);
        prop_assert!(first.as_str().bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()));
    }

    // Any key and payload survive the disk encoding.
    #[test]
    fn prop_codec_preserves_entry(
        key in key_strategy(),
        payload in any::<Vec<(i64, String)>>(),
        expires in proptest::option::of(expires_strategy()),
    ) {
        let entry = CacheEntry::new(key, payload, expires);
        let decoded: CacheEntry<Vec<(i64, String)>> =
            codec::decode(&codec::encode(&entry).unwrap()).unwrap();
        prop_assert_eq!(decoded, entry);
    }

    // Truncating an encoded entry never decodes into something else.
    #[test]
    fn prop_truncated_bytes_never_decode(payload in ".{0,64}", cut in 1usize..32) {
        let bytes = codec::encode(&CacheEntry::new("k", payload, None)).unwrap();
        let cut = cut.min(bytes.len());
        prop_assert!(codec::decode::<String>(&bytes[..bytes.len() - cut]).is_err());
    }

    // The expiry instant is never before creation, and an entry is stale
    // exactly from that instant on.
    #[test]
    fn prop_expiry_boundary(expires in expires_strategy(), offset_days in 0i64..3650) {
        let created = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap() + Duration::days(offset_days);
        let mut entry = CacheEntry::new("k", 0u8, Some(expires));
        entry.created_at = created;

        let expiry = entry.expires_at().unwrap();
        prop_assert!(expiry >= created);
        prop_assert!(entry.is_expired_at(expiry));
        if expiry > created {
            prop_assert!(!entry.is_expired_at(expiry - Duration::nanoseconds(1)));
        }
    }

    // Display output always parses back to the same offset.
    #[test]
    fn prop_expiry_text_round_trip(expires in expires_strategy()) {
        let parsed: ExpiresAfter = expires.to_string().parse().unwrap();
        prop_assert_eq!(parsed, expires);
    }

    // The memory tier never exceeds capacity, and whatever it returns is the
    // latest value put for that key.
    #[test]
    fn prop_memory_tier_never_returns_stale(
        capacity in 1usize..6,
        ops in prop::collection::vec(memory_op_strategy(), 1..80),
    ) {
        let mut tier = MemoryTier::new(capacity);
        let mut latest: HashMap<String, u32> = HashMap::new();

        for op in ops {
            match op {
                MemoryOp::Put { key, value } => {
                    let id = CacheIdentifier::from_key(&key).unwrap();
                    tier.put(id, Arc::new(CacheEntry::new(key.clone(), value, None)));
                    latest.insert(key, value);
                }
                MemoryOp::Get { key } => {
                    let id = CacheIdentifier::from_key(&key).unwrap();
                    if let Some(entry) = tier.get(&id) {
                        prop_assert_eq!(Some(&entry.payload), latest.get(&key));
                    }
                }
                MemoryOp::Remove { key } => {
                    tier.remove(&CacheIdentifier::from_key(&key).unwrap());
                    latest.remove(&key);
                }
                MemoryOp::Evict { key } => {
                    tier.evict(&CacheIdentifier::from_key(&key).unwrap());
                }
            }

            prop_assert!(tier.len() <= capacity, "{} entries over capacity {}", tier.len(), capacity);
        }
    }
}
