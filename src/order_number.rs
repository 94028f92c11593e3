//! Human-readable order numbers: `ORD-<YYYYMMDD>-<6 uppercase base-36 chars>`.
//!
//! The suffix is drawn from the 128 random bits of a fresh UUIDv4, reduced to
//! base 36, which gives 36^6 (about 2.2 billion) possible values per day.
//! Collisions are treated as negligible; the unique constraint on
//! `orders.order_number` is the final arbiter and callers may re-roll on a
//! conflict.

use chrono::Utc;
use uuid::Uuid;

const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const SUFFIX_LEN: usize = 6;

/// Generates a fresh order number for the current UTC date.
pub fn generate() -> String {
    let mut bits = Uuid::new_v4().as_u128();
    let mut suffix = String::with_capacity(SUFFIX_LEN);
    for _ in 0..SUFFIX_LEN {
        suffix.push(ALPHABET[(bits % ALPHABET.len() as u128) as usize] as char);
        bits /= ALPHABET.len() as u128;
    }
    format!("ORD-{}-{}", Utc::now().format("%Y%m%d"), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn assert_well_formed(number: &str) {
        let parts: Vec<&str> = number.split('-').collect();
        assert_eq!(parts.len(), 3, "unexpected shape: {number}");
        assert_eq!(parts[0], "ORD");
        assert_eq!(parts[1].len(), 8);
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), SUFFIX_LEN);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn format_matches_contract() {
        for _ in 0..10_000 {
            assert_well_formed(&generate());
        }
    }

    #[test]
    fn date_component_is_today_utc() {
        let number = generate();
        let expected = Utc::now().format("%Y%m%d").to_string();
        assert_eq!(&number[4..12], expected);
    }

    #[test]
    fn repeated_generation_is_collision_free_in_practice() {
        // 10,000 draws from a 36^6 space may see the odd birthday collision
        // (~2% chance of one pair); anything beyond a couple of duplicates
        // means the suffix is not actually random.
        let numbers: HashSet<String> = (0..10_000).map(|_| generate()).collect();
        assert!(numbers.len() >= 9_998, "only {} distinct numbers", numbers.len());
    }

    #[test]
    fn small_batches_are_unique() {
        let numbers: HashSet<String> = (0..1_000).map(|_| generate()).collect();
        assert_eq!(numbers.len(), 1_000);
    }
}
