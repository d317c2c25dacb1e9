//! Random primitives over each property type's absolute domain.
//!
//! Unbounded generation never spans the full `f64`/`Decimal`/date range:
//! values outside the absolute domain below cannot round-trip through most
//! stores, so every generator clamps to it before applying rules.

use bo_core::PropType;
use chrono::{DateTime, NaiveDate, Utc};
use rand::distr::Alphanumeric;
use rand::rngs::StdRng;
use rand::Rng;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Smallest double ever generated.
pub const ABSOLUTE_MIN_DOUBLE: f64 = -1.0e12;

/// Largest double ever generated.
pub const ABSOLUTE_MAX_DOUBLE: f64 = 1.0e12;

/// Decimal places of generated decimals.
pub const DECIMAL_SCALE: u32 = 2;

/// Absolute decimal domain in hundredths.
pub const ABSOLUTE_MIN_DECIMAL_CENTS: i64 = -100_000_000_000_000;
pub const ABSOLUTE_MAX_DECIMAL_CENTS: i64 = 100_000_000_000_000;

/// Length of unrestricted generated strings.
pub const DEFAULT_STRING_LENGTH: usize = 12;

/// Extra length allowed above the minimum when no maximum is declared.
pub const DEFAULT_STRING_SPREAD: usize = 8;

/// Smallest date ever generated, as a Unix timestamp.
pub fn absolute_min_date() -> i64 {
    NaiveDate::from_ymd_opt(1900, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map_or(-2_208_988_800, |dt| dt.and_utc().timestamp())
}

/// Largest date ever generated, as a Unix timestamp.
pub fn absolute_max_date() -> i64 {
    NaiveDate::from_ymd_opt(2100, 12, 31)
        .and_then(|d| d.and_hms_opt(23, 59, 59))
        .map_or(4_133_980_799, |dt| dt.and_utc().timestamp())
}

/// Full domain of an integer property type.
pub fn integer_domain(prop_type: &PropType) -> (i64, i64) {
    match prop_type {
        PropType::Short => (i16::MIN as i64, i16::MAX as i64),
        PropType::Int => (i32::MIN as i64, i32::MAX as i64),
        _ => (i64::MIN, i64::MAX),
    }
}

/// Random integer in `[min, max]`.
pub fn random_integer(rng: &mut StdRng, min: i64, max: i64) -> i64 {
    rng.random_range(min..=max)
}

/// Random double in `[min, max]`.
pub fn random_double(rng: &mut StdRng, min: f64, max: f64) -> f64 {
    rng.random_range(min..=max)
}

/// Random decimal with two places, drawn in hundredths from `[min, max]`.
pub fn random_decimal(rng: &mut StdRng, min_cents: i64, max_cents: i64) -> Decimal {
    Decimal::new(rng.random_range(min_cents..=max_cents), DECIMAL_SCALE)
}

/// Random second-precision date between two Unix timestamps.
pub fn random_date(rng: &mut StdRng, min: i64, max: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(rng.random_range(min..=max), 0)
}

/// Random version 4 UUID drawn from the seeded generator.
pub fn random_guid(rng: &mut StdRng) -> Uuid {
    uuid::Builder::from_random_bytes(rng.random()).into_uuid()
}

/// Random UUID with its 128-bit value in `[min, max]`.
pub fn random_guid_between(rng: &mut StdRng, min: u128, max: u128) -> Uuid {
    Uuid::from_u128(rng.random_range(min..=max))
}

/// Random alphanumeric string of the given length.
pub fn random_string(rng: &mut StdRng, len: usize) -> String {
    (0..len).map(|_| rng.sample(Alphanumeric) as char).collect()
}

const ALPHANUMERIC: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Random alphanumeric character strictly between two optional characters.
pub fn random_char_between(
    rng: &mut StdRng,
    after: Option<char>,
    before: Option<char>,
) -> Option<char> {
    let candidates: Vec<char> = ALPHANUMERIC
        .iter()
        .map(|&b| b as char)
        .filter(|&c| after.map_or(true, |a| c > a) && before.map_or(true, |b| c < b))
        .collect();
    if candidates.is_empty() {
        return None;
    }
    Some(candidates[rng.random_range(0..candidates.len())])
}
