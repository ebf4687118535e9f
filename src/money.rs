//! Conversion of raw entered amounts into the units the ledger stores.
//!
//! Every monetary amount typed into a form is scaled down by a fixed factor
//! before it is handed to any database function, so the stores only ever see
//! normalized values.

/// The fixed factor every raw input amount is divided by before persistence.
pub const INPUT_SCALE_FACTOR: f64 = 120.0;

/// The minimum normalized amount each member is expected to contribute per
/// month. Monthly totals below this are reported as shortfalls.
pub const EXPECTED_PER_MEMBER: f64 = 1000.0 / INPUT_SCALE_FACTOR;

/// Scale a raw user-entered amount down to ledger units, rounded to two
/// decimal places.
pub fn normalize_amount(raw_amount: f64) -> f64 {
    (raw_amount / INPUT_SCALE_FACTOR * 100.0).round() / 100.0
}
