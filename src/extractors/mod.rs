//! Structured extractors: deterministic parsers from utterance to intent.
//!
//! Extractors output typed fields, not free text. They use keyword and
//! pattern matching rather than a model, so the same text and date always
//! give the same intent.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

pub mod expense;
pub mod numeral;
pub mod rules;
pub mod trip;

pub use expense::{parse_expense_query_intent, ExpenseQueryExtractor};
pub use trip::{parse_trip_intent, TripIntentExtractor};

/// Utterances longer than this many bytes are not scanned.
pub const MAX_UTTERANCE_BYTES: usize = 4096;

/// A pure text-to-intent extractor.
pub trait Extractor {
    /// Intent produced by this extractor.
    type Output;

    /// Stable identifier used in logs.
    fn name(&self) -> &str;

    /// Extract an intent; relative dates resolve against `today`.
    fn extract(&self, text: &str, today: NaiveDate) -> Self::Output;
}

/// Borrow a lazily compiled pattern, if it compiled.
pub(crate) fn compiled(re: &LazyLock<Option<Regex>>) -> Option<&Regex> {
    let re: &Option<Regex> = re;
    re.as_ref()
}

pub(crate) fn is_oversized(text: &str) -> bool {
    text.len() > MAX_UTTERANCE_BYTES
}
