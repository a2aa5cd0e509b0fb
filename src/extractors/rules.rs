//! Ordered first-match-wins rule lists.
//!
//! Each extraction pass is a slice of named rules tried top to bottom. The
//! first rule returning `Some` decides the field; later rules are not run.

use chrono::NaiveDate;

use super::numeral::is_numeral_char;

/// A named extraction rule.
pub struct Rule<T> {
    /// Stable identifier, used in logs and tests.
    pub name: &'static str,
    /// Returns `Some` when the rule applies to the text.
    pub apply: fn(&str, NaiveDate) -> Option<T>,
}

impl<T> Rule<T> {
    /// Create a rule.
    pub const fn new(name: &'static str, apply: fn(&str, NaiveDate) -> Option<T>) -> Self {
        Self { name, apply }
    }
}

/// Run `rules` in order and return the first match with the rule's name.
pub fn first_match<T>(rules: &[Rule<T>], text: &str, today: NaiveDate) -> Option<(&'static str, T)> {
    rules
        .iter()
        .find_map(|rule| (rule.apply)(text, today).map(|value| (rule.name, value)))
}

/// Returns `true` if `text` contains any of `phrases`.
///
/// Phrases that start with a number only match when the preceding character
/// does not continue that number, so "7天" does not fire inside "17天" and
/// "三天" does not fire inside "十三天".
pub fn contains_any(text: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|phrase| contains_phrase(text, phrase))
}

fn contains_phrase(text: &str, phrase: &str) -> bool {
    let continues: fn(char) -> bool = match phrase.chars().next() {
        Some(c) if c.is_ascii_digit() => |prev| prev.is_ascii_digit(),
        Some(c) if is_numeral_char(c) => is_numeral_char,
        _ => return text.contains(phrase),
    };
    text.match_indices(phrase)
        .any(|(idx, _)| !text[..idx].chars().next_back().is_some_and(continues))
}
