//! Caller-owned form state that parsed intents are folded into.
//!
//! Intents are immutable snapshots of one utterance. A form accumulates them
//! across several utterances: found fields overwrite, missing fields keep
//! what the user already had, and special-needs notes pile up.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::types::{DateRange, ExpenseCategory, ExpenseQueryIntent, PreferenceTag, TripIntent};

/// Separator between accumulated special-needs notes.
pub const SPECIAL_NEEDS_SEPARATOR: &str = "、";

/// Trip-planner form fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripForm {
    /// Destination field.
    pub destination: String,
    /// Start date field.
    pub start_date: Option<NaiveDate>,
    /// End date field.
    pub end_date: Option<NaiveDate>,
    /// Budget field in base currency units.
    pub budget_amount: f64,
    /// Party size field.
    pub traveler_count: u32,
    /// Selected interests.
    pub preference_tags: BTreeSet<PreferenceTag>,
    /// Free-text notes.
    pub special_needs: String,
}

impl TripForm {
    /// Fold an intent into the form.
    pub fn apply(&mut self, intent: &TripIntent) {
        if !intent.destination.is_empty() {
            self.destination.clone_from(&intent.destination);
        }
        if let (Some(start), Some(end)) = (intent.start_date, intent.end_date) {
            self.start_date = Some(start);
            self.end_date = Some(end);
        }
        if intent.budget_amount > 0.0 {
            self.budget_amount = intent.budget_amount;
        }
        if intent.traveler_count > 0 {
            self.traveler_count = intent.traveler_count;
        }
        self.preference_tags
            .extend(intent.preference_tags.iter().copied());
        if !intent.special_needs.is_empty() {
            self.append_special_need(&intent.special_needs);
        }
    }

    /// Append a note unless it is already recorded.
    pub fn append_special_need(&mut self, note: &str) {
        if self
            .special_needs
            .split(SPECIAL_NEEDS_SEPARATOR)
            .any(|existing| existing == note)
        {
            return;
        }
        if !self.special_needs.is_empty() {
            self.special_needs.push_str(SPECIAL_NEEDS_SEPARATOR);
        }
        self.special_needs.push_str(note);
    }
}

/// Expense-query form fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseQueryForm {
    /// Category filter; `None` means all categories.
    pub category: Option<ExpenseCategory>,
    /// Queried period.
    pub range: DateRange,
    /// Text for downstream analysis.
    pub query: String,
}

impl ExpenseQueryForm {
    /// Initial state: all categories over the default trailing window.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            category: None,
            range: DateRange::default_window(today),
            query: String::new(),
        }
    }

    /// Fold an intent into the form.
    pub fn apply(&mut self, intent: &ExpenseQueryIntent) {
        if intent.category.is_some() {
            self.category = intent.category;
        }
        if intent.date_range_recognized {
            self.range = intent.date_range();
        }
        self.query.clone_from(&intent.free_text_query);
    }
}
