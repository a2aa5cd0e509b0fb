//! Intent records produced by the utterance parser.
//!
//! Intents are plain data: built fresh on every parse and never mutated
//! afterwards. Callers fold them into their own state (see [`crate::form`]).

use std::collections::BTreeSet;
use std::fmt;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Width of the expense-query window applied when no date phrase is recognised.
pub const DEFAULT_EXPENSE_WINDOW_DAYS: u64 = 30;

/// Coarse quality signal for how much of an intent was extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Little or nothing useful was found.
    Low,
    /// Some fields were found.
    Medium,
    /// The key fields were found.
    High,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        f.write_str(label)
    }
}

/// Travel interest drawn from a fixed vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreferenceTag {
    /// 美食
    Food,
    /// 动漫
    Anime,
    /// 亲子
    Family,
    /// 历史
    History,
    /// 自然
    Nature,
    /// 购物
    Shopping,
    /// 冒险
    Adventure,
}

impl PreferenceTag {
    /// Every tag, in display order.
    pub const ALL: [PreferenceTag; 7] = [
        Self::Food,
        Self::Anime,
        Self::Family,
        Self::History,
        Self::Nature,
        Self::Shopping,
        Self::Adventure,
    ];

    /// The literal phrase that selects this tag in an utterance.
    pub fn label(self) -> &'static str {
        match self {
            Self::Food => "美食",
            Self::Anime => "动漫",
            Self::Family => "亲子",
            Self::History => "历史",
            Self::Nature => "自然",
            Self::Shopping => "购物",
            Self::Adventure => "冒险",
        }
    }
}

/// Expense category drawn from a fixed vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    /// Food and drink.
    Meals,
    /// Taxis, trains, flights.
    Transport,
    /// Hotels and other accommodation.
    Lodging,
    /// Purchases.
    Shopping,
    /// Tickets and entertainment.
    Activities,
    /// Anything else.
    Other,
}

impl ExpenseCategory {
    /// Display label used by the expense ledger.
    pub fn label(self) -> &'static str {
        match self {
            Self::Meals => "餐饮",
            Self::Transport => "交通",
            Self::Lodging => "住宿",
            Self::Shopping => "购物",
            Self::Activities => "活动",
            Self::Other => "其他",
        }
    }
}

/// Inclusive date range with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Build a range, swapping the bounds if they arrive inverted.
    pub fn new(a: NaiveDate, b: NaiveDate) -> Self {
        if b < a {
            Self { start: b, end: a }
        } else {
            Self { start: a, end: b }
        }
    }

    /// A single-day range.
    pub fn single(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    /// `[today - days, today]`, clamped at the earliest representable date.
    pub fn trailing(today: NaiveDate, days: u64) -> Self {
        let start = today.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN);
        Self::new(start, today)
    }

    /// The window used when an expense query names no period.
    pub fn default_window(today: NaiveDate) -> Self {
        Self::trailing(today, DEFAULT_EXPENSE_WINDOW_DAYS)
    }

    /// First day of the range.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the range.
    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

/// Structured travel-planning request extracted from an utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripIntent {
    /// Free-text place name; empty when not found.
    pub destination: String,
    /// First day of the trip.
    pub start_date: Option<NaiveDate>,
    /// Last day of the trip (inclusive).
    pub end_date: Option<NaiveDate>,
    /// Trip length in days; 0 when not found.
    pub duration_days: u32,
    /// Budget in base currency units; 0 when not found.
    pub budget_amount: f64,
    /// Number of travellers; 0 when not found.
    pub traveler_count: u32,
    /// Interests named in the utterance.
    pub preference_tags: BTreeSet<PreferenceTag>,
    /// Free-text notes such as travelling with children.
    pub special_needs: String,
    /// Extraction quality.
    pub confidence: Confidence,
    /// Verbatim input.
    pub original_text: String,
}

impl TripIntent {
    /// An intent with nothing extracted.
    pub fn empty(original_text: &str) -> Self {
        Self {
            destination: String::new(),
            start_date: None,
            end_date: None,
            duration_days: 0,
            budget_amount: 0.0,
            traveler_count: 0,
            preference_tags: BTreeSet::new(),
            special_needs: String::new(),
            confidence: Confidence::Low,
            original_text: original_text.to_owned(),
        }
    }
}

/// Structured expense lookup extracted from an utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseQueryIntent {
    /// Selected category, if any keyword matched.
    pub category: Option<ExpenseCategory>,
    /// First day of the queried period.
    pub start_date: NaiveDate,
    /// Last day of the queried period (inclusive).
    pub end_date: NaiveDate,
    /// `false` when the period is the default trailing window.
    pub date_range_recognized: bool,
    /// The utterance, passed through for downstream analysis.
    pub free_text_query: String,
    /// Extraction quality.
    pub confidence: Confidence,
}

impl ExpenseQueryIntent {
    /// The queried period as a range.
    pub fn date_range(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }
}
