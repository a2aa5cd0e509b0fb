//! Expense-query utterance extractor.
//!
//! Turns requests like "帮我看最近一周吃饭的花销" into a category and an
//! absolute date range for the expense ledger.

use std::sync::LazyLock;

use chrono::{Datelike, Days, NaiveDate};
use regex::Regex;

use super::numeral::parse_chinese_numeral;
use super::rules::{contains_any, first_match, Rule};
use super::{compiled, is_oversized, Extractor};
use crate::types::{Confidence, DateRange, ExpenseCategory, ExpenseQueryIntent};

/// Trigger keywords per category, in priority order.
pub const CATEGORY_KEYWORDS: &[(ExpenseCategory, &[&str])] = &[
    (
        ExpenseCategory::Meals,
        &["食物", "吃", "饭", "餐", "美食", "小吃", "咖啡", "奶茶", "外卖"],
    ),
    (
        ExpenseCategory::Transport,
        &["交通", "打车", "地铁", "公交", "出租车", "高铁", "火车", "机票", "车费"],
    ),
    (
        ExpenseCategory::Lodging,
        &["住宿", "酒店", "住", "宾馆", "民宿", "房费"],
    ),
    (
        ExpenseCategory::Shopping,
        &["购物", "买", "商场", "超市", "纪念品", "特产"],
    ),
    (
        ExpenseCategory::Activities,
        &["活动", "娱乐", "玩", "门票", "景点", "演出"],
    ),
    (ExpenseCategory::Other, &["其他", "其它"]),
];

static RECENT_PERIOD: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?:最近|过去|近)\s*([0-9]+|[一二两三四五六七八九十百]+)\s*个?(天|周|星期|月)").ok()
});

static EXPLICIT_RANGE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"([0-9]{1,2})[-月]([0-9]{1,2})[日号]?\s*(?:到|至|~|-)\s*([0-9]{1,2})[-月]([0-9]{1,2})[日号]?",
    )
    .ok()
});

static FULL_DATE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"([0-9]{4})[-年/.]([0-9]{1,2})[-月/.]([0-9]{1,2})[日号]?").ok()
});

static SINGLE_MONTH_DAY: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"([0-9]{1,2})月([0-9]{1,2})[日号]?").ok());

const DATE_RANGE_RULES: &[Rule<DateRange>] = &[
    Rule::new("today", |text, today| {
        contains_any(text, &["今天", "今日", "当天", "今儿"]).then(|| DateRange::single(today))
    }),
    Rule::new("yesterday", |text, today| {
        contains_any(text, &["昨天", "昨日", "昨儿"])
            .then(|| days_ago(today, 1).map(DateRange::single))
            .flatten()
    }),
    Rule::new("last_week", |text, today| {
        contains_any(text, &["一周", "7天", "七天", "最近一周"]).then(|| DateRange::trailing(today, 7))
    }),
    Rule::new("last_three_days", |text, today| {
        contains_any(text, &["三天", "3天"]).then(|| DateRange::trailing(today, 3))
    }),
    Rule::new("last_month", |text, today| {
        contains_any(text, &["一个月", "30天", "三十天", "最近一个月"])
            .then(|| DateRange::trailing(today, 30))
    }),
    Rule::new("three_days_ago", |text, today| {
        text.contains("大前天")
            .then(|| days_ago(today, 3).map(DateRange::single))
            .flatten()
    }),
    Rule::new("day_before_yesterday", |text, today| {
        contains_any(text, &["前天", "前日"])
            .then(|| days_ago(today, 2).map(DateRange::single))
            .flatten()
    }),
    Rule::new("this_week", this_week),
    Rule::new("this_month", this_month),
    Rule::new("recent_period", recent_period),
    Rule::new("explicit_range", explicit_range),
    Rule::new("previous_week", previous_week),
    Rule::new("previous_month", previous_month),
    Rule::new("this_year", this_year),
    Rule::new("full_date", full_date),
    Rule::new("month_day", single_month_day),
];

/// Extracts an [`ExpenseQueryIntent`] from an expense-query utterance.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpenseQueryExtractor;

impl Extractor for ExpenseQueryExtractor {
    type Output = ExpenseQueryIntent;

    fn name(&self) -> &str {
        "extractor:expense_query"
    }

    fn extract(&self, text: &str, today: NaiveDate) -> ExpenseQueryIntent {
        parse_expense_query_intent(text, today)
    }
}

/// Parse an expense-query utterance.
///
/// When no period is recognised the intent carries the default trailing
/// 30-day window with `date_range_recognized = false`.
pub fn parse_expense_query_intent(text: &str, today: NaiveDate) -> ExpenseQueryIntent {
    tracing::debug!(text = %text, "parsing expense query");

    let oversized = is_oversized(text);
    if oversized {
        tracing::warn!(len = text.len(), "expense query too long, skipping extraction");
    }
    let scannable = !oversized && !text.trim().is_empty();

    let category = if scannable { extract_category(text) } else { None };
    let matched = if scannable {
        first_match(DATE_RANGE_RULES, text, today)
    } else {
        None
    };

    if let Some((rule, range)) = &matched {
        tracing::debug!(rule, start = %range.start(), end = %range.end(), "date range matched");
    }

    let date_range_recognized = matched.is_some();
    let range = matched
        .map(|(_, range)| range)
        .unwrap_or_else(|| DateRange::default_window(today));

    let confidence = match (category.is_some(), date_range_recognized) {
        (true, true) => Confidence::High,
        (false, false) => Confidence::Low,
        _ => Confidence::Medium,
    };

    ExpenseQueryIntent {
        category,
        start_date: range.start(),
        end_date: range.end(),
        date_range_recognized,
        free_text_query: text.to_owned(),
        confidence,
    }
}

/// First category, in priority order, with a keyword in the text.
fn extract_category(text: &str) -> Option<ExpenseCategory> {
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
        .map(|(category, _)| *category)
}

fn days_ago(today: NaiveDate, n: u64) -> Option<NaiveDate> {
    today.checked_sub_days(Days::new(n))
}

fn this_week(text: &str, today: NaiveDate) -> Option<DateRange> {
    if !contains_any(text, &["本周", "这周", "这星期", "本星期"]) {
        return None;
    }
    let monday = days_ago(today, u64::from(today.weekday().num_days_from_monday()))?;
    Some(DateRange::new(monday, today))
}

fn this_month(text: &str, today: NaiveDate) -> Option<DateRange> {
    if !contains_any(text, &["本月", "这个月", "这月", "当月"]) {
        return None;
    }
    Some(DateRange::new(today.with_day(1)?, today))
}

/// "最近两周", "过去15天", "近三个月" (a month counts as 30 days).
fn recent_period(text: &str, today: NaiveDate) -> Option<DateRange> {
    let caps = compiled(&RECENT_PERIOD)?.captures(text)?;
    let raw = caps.get(1)?.as_str();
    let n = match raw.parse::<u64>() {
        Ok(n) => n,
        Err(_) => parse_chinese_numeral(raw)?,
    };
    let unit_days: u64 = match caps.get(2)?.as_str() {
        "天" => 1,
        "周" | "星期" => 7,
        _ => 30,
    };
    let days = n.checked_mul(unit_days)?;
    (days > 0).then(|| DateRange::trailing(today, days))
}

/// "10月1日到10月7日"; a start after the end is taken from last year.
fn explicit_range(text: &str, today: NaiveDate) -> Option<DateRange> {
    let caps = compiled(&EXPLICIT_RANGE)?.captures(text)?;
    let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
    let year = today.year();
    let end = NaiveDate::from_ymd_opt(year, field(3)?, field(4)?)?;
    let mut start = NaiveDate::from_ymd_opt(year, field(1)?, field(2)?)?;
    if start > end {
        start = start.with_year(year.checked_sub(1)?)?;
    }
    Some(DateRange::new(start, end))
}

/// Monday to Sunday of the week before this one.
fn previous_week(text: &str, today: NaiveDate) -> Option<DateRange> {
    if !contains_any(text, &["上周", "上个星期", "上星期", "上个礼拜"]) {
        return None;
    }
    let monday = days_ago(today, u64::from(today.weekday().num_days_from_monday()))?;
    Some(DateRange::new(days_ago(monday, 7)?, days_ago(monday, 1)?))
}

/// The whole of last calendar month.
fn previous_month(text: &str, today: NaiveDate) -> Option<DateRange> {
    if !contains_any(text, &["上个月", "上月"]) {
        return None;
    }
    let end = days_ago(today.with_day(1)?, 1)?;
    Some(DateRange::new(end.with_day(1)?, end))
}

fn this_year(text: &str, today: NaiveDate) -> Option<DateRange> {
    if !contains_any(text, &["今年", "本年", "这一年"]) {
        return None;
    }
    Some(DateRange::new(today.with_ordinal(1)?, today))
}

/// "2025年6月1日" or "2025-06-01" as a one-day range.
fn full_date(text: &str, _: NaiveDate) -> Option<DateRange> {
    let caps = compiled(&FULL_DATE)?.captures(text)?;
    let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
    let year = i32::try_from(field(1)?).ok()?;
    NaiveDate::from_ymd_opt(year, field(2)?, field(3)?).map(DateRange::single)
}

/// "6月1日" as a one-day range; a day still ahead is taken from last year.
fn single_month_day(text: &str, today: NaiveDate) -> Option<DateRange> {
    let caps = compiled(&SINGLE_MONTH_DAY)?.captures(text)?;
    let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
    let (month, day) = (field(1)?, field(2)?);
    let mut date = NaiveDate::from_ymd_opt(today.year(), month, day)?;
    if date > today {
        date = NaiveDate::from_ymd_opt(today.year().checked_sub(1)?, month, day)?;
    }
    Some(DateRange::single(date))
}
