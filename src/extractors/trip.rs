//! Trip-planning utterance extractor.
//!
//! Pulls destination, dates, duration, budget, party size, interests and
//! special needs out of sentences such as
//! "我想去日本，5天，预算1万元，喜欢美食和动漫，带孩子".

use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::sync::LazyLock;

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use regex::{Captures, Regex};

use super::numeral::{is_numeral_char, parse_chinese_numeral};
use super::rules::{contains_any, first_match, Rule};
use super::{compiled, is_oversized, Extractor};
use crate::types::{Confidence, PreferenceTag, TripIntent};

/// Canonical note recorded when the traveller brings children.
pub const WITH_CHILDREN_NOTE: &str = "带孩子";

/// Longest destination accepted by the bare-token fallback, in characters.
const MAX_BARE_DESTINATION_CHARS: usize = 30;

/// Phrases that end a destination run (besides whitespace, digits and punctuation).
const DESTINATION_TERMINATORS: &[&str] = &["天", "预算", "带", "和"];

/// Trailing travel verbs that are not part of the place name.
const DESTINATION_SUFFIXES: &[&str] = &["旅游", "旅行", "游玩", "度假", "看看", "玩", "游"];

/// Units that turn a preceding numeral run into a count ("五日", "两周").
const COUNT_UNITS: &[&str] = &["天", "日", "周", "星期", "个", "晚"];

/// Words that mark a bare leading span as a sentence rather than a place.
const BARE_STOPWORDS: &[&str] = &[
    "我", "你", "他", "她", "们", "想", "要", "喜欢", "另外", "还", "也", "再", "吧", "呢", "吗",
    "了", "的", "预算",
];

/// Places recognised anywhere in the utterance, before particle matching.
pub const KNOWN_DESTINATIONS: &[&str] = &[
    // 国内
    "北京", "上海", "广州", "深圳", "杭州", "成都", "重庆", "西安", "南京", "武汉",
    "天津", "苏州", "郑州", "长沙", "沈阳", "青岛", "无锡", "宁波", "昆明", "大连",
    "厦门", "合肥", "福州", "哈尔滨", "济南", "石家庄", "长春", "温州", "南昌", "贵阳",
    "三亚", "丽江", "大理", "桂林", "张家界", "西双版纳", "拉萨", "西藏", "九寨沟", "黄山",
    "乌鲁木齐", "喀什", "和田", "敦煌", "天水",
    // 国外
    "东京", "大阪", "京都", "北海道", "冲绳", "首尔", "济州岛", "釜山",
    "曼谷", "清迈", "普吉岛", "芭提雅", "新加坡", "吉隆坡", "巴厘岛", "马尔代夫",
    "巴黎", "伦敦", "罗马", "威尼斯", "巴塞罗那", "阿姆斯特丹", "布拉格", "维也纳",
    "纽约", "洛杉矶", "旧金山", "拉斯维加斯", "迈阿密", "夏威夷",
    "悉尼", "墨尔本", "奥克兰", "迪拜", "伊斯坦布尔",
    // 港澳台
    "香港", "澳门", "台北", "高雄", "台中", "台南",
];

static DESTINATION_PARTICLE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new("我要去|想去到|想去|去|到").ok());

static DURATION_DAYS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?:([0-9]+)|([零一二两三四五六七八九十百千万]+))\s*[天日]").ok());

static DURATION_WEEKS: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?:([0-9]+)|([一二两三四五六七八九十]+))\s*个?(?:周|星期)").ok()
});

static ISO_DATE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"([0-9]{4})[-/.]([0-9]{1,2})[-/.]([0-9]{1,2})").ok());

static MONTH_DAY: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"([0-9]{1,2})月([0-9]{1,2})[日号]?").ok());

static DAY_OF_MONTH: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"([0-9]{1,2})号").ok());

static BUDGET_PREFIX_DIGITS: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"预算\s*[:：]?\s*(?:是|为|大概|大约|约)?\s*([0-9]+(?:\.[0-9]+)?)\s*(万元|万块|万|千元|千块|千|[kK]|元|块)?",
    )
    .ok()
});

static BUDGET_SUFFIX_DIGITS: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"([0-9]+(?:\.[0-9]+)?)\s*(万元|万块|万|千元|千块|千|[kK]|元|块)?\s*的?预算").ok()
});

static BUDGET_PREFIX_NUMERAL: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"预算\s*[:：]?\s*(?:是|为|大概|大约|约)?\s*([零一二两三四五六七八九十百千万]+)\s*(万元|万块|元|块)?",
    )
    .ok()
});

static TRAVELERS_DIGITS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"([0-9]+)\s*个?人").ok());

static TRAVELERS_NUMERAL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"([一二两三四五六七八九十]+)\s*个?人").ok());

const DURATION_RULES: &[Rule<u32>] = &[
    Rule::new("duration_days", duration_days),
    Rule::new("duration_weeks", duration_weeks),
];

const START_DATE_RULES: &[Rule<NaiveDate>] = &[
    Rule::new("iso_date", iso_date),
    Rule::new("month_day", month_day),
    Rule::new("day_of_month", day_of_month),
    Rule::new("in_three_days", |text, today| {
        text.contains("大后天").then(|| add_days(today, 3)).flatten()
    }),
    Rule::new("day_after_tomorrow", |text, today| {
        text.contains("后天").then(|| add_days(today, 2)).flatten()
    }),
    Rule::new("tomorrow", |text, today| {
        text.contains("明天").then(|| add_days(today, 1)).flatten()
    }),
    Rule::new("today", |text, today| text.contains("今天").then_some(today)),
    Rule::new("this_weekend", this_weekend),
    Rule::new("next_week", next_week),
    Rule::new("next_month", next_month),
];

const BUDGET_RULES: &[Rule<f64>] = &[
    Rule::new("budget_prefix_digits", |text, _| {
        budget_from(&BUDGET_PREFIX_DIGITS, text, parse_decimal)
    }),
    Rule::new("budget_suffix_digits", |text, _| {
        budget_from(&BUDGET_SUFFIX_DIGITS, text, parse_decimal)
    }),
    Rule::new("budget_prefix_numeral", |text, _| {
        budget_from(&BUDGET_PREFIX_NUMERAL, text, parse_numeral_amount)
    }),
];

const TRAVELER_RULES: &[Rule<u32>] = &[
    Rule::new("travelers_digits", |text, _| {
        travelers_from(&TRAVELERS_DIGITS, text, |s| s.parse().ok())
    }),
    Rule::new("travelers_numeral", |text, _| {
        travelers_from(&TRAVELERS_NUMERAL, text, |s| {
            parse_chinese_numeral(s).and_then(|n| u32::try_from(n).ok())
        })
    }),
    Rule::new("travelers_family", |text, _| {
        [("一家三口", 3), ("一家四口", 4), ("一家五口", 5)]
            .iter()
            .find(|(phrase, _)| text.contains(phrase))
            .map(|(_, n)| *n)
    }),
    Rule::new("travelers_couple", |text, _| {
        contains_any(text, &["情侣", "俩人", "两口子", "我们俩"]).then_some(2)
    }),
    Rule::new("travelers_solo", |text, _| {
        contains_any(text, &["独自", "自己一个", "一个人"]).then_some(1)
    }),
];

/// Extracts a [`TripIntent`] from a trip-planning utterance.
#[derive(Debug, Clone)]
pub struct TripIntentExtractor {
    default_duration_days: u32,
}

impl TripIntentExtractor {
    /// Create an extractor that falls back to `default_duration_days` when a
    /// start date is named without a duration.
    pub fn new(default_duration_days: u32) -> Self {
        Self {
            default_duration_days,
        }
    }
}

impl Extractor for TripIntentExtractor {
    type Output = TripIntent;

    fn name(&self) -> &str {
        "extractor:trip_intent"
    }

    fn extract(&self, text: &str, today: NaiveDate) -> TripIntent {
        parse_trip_intent(text, today, self.default_duration_days)
    }
}

/// Parse a trip-planning utterance.
///
/// Never fails: fields that cannot be found stay empty or zero, and the
/// confidence drops accordingly.
pub fn parse_trip_intent(text: &str, today: NaiveDate, default_duration_days: u32) -> TripIntent {
    tracing::debug!(text = %text, "parsing trip utterance");

    let mut intent = TripIntent::empty(text);
    if text.trim().is_empty() {
        return intent;
    }
    if is_oversized(text) {
        tracing::warn!(len = text.len(), "trip utterance too long, skipping extraction");
        return intent;
    }

    intent.destination = extract_destination(text);
    intent.duration_days = first_match(DURATION_RULES, text, today)
        .map(|(_, days)| days)
        .unwrap_or(0);

    let (start, end) = resolve_dates(text, today, intent.duration_days, default_duration_days);
    intent.start_date = start;
    intent.end_date = end;

    intent.budget_amount = first_match(BUDGET_RULES, text, today)
        .map(|(_, amount)| amount)
        .unwrap_or(0.0);
    intent.traveler_count = first_match(TRAVELER_RULES, text, today)
        .map(|(_, n)| n)
        .unwrap_or(0);
    intent.preference_tags = extract_preferences(text);
    if contains_any(text, &["带孩子", "亲子"]) {
        intent.special_needs = WITH_CHILDREN_NOTE.to_owned();
    }
    intent.confidence = evaluate_confidence(&intent);

    tracing::debug!(
        destination = %intent.destination,
        duration = intent.duration_days,
        budget = intent.budget_amount,
        confidence = %intent.confidence,
        "trip utterance parsed"
    );
    intent
}

/// A known place, else the span after a "go to" particle, else a leading
/// bare token. The bare token is only tried when no particle occurs.
fn extract_destination(text: &str) -> String {
    if let Some(place) = known_destination(text) {
        return place.to_owned();
    }

    if let Some(re) = compiled(&DESTINATION_PARTICLE) {
        if re.is_match(text) {
            return re
                .find_iter(text)
                .map(|m| take_destination(&text[m.end()..]))
                .find(|candidate| !candidate.is_empty())
                .unwrap_or_default();
        }
    }

    bare_destination(text)
}

/// Earliest known place in the text; the longer name wins a tie.
fn known_destination(text: &str) -> Option<&'static str> {
    KNOWN_DESTINATIONS
        .iter()
        .filter_map(|name| text.find(name).map(|pos| (pos, Reverse(name.len()), *name)))
        .min()
        .map(|(_, _, name)| name)
}

fn bare_destination(text: &str) -> String {
    let bare = take_destination(text.trim_start());
    let len = bare.chars().count();
    let sentence_like = BARE_STOPWORDS.iter().any(|w| bare.contains(w))
        || PreferenceTag::ALL.iter().any(|tag| bare.contains(tag.label()));
    if (2..=MAX_BARE_DESTINATION_CHARS).contains(&len) && !sentence_like {
        bare
    } else {
        String::new()
    }
}

/// Take the leading run of word-like characters up to a terminator.
fn take_destination(rest: &str) -> String {
    let end = rest
        .char_indices()
        .find(|&(idx, c)| {
            let tail = &rest[idx..];
            c.is_whitespace()
                || is_digit(c)
                || !is_word_like(c)
                || DESTINATION_TERMINATORS.iter().any(|t| tail.starts_with(t))
                || starts_count(tail)
        })
        .map_or(rest.len(), |(idx, _)| idx);

    let mut place = &rest[..end];
    for suffix in DESTINATION_SUFFIXES {
        if let Some(stripped) = place.strip_suffix(suffix) {
            place = stripped;
            break;
        }
    }
    place
        .trim_end_matches(|c: char| c.is_whitespace() || !is_word_like(c))
        .to_owned()
}

/// A numeral run followed by a counting unit: the duration, not the place.
fn starts_count(tail: &str) -> bool {
    let after = tail.trim_start_matches(is_numeral_char);
    after.len() < tail.len() && COUNT_UNITS.iter().any(|unit| after.starts_with(unit))
}

fn is_word_like(c: char) -> bool {
    c.is_alphanumeric() || c == '·'
}

fn is_digit(c: char) -> bool {
    c.is_ascii_digit() || ('０'..='９').contains(&c)
}

/// "5天", "五日游"; the day of "7月3日" is a date, not a duration.
fn duration_days(text: &str, _: NaiveDate) -> Option<u32> {
    let re = compiled(&DURATION_DAYS)?;
    re.captures_iter(text)
        .filter(|caps| caps.get(0).is_some_and(|m| !continues_date(text, m.start())))
        .find_map(|caps| count_from(&caps))
}

/// Whether the match at `idx` continues a month or a longer number.
fn continues_date(text: &str, idx: usize) -> bool {
    text[..idx]
        .chars()
        .next_back()
        .is_some_and(|prev| prev == '月' || prev.is_ascii_digit())
}

fn duration_weeks(text: &str, _: NaiveDate) -> Option<u32> {
    let re = compiled(&DURATION_WEEKS)?;
    re.captures_iter(text)
        .find_map(|caps| count_from(&caps))
        .and_then(|weeks| weeks.checked_mul(7))
}

/// Positive count from a capture with an Arabic group 1 or a numeral group 2.
fn count_from(caps: &Captures<'_>) -> Option<u32> {
    let value = if let Some(digits) = caps.get(1) {
        digits.as_str().parse::<u32>().ok()?
    } else {
        let numeral = parse_chinese_numeral(caps.get(2)?.as_str())?;
        u32::try_from(numeral).ok()?
    };
    (value > 0).then_some(value)
}

/// Start and end of the trip.
///
/// A found duration anchors the trip on the named start date (or today). A
/// named start date without a duration spans `default_duration_days`.
fn resolve_dates(
    text: &str,
    today: NaiveDate,
    duration_days: u32,
    default_duration_days: u32,
) -> (Option<NaiveDate>, Option<NaiveDate>) {
    let named_start = first_match(START_DATE_RULES, text, today).map(|(_, day)| day);

    let (start, span) = match (named_start, duration_days) {
        (start, days) if days > 0 => (start.unwrap_or(today), days),
        (Some(start), _) => (start, default_duration_days.max(1)),
        (None, _) => return (None, None),
    };
    let end = add_days(start, u64::from(span.saturating_sub(1)));
    match end {
        Some(end) => (Some(start), Some(end)),
        None => (None, None),
    }
}

fn add_days(day: NaiveDate, n: u64) -> Option<NaiveDate> {
    day.checked_add_days(Days::new(n))
}

fn iso_date(text: &str, _: NaiveDate) -> Option<NaiveDate> {
    let caps = compiled(&ISO_DATE)?.captures(text)?;
    let year = caps.get(1)?.as_str().parse().ok()?;
    let month = caps.get(2)?.as_str().parse().ok()?;
    let day = caps.get(3)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// "5月1日" resolves to the next such day on or after today.
fn month_day(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let caps = compiled(&MONTH_DAY)?.captures(text)?;
    let month = caps.get(1)?.as_str().parse().ok()?;
    let day = caps.get(2)?.as_str().parse().ok()?;
    let this_year = NaiveDate::from_ymd_opt(today.year(), month, day)?;
    if this_year >= today {
        return Some(this_year);
    }
    NaiveDate::from_ymd_opt(today.year().checked_add(1)?, month, day)
}

/// "6号": this month if still ahead, else next month.
fn day_of_month(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let caps = compiled(&DAY_OF_MONTH)?
        .captures_iter(text)
        .find(|caps| caps.get(0).is_some_and(|m| !continues_date(text, m.start())))?;
    let day = caps.get(1)?.as_str().parse().ok()?;
    let first = today.with_day(1)?;
    let month = if day >= today.day() {
        first
    } else {
        first.checked_add_months(Months::new(1))?
    };
    month.with_day(day)
}

fn this_weekend(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    if !contains_any(text, &["这周末", "本周末"]) {
        return None;
    }
    let from_monday = u64::from(today.weekday().num_days_from_monday());
    let saturday = u64::from(Weekday::Sat.num_days_from_monday());
    add_days(today, saturday.saturating_sub(from_monday))
}

fn next_week(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    if !contains_any(text, &["下周", "下星期"]) {
        return None;
    }
    let from_monday = u64::from(today.weekday().num_days_from_monday());
    add_days(today, 7_u64.saturating_sub(from_monday))
}

fn next_month(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    if !contains_any(text, &["下个月", "下月"]) {
        return None;
    }
    today
        .with_day(1)?
        .checked_add_months(Months::new(1))
}

fn budget_from(
    re: &LazyLock<Option<Regex>>,
    text: &str,
    amount: fn(&str) -> Option<f64>,
) -> Option<f64> {
    let caps = compiled(re)?.captures(text)?;
    let base = amount(caps.get(1)?.as_str())?;
    let total = base * unit_multiplier(caps.get(2).map(|m| m.as_str()));
    (total.is_finite() && total > 0.0).then_some(total)
}

fn parse_decimal(s: &str) -> Option<f64> {
    s.parse().ok()
}

fn parse_numeral_amount(s: &str) -> Option<f64> {
    let n = parse_chinese_numeral(s)?;
    // Amounts above u32 are not budgets anyone speaks.
    u32::try_from(n).ok().map(f64::from)
}

fn unit_multiplier(unit: Option<&str>) -> f64 {
    match unit {
        Some(u) if u.starts_with('万') => 10_000.0,
        Some(u) if u.starts_with('千') || u.eq_ignore_ascii_case("k") => 1_000.0,
        _ => 1.0,
    }
}

fn travelers_from(
    re: &LazyLock<Option<Regex>>,
    text: &str,
    count: fn(&str) -> Option<u32>,
) -> Option<u32> {
    let re = compiled(re)?;
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1).and_then(|m| count(m.as_str())))
        .find(|n| (1..100).contains(n))
}

fn extract_preferences(text: &str) -> BTreeSet<PreferenceTag> {
    PreferenceTag::ALL
        .into_iter()
        .filter(|tag| text.contains(tag.label()))
        .collect()
}

/// High needs a destination plus duration or budget; medium a destination only.
fn evaluate_confidence(intent: &TripIntent) -> Confidence {
    if intent.destination.is_empty() {
        Confidence::Low
    } else if intent.duration_days > 0 || intent.budget_amount > 0.0 {
        Confidence::High
    } else {
        Confidence::Medium
    }
}
