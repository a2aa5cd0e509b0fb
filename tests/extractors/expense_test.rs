//! Expense-query parsing through the public API.

use chrono::{Days, NaiveDate};
use tripvoice::extractors::{parse_expense_query_intent, ExpenseQueryExtractor, Extractor};
use tripvoice::types::{Confidence, ExpenseCategory};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 11).expect("valid date")
}

fn days_before(n: u64) -> NaiveDate {
    today().checked_sub_days(Days::new(n)).expect("valid date")
}

#[test]
fn meals_over_last_week() {
    let intent = parse_expense_query_intent("帮我看最近一周吃饭的花销", today());
    assert_eq!(intent.category, Some(ExpenseCategory::Meals));
    assert_eq!(intent.start_date, days_before(7));
    assert_eq!(intent.end_date, today());
    assert!(intent.confidence >= Confidence::Medium);
}

#[test]
fn unrecognised_text_gets_default_window() {
    let intent = parse_expense_query_intent("随便说点什么", today());
    assert_eq!(intent.category, None);
    assert_eq!(intent.start_date, days_before(30));
    assert_eq!(intent.end_date, today());
    assert!(!intent.date_range_recognized);
    assert_eq!(intent.confidence, Confidence::Low);
}

#[test]
fn range_is_never_inverted() {
    let texts = [
        "今天",
        "昨天吃饭",
        "最近三天打车",
        "最近一个月住宿",
        "12月28日到1月3日",
        "6月5日到6月1日",
        "过去100个月",
        "",
        "随便",
    ];
    for text in texts {
        let intent = parse_expense_query_intent(text, today());
        assert!(
            intent.end_date >= intent.start_date,
            "{text:?} produced an inverted range"
        );
    }
}

#[test]
fn parsing_is_idempotent() {
    for text in ["帮我看最近一周吃饭的花销", "本月门票", "随便说点什么"] {
        assert_eq!(
            parse_expense_query_intent(text, today()),
            parse_expense_query_intent(text, today())
        );
    }
}

#[test]
fn calendar_periods_are_recognised() {
    let cases = [
        ("上周吃饭花了多少", "2025-06-02", "2025-06-08"),
        ("上个月打车", "2025-05-01", "2025-05-31"),
        ("今年住宿", "2025-01-01", "2025-06-11"),
        ("6月1日吃饭花了多少", "2025-06-01", "2025-06-01"),
    ];
    for (text, start, end) in cases {
        let intent = parse_expense_query_intent(text, today());
        assert!(intent.date_range_recognized, "{text:?}");
        assert_eq!(intent.start_date.to_string(), start, "{text:?}");
        assert_eq!(intent.end_date.to_string(), end, "{text:?}");
    }
}

#[test]
fn every_category_is_reachable() {
    let cases = [
        ("外卖花了多少", ExpenseCategory::Meals),
        ("高铁票", ExpenseCategory::Transport),
        ("民宿房费", ExpenseCategory::Lodging),
        ("超市", ExpenseCategory::Shopping),
        ("景点门票", ExpenseCategory::Activities),
        ("其他开销", ExpenseCategory::Other),
    ];
    for (text, expected) in cases {
        let intent = parse_expense_query_intent(text, today());
        assert_eq!(intent.category, Some(expected), "{text:?}");
    }
}

#[test]
fn serializes_with_camel_case_fields() {
    let intent = parse_expense_query_intent("昨天打车", today());
    let json = serde_json::to_value(&intent).expect("should serialize");
    assert_eq!(json["category"], "transport");
    assert_eq!(json["startDate"], "2025-06-10");
    assert_eq!(json["endDate"], "2025-06-10");
    assert_eq!(json["dateRangeRecognized"], true);
    assert_eq!(json["freeTextQuery"], "昨天打车");
    assert_eq!(json["confidence"], "high");
}

#[test]
fn extractor_name_is_stable() {
    assert_eq!(ExpenseQueryExtractor.name(), "extractor:expense_query");
}
