//! Folding successive utterances into form state.

use chrono::NaiveDate;
use tripvoice::extractors::{parse_expense_query_intent, parse_trip_intent};
use tripvoice::form::{ExpenseQueryForm, TripForm};
use tripvoice::types::{DateRange, ExpenseCategory, PreferenceTag};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 11).expect("valid date")
}

#[test]
fn later_utterance_overwrites_found_fields_only() {
    let mut form = TripForm::default();
    form.apply(&parse_trip_intent("去成都5天，预算5000元，3个人", today(), 3));
    form.apply(&parse_trip_intent("预算8000元，喜欢美食", today(), 3));

    assert_eq!(form.destination, "成都");
    assert_eq!(form.traveler_count, 3);
    assert!((form.budget_amount - 8000.0).abs() < f64::EPSILON);
    assert!(form.preference_tags.contains(&PreferenceTag::Food));
    assert_eq!(form.start_date, Some(today()));
}

#[test]
fn follow_up_without_place_keeps_destination() {
    let mut form = TripForm::default();
    form.apply(&parse_trip_intent("我想去天津，预算5000元", today(), 3));
    form.apply(&parse_trip_intent("另外喜欢购物", today(), 3));
    form.apply(&parse_trip_intent("还想去，带孩子", today(), 3));
    assert_eq!(form.destination, "天津");
    assert!(form.preference_tags.contains(&PreferenceTag::Shopping));
    assert_eq!(form.special_needs, "带孩子");
}

#[test]
fn preference_tags_accumulate() {
    let mut form = TripForm::default();
    form.apply(&parse_trip_intent("去西安，喜欢历史", today(), 3));
    form.apply(&parse_trip_intent("去西安，也喜欢美食", today(), 3));
    assert!(form.preference_tags.contains(&PreferenceTag::History));
    assert!(form.preference_tags.contains(&PreferenceTag::Food));
}

#[test]
fn special_needs_append_once() {
    let mut form = TripForm::default();
    form.append_special_need("轮椅");
    form.apply(&parse_trip_intent("去上海，带孩子", today(), 3));
    form.apply(&parse_trip_intent("去上海，带孩子", today(), 3));
    assert_eq!(form.special_needs, "轮椅、带孩子");
}

#[test]
fn expense_form_takes_recognised_range() {
    let mut form = ExpenseQueryForm::new(today());
    form.apply(&parse_expense_query_intent("昨天打车花了多少", today()));
    let yesterday = NaiveDate::from_ymd_opt(2025, 6, 10).expect("valid date");
    assert_eq!(form.category, Some(ExpenseCategory::Transport));
    assert_eq!(form.range, DateRange::single(yesterday));
}

#[test]
fn expense_form_keeps_category_when_absent() {
    let mut form = ExpenseQueryForm::new(today());
    form.apply(&parse_expense_query_intent("住宿", today()));
    form.apply(&parse_expense_query_intent("最近三天呢", today()));
    assert_eq!(form.category, Some(ExpenseCategory::Lodging));
    assert_eq!(form.query, "最近三天呢");
}
