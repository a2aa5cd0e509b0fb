//! Trip-intent parsing through the public API.

use chrono::NaiveDate;
use tripvoice::extractors::{parse_trip_intent, Extractor, TripIntentExtractor};
use tripvoice::types::{Confidence, PreferenceTag, TripIntent};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 11).expect("valid date")
}

#[test]
fn canonical_sentence_is_fully_extracted() {
    let intent = parse_trip_intent(
        "我想去日本，5天，预算1万元，喜欢美食和动漫，带孩子",
        today(),
        3,
    );
    assert!(intent.destination.contains("日本"));
    assert_eq!(intent.duration_days, 5);
    assert!((intent.budget_amount - 10_000.0).abs() < f64::EPSILON);
    assert!(intent.preference_tags.contains(&PreferenceTag::Food));
    assert!(intent.preference_tags.contains(&PreferenceTag::Anime));
    assert!(intent.special_needs.contains("带孩子"));
    assert_eq!(intent.confidence, Confidence::High);
}

#[test]
fn empty_text_yields_empty_intent() {
    let intent = parse_trip_intent("", today(), 3);
    assert!(intent.destination.is_empty());
    assert_eq!(intent.start_date, None);
    assert_eq!(intent.end_date, None);
    assert_eq!(intent.duration_days, 0);
    assert_eq!(intent.traveler_count, 0);
    assert!(intent.budget_amount.abs() < f64::EPSILON);
    assert!(intent.preference_tags.is_empty());
    assert!(intent.special_needs.is_empty());
    assert_eq!(intent.confidence, Confidence::Low);
}

#[test]
fn particle_with_nothing_after_it_is_not_a_destination() {
    let intent = parse_trip_intent("我想去，预算5000元", today(), 3);
    assert!(intent.destination.is_empty());
    assert!((intent.budget_amount - 5000.0).abs() < f64::EPSILON);
    assert_eq!(intent.confidence, Confidence::Low);
}

#[test]
fn place_starting_with_terminator_is_found() {
    let intent = parse_trip_intent("我想去天津，预算5000元", today(), 3);
    assert_eq!(intent.destination, "天津");
    assert_eq!(intent.confidence, Confidence::High);

    let intent = parse_trip_intent("去天津玩三天", today(), 3);
    assert_eq!(intent.destination, "天津");
    assert_eq!(intent.duration_days, 3);

    let intent = parse_trip_intent("去和田五天", today(), 3);
    assert_eq!(intent.destination, "和田");
    assert_eq!(intent.duration_days, 5);
}

#[test]
fn ri_duration_and_hao_start() {
    let intent = parse_trip_intent("去日本五日游", today(), 3);
    assert_eq!(intent.destination, "日本");
    assert_eq!(intent.duration_days, 5);

    let intent = parse_trip_intent("6号去上海3天", today(), 3);
    let start = NaiveDate::from_ymd_opt(2025, 7, 6).expect("valid date");
    let end = NaiveDate::from_ymd_opt(2025, 7, 8).expect("valid date");
    assert_eq!(intent.start_date, Some(start));
    assert_eq!(intent.end_date, Some(end));
}

#[test]
fn chinese_numeral_durations() {
    assert_eq!(parse_trip_intent("十天", today(), 3).duration_days, 10);
    assert_eq!(parse_trip_intent("二十三天", today(), 3).duration_days, 23);
}

#[test]
fn parsing_is_idempotent() {
    let texts = [
        "我想去日本，5天，预算1万元，喜欢美食和动漫，带孩子",
        "明天去上海",
        "一家三口下周去三亚玩一周",
        "",
        "？？？",
    ];
    for text in texts {
        let first = parse_trip_intent(text, today(), 3);
        let second = parse_trip_intent(text, today(), 3);
        assert_eq!(first, second, "reparse of {text:?} should match");
    }
}

#[test]
fn end_date_never_precedes_start() {
    let texts = [
        "去北京5天",
        "明天去北京",
        "下个月去北京两周",
        "2025-12-31去北京3天",
        "去北京一天",
    ];
    for text in texts {
        let intent = parse_trip_intent(text, today(), 3);
        if let (Some(start), Some(end)) = (intent.start_date, intent.end_date) {
            assert!(end >= start, "{text:?} produced an inverted range");
        }
    }
}

#[test]
fn odd_input_never_panics() {
    let texts = [
        "十十天",
        "预算",
        "预算999999999999999999999万",
        "去",
        "1月32日去北京",
        "🙂🙂🙂",
        "   \n\t",
    ];
    for text in texts {
        let intent = parse_trip_intent(text, today(), 3);
        assert_eq!(intent.original_text, text);
    }
}

#[test]
fn zero_default_duration_still_spans_one_day() {
    let intent = parse_trip_intent("明天去上海", today(), 0);
    let tomorrow = NaiveDate::from_ymd_opt(2025, 6, 12).expect("valid date");
    assert_eq!(intent.start_date, Some(tomorrow));
    assert_eq!(intent.end_date, Some(tomorrow));
}

#[test]
fn serializes_with_camel_case_fields() {
    let intent = parse_trip_intent("去成都3天，喜欢美食", today(), 3);
    let json = serde_json::to_value(&intent).expect("should serialize");
    assert_eq!(json["destination"], "成都");
    assert_eq!(json["durationDays"], 3);
    assert_eq!(json["startDate"], "2025-06-11");
    assert_eq!(json["endDate"], "2025-06-13");
    assert_eq!(json["preferenceTags"][0], "food");
    assert_eq!(json["confidence"], "high");
    assert_eq!(json["originalText"], "去成都3天，喜欢美食");
}

#[test]
fn extractor_matches_free_function() {
    let extractor = TripIntentExtractor::new(3);
    let text = "下周去大理，预算5000元";
    let via_trait: TripIntent = extractor.extract(text, today());
    assert_eq!(via_trait, parse_trip_intent(text, today(), 3));
}
