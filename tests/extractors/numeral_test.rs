//! Chinese numeral conversion.

use tripvoice::extractors::numeral::parse_chinese_numeral;

#[test]
fn short_forms() {
    assert_eq!(parse_chinese_numeral("五"), Some(5));
    assert_eq!(parse_chinese_numeral("十"), Some(10));
    assert_eq!(parse_chinese_numeral("十五"), Some(15));
    assert_eq!(parse_chinese_numeral("两"), Some(2));
}

#[test]
fn compound_forms() {
    assert_eq!(parse_chinese_numeral("二十三"), Some(23));
    assert_eq!(parse_chinese_numeral("一百零五"), Some(105));
    assert_eq!(parse_chinese_numeral("三千"), Some(3000));
    assert_eq!(parse_chinese_numeral("一万"), Some(10_000));
}

#[test]
fn malformed_forms_are_rejected() {
    assert_eq!(parse_chinese_numeral(""), None);
    assert_eq!(parse_chinese_numeral("十十"), None);
    assert_eq!(parse_chinese_numeral("三四"), None);
}
