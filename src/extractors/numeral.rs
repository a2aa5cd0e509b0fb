//! Short-form Chinese numeral conversion.
//!
//! Handles digits combined with the positional markers 十/百/千 and a single
//! 万 section carry, e.g. "二十三" = 23, "一百零五" = 105, "三万五千" = 35000.
//! Classical forms beyond that (亿, 廿, formal 壹贰叁) are not supported;
//! anything out of grammar yields `None` instead of a guessed value.

/// Every character [`parse_chinese_numeral`] accepts.
pub const NUMERAL_CHARS: &str = "零一二两三四五六七八九十百千万";

/// Value of a single digit character.
fn digit_value(c: char) -> Option<u64> {
    match c {
        '零' => Some(0),
        '一' => Some(1),
        '二' | '两' => Some(2),
        '三' => Some(3),
        '四' => Some(4),
        '五' => Some(5),
        '六' => Some(6),
        '七' => Some(7),
        '八' => Some(8),
        '九' => Some(9),
        _ => None,
    }
}

/// Multiplier of an in-section positional marker.
fn marker_value(c: char) -> Option<u64> {
    match c {
        '十' => Some(10),
        '百' => Some(100),
        '千' => Some(1000),
        _ => None,
    }
}

/// Returns `true` if `c` can appear in a Chinese numeral run.
pub fn is_numeral_char(c: char) -> bool {
    NUMERAL_CHARS.contains(c)
}

/// Convert a short-form Chinese numeral to an integer.
///
/// A marker with no digit before it counts as one of that unit ("十" = 10).
/// Returns `None` for empty input, characters outside [`NUMERAL_CHARS`],
/// adjacent non-zero digits ("二三"), repeated or ascending markers within a
/// section ("十十", "十百"), a second 万, or overflow.
pub fn parse_chinese_numeral(s: &str) -> Option<u64> {
    if s.is_empty() {
        return None;
    }

    let mut total: u64 = 0;
    let mut section: u64 = 0;
    let mut pending: Option<u64> = None;
    let mut last_marker: Option<u64> = None;
    let mut seen_wan = false;

    for c in s.chars() {
        if let Some(d) = digit_value(c) {
            // 零 is a placeholder and may be followed by the next digit.
            if matches!(pending, Some(p) if p != 0) {
                return None;
            }
            pending = Some(d);
        } else if let Some(unit) = marker_value(c) {
            if matches!(last_marker, Some(prev) if unit >= prev) {
                return None;
            }
            let base = match pending {
                Some(0) => return None,
                Some(d) => d,
                None => 1,
            };
            section = section.checked_add(base.checked_mul(unit)?)?;
            last_marker = Some(unit);
            pending = None;
        } else if c == '万' {
            if seen_wan {
                return None;
            }
            section = section.checked_add(pending.unwrap_or(0))?;
            if section == 0 {
                section = 1;
            }
            total = section.checked_mul(10_000)?;
            section = 0;
            pending = None;
            last_marker = None;
            seen_wan = true;
        } else {
            return None;
        }
    }

    section = section.checked_add(pending.unwrap_or(0))?;
    total.checked_add(section)
}
