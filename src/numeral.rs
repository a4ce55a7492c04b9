//! Chinese-numeral minute values ("半", "刻", "十", "二十", ...).
//!
//! The accumulation here is positional, not grammatical: each recognized
//! character is treated as one base-10 digit. "二十" reads as 2,0 → 20 but
//! "二十一" reads as 2,0,1 → 201. Clock values that come out of range are
//! dropped by the caller.

/// Characters the clock patterns accept as a Chinese-numeral minute.
pub const MINUTE_CHARS: &str = "零一二三四五六七八九十半刻";

/// Single Chinese digit character → positional value 0–9.
/// 十 is a zero in the middle of a run ("二十" = 2,0).
fn cn_digit(c: char) -> Option<u32> {
    match c {
        '零' | '十' => Some(0),
        '一' => Some(1),
        '二' => Some(2),
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

/// Parse a minute phrase → minutes.
///
/// Handles: 半 (30), 刻 (15), 十 (10), ASCII digits, and runs of Chinese
/// digits accumulated positionally. A trailing 分 / 分钟 / 秒 is ignored.
/// Returns `None` when nothing numeric remains or the total is zero.
pub fn parse_cn_minutes(s: &str) -> Option<u32> {
    let s = s.trim();
    let s = s
        .strip_suffix("分钟")
        .or_else(|| s.strip_suffix('分'))
        .or_else(|| s.strip_suffix('秒'))
        .unwrap_or(s);

    match s {
        "十" => return Some(10),
        "半" => return Some(30),
        "刻" => return Some(15),
        _ => {}
    }

    if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
        return s.parse().ok();
    }

    let mut result: u32 = 0;
    for c in s.chars() {
        if let Some(d) = cn_digit(c) {
            result = result.checked_mul(10)?.checked_add(d)?;
        }
    }
    if result > 0 { Some(result) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cn_minutes_specials() {
        assert_eq!(parse_cn_minutes("半"), Some(30));
        assert_eq!(parse_cn_minutes("刻"), Some(15));
        assert_eq!(parse_cn_minutes("十"), Some(10));
    }

    #[test]
    fn test_parse_cn_minutes_unit_suffix() {
        assert_eq!(parse_cn_minutes("十分"), Some(10));
        assert_eq!(parse_cn_minutes("五分钟"), Some(5));
        assert_eq!(parse_cn_minutes("半分"), Some(30));
    }

    #[test]
    fn test_parse_cn_minutes_ascii_digits() {
        assert_eq!(parse_cn_minutes("45"), Some(45));
        assert_eq!(parse_cn_minutes("05"), Some(5));
    }

    #[test]
    fn test_parse_cn_minutes_positional() {
        assert_eq!(parse_cn_minutes("五"), Some(5));
        assert_eq!(parse_cn_minutes("二十"), Some(20));
        assert_eq!(parse_cn_minutes("四十"), Some(40));
        // Not real numeral grammar: 二,十,一 → 2,0,1
        assert_eq!(parse_cn_minutes("二十一"), Some(201));
        assert_eq!(parse_cn_minutes("十五"), Some(5));
    }

    #[test]
    fn test_parse_cn_minutes_nothing_numeric() {
        assert_eq!(parse_cn_minutes(""), None);
        assert_eq!(parse_cn_minutes("零"), None);
        assert_eq!(parse_cn_minutes("分"), None);
        assert_eq!(parse_cn_minutes("好"), None);
    }
}
