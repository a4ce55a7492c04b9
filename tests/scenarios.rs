use chrono::{NaiveDate, NaiveDateTime};
use record_extract::{AiAnnotation, Category, EatKind, Extractor, ExtractorConfig};

fn reference() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 10)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

fn extractor() -> Extractor {
    Extractor::new(ExtractorConfig::default()).unwrap()
}

// ── end-to-end notes ─────────────────────────────────────────────────

#[test]
fn test_yesterday_afternoon_sleep_range() {
    let r = extractor()
        .extract("昨天下午3点半睡觉到5点", reference(), None)
        .unwrap()
        .record;
    assert_eq!(r.category, Category::Sleep);
    assert_eq!(r.recorded_at, at(2024, 6, 9, 15, 30));
    assert_eq!(r.duration_minutes, Some(90));
}

#[test]
fn test_milk_feed_with_amount() {
    let r = extractor().extract("吃奶90ml", reference(), None).unwrap().record;
    assert_eq!(r.category, Category::Eat);
    assert_eq!(r.eat_kind, Some(EatKind::Milk));
    assert_eq!(r.quantity, Some(90));
    assert_eq!(r.recorded_at, reference());
    assert!(r.message.contains("90ml"));
}

#[test]
fn test_overnight_sleep() {
    let r = extractor().extract("22点到2点睡觉", reference(), None).unwrap().record;
    assert_eq!(r.category, Category::Sleep);
    assert_eq!(r.duration_minutes, Some(240));
}

#[test]
fn test_overnight_sleep_from_bare_hours() {
    let ex = extractor();
    for text in ["20点到9点睡觉", "21点到10点睡觉"] {
        let r = ex.extract(text, reference(), None).unwrap().record;
        assert_eq!(r.duration_minutes, Some(780), "{text}");
    }
}

#[test]
fn test_sleep_colon_range() {
    let r = extractor().extract("睡觉 14:00-16:00", reference(), None).unwrap().record;
    assert_eq!(r.category, Category::Sleep);
    assert_eq!(r.recorded_at, at(2024, 6, 10, 14, 0));
    assert_eq!(r.duration_minutes, Some(120));
}

#[test]
fn test_food_defaults_to_one_serving() {
    let r = extractor().extract("吃饭一碗", reference(), None).unwrap().record;
    assert_eq!(r.eat_kind, Some(EatKind::Food));
    assert_eq!(r.quantity, Some(1));
    assert_eq!(r.message, "吃饭数据已记录");
}

#[test]
fn test_new_year_keeps_reference_year() {
    let jan1 = at(2025, 1, 1, 10, 0);
    let r = extractor().extract("昨天吃奶", jan1, None).unwrap().record;
    assert_eq!(r.recorded_at, at(2025, 12, 31, 10, 0));

    let annotation = AiAnnotation {
        kind: Some("eat".to_string()),
        recorded_at: Some("2024-12-31 09:00:00".to_string()),
        ..AiAnnotation::default()
    };
    let r = extractor()
        .extract("昨天9点吃奶", jan1, Some(&annotation))
        .unwrap()
        .record;
    assert_eq!(r.recorded_at, at(2025, 12, 31, 9, 0));
}

#[test]
fn test_milestone_stamped_now() {
    let r = extractor().extract("昨天第一次走路", reference(), None).unwrap().record;
    assert_eq!(r.category, Category::Milestone);
    assert_eq!(r.recorded_at, reference());
}

#[test]
fn test_fushi_is_supplement() {
    let r = extractor().extract("辅食", reference(), None).unwrap().record;
    assert_eq!(r.category, Category::Supplement);
}

#[test]
fn test_yesterday_shifts_every_timed_category() {
    let ex = extractor();
    for text in ["昨天睡觉", "昨天吃饭", "昨天喂奶", "昨天玩耍", "昨天阅读", "昨天补钙"] {
        let r = ex.extract(text, reference(), None).unwrap().record;
        assert_eq!(r.recorded_at.date(), at(2024, 6, 9, 0, 0).date(), "{text}");
    }
}

// ── annotator output ─────────────────────────────────────────────────

#[test]
fn test_annotator_other_year_discarded() {
    let annotation = AiAnnotation {
        kind: Some("sleep".to_string()),
        recorded_at: Some("2023-06-09 15:30:00".to_string()),
        ..AiAnnotation::default()
    };
    let r = extractor()
        .extract("昨天下午3点半睡觉到5点", reference(), Some(&annotation))
        .unwrap()
        .record;
    assert_eq!(r.recorded_at, at(2024, 6, 9, 15, 30));
}

#[test]
fn test_annotator_year_always_reference_year() {
    let ex = extractor();
    for ts in ["2020-03-12 09:00:00", "2030-03-12T09:00:00", "2024-02-30 09:00:00"] {
        let annotation = AiAnnotation {
            kind: Some("eat".to_string()),
            recorded_at: Some(ts.to_string()),
            ..AiAnnotation::default()
        };
        let r = ex
            .extract("3月12日吃饭", reference(), Some(&annotation))
            .unwrap()
            .record;
        // rejected → local date with the noon fallback
        assert_eq!(r.recorded_at, at(2024, 3, 12, 12, 0), "{ts}");
    }
}

// ── persistence row ──────────────────────────────────────────────────

#[test]
fn test_row_shape() {
    let e = extractor().extract("吃奶90ml", reference(), None).unwrap();
    let row = serde_json::to_value(e.record.to_row()).unwrap();
    assert_eq!(row["type"], "eat");
    assert_eq!(row["content"], "吃奶90ml");
    assert_eq!(row["duration"], 0);
    assert_eq!(row["value"], 90);
    assert_eq!(row["recorded_at"], "2024-06-10 10:00:00");
}

// ── config from disk ─────────────────────────────────────────────────

#[test]
fn test_config_file_changes_units() {
    use std::io::Write;

    let mut f = tempfile::NamedTempFile::new().unwrap();
    writeln!(f, "amount_units = [\"cc\"]").unwrap();
    let ex = Extractor::new(ExtractorConfig::load(f.path()).unwrap()).unwrap();

    let r = ex.extract("喝奶60cc", reference(), None).unwrap().record;
    assert_eq!(r.quantity, Some(60));
    let r = ex.extract("喝奶60ml", reference(), None).unwrap().record;
    assert_eq!(r.quantity, None);
}
