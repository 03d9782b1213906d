//! End-to-end flows through the engine facade.

use chrono::{FixedOffset, TimeZone};
use temporal_kit::{
    ConfigPatch, DateTimeFields, DurationStyle, FixedClock, FormatOptions, FormatPreset, Instant,
    Style, TemporalConfig, TemporalEngine, TemporalError, TemporalValue, TimeZoneNameStyle, Unit,
    ValueKind,
};

fn engine() -> TemporalEngine {
    let at: Instant = "2024-03-15T12:00:00Z".parse().unwrap();
    TemporalEngine::new(TemporalConfig::default())
        .unwrap()
        .with_clock(FixedClock(at))
}

#[test]
fn test_convert_add_format_diff() {
    let engine = engine();

    let start = engine.to_plain_date("2023-12-25").unwrap();
    assert_eq!((start.year(), start.month(), start.day()), (2023, 12, 25));

    let start = TemporalValue::from(start);
    let end = engine.add(&start, "P1Y2M").unwrap();
    let TemporalValue::PlainDate(end_date) = end else {
        panic!("expected a plain date, got {end:?}");
    };
    assert_eq!((end_date.year(), end_date.month(), end_date.day()), (2025, 2, 25));

    let short = engine.format(&end, &FormatOptions::date_style(Style::Short).with_locale("en-US"));
    assert!(short.starts_with("02/25/") || short.starts_with("2/25/"), "{short}");

    assert_eq!(engine.difference_in(Unit::Day, &start, &end).unwrap(), 428);
}

#[test]
fn test_native_inputs_are_read_two_ways() {
    let engine = engine();
    let native = FixedOffset::east_opt(5 * 3600)
        .unwrap()
        .with_ymd_and_hms(2023, 12, 25, 23, 30, 0)
        .unwrap();

    let date = engine.convert(native, ValueKind::PlainDate).unwrap();
    assert_eq!(date.to_string(), "2023-12-25");
    let instant = engine.convert(native, ValueKind::Instant).unwrap();
    assert_eq!(instant.to_string(), "2023-12-25T18:30:00Z");
}

#[test]
fn test_fields_and_zones() {
    let engine = engine();
    let fields = DateTimeFields::date(2024, 3, 10)
        .with_time(2, 30, 0)
        .with_time_zone("America/New_York");
    // 02:30 does not exist on that day; the compatible choice moves forward.
    let zoned = engine.to_zoned_date_time(fields, None).unwrap();
    assert_eq!(zoned.to_string(), "2024-03-10T03:30:00-04:00[America/New_York]");

    let paris = engine
        .to_zoned_date_time("2024-03-10T07:30:00Z", Some("Europe/Paris"))
        .unwrap();
    assert_eq!(paris.to_string(), "2024-03-10T08:30:00+01:00[Europe/Paris]");
    assert!(engine
        .is_equal(&TemporalValue::from(zoned), &TemporalValue::from(paris))
        .unwrap());
}

#[test]
fn test_widening_without_fields_fails() {
    let engine = engine();
    let time = engine.convert("10:00", ValueKind::PlainTime).unwrap();
    let err = engine.to_plain_date_time(&time).unwrap_err();
    assert!(matches!(err, TemporalError::Conversion { .. }));
    assert!(engine.to_plain_date_time("10:00").is_err());
    assert!(engine.to_plain_date_time(DateTimeFields::default().with_time(10, 0, 0)).is_err());
    // A date alone widens to midnight.
    assert_eq!(
        engine.to_plain_date_time("2024-01-01").unwrap().to_string(),
        "2024-01-01T00:00:00"
    );
}

#[test]
fn test_narrowing_validates_the_dropped_part() {
    let engine = engine();
    assert!(!engine.is_valid("2023-12-25T99:99", ValueKind::PlainDate));
    assert!(!engine.is_valid("2023-02-30T10:00", ValueKind::PlainTime));
    let fields = DateTimeFields {
        hour: Some(99),
        ..DateTimeFields::date(2023, 12, 25)
    };
    assert!(!engine.is_valid(fields, ValueKind::PlainDate));
    assert!(engine.is_valid("2023-12-25T23:59", ValueKind::PlainDate));
}

#[test]
fn test_locale_decides_field_order() {
    let engine = engine();
    let date = engine.convert("2023-12-25", ValueKind::PlainDate).unwrap();
    let long = |locale: &str| {
        engine.format(&date, &FormatOptions::date_style(Style::Long).with_locale(locale))
    };
    assert_eq!(long("en-US"), "December 25, 2023");
    assert_eq!(long("de-DE"), "25. Dezember 2023");
    assert_eq!(long("fr-FR"), "25 décembre 2023");

    engine
        .set_config(&ConfigPatch::default().locale("de-DE"))
        .unwrap();
    assert_eq!(engine.format(&date, &FormatOptions::default()), "25.12.2023");
}

#[test]
fn test_mismatched_kinds_error() {
    let engine = engine();
    let date = engine.convert("2024-01-01", ValueKind::PlainDate).unwrap();
    let time = engine.convert("10:00", ValueKind::PlainTime).unwrap();
    assert!(engine.compare(&date, &time).is_err());
    assert!(engine.difference(&date, &time, None).is_err());
}

#[test]
fn test_formatting_never_raises_but_validation_reports() {
    let engine = engine();
    let value = engine.convert("2023-12-25T10:00", ValueKind::PlainDateTime).unwrap();
    let malformed = FormatOptions {
        fractional_second_digits: Some(9),
        ..Default::default()
    };
    assert_eq!(engine.format(&value, &malformed), "");
    let report = engine.validate_options(&malformed);
    assert!(!report.is_valid);
    assert!(!report.errors.is_empty());
}

#[test]
fn test_zone_names_and_presets() {
    let engine = engine();
    let zoned = engine
        .convert("2023-07-04T12:00:00-04:00[America/New_York]", ValueKind::ZonedDateTime)
        .unwrap();
    let options = FormatOptions {
        time_zone_name: Some(TimeZoneNameStyle::Short),
        ..FormatPreset::IsoDateTime.options()
    };
    assert_eq!(engine.format(&zoned, &options), "07/04/2023, 12:00:00 EDT");
    assert_eq!(
        engine.format(&zoned, &options.clone().with_time_zone("UTC")),
        "07/04/2023, 16:00:00 UTC"
    );
}

#[test]
fn test_durations() {
    let engine = engine();
    let d = engine.to_duration("P1DT2H30M").unwrap();
    assert_eq!(engine.format_duration(&d, DurationStyle::Long), "1 day, 2 hours, 30 minutes");
    assert_eq!(engine.format_duration(&d, DurationStyle::Digital), "26:30:00");
    assert_eq!(engine.to_duration(90_000i64).unwrap().to_string(), "PT1M30S");
}

#[test]
fn test_config_updates_are_atomic() {
    let engine = engine();
    let before = engine.config();
    assert!(engine
        .set_config(&ConfigPatch::default().time_zone("Asia/Tokyo").locale("xx-YY"))
        .is_err());
    assert_eq!(*engine.config(), *before);

    engine
        .set_config(&ConfigPatch::default().time_zone("Asia/Tokyo"))
        .unwrap();
    assert_eq!(engine.now().plain_time().unwrap().to_string(), "21:00:00");
    let zoned = engine.convert("2024-01-01T09:00", ValueKind::ZonedDateTime).unwrap();
    assert_eq!(zoned.to_string(), "2024-01-01T09:00:00+09:00[Asia/Tokyo]");
}

#[test]
fn test_engine_is_shareable_across_threads() {
    let engine = engine();
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let engine = engine.clone();
            std::thread::spawn(move || {
                let date = engine.convert("2024-01-31", ValueKind::PlainDate).unwrap();
                engine.add(&date, format!("P{}M", i + 1)).unwrap().to_string()
            })
        })
        .collect();
    let results: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results, ["2024-02-29", "2024-03-31", "2024-04-30", "2024-05-31"]);
}
