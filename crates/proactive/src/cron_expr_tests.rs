use super::*;
use chrono::TimeZone;
use chrono_tz::UTC;

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> chrono::DateTime<chrono_tz::Tz> {
    UTC.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

#[test]
fn wildcard_matches_everything() {
    let fields = CronFields::parse("* * * * *").unwrap();
    assert!(fields.matches(&at(2026, 7, 28, 13, 45)));
}

#[test]
fn exact_fields_match_only_exact_minute() {
    let fields = CronFields::parse("30 9 * * *").unwrap();
    assert!(fields.matches(&at(2026, 1, 1, 9, 30)));
    assert!(!fields.matches(&at(2026, 1, 1, 9, 31)));
    assert!(!fields.matches(&at(2026, 1, 1, 10, 30)));
}

#[test]
fn step_expression_matches_every_nth_value() {
    let fields = CronFields::parse("*/15 * * * *").unwrap();
    assert!(fields.matches(&at(2026, 1, 1, 0, 0)));
    assert!(fields.matches(&at(2026, 1, 1, 0, 15)));
    assert!(fields.matches(&at(2026, 1, 1, 0, 30)));
    assert!(!fields.matches(&at(2026, 1, 1, 0, 20)));
}

#[test]
fn range_expression_matches_inclusive_bounds() {
    let fields = CronFields::parse("0 9-17 * * *").unwrap();
    assert!(fields.matches(&at(2026, 1, 1, 9, 0)));
    assert!(fields.matches(&at(2026, 1, 1, 17, 0)));
    assert!(!fields.matches(&at(2026, 1, 1, 18, 0)));
}

#[test]
fn comma_list_matches_any_listed_value() {
    let fields = CronFields::parse("0 0 1,15 * *").unwrap();
    assert!(fields.matches(&at(2026, 1, 1, 0, 0)));
    assert!(fields.matches(&at(2026, 1, 15, 0, 0)));
    assert!(!fields.matches(&at(2026, 1, 2, 0, 0)));
}

#[test]
fn stepped_range_combines_both_forms() {
    let fields = CronFields::parse("0-30/10 * * * *").unwrap();
    assert!(fields.matches(&at(2026, 1, 1, 0, 0)));
    assert!(fields.matches(&at(2026, 1, 1, 0, 10)));
    assert!(fields.matches(&at(2026, 1, 1, 0, 20)));
    assert!(fields.matches(&at(2026, 1, 1, 0, 30)));
    assert!(!fields.matches(&at(2026, 1, 1, 0, 40)));
}

#[test]
fn dow_field_treats_7_as_sunday_alias_for_0() {
    let fields = CronFields::parse("0 0 * * 7").unwrap();
    // 2026-01-04 is a Sunday.
    assert!(fields.matches(&at(2026, 1, 4, 0, 0)));
}

#[test]
fn wrong_field_count_is_rejected() {
    let err = CronFields::parse("* * * *").unwrap_err();
    assert_eq!(err, CronExprError::WrongFieldCount(4));
}

#[test]
fn out_of_bounds_value_is_rejected() {
    assert!(CronFields::parse("60 * * * *").is_err());
    assert!(CronFields::parse("* 24 * * *").is_err());
    assert!(CronFields::parse("* * 32 * *").is_err());
    assert!(CronFields::parse("* * * 13 *").is_err());
}

#[test]
fn zero_step_is_rejected() {
    assert!(CronFields::parse("*/0 * * * *").is_err());
}

#[test]
fn inverted_range_is_rejected() {
    assert!(CronFields::parse("10-5 * * * *").is_err());
}

#[test]
fn validate_helper_reports_same_errors_as_parse() {
    assert!(validate("* * * * *").is_ok());
    assert!(validate("bogus").is_err());
}
