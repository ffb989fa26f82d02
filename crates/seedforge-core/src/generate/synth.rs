//! Per-column value synthesis.
//!
//! For each column, in order: honor the declared default (when the policy
//! flag says so), roll for NULL on nullable columns, dispatch on column-name
//! semantics to a locale persona generator, then fall through to the typed
//! generator. Whitelisted CHECK constraints narrow numeric ranges, pin
//! IN-lists, and force exact lengths.

use std::sync::LazyLock;

use chrono::{Duration as ChronoDuration, NaiveDate, NaiveDateTime, NaiveTime};
use fake::faker::lorem::en::{Sentence, Sentences, Word};
use fake::Fake;
use rand::rngs::StdRng;
use rand::Rng;

use crate::classify::{classify, SemanticKind};
use crate::generate::keys::random_uuid;
use crate::generate::value::Value;
use crate::pattern::Pattern;
use crate::personas::Locale;
use crate::schema::{Column, LogicalType, ParsedCheck};

/// Fixed probability of NULL for nullable columns. Deeper variance belongs
/// to the edge-case injector.
pub const NULL_PROBABILITY: f64 = 0.10;

/// Fixed anchor for all temporal generation. Deriving from the wall clock
/// would break the byte-identical-per-seed contract.
pub fn anchor_time() -> NaiveDateTime {
    NaiveDateTime::new(
        NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid anchor date"),
        NaiveTime::from_hms_opt(12, 0, 0).expect("valid anchor time"),
    )
}

/// Synthesis policy for one run.
#[derive(Debug, Clone, Copy)]
pub struct SynthPolicy {
    pub locale: Locale,
    /// When set, columns with a declared default emit that default.
    pub honor_defaults: bool,
    pub anchor: NaiveDateTime,
}

impl SynthPolicy {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            honor_defaults: false,
            anchor: anchor_time(),
        }
    }
}

/// Produce one value for a typed column.
pub fn value_for(
    column: &Column,
    checks: &[ParsedCheck],
    policy: &SynthPolicy,
    rng: &mut StdRng,
) -> Value {
    if policy.honor_defaults {
        if let Some(default) = &column.default_value {
            return Value::from_json(default);
        }
    }

    if column.nullable && rng.random::<f64>() < NULL_PROBABILITY {
        return Value::Null;
    }

    nonnull_value_for(column, checks, policy, rng)
}

/// Like [`value_for`] but never rolls NULL. Used by unique-retry loops and
/// composite repair, where regenerating into NULL would stall progress.
pub fn nonnull_value_for(
    column: &Column,
    checks: &[ParsedCheck],
    policy: &SynthPolicy,
    rng: &mut StdRng,
) -> Value {
    // A pinned IN-list dominates every other strategy.
    if let Some(ParsedCheck::InValues { values, .. }) = checks
        .iter()
        .find(|c| matches!(c, ParsedCheck::InValues { .. }))
    {
        let choice = &values[rng.random_range(0..values.len())];
        return typed_literal(column.logical_type, choice);
    }

    if column.logical_type.is_string() {
        if let Some(kind) = classify(&column.name) {
            return semantic_value(kind, column, policy, rng);
        }
    }

    typed_value(column, checks, policy, rng)
}

/// Wider-entropy fallback for unique-retry loops. Regular string synthesis
/// draws from a finite vocabulary; once it keeps colliding, switch to
/// alphanumeric tokens whose space scales with the column length. Bounded
/// value spaces (IN-lists, CHAR(1)) stay narrow so genuine exhaustion still
/// surfaces.
pub fn unique_fallback_value(
    column: &Column,
    checks: &[ParsedCheck],
    policy: &SynthPolicy,
    rng: &mut StdRng,
) -> Value {
    let pinned = checks.iter().any(|c| {
        matches!(
            c,
            ParsedCheck::InValues { .. } | ParsedCheck::LengthEquals { .. }
        )
    });
    if column.logical_type.is_string() && !pinned {
        let len = column.length.unwrap_or(24).clamp(1, 24) as usize;
        return Value::from_string(alnum_token(rng, len));
    }
    nonnull_value_for(column, checks, policy, rng)
}

fn semantic_value(
    kind: SemanticKind,
    column: &Column,
    policy: &SynthPolicy,
    rng: &mut StdRng,
) -> Value {
    let personas = policy.locale.personas();
    let s = match kind {
        SemanticKind::Email => format!(
            "{}.{}{}@{}",
            personas.first_name(rng).to_lowercase(),
            personas.last_name(rng).to_lowercase(),
            rng.random_range(0..100_000),
            personas.email_domain(rng)
        ),
        SemanticKind::Username => format!(
            "{}{}",
            personas.first_name(rng).to_lowercase(),
            rng.random_range(0..100_000)
        ),
        SemanticKind::Password => alnum_token(rng, 16),
        SemanticKind::FirstName => personas.first_name(rng).to_string(),
        SemanticKind::LastName => personas.last_name(rng).to_string(),
        SemanticKind::FullName => personas.full_name(rng),
        SemanticKind::Phone => expand_static(personas.phone_pattern, rng),
        SemanticKind::Street => personas.street_address(rng),
        SemanticKind::City => personas.city(rng).to_string(),
        SemanticKind::State => personas.region(rng).to_string(),
        SemanticKind::Zip => expand_static(personas.postcode_pattern, rng),
        SemanticKind::Country => country_for(policy.locale).to_string(),
        SemanticKind::Address => format!(
            "{}, {}, {} {}",
            personas.street_address(rng),
            personas.city(rng),
            personas.region(rng),
            expand_static(personas.postcode_pattern, rng)
        ),
        SemanticKind::Company => personas.company(rng),
        SemanticKind::FreeText => {
            let sentences: Vec<String> = Sentences(1..3).fake_with_rng(rng);
            sentences.join(" ")
        }
        SemanticKind::Url => {
            let word: String = Word().fake_with_rng(rng);
            format!("https://www.{}{}.example", word, rng.random_range(0..1000))
        }
    };
    clip_to_length(s, column.length)
}

/// Bundled persona patterns are static assets; parsing them cannot fail.
static PATTERN_CACHE: LazyLock<std::sync::Mutex<std::collections::HashMap<String, Pattern>>> =
    LazyLock::new(|| std::sync::Mutex::new(std::collections::HashMap::new()));

fn expand_static(template: &str, rng: &mut StdRng) -> String {
    let mut cache = PATTERN_CACHE.lock().expect("pattern cache lock");
    let pattern = cache
        .entry(template.to_string())
        .or_insert_with(|| Pattern::parse(template).expect("bundled pattern is valid"));
    pattern.expand(rng)
}

fn country_for(locale: Locale) -> &'static str {
    match locale {
        Locale::EnUs => "United States",
        Locale::EnGb => "United Kingdom",
        Locale::DeDe => "Deutschland",
        Locale::FrFr => "France",
        Locale::EnCa => "Canada",
        Locale::EnAu => "Australia",
    }
}

fn typed_value(
    column: &Column,
    checks: &[ParsedCheck],
    policy: &SynthPolicy,
    rng: &mut StdRng,
) -> Value {
    match column.logical_type {
        LogicalType::TinyInt => int_in(rng, checks, 0, 99, i8::MIN as i64, i8::MAX as i64),
        LogicalType::SmallInt => int_in(rng, checks, 0, 9_999, i16::MIN as i64, i16::MAX as i64),
        LogicalType::Integer => int_in(rng, checks, 0, 999_999, i32::MIN as i64, i32::MAX as i64),
        LogicalType::BigInt => int_in(rng, checks, 0, 9_999_999, i64::MIN, i64::MAX),
        LogicalType::Float | LogicalType::Double => {
            let (min, max) = f64_bounds(checks, 0.0, 10_000.0);
            let v: f64 = rng.random_range(min..=max);
            Value::Float((v * 10_000.0).round() / 10_000.0)
        }
        LogicalType::Decimal => decimal_value(column, checks, rng),
        LogicalType::Char | LogicalType::VarChar | LogicalType::Text => {
            string_value(column, checks, rng)
        }
        LogicalType::Date => {
            let days = rng.random_range(0..3650);
            Value::Date(policy.anchor.date() - ChronoDuration::days(days))
        }
        LogicalType::DateTime | LogicalType::Timestamp => {
            let minutes = rng.random_range(0..365 * 24 * 60);
            Value::Timestamp(policy.anchor - ChronoDuration::minutes(minutes))
        }
        LogicalType::Time => {
            let h = rng.random_range(0..24);
            let m = rng.random_range(0..60);
            let s = rng.random_range(0..60);
            Value::Time(NaiveTime::from_hms_opt(h, m, s).unwrap_or_default())
        }
        LogicalType::Boolean => Value::Bool(rng.random_bool(0.5)),
        LogicalType::Uuid => Value::Uuid(random_uuid(rng)),
        LogicalType::Json => Value::Json(serde_json::json!({
            "key": alnum_token(rng, 8),
            "active": rng.random_bool(0.8),
            "count": rng.random_range(0u32..100u32),
        })),
        LogicalType::Binary => {
            let len = rng.random_range(4..=16);
            let bytes: Vec<u8> = (0..len).map(|_| rng.random()).collect();
            Value::Bytes(bytes)
        }
    }
}

/// Bounded-string policy: very short columns get alphanumeric tokens, short
/// ones a word, medium ones a sentence, long ones a few sentences. Every
/// result is clipped to the declared length.
fn string_value(column: &Column, checks: &[ParsedCheck], rng: &mut StdRng) -> Value {
    if let Some(ParsedCheck::LengthEquals { length, .. }) = checks
        .iter()
        .find(|c| matches!(c, ParsedCheck::LengthEquals { .. }))
    {
        return Value::from_string(alnum_token(rng, *length));
    }

    let length = column.length.unwrap_or(match column.logical_type {
        LogicalType::Char => 1,
        LogicalType::VarChar => 255,
        _ => 1024,
    }) as usize;

    let s = if length <= 10 {
        alnum_token(rng, length.min(8))
    } else if length <= 50 {
        Word().fake_with_rng(rng)
    } else if length <= 255 {
        Sentence(4..10).fake_with_rng(rng)
    } else {
        let sentences: Vec<String> = Sentences(2..5).fake_with_rng(rng);
        sentences.join(" ")
    };
    clip_to_length(s, Some(length as u32))
}

fn decimal_value(column: &Column, checks: &[ParsedCheck], rng: &mut StdRng) -> Value {
    let precision = column.precision.unwrap_or(10).clamp(1, 18) as i64;
    let scale = column.scale.unwrap_or(2).min(precision as u32 - 1).min(8) as i64;
    let int_digits = (precision - scale).min(9);

    let default_max = 10i64.pow(int_digits as u32) - 1;
    let (min, max) = i64_bounds(checks, 0, default_max, 0, default_max);
    let whole = rng.random_range(min..=max.max(min));
    if scale == 0 {
        return Value::Decimal(format!("{}", whole));
    }
    let frac_max = 10i64.pow(scale as u32);
    let frac = rng.random_range(0..frac_max);
    Value::Decimal(format!(
        "{}.{:0width$}",
        whole,
        frac,
        width = scale as usize
    ))
}

fn int_in(
    rng: &mut StdRng,
    checks: &[ParsedCheck],
    default_min: i64,
    default_max: i64,
    type_min: i64,
    type_max: i64,
) -> Value {
    let (min, max) = i64_bounds(checks, default_min, default_max, type_min, type_max);
    let avoid: Vec<i64> = checks
        .iter()
        .filter_map(|c| match c {
            ParsedCheck::NotEqual { value, .. } => Some(*value as i64),
            _ => None,
        })
        .collect();
    for _ in 0..8 {
        let v = rng.random_range(min..=max.max(min));
        if !avoid.contains(&v) {
            return Value::Int(v);
        }
    }
    Value::Int(max.max(min))
}

/// Compute integer bounds from CHECK constraints, clamped to the type's
/// physical range. Conflicting bounds collapse to the lower one.
fn i64_bounds(
    checks: &[ParsedCheck],
    default_min: i64,
    default_max: i64,
    type_min: i64,
    type_max: i64,
) -> (i64, i64) {
    let mut min = default_min;
    let mut max = default_max;
    for check in checks {
        match check {
            ParsedCheck::GreaterThan { value, .. } => min = min.max(*value as i64 + 1),
            ParsedCheck::GreaterThanOrEqual { value, .. } => min = min.max(*value as i64),
            ParsedCheck::LessThan { value, .. } => max = max.min(*value as i64 - 1),
            ParsedCheck::LessThanOrEqual { value, .. } => max = max.min(*value as i64),
            ParsedCheck::Equal { value, .. } => {
                min = *value as i64;
                max = *value as i64;
            }
            ParsedCheck::Between { low, high, .. } => {
                min = min.max(*low as i64);
                max = max.min(*high as i64);
            }
            _ => {}
        }
    }
    min = min.clamp(type_min, type_max);
    max = max.clamp(type_min, type_max);
    if min > max {
        tracing::warn!(min, max, "conflicting numeric CHECK bounds, collapsing");
        max = min;
    }
    (min, max)
}

fn f64_bounds(checks: &[ParsedCheck], default_min: f64, default_max: f64) -> (f64, f64) {
    let mut min = default_min;
    let mut max = default_max;
    for check in checks {
        match check {
            ParsedCheck::GreaterThan { value, .. } => min = min.max(*value + 0.01),
            ParsedCheck::GreaterThanOrEqual { value, .. } => min = min.max(*value),
            ParsedCheck::LessThan { value, .. } => max = max.min(*value - 0.01),
            ParsedCheck::LessThanOrEqual { value, .. } => max = max.min(*value),
            ParsedCheck::Equal { value, .. } => {
                min = *value;
                max = *value;
            }
            ParsedCheck::Between { low, high, .. } => {
                min = min.max(*low);
                max = max.min(*high);
            }
            _ => {}
        }
    }
    if min > max {
        tracing::warn!(min, max, "conflicting numeric CHECK bounds, collapsing");
        max = min;
    }
    (min, max)
}

/// Render an IN-list literal into the column's type.
fn typed_literal(ty: LogicalType, literal: &str) -> Value {
    if ty.is_integer() {
        if let Ok(i) = literal.parse::<i64>() {
            return Value::Int(i);
        }
    }
    if ty.is_numeric() {
        if let Ok(f) = literal.parse::<f64>() {
            return match ty {
                LogicalType::Decimal => Value::Decimal(literal.to_string()),
                _ => Value::Float(f),
            };
        }
    }
    if ty == LogicalType::Boolean {
        if let Ok(b) = literal.parse::<bool>() {
            return Value::Bool(b);
        }
    }
    Value::from_string(literal.to_string())
}

fn alnum_token(rng: &mut StdRng, len: usize) -> String {
    const CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    (0..len)
        .map(|_| CHARS[rng.random_range(0..CHARS.len())] as char)
        .collect()
}

fn clip_to_length(s: String, length: Option<u32>) -> Value {
    match length {
        Some(len) if s.chars().count() > len as usize => {
            Value::from_string(s.chars().take(len as usize).collect())
        }
        _ => Value::from_string(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(21)
    }

    fn policy() -> SynthPolicy {
        SynthPolicy::new(Locale::EnUs)
    }

    #[test]
    fn test_email_shape() {
        let mut col = Column::new("email", LogicalType::VarChar);
        col.length = Some(255);
        col.nullable = false;
        let v = value_for(&col, &[], &policy(), &mut rng());
        let s = v.as_str().unwrap();
        assert!(s.contains('@'), "not an email: {}", s);
    }

    #[test]
    fn test_honor_defaults() {
        let mut col = Column::new("status", LogicalType::VarChar);
        col.default_value = Some(serde_json::json!("active"));
        col.nullable = false;
        let mut p = policy();
        p.honor_defaults = true;
        let v = value_for(&col, &[], &p, &mut rng());
        assert_eq!(v.as_str(), Some("active"));
    }

    #[test]
    fn test_nullable_rolls_roughly_ten_percent_null() {
        let col = Column::new("note", LogicalType::Text);
        let mut r = rng();
        let nulls = (0..2000)
            .filter(|_| value_for(&col, &[], &policy(), &mut r).is_null())
            .count();
        assert!(
            (120..=280).contains(&nulls),
            "expected ~200 nulls of 2000, got {}",
            nulls
        );
    }

    #[test]
    fn test_non_nullable_never_null() {
        let mut col = Column::new("note", LogicalType::Text);
        col.nullable = false;
        let mut r = rng();
        for _ in 0..500 {
            assert!(!value_for(&col, &[], &policy(), &mut r).is_null());
        }
    }

    #[test]
    fn test_semantic_requires_string_type() {
        // An integer column named "phone" must stay an integer.
        let mut col = Column::new("phone", LogicalType::Integer);
        col.nullable = false;
        let v = value_for(&col, &[], &policy(), &mut rng());
        assert!(matches!(v, Value::Int(_)));
    }

    #[test]
    fn test_string_length_buckets() {
        let mut r = rng();
        for (len, max) in [(4u32, 4usize), (30, 30), (120, 120), (500, 500)] {
            let mut col = Column::new("data", LogicalType::VarChar);
            col.length = Some(len);
            col.nullable = false;
            for _ in 0..20 {
                let v = value_for(&col, &[], &policy(), &mut r);
                assert!(v.as_str().unwrap().chars().count() <= max);
            }
        }
    }

    #[test]
    fn test_check_bounds_narrow_integers() {
        let mut col = Column::new("age", LogicalType::Integer);
        col.nullable = false;
        let checks = [ParsedCheck::Between {
            column: "age".to_string(),
            low: 18.0,
            high: 65.0,
        }];
        let mut r = rng();
        for _ in 0..200 {
            let v = value_for(&col, &checks, &policy(), &mut r);
            let i = v.as_int().unwrap();
            assert!((18..=65).contains(&i), "out of bounds: {}", i);
        }
    }

    #[test]
    fn test_in_list_pins_values() {
        let mut col = Column::new("status", LogicalType::VarChar);
        col.nullable = false;
        let checks = [ParsedCheck::InValues {
            column: "status".to_string(),
            values: vec!["new".to_string(), "done".to_string()],
        }];
        let mut r = rng();
        for _ in 0..50 {
            let v = value_for(&col, &checks, &policy(), &mut r);
            assert!(["new", "done"].contains(&v.as_str().unwrap()));
        }
    }

    #[test]
    fn test_length_equals_forces_exact_length() {
        let mut col = Column::new("code", LogicalType::Char);
        col.length = Some(10);
        col.nullable = false;
        let checks = [ParsedCheck::LengthEquals {
            column: "code".to_string(),
            length: 3,
        }];
        let v = value_for(&col, &checks, &policy(), &mut rng());
        assert_eq!(v.as_str().unwrap().len(), 3);
    }

    #[test]
    fn test_decimal_respects_scale() {
        let mut col = Column::new("price", LogicalType::Decimal);
        col.precision = Some(8);
        col.scale = Some(2);
        col.nullable = false;
        let mut r = rng();
        for _ in 0..50 {
            let v = value_for(&col, &[], &policy(), &mut r);
            if let Value::Decimal(d) = &v {
                let (_, frac) = d.split_once('.').unwrap();
                assert_eq!(frac.len(), 2, "bad scale: {}", d);
            } else {
                panic!("expected decimal, got {:?}", v);
            }
        }
    }

    #[test]
    fn test_locale_changes_personas() {
        let mut col = Column::new("first_name", LogicalType::VarChar);
        col.nullable = false;
        let mut us = SynthPolicy::new(Locale::EnUs);
        us.honor_defaults = false;
        let de = SynthPolicy::new(Locale::DeDe);

        let mut r = rng();
        let us_names: std::collections::HashSet<String> = (0..100)
            .map(|_| value_for(&col, &[], &us, &mut r).to_string())
            .collect();
        let de_names: std::collections::HashSet<String> = (0..100)
            .map(|_| value_for(&col, &[], &de, &mut r).to_string())
            .collect();
        assert_ne!(us_names, de_names);
    }

    #[test]
    fn test_temporal_values_are_anchored() {
        let mut col = Column::new("created", LogicalType::Timestamp);
        col.nullable = false;
        let v = value_for(&col, &[], &policy(), &mut rng());
        if let Value::Timestamp(ts) = v {
            assert!(ts <= anchor_time());
        } else {
            panic!("expected timestamp");
        }
    }
}
