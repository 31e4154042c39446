use chrono::{Duration, Months, NaiveDate};
use rand::Rng;
use rand_regex::Regex as RandRegex;
use regex::Regex;

use fixtura_core::{FieldMeta, InvalidityKind, ScalarType, ValueFormat};

use crate::errors::GenerationError;
use crate::generators::FieldContext;
use crate::provider::ValueProvider;
use crate::value::Value;

/// Upper length for fresh text when the declared maximum is larger.
pub const VALID_TEXT_SPAN: usize = 12;
/// Declared maxima at or above this are treated as unbounded for TOO_LONG.
pub const MAX_OVERSIZE_LENGTH: i64 = 65_536;
/// Stand-in when a field declares no forbidden characters.
pub const DEFAULT_FORBIDDEN: char = '!';

const PATTERN_ATTEMPTS: usize = 32;
const PATTERN_MAX_REPEAT: u32 = 16;
const FILLER_ROUNDS: usize = 8;
const EMAIL_ATTEMPTS: usize = 4;
const EMAIL_DOMAIN: &str = "@ex.io";

/// Text length bounds as `usize`, with `max >= min`.
pub fn length_bounds(meta: &FieldMeta) -> (usize, usize) {
    let min = meta.min_length.max(0);
    let max = meta.max_length.max(min);
    (to_usize(min), to_usize(max))
}

fn to_usize(value: i64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}

/// Full-match matcher for a declared pattern.
pub fn pattern_matcher(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{})$", strip_anchors(pattern)))
}

fn strip_anchors(pattern: &str) -> &str {
    let trimmed = pattern.strip_prefix('^').unwrap_or(pattern);
    match trimmed.strip_suffix('$') {
        Some(rest) if !rest.ends_with('\\') => rest,
        _ => trimmed,
    }
}

/// Random lowercase alphanumerics avoiding the field's forbidden characters.
pub fn filler(provider: &mut dyn ValueProvider, len: usize, meta: &FieldMeta) -> String {
    let mut out = String::with_capacity(len);
    let mut count = 0;
    for _ in 0..FILLER_ROUNDS {
        if count >= len {
            break;
        }
        for ch in provider.characters(len - count).chars() {
            if !meta.is_forbidden(ch) {
                out.push(ch);
                count += 1;
            }
        }
    }
    out
}

/// Length for a fresh valid text value.
pub fn valid_length(meta: &FieldMeta, provider: &mut dyn ValueProvider) -> usize {
    let (min, max) = length_bounds(meta);
    let upper = max.min(min.max(VALID_TEXT_SPAN));
    let lower = min.max(1).min(upper);
    to_usize(provider.int_between(lower as i64, upper as i64))
}

pub fn random_text(meta: &FieldMeta, provider: &mut dyn ValueProvider) -> String {
    let len = valid_length(meta, provider);
    filler(provider, len, meta)
}

/// Brings `value` within the declared bounds: forbidden characters removed,
/// length clamped, and the pattern honoured when one is declared.
pub fn conform_text(
    field: &FieldContext<'_>,
    value: String,
    provider: &mut dyn ValueProvider,
) -> Result<String, GenerationError> {
    let meta = field.meta;
    let (min, max) = length_bounds(meta);
    let mut text: String = value.chars().filter(|ch| !meta.is_forbidden(*ch)).collect();

    if let Some(pattern) = &meta.pattern {
        let matcher = pattern_matcher(pattern).map_err(|err| {
            GenerationError::failed(field.path, format!("invalid pattern '{pattern}': {err}"))
        })?;
        let len = char_len(&text);
        if matcher.is_match(&text) && len >= min && len <= max {
            return Ok(text);
        }
        return sample_pattern(field, pattern, provider);
    }

    if char_len(&text) > max {
        text = text.chars().take(max).collect::<String>().trim_end().to_string();
    }
    let len = char_len(&text);
    if len < min {
        text.push_str(&filler(provider, min - len, meta));
    }
    Ok(text)
}

/// Samples the declared pattern until a value fits the length bounds and
/// avoids forbidden characters. The pattern wins if none does.
pub fn sample_pattern(
    field: &FieldContext<'_>,
    pattern: &str,
    provider: &mut dyn ValueProvider,
) -> Result<String, GenerationError> {
    let regex = RandRegex::compile(strip_anchors(pattern), PATTERN_MAX_REPEAT).map_err(|err| {
        GenerationError::failed(
            field.path,
            format!("pattern '{pattern}' cannot be sampled: {err}"),
        )
    })?;
    let (min, max) = length_bounds(field.meta);
    let fits = |candidate: &str| {
        let len = char_len(candidate);
        len >= min && len <= max && !candidate.chars().any(|ch| field.meta.is_forbidden(ch))
    };
    let mut candidate: String = provider.rng().sample(&regex);
    for _ in 1..PATTERN_ATTEMPTS {
        if fits(&candidate) {
            break;
        }
        candidate = provider.rng().sample(&regex);
    }
    Ok(candidate)
}

/// A valid email within the declared length bounds.
pub fn valid_email(
    field: &FieldContext<'_>,
    provider: &mut dyn ValueProvider,
) -> Result<String, GenerationError> {
    let meta = field.meta;
    let (min, max) = length_bounds(meta);
    for _ in 0..EMAIL_ATTEMPTS {
        let email = provider.safe_email();
        let len = char_len(&email);
        if len >= min && len <= max && !email.chars().any(|ch| meta.is_forbidden(ch)) {
            return Ok(email);
        }
    }
    let domain_len = EMAIL_DOMAIN.len();
    if max <= domain_len {
        return Err(GenerationError::failed(
            field.path,
            format!("max_length {max} leaves no room for an email address"),
        ));
    }
    let local_min = min.saturating_sub(domain_len).max(1);
    let local_max = (max - domain_len).min(local_min.max(VALID_TEXT_SPAN));
    let local_len = to_usize(provider.int_between(local_min as i64, local_max as i64));
    Ok(format!("{}{EMAIL_DOMAIN}", filler(provider, local_len, meta)))
}

/// Inclusive value bounds for numeric fields.
pub fn numeric_bounds(meta: &FieldMeta) -> (i64, i64) {
    (meta.min_length, meta.max_length.max(meta.min_length))
}

pub fn valid_int(meta: &FieldMeta, provider: &mut dyn ValueProvider) -> i64 {
    let (min, max) = numeric_bounds(meta);
    provider.int_between(min, max)
}

pub fn valid_decimal(meta: &FieldMeta, provider: &mut dyn ValueProvider) -> f64 {
    let (min, max) = numeric_bounds(meta);
    provider.decimal_between(min as f64, max as f64)
}

/// `date` moved by whole years, saturating at the calendar limits.
pub fn shift_years(date: NaiveDate, offset: i32) -> NaiveDate {
    let months = Months::new(offset.unsigned_abs().saturating_mul(12));
    if offset >= 0 {
        date.checked_add_months(months).unwrap_or(NaiveDate::MAX)
    } else {
        date.checked_sub_months(months).unwrap_or(NaiveDate::MIN)
    }
}

/// Inclusive date window derived from the year offsets.
pub fn date_bounds(meta: &FieldMeta, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let lower = shift_years(today, meta.min_year_offset);
    let upper = shift_years(today, meta.max_year_offset);
    (lower, upper.max(lower))
}

/// Type-driven valid value honouring every declared bound.
pub fn valid_value(
    field: &FieldContext<'_>,
    provider: &mut dyn ValueProvider,
) -> Result<Value, GenerationError> {
    let value = match field.scalar {
        ScalarType::Text if field.meta.format == Some(ValueFormat::Email) => {
            Value::Text(valid_email(field, provider)?)
        }
        ScalarType::Text => {
            let word = provider.word();
            Value::Text(conform_text(field, word, provider)?)
        }
        ScalarType::Integer => Value::Int(valid_int(field.meta, provider)),
        ScalarType::Decimal => Value::Decimal(valid_decimal(field.meta, provider)),
        ScalarType::Date => {
            let (lower, upper) = date_bounds(field.meta, field.today);
            Value::Date(provider.date_between(lower, upper))
        }
        ScalarType::Bool => Value::Bool(provider.bool()),
    };
    Ok(value)
}

fn unsupported(field: &FieldContext<'_>, kind: InvalidityKind) -> GenerationError {
    GenerationError::UnsupportedInvalidity {
        path: field.path.to_string(),
        kind,
        scalar: field.scalar.to_string(),
    }
}

/// Value of the field's scalar type violating exactly `kind`.
pub fn invalid_value(
    field: &FieldContext<'_>,
    kind: InvalidityKind,
    provider: &mut dyn ValueProvider,
) -> Result<Value, GenerationError> {
    if !kind.applies_to(field.scalar) {
        return Err(unsupported(field, kind));
    }
    match field.scalar {
        ScalarType::Text => invalid_text(field, kind, provider).map(Value::Text),
        ScalarType::Integer => invalid_int(field, kind, provider).map(Value::Int),
        ScalarType::Decimal => invalid_decimal(field, kind, provider).map(Value::Decimal),
        ScalarType::Date => invalid_date(field, kind, provider).map(Value::Date),
        ScalarType::Bool => Err(unsupported(field, kind)),
    }
}

pub fn invalid_text(
    field: &FieldContext<'_>,
    kind: InvalidityKind,
    provider: &mut dyn ValueProvider,
) -> Result<String, GenerationError> {
    match kind {
        InvalidityKind::TooShort => too_short_text(field, provider),
        InvalidityKind::TooLong => too_long_text(field, provider),
        InvalidityKind::ContainsForbiddenCharacters => {
            let base = random_text(field.meta, provider);
            Ok(with_forbidden_character(field.meta, base, provider))
        }
        InvalidityKind::InvalidEmail => Ok(malformed_email(provider)),
        _ => Err(unsupported(field, kind)),
    }
}

pub fn too_short_text(
    field: &FieldContext<'_>,
    provider: &mut dyn ValueProvider,
) -> Result<String, GenerationError> {
    let (min, _) = length_bounds(field.meta);
    if min == 0 {
        return Err(GenerationError::failed(
            field.path,
            "min_length is 0; no shorter text exists",
        ));
    }
    let lower = if min > 1 { 1 } else { 0 };
    let len = to_usize(provider.int_between(lower, (min - 1) as i64));
    Ok(filler(provider, len, field.meta))
}

pub fn too_long_text(
    field: &FieldContext<'_>,
    provider: &mut dyn ValueProvider,
) -> Result<String, GenerationError> {
    if field.meta.max_length >= MAX_OVERSIZE_LENGTH {
        return Err(GenerationError::failed(
            field.path,
            format!(
                "max_length {} is effectively unbounded; declare a smaller maximum to generate TOO_LONG",
                field.meta.max_length
            ),
        ));
    }
    let (_, max) = length_bounds(field.meta);
    let len = to_usize(provider.int_between(max as i64 + 1, max as i64 + 10));
    Ok(filler(provider, len, field.meta))
}

/// `base` kept within the length bounds with one forbidden character
/// appended. Fields without forbidden characters get [`DEFAULT_FORBIDDEN`].
pub fn with_forbidden_character(
    meta: &FieldMeta,
    base: String,
    provider: &mut dyn ValueProvider,
) -> String {
    let forbidden = meta
        .forbidden_characters
        .chars()
        .next()
        .unwrap_or(DEFAULT_FORBIDDEN);
    let (min, max) = length_bounds(meta);
    let keep = max.saturating_sub(1);
    let mut text: String = base
        .chars()
        .filter(|ch| !meta.is_forbidden(*ch))
        .take(keep)
        .collect();
    let needed = min.saturating_sub(1);
    let len = char_len(&text);
    if len < needed {
        text.push_str(&filler(provider, needed - len, meta));
    }
    text.push(forbidden);
    text
}

/// An address that fails a standard `local@domain.tld` check.
pub fn malformed_email(provider: &mut dyn ValueProvider) -> String {
    let user_len = to_usize(provider.int_between(4, 10));
    let user = provider.characters(user_len);
    let domain = format!("{}.com", provider.characters(6));
    match provider.int_between(0, 4) {
        0 => format!("{user}@"),
        1 => format!("{user}.{domain}"),
        2 => format!("@{domain}"),
        3 => format!("{user}@@{domain}"),
        _ => format!("{user} {user}@{domain}"),
    }
}

pub fn invalid_int(
    field: &FieldContext<'_>,
    kind: InvalidityKind,
    provider: &mut dyn ValueProvider,
) -> Result<i64, GenerationError> {
    let (min, max) = numeric_bounds(field.meta);
    match kind {
        InvalidityKind::TooShort if min > i64::MIN => {
            Ok(provider.int_between(min.saturating_sub(1000), min - 1))
        }
        InvalidityKind::TooLong if max < i64::MAX => {
            Ok(provider.int_between(max + 1, max.saturating_add(1000)))
        }
        InvalidityKind::TooShort | InvalidityKind::TooLong => Err(GenerationError::failed(
            field.path,
            format!("no integer lies outside [{min}, {max}] for {kind}"),
        )),
        _ => Err(unsupported(field, kind)),
    }
}

pub fn invalid_decimal(
    field: &FieldContext<'_>,
    kind: InvalidityKind,
    provider: &mut dyn ValueProvider,
) -> Result<f64, GenerationError> {
    let (min, max) = numeric_bounds(field.meta);
    let (min, max) = (min as f64, max as f64);
    match kind {
        InvalidityKind::TooShort => Ok(provider.decimal_between(min - 1000.0, min - 0.01)),
        InvalidityKind::TooLong => Ok(provider.decimal_between(max + 0.01, max + 1000.0)),
        _ => Err(unsupported(field, kind)),
    }
}

pub fn invalid_date(
    field: &FieldContext<'_>,
    kind: InvalidityKind,
    provider: &mut dyn ValueProvider,
) -> Result<NaiveDate, GenerationError> {
    let (lower, upper) = date_bounds(field.meta, field.today);
    let days = Duration::days(provider.int_between(1, 365));
    let shifted = match kind {
        InvalidityKind::TooFarInFutureDate => upper.checked_add_signed(days),
        InvalidityKind::TooOldDate => lower.checked_sub_signed(days),
        _ => return Err(unsupported(field, kind)),
    };
    shifted.ok_or_else(|| {
        GenerationError::failed(field.path, format!("date bounds leave no room for {kind}"))
    })
}
