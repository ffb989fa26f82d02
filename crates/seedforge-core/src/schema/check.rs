//! Whitelisted CHECK-expression parsing.
//!
//! The engine performs no general CHECK evaluation. A small set of common
//! shapes is recognized and used to narrow the value synthesizer; everything
//! else passes through untouched and is reported by the validator as not
//! enforced by the generator.
//!
//! Recognized shapes: `col > n`, `col >= n`, `col < n`, `col <= n`,
//! `col = n`, `col != n` / `col <> n`, `col BETWEEN a AND b`,
//! `col IN (v1, v2, ...)`, `LENGTH(col) = n`.

use regex::Regex;
use std::sync::LazyLock;

use crate::generate::value::Value;

/// Parsed representation of a whitelisted CHECK constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedCheck {
    GreaterThan { column: String, value: f64 },
    GreaterThanOrEqual { column: String, value: f64 },
    LessThan { column: String, value: f64 },
    LessThanOrEqual { column: String, value: f64 },
    Equal { column: String, value: f64 },
    NotEqual { column: String, value: f64 },
    Between { column: String, low: f64, high: f64 },
    InValues { column: String, values: Vec<String> },
    LengthEquals { column: String, length: usize },
}

static COMPARISON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\(?\s*(\w+)\s*(>=|<=|!=|<>|=|>|<)\s*(-?\d+(?:\.\d+)?)\s*\)?\s*$").unwrap()
});

static BETWEEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*\(?\s*(\w+)\s+BETWEEN\s+(-?\d+(?:\.\d+)?)\s+AND\s+(-?\d+(?:\.\d+)?)\s*\)?\s*$",
    )
    .unwrap()
});

static IN_LIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*\(?\s*(\w+)\s+IN\s*\(([^)]+)\)\s*\)?\s*$").unwrap());

static LENGTH_EQ: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*\(?\s*(?:CHAR_)?LENGTH\s*\(\s*(\w+)\s*\)\s*=\s*(\d+)\s*\)?\s*$").unwrap()
});

impl ParsedCheck {
    /// Try to parse a CHECK expression. `None` means the expression is
    /// outside the whitelist and will not be enforced.
    pub fn parse(expression: &str) -> Option<Self> {
        if let Some(caps) = COMPARISON.captures(expression) {
            let column = caps[1].to_string();
            let value: f64 = caps[3].parse().ok()?;
            return Some(match &caps[2] {
                ">" => ParsedCheck::GreaterThan { column, value },
                ">=" => ParsedCheck::GreaterThanOrEqual { column, value },
                "<" => ParsedCheck::LessThan { column, value },
                "<=" => ParsedCheck::LessThanOrEqual { column, value },
                "=" => ParsedCheck::Equal { column, value },
                _ => ParsedCheck::NotEqual { column, value },
            });
        }

        if let Some(caps) = BETWEEN.captures(expression) {
            let low: f64 = caps[2].parse().ok()?;
            let high: f64 = caps[3].parse().ok()?;
            return Some(ParsedCheck::Between {
                column: caps[1].to_string(),
                low,
                high,
            });
        }

        if let Some(caps) = IN_LIST.captures(expression) {
            let values: Vec<String> = caps[2]
                .split(',')
                .map(|v| v.trim().trim_matches('\'').trim_matches('"').to_string())
                .filter(|v| !v.is_empty())
                .collect();
            if values.is_empty() {
                return None;
            }
            return Some(ParsedCheck::InValues {
                column: caps[1].to_string(),
                values,
            });
        }

        if let Some(caps) = LENGTH_EQ.captures(expression) {
            let length: usize = caps[2].parse().ok()?;
            return Some(ParsedCheck::LengthEquals {
                column: caps[1].to_string(),
                length,
            });
        }

        None
    }

    /// The column this check constrains.
    pub fn column(&self) -> &str {
        match self {
            ParsedCheck::GreaterThan { column, .. }
            | ParsedCheck::GreaterThanOrEqual { column, .. }
            | ParsedCheck::LessThan { column, .. }
            | ParsedCheck::LessThanOrEqual { column, .. }
            | ParsedCheck::Equal { column, .. }
            | ParsedCheck::NotEqual { column, .. }
            | ParsedCheck::Between { column, .. }
            | ParsedCheck::InValues { column, .. }
            | ParsedCheck::LengthEquals { column, .. } => column,
        }
    }

    /// Evaluate the check against an emitted value. NULL satisfies every
    /// check (SQL semantics: a NULL comparison is not a violation).
    pub fn evaluate(&self, value: &Value) -> bool {
        if value.is_null() {
            return true;
        }
        match self {
            ParsedCheck::GreaterThan { value: bound, .. } => {
                value.as_f64().is_some_and(|v| v > *bound)
            }
            ParsedCheck::GreaterThanOrEqual { value: bound, .. } => {
                value.as_f64().is_some_and(|v| v >= *bound)
            }
            ParsedCheck::LessThan { value: bound, .. } => {
                value.as_f64().is_some_and(|v| v < *bound)
            }
            ParsedCheck::LessThanOrEqual { value: bound, .. } => {
                value.as_f64().is_some_and(|v| v <= *bound)
            }
            ParsedCheck::Equal { value: bound, .. } => {
                value.as_f64().is_some_and(|v| (v - *bound).abs() < f64::EPSILON)
            }
            ParsedCheck::NotEqual { value: bound, .. } => {
                value.as_f64().is_some_and(|v| (v - *bound).abs() >= f64::EPSILON)
            }
            ParsedCheck::Between { low, high, .. } => {
                value.as_f64().is_some_and(|v| v >= *low && v <= *high)
            }
            ParsedCheck::InValues { values, .. } => {
                let rendered = value.to_unique_key();
                values.iter().any(|v| *v == rendered)
            }
            ParsedCheck::LengthEquals { length, .. } => value
                .as_str()
                .is_some_and(|s| s.chars().count() == *length),
        }
    }
}
