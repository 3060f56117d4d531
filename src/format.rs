//! Cell value formatters.
//!
//! A column (or cell) selects a formatter with its `format` property; the
//! optional `decimals` property controls fixed-point output.

use std::collections::HashMap;

use crate::types::{CellValue, PropertyMap};

/// Formatter function: value plus the resolved cell properties.
pub type FormatFn = fn(&CellValue, &PropertyMap) -> String;

/// Named formatters
#[derive(Clone)]
pub struct FormatterRegistry {
    formatters: HashMap<String, FormatFn>,
}

impl Default for FormatterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FormatterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.formatters.keys().collect();
        names.sort();
        f.debug_struct("FormatterRegistry")
            .field("formatters", &names)
            .finish()
    }
}

impl FormatterRegistry {
    pub fn new() -> Self {
        let mut formatters: HashMap<String, FormatFn> = HashMap::new();
        formatters.insert("default".into(), format_default);
        formatters.insert("text".into(), format_text);
        formatters.insert("number".into(), format_number);
        formatters.insert("integer".into(), format_integer);
        formatters.insert("percent".into(), format_percent);
        Self { formatters }
    }

    pub fn register(&mut self, name: impl Into<String>, f: FormatFn) {
        self.formatters.insert(name.into(), f);
    }

    /// Format `value` using the formatter named by `props["format"]`,
    /// falling back to `default` for unknown names.
    pub fn format(&self, value: &CellValue, props: &PropertyMap) -> String {
        let name = props
            .get("format")
            .and_then(|v| v.as_str())
            .unwrap_or("default");
        let f = self
            .formatters
            .get(name)
            .copied()
            .unwrap_or(format_default as FormatFn);
        f(value, props)
    }
}

fn decimals(props: &PropertyMap, fallback: usize) -> usize {
    props
        .get("decimals")
        .and_then(serde_json::Value::as_u64)
        .and_then(|d| usize::try_from(d).ok())
        .unwrap_or(fallback)
        .min(10)
}

fn format_text(value: &CellValue, _props: &PropertyMap) -> String {
    value.to_string()
}

fn format_default(value: &CellValue, _props: &PropertyMap) -> String {
    match value {
        CellValue::Number(n) => format_general(*n),
        other => other.to_string(),
    }
}

fn format_number(value: &CellValue, props: &PropertyMap) -> String {
    match value {
        CellValue::Number(n) => format_with_thousands(*n, decimals(props, 2)),
        other => other.to_string(),
    }
}

fn format_integer(value: &CellValue, _props: &PropertyMap) -> String {
    match value {
        CellValue::Number(n) => format_with_thousands(n.round(), 0),
        other => other.to_string(),
    }
}

fn format_percent(value: &CellValue, props: &PropertyMap) -> String {
    match value {
        CellValue::Number(n) => format!("{:.prec$}%", n * 100.0, prec = decimals(props, 0)),
        other => other.to_string(),
    }
}

/// General format - smart number display
#[allow(clippy::float_cmp)]
#[allow(clippy::cast_possible_truncation)]
fn format_general(value: f64) -> String {
    if value == value.floor() && value.abs() < 1e11 {
        // Integer display
        format!("{}", value as i64)
    } else if value.abs() >= 1e11 || (value.abs() < 1e-4 && value != 0.0) {
        format!("{value:.5E}")
    } else {
        let s = format!("{value:.10}");
        let s = s.trim_end_matches('0');
        let s = s.trim_end_matches('.');
        s.to_string()
    }
}

/// Format number with thousands separators
fn format_with_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.prec$}", value.abs(), prec = decimals);
    let (int_part, dec_part) = match formatted.split_once('.') {
        Some((i, d)) => (i, Some(d)),
        None => (formatted.as_str(), None),
    };

    let mut with_sep = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            with_sep.push(',');
        }
        with_sep.push(c);
    }

    let body = match dec_part {
        Some(dec) => format!("{with_sep}.{dec}"),
        None => with_sep,
    };
    let is_zero = body.chars().all(|c| matches!(c, '0' | '.' | ','));
    if value < 0.0 && !is_zero {
        format!("-{body}")
    } else {
        body
    }
}
