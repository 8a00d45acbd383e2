//! Scrape contract checks.
//!
//! The scraper and the query layer live outside this process. What they rely
//! on is made executable here:
//! - [`parse`] is the reference reader of the exposition text, the exact
//!   inverse of [`crate::encode`].
//! - [`check_scrapes`] compares two consecutive scrapes of one process and
//!   reports anything that would break a rate computation.
//! - [`Series`] models the downstream consumer: a timestamped series for one
//!   counter with a reset-aware increase.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::error::{HitcountError, Result};
use crate::metrics::exposition::{escape_label_value, is_valid_identifier};
use crate::metrics::registry::{Labels, MetricSample};

/// A snapshot entry stamped with its collection time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub name: String,
    pub labels: Labels,
    pub value: u64,
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
}

impl Sample {
    pub fn from_metric(m: MetricSample, timestamp_ms: u64) -> Self {
        Self {
            name: m.name,
            labels: m.labels,
            value: m.value,
            timestamp_ms,
        }
    }
}

/// Parse an exposition body. Strict: every line must be newline terminated.
pub fn parse(text: &str) -> Result<Vec<MetricSample>> {
    let mut out = Vec::new();
    if text.is_empty() {
        return Ok(out);
    }
    if !text.ends_with('\n') {
        return Err(HitcountError::MalformedExposition {
            line: text.lines().count(),
            reason: "missing trailing newline".into(),
        });
    }
    for (i, line) in text.split_terminator('\n').enumerate() {
        let m = parse_line(line).map_err(|reason| HitcountError::MalformedExposition {
            line: i + 1,
            reason,
        })?;
        out.push(m);
    }
    Ok(out)
}

/// Parse a body and stamp every entry, the way a scraper stores it.
pub fn collect(text: &str, timestamp_ms: u64) -> Result<Vec<Sample>> {
    Ok(parse(text)?
        .into_iter()
        .map(|m| Sample::from_metric(m, timestamp_ms))
        .collect())
}

fn parse_line(line: &str) -> std::result::Result<MetricSample, String> {
    let name_end = line
        .find(|c: char| c == '{' || c == ' ')
        .ok_or_else(|| "missing value".to_string())?;
    let name = &line[..name_end];
    if !is_valid_identifier(name) {
        return Err(format!("invalid metric name {name:?}"));
    }

    let mut rest = &line[name_end..];
    let mut labels = Vec::new();
    if let Some(body) = rest.strip_prefix('{') {
        let (parsed, after) = parse_labels(body)?;
        labels = parsed;
        rest = after;
    }

    let value_str = rest
        .strip_prefix(' ')
        .ok_or_else(|| "expected a single space before the value".to_string())?;
    if value_str.is_empty() || !value_str.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("invalid value {value_str:?}"));
    }
    let value = value_str
        .parse::<u64>()
        .map_err(|e| format!("invalid value {value_str:?}: {e}"))?;

    Ok(MetricSample {
        name: name.to_string(),
        labels,
        value,
    })
}

fn parse_labels(s: &str) -> std::result::Result<(Labels, &str), String> {
    let mut labels = Vec::new();
    let mut rest = s;
    loop {
        let eq = rest
            .find('=')
            .ok_or_else(|| "label without '='".to_string())?;
        let key = &rest[..eq];
        if !is_valid_identifier(key) {
            return Err(format!("invalid label key {key:?}"));
        }
        rest = rest[eq + 1..]
            .strip_prefix('"')
            .ok_or_else(|| format!("value of label {key} must be quoted"))?;

        let (value, after) = unescape_quoted(rest)?;
        labels.push((key.to_string(), value));
        rest = after;

        if let Some(r) = rest.strip_prefix(',') {
            rest = r;
        } else if let Some(r) = rest.strip_prefix('}') {
            return Ok((labels, r));
        } else {
            return Err("expected ',' or '}' after label value".into());
        }
    }
}

/// Read a quoted label value up to its closing quote. `s` starts after the
/// opening quote; returns the unescaped value and the remainder after the
/// closing quote.
fn unescape_quoted(s: &str) -> std::result::Result<(String, &str), String> {
    let mut value = String::new();
    let mut chars = s.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Ok((value, &s[i + 1..])),
            '\\' => match chars.next() {
                Some((_, '\\')) => value.push('\\'),
                Some((_, '"')) => value.push('"'),
                Some((_, 'n')) => value.push('\n'),
                Some((_, other)) => return Err(format!("unknown escape \\{other}")),
                None => break,
            },
            _ => value.push(c),
        }
    }
    Err("unterminated label value".into())
}

/// Something a scraper would trip over between two scrapes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractViolation {
    #[error("series {0} appears more than once in one scrape")]
    Duplicate(String),
    #[error("series {0} disappeared between scrapes")]
    Missing(String),
    #[error("series {series} decreased from {from} to {to}")]
    Decreased { series: String, from: u64, to: u64 },
}

/// Render a series identity the way it appears on the wire.
pub fn series_id(m: &MetricSample) -> String {
    if m.labels.is_empty() {
        return m.name.clone();
    }
    let labels = m
        .labels
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label_value(v)))
        .collect::<Vec<_>>()
        .join(",");
    format!("{}{{{}}}", m.name, labels)
}

/// Compare two consecutive scrapes of the same process.
///
/// An empty result means a rate over these two points is well defined.
pub fn check_scrapes(previous: &[MetricSample], current: &[MetricSample]) -> Vec<ContractViolation> {
    let mut violations = Vec::new();

    let mut seen = HashSet::new();
    let mut now: HashMap<(&str, &Labels), u64> = HashMap::new();
    for m in current {
        if !seen.insert((m.name.as_str(), &m.labels)) {
            violations.push(ContractViolation::Duplicate(series_id(m)));
            continue;
        }
        now.insert((m.name.as_str(), &m.labels), m.value);
    }

    for m in previous {
        match now.get(&(m.name.as_str(), &m.labels)) {
            None => violations.push(ContractViolation::Missing(series_id(m))),
            Some(&v) if v < m.value => violations.push(ContractViolation::Decreased {
                series: series_id(m),
                from: m.value,
                to: v,
            }),
            Some(_) => {}
        }
    }
    violations
}

/// Timestamped points of one counter, oldest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    points: Vec<(u64, u64)>,
}

impl Series {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a point. Timestamps must be strictly increasing.
    pub fn push(&mut self, timestamp_ms: u64, value: u64) -> Result<()> {
        if let Some(&(last, _)) = self.points.last() {
            if timestamp_ms <= last {
                return Err(HitcountError::BadRequest(format!(
                    "sample at {timestamp_ms}ms is not after {last}ms"
                )));
            }
        }
        self.points.push((timestamp_ms, value));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points within `[end_ms - window_ms, end_ms]`.
    pub fn window(&self, end_ms: u64, window_ms: u64) -> Series {
        let start = end_ms.saturating_sub(window_ms);
        Series {
            points: self
                .points
                .iter()
                .copied()
                .filter(|&(t, _)| t >= start && t <= end_ms)
                .collect(),
        }
    }

    /// Number of drops, i.e. process restarts seen in the series.
    pub fn resets(&self) -> usize {
        self.points.windows(2).filter(|w| w[1].1 < w[0].1).count()
    }

    /// Total increase. A drop counts as a restart from zero. Saturates at
    /// `u64::MAX` when restarts push the total past it.
    pub fn increase(&self) -> u64 {
        self.points
            .windows(2)
            .map(|w| {
                let (prev, cur) = (w[0].1, w[1].1);
                if cur >= prev {
                    cur - prev
                } else {
                    cur
                }
            })
            .fold(0u64, u64::saturating_add)
    }

    /// Per-second increase over the covered span; `None` with fewer than two points.
    pub fn rate_per_second(&self) -> Option<f64> {
        let (first, last) = (self.points.first()?.0, self.points.last()?.0);
        if last <= first {
            return None;
        }
        let span_secs = (last - first) as f64 / 1000.0;
        Some(self.increase() as f64 / span_secs)
    }
}
