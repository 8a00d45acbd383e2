//! Text exposition encoder.
//!
//! One line per metric, in snapshot order:
//!
//! ```text
//! app_requests_total 3
//! http_hits_total{route="/hello",zone="a"} 12
//! ```
//!
//! Output is built into a single buffer and returned whole, so a caller never
//! writes a partially rendered body.

use std::fmt::Write;

use crate::error::{HitcountError, Result};
use crate::metrics::registry::MetricSample;

/// `[a-zA-Z_][a-zA-Z0-9_]*`
pub fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Helper to escape label values.
pub fn escape_label_value(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn check_identifier(s: &str) -> Result<()> {
    if is_valid_identifier(s) {
        Ok(())
    } else {
        Err(HitcountError::InvalidIdentifier(s.to_string()))
    }
}

/// Render a snapshot. Fails on the first invalid name or label key.
pub fn encode(snapshot: &[MetricSample]) -> Result<String> {
    let mut out = String::with_capacity(snapshot.len() * 32);
    for m in snapshot {
        check_identifier(&m.name)?;
        out.push_str(&m.name);
        if !m.labels.is_empty() {
            out.push('{');
            for (i, (k, v)) in m.labels.iter().enumerate() {
                check_identifier(k)?;
                if i > 0 {
                    out.push(',');
                }
                let _ = write!(out, "{}=\"{}\"", k, escape_label_value(v));
            }
            out.push('}');
        }
        let _ = writeln!(out, " {}", m.value);
    }
    Ok(out)
}
