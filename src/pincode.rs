//! Postal code token with best-effort normalization.
//!
//! A code is never rejected. Inputs that do not look like a 6-digit
//! pincode are carried through verbatim and simply fail to resolve later.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Width of an Indian postal index number.
pub const PINCODE_WIDTH: usize = 6;

/// A normalized postal code, the key for every lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostalCode(String);

impl PostalCode {
    /// Normalize a raw token.
    ///
    /// "  110001 " → "110001", "PIN-400001" → "400001", "1234" → "001234".
    /// Anything else is kept as the trimmed input.
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim();

        if let Some(run) = find_digit_run(trimmed, PINCODE_WIDTH) {
            return Self(run.to_string());
        }

        let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
        if !digits.is_empty() && digits.len() < PINCODE_WIDTH {
            return Self(format!("{:0>width$}", digits, width = PINCODE_WIDTH));
        }

        Self(trimmed.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Numeric value of an all-digit code.
    pub fn as_number(&self) -> Option<u32> {
        if self.0.is_empty() || !self.0.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        self.0.parse().ok()
    }
}

/// First run of exactly `width` consecutive ASCII digits.
/// Longer runs do not match (a 7-digit number is not a pincode).
fn find_digit_run(s: &str, width: usize) -> Option<&str> {
    let bytes = s.as_bytes();
    let mut start = 0;
    while start < bytes.len() {
        if !bytes[start].is_ascii_digit() {
            start += 1;
            continue;
        }
        let mut end = start;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        if end - start == width {
            return Some(&s[start..end]);
        }
        start = end;
    }
    None
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PostalCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PostalCode {
    fn from(s: String) -> Self {
        Self::new(&s)
    }
}

impl AsRef<str> for PostalCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
