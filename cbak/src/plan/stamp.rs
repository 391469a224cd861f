//! Timestamp suffixes that disambiguate archive header names.

use chrono::{DateTime, Local};

/// Fixed-width, nanosecond precision (29 characters).
pub const STAMP_FORMAT: &str = "%Y-%m-%d,%H:%M:%S%.9f";

/// Longest header name kept; longer names fall back to the bare stamp.
pub const MAX_HEADER_LEN: usize = 255;

/// Hands out wall-clock stamps that never go backwards within one run.
#[derive(Debug, Default)]
pub struct HeaderStamper {
    last: Option<DateTime<Local>>,
}

impl HeaderStamper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current time rendered with [`STAMP_FORMAT`], clamped to the last stamp.
    pub fn next_stamp(&mut self) -> String {
        let now = Local::now();
        let stamp = match self.last {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last = Some(stamp);
        stamp.format(STAMP_FORMAT).to_string()
    }

    /// `base` followed by a stamp, or the stamp alone if that would be too long.
    pub fn header_name(&mut self, base: &str) -> String {
        let stamp = self.next_stamp();
        if base.len() + stamp.len() > MAX_HEADER_LEN {
            stamp
        } else {
            format!("{base}{stamp}")
        }
    }
}
