//! Timezone utilities for date handling
//!
//! Usage timestamps are epoch seconds, so calendar days default to UTC.
//! A named IANA zone, or `local` for the system zone, can be chosen instead.

use chrono_tz::Tz;
use std::str::FromStr;
use tracing::debug;

/// Configuration for timezone handling
#[derive(Debug, Clone)]
pub struct TimezoneConfig {
    /// The timezone to use for date operations
    pub tz: Tz,
    /// Whether the timezone is UTC
    pub is_utc: bool,
}

impl Default for TimezoneConfig {
    fn default() -> Self {
        Self {
            tz: Tz::UTC,
            is_utc: true,
        }
    }
}

impl TimezoneConfig {
    /// Create a timezone configuration from the `--timezone` argument
    pub fn from_cli(timezone_str: Option<&str>) -> crate::error::Result<Self> {
        let tz = match timezone_str {
            None => return Ok(Self::default()),
            Some(s) if s.eq_ignore_ascii_case("local") => get_local_timezone(),
            Some(s) => Tz::from_str(s).map_err(|_| {
                crate::error::OaistatError::InvalidTimezone(format!(
                    "'{s}'. Use format like 'America/New_York', 'Asia/Tokyo', 'UTC', or 'local'"
                ))
            })?,
        };

        Ok(Self {
            tz,
            is_utc: tz == Tz::UTC,
        })
    }

    /// Get the display name for the configured timezone
    pub fn display_name(&self) -> &str {
        if self.is_utc { "UTC" } else { self.tz.name() }
    }
}

/// Get the system's local timezone, falling back to UTC
fn get_local_timezone() -> Tz {
    match iana_time_zone::get_timezone() {
        Ok(tz_str) => {
            debug!("Detected system timezone: {}", tz_str);
            Tz::from_str(&tz_str).unwrap_or_else(|_| {
                debug!("Failed to parse timezone '{}', falling back to UTC", tz_str);
                Tz::UTC
            })
        }
        Err(e) => {
            debug!("Failed to detect system timezone: {}, using UTC", e);
            Tz::UTC
        }
    }
}
