//! OSC time tags
//!
//! A time tag is a 64-bit NTP timestamp: the upper 32 bits count seconds
//! since 1900-01-01 and the lower 32 bits are a binary fraction of a second.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};

/// Seconds between the NTP epoch (1900) and the Unix epoch (1970)
const NTP_UNIX_OFFSET: u64 = 2_208_988_800;

const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// 64-bit fixed-point NTP timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimeTag(u64);

impl TimeTag {
    /// The special value meaning "as soon as possible"
    pub const IMMEDIATELY: TimeTag = TimeTag(1);

    pub const fn new(seconds: u32, fraction: u32) -> Self {
        Self(((seconds as u64) << 32) | fraction as u64)
    }

    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn as_raw(&self) -> u64 {
        self.0
    }

    /// Whole seconds since the NTP epoch
    pub const fn seconds(&self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Fractional part in units of 2^-32 seconds
    pub const fn fraction(&self) -> u32 {
        self.0 as u32
    }

    pub const fn is_immediate(&self) -> bool {
        self.0 == Self::IMMEDIATELY.0
    }

    /// Time tag for the current wall-clock time
    pub fn now() -> Self {
        Self::from(SystemTime::now())
    }

    /// Convert to wall-clock time.
    ///
    /// Seconds are interpreted in NTP era 0, so times before 1970 map to
    /// instants before the Unix epoch.
    pub fn to_system_time(&self) -> SystemTime {
        let nanos = (u64::from(self.fraction()) * NANOS_PER_SECOND) >> 32;
        let seconds = u64::from(self.seconds());
        if seconds >= NTP_UNIX_OFFSET {
            UNIX_EPOCH + Duration::new(seconds - NTP_UNIX_OFFSET, nanos as u32)
        } else {
            UNIX_EPOCH - Duration::from_secs(NTP_UNIX_OFFSET - seconds)
                + Duration::from_nanos(nanos)
        }
    }

    pub fn to_datetime(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from(self.to_system_time())
    }
}

impl From<SystemTime> for TimeTag {
    fn from(time: SystemTime) -> Self {
        // Instants before 1970 clamp to the Unix epoch
        let since_unix = time.duration_since(UNIX_EPOCH).unwrap_or_default();
        let seconds = (since_unix.as_secs() + NTP_UNIX_OFFSET) as u32;
        let fraction = ((u64::from(since_unix.subsec_nanos()) << 32) / NANOS_PER_SECOND) as u32;
        Self::new(seconds, fraction)
    }
}

impl From<DateTime<Utc>> for TimeTag {
    fn from(time: DateTime<Utc>) -> Self {
        Self::from(SystemTime::from(time))
    }
}

impl From<u64> for TimeTag {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for TimeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_immediate() {
            write!(f, "immediately")
        } else {
            write!(f, "{}", self.to_datetime().to_rfc3339())
        }
    }
}
