//! A lightweight uom-ish library, just the quantities the engine moves around.

use std::ops::{Add, AddAssign, Mul, Sub};

use globe_types::prelude::UtcTimestamp;
use serde::Serialize;

#[derive(Copy, Clone, PartialEq, PartialOrd)]
pub struct Length {
    meters: f64,
}

impl std::fmt::Debug for Length {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} m", self.meters)
    }
}

impl Length {
    pub fn from_meters(meters: f64) -> Length {
        Length { meters }
    }

    pub fn from_kilometers(km: f64) -> Length {
        Length {
            meters: km * 1000.0,
        }
    }

    pub fn as_meters(&self) -> f64 {
        self.meters
    }

    pub fn as_kilometers(&self) -> f64 {
        self.meters / 1000.0
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(transparent)]
pub struct Timestamp {
    utc: UtcTimestamp,
}

impl std::fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.utc)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.utc.to_rfc3339())
    }
}

impl From<UtcTimestamp> for Timestamp {
    fn from(utc: UtcTimestamp) -> Self {
        Timestamp::from_utc(utc)
    }
}

impl Timestamp {
    pub fn now() -> Timestamp {
        Timestamp::from_utc(chrono::Utc::now())
    }

    pub fn from_utc(utc: UtcTimestamp) -> Timestamp {
        Timestamp { utc }
    }

    /// Parse an RFC 3339 string, e.g. `2020-07-13T00:00:00Z`
    pub fn parse_rfc3339(s: &str) -> Result<Timestamp, chrono::ParseError> {
        let t = chrono::DateTime::parse_from_rfc3339(s)?;
        Ok(Timestamp::from_utc(t.with_timezone(&chrono::Utc)))
    }

    pub fn as_utc(&self) -> &UtcTimestamp {
        &self.utc
    }

    pub fn as_millis(&self) -> i64 {
        self.utc.timestamp_millis()
    }

    pub fn checked_add_nanos(&self, nanos: i64) -> Option<Timestamp> {
        self.utc
            .checked_add_signed(chrono::Duration::nanoseconds(nanos))
            .map(Timestamp::from_utc)
    }
}

impl Sub<Timestamp> for Timestamp {
    type Output = Time;

    fn sub(self, rhs: Timestamp) -> Self::Output {
        Time::from_chrono_duration(*self.as_utc() - *rhs.as_utc())
    }
}

impl Add<Time> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Time) -> Self::Output {
        let mut ts = self;
        ts += rhs;
        ts
    }
}

impl AddAssign<Time> for Timestamp {
    fn add_assign(&mut self, rhs: Time) {
        self.utc += chrono::Duration::nanoseconds(rhs.as_nanos());
    }
}

#[derive(Copy, Clone, PartialEq, PartialOrd)]
pub struct Time {
    seconds: f64,
}

impl std::fmt::Debug for Time {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} s", self.seconds)
    }
}

impl From<std::time::Duration> for Time {
    fn from(d: std::time::Duration) -> Self {
        Time::from_secs(d.as_secs_f64())
    }
}

impl Time {
    pub fn from_chrono_duration(duration: chrono::Duration) -> Time {
        // Only overflows past ~292 years, fall back to millisecond resolution there
        let seconds = match duration.num_nanoseconds() {
            Some(ns) => ns as f64 / 1_000_000_000.0,
            None => duration.num_milliseconds() as f64 / 1_000.0,
        };
        Time { seconds }
    }

    pub fn from_secs(seconds: f64) -> Time {
        Time { seconds }
    }

    pub fn from_millis(millis: f64) -> Time {
        Time {
            seconds: millis / 1000.0,
        }
    }

    pub fn as_secs(&self) -> f64 {
        self.seconds
    }

    pub fn as_millis(&self) -> f64 {
        self.seconds * 1_000.0
    }

    /// Rounded to the nearest nanosecond, saturating
    pub fn as_nanos(&self) -> i64 {
        (self.seconds * 1_000_000_000.0).round() as i64
    }

    /// Rounded to the nearest nanosecond, none if that doesn't fit an `i64`
    pub fn checked_nanos(&self) -> Option<i64> {
        let ns = (self.seconds * 1_000_000_000.0).round();
        if ns.is_finite() && ns.abs() < i64::MAX as f64 {
            Some(ns as i64)
        } else {
            None
        }
    }

    /// True for a finite duration greater than zero
    pub fn is_positive(&self) -> bool {
        self.seconds.is_finite() && self.seconds > 0.0
    }
}

impl Mul<u64> for Time {
    type Output = Time;

    fn mul(self, rhs: u64) -> Self::Output {
        Time::from_secs(self.as_secs() * rhs as f64)
    }
}

#[derive(Copy, Clone, PartialEq, PartialOrd)]
pub struct Angle {
    degrees: f64,
}

impl std::fmt::Debug for Angle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}°", self.degrees)
    }
}

impl Angle {
    pub fn from_degrees(degrees: f64) -> Angle {
        Angle { degrees }
    }

    pub fn from_radians(radians: f64) -> Angle {
        Angle {
            degrees: radians.to_degrees(),
        }
    }

    pub fn as_degrees(&self) -> f64 {
        self.degrees
    }

    pub fn as_radians(&self) -> f64 {
        self.degrees.to_radians()
    }

    /// Wrapped into `[0, 360)` degrees
    pub fn normalized(&self) -> Angle {
        Angle::from_degrees(self.degrees.rem_euclid(360.0))
    }
}
