use chrono::{DateTime, Utc};

/// Wall-clock or simulated instant, always UTC
pub type UtcTimestamp = DateTime<Utc>;
