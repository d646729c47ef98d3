use chrono::{DateTime, TimeDelta, Utc};
use tokio::time::Instant;

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// `now + ttl`, saturating instead of overflowing for absurd ttl values
pub fn expiry_after(ttl: TimeDelta) -> DateTime<Utc> {
    let now = now();
    now.checked_add_signed(ttl).unwrap_or(if ttl < TimeDelta::zero() {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    })
}

pub fn seconds(value: i64) -> TimeDelta {
    TimeDelta::try_seconds(value).unwrap_or(TimeDelta::MAX)
}

pub fn get_instant() -> Instant {
    Instant::now()
}
