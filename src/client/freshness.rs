// Freshness tiers for the last received snapshot

use serde::Serialize;
use std::time::Duration;

pub const HOT_WITHIN: Duration = Duration::from_secs(3);
pub const WARM_WITHIN: Duration = Duration::from_secs(8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Freshness {
    /// Under 3s old.
    Hot,
    /// Under 8s old.
    Warm,
    Stale,
    /// Transport not delivering; overrides any age.
    Bad,
}

impl Freshness {
    /// `age` is `None` when nothing has been received yet.
    pub fn classify(connected: bool, age: Option<Duration>) -> Self {
        if !connected {
            return Freshness::Bad;
        }
        match age {
            Some(age) if age < HOT_WITHIN => Freshness::Hot,
            Some(age) if age < WARM_WITHIN => Freshness::Warm,
            _ => Freshness::Stale,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Freshness::Hot => "LIVE",
            Freshness::Warm => "LIVE (lagging)",
            Freshness::Stale | Freshness::Bad => "OFFLINE / STALE",
        }
    }
}
