use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Mutex;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::UserId;

/// Free publications per user per calendar day.
pub const DAILY_FREE_LIMIT: u8 = 3;

/// How many free publications a user has left today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Remaining {
    Unlimited,
    Limited(u8),
}

impl fmt::Display for Remaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Remaining::Unlimited => f.write_str("∞"),
            Remaining::Limited(left) => write!(f, "{left}/{DAILY_FREE_LIMIT}"),
        }
    }
}

/// Per-user counter of publications made on `date`. A record whose date
/// is not today counts as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaRecord {
    pub date: NaiveDate,
    pub published_count: u8,
}

/// Daily publication counter charged only on successful publication.
/// Users on the unlimited allow-list bypass the records entirely.
///
/// The caller supplies `today` so decision handlers and tests share one
/// notion of the current calendar day.
#[derive(Debug)]
pub struct QuotaTracker {
    records: Mutex<HashMap<UserId, QuotaRecord>>,
    unlimited: HashSet<UserId>,
}

impl QuotaTracker {
    pub fn new(unlimited: HashSet<UserId>) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            unlimited,
        }
    }

    pub fn is_unlimited(&self, user: UserId) -> bool {
        self.unlimited.contains(&user)
    }

    /// Whether the user may publish today. Does not mutate anything.
    pub fn can_publish(&self, user: UserId, today: NaiveDate) -> bool {
        if self.is_unlimited(user) {
            return true;
        }
        let records = self.lock_records();
        match records.get(&user) {
            Some(record) if record.date == today => record.published_count < DAILY_FREE_LIMIT,
            _ => true,
        }
    }

    /// Charge one publication and report what is left. The only caller is
    /// the approve path, after the channel post went out. The
    /// read-increment-write is atomic per author.
    pub fn record_publish(&self, user: UserId, today: NaiveDate) -> Remaining {
        if self.is_unlimited(user) {
            return Remaining::Unlimited;
        }
        let mut records = self.lock_records();
        let record = records.entry(user).or_insert(QuotaRecord {
            date: today,
            published_count: 0,
        });
        if record.date != today {
            record.date = today;
            record.published_count = 0;
        }
        record.published_count += 1;
        Remaining::Limited(DAILY_FREE_LIMIT.saturating_sub(record.published_count))
    }

    /// Read-only remaining count, used for display before a decision
    /// completes.
    pub fn remaining_today(&self, user: UserId, today: NaiveDate) -> Remaining {
        if self.is_unlimited(user) {
            return Remaining::Unlimited;
        }
        let records = self.lock_records();
        match records.get(&user) {
            Some(record) if record.date == today => {
                Remaining::Limited(DAILY_FREE_LIMIT.saturating_sub(record.published_count))
            }
            _ => Remaining::Limited(DAILY_FREE_LIMIT),
        }
    }

    fn lock_records(&self) -> std::sync::MutexGuard<'_, HashMap<UserId, QuotaRecord>> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
