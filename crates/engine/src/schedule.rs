//! Per-rule re-execution bookkeeping for the scheduled path.
//!
//! Each rule's last execution time and effective interval decide whether it
//! is due on a given tick. Rules the book has never seen are always due, so
//! a fresh process runs everything once and then settles into per-rule
//! cadences.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Scheduling state for a single rule.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleEntry {
    pub last_executed: DateTime<Utc>,
    pub previous_last_executed: Option<DateTime<Utc>>,
    /// Effective re-execution interval: the rule's self-reported
    /// `next_interval_minutes`, or the global default cadence.
    pub interval_minutes: u32,
    /// True while only the initial execution has been recorded.
    pub is_first_run: bool,
}

impl ScheduleEntry {
    pub fn next_scheduled_execution(&self) -> DateTime<Utc> {
        self.last_executed + Duration::minutes(i64::from(self.interval_minutes))
    }

    pub fn should_execute_now(&self, now: DateTime<Utc>) -> bool {
        now >= self.next_scheduled_execution()
    }
}

/// Mutex-guarded map of [`ScheduleEntry`] keyed by rule name.
pub struct ScheduleBook {
    entries: Mutex<HashMap<String, ScheduleEntry>>,
    default_interval_minutes: u32,
}

impl ScheduleBook {
    pub fn new(default_interval_minutes: u32) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_interval_minutes,
        }
    }

    /// Whether `rule` should execute at `now`. Unknown rules are due.
    pub fn is_due(&self, rule: &str, now: DateTime<Utc>) -> bool {
        self.entries
            .lock()
            .expect("schedule lock poisoned")
            .get(rule)
            .map(|entry| entry.should_execute_now(now))
            .unwrap_or(true)
    }

    /// Record a successful execution. `next_interval_minutes == None`
    /// falls back to the default cadence.
    pub fn record_execution(
        &self,
        rule: &str,
        executed_at: DateTime<Utc>,
        next_interval_minutes: Option<u32>,
    ) {
        let interval = next_interval_minutes.unwrap_or(self.default_interval_minutes);
        let mut entries = self.entries.lock().expect("schedule lock poisoned");
        match entries.get_mut(rule) {
            Some(entry) => {
                entry.previous_last_executed = Some(entry.last_executed);
                entry.last_executed = executed_at;
                entry.interval_minutes = interval;
                entry.is_first_run = false;
            }
            None => {
                entries.insert(
                    rule.to_string(),
                    ScheduleEntry {
                        last_executed: executed_at,
                        previous_last_executed: None,
                        interval_minutes: interval,
                        is_first_run: true,
                    },
                );
            }
        }
    }

    pub fn last_executed(&self, rule: &str) -> Option<DateTime<Utc>> {
        self.entries
            .lock()
            .expect("schedule lock poisoned")
            .get(rule)
            .map(|entry| entry.last_executed)
    }

    /// Sorted copy of all entries, for status reporting.
    pub fn snapshot(&self) -> BTreeMap<String, ScheduleEntry> {
        self.entries
            .lock()
            .expect("schedule lock poisoned")
            .iter()
            .map(|(name, entry)| (name.clone(), entry.clone()))
            .collect()
    }

    pub fn default_interval_minutes(&self) -> u32 {
        self.default_interval_minutes
    }
}
