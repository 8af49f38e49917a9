use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};

/// Last-signal timestamps per symbol.
///
/// A symbol is present iff it has signalled since process start. Entries are
/// never evicted; they are compared against the cooldown window and
/// overwritten on the next signal.
#[derive(Debug, Clone)]
pub struct CooldownRegistry {
    cooldown: TimeDelta,
    last_signal: HashMap<String, DateTime<Utc>>,
}

impl CooldownRegistry {
    pub fn new(cooldown: TimeDelta) -> Self {
        Self {
            cooldown,
            last_signal: HashMap::new(),
        }
    }

    /// Time left before `symbol` may signal again, `None` when idle.
    pub fn remaining(&self, symbol: &str, now: DateTime<Utc>) -> Option<TimeDelta> {
        let stamp = self.last_signal.get(symbol)?;
        let elapsed = now.signed_duration_since(*stamp);
        (elapsed < self.cooldown).then(|| self.cooldown - elapsed)
    }

    pub fn is_cooling(&self, symbol: &str, now: DateTime<Utc>) -> bool {
        self.remaining(symbol, now).is_some()
    }

    /// Records a signal at `at`, returning the stamp it replaced.
    pub fn stamp(&mut self, symbol: &str, at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.last_signal.insert(symbol.to_string(), at)
    }

    pub fn last_signal(&self, symbol: &str) -> Option<DateTime<Utc>> {
        self.last_signal.get(symbol).copied()
    }

    pub fn len(&self) -> usize {
        self.last_signal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_signal.is_empty()
    }
}
