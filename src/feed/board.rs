use chrono::{DateTime, Utc};

use crate::foundation::core::ZoneId;
use crate::model::message::OverlayMessage;

/// Local copy of the overlay messages the store has pushed.
///
/// Every record carries an arrival sequence number; the newest live record targeting a zone is
/// the one that zone shows.
#[derive(Clone, Debug, Default)]
pub struct MessageBoard {
    entries: Vec<(u64, OverlayMessage)>,
    next_seq: u64,
}

impl MessageBoard {
    /// Empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update a record. Inactive, invalid or already expired records are dropped
    /// (removing any previous version). Records without `created_at` are stamped with `now`.
    pub fn upsert(&mut self, mut message: OverlayMessage, now: DateTime<Utc>) -> bool {
        if let Err(e) = message.validate() {
            tracing::warn!(id = %message.id, error = %e, "ignoring invalid overlay message");
            self.remove(&message.id);
            return false;
        }
        if message.created_at.is_none() {
            message.created_at = Some(now);
        }
        if !message.is_live_at(now, 0) {
            tracing::debug!(id = %message.id, "ignoring inactive or expired overlay message");
            self.remove(&message.id);
            return false;
        }

        match self.entries.iter_mut().find(|(_, m)| m.id == message.id) {
            Some(slot) => slot.1 = message,
            None => {
                tracing::debug!(id = %message.id, zones = ?message.zones, "overlay message received");
                self.entries.push((self.next_seq, message));
                self.next_seq += 1;
            }
        }
        true
    }

    /// Drop the record with `id`. Returns whether one was present.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(_, m)| m.id != id);
        before != self.entries.len()
    }

    /// Drop records past their deadline plus `grace_ms`. Returns how many were dropped.
    pub fn sweep(&mut self, now: DateTime<Utc>, grace_ms: u64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(_, m)| m.is_live_at(now, grace_ms));
        before - self.entries.len()
    }

    /// Most recently received record targeting `zone`.
    pub fn newest_for(&self, zone: ZoneId) -> Option<&OverlayMessage> {
        self.entries
            .iter()
            .filter(|(_, m)| m.targets(zone))
            .max_by_key(|(seq, _)| *seq)
            .map(|(_, m)| m)
    }

    /// Whether a record with `id` is present.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|(_, m)| m.id == id)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no record is present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &OverlayMessage> {
        self.entries.iter().map(|(_, m)| m)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/feed/board.rs"]
mod tests;
