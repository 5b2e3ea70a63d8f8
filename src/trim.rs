//! Capacity bounds for the persisted lists.
//!
//! Chat turns, meta suggestions and location samples are appended at the end
//! and bounded FIFO by [`evict_oldest`]. Notes are durable user data and only
//! pruned by [`prune_notes`] once their count passes a much higher threshold.

use serde::Deserialize;

use crate::state::{FieldNote, Snapshot};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Drops entries from the front until at most `capacity` remain.
/// Returns how many were removed.
pub fn evict_oldest<T>(list: &mut Vec<T>, capacity: usize) -> usize {
    if list.len() <= capacity {
        return 0;
    }
    let excess = list.len() - capacity;
    list.drain(..excess);
    excess
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct NoteRetention {
    /// Pruning only starts above this count; it is also the count kept.
    pub max_count: usize,
    pub max_age_days: i64,
}

impl Default for NoteRetention {
    fn default() -> Self {
        Self {
            max_count: 500,
            max_age_days: 365,
        }
    }
}

/// Age-then-count pruning. Below the threshold nothing is touched,
/// regardless of age. Surviving notes keep their relative order.
pub fn prune_notes(notes: &mut Vec<FieldNote>, retention: NoteRetention, now_ms: i64) -> usize {
    if notes.len() <= retention.max_count {
        return 0;
    }
    let before = notes.len();

    let cutoff = now_ms.saturating_sub(retention.max_age_days.saturating_mul(DAY_MS));
    notes.retain(|n| n.created > cutoff);

    if retention.max_count == 0 {
        notes.clear();
    } else if notes.len() > retention.max_count {
        let mut created: Vec<i64> = notes.iter().map(|n| n.created).collect();
        created.sort_unstable_by(|a, b| b.cmp(a));
        let threshold = created[retention.max_count - 1];
        // Ties at the threshold are resolved by keeping earlier positions,
        // which are the newer ones since notes are inserted at the front.
        let mut ties_allowed = created[..retention.max_count]
            .iter()
            .filter(|c| **c == threshold)
            .count();
        notes.retain(|n| {
            if n.created > threshold {
                true
            } else if n.created == threshold && ties_allowed > 0 {
                ties_allowed -= 1;
                true
            } else {
                false
            }
        });
    }

    before - notes.len()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct TrimLimits {
    pub chat_turns: usize,
    pub meta_suggestions: usize,
    pub location_samples: usize,
    /// `None` leaves notes untouched.
    #[serde(default)]
    pub notes: Option<NoteRetention>,
}

impl TrimLimits {
    pub const ROUTINE: TrimLimits = TrimLimits {
        chat_turns: 100,
        meta_suggestions: 50,
        location_samples: 500,
        notes: Some(NoteRetention {
            max_count: 500,
            max_age_days: 365,
        }),
    };

    pub const EMERGENCY: TrimLimits = TrimLimits {
        chat_turns: 20,
        meta_suggestions: 10,
        location_samples: 50,
        notes: None,
    };
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrimReport {
    pub chat_turns: usize,
    pub meta_suggestions: usize,
    pub location_samples: usize,
    pub notes: usize,
}

impl TrimReport {
    pub fn total(&self) -> usize {
        self.chat_turns + self.meta_suggestions + self.location_samples + self.notes
    }
}

pub fn trim_snapshot(snapshot: &mut Snapshot, limits: &TrimLimits, now_ms: i64) -> TrimReport {
    TrimReport {
        chat_turns: evict_oldest(&mut snapshot.chat_history, limits.chat_turns),
        meta_suggestions: evict_oldest(&mut snapshot.meta_suggestions, limits.meta_suggestions),
        location_samples: evict_oldest(
            &mut snapshot.meta_location_history,
            limits.location_samples,
        ),
        notes: limits
            .notes
            .map(|r| prune_notes(&mut snapshot.notes, r, now_ms))
            .unwrap_or(0),
    }
}
