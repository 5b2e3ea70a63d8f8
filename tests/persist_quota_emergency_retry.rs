use anyhow::{anyhow, Result};
use field_companion::persist::{BoundedLocalStore, NoteDraft, PersistOutcome, DRAFT_KEY, STATE_KEY};
use field_companion::state::{ChatTurn, FieldNote, LocationSample, Snapshot};
use field_companion::store::{DeviceStore, InMemoryDeviceStore};
use field_companion::trim::{trim_snapshot, TrimLimits};

const NOW: i64 = 1_750_000_000_000;

fn heavy_snapshot() -> Snapshot {
    let answer = "Jehovah's Kingdom will bring peace. ".repeat(12);
    Snapshot {
        chat_history: (0..150)
            .map(|i| ChatTurn {
                timestamp: i,
                question: format!("question {i}"),
                ai_answer: answer.clone(),
                ai_sources: vec!["Offline".to_string()],
                scripture_answer: String::new(),
                scripture_data: Vec::new(),
                bible_version: Default::default(),
            })
            .collect(),
        notes: (0..30)
            .map(|i| FieldNote {
                id: format!("note-{i}"),
                person: format!("Door {i}"),
                content: "return next week".to_string(),
                created: NOW - i,
                ..FieldNote::default()
            })
            .collect(),
        meta_location_history: (0..300)
            .map(|i| LocationSample {
                timestamp: i,
                latitude: 1.0,
                longitude: 2.0,
                accuracy: 0.0,
                altitude: None,
                heading: None,
                speed: None,
            })
            .collect(),
        ..Snapshot::default()
    }
}

/// Room for the emergency-trimmed record and a little slack, but far less
/// than the routine-trimmed one.
fn quota_for_emergency_payload(snapshot: &Snapshot) -> usize {
    let mut trimmed = snapshot.clone();
    trim_snapshot(&mut trimmed, &TrimLimits::EMERGENCY, NOW);
    let bytes = serde_json::to_string(&trimmed).expect("encode").len();
    STATE_KEY.len() + bytes + 64
}

#[test]
fn capacity_failure_retries_once_after_emergency_trim_and_keeps_notes() {
    let mut snapshot = heavy_snapshot();
    let quota = quota_for_emergency_payload(&snapshot);
    let store = BoundedLocalStore::new(InMemoryDeviceStore::with_quota(quota));

    store.save_draft(&NoteDraft {
        person: "Half-typed".to_string(),
        ..NoteDraft::default()
    });
    assert!(store.device_store().get(DRAFT_KEY).expect("get").is_some());

    let outcome = store.persist_at(&mut snapshot, NOW);
    match &outcome {
        PersistOutcome::SavedAfterEmergencyTrim {
            trimmed, emergency, ..
        } => {
            assert_eq!(trimmed.chat_turns, 50);
            assert_eq!(emergency.chat_turns, 80);
            assert_eq!(emergency.location_samples, 250);
            assert_eq!(emergency.notes, 0);
        }
        other => panic!("expected emergency save, got {other:?}"),
    }

    assert!(snapshot.chat_history.len() <= 20);
    assert_eq!(snapshot.notes.len(), 30);
    assert_eq!(snapshot.meta_location_history.len(), 50);
    assert!(store.device_store().get(DRAFT_KEY).expect("get").is_none());

    let restored = store.restore();
    assert_eq!(restored.notes.len(), 30);
    assert_eq!(restored.chat_history.len(), 20);
    assert_eq!(restored.chat_history[0].question, "question 130");
}

#[test]
fn second_capacity_failure_is_reported_not_retried_again() {
    let mut snapshot = heavy_snapshot();
    let store = BoundedLocalStore::new(InMemoryDeviceStore::with_quota(256));

    let outcome = store.persist_at(&mut snapshot, NOW);
    assert!(matches!(outcome, PersistOutcome::Failed { .. }));
    assert!(!outcome.is_saved());

    // Trims stay applied in memory; notes are never touched.
    assert_eq!(snapshot.chat_history.len(), 20);
    assert_eq!(snapshot.notes.len(), 30);
    assert!(store.device_store().get(STATE_KEY).expect("get").is_none());
}

struct BrokenStore;

impl DeviceStore for BrokenStore {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(anyhow!("device unavailable"))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Err(anyhow!("device unavailable"))
    }

    fn remove(&self, _key: &str) -> Result<()> {
        Err(anyhow!("device unavailable"))
    }
}

#[test]
fn other_store_failures_are_swallowed_without_emergency_trim() {
    let mut snapshot = heavy_snapshot();
    let store = BoundedLocalStore::new(BrokenStore);

    let outcome = store.persist_at(&mut snapshot, NOW);
    match outcome {
        PersistOutcome::Failed { reason } => assert!(reason.contains("device unavailable")),
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(snapshot.chat_history.len(), 100);
    assert_eq!(store.restore(), Snapshot::default());
    assert_eq!(store.load_draft(), NoteDraft::default());
}
