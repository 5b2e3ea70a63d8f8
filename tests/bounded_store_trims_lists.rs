use field_companion::persist::BoundedLocalStore;
use field_companion::scripture::ScriptureSet;
use field_companion::state::{ChatTurn, FieldNote, LocationSample, MetaSuggestion, Snapshot};
use field_companion::store::InMemoryDeviceStore;
use field_companion::trim::{prune_notes, NoteRetention};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;
const NOW: i64 = 1_750_000_000_000;

fn turn(i: usize) -> ChatTurn {
    ChatTurn {
        timestamp: i as i64,
        question: format!("q{i}"),
        ai_answer: format!("a{i}"),
        ai_sources: Vec::new(),
        scripture_answer: String::new(),
        scripture_data: Vec::new(),
        bible_version: Default::default(),
    }
}

fn sample(i: usize) -> LocationSample {
    LocationSample {
        timestamp: i as i64,
        latitude: 47.0 + i as f64 * 1e-5,
        longitude: -122.0,
        accuracy: 10.0,
        altitude: None,
        heading: None,
        speed: None,
    }
}

fn note(id: usize, created: i64) -> FieldNote {
    FieldNote {
        id: format!("note-{id}"),
        person: format!("House {id}"),
        content: "visited".to_string(),
        created,
        ..FieldNote::default()
    }
}

#[test]
fn chat_history_keeps_newest_hundred_in_insertion_order() {
    let store = BoundedLocalStore::new(InMemoryDeviceStore::new());
    let mut snapshot = Snapshot {
        chat_history: (0..137).map(turn).collect(),
        ..Snapshot::default()
    };

    let outcome = store.persist_at(&mut snapshot, NOW);
    assert!(outcome.is_saved());

    assert_eq!(snapshot.chat_history.len(), 100);
    let questions: Vec<String> = snapshot
        .chat_history
        .iter()
        .map(|t| t.question.clone())
        .collect();
    let expected: Vec<String> = (37..137).map(|i| format!("q{i}")).collect();
    assert_eq!(questions, expected);

    let restored = store.restore();
    assert_eq!(restored.chat_history, snapshot.chat_history);
}

#[test]
fn location_history_keeps_exactly_newest_five_hundred() {
    let store = BoundedLocalStore::new(InMemoryDeviceStore::new());
    let mut snapshot = Snapshot {
        meta_location_history: (0..812).map(sample).collect(),
        meta_suggestions: (0..60)
            .map(|i| MetaSuggestion {
                timestamp: i,
                trigger: format!("t{i}"),
                data: ScriptureSet::default(),
            })
            .collect(),
        ..Snapshot::default()
    };

    store.persist_at(&mut snapshot, NOW);

    assert_eq!(snapshot.meta_location_history.len(), 500);
    assert_eq!(snapshot.meta_location_history[0].timestamp, 312);
    assert_eq!(snapshot.meta_location_history[499].timestamp, 811);

    assert_eq!(snapshot.meta_suggestions.len(), 50);
    assert_eq!(snapshot.meta_suggestions[0].trigger, "t10");
}

#[test]
fn old_notes_survive_while_count_is_at_or_below_threshold() {
    let store = BoundedLocalStore::new(InMemoryDeviceStore::new());
    let ancient = NOW - 3 * 365 * DAY_MS;
    let mut snapshot = Snapshot {
        notes: (0..500).map(|i| note(i, ancient)).collect(),
        ..Snapshot::default()
    };

    store.persist_at(&mut snapshot, NOW);
    assert_eq!(snapshot.notes.len(), 500);
}

#[test]
fn notes_above_threshold_drop_old_first_then_keep_newest() {
    let mut notes: Vec<FieldNote> = Vec::new();
    // Newest first, like the list the editor builds.
    for i in 0..450 {
        notes.push(note(i, NOW - i as i64 * 60_000));
    }
    for i in 450..520 {
        notes.push(note(i, NOW - 400 * DAY_MS - i as i64));
    }
    assert_eq!(notes.len(), 520);

    let removed = prune_notes(&mut notes, NoteRetention::default(), NOW);
    assert_eq!(removed, 70);
    assert_eq!(notes.len(), 450);
    assert!(notes.iter().all(|n| n.created > NOW - 365 * DAY_MS));

    let mut recent: Vec<FieldNote> = (0..620).map(|i| note(i, NOW - i as i64)).collect();
    prune_notes(&mut recent, NoteRetention::default(), NOW);
    assert_eq!(recent.len(), 500);
    assert_eq!(recent.first().map(|n| n.id.as_str()), Some("note-0"));
    assert_eq!(recent.last().map(|n| n.id.as_str()), Some("note-499"));
}
