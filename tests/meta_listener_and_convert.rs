use field_companion::geo::LocationTracker;
use field_companion::llm::FallbackChain;
use field_companion::meta::{
    auto_note, build_auto_note_prompt, clear_meta_history, convert_meta_to_note,
    ListenerAction, MetaListener, SpeechErrorKind, SpeechEvent, PERMISSION_DENIED_NOTICE,
};
use field_companion::state::{LocationSample, Snapshot};

fn heard(text: &str) -> SpeechEvent {
    SpeechEvent::Result {
        transcript: text.to_string(),
        is_final: true,
    }
}

fn fix(ts: i64, lat: f64, lon: f64) -> LocationSample {
    LocationSample {
        timestamp: ts,
        latitude: lat,
        longitude: lon,
        accuracy: 8.0,
        altitude: None,
        heading: None,
        speed: None,
    }
}

#[test]
fn only_new_final_transcripts_are_analysed() {
    let mut snapshot = Snapshot::default();
    let mut listener = MetaListener::new();
    assert!(listener.start());

    let interim = SpeechEvent::Result {
        transcript: "I believe in the trinity".to_string(),
        is_final: false,
    };
    assert_eq!(listener.handle(&mut snapshot, interim, 1), ListenerAction::Continue);
    assert!(snapshot.meta_suggestions.is_empty());

    let action = listener.handle(&mut snapshot, heard("I believe in the trinity and hell"), 2);
    assert_eq!(
        action,
        ListenerAction::Suggested(vec!["trinity".to_string(), "hell fire".to_string()])
    );
    assert_eq!(snapshot.meta_suggestions.len(), 2);
    assert_eq!(snapshot.meta_suggestions[0].timestamp, 2);
    assert_eq!(snapshot.meta_suggestions[0].data.verses[0].reference, "John 14:28");

    // Same final transcript again is ignored.
    listener.handle(&mut snapshot, heard("I believe in the trinity and hell"), 3);
    assert_eq!(snapshot.meta_suggestions.len(), 2);

    // Detected triggers without verses add nothing.
    let action = listener.handle(&mut snapshot, heard("we celebrate christmas"), 4);
    assert_eq!(action, ListenerAction::Continue);
    assert_eq!(snapshot.meta_suggestions.len(), 2);
}

#[test]
fn silent_pauses_always_restart() {
    let mut snapshot = Snapshot::default();
    let mut listener = MetaListener::new();
    listener.start();

    let no_speech = SpeechEvent::Error(SpeechErrorKind::NoSpeech);
    let mut actions = Vec::new();
    for _ in 0..5 {
        actions.push(listener.handle(&mut snapshot, no_speech.clone(), 0));
        actions.push(listener.handle(&mut snapshot, SpeechEvent::End, 0));
    }
    for pair in actions.chunks(2) {
        assert_eq!(pair, [ListenerAction::Continue, ListenerAction::Restart]);
    }
    assert!(listener.is_active());
}

#[test]
fn failing_cycles_restart_a_bounded_number_of_times() {
    let mut snapshot = Snapshot::default();
    let mut listener = MetaListener::new();
    listener.start();

    let network = SpeechEvent::Error(SpeechErrorKind::Network);
    for _ in 0..2 {
        assert_eq!(listener.handle(&mut snapshot, network.clone(), 0), ListenerAction::Continue);
        assert_eq!(listener.handle(&mut snapshot, SpeechEvent::End, 0), ListenerAction::Restart);
    }
    listener.handle(&mut snapshot, network.clone(), 0);
    assert_eq!(listener.handle(&mut snapshot, SpeechEvent::End, 0), ListenerAction::Stop);
    assert!(!listener.is_active());

    // A transcript or a clean cycle in between resets the budget.
    listener.start();
    listener.handle(&mut snapshot, network.clone(), 0);
    assert_eq!(listener.handle(&mut snapshot, SpeechEvent::End, 0), ListenerAction::Restart);
    listener.handle(&mut snapshot, heard("hello"), 0);
    listener.handle(&mut snapshot, network.clone(), 0);
    assert_eq!(listener.handle(&mut snapshot, SpeechEvent::End, 0), ListenerAction::Restart);
    assert_eq!(listener.handle(&mut snapshot, SpeechEvent::End, 0), ListenerAction::Restart);
    listener.handle(&mut snapshot, network.clone(), 0);
    assert_eq!(listener.handle(&mut snapshot, SpeechEvent::End, 0), ListenerAction::Restart);
    listener.handle(&mut snapshot, network, 0);
    assert_eq!(listener.handle(&mut snapshot, SpeechEvent::End, 0), ListenerAction::Restart);

    listener.stop();
    assert_eq!(listener.handle(&mut snapshot, SpeechEvent::End, 0), ListenerAction::Stop);
}

#[test]
fn transcripts_outside_a_listening_session_are_ignored() {
    let mut snapshot = Snapshot::default();
    let mut listener = MetaListener::new();

    let action = listener.handle(&mut snapshot, heard("is the trinity true"), 1);
    assert_eq!(action, ListenerAction::Continue);
    assert!(snapshot.meta_suggestions.is_empty());

    listener.start();
    listener.stop();
    let action = listener.handle(&mut snapshot, heard("does the soul never die"), 2);
    assert_eq!(action, ListenerAction::Continue);
    assert!(snapshot.meta_suggestions.is_empty());

    listener.start();
    let action = listener.handle(&mut snapshot, heard("does the soul never die"), 3);
    assert_eq!(action, ListenerAction::Suggested(vec!["soul immortal".to_string()]));
}

#[test]
fn permission_denial_notifies_once_and_disables_listener() {
    let mut snapshot = Snapshot::default();
    let mut listener = MetaListener::new();
    listener.start();

    let denied = SpeechEvent::Error(SpeechErrorKind::from_code("not-allowed"));
    assert_eq!(
        listener.handle(&mut snapshot, denied.clone(), 0),
        ListenerAction::Notice(PERMISSION_DENIED_NOTICE)
    );
    assert!(!listener.is_active());
    assert!(!listener.start());
    assert_eq!(listener.handle(&mut snapshot, denied, 0), ListenerAction::Stop);
}

#[test]
fn convert_builds_topic_and_route_sections() {
    let mut snapshot = Snapshot::default();
    assert!(convert_meta_to_note(&snapshot).is_err());

    let mut listener = MetaListener::new();
    listener.start();
    listener.handle(&mut snapshot, heard("does the soul never die"), 1_000);

    let mut tracker = LocationTracker::new();
    tracker.start();
    tracker.on_sample(&mut snapshot, fix(0, 10.0, 20.0));
    tracker.on_sample(&mut snapshot, fix(30_000, 10.0, 20.01));
    tracker.on_sample(&mut snapshot, fix(600_000, 10.01, 20.01));

    let note = convert_meta_to_note(&snapshot).expect("convert");
    assert_eq!(note.person, "10.000000, 20.000000");
    assert_eq!(note.tags, "return-visit");
    assert!(note.content.starts_with("=== Conversation Topics ===\n\n1. Discussed: \"soul immortal\"\n"));
    assert!(note.content.contains("   Context: The soul is mortal and can die\n"));
    assert!(note.content.contains("   Scriptures shared:\n   - Ezekiel 18:4\n"));
    assert!(note.content.contains("\n=== Field Service Route ===\n\nTotal locations: 3\n"));
    assert!(note.content.contains("Duration: 10 minutes\n"));
    assert!(note.content.contains("Start: 10.000000, 20.000000\nEnd: 10.010000, 20.010000\n"));

    let prompt = build_auto_note_prompt(&snapshot);
    assert!(prompt.contains("TOPICS DISCUSSED:\n1. soul immortal\n   Scriptures: Ezekiel 18:4"));
    assert!(prompt.contains("ROUTE DATA:\n"));

    clear_meta_history(&mut snapshot);
    assert!(snapshot.meta_suggestions.is_empty());
    assert!(snapshot.meta_location_history.is_empty());
}

#[test]
fn route_only_session_converts_without_tags() {
    let mut snapshot = Snapshot::default();
    snapshot.meta_location_history.push(fix(0, -33.8688, 151.2093));

    let note = convert_meta_to_note(&snapshot).expect("convert");
    assert!(note.tags.is_empty());
    assert!(!note.content.contains("Conversation Topics"));
    assert!(note.content.contains("Distance traveled: 0.00 km\n"));
}

#[test]
fn auto_note_uses_offline_answer_when_nothing_is_reachable() {
    let mut snapshot = Snapshot::default();
    let chain = FallbackChain::offline_only();
    assert!(auto_note(&mut snapshot, &chain, 0).is_err());

    let mut listener = MetaListener::new();
    listener.start();
    listener.handle(&mut snapshot, heard("is it the last days"), 5);

    // 2024-03-01T12:00:00Z
    let now = 1_709_294_400_000;
    let id = auto_note(&mut snapshot, &chain, now).expect("auto note");
    assert_eq!(id, format!("auto-note-{now}"));

    let note = &snapshot.notes[0];
    assert!(note.auto_generated);
    assert_eq!(note.person, "Field Service");
    assert_eq!(note.created, now);
    assert_eq!(note.datetime, "2024-03-01T12:00");
    assert!(!note.content.is_empty());
}
