use std::fs;

use field_companion::config::{load_config, StoreBackend};
use field_companion::trim::{NoteRetention, TrimLimits};

#[test]
fn toml_file_overrides_selected_fields_and_keeps_defaults() {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let path = temp_dir.path().join("field-companion.toml");
    fs::write(
        &path,
        r#"
log_level = "debug"
local_backend_url = "http://192.168.1.20:11013"

[store]
backend = "dir"
path = "/tmp/fc-data"
quota_bytes = 5242880

[trim.emergency]
chat_turns = 5
meta_suggestions = 5
location_samples = 10

[llm]
api_key = "gsk_test"
"#,
    )
    .expect("write config");

    let cfg = load_config(Some(&path)).expect("load");
    assert_eq!(cfg.log_level, "debug");
    assert_eq!(cfg.local_backend_url, "http://192.168.1.20:11013");
    assert_eq!(cfg.store.backend, StoreBackend::Dir);
    assert_eq!(cfg.store.quota_bytes, Some(5_242_880));
    assert_eq!(cfg.trim.emergency.chat_turns, 5);
    assert_eq!(cfg.trim.emergency.notes, None);
    assert_eq!(cfg.trim.routine, TrimLimits::ROUTINE);
    assert_eq!(cfg.llm.api_key.as_deref(), Some("gsk_test"));
    assert_eq!(cfg.llm.max_tokens, 512);
    assert_eq!(cfg.autosave.interval_ms, 3_000);
}

#[test]
fn routine_override_without_notes_keeps_note_retention() {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let path = temp_dir.path().join("field-companion.toml");
    fs::write(
        &path,
        r#"
[trim.routine]
chat_turns = 200
meta_suggestions = 50
location_samples = 500
"#,
    )
    .expect("write config");

    let cfg = load_config(Some(&path)).expect("load");
    assert_eq!(cfg.trim.routine.chat_turns, 200);
    assert_eq!(cfg.trim.routine.notes, Some(NoteRetention::default()));
    assert_eq!(cfg.trim.emergency, TrimLimits::EMERGENCY);

    fs::write(
        &path,
        r#"
[trim.routine]
chat_turns = 100
meta_suggestions = 50
location_samples = 500

[trim.routine.notes]
max_count = 50
max_age_days = 30
"#,
    )
    .expect("rewrite config");
    let cfg = load_config(Some(&path)).expect("reload");
    assert_eq!(
        cfg.trim.routine.notes,
        Some(NoteRetention {
            max_count: 50,
            max_age_days: 30,
        })
    );
}

#[test]
fn missing_file_is_an_error() {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    assert!(load_config(Some(&temp_dir.path().join("absent.toml"))).is_err());
}
