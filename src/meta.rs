//! Meta mode: listens to a running conversation, suggests scriptures for the
//! topics it hears, and turns the session into a note.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::geo::{format_coords, RouteSummary};
use crate::llm::FallbackChain;
use crate::notes::{editor_datetime, NoteInput};
use crate::scripture::{detect_meta_topics, meta_scriptures};
use crate::state::{FieldNote, MetaSuggestion, Snapshot};

/// Restarts allowed after recognizer cycles that ended in an error, counted
/// until a cycle ends cleanly or yields a transcript.
pub const MAX_CONSECUTIVE_RESTARTS: u32 = 2;

pub const PERMISSION_DENIED_NOTICE: &str =
    "Microphone permission denied. Allow microphone access for meta mode to work.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpeechErrorKind {
    NoSpeech,
    PermissionDenied,
    Aborted,
    Network,
    Other(String),
}

impl SpeechErrorKind {
    /// Maps recognizer error codes (`no-speech`, `not-allowed`, ...).
    pub fn from_code(code: &str) -> Self {
        match code {
            "no-speech" => SpeechErrorKind::NoSpeech,
            "not-allowed" | "permission-denied" | "service-not-allowed" => {
                SpeechErrorKind::PermissionDenied
            }
            "aborted" => SpeechErrorKind::Aborted,
            "network" => SpeechErrorKind::Network,
            other => SpeechErrorKind::Other(other.to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpeechEvent {
    Result { transcript: String, is_final: bool },
    Error(SpeechErrorKind),
    End,
}

/// What the recognizer driver should do after an event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListenerAction {
    Continue,
    /// Suggestions appended to the state.
    Suggested(Vec<String>),
    Restart,
    Stop,
    Notice(&'static str),
}

#[derive(Debug, Default)]
pub struct MetaListener {
    active: bool,
    last_transcript: String,
    consecutive_restarts: u32,
    cycle_failed: bool,
    denied: bool,
}

impl MetaListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns false once microphone permission has been denied this session.
    pub fn start(&mut self) -> bool {
        if self.denied {
            return false;
        }
        if !self.active {
            info!("meta mode listening started");
        }
        self.active = true;
        self.consecutive_restarts = 0;
        self.cycle_failed = false;
        true
    }

    pub fn stop(&mut self) {
        self.active = false;
        self.last_transcript.clear();
    }

    pub fn handle(
        &mut self,
        snapshot: &mut Snapshot,
        event: SpeechEvent,
        now_ms: i64,
    ) -> ListenerAction {
        match event {
            SpeechEvent::Result {
                transcript,
                is_final,
            } => {
                if !self.active {
                    debug!("ignoring transcript while not listening");
                    return ListenerAction::Continue;
                }
                self.consecutive_restarts = 0;
                self.cycle_failed = false;
                if !is_final || transcript == self.last_transcript {
                    return ListenerAction::Continue;
                }
                debug!(%transcript, "analysing transcript");
                let added = analyse_transcript(snapshot, &transcript, now_ms);
                self.last_transcript = transcript;
                if added.is_empty() {
                    ListenerAction::Continue
                } else {
                    ListenerAction::Suggested(added)
                }
            }
            SpeechEvent::Error(SpeechErrorKind::PermissionDenied) => {
                warn!("meta mode microphone permission denied");
                self.active = false;
                if self.denied {
                    return ListenerAction::Stop;
                }
                self.denied = true;
                ListenerAction::Notice(PERMISSION_DENIED_NOTICE)
            }
            // A pause. The recognizer ends the cycle next and is restarted then.
            SpeechEvent::Error(SpeechErrorKind::NoSpeech) => ListenerAction::Continue,
            SpeechEvent::Error(kind) => {
                warn!(?kind, "meta mode recognizer error");
                self.cycle_failed = true;
                ListenerAction::Continue
            }
            SpeechEvent::End => self.restart_or_stop(),
        }
    }

    fn restart_or_stop(&mut self) -> ListenerAction {
        if !self.active {
            return ListenerAction::Stop;
        }
        if !std::mem::take(&mut self.cycle_failed) {
            self.consecutive_restarts = 0;
            return ListenerAction::Restart;
        }
        if self.consecutive_restarts >= MAX_CONSECUTIVE_RESTARTS {
            warn!(
                attempts = self.consecutive_restarts,
                "meta mode recognizer keeps failing; giving up"
            );
            self.active = false;
            return ListenerAction::Stop;
        }
        self.consecutive_restarts += 1;
        ListenerAction::Restart
    }
}

/// Appends a suggestion for every heard trigger that has scriptures. Returns
/// the triggers added.
pub fn analyse_transcript(snapshot: &mut Snapshot, transcript: &str, now_ms: i64) -> Vec<String> {
    let mut added = Vec::new();
    for rule in detect_meta_topics(transcript) {
        let Some(data) = meta_scriptures(rule.trigger) else {
            continue;
        };
        snapshot.meta_suggestions.push(MetaSuggestion {
            timestamp: now_ms,
            trigger: rule.trigger.to_string(),
            data,
        });
        added.push(rule.trigger.to_string());
    }
    added
}

pub fn clear_meta_history(snapshot: &mut Snapshot) {
    snapshot.meta_suggestions.clear();
    snapshot.meta_location_history.clear();
    info!("meta history cleared");
}

fn ensure_meta_data(snapshot: &Snapshot) -> Result<()> {
    if snapshot.meta_suggestions.is_empty() && snapshot.meta_location_history.is_empty() {
        return Err(anyhow!("no meta mode data; start meta mode first"));
    }
    Ok(())
}

/// Prefills a note from the session's topics and route.
pub fn convert_meta_to_note(snapshot: &Snapshot) -> Result<NoteInput> {
    ensure_meta_data(snapshot)?;

    let mut content = String::new();
    if !snapshot.meta_suggestions.is_empty() {
        content.push_str("=== Conversation Topics ===\n\n");
        for (i, item) in snapshot.meta_suggestions.iter().enumerate() {
            content.push_str(&format!("{}. Discussed: \"{}\"\n", i + 1, item.trigger));
            content.push_str(&format!("   Context: {}\n", item.data.context));
            content.push_str("   Scriptures shared:\n");
            for verse in &item.data.verses {
                content.push_str(&format!("   - {}\n", verse.reference));
            }
            content.push('\n');
        }
    }

    let route = RouteSummary::from_samples(&snapshot.meta_location_history);
    if let Some(route) = &route {
        content.push_str("\n=== Field Service Route ===\n\n");
        content.push_str(&format!("Total locations: {}\n", route.count));
        content.push_str(&format!("Distance traveled: {:.2} km\n", route.distance_km));
        content.push_str(&format!("Duration: {} minutes\n", route.duration_minutes));
        content.push_str("\nRoute coordinates:\n");
        content.push_str(&format!("Start: {}\n", format_coords(route.start.0, route.start.1)));
        content.push_str(&format!("End: {}\n", format_coords(route.end.0, route.end.1)));
    }

    let person = route
        .map(|r| format_coords(r.start.0, r.start.1))
        .unwrap_or_default();
    let tags = if snapshot.meta_suggestions.is_empty() {
        String::new()
    } else {
        "return-visit".to_string()
    };

    Ok(NoteInput {
        person,
        content,
        tags,
        ..NoteInput::default()
    })
}

pub fn build_auto_note_prompt(snapshot: &Snapshot) -> String {
    let mut prompt = String::from("Based on this field service data, create a concise note summary:\n\n");

    if !snapshot.meta_suggestions.is_empty() {
        prompt.push_str("TOPICS DISCUSSED:\n");
        for (i, item) in snapshot.meta_suggestions.iter().enumerate() {
            let refs: Vec<&str> = item
                .data
                .verses
                .iter()
                .map(|v| v.reference.as_str())
                .collect();
            prompt.push_str(&format!("{}. {}\n", i + 1, item.trigger));
            prompt.push_str(&format!("   Scriptures: {}\n", refs.join(", ")));
        }
        prompt.push('\n');
    }

    if let Some(route) = RouteSummary::from_samples(&snapshot.meta_location_history) {
        prompt.push_str("ROUTE DATA:\n");
        prompt.push_str(&format!("Distance: {:.2} km\n", route.distance_km));
        prompt.push_str(&format!("Duration: {} minutes\n\n", route.duration_minutes));
    }

    prompt.push_str("Generate a field service note with:\n");
    prompt.push_str("1. Brief summary of conversation\n");
    prompt.push_str("2. Key scriptures discussed\n");
    prompt.push_str("3. Suggested tags (interested, return-visit, not-home, etc.)\n");
    prompt.push_str("4. Whether to schedule follow-up\n");
    prompt.push_str("Keep it concise and practical for ministry records.");
    prompt
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AutoNoteFields {
    pub content: String,
    pub tags: Vec<String>,
    /// `YYYY-MM-DD`, one week after `now_ms`.
    pub followup: Option<String>,
}

const TAG_PHRASES: [(&str, &str); 4] = [
    ("interested", "interested"),
    ("return visit", "return-visit"),
    ("not home", "not-home"),
    ("bible study", "study"),
];

pub fn parse_auto_note(answer: &str, now_ms: i64) -> AutoNoteFields {
    let lower = answer.to_lowercase();
    let tags = TAG_PHRASES
        .iter()
        .filter(|(phrase, _)| lower.contains(phrase))
        .map(|(_, tag)| tag.to_string())
        .collect();

    let followup = (lower.contains("follow up") || lower.contains("follow-up")).then(|| {
        let now = DateTime::<Utc>::from_timestamp_millis(now_ms).unwrap_or_default();
        (now + Duration::days(7)).format("%Y-%m-%d").to_string()
    });

    AutoNoteFields {
        content: answer.to_string(),
        tags,
        followup,
    }
}

/// First sampled position, or a generic label when nothing was tracked.
pub fn extract_location_label(snapshot: &Snapshot) -> String {
    match snapshot.meta_location_history.first() {
        Some(first) => format_coords(first.latitude, first.longitude),
        None => "Field Service".to_string(),
    }
}

/// Asks the chain to summarise the session and stores the result as an
/// auto-generated note at the front of the list. Returns the note id.
pub fn auto_note(snapshot: &mut Snapshot, chain: &FallbackChain, now_ms: i64) -> Result<String> {
    ensure_meta_data(snapshot)?;

    let prompt = build_auto_note_prompt(snapshot);
    let answer = chain.answer(&prompt);
    let fields = parse_auto_note(&answer.text, now_ms);

    let note = FieldNote {
        id: format!("auto-note-{now_ms}"),
        person: extract_location_label(snapshot),
        datetime: editor_datetime(now_ms),
        content: fields.content,
        tags: fields.tags,
        followup: fields.followup,
        photo: None,
        created: now_ms,
        auto_generated: true,
    };
    let id = note.id.clone();
    snapshot.notes.insert(0, note);
    info!(%id, sources = ?answer.sources, "auto-note created");
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_map_to_kinds() {
        assert_eq!(SpeechErrorKind::from_code("no-speech"), SpeechErrorKind::NoSpeech);
        assert_eq!(
            SpeechErrorKind::from_code("not-allowed"),
            SpeechErrorKind::PermissionDenied
        );
        assert_eq!(
            SpeechErrorKind::from_code("audio-capture"),
            SpeechErrorKind::Other("audio-capture".to_string())
        );
    }

    #[test]
    fn parse_auto_note_extracts_tags_and_followup() {
        // 2024-03-01T12:00:00Z
        let now = 1_709_294_400_000;
        let fields = parse_auto_note(
            "Householder was interested. Suggest a return visit and follow-up next week.",
            now,
        );
        assert_eq!(fields.tags, vec!["interested", "return-visit"]);
        assert_eq!(fields.followup.as_deref(), Some("2024-03-08"));

        let none = parse_auto_note("Nobody was home.", now);
        assert!(none.tags.is_empty());
        assert_eq!(none.followup, None);
    }
}
