use anyhow::{anyhow, Result};
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine as _;
use chrono::{DateTime, Utc};

use crate::persist::{BoundedLocalStore, NoteDraft};
use crate::state::{FieldNote, Snapshot};
use crate::store::DeviceStore;

/// Editor fields as typed by the user.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NoteInput {
    pub person: String,
    pub datetime: String,
    pub content: String,
    /// Comma-separated.
    pub tags: String,
    pub followup: String,
    pub photo: Option<String>,
}

impl NoteInput {
    pub fn from_draft(draft: &NoteDraft) -> Self {
        Self {
            person: draft.person.clone(),
            datetime: draft.datetime.clone(),
            content: draft.content.clone(),
            tags: draft.tags.clone(),
            followup: draft.followup.clone(),
            photo: Some(draft.photo.clone()).filter(|p| !p.is_empty()),
        }
    }

    pub fn to_draft(&self, now_ms: i64) -> NoteDraft {
        NoteDraft {
            person: self.person.clone(),
            datetime: self.datetime.clone(),
            content: self.content.clone(),
            tags: self.tags.clone(),
            followup: self.followup.clone(),
            photo: self.photo.clone().unwrap_or_default(),
            timestamp: now_ms,
        }
    }
}

pub fn parse_tags(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// `YYYY-MM-DDTHH:MM` in UTC, the editor's datetime format.
pub fn editor_datetime(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .unwrap_or_default()
        .format("%Y-%m-%dT%H:%M")
        .to_string()
}

/// A photo attached inline as `data:<mime>;base64,<payload>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotePhoto {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl NotePhoto {
    pub fn parse(data_url: &str) -> Result<Self> {
        let rest = data_url
            .strip_prefix("data:")
            .ok_or_else(|| anyhow!("photo is not a data url"))?;
        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| anyhow!("photo data url has no payload"))?;
        let mime_type = meta
            .strip_suffix(";base64")
            .ok_or_else(|| anyhow!("photo data url is not base64"))?;
        if !mime_type.starts_with("image/") {
            return Err(anyhow!("photo has non-image mime type: {mime_type}"));
        }
        let bytes = B64
            .decode(payload.trim())
            .map_err(|e| anyhow!("invalid photo base64: {e}"))?;
        Ok(Self {
            mime_type: mime_type.to_string(),
            bytes,
        })
    }
}

/// Creates a note (inserted first) or, with `editing_id`, replaces the note
/// in place keeping its id and creation time. Returns the note's id.
pub fn save_note(
    snapshot: &mut Snapshot,
    editing_id: Option<&str>,
    input: &NoteInput,
    now_ms: i64,
) -> Result<String> {
    let person = input.person.trim().to_string();
    let content = input.content.trim().to_string();
    if person.is_empty() && content.is_empty() {
        return Err(anyhow!("fill in at least person/location or notes"));
    }

    let photo = match input.photo.as_deref().map(str::trim) {
        Some(p) if !p.is_empty() => {
            NotePhoto::parse(p)?;
            Some(p.to_string())
        }
        _ => None,
    };
    let followup = Some(input.followup.trim().to_string()).filter(|f| !f.is_empty());
    let datetime = if input.datetime.trim().is_empty() {
        editor_datetime(now_ms)
    } else {
        input.datetime.trim().to_string()
    };

    match editing_id {
        Some(id) => {
            let existing = snapshot
                .notes
                .iter_mut()
                .find(|n| n.id == id)
                .ok_or_else(|| anyhow!("note not found: {id}"))?;
            existing.person = person;
            existing.datetime = datetime;
            existing.content = content;
            existing.tags = parse_tags(&input.tags);
            existing.followup = followup;
            existing.photo = photo;
            Ok(existing.id.clone())
        }
        None => {
            let note = FieldNote {
                id: format!("note-{}", uuid::Uuid::new_v4()),
                person,
                datetime,
                content,
                tags: parse_tags(&input.tags),
                followup,
                photo,
                created: now_ms,
                auto_generated: false,
            };
            let id = note.id.clone();
            snapshot.notes.insert(0, note);
            Ok(id)
        }
    }
}

/// [`save_note`], then drops the editor draft since it is now saved.
pub fn save_note_and_clear_draft<S: DeviceStore>(
    snapshot: &mut Snapshot,
    store: &BoundedLocalStore<S>,
    editing_id: Option<&str>,
    input: &NoteInput,
    now_ms: i64,
) -> Result<String> {
    let id = save_note(snapshot, editing_id, input, now_ms)?;
    store.clear_draft();
    Ok(id)
}

pub fn delete_note(snapshot: &mut Snapshot, id: &str) -> bool {
    let before = snapshot.notes.len();
    snapshot.notes.retain(|n| n.id != id);
    snapshot.notes.len() != before
}

/// Case-insensitive substring filter over person and content.
pub fn filter_notes<'a>(notes: &'a [FieldNote], query: &str) -> Vec<&'a FieldNote> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return notes.iter().collect();
    }
    notes
        .iter()
        .filter(|n| n.person.to_lowercase().contains(&q) || n.content.to_lowercase().contains(&q))
        .collect()
}

/// Notes where any query word appears in person, content or tags, ranked by
/// how many words appear in person + content. Ties keep list order.
pub fn search_notes_ranked<'a>(notes: &'a [FieldNote], query: &str) -> Vec<&'a FieldNote> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return notes.iter().collect();
    }
    let words: Vec<&str> = q.split_whitespace().collect();

    let mut ranked: Vec<(usize, &FieldNote)> = notes
        .iter()
        .filter_map(|note| {
            let searchable = format!("{} {} {}", note.person, note.content, note.tags.join(" "))
                .to_lowercase();
            if !words.iter().any(|w| searchable.contains(w)) {
                return None;
            }
            let text = format!("{} {}", note.person, note.content).to_lowercase();
            let score = words.iter().filter(|w| text.contains(**w)).count();
            Some((score, note))
        })
        .collect();
    ranked.sort_by(|a, b| b.0.cmp(&a.0));
    ranked.into_iter().map(|(_, n)| n).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_trimmed_and_empties_dropped() {
        assert_eq!(
            parse_tags(" interested, return-visit ,, "),
            vec!["interested".to_string(), "return-visit".to_string()]
        );
        assert!(parse_tags("").is_empty());
    }

    #[test]
    fn photo_data_url_must_be_base64_image() {
        let photo = NotePhoto::parse("data:image/png;base64,aGVsbG8=").expect("parse");
        assert_eq!(photo.mime_type, "image/png");
        assert_eq!(photo.bytes, b"hello");

        assert!(NotePhoto::parse("data:text/plain;base64,aGVsbG8=").is_err());
        assert!(NotePhoto::parse("data:image/png,raw").is_err());
        assert!(NotePhoto::parse("https://example.com/a.png").is_err());
    }

    #[test]
    fn editor_datetime_is_minute_precision_utc() {
        assert_eq!(editor_datetime(0), "1970-01-01T00:00");
    }
}
