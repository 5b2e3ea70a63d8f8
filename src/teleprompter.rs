use anyhow::{anyhow, Result};

use crate::state::AppState;

pub const MIN_SPEED: u8 = 1;
pub const MAX_SPEED: u8 = 10;

/// Runs of text each closed by one or more `.`, `!` or `?`. Trailing text
/// without a terminator is dropped unless nothing matched, in which case the
/// whole text is one sentence.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let is_end = |c: char| matches!(c, '.' | '!' | '?');

    let mut out = Vec::new();
    let mut start: Option<usize> = None;
    let mut in_terminators = false;
    for (i, c) in text.char_indices() {
        if is_end(c) {
            if start.is_some() {
                in_terminators = true;
            }
            continue;
        }
        if in_terminators {
            if let Some(s) = start {
                out.push(&text[s..i]);
            }
            start = None;
            in_terminators = false;
        }
        if start.is_none() {
            start = Some(i);
        }
    }
    if in_terminators {
        if let Some(s) = start {
            out.push(&text[s..]);
        }
    }

    if out.is_empty() {
        out.push(text);
    }
    out
}

/// Seconds for one full scroll pass: 110s at speed 1 down to 20s at 10.
pub fn scroll_duration_secs(speed: u8) -> u32 {
    let speed = speed.clamp(MIN_SPEED, MAX_SPEED);
    120 - u32::from(speed) * 10
}

/// New scroll position after jumping `count` sentences (negative goes back).
/// Sentences are assumed to share the content height evenly.
pub fn jump_offset(current: f64, scroll_height: f64, sentence_count: usize, count: i32) -> f64 {
    if sentence_count == 0 {
        return current;
    }
    let per_sentence = scroll_height / sentence_count as f64;
    let amount = per_sentence * f64::from(count.unsigned_abs());
    if count > 0 {
        current + amount
    } else {
        (current - amount).max(0.0)
    }
}

pub fn set_content(state: &mut AppState, text: &str) {
    state.snapshot.teleprompter_content = text.to_string();
}

pub fn clear(state: &mut AppState) {
    state.snapshot.teleprompter_content.clear();
    state.session.is_scrolling = false;
}

pub fn start_scroll(state: &mut AppState) -> Result<()> {
    if state.snapshot.teleprompter_content.trim().is_empty() {
        return Err(anyhow!("teleprompter has no content"));
    }
    state.session.is_scrolling = true;
    Ok(())
}

pub fn pause_scroll(state: &mut AppState) {
    state.session.is_scrolling = false;
}
