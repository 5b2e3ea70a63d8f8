use anyhow::{anyhow, Result};
use tracing::info;

use crate::llm::FallbackChain;
use crate::scripture::{format_scriptures, scriptures_for_question, BibleVersion};
use crate::state::{now_ms, ChatMode, ChatTurn, Snapshot};

/// Asks both the answer chain and the scripture table, stores both answers so
/// the view can switch modes later, and returns the stored turn.
pub fn ask(snapshot: &mut Snapshot, chain: &FallbackChain, question: &str) -> Result<ChatTurn> {
    ask_at(snapshot, chain, question, now_ms())
}

pub fn ask_at(
    snapshot: &mut Snapshot,
    chain: &FallbackChain,
    question: &str,
    now_ms: i64,
) -> Result<ChatTurn> {
    let question = question.trim();
    if question.is_empty() {
        return Err(anyhow!("question is empty"));
    }

    let answer = chain.answer(question);
    let scripture_data = scriptures_for_question(question);
    let version = snapshot.bible_version;

    let turn = ChatTurn {
        timestamp: now_ms,
        question: question.to_string(),
        ai_answer: answer.text,
        ai_sources: answer.sources,
        scripture_answer: format_scriptures(&scripture_data, version),
        scripture_data,
        bible_version: version,
    };
    snapshot.chat_history.push(turn.clone());
    Ok(turn)
}

/// Text to show for a stored turn. Scripture mode re-renders from the stored
/// verses so a version change applies to old turns too.
pub fn display_turn(turn: &ChatTurn, mode: ChatMode, version: BibleVersion) -> String {
    match mode {
        ChatMode::Ai => turn.ai_answer.clone(),
        ChatMode::Scripture => {
            if !turn.scripture_data.is_empty() {
                format_scriptures(&turn.scripture_data, version)
            } else if !turn.scripture_answer.is_empty() {
                turn.scripture_answer.clone()
            } else {
                "No scriptures found for this question.".to_string()
            }
        }
    }
}

/// Clears chat history. Returns how many turns were removed.
pub fn recycle_chat(snapshot: &mut Snapshot) -> usize {
    let removed = snapshot.chat_history.len();
    snapshot.chat_history.clear();
    if removed > 0 {
        info!(removed, "chat history cleared");
    }
    removed
}

pub fn set_bible_version(snapshot: &mut Snapshot, version: BibleVersion) {
    snapshot.bible_version = version;
    info!("bible version changed to {}", version.display_name());
}

pub fn set_chat_mode(snapshot: &mut Snapshot, mode: ChatMode) {
    snapshot.chat_mode = mode;
}
