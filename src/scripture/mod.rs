//! Static topic tables and the keyword matching that picks scriptures for a
//! question or a transcript.

use serde::{Deserialize, Serialize};

mod table;

pub use table::{MetaRule, TopicEntry, TopicRule};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BibleVersion {
    #[default]
    Nwt,
    Kjv,
    Asv,
    Eth,
}

impl BibleVersion {
    pub const ALL: [BibleVersion; 4] = [
        BibleVersion::Nwt,
        BibleVersion::Kjv,
        BibleVersion::Asv,
        BibleVersion::Eth,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            BibleVersion::Nwt => "nwt",
            BibleVersion::Kjv => "kjv",
            BibleVersion::Asv => "asv",
            BibleVersion::Eth => "eth",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BibleVersion::Nwt => "New World Translation",
            BibleVersion::Kjv => "King James Version",
            BibleVersion::Asv => "American Standard Version",
            BibleVersion::Eth => "Ethiopian Bible",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|v| v.tag() == tag)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Verse {
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nwt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kjv: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asv: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eth: Option<String>,
}

impl Verse {
    pub fn new(reference: &str, text: &str) -> Self {
        Self {
            reference: reference.to_string(),
            text: Some(text.to_string()),
            ..Self::default()
        }
    }

    fn translation(&self, version: BibleVersion) -> Option<&str> {
        match version {
            BibleVersion::Nwt => self.nwt.as_deref(),
            BibleVersion::Kjv => self.kjv.as_deref(),
            BibleVersion::Asv => self.asv.as_deref(),
            BibleVersion::Eth => self.eth.as_deref(),
        }
    }

    /// Version-specific text, then the generic text, then NWT.
    pub fn text_for(&self, version: BibleVersion) -> &str {
        self.translation(version)
            .or(self.text.as_deref())
            .or(self.nwt.as_deref())
            .unwrap_or_default()
    }
}

/// Verses attached to a meta-mode suggestion.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptureSet {
    #[serde(rename = "jwView")]
    pub verses: Vec<Verse>,
    #[serde(default)]
    pub context: String,
}

/// One matched topic in a scripture-only answer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicScriptures {
    pub topic: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub verses: Vec<Verse>,
}

fn matches_any(text_lower: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text_lower.contains(k))
}

/// Question topics whose keywords appear in `text`, in table order.
pub fn detect_question_topics(text: &str) -> Vec<&'static TopicRule> {
    let lower = text.to_lowercase();
    table::QUESTION_TOPICS
        .iter()
        .filter(|rule| matches_any(&lower, rule.keywords))
        .collect()
}

pub fn topic_entry(topic: &str) -> Option<&'static TopicEntry> {
    table::TOPIC_SCRIPTURES.iter().find(|e| e.topic == topic)
}

pub fn scriptures_for_question(question: &str) -> Vec<TopicScriptures> {
    detect_question_topics(question)
        .into_iter()
        .filter_map(|rule| topic_entry(rule.trigger))
        .map(TopicEntry::to_topic_scriptures)
        .collect()
}

pub fn format_scriptures(data: &[TopicScriptures], version: BibleVersion) -> String {
    let with_verses: Vec<&TopicScriptures> =
        data.iter().filter(|t| !t.verses.is_empty()).collect();
    if with_verses.is_empty() {
        return "No relevant scriptures found.".to_string();
    }

    let mut out = format!("Scriptures ({}):\n\n", version.display_name());
    for topic in with_verses {
        out.push_str(&format!("**{}**\n{}\n\n", topic.topic, topic.context));
        for verse in &topic.verses {
            out.push_str(&format!(
                "• {} - {}\n",
                verse.reference,
                verse.text_for(version)
            ));
        }
        out.push('\n');
    }
    out
}

/// Meta-mode triggers heard in a transcript, in table order.
pub fn detect_meta_topics(transcript: &str) -> Vec<&'static MetaRule> {
    let lower = transcript.to_lowercase();
    table::META_TRIGGERS
        .iter()
        .filter(|rule| matches_any(&lower, rule.keywords))
        .collect()
}

pub fn meta_scriptures(trigger: &str) -> Option<ScriptureSet> {
    table::META_TRIGGERS
        .iter()
        .find(|rule| rule.trigger == trigger)
        .and_then(MetaRule::scripture_set)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verse_text_falls_back_to_generic_then_nwt() {
        let mut verse = Verse::new("John 14:28", "generic");
        verse.kjv = Some("kjv text".to_string());
        assert_eq!(verse.text_for(BibleVersion::Kjv), "kjv text");
        assert_eq!(verse.text_for(BibleVersion::Asv), "generic");

        verse.text = None;
        verse.nwt = Some("nwt text".to_string());
        assert_eq!(verse.text_for(BibleVersion::Eth), "nwt text");
    }

    #[test]
    fn version_tags_roundtrip() {
        for v in BibleVersion::ALL {
            assert_eq!(BibleVersion::from_tag(v.tag()), Some(v));
        }
        assert_eq!(BibleVersion::from_tag(" KJV "), Some(BibleVersion::Kjv));
        assert_eq!(BibleVersion::from_tag("niv"), None);
    }
}
