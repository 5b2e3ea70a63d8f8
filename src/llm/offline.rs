use super::Answer;

pub const OFFLINE_SOURCE: &str = "Offline Mode - add an API key for full AI";

struct CannedAnswer {
    keywords: &'static [&'static str],
    text: &'static str,
}

static CANNED: &[CannedAnswer] = &[
    CannedAnswer {
        keywords: &["trinity", "three persons", "god the son"],
        text: "The Bible does not teach the trinity. Jesus clearly stated \"the Father is greater than I am\" (John 14:28). The Bible shows Jesus as God's Son, not God Almighty. See 1 Corinthians 11:3 which says \"the head of the Christ is God.\" For detailed scriptures, switch to scripture mode.",
    },
    CannedAnswer {
        keywords: &["soul", "immortal"],
        text: "The Bible teaches the soul is mortal and can die. Ezekiel 18:4 says \"The soul who sins will die.\" Ecclesiastes 9:5 states \"the dead know nothing at all.\" The soul is the person, not an immortal part inside us. Switch to scripture mode for more verses.",
    },
    CannedAnswer {
        keywords: &["hell", "hellfire", "torment"],
        text: "The Bible does not teach hellfire. Hell (Sheol/Hades) is the common grave, not a place of torment. Ecclesiastes 9:10 says \"there is no work nor planning nor knowledge nor wisdom in the Grave.\" The penalty for sin is death, not eternal torture. See scripture mode for more.",
    },
    CannedAnswer {
        keywords: &["heaven", "144000", "144,000"],
        text: "The Bible shows two hopes: 144,000 go to heaven to rule with Christ (Revelation 14:1), while the majority will live forever on a paradise earth (Psalm 37:29). Jesus said the \"mild-tempered will inherit the earth\" (Matthew 5:5). Check scripture mode for all relevant verses.",
    },
    CannedAnswer {
        keywords: &["last days", "end times", "armageddon"],
        text: "We are living in the last days. Jesus gave signs in Matthew 24: wars, earthquakes, food shortages, and the preaching work. 2 Timothy 3:1-5 describes the moral decline we see today. The preaching work (Matthew 24:14) must be completed before the end. See scripture mode for detailed scriptures.",
    },
    CannedAnswer {
        keywords: &["jehovah", "god name", "god's name"],
        text: "God's personal name is Jehovah, used over 7,000 times in the Bible. Psalm 83:18 says \"you, whose name is Jehovah, you alone are the Most High over all the earth.\" Knowing and using God's name is essential for true worship. See scripture mode for more references.",
    },
];

pub const DEFAULT_OFFLINE_ANSWER: &str = "I'm currently offline and can't provide a detailed answer. However, you can:\n\n1. Switch to scripture mode to see relevant Bible verses\n2. Use meta mode to get scripture suggestions\n3. Check your saved notes for similar topics\n\nOnce a connection is restored, I'll be able to provide more comprehensive answers.";

/// Keyword-matched canned answers. First matching entry wins.
#[derive(Clone, Copy, Debug, Default)]
pub struct OfflineResponder;

impl OfflineResponder {
    pub fn answer_text(&self, question: &str) -> &'static str {
        let q = question.to_lowercase();
        CANNED
            .iter()
            .find(|c| c.keywords.iter().any(|k| q.contains(k)))
            .map(|c| c.text)
            .unwrap_or(DEFAULT_OFFLINE_ANSWER)
    }

    pub fn answer_for(&self, question: &str) -> Answer {
        Answer {
            text: self.answer_text(question).to_string(),
            sources: vec![OFFLINE_SOURCE.to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_matching_entry_wins() {
        let r = OfflineResponder;
        // "immortal soul" and "hell" both appear; the soul entry comes first.
        assert!(r.answer_text("Is the immortal soul sent to hell?").contains("Ezekiel 18:4"));
        assert!(r.answer_text("What is God's name?").contains("Psalm 83:18"));
        assert_eq!(r.answer_text("how do I tie a knot"), DEFAULT_OFFLINE_ANSWER);
    }
}
