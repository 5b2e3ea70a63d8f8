use super::{ScriptureSet, TopicScriptures, Verse};

pub struct TopicRule {
    pub trigger: &'static str,
    pub keywords: &'static [&'static str],
}

pub struct TopicEntry {
    pub topic: &'static str,
    pub context: &'static str,
    pub verses: &'static [(&'static str, &'static str)],
}

impl TopicEntry {
    pub fn to_topic_scriptures(&self) -> TopicScriptures {
        TopicScriptures {
            topic: self.topic.to_string(),
            context: self.context.to_string(),
            verses: to_verses(self.verses),
        }
    }
}

pub struct MetaRule {
    pub trigger: &'static str,
    pub keywords: &'static [&'static str],
    pub context: &'static str,
    pub verses: &'static [(&'static str, &'static str)],
}

impl MetaRule {
    /// `None` for triggers that are detected but have no verses yet.
    pub fn scripture_set(&self) -> Option<ScriptureSet> {
        if self.verses.is_empty() {
            return None;
        }
        Some(ScriptureSet {
            verses: to_verses(self.verses),
            context: self.context.to_string(),
        })
    }
}

fn to_verses(pairs: &[(&str, &str)]) -> Vec<Verse> {
    pairs.iter().map(|(r, t)| Verse::new(r, t)).collect()
}

pub(super) static QUESTION_TOPICS: &[TopicRule] = &[
    TopicRule { trigger: "God's Name (Jehovah)", keywords: &["jehovah", "god name", "yahweh", "gods name"] },
    TopicRule { trigger: "Trinity", keywords: &["trinity", "three persons", "god the son", "godhead", "three in one"] },
    TopicRule { trigger: "Jesus Christ", keywords: &["jesus", "christ", "son of god", "messiah"] },
    TopicRule { trigger: "Holy Spirit", keywords: &["holy spirit", "spirit of god", "active force"] },
    TopicRule { trigger: "Soul (Mortality)", keywords: &["soul", "immortal", "soul die", "mortal soul"] },
    TopicRule { trigger: "Death", keywords: &["death", "dead", "what happens when die"] },
    TopicRule { trigger: "Hell/Sheol", keywords: &["hell", "hellfire", "sheol", "hades", "grave", "torment"] },
    TopicRule { trigger: "Heaven", keywords: &["heaven", "go to heaven", "144000", "anointed"] },
    TopicRule { trigger: "Paradise Earth", keywords: &["paradise", "earth", "new world", "resurrection"] },
    TopicRule { trigger: "Last Days/End Times", keywords: &["last days", "end times", "end of world", "armageddon", "great tribulation"] },
    TopicRule { trigger: "Kingdom of God", keywords: &["kingdom", "gods kingdom", "1914"] },
    TopicRule { trigger: "Signs of the Times", keywords: &["signs", "prophecy", "matthew 24"] },
    TopicRule { trigger: "Holidays/Celebrations", keywords: &["christmas", "birthday", "easter", "holiday", "celebrate"] },
    TopicRule { trigger: "Blood", keywords: &["blood", "transfusion", "blood fractions"] },
    TopicRule { trigger: "Neutrality", keywords: &["war", "military", "politics", "voting", "flag salute"] },
    TopicRule { trigger: "Preaching", keywords: &["preach", "ministry", "door to door", "evangeliz", "witness"] },
    TopicRule { trigger: "Salvation", keywords: &["salvation", "saved", "born again"] },
    TopicRule { trigger: "Faith & Works", keywords: &["faith", "works", "faith alone", "good works"] },
    TopicRule { trigger: "Baptism", keywords: &["baptism", "baptized", "water baptism"] },
    TopicRule { trigger: "Love", keywords: &["love", "charity", "loving"] },
    TopicRule { trigger: "Prayer", keywords: &["pray", "prayer"] },
    TopicRule { trigger: "Forgiveness", keywords: &["forgive", "forgiveness"] },
    TopicRule { trigger: "Unity", keywords: &["unity", "united", "one faith"] },
];

pub(super) static TOPIC_SCRIPTURES: &[TopicEntry] = &[
    TopicEntry {
        topic: "God's Name (Jehovah)",
        context: "God's personal name is Jehovah, used over 7,000 times in the Bible",
        verses: &[
            ("Psalm 83:18", "\"That people may know that you, whose name is Jehovah, you alone are the Most High over all the earth\""),
            ("Exodus 6:3", "\"With regard to my name Jehovah I did not make myself known to them\""),
            ("Isaiah 42:8", "\"I am Jehovah. That is my name\""),
        ],
    },
    TopicEntry {
        topic: "Trinity",
        context: "Jesus is God's Son, not God Almighty; they are separate persons",
        verses: &[
            ("John 14:28", "\"The Father is greater than I am\""),
            ("1 Corinthians 11:3", "\"The head of the Christ is God\""),
            ("Colossians 1:15", "\"He is the image of the invisible God, the firstborn of all creation\""),
        ],
    },
    TopicEntry {
        topic: "Jesus Christ",
        context: "Jesus is God's firstborn Son, the Messiah, but not God Almighty",
        verses: &[
            ("John 3:16", "\"God gave his only-begotten Son\""),
            ("Matthew 16:16", "\"You are the Christ, the Son of the living God\""),
        ],
    },
    TopicEntry {
        topic: "Holy Spirit",
        context: "The holy spirit is God's active force, not a person",
        verses: &[
            ("Genesis 1:2", "\"God's active force was moving about over the surface of the waters\""),
            ("Acts 1:8", "\"You will receive power when the holy spirit comes upon you\""),
        ],
    },
    TopicEntry {
        topic: "Soul (Mortality)",
        context: "The soul is the person, not an immortal part that survives death",
        verses: &[
            ("Ezekiel 18:4", "\"The soul who sins will die\""),
            ("Ecclesiastes 9:5", "\"The living know that they will die, but the dead know nothing at all\""),
            ("Genesis 2:7", "\"Man became a living person\""),
        ],
    },
    TopicEntry {
        topic: "Death",
        context: "Death is a state of non-existence, like sleep",
        verses: &[
            ("Ecclesiastes 9:5", "\"The dead know nothing at all\""),
            ("John 11:11-14", "\"Lazarus our friend has fallen asleep\""),
        ],
    },
    TopicEntry {
        topic: "Hell/Sheol",
        context: "Hell (Sheol/Hades) is the common grave of mankind, not a place of fiery torment",
        verses: &[
            ("Ecclesiastes 9:10", "\"There is no work nor planning nor knowledge nor wisdom in the Grave\""),
            ("Romans 6:23", "\"The wages sin pays is death\""),
        ],
    },
    TopicEntry {
        topic: "Heaven",
        context: "A limited number (144,000) are chosen to rule with Christ in heaven",
        verses: &[
            ("Luke 12:32", "\"Have no fear, little flock\""),
            ("Revelation 14:1, 3", "\"With him 144,000\""),
        ],
    },
    TopicEntry {
        topic: "Paradise Earth",
        context: "Most of mankind will live forever on a paradise earth",
        verses: &[
            ("Psalm 37:29", "\"The righteous will possess the earth, and they will live forever on it\""),
            ("Matthew 5:5", "\"Happy are the mild-tempered, since they will inherit the earth\""),
            ("Revelation 21:3-4", "\"Death will be no more\""),
        ],
    },
    TopicEntry {
        topic: "Last Days/End Times",
        context: "We are living in the last days; signs include wars, earthquakes, preaching work",
        verses: &[
            ("2 Timothy 3:1-5", "\"In the last days critical times hard to deal with will be here\""),
            ("Matthew 24:14", "\"This good news of the Kingdom will be preached in all the inhabited earth\""),
        ],
    },
    TopicEntry {
        topic: "Kingdom of God",
        context: "God's Kingdom is a real government that will rule over the earth",
        verses: &[
            ("Daniel 2:44", "\"The God of heaven will set up a kingdom that will never be destroyed\""),
            ("Matthew 6:9-10", "\"Let your Kingdom come\""),
        ],
    },
    TopicEntry {
        topic: "Signs of the Times",
        context: "Multiple signs indicate we are in the last days",
        verses: &[
            ("Matthew 24:7-8", "\"Nation will rise against nation\""),
            ("Luke 21:11", "\"There will be great earthquakes\""),
        ],
    },
    TopicEntry {
        topic: "Holidays/Celebrations",
        context: "Christians avoid holidays with pagan origins or that displease God",
        verses: &[
            ("Jeremiah 10:2-4", "\"Do not learn the way of the nations\""),
            ("2 Corinthians 6:17", "\"Quit touching the unclean thing\""),
        ],
    },
    TopicEntry {
        topic: "Blood",
        context: "Christians must abstain from blood, including blood transfusions",
        verses: &[
            ("Acts 15:28-29", "\"Keep abstaining from... blood\""),
            ("Genesis 9:4", "\"You must not eat flesh with its life, its blood, in it\""),
        ],
    },
    TopicEntry {
        topic: "Neutrality",
        context: "Christians remain neutral in political and military conflicts",
        verses: &[
            ("John 17:16", "\"They are no part of the world, just as I am no part of the world\""),
            ("Isaiah 2:4", "\"They will beat their swords into plowshares\""),
        ],
    },
    TopicEntry {
        topic: "Preaching",
        context: "All Christians are commanded to preach the good news",
        verses: &[
            ("Matthew 28:19-20", "\"Go, therefore, and make disciples of people of all the nations\""),
            ("Acts 20:20", "\"Teaching you publicly and from house to house\""),
        ],
    },
    TopicEntry {
        topic: "Salvation",
        context: "Salvation comes through faith in Jesus and doing God's will",
        verses: &[
            ("Acts 4:12", "\"There is no salvation in anyone else\""),
            ("John 17:3", "\"This means everlasting life, their coming to know you\""),
        ],
    },
    TopicEntry {
        topic: "Faith & Works",
        context: "True faith must be demonstrated by works",
        verses: &[
            ("James 2:26", "\"Faith without works is dead\""),
            ("James 2:14", "\"That faith cannot save him, can it?\""),
        ],
    },
    TopicEntry {
        topic: "Baptism",
        context: "Baptism by full immersion symbolizes dedication to God",
        verses: &[
            ("Matthew 28:19", "\"Baptizing them in the name of the Father and of the Son and of the holy spirit\""),
            ("Acts 2:38", "\"Repent, and let each one of you be baptized\""),
        ],
    },
    TopicEntry {
        topic: "Love",
        context: "Love for God and neighbor is the mark of true Christians",
        verses: &[
            ("John 13:34-35", "\"By this all will know that you are my disciples\""),
            ("1 John 4:8", "\"God is love\""),
        ],
    },
    TopicEntry {
        topic: "Prayer",
        context: "Prayer should be directed to Jehovah God through Jesus Christ",
        verses: &[
            ("Matthew 6:9", "\"Our Father in the heavens, let your name be sanctified\""),
            ("1 Thessalonians 5:17", "\"Pray constantly\""),
        ],
    },
    TopicEntry {
        topic: "Forgiveness",
        context: "Christians must freely forgive others as God forgives us",
        verses: &[
            ("Matthew 6:14-15", "\"If you forgive men their trespasses, your heavenly Father will also forgive you\""),
            ("Ephesians 4:32", "\"Freely forgiving one another\""),
        ],
    },
    TopicEntry {
        topic: "Unity",
        context: "True Christians must be united in faith and worship",
        verses: &[
            ("Ephesians 4:4-6", "\"One Lord, one faith, one baptism\""),
            ("Psalm 133:1", "\"How good and how pleasant it is for brothers to dwell together in unity!\""),
        ],
    },
];

pub(super) static META_TRIGGERS: &[MetaRule] = &[
    MetaRule {
        trigger: "soul immortal",
        keywords: &["soul", "immortal", "never die"],
        context: "The soul is mortal and can die",
        verses: &[
            ("Ezekiel 18:4", "\"The soul who sins will die\""),
            ("Ecclesiastes 9:5", "\"The dead know nothing\""),
            ("Genesis 2:7", "Adam became a living soul"),
        ],
    },
    MetaRule {
        trigger: "trinity",
        keywords: &["trinity", "three persons", "god the son"],
        context: "Jesus is God's Son, not God Almighty",
        verses: &[
            ("John 14:28", "\"The Father is greater than I\""),
            ("1 Corinthians 11:3", "The head of Christ is God"),
            ("Colossians 1:15", "Firstborn of all creation"),
        ],
    },
    MetaRule {
        trigger: "hell fire",
        keywords: &["hell", "burning forever", "eternal torment"],
        context: "Hell (Sheol/Hades) is the common grave, not a place of torment",
        verses: &[
            ("Ecclesiastes 9:5, 10", "The dead are conscious of nothing"),
            ("Psalm 146:4", "Thoughts perish at death"),
            ("Romans 6:23", "Wages of sin is death, not torment"),
        ],
    },
    MetaRule {
        trigger: "going to heaven",
        keywords: &["everyone heaven", "all good people heaven"],
        context: "Most will live forever on a paradise earth; only 144,000 go to heaven",
        verses: &[
            ("Psalm 37:29", "\"The righteous will possess the earth\""),
            ("Matthew 5:5", "Meek will inherit the earth"),
            ("Revelation 5:10", "Kings and priests to rule over the earth"),
        ],
    },
    MetaRule {
        trigger: "blood transfusion",
        keywords: &["blood transfusion", "accept blood"],
        context: "",
        verses: &[],
    },
    MetaRule {
        trigger: "celebration",
        keywords: &["birthday", "christmas", "easter", "holiday"],
        context: "",
        verses: &[],
    },
    MetaRule {
        trigger: "end times",
        keywords: &["end of world", "armageddon", "last days"],
        context: "We are living in the last days; God's Kingdom will soon rule earth",
        verses: &[
            ("Matthew 24:3-14", "Signs of the last days"),
            ("2 Timothy 3:1-5", "Critical times hard to deal with"),
            ("Revelation 21:3-4", "God will wipe away every tear"),
        ],
    },
    MetaRule {
        trigger: "salvation",
        keywords: &["saved", "salvation", "born again"],
        context: "",
        verses: &[],
    },
];
