//! Lexicon text format.
//!
//! A lexicon is a list of lines of the form
//!
//! ```text
//! # comment
//! Pekka   :: N:nom3sg a:n
//! admires :: =N:nom3sg T:pst, =N:acc
//! ```
//!
//! Each comma-separated group describes one *word part*: most words have a
//! single part, but a verb can be split into a launching part and a displaced
//! remnant (`admires`, `admires'`). Within a group, tokens are
//! space-separated:
//!
//! - `cat:NP` is a category tag,
//! - a leading `=`, `-`, `<` or `>` marks a negative (selecting) feature,
//! - anything else is a positive feature.
//!
//! `name:value1|value2` gives a feature a set of alternative values; a bare
//! `name` matches any value of that name.
//!
//! The engine never sees this text: it consumes the parsed [`LexiconEntry`]
//! tuples.

use crate::error::LexiconError;
use std::collections::HashMap;
use std::fmt;

/// The sign of a negative feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Sign {
    /// `=`: selects an argument (merge).
    Select,
    /// `-`: licenses an adjunct (pair merge).
    Adjoin,
    /// `<`: directional selection, parsed but not wired.
    Left,
    /// `>`: directional selection, parsed but not wired.
    Right,
}

impl Sign {
    pub fn from_char(c: char) -> Option<Sign> {
        match c {
            '=' => Some(Sign::Select),
            '-' => Some(Sign::Adjoin),
            '<' => Some(Sign::Left),
            '>' => Some(Sign::Right),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Sign::Select => '=',
            Sign::Adjoin => '-',
            Sign::Left => '<',
            Sign::Right => '>',
        }
    }
}

/// One parsed feature token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeatureSpec {
    /// `None` for positive features.
    pub sign: Option<Sign>,
    pub name: String,
    /// Alternative values; empty means "any value of this name".
    pub values: Vec<String>,
}

impl FeatureSpec {
    pub fn positive(name: &str, values: &[&str]) -> Self {
        FeatureSpec { sign: None, name: name.to_string(), values: values.iter().map(|v| v.to_string()).collect() }
    }

    pub fn negative(sign: Sign, name: &str, values: &[&str]) -> Self {
        FeatureSpec { sign: Some(sign), name: name.to_string(), values: values.iter().map(|v| v.to_string()).collect() }
    }

    /// Parse a single feature token such as `=N:nom3sg|acc`.
    ///
    /// Category tokens (`cat:..`) are not features and return `None`.
    pub fn parse(token: &str) -> Option<FeatureSpec> {
        if token.starts_with("cat:") {
            return None;
        }
        let caps = regex!(r"^([-=<>])?(\w[^:\s]*)(?::(\S+))?$").captures(token)?;
        let sign = caps.get(1).and_then(|m| m.as_str().chars().next()).and_then(Sign::from_char);
        let name = caps.get(2)?.as_str().to_string();
        let values = match caps.get(3) {
            Some(m) => {
                let values: Vec<String> = m.as_str().split('|').map(str::to_string).collect();
                if values.iter().any(|v| v.is_empty()) {
                    return None;
                }
                values
            }
            None => Vec::new(),
        };
        Some(FeatureSpec { sign, name, values })
    }

    pub fn is_positive(&self) -> bool {
        self.sign.is_none()
    }
}

impl fmt::Display for FeatureSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(sign) = self.sign {
            write!(f, "{}", sign.as_char())?;
        }
        f.write_str(&self.name)?;
        if !self.values.is_empty() {
            write!(f, ":{}", self.values.join("|"))?;
        }
        Ok(())
    }
}

/// The features of one word part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartSpec {
    pub categories: Vec<String>,
    pub negative: Vec<FeatureSpec>,
    pub positive: Vec<FeatureSpec>,
}

impl PartSpec {
    /// Parse one comma-separated group of a lexicon line.
    pub fn parse(word: &str, group: &str) -> Result<PartSpec, LexiconError> {
        let mut part = PartSpec::default();
        let mut seen: Vec<&str> = Vec::new();

        for token in group.split_whitespace() {
            if seen.contains(&token) {
                return Err(LexiconError::DuplicateFeature { word: word.to_string(), feature: token.to_string() });
            }
            seen.push(token);

            if let Some(category) = token.strip_prefix("cat:") {
                if category.is_empty() {
                    return Err(LexiconError::InvalidFeature { word: word.to_string(), token: token.to_string() });
                }
                part.categories.push(token.to_string());
                continue;
            }

            let feature = FeatureSpec::parse(token)
                .ok_or_else(|| LexiconError::InvalidFeature { word: word.to_string(), token: token.to_string() })?;
            if feature.is_positive() {
                part.positive.push(feature);
            } else {
                part.negative.push(feature);
            }
        }

        if seen.is_empty() {
            return Err(LexiconError::EmptyGroup { word: word.to_string() });
        }
        Ok(part)
    }

    /// Negative features first, then positive ones.
    pub fn features(&self) -> impl Iterator<Item = &FeatureSpec> {
        self.negative.iter().chain(self.positive.iter())
    }
}

/// One word of the lexicon with its ordered word parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexiconEntry {
    pub word: String,
    pub parts: Vec<PartSpec>,
}

impl LexiconEntry {
    /// Display id of the `index`th part: the word, primed once per
    /// preceding part (`admires`, `admires'`, `admires''`).
    pub fn part_id(&self, index: usize) -> String {
        let mut id = self.word.clone();
        id.extend(std::iter::repeat_n('\'', index));
        id
    }
}

/// A validated lexicon.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    entries: Vec<LexiconEntry>,
    index: HashMap<String, usize>,
}

impl Lexicon {
    /// Parse lexicon text. `#` lines and blank lines are ignored.
    pub fn parse(text: &str) -> Result<Lexicon, LexiconError> {
        let mut entries = Vec::new();

        for (n, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let caps = regex!(r"^(.*?)\s*::\s*(.*)$")
                .captures(line)
                .ok_or(LexiconError::MalformedLine { line: n + 1 })?;
            let word = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
            if word.is_empty() || word.contains(char::is_whitespace) {
                return Err(LexiconError::EmptyWord { line: n + 1 });
            }
            let groups = caps.get(2).map(|m| m.as_str()).unwrap_or("");

            let parts = groups.split(',').map(|group| PartSpec::parse(word, group)).collect::<Result<Vec<_>, _>>()?;
            entries.push(LexiconEntry { word: word.to_string(), parts });
        }

        Lexicon::from_entries(entries)
    }

    /// Build a lexicon from already-parsed entries.
    pub fn from_entries(entries: Vec<LexiconEntry>) -> Result<Lexicon, LexiconError> {
        let mut index = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            if entry.parts.is_empty() {
                return Err(LexiconError::EmptyGroup { word: entry.word.clone() });
            }
            for part in &entry.parts {
                let mut seen: Vec<String> = part.categories.clone();
                for feature in part.features() {
                    let fstring = feature.to_string();
                    if seen.contains(&fstring) {
                        return Err(LexiconError::DuplicateFeature { word: entry.word.clone(), feature: fstring });
                    }
                    seen.push(fstring);
                }
            }
            if index.insert(entry.word.clone(), i).is_some() {
                return Err(LexiconError::DuplicateWord(entry.word.clone()));
            }
        }
        Ok(Lexicon { entries, index })
    }

    pub fn get(&self, word: &str) -> Option<&LexiconEntry> {
        self.index.get(word).map(|&i| &self.entries[i])
    }

    pub fn entries(&self) -> &[LexiconEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Split a sentence list file into sentences, skipping `#` comments and
/// blank lines.
pub fn parse_sentences(text: &str) -> Vec<String> {
    text.lines().map(str::trim).filter(|l| !l.is_empty() && !l.starts_with('#')).map(str::to_string).collect()
}

/// Whitespace tokenization used for sentences.
pub fn tokenize(sentence: &str) -> Vec<&str> {
    sentence.split_whitespace().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_multi_part_entries() {
        let lexicon = Lexicon::parse(
            "# toy\n\
             Pekka :: N:nom3sg a:n\n\
             \n\
             admires :: =N:nom3sg T:pst, =N:acc cat:V\n",
        )
        .unwrap();

        assert_eq!(lexicon.len(), 2);
        let admires = lexicon.get("admires").unwrap();
        assert_eq!(admires.parts.len(), 2);
        assert_eq!(admires.parts[0].negative, vec![FeatureSpec::negative(Sign::Select, "N", &["nom3sg"])]);
        assert_eq!(admires.parts[0].positive, vec![FeatureSpec::positive("T", &["pst"])]);
        assert_eq!(admires.parts[1].categories, vec!["cat:V".to_string()]);
        assert_eq!(admires.part_id(1), "admires'");
    }

    #[test]
    fn feature_tokens() {
        let f = FeatureSpec::parse("=N:prt|acc").unwrap();
        assert_eq!(f.sign, Some(Sign::Select));
        assert_eq!(f.name, "N");
        assert_eq!(f.values, vec!["prt".to_string(), "acc".to_string()]);
        assert_eq!(f.to_string(), "=N:prt|acc");

        assert!(FeatureSpec::parse("moves").unwrap().is_positive());
        assert!(FeatureSpec::parse("+N").is_none());
        assert!(FeatureSpec::parse("=").is_none());
        assert!(FeatureSpec::parse("N:a||b").is_none());
        assert!(FeatureSpec::parse("cat:NP").is_none());
    }

    #[test]
    fn rejects_malformed_lexicons() {
        assert_eq!(Lexicon::parse("Pekka N:nom").unwrap_err(), LexiconError::MalformedLine { line: 1 });
        assert_eq!(Lexicon::parse(":: N:nom").unwrap_err(), LexiconError::EmptyWord { line: 1 });
        assert_eq!(
            Lexicon::parse("a :: =N =N").unwrap_err(),
            LexiconError::DuplicateFeature { word: "a".into(), feature: "=N".into() }
        );
        assert_eq!(
            Lexicon::parse("a :: +N").unwrap_err(),
            LexiconError::InvalidFeature { word: "a".into(), token: "+N".into() }
        );
        assert_eq!(Lexicon::parse("a :: N, ").unwrap_err(), LexiconError::EmptyGroup { word: "a".into() });
        assert_eq!(Lexicon::parse("a :: N\na :: M").unwrap_err(), LexiconError::DuplicateWord("a".into()));
    }

    #[test]
    fn sentence_files_skip_comments() {
        let sentences = parse_sentences("# header\nPekka admires Merjaa\n\n  hyvä Pekka  \n");
        assert_eq!(sentences, vec!["Pekka admires Merjaa".to_string(), "hyvä Pekka".to_string()]);
    }
}
