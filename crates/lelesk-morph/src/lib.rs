//! Text analysis for the lelesk WSD engine.
//!
//! Three pieces, all injectable:
//! - [`tokenize`] splits raw sentence text into word and punctuation tokens.
//! - [`Lemmatizer`] is a classic morphy implementation: check exception
//!   lists, apply POS-specific suffix rules, and verify every candidate
//!   through a caller-provided lemma existence predicate.
//! - [`Stopwords`] is the filter applied to context bags and gloss tokens.
//!
//! [`TextAnalyzer`] bundles the three behind one trait so the engine stays
//! ignorant of any concrete dictionary; [`EnglishAnalyzer`] is the default
//! implementation.
//!
//! # Example
//! ```rust
//! use lelesk_morph::{Lemmatizer, tokenize};
//! use lelesk_types::Pos;
//!
//! let lemmatizer = Lemmatizer::empty();
//! let exists = |_pos, lemma: &str| lemma == "run";
//! let lemmas = lemmatizer.lemmas_for(Pos::Verb, "running", &exists);
//! assert_eq!(lemmas, vec!["run"]);
//! assert_eq!(tokenize("so many fish!"), vec!["so", "many", "fish", "!"]);
//! ```

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use lelesk_types::Pos;

/// Tokenize/lemmatize/stopword capability consumed by the engine.
pub trait TextAnalyzer {
    /// Split raw text into surface tokens.
    fn tokenize(&self, text: &str) -> Vec<String>;

    /// Dictionary-verified lemma candidates for one surface token.
    ///
    /// With `pos = None`, candidates are gathered across all parts of
    /// speech. May be empty when nothing verifies.
    fn lemma_variants(&self, token: &str, pos: Option<Pos>) -> Vec<String>;

    /// Whether a token should be dropped from context/gloss bags.
    fn is_stopword(&self, token: &str) -> bool;
}

/// Split text into word tokens and single-character punctuation tokens.
///
/// Hyphens and apostrophes are kept inside words (`cold-blooded`, `don't`);
/// everything else non-alphanumeric is emitted as its own token so stopword
/// filtering can discard it downstream.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    for c in text.chars() {
        if c.is_alphanumeric() || ((c == '-' || c == '\'') && !word.is_empty()) {
            word.push(c);
        } else {
            flush_word(&mut word, &mut tokens);
            if !c.is_whitespace() {
                tokens.push(c.to_string());
            }
        }
    }
    flush_word(&mut word, &mut tokens);
    tokens
}

fn flush_word(word: &mut String, tokens: &mut Vec<String>) {
    if word.is_empty() {
        return;
    }
    // A trailing hyphen/apostrophe is punctuation, not part of the word.
    let mut trailing = Vec::new();
    while let Some(last @ ('-' | '\'')) = word.chars().next_back() {
        word.pop();
        trailing.push(last.to_string());
        if word.is_empty() {
            break;
        }
    }
    trailing.reverse();
    if !word.is_empty() {
        tokens.push(std::mem::take(word));
    }
    tokens.extend(trailing);
}

/// Morphy-style lemmatizer: exception lists plus suffix rules, with every
/// candidate verified by a caller-provided existence predicate.
pub struct Lemmatizer {
    exceptions: HashMap<Pos, HashMap<String, Vec<String>>>,
}

impl Lemmatizer {
    /// A lemmatizer with no exception lists; suffix rules still apply.
    pub fn empty() -> Self {
        Self {
            exceptions: HashMap::new(),
        }
    }

    /// Load exception lists (`noun.exc`, `verb.exc`, `adj.exc`, `adv.exc`)
    /// from a directory. Missing files are treated as empty.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        Ok(Self {
            exceptions: HashMap::from([
                (Pos::Noun, load_exc(dir.join("noun.exc"))?),
                (Pos::Verb, load_exc(dir.join("verb.exc"))?),
                (Pos::Adj, load_exc(dir.join("adj.exc"))?),
                (Pos::Adv, load_exc(dir.join("adv.exc"))?),
            ]),
        })
    }

    /// Generate verified lemmas for a surface form: surface first if it
    /// exists, then exception hits, then suffix-rule hits. Deduplicated,
    /// first-seen order.
    pub fn lemmas_for<F>(&self, pos: Pos, surface: &str, lemma_exists: &F) -> Vec<String>
    where
        F: Fn(Pos, &str) -> bool + ?Sized,
    {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        let surface = normalize(surface);

        if lemma_exists(pos, &surface) {
            push_unique(&mut out, &mut seen, surface.clone());
        }

        if let Some(exc_map) = self.exceptions.get(&pos)
            && let Some(entries) = exc_map.get(&surface)
        {
            for lemma in entries {
                if lemma_exists(pos, lemma) {
                    push_unique(&mut out, &mut seen, lemma.clone());
                }
            }
        }

        for (suffix, replacement) in rules_for(pos) {
            if let Some(candidate) = apply_rule(&surface, suffix, replacement) {
                if lemma_exists(pos, &candidate) {
                    push_unique(&mut out, &mut seen, candidate.clone());
                }
                // Inflection may have doubled the final consonant
                // ("running" -> "runn"); offer the undoubled stem too.
                if replacement.is_empty()
                    && let Some(undoubled) = strip_doubled_consonant(&candidate)
                    && lemma_exists(pos, &undoubled)
                {
                    push_unique(&mut out, &mut seen, undoubled);
                }
            }
        }

        out
    }
}

/// Stopword and punctuation filter.
pub struct Stopwords {
    words: HashSet<String>,
}

impl Default for Stopwords {
    fn default() -> Self {
        Self::english()
    }
}

impl Stopwords {
    /// The built-in English list plus ASCII punctuation.
    pub fn english() -> Self {
        let mut words: HashSet<String> =
            ENGLISH_STOPWORDS.iter().map(|w| w.to_string()).collect();
        words.extend(PUNCTUATION.iter().map(|p| p.to_string()));
        Self { words }
    }

    /// An empty filter.
    pub fn none() -> Self {
        Self {
            words: HashSet::new(),
        }
    }

    /// Add extra entries (lowercased).
    pub fn extend<I: IntoIterator<Item = S>, S: Into<String>>(&mut self, extra: I) {
        self.words.extend(extra.into_iter().map(|w| w.into().to_lowercase()));
    }

    /// True for listed words and for tokens with no alphanumeric content.
    pub fn contains(&self, token: &str) -> bool {
        let lowered = token.to_lowercase();
        self.words.contains(&lowered) || !lowered.chars().any(char::is_alphanumeric)
    }

    /// Number of listed entries.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Default [`TextAnalyzer`]: [`tokenize`] + [`Lemmatizer`] + [`Stopwords`],
/// with lemma existence checked through an injected predicate (typically a
/// closure over a sense store).
pub struct EnglishAnalyzer {
    lemmatizer: Lemmatizer,
    stopwords: Stopwords,
    lemma_exists: Box<dyn Fn(Pos, &str) -> bool + Send + Sync>,
}

impl EnglishAnalyzer {
    pub fn new(
        lemmatizer: Lemmatizer,
        stopwords: Stopwords,
        lemma_exists: impl Fn(Pos, &str) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            lemmatizer,
            stopwords,
            lemma_exists: Box::new(lemma_exists),
        }
    }

    /// An analyzer that trusts every rule-generated lemma. Mostly for tests;
    /// real deployments pass a dictionary-backed predicate.
    pub fn permissive() -> Self {
        Self::new(Lemmatizer::empty(), Stopwords::english(), |_, _| true)
    }
}

impl TextAnalyzer for EnglishAnalyzer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        tokenize(text)
    }

    fn lemma_variants(&self, token: &str, pos: Option<Pos>) -> Vec<String> {
        let all = [Pos::Noun, Pos::Verb, Pos::Adj, Pos::Adv];
        let targets: &[Pos] = match pos {
            Some(ref p) => std::slice::from_ref(p),
            None => &all,
        };
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for p in targets {
            for lemma in self.lemmatizer.lemmas_for(*p, token, &*self.lemma_exists) {
                push_unique(&mut out, &mut seen, lemma);
            }
        }
        out
    }

    fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }
}

fn load_exc(path: PathBuf) -> Result<HashMap<String, Vec<String>>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let file =
        File::open(&path).with_context(|| format!("open exception file {}", path.display()))?;
    let reader = BufReader::new(file);
    let mut map = HashMap::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line =
            line.with_context(|| format!("read line {} in {}", lineno + 1, path.display()))?;
        let mut parts = line.split_whitespace();
        let surface = match parts.next() {
            Some(s) => normalize(s),
            None => continue,
        };
        let lemmas: Vec<String> = parts.map(normalize).collect();
        if !lemmas.is_empty() {
            map.insert(surface, lemmas);
        }
    }
    Ok(map)
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

fn push_unique(out: &mut Vec<String>, seen: &mut HashSet<String>, lemma: String) {
    if seen.insert(lemma.clone()) {
        out.push(lemma);
    }
}

fn apply_rule(surface: &str, suffix: &str, replacement: &str) -> Option<String> {
    surface.strip_suffix(suffix).map(|stem| {
        if replacement.is_empty() {
            stem.to_string()
        } else {
            format!("{stem}{replacement}")
        }
    })
}

/// "runn" -> "run". Doubled vowels ("tree", "fee") do not qualify.
fn strip_doubled_consonant(candidate: &str) -> Option<String> {
    let mut chars = candidate.chars();
    let last = chars.next_back()?;
    let prev = chars.next_back()?;
    if last == prev && !matches!(last, 'a' | 'e' | 'i' | 'o' | 'u') {
        Some(candidate[..candidate.len() - last.len_utf8()].to_string())
    } else {
        None
    }
}

fn rules_for(pos: Pos) -> &'static [(&'static str, &'static str)] {
    match pos {
        Pos::Noun => &[
            ("s", ""),
            ("ses", "s"),
            ("xes", "x"),
            ("zes", "z"),
            ("ches", "ch"),
            ("shes", "sh"),
            ("men", "man"),
            ("ies", "y"),
        ],
        Pos::Verb => &[
            ("s", ""),
            ("ies", "y"),
            ("es", "e"),
            ("es", ""),
            ("ed", "e"),
            ("ed", ""),
            ("ing", "e"),
            ("ing", ""),
        ],
        Pos::Adj | Pos::Adv => &[("er", ""), ("er", "e"), ("est", ""), ("est", "e")],
    }
}

const PUNCTUATION: &[&str] = &[
    "[", "]", "!", "\"", "#", "$", "%", "&", "'", "(", ")", "*", "+", ",", ".", "/", ":", ";",
    "<", "=", ">", "?", "@", "\\", "^", "_", "`", "{", "|", "}", "~", "-", "\u{201c}", "\u{201d}",
    "``", "''",
];

/// The NLTK English stopword list.
const ENGLISH_STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan",
    "shan't", "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't",
    "wouldn", "wouldn't",
];

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_exists(targets: &[(&str, Pos)]) -> impl Fn(Pos, &str) -> bool {
        let set: HashSet<(Pos, String)> = targets
            .iter()
            .map(|(lemma, pos)| (*pos, normalize(lemma)))
            .collect();
        move |pos, lemma| set.contains(&(pos, normalize(lemma)))
    }

    #[test]
    fn tokenizes_words_and_punctuation() {
        assert_eq!(
            tokenize("there are so many fish in the river."),
            vec!["there", "are", "so", "many", "fish", "in", "the", "river", "."]
        );
        assert_eq!(tokenize("cold-blooded, aquatic"), vec!["cold-blooded", ",", "aquatic"]);
        assert_eq!(tokenize(""), Vec::<String>::new());
        assert_eq!(tokenize("   "), Vec::<String>::new());
    }

    #[test]
    fn uses_exceptions_and_rules() {
        let mut lemmatizer = Lemmatizer::empty();
        lemmatizer.exceptions.insert(
            Pos::Noun,
            HashMap::from([("children".into(), vec!["child".into()])]),
        );

        let exists = fake_exists(&[("child", Pos::Noun)]);
        let lemmas = lemmatizer.lemmas_for(Pos::Noun, "children", &exists);
        assert_eq!(lemmas, vec!["child"]);
    }

    #[test]
    fn includes_surface_and_rule_hits() {
        let lemmatizer = Lemmatizer::empty();
        let exists = fake_exists(&[("running", Pos::Verb), ("run", Pos::Verb)]);
        let lemmas = lemmatizer.lemmas_for(Pos::Verb, "running", &exists);
        assert_eq!(lemmas, vec!["running", "run"]);
    }

    #[test]
    fn undoubles_consonants_without_losing_doubled_stems() {
        let lemmatizer = Lemmatizer::empty();
        let exists = fake_exists(&[
            ("kiss", Pos::Verb),
            ("run", Pos::Verb),
            ("tree", Pos::Noun),
        ]);
        assert_eq!(lemmatizer.lemmas_for(Pos::Verb, "kisses", &exists), vec!["kiss"]);
        assert_eq!(lemmatizer.lemmas_for(Pos::Verb, "running", &exists), vec!["run"]);
        assert_eq!(lemmatizer.lemmas_for(Pos::Noun, "trees", &exists), vec!["tree"]);
    }

    #[test]
    fn loads_exception_files_when_present() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(dir.path().join("noun.exc"), "geese goose\nmice mouse\n").unwrap();

        let lemmatizer = Lemmatizer::load(dir.path()).expect("load exc files");
        let exists = fake_exists(&[("goose", Pos::Noun)]);
        assert_eq!(lemmatizer.lemmas_for(Pos::Noun, "geese", &exists), vec!["goose"]);
        // verb.exc absent: rules still work.
        let exists = fake_exists(&[("run", Pos::Verb)]);
        assert_eq!(lemmatizer.lemmas_for(Pos::Verb, "runs", &exists), vec!["run"]);
    }

    #[test]
    fn stopwords_cover_words_and_punctuation() {
        let stopwords = Stopwords::english();
        assert!(stopwords.contains("the"));
        assert!(stopwords.contains("The"));
        assert!(stopwords.contains(","));
        assert!(stopwords.contains("..."));
        assert!(!stopwords.contains("fish"));
    }

    #[test]
    fn stopwords_extendable() {
        let mut stopwords = Stopwords::none();
        assert!(!stopwords.contains("fish"));
        stopwords.extend(["Fish"]);
        assert!(stopwords.contains("fish"));
    }

    #[test]
    fn analyzer_gathers_variants_across_pos() {
        let analyzer = EnglishAnalyzer::new(
            Lemmatizer::empty(),
            Stopwords::english(),
            |pos, lemma| matches!((pos, lemma), (Pos::Noun, "fish") | (Pos::Verb, "fish")),
        );
        assert_eq!(analyzer.lemma_variants("fishes", None), vec!["fish"]);
        assert_eq!(analyzer.lemma_variants("fishes", Some(Pos::Adj)), Vec::<String>::new());
    }
}
