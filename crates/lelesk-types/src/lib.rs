//! Shared types for extended-LESK word-sense disambiguation.
//!
//! The goal is a small closed set of record types that the store, the
//! cache, and the engine all agree on: [`Pos`] and [`SenseId`] identify a
//! sense, [`Sense`] is an immutable snapshot of one dictionary sense, and
//! [`WsdCandidate`] / [`ScoredCandidate`] carry a sense through candidate
//! generation and ranking.
//!
//! ```rust
//! use lelesk_types::{Pos, SenseId};
//!
//! let id: SenseId = "02512053-n".parse().unwrap();
//! assert_eq!(id.pos, Pos::Noun);
//! assert_eq!(id.offset, 2512053);
//! assert_eq!(id.to_string(), "02512053-n");
//! ```

use std::fmt;
use std::str::FromStr;

/// Part-of-speech marker using the WordNet tag characters (`n`, `v`, `a`/`s`, `r`).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Pos {
    Noun,
    Verb,
    Adj,
    Adv,
}

impl Pos {
    /// Parse a POS character into an enum. Adjective satellites (`s`) fold into [`Pos::Adj`].
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'n' => Some(Pos::Noun),
            'v' => Some(Pos::Verb),
            'a' | 's' => Some(Pos::Adj),
            'r' => Some(Pos::Adv),
            _ => None,
        }
    }

    /// Emit the canonical POS character.
    pub fn to_char(self) -> char {
        match self {
            Pos::Noun => 'n',
            Pos::Verb => 'v',
            Pos::Adj => 'a',
            Pos::Adv => 'r',
        }
    }

    /// The digit used as a POS prefix in WNSQL-style 9-digit synset ids.
    pub fn wnsql_digit(self) -> char {
        match self {
            Pos::Noun => '1',
            Pos::Verb => '2',
            Pos::Adj => '3',
            Pos::Adv => '4',
        }
    }

    fn from_wnsql_digit(c: char) -> Option<Self> {
        match c {
            '1' => Some(Pos::Noun),
            '2' => Some(Pos::Verb),
            '3' => Some(Pos::Adj),
            '4' => Some(Pos::Adv),
            _ => None,
        }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// `(offset, pos)` pair uniquely identifying one sense.
///
/// Equality and hashing follow the fields, which matches equality of the
/// normalized string form.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct SenseId {
    pub pos: Pos,
    pub offset: u32,
}

impl SenseId {
    pub fn new(pos: Pos, offset: u32) -> Self {
        Self { pos, offset }
    }

    /// Parse a WNSQL-style 9-digit id (`102512053` = POS digit + 8-digit offset).
    pub fn from_wnsql(ident: &str) -> Option<Self> {
        if ident.len() != 9 || !ident.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let pos = Pos::from_wnsql_digit(ident.chars().next()?)?;
        let offset: u32 = ident[1..].parse().ok()?;
        Some(Self { pos, offset })
    }

    /// Emit the WNSQL-style 9-digit form.
    pub fn to_wnsql(self) -> String {
        format!("{}{:08}", self.pos.wnsql_digit(), self.offset)
    }
}

/// Normalized form: zero-padded offset, dash, POS character (`02512053-n`).
impl fmt::Display for SenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08}-{}", self.offset, self.pos)
    }
}

/// Error from parsing a [`SenseId`] string.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseSenseIdError {
    input: String,
}

impl fmt::Display for ParseSenseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid sense id `{}`", self.input)
    }
}

impl std::error::Error for ParseSenseIdError {}

impl FromStr for SenseId {
    type Err = ParseSenseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseSenseIdError {
            input: s.to_string(),
        };
        let (offset_part, pos_part) = s.split_once('-').ok_or_else(err)?;
        let mut pos_chars = pos_part.chars();
        let pos = pos_chars
            .next()
            .filter(|_| pos_chars.next().is_none())
            .and_then(Pos::from_char)
            .ok_or_else(err)?;
        if offset_part.is_empty() || !offset_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        let offset: u32 = offset_part.parse().map_err(|_| err())?;
        Ok(Self { pos, offset })
    }
}

/// Immutable snapshot of one dictionary sense.
///
/// `tagged_refs` holds the sense keys of other senses mentioned inside this
/// sense's gloss; the engine follows them for exactly one expansion hop.
#[derive(Clone, Debug, PartialEq)]
pub struct Sense {
    pub id: SenseId,
    /// Surface lemmas ("terms"); at least one for a well-formed sense.
    pub terms: Vec<String>,
    /// Alternate external identifiers (sense keys); may be empty.
    pub sense_keys: Vec<String>,
    /// Definition gloss text.
    pub definition: String,
    /// Example gloss texts.
    pub examples: Vec<String>,
    /// Sense keys tagged on content words inside the gloss.
    pub tagged_refs: Vec<String>,
    /// Corpus tag frequency; most-frequent-sense prior and tie-break.
    pub tag_freq: u32,
}

impl Sense {
    /// A sense with only an id and a definition; fixtures fill in the rest.
    pub fn new(id: SenseId, definition: impl Into<String>) -> Self {
        Self {
            id,
            terms: Vec::new(),
            sense_keys: Vec::new(),
            definition: definition.into(),
            examples: Vec::new(),
            tagged_refs: Vec::new(),
            tag_freq: 0,
        }
    }

    /// All gloss texts: the definition followed by the examples.
    pub fn gloss_texts(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.definition.as_str()).chain(self.examples.iter().map(String::as_str))
    }
}

/// One candidate sense for a disambiguation query.
///
/// `ordinal` is 1-based and reflects store retrieval order; it carries no
/// meaning beyond presentation and tie-breaking.
#[derive(Clone, Debug, PartialEq)]
pub struct WsdCandidate {
    pub ordinal: usize,
    pub sense: Sense,
    pub tokens: Vec<String>,
}

/// A ranked candidate: overlap score plus the sense's corpus frequency.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoredCandidate {
    pub candidate: WsdCandidate,
    pub score: u32,
    pub freq: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sense_id_display_is_normalized() {
        let id = SenseId::new(Pos::Noun, 2512053);
        assert_eq!(id.to_string(), "02512053-n");
        assert_eq!(SenseId::new(Pos::Verb, 1740).to_string(), "00001740-v");
    }

    #[test]
    fn sense_id_parses_canonical_form() {
        let id: SenseId = "02512053-n".parse().unwrap();
        assert_eq!(id, SenseId::new(Pos::Noun, 2512053));
        let adv: SenseId = "00000123-r".parse().unwrap();
        assert_eq!(adv.pos, Pos::Adv);
    }

    #[test]
    fn sense_id_parse_rejects_garbage() {
        assert!("".parse::<SenseId>().is_err());
        assert!("02512053".parse::<SenseId>().is_err());
        assert!("02512053-x".parse::<SenseId>().is_err());
        assert!("0251a053-n".parse::<SenseId>().is_err());
        assert!("02512053-nn".parse::<SenseId>().is_err());
    }

    #[test]
    fn equality_matches_normalized_string() {
        let a: SenseId = "02512053-n".parse().unwrap();
        let b = SenseId::new(Pos::Noun, 2512053);
        assert_eq!(a, b);
        assert_eq!(a.to_string(), b.to_string());
        let c = SenseId::new(Pos::Verb, 2512053);
        assert_ne!(a, c);
    }

    #[test]
    fn wnsql_round_trip() {
        let id = SenseId::new(Pos::Noun, 2512053);
        assert_eq!(id.to_wnsql(), "102512053");
        assert_eq!(SenseId::from_wnsql("102512053"), Some(id));
        assert_eq!(SenseId::from_wnsql("902512053"), None);
        assert_eq!(SenseId::from_wnsql("12053"), None);
    }

    #[test]
    fn satellite_adjective_folds_into_adj() {
        assert_eq!(Pos::from_char('s'), Some(Pos::Adj));
        assert_eq!(Pos::from_char('a'), Some(Pos::Adj));
    }

    #[test]
    fn gloss_texts_orders_definition_first() {
        let mut sense = Sense::new(SenseId::new(Pos::Noun, 1), "a cold-blooded vertebrate");
        sense.examples.push("the fish swam upstream".into());
        let texts: Vec<&str> = sense.gloss_texts().collect();
        assert_eq!(
            texts,
            vec!["a cold-blooded vertebrate", "the fish swam upstream"]
        );
    }
}
