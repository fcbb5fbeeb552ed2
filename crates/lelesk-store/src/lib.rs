//! Sense lookup for the lelesk engine.
//!
//! [`SenseStore`] is the contract the engine consumes: lemma search, id and
//! sense-key lookup, taxonomy neighbors, and corpus tag frequencies. The
//! store is read-only from the engine's perspective.
//!
//! [`SenseBank`] is the reference implementation: an in-memory bank ingested
//! from a JSON-lines file (one [`SenseRecord`] per line), loaded through a
//! memory-mapped or owned buffer chosen at runtime via [`LoadMode`]. Tests
//! and tools can also populate a bank programmatically with
//! [`SenseBank::insert`].
//!
//! # Example
//! ```no_run
//! use lelesk_store::{LoadMode, SenseBank, SenseStore};
//! use lelesk_types::Pos;
//!
//! # fn main() -> anyhow::Result<()> {
//! let bank = SenseBank::load_with_mode("senses.jsonl", LoadMode::Mmap)?;
//! for sense in bank.find_by_lemma("fish", Some(Pos::Noun)) {
//!     println!("{}: {}", sense.id, sense.definition);
//! }
//! # Ok(()) }
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use memmap2::Mmap;
use serde::{Deserialize, Serialize};

use lelesk_types::{Pos, Sense, SenseId};

/// Read-only access to senses and the sense network.
///
/// Not-found conditions are empty results, never errors: an unknown lemma or
/// id is a legitimate outcome of disambiguation.
pub trait SenseStore {
    /// All senses whose lemma list contains `lemma` (case-insensitive),
    /// filtered by POS when one is given. Order is the bank's insertion order.
    fn find_by_lemma(&self, lemma: &str, pos: Option<Pos>) -> Vec<Sense>;

    /// Fetch one sense by id.
    fn get(&self, id: &SenseId) -> Option<Sense>;

    /// Fetch one sense by an alternate sense key.
    fn get_by_sense_key(&self, key: &str) -> Option<Sense>;

    /// Hypernym and hyponym senses of `id`, hypernyms first.
    fn hypernyms_and_hyponyms(&self, id: &SenseId) -> Vec<Sense>;

    /// Corpus tag frequency for `id`; 0 when unknown.
    fn tag_frequency(&self, id: &SenseId) -> u32;

    /// Every sense id in the store, in insertion order. Used for cache warm-up.
    fn sense_ids(&self) -> Vec<SenseId>;

    /// Resolve a free-form sense identifier to a sense.
    ///
    /// Resolution order is fixed: sense-key lookup, then canonical
    /// `offset-pos` id, then WNSQL 9-digit id. The first hit wins.
    fn resolve(&self, ident: &str) -> Option<Sense> {
        if let Some(sense) = self.get_by_sense_key(ident) {
            return Some(sense);
        }
        if let Ok(id) = ident.parse::<SenseId>()
            && let Some(sense) = self.get(&id)
        {
            return Some(sense);
        }
        if let Some(id) = SenseId::from_wnsql(ident) {
            return self.get(&id);
        }
        None
    }
}

/// Strategy for loading a sense file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoadMode {
    /// Memory-map the file (fast, zero-copy until parse).
    Mmap,
    /// Read the file into an owned buffer (portable fallback).
    Owned,
}

enum Buffer {
    Mmap(Mmap),
    Owned(Vec<u8>),
}

impl Buffer {
    fn as_slice(&self) -> &[u8] {
        match self {
            Buffer::Mmap(m) => m.as_ref(),
            Buffer::Owned(v) => v.as_slice(),
        }
    }
}

/// One line of a JSONL sense file.
///
/// `hypernyms`/`hyponyms` reference other senses by canonical id string;
/// links to ids absent from the bank are kept and simply resolve to nothing.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct SenseRecord {
    /// Canonical sense id, e.g. `02512053-n`.
    pub id: String,
    pub terms: Vec<String>,
    #[serde(default)]
    pub keys: Vec<String>,
    pub definition: String,
    #[serde(default)]
    pub examples: Vec<String>,
    /// Sense keys tagged on content words inside the gloss.
    #[serde(default)]
    pub tagged: Vec<String>,
    #[serde(default)]
    pub hypernyms: Vec<String>,
    #[serde(default)]
    pub hyponyms: Vec<String>,
    #[serde(default)]
    pub freq: u32,
}

/// In-memory sense bank with lemma, id, and sense-key indices.
#[derive(Debug, Default)]
pub struct SenseBank {
    senses: HashMap<SenseId, Sense>,
    order: Vec<SenseId>,
    by_key: HashMap<String, SenseId>,
    by_lemma: HashMap<String, Vec<SenseId>>,
    hypernyms: HashMap<SenseId, Vec<SenseId>>,
    hyponyms: HashMap<SenseId, Vec<SenseId>>,
}

impl SenseBank {
    /// An empty bank, to be filled with [`SenseBank::insert`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a bank from a JSONL sense file, memory-mapping the source.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_mode(path, LoadMode::Mmap)
    }

    /// Load a bank choosing between mmap and an owned buffer at runtime.
    pub fn load_with_mode(path: impl AsRef<Path>, mode: LoadMode) -> Result<Self> {
        let path = path.as_ref();
        let buffer = load_file(path, mode)?;
        let mut bank = Self::new();
        for (lineno, raw_line) in buffer.as_slice().split(|b| *b == b'\n').enumerate() {
            let line = strip_cr(raw_line);
            if line.is_empty() {
                continue;
            }
            let record: SenseRecord = serde_json::from_slice(line)
                .with_context(|| format!("{}:{} malformed sense record", path.display(), lineno + 1))?;
            bank.insert(record)
                .with_context(|| format!("{}:{} rejected sense record", path.display(), lineno + 1))?;
        }
        Ok(bank)
    }

    /// Insert one record, indexing its terms, keys, and taxonomy links.
    ///
    /// A record whose id repeats an existing one replaces the sense body but
    /// keeps the original insertion position.
    pub fn insert(&mut self, record: SenseRecord) -> Result<SenseId> {
        let id: SenseId = record
            .id
            .parse()
            .with_context(|| format!("sense id `{}` is not offset-pos form", record.id))?;
        anyhow::ensure!(!record.terms.is_empty(), "sense {} has no terms", record.id);

        let sense = Sense {
            id,
            terms: record.terms,
            sense_keys: record.keys,
            definition: record.definition,
            examples: record.examples,
            tagged_refs: record.tagged,
            tag_freq: record.freq,
        };

        for key in &sense.sense_keys {
            self.by_key.insert(key.clone(), id);
        }
        for term in &sense.terms {
            let entry = self.by_lemma.entry(normalize_lemma(term)).or_default();
            if !entry.contains(&id) {
                entry.push(id);
            }
        }
        self.hypernyms.insert(id, parse_links(&record.hypernyms)?);
        self.hyponyms.insert(id, parse_links(&record.hyponyms)?);

        if self.senses.insert(id, sense).is_none() {
            self.order.push(id);
        }
        Ok(id)
    }

    /// Number of senses in the bank.
    pub fn len(&self) -> usize {
        self.senses.len()
    }

    /// Whether the bank holds no senses.
    pub fn is_empty(&self) -> bool {
        self.senses.is_empty()
    }

    /// Number of distinct lemma keys indexed.
    pub fn lemma_count(&self) -> usize {
        self.by_lemma.len()
    }

    /// Number of sense keys indexed.
    pub fn sense_key_count(&self) -> usize {
        self.by_key.len()
    }

    /// Iterate over all senses in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Sense> {
        self.order.iter().filter_map(|id| self.senses.get(id))
    }

    fn collect(&self, ids: &[SenseId]) -> Vec<Sense> {
        ids.iter()
            .filter_map(|id| self.senses.get(id))
            .cloned()
            .collect()
    }
}

impl SenseStore for SenseBank {
    fn find_by_lemma(&self, lemma: &str, pos: Option<Pos>) -> Vec<Sense> {
        let Some(ids) = self.by_lemma.get(&normalize_lemma(lemma)) else {
            return Vec::new();
        };
        ids.iter()
            .filter_map(|id| self.senses.get(id))
            .filter(|sense| pos.is_none_or(|p| sense.id.pos == p))
            .cloned()
            .collect()
    }

    fn get(&self, id: &SenseId) -> Option<Sense> {
        self.senses.get(id).cloned()
    }

    fn get_by_sense_key(&self, key: &str) -> Option<Sense> {
        let id = self.by_key.get(key)?;
        self.senses.get(id).cloned()
    }

    fn hypernyms_and_hyponyms(&self, id: &SenseId) -> Vec<Sense> {
        let mut out = self
            .hypernyms
            .get(id)
            .map(|ids| self.collect(ids))
            .unwrap_or_default();
        if let Some(ids) = self.hyponyms.get(id) {
            out.extend(self.collect(ids));
        }
        out
    }

    fn tag_frequency(&self, id: &SenseId) -> u32 {
        self.senses.get(id).map(|s| s.tag_freq).unwrap_or(0)
    }

    fn sense_ids(&self) -> Vec<SenseId> {
        self.order.clone()
    }
}

fn load_file(path: &Path, mode: LoadMode) -> Result<Buffer> {
    match mode {
        LoadMode::Mmap => {
            let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
            unsafe { Mmap::map(&file) }
                .map(Buffer::Mmap)
                .with_context(|| format!("mmap {}", path.display()))
        }
        LoadMode::Owned => {
            let mut file = File::open(path).with_context(|| format!("open {}", path.display()))?;
            let mut buf = Vec::new();
            file.read_to_end(&mut buf)
                .with_context(|| format!("read {}", path.display()))?;
            Ok(Buffer::Owned(buf))
        }
    }
}

fn parse_links(idents: &[String]) -> Result<Vec<SenseId>> {
    idents
        .iter()
        .map(|ident| {
            ident
                .parse::<SenseId>()
                .or_else(|e| SenseId::from_wnsql(ident).ok_or(e))
                .with_context(|| format!("bad taxonomy link `{ident}`"))
        })
        .collect()
}

fn strip_cr(line: &[u8]) -> &[u8] {
    if line.ends_with(b"\r") {
        &line[..line.len() - 1]
    } else {
        line
    }
}

fn normalize_lemma(text: &str) -> String {
    text.trim().to_lowercase()
}
