use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, info, warn};

use lelesk_cache::TokenSetCache;
use lelesk_morph::{EnglishAnalyzer, Lemmatizer, Stopwords, TextAnalyzer};
use lelesk_store::{SenseBank, SenseStore};
use lelesk_types::{Pos, ScoredCandidate, Sense, SenseId, WsdCandidate};

use crate::context::prepare_context;
use crate::score::{lelesk_rank, mfs_rank};

/// How many hops of tagged-reference expansion to follow from the base
/// sense. The algorithm is defined for exactly one hop: references found
/// inside a referenced sense's gloss are not followed further, which bounds
/// the traversal.
pub const EXPANSION_DEPTH: usize = 1;

/// Extended-LESK disambiguation engine.
///
/// Owns its memoization tables (word+POS to candidate list, sense id to
/// expansion tokens) for the lifetime of the instance; the durable token-set
/// cache is an injected collaborator.
/// All operations are synchronous and take `&self`, so one engine can be
/// shared behind an [`Arc`].
pub struct WsdEngine {
    store: Arc<dyn SenseStore + Send + Sync>,
    analyzer: Box<dyn TextAnalyzer + Send + Sync>,
    cache: Option<Box<dyn TokenSetCache>>,
    candidates: DashMap<(String, Option<Pos>), Vec<WsdCandidate>>,
    expansions: DashMap<SenseId, Vec<String>>,
}

impl WsdEngine {
    /// Build an engine from an explicit store and analyzer, with no durable
    /// cache.
    pub fn new(
        store: Arc<dyn SenseStore + Send + Sync>,
        analyzer: Box<dyn TextAnalyzer + Send + Sync>,
    ) -> Self {
        Self {
            store,
            analyzer,
            cache: None,
            candidates: DashMap::new(),
            expansions: DashMap::new(),
        }
    }

    /// Convenience constructor: an [`EnglishAnalyzer`] whose lemma existence
    /// predicate is backed by the bank itself.
    pub fn from_bank(bank: Arc<SenseBank>) -> Self {
        let exists = {
            let bank = Arc::clone(&bank);
            move |pos: Pos, lemma: &str| !bank.find_by_lemma(lemma, Some(pos)).is_empty()
        };
        let analyzer = EnglishAnalyzer::new(Lemmatizer::empty(), Stopwords::english(), exists);
        Self::new(bank, Box::new(analyzer))
    }

    /// Attach a durable token-set cache (read-through, write-through).
    pub fn with_cache(mut self, cache: Box<dyn TokenSetCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Prepare a context bag from raw sentence text.
    pub fn prepare(&self, text: &str) -> HashSet<String> {
        prepare_context(self.analyzer.as_ref(), text)
    }

    /// Retrieve the candidate senses for a lemma, each with its expansion
    /// token set attached. Ordinals are 1-based in store retrieval order.
    ///
    /// An unknown lemma yields an empty list. A hyphenated lemma with no
    /// direct match is retried once with hyphens replaced by spaces; a second
    /// empty result is final. Results are memoized per engine instance.
    pub fn find_candidates(&self, lemma: &str, pos: Option<Pos>) -> Vec<WsdCandidate> {
        let key = (lemma.to_string(), pos);
        if let Some(hit) = self.candidates.get(&key) {
            return hit.clone();
        }

        let senses = self.smart_search(lemma, pos);
        debug!(lemma, ?pos, count = senses.len(), "retrieved candidate senses");
        let built: Vec<WsdCandidate> = senses
            .into_iter()
            .enumerate()
            .map(|(idx, sense)| {
                let tokens = self.build_lelesk_set(&sense.id);
                WsdCandidate {
                    ordinal: idx + 1,
                    sense,
                    tokens,
                }
            })
            .collect();
        self.candidates.insert(key, built.clone());
        built
    }

    /// Disambiguate `word` in `sentence_text`, ranking candidates descending
    /// by `(overlap, frequency)`.
    ///
    /// A caller-supplied `context` bag bypasses context preparation and is
    /// trusted as already normalized.
    pub fn lelesk_wsd(
        &self,
        word: &str,
        sentence_text: &str,
        pos: Option<Pos>,
        context: Option<&[String]>,
    ) -> Vec<ScoredCandidate> {
        let candidates = self.find_candidates(word, pos);
        let context_set: HashSet<String> = match context {
            Some(tokens) => tokens.iter().cloned().collect(),
            None => self.prepare(sentence_text),
        };
        debug!(word, ?pos, context = ?context_set, "ranking by lexical overlap");
        lelesk_rank(&candidates, &context_set)
    }

    /// Most-frequent-sense baseline: rank candidates by corpus frequency
    /// alone, independent of any context.
    pub fn mfs_wsd(&self, word: &str, sentence_text: &str, pos: Option<Pos>) -> Vec<ScoredCandidate> {
        let _ = sentence_text;
        let candidates = self.find_candidates(word, pos);
        debug!(word, ?pos, "ranking by frequency only");
        mfs_rank(&candidates)
    }

    /// Compute the expansion token set for one sense id.
    ///
    /// Consults the instance memo and then the durable cache (a non-empty
    /// entry is returned verbatim); otherwise expands the sense's
    /// neighborhood, deduplicates, and writes the result through. An
    /// unresolvable id yields an empty set.
    pub fn build_lelesk_set(&self, id: &SenseId) -> Vec<String> {
        if let Some(hit) = self.expansions.get(id) {
            return hit.clone();
        }
        if let Some(cache) = &self.cache {
            match cache.get(id) {
                Ok(Some(tokens)) => {
                    debug!(%id, count = tokens.len(), "expansion served from cache");
                    self.expansions.insert(*id, tokens.clone());
                    return tokens;
                }
                Ok(None) => {}
                Err(e) => warn!(%id, error = %e, "cache read failed; recomputing"),
            }
        }

        let Some(base) = self.store.get(id) else {
            debug!(%id, "sense id not found in store");
            return Vec::new();
        };

        let mut gathered = Vec::new();
        self.collect_sense_tokens(&base, &mut gathered);

        // Tagged references: senses mentioned inside the gloss, followed for
        // EXPANSION_DEPTH hops.
        let mut frontier = vec![base.clone()];
        for _ in 0..EXPANSION_DEPTH {
            let mut next = Vec::new();
            for sense in &frontier {
                for key in &sense.tagged_refs {
                    match self.store.resolve(key) {
                        Some(referenced) => next.push(referenced),
                        None => debug!(%id, key, "gloss reference did not resolve; skipped"),
                    }
                }
            }
            for sense in &next {
                self.collect_sense_tokens(sense, &mut gathered);
            }
            frontier = next;
        }

        // Taxonomy neighborhood: hypernyms and hyponyms of the base sense
        // only, one hop.
        for neighbor in self.store.hypernyms_and_hyponyms(&base.id) {
            self.collect_sense_tokens(&neighbor, &mut gathered);
        }

        let mut seen = HashSet::new();
        let tokens: Vec<String> = gathered
            .into_iter()
            .filter(|token| !self.analyzer.is_stopword(token))
            .filter(|token| seen.insert(token.clone()))
            .collect();

        if let Some(cache) = &self.cache
            && let Err(e) = cache.put(id, &tokens)
        {
            warn!(%id, error = %e, "cache write failed; continuing uncached");
        }
        self.expansions.insert(*id, tokens.clone());
        tokens
    }

    /// Precompute and persist the expansion set of every sense in the store.
    /// Returns the number of senses processed.
    pub fn warm_cache(&self) -> usize {
        let ids = self.store.sense_ids();
        info!(total = ids.len(), "warming token-set cache");
        for id in &ids {
            self.build_lelesk_set(id);
        }
        ids.len()
    }

    fn smart_search(&self, lemma: &str, pos: Option<Pos>) -> Vec<Sense> {
        let senses = self.store.find_by_lemma(lemma, pos);
        if senses.is_empty() && lemma.contains('-') {
            let respaced = lemma.replace('-', " ");
            debug!(lemma, respaced, "no direct match; retrying hyphen variant");
            return self.store.find_by_lemma(&respaced, pos);
        }
        senses
    }

    /// Terms plus gloss content words, lowercased, stopwords removed.
    fn collect_sense_tokens(&self, sense: &Sense, out: &mut Vec<String>) {
        for term in &sense.terms {
            out.push(term.to_lowercase());
        }
        for gloss in sense.gloss_texts() {
            for token in self.analyzer.tokenize(gloss) {
                let token = token.to_lowercase();
                if !self.analyzer.is_stopword(&token) {
                    out.push(token);
                }
            }
        }
    }
}
