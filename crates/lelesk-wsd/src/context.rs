//! Context preparation: raw sentence text to a normalized word bag.

use std::collections::HashSet;

use lelesk_morph::TextAnalyzer;

/// Turn sentence text into a deduplicated, stopword-free bag of lowercased
/// surface forms and their lemmas.
///
/// Empty input yields an empty set. Callers that already hold a normalized
/// context bag can skip this stage entirely.
pub fn prepare_context(analyzer: &dyn TextAnalyzer, text: &str) -> HashSet<String> {
    let mut bag = HashSet::new();
    for token in analyzer.tokenize(text) {
        let surface = token.to_lowercase();
        for lemma in analyzer.lemma_variants(&surface, None) {
            if !analyzer.is_stopword(&lemma) {
                bag.insert(lemma.to_lowercase());
            }
        }
        if !analyzer.is_stopword(&surface) {
            bag.insert(surface);
        }
    }
    bag
}
