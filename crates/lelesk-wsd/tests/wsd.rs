use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use lelesk_store::{SenseBank, SenseRecord, SenseStore};
use lelesk_types::{Pos, Sense, SenseId};
use lelesk_wsd::{SqliteTokenCache, TokenSetCache, WsdEngine};

fn record(id: &str, terms: &[&str], definition: &str) -> SenseRecord {
    SenseRecord {
        id: id.into(),
        terms: terms.iter().map(|t| t.to_string()).collect(),
        definition: definition.into(),
        ..SenseRecord::default()
    }
}

/// A miniature sense network around "fish", mirroring the WordNet
/// neighborhood the reference behavior is documented against.
fn fish_bank() -> Arc<SenseBank> {
    let mut bank = SenseBank::new();

    let mut fish = record(
        "02512053-n",
        &["fish"],
        "any of various mostly cold-blooded aquatic vertebrates usually having scales and breathing through gills",
    );
    fish.keys = vec!["fish%1:05:00::".into()];
    fish.freq = 12;
    fish.tagged = vec!["aquatic%3:00:00::".into(), "gill%1:08:00::".into()];
    fish.hypernyms = vec!["01471682-n".into()];
    fish.hyponyms = vec!["02512938-n".into()];
    bank.insert(fish).unwrap();

    let mut food_fish = record("07775375-n", &["fish"], "the flesh of fish used as food");
    food_fish.freq = 2;
    bank.insert(food_fish).unwrap();

    bank.insert(record("09755555-n", &["Fish"], "the twelfth sign of the zodiac"))
        .unwrap();

    let mut fish_verb = record("01441100-v", &["fish", "angle"], "seek indirectly");
    fish_verb.freq = 1;
    bank.insert(fish_verb).unwrap();

    let mut aquatic = record("02550868-a", &["aquatic"], "operating or living or growing in water");
    aquatic.keys = vec!["aquatic%3:00:00::".into()];
    bank.insert(aquatic).unwrap();

    let mut gill = record(
        "05254795-n",
        &["gill"],
        "respiratory organ of aquatic animals that breathe water",
    );
    gill.keys = vec!["gill%1:08:00::".into()];
    bank.insert(gill).unwrap();

    bank.insert(record(
        "01471682-n",
        &["aquatic vertebrate"],
        "animal living wholly or chiefly in or on water",
    ))
    .unwrap();

    let mut freshwater = record(
        "02512938-n",
        &["freshwater fish"],
        "fish that live in lakes and streams or in a river",
    );
    freshwater.hypernyms = vec!["02512053-n".into()];
    bank.insert(freshwater).unwrap();

    bank.insert(record("00824767-n", &["Ali Baba"], "the fictional woodcutter"))
        .unwrap();

    Arc::new(bank)
}

fn top_id(scored: &[lelesk_types::ScoredCandidate]) -> String {
    scored[0].candidate.sense.id.to_string()
}

#[test]
fn fish_in_the_river_end_to_end() {
    let engine = WsdEngine::from_bank(fish_bank());
    let ranked = engine.lelesk_wsd("fish", "there are so many fish in the river", Some(Pos::Noun), None);

    assert_eq!(top_id(&ranked), "02512053-n");
    assert_eq!(ranked[0].score, 2);
    assert_eq!(ranked[0].freq, 12);
}

#[test]
fn caller_supplied_context_bypasses_preparation() {
    let engine = WsdEngine::from_bank(fish_bank());
    let context: Vec<String> = "there are so many fish in the river"
        .split_whitespace()
        .map(|w| w.to_string())
        .collect();
    let ranked = engine.lelesk_wsd("fish", "", Some(Pos::Noun), Some(&context));

    assert_eq!(top_id(&ranked), "02512053-n");
    assert_eq!(ranked[0].score, 2);
}

#[test]
fn prepared_context_drops_stopwords() {
    let engine = WsdEngine::from_bank(fish_bank());
    let bag = engine.prepare("there are so many fish in the river");
    let expected: HashSet<String> = ["many", "fish", "river"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(bag, expected);
}

#[test]
fn candidates_carry_ordinals_in_store_order() {
    let engine = WsdEngine::from_bank(fish_bank());
    let candidates = engine.find_candidates("fish", Some(Pos::Noun));
    assert_eq!(candidates.len(), 3);
    let ordinals: Vec<usize> = candidates.iter().map(|c| c.ordinal).collect();
    assert_eq!(ordinals, vec![1, 2, 3]);
    assert_eq!(candidates[0].sense.id.to_string(), "02512053-n");
}

#[test]
fn pos_filter_none_means_any() {
    let engine = WsdEngine::from_bank(fish_bank());
    assert_eq!(engine.find_candidates("fish", None).len(), 4);
    assert_eq!(engine.find_candidates("fish", Some(Pos::Verb)).len(), 1);
}

#[test]
fn unknown_lemma_is_empty_not_an_error() {
    let engine = WsdEngine::from_bank(fish_bank());
    assert!(engine.find_candidates("doesnotexist", None).is_empty());
    assert!(engine.lelesk_wsd("doesnotexist", "some sentence", None, None).is_empty());
    assert!(engine.mfs_wsd("doesnotexist", "some sentence", None).is_empty());
}

#[test]
fn hyphenated_lemma_retries_with_spaces() {
    let engine = WsdEngine::from_bank(fish_bank());
    let candidates = engine.find_candidates("Ali-Baba", Some(Pos::Noun));
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].sense.id.to_string(), "00824767-n");
}

#[test]
fn ranking_is_deterministic() {
    let engine = WsdEngine::from_bank(fish_bank());
    let first = engine.lelesk_wsd("fish", "there are so many fish in the river", Some(Pos::Noun), None);
    let second = engine.lelesk_wsd("fish", "there are so many fish in the river", Some(Pos::Noun), None);
    assert_eq!(first, second);
}

#[test]
fn mfs_ranking_is_context_independent() {
    let engine = WsdEngine::from_bank(fish_bank());
    let a = engine.mfs_wsd("fish", "there are so many fish in the river", Some(Pos::Noun));
    let b = engine.mfs_wsd("fish", "we grilled the fish for dinner", Some(Pos::Noun));
    assert_eq!(a, b);
    assert_eq!(top_id(&a), "02512053-n");
    assert_eq!(a[0].score, 12);
    assert_eq!(a[0].freq, 12);

    // The overlap ranking, by contrast, does react to context.
    let river = engine.lelesk_wsd("fish", "there are so many fish in the river", Some(Pos::Noun), None);
    let food = engine.lelesk_wsd("fish", "the flesh was served as food", Some(Pos::Noun), None);
    assert_ne!(river, food);
}

#[test]
fn expansion_stays_within_one_hop() {
    let mut bank = SenseBank::new();
    let mut alpha = record("00000001-n", &["alpha"], "the first marker");
    alpha.tagged = vec!["beta%1:00:00::".into()];
    bank.insert(alpha).unwrap();
    let mut beta = record("00000002-n", &["beta"], "the second marker");
    beta.keys = vec!["beta%1:00:00::".into()];
    beta.tagged = vec!["gamma%1:00:00::".into()];
    bank.insert(beta).unwrap();
    let mut gamma = record("00000003-n", &["gamma"], "the zenith marker");
    gamma.keys = vec!["gamma%1:00:00::".into()];
    bank.insert(gamma).unwrap();

    let engine = WsdEngine::from_bank(Arc::new(bank));
    let tokens = engine.build_lelesk_set(&"00000001-n".parse().unwrap());

    assert!(tokens.contains(&"beta".to_string()), "one hop included");
    assert!(!tokens.contains(&"gamma".to_string()), "two hops excluded");
    assert!(!tokens.contains(&"zenith".to_string()), "two-hop gloss excluded");
}

#[test]
fn expansion_tokens_are_deduplicated_and_stopword_free() {
    let engine = WsdEngine::from_bank(fish_bank());
    let tokens = engine.build_lelesk_set(&"02512053-n".parse().unwrap());

    let unique: HashSet<&String> = tokens.iter().collect();
    assert_eq!(unique.len(), tokens.len(), "no duplicates");
    assert!(!tokens.iter().any(|t| t == "the" || t == "of" || t == "in"));
    // Own terms and gloss, tagged references, and taxonomy neighbors all land.
    for expected in ["fish", "gills", "aquatic", "gill", "freshwater fish", "river"] {
        assert!(tokens.contains(&expected.to_string()), "missing {expected}");
    }
}

#[test]
fn unresolved_sense_id_expands_to_empty() {
    let engine = WsdEngine::from_bank(fish_bank());
    assert!(engine.build_lelesk_set(&"99999999-n".parse().unwrap()).is_empty());
}

#[test]
fn unresolved_gloss_reference_is_skipped_not_fatal() {
    let mut bank = SenseBank::new();
    let mut lone = record("00000010-n", &["lone"], "a solitary marker");
    lone.tagged = vec!["missing%1:00:00::".into()];
    bank.insert(lone).unwrap();

    let engine = WsdEngine::from_bank(Arc::new(bank));
    let tokens = engine.build_lelesk_set(&"00000010-n".parse().unwrap());
    assert_eq!(tokens, vec!["lone", "solitary", "marker"]);
}

#[test]
fn cache_round_trip_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lesk_cache.db");
    let id: SenseId = "02512053-n".parse().unwrap();

    let fresh = {
        let engine = WsdEngine::from_bank(fish_bank())
            .with_cache(Box::new(SqliteTokenCache::open(&path).unwrap()));
        engine.build_lelesk_set(&id)
    };
    assert!(!fresh.is_empty());

    // A new engine over the same durable cache must serve the same set.
    let engine = WsdEngine::from_bank(fish_bank())
        .with_cache(Box::new(SqliteTokenCache::open(&path).unwrap()));
    let cached = engine.build_lelesk_set(&id);
    assert_eq!(fresh, cached);

    let fresh_set: HashSet<&String> = fresh.iter().collect();
    let cached_set: HashSet<&String> = cached.iter().collect();
    assert_eq!(fresh_set, cached_set);
}

#[test]
fn warm_cache_covers_every_sense() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lesk_cache.db");
    let bank = fish_bank();
    let total = bank.len();

    {
        let engine = WsdEngine::from_bank(Arc::clone(&bank))
            .with_cache(Box::new(SqliteTokenCache::open(&path).unwrap()));
        assert_eq!(engine.warm_cache(), total);
    }

    let cache = SqliteTokenCache::open(&path).unwrap();
    assert_eq!(cache.len().unwrap(), total);
}

/// Wrapper that counts lemma lookups so memoization is observable.
struct CountingStore {
    inner: Arc<SenseBank>,
    lemma_lookups: AtomicUsize,
}

impl SenseStore for CountingStore {
    fn find_by_lemma(&self, lemma: &str, pos: Option<Pos>) -> Vec<Sense> {
        self.lemma_lookups.fetch_add(1, Ordering::Relaxed);
        self.inner.find_by_lemma(lemma, pos)
    }

    fn get(&self, id: &SenseId) -> Option<Sense> {
        self.inner.get(id)
    }

    fn get_by_sense_key(&self, key: &str) -> Option<Sense> {
        self.inner.get_by_sense_key(key)
    }

    fn hypernyms_and_hyponyms(&self, id: &SenseId) -> Vec<Sense> {
        self.inner.hypernyms_and_hyponyms(id)
    }

    fn tag_frequency(&self, id: &SenseId) -> u32 {
        self.inner.tag_frequency(id)
    }

    fn sense_ids(&self) -> Vec<SenseId> {
        self.inner.sense_ids()
    }
}

#[test]
fn candidate_lists_are_memoized_per_engine() {
    let counting = Arc::new(CountingStore {
        inner: fish_bank(),
        lemma_lookups: AtomicUsize::new(0),
    });
    let engine = WsdEngine::new(
        Arc::clone(&counting) as Arc<dyn SenseStore + Send + Sync>,
        Box::new(lelesk_wsd::EnglishAnalyzer::permissive()),
    );

    let first = engine.find_candidates("fish", Some(Pos::Noun));
    let after_first = counting.lemma_lookups.load(Ordering::Relaxed);
    let second = engine.find_candidates("fish", Some(Pos::Noun));
    let after_second = counting.lemma_lookups.load(Ordering::Relaxed);

    assert_eq!(first, second);
    assert_eq!(after_first, after_second, "second call served from memo");
}
