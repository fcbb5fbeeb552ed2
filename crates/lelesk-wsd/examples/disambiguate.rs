use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use lelesk_wsd::{Pos, SenseBank, SqliteTokenCache, WsdEngine};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    init_tracing();

    let mut args = env::args().skip(1);
    let usage = "usage: cargo run -p lelesk-wsd --example disambiguate -- \
                 <senses.jsonl> <word> <sentence> [pos]";
    let bank_path = args.next().map(PathBuf::from).context(usage)?;
    let word = args.next().context(usage)?;
    let sentence = args.next().context(usage)?;
    let pos = match args.next() {
        Some(p) => {
            let c = p.chars().next().context("empty pos argument")?;
            Some(Pos::from_char(c).with_context(|| format!("unknown pos '{p}'"))?)
        }
        None => None,
    };

    let start = Instant::now();
    let bank = Arc::new(
        SenseBank::load(&bank_path)
            .with_context(|| format!("loading senses from {}", bank_path.display()))?,
    );
    info!(
        "loaded {} senses ({} lemmas) in {} ms",
        bank.len(),
        bank.lemma_count(),
        start.elapsed().as_millis()
    );

    let mut engine = WsdEngine::from_bank(bank);
    if let Ok(db) = env::var("LELESK_CACHE_DB") {
        let cache = SqliteTokenCache::open(&db)
            .with_context(|| format!("opening token cache at {db}"))?;
        info!("using token cache at {db}");
        engine = engine.with_cache(Box::new(cache));
    }

    println!("== overlap ranking ==");
    let ranked = engine.lelesk_wsd(&word, &sentence, pos, None);
    print_ranking(&ranked);

    println!("== frequency baseline ==");
    let baseline = engine.mfs_wsd(&word, &sentence, pos);
    print_ranking(&baseline);

    Ok(())
}

fn print_ranking(ranked: &[lelesk_wsd::ScoredCandidate]) {
    if ranked.is_empty() {
        println!("(no candidates)");
        return;
    }
    for sc in ranked {
        println!(
            "{:>3}. {}  score={} freq={}  [{}]  {}",
            sc.candidate.ordinal,
            sc.candidate.sense.id,
            sc.score,
            sc.freq,
            sc.candidate.sense.terms.join(", "),
            sc.candidate.sense.definition
        );
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();
}
