use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use lelesk_store::{LoadMode, SenseBank, SenseStore};
use lelesk_types::Pos;

fn main() -> Result<()> {
    let bank_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: cargo run -p lelesk-store --example stats -- <path-to-senses.jsonl>")?;

    let bank = SenseBank::load_with_mode(&bank_path, LoadMode::Mmap)
        .with_context(|| format!("loading sense bank from {}", bank_path.display()))?;

    let mut term_count = 0usize;
    let mut tagged_ref_count = 0usize;
    let mut example_count = 0usize;
    let mut tagged_senses = 0usize;

    for sense in bank.iter() {
        term_count += sense.terms.len();
        tagged_ref_count += sense.tagged_refs.len();
        example_count += sense.examples.len();
        if sense.tag_freq > 0 {
            tagged_senses += 1;
        }
    }

    println!("Sense bank : {}", bank_path.display());
    println!("Senses     : {}", bank.len());
    println!("Lemma keys : {}", bank.lemma_count());
    println!("Sense keys : {}", bank.sense_key_count());
    println!("Terms      : {term_count}");
    println!("Gloss refs : {tagged_ref_count}");
    println!("Examples   : {example_count}");
    println!("Senses with corpus frequency: {tagged_senses}");

    // Spot-check a couple of lemmas to confirm lookup.
    for (pos, lemma) in [(Pos::Noun, "fish"), (Pos::Verb, "run")] {
        println!(
            "Lemma '{}' ({:?}) senses: {}",
            lemma,
            pos,
            bank.find_by_lemma(lemma, Some(pos)).len()
        );
    }

    Ok(())
}
