//! Sample command handler: print randomly chosen records.

use anyhow::Result;
use gutindex_core::{Collection, Record};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};

use super::catalog::load_catalog;
use crate::ProcessExit;
use crate::app::config_manager::ResolvedConfig;
use crate::cli::SampleArgs;

pub fn run_sample_command(args: &SampleArgs, resolved: &ResolvedConfig) -> Result<ProcessExit> {
    let loaded = load_catalog(args.catalog.as_deref(), resolved)?;
    let collection = &loaded.report.collection;

    if collection.is_empty() {
        if !args.json {
            println!("Catalog has no records to sample.");
        }
        return Ok(ProcessExit::Success);
    }

    for record in draw(collection, args.count, args.seed) {
        if args.json {
            println!("{}", serde_json::to_string(record)?);
        } else {
            println!("{record}");
        }
    }
    Ok(ProcessExit::Success)
}

/// Draws walk records in sorted order so a seed always picks the same records,
/// and the picks are printed in that order.
fn draw(collection: &Collection, count: usize, seed: Option<u64>) -> Vec<&Record> {
    match seed {
        Some(seed) => pick_sorted(collection, count, &mut StdRng::seed_from_u64(seed)),
        None => pick_sorted(collection, count, &mut rand::thread_rng()),
    }
}

fn pick_sorted<'a, R: Rng + ?Sized>(
    collection: &'a Collection,
    count: usize,
    rng: &mut R,
) -> Vec<&'a Record> {
    let sorted = collection.sorted();
    let amount = count.min(sorted.len());
    let mut picked = index::sample(rng, sorted.len(), amount).into_vec();
    picked.sort_unstable();
    picked.into_iter().map(|position| sorted[position]).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn collection(size: u32) -> Collection {
        let mut collection = Collection::new("test");
        for id in 1..=size {
            collection.insert(
                Record::builder(id.to_string())
                    .title(format!("Title {id}"))
                    .year(Some(2000))
                    .build()
                    .unwrap(),
            );
        }
        collection
    }

    #[test]
    fn test_seeded_draw_is_reproducible() {
        let first: Vec<String> = draw(&collection(50), 5, Some(42))
            .iter()
            .map(|record| record.identifier().to_string())
            .collect();
        let second: Vec<String> = draw(&collection(50), 5, Some(42))
            .iter()
            .map(|record| record.identifier().to_string())
            .collect();
        assert_eq!(first.len(), 5);
        assert_eq!(first, second);
    }

    #[test]
    fn test_draw_orders_identifiers_numerically() {
        let ids: Vec<String> = draw(&collection(12), 12, Some(7))
            .iter()
            .map(|record| record.identifier().to_string())
            .collect();
        let expected: Vec<String> = (1..=12).map(|id: u32| id.to_string()).collect();
        assert_eq!(ids, expected);

        let binding = collection(40);
        let partial = draw(&binding, 6, Some(3));
        let positions: Vec<u32> = partial
            .iter()
            .map(|record| record.identifier().parse().unwrap())
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_draw_clamps_to_collection_size() {
        assert_eq!(draw(&collection(3), 10, None).len(), 3);
        assert_eq!(draw(&collection(3), 10, Some(1)).len(), 3);
    }
}
