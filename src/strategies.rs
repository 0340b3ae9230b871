//! Curated fallback corpus
//!
//! The authentic Oblique Strategies served when the model is unavailable or
//! its output is unusable. Loaded once at startup and never mutated.

use crate::prompts::starts_with_banned;
use crate::{Error, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;

const BUILTIN: &str = include_str!("../data/strategies.json");

#[derive(Debug, Deserialize)]
struct StrategyList(Vec<String>);

#[derive(Debug, Clone)]
pub struct CuratedStrategies {
    entries: Vec<String>,
}

impl CuratedStrategies {
    /// Parse the embedded corpus.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let list: StrategyList = serde_json::from_str(json)?;
        Self::new(list.0)
    }

    /// Keeps only entries that may be served: non-empty and not opening with a
    /// banned starter. Fails when nothing is left.
    pub fn new(entries: Vec<String>) -> Result<Self> {
        let entries: Vec<String> = entries
            .into_iter()
            .map(|entry| entry.trim().to_string())
            .filter(|entry| !entry.is_empty() && !starts_with_banned(entry))
            .collect();

        if entries.is_empty() {
            return Err(Error::Config(
                "Curated strategy list has no usable entries".to_string(),
            ));
        }

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        self.entries
            .choose(rng)
            .cloned()
            .unwrap_or_default()
    }

    /// `count` entries in random order, distinct until the corpus runs out.
    pub fn sample<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<String> {
        let mut picked = Vec::with_capacity(count);
        while picked.len() < count {
            let remaining = count - picked.len();
            picked.extend(
                self.entries
                    .choose_multiple(rng, remaining.min(self.entries.len()))
                    .cloned(),
            );
        }
        picked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_corpus_loads() {
        let curated = CuratedStrategies::builtin().unwrap();
        assert!(curated.len() >= 30);
        assert!(curated.entries().contains(&"Honor thy error as a hidden intention".to_string()));
    }

    #[test]
    fn test_banned_openers_are_filtered() {
        let curated = CuratedStrategies::builtin().unwrap();
        assert!(curated.entries().iter().all(|e| !starts_with_banned(e)));
        assert!(!curated.entries().contains(&"Use an old idea".to_string()));
    }

    #[test]
    fn test_new_rejects_unusable_list() {
        let err = CuratedStrategies::new(vec!["Try fasting".to_string(), "  ".to_string()])
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_sample_is_distinct_within_corpus_size() {
        let curated = CuratedStrategies::builtin().unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        let sample = curated.sample(5, &mut rng);
        assert_eq!(sample.len(), 5);
        assert_eq!(sample.iter().collect::<HashSet<_>>().len(), 5);
    }

    #[test]
    fn test_sample_wraps_when_asking_for_more_than_available() {
        let curated =
            CuratedStrategies::new(vec!["Take a break".to_string(), "Do the washing up".to_string()])
                .unwrap();
        let mut rng = StdRng::seed_from_u64(3);

        let sample = curated.sample(5, &mut rng);
        assert_eq!(sample.len(), 5);
    }

    #[test]
    fn test_choose_is_deterministic_for_seed() {
        let curated = CuratedStrategies::builtin().unwrap();
        let a = curated.choose(&mut StdRng::seed_from_u64(9));
        let b = curated.choose(&mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }
}
