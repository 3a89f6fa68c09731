use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::SmallRng;

use crate::movers::Mover;

/// Holds the movers of a sampler together with their sampling weights.
///
/// During a sweep every proposal picks a mover with probability proportional
/// to its weight. Weights are conventionally set so that each mover is
/// proposed roughly once per residue per sweep, e.g. `N` for a single-residue
/// mover and `N / n` for a mover of `n`-residue fragments.
pub struct MoversSet {
    movers: Vec<Box<dyn Mover>>,
    weights: Vec<f64>,
    sampler: Option<WeightedIndex<f64>>,
}

impl MoversSet {
    pub fn new() -> MoversSet {
        MoversSet { movers: Vec::new(), weights: Vec::new(), sampler: None }
    }

    /// Adds a mover with a given sampling weight
    pub fn add_mover(&mut self, mover: Box<dyn Mover>, weight: f64) {
        assert!(weight > 0.0, "mover weights must be positive");
        self.movers.push(mover);
        self.weights.push(weight);
        self.sampler = Some(WeightedIndex::new(self.weights.clone()).unwrap());
    }

    /// Counts movers contained in this set
    pub fn count_movers(&self) -> usize { self.movers.len() }

    /// Immutable access to a mover
    pub fn get_mover(&self, which_one: usize) -> &Box<dyn Mover> { &self.movers[which_one] }

    /// Mutable access to a mover
    pub fn get_mover_mut(&mut self, which_one: usize) -> &mut Box<dyn Mover> {
        &mut self.movers[which_one]
    }

    /// Draws the index of a mover with probability proportional to its weight
    pub fn choose(&self, rng: &mut SmallRng) -> usize {
        let sampler = self.sampler.as_ref().expect("no movers registered in this MoversSet");
        sampler.sample(rng)
    }
}

impl Default for MoversSet {
    fn default() -> Self { Self::new() }
}
