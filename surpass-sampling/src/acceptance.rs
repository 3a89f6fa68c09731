use rand::rngs::SmallRng;
use rand::Rng;

/// Counts how many system perturbations were successful.
///
/// Each Monte Carlo [`Mover`](crate::Mover) keeps an [`AcceptanceStatistics`]
/// and updates its counters according to the outcome of every `perturb()` call.
/// The total number of attempted moves is `n_succ + n_failed`.
#[derive(Clone, Debug, Default)]
pub struct AcceptanceStatistics {
    /// number of successful perturbations
    pub n_succ: i64,
    /// number of failures
    pub n_failed: i64,
}

impl AcceptanceStatistics {
    /// The overall success rate of a Markov chain: `n_succ / (n_succ + n_failed)`
    pub fn success_rate(&self) -> f64 {
        let sum = self.n_succ + self.n_failed;
        if sum == 0 { return 0.0; }
        self.n_succ as f64 / sum as f64
    }

    /// The success rate since the given point in a simulation.
    ///
    /// Only the observations made after `prev_stats` were recorded contribute.
    pub fn recent_success_rate(&self, prev_stats: &AcceptanceStatistics) -> f64 {
        let succ = self.n_succ - prev_stats.n_succ;
        let fail = self.n_failed - prev_stats.n_failed;
        let sum = succ + fail;
        if sum == 0 { return 0.0; }
        succ as f64 / sum as f64
    }
}

/// Classical Metropolis acceptance criterion.
///
/// A move is accepted when the energy does not increase, or with probability
/// `exp(-dE / T)` otherwise. The temperature is expressed in the units of the
/// Boltzmann constant. The random stream is supplied by the caller so a
/// simulation stays reproducible for a given seed.
#[derive(Clone, Debug)]
pub struct MetropolisCriterion {
    pub temperature: f64,
}

impl MetropolisCriterion {
    pub fn new(temperature: f64) -> MetropolisCriterion { MetropolisCriterion { temperature } }

    /// Decides whether a move changing the energy from `energy_before` to `energy_after` is accepted.
    pub fn check(&self, energy_before: f64, energy_after: f64, rng: &mut SmallRng) -> bool {
        if energy_after <= energy_before { return true; }
        let delta_e = energy_after - energy_before;
        rng.gen_range(0.0..1.0) < (-delta_e / self.temperature).exp()
    }
}
