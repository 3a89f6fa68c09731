use log::info;

use surpass_ff::{ByResidueEnergy, TotalEnergyByResidue};
use surpass_model::SurpassSystem;

use crate::isothermal::IsothermalMC;

/// Simulated annealing: an isothermal sampler driven through a descending temperature ladder.
///
/// Every temperature runs the full outer x inner x sweep schedule of the
/// wrapped sampler, carrying the system forward between segments; observers
/// registered at the sampler therefore see one contiguous trajectory.
pub struct SimulatedAnnealing {
    sampler: IsothermalMC,
    temperatures: Vec<f64>,
}

/// Builds a linearly descending temperature ladder, both ends inclusive.
pub fn annealing_temperatures(t_begin: f64, t_end: f64, n_steps: usize) -> Vec<f64> {
    if n_steps <= 1 { return vec![t_begin]; }
    let dt = (t_begin - t_end) / (n_steps - 1) as f64;
    (0..n_steps).map(|i| t_begin - dt * i as f64).collect()
}

impl SimulatedAnnealing {
    /// Wraps a sampler with a temperature schedule; the ladder must not be empty.
    pub fn new(sampler: IsothermalMC, temperatures: Vec<f64>) -> SimulatedAnnealing {
        assert!(!temperatures.is_empty(), "annealing requires at least one temperature");
        SimulatedAnnealing { sampler, temperatures }
    }

    /// The temperature ladder of this protocol
    pub fn temperatures(&self) -> &[f64] { &self.temperatures }

    /// The wrapped isothermal sampler
    pub fn sampler_mut(&mut self) -> &mut IsothermalMC { &mut self.sampler }

    /// Runs the whole annealing schedule on a system.
    pub fn run(&mut self, system: &mut SurpassSystem, energy: &TotalEnergyByResidue) {
        for &temperature in &self.temperatures {
            self.sampler.set_temperature(temperature);
            info!("annealing segment at T = {:.3}, energy: {:.3}",
                temperature, energy.calculate(system));
            self.sampler.run(system, energy);
        }
        self.sampler.flush_observers();
    }
}
