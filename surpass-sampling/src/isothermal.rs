use log::debug;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use surpass_ff::TotalEnergyByResidue;
use surpass_model::SurpassSystem;

use crate::acceptance::MetropolisCriterion;
use crate::evaluators::Evaluator;
use crate::movers_set::MoversSet;
use crate::observers::Observer;

/// Isothermal Monte Carlo sampler.
///
/// A run makes `outer_cycles` outer cycles of `inner_cycles` inner cycles;
/// each inner cycle attempts `cycle_size * N` proposal/decision steps where
/// `N` is the number of beads. Proposals are drawn from the movers set with
/// probability proportional to the movers' weights. After every inner cycle
/// the inner-cycle evaluators and observers are dispatched in registration
/// order; outer cycles dispatch the outer-cycle lists the same way.
pub struct IsothermalMC {
    criterion: MetropolisCriterion,
    movers: MoversSet,
    rng: SmallRng,
    n_inner_cycles: usize,
    n_outer_cycles: usize,
    n_cycle_size: usize,
    evaluate_every_inner_cycle: Vec<Box<dyn Evaluator>>,
    evaluate_every_outer_cycle: Vec<Box<dyn Evaluator>>,
    observe_every_inner_cycle: Vec<Box<dyn Observer>>,
    observe_every_outer_cycle: Vec<Box<dyn Observer>>,
}

impl IsothermalMC {
    /// Creates a sampler at a given temperature.
    ///
    /// The seed starts this sampler's private random stream, which keeps
    /// a simulation reproducible also when several samplers run concurrently
    /// under the replica exchange driver.
    pub fn new(temperature: f64, seed: u64) -> IsothermalMC {
        IsothermalMC {
            criterion: MetropolisCriterion::new(temperature),
            movers: MoversSet::new(),
            rng: SmallRng::seed_from_u64(seed),
            n_inner_cycles: 1,
            n_outer_cycles: 1,
            n_cycle_size: 1,
            evaluate_every_inner_cycle: Vec::new(),
            evaluate_every_outer_cycle: Vec::new(),
            observe_every_inner_cycle: Vec::new(),
            observe_every_outer_cycle: Vec::new(),
        }
    }

    /// Temperature of this simulation
    pub fn temperature(&self) -> f64 { self.criterion.temperature }

    /// Sets a new temperature; used by annealing and replica exchange protocols
    pub fn set_temperature(&mut self, temperature: f64) { self.criterion.temperature = temperature; }

    /// Sets the cycle counts of a single `run()` call
    pub fn cycles(&mut self, inner_cycles: usize, outer_cycles: usize, cycle_size: usize) {
        self.n_inner_cycles = inner_cycles;
        self.n_outer_cycles = outer_cycles;
        self.n_cycle_size = cycle_size;
    }

    pub fn inner_cycles(&self) -> usize { self.n_inner_cycles }

    pub fn outer_cycles(&self) -> usize { self.n_outer_cycles }

    pub fn cycle_size(&self) -> usize { self.n_cycle_size }

    /// The movers of this sampler
    pub fn movers(&self) -> &MoversSet { &self.movers }

    /// Mutable access to the movers of this sampler
    pub fn movers_mut(&mut self) -> &mut MoversSet { &mut self.movers }

    /// Registers an evaluator called after every inner cycle
    pub fn inner_cycle_evaluator(&mut self, e: Box<dyn Evaluator>) {
        self.evaluate_every_inner_cycle.push(e);
    }

    /// Registers an evaluator called after every outer cycle
    pub fn outer_cycle_evaluator(&mut self, e: Box<dyn Evaluator>) {
        self.evaluate_every_outer_cycle.push(e);
    }

    /// Registers an observer called after every inner cycle
    pub fn inner_cycle_observer(&mut self, o: Box<dyn Observer>) {
        self.observe_every_inner_cycle.push(o);
    }

    /// Registers an observer called after every outer cycle
    pub fn outer_cycle_observer(&mut self, o: Box<dyn Observer>) {
        self.observe_every_outer_cycle.push(o);
    }

    /// The inner-cycle observers, in registration order
    pub fn inner_cycle_observers_mut(&mut self) -> &mut Vec<Box<dyn Observer>> {
        &mut self.observe_every_inner_cycle
    }

    /// The outer-cycle observers, in registration order
    pub fn outer_cycle_observers_mut(&mut self) -> &mut Vec<Box<dyn Observer>> {
        &mut self.observe_every_outer_cycle
    }

    /// Runs the full sampling protocol on a system.
    pub fn run(&mut self, system: &mut SurpassSystem, energy: &TotalEnergyByResidue) {
        let sweep_steps = self.n_cycle_size * system.count_atoms();
        for i_outer in 0..self.n_outer_cycles {
            for _i_inner in 0..self.n_inner_cycles {
                for _ in 0..sweep_steps {
                    let which = self.movers.choose(&mut self.rng);
                    self.movers.get_mover_mut(which)
                        .perturb(system, energy, &self.criterion, &mut self.rng);
                }
                for e in self.evaluate_every_inner_cycle.iter_mut() {
                    e.evaluate(system, energy);
                }
                for o in self.observe_every_inner_cycle.iter_mut() {
                    o.observe(system, energy, &self.movers);
                }
            }
            for e in self.evaluate_every_outer_cycle.iter_mut() {
                e.evaluate(system, energy);
            }
            for o in self.observe_every_outer_cycle.iter_mut() {
                o.observe(system, energy, &self.movers);
            }
            debug!("outer cycle {} done at T = {}", i_outer, self.criterion.temperature);
        }
    }

    /// Flushes all observers of this sampler
    pub fn flush_observers(&mut self) {
        for o in self.observe_every_inner_cycle.iter_mut() { o.flush(); }
        for o in self.observe_every_outer_cycle.iter_mut() { o.flush(); }
    }
}
