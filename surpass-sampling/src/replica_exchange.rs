use log::{debug, info};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use surpass_ff::{ByResidueEnergy, TotalEnergyByResidue};
use surpass_model::SurpassSystem;

use crate::isothermal::IsothermalMC;
use crate::observers::SharedOutput;

/// Defines what replica exchange observers follow when replicas swap.
///
/// Exchanging systems between temperatures means a single output stream is
/// either isothermal (frames always at one temperature, discontiguous
/// reaction path) or isotemporal (frames of one physical replica, mixed
/// temperatures). In the isothermal mode the driver swaps the output streams
/// of the affected samplers' observers on every accepted exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplicaExchangeObservationMode {
    Isothermal,
    Isotemporal,
}

/// One replica of a replica exchange simulation.
///
/// The `replica_index` identifies the physical system and never changes;
/// `temperature_index` tells which rung of the temperature ladder the replica
/// currently occupies and moves under accepted swaps.
pub struct ReplicaTask {
    pub replica_index: usize,
    pub temperature_index: usize,
    /// 0 - no boundary hit yet; 1 or 2 - most recently hit the lowest or the highest temperature
    pub replica_space_flag: u8,
    pub system: SurpassSystem,
    pub sampler: IsothermalMC,
    pub energy: TotalEnergyByResidue,
}

/// A snapshot of one replica's walk through the temperature ladder.
#[derive(Clone, Debug)]
pub struct ReplicaStatus {
    pub replica_index: usize,
    pub temperature_index: usize,
    pub replica_space_flag: u8,
    pub temperature: f64,
}

/// Observes the replica exchange driver after every exchange attempt.
pub trait ExchangeObserver: Send {
    /// Records the state of all replicas; statuses come ordered by `replica_index`
    fn observe(&mut self, replicas: &[ReplicaStatus]);

    fn flush(&mut self) {}

    fn name(&self) -> &str;
}

/// Evaluates a scalar over the replica population after every exchange attempt.
pub trait ExchangeEvaluator: Send {
    fn evaluate(&mut self, replicas: &[ReplicaStatus]) -> f64;

    fn name(&self) -> &str;
}

/// Replica exchange Monte Carlo sampler.
///
/// Each exchange block runs every replica's isothermal sampler concurrently,
/// one OS thread per replica, joins them all and then attempts a swap between
/// a random pair of neighboring temperature rungs. On acceptance the two
/// replicas trade places in the ladder (each sampler is re-assigned the
/// temperature of its new rung), counters and boundary flags are updated, and
/// in the isothermal observation mode the affected observers trade their
/// output streams.
pub struct ReplicaExchangeMC {
    /// replicas ordered by their temperature rung
    replicas: Vec<ReplicaTask>,
    temperatures: Vec<f64>,
    n_successful_exchanges: Vec<usize>,
    n_exchanges: usize,
    observation_mode: ReplicaExchangeObservationMode,
    rng: SmallRng,
    observe_every_exchange: Vec<Box<dyn ExchangeObserver>>,
    evaluate_every_exchange: Vec<Box<dyn ExchangeEvaluator>>,
}

impl ReplicaExchangeMC {
    /// Creates the driver from matched (system, sampler, energy) triples.
    ///
    /// Replica `i` starts at temperature rung `i`; the samplers must already
    /// be set to their rung temperatures. At least two replicas are required.
    pub fn new(replicas: Vec<(SurpassSystem, IsothermalMC, TotalEnergyByResidue)>,
               observation_mode: ReplicaExchangeObservationMode, seed: u64) -> ReplicaExchangeMC {

        assert!(replicas.len() >= 2, "replica exchange requires at least two replicas");
        let mut tasks: Vec<ReplicaTask> = Vec::with_capacity(replicas.len());
        let mut temperatures: Vec<f64> = Vec::with_capacity(replicas.len());
        for (i, (system, sampler, energy)) in replicas.into_iter().enumerate() {
            temperatures.push(sampler.temperature());
            tasks.push(ReplicaTask {
                replica_index: i,
                temperature_index: i,
                replica_space_flag: 0,
                system,
                sampler,
                energy,
            });
        }
        let n = tasks.len();

        ReplicaExchangeMC {
            replicas: tasks,
            temperatures,
            n_successful_exchanges: vec![0; n],
            n_exchanges: 0,
            observation_mode,
            rng: SmallRng::seed_from_u64(seed),
            observe_every_exchange: Vec::new(),
            evaluate_every_exchange: Vec::new(),
        }
    }

    /// Sets the number of exchange attempts performed by `run()`.
    ///
    /// Each attempt follows a full outer x inner x sweep block of every replica.
    pub fn replica_exchanges(&mut self, n_exchanges: usize) { self.n_exchanges = n_exchanges; }

    /// The temperature ladder, ordered by rung
    pub fn temperatures(&self) -> &[f64] { &self.temperatures }

    /// The replicas, ordered by their current temperature rung
    pub fn replicas(&self) -> &[ReplicaTask] { &self.replicas }

    /// Mutable access to the replicas, e.g. to write final conformations
    pub fn replicas_mut(&mut self) -> &mut [ReplicaTask] { &mut self.replicas }

    /// Successful swap counts per temperature rung
    pub fn successful_exchanges(&self) -> &[usize] { &self.n_successful_exchanges }

    /// Registers an observer called after every exchange attempt
    pub fn exchange_observer(&mut self, o: Box<dyn ExchangeObserver>) {
        self.observe_every_exchange.push(o);
    }

    /// Registers an evaluator called after every exchange attempt
    pub fn exchange_evaluator(&mut self, e: Box<dyn ExchangeEvaluator>) {
        self.evaluate_every_exchange.push(e);
    }

    /// Runs the whole replica exchange protocol.
    pub fn run(&mut self) {
        for i_exchange in 0..self.n_exchanges {
            // run a sampling block of every replica concurrently
            std::thread::scope(|scope| {
                for task in self.replicas.iter_mut() {
                    scope.spawn(move || {
                        task.sampler.run(&mut task.system, &task.energy);
                    });
                }
            });

            let rung = self.rng.gen_range(0..self.replicas.len() - 1);
            self.try_exchange(rung, rung + 1);
            debug!("exchange attempt {} at rungs ({}, {})", i_exchange, rung, rung + 1);

            let statuses = self.replica_statuses();
            for e in self.evaluate_every_exchange.iter_mut() { e.evaluate(&statuses); }
            for o in self.observe_every_exchange.iter_mut() { o.observe(&statuses); }
        }
        for task in self.replicas.iter_mut() { task.sampler.flush_observers(); }
        for o in self.observe_every_exchange.iter_mut() { o.flush(); }
        info!("successful exchanges per rung: {:?}", self.n_successful_exchanges);
    }

    /// Snapshots of all replicas, ordered by their physical index
    pub fn replica_statuses(&self) -> Vec<ReplicaStatus> {
        let mut statuses: Vec<ReplicaStatus> = self.replicas.iter()
            .map(|t| ReplicaStatus {
                replica_index: t.replica_index,
                temperature_index: t.temperature_index,
                replica_space_flag: t.replica_space_flag,
                temperature: self.temperatures[t.temperature_index],
            })
            .collect();
        statuses.sort_by_key(|s| s.replica_index);
        statuses
    }

    fn try_exchange(&mut self, rung_1: usize, rung_2: usize) -> bool {
        let energy_1 = self.replicas[rung_1].energy.calculate(&self.replicas[rung_1].system);
        let energy_2 = self.replicas[rung_2].energy.calculate(&self.replicas[rung_2].system);
        let delta_beta = 1.0 / self.temperatures[rung_1] - 1.0 / self.temperatures[rung_2];
        let delta = delta_beta * (energy_2 - energy_1);
        if delta >= 0.0 && self.rng.gen_range(0.0..1.0) >= (-delta).exp() {
            debug!("exchange between rungs {} ({:.2}) and {} ({:.2}) failed",
                rung_1, energy_1, rung_2, energy_2);
            return false;
        }

        debug!("exchanging replicas at rungs {} ({:.2}) and {} ({:.2})",
            rung_1, energy_1, rung_2, energy_2);
        self.replicas.swap(rung_1, rung_2);
        for rung in [rung_1, rung_2] {
            let temperature = self.temperatures[rung];
            let task = &mut self.replicas[rung];
            task.temperature_index = rung;
            task.sampler.set_temperature(temperature);
            if rung == 0 { task.replica_space_flag = 1; }
            if rung == self.temperatures.len() - 1 { task.replica_space_flag = 2; }
        }
        self.n_successful_exchanges[rung_1] += 1;
        self.n_successful_exchanges[rung_2] += 1;

        if self.observation_mode == ReplicaExchangeObservationMode::Isothermal {
            self.swap_observer_streams(rung_1, rung_2);
        }

        true
    }

    /// Swaps the output streams of the paired observers of two samplers, so
    /// each stream keeps recording at its original temperature.
    fn swap_observer_streams(&mut self, rung_1: usize, rung_2: usize) {
        let (left, right) = self.replicas.split_at_mut(rung_2);
        let sampler_1 = &mut left[rung_1].sampler;
        let sampler_2 = &mut right[0].sampler;
        swap_stream_handles(sampler_1.inner_cycle_observers_mut(), sampler_2.inner_cycle_observers_mut());
        swap_stream_handles(sampler_1.outer_cycle_observers_mut(), sampler_2.outer_cycle_observers_mut());
    }
}

fn swap_stream_handles(observers_1: &mut [Box<dyn crate::Observer>],
                       observers_2: &mut [Box<dyn crate::Observer>]) {
    for (o1, o2) in observers_1.iter_mut().zip(observers_2.iter_mut()) {
        if let (Some(s1), Some(s2)) = (o1.shared_stream(), o2.shared_stream()) {
            std::mem::swap::<SharedOutput>(s1, s2);
        }
    }
}

/// Records the walk of every replica through the temperature ladder.
///
/// One row per exchange attempt: the attempt number followed by every
/// replica's current temperature index and boundary-hit flag, ordered by the
/// physical replica index.
pub struct ObserveReplicaFlow {
    out: SharedOutput,
    i_exchange: usize,
}

impl ObserveReplicaFlow {
    pub fn new(fname: &str) -> ObserveReplicaFlow {
        ObserveReplicaFlow { out: SharedOutput::new(fname, false), i_exchange: 0 }
    }
}

impl ExchangeObserver for ObserveReplicaFlow {
    fn observe(&mut self, replicas: &[ReplicaStatus]) {
        self.i_exchange += 1;
        let mut row = format!("{:6}  ", self.i_exchange);
        for status in replicas {
            row.push_str(&format!("{:3} {}   ", status.temperature_index, status.replica_space_flag));
        }
        self.out.write_line(row.trim_end());
    }

    fn flush(&mut self) { self.out.flush(); }

    fn name(&self) -> &str { "ObserveReplicaFlow" }
}
