use std::io::Write;
use std::sync::{Arc, Mutex};

use surpass_ff::{ByResidueEnergy, SurpassHydrogenBond, TotalEnergyByResidue};
use surpass_io::out_writer;
use surpass_model::SurpassSystem;

use crate::acceptance::AcceptanceStatistics;
use crate::evaluators::Evaluator;
use crate::movers_set::MoversSet;

/// An output stream handle that can be exchanged between observers.
///
/// The replica exchange driver running in the `ISOTHERMAL` observation mode
/// swaps these handles between the observers of two swapped replicas, so each
/// file keeps receiving frames recorded at a single temperature.
#[derive(Clone)]
pub struct SharedOutput {
    stream: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl SharedOutput {
    /// Opens a shared stream; the name is resolved like in [`out_writer()`](out_writer)
    pub fn new(fname: &str, if_append: bool) -> SharedOutput {
        SharedOutput { stream: Arc::new(Mutex::new(out_writer(fname, if_append))) }
    }

    /// Writes a full line to the stream
    pub fn write_line(&self, line: &str) {
        let mut stream = self.stream.lock().unwrap();
        writeln!(stream, "{}", line).ok();
    }

    /// Runs a closure with exclusive access to the underlying writer
    pub fn with_stream<T>(&self, f: impl FnOnce(&mut dyn Write) -> T) -> T {
        let mut stream = self.stream.lock().unwrap();
        f(&mut **stream)
    }

    /// Flushes the underlying writer
    pub fn flush(&self) {
        self.stream.lock().unwrap().flush().ok();
    }
}

/// Takes observations of a simulated system at cycle boundaries.
///
/// Observers are registered at a sampler for either the inner or the outer
/// cycle and are dispatched in registration order.
pub trait Observer: Send {
    /// Records an observation of the current state
    fn observe(&mut self, system: &SurpassSystem, energy: &TotalEnergyByResidue, movers: &MoversSet);

    /// Writes the header line of the produced table, if any
    fn observe_header(&mut self) {}

    /// Flushes buffered output
    fn flush(&mut self) {}

    /// Name of this observer
    fn name(&self) -> &str;

    /// The exchangeable output handle of this observer, when it writes to a stream
    fn shared_stream(&mut self) -> Option<&mut SharedOutput> { None }
}

/// Gates trajectory frames by the current total energy.
///
/// The trigger fires when the energy drops below its threshold; every firing
/// relaxes the threshold toward the observed energy by the configured
/// fraction, so only conformations near the running minimum are recorded.
pub struct TriggerLowEnergy {
    max_energy: f64,
    fraction: f64,
}

impl TriggerLowEnergy {
    pub fn new(max_energy: f64, fraction: f64) -> TriggerLowEnergy {
        TriggerLowEnergy { max_energy, fraction }
    }

    /// Checks the trigger against an energy value, updating the threshold on a hit
    pub fn check(&mut self, energy_value: f64) -> bool {
        if energy_value > self.max_energy { return false; }
        self.max_energy = energy_value + self.fraction * (self.max_energy - energy_value);
        true
    }
}

/// Records conformations as MODEL frames of a PDB trajectory.
pub struct PdbTrajectory {
    out: SharedOutput,
    i_model: usize,
    trigger: Option<TriggerLowEnergy>,
}

impl PdbTrajectory {
    /// Creates an observer writing every frame to a trajectory file
    pub fn new(fname: &str, if_append: bool) -> PdbTrajectory {
        PdbTrajectory { out: SharedOutput::new(fname, if_append), i_model: 0, trigger: None }
    }

    /// Records a frame only when the given trigger fires
    pub fn set_trigger(&mut self, trigger: TriggerLowEnergy) { self.trigger = Some(trigger); }
}

impl Observer for PdbTrajectory {
    fn observe(&mut self, system: &SurpassSystem, energy: &TotalEnergyByResidue, _movers: &MoversSet) {
        if let Some(trigger) = self.trigger.as_mut() {
            if !trigger.check(energy.calculate(system)) { return; }
        }
        self.i_model += 1;
        let i_model = self.i_model;
        self.out.with_stream(|stream| system.write_pdb(stream, i_model)).ok();
    }

    fn flush(&mut self) { self.out.flush(); }

    fn name(&self) -> &str { "PdbTrajectory" }

    fn shared_stream(&mut self) -> Option<&mut SharedOutput> { Some(&mut self.out) }
}

/// Writes the energy components table: one row per observation.
///
/// Every row holds the unweighted value of each component followed by the
/// weighted total, with column widths matching the header.
pub struct ObserveEnergyComponents {
    out: SharedOutput,
}

impl ObserveEnergyComponents {
    pub fn new(fname: &str) -> ObserveEnergyComponents {
        ObserveEnergyComponents { out: SharedOutput::new(fname, false) }
    }

    /// Writes the header row derived from the components' names
    pub fn observe_header_for(&mut self, energy: &TotalEnergyByResidue) {
        self.out.write_line(&format!("#{}", energy.header_string()));
    }
}

impl Observer for ObserveEnergyComponents {
    fn observe(&mut self, system: &SurpassSystem, energy: &TotalEnergyByResidue, _movers: &MoversSet) {
        let mut row = String::new();
        for (i, width) in energy.get_widths().iter().enumerate() {
            row.push_str(&format!("{:>width$.3} ", energy.calculate_component(system, i), width = width));
        }
        row.push_str(&format!("{:>12.3}", energy.calculate(system)));
        self.out.write_line(&format!(" {}", row));
    }

    fn name(&self) -> &str { "ObserveEnergyComponents" }

    fn flush(&mut self) { self.out.flush(); }

    fn shared_stream(&mut self) -> Option<&mut SharedOutput> { Some(&mut self.out) }
}

/// Writes the evaluators' table: one scalar column per registered evaluator.
pub struct ObserveEvaluators {
    out: SharedOutput,
    evaluators: Vec<Box<dyn Evaluator>>,
}

impl ObserveEvaluators {
    pub fn new(fname: &str) -> ObserveEvaluators {
        ObserveEvaluators { out: SharedOutput::new(fname, false), evaluators: Vec::new() }
    }

    /// Registers an evaluator; its value will appear as the next column
    pub fn add_evaluator(&mut self, e: Box<dyn Evaluator>) { self.evaluators.push(e); }
}

impl Observer for ObserveEvaluators {
    fn observe(&mut self, system: &SurpassSystem, energy: &TotalEnergyByResidue, _movers: &MoversSet) {
        let mut row = String::new();
        for e in self.evaluators.iter_mut() {
            let width = e.name().len().max(12);
            row.push_str(&format!("{:>width$.4} ", e.evaluate(system, energy), width = width));
        }
        self.out.write_line(&format!(" {}", row.trim_end()));
    }

    fn observe_header(&mut self) {
        let mut header = String::from("#");
        for e in &self.evaluators {
            let width = e.name().len().max(12);
            header.push_str(&format!("{:>width$} ", e.name(), width = width));
        }
        self.out.write_line(header.trim_end());
    }

    fn name(&self) -> &str { "ObserveEvaluators" }

    fn flush(&mut self) { self.out.flush(); }

    fn shared_stream(&mut self) -> Option<&mut SharedOutput> { Some(&mut self.out) }
}

/// Writes the recent acceptance ratio of every mover, one row per observation.
pub struct ObserveMoversAcceptance {
    out: SharedOutput,
    previous: Vec<AcceptanceStatistics>,
}

impl ObserveMoversAcceptance {
    pub fn new(fname: &str) -> ObserveMoversAcceptance {
        ObserveMoversAcceptance { out: SharedOutput::new(fname, false), previous: Vec::new() }
    }

    /// Writes the header row of the acceptance table
    pub fn observe_header_for(&mut self, movers: &MoversSet) {
        let mut header = String::from("#");
        for i in 0..movers.count_movers() {
            header.push_str(&format!("{:>20} ", movers.get_mover(i).name()));
        }
        self.out.write_line(header.trim_end());
    }
}

impl Observer for ObserveMoversAcceptance {
    fn observe(&mut self, _system: &SurpassSystem, _energy: &TotalEnergyByResidue, movers: &MoversSet) {
        if self.previous.len() != movers.count_movers() {
            self.previous = vec![AcceptanceStatistics::default(); movers.count_movers()];
        }
        let mut row = String::new();
        for i in 0..movers.count_movers() {
            let stats = movers.get_mover(i).acceptance_statistics();
            row.push_str(&format!("{:>20.4} ", stats.recent_success_rate(&self.previous[i])));
            self.previous[i] = stats;
        }
        self.out.write_line(&format!(" {}", row.trim_end()));
    }

    fn name(&self) -> &str { "ObserveMoversAcceptance" }

    fn flush(&mut self) { self.out.flush(); }

    fn shared_stream(&mut self) -> Option<&mut SharedOutput> { Some(&mut self.out) }
}

/// Serializes the β topology matrix of the hydrogen bond analyzer, one row per observation.
pub struct ObserveTopologyMatrix {
    out: SharedOutput,
    hydrogen_bonds: Arc<SurpassHydrogenBond>,
    i_observation: usize,
}

impl ObserveTopologyMatrix {
    pub fn new(hydrogen_bonds: Arc<SurpassHydrogenBond>, fname: &str) -> ObserveTopologyMatrix {
        ObserveTopologyMatrix { out: SharedOutput::new(fname, false), hydrogen_bonds, i_observation: 0 }
    }
}

impl Observer for ObserveTopologyMatrix {
    fn observe(&mut self, _system: &SurpassSystem, _energy: &TotalEnergyByResidue, _movers: &MoversSet) {
        self.i_observation += 1;
        let topology = self.hydrogen_bonds.beta_topology_matrix();
        let mut row = format!("{:6}  ", self.i_observation);
        for i in 0..topology.count_rows() {
            for j in 0..topology.count_columns() {
                row.push_str(&format!("{} ", topology.get(i, j)));
            }
        }
        self.out.write_line(row.trim_end());
    }

    fn name(&self) -> &str { "ObserveTopologyMatrix" }

    fn flush(&mut self) { self.out.flush(); }

    fn shared_stream(&mut self) -> Option<&mut SharedOutput> { Some(&mut self.out) }
}

/// Writes the end-to-end vector of every chain, one row per observation.
pub struct EndVectorObserver {
    out: SharedOutput,
}

impl EndVectorObserver {
    pub fn new(fname: &str) -> EndVectorObserver {
        EndVectorObserver { out: SharedOutput::new(fname, false) }
    }
}

impl Observer for EndVectorObserver {
    fn observe(&mut self, system: &SurpassSystem, _energy: &TotalEnergyByResidue, _movers: &MoversSet) {
        let mut row = String::new();
        for chain in 0..system.count_chains() {
            let (first, last) = system.atoms_for_chain(chain);
            let mut r_end = system.pos(last);
            r_end -= &system.pos(first);
            row.push_str(&format!("{:>9.3} {:>9.3} {:>9.3}   ", r_end.x, r_end.y, r_end.z));
        }
        self.out.write_line(row.trim_end());
    }

    fn name(&self) -> &str { "EndVectorObserver" }

    fn flush(&mut self) { self.out.flush(); }

    fn shared_stream(&mut self) -> Option<&mut SharedOutput> { Some(&mut self.out) }
}
