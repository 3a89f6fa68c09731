use std::time::Instant;

use surpass_ff::{ByResidueEnergy, TotalEnergyByResidue};
use surpass_model::SurpassSystem;
use surpass_pdb::calc::{crmsd, Vec3};

/// Evaluates a single scalar property of the simulated system.
///
/// Evaluators are called at cycle boundaries; their values are collected into
/// `observers.dat` by the evaluator-table observer.
pub trait Evaluator: Send {
    /// Evaluates the property for the current conformation
    fn evaluate(&mut self, system: &SurpassSystem, energy: &TotalEnergyByResidue) -> f64;

    /// Name of this evaluator, used as a column header
    fn name(&self) -> &str;
}

/// Squared radius of gyration of the whole system.
pub struct RgSquare;

impl Evaluator for RgSquare {
    fn evaluate(&mut self, system: &SurpassSystem, _energy: &TotalEnergyByResidue) -> f64 {
        let cm = system.center_of_mass();
        let mut s = 0.0;
        for i in 0..system.count_atoms() {
            let p = system.pos(i);
            let (dx, dy, dz) = (p.x - cm.x, p.y - cm.y, p.z - cm.z);
            s += dx * dx + dy * dy + dz * dz;
        }
        s / system.count_atoms() as f64
    }

    fn name(&self) -> &str { "RgSquare" }
}

/// Wall-clock time elapsed since this evaluator was created, in seconds.
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Timer { Timer { start: Instant::now() } }
}

impl Default for Timer {
    fn default() -> Self { Self::new() }
}

impl Evaluator for Timer {
    fn evaluate(&mut self, _system: &SurpassSystem, _energy: &TotalEnergyByResidue) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    fn name(&self) -> &str { "Timer" }
}

/// Coordinate RMSD between the current conformation and a reference.
///
/// The reference is usually the native structure; when none was given the
/// starting conformation serves as one. The bead counts must match.
pub struct CrmsdEvaluator {
    reference: Vec<Vec3>,
}

impl CrmsdEvaluator {
    /// Creates the evaluator against a reference conformation
    pub fn new(reference: &SurpassSystem) -> CrmsdEvaluator {
        CrmsdEvaluator {
            reference: (0..reference.count_atoms()).map(|i| reference.pos(i)).collect(),
        }
    }
}

impl Evaluator for CrmsdEvaluator {
    fn evaluate(&mut self, system: &SurpassSystem, _energy: &TotalEnergyByResidue) -> f64 {
        let model: Vec<Vec3> = (0..system.count_atoms()).map(|i| system.pos(i)).collect();
        crmsd(&self.reference, &model)
    }

    fn name(&self) -> &str { "crmsd" }
}

/// The current value of the weighted total energy.
pub struct TotalEnergyEvaluator;

impl Evaluator for TotalEnergyEvaluator {
    fn evaluate(&mut self, system: &SurpassSystem, energy: &TotalEnergyByResidue) -> f64 {
        energy.calculate(system)
    }

    fn name(&self) -> &str { "TotalEnergy" }
}
