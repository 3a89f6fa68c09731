use std::sync::Arc;

use surpass_model::SurpassSystem;

use crate::distributions::{load_1d_distributions, Interpolate1D};
use crate::energy::ByResidueEnergy;
use crate::errors::DataError;

/// A weak radial bias pulling beads toward the system centroid.
///
/// Every bead is scored by a 1-D spline of its distance to the center of mass,
/// keyed only by the bead type; there is no sequence dependence. The centroid
/// is recomputed at every evaluation pass.
pub struct SurpassCentrosymmetricEnergy {
    splines: [Arc<Interpolate1D>; 3],
}

impl SurpassCentrosymmetricEnergy {
    /// Loads the radial distributions; the file keys the splines `H`, `E` and `C`.
    pub fn new(ff_file: &str, pseudocounts: f64) -> Result<SurpassCentrosymmetricEnergy, DataError> {
        let mf = load_1d_distributions(ff_file, pseudocounts)?;
        Ok(SurpassCentrosymmetricEnergy {
            splines: [mf.at("H")?, mf.at("E")?, mf.at("C")?],
        })
    }

    /// Name of the default parameter file of this term, relative to the data directory
    pub fn default_parameter_file() -> &'static str { "surpass_centro.dat" }

    fn residue_energy(&self, system: &SurpassSystem, which_residue: usize, cm: &surpass_pdb::calc::Vec3) -> f64 {
        let r = system.pos(which_residue).distance_to(cm);
        self.splines[system.bead_type(which_residue) as usize].value(r)
    }
}

impl ByResidueEnergy for SurpassCentrosymmetricEnergy {
    fn calculate(&self, system: &SurpassSystem) -> f64 {
        let cm = system.center_of_mass();
        (0..system.count_residues()).map(|r| self.residue_energy(system, r, &cm)).sum()
    }

    fn calculate_by_residue(&self, system: &SurpassSystem, which_residue: usize) -> f64 {
        let cm = system.center_of_mass();
        self.residue_energy(system, which_residue, &cm)
    }

    fn calculate_by_chunk(&self, system: &SurpassSystem, chunk_from: usize, chunk_to: usize) -> f64 {
        let cm = system.center_of_mass();
        (chunk_from..=chunk_to).map(|r| self.residue_energy(system, r, &cm)).sum()
    }

    fn name(&self) -> &str { "SurpassCentrosymmetricEnergy" }
}
