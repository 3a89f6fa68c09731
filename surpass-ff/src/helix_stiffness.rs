use std::path::Path;

use log::info;

use surpass_io::{open_file, read_table};
use surpass_model::SurpassSystem;
use surpass_pdb::calc::planar_angle3;

use crate::energy::ByResidueEnergy;
use crate::errors::DataError;

/// Bending stiffness of helices.
///
/// Every three consecutive beads inside an α element define a planar angle;
/// angles outside the tabulated flat-bottom window pay a fixed penalty, which
/// keeps helices from kinking without constraining loops or strands.
pub struct SurpassHelixStiffnessEnergy {
    angle_min: f64,
    angle_max: f64,
    penalty: f64,
}

/// Name of the stiffness parameter table, relative to the data directory
pub const STIFFNESS_PARAMETER_FILE: &str = "surpass_stiffness.dat";

impl SurpassHelixStiffnessEnergy {
    /// Loads the `a_min a_max penalty` row (angles in degrees) from `surpass_stiffness.dat`.
    pub fn new(data_dir: &Path) -> Result<SurpassHelixStiffnessEnergy, DataError> {
        let path = data_dir.join(STIFFNESS_PARAMETER_FILE);
        let path_str = path.to_string_lossy().to_string();
        let reader = open_file(&path_str)
            .map_err(|_| DataError::ParameterFileMissing { path: path_str.clone() })?;
        let rows = read_table(reader)?;
        let row = rows.first().filter(|r| r.len() >= 3).ok_or_else(|| DataError::MalformedTable {
            path: path_str,
            detail: String::from("expected a single row: a_min a_max penalty"),
        })?;

        info!("Helix stiffness window [{}, {}] deg, penalty {}", row[0], row[1], row[2]);
        Ok(SurpassHelixStiffnessEnergy {
            angle_min: row[0].to_radians(),
            angle_max: row[1].to_radians(),
            penalty: row[2],
        })
    }

    fn window_energy(&self, system: &SurpassSystem, first: usize) -> f64 {
        let angle = planar_angle3(
            &system.pos(first), &system.pos(first + 1), &system.pos(first + 2));
        if angle < self.angle_min || angle > self.angle_max { self.penalty } else { 0.0 }
    }

    /// Sums every angle window of every helix that overlaps residues `[from, to]`.
    fn sum_windows(&self, system: &SurpassSystem, from: usize, to: usize) -> f64 {
        let mut en = 0.0;
        for &(first, last) in system.alfa_ranges() {
            if last < first + 2 { continue; }
            if last < from.saturating_sub(2).max(first) || first > to { continue; }
            let w_from = first.max(from.saturating_sub(2));
            let w_to = (last - 2).min(to);
            if w_from > w_to { continue; }
            for w in w_from..=w_to {
                en += self.window_energy(system, w);
            }
        }
        en
    }
}

impl ByResidueEnergy for SurpassHelixStiffnessEnergy {
    fn calculate(&self, system: &SurpassSystem) -> f64 {
        let mut en = 0.0;
        for &(first, last) in system.alfa_ranges() {
            if last < first + 2 { continue; }
            for w in first..=last - 2 {
                en += self.window_energy(system, w);
            }
        }
        en
    }

    fn calculate_by_residue(&self, system: &SurpassSystem, which_residue: usize) -> f64 {
        self.sum_windows(system, which_residue, which_residue)
    }

    fn calculate_by_chunk(&self, system: &SurpassSystem, chunk_from: usize, chunk_to: usize) -> f64 {
        self.sum_windows(system, chunk_from, chunk_to)
    }

    fn name(&self) -> &str { "SurpassHelixStiffnessEnergy" }
}
