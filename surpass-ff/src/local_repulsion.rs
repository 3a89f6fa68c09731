use std::path::Path;

use log::info;

use surpass_io::{open_file, read_table};
use surpass_model::SurpassSystem;

use crate::array2d::Array2D;
use crate::energy::ByResidueEnergy;
use crate::errors::DataError;
use crate::long_range::{long_range_by_chunk, long_range_by_residue, long_range_total,
                        long_range_total_map, LongRangeEnergyKernel};

/// Hard-core repulsion between beads close in sequence.
///
/// Bead pairs separated by a few positions along the chain pay a fixed penalty
/// whenever they approach below the clash distance tabulated for their
/// separation; the term backs up the short-range mean-field potentials where
/// their statistics are too soft to prevent a local collapse.
pub struct SurpassLocalRepulsionEnergy {
    penalty: f64,
    /// squared clash distance per sequence separation; index 0 unused
    clash_distance_2: Vec<f64>,
}

/// Name of the clash distance table, relative to the data directory
pub const REPULSION_PARAMETER_FILE: &str = "surpass_repulsion.dat";

impl SurpassLocalRepulsionEnergy {
    /// Loads the per-separation clash distances from `surpass_repulsion.dat` under `data_dir`.
    pub fn new(data_dir: &Path, penalty: f64) -> Result<SurpassLocalRepulsionEnergy, DataError> {
        let path = data_dir.join(REPULSION_PARAMETER_FILE);
        let path_str = path.to_string_lossy().to_string();
        let reader = open_file(&path_str)
            .map_err(|_| DataError::ParameterFileMissing { path: path_str.clone() })?;
        let rows = read_table(reader)?;

        let mut clash: Vec<(usize, f64)> = Vec::new();
        for row in &rows {
            if row.len() < 2 {
                return Err(DataError::MalformedTable {
                    path: path_str.clone(),
                    detail: String::from("repulsion rows require 2 columns: seq_separation r_clash"),
                });
            }
            clash.push((row[0] as usize, row[1]));
        }
        let max_sep = clash.iter().map(|(s, _)| *s).max().unwrap_or(0);
        if max_sep == 0 {
            return Err(DataError::MalformedTable {
                path: path_str,
                detail: String::from("no positive sequence separations tabulated"),
            });
        }
        let mut clash_distance_2 = vec![0.0; max_sep + 1];
        for (sep, r) in clash { clash_distance_2[sep] = r * r; }
        info!("Local repulsion penalty {} applied up to {} residues apart", penalty, max_sep);

        Ok(SurpassLocalRepulsionEnergy { penalty, clash_distance_2 })
    }
}

impl LongRangeEnergyKernel for SurpassLocalRepulsionEnergy {
    fn residue_offset(&self) -> usize { 1 }

    fn kernel(&self, system: &SurpassSystem, moved_residue: usize, other_residue: usize,
              energy: &mut f64) -> bool {
        let separation = moved_residue.abs_diff(other_residue);
        if separation >= self.clash_distance_2.len() { return true; }
        if system.chain_for_atom(moved_residue) != system.chain_for_atom(other_residue) { return true; }
        let clash_2 = self.clash_distance_2[separation];
        if system.distance_squared_within(moved_residue, other_residue, clash_2).is_some() {
            *energy += self.penalty;
        }
        true
    }
}

impl ByResidueEnergy for SurpassLocalRepulsionEnergy {
    fn calculate(&self, system: &SurpassSystem) -> f64 { long_range_total(self, system) }

    fn calculate_by_residue(&self, system: &SurpassSystem, which_residue: usize) -> f64 {
        long_range_by_residue(self, system, which_residue)
    }

    fn calculate_by_chunk(&self, system: &SurpassSystem, chunk_from: usize, chunk_to: usize) -> f64 {
        long_range_by_chunk(self, system, chunk_from, chunk_to)
    }

    fn calculate_map(&self, system: &SurpassSystem, energy_map: &mut Array2D<f64>) -> f64 {
        long_range_total_map(self, system, energy_map)
    }

    fn name(&self) -> &str { "SurpassLocalRepulsionEnergy" }
}
