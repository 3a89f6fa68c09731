use std::path::Path;
use std::sync::Arc;

use log::{debug, info};

use surpass_io::{open_file, read_table};
use surpass_model::{SurpassSystem, BEAD_C, BEAD_E, BEAD_H};

use crate::array2d::Array2D;
use crate::energy::ByResidueEnergy;
use crate::errors::DataError;
use crate::hydrogen_bond::SurpassHydrogenBond;
use crate::long_range::{long_range_by_chunk, long_range_by_residue, long_range_total,
                        long_range_total_map, LongRangeEnergyKernel};

/// Contact potential of a square-well shape.
///
/// For every residue pair the term looks up three distance thresholds keyed by
/// the SS-type pair: below the shortest distance a repulsive penalty applies;
/// between the premium and the longest distance a reward is granted, but only
/// to pairs that can form a productive contact. Coil beads never earn the
/// reward; helix beads of the same type must be more than five residues apart;
/// strand beads of the same type must belong to two different sheets, which
/// makes the term share the [`SurpassHydrogenBond`](SurpassHydrogenBond)
/// analyzer with the hydrogen bond energy.
pub struct SurpassContactEnergy {
    high_energy_level: f64,
    low_energy_level: f64,
    contact_shift: f64,
    contact_min_distance: [f64; 12],
    contact_ave_distance: [f64; 12],
    contact_max_distance: [f64; 12],
    hydrogen_bonds: Arc<SurpassHydrogenBond>,
}

/// Name of the contact threshold table, relative to the data directory
pub const CONTACT_PARAMETER_FILE: &str = "surpass_contact.dat";

impl SurpassContactEnergy {
    /// Creates the term with a square-well shape given by the three energy parameters.
    ///
    /// The distance thresholds are loaded from `surpass_contact.dat` found
    /// under `data_dir`; rows hold `i j d_min d_premium d_max` with SS-type
    /// indexes `i`, `j` (0 = H, 1 = E, 2 = C).
    pub fn new(hydrogen_bonds: Arc<SurpassHydrogenBond>, data_dir: &Path, high_energy_level: f64,
               low_energy_level: f64, contact_shift: f64) -> Result<SurpassContactEnergy, DataError> {

        let path = data_dir.join(CONTACT_PARAMETER_FILE);
        let path_str = path.to_string_lossy().to_string();
        let reader = open_file(&path_str)
            .map_err(|_| DataError::ParameterFileMissing { path: path_str.clone() })?;
        let rows = read_table(reader)?;

        let mut term = SurpassContactEnergy {
            high_energy_level,
            low_energy_level,
            contact_shift,
            contact_min_distance: [0.0; 12],
            contact_ave_distance: [0.0; 12],
            contact_max_distance: [0.0; 12],
            hydrogen_bonds,
        };
        for row in &rows {
            if row.len() < 5 {
                return Err(DataError::MalformedTable {
                    path: path_str.clone(),
                    detail: String::from("contact rows require 5 columns: i j d_min d_premium d_max"),
                });
            }
            let (i, j) = (row[0] as usize, row[1] as usize);
            if i > 2 || j > 2 {
                return Err(DataError::MalformedTable {
                    path: path_str.clone(),
                    detail: format!("SS type indexes must be 0..2, got {} {}", i, j),
                });
            }
            let id = (i << 2) + j;
            term.contact_min_distance[id] = row[2];
            term.contact_ave_distance[id] = row[3];
            term.contact_max_distance[id] = row[4];
        }
        info!("Contact energy parameters (high_en, low_en, shift): {} {} {}",
            high_energy_level, low_energy_level, contact_shift);
        debug!("contact excluded volume distances H-H, E-E, C-C: {} {} {}",
            term.contact_min_distance[0],
            term.contact_min_distance[(BEAD_E as usize) * 5],
            term.contact_min_distance[(BEAD_C as usize) * 5]);

        Ok(term)
    }
}

impl LongRangeEnergyKernel for SurpassContactEnergy {
    fn residue_offset(&self) -> usize { 3 }

    fn kernel(&self, system: &SurpassSystem, moved_residue: usize, other_residue: usize,
              energy: &mut f64) -> bool {

        // residues of the same SS element never interact; all loops share element 0
        if system.ss_element(moved_residue) == system.ss_element(other_residue) { return true; }
        let separation = moved_residue.abs_diff(other_residue);
        if separation <= 4 { return true; }

        let type_i = system.bead_type(moved_residue);
        let type_j = system.bead_type(other_residue);
        let mut is_good = type_i != BEAD_C && type_j != BEAD_C;
        if type_i == type_j {
            if type_i == BEAD_H && separation <= 5 { return true; }
            if type_i == BEAD_E {
                let s_i = system.beta_strand_for_atom(moved_residue).unwrap();
                let s_j = system.beta_strand_for_atom(other_residue).unwrap();
                // strand-strand contacts pay off only across two different sheets
                if self.hydrogen_bonds.strands_in_same_sheet(s_i, s_j) { is_good = false; }
            }
        }

        let id = ((type_i << 2) + type_j) as usize;
        let shortest = self.contact_shift + self.contact_min_distance[id];
        let shortest_2 = shortest * shortest;
        let premium_2 = self.contact_ave_distance[id] * self.contact_ave_distance[id];
        let longest_2 = self.contact_max_distance[id] * self.contact_max_distance[id];

        if let Some(r2) = system.distance_squared_within(moved_residue, other_residue, longest_2) {
            if r2 < shortest_2 { *energy += self.high_energy_level; }
            if r2 > premium_2 && is_good { *energy += self.low_energy_level; }
        }

        true
    }
}

impl ByResidueEnergy for SurpassContactEnergy {
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

    fn name(&self) -> &str { "SurpassContactEnergy" }
}
