use std::sync::Arc;

use surpass_pdb::SecondaryStructure;

use crate::distributions::{load_1d_distributions, Interpolate1D};
use crate::errors::DataError;

const HEC_CODES: [char; 3] = ['H', 'E', 'C'];

/// Base machinery of the sequence-window mean-field terms.
///
/// For every scored window the struct caches nine spline handles, one per
/// (ss, ss) combination at the two window positions the term depends on.
/// Scoring mixes the nine spline values with the H/E/C probability product of
/// those positions, so an uncertain secondary structure prediction blends the
/// respective potentials.
pub struct ShortRangeMF {
    first_pos: usize,
    second_pos: usize,
    property_span: usize,
    fractions: Vec<[f64; 3]>,
    ff_for_window: Vec<[Arc<Interpolate1D>; 9]>,
}

impl ShortRangeMF {
    /// Prepares the spline cache for every window of a system.
    ///
    /// # Arguments
    /// * `scored_secondary` - bead-level secondary structure: sequence tags and H/E/C fractions
    /// * `ff_file` - parameter file with the keyed distributions
    /// * `first_pos`, `second_pos` - window offsets of the two scored positions
    /// * `property_span` - the number of beads involved in the scored property
    /// * `pseudocounts` - non-negative values convert probabilities to energies on load
    pub fn new(scored_secondary: &SecondaryStructure, ff_file: &str, first_pos: usize,
               second_pos: usize, property_span: usize, pseudocounts: f64) -> Result<ShortRangeMF, DataError> {

        let n_residues = scored_secondary.len();
        assert!(property_span >= 2, "a window property involves at least two beads");
        let mf = load_1d_distributions(ff_file, pseudocounts)?;

        let n_windows = if n_residues >= property_span { n_residues - property_span + 1 } else { 0 };
        let mut ff_for_window: Vec<[Arc<Interpolate1D>; 9]> = Vec::with_capacity(n_windows);
        let mut fractions: Vec<[f64; 3]> = Vec::with_capacity(n_residues);
        for i in 0..n_residues { fractions.push(*scored_secondary.fractions(i)); }

        let mut key = String::from("__.__");
        for i in 0..n_windows {
            let aa_1 = scored_secondary.aa(i + first_pos) as char;
            let aa_2 = scored_secondary.aa(i + second_pos) as char;
            let mut handles: Vec<Arc<Interpolate1D>> = Vec::with_capacity(9);
            for ss_1 in HEC_CODES {
                for ss_2 in HEC_CODES {
                    key.clear();
                    key.push(aa_1);
                    key.push(aa_2);
                    key.push('.');
                    key.push(ss_1);
                    key.push(ss_2);
                    handles.push(mf.at(&key)?);
                }
            }
            ff_for_window.push(handles.try_into().ok().unwrap());
        }

        Ok(ShortRangeMF { first_pos, second_pos, property_span, fractions, ff_for_window })
    }

    /// The number of beads involved in a single property measurement
    pub fn property_span(&self) -> usize { self.property_span }

    /// The number of scored windows
    pub fn count_windows(&self) -> usize { self.ff_for_window.len() }

    /// Scores a property value measured at a given window.
    ///
    /// The returned energy is the 3x3 probability-weighted sum of the nine
    /// cached spline values.
    pub fn score_property(&self, which_window: usize, value: f64) -> f64 {
        let ss_first = &self.fractions[which_window + self.first_pos];
        let ss_second = &self.fractions[which_window + self.second_pos];
        let splines = &self.ff_for_window[which_window];

        let mut en = 0.0;
        for j in 0..3 {
            if ss_first[j] == 0.0 { continue; }
            for k in 0..3 {
                if ss_second[k] == 0.0 { continue; }
                en += splines[j * 3 + k].value(value) * ss_first[j] * ss_second[k];
            }
        }

        en
    }
}
