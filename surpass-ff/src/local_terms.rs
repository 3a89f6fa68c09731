use surpass_model::SurpassSystem;
use surpass_pdb::calc::planar_angle3;
use surpass_pdb::SecondaryStructure;

use crate::energy::ByResidueEnergy;
use crate::errors::DataError;
use crate::short_range::ShortRangeMF;

macro_rules! surpass_r_term {
    ($name:ident, $span:expr, $str_name:expr, $default_file:expr) => {
        /// Knowledge-based potential scoring the distance spanned by a sequence window.
        pub struct $name {
            mf: ShortRangeMF,
        }

        impl $name {
            /// Creates the term from a parameter file; `"-"` selects the default file of this term.
            pub fn new(scored_secondary: &SecondaryStructure, ff_file: &str,
                       pseudocounts: f64) -> Result<$name, DataError> {
                Ok($name {
                    mf: ShortRangeMF::new(scored_secondary, ff_file, 0, $span - 1, $span, pseudocounts)?,
                })
            }

            /// Name of the default parameter file of this term, relative to the data directory
            pub fn default_parameter_file() -> &'static str { $default_file }

            fn window_property(&self, system: &SurpassSystem, window: usize) -> f64 {
                system.distance(window, window + $span - 1)
            }
        }

        impl ByResidueEnergy for $name {
            fn calculate(&self, system: &SurpassSystem) -> f64 {
                let mut en = 0.0;
                for w in 0..self.mf.count_windows() {
                    en += self.mf.score_property(w, self.window_property(system, w));
                }
                en
            }

            fn calculate_by_residue(&self, system: &SurpassSystem, which_residue: usize) -> f64 {
                let mut en = 0.0;
                // the window starting at this residue
                if which_residue < self.mf.count_windows() {
                    en += self.mf.score_property(which_residue, self.window_property(system, which_residue));
                }
                // the window ending at this residue
                if which_residue >= $span - 1 {
                    let w = which_residue - ($span - 1);
                    en += self.mf.score_property(w, self.window_property(system, w));
                }
                en
            }

            fn calculate_by_chunk(&self, system: &SurpassSystem, chunk_from: usize, chunk_to: usize) -> f64 {
                if self.mf.count_windows() == 0 { return 0.0; }
                let first = chunk_from.saturating_sub($span - 1);
                let last = chunk_to.min(self.mf.count_windows() - 1);
                let mut en = 0.0;
                for w in first..=last {
                    en += self.mf.score_property(w, self.window_property(system, w));
                }
                en
            }

            fn name(&self) -> &str { $str_name }
        }
    };
}

surpass_r_term!(SurpassR12, 2, "SurpassR12", "local/R12_surpass.dat");
surpass_r_term!(SurpassR13, 3, "SurpassR13", "local/R13_surpass.dat");
surpass_r_term!(SurpassR14, 4, "SurpassR14", "local/R14_surpass.dat");
surpass_r_term!(SurpassR15, 5, "SurpassR15", "local/R15_surpass.dat");

/// Knowledge-based potential scoring the planar angle of three consecutive beads.
///
/// The angle measured for window `i` has its vertex at bead `i + 1`; the window
/// is keyed by positions `i` and `i + 2`, exactly like the `R13` distance term.
pub struct SurpassA13 {
    mf: ShortRangeMF,
}

impl SurpassA13 {
    /// Creates the term from a parameter file; `"-"` selects the default file of this term.
    pub fn new(scored_secondary: &SecondaryStructure, ff_file: &str,
               pseudocounts: f64) -> Result<SurpassA13, DataError> {
        Ok(SurpassA13 { mf: ShortRangeMF::new(scored_secondary, ff_file, 0, 2, 3, pseudocounts)? })
    }

    /// Name of the default parameter file of this term, relative to the data directory
    pub fn default_parameter_file() -> &'static str { "local/A13_surpass.dat" }

    fn window_property(&self, system: &SurpassSystem, window: usize) -> f64 {
        planar_angle3(&system.pos(window), &system.pos(window + 1), &system.pos(window + 2))
    }
}

impl ByResidueEnergy for SurpassA13 {
    fn calculate(&self, system: &SurpassSystem) -> f64 {
        let mut en = 0.0;
        for w in 0..self.mf.count_windows() {
            en += self.mf.score_property(w, self.window_property(system, w));
        }
        en
    }

    fn calculate_by_residue(&self, system: &SurpassSystem, which_residue: usize) -> f64 {
        let mut en = 0.0;
        if which_residue < self.mf.count_windows() {
            en += self.mf.score_property(which_residue, self.window_property(system, which_residue));
        }
        if which_residue >= 2 {
            let w = which_residue - 2;
            en += self.mf.score_property(w, self.window_property(system, w));
        }
        en
    }

    fn calculate_by_chunk(&self, system: &SurpassSystem, chunk_from: usize, chunk_to: usize) -> f64 {
        if self.mf.count_windows() == 0 { return 0.0; }
        let first = chunk_from.saturating_sub(2);
        let last = chunk_to.min(self.mf.count_windows() - 1);
        let mut en = 0.0;
        for w in first..=last {
            en += self.mf.score_property(w, self.window_property(system, w));
        }
        en
    }

    fn name(&self) -> &str { "SurpassA13" }
}
