use surpass_model::SurpassSystem;

use crate::array2d::Array2D;

/// The energy value used to signal a hard rejection of a Monte Carlo move.
///
/// Kernels that detect an inadmissible conformation short-circuit their driver
/// which returns this value; the Metropolis criterion can never accept a move
/// towards it.
pub const REJECTED_ENERGY: f64 = f64::MAX;

/// The uniform interface of SURPASS energy terms.
///
/// Implementations are pure functions of the current conformation apart from
/// internal caches; the hydrogen bond analyzer rebuilds its cache according to
/// the rules described at [`SurpassHydrogenBond`](crate::SurpassHydrogenBond).
pub trait ByResidueEnergy: Send + Sync {
    /// Evaluates the total energy of a system
    fn calculate(&self, system: &SurpassSystem) -> f64;

    /// Evaluates the energy attributed to a single residue.
    ///
    /// The value covers all interactions of `which_residue`, counted from its
    /// perspective; the sum over residues therefore double-counts pairwise terms.
    fn calculate_by_residue(&self, system: &SurpassSystem, which_residue: usize) -> f64;

    /// Evaluates the energy of residues `chunk_from..=chunk_to`: their
    /// interactions with the rest of the system plus the internal energy of the chunk.
    fn calculate_by_chunk(&self, system: &SurpassSystem, chunk_from: usize, chunk_to: usize) -> f64;

    /// Evaluates the total energy, accumulating a by-residue-pair decomposition.
    ///
    /// The default implementation ignores the map.
    fn calculate_map(&self, system: &SurpassSystem, _energy_map: &mut Array2D<f64>) -> f64 {
        self.calculate(system)
    }

    /// The name of this energy term, used to label columns of the energy table
    fn name(&self) -> &str;
}
