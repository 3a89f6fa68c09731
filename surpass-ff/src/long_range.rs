use surpass_model::SurpassSystem;

use crate::array2d::Array2D;
use crate::energy::REJECTED_ENERGY;

/// A pairwise kernel driven over residue pairs with a minimum sequence separation.
///
/// A long-range term provides the kernel and inherits the three looping
/// strategies from the free driver functions below. The kernel accumulates
/// into `energy` and returns `false` to signal a hard rejection, which makes
/// the driver short-circuit and return [`REJECTED_ENERGY`](REJECTED_ENERGY).
pub trait LongRangeEnergyKernel: Send + Sync {
    /// Energy between residues `i` and `j` is evaluated only when `|i - j| >= residue_offset()`
    fn residue_offset(&self) -> usize;

    /// Evaluates the interaction of a residue pair
    fn kernel(&self, system: &SurpassSystem, moved_residue: usize, other_residue: usize, energy: &mut f64) -> bool;

    /// Kernel variant that additionally stores the pair energy in a matrix.
    ///
    /// The default implementation evaluates the kernel and writes the energy
    /// increment into `energy_map[moved][other]` and its mirror cell.
    fn kernel_map(&self, system: &SurpassSystem, moved_residue: usize, other_residue: usize,
                  energy: &mut f64, energy_map: &mut Array2D<f64>) -> bool {
        let before = *energy;
        let ok = self.kernel(system, moved_residue, other_residue, energy);
        let pair_energy = *energy - before;
        if pair_energy != 0.0 {
            energy_map.set(moved_residue, other_residue,
                           energy_map.get(moved_residue, other_residue) + pair_energy);
            energy_map.set(other_residue, moved_residue,
                           energy_map.get(other_residue, moved_residue) + pair_energy);
        }
        ok
    }
}

/// Energy of one residue interacting with every other residue at least `offset` apart.
pub fn long_range_by_residue<K: LongRangeEnergyKernel + ?Sized>(
    term: &K, system: &SurpassSystem, which_residue: usize) -> f64 {

    let offset = term.residue_offset();
    let n = system.count_residues();
    let mut energy = 0.0;
    if which_residue >= offset {
        for ri in 0..=which_residue - offset {
            if !term.kernel(system, which_residue, ri, &mut energy) { return REJECTED_ENERGY; }
        }
    }
    for ri in which_residue + offset..n {
        if !term.kernel(system, which_residue, ri, &mut energy) { return REJECTED_ENERGY; }
    }

    energy
}

/// Energy of a residue range `[chunk_from, chunk_to]` with the rest of the system
/// plus the internal energy of the range.
pub fn long_range_by_chunk<K: LongRangeEnergyKernel + ?Sized>(
    term: &K, system: &SurpassSystem, chunk_from: usize, chunk_to: usize) -> f64 {

    let offset = term.residue_offset();
    let n = system.count_residues();
    let mut energy = 0.0;
    for chunk_r in chunk_from..=chunk_to {
        // the chunk residue with its upstream partners outside the chunk
        if chunk_r >= offset && chunk_from > 0 {
            let last_upstream = (chunk_r - offset).min(chunk_from - 1);
            for ri in 0..=last_upstream {
                if !term.kernel(system, chunk_r, ri, &mut energy) { return REJECTED_ENERGY; }
            }
        }
        // the chunk residue with its downstream partners outside the chunk
        for ri in (chunk_to + 1).max(chunk_r + offset)..n {
            if !term.kernel(system, chunk_r, ri, &mut energy) { return REJECTED_ENERGY; }
        }
    }
    // the chunk interacting with itself
    for ri in chunk_from + offset..=chunk_to {
        for rj in chunk_from..=ri - offset {
            if !term.kernel(system, rj, ri, &mut energy) { return REJECTED_ENERGY; }
        }
    }

    energy
}

/// Total energy: every pair at least `offset` apart, evaluated once.
pub fn long_range_total<K: LongRangeEnergyKernel + ?Sized>(term: &K, system: &SurpassSystem) -> f64 {
    let offset = term.residue_offset();
    let n = system.count_residues();
    let mut energy = 0.0;
    for k in offset..n {
        for i in 0..=k - offset {
            if !term.kernel(system, k, i, &mut energy) { return REJECTED_ENERGY; }
        }
    }

    energy
}

/// Total energy with the by-pair decomposition accumulated into a matrix.
pub fn long_range_total_map<K: LongRangeEnergyKernel + ?Sized>(
    term: &K, system: &SurpassSystem, energy_map: &mut Array2D<f64>) -> f64 {

    let offset = term.residue_offset();
    let n = system.count_residues();
    let mut energy = 0.0;
    for k in offset..n {
        for i in 0..=k - offset {
            if !term.kernel_map(system, k, i, &mut energy, energy_map) { return REJECTED_ENERGY; }
        }
    }

    energy
}

#[cfg(test)]
mod tests {
    use super::*;
    use surpass_model::{SurpassBead, SurpassSystem, BEAD_C};
    use surpass_pdb::calc::Vec3;

    /// counts interacting pairs; used to verify the looping strategies
    struct PairCounter { offset: usize }

    impl LongRangeEnergyKernel for PairCounter {
        fn residue_offset(&self) -> usize { self.offset }
        fn kernel(&self, _s: &SurpassSystem, _i: usize, _j: usize, energy: &mut f64) -> bool {
            *energy += 1.0;
            true
        }
    }

    fn chain_of(n: usize) -> SurpassSystem {
        let beads = (0..n)
            .map(|i| SurpassBead::new(Vec3::new(i as f64 * 3.8, 0.0, 0.0), 0, i, BEAD_C))
            .collect();
        SurpassSystem::new(beads, vec![String::from("A")])
    }

    #[test]
    fn total_counts_each_pair_once() {
        let system = chain_of(6);
        let term = PairCounter { offset: 1 };
        assert_eq!(long_range_total(&term, &system) as usize, 15);
        let term3 = PairCounter { offset: 3 };
        // pairs with |i-j| >= 3 among 6 residues: (0,3..5),(1,4..5),(2,5)
        assert_eq!(long_range_total(&term3, &system) as usize, 6);
    }

    #[test]
    fn by_residue_counts_all_partners() {
        let system = chain_of(6);
        let term = PairCounter { offset: 1 };
        assert_eq!(long_range_by_residue(&term, &system, 0) as usize, 5);
        assert_eq!(long_range_by_residue(&term, &system, 3) as usize, 5);
    }

    #[test]
    fn chunk_covers_outside_and_inside_pairs() {
        let system = chain_of(6);
        let term = PairCounter { offset: 1 };
        // chunk [2,4]: outside partners 2x{0,1,5} minus none = (2,0)(2,1)(2,5)(3,0)(3,1)(3,5)(4,0)(4,1)(4,5)
        // inside pairs: (2,3)(2,4)(3,4)
        assert_eq!(long_range_by_chunk(&term, &system, 2, 4) as usize, 12);
        // whole system as a chunk equals the total
        assert_eq!(long_range_by_chunk(&term, &system, 0, 5) as usize, 15);
    }
}
