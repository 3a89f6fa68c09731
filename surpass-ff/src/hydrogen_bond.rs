use std::sync::Mutex;

use surpass_model::{SurpassSystem, BEAD_E};
use surpass_pdb::calc::Vec3;

use crate::array2d::Array2D;
use crate::energy::ByResidueEnergy;
use crate::union_find::UnionFind;

/// The longest accepted hydrogen bond, in Angstroms
const MAX_HBOND_LENGTH: f64 = 6.0;
/// Strands whose local vectors are warped more than this cosine never bond
const MIN_STRAND_COS: f64 = 0.57;
/// The smallest accepted angle between the two bonds of a donor, in degrees
const MIN_TWO_BOND_ANGLE: f64 = 125.0;
/// The optimal hydrogen bond length, in Angstroms
const OPTIMAL_HBOND_LENGTH: f64 = 4.65;

/// Energy premium of a single hydrogen bond of a given length.
fn bond_energy(r: f64) -> f64 {
    let d = r - OPTIMAL_HBOND_LENGTH;
    -(((-d * d).exp() + 0.57) / 0.57).ln()
}

struct HBondCache {
    revision: Option<u64>,
    /// up to two acceptors for every β bead, indexed by the bead's position in `atoms_in_beta`
    hydrogen_bonds: Vec<(Option<usize>, Option<usize>)>,
    /// hydrogen bond counts between strand pairs
    count_matrix: Array2D<i32>,
    /// 1 - two strands directly bonded; 2 - bridged by a common strand; 0 - apart
    beta_topology_matrix: Array2D<u8>,
    /// gathers reciprocally bonded strands into sheets
    sheets: UnionFind,
}

/// Detects hydrogen bonds between β beads and derives the sheet topology.
///
/// For every β bead the analyzer finds at most two acceptor partners, one per
/// strand, filtered by bond length, strand warp and bond geometry. Committed
/// bonds feed a strand-level count matrix; strand pairs bonded reciprocally
/// are united into sheets and recorded in the β topology matrix.
///
/// The analysis is cached and tied to the coordinate revision of the system:
/// [`rehash()`](SurpassHydrogenBond::rehash) is a no-op until some bead moves.
/// A by-residue energy query rehashes only when the queried bead is β;
/// total and by-chunk queries rehash unconditionally.
pub struct SurpassHydrogenBond {
    cache: Mutex<HBondCache>,
}

impl SurpassHydrogenBond {
    /// Creates the analyzer for a given system and runs the first analysis pass.
    pub fn new(system: &SurpassSystem) -> SurpassHydrogenBond {
        let n_strands = system.elements_beta().len().max(1);
        let hb = SurpassHydrogenBond {
            cache: Mutex::new(HBondCache {
                revision: None,
                hydrogen_bonds: vec![(None, None); system.atoms_in_beta().len()],
                count_matrix: Array2D::new(n_strands, n_strands, 0),
                beta_topology_matrix: Array2D::new(n_strands, n_strands, 0),
                sheets: UnionFind::new(system.elements_beta().len()),
            }),
        };
        hb.rehash(system);
        hb
    }

    /// Rebuilds the hydrogen bond list unless the system has not moved since the last pass.
    pub fn rehash(&self, system: &SurpassSystem) {
        let mut cache = self.cache.lock().unwrap();
        if cache.revision == Some(system.revision()) { return; }
        find_hydrogen_bonds(&mut cache, system);
        cache.revision = Some(system.revision());
    }

    /// Returns a copy of the per-bead hydrogen bond partners.
    ///
    /// The `i`-th entry holds the partners of the `i`-th β bead (in the order
    /// of `atoms_in_beta`); the partners themselves are bead indexes.
    pub fn hydrogen_bonds(&self) -> Vec<(Option<usize>, Option<usize>)> {
        self.cache.lock().unwrap().hydrogen_bonds.clone()
    }

    /// Returns a copy of the strand-level β topology matrix.
    pub fn beta_topology_matrix(&self) -> Array2D<u8> {
        self.cache.lock().unwrap().beta_topology_matrix.clone()
    }

    /// Returns a copy of the strand-level hydrogen bond count matrix.
    pub fn count_matrix(&self) -> Array2D<i32> {
        self.cache.lock().unwrap().count_matrix.clone()
    }

    /// True when two strands (given by their β ordinals) belong to the same sheet.
    pub fn strands_in_same_sheet(&self, strand_i: usize, strand_j: usize) -> bool {
        self.cache.lock().unwrap().sheets.same_set(strand_i, strand_j)
    }

    /// Counts the β sheets found by the last analysis pass.
    pub fn count_sheets(&self) -> usize {
        let mut cache = self.cache.lock().unwrap();
        let n = cache.sheets.len();
        (0..n).filter(|&i| cache.sheets.find_set(i) == i).count()
    }

    fn residue_energy(&self, system: &SurpassSystem, which_residue: usize) -> f64 {
        let cache = self.cache.lock().unwrap();
        let i = match system.atoms_in_beta().binary_search(&which_residue) {
            Ok(i) => i,
            Err(_) => return 0.0,
        };
        let mut en = 0.0;
        if let Some(p) = cache.hydrogen_bonds[i].0 {
            en += bond_energy(system.distance(which_residue, p));
        }
        if let Some(p) = cache.hydrogen_bonds[i].1 {
            en += bond_energy(system.distance(which_residue, p));
        }
        en
    }
}

impl ByResidueEnergy for SurpassHydrogenBond {
    fn calculate(&self, system: &SurpassSystem) -> f64 {
        self.rehash(system);
        let mut en = 0.0;
        for &y in system.atoms_in_beta() {
            en += self.residue_energy(system, y);
        }
        en
    }

    fn calculate_by_residue(&self, system: &SurpassSystem, which_residue: usize) -> f64 {
        if system.bead_type(which_residue) == BEAD_E { self.rehash(system); }
        self.residue_energy(system, which_residue)
    }

    fn calculate_by_chunk(&self, system: &SurpassSystem, chunk_from: usize, chunk_to: usize) -> f64 {
        self.rehash(system);
        let mut en = 0.0;
        for y in chunk_from..=chunk_to {
            en += self.residue_energy(system, y);
        }
        en
    }

    fn name(&self) -> &str { "SurpassHydrogenBond" }
}

/// The local direction of a strand at a given β bead.
///
/// Interior beads use the chord `pos(a+1) - pos(a-2)`; beads too close to the
/// chain start fall back to `pos(a+2) - pos(a)`, those too close to the chain
/// end to `pos(a) - pos(a-2)`.
fn vec_along(system: &SurpassSystem, a: usize) -> Vec3 {
    let (first, last) = system.atoms_for_chain(system.chain_for_atom(a));
    let mut v;
    if a >= first + 2 && a + 1 <= last {
        v = system.pos(a + 1);
        v -= &system.pos(a - 2);
    } else if a + 2 <= last {
        v = system.pos(a + 2);
        v -= &system.pos(a);
    } else if a >= first + 2 {
        v = system.pos(a);
        v -= &system.pos(a - 2);
    } else {
        // a chain this short holds no real strand; use whatever direction it has
        v = system.pos(last);
        v -= &system.pos(first);
    }
    v
}

fn abs_cos(a: &Vec3, b: &Vec3) -> f64 {
    (Vec3::dot(a, b) / (a.length() * b.length())).abs()
}

/// Finds the best acceptor candidate of every strand for a given donor.
///
/// Strands are visited in bead order; within each strand the candidate must
/// keep improving both the bond length and the bond-to-strand angle deviation.
fn find_acceptors(system: &SurpassSystem, y: usize) -> Vec<usize> {
    let v_y = vec_along(system, y);
    let element_y = system.ss_element(y);

    let mut acceptors: Vec<usize> = Vec::new();
    let mut best: Option<usize> = None;
    let mut dist = MAX_HBOND_LENGTH;
    let mut angle_dev = 20.0;
    let mut current_element: Option<u16> = None;

    for &j in system.atoms_in_beta() {
        let element_j = system.ss_element(j);
        if current_element != Some(element_j) {
            if let Some(b) = best.take() { acceptors.push(b); }
            current_element = Some(element_j);
            dist = MAX_HBOND_LENGTH;
            angle_dev = 20.0;
        }
        if element_j == element_y { continue; }

        let r = system.distance(y, j);
        if r > dist { continue; }
        let v_j = vec_along(system, j);
        if abs_cos(&v_y, &v_j) <= MIN_STRAND_COS { continue; }
        let mut h1 = system.pos(j);
        h1 -= &system.pos(y);
        let deviation = abs_cos(&h1, &v_y).min(abs_cos(&h1, &v_j));
        if deviation <= angle_dev {
            angle_dev = deviation;
            dist = r;
            best = Some(j);
        }
    }
    if let Some(b) = best.take() { acceptors.push(b); }

    acceptors
}

fn find_hydrogen_bonds(cache: &mut HBondCache, system: &SurpassSystem) {
    cache.beta_topology_matrix.clear(0);
    cache.count_matrix.clear(0);
    cache.sheets.disconnect();
    for hb in cache.hydrogen_bonds.iter_mut() { *hb = (None, None); }
    if system.atoms_in_beta().is_empty() { return; }

    let strand_of = |atom: usize| system.beta_strand_for_atom(atom).unwrap();

    for (index_y, &y) in system.atoms_in_beta().iter().enumerate() {
        let candidates = find_acceptors(system, y);
        let strand_y = strand_of(y);

        if candidates.len() < 2 {
            if let Some(&p) = candidates.first() {
                cache.hydrogen_bonds[index_y] = (Some(p), None);
                let c = cache.count_matrix.get(strand_y, strand_of(p));
                cache.count_matrix.set(strand_y, strand_of(p), c + 1);
            }
            continue;
        }

        // pick the pair of candidates closest to a straight two-bond geometry;
        // pairs too far from planar fall back to the better-connected single partner
        let mut is_good = false;
        let mut best_angle = MIN_TWO_BOND_ANGLE;
        let (mut id2, mut id3) = (0usize, 0usize);
        let mut fallback: Option<usize> = None;
        let mut to_remove: Vec<usize> = Vec::new();

        for k in 0..candidates.len() - 1 {
            for l in 1..candidates.len() - k {
                let mut h1 = system.pos(candidates[k]);
                h1 -= &system.pos(y);
                let mut h2 = system.pos(candidates[k + l]);
                h2 -= &system.pos(y);
                let value = (Vec3::dot(&h1, &h2) / (h1.length() * h2.length()))
                    .clamp(-1.0, 1.0).acos().to_degrees();
                if value >= best_angle {
                    is_good = true;
                    best_angle = value;
                    id2 = candidates[k];
                    id3 = candidates[k + l];
                } else {
                    let count_k = cache.count_matrix.get(strand_y, strand_of(candidates[k]));
                    let count_l = cache.count_matrix.get(strand_y, strand_of(candidates[k + l]));
                    if count_k > count_l {
                        fallback = Some(candidates[k]);
                        if candidates[k + l] < y { to_remove.push(candidates[k + l]); }
                    } else {
                        fallback = Some(candidates[k + l]);
                        if candidates[k] < y { to_remove.push(candidates[k]); }
                    }
                }
            }
        }

        if is_good {
            cache.hydrogen_bonds[index_y] = (Some(id2), Some(id3));
            to_remove.retain(|&rm| rm != id2 && rm != id3);
            for p in [id2, id3] {
                let c = cache.count_matrix.get(strand_y, strand_of(p));
                cache.count_matrix.set(strand_y, strand_of(p), c + 1);
            }
        } else {
            cache.hydrogen_bonds[index_y] = (fallback, None);
            if let Some(p) = fallback {
                let c = cache.count_matrix.get(strand_y, strand_of(p));
                cache.count_matrix.set(strand_y, strand_of(p), c + 1);
            }
        }

        // candidates rejected by the tiebreak lose their reciprocal bond to this donor
        for &rm in &to_remove {
            if let Ok(p) = system.atoms_in_beta().binary_search(&rm) {
                if cache.hydrogen_bonds[p].0 == Some(y) {
                    cache.hydrogen_bonds[p].0 = None;
                } else if cache.hydrogen_bonds[p].1 == Some(y) {
                    cache.hydrogen_bonds[p].1 = None;
                }
                let c = cache.count_matrix.get(strand_of(rm), strand_y);
                if c > 0 { cache.count_matrix.set(strand_of(rm), strand_y, c - 1); }
            }
        }
    }

    // reciprocally bonded strand pairs form sheets
    let n_strands = system.elements_beta().len();
    for ai in 0..n_strands {
        for aj in ai + 1..n_strands {
            if cache.count_matrix.get(ai, aj) > 0 && cache.count_matrix.get(aj, ai) > 0 {
                cache.beta_topology_matrix.set(ai, aj, 1);
                cache.beta_topology_matrix.set(aj, ai, 1);
                cache.sheets.union_set(ai, aj);
            }
        }
    }
    // strands bonded to a common neighbor but not to each other
    for ai in 0..n_strands {
        for aj in ai + 1..n_strands {
            if cache.beta_topology_matrix.get(ai, aj) == 1 { continue; }
            let bridged = (0..n_strands).any(|c| {
                cache.beta_topology_matrix.get(ai, c) == 1 && cache.beta_topology_matrix.get(aj, c) == 1
            });
            if bridged {
                cache.beta_topology_matrix.set(ai, aj, 2);
                cache.beta_topology_matrix.set(aj, ai, 2);
            }
        }
    }
}
