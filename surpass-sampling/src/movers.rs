use rand::distributions::Distribution;
use rand::rngs::SmallRng;
use rand::Rng;
use rand_distr::UnitBall;

use surpass_ff::{ByResidueEnergy, TotalEnergyByResidue};
use surpass_model::SurpassSystem;
use surpass_pdb::calc::{Rototranslation, Vec3};

use crate::acceptance::{AcceptanceStatistics, MetropolisCriterion};

/// Mover changes a given conformation of a system.
///
/// A `perturb()` call proposes a change, evaluates the energy difference of
/// the affected residue range and either commits the change or restores the
/// previous coordinates, according to the acceptance criterion. The inclusive
/// range of modified residues is returned for accepted moves.
pub trait Mover: Send {
    /// Attempts a single Monte Carlo move
    fn perturb(&mut self, system: &mut SurpassSystem, energy: &TotalEnergyByResidue,
               acc: &MetropolisCriterion, rng: &mut SmallRng) -> Option<(usize, usize)>;

    /// Success statistics recorded so far by this mover
    fn acceptance_statistics(&self) -> AcceptanceStatistics;

    /// Maximum range of perturbation allowed for this mover
    fn max_range(&self) -> f64;

    /// Sets the new maximum range of perturbation
    fn set_max_range(&mut self, new_val: f64);

    /// Name of this mover, used to label columns of the acceptance table
    fn name(&self) -> &str;
}

/// draws a displacement uniformly from a ball of a given radius
fn uniform_ball(max_range: f64, rng: &mut SmallRng) -> Vec3 {
    let p: [f64; 3] = UnitBall.sample(rng);
    Vec3::new(p[0] * max_range, p[1] * max_range, p[2] * max_range)
}

/// A mover that displaces a single, randomly selected residue by a random vector.
pub struct PerturbResidue {
    max_step: f64,
    succ_rate: AcceptanceStatistics,
}

impl PerturbResidue {
    /// Creates a new mover; `max_range` is the radius of the displacement ball.
    pub fn new(max_range: f64) -> PerturbResidue {
        PerturbResidue { max_step: max_range, succ_rate: Default::default() }
    }
}

impl Mover for PerturbResidue {
    fn perturb(&mut self, system: &mut SurpassSystem, energy: &TotalEnergyByResidue,
               acc: &MetropolisCriterion, rng: &mut SmallRng) -> Option<(usize, usize)> {

        if self.max_step <= 0.0 {
            self.succ_rate.n_failed += 1;
            return None;
        }
        let i_moved = rng.gen_range(0..system.count_residues());
        let old_pos = system.pos(i_moved);
        let en_before = energy.calculate_by_residue(system, i_moved);

        let mut new_pos = old_pos;
        new_pos += &uniform_ball(self.max_step, rng);
        system.set_pos(i_moved, &new_pos);
        let en_after = energy.calculate_by_residue(system, i_moved);

        if acc.check(en_before, en_after, rng) {
            self.succ_rate.n_succ += 1;
            Some((i_moved, i_moved))
        } else {
            system.set_pos(i_moved, &old_pos);
            self.succ_rate.n_failed += 1;
            None
        }
    }

    fn acceptance_statistics(&self) -> AcceptanceStatistics { self.succ_rate.clone() }

    fn max_range(&self) -> f64 { self.max_step }

    fn set_max_range(&mut self, new_val: f64) { self.max_step = new_val; }

    fn name(&self) -> &str { "PerturbResidue" }
}

/// A mover that perturbs a contiguous chain fragment of a fixed length.
///
/// Half of the proposals translate the whole fragment by a random vector; the
/// other half rotate it around the axis through its two anchor beads, which
/// preserves the fragment endpoints' bonds to the rest of the chain. Fragments
/// that touch a chain end are always translated, having no anchors to rotate
/// about.
pub struct PerturbChainFragment {
    n_moved: usize,
    max_step: f64,
    max_angle: f64,
    succ_rate: AcceptanceStatistics,
}

impl PerturbChainFragment {
    /// Creates a mover of `n_moved`-residue fragments.
    pub fn new(n_moved: usize, max_range: f64, max_angle: f64) -> PerturbChainFragment {
        assert!(n_moved >= 1, "a fragment holds at least one residue");
        PerturbChainFragment { n_moved, max_step: max_range, max_angle, succ_rate: Default::default() }
    }

    /// The number of residues moved by every proposal
    pub fn fragment_length(&self) -> usize { self.n_moved }
}

impl Mover for PerturbChainFragment {
    fn perturb(&mut self, system: &mut SurpassSystem, energy: &TotalEnergyByResidue,
               acc: &MetropolisCriterion, rng: &mut SmallRng) -> Option<(usize, usize)> {

        if self.max_step <= 0.0 || system.count_residues() < self.n_moved {
            self.succ_rate.n_failed += 1;
            return None;
        }
        // pick a fragment that does not cross a chain boundary
        let mut placement = None;
        for _ in 0..1000 {
            let first = rng.gen_range(0..system.count_residues() - self.n_moved + 1);
            let last = first + self.n_moved - 1;
            if system.chain_for_atom(first) == system.chain_for_atom(last) {
                placement = Some((first, last));
                break;
            }
        }
        let Some((first, last)) = placement else {
            // every chain is shorter than the fragment
            self.succ_rate.n_failed += 1;
            return None;
        };
        let (chain_first, chain_last) = system.atoms_for_chain(system.chain_for_atom(first));

        let en_before = energy.calculate_by_chunk(system, first, last);
        let backup: Vec<Vec3> = (first..=last).map(|i| system.pos(i)).collect();

        // the kink needs two anchor beads and a non-degenerate axis between them
        let has_anchors = first > chain_first && last < chain_last
            && system.distance(first - 1, last + 1) > 1e-6;
        if has_anchors && rng.gen::<bool>() {
            // endpoint-preserving kink around the anchor axis
            let angle = rng.gen_range(-self.max_angle..self.max_angle);
            let axis_from = system.pos(first - 1);
            let axis_to = system.pos(last + 1);
            let roto = Rototranslation::around_axis(&axis_from, &axis_to, angle);
            for i in first..=last {
                let mut v = system.pos(i);
                roto.apply_mut(&mut v);
                system.set_pos(i, &v);
            }
        } else {
            let shift = uniform_ball(self.max_step, rng);
            for i in first..=last {
                let mut v = system.pos(i);
                v += &shift;
                system.set_pos(i, &v);
            }
        }

        let en_after = energy.calculate_by_chunk(system, first, last);
        if acc.check(en_before, en_after, rng) {
            self.succ_rate.n_succ += 1;
            Some((first, last))
        } else {
            for (i, pos) in (first..=last).zip(backup.iter()) {
                system.set_pos(i, pos);
            }
            self.succ_rate.n_failed += 1;
            None
        }
    }

    fn acceptance_statistics(&self) -> AcceptanceStatistics { self.succ_rate.clone() }

    fn max_range(&self) -> f64 { self.max_step }

    fn set_max_range(&mut self, new_val: f64) { self.max_step = new_val; }

    fn name(&self) -> &str { "PerturbChainFragment" }
}
