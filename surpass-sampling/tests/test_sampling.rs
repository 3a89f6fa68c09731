use rand::rngs::SmallRng;
use rand::SeedableRng;

use surpass_ff::{ByResidueEnergy, TotalEnergyByResidue};
use surpass_model::{SurpassBead, SurpassSystem, BEAD_C, BEAD_H};
use surpass_pdb::calc::Vec3;
use surpass_sampling::{annealing_temperatures, IsothermalMC, MetropolisCriterion, Mover,
                       PerturbChainFragment, PerturbResidue, SimulatedAnnealing};

/// a minimal energy for sampler tests: harmonic springs between bonded beads
struct HarmonicBonds {
    k: f64,
    d0: f64,
}

impl HarmonicBonds {
    fn bond_energy(&self, system: &SurpassSystem, i: usize) -> f64 {
        if i + 1 >= system.count_atoms() { return 0.0; }
        if system.chain_for_atom(i) != system.chain_for_atom(i + 1) { return 0.0; }
        let d = system.distance(i, i + 1) - self.d0;
        self.k * d * d
    }
}

impl ByResidueEnergy for HarmonicBonds {
    fn calculate(&self, system: &SurpassSystem) -> f64 {
        (0..system.count_atoms()).map(|i| self.bond_energy(system, i)).sum()
    }

    fn calculate_by_residue(&self, system: &SurpassSystem, which_residue: usize) -> f64 {
        let mut en = self.bond_energy(system, which_residue);
        if which_residue > 0 { en += self.bond_energy(system, which_residue - 1); }
        en
    }

    fn calculate_by_chunk(&self, system: &SurpassSystem, chunk_from: usize, chunk_to: usize) -> f64 {
        let first = chunk_from.saturating_sub(1);
        (first..=chunk_to).map(|i| self.bond_energy(system, i)).sum()
    }

    fn name(&self) -> &str { "HarmonicBonds" }
}

fn straight_chain(n: usize, bead_type: u8) -> SurpassSystem {
    let beads: Vec<SurpassBead> = (0..n)
        .map(|i| SurpassBead::new(Vec3::new(i as f64 * 3.8, 0.0, 0.0), 0, i, bead_type))
        .collect();
    SurpassSystem::new(beads, vec![String::from("A")])
}

fn harmonic_energy(k: f64) -> TotalEnergyByResidue {
    let mut energy = TotalEnergyByResidue::new();
    energy.add_component(std::sync::Arc::new(HarmonicBonds { k, d0: 3.8 }), 1.0);
    energy
}

#[test]
fn zero_range_mover_changes_nothing() {
    let mut system = straight_chain(10, BEAD_H);
    let start: Vec<Vec3> = (0..10).map(|i| system.pos(i)).collect();
    let energy = harmonic_energy(10.0);

    let mut sampler = IsothermalMC::new(1.0, 42);
    sampler.cycles(1, 1, 1);
    sampler.movers_mut().add_mover(Box::new(PerturbResidue::new(0.0)), 10.0);
    let en_before = energy.calculate(&system);

    let mut annealing = SimulatedAnnealing::new(sampler, vec![1.0]);
    annealing.run(&mut system, &energy);

    let stats = annealing.sampler_mut().movers().get_mover(0).acceptance_statistics();
    assert_eq!(stats.n_succ, 0);
    assert_eq!(stats.n_failed, 10);
    assert_eq!(energy.calculate(&system), en_before);
    for (i, p) in start.iter().enumerate() {
        assert_eq!(system.pos(i), *p);
    }
}

#[test]
fn acceptance_follows_the_temperature() {
    let energy = harmonic_energy(100.0);

    // hot: almost every small move passes
    let mut system = straight_chain(30, BEAD_C);
    let mut hot = IsothermalMC::new(100.0, 42);
    hot.cycles(10, 5, 2);
    hot.movers_mut().add_mover(Box::new(PerturbResidue::new(0.3)), 30.0);
    hot.run(&mut system, &energy);
    assert!(hot.movers().get_mover(0).acceptance_statistics().success_rate() > 0.8);

    // cold: a chain at its energy minimum rejects nearly everything
    let mut system = straight_chain(30, BEAD_C);
    let mut cold = IsothermalMC::new(0.01, 42);
    cold.cycles(10, 5, 2);
    cold.movers_mut().add_mover(Box::new(PerturbResidue::new(0.3)), 30.0);
    cold.run(&mut system, &energy);
    assert!(cold.movers().get_mover(0).acceptance_statistics().success_rate() < 0.05);
}

#[test]
fn equal_seeds_reproduce_a_trajectory() {
    let energy = harmonic_energy(1.0);
    let mut first = straight_chain(20, BEAD_C);
    let mut second = straight_chain(20, BEAD_C);

    for system in [&mut first, &mut second] {
        let mut sampler = IsothermalMC::new(2.0, 1234);
        sampler.cycles(5, 3, 1);
        sampler.movers_mut().add_mover(Box::new(PerturbResidue::new(0.5)), 20.0);
        sampler.run(system, &energy);
    }
    for i in 0..20 {
        assert_eq!(first.pos(i), second.pos(i));
    }
}

#[test]
fn fragment_moves_are_rigid() {
    let mut system = straight_chain(12, BEAD_C);
    // no energy components: every proposal is accepted
    let energy = TotalEnergyByResidue::new();
    let criterion = MetropolisCriterion::new(1.0);
    let mut rng = SmallRng::seed_from_u64(7);
    let mut mover = PerturbChainFragment::new(4, 1.0, 0.5);

    for _ in 0..50 {
        let internal_before: Vec<f64> = (0..11).map(|i| system.distance(i, i + 1)).collect();
        let moved = mover.perturb(&mut system, &energy, &criterion, &mut rng);
        let (first, last) = moved.expect("every move should be accepted with no energy components");
        assert_eq!(last - first + 1, 4);
        // distances inside the fragment survive both the translation and the kink
        for i in first..last {
            assert!((system.distance(i, i + 1) - internal_before[i]).abs() < 1e-9);
        }
    }
    let stats = mover.acceptance_statistics();
    assert_eq!(stats.n_succ, 50);
}

#[test]
fn annealing_schedule_is_linear_and_descending() {
    let ladder = annealing_temperatures(2.0, 0.5, 4);
    assert_eq!(ladder.len(), 4);
    assert!((ladder[0] - 2.0).abs() < 1e-12);
    assert!((ladder[3] - 0.5).abs() < 1e-12);
    for pair in ladder.windows(2) {
        assert!(pair[0] > pair[1]);
    }
}
