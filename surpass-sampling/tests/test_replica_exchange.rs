use std::sync::Arc;

use surpass_ff::{ByResidueEnergy, TotalEnergyByResidue};
use surpass_model::{SurpassBead, SurpassSystem, BEAD_C};
use surpass_pdb::calc::Vec3;
use surpass_sampling::{IsothermalMC, ObserveReplicaFlow, PerturbResidue, ReplicaExchangeMC,
                       ReplicaExchangeObservationMode};

struct HarmonicBonds {
    k: f64,
    d0: f64,
}

impl HarmonicBonds {
    fn bond_energy(&self, system: &SurpassSystem, i: usize) -> f64 {
        if i + 1 >= system.count_atoms() { return 0.0; }
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
        (chunk_from.saturating_sub(1)..=chunk_to).map(|i| self.bond_energy(system, i)).sum()
    }

    fn name(&self) -> &str { "HarmonicBonds" }
}

fn straight_chain(n: usize) -> SurpassSystem {
    let beads: Vec<SurpassBead> = (0..n)
        .map(|i| SurpassBead::new(Vec3::new(i as f64 * 3.8, 0.0, 0.0), 0, i, BEAD_C))
        .collect();
    SurpassSystem::new(beads, vec![String::from("A")])
}

fn replica(n_beads: usize, temperature: f64, seed: u64) -> (SurpassSystem, IsothermalMC, TotalEnergyByResidue) {
    let system = straight_chain(n_beads);
    let mut energy = TotalEnergyByResidue::new();
    energy.add_component(Arc::new(HarmonicBonds { k: 1.0, d0: 3.8 }), 1.0);
    let mut sampler = IsothermalMC::new(temperature, seed);
    sampler.cycles(2, 2, 2);
    sampler.movers_mut().add_mover(Box::new(PerturbResidue::new(0.5)), n_beads as f64);
    (system, sampler, energy)
}

#[test]
fn equal_temperatures_always_swap() {
    // identical rung temperatures make every exchange criterion trivially pass
    let replicas = vec![replica(10, 1.0, 1), replica(10, 1.0, 2)];
    let mut remc = ReplicaExchangeMC::new(replicas, ReplicaExchangeObservationMode::Isotemporal, 9);
    remc.replica_exchanges(1);
    remc.run();

    // the two replicas traded rungs
    assert_eq!(remc.replicas()[0].replica_index, 1);
    assert_eq!(remc.replicas()[1].replica_index, 0);
    assert_eq!(remc.replicas()[0].temperature_index, 0);
    assert_eq!(remc.replicas()[1].temperature_index, 1);
    // boundary flags: rung 0 is the lowest, rung 1 the highest of a two-rung ladder
    assert_eq!(remc.replicas()[0].replica_space_flag, 1);
    assert_eq!(remc.replicas()[1].replica_space_flag, 2);
    assert_eq!(remc.successful_exchanges(), &[1, 1]);
}

#[test]
fn neighbor_swap_rate_is_moderate() {
    let replicas = vec![replica(10, 1.0, 11), replica(10, 1.5, 12)];
    let mut remc = ReplicaExchangeMC::new(replicas, ReplicaExchangeObservationMode::Isotemporal, 13);

    let flow_fname = std::env::temp_dir().join("surpass_replica_flow_test.dat");
    remc.exchange_observer(Box::new(ObserveReplicaFlow::new(flow_fname.to_str().unwrap())));
    remc.replica_exchanges(100);
    remc.run();

    let accepted = remc.successful_exchanges()[0];
    assert!(accepted > 20 && accepted < 80, "swap count out of range: {}", accepted);

    // one flow record per exchange attempt, covering both replicas
    let flow = std::fs::read_to_string(&flow_fname).unwrap();
    let rows: Vec<&str> = flow.lines().collect();
    assert_eq!(rows.len(), 100);
    assert_eq!(rows[0].split_whitespace().count(), 5);
}

#[test]
fn samplers_keep_the_rung_temperature() {
    let mut replicas = vec![replica(10, 1.0, 21), replica(10, 1.0, 22)];
    let tra_files: Vec<std::path::PathBuf> = (0..2)
        .map(|i| std::env::temp_dir().join(format!("surpass_remc_isothermal_test_{}.pdb", i)))
        .collect();
    for (task, fname) in replicas.iter_mut().zip(tra_files.iter()) {
        task.1.outer_cycle_observer(
            Box::new(surpass_sampling::PdbTrajectory::new(fname.to_str().unwrap(), false)));
    }

    let mut remc = ReplicaExchangeMC::new(replicas, ReplicaExchangeObservationMode::Isothermal, 23);
    remc.replica_exchanges(3);
    remc.run();

    // whatever replica sits at a rung, it samples at that rung's temperature
    for (rung, task) in remc.replicas().iter().enumerate() {
        assert_eq!(task.sampler.temperature(), remc.temperatures()[rung]);
        assert_eq!(task.temperature_index, rung);
    }
    // streams keep recording through the swaps: one frame per outer cycle per block
    for fname in &tra_files {
        let frames = std::fs::read_to_string(fname).unwrap()
            .lines().filter(|l| l.starts_with("MODEL")).count();
        assert_eq!(frames, 2 * 3);
    }
}
