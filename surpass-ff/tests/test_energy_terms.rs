use std::path::Path;
use std::sync::Arc;

use surpass_ff::{create_surpass_energy, ByResidueEnergy, ForceFieldConfig, ShortRangeMF,
                 SurpassContactEnergy, SurpassHydrogenBond, SurpassLocalRepulsionEnergy};
use surpass_model::{bead_type_from_ss, SurpassBead, SurpassSystem};
use surpass_pdb::calc::Vec3;
use surpass_pdb::SecondaryStructure;

fn forcefield_dir() -> &'static Path { Path::new("../data/forcefield") }

fn system_from(ss: &str, positions: &[(f64, f64, f64)]) -> SurpassSystem {
    assert_eq!(ss.len(), positions.len());
    let beads: Vec<SurpassBead> = ss.bytes().zip(positions.iter()).enumerate()
        .map(|(i, (code, &(x, y, z)))| {
            SurpassBead::new(Vec3::new(x, y, z), 0, i, bead_type_from_ss(code))
        })
        .collect();
    SurpassSystem::new(beads, vec![String::from("A")])
}

/// beads spread 20 A apart so no pair interacts unless moved on purpose
fn sparse_system(ss: &str) -> SurpassSystem {
    let positions: Vec<(f64, f64, f64)> = (0..ss.len())
        .map(|i| (i as f64 * 20.0, 0.0, 0.0))
        .collect();
    system_from(ss, &positions)
}

fn contact_over(system: &SurpassSystem) -> SurpassContactEnergy {
    let hb = Arc::new(SurpassHydrogenBond::new(system));
    SurpassContactEnergy::new(hb, forcefield_dir(), 2.0, -2.0, 0.2).unwrap()
}

#[test]
fn contact_skips_close_sequence_neighbors() {
    // beads 2 and 6 sit in different helices at a rewarding distance,
    // but |i - j| == 4 keeps them out of the potential
    let mut system = sparse_system("HHHHHCHHHHH");
    let p = system.pos(2);
    system.set_pos(6, &Vec3::new(p.x + 5.5, 0.1, 0.0));
    let contact = contact_over(&system);
    assert_eq!(contact.calculate(&system), 0.0);
}

#[test]
fn same_type_helix_contact_needs_larger_separation() {
    // beads 2 and 7: |i - j| == 5, both H - excluded from the reward
    let mut system = sparse_system("HHHHHCHHHHH");
    let p = system.pos(2);
    system.set_pos(7, &Vec3::new(p.x + 5.5, 0.1, 0.0));
    let contact = contact_over(&system);
    assert_eq!(contact.calculate(&system), 0.0);

    // beads 2 and 8: |i - j| == 6 - the same geometry now earns the reward
    let mut system = sparse_system("HHHHHCHHHHH");
    let p = system.pos(2);
    system.set_pos(8, &Vec3::new(p.x + 5.5, 0.1, 0.0));
    let contact = contact_over(&system);
    assert!((contact.calculate(&system) + 2.0).abs() < 1e-9);
    assert!((contact.calculate_by_residue(&system, 2) + 2.0).abs() < 1e-9);
}

#[test]
fn contact_penalizes_a_clash() {
    let mut system = sparse_system("HHHHHCHHHHH");
    let p = system.pos(2);
    // H-H shortest distance is 0.2 + 3.0; a pair at 2.0 A clashes
    system.set_pos(8, &Vec3::new(p.x + 2.0, 0.1, 0.0));
    let contact = contact_over(&system);
    assert!((contact.calculate(&system) - 2.0).abs() < 1e-9);
}

#[test]
fn coil_beads_never_earn_the_reward() {
    let mut system = sparse_system("CCCCCCCCCCC");
    let p = system.pos(2);
    system.set_pos(9, &Vec3::new(p.x + 6.0, 0.1, 0.0));
    let contact = contact_over(&system);
    // all coil beads share the loop element, so the pair never reaches the well
    assert_eq!(contact.calculate(&system), 0.0);
}

#[test]
fn local_repulsion_fires_below_the_clash_distance() {
    let mut system = sparse_system("CCCCC");
    let repulsion = SurpassLocalRepulsionEnergy::new(forcefield_dir(), 4.0).unwrap();
    assert_eq!(repulsion.calculate(&system), 0.0);

    // pull bead 1 on top of bead 0: separation 1 clashes below 1.2 A
    system.set_pos(1, &Vec3::new(0.5, 0.0, 0.0));
    assert!((repulsion.calculate(&system) - 4.0).abs() < 1e-9);
    assert!((repulsion.calculate_by_residue(&system, 0) - 4.0).abs() < 1e-9);
    assert!((repulsion.calculate_by_residue(&system, 3) - 0.0).abs() < 1e-9);
}

#[test]
fn uniform_ss_fractions_average_the_nine_splines() {
    // nine constant distributions valued 1..9 under a GG window
    let mut text = String::from("POTENTIAL TEST\n");
    let mut value = 0;
    for ss_1 in ["H", "E", "C"] {
        for ss_2 in ["H", "E", "C"] {
            value += 1;
            text.push_str(&format!("KEY GG.{}{}\n", ss_1, ss_2));
            text.push_str(&format!("0.0 {}.0\n10.0 {}.0\n", value, value));
        }
    }
    let fname = std::env::temp_dir().join("surpass_uniform_mix_test.dat");
    std::fs::write(&fname, text).unwrap();

    let mut sec = SecondaryStructure::new("t", "GG", "CC");
    sec.set_fractions(0, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0);
    sec.set_fractions(1, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0);
    let mf = ShortRangeMF::new(&sec, fname.to_str().unwrap(), 0, 1, 2, -1.0).unwrap();

    // the probability-weighted mix collapses to the arithmetic mean of 1..9
    assert!((mf.score_property(0, 5.0) - 5.0).abs() < 1e-9);
}

#[test]
fn unknown_term_name_fails_the_setup() {
    let system = sparse_system("CCCCC");
    let scored_secondary = SecondaryStructure::new("t", "GGGGG", "CCCCC");
    let config = ForceFieldConfig::from_string("SurpassMagicEnergy 1.0\n").unwrap();
    let result = create_surpass_energy(&system, &scored_secondary, &config, forcefield_dir());
    assert!(result.is_err());
}

#[test]
fn total_is_the_weighted_sum_of_components() {
    let mut positions: Vec<(f64, f64, f64)> = Vec::new();
    for i in 0..5 { positions.push((0.0, i as f64 * 3.4, 0.0)); }
    positions.push((0.8, 16.2, 0.5));
    positions.push((2.3, 17.2, 0.8));
    positions.push((3.8, 16.2, 0.5));
    for i in 0..5 { positions.push((4.6, 13.6 - i as f64 * 3.4, 0.0)); }
    let system = system_from("EEEEECCCEEEEE", &positions);

    let mut scored_secondary = SecondaryStructure::new("t", &"G".repeat(13), "EEEEECCCEEEEE");
    scored_secondary.set_fractions(4, 0.0, 0.75, 0.25);
    let config = ForceFieldConfig::from_string(
        "SurpassR12 1.0 - 0.01\n\
         SurpassR13 0.5 - 0.01\n\
         SurpassA13 1.5 - 0.01\n\
         SurpassHydrogenBond 1.0\n\
         SurpassContactEnergy 0.8 2.0 -2.0 0.2\n\
         SurpassCentrosymmetricEnergy 0.2 - 0.01\n\
         SurpassLocalRepulsionEnergy 1.0 4.0\n\
         SurpassHelixStiffnessEnergy 1.0\n").unwrap();
    let (energy, hb) = create_surpass_energy(&system, &scored_secondary, &config, forcefield_dir()).unwrap();
    assert!(hb.is_some());
    assert_eq!(energy.count_components(), 8);

    let weights = energy.get_factors().clone();
    let mut expected = 0.0;
    for i in 0..energy.count_components() {
        expected += weights[i] * energy.calculate_component(&system, i);
    }
    let total = energy.calculate(&system);
    assert!((total - expected).abs() <= 1e-9 * expected.abs().max(1.0));

    // a chunk covering the whole system reproduces the total for every component
    for i in 0..energy.count_components() {
        let component = energy.get_component(i);
        let whole = component.calculate_by_chunk(&system, 0, system.count_residues() - 1);
        assert!((whole - component.calculate(&system)).abs() < 1e-9,
            "chunk/total mismatch for {}", component.name());
    }
}
