use surpass_ff::{ByResidueEnergy, SurpassHydrogenBond};
use surpass_model::{bead_type_from_ss, SurpassBead, SurpassSystem};
use surpass_pdb::calc::Vec3;

fn system_from(ss: &str, positions: &[(f64, f64, f64)]) -> SurpassSystem {
    assert_eq!(ss.len(), positions.len());
    let beads: Vec<SurpassBead> = ss.bytes().zip(positions.iter()).enumerate()
        .map(|(i, (code, &(x, y, z)))| {
            SurpassBead::new(Vec3::new(x, y, z), 0, i, bead_type_from_ss(code))
        })
        .collect();
    SurpassSystem::new(beads, vec![String::from("A")])
}

/// Two antiparallel strands of five beads, 4.6 A apart, joined by a three-bead loop.
fn beta_hairpin() -> SurpassSystem {
    let mut positions: Vec<(f64, f64, f64)> = Vec::new();
    for i in 0..5 { positions.push((0.0, i as f64 * 3.4, 0.0)); }
    positions.push((0.8, 16.2, 0.5));
    positions.push((2.3, 17.2, 0.8));
    positions.push((3.8, 16.2, 0.5));
    for i in 0..5 { positions.push((4.6, 13.6 - i as f64 * 3.4, 0.0)); }
    system_from("EEEEECCCEEEEE", &positions)
}

#[test]
fn hairpin_strands_form_one_sheet() {
    let system = beta_hairpin();
    assert_eq!(system.atoms_in_beta().len(), 10);
    assert_eq!(system.elements_beta().len(), 2);

    let hb = SurpassHydrogenBond::new(&system);
    assert_eq!(hb.count_sheets(), 1);
    let topology = hb.beta_topology_matrix();
    assert_eq!(topology.get(0, 1), 1);
    assert_eq!(topology.get(1, 0), 1);
    let counts = hb.count_matrix();
    assert!(counts.get(0, 1) >= 1);
    assert!(counts.get(1, 0) >= 1);
}

#[test]
fn hairpin_bonds_are_rewarded() {
    let system = beta_hairpin();
    let hb = SurpassHydrogenBond::new(&system);

    // each beta bead earns a premium for its near-optimal bond
    for &y in system.atoms_in_beta() {
        assert!(hb.calculate_by_residue(&system, y) < 0.0,
            "beta bead {} got no hydrogen bond premium", y);
    }
    assert!(hb.calculate(&system) < 0.0);
    // loop beads carry no bond energy
    assert_eq!(hb.calculate_by_residue(&system, 6), 0.0);
}

#[test]
fn partners_satisfy_the_geometry_invariants() {
    let system = beta_hairpin();
    let hb = SurpassHydrogenBond::new(&system);

    for (i, &y) in system.atoms_in_beta().iter().enumerate() {
        let (first, second) = hb.hydrogen_bonds()[i];
        if let (Some(a), Some(b)) = (first, second) { assert_ne!(a, b); }
        for partner in [first, second].into_iter().flatten() {
            assert_ne!(system.ss_element(y), system.ss_element(partner));
            assert!(system.distance(y, partner) <= 6.0);
        }
    }
}

#[test]
fn chunk_and_total_agree() {
    let system = beta_hairpin();
    let hb = SurpassHydrogenBond::new(&system);
    let total = hb.calculate(&system);
    let chunk = hb.calculate_by_chunk(&system, 0, system.count_residues() - 1);
    assert!((total - chunk).abs() < 1e-9);
}

/// Three parallel strands of four beads in a plane, 4.6 A apart.
fn three_stranded_sheet() -> SurpassSystem {
    let mut positions: Vec<(f64, f64, f64)> = Vec::new();
    for strand in 0..3 {
        for i in 0..4 { positions.push((strand as f64 * 4.6, i as f64 * 3.4, 0.0)); }
        if strand < 2 {
            let x = strand as f64 * 4.6 + 2.3;
            positions.push((x, 13.0, 3.0));
            positions.push((x + 1.0, 14.0, 3.0));
        }
    }
    system_from("EEEECCEEEECCEEEE", &positions)
}

#[test]
fn middle_strand_bonds_both_neighbors() {
    let system = three_stranded_sheet();
    let hb = SurpassHydrogenBond::new(&system);

    // a donor in the middle strand holds two partners, one per neighbor strand
    let beta_pos = system.atoms_in_beta().iter().position(|&y| y == 7).unwrap();
    let (first, second) = hb.hydrogen_bonds()[beta_pos];
    let (first, second) = (first.unwrap(), second.unwrap());
    assert_ne!(system.ss_element(first), system.ss_element(second));
    assert!(system.distance(7, first) <= 6.0);
    assert!(system.distance(7, second) <= 6.0);
}

#[test]
fn outer_strands_are_bridged_by_the_middle_one() {
    let system = three_stranded_sheet();
    let hb = SurpassHydrogenBond::new(&system);

    let topology = hb.beta_topology_matrix();
    assert_eq!(topology.get(0, 1), 1);
    assert_eq!(topology.get(1, 2), 1);
    // the outer strands are too far apart to bond directly
    assert_eq!(topology.get(0, 2), 2);
    assert_eq!(topology.get(2, 0), 2);
    assert_eq!(hb.count_sheets(), 1);
}

#[test]
fn no_strands_means_no_bonds() {
    let positions: Vec<(f64, f64, f64)> = (0..8).map(|i| (i as f64 * 1.6, 0.0, 0.0)).collect();
    let system = system_from("HHHHHHHH", &positions);
    let hb = SurpassHydrogenBond::new(&system);
    assert_eq!(hb.count_sheets(), 0);
    assert_eq!(hb.calculate(&system), 0.0);
    let topology = hb.beta_topology_matrix();
    for i in 0..topology.count_rows() {
        for j in 0..topology.count_columns() {
            assert_eq!(topology.get(i, j), 0);
        }
    }
}

#[test]
fn bonds_break_when_a_strand_moves_away() {
    let mut system = beta_hairpin();
    let hb = SurpassHydrogenBond::new(&system);
    assert!(hb.calculate(&system) < 0.0);

    // push the second strand out of the bonding range
    for i in 8..13 {
        let mut p = system.pos(i);
        p.x += 100.0;
        system.set_pos(i, &p);
    }
    assert_eq!(hb.calculate(&system), 0.0);
    assert_eq!(hb.count_sheets(), 2);
    for (first, second) in hb.hydrogen_bonds() {
        assert!(first.is_none() && second.is_none());
    }
}

#[test]
fn rehash_is_idempotent_for_an_unchanged_system() {
    let system = beta_hairpin();
    let hb = SurpassHydrogenBond::new(&system);
    let first_pass = hb.calculate(&system);
    let bonds_before = hb.hydrogen_bonds();
    // nothing moved, so another full pass must reproduce the state exactly
    let second_pass = hb.calculate(&system);
    assert_eq!(first_pass, second_pass);
    assert_eq!(bonds_before, hb.hydrogen_bonds());
}
