use std::io::BufReader;

use surpass_model::{is_surpass_model, surpass_representation, StructureError, BEAD_E, BEAD_H};
use surpass_pdb::{load_pdb_reader, SecondaryStructure};

fn ca_line(serial: usize, chain: &str, res: i32, x: f64, y: f64, z: f64, bf: f64) -> String {
    format!(
        "ATOM  {:5}  CA  ALA {}{:4}    {:8.3}{:8.3}{:8.3}  1.00{:6.2}           C",
        serial, chain, res, x, y, z, bf
    )
}

/// chains of the given lengths, consecutive CA atoms 3.8 A apart along x
fn test_structure(chain_lengths: &[(char, usize)]) -> surpass_pdb::Structure {
    let mut lines: Vec<String> = Vec::new();
    let mut serial = 1;
    for &(chain, n) in chain_lengths {
        for i in 0..n {
            lines.push(ca_line(serial, &chain.to_string(), i as i32 + 1,
                               i as f64 * 3.8, 0.0, 0.0, 1.0));
            serial += 1;
        }
    }
    load_pdb_reader(BufReader::new(lines.join("\n").into_bytes().as_slice())).unwrap()
}

#[test]
fn chains_lose_three_residues() {
    let strctr = test_structure(&[('A', 10), ('B', 4), ('C', 3)]);
    let ss2 = SecondaryStructure::new("t", &"A".repeat(17), &"C".repeat(17));
    let system = surpass_representation(&strctr, &ss2).unwrap();

    // 10 -> 7 beads, 4 -> 1 bead, 3 -> dropped
    assert_eq!(system.count_atoms(), 8);
    assert_eq!(system.count_chains(), 2);
    assert_eq!(system.atoms_for_chain(0), (0, 6));
    assert_eq!(system.atoms_for_chain(1), (7, 7));
}

#[test]
fn bead_sits_at_the_window_centroid() {
    let strctr = test_structure(&[('A', 5)]);
    let ss2 = SecondaryStructure::new("t", "AAAAA", "CCCCC");
    let system = surpass_representation(&strctr, &ss2).unwrap();

    // the centroid of CA atoms at 0.0, 3.8, 7.6 and 11.4 along x
    assert!((system.pos(0).x - 5.7).abs() < 1e-10);
    assert!(system.pos(0).y.abs() < 1e-10);
    assert!((system.pos(1).x - 9.5).abs() < 1e-10);
}

#[test]
fn bead_types_follow_the_voting_rules() {
    let strctr = test_structure(&[('A', 8)]);
    // windows: HHHH -> H, HHHE -> C, HHEE -> C, HEEE -> C, EEEE -> E
    let ss2 = SecondaryStructure::new("t", "AAAAAAAA", "HHHHEEEE");
    let system = surpass_representation(&strctr, &ss2).unwrap();
    assert_eq!(system.bead_type(0), BEAD_H);
    assert_eq!(system.bead_type(4), BEAD_E);
    assert_eq!(system.ss_element(1), 0);
}

#[test]
fn too_short_input_has_no_beads() {
    let strctr = test_structure(&[('A', 3)]);
    let ss2 = SecondaryStructure::new("t", "AAA", "CCC");
    match surpass_representation(&strctr, &ss2) {
        Err(StructureError::NoUsableBeads) => {}
        other => panic!("expected NoUsableBeads, got: {:?}", other.map(|s| s.count_atoms())),
    }
}

#[test]
fn surpass_input_is_taken_verbatim() {
    let strctr = test_structure(&[('A', 12)]);
    let ss2 = SecondaryStructure::new("t", &"A".repeat(12), "HHHHHHEEEEEE");
    let system = surpass_representation(&strctr, &ss2).unwrap();

    // write the coarse-grained system out and read it back
    let mut buffer: Vec<u8> = Vec::new();
    system.write_pdb(&mut buffer, 0).unwrap();
    let reread = load_pdb_reader(BufReader::new(buffer.as_slice())).unwrap();
    assert!(is_surpass_model(&reread));

    let again = surpass_representation(&reread, &ss2).unwrap();
    assert_eq!(again.count_atoms(), system.count_atoms());
    for i in 0..system.count_atoms() {
        assert_eq!(again.bead_type(i), system.bead_type(i));
        // coordinates survive a round trip up to the PDB column precision
        assert!((again.pos(i).x - system.pos(i).x).abs() < 1e-3);
        assert!((again.pos(i).y - system.pos(i).y).abs() < 1e-3);
        assert!((again.pos(i).z - system.pos(i).z).abs() < 1e-3);
    }
}
