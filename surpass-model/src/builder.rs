use log::{debug, info, warn};

use surpass_pdb::calc::Vec3;
use surpass_pdb::{PdbAtom, SecondaryStructure, Structure};

use crate::bead::{bead_type_from_atom_name, bead_type_from_ss, SurpassBead};
use crate::error::StructureError;
use crate::system::SurpassSystem;

/// Checks whether a structure is already in the SURPASS representation.
///
/// A SURPASS structure holds exactly one atom per residue, named `" H  "`,
/// `" S  "` or `" C  "`.
pub fn is_surpass_model(strctr: &Structure) -> bool {
    let mut last_residue: Option<(String, i32)> = None;
    for a in strctr.atoms() {
        if bead_type_from_atom_name(&a.name).is_none() { return false; }
        let key = (a.chain_id.clone(), a.res_seq);
        if last_residue.as_ref() == Some(&key) { return false; }
        last_residue = Some(key);
    }
    !strctr.atoms().is_empty()
}

/// Builds the SURPASS representation of an atomistic structure.
///
/// Every bead is placed at the centroid of four consecutive alpha carbons;
/// its secondary structure type is voted from the four per-residue labels of
/// the prediction (see [`coarse_grained_ss_label()`](coarse_grained_ss_label)).
/// Each chain of `N` amino acids yields `N - 3` beads; chains shorter than
/// four residues are dropped with a warning. When the input is already in the
/// SURPASS representation it is converted verbatim, with bead types re-derived
/// from the atom names.
///
/// The `ss2` annotation must cover all residues of the structure, in chain
/// order.
pub fn surpass_representation(
    strctr: &Structure,
    ss2: &SecondaryStructure,
) -> Result<SurpassSystem, StructureError> {

    if is_surpass_model(strctr) {
        return Ok(surpass_from_surpass(strctr));
    }

    let n_residues = strctr.count_residues();
    if ss2.len() < n_residues {
        return Err(StructureError::SecondaryStructureTooShort {
            needed: n_residues,
            available: ss2.len(),
        });
    }

    let mut beads: Vec<SurpassBead> = Vec::new();
    let mut chain_names: Vec<String> = Vec::new();
    let mut residue_offset = 0;

    for chain_id in strctr.chain_ids() {
        let ca_atoms: Vec<&PdbAtom> = strctr.chain_atoms(&chain_id).into_iter()
            .filter(|a| a.is_ca())
            .collect();
        let n_chain_residues = strctr.chain_residue_ids(&chain_id).len();

        if ca_atoms.len() < n_chain_residues {
            warn!("chain {} misses CA atoms: {} of {} residues usable",
                chain_id, ca_atoms.len(), n_chain_residues);
        }
        let n = ca_atoms.len();
        if n < 4 {
            warn!("chain {} has only {} residues, too short for SURPASS; dropped", chain_id, n);
            residue_offset += n_chain_residues;
            continue;
        }

        let chain_index = chain_names.len() as u16;
        for i in 0..n - 3 {
            let window = &ca_atoms[i..i + 4];
            let mut pos = Vec3::from_float(0.0);
            let mut b_factor = 0.0;
            for a in window {
                pos += &Vec3::new(a.x, a.y, a.z);
                b_factor += a.b_factor;
            }
            pos /= 4.0;
            b_factor /= 4.0;

            let labels = [
                ss2.ss(residue_offset + i),
                ss2.ss(residue_offset + i + 1),
                ss2.ss(residue_offset + i + 2),
                ss2.ss(residue_offset + i + 3),
            ];
            let mut bead = SurpassBead::new(
                pos, chain_index, beads.len(), bead_type_from_ss(coarse_grained_ss_label(&labels)));
            bead.b_factor = b_factor;
            beads.push(bead);
        }
        chain_names.push(chain_id);
        residue_offset += n_chain_residues;
        debug!("chain {} contributed {} beads", chain_names.last().unwrap(), n - 3);
    }

    if beads.is_empty() { return Err(StructureError::NoUsableBeads); }
    info!("SURPASS representation built: {} beads in {} chain(s)", beads.len(), chain_names.len());

    Ok(SurpassSystem::new(beads, chain_names))
}

fn surpass_from_surpass(strctr: &Structure) -> SurpassSystem {
    let mut beads: Vec<SurpassBead> = Vec::new();
    let mut chain_names: Vec<String> = Vec::new();
    for chain_id in strctr.chain_ids() {
        let chain_index = chain_names.len() as u16;
        for a in strctr.chain_atoms(&chain_id) {
            let bead_type = bead_type_from_atom_name(&a.name).unwrap();
            let mut bead = SurpassBead::new(
                Vec3::new(a.x, a.y, a.z), chain_index, beads.len(), bead_type);
            bead.b_factor = a.b_factor;
            beads.push(bead);
        }
        chain_names.push(chain_id);
    }
    debug!("input already in the SURPASS representation: {} beads taken verbatim", beads.len());

    SurpassSystem::new(beads, chain_names)
}

/// Votes the secondary structure label of a bead from its four residue labels.
///
/// The rules, applied in order: a unanimous window keeps its label; a window
/// with a leading coil adopts the label of the remaining three; a window with
/// a trailing coil adopts the label of the leading three; anything else is
/// a coil.
pub fn coarse_grained_ss_label(labels: &[u8; 4]) -> u8 {
    let [s0, s1, s2, s3] = *labels;
    if s0 == s1 && s0 == s2 && s0 == s3 { return s0; }
    if s0 == b'C' && s1 == s2 && s1 == s3 { return s1; }
    if s3 == b'C' && s0 == s1 && s0 == s2 { return s0; }
    b'C'
}

/// Coarse-grains a residue-level secondary structure annotation to the bead level.
///
/// Every bead covers a four-residue window of its chain; the returned
/// annotation has one position per bead (`N - 3` per chain of `N` residues,
/// in the order chains appear) with the window probability triples of the
/// original model: pure `HHHH`/`EEEE` windows get probability one, windows
/// with a single dissenting edge residue get a 3:1 split, all remaining
/// windows become coil. The sequence of the returned annotation is the
/// residue-type tag of the beads.
pub fn surpass_secondary_structure(
    ss2: &SecondaryStructure,
    chain_lengths: &[usize],
) -> SecondaryStructure {

    let mut windows: Vec<[u8; 4]> = Vec::new();
    let mut offset = 0;
    for &n in chain_lengths {
        if n >= 4 {
            for i in 0..n - 3 {
                windows.push([
                    ss2.ss(offset + i), ss2.ss(offset + i + 1),
                    ss2.ss(offset + i + 2), ss2.ss(offset + i + 3),
                ]);
            }
        }
        offset += n;
    }

    let seq: String = std::iter::repeat('G').take(windows.len()).collect();
    let ss: String = windows.iter()
        .map(|w| coarse_grained_ss_label(w) as char)
        .collect();
    let mut out = SecondaryStructure::new(ss2.header(), &seq, &ss);

    for (i, w) in windows.iter().enumerate() {
        match w {
            [b'H', b'H', b'H', b'H'] => out.set_fractions(i, 1.0, 0.0, 0.0),
            [b'E', b'E', b'E', b'E'] => out.set_fractions(i, 0.0, 1.0, 0.0),
            [b'C', b'H', b'H', b'H'] | [b'H', b'H', b'H', b'C'] => out.set_fractions(i, 0.75, 0.0, 0.25),
            [b'E', b'H', b'H', b'H'] | [b'H', b'H', b'H', b'E'] => out.set_fractions(i, 0.75, 0.25, 0.0),
            [b'C', b'E', b'E', b'E'] | [b'E', b'E', b'E', b'C'] => out.set_fractions(i, 0.0, 0.75, 0.25),
            [b'H', b'E', b'E', b'E'] | [b'E', b'E', b'E', b'H'] => out.set_fractions(i, 0.25, 0.75, 0.0),
            _ => {}
        }
    }

    out
}
