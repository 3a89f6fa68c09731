use surpass_pdb::calc::Vec3;

/// Bead type of a helical SURPASS bead
pub const BEAD_H: u8 = 0;
/// Bead type of a strand SURPASS bead
pub const BEAD_E: u8 = 1;
/// Bead type of a coil SURPASS bead
pub const BEAD_C: u8 = 2;

/// Converts an `HEC` secondary structure code into a bead type.
pub fn bead_type_from_ss(ss: u8) -> u8 {
    match ss {
        b'H' => BEAD_H,
        b'E' => BEAD_E,
        _ => BEAD_C,
    }
}

/// Converts a bead type back into its `HEC` secondary structure code.
pub fn ss_from_bead_type(bead_type: u8) -> u8 {
    match bead_type {
        BEAD_H => b'H',
        BEAD_E => b'E',
        _ => b'C',
    }
}

/// PDB atom name used for a bead of a given type: `" H  "`, `" S  "` or `" C  "`.
pub fn bead_atom_name(bead_type: u8) -> &'static str {
    match bead_type {
        BEAD_H => " H  ",
        BEAD_E => " S  ",
        _ => " C  ",
    }
}

/// Recognizes a bead type from a SURPASS atom name; `None` for any other name.
pub fn bead_type_from_atom_name(name: &str) -> Option<u8> {
    match name {
        " H  " => Some(BEAD_H),
        " S  " => Some(BEAD_E),
        " C  " => Some(BEAD_C),
        _ => None,
    }
}

/// A single SURPASS bead: the center of four consecutive alpha carbons.
#[derive(Clone, Debug)]
pub struct SurpassBead {
    /// position of this bead
    pub pos: Vec3,
    /// index of the chain this bead belongs to
    pub chain: u16,
    /// index of the residue this bead represents, unique within the whole system
    pub residue_index: usize,
    /// one of [`BEAD_H`](BEAD_H), [`BEAD_E`](BEAD_E), [`BEAD_C`](BEAD_C)
    pub bead_type: u8,
    /// residue type tag, opaque to the simulation core; scored by sequence-dependent terms
    pub residue_type: u8,
    /// temperature factor, used only when writing PDB output
    pub b_factor: f64,
}

impl SurpassBead {
    pub fn new(pos: Vec3, chain: u16, residue_index: usize, bead_type: u8) -> SurpassBead {
        SurpassBead { pos, chain, residue_index, bead_type, residue_type: b'G', b_factor: 0.0 }
    }
}
