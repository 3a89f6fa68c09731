/// A single atom parsed from an `ATOM` record of a PDB file.
///
/// Only the fields consumed by the SURPASS stack are retained; the struct keeps
/// the PDB conventions: a four-character atom name and 1-based residue numbers.
#[derive(Clone, Debug)]
pub struct PdbAtom {
    pub serial: i32,
    /// four-character atom name, e.g. `" CA "`
    pub name: String,
    pub res_name: String,
    pub chain_id: String,
    pub res_seq: i32,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub occupancy: f64,
    pub b_factor: f64,
}

impl PdbAtom {
    /// Creates a new atom with all numeric fields zeroed.
    pub fn new() -> PdbAtom {
        PdbAtom {
            serial: 0,
            name: String::from(" CA "),
            res_name: String::from("GLY"),
            chain_id: String::from("A"),
            res_seq: 0,
            x: 0.0, y: 0.0, z: 0.0,
            occupancy: 1.0,
            b_factor: 0.0,
        }
    }

    /// Parses an atom from an `ATOM` or `HETATM` line; returns `None` when a mandatory field can't be read.
    ///
    /// The fixed-column layout of the PDB format is assumed; the line must be at
    /// least 54 characters long to provide the coordinates.
    pub fn from_atom_line(pdb_line: &str) -> Option<PdbAtom> {
        if pdb_line.len() < 54 { return None; }
        let field = |from: usize, to: usize| pdb_line.get(from..to).unwrap_or("").trim().to_string();

        let serial = field(6, 11).parse::<i32>().ok()?;
        let name = pdb_line.get(12..16)?.to_string();
        let res_name = field(17, 20);
        let chain_id = pdb_line.get(21..22)?.to_string();
        let res_seq = field(22, 26).parse::<i32>().ok()?;
        let x = field(30, 38).parse::<f64>().ok()?;
        let y = field(38, 46).parse::<f64>().ok()?;
        let z = field(46, 54).parse::<f64>().ok()?;
        let occupancy = field(54, 60).parse::<f64>().unwrap_or(1.0);
        let b_factor = field(60, 66).parse::<f64>().unwrap_or(0.0);

        Some(PdbAtom { serial, name, res_name, chain_id, res_seq, x, y, z, occupancy, b_factor })
    }

    /// Returns true if this atom is an alpha carbon
    pub fn is_ca(&self) -> bool { self.name == " CA " }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_atom_line() {
        let line = "ATOM      2  CA  MET A   1     -13.296   0.028   3.924  1.00  0.43           C";
        let a = PdbAtom::from_atom_line(line).unwrap();
        assert_eq!(a.serial, 2);
        assert_eq!(a.name, " CA ");
        assert_eq!(a.res_name, "MET");
        assert_eq!(a.chain_id, "A");
        assert_eq!(a.res_seq, 1);
        assert!((a.x + 13.296).abs() < 1e-10);
        assert!((a.b_factor - 0.43).abs() < 1e-10);
        assert!(a.is_ca());
    }

    #[test]
    fn too_short_line_is_rejected() {
        assert!(PdbAtom::from_atom_line("ATOM      2  CA  MET A   1").is_none());
    }
}
