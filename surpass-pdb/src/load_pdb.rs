use std::io::BufRead;

use log::debug;

use surpass_io::open_file;

use crate::{ParseError, PdbAtom, Structure};

/// Reads a structure from a PDB-formatted source.
///
/// Only `ATOM` records are parsed; alternate locations other than `' '` and `'A'`
/// are skipped. Reading stops at the first `ENDMDL` or `END` record, so for
/// a multi-model file this function returns the first model only.
pub fn load_pdb_reader<R: BufRead>(reader: R) -> Result<Structure, ParseError> {
    let mut models = load_models(reader, true)?;
    match models.pop() {
        Some(s) => Ok(s),
        None => Err(ParseError::NoAtomsFound { fname: String::from("(reader)") }),
    }
}

/// Reads a structure from a PDB file; see [`load_pdb_reader()`](load_pdb_reader).
pub fn load_pdb_file(fname: &str) -> Result<Structure, ParseError> {
    let reader = open_file(fname)?;
    let strctr = load_pdb_reader(reader)?;
    if strctr.count_atoms() == 0 {
        return Err(ParseError::NoAtomsFound { fname: fname.to_string() });
    }
    debug!("{} atoms loaded from {}", strctr.count_atoms(), fname);

    Ok(strctr)
}

/// Reads all models of a PDB file as separate structures.
///
/// A file without `MODEL` records yields a single structure.
pub fn load_pdb_models(fname: &str) -> Result<Vec<Structure>, ParseError> {
    let reader = open_file(fname)?;
    let models = load_models(reader, false)?;
    if models.is_empty() {
        return Err(ParseError::NoAtomsFound { fname: fname.to_string() });
    }
    debug!("{} model(s) loaded from {}", models.len(), fname);

    Ok(models)
}

fn load_models<R: BufRead>(reader: R, first_only: bool) -> Result<Vec<Structure>, ParseError> {
    let mut models: Vec<Structure> = Vec::new();
    let mut current = Structure::new("");
    for line in reader.lines() {
        let line = line?;
        if line.starts_with("ATOM  ") {
            // skip alternate locations other than blank or 'A'
            let alt_loc = line.as_bytes().get(16).copied().unwrap_or(b' ');
            if alt_loc != b' ' && alt_loc != b'A' { continue; }
            match PdbAtom::from_atom_line(&line) {
                Some(a) => current.push_atom(a),
                None => return Err(ParseError::InvalidAtomLine { line }),
            }
        } else if line.starts_with("ENDMDL") || line.starts_with("END") {
            if current.count_atoms() > 0 {
                models.push(current);
                if first_only { return Ok(models); }
                current = Structure::new("");
            }
        }
    }
    if current.count_atoms() > 0 { models.push(current); }

    Ok(models)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;

    const PDB_TXT: &str = "ATOM      2  CA  MET A   1     -13.296   0.028   3.924  1.00  0.43           C
ATOM     21  CA  THR A   2      -9.669  -0.447   4.998  1.00  0.19           C
ATOM     35  CA  TYR A   3      -7.173  -2.314   2.811  1.00  0.08           C
ATOM     56  CA  LYS B   1      -3.922  -3.881   4.044  1.00  0.10           C
ATOM     78  CA  LEU B   2      -0.651  -2.752   2.466  1.00  0.11           C";

    #[test]
    fn load_two_chains() {
        let s = load_pdb_reader(BufReader::new(PDB_TXT.as_bytes())).unwrap();
        assert_eq!(s.count_atoms(), 5);
        assert_eq!(s.count_chains(), 2);
        assert_eq!(s.chain_residue_ids("A"), vec![1, 2, 3]);
    }

    #[test]
    fn load_two_models() {
        let txt = format!("MODEL 1\n{}\nENDMDL\nMODEL 2\n{}\nENDMDL\n", PDB_TXT, PDB_TXT);
        let models = load_models(BufReader::new(txt.as_bytes()), false).unwrap();
        assert_eq!(models.len(), 2);
        assert_eq!(models[1].count_atoms(), 5);
    }
}
