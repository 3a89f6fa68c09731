use crate::PdbAtom;

/// A biomacromolecular structure: a flat list of atoms in deposition order.
///
/// Atoms are stored chain-by-chain, residue-by-residue, exactly as they appear
/// in the source PDB file. The struct provides chain- and residue-level views
/// used by the coarse-grained representation builder.
#[derive(Clone, Debug)]
pub struct Structure {
    code: String,
    atoms: Vec<PdbAtom>,
}

impl Structure {
    /// Creates an empty structure identified by a given code
    pub fn new(code: &str) -> Structure {
        Structure { code: code.to_string(), atoms: Vec::new() }
    }

    /// Identifier of this structure, e.g. a PDB code
    pub fn code(&self) -> &str { &self.code }

    /// Appends an atom; atoms must be pushed in chain-major, residue-major order
    pub fn push_atom(&mut self, a: PdbAtom) { self.atoms.push(a); }

    /// Counts all atoms of this structure
    pub fn count_atoms(&self) -> usize { self.atoms.len() }

    /// Provides read-only access to all atoms of this structure
    pub fn atoms(&self) -> &Vec<PdbAtom> { &self.atoms }

    /// Returns the identifiers of all chains, in the order of their appearance
    pub fn chain_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for a in &self.atoms {
            if ids.last().map_or(true, |last| last != &a.chain_id) && !ids.contains(&a.chain_id) {
                ids.push(a.chain_id.clone());
            }
        }
        ids
    }

    /// Counts the chains of this structure
    pub fn count_chains(&self) -> usize { self.chain_ids().len() }

    /// Returns all atoms of a given chain
    pub fn chain_atoms(&self, chain_id: &str) -> Vec<&PdbAtom> {
        self.atoms.iter().filter(|a| a.chain_id == chain_id).collect()
    }

    /// Returns the residue numbers of a given chain, in the order of their appearance
    pub fn chain_residue_ids(&self, chain_id: &str) -> Vec<i32> {
        let mut ids: Vec<i32> = Vec::new();
        for a in self.atoms.iter().filter(|a| a.chain_id == chain_id) {
            if ids.last() != Some(&a.res_seq) {
                ids.push(a.res_seq);
            }
        }
        ids
    }

    /// Counts the residues of this structure
    pub fn count_residues(&self) -> usize {
        self.chain_ids().iter().map(|c| self.chain_residue_ids(c).len()).sum()
    }
}
