use thiserror::Error;

/// Errors raised while building the SURPASS representation.
#[derive(Debug, Error)]
pub enum StructureError {
    #[error("The starting conformation yields no usable SURPASS beads")]
    NoUsableBeads,

    #[error("Secondary structure covers {available} residues while the structure has {needed}")]
    SecondaryStructureTooShort { needed: usize, available: usize },

    #[error("Residue {res_seq} of chain {chain_id} has no CA atom")]
    MissingCaAtom { chain_id: String, res_seq: i32 },
}
