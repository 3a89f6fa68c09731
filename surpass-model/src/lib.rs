//! Coarse-grained SURPASS representation of protein systems.
//!
//! Every SURPASS bead replaces four consecutive alpha carbons and inherits
//! a secondary structure type from the underlying residues. The crate provides
//! the bead store ([`SurpassSystem`](SurpassSystem)), the representation
//! builder that converts an atomistic [`Structure`](surpass_pdb::Structure)
//! into beads, and the secondary-structure element index consumed by the
//! energy functions.

mod bead;
mod system;
mod builder;
mod error;

pub use bead::*;
pub use system::*;
pub use builder::*;
pub use error::*;
