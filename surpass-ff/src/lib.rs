//! Knowledge-based energy functions of the SURPASS model.
//!
//! Every energy term implements the [`ByResidueEnergy`](ByResidueEnergy)
//! interface, so the total energy, the energy of a single residue and the
//! energy of a residue range can be queried uniformly. The terms are combined
//! into a weighted sum by [`TotalEnergyByResidue`](TotalEnergyByResidue),
//! built from a score config by [`create_surpass_energy()`](create_surpass_energy).

mod array2d;
mod union_find;
mod errors;
mod energy;
mod long_range;
mod distributions;
mod short_range;
mod local_terms;
mod hydrogen_bond;
mod contact;
mod centrosymmetric;
mod local_repulsion;
mod helix_stiffness;
mod total;
mod config;

pub use array2d::*;
pub use union_find::*;
pub use errors::*;
pub use energy::*;
pub use long_range::*;
pub use distributions::*;
pub use short_range::*;
pub use local_terms::*;
pub use hydrogen_bond::*;
pub use contact::*;
pub use centrosymmetric::*;
pub use local_repulsion::*;
pub use helix_stiffness::*;
pub use total::*;
pub use config::*;
