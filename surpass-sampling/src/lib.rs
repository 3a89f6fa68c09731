//! Monte Carlo sampling of SURPASS systems.
//!
//! The crate provides the mover stack ([`PerturbResidue`](PerturbResidue),
//! [`PerturbChainFragment`](PerturbChainFragment), [`MoversSet`](MoversSet)),
//! the isothermal sampler with its observer plumbing, the simulated annealing
//! wrapper and the replica exchange driver.

mod acceptance;
mod movers;
mod movers_set;
mod isothermal;
mod annealing;
mod replica_exchange;
mod observers;
mod evaluators;

pub use acceptance::*;
pub use movers::*;
pub use movers_set::*;
pub use isothermal::*;
pub use annealing::*;
pub use replica_exchange::*;
pub use observers::*;
pub use evaluators::*;
