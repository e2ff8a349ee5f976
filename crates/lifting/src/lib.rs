//! Symmetry lifting of grounded LPs.
//!
//! The LP is turned into a [`ColoredIncidence`] of rows and columns, an
//! [`AutomorphismOracle`] partitions both sides, and [`lift`] keeps one row
//! per row class while merging each column class into a single column.
//! [`LiftedLp::expand`] broadcasts the reduced solution back.
//!
//! Lifting assumes that columns in one class can take equal values at an
//! optimum of the original LP. This holds for automorphism orbits and for
//! equitable partitions; other oracles must guarantee it themselves.

pub mod error;
pub mod incidence;
pub mod lift;
pub mod partition;

pub use error::LiftError;
pub use incidence::ColoredIncidence;
pub use lift::{lift, lift_with, LiftedLp, LiftedSolver};
pub use partition::{AutomorphismOracle, ColorRefinement, Partition};
