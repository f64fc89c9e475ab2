//! Finite-difference building blocks.
//!
//! The engine is layered bottom-up: a [`layout::FdmLinearOpLayout`] flattens a
//! tensor-product grid into a single index space, [`mesher`] builds the
//! non-uniform coordinate axes, [`triple_band`] and [`nine_point`] provide the
//! sparse difference operators, [`operators`] assembles them into the Heston
//! and Fokker-Planck generators, [`schemes`] runs the ADI time stepping and
//! [`solver`] / [`fokker_planck`] drive complete backward and forward solves.

pub mod boundary;
pub mod fokker_planck;
pub mod layout;
pub mod mesher;
pub mod nine_point;
pub mod operators;
pub mod schemes;
pub mod solver;
pub mod step_conditions;
pub mod triple_band;
