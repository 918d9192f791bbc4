//! Execution Layer
//!
//! Turns a quoted route into submittable atomic units: adjacent same-chain
//! AMM legs fold into one unit, cross-chain transfers get their own, and the
//! manager drives the units sequentially with consolidated fee accounting.

pub mod builder;
pub mod fee;
pub mod operation;

pub use builder::{ExecutionManager, build_operations};
pub use fee::OperationFee;
pub use operation::{AmmLeg, AmmOperation, AtomicOperation, CrosschainOperation};
