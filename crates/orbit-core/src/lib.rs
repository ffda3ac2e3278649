//! Guiding-center orbit stepping core.
//!
//! Batched RK4 integration of the drift-kinetic equations of motion,
//! with per-lane validity checks and error bookkeeping.

pub mod diagnostics;
pub mod eom;
pub mod markers;
pub mod rk4;
pub mod validity;
