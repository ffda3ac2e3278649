//! Field-evaluation capability consumed by the orbit stepper.
//!
//! The stepper is written against these traits only; which concrete
//! field representation backs them is decided at construction time.
//! Implementations must be cheap to evaluate point-wise and safe to
//! share across concurrent lane evaluations.

use orbit_types::error::FieldError;
use orbit_types::state::{BFieldSample, EFieldSample};

/// Point-evaluation contract for magnetic equilibrium data.
pub trait MagneticField: Sync {
    /// Field value and spatial gradient at (r, phi, z).
    fn eval_b_db(&self, r: f64, phi: f64, z: f64) -> Result<BFieldSample, FieldError>;

    /// Poloidal flux at (r, phi, z).
    fn eval_psi(&self, r: f64, phi: f64, z: f64) -> Result<f64, FieldError>;

    /// Normalized flux coordinate derived from a poloidal-flux value.
    fn eval_rho(&self, psi: f64) -> Result<f64, FieldError>;

    /// Magnetic-axis position (r, z).
    fn axis(&self) -> (f64, f64);
}

/// Point-evaluation contract for electric field data.
///
/// The magnetic field is passed as context because radial electric
/// field models are functions of the flux coordinate.
pub trait ElectricField: Sync {
    fn eval_e(
        &self,
        r: f64,
        phi: f64,
        z: f64,
        bfield: &dyn MagneticField,
    ) -> Result<EFieldSample, FieldError>;
}
