// ─────────────────────────────────────────────────────────────────────
// SCPN Orbit Core — Analytic Field
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Analytic axisymmetric tokamak equilibrium with circular flux
//! surfaces.
//!
//! The poloidal flux is Ψ(R, Z) = ½·(B0/q0)·[(R − R0)² + (Z − Z0)²],
//! which with the cylindrical convention
//!   B_R = -(1/R) ∂Ψ/∂Z,  B_Z = (1/R) ∂Ψ/∂R
//! yields concentric circular surfaces around the axis (R0, Z0) and a
//! toroidal component B_phi = B0·R0/R. All twelve sample components are
//! closed-form, so the model doubles as the reference field for stepper
//! accuracy tests.

use orbit_types::config::FieldConfig;
use orbit_types::error::{FieldError, OrbitError, OrbitResult};
use orbit_types::state::BFieldSample;

use crate::field::MagneticField;

/// Minimum |R| accepted by point evaluation; the cylindrical field
/// expressions are singular on the machine axis R = 0.
const R_SINGULAR_MIN: f64 = 1e-6;

/// Minimum axis/edge flux separation for normalized-flux evaluation.
const MIN_PSI_SEPARATION: f64 = 1e-12;

/// Analytic circular-equilibrium magnetic field.
#[derive(Debug, Clone)]
pub struct CircularEquilibrium {
    r0: f64,
    z0: f64,
    b0: f64,
    /// B0/q0, the poloidal-field scale.
    bpol_scale: f64,
    minor_radius: f64,
    psi_edge: f64,
    edge_rho: Option<f64>,
}

impl CircularEquilibrium {
    /// Create an equilibrium with axis (r0, z0), on-axis toroidal field
    /// `b0`, constant safety factor and last-closed-surface minor
    /// radius. Evaluation is unbounded; use [`with_edge_limit`] to
    /// reject points beyond a normalized-flux surface.
    ///
    /// [`with_edge_limit`]: CircularEquilibrium::with_edge_limit
    pub fn new(
        r0: f64,
        z0: f64,
        b0: f64,
        safety_factor: f64,
        minor_radius: f64,
    ) -> OrbitResult<Self> {
        if !r0.is_finite() || r0 <= 0.0 {
            return Err(OrbitError::ConfigError(
                "field r0 must be finite and > 0".to_string(),
            ));
        }
        if !z0.is_finite() {
            return Err(OrbitError::ConfigError(
                "field z0 must be finite".to_string(),
            ));
        }
        if !b0.is_finite() || b0 == 0.0 {
            return Err(OrbitError::ConfigError(
                "field b0 must be finite and non-zero".to_string(),
            ));
        }
        if !safety_factor.is_finite() || safety_factor == 0.0 {
            return Err(OrbitError::ConfigError(
                "field safety_factor must be finite and non-zero".to_string(),
            ));
        }
        if !minor_radius.is_finite() || minor_radius <= 0.0 || minor_radius >= r0 {
            return Err(OrbitError::ConfigError(format!(
                "field minor_radius must be finite and in (0, r0), got {minor_radius}"
            )));
        }

        let bpol_scale = b0 / safety_factor;
        Ok(CircularEquilibrium {
            r0,
            z0,
            b0,
            bpol_scale,
            minor_radius,
            psi_edge: 0.5 * bpol_scale * minor_radius * minor_radius,
            edge_rho: None,
        })
    }

    /// Restrict evaluation to normalized flux ≤ `rho_max`; points
    /// beyond it are rejected as outside the domain.
    pub fn with_edge_limit(mut self, rho_max: f64) -> OrbitResult<Self> {
        if !rho_max.is_finite() || rho_max <= 0.0 {
            return Err(OrbitError::ConfigError(
                "field edge rho limit must be finite and > 0".to_string(),
            ));
        }
        self.edge_rho = Some(rho_max);
        Ok(self)
    }

    pub fn from_config(config: &FieldConfig) -> OrbitResult<Self> {
        let field = CircularEquilibrium::new(
            config.r0,
            config.z0,
            config.b0,
            config.safety_factor,
            config.minor_radius,
        )?;
        match config.edge_rho_limit {
            Some(limit) => field.with_edge_limit(limit),
            None => Ok(field),
        }
    }

    fn check_point(&self, r: f64, phi: f64, z: f64) -> Result<(), FieldError> {
        if !r.is_finite() || !phi.is_finite() || !z.is_finite() {
            return Err(FieldError::NonFinite);
        }
        if r.abs() < R_SINGULAR_MIN {
            return Err(FieldError::OutsideDomain);
        }
        if let Some(limit) = self.edge_rho {
            let x = r - self.r0;
            let y = z - self.z0;
            let rho = (x * x + y * y).sqrt() / self.minor_radius;
            if rho > limit {
                return Err(FieldError::OutsideDomain);
            }
        }
        Ok(())
    }
}

impl MagneticField for CircularEquilibrium {
    fn eval_b_db(&self, r: f64, phi: f64, z: f64) -> Result<BFieldSample, FieldError> {
        self.check_point(r, phi, z)?;

        let c = self.bpol_scale;
        let x = r - self.r0;
        let y = z - self.z0;
        let inv_r = 1.0 / r;
        let inv_r2 = inv_r * inv_r;

        // Axisymmetric: every ∂/∂φ component vanishes.
        Ok(BFieldSample {
            b_r: -c * y * inv_r,
            b_r_dr: c * y * inv_r2,
            b_r_dphi: 0.0,
            b_r_dz: -c * inv_r,
            b_phi: self.b0 * self.r0 * inv_r,
            b_phi_dr: -self.b0 * self.r0 * inv_r2,
            b_phi_dphi: 0.0,
            b_phi_dz: 0.0,
            b_z: c * x * inv_r,
            b_z_dr: c * self.r0 * inv_r2,
            b_z_dphi: 0.0,
            b_z_dz: 0.0,
        })
    }

    fn eval_psi(&self, r: f64, phi: f64, z: f64) -> Result<f64, FieldError> {
        self.check_point(r, phi, z)?;
        let x = r - self.r0;
        let y = z - self.z0;
        Ok(0.5 * self.bpol_scale * (x * x + y * y))
    }

    fn eval_rho(&self, psi: f64) -> Result<f64, FieldError> {
        if !psi.is_finite() {
            return Err(FieldError::NonFinite);
        }
        if self.psi_edge.abs() < MIN_PSI_SEPARATION {
            return Err(FieldError::OutsideFluxProfile);
        }
        let ratio = psi / self.psi_edge;
        if ratio < 0.0 {
            return Err(FieldError::OutsideFluxProfile);
        }
        Ok(ratio.sqrt())
    }

    fn axis(&self) -> (f64, f64) {
        (self.r0, self.z0)
    }
}
