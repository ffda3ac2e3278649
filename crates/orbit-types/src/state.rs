// ─────────────────────────────────────────────────────────────────────
// SCPN Orbit Core — Marker State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Phase-space value types and the structure-of-arrays marker batch.
//!
//! One batch holds a fixed number of independent marker lanes. Numeric
//! state lives in per-quantity columns so the stepper can sweep lanes
//! without gather/scatter; per-lane control state (active flag, error
//! slot) is kept behind accessors that enforce the write-once error
//! semantics.

use crate::constants::TWO_PI;
use crate::error::{LaneError, OrbitError, OrbitResult};
use ndarray::Array1;

/// Default lane count for a marker batch.
pub const DEFAULT_BATCH_CAPACITY: usize = 16;

/// Wrap an angle into [0, 2π).
///
/// Plain modulo can return a negative remainder; a single 2π correction
/// restores the half-open range.
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle % TWO_PI;
    if wrapped < 0.0 {
        let corrected = wrapped + TWO_PI;
        // The correction can round to exactly 2π for tiny negative
        // remainders; the range is half-open.
        if corrected >= TWO_PI {
            0.0
        } else {
            corrected
        }
    } else {
        wrapped
    }
}

/// Guiding-center phase-space state (r, phi, z, vpar, mu, theta).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GcState {
    /// Major-radius coordinate (m).
    pub r: f64,
    /// Toroidal angle (rad), unbounded.
    pub phi: f64,
    /// Vertical coordinate (m).
    pub z: f64,
    /// Velocity parallel to the magnetic field (m/s).
    pub vpar: f64,
    /// Magnetic moment (J/T).
    pub mu: f64,
    /// Gyroangle (rad), kept in [0, 2π) for committed states.
    pub theta: f64,
}

impl GcState {
    /// State advanced a distance `h` along derivative `k`.
    pub fn offset(&self, k: &GcDerivative, h: f64) -> GcState {
        GcState {
            r: self.r + h * k.r_dot,
            phi: self.phi + h * k.phi_dot,
            z: self.z + h * k.z_dot,
            vpar: self.vpar + h * k.vpar_dot,
            mu: self.mu + h * k.mu_dot,
            theta: self.theta + h * k.theta_dot,
        }
    }

    /// Copy of this state with the gyroangle wrapped into [0, 2π).
    pub fn wrap_theta(mut self) -> GcState {
        self.theta = wrap_angle(self.theta);
        self
    }
}

/// Time derivative of a guiding-center state.
///
/// `phi_dot` is the angular rate (toroidal velocity divided by the
/// major radius), so `offset` advances coordinates directly.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GcDerivative {
    pub r_dot: f64,
    pub phi_dot: f64,
    pub z_dot: f64,
    pub vpar_dot: f64,
    pub mu_dot: f64,
    pub theta_dot: f64,
}

impl GcDerivative {
    /// Classical Runge-Kutta combination (k1 + 2k2 + 2k3 + k4) / 6.
    pub fn rk4_blend(k1: &Self, k2: &Self, k3: &Self, k4: &Self) -> Self {
        let w = |a: f64, b: f64, c: f64, d: f64| (a + 2.0 * b + 2.0 * c + d) / 6.0;
        GcDerivative {
            r_dot: w(k1.r_dot, k2.r_dot, k3.r_dot, k4.r_dot),
            phi_dot: w(k1.phi_dot, k2.phi_dot, k3.phi_dot, k4.phi_dot),
            z_dot: w(k1.z_dot, k2.z_dot, k3.z_dot, k4.z_dot),
            vpar_dot: w(k1.vpar_dot, k2.vpar_dot, k3.vpar_dot, k4.vpar_dot),
            mu_dot: w(k1.mu_dot, k2.mu_dot, k3.mu_dot, k4.mu_dot),
            theta_dot: w(k1.theta_dot, k2.theta_dot, k3.theta_dot, k4.theta_dot),
        }
    }
}

/// Magnetic field value and spatial gradient at a point.
///
/// Components are physical cylindrical components; the `*_dphi` entries
/// are plain ∂/∂φ derivatives (not divided by R).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BFieldSample {
    pub b_r: f64,
    pub b_r_dr: f64,
    pub b_r_dphi: f64,
    pub b_r_dz: f64,
    pub b_phi: f64,
    pub b_phi_dr: f64,
    pub b_phi_dphi: f64,
    pub b_phi_dz: f64,
    pub b_z: f64,
    pub b_z_dr: f64,
    pub b_z_dphi: f64,
    pub b_z_dz: f64,
}

impl BFieldSample {
    /// Field magnitude |B|.
    pub fn norm(&self) -> f64 {
        (self.b_r * self.b_r + self.b_phi * self.b_phi + self.b_z * self.b_z).sqrt()
    }

    /// True when every component is finite.
    pub fn is_finite(&self) -> bool {
        [
            self.b_r,
            self.b_r_dr,
            self.b_r_dphi,
            self.b_r_dz,
            self.b_phi,
            self.b_phi_dr,
            self.b_phi_dphi,
            self.b_phi_dz,
            self.b_z,
            self.b_z_dr,
            self.b_z_dphi,
            self.b_z_dz,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// Electric field value at a point, cylindrical components (V/m).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EFieldSample {
    pub e_r: f64,
    pub e_phi: f64,
    pub e_z: f64,
}

/// Marker input for one batch lane.
///
/// Only structural sanity is enforced here (finite values, positive
/// mass, non-zero charge). Physical plausibility of the state itself is
/// the validity layer's concern: a marker born with r ≤ 0 is accepted
/// and retired on its first step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub r: f64,
    pub phi: f64,
    pub z: f64,
    pub vpar: f64,
    pub mu: f64,
    pub theta: f64,
    pub mass: f64,
    pub charge: f64,
}

impl Marker {
    pub fn validate(&self, label: &str) -> OrbitResult<()> {
        if !self.r.is_finite() || !self.phi.is_finite() || !self.z.is_finite() {
            return Err(OrbitError::PhysicsViolation(format!(
                "{label} position components must be finite"
            )));
        }
        if !self.vpar.is_finite() || !self.mu.is_finite() || !self.theta.is_finite() {
            return Err(OrbitError::PhysicsViolation(format!(
                "{label} velocity-space components must be finite"
            )));
        }
        if !self.mass.is_finite() || self.mass <= 0.0 {
            return Err(OrbitError::PhysicsViolation(format!(
                "{label}.mass must be finite and > 0"
            )));
        }
        if !self.charge.is_finite() || self.charge == 0.0 {
            return Err(OrbitError::PhysicsViolation(format!(
                "{label}.charge must be finite and non-zero"
            )));
        }
        Ok(())
    }
}

/// Structure-of-arrays batch of guiding-center marker lanes.
///
/// Capacity is fixed at construction. Each lane carries its phase-space
/// state, immutable species parameters, the cached field sample from
/// the most recent committed step, the normalized-flux coordinate, the
/// cumulative (never wrapped) poloidal angle, and bookkeeping state.
#[derive(Debug, Clone)]
pub struct MarkerBatch {
    capacity: usize,
    pub r: Array1<f64>,
    pub phi: Array1<f64>,
    pub z: Array1<f64>,
    pub vpar: Array1<f64>,
    pub mu: Array1<f64>,
    pub theta: Array1<f64>,
    pub mass: Array1<f64>,
    pub charge: Array1<f64>,
    pub b_r: Array1<f64>,
    pub b_r_dr: Array1<f64>,
    pub b_r_dphi: Array1<f64>,
    pub b_r_dz: Array1<f64>,
    pub b_phi: Array1<f64>,
    pub b_phi_dr: Array1<f64>,
    pub b_phi_dphi: Array1<f64>,
    pub b_phi_dz: Array1<f64>,
    pub b_z: Array1<f64>,
    pub b_z_dr: Array1<f64>,
    pub b_z_dphi: Array1<f64>,
    pub b_z_dz: Array1<f64>,
    /// Normalized flux at the current position; stale only for
    /// inactive lanes.
    pub rho: Array1<f64>,
    /// Cumulative poloidal angle, unbounded.
    pub pol: Array1<f64>,
    active: Vec<bool>,
    err: Vec<Option<LaneError>>,
}

impl MarkerBatch {
    /// Create a zeroed, all-inactive batch with `capacity` lanes.
    pub fn new(capacity: usize) -> Self {
        MarkerBatch {
            capacity,
            r: Array1::zeros(capacity),
            phi: Array1::zeros(capacity),
            z: Array1::zeros(capacity),
            vpar: Array1::zeros(capacity),
            mu: Array1::zeros(capacity),
            theta: Array1::zeros(capacity),
            mass: Array1::zeros(capacity),
            charge: Array1::zeros(capacity),
            b_r: Array1::zeros(capacity),
            b_r_dr: Array1::zeros(capacity),
            b_r_dphi: Array1::zeros(capacity),
            b_r_dz: Array1::zeros(capacity),
            b_phi: Array1::zeros(capacity),
            b_phi_dr: Array1::zeros(capacity),
            b_phi_dphi: Array1::zeros(capacity),
            b_phi_dz: Array1::zeros(capacity),
            b_z: Array1::zeros(capacity),
            b_z_dr: Array1::zeros(capacity),
            b_z_dphi: Array1::zeros(capacity),
            b_z_dz: Array1::zeros(capacity),
            rho: Array1::zeros(capacity),
            pol: Array1::zeros(capacity),
            active: vec![false; capacity],
            err: vec![None; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_active(&self, lane: usize) -> bool {
        self.active[lane]
    }

    pub fn active_count(&self) -> usize {
        self.active.iter().filter(|a| **a).count()
    }

    pub fn error(&self, lane: usize) -> Option<LaneError> {
        self.err[lane]
    }

    /// Initialize a lane from a validated marker and a field sample
    /// primed at the marker position.
    ///
    /// This is the only write allowed on an inactive lane; it clears
    /// any previous error so a batch can be reused between runs. The
    /// gyroangle is wrapped into [0, 2π) and the cumulative poloidal
    /// angle restarts at zero.
    pub fn activate(
        &mut self,
        lane: usize,
        marker: &Marker,
        sample: &BFieldSample,
        rho: f64,
    ) -> OrbitResult<()> {
        if lane >= self.capacity {
            return Err(OrbitError::LaneOutOfBounds {
                lane,
                capacity: self.capacity,
            });
        }
        marker.validate(&format!("marker[{lane}]"))?;
        if !sample.is_finite() {
            return Err(OrbitError::PhysicsViolation(format!(
                "marker[{lane}] initial field sample must be finite"
            )));
        }
        if !rho.is_finite() {
            return Err(OrbitError::PhysicsViolation(format!(
                "marker[{lane}] initial normalized flux must be finite"
            )));
        }

        self.r[lane] = marker.r;
        self.phi[lane] = marker.phi;
        self.z[lane] = marker.z;
        self.vpar[lane] = marker.vpar;
        self.mu[lane] = marker.mu;
        self.theta[lane] = wrap_angle(marker.theta);
        self.mass[lane] = marker.mass;
        self.charge[lane] = marker.charge;
        self.set_field_sample(lane, sample);
        self.rho[lane] = rho;
        self.pol[lane] = 0.0;
        self.active[lane] = true;
        self.err[lane] = None;
        Ok(())
    }

    /// Stop a lane permanently and record the diagnostic.
    ///
    /// The first error recorded on a lane wins; later calls only clear
    /// the active flag.
    pub fn retire(&mut self, lane: usize, error: LaneError) {
        if self.err[lane].is_none() {
            self.err[lane] = Some(error);
        }
        self.active[lane] = false;
    }

    /// Phase-space state of one lane.
    pub fn state(&self, lane: usize) -> GcState {
        GcState {
            r: self.r[lane],
            phi: self.phi[lane],
            z: self.z[lane],
            vpar: self.vpar[lane],
            mu: self.mu[lane],
            theta: self.theta[lane],
        }
    }

    pub fn set_state(&mut self, lane: usize, state: GcState) {
        self.r[lane] = state.r;
        self.phi[lane] = state.phi;
        self.z[lane] = state.z;
        self.vpar[lane] = state.vpar;
        self.mu[lane] = state.mu;
        self.theta[lane] = state.theta;
    }

    /// Cached field sample of one lane.
    pub fn field_sample(&self, lane: usize) -> BFieldSample {
        BFieldSample {
            b_r: self.b_r[lane],
            b_r_dr: self.b_r_dr[lane],
            b_r_dphi: self.b_r_dphi[lane],
            b_r_dz: self.b_r_dz[lane],
            b_phi: self.b_phi[lane],
            b_phi_dr: self.b_phi_dr[lane],
            b_phi_dphi: self.b_phi_dphi[lane],
            b_phi_dz: self.b_phi_dz[lane],
            b_z: self.b_z[lane],
            b_z_dr: self.b_z_dr[lane],
            b_z_dphi: self.b_z_dphi[lane],
            b_z_dz: self.b_z_dz[lane],
        }
    }

    pub fn set_field_sample(&mut self, lane: usize, sample: &BFieldSample) {
        self.b_r[lane] = sample.b_r;
        self.b_r_dr[lane] = sample.b_r_dr;
        self.b_r_dphi[lane] = sample.b_r_dphi;
        self.b_r_dz[lane] = sample.b_r_dz;
        self.b_phi[lane] = sample.b_phi;
        self.b_phi_dr[lane] = sample.b_phi_dr;
        self.b_phi_dphi[lane] = sample.b_phi_dphi;
        self.b_phi_dz[lane] = sample.b_phi_dz;
        self.b_z[lane] = sample.b_z;
        self.b_z_dr[lane] = sample.b_z_dr;
        self.b_z_dphi[lane] = sample.b_z_dphi;
        self.b_z_dz[lane] = sample.b_z_dz;
    }
}

impl Default for MarkerBatch {
    fn default() -> Self {
        MarkerBatch::new(DEFAULT_BATCH_CAPACITY)
    }
}
