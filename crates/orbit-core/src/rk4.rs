// ─────────────────────────────────────────────────────────────────────
// SCPN Orbit Core — RK4 Stepper
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Batched fourth-order Runge-Kutta guiding-center stepper.
//!
//! One call advances every active lane of a marker batch by its own
//! step size. Lanes are fully independent: outcomes are computed in a
//! read-only parallel sweep and written back in a deterministic
//! sequential pass, so a failing lane can never perturb its
//! neighbours and results do not depend on scheduling.
//!
//! The batch-level call only fails on malformed input (step-size array
//! shape or sign); lane-level physics and domain failures are recorded
//! on the lane and the call still succeeds.

use orbit_field::field::{ElectricField, MagneticField};
use orbit_types::error::{ErrorModule, FaultSite, FieldError, LaneError, OrbitError, OrbitResult};
use orbit_types::state::{BFieldSample, GcDerivative, GcState, MarkerBatch};
use rayon::prelude::*;

use crate::eom::gc_derivative;
use crate::validity::check_guiding_center;

/// Everything a fully successful lane writes back.
struct LaneUpdate {
    state: GcState,
    sample: BFieldSample,
    rho: f64,
    pol_increment: f64,
}

/// Outcome of one lane's step computation.
enum LaneOutcome {
    Advanced(LaneUpdate),
    /// Retired mid-step. `committed` holds the advanced state when all
    /// stage queries succeeded and the failure came later; `refreshed`
    /// additionally holds the new cached sample when only the validity
    /// check failed.
    Retired {
        committed: Option<GcState>,
        refreshed: Option<(BFieldSample, f64)>,
        error: LaneError,
    },
}

/// Advance all active lanes of `batch` by one RK4 step each.
///
/// `step_sizes` is lane-aligned with the batch; entries for active
/// lanes must be finite and strictly positive, entries for inactive
/// lanes are ignored. Inactive lanes are untouched.
pub fn step_gc_rk4(
    batch: &mut MarkerBatch,
    step_sizes: &[f64],
    bfield: &dyn MagneticField,
    efield: &dyn ElectricField,
) -> OrbitResult<()> {
    let capacity = batch.capacity();
    if step_sizes.len() != capacity {
        return Err(OrbitError::PhysicsViolation(format!(
            "step-size array length {} does not match batch capacity {capacity}",
            step_sizes.len()
        )));
    }
    for lane in 0..capacity {
        let h = step_sizes[lane];
        if batch.is_active(lane) && (!h.is_finite() || h <= 0.0) {
            return Err(OrbitError::PhysicsViolation(format!(
                "step size for active lane {lane} must be finite and > 0, got {h}"
            )));
        }
    }

    let shared = &*batch;
    let outcomes: Vec<Option<LaneOutcome>> = (0..capacity)
        .into_par_iter()
        .map(|lane| {
            if !shared.is_active(lane) {
                return None;
            }
            Some(advance_lane(shared, lane, step_sizes[lane], bfield, efield))
        })
        .collect();

    for (lane, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            None => {}
            Some(LaneOutcome::Advanced(update)) => {
                batch.set_state(lane, update.state);
                batch.set_field_sample(lane, &update.sample);
                batch.rho[lane] = update.rho;
                batch.pol[lane] += update.pol_increment;
            }
            Some(LaneOutcome::Retired {
                committed,
                refreshed,
                error,
            }) => {
                if let Some(state) = committed {
                    batch.set_state(lane, state);
                }
                if let Some((sample, rho)) = refreshed {
                    batch.set_field_sample(lane, &sample);
                    batch.rho[lane] = rho;
                }
                batch.retire(lane, error);
            }
        }
    }

    Ok(())
}

/// Compute one lane's step without touching the batch.
fn advance_lane(
    batch: &MarkerBatch,
    lane: usize,
    h: f64,
    bfield: &dyn MagneticField,
    efield: &dyn ElectricField,
) -> LaneOutcome {
    let yprev = batch.state(lane);
    let mass = batch.mass[lane];
    let charge = batch.charge[lane];

    let stage_fault = |stage: u8, err: FieldError| LaneOutcome::Retired {
        committed: None,
        refreshed: None,
        error: LaneError::field(err, ErrorModule::OrbitStep, FaultSite::RkStage(stage)),
    };

    // Stage 1 reuses the cached sample: it already describes the
    // pre-step position, so only the electric field is queried fresh.
    let b_db = batch.field_sample(lane);
    let e = match efield.eval_e(yprev.r, yprev.phi, yprev.z, bfield) {
        Ok(e) => e,
        Err(err) => return stage_fault(1, err),
    };
    let k1 = gc_derivative(&yprev, mass, charge, &b_db, &e);

    // Stages 2-4 re-query both fields at every trial point: the
    // derivative depends on local field curvature, so samples cannot be
    // carried across stages.
    let trial = yprev.offset(&k1, 0.5 * h);
    let b_db = match bfield.eval_b_db(trial.r, trial.phi, trial.z) {
        Ok(b) => b,
        Err(err) => return stage_fault(2, err),
    };
    let e = match efield.eval_e(trial.r, trial.phi, trial.z, bfield) {
        Ok(e) => e,
        Err(err) => return stage_fault(2, err),
    };
    let k2 = gc_derivative(&trial, mass, charge, &b_db, &e);

    let trial = yprev.offset(&k2, 0.5 * h);
    let b_db = match bfield.eval_b_db(trial.r, trial.phi, trial.z) {
        Ok(b) => b,
        Err(err) => return stage_fault(3, err),
    };
    let e = match efield.eval_e(trial.r, trial.phi, trial.z, bfield) {
        Ok(e) => e,
        Err(err) => return stage_fault(3, err),
    };
    let k3 = gc_derivative(&trial, mass, charge, &b_db, &e);

    let trial = yprev.offset(&k3, h);
    let b_db = match bfield.eval_b_db(trial.r, trial.phi, trial.z) {
        Ok(b) => b,
        Err(err) => return stage_fault(4, err),
    };
    let e = match efield.eval_e(trial.r, trial.phi, trial.z, bfield) {
        Ok(e) => e,
        Err(err) => return stage_fault(4, err),
    };
    let k4 = gc_derivative(&trial, mass, charge, &b_db, &e);

    let blend = GcDerivative::rk4_blend(&k1, &k2, &k3, &k4);
    let y = yprev.offset(&blend, h).wrap_theta();

    // Every stage query succeeded: the step commits even if the refresh
    // or validity checks below retire the lane.
    let (sample, rho) = match refresh_cached_sample(bfield, &y) {
        Ok(pair) => pair,
        Err(err) => {
            return LaneOutcome::Retired {
                committed: Some(y),
                refreshed: None,
                error: LaneError::field(err, ErrorModule::OrbitStep, FaultSite::FieldRefresh),
            }
        }
    };

    if let Err(error) = check_guiding_center(&y) {
        return LaneOutcome::Retired {
            committed: Some(y),
            refreshed: Some((sample, rho)),
            error,
        };
    }

    let (axis_r, axis_z) = bfield.axis();
    let pol_increment = poloidal_increment(
        yprev.r - axis_r,
        yprev.z - axis_z,
        y.r - axis_r,
        y.z - axis_z,
    );

    LaneOutcome::Advanced(LaneUpdate {
        state: y,
        sample,
        rho,
        pol_increment,
    })
}

/// Field value+gradient and normalized flux at a committed position.
fn refresh_cached_sample(
    bfield: &dyn MagneticField,
    y: &GcState,
) -> Result<(BFieldSample, f64), FieldError> {
    let sample = bfield.eval_b_db(y.r, y.phi, y.z)?;
    let psi = bfield.eval_psi(y.r, y.phi, y.z)?;
    let rho = bfield.eval_rho(psi)?;
    Ok((sample, rho))
}

/// Four-quadrant angle swept between consecutive axis-relative offsets
/// (x0, y0) → (x1, y1).
///
/// Summing these increments keeps the accumulator continuous across the
/// 0/2π seam and across full revolutions, which differencing wrapped
/// angles does not.
fn poloidal_increment(x0: f64, y0: f64, x1: f64, y1: f64) -> f64 {
    (x0 * y1 - y0 * x1).atan2(x0 * x1 + y0 * y1)
}
