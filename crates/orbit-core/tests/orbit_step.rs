//! Integration scenarios for the batched guiding-center stepper:
//! fault isolation, closed-orbit accuracy, convergence order, and the
//! cumulative poloidal-angle accumulator.

use orbit_core::markers::{load_markers, seed_ring_markers};
use orbit_core::rk4::step_gc_rk4;
use orbit_field::analytic::CircularEquilibrium;
use orbit_field::efield::ZeroElectricField;
use orbit_field::field::MagneticField;
use orbit_types::constants::{ELEMENTARY_CHARGE, M_DEUTERIUM, TWO_PI};
use orbit_types::error::{ErrorKind, ErrorModule, FaultSite, FieldError};
use orbit_types::state::{BFieldSample, Marker, MarkerBatch};

fn iter_like() -> CircularEquilibrium {
    CircularEquilibrium::new(6.2, 0.0, 5.3, 1.8, 2.0).expect("valid equilibrium")
}

/// Test field with |B| = B0 everywhere and field lines that close as
/// circles of constant minor radius around the axis.
///
/// Because the field strength is uniform, the grad-B drift vanishes and
/// the curvature drift is purely toroidal, so the poloidal projection
/// of a guiding center is an exact circle traversed at angular rate
/// vpar/d. That closed form is what the accuracy tests integrate
/// against.
struct PoloidalCircleField {
    r0: f64,
    z0: f64,
    b0: f64,
    minor_radius: f64,
}

impl MagneticField for PoloidalCircleField {
    fn eval_b_db(&self, r: f64, _phi: f64, z: f64) -> Result<BFieldSample, FieldError> {
        if !r.is_finite() || !z.is_finite() {
            return Err(FieldError::NonFinite);
        }
        let x = r - self.r0;
        let y = z - self.z0;
        let d2 = x * x + y * y;
        let d = d2.sqrt();
        if d < 1e-12 {
            return Err(FieldError::OutsideDomain);
        }
        let d3 = d2 * d;
        let b0 = self.b0;
        Ok(BFieldSample {
            b_r: -b0 * y / d,
            b_r_dr: b0 * x * y / d3,
            b_r_dphi: 0.0,
            b_r_dz: -b0 * x * x / d3,
            b_phi: 0.0,
            b_phi_dr: 0.0,
            b_phi_dphi: 0.0,
            b_phi_dz: 0.0,
            b_z: b0 * x / d,
            b_z_dr: b0 * y * y / d3,
            b_z_dphi: 0.0,
            b_z_dz: -b0 * x * y / d3,
        })
    }

    fn eval_psi(&self, r: f64, _phi: f64, z: f64) -> Result<f64, FieldError> {
        if !r.is_finite() || !z.is_finite() {
            return Err(FieldError::NonFinite);
        }
        let x = r - self.r0;
        let y = z - self.z0;
        Ok(0.5 * self.b0 * (x * x + y * y))
    }

    fn eval_rho(&self, psi: f64) -> Result<f64, FieldError> {
        if !psi.is_finite() {
            return Err(FieldError::NonFinite);
        }
        let psi_edge = 0.5 * self.b0 * self.minor_radius * self.minor_radius;
        let ratio = psi / psi_edge;
        if ratio < 0.0 {
            return Err(FieldError::OutsideFluxProfile);
        }
        Ok(ratio.sqrt())
    }

    fn axis(&self) -> (f64, f64) {
        (self.r0, self.z0)
    }
}

#[test]
fn test_unphysical_seed_lane_is_isolated() {
    let field = iter_like();
    let mut markers = seed_ring_markers(
        8,
        7.0,
        0.0,
        100.0,
        0.6,
        M_DEUTERIUM,
        ELEMENTARY_CHARGE,
        &field,
    )
    .expect("valid seed parameters");
    // Lane 3 starts already unphysical.
    markers[3].r = -1.0;

    let mut batch = MarkerBatch::new(8);
    load_markers(&mut batch, &markers, &field).expect("markers load");
    assert_eq!(batch.active_count(), 8);

    let steps = vec![1.0e-9; 8];
    step_gc_rk4(&mut batch, &steps, &field, &ZeroElectricField).expect("batch step succeeds");

    for lane in 0..8 {
        if lane == 3 {
            assert!(!batch.is_active(lane), "unphysical lane must be retired");
            let err = batch.error(lane).expect("retired lane carries an error");
            assert_eq!(err.kind, ErrorKind::UnphysicalGuidingCenter);
            assert_eq!(err.module, ErrorModule::OrbitStep);
            assert_eq!(err.site, FaultSite::RadiusBound);
        } else {
            assert!(batch.is_active(lane), "lane {lane} must keep running");
            assert!(batch.state(lane).r > 0.0);
            assert!(batch.error(lane).is_none());
        }
    }
}

#[test]
fn test_closed_orbit_returns_and_accumulates_two_pi() {
    let field = PoloidalCircleField {
        r0: 6.0,
        z0: 0.0,
        b0: 5.0,
        minor_radius: 1.5,
    };
    let a = 1.0;
    let vpar = 1.0e6;
    let period = TWO_PI * a / vpar;
    let n_steps = 1000;
    let h = period / n_steps as f64;

    let marker = Marker {
        r: field.r0 + a,
        phi: 0.0,
        z: field.z0,
        vpar,
        mu: 1.0e-16,
        theta: 0.0,
        mass: M_DEUTERIUM,
        charge: ELEMENTARY_CHARGE,
    };
    let mut batch = MarkerBatch::new(1);
    load_markers(&mut batch, &[marker], &field).expect("marker loads");

    let steps = [h];
    let mut pol_prev = 0.0;
    for _ in 0..n_steps {
        step_gc_rk4(&mut batch, &steps, &field, &ZeroElectricField).expect("step succeeds");
        assert!(batch.is_active(0));

        // The accumulator advances smoothly, including across the seam
        // where the bounded angles wrap.
        let pol = batch.pol[0];
        let increment = pol - pol_prev;
        assert!(
            increment > 0.0 && increment < 0.05,
            "discontinuous poloidal increment {increment}"
        );
        pol_prev = pol;

        let theta = batch.state(0).theta;
        assert!((0.0..TWO_PI).contains(&theta));
    }

    let state = batch.state(0);
    let dr = state.r - (field.r0 + a);
    let dz = state.z - field.z0;
    let closure = (dr * dr + dz * dz).sqrt();
    assert!(
        closure < 1.0e-8,
        "orbit should close to fourth-order accuracy, missed by {closure}"
    );
    assert!(
        (batch.pol[0] - TWO_PI).abs() < 1.0e-6,
        "cumulative poloidal angle should be 2π, got {}",
        batch.pol[0]
    );

    // Invariants along the closed orbit.
    assert_eq!(state.mu, marker.mu, "mu is exactly conserved");
    assert!(
        (state.vpar - vpar).abs() / vpar < 1.0e-9,
        "vpar drifts: {}",
        state.vpar
    );
}

#[test]
fn test_position_error_converges_at_fourth_order() {
    let field = PoloidalCircleField {
        r0: 6.0,
        z0: 0.0,
        b0: 5.0,
        minor_radius: 1.5,
    };
    let a = 1.0;
    let vpar = 1.0e6;
    let period = TWO_PI * a / vpar;
    let t_end = 0.25 * period;

    // Analytic quarter-turn endpoint of the poloidal circle.
    let target = (field.r0, field.z0 + a);

    let final_error = |n_steps: usize| -> f64 {
        let marker = Marker {
            r: field.r0 + a,
            phi: 0.0,
            z: field.z0,
            vpar,
            mu: 0.0,
            theta: 0.0,
            mass: M_DEUTERIUM,
            charge: ELEMENTARY_CHARGE,
        };
        let mut batch = MarkerBatch::new(1);
        load_markers(&mut batch, &[marker], &field).expect("marker loads");
        let steps = [t_end / n_steps as f64];
        for _ in 0..n_steps {
            step_gc_rk4(&mut batch, &steps, &field, &ZeroElectricField).expect("step succeeds");
        }
        let state = batch.state(0);
        let dr = state.r - target.0;
        let dz = state.z - target.1;
        (dr * dr + dz * dz).sqrt()
    };

    let coarse = final_error(25);
    let fine = final_error(50);
    let ratio = coarse / fine;
    assert!(
        coarse > 1.0e-12,
        "coarse error {coarse} too small to measure order"
    );
    assert!(
        (10.0..30.0).contains(&ratio),
        "halving h should shrink the global error ~16x, got {ratio} (coarse {coarse}, fine {fine})"
    );
}

#[test]
fn test_domain_fault_skips_commit_and_spares_neighbours() {
    let field = iter_like().with_edge_limit(1.0).expect("valid limit");

    // Lane 0 sits deep inside; lane 1 hugs the last closed surface and
    // gets a step large enough that its second-stage trial point leaves
    // the domain.
    let inner = Marker {
        r: 6.7,
        phi: 0.0,
        z: 0.0,
        vpar: 1.0e6,
        mu: 1.0e-16,
        theta: 0.0,
        mass: M_DEUTERIUM,
        charge: ELEMENTARY_CHARGE,
    };
    let edge = Marker {
        r: 6.2 + 1.99,
        phi: 0.0,
        z: 0.0,
        vpar: 1.0e6,
        mu: 0.0,
        theta: 0.0,
        mass: M_DEUTERIUM,
        charge: ELEMENTARY_CHARGE,
    };

    let mut batch = MarkerBatch::new(2);
    load_markers(&mut batch, &[inner, edge], &field).expect("markers load");

    let edge_state_before = batch.state(1);
    let edge_sample_before = batch.field_sample(1);

    let steps = [1.0e-8, 5.0e-6];
    step_gc_rk4(&mut batch, &steps, &field, &ZeroElectricField).expect("batch step succeeds");

    assert!(batch.is_active(0), "inner lane keeps running");
    assert!(batch.error(0).is_none());

    assert!(!batch.is_active(1), "edge lane must be retired");
    let err = batch.error(1).expect("retired lane carries an error");
    assert_eq!(err.kind, ErrorKind::Field(FieldError::OutsideDomain));
    assert_eq!(err.module, ErrorModule::OrbitStep);
    assert_eq!(err.site, FaultSite::RkStage(2));

    // A stage fault must not commit partial results.
    assert_eq!(batch.state(1), edge_state_before);
    assert_eq!(batch.field_sample(1), edge_sample_before);
}

#[test]
fn test_validity_fault_keeps_committed_position() {
    // An unbounded field lets the r = -1 lane advance; the committed
    // state is kept as last-known-valid even though the lane retires.
    let field = iter_like();
    let marker = Marker {
        r: -1.0,
        phi: 0.0,
        z: 0.0,
        vpar: 1.0e5,
        mu: 1.0e-18,
        theta: 0.0,
        mass: M_DEUTERIUM,
        charge: ELEMENTARY_CHARGE,
    };
    let mut batch = MarkerBatch::new(1);
    load_markers(&mut batch, &[marker], &field).expect("marker loads");
    let r_before = batch.state(0).r;

    step_gc_rk4(&mut batch, &[1.0e-9], &field, &ZeroElectricField).expect("step succeeds");

    assert!(!batch.is_active(0));
    let err = batch.error(0).expect("retired lane carries an error");
    assert_eq!(err.site, FaultSite::RadiusBound);
    // Position was advanced before the validity check fired.
    assert_ne!(batch.state(0).r, r_before);
}
