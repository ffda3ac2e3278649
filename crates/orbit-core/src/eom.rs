//! Guiding-center equation of motion.
//!
//! B*-formulation of the drift-kinetic equations: parallel streaming
//! along the effective field, E×B, grad-B and curvature drifts, the
//! mirror force on the parallel velocity, magnetic-moment conservation,
//! and gyrophase advance at the local gyrofrequency. This is a pure
//! function of the local state and field samples; singularity detection
//! is the field and validity layers' responsibility.

use orbit_types::state::{BFieldSample, EFieldSample, GcDerivative, GcState};

fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Evaluate the guiding-center phase-space derivative.
///
/// Vector quantities are physical cylindrical components (R, phi, Z);
/// the returned `phi_dot` is the angular rate, i.e. the toroidal
/// velocity divided by the major radius.
pub fn gc_derivative(
    y: &GcState,
    mass: f64,
    charge: f64,
    b_db: &BFieldSample,
    e: &EFieldSample,
) -> GcDerivative {
    let b = [b_db.b_r, b_db.b_phi, b_db.b_z];
    let norm_b = b_db.norm();
    let bhat = [b[0] / norm_b, b[1] / norm_b, b[2] / norm_b];

    // Physical gradient of |B|; the phi derivative carries the 1/R
    // metric factor.
    let grad_b = [
        dot(b, [b_db.b_r_dr, b_db.b_phi_dr, b_db.b_z_dr]) / norm_b,
        dot(b, [b_db.b_r_dphi, b_db.b_phi_dphi, b_db.b_z_dphi]) / (norm_b * y.r),
        dot(b, [b_db.b_r_dz, b_db.b_phi_dz, b_db.b_z_dz]) / norm_b,
    ];

    // Curl of B in cylindrical components.
    let curl_b = [
        b_db.b_z_dphi / y.r - b_db.b_phi_dz,
        b_db.b_r_dz - b_db.b_z_dr,
        b_db.b_phi / y.r + b_db.b_phi_dr - b_db.b_r_dphi / y.r,
    ];

    // curl(bhat) = (curl B - grad|B| × bhat) / |B|
    let gxb = cross(grad_b, bhat);
    let curl_bhat = [
        (curl_b[0] - gxb[0]) / norm_b,
        (curl_b[1] - gxb[1]) / norm_b,
        (curl_b[2] - gxb[2]) / norm_b,
    ];

    // Effective fields: B* absorbs the curvature drift, E* the mirror
    // force.
    let par_scale = mass * y.vpar / charge;
    let b_star = [
        b[0] + par_scale * curl_bhat[0],
        b[1] + par_scale * curl_bhat[1],
        b[2] + par_scale * curl_bhat[2],
    ];
    let b_star_par = dot(b_star, bhat);
    let mu_q = y.mu / charge;
    let e_star = [
        e.e_r - mu_q * grad_b[0],
        e.e_phi - mu_q * grad_b[1],
        e.e_z - mu_q * grad_b[2],
    ];

    let esxb = cross(e_star, bhat);
    let v = [
        (y.vpar * b_star[0] + esxb[0]) / b_star_par,
        (y.vpar * b_star[1] + esxb[1]) / b_star_par,
        (y.vpar * b_star[2] + esxb[2]) / b_star_par,
    ];

    GcDerivative {
        r_dot: v[0],
        phi_dot: v[1] / y.r,
        z_dot: v[2],
        vpar_dot: (charge / mass) * dot(b_star, e_star) / b_star_par,
        mu_dot: 0.0,
        theta_dot: charge * norm_b / mass,
    }
}
