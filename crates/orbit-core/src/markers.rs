//! Marker population seeding and batch loading.
//!
//! File-based marker ingestion lives outside this crate; these helpers
//! build deterministic in-memory populations for tests, benchmarks and
//! driver smoke runs, and prime batch lanes from them.

use orbit_field::field::MagneticField;
use orbit_types::constants::{J_PER_KEV, TWO_PI};
use orbit_types::error::{ErrorModule, FaultSite, LaneError, OrbitError, OrbitResult};
use orbit_types::state::{BFieldSample, Marker, MarkerBatch};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Normal;

fn validate_species(mass_kg: f64, charge_c: f64) -> OrbitResult<()> {
    if !mass_kg.is_finite() || mass_kg <= 0.0 {
        return Err(OrbitError::PhysicsViolation(
            "mass_kg must be finite and > 0".to_string(),
        ));
    }
    if !charge_c.is_finite() || charge_c == 0.0 {
        return Err(OrbitError::PhysicsViolation(
            "charge_c must be finite and non-zero".to_string(),
        ));
    }
    Ok(())
}

/// Split a kinetic energy into (vpar, mu) at local field strength
/// `b_norm` for the given pitch cosine.
fn velocity_split(
    energy_kev: f64,
    pitch_cos: f64,
    mass_kg: f64,
    b_norm: f64,
) -> (f64, f64) {
    let energy_j = energy_kev * J_PER_KEV;
    let speed = (2.0 * energy_j / mass_kg).sqrt();
    let vpar = speed * pitch_cos;
    let vperp2 = speed * speed * (1.0 - pitch_cos * pitch_cos);
    let mu = 0.5 * mass_kg * vperp2 / b_norm;
    (vpar, mu)
}

/// Create `n` markers of one species on a toroidal ring at (r_m, z_m),
/// evenly spread in toroidal angle and gyroangle, each with the same
/// kinetic energy and pitch.
#[allow(clippy::too_many_arguments)]
pub fn seed_ring_markers(
    n: usize,
    r_m: f64,
    z_m: f64,
    energy_kev: f64,
    pitch_cos: f64,
    mass_kg: f64,
    charge_c: f64,
    bfield: &dyn MagneticField,
) -> OrbitResult<Vec<Marker>> {
    if n == 0 {
        return Err(OrbitError::PhysicsViolation(
            "n must be >= 1".to_string(),
        ));
    }
    if !r_m.is_finite() || r_m <= 0.0 {
        return Err(OrbitError::PhysicsViolation(
            "r_m must be finite and > 0".to_string(),
        ));
    }
    if !z_m.is_finite() {
        return Err(OrbitError::PhysicsViolation(
            "z_m must be finite".to_string(),
        ));
    }
    if !energy_kev.is_finite() || energy_kev <= 0.0 {
        return Err(OrbitError::PhysicsViolation(
            "energy_kev must be finite and > 0".to_string(),
        ));
    }
    if !pitch_cos.is_finite() || !(-1.0..=1.0).contains(&pitch_cos) {
        return Err(OrbitError::PhysicsViolation(
            "pitch_cos must be finite and in [-1, 1]".to_string(),
        ));
    }
    validate_species(mass_kg, charge_c)?;

    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let phi = TWO_PI * (i as f64) / (n as f64);
        let sample = bfield.eval_b_db(r_m, phi, z_m).map_err(|err| {
            OrbitError::PhysicsViolation(format!(
                "seed position ({r_m}, {phi}, {z_m}) rejected by field: {err}"
            ))
        })?;
        let (vpar, mu) = velocity_split(energy_kev, pitch_cos, mass_kg, sample.norm());
        out.push(Marker {
            r: r_m,
            phi,
            z: z_m,
            vpar,
            mu,
            theta: TWO_PI * (i as f64) / (n as f64),
            mass: mass_kg,
            charge: charge_c,
        });
    }
    Ok(out)
}

/// Create `n` markers with Maxwellian velocities at temperature
/// `temperature_kev`, positions scattered around (r_m, z_m) with
/// standard deviation `scatter_m`. Deterministic for a fixed
/// `rng_seed`.
#[allow(clippy::too_many_arguments)]
pub fn seed_thermal_markers(
    n: usize,
    r_m: f64,
    z_m: f64,
    scatter_m: f64,
    temperature_kev: f64,
    mass_kg: f64,
    charge_c: f64,
    rng_seed: u64,
    bfield: &dyn MagneticField,
) -> OrbitResult<Vec<Marker>> {
    if n == 0 {
        return Err(OrbitError::PhysicsViolation(
            "n must be >= 1".to_string(),
        ));
    }
    if !r_m.is_finite() || r_m <= 0.0 {
        return Err(OrbitError::PhysicsViolation(
            "r_m must be finite and > 0".to_string(),
        ));
    }
    if !z_m.is_finite() {
        return Err(OrbitError::PhysicsViolation(
            "z_m must be finite".to_string(),
        ));
    }
    if !scatter_m.is_finite() || scatter_m < 0.0 {
        return Err(OrbitError::PhysicsViolation(
            "scatter_m must be finite and >= 0".to_string(),
        ));
    }
    if !temperature_kev.is_finite() || temperature_kev <= 0.0 {
        return Err(OrbitError::PhysicsViolation(
            "temperature_kev must be finite and > 0".to_string(),
        ));
    }
    validate_species(mass_kg, charge_c)?;

    let v_thermal = (temperature_kev * J_PER_KEV / mass_kg).sqrt();
    let velocity = Normal::new(0.0, v_thermal)
        .map_err(|err| OrbitError::ConfigError(format!("thermal velocity distribution: {err}")))?;
    let position = Normal::new(0.0, scatter_m.max(f64::MIN_POSITIVE))
        .map_err(|err| OrbitError::ConfigError(format!("position distribution: {err}")))?;
    let mut rng = StdRng::seed_from_u64(rng_seed);

    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        let r = (r_m + rng.sample(position)).max(f64::MIN_POSITIVE);
        let z = z_m + rng.sample(position);
        let phi = rng.sample(velocity).atan2(rng.sample(velocity));
        let sample = bfield.eval_b_db(r, phi, z).map_err(|err| {
            OrbitError::PhysicsViolation(format!(
                "seed position ({r}, {phi}, {z}) rejected by field: {err}"
            ))
        })?;

        let vpar = rng.sample(velocity);
        let v1: f64 = rng.sample(velocity);
        let v2: f64 = rng.sample(velocity);
        let vperp2 = v1 * v1 + v2 * v2;
        let mu = 0.5 * mass_kg * vperp2 / sample.norm();

        out.push(Marker {
            r,
            phi,
            z,
            vpar,
            mu,
            theta: v1.atan2(v2),
            mass: mass_kg,
            charge: charge_c,
        });
    }
    Ok(out)
}

/// Load markers into the first `markers.len()` lanes of `batch`,
/// priming each lane's cached field sample and normalized flux at the
/// marker position.
///
/// A marker whose position is rejected by the field provider occupies
/// its lane inactive, with the provider's diagnostic recorded under the
/// marker-init module; neighbouring lanes are unaffected. Returns the
/// number of lanes activated.
pub fn load_markers(
    batch: &mut MarkerBatch,
    markers: &[Marker],
    bfield: &dyn MagneticField,
) -> OrbitResult<usize> {
    if markers.len() > batch.capacity() {
        return Err(OrbitError::PhysicsViolation(format!(
            "{} markers exceed batch capacity {}",
            markers.len(),
            batch.capacity()
        )));
    }

    let mut activated = 0;
    for (lane, marker) in markers.iter().enumerate() {
        let primed = bfield
            .eval_b_db(marker.r, marker.phi, marker.z)
            .and_then(|sample| {
                let psi = bfield.eval_psi(marker.r, marker.phi, marker.z)?;
                let rho = bfield.eval_rho(psi)?;
                Ok((sample, rho))
            });
        match primed {
            Ok((sample, rho)) => {
                batch.activate(lane, marker, &sample, rho)?;
                activated += 1;
            }
            Err(err) => {
                batch.activate(lane, marker, &BFieldSample::default(), 0.0)?;
                batch.retire(
                    lane,
                    LaneError::field(err, ErrorModule::MarkerInit, FaultSite::InitialSample),
                );
            }
        }
    }
    Ok(activated)
}
