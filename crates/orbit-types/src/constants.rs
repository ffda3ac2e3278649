// ─────────────────────────────────────────────────────────────────────
// SCPN Orbit Core — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
/// Speed of light in vacuum (m/s).
/// Also the sentinel bound on the magnetic moment used to detect
/// numerical blow-up of a guiding-center state.
pub const SPEED_OF_LIGHT: f64 = 2.99792458e8;

/// Full turn (rad). Gyroangles are kept in [0, 2π).
pub const TWO_PI: f64 = 2.0 * std::f64::consts::PI;

/// Elementary charge (C)
pub const ELEMENTARY_CHARGE: f64 = 1.602176634e-19;

/// Proton mass (kg)
pub const M_PROTON: f64 = 1.67262192369e-27;

/// Deuterium mass (kg)
pub const M_DEUTERIUM: f64 = 3.3435837724e-27;

/// Alpha particle mass (kg)
pub const M_ALPHA: f64 = 6.6446573357e-27;

/// Joule per keV conversion factor
pub const J_PER_KEV: f64 = 1.0e3 * ELEMENTARY_CHARGE;
