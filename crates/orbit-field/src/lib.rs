// ─────────────────────────────────────────────────────────────────────
// SCPN Orbit Core — Orbit Field
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Field models and the evaluation contract the orbit stepper consumes.

pub mod analytic;
pub mod efield;
pub mod field;
