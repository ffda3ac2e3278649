// ─────────────────────────────────────────────────────────────────────
// SCPN Orbit Core — Validity
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Physical-validity checks run on every committed guiding-center
//! state.

use orbit_types::constants::SPEED_OF_LIGHT;
use orbit_types::error::{FaultSite, LaneError};
use orbit_types::state::GcState;

/// Check a committed state against the physical bounds.
///
/// Precedence is fixed: non-positive major radius, then magnetic-moment
/// magnitude at or beyond the speed-of-light sentinel, then negative
/// magnetic moment. The first failing check wins.
pub fn check_guiding_center(y: &GcState) -> Result<(), LaneError> {
    if y.r <= 0.0 {
        return Err(LaneError::unphysical(FaultSite::RadiusBound));
    }
    if y.mu.abs() >= SPEED_OF_LIGHT {
        return Err(LaneError::unphysical(FaultSite::MomentUpperBound));
    }
    if y.mu < 0.0 {
        return Err(LaneError::unphysical(FaultSite::MomentSign));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbit_types::error::ErrorKind;

    fn valid_state() -> GcState {
        GcState {
            r: 6.2,
            phi: 0.0,
            z: 0.0,
            vpar: 1.0e6,
            mu: 1.0e-15,
            theta: 1.0,
        }
    }

    #[test]
    fn test_valid_state_passes() {
        assert!(check_guiding_center(&valid_state()).is_ok());
    }

    #[test]
    fn test_non_positive_radius_fails_first() {
        // Even with the moment also out of bounds, the radius check has
        // precedence.
        let y = GcState {
            r: -1.0,
            mu: -4.0,
            ..valid_state()
        };
        let err = check_guiding_center(&y).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnphysicalGuidingCenter);
        assert_eq!(err.site, FaultSite::RadiusBound);
    }

    #[test]
    fn test_moment_magnitude_precedes_sign() {
        let y = GcState {
            mu: -1.0e9,
            ..valid_state()
        };
        let err = check_guiding_center(&y).unwrap_err();
        assert_eq!(err.site, FaultSite::MomentUpperBound);
    }

    #[test]
    fn test_negative_moment_fails() {
        let y = GcState {
            mu: -1.0e-20,
            ..valid_state()
        };
        let err = check_guiding_center(&y).unwrap_err();
        assert_eq!(err.site, FaultSite::MomentSign);
    }

    #[test]
    fn test_moment_at_sentinel_fails() {
        let y = GcState {
            mu: SPEED_OF_LIGHT,
            ..valid_state()
        };
        assert!(check_guiding_center(&y).is_err());
        let y = GcState {
            mu: SPEED_OF_LIGHT * (1.0 - 1e-12),
            ..valid_state()
        };
        assert!(check_guiding_center(&y).is_ok());
    }
}
