use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrbitError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Physics constraint violated: {0}")]
    PhysicsViolation(String),

    #[error("Lane index out of bounds: lane={lane}, capacity={capacity}")]
    LaneOutOfBounds { lane: usize, capacity: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type OrbitResult<T> = Result<T, OrbitError>;

/// Diagnostic reported by a field provider when a point evaluation
/// is rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    #[error("evaluation point outside the field domain")]
    OutsideDomain,

    #[error("flux value outside the profile range")]
    OutsideFluxProfile,

    #[error("field evaluation produced a non-finite value")]
    NonFinite,
}

/// Category of a lane-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A committed state violated a physical bound.
    UnphysicalGuidingCenter,
    /// A field or flux query failed; the provider's diagnostic is
    /// carried through verbatim.
    Field(FieldError),
}

/// Component that recorded the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorModule {
    /// Failed during orbit stepping.
    OrbitStep,
    /// Failed while priming a lane from marker input.
    MarkerInit,
}

/// Where along a step's evaluation chain the first failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultSite {
    /// Field or electric-field query at Runge-Kutta stage 1-4.
    RkStage(u8),
    /// Post-commit field and flux refresh at the new position.
    FieldRefresh,
    /// Validity check: non-positive major radius.
    RadiusBound,
    /// Validity check: magnetic-moment magnitude at or beyond the
    /// speed-of-light sentinel.
    MomentUpperBound,
    /// Validity check: negative magnetic moment.
    MomentSign,
    /// Initial field evaluation while loading a marker.
    InitialSample,
}

/// Diagnostic recorded on a retired lane.
///
/// The first failure along a lane's evaluation chain is the one
/// recorded; once set on a lane it is never overwritten for the
/// remainder of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneError {
    pub kind: ErrorKind,
    pub module: ErrorModule,
    pub site: FaultSite,
}

impl LaneError {
    /// Unphysical-state failure raised by the orbit stepper itself.
    pub fn unphysical(site: FaultSite) -> Self {
        LaneError {
            kind: ErrorKind::UnphysicalGuidingCenter,
            module: ErrorModule::OrbitStep,
            site,
        }
    }

    /// Failure surfaced from a field provider.
    pub fn field(err: FieldError, module: ErrorModule, site: FaultSite) -> Self {
        LaneError {
            kind: ErrorKind::Field(err),
            module,
            site,
        }
    }
}
