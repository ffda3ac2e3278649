//! Trivial electric-field models.

use orbit_types::error::{FieldError, OrbitError, OrbitResult};
use orbit_types::state::EFieldSample;

use crate::field::{ElectricField, MagneticField};

/// Vanishing electric field, the default for equilibrium orbits.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroElectricField;

impl ElectricField for ZeroElectricField {
    fn eval_e(
        &self,
        _r: f64,
        _phi: f64,
        _z: f64,
        _bfield: &dyn MagneticField,
    ) -> Result<EFieldSample, FieldError> {
        Ok(EFieldSample::default())
    }
}

/// Spatially uniform electric field in cylindrical components.
///
/// Strictly uniform only in (R, Z); the components are interpreted in
/// the local cylindrical basis, which is what drift tests need.
#[derive(Debug, Clone, Copy)]
pub struct UniformElectricField {
    value: EFieldSample,
}

impl UniformElectricField {
    pub fn new(e_r: f64, e_phi: f64, e_z: f64) -> OrbitResult<Self> {
        if !e_r.is_finite() || !e_phi.is_finite() || !e_z.is_finite() {
            return Err(OrbitError::ConfigError(
                "uniform electric field components must be finite".to_string(),
            ));
        }
        Ok(UniformElectricField {
            value: EFieldSample { e_r, e_phi, e_z },
        })
    }
}

impl ElectricField for UniformElectricField {
    fn eval_e(
        &self,
        r: f64,
        _phi: f64,
        _z: f64,
        _bfield: &dyn MagneticField,
    ) -> Result<EFieldSample, FieldError> {
        if !r.is_finite() {
            return Err(FieldError::NonFinite);
        }
        Ok(self.value)
    }
}
