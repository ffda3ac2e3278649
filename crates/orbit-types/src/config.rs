// ─────────────────────────────────────────────────────────────────────
// SCPN Orbit Core — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use serde::{Deserialize, Serialize};

use crate::error::{OrbitError, OrbitResult};
use crate::state::DEFAULT_BATCH_CAPACITY;

/// Top-level orbit-following configuration, 1:1 with the JSON schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrbitConfig {
    pub run_name: String,
    pub field: FieldConfig,
    pub stepping: SteppingConfig,
    /// Optional seeded test population; absent when markers come from
    /// an external source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<SeedConfig>,
}

/// Analytic circular-equilibrium field parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Magnetic-axis major radius (m).
    #[serde(rename = "R0")]
    pub r0: f64,
    /// Magnetic-axis vertical position (m).
    #[serde(rename = "Z0")]
    pub z0: f64,
    /// Toroidal field strength on axis (T).
    #[serde(rename = "B0")]
    pub b0: f64,
    pub safety_factor: f64,
    /// Minor radius of the last closed flux surface (m).
    pub minor_radius: f64,
    /// Normalized-flux evaluation limit; `None` leaves the field
    /// unbounded like the analytic original.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_rho_limit: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SteppingConfig {
    /// Fixed time step (s).
    pub time_step_s: f64,
    pub n_steps: usize,
    #[serde(default = "default_batch_capacity")]
    pub batch_capacity: usize,
}

fn default_batch_capacity() -> usize {
    DEFAULT_BATCH_CAPACITY
}

/// Deterministic test-population parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    pub n_markers: usize,
    pub energy_kev: f64,
    pub pitch_cos: f64,
    pub mass_kg: f64,
    pub charge_c: f64,
    #[serde(default)]
    pub rng_seed: u64,
}

impl OrbitConfig {
    /// Load from a JSON file.
    pub fn from_file(path: &str) -> OrbitResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Structural sanity checks on the numeric parameters.
    pub fn validate(&self) -> OrbitResult<()> {
        let s = &self.stepping;
        if !s.time_step_s.is_finite() || s.time_step_s <= 0.0 {
            return Err(OrbitError::ConfigError(format!(
                "stepping.time_step_s must be finite and > 0, got {}",
                s.time_step_s
            )));
        }
        if s.n_steps == 0 {
            return Err(OrbitError::ConfigError(
                "stepping.n_steps must be >= 1".to_string(),
            ));
        }
        if s.batch_capacity == 0 {
            return Err(OrbitError::ConfigError(
                "stepping.batch_capacity must be >= 1".to_string(),
            ));
        }
        if let Some(seed) = &self.seed {
            if seed.n_markers == 0 {
                return Err(OrbitError::ConfigError(
                    "seed.n_markers must be >= 1".to_string(),
                ));
            }
            if seed.n_markers > s.batch_capacity {
                return Err(OrbitError::ConfigError(format!(
                    "seed.n_markers {} exceeds batch_capacity {}",
                    seed.n_markers, s.batch_capacity
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_config() -> OrbitConfig {
        OrbitConfig {
            run_name: "iter-like-orbits".to_string(),
            field: FieldConfig {
                r0: 6.2,
                z0: 0.0,
                b0: 5.3,
                safety_factor: 1.8,
                minor_radius: 2.0,
                edge_rho_limit: None,
            },
            stepping: SteppingConfig {
                time_step_s: 1.0e-8,
                n_steps: 1000,
                batch_capacity: 16,
            },
            seed: Some(SeedConfig {
                n_markers: 8,
                energy_kev: 1000.0,
                pitch_cos: 0.7,
                mass_kg: 3.3435837724e-27,
                charge_c: 1.602176634e-19,
                rng_seed: 0,
            }),
        }
    }

    #[test]
    fn test_roundtrip_serialization() {
        let cfg = demo_config();
        let json = serde_json::to_string_pretty(&cfg).unwrap();
        let cfg2: OrbitConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg.run_name, cfg2.run_name);
        assert_eq!(cfg.field.r0, cfg2.field.r0);
        assert_eq!(cfg.stepping.n_steps, cfg2.stepping.n_steps);
        assert_eq!(
            cfg.seed.as_ref().unwrap().n_markers,
            cfg2.seed.as_ref().unwrap().n_markers
        );
    }

    #[test]
    fn test_renamed_field_keys() {
        let json = r#"{
            "run_name": "minimal",
            "field": {
                "R0": 6.2, "Z0": 0.0, "B0": 5.3,
                "safety_factor": 1.8, "minor_radius": 2.0
            },
            "stepping": { "time_step_s": 1e-8, "n_steps": 100 }
        }"#;
        let cfg: OrbitConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.field.r0, 6.2);
        assert!(cfg.field.edge_rho_limit.is_none());
        assert_eq!(cfg.stepping.batch_capacity, DEFAULT_BATCH_CAPACITY);
        assert!(cfg.seed.is_none());
    }

    #[test]
    fn test_validate_rejects_bad_stepping() {
        let mut cfg = demo_config();
        cfg.stepping.time_step_s = 0.0;
        assert!(cfg.validate().is_err());

        let mut cfg = demo_config();
        cfg.stepping.n_steps = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = demo_config();
        cfg.seed.as_mut().unwrap().n_markers = 64;
        assert!(cfg.validate().is_err());
    }
}
