// ─────────────────────────────────────────────────────────────────────
// SCPN Orbit Core — Diagnostics
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Batch summaries and per-lane orbit traces.
//!
//! Fixed-capacity channels keep high-frequency recording allocation-free
//! once constructed.

use orbit_types::constants::J_PER_KEV;
use orbit_types::error::ErrorKind;
use orbit_types::state::MarkerBatch;
use serde::{Deserialize, Serialize};

/// Kinetic snapshot of a marker batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub capacity: usize,
    pub active: usize,
    /// Lanes stopped with an error recorded.
    pub retired: usize,
    pub unphysical: usize,
    pub field_faults: usize,
    /// Mean kinetic energy of active lanes [keV]; zero when none.
    pub mean_energy_kev: f64,
    pub max_energy_kev: f64,
}

/// Summarize activity and kinetic state of a batch.
///
/// Energy per lane is ½·m·vpar² + mu·|B| using the lane's cached field
/// sample, so the summary is consistent with the most recent committed
/// step.
pub fn summarize_batch(batch: &MarkerBatch) -> BatchSummary {
    let capacity = batch.capacity();
    let mut active = 0;
    let mut retired = 0;
    let mut unphysical = 0;
    let mut field_faults = 0;
    let mut energy_sum = 0.0;
    let mut energy_max = 0.0_f64;

    for lane in 0..capacity {
        if batch.is_active(lane) {
            active += 1;
            let vpar = batch.vpar[lane];
            let energy_j =
                0.5 * batch.mass[lane] * vpar * vpar + batch.mu[lane] * batch.field_sample(lane).norm();
            let energy_kev = energy_j / J_PER_KEV;
            energy_sum += energy_kev;
            energy_max = energy_max.max(energy_kev);
        } else if let Some(err) = batch.error(lane) {
            retired += 1;
            match err.kind {
                ErrorKind::UnphysicalGuidingCenter => unphysical += 1,
                ErrorKind::Field(_) => field_faults += 1,
            }
        }
    }

    BatchSummary {
        capacity,
        active,
        retired,
        unphysical,
        field_faults,
        mean_energy_kev: if active > 0 {
            energy_sum / active as f64
        } else {
            0.0
        },
        max_energy_kev: energy_max,
    }
}

/// Fixed-size ring buffer for one scalar orbit channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceChannel {
    data: Vec<f64>,
    capacity: usize,
    head: usize,
    count: usize,
}

impl TraceChannel {
    pub fn new(capacity: usize) -> Self {
        TraceChannel {
            data: vec![0.0; capacity],
            capacity,
            head: 0,
            count: 0,
        }
    }

    pub fn push(&mut self, value: f64) {
        self.data[self.head] = value;
        self.head = (self.head + 1) % self.capacity;
        if self.count < self.capacity {
            self.count += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Recorded values in chronological order (oldest to newest).
    pub fn view(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.count);
        if self.count < self.capacity {
            out.extend_from_slice(&self.data[0..self.count]);
        } else {
            out.extend_from_slice(&self.data[self.head..self.capacity]);
            out.extend_from_slice(&self.data[0..self.head]);
        }
        out
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.count = 0;
    }
}

/// Per-lane orbit history: position, normalized flux and the cumulative
/// poloidal angle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrbitTrace {
    pub lane: usize,
    pub r: TraceChannel,
    pub z: TraceChannel,
    pub rho: TraceChannel,
    pub pol: TraceChannel,
}

impl OrbitTrace {
    pub fn new(lane: usize, capacity: usize) -> Self {
        OrbitTrace {
            lane,
            r: TraceChannel::new(capacity),
            z: TraceChannel::new(capacity),
            rho: TraceChannel::new(capacity),
            pol: TraceChannel::new(capacity),
        }
    }

    /// Record the lane's current values; inactive lanes are skipped so
    /// the trace ends at the last committed state.
    pub fn record(&mut self, batch: &MarkerBatch) {
        if !batch.is_active(self.lane) {
            return;
        }
        self.r.push(batch.r[self.lane]);
        self.z.push(batch.z[self.lane]);
        self.rho.push(batch.rho[self.lane]);
        self.pol.push(batch.pol[self.lane]);
    }
}
