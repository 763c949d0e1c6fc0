//! RingFit Status Tool
//!
//! Runtime status of the service plus the sizing guide served to assistants.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Sizing instructions for AI assistants
pub const SIZING_INSTRUCTIONS: &str = r#"
# RingFit Sizing Instructions

This guide explains how to measure a ring, finger or bracelet and find
jewelry that fits using the RingFit tools.

## Overview

Every size is stored in four equivalent forms:
1. **Diameter** (mm) - inner diameter of the ring or bracelet
2. **Circumference** (mm) - inner perimeter, diameter × π
3. **EU size** - numerically equal to the diameter in mm
4. **US size** - diameter in inches × 10 (diameter / 25.4 × 10)

Lengths are rounded to two decimals, sizes to one decimal.

---

## Measuring

Call `convert_measurement` (preview only) or `save_measurement` (stores it)
with exactly ONE of the following inputs:

| Input | Parameters | Example |
|-------|------------|---------|
| Diameter | `diameter_mm` | `{"diameter_mm": 17.5}` |
| Circumference | `circumference_mm` | `{"circumference_mm": 55}` |
| EU size | `size_eu` | `{"size_eu": 17}` |
| US size | `size_us` | `{"size_us": 7}` |
| Photo calibration | `ring_radius_px` + `reference_radius_px` | see below |

Pass `measurement_type` as `RING` (default), `FINGER` or `BRACELET`.

### Photo calibration

The user photographs the ring next to a reference coin and measures both
radii in pixels. The ring diameter is:

**diameter_mm = (ring_radius_px / reference_radius_px) × reference_diameter_mm**

The reference coin defaults to a 2 euro coin (24 mm). Pass
`reference_diameter_mm` when a different coin is used.

---

## Size bands (EU size)

| Type | Small | Medium | Large |
|------|-------|--------|-------|
| Ring / finger | 0-15 | 15-18 | 18-25 |
| Bracelet | 0-16 | 16-18 | 18-22 |

Sizes above the table fall in the Large band.

---

## Finding jewelry that fits

- `match_products_for_measurement` - matches a saved measurement by ID
- `match_products_for_size` - matches an ad-hoc size without saving it

A product matches when it is available AND at least one size agrees
within tolerance:

| Check | Tolerance |
|-------|-----------|
| Diameter | ± 2 mm |
| Circumference | ± 5 mm |
| EU size | ± 1 |
| US size | ± 0.5 |

Each match lists the checks it passed in `matched_on`. Products are
returned in catalog order; there is no closeness ranking.

---

## Tips

- Ask which finger and which hand; sizes differ between them
- Fingers swell when warm; measure at room temperature
- A finger measurement should use `measurement_type: FINGER`
- Vendors may leave product sizes blank (or 0); those checks are skipped
"#;

/// Runtime status of the RingFit service
#[derive(Debug, Clone, Serialize)]
pub struct RingFitStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,

    /// User the server acts for
    pub user_id: i64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
    user_id: i64,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf, user_id: i64) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
            user_id,
        }
    }

    /// Get the current status
    pub fn get_status(&self) -> RingFitStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        RingFitStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
            user_id: self.user_id,
        }
    }
}
