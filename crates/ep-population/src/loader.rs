//! CSV population loader.
//!
//! # CSV format
//!
//! One row per person.  Only `person_id` is required; the other columns may
//! be absent from the header or left empty per row.
//!
//! ```csv
//! person_id,household_id,age,region,infectiousness,susceptibility
//! 0,0,34,1,,
//! 1,0,36,1,,
//! 2,1,71,2,1.4,0.9
//! ```
//!
//! Person ids must be dense: a file with `n` rows contains each of `0..n`
//! exactly once, in any order.  Empty multiplier cells are sampled from the
//! configured distributions at build time.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use ep_core::HouseholdId;

use crate::builder::valid_multiplier;
use crate::{PopulationBuilder, PopulationError, PopulationResult};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct PersonRecord {
    person_id:      u32,
    #[serde(default)]
    household_id:   Option<u32>,
    #[serde(default)]
    age:            Option<u8>,
    #[serde(default)]
    region:         Option<u32>,
    #[serde(default)]
    infectiousness: Option<f64>,
    #[serde(default)]
    susceptibility: Option<f64>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a population from a CSV file into a [`PopulationBuilder`].
pub fn load_population_csv(path: &Path) -> PopulationResult<PopulationBuilder> {
    let file = std::fs::File::open(path)?;
    load_population_reader(file)
}

/// Like [`load_population_csv`] but accepts any `Read` source.
pub fn load_population_reader<R: Read>(reader: R) -> PopulationResult<PopulationBuilder> {
    // ── Parse CSV rows ────────────────────────────────────────────────────
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut records = Vec::new();
    for (line, result) in csv_reader.deserialize::<PersonRecord>().enumerate() {
        let record = result.map_err(|e| PopulationError::Parse(format!("row {}: {e}", line + 1)))?;
        for (name, value) in [("infectiousness", record.infectiousness), ("susceptibility", record.susceptibility)] {
            if let Some(v) = value.filter(|&v| !valid_multiplier(v)) {
                return Err(PopulationError::Parse(format!(
                    "row {}: {name} must be finite and non-negative, got {v}",
                    line + 1
                )));
            }
        }
        records.push(record);
    }

    // ── Check density ─────────────────────────────────────────────────────
    let count = records.len();
    let mut seen = vec![false; count];
    for r in &records {
        let i = r.person_id as usize;
        if i >= count {
            return Err(PopulationError::NonDenseIds {
                count,
                detail: format!("person_id {} out of range", r.person_id),
            });
        }
        if std::mem::replace(&mut seen[i], true) {
            return Err(PopulationError::NonDenseIds {
                count,
                detail: format!("person_id {} appears twice", r.person_id),
            });
        }
    }

    // ── Fill builder ──────────────────────────────────────────────────────
    let mut builder = PopulationBuilder::new(count);
    for r in records {
        let i = r.person_id as usize;
        if let Some(hh) = r.household_id {
            builder = builder.household_of(i, HouseholdId(hh));
        }
        if let Some(age) = r.age {
            builder = builder.age_of(i, age);
        }
        if let Some(region) = r.region {
            builder = builder.region_of(i, region);
        }
        if let Some(v) = r.infectiousness {
            builder = builder.infectiousness_of(i, v);
        }
        if let Some(v) = r.susceptibility {
            builder = builder.susceptibility_of(i, v);
        }
    }
    Ok(builder)
}
