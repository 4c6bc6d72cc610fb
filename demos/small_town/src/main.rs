//! small_town — smallest runnable example for the episim kernel.
//!
//! A synthetic town of 2 000 persons in households of one to five.  Adults
//! work on weekdays in offices of about twenty, everyone meets a few others
//! for leisure on weekends.  From day 21 offices run at half capacity.
//!
//! ```text
//! cargo run -p small_town --release -- [output_dir]
//! RUST_LOG=ep_sim=debug cargo run -p small_town
//! ```

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use ep_core::{
    ActivityType, ContainerId, DayRef, EpisimConfig, HouseholdId, InfectionConfig, PersonId, PolicyEntry,
    TracingConfig,
};
use ep_events::{ContactEvent, MemoryReplay, ReplayMode};
use ep_output::{ActivityAggregator, CsvWriter, ReportPeriod, SimOutputObserver};
use ep_population::PopulationBuilder;
use ep_sim::{Both, SimBuilder, SummaryCollector};

// ── Constants ─────────────────────────────────────────────────────────────────

const PERSONS:     usize = 2_000;
const SEED:        u64   = 4711;
const DAYS:        u32   = 90;
const OFFICE_SIZE: usize = 20;

const HOME:    u16 = 0;
const WORK:    u16 = 1;
const LEISURE: u16 = 2;

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 2, 17).unwrap_or_default()
}

// ── Synthetic town ────────────────────────────────────────────────────────────

struct Town {
    households: Vec<Vec<PersonId>>,
    offices:    Vec<Vec<PersonId>>,
    ages:       Vec<u8>,
}

fn build_town(rng: &mut SmallRng) -> Town {
    let mut households = Vec::new();
    let mut ages = Vec::with_capacity(PERSONS);
    let mut next = 0usize;
    while next < PERSONS {
        let size = rng.gen_range(1..=5).min(PERSONS - next);
        let members: Vec<PersonId> = (next..next + size).map(|p| PersonId(p as u32)).collect();
        for i in 0..size {
            // first two members are adults, the rest children
            ages.push(if i < 2 { rng.gen_range(20..85) } else { rng.gen_range(0..18) });
        }
        households.push(members);
        next += size;
    }

    let mut workers: Vec<PersonId> =
        (0..PERSONS).filter(|&p| (20..65).contains(&ages[p])).map(|p| PersonId(p as u32)).collect();
    workers.shuffle(rng);
    let offices = workers.chunks(OFFICE_SIZE).map(<[PersonId]>::to_vec).collect();

    Town { households, offices, ages }
}

fn contact(a: PersonId, b: PersonId, container: u64, activity: u16, start_time: u32, duration: f64) -> ContactEvent {
    ContactEvent {
        person_a:   a,
        person_b:   b,
        container:  ContainerId(container),
        activity:   ActivityType(activity),
        start_time,
        duration,
    }
}

/// One dated contact stream for the whole run.
fn build_replay(town: &Town, rng: &mut SmallRng) -> MemoryReplay {
    let mut replay = MemoryReplay::new(ReplayMode::Dated);
    let offices_base = town.households.len() as u64;
    let leisure_base = offices_base + town.offices.len() as u64;

    for d in 0..DAYS {
        let date = start_date() + chrono::Days::new(u64::from(d));
        let weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);

        for (h, members) in town.households.iter().enumerate() {
            for (i, &a) in members.iter().enumerate() {
                for &b in &members[i + 1..] {
                    let hours = if weekend { 14.0 } else { 10.0 };
                    replay.push(date, contact(a, b, h as u64, HOME, 64_800, hours * 3_600.0));
                }
            }
        }

        if weekend {
            for _ in 0..PERSONS / 4 {
                let a = PersonId(rng.gen_range(0..PERSONS as u32));
                let b = PersonId(rng.gen_range(0..PERSONS as u32));
                if a != b {
                    let venue = leisure_base + rng.gen_range(0..40);
                    replay.push(date, contact(a, b, venue, LEISURE, 50_400, rng.gen_range(1_800.0..10_800.0)));
                }
            }
            continue;
        }

        for (o, staff) in town.offices.iter().enumerate() {
            for (i, &a) in staff.iter().enumerate() {
                // each worker shares time with the next three colleagues
                for &b in staff[i + 1..].iter().take(3) {
                    replay.push(date, contact(a, b, offices_base + o as u64, WORK, 28_800, 4.0 * 3_600.0));
                }
            }
        }
    }
    replay
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let out_dir = std::env::args().nth(1).map_or_else(|| PathBuf::from("output/small_town"), PathBuf::from);
    std::fs::create_dir_all(&out_dir)?;

    println!("=== small_town — episim kernel ===");
    println!("Persons: {PERSONS}  |  Days: {DAYS}  |  Seed: {SEED}");
    println!();

    // 1. Synthetic population and contact stream.
    let mut rng = SmallRng::seed_from_u64(SEED);
    let town = build_town(&mut rng);
    let replay = build_replay(&town, &mut rng);
    println!("Households: {}  |  Offices: {}", town.households.len(), town.offices.len());

    let mut population = PopulationBuilder::new(PERSONS);
    for (h, members) in town.households.iter().enumerate() {
        for p in members {
            population = population.household_of(p.index(), HouseholdId(h as u32));
        }
    }
    for (p, &age) in town.ages.iter().enumerate() {
        population = population.age_of(p, age).region_of(p, (p % 4) as u32);
    }

    // 2. Configuration.
    let config = EpisimConfig {
        start_date:            start_date(),
        days:                  DAYS,
        seed:                  SEED,
        num_threads:           None,
        activity_types:        vec!["home".into(), "work".into(), "leisure".into()],
        home_activity:         "home".into(),
        on_malformed_record:   Default::default(),
        initial_infections:    10,
        initial_infection_day: 0,
        infection:             InfectionConfig { calibration_parameter: 1.2e-5, activity_corrections: vec![] },
        population:            Default::default(),
        progression:           Default::default(),
        tracing:               TracingConfig {
            start_day:                    14,
            tracing_period_days:          5,
            tracing_probability:          0.6,
            tracing_capacity_per_day:     Some(30),
            tracing_delay_days:           1,
            quarantine_household_members: true,
            equipment_rate:               0.8,
            ..TracingConfig::default()
        },
        policy:                vec![PolicyEntry {
            from:               DayRef::Day(21),
            activity:           "work".into(),
            remaining_fraction: 0.5,
        }],
    };

    // 3. Build and run.
    let mut sim = SimBuilder::new(config, Box::new(replay)).population(population).build()?;
    let names = sim.registry().names().to_vec();

    let mut out = SimOutputObserver::new(CsvWriter::new(&out_dir, &names)?);
    let mut report = ActivityAggregator::from_config(sim.config(), ReportPeriod::Weekly)?;
    let mut summaries = SummaryCollector::default();

    let t0 = Instant::now();
    sim.run(&mut Both(&mut out, &mut Both(&mut report, &mut summaries)))?;
    let elapsed = t0.elapsed();

    if let Some(e) = out.take_error() {
        eprintln!("output error: {e}");
    }
    let report_path = report.write_csv(&out_dir)?;
    let snapshot_path = out_dir.join("snapshot.json");
    std::fs::write(&snapshot_path, sim.snapshot().to_json()?)?;

    // 4. Summary.
    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!("  {}", out_dir.join(ep_output::csv::DAILY_FILE).display());
    println!("  {}", report_path.display());
    println!("  {}", snapshot_path.display());
    println!();

    println!("{:<12} {:>10} {:>10} {:>10} {:>12}", "Week ending", "Infected", "New", "Infectious", "Quarantined");
    println!("{}", "-".repeat(58));
    for week in summaries.summaries.chunks(7) {
        let Some(last) = week.last() else { continue };
        let new: u64 = week.iter().map(|s| s.new_infections).sum();
        println!(
            "{:<12} {:>10} {:>10} {:>10} {:>12}",
            last.date.to_string(),
            last.cumulative_infected(),
            new,
            last.infectious(),
            last.quarantined,
        );
    }

    Ok(())
}
