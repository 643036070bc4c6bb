//! Resilience Headless Simulation Harness
//!
//! Runs the camp simulation end to end from the shipped camp config.
//! Entirely in-process: no rendering, no input, no game engine.
//!
//! Usage:
//!   cargo run -p resilience-simtest
//!   cargo run -p resilience-simtest -- --verbose

use hecs::{Entity, World};
use resilience_core::prelude::*;
use resilience_logic::income::{monthly_income, CampSnapshot};
use resilience_logic::odds::{pick_weighted, ratchet};
use resilience_logic::stat::Stat;
use resilience_logic::vitals::{approach, Step};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

// ── Camp config (same JSON a game front-end would load) ─────────────────
const CONFIG_JSON: &str = include_str!("../../../data/camp_config.json");

/// Seconds of wall time per simulated frame.
const FRAME: f32 = 0.5;
/// Months the campaign scenario runs for.
const CAMPAIGN_MONTHS: u32 = 6;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(name: &str, passed: bool, detail: impl Into<String>) -> TestResult {
    TestResult {
        name: name.into(),
        passed,
        detail: detail.into(),
    }
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    init_logging(verbose);

    println!("=== Resilience Camp Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Config parse + validation
    let config = match load_config(&mut results) {
        Some(config) => config,
        None => {
            report(&results, verbose);
            std::process::exit(1);
        }
    };

    // 2. Pure logic sweep
    results.extend(validate_logic(verbose));

    // 3. Allocation scenarios
    results.extend(validate_allocation(verbose));

    // 4. Full campaign
    results.extend(validate_campaign(&config, verbose));

    // 5. Reproducibility
    results.extend(validate_determinism(&config, verbose));

    if report(&results, verbose) > 0 {
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins; otherwise `debug` with `--verbose` and `warn` without.
/// Records from the `log` facade are forwarded by the subscriber.
fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

/// Print the summary; returns the number of failures.
fn report(results: &[TestResult], verbose: bool) -> usize {
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.len() - passed;

    for r in results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed,
        results.len(),
        failed
    );
    failed
}

// ── 1. Config ───────────────────────────────────────────────────────────

fn load_config(results: &mut Vec<TestResult>) -> Option<CampConfig> {
    println!("--- Camp Config ---");
    let config: CampConfig = match serde_json::from_str(CONFIG_JSON) {
        Ok(c) => c,
        Err(e) => {
            results.push(check("config_parse", false, format!("JSON parse error: {}", e)));
            return None;
        }
    };
    results.push(check("config_parse", true, "camp_config.json parsed"));

    let problems = config.validate();
    results.push(check(
        "config_valid",
        problems.is_empty(),
        if problems.is_empty() {
            "no problems".to_string()
        } else {
            problems.join("; ")
        },
    ));

    results.push(check(
        "config_has_arrivals",
        !config.arrivals.waves.is_empty(),
        format!("{} arrival waves", config.arrivals.waves.len()),
    ));
    results.push(check(
        "config_has_events",
        config.events.events.iter().all(|e| e.weight > 0),
        format!("{} random events", config.events.events.len()),
    ));

    if problems.is_empty() {
        Some(config)
    } else {
        None
    }
}

// ── 2. Logic ────────────────────────────────────────────────────────────

fn validate_logic(verbose: bool) -> Vec<TestResult> {
    println!("--- Logic ---");
    let mut results = Vec::new();

    // Stat bounds hold under a sweep of mixed writes
    let mut stat = Stat::new(0, 100, 50);
    let mut violations = 0;
    for i in -300i32..300 {
        match i.rem_euclid(3) {
            0 => stat.add(i),
            1 => stat.subtract(i / 2),
            _ => stat.set(i),
        };
        if stat.current() < stat.min() || stat.current() > stat.max() {
            violations += 1;
        }
    }
    results.push(check(
        "stat_bounds_sweep",
        violations == 0,
        format!("{} bound violations over 600 writes", violations),
    ));

    // Approach converges on the target from both sides
    let step = Step {
        increase: 3,
        decrease: 2,
    };
    let converges = [0, 37, 100].iter().all(|&start| {
        let mut s = Stat::new(0, 100, start);
        for _ in 0..100 {
            approach(&mut s, 40, step);
        }
        (39..=40).contains(&s.current())
    });
    results.push(check(
        "approach_converges",
        converges,
        "stats settle at or just under their target",
    ));

    // Income grows with population
    let income = |volume: u32| {
        monthly_income(
            &CampSnapshot {
                volume,
                average_wellbeing: 60.0,
                resettled: 0,
            },
            0.5,
            0.5,
            50,
        )
        .total()
    };
    let series: Vec<i64> = [0, 1, 10, 100].iter().map(|&v| income(v)).collect();
    if verbose {
        println!("    income by population 0/1/10/100: {:?}", series);
    }
    results.push(check(
        "income_monotonic",
        series.windows(2).all(|w| w[0] <= w[1]),
        format!("{:?}", series),
    ));

    // Weighted pick covers every positive weight and skips zero weights
    let weights = [2, 0, 3];
    let picks: Vec<Option<usize>> = (0..5).map(|d| pick_weighted(&weights, d)).collect();
    results.push(check(
        "weighted_pick",
        picks == vec![Some(0), Some(0), Some(2), Some(2), Some(2)],
        format!("{:?}", picks),
    ));

    results.push(check(
        "chance_ratchet_capped",
        ratchet(19, 5, 0, 20) == 20 && ratchet(0, 0, 10, 20) == 10,
        "ratchet stays within [min, max]",
    ));

    results
}

// ── 3. Allocation ───────────────────────────────────────────────────────

fn validate_allocation(verbose: bool) -> Vec<TestResult> {
    println!("--- Allocation ---");
    let mut results = Vec::new();

    // Three homeless, new house (2, 4): all housed, house below max
    {
        let mut camp = Camp::new();
        let homeless = camp.homeless(3);
        let house = camp.house(2, 4);
        let report = camp.registry.on_house_built(&camp.world, house);
        let count = camp.occupants(house);
        results.push(check(
            "drain_homeless",
            report.is_ok()
                && count == 3
                && camp.registry.homeless_count() == 0
                && camp.registry.indexed_occupancy(house) == Some(Occupancy::BelowMax),
            format!("{} of {} homeless housed", count, homeless.len()),
        ));
    }

    // Two full houses (2, 4) + new house: one from each, donors at 3
    {
        let mut camp = Camp::new();
        let a = camp.built_house(2, 4);
        let b = camp.built_house(2, 4);
        camp.fill(a, 4);
        camp.fill(b, 4);
        let c = camp.house(2, 4);
        let report = camp.registry.on_house_built(&camp.world, c);
        let counts = [camp.occupants(a), camp.occupants(b), camp.occupants(c)];
        if verbose {
            println!("    rebalance result: {:?}", counts);
        }
        results.push(check(
            "uniform_rebalance",
            report.map(|r| r.rebalanced).ok() == Some(2) && counts == [3, 3, 2],
            format!("occupants after rebalance: {:?}", counts),
        ));
        results.push(check(
            "registry_consistent",
            camp.registry.consistency_problems(&camp.world).is_empty(),
            "cached buckets match occupant counts",
        ));
    }

    // Three full houses (2, 4) + new house: every donor gives one in the pass
    {
        let mut camp = Camp::new();
        let donors: Vec<Entity> = (0..3).map(|_| camp.built_house(2, 4)).collect();
        for &d in &donors {
            camp.fill(d, 4);
        }
        let new = camp.house(2, 4);
        let report = camp.registry.on_house_built(&camp.world, new);
        let counts: Vec<u32> = donors.iter().map(|&d| camp.occupants(d)).collect();
        results.push(check(
            "rebalance_full_pass",
            report.map(|r| r.rebalanced).ok() == Some(3)
                && counts == [3, 3, 3]
                && camp.occupants(new) == 3,
            format!("donors {:?}, new house {}", counts, camp.occupants(new)),
        ));
    }

    // Full house rejects the next occupant and stays unchanged
    {
        let mut camp = Camp::new();
        let house = camp.built_house(1, 1);
        camp.fill(house, 1);
        let extra = camp.refugee();
        let rejected = camp.registry.add_occupant(&camp.world, house, extra).is_err();
        results.push(check(
            "full_house_rejects",
            rejected && camp.occupants(house) == 1,
            "add on a full house is a logged no-op",
        ));
    }

    results
}

/// Bare world + registry for allocation checks.
struct Camp {
    world: World,
    registry: HousingRegistry,
}

impl Camp {
    fn new() -> Self {
        Self {
            world: World::new(),
            registry: HousingRegistry::new(),
        }
    }

    fn refugee(&mut self) -> Entity {
        self.world.spawn((Refugee::new(), Vitals::default()))
    }

    fn homeless(&mut self, n: usize) -> Vec<Entity> {
        (0..n)
            .map(|_| {
                let r = self.refugee();
                let _ = self.registry.enqueue_homeless(&self.world, r);
                r
            })
            .collect()
    }

    fn house(&mut self, preferred: u32, max: u32) -> Entity {
        self.world.spawn((House::new(Capacity::new(preferred, max)),))
    }

    fn built_house(&mut self, preferred: u32, max: u32) -> Entity {
        let house = self.house(preferred, max);
        let _ = self.registry.on_house_built(&self.world, house);
        house
    }

    fn fill(&mut self, house: Entity, n: usize) {
        for _ in 0..n {
            let r = self.refugee();
            let _ = self.registry.add_occupant(&self.world, house, r);
        }
    }

    fn occupants(&self, house: Entity) -> u32 {
        self.world
            .get::<&House>(house)
            .map(|h| h.occupant_count())
            .unwrap_or(0)
    }
}

// ── 4. Campaign ─────────────────────────────────────────────────────────

#[derive(Debug, Default, PartialEq, Serialize)]
struct CampaignSummary {
    months: u32,
    frames: u32,
    arrived: u32,
    deaths: u32,
    population: u32,
    homeless: usize,
    houses: usize,
    capacity: u32,
    funds: i64,
    average_wellbeing: f64,
    events_started: Vec<String>,
    consistency_problems: Vec<String>,
    overfull_houses: u32,
}

/// Play a scripted camp: build services at the start, add a house each month
/// people are homeless and money allows, upgrade once funds pile up.
fn play_campaign(config: &CampConfig) -> Result<CampaignSummary, EngineError> {
    let mut engine = CampEngine::new(config.clone())?;
    let mut summary = CampaignSummary::default();
    let mut next_slot = 0u32;

    let mut place_house = |engine: &mut CampEngine| -> bool {
        let (x, z) = ((next_slot % 4) as f32 * 6.0, (next_slot / 4) as f32 * 6.0);
        if engine.place_building(BuildingKind::House, Site::new(x, z)).is_err() {
            return false;
        }
        next_slot += 1;
        true
    };

    place_house(&mut engine);
    place_house(&mut engine);
    engine.place_building(BuildingKind::WaterPoint, Site::new(9.0, 3.0))?;
    engine.place_building(BuildingKind::FoodPoint, Site::new(9.0, 9.0))?;

    let mut upgraded = false;
    let end_month = engine.current_month() + CAMPAIGN_MONTHS;
    while engine.current_month() < end_month && summary.frames < 100_000 {
        engine.update(FRAME);
        summary.frames += 1;

        for event in engine.drain_events() {
            match event {
                CampEvent::RefugeesArrived(n) => summary.arrived += n,
                CampEvent::RefugeeDied(_) => summary.deaths += 1,
                CampEvent::RandomEventStarted(name) => summary.events_started.push(name),
                CampEvent::MonthPassed { .. } if engine.homeless_count() > 0 => {
                    place_house(&mut engine);
                }
                CampEvent::HouseCompleted { house, .. } if !upgraded && engine.funds() > 120 => {
                    upgraded = engine.upgrade_house(house).is_ok();
                }
                _ => {}
            }
        }

        if summary.frames % 20 == 0 {
            summary
                .consistency_problems
                .extend(engine.housing().consistency_problems(&engine.world));
        }
        summary.overfull_houses += engine
            .housing()
            .houses()
            .iter()
            .filter(|&&h| is_overfull(&engine, h))
            .count() as u32;
    }

    summary.months = engine.current_month() - 1;
    summary.population = engine.population();
    summary.homeless = engine.homeless_count();
    summary.houses = engine.housing().house_count();
    summary.capacity = engine.housing_capacity();
    summary.funds = engine.funds();
    summary.average_wellbeing = engine.average_wellbeing();
    Ok(summary)
}

fn is_overfull(engine: &CampEngine, house: Entity) -> bool {
    engine
        .world
        .get::<&House>(house)
        .map(|h| h.occupant_count() > h.max())
        .unwrap_or(false)
}

fn validate_campaign(config: &CampConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Campaign ---");
    let mut results = Vec::new();

    let summary = match play_campaign(config) {
        Ok(s) => s,
        Err(e) => {
            results.push(check("campaign_start", false, e.to_string()));
            return results;
        }
    };
    log::info!(
        "campaign finished: {} frames, {} living, {} dead",
        summary.frames,
        summary.population,
        summary.deaths
    );
    if verbose {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => println!("    (summary not serializable: {})", e),
        }
    }

    results.push(check(
        "campaign_months",
        summary.months == CAMPAIGN_MONTHS,
        format!("{} months in {} frames", summary.months, summary.frames),
    ));
    results.push(check(
        "campaign_population_ledger",
        summary.arrived == summary.population + summary.deaths,
        format!(
            "{} arrived = {} living + {} dead",
            summary.arrived, summary.population, summary.deaths
        ),
    ));
    results.push(check(
        "campaign_waves_arrived",
        summary.arrived >= config.arrivals.waves.iter().map(|w| w.count).sum::<u32>(),
        format!("{} refugees arrived", summary.arrived),
    ));
    results.push(check(
        "campaign_registry_consistent",
        summary.consistency_problems.is_empty(),
        summary
            .consistency_problems
            .first()
            .cloned()
            .unwrap_or_else(|| "no drift between index and occupants".into()),
    ));
    results.push(check(
        "campaign_max_occupancy",
        summary.overfull_houses == 0,
        format!("{} house-frames over max", summary.overfull_houses),
    ));
    results.push(check(
        "campaign_houses_built",
        summary.houses >= 2 && summary.capacity > 0,
        format!("{} houses, {} places", summary.houses, summary.capacity),
    ));
    results.push(check(
        "campaign_wellbeing_range",
        (0.0..=config.vitals.stat_max as f64).contains(&summary.average_wellbeing),
        format!("average wellbeing {:.1}", summary.average_wellbeing),
    ));

    results
}

// ── 5. Determinism ──────────────────────────────────────────────────────

fn validate_determinism(config: &CampConfig, _verbose: bool) -> Vec<TestResult> {
    println!("--- Determinism ---");
    let first = play_campaign(config);
    let second = play_campaign(config);
    let same = match (&first, &second) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    };
    vec![check(
        "same_seed_same_camp",
        same,
        "two runs with one seed produce identical summaries",
    )]
}
