//! Camp engine - main entry point for running the simulation

use hecs::{Entity, World};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use resilience_logic::config::{CampConfig, EffectKind};
use resilience_logic::income::{CampSnapshot, MonthlyIncome};
use resilience_logic::occupancy::Occupancy;
use resilience_logic::stat::{Stat, StatBand};

use crate::clock::{ClockEvent, TickClock};
use crate::components::*;
use crate::economy::Treasury;
use crate::error::EngineError;
use crate::housing::{AllocationReport, HousingRegistry};
use crate::scheduler::TickScheduler;
use crate::systems::*;

/// Notifications for the UI layer, drained with [`CampEngine::drain_events`].
#[derive(Debug, Clone, PartialEq)]
pub enum CampEvent {
    /// Camp housing capacity changed by this many places.
    HousingCapacityAdded(i64),
    /// New balance.
    FundsChanged(i64),
    RefugeesArrived(u32),
    RefugeeDied(Entity),
    MonthPassed { month: u32, income: MonthlyIncome },
    RandomEventStarted(String),
    RandomEventEnded(String),
    HouseCompleted { house: Entity, report: AllocationReport },
    ServicePointCompleted { building: Entity, kind: BuildingKind, houses_served: u32 },
}

/// Work waiting on the tick scheduler.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Job {
    FinishConstruction(Entity),
    ArrivalWave(usize),
    ApplyEffect { effect: usize, kind: EffectKind },
}

/// Count of living refugees per wellbeing band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WellbeingReport {
    pub good: u32,
    pub okay: u32,
    pub bad: u32,
}

/// Main simulation engine
pub struct CampEngine {
    /// ECS world containing refugees and buildings
    pub world: World,
    config: CampConfig,
    clock: TickClock,
    scheduler: TickScheduler<Job>,
    housing: HousingRegistry,
    reception: ReceptionCenter,
    treasury: Treasury,
    director: EventDirector,
    rng: StdRng,
    events: Vec<CampEvent>,
}

impl CampEngine {
    /// Create an empty camp. Fails if the config does not validate.
    pub fn new(config: CampConfig) -> Result<Self, EngineError> {
        let problems = config.validate();
        if !problems.is_empty() {
            return Err(EngineError::Config(problems));
        }

        let mut scheduler = TickScheduler::new();
        if !config.arrivals.waves.is_empty() {
            scheduler.schedule(config.arrivals.pause_at_start, Job::ArrivalWave(0));
        }

        Ok(Self {
            world: World::new(),
            clock: TickClock::new(&config.clock),
            scheduler,
            housing: HousingRegistry::new(),
            reception: ReceptionCenter::new(&config.reception),
            treasury: Treasury::new(config.income.clone()),
            director: EventDirector::new(config.events.clone()),
            rng: StdRng::seed_from_u64(config.seed),
            events: Vec::new(),
            config,
        })
    }

    /// Advance by `real_seconds` of wall time.
    pub fn update(&mut self, real_seconds: f32) {
        for event in self.clock.pump(real_seconds) {
            match event {
                ClockEvent::Tick { delta } => self.tick(delta),
                ClockEvent::MonthPassed { month } => self.month_passed(month),
            }
        }
    }

    fn tick(&mut self, delta: f32) {
        // T0: timers (construction, arrivals, event effects)
        for job in self.scheduler.advance(delta) {
            self.run_job(job);
        }

        // T1: reception desk
        for refugee in self.reception.advance(delta) {
            if let Ok(residence) = self.housing.admit(&self.world, refugee) {
                debug!("{:?} admitted to {:?}", refugee, residence);
            }
        }

        // T2: vitals and deaths
        let dying = vitals_system(
            &mut self.world,
            self.housing.houses(),
            &self.config.vitals,
            delta,
        );
        for refugee in dying {
            self.reception.withdraw(refugee);
            if bury(&mut self.world, &mut self.housing, refugee) {
                self.events.push(CampEvent::RefugeeDied(refugee));
            }
        }

        // T3: random events
        if let Some(index) = self.director.tick(delta, &mut self.rng) {
            self.event_started(index);
        }
    }

    fn run_job(&mut self, job: Job) {
        match job {
            Job::FinishConstruction(building) => self.finish_construction(building),
            Job::ArrivalWave(i) => {
                let Some(wave) = self.config.arrivals.waves.get(i).copied() else {
                    return;
                };
                info!("arrival wave {} of {} refugees", i + 1, wave.count);
                self.spawn_refugees(wave.count);
                if i + 1 < self.config.arrivals.waves.len() {
                    self.scheduler.schedule(wave.ticks_to_next, Job::ArrivalWave(i + 1));
                }
            }
            Job::ApplyEffect { effect, kind } => {
                self.apply_effect(kind);
                if let Some(index) = self.director.complete_effect(effect) {
                    self.event_ended(index);
                }
            }
        }
    }

    fn month_passed(&mut self, month: u32) {
        let snapshot = CampSnapshot {
            volume: self.population(),
            average_wellbeing: self.average_wellbeing(),
            resettled: 0,
        };
        let income = self.treasury.collect_monthly_income(&snapshot);
        info!(
            "month {}: income {} (success {}, need {}), funds {}",
            month,
            income.total(),
            income.success,
            income.need,
            self.treasury.funds()
        );
        self.events.push(CampEvent::MonthPassed { month, income });
        self.events.push(CampEvent::FundsChanged(self.treasury.funds()));
    }

    // ========================================================================
    // BUILDINGS
    // ========================================================================

    /// Pay for a building and start its construction timer.
    pub fn place_building(&mut self, kind: BuildingKind, site: Site) -> Result<Entity, EngineError> {
        let blueprints = &self.config.blueprints;
        let (price, ticks) = match kind {
            BuildingKind::House => (blueprints.house.price, blueprints.house.construction_ticks),
            BuildingKind::WaterPoint => (blueprints.water.price, blueprints.water.construction_ticks),
            BuildingKind::FoodPoint => (blueprints.food.price, blueprints.food.construction_ticks),
        };
        if !self.treasury.spend(price) {
            return Err(EngineError::InsufficientFunds {
                kind,
                price,
                funds: self.treasury.funds(),
            });
        }

        let building = match kind {
            BuildingKind::House => {
                let bp = &self.config.blueprints.house;
                self.world.spawn((
                    Building::new(kind),
                    site,
                    Durability(Stat::full(bp.shelter_health)),
                    House::new(bp.capacity()),
                ))
            }
            BuildingKind::WaterPoint | BuildingKind::FoodPoint => {
                let bp = if kind == BuildingKind::WaterPoint {
                    &self.config.blueprints.water
                } else {
                    &self.config.blueprints.food
                };
                self.world.spawn((
                    Building::new(kind),
                    site,
                    Durability(Stat::full(bp.health)),
                    ServicePoint { radius: bp.radius },
                ))
            }
        };
        self.scheduler.schedule(ticks, Job::FinishConstruction(building));
        debug!("{:?} {:?} under construction at {:?}", kind, building, site);
        self.events.push(CampEvent::FundsChanged(self.treasury.funds()));
        Ok(building)
    }

    fn finish_construction(&mut self, building: Entity) {
        let kind = match self.world.get::<&mut Building>(building) {
            Ok(mut b) => {
                b.completed = true;
                b.kind
            }
            Err(_) => {
                warn!("construction finished for missing building {:?}", building);
                return;
            }
        };

        match kind {
            BuildingKind::House => {
                let report = match self.housing.on_house_built(&self.world, building) {
                    Ok(report) => report,
                    Err(_) => return,
                };
                self.connect_existing_services(building);
                self.events.push(CampEvent::HousingCapacityAdded(report.capacity_added as i64));
                self.events.push(CampEvent::HouseCompleted {
                    house: building,
                    report,
                });
            }
            BuildingKind::WaterPoint | BuildingKind::FoodPoint => {
                let houses: Vec<Entity> = self.housing.houses().to_vec();
                let houses_served = houses
                    .into_iter()
                    .filter(|&h| self.connect_service(building, h))
                    .count() as u32;
                info!("{:?} {:?} ready, serving {} houses", kind, building, houses_served);
                self.events.push(CampEvent::ServicePointCompleted {
                    building,
                    kind,
                    houses_served,
                });
            }
        }
    }

    /// Attach `service` to `house` if the house lies strictly within its
    /// radius. Returns true if attached.
    fn connect_service(&mut self, service: Entity, house: Entity) -> bool {
        let kind = {
            let (Ok(kind), Ok(point), Ok(from), Ok(to)) = (
                self.world.get::<&Building>(service).map(|b| b.kind),
                self.world.get::<&ServicePoint>(service),
                self.world.get::<&Site>(service),
                self.world.get::<&Site>(house),
            ) else {
                return false;
            };
            if from.distance(&to) >= point.radius {
                return false;
            }
            kind
        };
        let Ok(mut h) = self.world.get::<&mut House>(house) else {
            return false;
        };
        match kind {
            BuildingKind::WaterPoint => h.add_water_source(service),
            BuildingKind::FoodPoint => h.add_food_source(service),
            BuildingKind::House => return false,
        }
        true
    }

    /// Hook a freshly built house up to water and food points already standing.
    fn connect_existing_services(&mut self, house: Entity) {
        let services: Vec<Entity> = self
            .world
            .query::<(&Building, &ServicePoint)>()
            .iter()
            .filter(|(_, (b, _))| b.completed)
            .map(|(e, _)| e)
            .collect();
        for service in services {
            self.connect_service(service, house);
        }
    }

    /// Pay for a larger house: scale its capacity, repair it, bump its level.
    /// Returns the change in max occupancy.
    pub fn upgrade_house(&mut self, house: Entity) -> Result<i64, EngineError> {
        let is_house = self
            .world
            .get::<&Building>(house)
            .map(|b| b.completed && b.kind == BuildingKind::House)
            .unwrap_or(false);
        if !is_house || !self.housing.is_registered(house) {
            return Err(EngineError::UnknownBuilding(house));
        }

        let bp = &self.config.blueprints.house;
        let (price, multiplier) = (bp.upgrade_price, bp.upgrade_multiplier);
        let capacity = self
            .world
            .get::<&House>(house)
            .map(|h| h.capacity().scaled(multiplier))
            .map_err(|_| EngineError::UnknownBuilding(house))?;

        if !self.treasury.spend(price) {
            return Err(EngineError::InsufficientFunds {
                kind: BuildingKind::House,
                price,
                funds: self.treasury.funds(),
            });
        }
        let delta = self.housing.set_capacity(&self.world, house, capacity)?;

        if let Ok(mut d) = self.world.get::<&mut Durability>(house) {
            d.0.restore();
        }
        if let Ok(mut b) = self.world.get::<&mut Building>(house) {
            b.level += 1;
        }
        info!("house {:?} upgraded to {:?}", house, capacity);
        self.events.push(CampEvent::FundsChanged(self.treasury.funds()));
        self.events.push(CampEvent::HousingCapacityAdded(delta));
        Ok(delta)
    }

    // ========================================================================
    // REFUGEES & EVENTS
    // ========================================================================

    /// Spawn `count` refugees in transit and queue them at reception.
    pub fn spawn_refugees(&mut self, count: u32) -> Vec<Entity> {
        let max = self.config.vitals.stat_max;
        let spawned: Vec<Entity> = (0..count)
            .map(|_| self.world.spawn((Refugee::new(), Vitals::new(max))))
            .collect();
        for &refugee in &spawned {
            self.reception.enqueue(refugee);
        }
        if count > 0 {
            self.events.push(CampEvent::RefugeesArrived(count));
        }
        spawned
    }

    /// Apply one random event effect immediately.
    pub fn apply_effect(&mut self, kind: EffectKind) {
        match kind {
            EffectKind::AddFunds { amount } => {
                self.treasury.deposit(amount);
                self.events.push(CampEvent::FundsChanged(self.treasury.funds()));
            }
            EffectKind::RefugeeArrival { count } => {
                self.spawn_refugees(count);
            }
            EffectKind::ShelterDamage { amount } => {
                for &house in self.housing.houses() {
                    if let Ok(mut d) = self.world.get::<&mut Durability>(house) {
                        d.0.subtract(amount);
                    }
                }
            }
        }
    }

    fn event_started(&mut self, index: usize) {
        let Some(spec) = self.director.spec(index) else {
            return;
        };
        self.events.push(CampEvent::RandomEventStarted(spec.name.clone()));
        let effects: Vec<(usize, f32, EffectKind)> = spec
            .effects
            .iter()
            .enumerate()
            .map(|(i, e)| (i, e.delay_ticks, e.kind))
            .collect();
        for (effect, delay, kind) in effects {
            self.scheduler.schedule(delay, Job::ApplyEffect { effect, kind });
        }
        if let Some(ended) = self.director.finish_if_done() {
            self.event_ended(ended);
        }
    }

    fn event_ended(&mut self, index: usize) {
        if let Some(spec) = self.director.spec(index) {
            self.events.push(CampEvent::RandomEventEnded(spec.name.clone()));
        }
    }

    // ========================================================================
    // TIME
    // ========================================================================

    pub fn set_time_passing(&mut self, passing: bool) -> bool {
        self.clock.set_time_passing(passing)
    }

    pub fn set_time_multiplier(&mut self, multiplier: f32) -> bool {
        self.clock.set_time_multiplier(multiplier)
    }

    pub fn clock(&self) -> &TickClock {
        &self.clock
    }

    pub fn current_month(&self) -> u32 {
        self.clock.current_month()
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// Take every notification raised since the last call.
    pub fn drain_events(&mut self) -> Vec<CampEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn config(&self) -> &CampConfig {
        &self.config
    }

    pub fn housing(&self) -> &HousingRegistry {
        &self.housing
    }

    pub fn reception(&self) -> &ReceptionCenter {
        &self.reception
    }

    pub fn director(&self) -> &EventDirector {
        &self.director
    }

    pub fn funds(&self) -> i64 {
        self.treasury.funds()
    }

    /// Living refugees.
    pub fn population(&self) -> u32 {
        self.world
            .query::<&Refugee>()
            .iter()
            .filter(|(_, r)| r.is_alive())
            .count() as u32
    }

    pub fn homeless_count(&self) -> usize {
        self.housing.homeless_count()
    }

    /// Max occupancy summed over completed houses.
    pub fn housing_capacity(&self) -> u32 {
        self.housing.total_capacity(&self.world)
    }

    pub fn occupancy_of(&self, house: Entity) -> Option<Occupancy> {
        if !self.housing.is_registered(house) {
            return None;
        }
        self.world.get::<&House>(house).ok().map(|h| h.occupancy())
    }

    /// Mean wellbeing of living refugees; 0 for an empty camp.
    pub fn average_wellbeing(&self) -> f64 {
        let mut query = self.world.query::<(&Refugee, &Vitals)>();
        let (sum, count) = query
            .iter()
            .filter(|(_, (r, _))| r.is_alive())
            .fold((0i64, 0u32), |(sum, n), (_, (_, v))| {
                (sum + v.wellbeing.current() as i64, n + 1)
            });
        if count == 0 {
            0.0
        } else {
            sum as f64 / count as f64
        }
    }

    pub fn wellbeing_report(&self) -> WellbeingReport {
        let (good, bad) = (self.config.vitals.good_threshold, self.config.vitals.bad_threshold);
        let mut report = WellbeingReport::default();
        for (_, (refugee, vitals)) in self.world.query::<(&Refugee, &Vitals)>().iter() {
            if !refugee.is_alive() {
                continue;
            }
            match vitals.wellbeing.band(good, bad) {
                StatBand::Good => report.good += 1,
                StatBand::Okay => report.okay += 1,
                StatBand::Bad => report.bad += 1,
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resilience_logic::config::{ArrivalWave, EffectSpec, RandomEventSpec};

    fn quiet_config() -> CampConfig {
        let mut config = CampConfig::default();
        config.events.max_chance = 0;
        config.arrivals.waves.clear();
        config
    }

    fn run(engine: &mut CampEngine, ticks: u32) {
        for _ in 0..ticks {
            engine.update(1.0);
        }
    }

    #[test]
    fn test_engine_creation() {
        let engine = CampEngine::new(quiet_config()).unwrap();
        assert_eq!(engine.population(), 0);
        assert_eq!(engine.current_month(), 1);
        assert_eq!(engine.funds(), 100);
        assert_eq!(engine.average_wellbeing(), 0.0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = quiet_config();
        config.events.min_chance = 50;
        config.events.max_chance = 10;
        assert!(matches!(CampEngine::new(config), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_house_completes_after_construction() {
        let mut engine = CampEngine::new(quiet_config()).unwrap();
        let house = engine.place_building(BuildingKind::House, Site::new(0.0, 0.0)).unwrap();
        assert_eq!(engine.funds(), 80);
        assert_eq!(engine.occupancy_of(house), None);

        run(&mut engine, 5);
        assert_eq!(engine.occupancy_of(house), Some(Occupancy::BelowPreferred));
        assert_eq!(engine.housing_capacity(), 8);
        let events = engine.drain_events();
        assert!(events.contains(&CampEvent::HousingCapacityAdded(8)));
        assert!(engine.drain_events().is_empty());
    }

    #[test]
    fn test_cannot_build_without_funds() {
        let mut config = quiet_config();
        config.income.starting_funds = 10;
        let mut engine = CampEngine::new(config).unwrap();
        let err = engine.place_building(BuildingKind::House, Site::default());
        assert!(matches!(err, Err(EngineError::InsufficientFunds { price: 20, funds: 10, .. })));
        assert_eq!(engine.funds(), 10);
        assert_eq!(engine.world.len(), 0);
    }

    #[test]
    fn test_arrival_waves_reach_reception() {
        let mut config = quiet_config();
        config.arrivals.pause_at_start = 1.0;
        config.arrivals.waves = vec![
            ArrivalWave { count: 2, ticks_to_next: 3.0 },
            ArrivalWave { count: 1, ticks_to_next: 0.0 },
        ];
        let mut engine = CampEngine::new(config).unwrap();
        run(&mut engine, 1);
        assert_eq!(engine.population(), 2);
        run(&mut engine, 3);
        assert_eq!(engine.population(), 3);
    }

    #[test]
    fn test_processed_refugees_become_homeless_without_houses() {
        let mut engine = CampEngine::new(quiet_config()).unwrap();
        engine.spawn_refugees(2);
        run(&mut engine, 4);
        assert_eq!(engine.homeless_count(), 2);
        assert!(engine.reception().is_idle());
    }

    #[test]
    fn test_month_pays_income() {
        let mut config = quiet_config();
        config.clock.seconds_per_month = 3.0;
        let mut engine = CampEngine::new(config).unwrap();
        run(&mut engine, 3);
        assert_eq!(engine.current_month(), 2);
        assert_eq!(engine.funds(), 150);
    }

    #[test]
    fn test_upgrade_scales_capacity() {
        let mut engine = CampEngine::new(quiet_config()).unwrap();
        let house = engine.place_building(BuildingKind::House, Site::default()).unwrap();
        run(&mut engine, 5);

        assert_eq!(engine.upgrade_house(house).unwrap(), 4);
        assert_eq!(engine.housing_capacity(), 12);
        assert_eq!(engine.funds(), 50);
        assert_eq!(engine.world.get::<&Building>(house).unwrap().level, 1);
    }

    #[test]
    fn test_upgrade_rejects_unfinished_house() {
        let mut engine = CampEngine::new(quiet_config()).unwrap();
        let house = engine.place_building(BuildingKind::House, Site::default()).unwrap();
        assert_eq!(engine.upgrade_house(house), Err(EngineError::UnknownBuilding(house)));
        assert_eq!(engine.funds(), 80);
    }

    #[test]
    fn test_effect_scheduled_event_runs_to_end() {
        let mut config = quiet_config();
        config.events.min_chance = 100;
        config.events.max_chance = 100;
        config.events.events = vec![RandomEventSpec {
            name: "donation".to_string(),
            weight: 1,
            effects: vec![EffectSpec {
                delay_ticks: 2.0,
                kind: EffectKind::AddFunds { amount: 25 },
            }],
        }];
        let mut engine = CampEngine::new(config).unwrap();

        run(&mut engine, 1);
        assert!(engine.director().active().is_some());
        run(&mut engine, 2);
        assert_eq!(engine.funds(), 125);

        let events = engine.drain_events();
        assert!(events.contains(&CampEvent::RandomEventStarted("donation".to_string())));
        assert!(events.contains(&CampEvent::RandomEventEnded("donation".to_string())));
    }
}
