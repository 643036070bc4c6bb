//! Housing registry and occupancy allocator.
//!
//! The registry owns the list of completed houses, the homeless queue, and a
//! cached crowding index (`below_preferred` / `below_max`). The index is never
//! edited ad hoc: after every occupancy change the house is re-classified with
//! [`Occupancy::classify`] and its bucket membership rebuilt from that.
//!
//! All refugee back-pointers ([`Residence`]) are written here and nowhere else.
//! Rejected operations log an error, return it, and leave state untouched.

use std::collections::{BTreeMap, HashMap, VecDeque};

use hecs::{Entity, World};
use log::{debug, error, info};
use resilience_logic::occupancy::{Capacity, Occupancy};

use crate::components::{House, Refugee, Residence};
use crate::error::HousingError;

/// Outcome of [`HousingRegistry::on_house_built`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocationReport {
    /// Max occupancy the new house adds to the camp.
    pub capacity_added: u32,
    /// Refugees moved out of the homeless queue.
    pub housed_from_homeless: u32,
    /// Refugees moved out of overcrowded houses.
    pub rebalanced: u32,
}

/// Completed houses, the homeless queue, and the crowding index over them.
#[derive(Debug, Default)]
pub struct HousingRegistry {
    /// Completed houses in registration order.
    houses: Vec<Entity>,
    /// Registration slot of each house; bucket keys use it for a stable pick order.
    slots: HashMap<Entity, usize>,
    below_preferred: BTreeMap<usize, Entity>,
    below_max: BTreeMap<usize, Entity>,
    /// Registered homeless, oldest first.
    homeless: VecDeque<Entity>,
}

fn logged<T>(result: Result<T, HousingError>) -> Result<T, HousingError> {
    if let Err(e) = &result {
        error!("{}", e);
    }
    result
}

impl HousingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn houses(&self) -> &[Entity] {
        &self.houses
    }

    pub fn house_count(&self) -> usize {
        self.houses.len()
    }

    pub fn is_registered(&self, house: Entity) -> bool {
        self.slots.contains_key(&house)
    }

    pub fn homeless(&self) -> impl Iterator<Item = Entity> + '_ {
        self.homeless.iter().copied()
    }

    pub fn homeless_count(&self) -> usize {
        self.homeless.len()
    }

    pub fn is_below_preferred(&self, house: Entity) -> bool {
        self.slots
            .get(&house)
            .is_some_and(|s| self.below_preferred.contains_key(s))
    }

    pub fn is_below_max(&self, house: Entity) -> bool {
        self.slots
            .get(&house)
            .is_some_and(|s| self.below_max.contains_key(s))
    }

    /// Crowding state according to the cached index, `None` if unregistered.
    pub fn indexed_occupancy(&self, house: Entity) -> Option<Occupancy> {
        if !self.is_registered(house) {
            None
        } else if self.is_below_preferred(house) {
            Some(Occupancy::BelowPreferred)
        } else if self.is_below_max(house) {
            Some(Occupancy::BelowMax)
        } else {
            Some(Occupancy::Full)
        }
    }

    /// Best place for a new arrival: the earliest-registered house below its
    /// preferred level, else the earliest below max, else homeless.
    pub fn best_available_house(&self) -> Residence {
        self.below_preferred
            .values()
            .next()
            .or_else(|| self.below_max.values().next())
            .map(|&h| Residence::House(h))
            .unwrap_or(Residence::Homeless)
    }

    /// Sum of max occupancy over every registered house.
    pub fn total_capacity(&self, world: &World) -> u32 {
        self.houses
            .iter()
            .filter_map(|&h| world.get::<&House>(h).ok().map(|h| h.max()))
            .sum()
    }

    // ── Bucket index ────────────────────────────────────────────────────

    pub fn mark_below_preferred(&mut self, house: Entity) {
        if let Some(&slot) = self.slots.get(&house) {
            self.below_preferred.insert(slot, house);
        }
    }

    pub fn unmark_below_preferred(&mut self, house: Entity) {
        if let Some(slot) = self.slots.get(&house) {
            self.below_preferred.remove(slot);
        }
    }

    pub fn mark_below_max(&mut self, house: Entity) {
        if let Some(&slot) = self.slots.get(&house) {
            self.below_max.insert(slot, house);
        }
    }

    pub fn unmark_below_max(&mut self, house: Entity) {
        if let Some(slot) = self.slots.get(&house) {
            self.below_max.remove(slot);
        }
    }

    /// Rebuild one house's bucket membership from its crowding state.
    pub fn reindex(&mut self, house: Entity, occupancy: Occupancy) {
        match occupancy {
            Occupancy::BelowPreferred => {
                self.mark_below_preferred(house);
                self.unmark_below_max(house);
            }
            Occupancy::BelowMax => {
                self.unmark_below_preferred(house);
                self.mark_below_max(house);
            }
            Occupancy::Full => {
                self.unmark_below_preferred(house);
                self.unmark_below_max(house);
            }
        }
    }

    fn reindex_from_world(&mut self, world: &World, house: Entity) {
        if let Ok(h) = world.get::<&House>(house) {
            let occupancy = h.occupancy();
            drop(h);
            self.reindex(house, occupancy);
        }
    }

    // ── Registration ────────────────────────────────────────────────────

    /// Register a completed house and index it. Returns the capacity it adds;
    /// registering the same house twice adds nothing.
    pub fn register_house(&mut self, world: &World, house: Entity) -> Result<u32, HousingError> {
        logged(self.try_register(world, house))
    }

    fn try_register(&mut self, world: &World, house: Entity) -> Result<u32, HousingError> {
        let (max, occupancy) = {
            let h = world
                .get::<&House>(house)
                .map_err(|_| HousingError::UnknownHouse(house))?;
            (h.max(), h.occupancy())
        };
        if self.is_registered(house) {
            debug!("house {:?} already registered", house);
            return Ok(0);
        }
        self.slots.insert(house, self.houses.len());
        self.houses.push(house);
        self.reindex(house, occupancy);
        Ok(max)
    }

    /// Change a house's thresholds (upgrades) and re-classify it.
    /// Returns the change in max occupancy.
    pub fn set_capacity(
        &mut self,
        world: &World,
        house: Entity,
        capacity: Capacity,
    ) -> Result<i64, HousingError> {
        let delta = {
            let mut h = logged(
                world
                    .get::<&mut House>(house)
                    .map_err(|_| HousingError::UnknownHouse(house)),
            )?;
            let delta = capacity.max as i64 - h.max() as i64;
            h.set_capacity(capacity);
            delta
        };
        self.reindex_from_world(world, house);
        Ok(delta)
    }

    // ── Occupants ───────────────────────────────────────────────────────

    fn residence_of(world: &World, refugee: Entity) -> Result<Option<Residence>, HousingError> {
        let r = world
            .get::<&Refugee>(refugee)
            .map_err(|_| HousingError::UnknownRefugee(refugee))?;
        if !r.is_alive() {
            return Err(HousingError::UnknownRefugee(refugee));
        }
        Ok(r.residence())
    }

    fn set_residence(world: &World, refugee: Entity, residence: Option<Residence>) {
        if let Ok(mut r) = world.get::<&mut Refugee>(refugee) {
            r.set_residence(residence);
        }
    }

    fn occupant_count(world: &World, house: Entity) -> Result<u32, HousingError> {
        world
            .get::<&House>(house)
            .map(|h| h.occupant_count())
            .map_err(|_| HousingError::UnknownHouse(house))
    }

    /// Move `refugee` into `house`. A registered-homeless refugee leaves the
    /// homeless queue. Fails on a full house or a refugee living elsewhere.
    pub fn add_occupant(
        &mut self,
        world: &World,
        house: Entity,
        refugee: Entity,
    ) -> Result<Occupancy, HousingError> {
        logged(self.try_add(world, house, refugee))
    }

    fn try_add(
        &mut self,
        world: &World,
        house: Entity,
        refugee: Entity,
    ) -> Result<Occupancy, HousingError> {
        let residence = Self::residence_of(world, refugee)?;
        if let Some(Residence::House(_)) = residence {
            return Err(HousingError::AlreadyHoused(refugee));
        }
        let occupancy = {
            let mut h = world
                .get::<&mut House>(house)
                .map_err(|_| HousingError::UnknownHouse(house))?;
            if h.is_full() {
                return Err(HousingError::FullHouse {
                    house,
                    max: h.max(),
                });
            }
            h.push_occupant(refugee);
            h.occupancy()
        };
        if residence == Some(Residence::Homeless) {
            self.homeless.retain(|&r| r != refugee);
        }
        Self::set_residence(world, refugee, Some(Residence::House(house)));
        self.reindex(house, occupancy);
        Ok(occupancy)
    }

    /// Remove the earliest-arrived occupant. The refugee is left in transit.
    pub fn remove_occupant(&mut self, world: &World, house: Entity) -> Result<Entity, HousingError> {
        logged(self.try_remove_earliest(world, house))
    }

    fn try_remove_earliest(&mut self, world: &World, house: Entity) -> Result<Entity, HousingError> {
        let refugee = {
            let mut h = world
                .get::<&mut House>(house)
                .map_err(|_| HousingError::UnknownHouse(house))?;
            h.pop_earliest()
                .ok_or(HousingError::EmptyHouse { house })?
        };
        Self::set_residence(world, refugee, None);
        self.reindex_from_world(world, house);
        Ok(refugee)
    }

    /// Remove a specific occupant. The refugee is left in transit.
    pub fn remove_specific_occupant(
        &mut self,
        world: &World,
        house: Entity,
        refugee: Entity,
    ) -> Result<(), HousingError> {
        logged(self.try_remove_specific(world, house, refugee))
    }

    fn try_remove_specific(
        &mut self,
        world: &World,
        house: Entity,
        refugee: Entity,
    ) -> Result<(), HousingError> {
        {
            let mut h = world
                .get::<&mut House>(house)
                .map_err(|_| HousingError::UnknownHouse(house))?;
            if !h.take_occupant(refugee) {
                return Err(HousingError::NotResident { refugee, house });
            }
        }
        Self::set_residence(world, refugee, None);
        self.reindex_from_world(world, house);
        Ok(())
    }

    // ── Homeless queue ──────────────────────────────────────────────────

    /// Register a refugee as homeless. Already-homeless refugees keep their place.
    pub fn enqueue_homeless(&mut self, world: &World, refugee: Entity) -> Result<(), HousingError> {
        logged(self.try_enqueue_homeless(world, refugee))
    }

    fn try_enqueue_homeless(&mut self, world: &World, refugee: Entity) -> Result<(), HousingError> {
        match Self::residence_of(world, refugee)? {
            Some(Residence::House(_)) => Err(HousingError::AlreadyHoused(refugee)),
            Some(Residence::Homeless) => Ok(()),
            None => {
                self.homeless.push_back(refugee);
                Self::set_residence(world, refugee, Some(Residence::Homeless));
                Ok(())
            }
        }
    }

    /// Take the longest-waiting homeless refugee out of the queue, in transit.
    pub fn dequeue_homeless(&mut self, world: &World) -> Option<Entity> {
        let refugee = self.homeless.pop_front()?;
        Self::set_residence(world, refugee, None);
        Some(refugee)
    }

    /// Give a newly processed refugee the best available place.
    pub fn admit(&mut self, world: &World, refugee: Entity) -> Result<Residence, HousingError> {
        match self.best_available_house() {
            Residence::House(house) => {
                self.add_occupant(world, house, refugee)?;
                Ok(Residence::House(house))
            }
            Residence::Homeless => {
                self.enqueue_homeless(world, refugee)?;
                Ok(Residence::Homeless)
            }
        }
    }

    /// Take a refugee out of wherever it lives. Returns the previous residence.
    pub fn evict(&mut self, world: &World, refugee: Entity) -> Option<Residence> {
        let residence = world.get::<&Refugee>(refugee).ok()?.residence()?;
        match residence {
            Residence::House(house) => {
                self.remove_specific_occupant(world, house, refugee).ok()?;
            }
            Residence::Homeless => {
                self.homeless.retain(|&r| r != refugee);
                Self::set_residence(world, refugee, None);
            }
        }
        Some(residence)
    }

    // ── New house allocation ────────────────────────────────────────────

    /// Register a freshly completed house and fill it.
    ///
    /// 1. Drain the homeless queue into it up to its max occupancy; crowded
    ///    housing beats none.
    /// 2. While it is below its preferred level, run a pass over every
    ///    registered house: each one above its own preferred level gives one
    ///    occupant. The preferred check is only made between passes, so a
    ///    pass may carry the new house past preferred; it never goes past
    ///    max. Stops when a pass finds no donor.
    pub fn on_house_built(
        &mut self,
        world: &World,
        house: Entity,
    ) -> Result<AllocationReport, HousingError> {
        let mut report = AllocationReport {
            capacity_added: self.register_house(world, house)?,
            ..Default::default()
        };
        let capacity = world
            .get::<&House>(house)
            .map(|h| h.capacity())
            .map_err(|_| HousingError::UnknownHouse(house))?;

        while !self.homeless.is_empty() && Self::occupant_count(world, house)? < capacity.max {
            let Some(refugee) = self.dequeue_homeless(world) else {
                break;
            };
            self.add_occupant(world, house, refugee)?;
            report.housed_from_homeless += 1;
        }

        while Self::occupant_count(world, house)? < capacity.preferred {
            let mut moved = 0;
            let donors: Vec<Entity> = self.houses.clone();
            for donor in donors {
                if donor == house {
                    continue;
                }
                if Self::occupant_count(world, house)? >= capacity.max {
                    break;
                }
                let over = world
                    .get::<&House>(donor)
                    .map(|h| h.is_over_preferred())
                    .unwrap_or(false);
                if !over {
                    continue;
                }
                let refugee = self.remove_occupant(world, donor)?;
                self.add_occupant(world, house, refugee)?;
                debug!("moved {:?} from {:?} to {:?}", refugee, donor, house);
                moved += 1;
            }
            if moved == 0 {
                break;
            }
            report.rebalanced += moved;
        }

        info!(
            "house {:?} ready: +{} capacity, {} from homeless, {} rebalanced",
            house, report.capacity_added, report.housed_from_homeless, report.rebalanced
        );
        Ok(report)
    }

    // ── Diagnostics ─────────────────────────────────────────────────────

    /// Every disagreement between the cached index, the occupant lists, and
    /// the refugee back-pointers. Empty when consistent.
    pub fn consistency_problems(&self, world: &World) -> Vec<String> {
        let mut problems = Vec::new();
        for &house in &self.houses {
            let Ok(h) = world.get::<&House>(house) else {
                problems.push(format!("registered house {:?} has no House component", house));
                continue;
            };
            if h.occupant_count() > h.max() {
                problems.push(format!("house {:?} exceeds max occupancy", house));
            }
            if self.indexed_occupancy(house) != Some(h.occupancy()) {
                problems.push(format!(
                    "house {:?} indexed as {:?} but holds {} ({:?})",
                    house,
                    self.indexed_occupancy(house),
                    h.occupant_count(),
                    h.occupancy()
                ));
            }
            for &r in h.occupants() {
                let back = world.get::<&Refugee>(r).ok().and_then(|r| r.residence());
                if back != Some(Residence::House(house)) {
                    problems.push(format!("occupant {:?} of {:?} points to {:?}", r, house, back));
                }
            }
        }
        for &r in &self.homeless {
            let back = world.get::<&Refugee>(r).ok().and_then(|r| r.residence());
            if back != Some(Residence::Homeless) {
                problems.push(format!("homeless {:?} points to {:?}", r, back));
            }
        }
        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_house(world: &mut World, preferred: u32, max: u32) -> Entity {
        world.spawn((House::new(Capacity::new(preferred, max)),))
    }

    fn spawn_refugees(world: &mut World, n: usize) -> Vec<Entity> {
        (0..n).map(|_| world.spawn((Refugee::new(),))).collect()
    }

    fn count(world: &World, house: Entity) -> u32 {
        world.get::<&House>(house).unwrap().occupant_count()
    }

    #[test]
    fn test_register_classifies_empty_house_below_preferred() {
        let mut world = World::new();
        let mut reg = HousingRegistry::new();
        let h = spawn_house(&mut world, 2, 4);
        assert_eq!(reg.register_house(&world, h).unwrap(), 4);
        assert!(reg.is_below_preferred(h));
        assert!(!reg.is_below_max(h));
        assert_eq!(reg.register_house(&world, h).unwrap(), 0);
        assert_eq!(reg.house_count(), 1);
    }

    #[test]
    fn test_best_available_house_priority() {
        let mut world = World::new();
        let mut reg = HousingRegistry::new();
        assert_eq!(reg.best_available_house(), Residence::Homeless);

        let a = spawn_house(&mut world, 1, 2);
        let b = spawn_house(&mut world, 1, 2);
        reg.register_house(&world, a).unwrap();
        reg.register_house(&world, b).unwrap();
        assert_eq!(reg.best_available_house(), Residence::House(a));

        let rs = spawn_refugees(&mut world, 4);
        reg.add_occupant(&world, a, rs[0]).unwrap();
        assert_eq!(reg.best_available_house(), Residence::House(b));
        reg.add_occupant(&world, b, rs[1]).unwrap();
        // Both at preferred: fall back to below-max, earliest first.
        assert_eq!(reg.best_available_house(), Residence::House(a));
        reg.add_occupant(&world, a, rs[2]).unwrap();
        reg.add_occupant(&world, b, rs[3]).unwrap();
        assert_eq!(reg.best_available_house(), Residence::Homeless);
    }

    #[test]
    fn test_add_to_full_house_is_rejected_without_change() {
        let mut world = World::new();
        let mut reg = HousingRegistry::new();
        let h = spawn_house(&mut world, 1, 1);
        reg.register_house(&world, h).unwrap();
        let rs = spawn_refugees(&mut world, 2);
        assert_eq!(reg.add_occupant(&world, h, rs[0]).unwrap(), Occupancy::Full);

        let err = reg.add_occupant(&world, h, rs[1]).unwrap_err();
        assert_eq!(err, HousingError::FullHouse { house: h, max: 1 });
        assert_eq!(count(&world, h), 1);
        assert_eq!(world.get::<&Refugee>(rs[1]).unwrap().residence(), None);
    }

    #[test]
    fn test_remove_from_empty_house_is_rejected() {
        let mut world = World::new();
        let mut reg = HousingRegistry::new();
        let h = spawn_house(&mut world, 1, 2);
        reg.register_house(&world, h).unwrap();
        assert_eq!(
            reg.remove_occupant(&world, h),
            Err(HousingError::EmptyHouse { house: h })
        );
        assert!(reg.is_below_preferred(h));
    }

    #[test]
    fn test_remove_is_fifo_and_reclassifies() {
        let mut world = World::new();
        let mut reg = HousingRegistry::new();
        let h = spawn_house(&mut world, 1, 2);
        reg.register_house(&world, h).unwrap();
        let rs = spawn_refugees(&mut world, 2);
        reg.add_occupant(&world, h, rs[0]).unwrap();
        reg.add_occupant(&world, h, rs[1]).unwrap();
        assert_eq!(reg.indexed_occupancy(h), Some(Occupancy::Full));

        assert_eq!(reg.remove_occupant(&world, h).unwrap(), rs[0]);
        assert_eq!(reg.indexed_occupancy(h), Some(Occupancy::BelowMax));
        assert_eq!(world.get::<&Refugee>(rs[0]).unwrap().residence(), None);

        reg.remove_specific_occupant(&world, h, rs[1]).unwrap();
        assert_eq!(reg.indexed_occupancy(h), Some(Occupancy::BelowPreferred));
        assert!(reg.consistency_problems(&world).is_empty());
    }

    #[test]
    fn test_refugee_cannot_live_in_two_houses() {
        let mut world = World::new();
        let mut reg = HousingRegistry::new();
        let a = spawn_house(&mut world, 2, 2);
        let b = spawn_house(&mut world, 2, 2);
        reg.register_house(&world, a).unwrap();
        reg.register_house(&world, b).unwrap();
        let r = spawn_refugees(&mut world, 1)[0];
        reg.add_occupant(&world, a, r).unwrap();
        assert_eq!(
            reg.add_occupant(&world, b, r),
            Err(HousingError::AlreadyHoused(r))
        );
        assert_eq!(count(&world, b), 0);
    }

    #[test]
    fn test_admit_falls_back_to_homeless() {
        let mut world = World::new();
        let mut reg = HousingRegistry::new();
        let rs = spawn_refugees(&mut world, 2);
        assert_eq!(reg.admit(&world, rs[0]).unwrap(), Residence::Homeless);
        assert_eq!(reg.admit(&world, rs[1]).unwrap(), Residence::Homeless);
        assert_eq!(reg.homeless().collect::<Vec<_>>(), rs);
        // Enqueuing twice keeps a single entry.
        reg.enqueue_homeless(&world, rs[0]).unwrap();
        assert_eq!(reg.homeless_count(), 2);
    }

    #[test]
    fn test_drain_homeless_stops_when_queue_empties() {
        let mut world = World::new();
        let mut reg = HousingRegistry::new();
        let rs = spawn_refugees(&mut world, 3);
        for &r in &rs {
            reg.enqueue_homeless(&world, r).unwrap();
        }
        let h = spawn_house(&mut world, 2, 4);
        let report = reg.on_house_built(&world, h).unwrap();

        assert_eq!(report.housed_from_homeless, 3);
        assert_eq!(report.capacity_added, 4);
        assert_eq!(reg.homeless_count(), 0);
        assert_eq!(world.get::<&House>(h).unwrap().occupants(), rs.as_slice());
        assert_eq!(reg.indexed_occupancy(h), Some(Occupancy::BelowMax));
    }

    #[test]
    fn test_drain_homeless_stops_at_max_preserving_order() {
        let mut world = World::new();
        let mut reg = HousingRegistry::new();
        let rs = spawn_refugees(&mut world, 5);
        for &r in &rs {
            reg.enqueue_homeless(&world, r).unwrap();
        }
        let h = spawn_house(&mut world, 1, 3);
        reg.on_house_built(&world, h).unwrap();

        assert_eq!(world.get::<&House>(h).unwrap().occupants(), &rs[..3]);
        assert_eq!(reg.homeless().collect::<Vec<_>>(), &rs[3..]);
        assert_eq!(reg.indexed_occupancy(h), Some(Occupancy::Full));
    }

    #[test]
    fn test_rebalance_takes_one_per_donor_per_pass() {
        let mut world = World::new();
        let mut reg = HousingRegistry::new();
        let a = spawn_house(&mut world, 2, 4);
        let b = spawn_house(&mut world, 2, 4);
        reg.on_house_built(&world, a).unwrap();
        reg.on_house_built(&world, b).unwrap();
        let rs = spawn_refugees(&mut world, 8);
        for (i, &r) in rs.iter().enumerate() {
            let house = if i < 4 { a } else { b };
            reg.add_occupant(&world, house, r).unwrap();
        }

        let n = spawn_house(&mut world, 2, 4);
        let report = reg.on_house_built(&world, n).unwrap();

        assert_eq!(report.rebalanced, 2);
        assert_eq!(count(&world, n), 2);
        assert_eq!(count(&world, a), 3);
        assert_eq!(count(&world, b), 3);
        // Earliest arrivals are the ones moved.
        assert_eq!(world.get::<&House>(n).unwrap().occupants(), &[rs[0], rs[4]]);
        assert!(reg.consistency_problems(&world).is_empty());
    }

    fn full_donors(
        world: &mut World,
        reg: &mut HousingRegistry,
        n: usize,
    ) -> Vec<(Entity, Vec<Entity>)> {
        (0..n)
            .map(|_| {
                let donor = spawn_house(world, 2, 4);
                reg.register_house(world, donor).unwrap();
                let rs = spawn_refugees(world, 4);
                for &r in &rs {
                    reg.add_occupant(world, donor, r).unwrap();
                }
                (donor, rs)
            })
            .collect()
    }

    #[test]
    fn test_rebalance_pass_visits_every_donor() {
        let mut world = World::new();
        let mut reg = HousingRegistry::new();
        let donors = full_donors(&mut world, &mut reg, 3);

        let n = spawn_house(&mut world, 2, 4);
        let report = reg.on_house_built(&world, n).unwrap();

        assert_eq!(report.rebalanced, 3);
        let counts: Vec<u32> = donors.iter().map(|(d, _)| count(&world, *d)).collect();
        assert_eq!(counts, vec![3, 3, 3]);
        assert_eq!(count(&world, n), 3);
        let earliest: Vec<Entity> = donors.iter().map(|(_, rs)| rs[0]).collect();
        assert_eq!(world.get::<&House>(n).unwrap().occupants(), earliest.as_slice());
        assert_eq!(reg.indexed_occupancy(n), Some(Occupancy::BelowMax));
        assert!(reg.consistency_problems(&world).is_empty());
    }

    #[test]
    fn test_rebalance_pass_stops_when_new_house_fills() {
        let mut world = World::new();
        let mut reg = HousingRegistry::new();
        let donors = full_donors(&mut world, &mut reg, 4);

        let n = spawn_house(&mut world, 2, 3);
        let report = reg.on_house_built(&world, n).unwrap();

        assert_eq!(report.rebalanced, 3);
        let counts: Vec<u32> = donors.iter().map(|(d, _)| count(&world, *d)).collect();
        assert_eq!(counts, vec![3, 3, 3, 4]);
        assert_eq!(count(&world, n), 3);
        assert_eq!(reg.indexed_occupancy(n), Some(Occupancy::Full));
        // Nobody was left in transit.
        for (_, rs) in &donors {
            for &r in rs {
                assert!(world.get::<&Refugee>(r).unwrap().house().is_some());
            }
        }
        assert!(reg.consistency_problems(&world).is_empty());
    }

    #[test]
    fn test_rebalance_never_pushes_donor_below_preferred() {
        let mut world = World::new();
        let mut reg = HousingRegistry::new();
        let a = spawn_house(&mut world, 2, 6);
        reg.on_house_built(&world, a).unwrap();
        for r in spawn_refugees(&mut world, 3) {
            reg.add_occupant(&world, a, r).unwrap();
        }

        let n = spawn_house(&mut world, 5, 6);
        let report = reg.on_house_built(&world, n).unwrap();

        assert_eq!(report.rebalanced, 1);
        assert_eq!(count(&world, a), 2);
        assert_eq!(count(&world, n), 1);
    }

    #[test]
    fn test_rebalance_drains_over_several_passes() {
        let mut world = World::new();
        let mut reg = HousingRegistry::new();
        let a = spawn_house(&mut world, 1, 6);
        reg.on_house_built(&world, a).unwrap();
        for r in spawn_refugees(&mut world, 6) {
            reg.add_occupant(&world, a, r).unwrap();
        }

        let n = spawn_house(&mut world, 3, 4);
        let report = reg.on_house_built(&world, n).unwrap();

        assert_eq!(report.rebalanced, 3);
        assert_eq!(count(&world, a), 3);
        assert_eq!(count(&world, n), 3);
        assert_eq!(reg.indexed_occupancy(a), Some(Occupancy::BelowMax));
        assert_eq!(reg.indexed_occupancy(n), Some(Occupancy::BelowMax));
    }

    #[test]
    fn test_capacity_change_reclassifies() {
        let mut world = World::new();
        let mut reg = HousingRegistry::new();
        let h = spawn_house(&mut world, 1, 1);
        reg.register_house(&world, h).unwrap();
        let r = spawn_refugees(&mut world, 1)[0];
        reg.add_occupant(&world, h, r).unwrap();
        assert_eq!(reg.indexed_occupancy(h), Some(Occupancy::Full));

        let delta = reg.set_capacity(&world, h, Capacity::new(2, 3)).unwrap();
        assert_eq!(delta, 2);
        assert_eq!(reg.indexed_occupancy(h), Some(Occupancy::BelowPreferred));
        assert_eq!(reg.total_capacity(&world), 3);
    }

    #[test]
    fn test_evict_is_idempotent() {
        let mut world = World::new();
        let mut reg = HousingRegistry::new();
        let h = spawn_house(&mut world, 2, 2);
        reg.register_house(&world, h).unwrap();
        let rs = spawn_refugees(&mut world, 2);
        reg.add_occupant(&world, h, rs[0]).unwrap();
        reg.enqueue_homeless(&world, rs[1]).unwrap();

        assert_eq!(reg.evict(&world, rs[0]), Some(Residence::House(h)));
        assert_eq!(reg.evict(&world, rs[0]), None);
        assert_eq!(reg.evict(&world, rs[1]), Some(Residence::Homeless));
        assert_eq!(reg.homeless_count(), 0);
        assert_eq!(count(&world, h), 0);
    }

    #[test]
    fn test_bucket_mutators_are_idempotent() {
        let mut world = World::new();
        let mut reg = HousingRegistry::new();
        let h = spawn_house(&mut world, 2, 4);
        reg.register_house(&world, h).unwrap();
        reg.mark_below_max(h);
        reg.mark_below_max(h);
        assert!(reg.is_below_max(h));
        reg.unmark_below_max(h);
        reg.unmark_below_max(h);
        assert!(!reg.is_below_max(h));

        // Unregistered houses are ignored.
        let stray = spawn_house(&mut world, 1, 1);
        reg.mark_below_preferred(stray);
        assert!(!reg.is_below_preferred(stray));
    }
}
