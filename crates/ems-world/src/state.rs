//! `SimulationState` — the single owner of every entity and the clock.
//!
//! Other crates refer to entities by id and look them up here.  Static
//! rosters (ambulances, hospitals, stations, zones) are [`Roster`]s: a dense
//! `Vec` in insertion order plus an id → slot index.  Emergencies live in
//! one table and move between three id lists:
//!
//! ```text
//!   pending ──(clock reaches timestamp)──▶ working ──(resolved)──▶ archived
//! ```
//!
//! Each transition happens exactly once per emergency.

use std::hash::Hash;

use ems_core::{
    AmbulanceId, EmergencyId, HospitalId, NaiveDateTime, SimClock, StationId, Tick, ZoneId,
};

use crate::{
    Ambulance, Emergency, Hospital, KeyZone, PendingQueue, RescueStation, WorldError, WorldResult,
};

#[cfg(feature = "fx-hash")]
pub(crate) type IdMap<K, V> = rustc_hash::FxHashMap<K, V>;
#[cfg(not(feature = "fx-hash"))]
pub(crate) type IdMap<K, V> = std::collections::HashMap<K, V>;

// ── Roster ────────────────────────────────────────────────────────────────────

/// Insertion-ordered entity list with O(1) lookup by id.
///
/// Entities are never removed, so slot indices stay valid for the whole run.
#[derive(Clone, Debug)]
pub struct Roster<I, T> {
    items: Vec<T>,
    index: IdMap<I, usize>,
}

impl<I: Copy + Eq + Hash, T> Default for Roster<I, T> {
    fn default() -> Self {
        Self { items: Vec::new(), index: IdMap::default() }
    }
}

impl<I: Copy + Eq + Hash, T> Roster<I, T> {
    /// Append `item` under `id`.  Returns the item back if `id` is taken.
    pub fn insert(&mut self, id: I, item: T) -> Result<(), T> {
        if self.index.contains_key(&id) {
            return Err(item);
        }
        self.index.insert(id, self.items.len());
        self.items.push(item);
        Ok(())
    }

    #[inline]
    pub fn get(&self, id: I) -> Option<&T> {
        self.index.get(&id).map(|&i| &self.items[i])
    }

    #[inline]
    pub fn get_mut(&mut self, id: I) -> Option<&mut T> {
        self.index.get(&id).map(|&i| &mut self.items[i])
    }

    #[inline]
    pub fn contains(&self, id: I) -> bool {
        self.index.contains_key(&id)
    }

    /// All entities in insertion order.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ── SimulationState ───────────────────────────────────────────────────────────

const ORIGIN: &str = "state";

/// Complete world state threaded through every engine call.
#[derive(Clone, Debug)]
pub struct SimulationState {
    clock:       SimClock,
    ambulances:  Roster<AmbulanceId, Ambulance>,
    hospitals:   Roster<HospitalId, Hospital>,
    stations:    Roster<StationId, RescueStation>,
    zones:       Roster<ZoneId, KeyZone>,
    emergencies: IdMap<EmergencyId, Emergency>,
    pending:     PendingQueue,
    working:     Vec<EmergencyId>,
    archived:    Vec<EmergencyId>,
    /// `false` only for `Default` states, whose clock follows the scenario.
    explicit_start: bool,
}

impl Default for SimulationState {
    /// An empty state whose clock sits at the chrono epoch default.  The
    /// scenario loader moves the clock to the first call time.
    fn default() -> Self {
        Self { explicit_start: false, ..Self::new(NaiveDateTime::default()) }
    }
}

impl SimulationState {
    pub fn new(clock_start: NaiveDateTime) -> Self {
        Self {
            clock:       SimClock::new(clock_start),
            ambulances:  Roster::default(),
            hospitals:   Roster::default(),
            stations:    Roster::default(),
            zones:       Roster::default(),
            emergencies: IdMap::default(),
            pending:     PendingQueue::new(),
            working:     Vec::new(),
            archived:    Vec::new(),
            explicit_start: true,
        }
    }

    // ── Construction ──────────────────────────────────────────────────────

    pub fn add_ambulance(&mut self, ambulance: Ambulance) -> WorldResult<()> {
        let id = ambulance.id();
        self.ambulances
            .insert(id, ambulance)
            .map_err(|_| duplicate("ambulance", id.raw()))
    }

    pub fn add_hospital(&mut self, hospital: Hospital) -> WorldResult<()> {
        let id = hospital.id();
        self.hospitals
            .insert(id, hospital)
            .map_err(|_| duplicate("hospital", id.raw()))
    }

    pub fn add_station(&mut self, station: RescueStation) -> WorldResult<()> {
        self.stations
            .insert(station.id, station)
            .map_err(|_| duplicate("rescue station", station.id.raw()))
    }

    pub fn add_zone(&mut self, zone: KeyZone) -> WorldResult<()> {
        self.zones
            .insert(zone.id, zone)
            .map_err(|_| duplicate("key zone", zone.id.raw()))
    }

    /// Register a future call.  It is activated by the first clock advance
    /// that reaches its timestamp.
    pub fn add_emergency(&mut self, emergency: Emergency) -> WorldResult<()> {
        let (id, at) = (emergency.id(), emergency.timestamp());
        self.insert_emergency(emergency)?;
        self.pending.push(at, id);
        Ok(())
    }

    /// Register a call directly in the working set, bypassing the pending
    /// queue.  Intended for hand-built states.
    pub fn activate_emergency(&mut self, emergency: Emergency) -> WorldResult<()> {
        let id = emergency.id();
        self.insert_emergency(emergency)?;
        self.working.push(id);
        Ok(())
    }

    fn insert_emergency(&mut self, emergency: Emergency) -> WorldResult<()> {
        let id = emergency.id();
        if self.emergencies.contains_key(&id) {
            return Err(duplicate("emergency", id.raw()));
        }
        self.emergencies.insert(id, emergency);
        Ok(())
    }

    // ── Lookups ───────────────────────────────────────────────────────────

    #[inline]
    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// Current simulation time.
    #[inline]
    pub fn now(&self) -> NaiveDateTime {
        self.clock.now
    }

    #[inline]
    pub fn ambulance(&self, id: AmbulanceId) -> Option<&Ambulance> {
        self.ambulances.get(id)
    }

    #[inline]
    pub fn ambulance_mut(&mut self, id: AmbulanceId) -> Option<&mut Ambulance> {
        self.ambulances.get_mut(id)
    }

    #[inline]
    pub fn hospital(&self, id: HospitalId) -> Option<&Hospital> {
        self.hospitals.get(id)
    }

    #[inline]
    pub fn hospital_mut(&mut self, id: HospitalId) -> Option<&mut Hospital> {
        self.hospitals.get_mut(id)
    }

    #[inline]
    pub fn emergency(&self, id: EmergencyId) -> Option<&Emergency> {
        self.emergencies.get(&id)
    }

    #[inline]
    pub fn emergency_mut(&mut self, id: EmergencyId) -> Option<&mut Emergency> {
        self.emergencies.get_mut(&id)
    }

    pub fn ambulances(&self) -> &[Ambulance] {
        self.ambulances.as_slice()
    }

    /// Mutable roster view for the motion step.  Ids and order are fixed;
    /// only per-ambulance state can change through this slice.
    pub fn ambulances_mut(&mut self) -> &mut [Ambulance] {
        self.ambulances.as_mut_slice()
    }

    pub fn hospitals(&self) -> &[Hospital] {
        self.hospitals.as_slice()
    }

    pub fn rescue_stations(&self) -> &[RescueStation] {
        self.stations.as_slice()
    }

    pub fn key_zones(&self) -> &[KeyZone] {
        self.zones.as_slice()
    }

    /// Activated, unresolved calls in activation order.
    pub fn working_emergencies(&self) -> impl Iterator<Item = &Emergency> + '_ {
        self.working.iter().filter_map(|id| self.emergencies.get(id))
    }

    /// Resolved calls in resolution order.
    pub fn archived_emergencies(&self) -> impl Iterator<Item = &Emergency> + '_ {
        self.archived.iter().filter_map(|id| self.emergencies.get(id))
    }

    /// Every activated call: working first, then archived.
    pub fn tracked_emergencies(&self) -> impl Iterator<Item = &Emergency> + '_ {
        self.working_emergencies().chain(self.archived_emergencies())
    }

    /// `true` if `id` has been activated and is not yet archived.
    pub fn is_working(&self, id: EmergencyId) -> bool {
        self.working.contains(&id)
    }

    pub fn working_ids(&self) -> &[EmergencyId] {
        &self.working
    }

    pub fn archived_ids(&self) -> &[EmergencyId] {
        &self.archived
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn next_pending_time(&self) -> Option<NaiveDateTime> {
        self.pending.next_time()
    }

    /// Total number of calls known to the state, in any phase.
    pub fn emergency_count(&self) -> usize {
        self.emergencies.len()
    }

    // ── Clock ─────────────────────────────────────────────────────────────

    /// Advance the clock by `minutes` (one tick) and activate every call
    /// that is now due.  Returns the activated ids in order.
    pub fn advance_clock(&mut self, minutes: u32) -> Vec<EmergencyId> {
        self.clock.advance_minutes(minutes);
        self.activate_due()
    }

    /// Jump the clock to `t`.  Rewinding is an invariant violation and
    /// leaves the state untouched.
    pub fn set_clock(&mut self, t: NaiveDateTime) -> WorldResult<Vec<EmergencyId>> {
        self.clock.set(t)?;
        Ok(self.activate_due())
    }

    /// Restart an untouched state at `start`.  Used by the scenario loader
    /// to align the clock with the first call.
    pub(crate) fn restart_clock(&mut self, start: NaiveDateTime) {
        self.clock.restart_at(start);
    }

    /// `true` if no start time was given, nothing has ticked and no call
    /// has been registered yet.
    pub(crate) fn clock_follows_scenario(&self) -> bool {
        !self.explicit_start && self.clock.current_tick == Tick::ZERO && self.emergencies.is_empty()
    }

    /// Move every pending call with `timestamp <= now` into the working set.
    pub fn activate_due(&mut self) -> Vec<EmergencyId> {
        let due = self.pending.drain_due(self.clock.now);
        self.working.extend_from_slice(&due);
        due
    }

    // ── Resolution ────────────────────────────────────────────────────────

    /// Move a resolved call from working to archived.
    pub fn archive_emergency(&mut self, id: EmergencyId) -> WorldResult<()> {
        let emergency = self.emergencies.get(&id).ok_or(WorldError::UnknownEmergency(id))?;
        if !emergency.resolved() {
            return Err(WorldError::NotResolved(id));
        }
        let pos = self
            .working
            .iter()
            .position(|&w| w == id)
            .ok_or(WorldError::UnknownEmergency(id))?;
        self.working.remove(pos);
        self.archived.push(id);
        Ok(())
    }

    /// `true` iff nothing is pending and every tracked call is resolved.
    pub fn all_emergencies_resolved(&self) -> bool {
        self.pending.is_empty() && self.tracked_emergencies().all(Emergency::resolved)
    }
}

fn duplicate(kind: &'static str, id: u32) -> WorldError {
    WorldError::DuplicateId { origin: ORIGIN.to_owned(), kind, id }
}

