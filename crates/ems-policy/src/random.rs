//! Seeded random dispatch, for baselines.

use ems_core::{AmbulanceId, Decision, SimRng};
use ems_world::{EmergencyStatus, Hospital};

use crate::nearest::{OpenBeds, awaiting_hospital, relocation_destinations};
use crate::{DecisionBatch, DispatchPolicy, PolicyContext, PolicyError, PolicyResult};

/// Picks uniformly at random wherever [`NearestAvailablePolicy`] would pick
/// the nearest option.
///
/// Waiting calls get a random available ambulance, loaded ambulances a random
/// eligible hospital with an open bed (any hospital with an open bed if no
/// eligible one has room, otherwise they wait at the scene), and each
/// idle ambulance relocates to a random hospital or station with probability
/// `relocation_prob`.  Identical seeds give identical decisions.
///
/// [`NearestAvailablePolicy`]: crate::NearestAvailablePolicy
pub struct RandomPolicy {
    rng:             SimRng,
    relocation_prob: f64,
}

impl RandomPolicy {
    pub fn new(seed: u64) -> Self {
        Self { rng: SimRng::new(seed), relocation_prob: 0.0 }
    }

    pub fn with_relocation_prob(mut self, probability: f64) -> PolicyResult<Self> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(PolicyError::Config(format!(
                "relocation probability must be in [0, 1], got {probability}"
            )));
        }
        self.relocation_prob = probability;
        Ok(self)
    }
}

impl DispatchPolicy for RandomPolicy {
    fn decide(&mut self, ctx: &PolicyContext<'_>) -> Vec<Decision> {
        let mut batch = DecisionBatch::new();
        let ambulances = ctx.state.ambulances();

        // ── Dispatch ──────────────────────────────────────────────────────
        let mut free: Vec<AmbulanceId> =
            ambulances.iter().filter(|a| a.is_available()).map(|a| a.id()).collect();
        for call in ctx.state.working_emergencies() {
            if free.is_empty() {
                break;
            }
            if call.status() != EmergencyStatus::WaitingForAssignment {
                continue;
            }
            let pick = self.rng.index(free.len());
            let ambulance = free.swap_remove(pick);
            batch.push(Decision::SendAmbulanceToEmergency { ambulance, emergency: call.id() });
        }

        // ── Hospital choice ───────────────────────────────────────────────
        let hospitals = ctx.state.hospitals();
        let mut beds = OpenBeds::new(ctx);
        for amb in ambulances.iter().filter(|a| awaiting_hospital(a)) {
            let Some(call) = amb.emergency_assigned().and_then(|id| ctx.state.emergency(id)) else {
                continue;
            };
            let eligible: Vec<&Hospital> = hospitals
                .iter()
                .filter(|h| call.hospitals().contains(&h.id()) && beds.is_open(h.id()))
                .collect();
            let open: Vec<&Hospital> = hospitals.iter().filter(|h| beds.is_open(h.id())).collect();
            let chosen = match self.rng.choose(&eligible) {
                Some(&h) => Some(h),
                None => self.rng.choose(&open).copied(),
            };
            if let Some(h) = chosen {
                beds.promise(h.id());
                batch.push(Decision::SendAmbulanceToHospital { ambulance: amb.id(), hospital: h.id() });
            }
        }

        // ── Relocation ────────────────────────────────────────────────────
        if self.relocation_prob > 0.0 {
            let destinations = relocation_destinations(ctx);
            for amb in ambulances {
                if !amb.is_available() || amb.has_route() || batch.is_claimed(amb.id()) {
                    continue;
                }
                if self.rng.gen_bool(self.relocation_prob) {
                    if let Some(&target) = self.rng.choose(&destinations) {
                        batch.push(Decision::RelocateAmbulance { ambulance: amb.id(), target });
                    }
                }
            }
        }

        batch.into_decisions()
    }

    fn name(&self) -> &str {
        "random"
    }
}
