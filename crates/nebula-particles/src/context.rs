//! Per-pass contexts handed to effects, and the spawner that lets an effect
//! register more effects while the scheduler is iterating its buckets.
//!
//! A [`Spawner`] never touches a bucket. It applies the same admission rules
//! as [`EffectScheduler::register`](crate::EffectScheduler::register) and
//! queues the result for the next drain.

use glam::Vec3;
use nebula_config::ParticleSetting;
use tracing::{trace, warn};

use crate::error::EffectError;
use crate::registration::{Entry, RegisterOutcome, Registration};
use crate::render::{RenderBackend, ViewBasis};
use crate::scheduler::SchedulerStats;
use crate::throttle::ThrottlePolicy;

/// Result of running a registration through pause, layer and throttle checks.
pub(crate) enum Admission {
    Admitted(Entry),
    Dropped(RegisterOutcome),
}

pub(crate) fn admit(
    policy: &mut ThrottlePolicy,
    stats: &mut SchedulerStats,
    setting: ParticleSetting,
    paused: bool,
    registration: Registration,
) -> Result<Admission, EffectError> {
    if paused {
        stats.paused += 1;
        return Ok(Admission::Dropped(RegisterOutcome::Paused));
    }

    let exempt = registration.is_exempt();
    let variant = registration.variant();
    let entry = match registration.into_entry() {
        Ok(entry) => entry,
        Err(err) => {
            stats.rejected += 1;
            warn!(?variant, %err, "rejected effect registration");
            return Err(err);
        }
    };

    if !policy.admits(setting, exempt) {
        stats.throttled += 1;
        trace!(?variant, ?setting, "effect registration throttled");
        return Ok(Admission::Dropped(RegisterOutcome::Throttled));
    }

    Ok(Admission::Admitted(entry))
}

/// Registration handle available inside an effect's step or draw call.
pub struct Spawner<'a> {
    pending: &'a mut Vec<Entry>,
    policy: &'a mut ThrottlePolicy,
    stats: &'a mut SchedulerStats,
    setting: ParticleSetting,
    paused: bool,
}

impl<'a> Spawner<'a> {
    pub(crate) fn new(
        pending: &'a mut Vec<Entry>,
        policy: &'a mut ThrottlePolicy,
        stats: &'a mut SchedulerStats,
        setting: ParticleSetting,
        paused: bool,
    ) -> Self {
        Self {
            pending,
            policy,
            stats,
            setting,
            paused,
        }
    }

    /// Register an effect. Admitted effects are always [`RegisterOutcome::Deferred`].
    pub fn register(
        &mut self,
        registration: Registration,
    ) -> Result<RegisterOutcome, EffectError> {
        match admit(
            self.policy,
            self.stats,
            self.setting,
            self.paused,
            registration,
        )? {
            Admission::Admitted(entry) => {
                self.pending.push(entry);
                self.stats.deferred += 1;
                Ok(RegisterOutcome::Deferred)
            }
            Admission::Dropped(outcome) => Ok(outcome),
        }
    }

    pub(crate) fn reborrow(&mut self) -> Spawner<'_> {
        Spawner {
            pending: &mut *self.pending,
            policy: &mut *self.policy,
            stats: &mut *self.stats,
            setting: self.setting,
            paused: self.paused,
        }
    }

    pub(crate) fn stats_mut(&mut self) -> &mut SchedulerStats {
        self.stats
    }
}

/// Context for [`Effect::tick`](crate::Effect::tick).
pub struct TickContext<'a> {
    viewpoint: Vec3,
    spawner: Spawner<'a>,
}

impl<'a> TickContext<'a> {
    pub(crate) fn new(viewpoint: Vec3, spawner: Spawner<'a>) -> Self {
        Self { viewpoint, spawner }
    }

    /// Observer position for this step.
    pub fn viewpoint(&self) -> Vec3 {
        self.viewpoint
    }

    /// Register another effect; it is placed when this tick drains its queue.
    pub fn spawn(&mut self, registration: Registration) -> Result<RegisterOutcome, EffectError> {
        self.spawner.register(registration)
    }

    pub(crate) fn stats_mut(&mut self) -> &mut SchedulerStats {
        self.spawner.stats_mut()
    }
}

/// Context for [`LayeredEffect::draw`](crate::LayeredEffect::draw).
pub struct DrawContext<'a> {
    partial_tick: f32,
    view: &'a ViewBasis,
    backend: &'a mut dyn RenderBackend,
    spawner: Spawner<'a>,
}

impl<'a> DrawContext<'a> {
    pub(crate) fn new(
        partial_tick: f32,
        view: &'a ViewBasis,
        backend: &'a mut dyn RenderBackend,
        spawner: Spawner<'a>,
    ) -> Self {
        Self {
            partial_tick,
            view,
            backend,
            spawner,
        }
    }

    /// Interpolation factor between the previous and current step.
    pub fn partial_tick(&self) -> f32 {
        self.partial_tick
    }

    /// Camera basis for this frame.
    pub fn view(&self) -> &ViewBasis {
        self.view
    }

    /// The backend. State changes made here are undone after the draw call.
    pub fn backend(&mut self) -> &mut dyn RenderBackend {
        &mut *self.backend
    }

    /// Register another effect; it is placed during the next tick.
    pub fn spawn(&mut self, registration: Registration) -> Result<RegisterOutcome, EffectError> {
        self.spawner.register(registration)
    }
}
