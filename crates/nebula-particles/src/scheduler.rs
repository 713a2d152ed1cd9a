//! The effect scheduler: owns every live effect, advances them once per
//! simulation step, and dispatches them for drawing once or more per frame.
//!
//! # Buffering discipline
//!
//! `accepting` is `false` while a bucket is being iterated by [`tick`] or a
//! render pass. Effects running inside such a window can only reach the
//! scheduler through a [`Spawner`], which appends to the pending queue. At the
//! end of every tick the queue is swapped for an empty one and drained, so
//! anything produced while draining lands in the next generation.
//!
//! [`tick`]: EffectScheduler::tick

use glam::Vec3;
use nebula_config::EffectsConfig;
use tracing::{debug, trace_span, warn};

use crate::billboard::BillboardBatcher;
use crate::context::{Admission, DrawContext, Spawner, TickContext, admit};
use crate::effect::{BillboardParticle, Effect, LayeredEffect};
use crate::error::EffectError;
use crate::host::EffectHost;
use crate::registration::{Entry, RegisterOutcome, Registration};
use crate::render::{MaterialKey, RenderBackend, ViewBasis, with_saved_state};
use crate::target::{Layer, RenderTarget};
use crate::throttle::ThrottlePolicy;

type LayeredBuckets = [[Vec<Box<dyn LayeredEffect>>; Layer::COUNT]; 2];

/// Tunables that may change at runtime.
#[derive(Clone, Debug, PartialEq)]
pub struct SchedulerSettings {
    /// Squared distance beyond which cullable particles are removed.
    pub cull_distance_sq: f32,
    /// Material of the main billboard batch.
    pub particle_material: MaterialKey,
    /// Material of the gateway billboard batch.
    pub gateway_material: MaterialKey,
}

impl SchedulerSettings {
    /// Settings taken from the `effects` config section.
    pub fn from_config(config: &EffectsConfig) -> Self {
        Self {
            cull_distance_sq: config.cull_distance_sq,
            particle_material: MaterialKey(config.particle_material),
            gateway_material: MaterialKey(config.gateway_material),
        }
    }
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self::from_config(&EffectsConfig::default())
    }
}

/// Running diagnostic counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct SchedulerStats {
    /// Effects placed into a bucket.
    pub placed: u64,
    /// Registrations queued for a later drain.
    pub deferred: u64,
    /// Registrations dropped by the throttle.
    pub throttled: u64,
    /// Registrations ignored because the simulation was paused.
    pub paused: u64,
    /// Registrations rejected for an invalid layer.
    pub rejected: u64,
    /// Particles removed by distance culling.
    pub culled: u64,
    /// Effects removed by their own predicate.
    pub expired: u64,
    /// Step or draw calls that failed.
    pub failures: u64,
    /// Effects dropped by a clear.
    pub cleared: u64,
}

/// Session-scoped owner of all live visual effects.
///
/// Construct one at session start and drop it at session end; dropping flags
/// every contained effect removed.
pub struct EffectScheduler<H: EffectHost> {
    host: H,
    layered: LayeredBuckets,
    particles: Vec<Box<dyn BillboardParticle>>,
    gateway: Vec<Box<dyn BillboardParticle>>,
    pending: Vec<Entry>,
    accepting: bool,
    clear_requested: bool,
    policy: ThrottlePolicy,
    settings: SchedulerSettings,
    particle_batch: BillboardBatcher,
    gateway_batch: BillboardBatcher,
    stats: SchedulerStats,
}

impl<H: EffectHost> EffectScheduler<H> {
    /// Create an empty scheduler.
    pub fn new(host: H, config: &EffectsConfig) -> Self {
        Self {
            host,
            layered: LayeredBuckets::default(),
            particles: Vec::with_capacity(config.particle_capacity),
            gateway: Vec::new(),
            pending: Vec::new(),
            accepting: true,
            clear_requested: false,
            policy: ThrottlePolicy::new(config.throttle_seed, config.decreased_accept_fraction),
            settings: SchedulerSettings::from_config(config),
            particle_batch: BillboardBatcher::with_capacity(config.particle_capacity),
            gateway_batch: BillboardBatcher::new(),
            stats: SchedulerStats::default(),
        }
    }

    /// The host oracles.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable host oracles, for hosts that push state every frame.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Current runtime settings.
    pub fn settings(&self) -> &SchedulerSettings {
        &self.settings
    }

    /// Replace the runtime settings.
    pub fn set_settings(&mut self, settings: SchedulerSettings) {
        self.settings = settings;
    }

    /// Apply a reloaded `effects` config section without touching live effects.
    pub fn apply_config(&mut self, config: &EffectsConfig) {
        self.settings = SchedulerSettings::from_config(config);
        self.policy
            .set_accept_fraction(config.decreased_accept_fraction);
    }

    /// Register an effect.
    ///
    /// Paused or throttled registrations are silent no-ops reported through the
    /// outcome. An invalid layer rejects this registration only.
    ///
    /// Effects running inside a pass register through their [`Spawner`], and
    /// `&mut self` keeps this method out of reach while a pass runs. The window
    /// can only still be closed here if a pass panicked before reopening it; the
    /// registration is then queued and placed by the next tick's drain.
    pub fn register(
        &mut self,
        registration: Registration,
    ) -> Result<RegisterOutcome, EffectError> {
        let setting = self.host.particle_setting();
        let paused = self.host.is_paused();
        match admit(
            &mut self.policy,
            &mut self.stats,
            setting,
            paused,
            registration,
        )? {
            Admission::Dropped(outcome) => Ok(outcome),
            Admission::Admitted(entry) if self.accepting => {
                self.place(entry);
                Ok(RegisterOutcome::Placed)
            }
            // Left closed by a panicked pass.
            Admission::Admitted(entry) => {
                self.pending.push(entry);
                self.stats.deferred += 1;
                Ok(RegisterOutcome::Deferred)
            }
        }
    }

    /// Advance every effect by one simulation step.
    pub fn tick(&mut self) {
        let _span = trace_span!("effects_tick").entered();

        if self.clear_requested {
            self.clear_now();
        }

        // Without an observer nothing advances, but the queue still drains.
        if let Some(viewpoint) = self.host.viewpoint() {
            self.accepting = false;
            let cull_distance_sq = self.settings.cull_distance_sq;
            let spawner = Spawner::new(
                &mut self.pending,
                &mut self.policy,
                &mut self.stats,
                self.host.particle_setting(),
                self.host.is_paused(),
            );
            let mut ctx = TickContext::new(viewpoint, spawner);

            for bucket in self.layered.iter_mut().flatten() {
                bucket.retain_mut(|effect| keep_after_step(effect.as_mut(), &mut ctx));
            }
            for list in [&mut self.particles, &mut self.gateway] {
                list.retain_mut(|particle| {
                    keep_particle_after_step(
                        particle.as_mut(),
                        &mut ctx,
                        viewpoint,
                        cull_distance_sq,
                    )
                });
            }
            self.accepting = true;
        }

        self.drain_pending();
    }

    /// Draw the overlay target, layers 0 to 2.
    pub fn render_overlay(
        &mut self,
        partial_tick: f32,
        view: &ViewBasis,
        backend: &mut dyn RenderBackend,
    ) {
        let _span = trace_span!("effects_render_overlay").entered();
        self.accepting = false;
        let mut spawner = Spawner::new(
            &mut self.pending,
            &mut self.policy,
            &mut self.stats,
            self.host.particle_setting(),
            self.host.is_paused(),
        );
        for bucket in &mut self.layered[RenderTarget::Overlay.index()] {
            draw_bucket(bucket, &mut spawner, view, partial_tick, backend);
        }
        self.accepting = true;
    }

    /// Draw the world: main particles, world layers 0 to 2, then gateway particles.
    pub fn render_world(
        &mut self,
        partial_tick: f32,
        view: &ViewBasis,
        backend: &mut dyn RenderBackend,
    ) {
        let _span = trace_span!("effects_render_world").entered();
        self.accepting = false;

        self.particle_batch.submit(
            &self.particles,
            view,
            partial_tick,
            self.settings.particle_material,
            backend,
        );

        let mut spawner = Spawner::new(
            &mut self.pending,
            &mut self.policy,
            &mut self.stats,
            self.host.particle_setting(),
            self.host.is_paused(),
        );
        for bucket in &mut self.layered[RenderTarget::WorldSpace.index()] {
            draw_bucket(bucket, &mut spawner, view, partial_tick, backend);
        }

        self.gateway_batch.submit(
            &self.gateway,
            view,
            partial_tick,
            self.settings.gateway_material,
            backend,
        );

        self.accepting = true;
    }

    /// Drop every effect at the start of the next tick.
    pub fn request_clear(&mut self) {
        self.clear_requested = true;
    }

    /// Whether a clear is waiting for the next tick.
    pub fn is_clear_requested(&self) -> bool {
        self.clear_requested
    }

    /// Whether registrations are currently placed directly.
    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    /// Number of live effects across all buckets and both particle lists.
    pub fn debug_count(&self) -> usize {
        let layered: usize = RenderTarget::ALL
            .into_iter()
            .map(|target| self.count_in(target))
            .sum();
        layered + self.particles.len() + self.gateway.len()
    }

    /// Number of layered effects in `target`.
    pub fn count_in(&self, target: RenderTarget) -> usize {
        self.layered[target.index()].iter().map(Vec::len).sum()
    }

    /// Number of layered effects in one bucket.
    pub fn count_in_layer(&self, target: RenderTarget, layer: Layer) -> usize {
        self.layered[target.index()][layer.index()].len()
    }

    /// Number of particles in the main batch.
    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// Number of particles in the gateway batch.
    pub fn gateway_count(&self) -> usize {
        self.gateway.len()
    }

    /// Registrations waiting for the next drain.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Diagnostic counters.
    pub fn stats(&self) -> &SchedulerStats {
        &self.stats
    }

    fn place(&mut self, entry: Entry) {
        match entry {
            Entry::Layered {
                mut effect,
                target,
                layer,
            } => {
                effect.lifetime_mut().revive();
                self.layered[target.index()][layer.index()].push(effect);
            }
            Entry::Billboard(mut particle) => {
                particle.lifetime_mut().revive();
                self.particles.push(particle);
            }
            Entry::Gateway(mut particle) => {
                particle.lifetime_mut().revive();
                self.gateway.push(particle);
            }
        }
        self.stats.placed += 1;
    }

    fn drain_pending(&mut self) {
        let drained = std::mem::take(&mut self.pending);
        if drained.is_empty() {
            return;
        }
        debug!(count = drained.len(), "placing deferred effects");
        for entry in drained {
            self.place(entry);
        }
    }

    fn clear_now(&mut self) {
        let mut cleared = 0u64;
        for bucket in self.layered.iter_mut().flatten() {
            for mut effect in bucket.drain(..) {
                retire(effect.as_mut());
                cleared += 1;
            }
        }
        for list in [&mut self.particles, &mut self.gateway] {
            for mut particle in list.drain(..) {
                retire(particle.as_mut());
                cleared += 1;
            }
        }
        for mut entry in self.pending.drain(..) {
            entry.retire();
            cleared += 1;
        }
        self.clear_requested = false;
        self.stats.cleared += cleared;
        debug!(cleared, "cleared all effects");
    }
}

impl<H: EffectHost> Drop for EffectScheduler<H> {
    fn drop(&mut self) {
        self.clear_now();
    }
}

fn retire<E: Effect + ?Sized>(effect: &mut E) {
    effect.lifetime_mut().mark_removed();
    effect.on_removed();
}

/// Step one effect. Returns whether it stays in its bucket.
fn step<E: Effect + ?Sized>(effect: &mut E, ctx: &mut TickContext<'_>) -> bool {
    if effect.lifetime().is_removed() {
        return false;
    }
    if let Err(err) = effect.tick(ctx) {
        warn!(%err, "effect step failed, removing it");
        ctx.stats_mut().failures += 1;
        return false;
    }
    effect.lifetime_mut().advance();
    if effect.can_remove() {
        ctx.stats_mut().expired += 1;
        return false;
    }
    true
}

fn keep_after_step(effect: &mut dyn LayeredEffect, ctx: &mut TickContext<'_>) -> bool {
    let keep = step(effect, ctx);
    if !keep {
        retire(effect);
    }
    keep
}

fn keep_particle_after_step(
    particle: &mut dyn BillboardParticle,
    ctx: &mut TickContext<'_>,
    viewpoint: Vec3,
    cull_distance_sq: f32,
) -> bool {
    let mut keep = step(particle, ctx);
    if keep
        && particle.distance_cullable()
        && particle.position().distance_squared(viewpoint) > cull_distance_sq
    {
        ctx.stats_mut().culled += 1;
        keep = false;
    }
    if !keep {
        retire(particle);
    }
    keep
}

fn draw_bucket(
    bucket: &mut [Box<dyn LayeredEffect>],
    spawner: &mut Spawner<'_>,
    view: &ViewBasis,
    partial_tick: f32,
    backend: &mut dyn RenderBackend,
) {
    for effect in bucket.iter_mut() {
        if effect.lifetime().is_removed() {
            continue;
        }
        let result = with_saved_state(&mut *backend, |backend| {
            let mut ctx = DrawContext::new(partial_tick, view, backend, spawner.reborrow());
            effect.draw(&mut ctx)
        });
        if let Err(err) = result {
            warn!(%err, "effect draw failed, removing it at the next tick");
            spawner.stats_mut().failures += 1;
            effect.lifetime_mut().mark_removed();
        }
    }
}
