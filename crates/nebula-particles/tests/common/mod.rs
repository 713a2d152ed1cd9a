//! Test effects that report their lifecycle through shared probes.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glam::Vec3;
use nebula_config::EffectsConfig;
use nebula_particles::{
    Appearance, BillboardParticle, BlendMode, DrawContext, Effect, EffectError, EffectScheduler,
    HostState, LayeredEffect, Lifetime, MaterialKey, Motion, Registration, TickContext,
};

/// Shared view of one effect's lifecycle.
#[derive(Clone, Default)]
pub struct Probe {
    removed: Rc<Cell<bool>>,
    removals: Rc<Cell<u32>>,
    ticks: Rc<Cell<u32>>,
    draws: Rc<Cell<u32>>,
}

impl Probe {
    pub fn removed(&self) -> bool {
        self.removed.get()
    }

    pub fn removals(&self) -> u32 {
        self.removals.get()
    }

    pub fn ticks(&self) -> u32 {
        self.ticks.get()
    }

    pub fn draws(&self) -> u32 {
        self.draws.get()
    }

    fn record_removal(&self, lifetime: &Lifetime) {
        self.removed.set(lifetime.is_removed());
        self.removals.set(self.removals.get() + 1);
    }
}

type Spawn = Rc<dyn Fn() -> Registration>;

/// Layered test effect.
pub struct Flash {
    lifetime: Lifetime,
    probe: Probe,
    name: &'static str,
    draw_log: Option<Rc<RefCell<Vec<&'static str>>>>,
    state_log: Option<Rc<RefCell<Vec<BlendMode>>>>,
    spawn_on_tick: Option<Spawn>,
    spawn_on_draw: Option<Spawn>,
    fail_tick: bool,
    fail_draw: bool,
    panic_draw: bool,
    dirty_state: bool,
}

impl Flash {
    pub fn new(max_age: u32, probe: &Probe) -> Self {
        Self {
            lifetime: Lifetime::new(max_age),
            probe: probe.clone(),
            name: "flash",
            draw_log: None,
            state_log: None,
            spawn_on_tick: None,
            spawn_on_draw: None,
            fail_tick: false,
            fail_draw: false,
            panic_draw: false,
            dirty_state: false,
        }
    }

    pub fn named(mut self, name: &'static str, log: &Rc<RefCell<Vec<&'static str>>>) -> Self {
        self.name = name;
        self.draw_log = Some(log.clone());
        self
    }

    pub fn spawning_on_tick(mut self, spawn: impl Fn() -> Registration + 'static) -> Self {
        self.spawn_on_tick = Some(Rc::new(spawn));
        self
    }

    pub fn spawning_on_draw(mut self, spawn: impl Fn() -> Registration + 'static) -> Self {
        self.spawn_on_draw = Some(Rc::new(spawn));
        self
    }

    pub fn failing_tick(mut self) -> Self {
        self.fail_tick = true;
        self
    }

    pub fn failing_draw(mut self) -> Self {
        self.fail_draw = true;
        self
    }

    pub fn panicking_draw(mut self) -> Self {
        self.panic_draw = true;
        self
    }

    /// Leave additive blending, a material and a black tint after drawing, and log the
    /// blend mode seen on entry.
    pub fn dirtying_state(mut self, log: &Rc<RefCell<Vec<BlendMode>>>) -> Self {
        self.dirty_state = true;
        self.state_log = Some(log.clone());
        self
    }
}

impl Effect for Flash {
    fn lifetime(&self) -> &Lifetime {
        &self.lifetime
    }

    fn lifetime_mut(&mut self) -> &mut Lifetime {
        &mut self.lifetime
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Result<(), EffectError> {
        self.probe.ticks.set(self.probe.ticks.get() + 1);
        if self.fail_tick {
            return Err(EffectError::failed("tick exploded"));
        }
        if let Some(spawn) = &self.spawn_on_tick {
            ctx.spawn(spawn())?;
        }
        Ok(())
    }

    fn on_removed(&mut self) {
        self.probe.record_removal(&self.lifetime);
    }
}

impl LayeredEffect for Flash {
    fn draw(&mut self, ctx: &mut DrawContext<'_>) -> Result<(), EffectError> {
        self.probe.draws.set(self.probe.draws.get() + 1);
        if let Some(log) = &self.draw_log {
            log.borrow_mut().push(self.name);
        }
        if let Some(log) = &self.state_log {
            log.borrow_mut().push(ctx.backend().state().blend);
        }
        if self.dirty_state {
            let state = ctx.backend().state_mut();
            state.blend = BlendMode::Additive;
            state.material = Some(MaterialKey(99));
            state.tint = [0.0; 4];
        }
        if let Some(spawn) = &self.spawn_on_draw {
            ctx.spawn(spawn())?;
        }
        if self.panic_draw {
            panic!("draw panicked");
        }
        if self.fail_draw {
            return Err(EffectError::failed("draw exploded"));
        }
        Ok(())
    }
}

/// Billboard test particle.
pub struct Spark {
    lifetime: Lifetime,
    motion: Motion,
    probe: Probe,
    cullable: bool,
}

impl Spark {
    pub fn new(max_age: u32, position: Vec3, probe: &Probe) -> Self {
        Self {
            lifetime: Lifetime::new(max_age),
            motion: Motion::new(position, Vec3::ZERO),
            probe: probe.clone(),
            cullable: true,
        }
    }

    pub fn moving(mut self, velocity: Vec3) -> Self {
        self.motion.velocity = velocity;
        self
    }

    pub fn never_culled(mut self) -> Self {
        self.cullable = false;
        self
    }
}

impl Effect for Spark {
    fn lifetime(&self) -> &Lifetime {
        &self.lifetime
    }

    fn lifetime_mut(&mut self) -> &mut Lifetime {
        &mut self.lifetime
    }

    fn tick(&mut self, _ctx: &mut TickContext<'_>) -> Result<(), EffectError> {
        self.probe.ticks.set(self.probe.ticks.get() + 1);
        self.motion.step();
        Ok(())
    }

    fn on_removed(&mut self) {
        self.probe.record_removal(&self.lifetime);
    }
}

impl BillboardParticle for Spark {
    fn position(&self) -> Vec3 {
        self.motion.position
    }

    fn previous_position(&self) -> Vec3 {
        self.motion.previous
    }

    fn appearance(&self, partial_tick: f32) -> Appearance {
        Appearance {
            alpha: 1.0 - self.lifetime.progress(partial_tick),
            ..Appearance::default()
        }
    }

    fn distance_cullable(&self) -> bool {
        self.cullable
    }
}

/// Scheduler with an observer at the origin and default config.
pub fn scheduler() -> EffectScheduler<HostState> {
    scheduler_with(EffectsConfig::default())
}

pub fn scheduler_with(config: EffectsConfig) -> EffectScheduler<HostState> {
    let mut host = HostState::from_config(&config);
    host.viewpoint = Some(Vec3::ZERO);
    EffectScheduler::new(host, &config)
}
