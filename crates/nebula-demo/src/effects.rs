//! Sample effects for the headless demo.
//!
//! A [`Firework`] is a world-space layered effect that throws [`Ember`]
//! particles from its own tick. A [`Flare`] is an overlay effect that submits
//! its own glow quad and spawns a [`Mote`] into the gateway batch on its first
//! draw.

use glam::Vec3;
use nebula_particles::{
    Appearance, BillboardParticle, BillboardVertex, BlendMode, DrawContext, Effect, EffectError,
    LayeredEffect, Lifetime, MaterialKey, Motion, Registration, RenderTarget, TickContext,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Material used by [`Flare`] glow quads.
pub const FLARE_MATERIAL: MaterialKey = MaterialKey(10);

/// Launches embers for a few ticks, then burns out.
pub struct Firework {
    lifetime: Lifetime,
    origin: Vec3,
    rng: ChaCha8Rng,
    embers_per_tick: u32,
}

impl Firework {
    pub fn new(origin: Vec3, seed: u64) -> Self {
        Self {
            lifetime: Lifetime::new(12),
            origin,
            rng: ChaCha8Rng::seed_from_u64(seed),
            embers_per_tick: 6,
        }
    }
}

impl Effect for Firework {
    fn lifetime(&self) -> &Lifetime {
        &self.lifetime
    }

    fn lifetime_mut(&mut self) -> &mut Lifetime {
        &mut self.lifetime
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Result<(), EffectError> {
        for _ in 0..self.embers_per_tick {
            let velocity = Vec3::new(
                self.rng.random_range(-0.2..0.2),
                self.rng.random_range(0.1..0.4),
                self.rng.random_range(-0.2..0.2),
            );
            let max_age = self.rng.random_range(20..40);
            ctx.spawn(Registration::billboard(Ember::new(
                self.origin,
                velocity,
                max_age,
            )))?;
        }
        Ok(())
    }
}

impl LayeredEffect for Firework {
    fn draw(&mut self, ctx: &mut DrawContext<'_>) -> Result<(), EffectError> {
        // Dim the world under the burst.
        let fade = 1.0 - 0.5 * self.lifetime.progress(ctx.partial_tick());
        ctx.backend().state_mut().tint = [fade, fade, fade, 1.0];
        Ok(())
    }
}

/// Falling spark that fades out over its lifetime.
pub struct Ember {
    lifetime: Lifetime,
    motion: Motion,
}

impl Ember {
    pub fn new(origin: Vec3, velocity: Vec3, max_age: u32) -> Self {
        Self {
            lifetime: Lifetime::new(max_age),
            motion: Motion::new(origin, velocity)
                .with_gravity(0.02)
                .with_drag(0.96),
        }
    }
}

impl Effect for Ember {
    fn lifetime(&self) -> &Lifetime {
        &self.lifetime
    }

    fn lifetime_mut(&mut self) -> &mut Lifetime {
        &mut self.lifetime
    }

    fn tick(&mut self, _ctx: &mut TickContext<'_>) -> Result<(), EffectError> {
        self.motion.step();
        Ok(())
    }
}

impl BillboardParticle for Ember {
    fn position(&self) -> Vec3 {
        self.motion.position
    }

    fn previous_position(&self) -> Vec3 {
        self.motion.previous
    }

    fn appearance(&self, partial_tick: f32) -> Appearance {
        let progress = self.lifetime.progress(partial_tick);
        Appearance {
            alpha: 1.0 - progress,
            scale: 0.08 * (1.0 - 0.5 * progress),
            color: [1.0, 0.6 - 0.4 * progress, 0.2],
            ..Appearance::default()
        }
    }
}

/// Screen-space glow drawn with additive blending.
pub struct Flare {
    lifetime: Lifetime,
    anchor: Vec3,
    spawned_mote: bool,
}

impl Flare {
    pub fn new(anchor: Vec3) -> Self {
        Self {
            lifetime: Lifetime::new(30),
            anchor,
            spawned_mote: false,
        }
    }
}

impl Effect for Flare {
    fn lifetime(&self) -> &Lifetime {
        &self.lifetime
    }

    fn lifetime_mut(&mut self) -> &mut Lifetime {
        &mut self.lifetime
    }

    fn tick(&mut self, _ctx: &mut TickContext<'_>) -> Result<(), EffectError> {
        Ok(())
    }
}

impl LayeredEffect for Flare {
    fn draw(&mut self, ctx: &mut DrawContext<'_>) -> Result<(), EffectError> {
        let alpha = 1.0 - self.lifetime.progress(ctx.partial_tick());
        let view = *ctx.view();
        let quad = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)].map(|(x, y)| {
            BillboardVertex {
                position: (self.anchor + (view.right * x + view.up * y) * 0.5).to_array(),
                uv: [(x + 1.0) * 0.5, (1.0 - y) * 0.5],
                color: [1.0, 0.9, 0.7, alpha],
            }
        });

        let backend = ctx.backend();
        let state = backend.state_mut();
        state.blend = BlendMode::Additive;
        state.material = Some(FLARE_MATERIAL);
        backend.submit_quads(FLARE_MATERIAL, &quad);

        if !self.spawned_mote {
            self.spawned_mote = true;
            ctx.spawn(Registration::gateway(Mote::new(self.anchor)).exempt())?;
        }
        Ok(())
    }
}

/// Gateway particle circling its anchor. Never distance-culled.
pub struct Mote {
    lifetime: Lifetime,
    anchor: Vec3,
    previous: Vec3,
    position: Vec3,
}

impl Mote {
    pub fn new(anchor: Vec3) -> Self {
        let position = anchor + Vec3::X;
        Self {
            lifetime: Lifetime::new(90),
            anchor,
            previous: position,
            position,
        }
    }
}

impl Effect for Mote {
    fn lifetime(&self) -> &Lifetime {
        &self.lifetime
    }

    fn lifetime_mut(&mut self) -> &mut Lifetime {
        &mut self.lifetime
    }

    fn tick(&mut self, _ctx: &mut TickContext<'_>) -> Result<(), EffectError> {
        let angle = self.lifetime.age() as f32 * 0.1;
        self.previous = self.position;
        self.position = self.anchor + Vec3::new(angle.cos(), 0.0, angle.sin());
        Ok(())
    }
}

impl BillboardParticle for Mote {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn previous_position(&self) -> Vec3 {
        self.previous
    }

    fn appearance(&self, _partial_tick: f32) -> Appearance {
        Appearance {
            color: [0.5, 0.3, 1.0],
            ..Appearance::default()
        }
    }

    fn distance_cullable(&self) -> bool {
        false
    }
}

/// Registration for a firework burst at `origin`.
pub fn firework(origin: Vec3, seed: u64) -> Registration {
    Registration::layered(Firework::new(origin, seed), RenderTarget::WorldSpace, 1)
}

/// Registration for an overlay flare at `anchor`. Exempt from throttling.
pub fn flare(anchor: Vec3) -> Registration {
    Registration::layered(Flare::new(anchor), RenderTarget::Overlay, 2).exempt()
}
