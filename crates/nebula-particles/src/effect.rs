//! Capability traits an effect implements to be scheduled, plus the shared
//! lifetime and motion bookkeeping most effects embed.
//!
//! The scheduler owns every registered effect as a boxed trait object. It
//! advances [`Lifetime::age`] itself after each successful step, so an effect
//! only has to implement its own behavior.

use glam::Vec3;

use crate::context::{DrawContext, TickContext};
use crate::error::EffectError;

/// Age bookkeeping shared by all effects.
///
/// `removed` only ever goes from `false` to `true` while the effect is owned by
/// the scheduler. Placement into a bucket resets it, which is the only way it
/// is cleared.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lifetime {
    age: u32,
    max_age: u32,
    removed: bool,
}

impl Lifetime {
    /// A fresh lifetime that expires after `max_age` steps.
    pub fn new(max_age: u32) -> Self {
        Self {
            age: 0,
            max_age,
            removed: false,
        }
    }

    /// A lifetime that never expires on its own.
    pub fn unbounded() -> Self {
        Self::new(u32::MAX)
    }

    /// Steps survived so far.
    pub fn age(&self) -> u32 {
        self.age
    }

    /// Step count at which the effect expires.
    pub fn max_age(&self) -> u32 {
        self.max_age
    }

    /// Steps left before expiry.
    pub fn remaining(&self) -> u32 {
        self.max_age.saturating_sub(self.age)
    }

    /// Whether the age has reached the limit.
    pub fn is_expired(&self) -> bool {
        self.age >= self.max_age
    }

    /// Whether the effect has been retired.
    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Flag the effect removed. Idempotent.
    pub fn mark_removed(&mut self) {
        self.removed = true;
    }

    /// Normalized age in `[0, 1]`, interpolated by `partial_tick`.
    pub fn progress(&self, partial_tick: f32) -> f32 {
        if self.max_age == 0 {
            return 1.0;
        }
        ((self.age as f32 + partial_tick) / self.max_age as f32).clamp(0.0, 1.0)
    }

    pub(crate) fn advance(&mut self) {
        self.age = self.age.saturating_add(1);
    }

    pub(crate) fn revive(&mut self) {
        self.removed = false;
    }
}

/// The base capability of every scheduled effect.
pub trait Effect {
    /// Read access to the age bookkeeping.
    fn lifetime(&self) -> &Lifetime;

    /// Write access to the age bookkeeping.
    fn lifetime_mut(&mut self) -> &mut Lifetime;

    /// Advance by one simulation step. Returning an error retires this effect.
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Result<(), EffectError>;

    /// Removal predicate checked after every step.
    fn can_remove(&self) -> bool {
        self.lifetime().is_expired()
    }

    /// Called once when the scheduler retires the effect.
    fn on_removed(&mut self) {}
}

/// An effect that issues its own draw calls in an overlay or world layer.
pub trait LayeredEffect: Effect {
    /// Draw the effect. Drawing state changes are rolled back after the call.
    fn draw(&mut self, ctx: &mut DrawContext<'_>) -> Result<(), EffectError>;
}

/// A camera-facing quad drawn as part of a shared batch.
pub trait BillboardParticle: Effect {
    /// Position after the latest step.
    fn position(&self) -> Vec3;

    /// Position before the latest step.
    fn previous_position(&self) -> Vec3;

    /// Alpha, scale and color for this frame.
    fn appearance(&self, partial_tick: f32) -> Appearance;

    /// Whether distance culling may remove this particle.
    fn distance_cullable(&self) -> bool {
        true
    }
}

/// Per-frame look of a billboard particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Appearance {
    /// Opacity in `[0, 1]`.
    pub alpha: f32,
    /// Half-size of the quad in world units.
    pub scale: f32,
    /// Linear RGB tint.
    pub color: [f32; 3],
    /// Atlas rectangle `(u0, v0, u1, v1)`.
    pub uv: [f32; 4],
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            scale: 0.1,
            color: [1.0, 1.0, 1.0],
            uv: [0.0, 0.0, 1.0, 1.0],
        }
    }
}

/// Simple ballistic motion for particles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Motion {
    /// Position after the latest step.
    pub position: Vec3,
    /// Position before the latest step.
    pub previous: Vec3,
    /// Displacement per step.
    pub velocity: Vec3,
    /// Downward acceleration per step.
    pub gravity: f32,
    /// Velocity multiplier applied after each step.
    pub drag: f32,
}

impl Motion {
    /// Motion starting at `position` with no gravity or drag.
    pub fn new(position: Vec3, velocity: Vec3) -> Self {
        Self {
            position,
            previous: position,
            velocity,
            gravity: 0.0,
            drag: 1.0,
        }
    }

    /// Builder: set gravity.
    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    /// Builder: set drag.
    pub fn with_drag(mut self, drag: f32) -> Self {
        self.drag = drag;
        self
    }

    /// Integrate one step.
    pub fn step(&mut self) {
        self.previous = self.position;
        self.velocity.y -= self.gravity;
        self.position += self.velocity;
        self.velocity *= self.drag;
    }

    /// Position interpolated between the previous and current step.
    pub fn interpolated(&self, partial_tick: f32) -> Vec3 {
        self.previous.lerp(self.position, partial_tick)
    }
}
