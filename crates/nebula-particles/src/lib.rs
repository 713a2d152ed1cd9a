//! Real-time scheduling of short-lived visual effects.
//!
//! [`EffectScheduler`] owns every live effect, advances them once per fixed
//! simulation step, and draws them one or more times per displayed frame:
//!
//! - layered effects, bucketed by [`RenderTarget`] and [`Layer`] and drawn
//!   individually with their drawing state scoped per call
//! - billboard particles, drawn as one batched submission per material
//!
//! Effects may register further effects from inside their own step or draw
//! call. Those registrations are queued and placed when the tick drains its
//! queue, never while a bucket is being iterated.

mod billboard;
mod context;
mod effect;
mod error;
mod host;
mod registration;
mod render;
mod scheduler;
mod target;
mod throttle;

pub use billboard::{BillboardBatcher, BillboardVertex};
pub use context::{DrawContext, Spawner, TickContext};
pub use effect::{Appearance, BillboardParticle, Effect, LayeredEffect, Lifetime, Motion};
pub use error::EffectError;
pub use host::{EffectHost, HostState};
pub use registration::{EffectVariant, RegisterOutcome, Registration};
pub use render::{
    BlendMode, DrawState, MaterialKey, RecordingBackend, RenderBackend, Submission, ViewBasis,
    with_saved_state,
};
pub use scheduler::{EffectScheduler, SchedulerSettings, SchedulerStats};
pub use target::{Layer, RenderTarget};
pub use throttle::ThrottlePolicy;

pub use nebula_config::ParticleSetting;
