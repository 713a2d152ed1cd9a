//! Registration requests and the variant tag that decides an effect's bucket.
//!
//! The variant is fixed when the [`Registration`] is built and travels with the
//! effect into its bucket, so the scheduler never re-classifies an effect.

use crate::effect::{BillboardParticle, LayeredEffect};
use crate::error::EffectError;
use crate::target::{Layer, RenderTarget};

/// Which bucket family an effect belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectVariant {
    /// Individually drawn effect in a render target layer.
    Layered {
        /// Render pass.
        target: RenderTarget,
        /// Requested layer ordinal, validated at registration.
        layer: u8,
    },
    /// Particle in the main billboard batch.
    Billboard,
    /// Particle in the separate gateway batch, drawn after world layers.
    Gateway,
}

/// What [`register`](crate::EffectScheduler::register) did with a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// Placed directly into its bucket.
    Placed,
    /// Queued; placed during the next drain.
    Deferred,
    /// Discarded by the throttle policy.
    Throttled,
    /// Discarded because the simulation is paused.
    Paused,
}

/// An effect paired with its variant tag, ready to hand to the scheduler.
///
/// Registering the same effect instance twice is not possible: building a
/// registration moves the effect.
pub struct Registration {
    payload: Payload,
    exempt: bool,
}

enum Payload {
    Layered {
        effect: Box<dyn LayeredEffect>,
        target: RenderTarget,
        layer: u8,
    },
    Billboard(Box<dyn BillboardParticle>),
    Gateway(Box<dyn BillboardParticle>),
}

impl Registration {
    /// A layered effect drawn in `target` at `layer` (0, 1 or 2).
    pub fn layered<E: LayeredEffect + 'static>(effect: E, target: RenderTarget, layer: u8) -> Self {
        Self {
            payload: Payload::Layered {
                effect: Box::new(effect),
                target,
                layer,
            },
            exempt: false,
        }
    }

    /// A particle in the main billboard batch.
    pub fn billboard<P: BillboardParticle + 'static>(particle: P) -> Self {
        Self {
            payload: Payload::Billboard(Box::new(particle)),
            exempt: false,
        }
    }

    /// A particle in the gateway billboard batch.
    pub fn gateway<P: BillboardParticle + 'static>(particle: P) -> Self {
        Self {
            payload: Payload::Gateway(Box::new(particle)),
            exempt: false,
        }
    }

    /// Mark the registration exempt from throttling.
    pub fn exempt(mut self) -> Self {
        self.exempt = true;
        self
    }

    /// Whether the registration bypasses the throttle.
    pub fn is_exempt(&self) -> bool {
        self.exempt
    }

    /// The variant tag.
    pub fn variant(&self) -> EffectVariant {
        match &self.payload {
            Payload::Layered { target, layer, .. } => EffectVariant::Layered {
                target: *target,
                layer: *layer,
            },
            Payload::Billboard(_) => EffectVariant::Billboard,
            Payload::Gateway(_) => EffectVariant::Gateway,
        }
    }

    /// Validate the layer ordinal and unwrap into a bucket entry.
    pub(crate) fn into_entry(self) -> Result<Entry, EffectError> {
        Ok(match self.payload {
            Payload::Layered {
                effect,
                target,
                layer,
            } => Entry::Layered {
                effect,
                target,
                layer: Layer::new(layer)?,
            },
            Payload::Billboard(particle) => Entry::Billboard(particle),
            Payload::Gateway(particle) => Entry::Gateway(particle),
        })
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("variant", &self.variant())
            .field("exempt", &self.exempt)
            .finish()
    }
}

/// A validated, admitted effect waiting to be placed.
pub(crate) enum Entry {
    Layered {
        effect: Box<dyn LayeredEffect>,
        target: RenderTarget,
        layer: Layer,
    },
    Billboard(Box<dyn BillboardParticle>),
    Gateway(Box<dyn BillboardParticle>),
}

impl Entry {
    /// Flag the contained effect removed and run its hook.
    pub(crate) fn retire(&mut self) {
        match self {
            Entry::Layered { effect, .. } => {
                effect.lifetime_mut().mark_removed();
                effect.on_removed();
            }
            Entry::Billboard(particle) | Entry::Gateway(particle) => {
                particle.lifetime_mut().mark_removed();
                particle.on_removed();
            }
        }
    }
}
