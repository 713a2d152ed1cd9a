//! Billboard batching: many same-material particles, one draw submission.
//!
//! Each particle contributes one camera-facing quad. Positions are interpolated
//! between the previous and current step by the partial tick. The particle list
//! is borrowed immutably for the whole call, so it cannot change mid-batch.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::effect::BillboardParticle;
use crate::render::{BlendMode, MaterialKey, RenderBackend, ViewBasis, with_saved_state};

/// Quad corner offsets in `(right, up)` units, counter-clockwise from bottom-left.
const CORNERS: [(f32, f32); 4] = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

/// Vertex layout of a billboard quad.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct BillboardVertex {
    /// World-space position.
    pub position: [f32; 3],
    /// Atlas texture coordinate.
    pub uv: [f32; 2],
    /// Linear RGBA.
    pub color: [f32; 4],
}

/// Reusable geometry buffer for one billboard batch.
#[derive(Debug, Default)]
pub struct BillboardBatcher {
    vertices: Vec<BillboardVertex>,
}

impl BillboardBatcher {
    /// Create an empty batcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Preallocate room for `particles` quads.
    pub fn with_capacity(particles: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(particles.saturating_mul(4)),
        }
    }

    /// Rebuild the vertex buffer for `particles`. Removed particles are skipped.
    ///
    /// Returns the number of quads written.
    pub fn build(
        &mut self,
        particles: &[Box<dyn BillboardParticle>],
        view: &ViewBasis,
        partial_tick: f32,
    ) -> usize {
        self.vertices.clear();
        for particle in particles {
            if particle.lifetime().is_removed() {
                continue;
            }
            let center = particle
                .previous_position()
                .lerp(particle.position(), partial_tick);
            let look = particle.appearance(partial_tick);
            push_quad(&mut self.vertices, center, view, look.scale, look.uv, [
                look.color[0],
                look.color[1],
                look.color[2],
                look.alpha,
            ]);
        }
        self.vertices.len() / 4
    }

    /// Build and submit the batch as a single alpha-blended draw call with
    /// `material` bound. Empty batches submit nothing. The backend's drawing
    /// state is restored afterwards.
    pub fn submit(
        &mut self,
        particles: &[Box<dyn BillboardParticle>],
        view: &ViewBasis,
        partial_tick: f32,
        material: MaterialKey,
        backend: &mut dyn RenderBackend,
    ) -> usize {
        let quads = self.build(particles, view, partial_tick);
        if quads > 0 {
            let vertices = &self.vertices;
            with_saved_state(backend, |backend| {
                let state = backend.state_mut();
                state.material = Some(material);
                state.blend = BlendMode::Alpha;
                backend.submit_quads(material, vertices);
            });
        }
        quads
    }

    /// Vertices from the last build.
    pub fn vertices(&self) -> &[BillboardVertex] {
        &self.vertices
    }
}

fn push_quad(
    out: &mut Vec<BillboardVertex>,
    center: Vec3,
    view: &ViewBasis,
    scale: f32,
    uv: [f32; 4],
    color: [f32; 4],
) {
    let [u0, v0, u1, v1] = uv;
    for (x, y) in CORNERS {
        let offset = (view.right * x + view.up * y) * scale;
        let u = if x < 0.0 { u0 } else { u1 };
        let v = if y < 0.0 { v1 } else { v0 };
        out.push(BillboardVertex {
            position: (center + offset).to_array(),
            uv: [u, v],
            color,
        });
    }
}
