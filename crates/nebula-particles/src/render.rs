//! Rendering seam: the shared drawing state, the backend trait the host
//! implements, and the camera basis used to orient billboards.

use glam::{Mat4, Quat, Vec3};

use crate::billboard::BillboardVertex;

/// Opaque key identifying a material (texture + pipeline) on the backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize)]
pub struct MaterialKey(pub u64);

/// Blend equation for subsequent submissions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlendMode {
    /// No blending.
    #[default]
    Opaque,
    /// Standard alpha blending.
    Alpha,
    /// Additive blending, for glows.
    Additive,
}

/// Global drawing state shared by every effect draw call.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawState {
    /// Bound material, if any.
    pub material: Option<MaterialKey>,
    /// Active blend mode.
    pub blend: BlendMode,
    /// Model transform applied to submitted geometry.
    pub transform: Mat4,
    /// RGBA multiplier.
    pub tint: [f32; 4],
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            material: None,
            blend: BlendMode::Opaque,
            transform: Mat4::IDENTITY,
            tint: [1.0; 4],
        }
    }
}

/// Backend the scheduler and effects draw through.
pub trait RenderBackend {
    /// Current drawing state.
    fn state(&self) -> &DrawState;

    /// Mutable drawing state.
    fn state_mut(&mut self) -> &mut DrawState;

    /// Issue one draw submission of quads (four vertices each) with `material`.
    fn submit_quads(&mut self, material: MaterialKey, vertices: &[BillboardVertex]);
}

/// Run `f` and restore the backend's drawing state afterwards, whatever `f` changed.
pub fn with_saved_state<R>(
    backend: &mut dyn RenderBackend,
    f: impl FnOnce(&mut dyn RenderBackend) -> R,
) -> R {
    let saved = backend.state().clone();
    let result = f(&mut *backend);
    *backend.state_mut() = saved;
    result
}

/// Camera position and screen-aligned axes for billboard orientation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewBasis {
    /// Camera position.
    pub position: Vec3,
    /// Screen-right axis in world space.
    pub right: Vec3,
    /// Screen-up axis in world space.
    pub up: Vec3,
}

impl ViewBasis {
    /// Basis for a camera at `position` oriented by `rotation`.
    pub fn from_camera(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            right: rotation * Vec3::X,
            up: rotation * Vec3::Y,
        }
    }
}

impl Default for ViewBasis {
    fn default() -> Self {
        Self::from_camera(Vec3::ZERO, Quat::IDENTITY)
    }
}

/// One recorded draw submission.
#[derive(Clone, Debug, PartialEq)]
pub struct Submission {
    /// Material the quads were submitted with.
    pub material: MaterialKey,
    /// Drawing state at submission time.
    pub state: DrawState,
    /// Submitted vertices.
    pub vertices: Vec<BillboardVertex>,
}

impl Submission {
    /// Number of quads in the submission.
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }
}

/// Backend that records submissions instead of talking to a GPU.
///
/// Used by headless hosts and tests.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    state: DrawState,
    submissions: Vec<Submission>,
}

impl RecordingBackend {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Submissions recorded since the last [`clear`](Self::clear).
    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }

    /// Forget recorded submissions, keeping the drawing state.
    pub fn clear(&mut self) {
        self.submissions.clear();
    }
}

impl RenderBackend for RecordingBackend {
    fn state(&self) -> &DrawState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut DrawState {
        &mut self.state
    }

    fn submit_quads(&mut self, material: MaterialKey, vertices: &[BillboardVertex]) {
        self.submissions.push(Submission {
            material,
            state: self.state.clone(),
            vertices: vertices.to_vec(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saved_state_is_restored() {
        let mut backend = RecordingBackend::new();
        backend.state_mut().blend = BlendMode::Alpha;

        let returned = with_saved_state(&mut backend, |b| {
            b.state_mut().blend = BlendMode::Additive;
            b.state_mut().material = Some(MaterialKey(7));
            b.state_mut().transform = Mat4::from_translation(Vec3::ONE);
            42
        });

        assert_eq!(returned, 42);
        assert_eq!(backend.state().blend, BlendMode::Alpha);
        assert_eq!(backend.state().material, None);
        assert_eq!(backend.state().transform, Mat4::IDENTITY);
    }

    #[test]
    fn test_recording_captures_state() {
        let mut backend = RecordingBackend::new();
        backend.state_mut().blend = BlendMode::Additive;
        backend.submit_quads(MaterialKey(3), &[BillboardVertex::default(); 8]);

        let submissions = backend.submissions();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].material, MaterialKey(3));
        assert_eq!(submissions[0].state.blend, BlendMode::Additive);
        assert_eq!(submissions[0].quad_count(), 2);

        backend.clear();
        assert!(backend.submissions().is_empty());
    }

    #[test]
    fn test_view_basis_follows_rotation() {
        let view = ViewBasis::from_camera(
            Vec3::ZERO,
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
        );
        assert!((view.right - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
        assert!((view.up - Vec3::Y).length() < 1e-5);
    }
}
