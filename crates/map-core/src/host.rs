//! Rendering-layer seam: what the core asks of the UI host.
//!
//! The host owns every drawable resource. The core only mints follow /
//! unfollow decisions and per-tick transforms; it refers to host objects
//! through the opaque ids below and never outlives them on purpose.

use glam::{Vec2, Vec3};

/// Handle to one visual marker, minted by the host on `create_marker`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MarkerId(pub u64);

/// Handle to a display surface hosted by the UI layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u32);

/// Handle to an icon resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IconId(pub u32);

/// Handle to the marker prototype new markers are cloned from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PrototypeId(pub u32);

/// A display surface the core can place markers on: the host's identity
/// for it plus its fixed size in display units.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceBinding {
    pub id: SurfaceId,
    pub size: Vec2,
}

impl SurfaceBinding {
    pub fn new(id: SurfaceId, size: Vec2) -> Self {
        Self { id, size }
    }
}

/// UI-layer operations the registry and projector drive.
///
/// `destroy_marker` is synchronous: once it returns, the visual is gone
/// and the id must not be reused by the core.
pub trait MarkerHost {
    fn create_marker(
        &mut self,
        surface: SurfaceId,
        prototype: PrototypeId,
        icon: Option<IconId>,
    ) -> MarkerId;

    fn destroy_marker(&mut self, marker: MarkerId);

    /// Position in display units relative to the surface origin, rotation
    /// in radians about the surface normal.
    fn set_marker_transform(&mut self, marker: MarkerId, position: Vec2, rotation: f32);

    /// Same convention, applied to a whole surface. Used for the centered
    /// entity's inverse transform.
    fn set_surface_transform(&mut self, surface: SurfaceId, position: Vec2, rotation: f32);
}

/// Diagnostic drawing, world-space units.
pub trait DebugDraw {
    fn wire_box(&mut self, center: Vec3, size: Vec3);
}
