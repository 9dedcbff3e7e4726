//! Pose and projection math shared by the registry and by frontends.
//!
//! Everything here is plain value math on glam types; no scene or host
//! state is touched, which keeps the projection independently testable.

use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};

use crate::constants::{FALLBACK_EXTENT_SIZE, SCALE_EPSILON};

/// A world-space pose: translation, rotation, scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform3 {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform3 {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn from_translation_rotation(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
            scale: Vec3::ONE,
        }
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Whether the pose's world scale is (close enough to) 1 on every axis.
    /// Marker position math assumes unit scale; non-unit targets get a warning.
    #[inline]
    pub fn has_unit_scale(&self) -> bool {
        (self.scale - Vec3::ONE).abs().max_element() <= SCALE_EPSILON
    }
}

impl Default for Transform3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Axis-aligned world-space bounds: center plus half-size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extent {
    pub center: Vec3,
    pub half_size: Vec3,
}

impl Extent {
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        Self {
            center,
            half_size: size * 0.5,
        }
    }

    /// The 1x1x1 fallback used when an anchor exposes no geometry.
    pub fn unit(center: Vec3) -> Self {
        Self {
            center,
            half_size: Vec3::splat(FALLBACK_EXTENT_SIZE * 0.5),
        }
    }

    #[inline]
    pub fn size(&self) -> Vec3 {
        self.half_size * 2.0
    }
}

/// Project `target` onto a display surface using `base` as the map's frame.
///
/// Computes `relative = inverse(base) * target`, converts world units to
/// display units per axis (`surface.x / extent.x`, `surface.y / extent.z`,
/// the vertical axis dropped for the top-down view) and returns the
/// display-local position plus rotation. Display rotation is the negated
/// yaw: the surface faces the viewer, so y-axis-in becomes z-axis-out.
///
/// Peripheral markers call this with `(reference, entity)`; the centered
/// case swaps the arguments to move the whole surface inversely instead.
pub fn surface_projection(
    base: &Transform3,
    target: &Transform3,
    extent: &Extent,
    surface_size: Vec2,
) -> (Vec2, f32) {
    let relative = base.to_matrix().inverse() * target.to_matrix();
    let (_, rotation, translation) = relative.to_scale_rotation_translation();

    let world = extent.size();
    let sx = surface_size.x / world.x;
    let sz = surface_size.y / world.z;

    let position = Vec2::new(translation.x * sx, translation.z * sz);
    let (yaw, _, _) = rotation.to_euler(EulerRot::YXZ);
    (position, -yaw)
}
