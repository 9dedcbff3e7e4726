//! World-object access: stable entity handles and the scene seam.
//!
//! The registry never holds references into the host's scene graph. It
//! keys everything on [`EntityId`], an index + generation pair, so a slot
//! recycled for a new object invalidates stale handles instead of
//! silently aliasing them. Liveness is a generation comparison.

use glam::Vec3;
use smallvec::SmallVec;

use crate::transform::{Extent, Transform3};

/// Stable opaque handle to a world object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntityId {
    index: u32,
    generation: u32,
}

/// Geometry an anchor can derive its extent from, in probe priority order:
/// a render volume wins over a solid collision volume, which wins over a
/// planar one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VolumeKind {
    Render,
    Solid,
    Planar,
}

pub const VOLUME_PROBE_ORDER: [VolumeKind; 3] =
    [VolumeKind::Render, VolumeKind::Solid, VolumeKind::Planar];

/// What the core needs from the host's scene system.
pub trait WorldSource {
    /// Current world-space pose, `None` once the object is gone.
    fn world_transform(&self, entity: EntityId) -> Option<Transform3>;

    /// Extent of the given volume kind, if the entity carries one.
    fn probe_volume(&self, entity: EntityId, kind: VolumeKind) -> Option<Extent>;

    /// Whether the handle still refers to a live object.
    fn still_exists(&self, entity: EntityId) -> bool;
}

struct Body {
    transform: Transform3,
    volumes: SmallVec<[(VolumeKind, Extent); 2]>,
}

struct Slot {
    generation: u32,
    body: Option<Body>,
}

/// In-memory scene backed by a generational slot arena.
///
/// The demo frontend and the test suite use this directly; an engine
/// embedding the core would implement [`WorldSource`] over its own scene
/// graph instead.
#[derive(Default)]
pub struct SceneWorld {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl SceneWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, transform: Transform3) -> EntityId {
        let body = Body {
            transform,
            volumes: SmallVec::new(),
        };
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.body = Some(body);
                EntityId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    body: Some(body),
                });
                EntityId {
                    index,
                    generation: 0,
                }
            }
        }
    }

    /// Frees the slot and bumps its generation; stale handles go dead.
    pub fn despawn(&mut self, entity: EntityId) {
        if let Some(slot) = self.live_slot_mut(entity) {
            slot.body = None;
            slot.generation += 1;
            self.free.push(entity.index);
        }
    }

    pub fn set_transform(&mut self, entity: EntityId, transform: Transform3) {
        if let Some(body) = self.body_mut(entity) {
            body.transform = transform;
        }
    }

    pub fn attach_volume(&mut self, entity: EntityId, kind: VolumeKind, extent: Extent) {
        if let Some(body) = self.body_mut(entity) {
            body.volumes.retain(|(k, _)| *k != kind);
            body.volumes.push((kind, extent));
        }
    }

    pub fn translation(&self, entity: EntityId) -> Option<Vec3> {
        self.body(entity).map(|b| b.transform.translation)
    }

    fn body(&self, entity: EntityId) -> Option<&Body> {
        let slot = self.slots.get(entity.index as usize)?;
        if slot.generation != entity.generation {
            return None;
        }
        slot.body.as_ref()
    }

    fn body_mut(&mut self, entity: EntityId) -> Option<&mut Body> {
        let slot = self.slots.get_mut(entity.index as usize)?;
        if slot.generation != entity.generation {
            return None;
        }
        slot.body.as_mut()
    }

    fn live_slot_mut(&mut self, entity: EntityId) -> Option<&mut Slot> {
        let slot = self.slots.get_mut(entity.index as usize)?;
        (slot.generation == entity.generation && slot.body.is_some()).then_some(slot)
    }
}

impl WorldSource for SceneWorld {
    fn world_transform(&self, entity: EntityId) -> Option<Transform3> {
        self.body(entity).map(|b| b.transform)
    }

    fn probe_volume(&self, entity: EntityId, kind: VolumeKind) -> Option<Extent> {
        self.body(entity)?
            .volumes
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, extent)| *extent)
    }

    fn still_exists(&self, entity: EntityId) -> bool {
        self.body(entity).is_some()
    }
}
