//! The minimap itself: reference frame resolution, the tracked-entity
//! registry, and the per-tick projection pass.
//!
//! One entity may be followed *centered*: its marker stays pinned at the
//! display origin and the peripheral surface is moved inversely around
//! it. Everything else is *peripheral*: markers move freely across the
//! surface. An entity is never in both roles at once; follow calls
//! unfollow any prior association before creating a marker, so the
//! one-marker-per-entity invariant needs no separate duplicate check.

use fnv::FnvHashMap;
use smallvec::SmallVec;

use crate::error::{Dependency, MapError};
use crate::host::{DebugDraw, IconId, MarkerHost, MarkerId, PrototypeId, SurfaceBinding};
use crate::scene::{EntityId, WorldSource, VOLUME_PROBE_ORDER};
use crate::transform::{surface_projection, Extent, Transform3};

/// Construction-time wiring. All fields optional: a map with no surfaces
/// stays inert (follow calls fail loudly, ticks do nothing harmful).
#[derive(Clone, Copy, Debug, Default)]
pub struct MapConfig {
    /// World anchor the reference frame is resolved from.
    pub anchor: Option<EntityId>,
    /// Surface hosting the single pinned marker.
    pub centered_surface: Option<SurfaceBinding>,
    /// Surface hosting all free-moving markers.
    pub peripheral_surface: Option<SurfaceBinding>,
    /// Icon used when a follow call passes none.
    pub default_icon: Option<IconId>,
    /// Prototype new markers are cloned from.
    pub marker_prototype: Option<PrototypeId>,
}

/// The map's origin and scale basis, resolved once on activation.
///
/// The extent is cached for the whole session; the anchor's pose is
/// re-read live every tick. The pose captured here only serves as a
/// fallback if the anchor is freed while the map stays active.
#[derive(Clone, Copy, Debug)]
pub struct ReferenceFrame {
    anchor: Option<EntityId>,
    captured_pose: Transform3,
    extent: Extent,
}

impl ReferenceFrame {
    pub fn anchor(&self) -> Option<EntityId> {
        self.anchor
    }

    pub fn extent(&self) -> &Extent {
        &self.extent
    }

    fn live_pose(&self, scene: &impl WorldSource) -> Transform3 {
        self.anchor
            .and_then(|anchor| scene.world_transform(anchor))
            .unwrap_or(self.captured_pose)
    }
}

pub struct MiniMap {
    config: MapConfig,
    reference: Option<ReferenceFrame>,
    centered: Option<(EntityId, MarkerId)>,
    peripheral: FnvHashMap<EntityId, MarkerId>,
}

impl MiniMap {
    pub fn new(config: MapConfig) -> Self {
        Self {
            config,
            reference: None,
            centered: None,
            peripheral: FnvHashMap::default(),
        }
    }

    /// Resolves the reference frame from the configured anchor.
    ///
    /// The anchor's extent comes from the first geometry it exposes, in
    /// probe order (render volume, then solid, then planar collision
    /// volume). An anchor with no geometry gets the unit extent and a
    /// warning: the map keeps running, but projections are mis-scaled.
    /// With no anchor configured at all, a placeholder identity frame
    /// with the unit extent keeps the map alive.
    pub fn activate(&mut self, scene: &impl WorldSource) {
        self.reference = Some(resolve_reference(self.config.anchor, scene));
    }

    /// Drops the resolved frame. Reactivating re-derives it; this is the
    /// only way the cached extent is ever re-captured.
    pub fn deactivate(&mut self) {
        self.reference = None;
    }

    pub fn is_active(&self) -> bool {
        self.reference.is_some()
    }

    pub fn reference(&self) -> Option<&ReferenceFrame> {
        self.reference.as_ref()
    }

    /// Follows `entity` as the centered one: its marker sits at the
    /// display origin and the world pans around it. Replaces any previous
    /// centered entity and any prior association of `entity` itself.
    pub fn follow_centered(
        &mut self,
        scene: &impl WorldSource,
        host: &mut impl MarkerHost,
        entity: EntityId,
        icon: Option<IconId>,
    ) -> Result<MarkerId, MapError> {
        let surface = self
            .config
            .centered_surface
            .ok_or(MapError::MissingDependency(Dependency::CenteredSurface))?;
        let prototype = self
            .config
            .marker_prototype
            .ok_or(MapError::MissingDependency(Dependency::MarkerPrototype))?;

        if let Some(pose) = scene.world_transform(entity) {
            if !pose.has_unit_scale() {
                log::warn!(
                    "[map] centered target has world scale {:?}; marker positions will be off",
                    pose.scale
                );
            }
        }

        if let Some((previous, _)) = self.centered {
            self.unfollow(host, previous);
        }
        self.unfollow(host, entity);

        let marker = host.create_marker(surface.id, prototype, icon.or(self.config.default_icon));
        self.centered = Some((entity, marker));
        Ok(marker)
    }

    /// Follows `entity` as a peripheral one. Any prior association,
    /// centered or peripheral, is removed first, so one entity never
    /// owns two markers.
    pub fn follow(
        &mut self,
        host: &mut impl MarkerHost,
        entity: EntityId,
        icon: Option<IconId>,
    ) -> Result<MarkerId, MapError> {
        let surface = self
            .config
            .peripheral_surface
            .ok_or(MapError::MissingDependency(Dependency::PeripheralSurface))?;
        let prototype = self
            .config
            .marker_prototype
            .ok_or(MapError::MissingDependency(Dependency::MarkerPrototype))?;

        self.unfollow(host, entity);

        let marker = host.create_marker(surface.id, prototype, icon.or(self.config.default_icon));
        self.peripheral.insert(entity, marker);
        Ok(marker)
    }

    /// Stops tracking `entity` and destroys its marker. No-op when the
    /// entity is not tracked.
    pub fn unfollow(&mut self, host: &mut impl MarkerHost, entity: EntityId) {
        match self.centered {
            Some((tracked, marker)) if tracked == entity => {
                host.destroy_marker(marker);
                self.centered = None;
            }
            _ => {
                if let Some(marker) = self.peripheral.remove(&entity) {
                    host.destroy_marker(marker);
                }
            }
        }
    }

    /// Unfollows everything: the centered entity first, then every
    /// peripheral one. Safe with nothing tracked.
    pub fn clear_all(&mut self, host: &mut impl MarkerHost) {
        if let Some((entity, _)) = self.centered {
            self.unfollow(host, entity);
        }
        let tracked: SmallVec<[EntityId; 8]> = self.peripheral.keys().copied().collect();
        for entity in tracked {
            self.unfollow(host, entity);
        }
    }

    /// Per-frame projection pass. Centered association first (it moves
    /// the whole peripheral surface), then each peripheral marker. An
    /// entity freed externally without `unfollow` is skipped for the
    /// tick, never removed here; one bad association does not abort the
    /// rest of the pass.
    pub fn tick(&self, scene: &impl WorldSource, host: &mut impl MarkerHost) {
        let Some(reference) = &self.reference else {
            return;
        };
        let reference_pose = reference.live_pose(scene);

        if let (Some((entity, _)), Some(surface)) = (self.centered, self.config.peripheral_surface)
        {
            if scene.still_exists(entity) {
                if let Some(pose) = scene.world_transform(entity) {
                    // The pinned marker never moves; the surface under the
                    // peripheral markers gets the inverse transform instead.
                    let (position, rotation) =
                        surface_projection(&pose, &reference_pose, &reference.extent, surface.size);
                    host.set_surface_transform(surface.id, position, rotation);
                }
            }
        }

        if let Some(surface) = self.config.peripheral_surface {
            for (&entity, &marker) in &self.peripheral {
                if !scene.still_exists(entity) {
                    continue;
                }
                let Some(pose) = scene.world_transform(entity) else {
                    continue;
                };
                let (position, rotation) =
                    surface_projection(&reference_pose, &pose, &reference.extent, surface.size);
                host.set_marker_transform(marker, position, rotation);
            }
        }
    }

    /// Draws the resolved extent as a wire box. Diagnostic only.
    pub fn render_debug(&self, draw: &mut impl DebugDraw) {
        if let Some(reference) = &self.reference {
            draw.wire_box(reference.extent.center, reference.extent.size());
        }
    }

    // ---------------- Introspection ----------------

    pub fn centered_entity(&self) -> Option<EntityId> {
        self.centered.map(|(entity, _)| entity)
    }

    pub fn is_tracked(&self, entity: EntityId) -> bool {
        self.marker_of(entity).is_some()
    }

    pub fn marker_of(&self, entity: EntityId) -> Option<MarkerId> {
        match self.centered {
            Some((tracked, marker)) if tracked == entity => Some(marker),
            _ => self.peripheral.get(&entity).copied(),
        }
    }

    pub fn peripheral_count(&self) -> usize {
        self.peripheral.len()
    }
}

fn resolve_reference(anchor: Option<EntityId>, scene: &impl WorldSource) -> ReferenceFrame {
    let Some(anchor) = anchor else {
        log::warn!("[map] no anchor configured; using an identity frame with the unit extent");
        return ReferenceFrame {
            anchor: None,
            captured_pose: Transform3::IDENTITY,
            extent: Extent::unit(glam::Vec3::ZERO),
        };
    };

    let captured_pose = scene.world_transform(anchor).unwrap_or_else(|| {
        log::warn!("[map] anchor no longer exists at activation; using an identity pose");
        Transform3::IDENTITY
    });

    let extent = VOLUME_PROBE_ORDER
        .iter()
        .find_map(|&kind| scene.probe_volume(anchor, kind));
    let extent = extent.unwrap_or_else(|| {
        log::warn!(
            "[map] anchor exposes no render or collision volume; \
             falling back to the unit extent, projections will be mis-scaled"
        );
        Extent::unit(captured_pose.translation)
    });

    ReferenceFrame {
        anchor: Some(anchor),
        captured_pose,
        extent,
    }
}
