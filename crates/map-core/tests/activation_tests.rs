// Reference-frame resolution tests: capability probing, degenerate
// fallbacks, and the capture-once extent lifecycle.

use glam::{Vec2, Vec3};
use map_core::{
    DebugDraw, Extent, MapConfig, MiniMap, PrototypeId, SceneWorld, SurfaceBinding, SurfaceId,
    Transform3, VolumeKind,
};

#[derive(Default)]
struct WireLog {
    boxes: Vec<(Vec3, Vec3)>,
}

impl DebugDraw for WireLog {
    fn wire_box(&mut self, center: Vec3, size: Vec3) {
        self.boxes.push((center, size));
    }
}

fn map_with_anchor(world: &SceneWorld, anchor: map_core::EntityId) -> MiniMap {
    let mut map = MiniMap::new(MapConfig {
        anchor: Some(anchor),
        centered_surface: Some(SurfaceBinding::new(SurfaceId(0), Vec2::splat(100.0))),
        peripheral_surface: Some(SurfaceBinding::new(SurfaceId(1), Vec2::splat(100.0))),
        default_icon: None,
        marker_prototype: Some(PrototypeId(0)),
    });
    map.activate(world);
    map
}

#[test]
fn render_volume_wins_over_colliders() {
    let mut world = SceneWorld::new();
    let anchor = world.spawn(Transform3::IDENTITY);
    world.attach_volume(
        anchor,
        VolumeKind::Planar,
        Extent::from_center_size(Vec3::ZERO, Vec3::splat(4.0)),
    );
    world.attach_volume(
        anchor,
        VolumeKind::Solid,
        Extent::from_center_size(Vec3::ZERO, Vec3::splat(8.0)),
    );
    world.attach_volume(
        anchor,
        VolumeKind::Render,
        Extent::from_center_size(Vec3::ZERO, Vec3::splat(16.0)),
    );

    let map = map_with_anchor(&world, anchor);
    assert_eq!(map.reference().unwrap().extent().size(), Vec3::splat(16.0));
}

#[test]
fn solid_collider_wins_over_planar() {
    let mut world = SceneWorld::new();
    let anchor = world.spawn(Transform3::IDENTITY);
    world.attach_volume(
        anchor,
        VolumeKind::Planar,
        Extent::from_center_size(Vec3::ZERO, Vec3::splat(4.0)),
    );
    world.attach_volume(
        anchor,
        VolumeKind::Solid,
        Extent::from_center_size(Vec3::ZERO, Vec3::splat(8.0)),
    );

    let map = map_with_anchor(&world, anchor);
    assert_eq!(map.reference().unwrap().extent().size(), Vec3::splat(8.0));
}

#[test]
fn anchor_without_geometry_falls_back_to_the_unit_extent() {
    let mut world = SceneWorld::new();
    let position = Vec3::new(7.0, 0.0, -3.0);
    let anchor = world.spawn(Transform3::from_translation(position));

    let map = map_with_anchor(&world, anchor);
    let extent = *map.reference().unwrap().extent();
    assert_eq!(extent.center, position);
    assert_eq!(extent.size(), Vec3::ONE);
}

#[test]
fn missing_anchor_yields_a_placeholder_frame() {
    let world = SceneWorld::new();
    let mut map = MiniMap::new(MapConfig::default());
    map.activate(&world);

    let reference = map.reference().expect("map must stay alive");
    assert_eq!(reference.anchor(), None);
    assert_eq!(reference.extent().size(), Vec3::ONE);
    assert_eq!(reference.extent().center, Vec3::ZERO);
}

#[test]
fn extent_is_only_recaptured_across_reactivation() {
    let mut world = SceneWorld::new();
    let anchor = world.spawn(Transform3::IDENTITY);
    world.attach_volume(
        anchor,
        VolumeKind::Solid,
        Extent::from_center_size(Vec3::ZERO, Vec3::splat(10.0)),
    );

    let mut map = map_with_anchor(&world, anchor);
    assert_eq!(map.reference().unwrap().extent().size(), Vec3::splat(10.0));

    // growing the volume while active changes nothing...
    world.attach_volume(
        anchor,
        VolumeKind::Solid,
        Extent::from_center_size(Vec3::ZERO, Vec3::splat(20.0)),
    );
    assert_eq!(map.reference().unwrap().extent().size(), Vec3::splat(10.0));

    // ...until the map is cycled
    map.deactivate();
    assert!(!map.is_active());
    map.activate(&world);
    assert_eq!(map.reference().unwrap().extent().size(), Vec3::splat(20.0));
}

#[test]
fn render_debug_emits_the_resolved_extent() {
    let mut world = SceneWorld::new();
    let anchor = world.spawn(Transform3::from_translation(Vec3::new(1.0, 2.0, 3.0)));
    world.attach_volume(
        anchor,
        VolumeKind::Render,
        Extent::from_center_size(Vec3::new(1.0, 2.0, 3.0), Vec3::new(30.0, 5.0, 30.0)),
    );

    let map = map_with_anchor(&world, anchor);
    let mut log = WireLog::default();
    map.render_debug(&mut log);

    assert_eq!(
        log.boxes,
        vec![(Vec3::new(1.0, 2.0, 3.0), Vec3::new(30.0, 5.0, 30.0))]
    );
}

#[test]
fn render_debug_is_silent_while_inactive() {
    let map = MiniMap::new(MapConfig::default());
    let mut log = WireLog::default();
    map.render_debug(&mut log);
    assert!(log.boxes.is_empty());
}
