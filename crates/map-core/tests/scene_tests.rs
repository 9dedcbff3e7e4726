// Tests for the generational entity arena backing the scene seam.

use glam::Vec3;
use map_core::{Extent, SceneWorld, Transform3, VolumeKind, WorldSource};

#[test]
fn despawned_handles_go_dead() {
    let mut world = SceneWorld::new();
    let e = world.spawn(Transform3::from_translation(Vec3::X));
    assert!(world.still_exists(e));

    world.despawn(e);
    assert!(!world.still_exists(e));
    assert_eq!(world.world_transform(e), None);
    assert_eq!(world.translation(e), None);
}

#[test]
fn recycled_slots_do_not_resurrect_stale_handles() {
    // Property: a handle to a despawned entity stays dead even after its
    // slot is reused for a new one.
    let mut world = SceneWorld::new();
    let old = world.spawn(Transform3::IDENTITY);
    world.despawn(old);

    let new = world.spawn(Transform3::from_translation(Vec3::Z));
    assert_ne!(old, new);
    assert!(world.still_exists(new));
    assert!(!world.still_exists(old));
    assert_eq!(world.world_transform(old), None);
}

#[test]
fn writes_through_stale_handles_are_ignored() {
    let mut world = SceneWorld::new();
    let old = world.spawn(Transform3::IDENTITY);
    world.despawn(old);
    let new = world.spawn(Transform3::IDENTITY);

    world.set_transform(old, Transform3::from_translation(Vec3::splat(9.0)));
    assert_eq!(world.world_transform(new), Some(Transform3::IDENTITY));

    world.attach_volume(
        old,
        VolumeKind::Solid,
        Extent::from_center_size(Vec3::ZERO, Vec3::ONE),
    );
    assert_eq!(world.probe_volume(new, VolumeKind::Solid), None);
}

#[test]
fn attaching_a_volume_replaces_the_previous_one_of_its_kind() {
    let mut world = SceneWorld::new();
    let e = world.spawn(Transform3::IDENTITY);
    world.attach_volume(
        e,
        VolumeKind::Solid,
        Extent::from_center_size(Vec3::ZERO, Vec3::splat(2.0)),
    );
    world.attach_volume(
        e,
        VolumeKind::Solid,
        Extent::from_center_size(Vec3::ZERO, Vec3::splat(6.0)),
    );

    let extent = world.probe_volume(e, VolumeKind::Solid).unwrap();
    assert_eq!(extent.size(), Vec3::splat(6.0));

    // other kinds are untouched
    assert_eq!(world.probe_volume(e, VolumeKind::Render), None);
}

#[test]
fn transforms_update_in_place() {
    let mut world = SceneWorld::new();
    let e = world.spawn(Transform3::IDENTITY);
    world.set_transform(e, Transform3::from_translation(Vec3::new(1.0, 2.0, 3.0)));
    assert_eq!(world.translation(e), Some(Vec3::new(1.0, 2.0, 3.0)));
}
