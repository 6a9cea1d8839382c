use alphasort::{
    parse_settings,
    types::{glam::{Mat4, Vec3}, Aabb, SortSettingsChange, Sorting},
    SortOutcome, SortState, TransparencySorter, TriangleMesh,
};
use anyhow::Context;

/// Drives the sorter the way a render loop would: camera callbacks followed by
/// one `sort_if_stale` per frame.
#[test]
pub fn frame_loop() -> anyhow::Result<()> {
    let settings = parse_settings("camera_epsilon = 0.01").context("Failed to parse settings")?;
    let mut sorter = TransparencySorter::new(settings);

    let glass = sorter.add_object(Aabb::from_center_half_extents(Vec3::new(0.0, 0.0, 100.0), Vec3::ONE));
    let smoke = sorter.add_object(Aabb::from_center_half_extents(Vec3::new(0.0, 0.0, -100.0), Vec3::ONE));
    let fan = sorter.add_mesh(
        TriangleMesh::new(
            vec![
                Vec3::new(-1.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(-1.0, 0.0, 5.0),
                Vec3::new(1.0, 0.0, 5.0),
                Vec3::new(0.0, 1.0, 5.0),
            ],
            vec![3, 4, 5, 0, 1, 2],
        )
        .context("Failed to build mesh")?,
    );

    // First frame after load.
    sorter.set_camera_view(Mat4::look_at_rh(Vec3::new(0.0, 0.0, 500.0), Vec3::ZERO, Vec3::Y));
    assert_eq!(sorter.sort_if_stale(), SortOutcome::Sorted { changed: true });
    assert_eq!(sorter.queue().handles().collect::<Vec<_>>(), [smoke, glass]);
    assert_eq!(sorter.mesh(fan).map(TriangleMesh::indices), Some(&[0, 1, 2, 3, 4, 5][..]));

    // Idle frames do no work.
    for _ in 0..3 {
        assert_eq!(sorter.sort_if_stale(), SortOutcome::Skipped);
    }

    // Jitter below the epsilon.
    sorter.set_camera_location(Vec3::new(0.0, 0.001, 500.0));
    assert_eq!(sorter.state(), SortState::Sorted);

    // Orbit to the other side.
    sorter.set_camera_view(Mat4::look_at_rh(Vec3::new(0.0, 0.0, -500.0), Vec3::ZERO, Vec3::Y));
    assert!(sorter.sort_if_stale().changed());
    assert_eq!(sorter.queue().handles().collect::<Vec<_>>(), [glass, smoke]);
    assert_eq!(sorter.mesh(fan).map(TriangleMesh::indices), Some(&[3, 4, 5, 0, 1, 2][..]));

    // A UI toggle switches to opaque style ordering.
    sorter.apply_change(SortSettingsChange {
        sorting: Some(Sorting::FrontToBack),
        ..Default::default()
    });
    assert!(sorter.force_sort().changed());
    assert_eq!(sorter.queue().handles().collect::<Vec<_>>(), [smoke, glass]);

    let statistics = sorter.statistics();
    assert_eq!(statistics.sorts_performed, 3);
    assert_eq!(statistics.sorts_skipped, 3);
    assert_eq!(statistics.orders_changed, 3);

    Ok(())
}
