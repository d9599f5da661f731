mod common;

use common::fixtures::{init_logger, mtime, params, set_mtime, snapshot, write_parcel};
use std::path::Path;
use std::time::{Duration, SystemTime};
use tile_pyramid::overlay::GRID_LINE_COLOR;
use tile_pyramid::{build, BuildMode, GridCoordinate, Layer, TileCoordinate};

/// Path of a tile relative to the output directory.
fn tile_file(layer: Layer, z: u32, x: u32, y: u32) -> std::path::PathBuf {
    Path::new(layer.dir_name())
        .join(z.to_string())
        .join(x.to_string())
        .join(format!("{y}.png"))
}

/// Zmax = 1, N = 2: two parcels present, two slots still empty.
#[test]
fn toy_world_builds_then_rebuilds_only_the_touched_branch() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let parcels = dir.path().join("parcels");
    let out = dir.path().join("world");
    std::fs::create_dir(&parcels).unwrap();
    let params = params(2, 1);

    // Leaf (1,0,0) is the top-left slot (row 1, "B1"); (1,0,1) is "A1".
    assert_eq!(
        params.geometry.encode(GridCoordinate::new(1, 0)),
        Some(TileCoordinate::new(1, 0, 0))
    );
    assert_eq!(
        params.geometry.encode(GridCoordinate::new(0, 0)),
        Some(TileCoordinate::new(1, 0, 1))
    );
    let p00 = write_parcel(&parcels, "tile-B1.png", [250, 20, 20]);
    write_parcel(&parcels, "tile-A1.png", [20, 20, 250]);

    let first = build(&parcels, &out, BuildMode::Incremental, &params).unwrap();
    assert!(first.is_success());
    assert_eq!(first.parcels_found, 2);
    let images = &first.images;
    assert_eq!((images.leaf.rebuilt, images.leaf.placeholders_created), (2, 2));
    assert_eq!(images.levels.len(), 1);
    assert_eq!(images.levels[0].zoom, 0);
    assert_eq!(images.levels[0].rebuilt, 1);
    // Every slot of the 2x2 grid is near the centre and gets a label.
    let labels = first.labels.as_ref().unwrap();
    assert_eq!((labels.leaf.rebuilt, labels.levels[0].rebuilt), (4, 1));

    let root = image::open(out.join(tile_file(Layer::Images, 0, 0, 0))).unwrap().into_rgba8();
    assert_eq!(root.dimensions(), (4, 4));
    // Left half carries the two parcels, right half the transparent placeholders.
    assert_eq!(root.get_pixel(0, 0).0[3], 255);
    assert_eq!(root.get_pixel(0, 3).0[3], 255);
    assert_eq!(root.get_pixel(3, 0).0, [0, 0, 0, 0]);
    assert_eq!(root.get_pixel(3, 3).0, [0, 0, 0, 0]);
    let label = image::open(out.join(tile_file(Layer::Labels, 1, 0, 0))).unwrap().into_rgba8();
    assert_eq!(label.get_pixel(0, 0).0, GRID_LINE_COLOR.0);
    assert_eq!(label.get_pixel(1, 1).0, [0, 0, 0, 0]);
    assert!(out.join(tile_file(Layer::Labels, 0, 0, 0)).exists());

    let second = build(&parcels, &out, BuildMode::Incremental, &params).unwrap();
    assert_eq!(second.total_written(), 0);
    assert_eq!(second.images.leaf.up_to_date, 4);
    assert_eq!(second.images.levels[0].up_to_date, 1);

    let before = snapshot(&out);
    let touched = SystemTime::now() + Duration::from_secs(30);
    set_mtime(&p00, touched);

    let third = build(&parcels, &out, BuildMode::Incremental, &params).unwrap();
    assert!(third.is_success());
    assert_eq!((third.images.leaf.rebuilt, third.images.leaf.up_to_date), (1, 3));
    assert_eq!(third.images.levels[0].rebuilt, 1);
    assert!(third.labels.as_ref().unwrap().phases().all(|p| p.written() == 0));

    let after = snapshot(&out);
    let untouched = [
        tile_file(Layer::Images, 1, 0, 1),
        tile_file(Layer::Images, 1, 1, 0),
        tile_file(Layer::Images, 1, 1, 1),
    ];
    for path in &untouched {
        assert_eq!(before[path], after[path], "{}", path.display());
    }
    for (path, state) in before.iter().filter(|(p, _)| p.starts_with("labels")) {
        assert_eq!(state, &after[path], "{}", path.display());
    }
    let leaf = tile_file(Layer::Images, 1, 0, 0);
    assert_eq!(before[&leaf].bytes, after[&leaf].bytes);
    assert!(after[&leaf].mtime >= mtime(&p00));
    let root = tile_file(Layer::Images, 0, 0, 0);
    assert_ne!(before[&root].mtime, after[&root].mtime);
    assert!(after[&root].mtime >= after[&leaf].mtime);
}

#[test]
fn summary_serializes_per_phase_counts() {
    let dir = tempfile::tempdir().unwrap();
    let parcels = dir.path().join("parcels");
    std::fs::create_dir(&parcels).unwrap();
    write_parcel(&parcels, "tile-A1.png", [10, 200, 10]);

    let summary = build(&parcels, &dir.path().join("world"), BuildMode::Force, &params(2, 1)).unwrap();
    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["mode"], "force");
    assert_eq!(json["images"]["layer"], "images");
    assert_eq!(json["images"]["leaf"]["rebuilt"], 1);
    assert_eq!(json["images"]["leaf"]["placeholdersCreated"], 3);
    assert_eq!(json["images"]["levels"][0]["zoom"], 0);
    assert_eq!(json["labels"]["leaf"]["rebuilt"], 4);
    // wipe + two levels per layer
    assert_eq!(json["timing"]["stages"].as_array().unwrap().len(), 5);
    assert_eq!(json["timing"]["stages"][0]["stage"], "wipe");
}
