//! End-to-end export tests against fixture files on disk.

use raveler_exporter::{
    decode_bodies, Compression, ExportConfig, ExportError, Exporter, SlabShape, TableError,
};

use super::test_utils::{list_files, write_gray16_png, write_map, write_rgb24_png, Fixture};

fn small_config(fixture: &Fixture) -> ExportConfig {
    ExportConfig {
        slab: SlabShape::new(2, 2, 2),
        outdir: Some(fixture.output_dir()),
        ..ExportConfig::default()
    }
}

fn read_slab(fixture: &Fixture, name: &str, compression: Compression) -> Vec<u64> {
    let data = std::fs::read(fixture.output_dir().join(name)).unwrap();
    let raw_len = match compression {
        Compression::None => data.len(),
        // 2x2x2 voxels of 8 bytes
        _ => 64,
    };
    let raw = compression.codec().decompress(&data, raw_len).unwrap();
    decode_bodies(&raw).unwrap()
}

// =============================================================================
// Label Resolution
// =============================================================================

#[tokio::test]
async fn test_two_hop_resolution() {
    let fixture = Fixture::new("two-hop");
    fixture.add_slice(0, 2, 2, &[5, 7, 0, 5]);

    let summary = Exporter::new(small_config(&fixture))
        .run(&fixture.inputs())
        .await
        .unwrap();

    assert_eq!(summary.slices_processed, 1);
    assert_eq!(summary.windows_flushed, 1);
    assert_eq!(summary.slabs_written, 1);
    assert_eq!(summary.unresolved_voxels, 0);
    assert_eq!(list_files(&fixture.output_dir()), vec!["bodies-2x2x2-0_0_0.dat"]);

    let bodies = read_slab(&fixture, "bodies-2x2x2-0_0_0.dat", Compression::None);
    // Slot 1 of the window was never filled.
    assert_eq!(bodies, vec![100, 200, 0, 100, 0, 0, 0, 0]);
}

#[tokio::test]
async fn test_body_offset() {
    let fixture = Fixture::new("offset");
    fixture.add_slice(0, 2, 2, &[5, 7, 0, 5]);

    let config = ExportConfig {
        body_offset: 1000,
        ..small_config(&fixture)
    };
    Exporter::new(config).run(&fixture.inputs()).await.unwrap();

    let bodies = read_slab(&fixture, "bodies-2x2x2-0_0_0.dat", Compression::None);
    assert_eq!(&bodies[..4], &[1100, 1200, 0, 1100]);
}

#[tokio::test]
async fn test_rgb24_slices() {
    let fixture = Fixture::new("rgb24");
    write_map(
        &fixture.superpixel_to_segment,
        &[&[0, 5, 1], &[0, 0x01_02_03, 2]],
    );
    write_rgb24_png(
        &fixture.superpixel_dir.join("slice000.png"),
        2,
        1,
        &[5, 0x01_02_03],
    );

    let config = ExportConfig {
        slab: SlabShape::new(4, 4, 1),
        ..small_config(&fixture)
    };
    Exporter::new(config).run(&fixture.inputs()).await.unwrap();

    let data = std::fs::read(fixture.output_dir().join("bodies-2x1x1-0_0_0.dat")).unwrap();
    assert_eq!(decode_bodies(&data).unwrap(), vec![100, 200]);
}

#[tokio::test]
async fn test_unresolved_superpixels_become_zero() {
    let fixture = Fixture::new("unresolved");
    fixture.add_slice(0, 2, 2, &[5, 9, 9, 7]);

    let summary = Exporter::new(small_config(&fixture))
        .run(&fixture.inputs())
        .await
        .unwrap();

    assert_eq!(summary.unresolved_voxels, 2);
    let bodies = read_slab(&fixture, "bodies-2x2x2-0_0_0.dat", Compression::None);
    assert_eq!(&bodies[..4], &[100, 0, 0, 200]);
}

#[tokio::test]
async fn test_strict_rejects_unresolved_superpixels() {
    let fixture = Fixture::new("strict");
    fixture.add_slice(0, 2, 2, &[5, 9, 0, 0]);

    let config = ExportConfig {
        strict: true,
        ..small_config(&fixture)
    };
    let err = Exporter::new(config).run(&fixture.inputs()).await.unwrap_err();
    assert!(matches!(
        err,
        ExportError::UnresolvedSuperpixel { slice: 0, label: 9 }
    ));
}

#[tokio::test]
async fn test_superpixel_id_out_of_range() {
    let fixture = Fixture::new("sp-range");
    write_map(&fixture.superpixel_to_segment, &[&[0, 16_777_216, 1]]);
    fixture.add_slice(0, 1, 1, &[1]);

    let err = Exporter::new(small_config(&fixture))
        .run(&fixture.inputs())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ExportError::Table(TableError::SuperpixelRange {
            superpixel: 16_777_216,
            ..
        })
    ));
    assert!(!fixture.output_dir().join("bodies-1x1x2-0_0_0.dat").exists());
}

#[tokio::test]
async fn test_missing_segment_aborts() {
    let fixture = Fixture::new("missing-segment");
    write_map(&fixture.superpixel_to_segment, &[&[0, 5, 1], &[0, 7, 3]]);
    fixture.add_slice(0, 1, 1, &[5]);

    let err = Exporter::new(small_config(&fixture))
        .run(&fixture.inputs())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ExportError::Table(TableError::UnresolvedSegment { segment: 3, .. })
    ));
}

// =============================================================================
// Slices and Windows
// =============================================================================

#[tokio::test]
async fn test_z_range_skips_slices() {
    let fixture = Fixture::new("z-range");
    std::fs::write(fixture.superpixel_dir.join("README.txt"), b"notes").unwrap();
    write_gray16_png(
        &fixture.superpixel_dir.join("slice007.png"),
        2,
        2,
        &[5, 5, 5, 5],
    );
    fixture.add_slice(10, 2, 2, &[7, 7, 7, 7]);

    let config = ExportConfig {
        min_z: 10,
        ..small_config(&fixture)
    };
    let summary = Exporter::new(config).run(&fixture.inputs()).await.unwrap();

    assert_eq!(summary.slices_processed, 1);
    assert_eq!(summary.slices_skipped, 1);
    assert_eq!(summary.non_png_skipped, 1);
    assert_eq!(list_files(&fixture.output_dir()), vec!["bodies-2x2x2-0_0_10.dat"]);
}

#[tokio::test]
async fn test_windows_and_tiles() {
    let fixture = Fixture::new("windows");
    fixture.map_slices(0..4);
    // 3x2 image, slab 2x2x2: two tiles per window, windows at z=0 and z=2.
    for z in 0..3 {
        fixture.add_slice(z, 3, 2, &[5, 7, 5, 7, 5, 7]);
    }
    // Slices in nested directories are discovered too.
    write_gray16_png(
        &fixture.superpixel_dir.join("deep").join("sp_map.00003.png"),
        3,
        2,
        &[7, 7, 7, 7, 7, 7],
    );

    let summary = Exporter::new(small_config(&fixture))
        .run(&fixture.inputs())
        .await
        .unwrap();

    assert_eq!(summary.slices_processed, 4);
    assert_eq!(summary.windows_flushed, 2);
    assert_eq!(summary.slabs_written, 4);
    assert_eq!(summary.unresolved_voxels, 0);
    assert_eq!(
        list_files(&fixture.output_dir()),
        vec![
            "bodies-1x2x2-2_0_0.dat",
            "bodies-1x2x2-2_0_2.dat",
            "bodies-2x2x2-0_0_0.dat",
            "bodies-2x2x2-0_0_2.dat",
        ]
    );

    let edge = std::fs::read(fixture.output_dir().join("bodies-1x2x2-2_0_2.dat")).unwrap();
    // x=2 column: slice 2 is [5, 7], slice 3 is all 7
    assert_eq!(decode_bodies(&edge).unwrap(), vec![100, 200, 200, 200]);
}

#[tokio::test]
async fn test_dimension_mismatch() {
    let fixture = Fixture::new("mismatch");
    fixture.add_slice(0, 2, 2, &[5, 5, 5, 5]);
    fixture.add_slice(1, 3, 2, &[5, 5, 5, 5, 5, 5]);

    let err = Exporter::new(small_config(&fixture))
        .run(&fixture.inputs())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ExportError::DimensionMismatch {
            expected_x: 2,
            expected_y: 2,
            got_x: 3,
            got_y: 2,
            ..
        }
    ));
}

#[tokio::test]
async fn test_duplicate_slices() {
    let fixture = Fixture::new("duplicate");
    fixture.add_slice(4, 1, 1, &[5]);
    write_gray16_png(&fixture.superpixel_dir.join("other4.png"), 1, 1, &[5]);

    let err = Exporter::new(small_config(&fixture))
        .run(&fixture.inputs())
        .await
        .unwrap_err();
    assert!(matches!(err, ExportError::DuplicateSlice { z: 4, .. }));
}

#[tokio::test]
async fn test_unparseable_slice_name() {
    let fixture = Fixture::new("bad-name");
    write_gray16_png(&fixture.superpixel_dir.join("slice.png"), 1, 1, &[5]);

    let err = Exporter::new(small_config(&fixture))
        .run(&fixture.inputs())
        .await
        .unwrap_err();
    assert!(matches!(err, ExportError::FilenameParse { .. }));
}

#[tokio::test]
async fn test_zero_depth_rejected() {
    let fixture = Fixture::new("zero-depth");
    fixture.add_slice(0, 2, 2, &[5, 7, 0, 5]);

    let config = ExportConfig {
        slab: SlabShape::new(2, 2, 0),
        ..small_config(&fixture)
    };
    let err = Exporter::new(config).run(&fixture.inputs()).await.unwrap_err();
    assert!(matches!(err, ExportError::InvalidConfig(_)));
    assert!(!fixture.output_dir().exists());
}

// =============================================================================
// ROI
// =============================================================================

#[tokio::test]
async fn test_zero_roi_block_rejected() {
    let fixture = Fixture::new("zero-roi-block");
    fixture.add_slice(0, 2, 2, &[5, 7, 0, 5]);
    let roi_path = fixture.dir.join("roi.json");
    std::fs::write(&roi_path, "[[0, 0, 0, 1]]").unwrap();

    let config = ExportConfig {
        roi_block_size: 0,
        ..small_config(&fixture)
    };
    let mut inputs = fixture.inputs();
    inputs.roi = Some(roi_path);
    let err = Exporter::new(config).run(&inputs).await.unwrap_err();
    assert!(matches!(err, ExportError::InvalidConfig(_)));
}

#[tokio::test]
async fn test_roi_filters_voxels() {
    let fixture = Fixture::new("roi");
    fixture.add_slice(0, 2, 2, &[5, 7, 7, 5]);
    // Block size 1: keep (x=1, y=0) and (x=0, y=1) at z=0.
    let roi_path = fixture.dir.join("roi.json");
    std::fs::write(&roi_path, "[[0, 0, 1, 1], [0, 1, 0, 0]]").unwrap();

    let config = ExportConfig {
        roi_block_size: 1,
        ..small_config(&fixture)
    };
    let mut inputs = fixture.inputs();
    inputs.roi = Some(roi_path);
    let summary = Exporter::new(config).run(&inputs).await.unwrap();

    assert_eq!(summary.roi_excluded_voxels, 2);
    let bodies = read_slab(&fixture, "bodies-2x2x2-0_0_0.dat", Compression::None);
    assert_eq!(&bodies[..4], &[0, 200, 200, 0]);
}

#[tokio::test]
async fn test_malformed_roi_rejected() {
    let fixture = Fixture::new("bad-roi");
    fixture.add_slice(0, 1, 1, &[5]);
    let roi_path = fixture.dir.join("roi.json");
    // Out of order
    std::fs::write(&roi_path, "[[1, 0, 0, 3], [0, 0, 0, 3]]").unwrap();

    let mut inputs = fixture.inputs();
    inputs.roi = Some(roi_path);
    let err = Exporter::new(small_config(&fixture))
        .run(&inputs)
        .await
        .unwrap_err();
    assert!(matches!(err, ExportError::Roi(_)));
}

// =============================================================================
// Compression and Dry Run
// =============================================================================

#[tokio::test]
async fn test_compressed_slabs_round_trip() {
    for (compression, name) in [
        (Compression::Lz4, "bodies-2x2x2-0_0_0.dat.lz4"),
        (Compression::Gzip, "bodies-2x2x2-0_0_0.dat.gz"),
    ] {
        let fixture = Fixture::new(compression.name());
        fixture.map_slices(0..2);
        fixture.add_slice(0, 2, 2, &[5, 7, 0, 5]);
        fixture.add_slice(1, 2, 2, &[7, 7, 5, 5]);

        let config = ExportConfig {
            compression,
            ..small_config(&fixture)
        };
        let summary = Exporter::new(config).run(&fixture.inputs()).await.unwrap();
        assert_eq!(summary.raw_bytes, 64);
        assert_eq!(summary.unresolved_voxels, 0);

        assert_eq!(list_files(&fixture.output_dir()), vec![name]);
        let bodies = read_slab(&fixture, name, compression);
        assert_eq!(bodies, vec![100, 200, 0, 100, 200, 200, 100, 100]);
    }
}

#[tokio::test]
async fn test_dry_run_writes_nothing() {
    let fixture = Fixture::new("dry-run");
    fixture.add_slice(0, 2, 2, &[5, 7, 0, 5]);

    let config = ExportConfig {
        dry_run: true,
        ..small_config(&fixture)
    };
    let summary = Exporter::new(config).run(&fixture.inputs()).await.unwrap();

    assert_eq!(summary.slabs_written, 1);
    assert!(!fixture.output_dir().exists());
}
