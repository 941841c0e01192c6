//! End-to-end decoding through `load_map` for both map formats.

use glam::Vec3;
use tilecity_map::{Collision, DecodeError, MapFormat, Rgb, TextureTransform, load_map};

const CELLS: usize = 256 * 256;

fn push_chunk(buf: &mut Vec<u8>, tag: &[u8; 4], payload: &[u8]) {
    buf.extend_from_slice(tag);
    buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    buf.extend_from_slice(payload);
}

/// A chunked map where column (4, 9) holds one block at altitude 0.
fn chunked_map(extra: &[(&[u8; 4], Vec<u8>)]) -> Vec<u8> {
    let mut dmap = Vec::new();
    for i in 0..CELLS {
        let offset: u32 = if i == 9 * 256 + 4 { 1 } else { 0 };
        dmap.extend_from_slice(&offset.to_le_bytes());
    }
    // word 0: empty column; word 1: height 1 offset 0, then block 0
    let columns = [0u32, 1, 0];
    dmap.extend_from_slice(&(columns.len() as u32).to_le_bytes());
    for c in columns {
        dmap.extend_from_slice(&c.to_le_bytes());
    }
    dmap.extend_from_slice(&1u32.to_le_bytes());
    // left wall tile 5 solid, right wall tile 8 with mirror + one quarter turn
    for v in [5u16 | (1 << 10), 8 | (1 << 13) | (1 << 14), 0, 0, 40] {
        dmap.extend_from_slice(&v.to_le_bytes());
    }
    dmap.extend_from_slice(&[0, 9 << 2]);

    let mut data = b"GBMP".to_vec();
    data.extend_from_slice(&500u16.to_le_bytes());
    push_chunk(&mut data, b"DMAP", &dmap);
    for (tag, payload) in extra {
        push_chunk(&mut data, tag, payload);
    }
    data
}

/// A legacy map where every column holds block 1 at ground level.
fn legacy_map(record: [u8; 8]) -> Vec<u8> {
    let mut columns = Vec::new();
    columns.extend_from_slice(&5u16.to_le_bytes());
    columns.extend_from_slice(&1u16.to_le_bytes());
    let mut blocks = vec![0u8; 8];
    blocks.extend_from_slice(&record);

    let mut data = Vec::new();
    data.extend_from_slice(&331u32.to_le_bytes());
    data.extend_from_slice(&[3, 7, 0, 0]);
    for size in [0u32, 0, columns.len() as u32, blocks.len() as u32, 0] {
        data.extend_from_slice(&size.to_le_bytes());
    }
    data.extend(std::iter::repeat_n(0u8, CELLS * 4));
    data.extend_from_slice(&columns);
    data.extend_from_slice(&blocks);
    data.extend_from_slice(&[0u8; 108]);
    data
}

#[test]
fn test_chunked_map_block_faces() {
    let map = load_map(&chunked_map(&[])).unwrap();
    assert_eq!(map.format(), MapFormat::Chunked);

    let block = map.get_block(4, 9, 0).unwrap();
    let left = block.left.unwrap();
    assert_eq!(left.tile_index, 5);
    assert_eq!(left.collision, Collision::Solid);
    let right = block.right.unwrap();
    assert_eq!(right.tile_index, 8);
    assert_eq!(right.transform, TextureTransform::MirrorRotate90);
    assert!(right.flip);
    assert!(block.top.is_none());
    assert_eq!(block.lid.unwrap().tile_index, 40);
    assert_eq!(block.slope, 9);

    assert!(map.get_block(5, 9, 0).is_none());
    assert_eq!(map.occupied_cells(), 1);
}

#[test]
fn test_chunked_map_light_record() {
    let mut light = vec![255, 0, 0, 0];
    for v in [128u16, 256, 0, 128] {
        light.extend_from_slice(&v.to_le_bytes());
    }
    light.extend_from_slice(&[255, 0, 0, 0]);

    let map = load_map(&chunked_map(&[(b"LGHT", light)])).unwrap();
    let lights = map.lights();
    assert_eq!(lights.len(), 1);
    assert_eq!(lights[0].color, Rgb { r: 1.0, g: 0.0, b: 0.0 });
    assert_eq!(lights[0].radius, 1.0);
    assert_eq!(lights[0].position, Vec3::new(1.0, 2.0, 0.0));
}

#[test]
fn test_chunked_map_unknown_chunk_is_ignored() {
    let map = load_map(&chunked_map(&[(b"ZZZZ", vec![0xAB; 17])])).unwrap();
    assert!(map.get_block(4, 9, 0).is_some());
}

#[test]
fn test_legacy_map_every_column_filled() {
    // typeMap: flat, slope 2; ext: remap 1; left 5, right 0, top 0, bottom 0, lid 12
    let type_map: u16 = (1 << 7) | (2 << 8);
    let [lo, hi] = type_map.to_le_bytes();
    let map = load_map(&legacy_map([lo, hi, 1 << 3, 5, 0, 0, 0, 12])).unwrap();

    assert_eq!(map.format(), MapFormat::Legacy);
    assert_eq!(map.max_altitude(), 6);
    assert_eq!(map.style_index(), 3);
    assert_eq!(map.sample_index(), 7);
    assert_eq!(map.occupied_cells(), CELLS);

    let block = map.get_block(200, 17, 0).unwrap();
    assert_eq!(block.left.unwrap().tile_index, 5);
    assert!(block.left.unwrap().transparent);
    assert!(block.right.is_none());
    assert_eq!(block.slope, 2);
    let lid = block.lid.unwrap();
    assert_eq!(lid.tile_index, 12);
    assert_eq!(lid.light_level, 1);
    assert!(map.get_block(200, 17, 1).is_none());
}

#[test]
fn test_legacy_header_with_unknown_version() {
    let mut data = legacy_map([0; 8]);
    data[..4].copy_from_slice(&1u32.to_le_bytes());
    assert_eq!(
        load_map(&data).unwrap_err(),
        DecodeError::UnsupportedVersion {
            expected: 331,
            found: 1
        }
    );

    let mut header = 1u32.to_le_bytes().to_vec();
    header.extend_from_slice(&[0u8; 24]);
    assert!(matches!(
        load_map(&header),
        Err(DecodeError::UnsupportedVersion { found: 1, .. })
    ));
}

#[test]
fn test_unrecognized_buffer() {
    assert!(matches!(
        load_map(b"JUNKJUNK"),
        Err(DecodeError::UnsupportedVersion { .. })
    ));
    assert!(matches!(
        load_map(&[]),
        Err(DecodeError::OutOfBounds { .. })
    ));
}

#[test]
fn test_truncated_chunked_grid() {
    let mut data = chunked_map(&[]);
    data.truncate(data.len() - 3);
    assert!(load_map(&data).is_err());
}
