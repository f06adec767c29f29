use std::thread;

use pretty_assertions::assert_eq;
use rstest::rstest;
use tile_codec::{
    MAX_TILE_ID, MAX_TILE_ID_ZOOM, MAX_ZOOM, TileCoord, base_offset, parent_id, quadkey_to_xyz,
    tile_id_from_zxy, xyz_to_quadkey, zoom_tile_ids, zxy_from_tile_id,
};

/// Deterministic tiles spread over a zoom level: the four corners plus pseudo-random samples.
fn sample_tiles(z: u8, count: usize) -> Vec<(u32, u32)> {
    let max = u32::try_from((1_u64 << z) - 1).unwrap();
    let mut tiles = vec![(0, 0), (max, 0), (0, max), (max, max)];
    let mut state = 0x9E37_79B9_7F4A_7C15_u64 ^ u64::from(z);
    for _ in 0..count {
        // xorshift64
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let x = u32::try_from((state >> 32) % (u64::from(max) + 1)).unwrap();
        let y = u32::try_from((state & 0xFFFF_FFFF) % (u64::from(max) + 1)).unwrap();
        tiles.push((x, y));
    }
    tiles
}

#[test]
fn quadkey_round_trip_every_zoom() {
    for z in 0..=MAX_ZOOM {
        for (x, y) in sample_tiles(z, 200) {
            let quadkey = xyz_to_quadkey(x, y, z);
            assert_eq!(quadkey.len(), usize::from(z));
            assert_eq!(quadkey_to_xyz(&quadkey).unwrap(), (x, y, z), "{quadkey}");
        }
    }
}

#[test]
fn quadkey_round_trip_low_zoom_exhaustive() {
    for z in 0..=5 {
        for x in 0..1 << z {
            for y in 0..1 << z {
                let quadkey = xyz_to_quadkey(x, y, z);
                assert_eq!(quadkey_to_xyz(&quadkey).unwrap(), (x, y, z));
            }
        }
    }
}

#[test]
fn parent_quadkey_is_prefix() {
    for z in 1..=MAX_ZOOM {
        for (x, y) in sample_tiles(z, 20) {
            let tile = TileCoord::new(z, x, y).unwrap();
            let parent = tile.parent().unwrap();
            assert!(tile.quadkey().starts_with(&parent.quadkey()), "{tile}");
        }
    }
}

#[test]
fn tile_id_round_trip_every_zoom() {
    for z in 0..=MAX_TILE_ID_ZOOM {
        let range = zoom_tile_ids(z).unwrap();
        for (x, y) in sample_tiles(z, 200) {
            let id = tile_id_from_zxy(z, x, y).unwrap();
            assert!(range.contains(&id), "{z}/{x}/{y} -> {id}");
            assert_eq!(zxy_from_tile_id(id).unwrap(), (z, x, y));
        }
    }
}

#[test]
fn tile_ids_fill_each_zoom_exactly() {
    for z in 0..=8 {
        let mut ids = Vec::new();
        for x in 0..1 << z {
            for y in 0..1 << z {
                ids.push(tile_id_from_zxy(z, x, y).unwrap());
            }
        }
        ids.sort_unstable();
        assert_eq!(ids, zoom_tile_ids(z).unwrap().collect::<Vec<_>>());
    }
}

#[test]
fn tile_ids_increase_with_zoom() {
    for z in 0..MAX_TILE_ID_ZOOM {
        let current = zoom_tile_ids(z).unwrap();
        let next = zoom_tile_ids(z + 1).unwrap();
        assert_eq!(current.end, next.start);
        assert!(tile_id_from_zxy(z, (1 << z) - 1, 0).unwrap() < next.start);
    }
    assert_eq!(zoom_tile_ids(MAX_TILE_ID_ZOOM).unwrap().end - 1, MAX_TILE_ID);
}

#[test]
fn parent_id_matches_parent_tile() {
    for z in 1..=MAX_TILE_ID_ZOOM {
        for (x, y) in sample_tiles(z, 20) {
            let tile = TileCoord::new(z, x, y).unwrap();
            let id = tile.tile_id().unwrap();
            let parent = tile.parent().unwrap().tile_id().unwrap();
            assert_eq!(parent_id(id).unwrap(), Some(parent), "{tile}");
        }
    }
}

#[rstest]
#[case(0, 1)]
#[case(1, 5)]
#[case(2, 21)]
#[case(3, 85)]
fn first_id_after_zoom(#[case] z: u8, #[case] expected: u64) {
    assert_eq!(base_offset(z + 1).unwrap(), expected);
    assert_eq!(zoom_tile_ids(z).unwrap().end, expected);
}

#[test]
fn documented_values() {
    assert_eq!(xyz_to_quadkey(486, 332, 20), "00000000000313102310");
    assert_eq!(tile_id_from_zxy(15, 486, 332).unwrap(), 358_095_929);
    assert_eq!(tile_id_from_zxy(0, 0, 0).unwrap(), 0);
    assert_eq!(zxy_from_tile_id(0).unwrap(), (0, 0, 0));
}

/// The same computation in `f64`, which is how tile ids are often computed in scripting languages.
#[expect(clippy::cast_precision_loss)]
fn tile_id_in_f64(z: u8, x: u32, y: u32) -> f64 {
    let offset = (4_f64.powi(i32::from(z)) - 1.0) / 3.0;
    let position = tile_id_from_zxy(z, x, y).unwrap() - base_offset(z).unwrap();
    offset + position as f64
}

#[test]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn f64_agrees_below_zoom_27() {
    for z in 0..27 {
        for (x, y) in sample_tiles(z, 50) {
            let exact = tile_id_from_zxy(z, x, y).unwrap();
            assert_eq!(tile_id_in_f64(z, x, y) as u64, exact, "{z}/{x}/{y}");
        }
    }
}

#[rstest]
#[case(27, 12_345_679, 87_654_321, 11_458_598_434_622_289)]
#[case(28, 1, 0, 24_019_198_012_642_646)]
#[case(29, 5, 3, 96_076_792_050_570_633)]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn exact_where_f64_is_not(#[case] z: u8, #[case] x: u32, #[case] y: u32, #[case] expected: u64) {
    assert_eq!(tile_id_from_zxy(z, x, y).unwrap(), expected);
    assert_eq!(zxy_from_tile_id(expected).unwrap(), (z, x, y));
    assert_ne!(tile_id_in_f64(z, x, y) as u64, expected);
}

#[test]
fn neighbouring_ids_at_zoom_27() {
    let left = tile_id_from_zxy(27, 12_345_678, 87_654_321).unwrap();
    let right = tile_id_from_zxy(27, 12_345_679, 87_654_321).unwrap();
    assert_eq!(left, 11_458_598_434_622_290);
    assert_eq!(right, 11_458_598_434_622_289);
    assert_eq!(zxy_from_tile_id(left).unwrap(), (27, 12_345_678, 87_654_321));
    assert_eq!(zxy_from_tile_id(right).unwrap(), (27, 12_345_679, 87_654_321));
}

#[test]
fn concurrent_use() {
    thread::scope(|scope| {
        let handles: Vec<_> = (0..8_u8)
            .map(|worker| {
                scope.spawn(move || {
                    let z = 20 + worker;
                    sample_tiles(z, 500)
                        .into_iter()
                        .filter(|&(x, y)| {
                            let id = tile_id_from_zxy(z, x, y).unwrap();
                            let quadkey = xyz_to_quadkey(x, y, z);
                            zxy_from_tile_id(id).unwrap() == (z, x, y)
                                && quadkey_to_xyz(&quadkey).unwrap() == (x, y, z)
                        })
                        .count()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 504);
        }
    });
}
