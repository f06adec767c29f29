//! `PMTiles` tile ids.
//!
//! Tiles are numbered zoom level by zoom level, and within a level along a Hilbert curve,
//! so the id of `(z, x, y)` is `base_offset(z) + hilbert(x, y)`. Ids at zoom 27 and above
//! exceed 2^53 and cannot be computed with `f64`, everything here stays in integers.

use std::ops::Range;

use crate::TileCoord;
use crate::errors::{TileCodecError, TileCodecResult};

/// Maximum zoom level whose tile ids fit in a `u64`.
pub const MAX_TILE_ID_ZOOM: u8 = 31;

/// Number of tiles before each zoom level, `(4^z - 1) / 3` at index `z`.
///
/// ```
/// # use tile_codec::PYRAMID_SIZE_BY_ZOOM;
/// let mut size_at_level = 0_u64;
/// for (z, &size) in PYRAMID_SIZE_BY_ZOOM.iter().enumerate() {
///     assert_eq!(size, size_at_level, "Invalid value at zoom {z}");
///     size_at_level += 4_u64.pow(z as u32);
/// }
/// ```
#[expect(clippy::unreadable_literal)]
pub const PYRAMID_SIZE_BY_ZOOM: [u64; MAX_TILE_ID_ZOOM as usize + 1] = [
    /*  0 */ 0,
    /*  1 */ 1,
    /*  2 */ 5,
    /*  3 */ 21,
    /*  4 */ 85,
    /*  5 */ 341,
    /*  6 */ 1365,
    /*  7 */ 5461,
    /*  8 */ 21845,
    /*  9 */ 87381,
    /* 10 */ 349525,
    /* 11 */ 1398101,
    /* 12 */ 5592405,
    /* 13 */ 22369621,
    /* 14 */ 89478485,
    /* 15 */ 357913941,
    /* 16 */ 1431655765,
    /* 17 */ 5726623061,
    /* 18 */ 22906492245,
    /* 19 */ 91625968981,
    /* 20 */ 366503875925,
    /* 21 */ 1466015503701,
    /* 22 */ 5864062014805,
    /* 23 */ 23456248059221,
    /* 24 */ 93824992236885,
    /* 25 */ 375299968947541,
    /* 26 */ 1501199875790165,
    /* 27 */ 6004799503160661,
    /* 28 */ 24019198012642645,
    /* 29 */ 96076792050570581,
    /* 30 */ 384307168202282325,
    /* 31 */ 1537228672809129301,
];

/// The last valid tile id: the final tile of the Hilbert curve at zoom 31, `(31, 2^31 - 1, 0)`.
///
/// ```
/// # use tile_codec::MAX_TILE_ID;
/// assert_eq!(MAX_TILE_ID, 6148914691236517204);
/// ```
pub const MAX_TILE_ID: u64 = PYRAMID_SIZE_BY_ZOOM[MAX_TILE_ID_ZOOM as usize]
    + (1_u64 << (2 * MAX_TILE_ID_ZOOM as u32))
    - 1;

/// Number of tiles at all zoom levels below `z`, i.e. the id of the first tile at zoom `z`.
///
/// Computed as `(4^z - 1) / 3` in 128-bit arithmetic. Valid up to zoom 32, where the
/// offset is one past [`MAX_TILE_ID`].
///
/// ```
/// # use tile_codec::base_offset;
/// assert_eq!(base_offset(0).unwrap(), 0);
/// assert_eq!(base_offset(1).unwrap(), 1);
/// assert_eq!(base_offset(2).unwrap(), 5);
/// assert_eq!(base_offset(3).unwrap(), 21);
/// assert!(base_offset(33).is_err());
/// ```
pub fn base_offset(z: u8) -> TileCodecResult<u64> {
    let tiles = 1_u128
        .checked_shl(2 * u32::from(z))
        .ok_or(TileCodecError::PrecisionOverflow("the number of tiles at a zoom level"))?;
    u64::try_from((tiles - 1) / 3)
        .map_err(|_| TileCodecError::PrecisionOverflow("the tile id offset of a zoom level"))
}

/// The half-open range of tile ids used by zoom level `z`.
///
/// ```
/// # use tile_codec::zoom_tile_ids;
/// assert_eq!(zoom_tile_ids(0).unwrap(), 0..1);
/// assert_eq!(zoom_tile_ids(2).unwrap(), 5..21);
/// ```
pub fn zoom_tile_ids(z: u8) -> TileCodecResult<Range<u64>> {
    if z > MAX_TILE_ID_ZOOM {
        return Err(TileCodecError::InvalidZoom(z, MAX_TILE_ID_ZOOM));
    }
    Ok(base_offset(z)?..base_offset(z + 1)?)
}

/// Position of `(x, y)` along the Hilbert curve filling a `2^z` by `2^z` grid.
///
/// Walks the bit levels from the most significant down, adding two bits of the distance per
/// level and rotating the remaining coordinate bits into the orientation of the current
/// quadrant. Expects `z <= 32` and `x, y < 2^z`, which every caller validates first.
#[must_use]
pub(crate) fn hilbert_xy_to_d(z: u8, x: u32, y: u32) -> u64 {
    let (mut x, mut y) = (x, y);
    let mut d = 0_u64;
    for level in (0..u32::from(z)).rev() {
        let size = 1_u32 << level;
        let rx = u32::from(x & size != 0);
        let ry = u32::from(y & size != 0);
        d += u64::from((3 * rx) ^ ry) << (2 * level);
        (x, y) = rotate(size, x, y, rx, ry);
    }
    d
}

/// Inverse of [`hilbert_xy_to_d`]: the `(x, y)` cell at distance `d` on the zoom `z` curve.
///
/// Runs the same rotation from the least significant bit level up. Expects `d < 4^z`.
#[must_use]
pub(crate) fn hilbert_d_to_xy(z: u8, d: u64) -> (u32, u32) {
    let mut t = d;
    let (mut x, mut y) = (0_u32, 0_u32);
    for level in 0..u32::from(z) {
        let size = 1_u32 << level;
        let rx = u32::from(t & 2 != 0);
        let ry = u32::from((t & 1 != 0) ^ (rx != 0));
        (x, y) = rotate(size, x, y, rx, ry);
        x += size * rx;
        y += size * ry;
        t >>= 2;
    }
    (x, y)
}

/// Reflect and transpose a quadrant so the sub-curve inside it has the canonical orientation.
const fn rotate(size: u32, x: u32, y: u32, rx: u32, ry: u32) -> (u32, u32) {
    if ry != 0 {
        return (x, y);
    }
    if rx == 0 {
        (y, x)
    } else {
        // x and y are below `size` in the inverse walk, or carry higher bits that the
        // forward walk never looks at again, so wrapping keeps the low bits exact.
        let mask = size.wrapping_sub(1);
        ((mask.wrapping_sub(y)) & mask, (mask.wrapping_sub(x)) & mask)
    }
}

/// Return the `PMTiles` tile id of a tile.
///
/// ```
/// # use tile_codec::tile_id_from_zxy;
/// assert_eq!(tile_id_from_zxy(0, 0, 0).unwrap(), 0);
/// assert_eq!(tile_id_from_zxy(10, 486, 332).unwrap(), 506_307);
/// assert_eq!(tile_id_from_zxy(31, 100, 100).unwrap(), 1_537_228_672_809_139_573);
/// assert!(tile_id_from_zxy(1, 2, 0).is_err());
/// assert!(tile_id_from_zxy(32, 0, 0).is_err());
/// ```
pub fn tile_id_from_zxy(z: u8, x: u32, y: u32) -> TileCodecResult<u64> {
    if z > MAX_TILE_ID_ZOOM {
        return Err(TileCodecError::InvalidZoom(z, MAX_TILE_ID_ZOOM));
    }
    let size = 1_u32 << z;
    if x >= size || y >= size {
        return Err(TileCodecError::InvalidCoordinate { z, x, y });
    }
    PYRAMID_SIZE_BY_ZOOM[usize::from(z)]
        .checked_add(hilbert_xy_to_d(z, x, y))
        .ok_or(TileCodecError::PrecisionOverflow("a tile id"))
}

/// Zoom level of a tile id: the `z` with `base_offset(z) <= id < base_offset(z + 1)`.
///
/// `3 * base_offset(z) + 1 == 4^z`, so the zoom is `floor(log4(3 * id + 1))`.
fn zoom_of_tile_id(id: u64) -> TileCodecResult<u8> {
    let scaled = 3 * u128::from(id) + 1;
    u8::try_from(scaled.ilog2() / 2).map_err(|_| TileCodecError::OutOfRange(id))
}

/// Return `(z, x, y)` for a `PMTiles` tile id.
///
/// ```
/// # use tile_codec::zxy_from_tile_id;
/// assert_eq!(zxy_from_tile_id(0).unwrap(), (0, 0, 0));
/// assert_eq!(zxy_from_tile_id(19_078_479).unwrap(), (12, 3423, 1763));
/// assert!(zxy_from_tile_id(u64::MAX).is_err());
/// ```
pub fn zxy_from_tile_id(id: u64) -> TileCodecResult<(u8, u32, u32)> {
    if id > MAX_TILE_ID {
        return Err(TileCodecError::OutOfRange(id));
    }
    let z = zoom_of_tile_id(id)?;
    let (x, y) = hilbert_d_to_xy(z, id - PYRAMID_SIZE_BY_ZOOM[usize::from(z)]);
    Ok((z, x, y))
}

/// Return the [`TileCoord`] of a `PMTiles` tile id.
pub fn tile_id_to_tile(id: u64) -> TileCodecResult<TileCoord> {
    let (z, x, y) = zxy_from_tile_id(id)?;
    Ok(TileCoord::new_unchecked(z, x, y))
}

/// Id of the parent tile, computed without going through `(z, x, y)`.
///
/// The four children of a tile are consecutive on the Hilbert curve, so the parent's
/// position within its level is the child's position divided by four.
///
/// ```
/// # use tile_codec::{parent_id, tile_id_from_zxy};
/// let child = tile_id_from_zxy(2, 3, 1).unwrap();
/// assert_eq!(parent_id(child).unwrap(), Some(tile_id_from_zxy(1, 1, 0).unwrap()));
/// assert_eq!(parent_id(0).unwrap(), None);
/// ```
pub fn parent_id(id: u64) -> TileCodecResult<Option<u64>> {
    if id > MAX_TILE_ID {
        return Err(TileCodecError::OutOfRange(id));
    }
    let z = zoom_of_tile_id(id)?;
    let Some(parent_z) = z.checked_sub(1) else {
        return Ok(None);
    };
    let position = id - PYRAMID_SIZE_BY_ZOOM[usize::from(z)];
    Ok(Some(PYRAMID_SIZE_BY_ZOOM[usize::from(parent_z)] + position / 4))
}
