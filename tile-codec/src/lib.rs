#![doc = include_str!("../README.md")]

mod coord;
pub use coord::{MAX_ZOOM, TileCoord};

mod errors;
pub use errors::{TileCodecError, TileCodecResult};

pub mod quadkey;
pub use quadkey::{quadkey_to_tile, quadkey_to_xyz, xyz_to_quadkey};

pub mod tile_id;
pub use tile_id::{
    MAX_TILE_ID, MAX_TILE_ID_ZOOM, PYRAMID_SIZE_BY_ZOOM, base_offset, parent_id, tile_id_from_zxy,
    tile_id_to_tile, zoom_tile_ids, zxy_from_tile_id,
};
