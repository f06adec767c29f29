use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{TileCodecError, TileCodecResult};
use crate::{quadkey, tile_id};

/// Highest zoom level a [`TileCoord`] can describe, limited by the `u32` tile indexes.
pub const MAX_ZOOM: u8 = 32;

/// A single tile in the XYZ ("slippy map") scheme, where `y = 0` is the top row.
///
/// Instances created with [`TileCoord::new`] always satisfy `x < 2^z` and `y < 2^z`.
///
/// ```
/// # use tile_codec::TileCoord;
/// let tile = TileCoord::new(10, 486, 332).unwrap();
/// assert_eq!(tile.to_string(), "10,486,332");
/// assert_eq!(format!("{tile:#}"), "10/486/332");
/// assert_eq!(tile.quadkey(), "0313102310");
/// assert_eq!(tile.tile_id().unwrap(), 506_307);
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

impl TileCoord {
    /// Create a validated tile coordinate.
    pub fn new(z: u8, x: u32, y: u32) -> TileCodecResult<Self> {
        if z > MAX_ZOOM {
            return Err(TileCodecError::InvalidZoom(z, MAX_ZOOM));
        }
        if !is_valid_index(z, x) || !is_valid_index(z, y) {
            return Err(TileCodecError::InvalidCoordinate { z, x, y });
        }
        Ok(Self { z, x, y })
    }

    /// Create a tile coordinate without checking it against its zoom level.
    #[must_use]
    pub const fn new_unchecked(z: u8, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// Parse a tile given as a JSON array `[x, y, z]` or a JSON object `{"x": x, "y": y, "z": z}`.
    ///
    /// ```
    /// # use tile_codec::TileCoord;
    /// let tile = TileCoord::from_json("[486, 332, 10]").unwrap();
    /// assert_eq!(tile, TileCoord::from_json(r#"{"x": 486, "y": 332, "z": 10}"#).unwrap());
    /// ```
    pub fn from_json(value: &str) -> TileCodecResult<Self> {
        let value = value.trim();
        if value.starts_with('[') {
            let (x, y, z): (u32, u32, u8) = serde_json::from_str(value)?;
            Self::new(z, x, y)
        } else if value.starts_with('{') {
            let Self { z, x, y } = serde_json::from_str(value)?;
            Self::new(z, x, y)
        } else {
            Err(TileCodecError::InvalidTileString(value.to_string()))
        }
    }

    /// Render the tile as a JSON array `[x, y, z]`.
    #[must_use]
    pub fn json_arr(&self) -> String {
        format!("[{}, {}, {}]", self.x, self.y, self.z)
    }

    /// The quadkey of this tile, see [`quadkey::xyz_to_quadkey`].
    #[must_use]
    pub fn quadkey(&self) -> String {
        quadkey::xyz_to_quadkey(self.x, self.y, self.z)
    }

    pub fn from_quadkey(quadkey: &str) -> TileCodecResult<Self> {
        quadkey::quadkey_to_tile(quadkey)
    }

    /// The `PMTiles` tile id of this tile, see [`tile_id::tile_id_from_zxy`].
    pub fn tile_id(&self) -> TileCodecResult<u64> {
        tile_id::tile_id_from_zxy(self.z, self.x, self.y)
    }

    pub fn from_tile_id(id: u64) -> TileCodecResult<Self> {
        let (z, x, y) = tile_id::zxy_from_tile_id(id)?;
        Ok(Self { z, x, y })
    }

    /// The tile one zoom level up that contains this one, or `None` at zoom 0.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let z = self.z.checked_sub(1)?;
        Some(Self {
            z,
            x: self.x >> 1,
            y: self.y >> 1,
        })
    }
}

/// Expects `z <= MAX_ZOOM`.
fn is_valid_index(z: u8, index: u32) -> bool {
    u64::from(index) < 1_u64 << z
}

impl Display for TileCoord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if f.alternate() {
            write!(f, "{}/{}/{}", self.z, self.x, self.y)
        } else {
            write!(f, "{},{},{}", self.z, self.x, self.y)
        }
    }
}

impl FromStr for TileCoord {
    type Err = TileCodecError;

    /// Parse `z/x/y` or `z,x,y`, the two forms produced by [`Display`].
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || TileCodecError::InvalidTileString(value.to_string());
        let separator = if value.contains('/') { '/' } else { ',' };
        let mut parts = value.split(separator).map(str::trim);
        let (Some(z), Some(x), Some(y), None) = (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        let z = z.parse().map_err(|_| invalid())?;
        let x = x.parse().map_err(|_| invalid())?;
        let y = y.parse().map_err(|_| invalid())?;
        Self::new(z, x, y)
    }
}
