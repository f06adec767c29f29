/// Errors returned by the quadkey and tile id conversions.
///
/// None of these are retryable: every conversion is a pure function of its input.
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum TileCodecError {
    #[error("Tile x={x}, y={y} is outside the bounds of zoom level {z}")]
    InvalidCoordinate { z: u8, x: u32, y: u32 },

    #[error("Invalid quadkey {quadkey:?}: digit {digit:?} at position {position} is not one of 0, 1, 2 or 3")]
    InvalidQuadkey {
        quadkey: String,
        position: usize,
        digit: char,
    },

    #[error("Zoom level {0} exceeds the maximum supported zoom level {1}")]
    InvalidZoom(u8, u8),

    #[error("Quadkey with {0} digits exceeds the maximum supported zoom level {max}", max = crate::MAX_ZOOM)]
    QuadkeyTooLong(usize),

    #[error("Tile id {0} does not correspond to any tile up to zoom level {max}", max = crate::MAX_TILE_ID_ZOOM)]
    OutOfRange(u64),

    #[error("Integer overflow while computing {0}")]
    PrecisionOverflow(&'static str),

    #[error("Unable to parse tile {0:?}, expected `z/x/y`, `z,x,y`, `[x, y, z]` or {{\"x\": x, \"y\": y, \"z\": z}}")]
    InvalidTileString(String),

    #[error(transparent)]
    JsonError(#[from] serde_json::Error),
}

pub type TileCodecResult<T> = Result<T, TileCodecError>;
