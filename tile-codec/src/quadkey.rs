//! Quadkeys: one base-4 digit per zoom level, most significant level first.
//!
//! Digit `i` of a zoom `z` quadkey is `bit(x, z-1-i) + 2 * bit(y, z-1-i)`.

use crate::coord::{MAX_ZOOM, TileCoord};
use crate::errors::{TileCodecError, TileCodecResult};

/// Return the quadkey digits (`0..=3`) of a tile.
///
/// Only the low `z` bits of `x` and `y` participate; higher bits are ignored.
#[must_use]
pub fn xyz_to_quadkey_digits(x: u32, y: u32, z: u8) -> Vec<u8> {
    (0..u32::from(z))
        .rev()
        .map(|bit| {
            let mask = 1_u32.checked_shl(bit).unwrap_or(0);
            u8::from(x & mask != 0) + 2 * u8::from(y & mask != 0)
        })
        .collect()
}

/// Return the quadkey of a tile as a string of exactly `z` characters.
///
/// Zoom 0 always yields an empty string. Bits of `x` and `y` above `z-1` are ignored
/// rather than rejected.
///
/// ```
/// # use tile_codec::xyz_to_quadkey;
/// assert_eq!(xyz_to_quadkey(486, 332, 10), "0313102310");
/// assert_eq!(xyz_to_quadkey(486, 332, 20), "00000000000313102310");
/// assert_eq!(xyz_to_quadkey(7, 7, 0), "");
/// ```
#[must_use]
pub fn xyz_to_quadkey(x: u32, y: u32, z: u8) -> String {
    xyz_to_quadkey_digits(x, y, z)
        .into_iter()
        .map(|digit| char::from(b'0' + digit))
        .collect()
}

/// Return `(x, y, z)` for a quadkey.
///
/// ```
/// # use tile_codec::quadkey_to_xyz;
/// assert_eq!(quadkey_to_xyz("123").unwrap(), (5, 3, 3));
/// assert_eq!(quadkey_to_xyz("0313102310").unwrap(), (486, 332, 10));
/// assert_eq!(quadkey_to_xyz("").unwrap(), (0, 0, 0));
/// assert!(quadkey_to_xyz("0314").is_err());
/// ```
pub fn quadkey_to_xyz(quadkey: &str) -> TileCodecResult<(u32, u32, u8)> {
    let len = quadkey.chars().count();
    if len > usize::from(MAX_ZOOM) {
        return Err(TileCodecError::QuadkeyTooLong(len));
    }

    let mut x = 0_u32;
    let mut y = 0_u32;
    for (position, digit) in quadkey.chars().enumerate() {
        let value = match digit {
            '0'..='3' => u32::from(digit) - u32::from('0'),
            _ => {
                return Err(TileCodecError::InvalidQuadkey {
                    quadkey: quadkey.to_string(),
                    position,
                    digit,
                });
            }
        };
        // Shifting one bit at a time keeps the 32 digit case within u32.
        x = (x << 1) | (value & 1);
        y = (y << 1) | (value >> 1);
    }

    // len <= MAX_ZOOM, so this cannot truncate
    let z = u8::try_from(len).map_err(|_| TileCodecError::QuadkeyTooLong(len))?;
    Ok((x, y, z))
}

/// Return the [`TileCoord`] of a quadkey.
///
/// ```
/// # use tile_codec::{TileCoord, quadkey_to_tile};
/// let tile = quadkey_to_tile("0313102310").unwrap();
/// assert_eq!(tile, TileCoord::new(10, 486, 332).unwrap());
/// ```
pub fn quadkey_to_tile(quadkey: &str) -> TileCodecResult<TileCoord> {
    let (x, y, z) = quadkey_to_xyz(quadkey)?;
    Ok(TileCoord::new_unchecked(z, x, y))
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, 0, 0, "")]
    #[case(0, 0, 1, "0")]
    #[case(1, 0, 1, "1")]
    #[case(0, 1, 1, "2")]
    #[case(1, 1, 1, "3")]
    #[case(5, 3, 3, "123")]
    #[case(486, 332, 10, "0313102310")]
    #[case(486, 332, 20, "00000000000313102310")]
    #[case(u32::MAX, 0, 32, "11111111111111111111111111111111")]
    #[case(0, u32::MAX, 32, "22222222222222222222222222222222")]
    fn test_encode(#[case] x: u32, #[case] y: u32, #[case] z: u8, #[case] expected: &str) {
        assert_eq!(xyz_to_quadkey(x, y, z), expected);
        assert_eq!(quadkey_to_xyz(expected).unwrap(), (x, y, z));
    }

    #[test]
    fn test_encode_ignores_high_bits() {
        // 0b1011 at zoom 2 only looks at 0b11
        assert_eq!(xyz_to_quadkey(0b1011, 0, 2), "11");
        assert_eq!(xyz_to_quadkey(7, 7, 0), "");
        assert_eq!(xyz_to_quadkey(1 << 20, 1 << 20, 20), "0".repeat(20));
    }

    #[test]
    fn test_encode_beyond_max_zoom() {
        // bits above 31 do not exist in a u32, so they read as 0
        assert_eq!(xyz_to_quadkey(1, 0, 34), format!("00{}1", "0".repeat(31)));
    }

    #[test]
    fn test_digits() {
        assert_eq!(xyz_to_quadkey_digits(486, 332, 10), vec![0, 3, 1, 3, 1, 0, 2, 3, 1, 0]);
        assert!(xyz_to_quadkey_digits(486, 332, 0).is_empty());
    }

    #[rstest]
    #[case("4", 0, '4')]
    #[case("0124", 3, '4')]
    #[case("01a3", 2, 'a')]
    #[case("-1", 0, '-')]
    #[case(" 0", 0, ' ')]
    #[case("01é", 2, 'é')]
    fn test_decode_invalid_digit(
        #[case] quadkey: &str,
        #[case] expected_position: usize,
        #[case] expected_digit: char,
    ) {
        let err = quadkey_to_xyz(quadkey).unwrap_err();
        let TileCodecError::InvalidQuadkey {
            quadkey: key,
            position,
            digit,
        } = err
        else {
            panic!("unexpected error {err:?}");
        };
        assert_eq!(key, quadkey);
        assert_eq!(position, expected_position);
        assert_eq!(digit, expected_digit);
    }

    #[test]
    fn test_decode_error_message() {
        assert_snapshot!(
            quadkey_to_xyz("0314").unwrap_err(),
            @r#"Invalid quadkey "0314": digit '4' at position 3 is not one of 0, 1, 2 or 3"#
        );
    }

    #[test]
    fn test_decode_too_long() {
        let quadkey = "0".repeat(33);
        assert_snapshot!(
            quadkey_to_xyz(&quadkey).unwrap_err(),
            @"Quadkey with 33 digits exceeds the maximum supported zoom level 32"
        );
        assert!(matches!(
            quadkey_to_xyz(&"1".repeat(300)),
            Err(TileCodecError::QuadkeyTooLong(300))
        ));
        assert_eq!(quadkey_to_xyz(&"3".repeat(32)).unwrap(), (u32::MAX, u32::MAX, 32));
    }

    #[test]
    fn test_round_trip_low_zooms() {
        for z in 0..=6_u8 {
            for x in 0..(1_u32 << z) {
                for y in 0..(1_u32 << z) {
                    let quadkey = xyz_to_quadkey(x, y, z);
                    assert_eq!(quadkey.len(), usize::from(z));
                    assert_eq!(quadkey_to_xyz(&quadkey).unwrap(), (x, y, z));
                }
            }
        }
    }

    #[test]
    fn test_quadkey_to_tile() {
        assert_eq!(
            quadkey_to_tile("0313102310").unwrap(),
            TileCoord::new_unchecked(10, 486, 332)
        );
        assert_eq!(quadkey_to_tile("").unwrap(), TileCoord::new_unchecked(0, 0, 0));
    }
}
