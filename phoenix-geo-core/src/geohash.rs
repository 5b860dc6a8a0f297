//! Integer geohash encoding of longitude/latitude pairs.
//!
//! A hash packs 60 interleaved bisection bits, most significant first,
//! starting at bit 63. Even bits refine longitude over `[-180, 180]`, odd
//! bits refine latitude over `[-90, 90]`. The low four bits are always zero,
//! so the 60 significant bits map onto exactly 12 base-32 characters.
//!
//! Decoding returns interval midpoints and is lossy: after 30 bits per axis
//! the error is at most `180 / 2^30` in longitude and `90 / 2^30` in
//! latitude (see [`MAX_LON_ERROR`], [`MAX_LAT_ERROR`]).

use crate::error::{CodecError, Result};

/// Number of significant bits in a hash.
pub const PRECISION_BITS: u32 = 60;

/// Length of the base-32 text form.
pub const MAX_HASH_LENGTH: usize = 12;

/// Largest longitude error after a decode.
pub const MAX_LON_ERROR: f64 = 180.0 / (1u64 << 30) as f64;

/// Largest latitude error after a decode.
pub const MAX_LAT_ERROR: f64 = 90.0 / (1u64 << 30) as f64;

const BASE32: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";

/// Encode a coordinate pair as a 60-bit geohash.
///
/// Coordinates outside the valid ranges saturate to the nearest edge cell.
pub fn encode(lon: f64, lat: f64) -> i64 {
    let mut lon_range = (-180.0_f64, 180.0_f64);
    let mut lat_range = (-90.0_f64, 90.0_f64);
    let mut bits: u64 = 0;

    for i in 0..PRECISION_BITS {
        let (range, value) = if i % 2 == 0 {
            (&mut lon_range, lon)
        } else {
            (&mut lat_range, lat)
        };
        let mid = (range.0 + range.1) / 2.0;
        if value >= mid {
            bits |= 1u64 << (63 - i);
            range.0 = mid;
        } else {
            range.1 = mid;
        }
    }

    bits as i64
}

/// Decode a geohash to the `(lon, lat)` midpoint of its cell.
pub fn decode(hash: i64) -> (f64, f64) {
    let bits = hash as u64;
    let mut lon_range = (-180.0_f64, 180.0_f64);
    let mut lat_range = (-90.0_f64, 90.0_f64);

    for i in 0..PRECISION_BITS {
        let range = if i % 2 == 0 {
            &mut lon_range
        } else {
            &mut lat_range
        };
        let mid = (range.0 + range.1) / 2.0;
        if bits & (1u64 << (63 - i)) != 0 {
            range.0 = mid;
        } else {
            range.1 = mid;
        }
    }

    (
        (lon_range.0 + lon_range.1) / 2.0,
        (lat_range.0 + lat_range.1) / 2.0,
    )
}

/// Render a hash as 12 base-32 characters.
pub fn to_base32(hash: i64) -> String {
    let bits = hash as u64;
    (0..MAX_HASH_LENGTH)
        .map(|i| {
            let shift = 59 - 5 * i as u32;
            BASE32[((bits >> shift) & 0x1f) as usize] as char
        })
        .collect()
}

/// Parse the base-32 text form. Shorter prefixes address coarser cells and
/// are padded with zero bits.
pub fn from_base32(text: &str) -> Result<i64> {
    if text.is_empty() || text.len() > MAX_HASH_LENGTH {
        return Err(CodecError::InvalidGeohash(format!(
            "expected 1 to {} characters, got {:?}",
            MAX_HASH_LENGTH, text
        )));
    }

    let mut bits: u64 = 0;
    for (i, ch) in text.bytes().enumerate() {
        let lower = ch.to_ascii_lowercase();
        let value = BASE32
            .iter()
            .position(|&c| c == lower)
            .ok_or_else(|| {
                CodecError::InvalidGeohash(format!("invalid character {:?}", ch as char))
            })? as u64;
        bits |= value << (59 - 5 * i as u32);
    }
    Ok(bits as i64)
}
