//! # Encoded Tracks
//!
//! Activity services hand out summary tracks as Google encoded polylines
//! (`summary_polyline`). Decoding and encoding go through the `polyline`
//! crate at 1e5 precision; this module converts between its
//! `geo::LineString` (x = longitude, y = latitude) and [`GpsPoint`]s.
//!
//! Before a string reaches the decoder its framing is checked: every
//! character must be in `?`..=`~`, every value must end, values must come in
//! latitude/longitude pairs, and no value may be longer than a coordinate
//! delta can be. Anything else is rejected as a whole track.
//!
//! ```rust
//! use running_stats::track;
//!
//! let points = track::decode_track("_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();
//! assert_eq!(points.len(), 3);
//! assert_eq!(points[0].latitude, 38.5);
//! assert_eq!(points[0].longitude, -120.2);
//! ```

use geo::{Coord, LineString};
use thiserror::Error;

use crate::GpsPoint;

/// Decimal digits kept per coordinate.
pub const PRECISION: u32 = 5;

/// Offset added to every 5-bit chunk to land in printable ASCII.
const CHUNK_OFFSET: u8 = 63;

/// Chunks with this bit set are followed by another chunk of the same value.
const CONTINUATION: u8 = 0x20;

/// A delta between two valid coordinates is below 2^27 once zig-zag encoded,
/// so it never needs more than six 5-bit chunks.
const MAX_CHUNKS: usize = 6;

/// Why an encoded track could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolylineError {
    #[error("Polyline ended in the middle of a coordinate at byte {position}")]
    UnexpectedEnd { position: usize },

    #[error("Invalid polyline character {character:?} at byte {position}")]
    InvalidCharacter { character: char, position: usize },

    #[error("Polyline value starting at byte {position} is too long for a coordinate")]
    Overflow { position: usize },

    #[error("Polyline rejected: {0}")]
    Decode(String),

    #[error("Track cannot be encoded: {0}")]
    Encode(String),
}

/// Decode an encoded track into GPS points.
///
/// The whole string must decode: a truncated pair, a stray character or an
/// out-of-range coordinate fails the entire track rather than returning a
/// partial one.
pub fn decode_track(encoded: &str) -> Result<Vec<GpsPoint>, PolylineError> {
    check_framing(encoded)?;
    let line = polyline::decode_polyline(encoded, PRECISION)
        .map_err(|e| PolylineError::Decode(e.to_string()))?;
    Ok(line.coords().map(|c| GpsPoint::new(c.y, c.x)).collect())
}

/// Encode GPS points as a polyline string.
///
/// ```rust
/// use running_stats::{GpsPoint, track};
///
/// let points = vec![
///     GpsPoint::new(38.5, -120.2),
///     GpsPoint::new(40.7, -120.95),
///     GpsPoint::new(43.252, -126.453),
/// ];
/// assert_eq!(track::encode_track(&points).unwrap(), "_p~iF~ps|U_ulLnnqC_mqNvxq`@");
/// ```
pub fn encode_track(points: &[GpsPoint]) -> Result<String, PolylineError> {
    let line: LineString<f64> = points
        .iter()
        .map(|p| Coord { x: p.longitude, y: p.latitude })
        .collect();
    polyline::encode_coordinates(line, PRECISION).map_err(|e| PolylineError::Encode(e.to_string()))
}

fn check_framing(encoded: &str) -> Result<(), PolylineError> {
    let mut values = 0usize;
    let mut chunks = 0usize;
    let mut value_start = 0;

    for (position, character) in encoded.char_indices() {
        if !('?'..='~').contains(&character) {
            return Err(PolylineError::InvalidCharacter { character, position });
        }
        if chunks == 0 {
            value_start = position;
        }
        chunks += 1;
        if chunks > MAX_CHUNKS {
            return Err(PolylineError::Overflow { position: value_start });
        }
        // in range, so the character is a single ASCII byte
        if (character as u8 - CHUNK_OFFSET) & CONTINUATION == 0 {
            values += 1;
            chunks = 0;
        }
    }

    if chunks > 0 || values % 2 == 1 {
        return Err(PolylineError::UnexpectedEnd { position: encoded.len() });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_decode_reference_polyline() {
        let points = decode_track("_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();
        let expected = [(38.5, -120.2), (40.7, -120.95), (43.252, -126.453)];
        assert_eq!(points.len(), expected.len());
        for (p, (lat, lng)) in points.iter().zip(expected) {
            assert!(approx_eq(p.latitude, lat));
            assert!(approx_eq(p.longitude, lng));
        }
    }

    #[test]
    fn test_decode_empty() {
        assert!(decode_track("").unwrap().is_empty());
    }

    #[test]
    fn test_decode_truncated_pair() {
        // "?" is a zero delta: latitude, longitude, then a latitude with no longitude
        assert_eq!(decode_track("???"), Err(PolylineError::UnexpectedEnd { position: 3 }));
    }

    #[test]
    fn test_decode_truncated_value() {
        // '_' has the continuation bit set, so the value never finishes
        assert!(matches!(decode_track("_"), Err(PolylineError::UnexpectedEnd { .. })));
    }

    #[test]
    fn test_decode_invalid_character() {
        assert_eq!(
            decode_track("_p~iF ps|U"),
            Err(PolylineError::InvalidCharacter { character: ' ', position: 5 })
        );
        assert!(matches!(decode_track("_p~iF~ps|U大"), Err(PolylineError::InvalidCharacter { character: '大', .. })));
    }

    #[test]
    fn test_decode_runaway_values() {
        let runaway = "~".repeat(20);
        assert_eq!(decode_track(&runaway), Err(PolylineError::Overflow { position: 0 }));

        // three pairs of deltas near 2^62
        let value = format!("}}{}F", "~".repeat(11));
        let crafted = format!("{value}?{value}?{value}?");
        assert_eq!(decode_track(&crafted), Err(PolylineError::Overflow { position: 0 }));
    }

    #[test]
    fn test_encode_rejects_invalid_points() {
        assert!(encode_track(&[GpsPoint::new(91.0, 0.0)]).is_err());
    }

    #[test]
    fn test_encode_decode_track_near_dalian() {
        let points = vec![
            GpsPoint::new(38.86201, 121.51403),
            GpsPoint::new(38.86255, 121.51522),
            GpsPoint::new(38.86190, 121.51630),
        ];
        let decoded = decode_track(&encode_track(&points).unwrap()).unwrap();
        assert_eq!(decoded.len(), points.len());
        for (a, b) in points.iter().zip(&decoded) {
            assert!(approx_eq(a.latitude, b.latitude));
            assert!(approx_eq(a.longitude, b.longitude));
        }
    }
}
