//! secp256k1 curve engine.
//!
//! Group arithmetic and SEC1 encodings on top of `k256`. All field and group
//! operations are constant-time.
//!
//! The free functions mirror the methods on [`Point`] and are what the rest
//! of the workspace calls.

mod point;
mod scalar;

pub use point::Point;
pub use scalar::Scalar;

use k256::elliptic_curve::sec1::FromEncodedPoint;
use k256::{AffinePoint, EncodedPoint, FieldBytes};

use crate::constants::{COMPRESSED_POINT_SIZE, COORDINATE_SIZE, UNCOMPRESSED_POINT_SIZE};
use crate::error::Result;

/// `P + Q`. Infinity is the identity on either side.
pub fn add(p: &Point, q: &Point) -> Point {
    p.add(q)
}

/// `k * P`.
pub fn scalar_mul(k: &Scalar, p: &Point) -> Point {
    p.mul(k)
}

/// `k * G`.
pub fn scalar_mul_base(k: &Scalar) -> Point {
    Point::mul_base(k)
}

/// Checks `y^2 = x^3 + 7 (mod p)` for big-endian coordinates.
///
/// Coordinates not below the field prime are reported as off-curve.
pub fn is_on_curve(x: &[u8; COORDINATE_SIZE], y: &[u8; COORDINATE_SIZE]) -> bool {
    let encoded =
        EncodedPoint::from_affine_coordinates(&FieldBytes::from(*x), &FieldBytes::from(*y), false);
    AffinePoint::from_encoded_point(&encoded).is_some().into()
}

/// See [`Point::to_compressed`].
pub fn serialize_compressed(p: &Point) -> Result<[u8; COMPRESSED_POINT_SIZE]> {
    p.to_compressed()
}

/// See [`Point::from_compressed`].
pub fn deserialize_compressed(bytes: &[u8]) -> Result<Point> {
    Point::from_compressed(bytes)
}

/// See [`Point::to_uncompressed`].
pub fn serialize_uncompressed(p: &Point) -> Result<[u8; UNCOMPRESSED_POINT_SIZE]> {
    p.to_uncompressed()
}

/// See [`Point::from_uncompressed`].
pub fn deserialize_uncompressed(bytes: &[u8]) -> Result<Point> {
    Point::from_uncompressed(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_on_curve() {
        let (x, y) = Point::GENERATOR.coordinates().unwrap();
        assert!(is_on_curve(&x, &y));

        let mut bad_y = y;
        bad_y[0] ^= 0x80;
        assert!(!is_on_curve(&x, &bad_y));
        assert!(!is_on_curve(&[0u8; 32], &[0u8; 32]));
    }

    #[test]
    fn test_engine_roundtrips() {
        let k = Scalar::from_u64(0xC0FFEE).unwrap();
        let p = scalar_mul_base(&k);
        assert_eq!(scalar_mul(&k, &Point::GENERATOR), p);

        let c = serialize_compressed(&p).unwrap();
        let u = serialize_uncompressed(&p).unwrap();
        assert_eq!(deserialize_compressed(&c).unwrap(), p);
        assert_eq!(deserialize_uncompressed(&u).unwrap(), p);
        assert_eq!(c[1..], u[1..33]);
    }

    #[test]
    fn test_add_is_commutative() {
        let a = scalar_mul_base(&Scalar::from_u64(11).unwrap());
        let b = scalar_mul_base(&Scalar::from_u64(13).unwrap());
        assert_eq!(add(&a, &b), add(&b, &a));
        assert_eq!(add(&a, &b), scalar_mul_base(&Scalar::from_u64(24).unwrap()));
    }
}
