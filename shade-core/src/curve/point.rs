//! Points on secp256k1, including the point at infinity.

use k256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use k256::elliptic_curve::group::Group;
use k256::{AffinePoint, EncodedPoint, FieldBytes, ProjectivePoint};

use super::scalar::Scalar;
use crate::constants::{
    COMPRESSED_POINT_SIZE, COORDINATE_SIZE, TAG_COMPRESSED_EVEN, TAG_COMPRESSED_ODD,
    TAG_UNCOMPRESSED, UNCOMPRESSED_POINT_SIZE,
};
use crate::error::{Result, ShadeError};

/// A secp256k1 group element.
///
/// Unlike [`PublicKey`](crate::PublicKey), a `Point` may be the point at
/// infinity; it is the result type of raw group arithmetic.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Point {
    inner: ProjectivePoint,
}

impl Point {
    /// The point at infinity (group identity).
    pub const INFINITY: Point = Point {
        inner: ProjectivePoint::IDENTITY,
    };

    /// The standard generator G.
    pub const GENERATOR: Point = Point {
        inner: ProjectivePoint::GENERATOR,
    };

    /// Builds a point from affine coordinates.
    ///
    /// # Errors
    /// `InvalidPoint` if `(x, y)` does not satisfy `y^2 = x^3 + 7` or a
    /// coordinate is not below the field prime.
    pub fn from_coordinates(x: &[u8; COORDINATE_SIZE], y: &[u8; COORDINATE_SIZE]) -> Result<Self> {
        let encoded = EncodedPoint::from_affine_coordinates(
            &FieldBytes::from(*x),
            &FieldBytes::from(*y),
            false,
        );
        Self::from_sec1(&encoded)
            .ok_or_else(|| ShadeError::InvalidPoint("coordinates are not on the curve".into()))
    }

    /// Returns affine `(x, y)`, or `None` for the point at infinity.
    pub fn coordinates(&self) -> Option<([u8; COORDINATE_SIZE], [u8; COORDINATE_SIZE])> {
        if self.is_infinity() {
            return None;
        }
        let encoded = self.inner.to_affine().to_encoded_point(false);
        let mut x = [0u8; COORDINATE_SIZE];
        let mut y = [0u8; COORDINATE_SIZE];
        x.copy_from_slice(encoded.x()?);
        y.copy_from_slice(encoded.y()?);
        Some((x, y))
    }

    /// Returns true for the group identity.
    pub fn is_infinity(&self) -> bool {
        self.inner.is_identity().into()
    }

    /// Group addition. Total: infinity is the identity and `P + (-P)` is infinity.
    pub fn add(&self, other: &Point) -> Point {
        Point {
            inner: self.inner + other.inner,
        }
    }

    /// Computes `k * self`.
    pub fn mul(&self, k: &Scalar) -> Point {
        Point {
            inner: self.inner * *k.as_k256(),
        }
    }

    /// Computes `k * G`.
    pub fn mul_base(k: &Scalar) -> Point {
        Point {
            inner: ProjectivePoint::GENERATOR * *k.as_k256(),
        }
    }

    /// Encodes as 33 bytes: `0x02`/`0x03` by y parity, then big-endian x.
    ///
    /// # Errors
    /// `InvalidPoint` for the point at infinity, which has no SEC1 encoding here.
    pub fn to_compressed(&self) -> Result<[u8; COMPRESSED_POINT_SIZE]> {
        self.ensure_finite()?;
        Ok(self.compressed_unchecked())
    }

    /// Encodes as 65 bytes: `0x04 || x || y`.
    ///
    /// # Errors
    /// `InvalidPoint` for the point at infinity.
    pub fn to_uncompressed(&self) -> Result<[u8; UNCOMPRESSED_POINT_SIZE]> {
        self.ensure_finite()?;
        Ok(self.uncompressed_unchecked())
    }

    /// Decodes a 33-byte compressed point, recomputing y from x and the parity tag.
    ///
    /// # Errors
    /// `InvalidPoint` on wrong length, wrong tag, x not below p, or no square
    /// root for `x^3 + 7`.
    pub fn from_compressed(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != COMPRESSED_POINT_SIZE {
            return Err(ShadeError::InvalidPoint(format!(
                "compressed point must be {} bytes, got {}",
                COMPRESSED_POINT_SIZE,
                bytes.len()
            )));
        }
        if bytes[0] != TAG_COMPRESSED_EVEN && bytes[0] != TAG_COMPRESSED_ODD {
            return Err(ShadeError::InvalidPoint(format!(
                "bad compressed tag 0x{:02x}",
                bytes[0]
            )));
        }
        Self::decode_sec1(bytes)
    }

    /// Decodes a 65-byte uncompressed point and checks the curve equation.
    ///
    /// # Errors
    /// `InvalidPoint` on wrong length, wrong tag, or an off-curve point.
    pub fn from_uncompressed(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != UNCOMPRESSED_POINT_SIZE {
            return Err(ShadeError::InvalidPoint(format!(
                "uncompressed point must be {} bytes, got {}",
                UNCOMPRESSED_POINT_SIZE,
                bytes.len()
            )));
        }
        if bytes[0] != TAG_UNCOMPRESSED {
            return Err(ShadeError::InvalidPoint(format!(
                "bad uncompressed tag 0x{:02x}",
                bytes[0]
            )));
        }
        Self::decode_sec1(bytes)
    }

    /// Compressed encoding without the identity check. Callers guarantee a finite point.
    pub(crate) fn compressed_unchecked(&self) -> [u8; COMPRESSED_POINT_SIZE] {
        let encoded = self.inner.to_affine().to_encoded_point(true);
        let mut out = [0u8; COMPRESSED_POINT_SIZE];
        out.copy_from_slice(encoded.as_bytes());
        out
    }

    /// Uncompressed encoding without the identity check. Callers guarantee a finite point.
    pub(crate) fn uncompressed_unchecked(&self) -> [u8; UNCOMPRESSED_POINT_SIZE] {
        let encoded = self.inner.to_affine().to_encoded_point(false);
        let mut out = [0u8; UNCOMPRESSED_POINT_SIZE];
        out.copy_from_slice(encoded.as_bytes());
        out
    }

    fn ensure_finite(&self) -> Result<()> {
        if self.is_infinity() {
            return Err(ShadeError::InvalidPoint("point at infinity".into()));
        }
        Ok(())
    }

    fn decode_sec1(bytes: &[u8]) -> Result<Self> {
        let encoded = EncodedPoint::from_bytes(bytes)
            .map_err(|e| ShadeError::InvalidPoint(format!("malformed SEC1 encoding: {}", e)))?;
        Self::from_sec1(&encoded)
            .ok_or_else(|| ShadeError::InvalidPoint("point is not on the curve".into()))
    }

    fn from_sec1(encoded: &EncodedPoint) -> Option<Self> {
        let affine: Option<AffinePoint> = AffinePoint::from_encoded_point(encoded).into();
        affine.map(|a| Point {
            inner: ProjectivePoint::from(a),
        })
    }
}

impl std::fmt::Debug for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_infinity() {
            write!(f, "Point(infinity)")
        } else {
            write!(f, "Point({})", hex::encode(self.compressed_unchecked()))
        }
    }
}
