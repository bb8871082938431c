//! Point compression on `alt_bn128`, the curve the Conditional Tokens contract uses to make
//! collection IDs additive.
//!
//! A collection ID is the compressed form of a curve point: the low 254 bits hold `x` and bit 254
//! holds the parity of `y`. Compression never sets bit 255, but decompression reads either flag
//! bit as odd parity, the same as the contract does for a parent collection.
//!
//! Any change here changes every collection and position ID derived by this crate, so the tests
//! pin the encoding to vectors produced by the contract's algorithm.

use alloy::primitives::B256;
use ark_bn254::{Fq, G1Affine, G1Projective};
use ark_ff::{BigInteger as _, Field as _, PrimeField as _};

const Y_PARITY_BIT: u8 = 0b0100_0000;
const HASH_PARITY_BIT: u8 = 0b1000_0000;
const FLAG_BITS: u8 = Y_PARITY_BIT | HASH_PARITY_BIT;
const X_MASK: u8 = 0b0011_1111;

/// Maps a keccak hash onto the curve.
///
/// The highest bit of `hash` selects the parity of `y`. `x` starts at `hash mod P` and is
/// incremented until `x^3 + 3` is a quadratic residue, exactly like the contract's `do..while`.
pub(crate) fn hash_to_point(hash: &B256) -> G1Affine {
    let odd = hash[0] & HASH_PARITY_BIT != 0;
    let mut x = Fq::from_be_bytes_mod_order(hash.as_slice());

    loop {
        x += Fq::ONE;
        if let Some(y) = matching_y(x) {
            return G1Affine::new_unchecked(x, with_parity(y, odd));
        }
    }
}

/// Decompresses a non-null collection ID, returning `None` when it does not encode a curve point.
pub(crate) fn decompress(collection_id: &B256) -> Option<G1Affine> {
    let odd = collection_id[0] & FLAG_BITS != 0;

    let mut chopped = collection_id.0;
    chopped[0] &= X_MASK;
    let x = Fq::from_be_bytes_mod_order(&chopped);

    // `from_be_bytes_mod_order` silently reduces, so an `x >= P` only shows up as a mismatch.
    if x.into_bigint().to_bytes_be() != chopped {
        return None;
    }

    let y = matching_y(x)?;
    Some(G1Affine::new_unchecked(x, with_parity(y, odd)))
}

/// Compresses a point back into a collection ID. The point at infinity compresses to zero.
pub(crate) fn compress(point: &G1Affine) -> B256 {
    if point.infinity {
        return B256::ZERO;
    }

    let mut bytes = [0_u8; 32];
    bytes.copy_from_slice(&point.x.into_bigint().to_bytes_be());

    if point.y.into_bigint().is_odd() {
        bytes[0] ^= Y_PARITY_BIT;
    }

    B256::from(bytes)
}

/// Adds two points in affine form.
pub(crate) fn add(lhs: &G1Affine, rhs: &G1Affine) -> G1Affine {
    let sum: G1Projective = *lhs + *rhs;
    sum.into()
}

/// Returns some `y` with `y^2 = x^3 + 3`, or `None` if `x` is not the abscissa of a curve point.
fn matching_y(x: Fq) -> Option<Fq> {
    let yy = x * x * x + Fq::from(3_u64);
    yy.sqrt()
}

/// Picks whichever of `y` and `P - y` has the requested parity.
fn with_parity(y: Fq, odd: bool) -> Fq {
    if y.into_bigint().is_odd() == odd { y } else { -y }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::b256;

    use super::*;

    #[test]
    fn compress_then_decompress_is_identity() {
        let hash = b256!("0x20e949416f9b53d227472744dcc6e807311aa8cf1f3de6e23d9f146759d5afe2");
        let point = hash_to_point(&hash);

        let compressed = compress(&point);
        let restored = decompress(&compressed).expect("compressed point should decompress");

        assert_eq!(restored, point);
    }

    #[test]
    fn compressed_ids_never_use_the_top_bit() {
        let hash = b256!("0xffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff");
        let compressed = compress(&hash_to_point(&hash));

        assert_eq!(compressed[0] & HASH_PARITY_BIT, 0);
    }

    #[test]
    fn hash_parity_selects_y_parity() {
        let even = B256::ZERO;
        let mut odd = even;
        odd.0[0] = HASH_PARITY_BIT;

        let even_point = hash_to_point(&even);
        let odd_point = hash_to_point(&odd);

        assert!(!even_point.y.into_bigint().is_odd(), "even hash must give even y");
        assert!(odd_point.y.into_bigint().is_odd(), "odd hash must give odd y");
    }

    #[test]
    fn first_point_after_zero_is_one_two() {
        // x = 1 gives y^2 = 4, the generator of alt_bn128.
        let point = hash_to_point(&B256::ZERO);

        assert_eq!(point.x, Fq::ONE);
        assert_eq!(point.y, Fq::from(2_u64));
        assert_eq!(
            compress(&point),
            b256!("0x0000000000000000000000000000000000000000000000000000000000000001")
        );
    }

    #[test]
    fn either_flag_bit_decompresses_to_odd_y() {
        let hash = b256!("0x20e949416f9b53d227472744dcc6e807311aa8cf1f3de6e23d9f146759d5afe2");
        let point = hash_to_point(&hash);
        let mut even = compress(&point);
        even.0[0] &= X_MASK;

        let mut low_flag = even;
        low_flag.0[0] |= Y_PARITY_BIT;
        let mut high_flag = even;
        high_flag.0[0] |= HASH_PARITY_BIT;
        let mut both_flags = even;
        both_flags.0[0] |= FLAG_BITS;

        let even_point = decompress(&even).expect("x is on the curve");
        let odd_point = decompress(&low_flag).expect("x is on the curve");

        assert!(!even_point.y.into_bigint().is_odd());
        assert!(odd_point.y.into_bigint().is_odd());
        assert_eq!(decompress(&high_flag), Some(odd_point));
        assert_eq!(decompress(&both_flags), Some(odd_point));
    }

    #[test]
    fn decompress_rejects_x_above_field_modulus() {
        // P = 0x30644e72...fd47; 0x3fff... is above it once the two flag bits are cleared.
        let id = b256!("0x3fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff");

        assert!(decompress(&id).is_none());
    }

    #[test]
    fn decompress_rejects_points_off_the_curve() {
        // x = 4: 4^3 + 3 = 67 is not a square modulo P.
        let id = b256!("0x0000000000000000000000000000000000000000000000000000000000000004");

        assert!(decompress(&id).is_none());
    }

    #[test]
    fn adding_a_point_to_its_negation_compresses_to_zero() {
        let point = hash_to_point(&B256::ZERO);
        let negated = G1Affine::new_unchecked(point.x, -point.y);

        assert_eq!(compress(&add(&point, &negated)), B256::ZERO);
    }
}
