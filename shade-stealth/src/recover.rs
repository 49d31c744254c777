//! Stealth private key recovery.
//!
//! `stealth_priv = spend_priv + sh (mod n)`, where `sh` is recomputed from
//! `view_priv * ephemeral_pub`. The result is checked against the expected
//! address before it is handed out.

use shade_core::error::{Result, ShadeError};
use shade_core::types::{Announcement, PublicKey, ShadeKeys, StealthAddress, StealthKeyPair};
use shade_core::Scalar;
use shade_crypto::{derive_stealth_address, derive_stealth_private_key, SharedSecret};

/// Reconstructs the one-time key pair for `expected`.
///
/// # Errors
/// - `AddressMismatch` if the recovered key does not derive `expected`; the
///   recovered scalar is zeroized and nothing is returned
/// - `InvalidScalar` / `InvalidPoint` on degenerate inputs
pub fn recover_stealth_key(
    expected: &StealthAddress,
    ephemeral_pub: &PublicKey,
    spend_priv: &Scalar,
    view_priv: &Scalar,
) -> Result<StealthKeyPair> {
    let sh = SharedSecret::derive(view_priv, ephemeral_pub)?.to_scalar()?;
    let private = derive_stealth_private_key(spend_priv, &sh)?;
    let public = PublicKey::from_secret(&private);
    let address = derive_stealth_address(&public);

    if !address.ct_eq(expected) {
        return Err(ShadeError::AddressMismatch {
            expected: expected.to_hex_string(),
            derived: address.to_hex_string(),
        });
    }

    Ok(StealthKeyPair::new(private, public, address))
}

/// Recovers the key pair for an announcement with the full recipient key set.
pub fn recover_from_announcement(
    announcement: &Announcement,
    keys: &ShadeKeys,
) -> Result<StealthKeyPair> {
    recover_stealth_key(
        &announcement.stealth_address,
        &announcement.ephemeral_pub,
        keys.spend.secret(),
        keys.view.secret(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::{generate_stealth_address, generate_with_ephemeral};
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use shade_core::types::{KeyPair, MetaAddress};
    use shade_crypto::{derive_stealth_public_key, keccak256};

    fn scalar(k: u64) -> Scalar {
        Scalar::from_u64(k).unwrap()
    }

    #[test]
    fn test_recover_matches_generation() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let keys = ShadeKeys::generate(&mut rng).unwrap();
        let generated = generate_stealth_address(&keys.meta_address(), &mut rng).unwrap();

        let recovered = recover_stealth_key(
            &generated.address,
            &generated.ephemeral_pub,
            keys.spend.secret(),
            keys.view.secret(),
        )
        .unwrap();

        assert_eq!(recovered.address(), &generated.address);
        assert_eq!(*recovered.public(), PublicKey::from_secret(recovered.private()));
    }

    #[test]
    fn test_wrong_spend_key_is_mismatch() {
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let keys = ShadeKeys::generate(&mut rng).unwrap();
        let generated = generate_stealth_address(&keys.meta_address(), &mut rng).unwrap();
        let stranger = KeyPair::generate(&mut rng).unwrap();

        let err = recover_stealth_key(
            &generated.address,
            &generated.ephemeral_pub,
            stranger.secret(),
            keys.view.secret(),
        )
        .unwrap_err();

        match err {
            ShadeError::AddressMismatch { expected, derived } => {
                assert_eq!(expected, generated.address.to_hex_string());
                assert_ne!(expected, derived);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_wrong_view_key_is_mismatch() {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let keys = ShadeKeys::generate(&mut rng).unwrap();
        let generated = generate_stealth_address(&keys.meta_address(), &mut rng).unwrap();

        assert!(matches!(
            recover_stealth_key(
                &generated.address,
                &generated.ephemeral_pub,
                keys.spend.secret(),
                keys.spend.secret(),
            ),
            Err(ShadeError::AddressMismatch { .. })
        ));
    }

    /// spendPriv = 1, viewPriv = 2, ephemPriv = 3 traced by hand.
    #[test]
    fn test_small_scalar_scenario() {
        let spend = KeyPair::from_secret(scalar(1));
        let view = KeyPair::from_secret(scalar(2));
        let meta = MetaAddress::new(*spend.public(), *view.public());
        assert_eq!(spend.public().as_point(), &shade_core::Point::GENERATOR);

        let generated = generate_with_ephemeral(&meta, &scalar(3)).unwrap();
        assert_eq!(generated.ephemeral_pub, PublicKey::from_secret(&scalar(3)));

        // 3 * (2G) = 6G = 2 * (3G)
        let six_g = PublicKey::from_secret(&scalar(6));
        let digest = keccak256(&six_g.to_uncompressed());
        let sh = Scalar::reduce(&digest).unwrap();
        assert_eq!(generated.view_tag, digest[0]);

        // stealthPub = G + sh*G = (1 + sh)G
        let one_plus_sh = scalar(1).add(&sh).unwrap();
        let stealth_pub = derive_stealth_public_key(spend.public(), &sh).unwrap();
        assert_eq!(stealth_pub, PublicKey::from_secret(&one_plus_sh));
        assert_eq!(generated.address, derive_stealth_address(&stealth_pub));

        let recovered = recover_stealth_key(
            &generated.address,
            &generated.ephemeral_pub,
            spend.secret(),
            view.secret(),
        )
        .unwrap();
        assert_eq!(recovered.private(), &one_plus_sh);
        assert_eq!(recovered.public(), &stealth_pub);
    }

    #[test]
    fn test_recover_from_announcement() {
        let mut rng = ChaCha20Rng::seed_from_u64(4);
        let keys = ShadeKeys::generate(&mut rng).unwrap();
        let payment =
            crate::payment::create_stealth_payment(&keys.meta_address(), &mut rng).unwrap();

        let recovered = recover_from_announcement(&payment.announcement, &keys).unwrap();
        assert_eq!(recovered.address(), &payment.stealth_address);
    }
}
