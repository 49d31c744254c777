//! End-to-end properties of generate / scan / recover over random keys.

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use shade_core::types::{PublicKey, ShadeKeys};
use shade_core::Scalar;
use shade_stealth::{
    check_ownership, generate_stealth_address, generate_with_ephemeral, recover_stealth_key,
};

fn keys_from_seed(seed: u64) -> ShadeKeys {
    ShadeKeys::generate(&mut ChaCha20Rng::seed_from_u64(seed)).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn generation_and_recovery_agree(key_seed in any::<u64>(), draw_seed in any::<u64>()) {
        let keys = keys_from_seed(key_seed);
        let mut rng = ChaCha20Rng::seed_from_u64(draw_seed);
        let generated = generate_stealth_address(&keys.meta_address(), &mut rng).unwrap();

        let recovered = recover_stealth_key(
            &generated.address,
            &generated.ephemeral_pub,
            keys.spend.secret(),
            keys.view.secret(),
        ).unwrap();

        prop_assert_eq!(recovered.address(), &generated.address);
        prop_assert_eq!(*recovered.public(), PublicKey::from_secret(recovered.private()));
    }

    #[test]
    fn owner_always_recognised(key_seed in any::<u64>(), draw_seed in any::<u64>()) {
        let keys = keys_from_seed(key_seed);
        let mut rng = ChaCha20Rng::seed_from_u64(draw_seed);
        let generated = generate_stealth_address(&keys.meta_address(), &mut rng).unwrap();

        // The tag prefilter never hides an owned payment
        let with_tag = check_ownership(
            &generated.address,
            &generated.ephemeral_pub,
            keys.view.secret(),
            keys.spend.public(),
            Some(generated.view_tag),
        );
        let without_tag = check_ownership(
            &generated.address,
            &generated.ephemeral_pub,
            keys.view.secret(),
            keys.spend.public(),
            None,
        );
        prop_assert!(with_tag);
        prop_assert!(without_tag);
    }

    #[test]
    fn strangers_never_recognised(owner_seed in any::<u64>(), draw_seed in any::<u64>()) {
        let owner = keys_from_seed(owner_seed);
        let stranger = keys_from_seed(owner_seed.wrapping_add(1));
        let mut rng = ChaCha20Rng::seed_from_u64(draw_seed);
        let generated = generate_stealth_address(&owner.meta_address(), &mut rng).unwrap();

        prop_assert!(!check_ownership(
            &generated.address,
            &generated.ephemeral_pub,
            stranger.view.secret(),
            stranger.spend.public(),
            None,
        ));
    }

    #[test]
    fn fixed_ephemeral_is_deterministic(key_seed in any::<u64>(), ephemeral in 1u64..) {
        let meta = keys_from_seed(key_seed).meta_address();
        let ephemeral = Scalar::from_u64(ephemeral).unwrap();

        let a = generate_with_ephemeral(&meta, &ephemeral).unwrap();
        let b = generate_with_ephemeral(&meta, &ephemeral).unwrap();
        prop_assert_eq!(a, b);
    }
}
