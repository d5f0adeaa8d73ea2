//! Seeded randomized checks over the data-model codecs.

use assert_matches::assert_matches;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use hooks_objects::sto::{StBuilder, StReader};
use hooks_objects::transaction::Transaction;
use hooks_objects::{fields, AccountId, AddressError, Hash256};

fn rng() -> ChaCha20Rng {
    ChaCha20Rng::seed_from_u64(0x0442_1337)
}

#[test]
fn address_round_trip_over_random_ids() {
    let mut rng = rng();
    for _ in 0..200 {
        let id = AccountId::new(rng.random());
        let address = id.to_address();
        assert_eq!(AccountId::from_address(&address).unwrap(), id);
    }
}

#[test]
fn mangled_addresses_never_decode_silently() {
    let mut rng = rng();
    for _ in 0..100 {
        let id = AccountId::new(rng.random());
        let address = id.to_address();

        // Swap one character for a different alphabet character.
        let pos = rng.random_range(0..address.len());
        let mut mangled: Vec<char> = address.chars().collect();
        let replacement = if mangled[pos] == 'r' { 'p' } else { 'r' };
        if mangled[pos] == replacement {
            continue;
        }
        mangled[pos] = replacement;
        let mangled: String = mangled.into_iter().collect();

        // Either rejected outright, or decoded to something else is impossible: base58-check
        // must catch single-character substitutions.
        assert_matches!(
            AccountId::from_address(&mangled),
            Err(AddressError::ChecksumMismatch | AddressError::InvalidAddressLength(_))
        );
    }
}

#[test]
fn random_payment_images_round_trip_through_the_reader() {
    let mut rng = rng();
    for _ in 0..100 {
        let blob_len = rng.random_range(0..600);
        let blob: Vec<u8> = (0..blob_len).map(|_| rng.random()).collect();
        let namespace = Hash256::new(rng.random());

        let bytes = StBuilder::new()
            .u16(fields::TRANSACTION_TYPE, 0)
            .u32(fields::SEQUENCE, rng.random())
            .hash(fields::HOOK_NAMESPACE, namespace)
            .amount(fields::FEE, rng.random_range(0..1_000_000))
            .blob(fields::SIGNING_PUB_KEY, &blob)
            .account(fields::ACCOUNT, AccountId::new(rng.random()))
            .build()
            .unwrap();

        let reader = StReader::new(&bytes);
        reader.validate().unwrap();
        let ns = reader.find(fields::HOOK_NAMESPACE).unwrap().unwrap();
        assert_eq!(reader.payload(&ns), namespace.as_ref());
        let pk = reader.find(fields::SIGNING_PUB_KEY).unwrap().unwrap();
        assert_eq!(reader.payload(&pk), &blob[..]);

        let tx = Transaction::from_bytes(bytes).unwrap();
        assert_eq!(tx.id(), Transaction::from_bytes(tx.as_bytes().to_vec()).unwrap().id());
    }
}

#[test]
fn truncations_inside_a_field_never_validate() {
    let bytes = StBuilder::new()
        .u16(fields::TRANSACTION_TYPE, 0)
        .blob(fields::SIGNING_PUB_KEY, &[0xab; 40])
        .account(fields::ACCOUNT, AccountId::new([9; 20]))
        .build()
        .unwrap();

    // A cut at a field boundary leaves a shorter but well-formed sequence; any other cut must
    // fail validation.
    let boundaries: Vec<usize> =
        StReader::new(&bytes).fields().unwrap().iter().map(|f| f.full.end).collect();
    for cut in 1..bytes.len() {
        let truncated = StReader::new(&bytes[..cut]).validate();
        if boundaries.contains(&cut) {
            assert!(truncated.is_ok(), "cut at boundary {cut} must stay well-formed");
        } else {
            assert!(truncated.is_err(), "cut at {cut} validated");
        }
    }
}
