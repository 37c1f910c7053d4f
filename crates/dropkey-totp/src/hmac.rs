use sha1::{Digest, Sha1};

use crate::types::DIGEST_LEN;

/// SHA-1 block size.
const BLOCK_LEN: usize = 64;

const INNER_PAD: u8 = 0x36;
const OUTER_PAD: u8 = 0x5c;

/// Standard HMAC construction over SHA-1 (RFC 2104).
///
/// The key is normalized to exactly one hash block: keys longer than 64
/// bytes are replaced by their SHA-1 digest before padding, shorter keys
/// are zero-padded on the right. Total over all byte sequences; no I/O.
pub fn hmac_sha1(key: &[u8], message: &[u8]) -> [u8; DIGEST_LEN] {
    let mut block = [0u8; BLOCK_LEN];
    if key.len() > BLOCK_LEN {
        block[..DIGEST_LEN].copy_from_slice(&Sha1::digest(key));
    } else {
        block[..key.len()].copy_from_slice(key);
    }

    let mut inner = Sha1::new();
    inner.update(xor_block(&block, INNER_PAD));
    inner.update(message);
    let inner_digest = inner.finalize();

    let mut outer = Sha1::new();
    outer.update(xor_block(&block, OUTER_PAD));
    outer.update(inner_digest);

    outer.finalize().into()
}

fn xor_block(block: &[u8; BLOCK_LEN], pad: u8) -> [u8; BLOCK_LEN] {
    let mut out = [0u8; BLOCK_LEN];
    for (o, b) in out.iter_mut().zip(block.iter()) {
        *o = b ^ pad;
    }
    out
}

#[cfg(test)]
mod test {
    use super::hmac_sha1;

    // RFC 2202 test case 1
    #[test]
    fn short_binary_key() {
        let tag = hmac_sha1(&[0x0b; 20], b"Hi There");
        assert_eq!(
            hex::encode(tag),
            "b617318655057264e28bc0b6fb378c8ef146be00"
        );
    }

    // RFC 2202 test case 2
    #[test]
    fn ascii_key() {
        let tag = hmac_sha1(b"Jefe", b"what do ya want for nothing?");
        assert_eq!(
            hex::encode(tag),
            "effcdf6ae5eb2fa2d27416d5f184df9c259a7c79"
        );
    }

    // RFC 2202 test case 6: the key is longer than one SHA-1 block and
    // must be hashed down before padding
    #[test]
    fn key_longer_than_block() {
        let tag = hmac_sha1(
            &[0xaa; 80],
            b"Test Using Larger Than Block-Size Key - Hash Key First",
        );
        assert_eq!(
            hex::encode(tag),
            "aa4ae5e15272d00e95705637ce8a3b55ed402112"
        );
    }

    #[test]
    fn matches_reference_crate() {
        let cases: Vec<(Vec<u8>, Vec<u8>)> = vec![
            (vec![], vec![]),
            (b"key".to_vec(), b"counter".to_vec()),
            (vec![0x7f; 64], 0u64.to_be_bytes().to_vec()),
            (vec![0xee; 65], 1234567890u64.to_be_bytes().to_vec()),
        ];

        for (key, message) in cases {
            assert_eq!(
                hmac_sha1(&key, &message),
                hmacsha1::hmac_sha1(&key, &message),
                "key {:02x?}", key
            );
        }
    }
}
