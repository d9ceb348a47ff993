use crate::config::HashAlgorithm;
use digest::Digest;
use sha2::Sha512;
use sha3::Sha3_512;
use zeroize::Zeroizing;

/// Digest width produced by every amplification hash
pub const DIGEST_SIZE: usize = 64;

/// Key material derived from a short text key
///
/// `effective` is `hash || reversed_hash` and replaces the raw text as the
/// key stream.
#[derive(Debug)]
pub struct Amplification {
    pub hash: Zeroizing<Vec<u8>>,
    pub reversed_hash: Zeroizing<Vec<u8>>,
    pub effective: Zeroizing<Vec<u8>>,
}

impl Amplification {
    pub fn len(&self) -> usize {
        self.effective.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effective.is_empty()
    }
}

/// Amplify text into `H(text) || H(reverse(text))`
pub fn amplify(text: &[u8], algorithm: HashAlgorithm) -> Amplification {
    let hash = digest_text(text, algorithm);

    let reversed: Zeroizing<Vec<u8>> = Zeroizing::new(text.iter().rev().copied().collect());
    let reversed_hash = digest_text(&reversed, algorithm);

    let mut effective = Zeroizing::new(Vec::with_capacity(hash.len() + reversed_hash.len()));
    effective.extend_from_slice(&hash);
    effective.extend_from_slice(&reversed_hash);

    Amplification {
        hash,
        reversed_hash,
        effective,
    }
}

/// Hash text and spread the digest so it carries no zero bytes
pub fn digest_text(text: &[u8], algorithm: HashAlgorithm) -> Zeroizing<Vec<u8>> {
    let mut digest = match algorithm {
        HashAlgorithm::Sha3 => raw_digest::<Sha3_512>(text),
        HashAlgorithm::Sha512 => raw_digest::<Sha512>(text),
        HashAlgorithm::Blake3 => {
            let mut out = Zeroizing::new(vec![0u8; DIGEST_SIZE]);
            let mut hasher = blake3::Hasher::new();
            hasher.update(text);
            hasher.finalize_xof().fill(&mut out);
            out
        }
    };
    spread(&mut digest);
    digest
}

fn raw_digest<D: Digest>(text: &[u8]) -> Zeroizing<Vec<u8>> {
    let mut hasher = D::new();
    hasher.update(text);
    Zeroizing::new(hasher.finalize().to_vec())
}

/// byte[i] = (byte[i] + i) mod 255, with 0 bumped to 1
///
/// Bytes are unsigned, so keys amplified by the C `vke` tool (signed `char`)
/// are not reproduced byte for byte.
fn spread(digest: &mut [u8]) {
    for (i, byte) in digest.iter_mut().enumerate() {
        let value = ((*byte as usize + i) % 255) as u8;
        *byte = if value == 0 { 1 } else { value };
    }
}
