//! # ClearBackend — Non-Confidential Reference Backend
//!
//! A working implementation of [`EncryptionBackend`] with **zero
//! confidentiality**: plaintexts live in an in-process table keyed by a
//! random nonce, and the "ciphertext" is that nonce plus an integrity tag.
//! Anyone holding the backend holds every plaintext.
//!
//! It exists so the engine and its tests exercise the full
//! encrypt → evaluate → reveal pipeline without a real FHE scheme, and so
//! a real scheme can be dropped in behind the same trait later.
//!
//! ## Semantics fixed here (and expected of real backends)
//!
//! - Arithmetic wraps mod 2^width; operands are already masked to width.
//! - Division by a zero divisor yields the all-ones value of the width —
//!   the backend cannot refuse without learning the operand, so the
//!   sentinel is the revealing workflow's to interpret.
//! - Fresh randomness per encryption: two encryptions of the same
//!   plaintext produce different ciphertexts.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};

use cove_core::{BackendError, IntWidth, PlainValue};

use crate::interface::{ArithBinary, BoolBinary, Ciphertext, Comparison, EncryptionBackend};

/// Domain separator for the ciphertext integrity tag.
const TAG_DOMAIN: &[u8] = b"cove.clear.v1";

/// Nonce length in bytes.
const NONCE_LEN: usize = 16;

/// Full ciphertext length: nonce plus SHA-256 tag.
const CIPHERTEXT_LEN: usize = NONCE_LEN + 32;

/// The reference backend: a nonce-keyed plaintext table.
pub struct ClearBackend {
    table: HashMap<[u8; NONCE_LEN], PlainValue>,
    rng: StdRng,
}

impl ClearBackend {
    /// Create a backend with entropy-seeded randomness.
    pub fn new() -> Self {
        Self {
            table: HashMap::new(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a backend with deterministic randomness, for tests that
    /// need reproducible ciphertext bytes.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            table: HashMap::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Number of plaintexts currently held.
    pub fn stored(&self) -> usize {
        self.table.len()
    }

    fn seal(&mut self, value: PlainValue) -> Ciphertext {
        let mut nonce = [0u8; NONCE_LEN];
        loop {
            self.rng.fill(&mut nonce);
            if !self.table.contains_key(&nonce) {
                break;
            }
        }
        self.table.insert(nonce, value);
        let mut bytes = Vec::with_capacity(CIPHERTEXT_LEN);
        bytes.extend_from_slice(&nonce);
        bytes.extend_from_slice(&tag(&nonce));
        Ciphertext::from_bytes(bytes)
    }

    fn open(&self, ciphertext: &Ciphertext) -> Result<PlainValue, BackendError> {
        let bytes = ciphertext.as_bytes();
        if bytes.len() != CIPHERTEXT_LEN {
            return Err(BackendError::MalformedCiphertext(format!(
                "expected {CIPHERTEXT_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&bytes[..NONCE_LEN]);
        if bytes[NONCE_LEN..] != tag(&nonce) {
            return Err(BackendError::MalformedCiphertext(
                "integrity tag mismatch".to_string(),
            ));
        }
        self.table.get(&nonce).copied().ok_or_else(|| {
            BackendError::DecryptionFailed("ciphertext unknown to this backend".to_string())
        })
    }

    fn open_bool(&self, ciphertext: &Ciphertext) -> Result<bool, BackendError> {
        self.open(ciphertext)?.as_bool().ok_or_else(|| {
            BackendError::Unsupported("boolean operation on a non-boolean ciphertext".to_string())
        })
    }

    fn open_uint_pair(
        &self,
        a: &Ciphertext,
        b: &Ciphertext,
    ) -> Result<(u64, u64, IntWidth), BackendError> {
        let (av, aw) = match self.open(a)? {
            PlainValue::Uint { value, width } => (value, width),
            PlainValue::Bool(_) => {
                return Err(BackendError::Unsupported(
                    "arithmetic on a boolean ciphertext".to_string(),
                ))
            }
        };
        let (bv, bw) = match self.open(b)? {
            PlainValue::Uint { value, width } => (value, width),
            PlainValue::Bool(_) => {
                return Err(BackendError::Unsupported(
                    "arithmetic on a boolean ciphertext".to_string(),
                ))
            }
        };
        if aw != bw {
            return Err(BackendError::Unsupported(format!(
                "operand widths disagree: {aw} vs {bw}"
            )));
        }
        Ok((av, bv, aw))
    }
}

impl Default for ClearBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl EncryptionBackend for ClearBackend {
    fn encrypt(&mut self, value: PlainValue) -> Result<Ciphertext, BackendError> {
        Ok(self.seal(value))
    }

    fn decrypt(&self, ciphertext: &Ciphertext) -> Result<PlainValue, BackendError> {
        self.open(ciphertext)
    }

    fn bool_binary(
        &mut self,
        op: BoolBinary,
        a: &Ciphertext,
        b: &Ciphertext,
    ) -> Result<Ciphertext, BackendError> {
        let (x, y) = (self.open_bool(a)?, self.open_bool(b)?);
        let out = match op {
            BoolBinary::And => x && y,
            BoolBinary::Or => x || y,
            BoolBinary::Xor => x != y,
        };
        Ok(self.seal(PlainValue::bool(out)))
    }

    fn bool_not(&mut self, a: &Ciphertext) -> Result<Ciphertext, BackendError> {
        let x = self.open_bool(a)?;
        Ok(self.seal(PlainValue::bool(!x)))
    }

    fn arith_binary(
        &mut self,
        op: ArithBinary,
        a: &Ciphertext,
        b: &Ciphertext,
    ) -> Result<Ciphertext, BackendError> {
        let (x, y, width) = self.open_uint_pair(a, b)?;
        let out = match op {
            ArithBinary::Add => width.mask(x.wrapping_add(y)),
            ArithBinary::Sub => width.mask(x.wrapping_sub(y)),
            ArithBinary::Mul => width.mask(x.wrapping_mul(y)),
            // Zero divisor: all-ones of the width. The engine cannot
            // pre-check a value it cannot see, so evaluation stays total.
            ArithBinary::Div => {
                if y == 0 {
                    width.max_value()
                } else {
                    x / y
                }
            }
        };
        Ok(self.seal(PlainValue::uint(out, width)))
    }

    fn compare(
        &mut self,
        op: Comparison,
        a: &Ciphertext,
        b: &Ciphertext,
    ) -> Result<Ciphertext, BackendError> {
        let (x, y, _) = self.open_uint_pair(a, b)?;
        let out = match op {
            Comparison::Eq => x == y,
            Comparison::Gt => x > y,
            Comparison::Lt => x < y,
            Comparison::Gte => x >= y,
            Comparison::Lte => x <= y,
        };
        Ok(self.seal(PlainValue::bool(out)))
    }

    fn select(
        &mut self,
        condition: &Ciphertext,
        if_true: &Ciphertext,
        if_false: &Ciphertext,
    ) -> Result<Ciphertext, BackendError> {
        let cond = self.open_bool(condition)?;
        let t = self.open(if_true)?;
        let f = self.open(if_false)?;
        if t.value_type() != f.value_type() {
            return Err(BackendError::Unsupported(format!(
                "select branches disagree: {} vs {}",
                t.value_type(),
                f.value_type()
            )));
        }
        Ok(self.seal(if cond { t } else { f }))
    }
}

fn tag(nonce: &[u8; NONCE_LEN]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(TAG_DOMAIN);
    hasher.update(nonce);
    hasher.finalize().into()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn widths() -> impl Strategy<Value = IntWidth> {
        prop_oneof![
            Just(IntWidth::W8),
            Just(IntWidth::W16),
            Just(IntWidth::W32),
            Just(IntWidth::W64),
        ]
    }

    proptest! {
        /// Addition agrees with plain wrapping addition at every width.
        #[test]
        fn add_matches_plain_semantics(x in any::<u64>(), y in any::<u64>(), w in widths()) {
            let mut b = ClearBackend::with_seed(0);
            let cx = b.encrypt(PlainValue::uint(x, w)).unwrap();
            let cy = b.encrypt(PlainValue::uint(y, w)).unwrap();
            let sum = b.arith_binary(ArithBinary::Add, &cx, &cy).unwrap();
            let expected = w.mask(w.mask(x).wrapping_add(w.mask(y)));
            prop_assert_eq!(b.decrypt(&sum).unwrap().as_uint(), Some(expected));
        }

        /// GT reveals true iff the masked plaintexts compare that way.
        #[test]
        fn gt_matches_plain_order(x in any::<u64>(), y in any::<u64>(), w in widths()) {
            let mut b = ClearBackend::with_seed(0);
            let cx = b.encrypt(PlainValue::uint(x, w)).unwrap();
            let cy = b.encrypt(PlainValue::uint(y, w)).unwrap();
            let gt = b.compare(Comparison::Gt, &cx, &cy).unwrap();
            prop_assert_eq!(b.decrypt(&gt).unwrap().as_bool(), Some(w.mask(x) > w.mask(y)));
        }

        /// select(GT(x, y), x, y) reveals max(x, y).
        #[test]
        fn select_on_gt_yields_max(x in any::<u64>(), y in any::<u64>(), w in widths()) {
            let mut b = ClearBackend::with_seed(0);
            let cx = b.encrypt(PlainValue::uint(x, w)).unwrap();
            let cy = b.encrypt(PlainValue::uint(y, w)).unwrap();
            let gt = b.compare(Comparison::Gt, &cx, &cy).unwrap();
            let max = b.select(&gt, &cx, &cy).unwrap();
            let expected = w.mask(x).max(w.mask(y));
            prop_assert_eq!(b.decrypt(&max).unwrap().as_uint(), Some(expected));
        }

        /// Decrypt inverts encrypt for any plaintext.
        #[test]
        fn decrypt_inverts_encrypt(x in any::<u64>(), w in widths()) {
            let mut b = ClearBackend::with_seed(0);
            let v = PlainValue::uint(x, w);
            let ct = b.encrypt(v).unwrap();
            prop_assert_eq!(b.decrypt(&ct).unwrap(), v);
        }
    }
}
