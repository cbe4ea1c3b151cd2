//! # Encrypted Value Types
//!
//! The closed type lattice of the confidential value model: booleans and
//! fixed-width unsigned integers of a bounded width set. Every ciphertext
//! handle carries exactly one `ValueType`, declared at encryption and
//! immutable thereafter. Operations across mismatched types are rejected
//! before any evaluation is attempted.
//!
//! `PlainValue` is the plaintext shape that crosses the encryption backend
//! seam — into the backend at encryption, out of it on an authorized
//! reveal. It never appears anywhere else in the engine.
//!
//! ## Security Invariant
//!
//! Integer plaintexts are masked to their declared width at construction.
//! There is no `PlainValue` whose stored value exceeds what its width can
//! represent, so wrapping arithmetic in the backend and type checks in the
//! engine agree on one domain.

use serde::{Deserialize, Serialize};

/// Bit width of an encrypted unsigned integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntWidth {
    /// 8-bit unsigned.
    W8,
    /// 16-bit unsigned.
    W16,
    /// 32-bit unsigned.
    W32,
    /// 64-bit unsigned.
    W64,
}

impl IntWidth {
    /// Number of bits of this width.
    pub fn bits(&self) -> u32 {
        match self {
            IntWidth::W8 => 8,
            IntWidth::W16 => 16,
            IntWidth::W32 => 32,
            IntWidth::W64 => 64,
        }
    }

    /// The largest value representable at this width (also the wrap mask).
    pub fn max_value(&self) -> u64 {
        match self {
            IntWidth::W8 => u64::from(u8::MAX),
            IntWidth::W16 => u64::from(u16::MAX),
            IntWidth::W32 => u64::from(u32::MAX),
            IntWidth::W64 => u64::MAX,
        }
    }

    /// Mask a raw value into this width's domain.
    pub fn mask(&self, value: u64) -> u64 {
        value & self.max_value()
    }
}

impl std::fmt::Display for IntWidth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "u{}", self.bits())
    }
}

/// The declared type of a ciphertext handle.
///
/// A handle's type is fixed at creation. Width and kind both participate
/// in compatibility checks: a `Uint(W8)` operand never combines with a
/// `Uint(W16)` operand, and neither combines with a `Bool`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    /// An encrypted boolean.
    Bool,
    /// An encrypted unsigned integer of the given width.
    Uint(IntWidth),
}

impl ValueType {
    /// Whether this type is an unsigned integer of any width.
    pub fn is_uint(&self) -> bool {
        matches!(self, ValueType::Uint(_))
    }

    /// The integer width, if this is an integer type.
    pub fn width(&self) -> Option<IntWidth> {
        match self {
            ValueType::Bool => None,
            ValueType::Uint(w) => Some(*w),
        }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueType::Bool => f.write_str("bool"),
            ValueType::Uint(w) => write!(f, "{w}"),
        }
    }
}

/// A plaintext value at the encryption backend seam.
///
/// Constructed on the way into `encrypt` and produced by an authorized
/// `reveal`. The engine core never holds one for a live handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlainValue {
    /// A boolean plaintext.
    Bool(bool),
    /// An unsigned integer plaintext, already masked to its width.
    Uint {
        /// The value, within `width.max_value()`.
        value: u64,
        /// The declared width.
        width: IntWidth,
    },
}

impl PlainValue {
    /// Construct a boolean plaintext.
    pub fn bool(value: bool) -> Self {
        PlainValue::Bool(value)
    }

    /// Construct an integer plaintext, masking `value` into `width`.
    pub fn uint(value: u64, width: IntWidth) -> Self {
        PlainValue::Uint {
            value: width.mask(value),
            width,
        }
    }

    /// The declared type of this plaintext.
    pub fn value_type(&self) -> ValueType {
        match self {
            PlainValue::Bool(_) => ValueType::Bool,
            PlainValue::Uint { width, .. } => ValueType::Uint(*width),
        }
    }

    /// The boolean payload, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PlainValue::Bool(b) => Some(*b),
            PlainValue::Uint { .. } => None,
        }
    }

    /// The integer payload, if this is an integer.
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            PlainValue::Bool(_) => None,
            PlainValue::Uint { value, .. } => Some(*value),
        }
    }
}

impl std::fmt::Display for PlainValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlainValue::Bool(b) => write!(f, "{b}"),
            PlainValue::Uint { value, width } => write!(f, "{value}{width}"),
        }
    }
}
