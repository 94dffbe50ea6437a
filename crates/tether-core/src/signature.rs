//! Signature: per-kind integer tag carried by every dispatch table

use std::fmt;
use std::num::NonZeroU32;

/// Integer tag identifying the kind of native object a handle wraps.
///
/// Tag 0 is reserved for "not a recognized handle" and cannot be
/// represented; the C surface maps a raw 0 to `None`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Signature(NonZeroU32);

impl Signature {
    /// Declare a signature at compile time.
    ///
    /// ```ignore
    /// const WINDOW: Signature = Signature::new(1);
    /// ```
    ///
    /// Panics (at compile time when used in a const) if `raw` is 0.
    pub const fn new(raw: u32) -> Self {
        match NonZeroU32::new(raw) {
            Some(tag) => Self(tag),
            None => panic!("signature 0 is reserved"),
        }
    }

    /// Convert a raw tag, returning `None` for the reserved tag 0
    #[inline]
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match NonZeroU32::new(raw) {
            Some(tag) => Some(Self(tag)),
            None => None,
        }
    }

    /// Raw integer tag
    #[inline]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Raw tag of an optional signature (0 when absent)
    #[inline]
    pub fn raw_or_zero(sig: Option<Signature>) -> u32 {
        sig.map_or(0, Signature::get)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "signature {}", self.0)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self.0)
    }
}
