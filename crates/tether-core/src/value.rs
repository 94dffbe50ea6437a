//! ScriptValue: NaN-boxed u64 value crossing the bridge
//!
//! The script runtime hands the bridge values in this encoding, and the C
//! surface passes them around as plain `u64`.
//!
//! # Encoding
//!
//! ```text
//! f64 (float): Any value where upper 13 bits != 0x1FFF (raw IEEE 754)
//!              NaNs are stored as 0x7FF8000000000000
//! Tagged:      0xFFF8 + 3-bit tag + 48-bit payload (NaN-boxed)
//!   - Cell:      0xFFF8000000000000 | (cell id & 0xFFFFFFFFFFFF)  [tag=000]
//!   - i32 (int): 0xFFF8001000000000 | (i32 as u64)                [tag=001]
//!   - bool:      0xFFF8002000000000 | (b as u64)                  [tag=010]
//!   - function:  0xFFF8003000000000 | (function id as u64)        [tag=011]
//!   - null:      0xFFF8006000000000                               [tag=110]
//! ```
//!
//! A cell is a runtime-allocated opaque value. Handles are cells whose
//! single pointer slot holds a native address.

/// NaN-boxed 64-bit script value.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ScriptValue(u64);

const NAN_BOX_BASE: u64 = 0xFFF8_0000_0000_0000;
const TAG_SHIFT: u64 = 48;
const TAG_MASK: u64 = 0x7 << TAG_SHIFT;
const PAYLOAD_MASK: u64 = 0x0000_FFFF_FFFF_FFFF;
const PAYLOAD_MASK_32: u64 = 0x0000_0000_FFFF_FFFF;

const TAG_CELL: u64 = 0x0;
const TAG_I32: u64 = 0x1;
const TAG_BOOL: u64 = 0x2;
const TAG_FUNC: u64 = 0x3;
const TAG_NULL: u64 = 0x6;

const NULL_BITS: u64 = NAN_BOX_BASE | (TAG_NULL << TAG_SHIFT);
const CANONICAL_NAN: u64 = 0x7FF8_0000_0000_0000;

impl ScriptValue {
    /// Create from raw u64 bits
    #[inline(always)]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Get raw u64 bits
    #[inline(always)]
    pub const fn to_bits(self) -> u64 {
        self.0
    }

    #[inline]
    const fn tagged(tag: u64, payload: u64) -> Self {
        Self(NAN_BOX_BASE | (tag << TAG_SHIFT) | (payload & PAYLOAD_MASK))
    }

    /// Create a null value
    #[inline]
    pub const fn null() -> Self {
        Self(NULL_BITS)
    }

    /// Create a boolean value
    #[inline]
    pub const fn bool(b: bool) -> Self {
        Self::tagged(TAG_BOOL, b as u64)
    }

    /// Create an i32 value
    #[inline]
    pub const fn i32(i: i32) -> Self {
        Self::tagged(TAG_I32, i as u32 as u64)
    }

    /// Create an f64 value (stored as a raw IEEE 754 double, not NaN-boxed).
    ///
    /// Every NaN maps to one positive quiet NaN so no float can land in the
    /// tagged space.
    #[inline]
    pub fn f64(f: f64) -> Self {
        if f.is_nan() {
            Self(CANONICAL_NAN)
        } else {
            Self(f.to_bits())
        }
    }

    /// Reference a runtime cell by id (48-bit)
    #[inline]
    pub const fn cell(id: u64) -> Self {
        Self::tagged(TAG_CELL, id)
    }

    /// Reference a runtime function by id (48-bit)
    #[inline]
    pub const fn function(id: u64) -> Self {
        Self::tagged(TAG_FUNC, id)
    }

    #[inline]
    const fn is_nan_boxed(&self) -> bool {
        (self.0 & NAN_BOX_BASE) == NAN_BOX_BASE
    }

    #[inline]
    const fn get_tag(&self) -> u64 {
        (self.0 & TAG_MASK) >> TAG_SHIFT
    }

    #[inline]
    const fn has_tag(&self, tag: u64) -> bool {
        self.is_nan_boxed() && self.get_tag() == tag
    }

    /// Check if value is null
    #[inline]
    pub const fn is_null(&self) -> bool {
        self.0 == NULL_BITS
    }

    /// Check if value references a runtime cell
    #[inline]
    pub const fn is_cell(&self) -> bool {
        self.has_tag(TAG_CELL)
    }

    /// Check if value references a runtime function
    #[inline]
    pub const fn is_function(&self) -> bool {
        self.has_tag(TAG_FUNC)
    }

    /// Extract boolean value
    #[inline]
    pub const fn as_bool(&self) -> Option<bool> {
        if self.has_tag(TAG_BOOL) {
            Some((self.0 & PAYLOAD_MASK) != 0)
        } else {
            None
        }
    }

    /// Extract i32 value
    #[inline]
    pub const fn as_i32(&self) -> Option<i32> {
        if self.has_tag(TAG_I32) {
            Some((self.0 & PAYLOAD_MASK_32) as u32 as i32)
        } else {
            None
        }
    }

    /// Extract f64 value
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        if self.is_nan_boxed() {
            None
        } else {
            Some(f64::from_bits(self.0))
        }
    }

    /// Extract cell id
    #[inline]
    pub const fn as_cell(&self) -> Option<u64> {
        if self.is_cell() {
            Some(self.0 & PAYLOAD_MASK)
        } else {
            None
        }
    }

    /// Extract function id
    #[inline]
    pub const fn as_function(&self) -> Option<u64> {
        if self.is_function() {
            Some(self.0 & PAYLOAD_MASK)
        } else {
            None
        }
    }

    /// Get type name for diagnostics
    pub const fn type_name(&self) -> &'static str {
        if !self.is_nan_boxed() {
            "float"
        } else {
            match self.get_tag() {
                TAG_CELL => "cell",
                TAG_I32 => "int",
                TAG_BOOL => "bool",
                TAG_FUNC => "function",
                TAG_NULL => "null",
                _ => "unknown",
            }
        }
    }
}

impl Default for ScriptValue {
    fn default() -> Self {
        Self::null()
    }
}

impl std::fmt::Debug for ScriptValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.is_nan_boxed() {
            return write!(f, "ScriptValue::F64({})", f64::from_bits(self.0));
        }
        let payload = self.0 & PAYLOAD_MASK;
        match self.get_tag() {
            TAG_CELL => write!(f, "ScriptValue::Cell({})", payload),
            TAG_I32 => write!(f, "ScriptValue::I32({})", payload as u32 as i32),
            TAG_BOOL => write!(f, "ScriptValue::Bool({})", payload != 0),
            TAG_FUNC => write!(f, "ScriptValue::Function({})", payload),
            TAG_NULL => write!(f, "ScriptValue::Null"),
            _ => write!(f, "ScriptValue::Unknown({:#x})", self.0),
        }
    }
}
