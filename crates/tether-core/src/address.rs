//! NativeAddr: typed identity of an externally owned object
//!
//! The bridge never dereferences native objects. It only stores and compares
//! their addresses, so the address is wrapped in a dedicated type instead of
//! being passed around as a raw pointer or a bare integer.

use std::fmt;

/// Address of a native object owned by the external subsystem.
///
/// Identity of a native object is its address. The wrapper exposes no
/// arithmetic; it can only be built from a pointer (or raw bits at the C
/// boundary) and compared, hashed, or turned back into a pointer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NativeAddr(usize);

impl NativeAddr {
    /// The null address. A handle whose slot holds this is never live.
    pub const NULL: NativeAddr = NativeAddr(0);

    /// Build from a raw pointer
    #[inline]
    pub fn from_ptr<T>(ptr: *const T) -> Self {
        Self(ptr as usize)
    }

    /// Build from raw address bits
    #[inline]
    pub const fn from_bits(bits: usize) -> Self {
        Self(bits)
    }

    /// Raw address bits
    #[inline]
    pub const fn to_bits(self) -> usize {
        self.0
    }

    /// Convert back to a pointer for handing to the native subsystem
    #[inline]
    pub fn as_ptr<T>(self) -> *mut T {
        self.0 as *mut T
    }

    /// Check for the null address
    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl Default for NativeAddr {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for NativeAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl fmt::Debug for NativeAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeAddr({:#x})", self.0)
    }
}

impl<T> From<*mut T> for NativeAddr {
    fn from(ptr: *mut T) -> Self {
        Self::from_ptr(ptr as *const T)
    }
}

impl<T> From<*const T> for NativeAddr {
    fn from(ptr: *const T) -> Self {
        Self::from_ptr(ptr)
    }
}
