//! Error types for the handle bridge

use crate::address::NativeAddr;
use crate::signature::Signature;

/// Result type for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Failure classes reported by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Value is not a handle at all
    Shape,
    /// Handle's native pointer has no registry entry
    Unregistered,
    /// Handle exists but its pointer slot is null
    NullPointer,
    /// Live object of the wrong kind
    SignatureMismatch,
    /// Registry entry exists but its metadata is unusable
    RegistrationIntegrity,
    /// Rejected by configuration or by a reserved name
    Policy,
    /// Failure reported by the script runtime
    Runtime,
}

/// Bridge error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BridgeError {
    /// Value presented is not a handle
    #[error("not a userdata (got {got})")]
    NotAHandle {
        /// Type name of the offending value
        got: &'static str,
    },

    /// Handle's pointer slot holds null
    #[error("{}object pointer invalid (NULL)", kind_prefix(.kind))]
    NullPointer {
        /// Kind recorded in the handle's dispatch table, if any
        kind: Option<String>,
    },

    /// No registry entry for the handle's address
    #[error(
        "{}object {addr} is not valid in registry (it might have been deleted)",
        kind_prefix(.kind)
    )]
    Unregistered {
        /// Address that failed the liveness check
        addr: NativeAddr,
        /// Kind recorded in the handle's dispatch table, if any
        kind: Option<String>,
    },

    /// Object is live but of another kind
    #[error("object {addr} has {}, expected {expected}", describe_found(.found))]
    SignatureMismatch {
        /// Address of the object
        addr: NativeAddr,
        /// Signature the caller asked for
        expected: Signature,
        /// Signature recorded in the handle's dispatch table
        found: Option<Signature>,
    },

    /// Handle has no signature recorded in its dispatch table
    #[error("not an object (no signature recorded)")]
    MissingSignature,

    /// Registry entry exists without dispatch metadata
    #[error("object {addr} meta table invalid")]
    IntegrityViolation {
        /// Address of the malformed entry
        addr: NativeAddr,
    },

    /// Reject policy refused to replace a live entry
    #[error("address {addr} is already registered")]
    AddressInUse {
        /// Colliding address
        addr: NativeAddr,
    },

    /// Script attempted to write a member the bridge owns
    #[error("member '{name}' is reserved")]
    ReservedMember {
        /// Member name
        name: String,
    },

    /// Runtime was asked to call something that is not callable
    #[error("attempt to call a {got} value")]
    NotCallable {
        /// Type name of the callee
        got: &'static str,
    },

    /// Failure reported by the script runtime
    #[error("{0}")]
    Runtime(String),
}

fn kind_prefix(kind: &Option<String>) -> String {
    match kind {
        Some(kind) => format!("{}: ", kind),
        None => String::new(),
    }
}

fn describe_found(found: &Option<Signature>) -> String {
    match found {
        Some(sig) => sig.to_string(),
        None => "no signature".to_string(),
    }
}

impl BridgeError {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::NotAHandle { .. } => ErrorKind::Shape,
            BridgeError::NullPointer { .. } => ErrorKind::NullPointer,
            BridgeError::Unregistered { .. } => ErrorKind::Unregistered,
            BridgeError::SignatureMismatch { .. } => ErrorKind::SignatureMismatch,
            BridgeError::MissingSignature => ErrorKind::Shape,
            BridgeError::IntegrityViolation { .. } => ErrorKind::RegistrationIntegrity,
            BridgeError::AddressInUse { .. } | BridgeError::ReservedMember { .. } => {
                ErrorKind::Policy
            }
            BridgeError::NotCallable { .. } | BridgeError::Runtime(_) => ErrorKind::Runtime,
        }
    }

    /// True when the object should be reported as not live.
    ///
    /// A null pointer slot is reported the same way as a missing entry.
    pub fn is_unregistered(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Unregistered | ErrorKind::NullPointer
        )
    }
}

impl From<String> for BridgeError {
    fn from(s: String) -> Self {
        BridgeError::Runtime(s)
    }
}

impl From<&str> for BridgeError {
    fn from(s: &str) -> Self {
        BridgeError::Runtime(s.to_string())
    }
}
