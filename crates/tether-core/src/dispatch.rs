//! Dispatch tables: per-object descriptors shared by a handle and its aliases
//!
//! A `DispatchTable` carries the kind signature, the immutable set of native
//! operations, the finalizer entry, and the members scripts write through
//! the handle. Every handle for the same registered object points at the
//! same table via `Arc`.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::error::{BridgeError, BridgeResult};
use crate::finalizer;
use crate::runtime::ScriptRuntime;
use crate::signature::Signature;
use crate::value::ScriptValue;

/// Reserved member name for the finalizer entry.
pub const FINALIZER_KEY: &str = "__gc";

/// A native operation callable from scripts.
///
/// Receives the runtime and the call arguments (receiver first for method
/// calls) and returns the produced value.
pub type NativeOp =
    Arc<dyn Fn(&mut dyn ScriptRuntime, &[ScriptValue]) -> BridgeResult<ScriptValue> + Send + Sync>;

/// One entry of a dispatch table.
#[derive(Clone)]
pub enum Member {
    /// Operation implemented on the native side
    Native(NativeOp),
    /// Plain script value (typically a script function assigned by user code)
    Value(ScriptValue),
}

impl Member {
    /// Wrap a closure as a native member
    pub fn native(
        op: impl Fn(&mut dyn ScriptRuntime, &[ScriptValue]) -> BridgeResult<ScriptValue>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Member::Native(Arc::new(op))
    }

    /// Get the script value if this member is one
    pub fn as_value(&self) -> Option<ScriptValue> {
        match self {
            Member::Value(v) => Some(*v),
            Member::Native(_) => None,
        }
    }

    /// True if both members refer to the same callable or value
    pub fn same_as(&self, other: &Member) -> bool {
        match (self, other) {
            (Member::Native(a), Member::Native(b)) => Arc::ptr_eq(a, b),
            (Member::Value(a), Member::Value(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Member::Native(op) => write!(f, "Member::Native({:p})", Arc::as_ptr(op)),
            Member::Value(v) => write!(f, "Member::Value({:?})", v),
        }
    }
}

// ============================================================================
// OpTable
// ============================================================================

/// Ordered fragment of named members merged into a dispatch table.
///
/// Binding code typically keeps one fragment per capability (e.g. "control
/// methods", "window methods") and passes several of them to `create`.
#[derive(Clone, Default)]
pub struct OpTable {
    entries: Vec<(String, Member)>,
}

impl OpTable {
    /// Create an empty fragment
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a native operation (builder style)
    pub fn with(
        mut self,
        name: impl Into<String>,
        op: impl Fn(&mut dyn ScriptRuntime, &[ScriptValue]) -> BridgeResult<ScriptValue>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.insert(name, Member::native(op));
        self
    }

    /// Add a member of any kind (builder style)
    pub fn with_member(mut self, name: impl Into<String>, member: Member) -> Self {
        self.insert(name, member);
        self
    }

    /// Add a member. A later entry with the same name wins at merge time.
    pub fn insert(&mut self, name: impl Into<String>, member: Member) {
        self.entries.push((name.into(), member));
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Member)> {
        self.entries.iter().map(|(name, member)| (name.as_str(), member))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the fragment is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// DispatchTable
// ============================================================================

/// Shared descriptor attached to every handle of one registered object.
pub struct DispatchTable {
    signature: Signature,
    kind_name: Option<String>,
    operations: FxHashMap<String, Member>,
    finalizer: Member,
    /// Script writes. `None` marks a name removed by assigning null.
    members: RwLock<FxHashMap<String, Option<ScriptValue>>>,
}

impl DispatchTable {
    /// Build a table: default finalizer first, then fragments left to right.
    ///
    /// A fragment entry named [`FINALIZER_KEY`] replaces the finalizer.
    pub fn build(signature: Signature, kind_name: Option<&str>, tables: &[&OpTable]) -> Self {
        let mut finalizer = Member::native(finalizer::finalizer_op);
        let mut operations = FxHashMap::default();

        for table in tables {
            for (name, member) in table.iter() {
                if name == FINALIZER_KEY {
                    finalizer = member.clone();
                } else {
                    operations.insert(name.to_string(), member.clone());
                }
            }
        }

        Self {
            signature,
            kind_name: kind_name.map(str::to_string),
            operations,
            finalizer,
            members: RwLock::new(FxHashMap::default()),
        }
    }

    /// Kind signature
    pub fn signature(&self) -> Signature {
        self.signature
    }

    /// Kind name if one was given
    pub fn kind_name(&self) -> Option<&str> {
        self.kind_name.as_deref()
    }

    /// Human-readable kind for diagnostics
    pub fn describe(&self) -> String {
        match &self.kind_name {
            Some(name) => format!("{} ({})", name, self.signature),
            None => self.signature.to_string(),
        }
    }

    /// Finalizer entry run by the collector
    pub fn finalizer(&self) -> &Member {
        &self.finalizer
    }

    /// Native operation by name, ignoring script-written members
    pub fn operation(&self, name: &str) -> Option<&Member> {
        self.operations.get(name)
    }

    /// Number of native operations
    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    /// Read resolver: script writes shadow native operations.
    pub fn read_member(&self, name: &str) -> Option<Member> {
        if name == FINALIZER_KEY {
            return Some(self.finalizer.clone());
        }
        if let Some(written) = self.members.read().get(name) {
            return written.map(Member::Value);
        }
        self.operations.get(name).cloned()
    }

    /// Write resolver.
    ///
    /// Assigning null removes the member, native operation included, until
    /// a later non-null write. [`operation`](Self::operation) still sees the
    /// native entry.
    pub fn write_member(&self, name: &str, value: ScriptValue) -> BridgeResult<()> {
        if name == FINALIZER_KEY {
            return Err(BridgeError::ReservedMember {
                name: name.to_string(),
            });
        }
        let written = (!value.is_null()).then_some(value);
        self.members.write().insert(name.to_string(), written);
        Ok(())
    }
}

impl fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchTable")
            .field("signature", &self.signature)
            .field("kind_name", &self.kind_name)
            .field("operations", &self.operations.len())
            .field("members", &self.members.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LABEL: Signature = Signature::new(5);

    fn returns(n: i32) -> Member {
        Member::native(move |_rt, _args| Ok(ScriptValue::i32(n)))
    }

    #[test]
    fn test_later_fragment_overrides_earlier() {
        let first = OpTable::new()
            .with_member("text", returns(1))
            .with_member("show", returns(2));
        let second = OpTable::new().with_member("text", returns(3));
        let text_second = second.iter().next().map(|(_, m)| m.clone()).unwrap();

        let table = DispatchTable::build(LABEL, Some("label"), &[&first, &second]);
        assert_eq!(table.operation_count(), 2);
        assert!(table.operation("text").unwrap().same_as(&text_second));
    }

    #[test]
    fn test_duplicate_in_one_fragment_last_wins() {
        let last = returns(9);
        let frag = OpTable::new()
            .with_member("x", returns(1))
            .with_member("x", last.clone());
        let table = DispatchTable::build(LABEL, None, &[&frag]);
        assert!(table.operation("x").unwrap().same_as(&last));
    }

    #[test]
    fn test_finalizer_override() {
        let custom = returns(0);
        let frag = OpTable::new().with_member(FINALIZER_KEY, custom.clone());
        let table = DispatchTable::build(LABEL, None, &[&frag]);
        assert!(table.finalizer().same_as(&custom));
        assert!(table.operation(FINALIZER_KEY).is_none());

        let plain = DispatchTable::build(LABEL, None, &[]);
        assert!(!plain.finalizer().same_as(&custom));
    }

    #[test]
    fn test_members_shadow_operations() {
        let frag = OpTable::new().with_member("onClick", returns(1));
        let table = DispatchTable::build(LABEL, None, &[&frag]);

        table.write_member("onClick", ScriptValue::function(4)).unwrap();
        assert_eq!(
            table.read_member("onClick").and_then(|m| m.as_value()),
            Some(ScriptValue::function(4))
        );

        assert!(table.read_member("missing").is_none());
    }

    #[test]
    fn test_null_write_removes_member() {
        let frag = OpTable::new().with_member("onClick", returns(1));
        let table = DispatchTable::build(LABEL, None, &[&frag]);

        table.write_member("onClick", ScriptValue::function(4)).unwrap();
        table.write_member("onClick", ScriptValue::null()).unwrap();
        assert!(table.read_member("onClick").is_none());
        assert!(matches!(table.operation("onClick"), Some(Member::Native(_))));

        table.write_member("onClick", ScriptValue::function(5)).unwrap();
        assert_eq!(
            table.read_member("onClick").and_then(|m| m.as_value()),
            Some(ScriptValue::function(5))
        );
    }

    #[test]
    fn test_finalizer_is_not_writable() {
        let table = DispatchTable::build(LABEL, None, &[]);
        let err = table
            .write_member(FINALIZER_KEY, ScriptValue::function(1))
            .unwrap_err();
        assert!(matches!(err, BridgeError::ReservedMember { .. }));
    }

    #[test]
    fn test_describe() {
        let named = DispatchTable::build(LABEL, Some("label"), &[]);
        assert_eq!(named.describe(), "label (signature 5)");
        let anon = DispatchTable::build(LABEL, None, &[]);
        assert_eq!(anon.describe(), "signature 5");
    }
}
