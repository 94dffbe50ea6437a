//! ScriptRuntime trait: capabilities the bridge needs from the script runtime
//!
//! The bridge does not own a value stack, an interpreter, or a collector.
//! It programs against this trait, which the embedding implements over its
//! runtime. `LocalRuntime` is the in-process implementation used by tests and
//! by the C surface.

use std::sync::Arc;

use crate::address::NativeAddr;
use crate::dispatch::{DispatchTable, Member};
use crate::error::BridgeResult;
use crate::value::ScriptValue;

/// Abstract script runtime used by the bridge.
///
/// Raising a runtime error is expressed by returning `Err(BridgeError)`;
/// the embedding turns that into its own error mechanism.
pub trait ScriptRuntime {
    // ========================================================================
    // Handle cells
    // ========================================================================

    /// Allocate a new opaque cell one pointer wide, holding `addr`
    fn alloc_handle(&mut self, addr: NativeAddr) -> ScriptValue;

    /// Read a cell's pointer slot. `None` if `value` is not a cell.
    fn handle_slot(&self, value: ScriptValue) -> Option<NativeAddr>;

    /// Associate a dispatch descriptor with a cell
    fn attach_descriptor(&mut self, handle: ScriptValue, table: Arc<DispatchTable>)
        -> BridgeResult<()>;

    /// Descriptor associated with a cell, if any
    fn descriptor(&self, value: ScriptValue) -> Option<Arc<DispatchTable>>;

    // ========================================================================
    // Calls and produced values
    // ========================================================================

    /// Turn a dispatch member into a callable script value
    fn member_value(&mut self, member: &Member) -> ScriptValue;

    /// Call a callable script value
    fn call(&mut self, callee: ScriptValue, args: &[ScriptValue]) -> BridgeResult<ScriptValue>;

    /// Push a produced value for the current call
    fn push(&mut self, value: ScriptValue);
}
