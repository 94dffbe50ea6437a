//! Finalizer hook run by the collector when a handle becomes unreachable
//!
//! The hook only validates the handle. Native lifetime belongs to the
//! external subsystem, so nothing is freed and the registry is untouched.
//! Full teardown needs a native "on destroy" notification, which the
//! external subsystem does not provide; `Bridge::invalidate` is the manual
//! substitute.

use log::debug;

use crate::error::{BridgeError, BridgeResult};
use crate::runtime::ScriptRuntime;
use crate::value::ScriptValue;

/// Validate a handle handed to the collector.
///
/// Fails if `value` is not a cell, or if the cell has no dispatch table
/// (and therefore no signature).
pub fn on_collect(rt: &dyn ScriptRuntime, value: ScriptValue) -> BridgeResult<()> {
    let slot = rt.handle_slot(value).ok_or(BridgeError::NotAHandle {
        got: value.type_name(),
    })?;
    let table = rt.descriptor(value).ok_or(BridgeError::MissingSignature)?;

    debug!(
        "finalizer: handle {:?} for {} at {} collected, native object left alone",
        value,
        table.describe(),
        slot
    );
    Ok(())
}

/// Default finalizer entry installed in every dispatch table
pub(crate) fn finalizer_op(
    rt: &mut dyn ScriptRuntime,
    args: &[ScriptValue],
) -> BridgeResult<ScriptValue> {
    let value = args.first().copied().unwrap_or_default();
    on_collect(rt, value)?;
    Ok(ScriptValue::null())
}
