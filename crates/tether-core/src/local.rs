//! LocalRuntime: in-process script runtime
//!
//! A minimal runtime with a cell heap, a native function table, and a value
//! stack. It backs the C surface and the test suites, and stands in for the
//! collector through [`LocalRuntime::collect`].

use std::sync::Arc;

use log::trace;
use rustc_hash::FxHashMap;

use crate::address::NativeAddr;
use crate::dispatch::{DispatchTable, Member, NativeOp};
use crate::error::{BridgeError, BridgeResult};
use crate::runtime::ScriptRuntime;
use crate::value::ScriptValue;

struct Cell {
    slot: NativeAddr,
    descriptor: Option<Arc<DispatchTable>>,
}

/// One heap slot. The generation is bumped on every release so ids handed
/// out for an earlier occupant no longer resolve.
#[derive(Default)]
struct HeapSlot {
    generation: u16,
    cell: Option<Cell>,
}

const INDEX_BITS: u64 = 32;
const INDEX_MASK: u64 = (1 << INDEX_BITS) - 1;

fn cell_id(index: u32, generation: u16) -> u64 {
    ((generation as u64) << INDEX_BITS) | index as u64
}

/// In-process script runtime.
///
/// Cell ids pack a slot index with the slot's generation. A slot whose
/// generation would wrap is retired instead of reused. Native functions
/// handed to scripts stay in the function table for the runtime's lifetime.
#[derive(Default)]
pub struct LocalRuntime {
    cells: Vec<HeapSlot>,
    free: Vec<u32>,
    functions: Vec<NativeOp>,
    /// Function id by `Arc` data address, so one op maps to one value
    interned: FxHashMap<usize, u64>,
    stack: Vec<ScriptValue>,
}

impl LocalRuntime {
    /// Create an empty runtime
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a native function and return its script value
    pub fn register_function(
        &mut self,
        op: impl Fn(&mut dyn ScriptRuntime, &[ScriptValue]) -> BridgeResult<ScriptValue>
            + Send
            + Sync
            + 'static,
    ) -> ScriptValue {
        self.intern(Arc::new(op))
    }

    fn intern(&mut self, op: NativeOp) -> ScriptValue {
        let key = Arc::as_ptr(&op) as *const () as usize;
        if let Some(&id) = self.interned.get(&key) {
            return ScriptValue::function(id);
        }
        let id = self.functions.len() as u64;
        self.functions.push(op);
        self.interned.insert(key, id);
        ScriptValue::function(id)
    }

    fn heap_slot(&self, value: ScriptValue) -> Option<&HeapSlot> {
        let id = value.as_cell()?;
        let slot = self.cells.get((id & INDEX_MASK) as usize)?;
        (slot.generation as u64 == id >> INDEX_BITS).then_some(slot)
    }

    fn cell(&self, value: ScriptValue) -> Option<&Cell> {
        self.heap_slot(value)?.cell.as_ref()
    }

    fn cell_mut(&mut self, value: ScriptValue) -> Option<&mut Cell> {
        let id = value.as_cell()?;
        let slot = self.cells.get_mut((id & INDEX_MASK) as usize)?;
        if slot.generation as u64 != id >> INDEX_BITS {
            return None;
        }
        slot.cell.as_mut()
    }

    fn release(&mut self, value: ScriptValue) {
        let Some(id) = value.as_cell() else {
            return;
        };
        let index = (id & INDEX_MASK) as u32;
        let Some(slot) = self.cells.get_mut(index as usize) else {
            return;
        };
        if slot.cell.take().is_none() {
            return;
        }
        match slot.generation.checked_add(1) {
            Some(next) => {
                slot.generation = next;
                self.free.push(index);
            }
            None => trace!("local runtime: retiring heap slot {}", index),
        }
    }

    /// Overwrite a cell's pointer slot, bypassing the bridge
    pub fn set_slot(&mut self, handle: ScriptValue, addr: NativeAddr) -> BridgeResult<()> {
        let cell = self.cell_mut(handle).ok_or(BridgeError::NotAHandle {
            got: handle.type_name(),
        })?;
        cell.slot = addr;
        Ok(())
    }

    /// Collect an unreachable handle.
    ///
    /// Runs the descriptor's finalizer entry once, then releases the cell.
    /// Cells without a descriptor are released without a finalizer run.
    pub fn collect(&mut self, handle: ScriptValue) -> BridgeResult<()> {
        let descriptor = match self.cell(handle) {
            Some(cell) => cell.descriptor.clone(),
            None => {
                return Err(BridgeError::NotAHandle {
                    got: handle.type_name(),
                })
            }
        };

        let result = match descriptor.as_ref().map(|table| table.finalizer().clone()) {
            Some(Member::Native(op)) => op(self, &[handle]).map(|_| ()),
            Some(Member::Value(callee)) => self.call(callee, &[handle]).map(|_| ()),
            None => Ok(()),
        };

        self.release(handle);
        result
    }

    /// Number of cells not yet collected
    pub fn live_cells(&self) -> usize {
        self.cells.iter().filter(|slot| slot.cell.is_some()).count()
    }

    /// Pop the most recently produced value
    pub fn pop(&mut self) -> Option<ScriptValue> {
        self.stack.pop()
    }

    /// Produced values, oldest first
    pub fn stack(&self) -> &[ScriptValue] {
        &self.stack
    }

    /// Discard all produced values
    pub fn clear_stack(&mut self) {
        self.stack.clear();
    }
}

impl ScriptRuntime for LocalRuntime {
    fn alloc_handle(&mut self, addr: NativeAddr) -> ScriptValue {
        let cell = Cell {
            slot: addr,
            descriptor: None,
        };
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.cells.push(HeapSlot::default());
                (self.cells.len() - 1) as u32
            }
        };
        let slot = &mut self.cells[index as usize];
        slot.cell = Some(cell);
        ScriptValue::cell(cell_id(index, slot.generation))
    }

    fn handle_slot(&self, value: ScriptValue) -> Option<NativeAddr> {
        self.cell(value).map(|cell| cell.slot)
    }

    fn attach_descriptor(
        &mut self,
        handle: ScriptValue,
        table: Arc<DispatchTable>,
    ) -> BridgeResult<()> {
        let cell = self.cell_mut(handle).ok_or(BridgeError::NotAHandle {
            got: handle.type_name(),
        })?;
        cell.descriptor = Some(table);
        Ok(())
    }

    fn descriptor(&self, value: ScriptValue) -> Option<Arc<DispatchTable>> {
        self.cell(value).and_then(|cell| cell.descriptor.clone())
    }

    fn member_value(&mut self, member: &Member) -> ScriptValue {
        match member {
            Member::Native(op) => self.intern(op.clone()),
            Member::Value(value) => *value,
        }
    }

    fn call(&mut self, callee: ScriptValue, args: &[ScriptValue]) -> BridgeResult<ScriptValue> {
        let op = callee
            .as_function()
            .and_then(|id| self.functions.get(id as usize).cloned())
            .ok_or(BridgeError::NotCallable {
                got: callee.type_name(),
            })?;
        op(self, args)
    }

    fn push(&mut self, value: ScriptValue) {
        self.stack.push(value);
    }
}
