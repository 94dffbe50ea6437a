//! Bridge: handle factory, aliasing, lookup, and callback resolution
//!
//! Every operation takes the script runtime as `&mut dyn ScriptRuntime` (or
//! `&dyn` for pure queries). Raising operations return `BridgeResult`; query
//! operations return `Option`/`bool` and never fail.

use std::sync::Arc;

use log::{debug, trace, warn};

use crate::address::NativeAddr;
use crate::config::{BridgeConfig, ReusePolicy};
use crate::dispatch::{DispatchTable, Member, OpTable};
use crate::error::{BridgeError, BridgeResult};
use crate::finalizer;
use crate::registry::{Registry, RegistryEntry};
use crate::runtime::ScriptRuntime;
use crate::signature::Signature;
use crate::value::ScriptValue;

/// Result of a successful extract-and-check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectInfo {
    /// Native address held by the handle
    pub addr: NativeAddr,
    /// Signature recorded in the handle's dispatch table
    pub signature: Option<Signature>,
}

/// Callable and receiver produced by [`Bridge::resolve`].
#[derive(Debug, Clone)]
pub struct Callback {
    /// Member found under the requested name, if any
    pub callable: Option<Member>,
    /// Fresh handle for the native object
    pub receiver: ScriptValue,
}

impl Callback {
    /// Invoke the callable with the receiver as first argument.
    ///
    /// Returns `Ok(None)` when no member was found under the name.
    pub fn invoke(
        &self,
        rt: &mut dyn ScriptRuntime,
        args: &[ScriptValue],
    ) -> BridgeResult<Option<ScriptValue>> {
        let Some(callable) = &self.callable else {
            return Ok(None);
        };
        let mut full = Vec::with_capacity(args.len() + 1);
        full.push(self.receiver);
        full.extend_from_slice(args);
        let result = match callable {
            Member::Native(op) => op(rt, &full)?,
            Member::Value(callee) => rt.call(*callee, &full)?,
        };
        Ok(Some(result))
    }
}

/// Handle bridge between a script runtime and externally owned objects.
///
/// Owns the liveness registry. The bridge never frees native objects; it
/// only records which addresses are live and which dispatch table their
/// handles carry.
pub struct Bridge {
    registry: Registry,
    config: BridgeConfig,
}

impl Bridge {
    /// Create a bridge with default configuration
    pub fn new() -> Self {
        Self::with_config(BridgeConfig::default())
    }

    /// Create a bridge with the given configuration
    pub fn with_config(config: BridgeConfig) -> Self {
        Self {
            registry: Registry::with_capacity(config.registry_capacity),
            config,
        }
    }

    /// Liveness registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Active configuration
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Format an error the way it is raised into the script runtime
    pub fn describe_error(&self, err: &BridgeError) -> String {
        format!("{} {}", self.config.label, err)
    }

    // ========================================================================
    // Handle Factory
    // ========================================================================

    /// Wrap a native object in a new handle.
    ///
    /// Builds a fresh dispatch table from `tables` (merged left to right),
    /// registers it under `addr`, attaches it to a new handle, and pushes the
    /// handle. Returns `addr`.
    pub fn create(
        &self,
        rt: &mut dyn ScriptRuntime,
        addr: NativeAddr,
        signature: Signature,
        tables: &[&OpTable],
    ) -> BridgeResult<NativeAddr> {
        self.create_kind(rt, addr, signature, None, tables)
    }

    /// Like [`create`](Self::create), recording a kind name for diagnostics.
    pub fn create_kind(
        &self,
        rt: &mut dyn ScriptRuntime,
        addr: NativeAddr,
        signature: Signature,
        kind_name: Option<&str>,
        tables: &[&OpTable],
    ) -> BridgeResult<NativeAddr> {
        if self.config.reuse_policy == ReusePolicy::Reject && self.registry.contains(addr) {
            return Err(BridgeError::AddressInUse { addr });
        }

        let table = Arc::new(DispatchTable::build(signature, kind_name, tables));
        let handle = rt.alloc_handle(addr);
        rt.attach_descriptor(handle, table.clone())?;

        if let Some(previous) = self.registry.put(addr, RegistryEntry::new(table.clone())) {
            warn!(
                "create: replaced registry entry at {} ({} -> {})",
                addr,
                previous
                    .table()
                    .map_or_else(|| "detached".to_string(), |t| t.describe()),
                table.describe()
            );
        }

        debug!("create: {} at {} as {:?}", table.describe(), addr, handle);
        rt.push(handle);
        Ok(addr)
    }

    // ========================================================================
    // Handle Aliasing
    // ========================================================================

    /// Produce another handle for an already registered object.
    ///
    /// The new handle shares the registered dispatch table; no table or
    /// registry entry is created. On success the handle is pushed and
    /// returned. `None` if `addr` is unregistered or its entry is detached.
    pub fn alias(&self, rt: &mut dyn ScriptRuntime, addr: NativeAddr) -> Option<ScriptValue> {
        let table = self.registry.get(addr)?.table()?.clone();
        let handle = self.new_handle(rt, addr, table).ok()?;
        debug!("alias: {:?} for {}", handle, addr);
        rt.push(handle);
        Some(handle)
    }

    fn new_handle(
        &self,
        rt: &mut dyn ScriptRuntime,
        addr: NativeAddr,
        table: Arc<DispatchTable>,
    ) -> BridgeResult<ScriptValue> {
        let handle = rt.alloc_handle(addr);
        rt.attach_descriptor(handle, table)?;
        Ok(handle)
    }

    // ========================================================================
    // Lookup & Validation
    // ========================================================================

    /// Extract-and-check: shape, null, and liveness.
    ///
    /// Null and liveness failures name the kind recorded on the handle.
    pub fn get_object(
        &self,
        rt: &dyn ScriptRuntime,
        value: ScriptValue,
    ) -> BridgeResult<ObjectInfo> {
        let addr = rt.handle_slot(value).ok_or(BridgeError::NotAHandle {
            got: value.type_name(),
        })?;
        let table = rt.descriptor(value);

        if addr.is_null() {
            return Err(BridgeError::NullPointer {
                kind: table.as_ref().map(|t| t.describe()),
            });
        }
        if !self.registry.contains(addr) {
            return Err(BridgeError::Unregistered {
                addr,
                kind: table.as_ref().map(|t| t.describe()),
            });
        }

        let signature = table.map(|t| t.signature());
        trace!("get_object: {} ({:?})", addr, signature);
        Ok(ObjectInfo { addr, signature })
    }

    /// Extract-and-check plus a signature match.
    pub fn expect_object(
        &self,
        rt: &dyn ScriptRuntime,
        value: ScriptValue,
        expected: Signature,
    ) -> BridgeResult<NativeAddr> {
        let info = self.get_object(rt, value)?;
        if info.signature != Some(expected) {
            return Err(BridgeError::SignatureMismatch {
                addr: info.addr,
                expected,
                found: info.signature,
            });
        }
        Ok(info.addr)
    }

    /// Typed check. `None` on any failure; never raises.
    pub fn check_object(
        &self,
        rt: &dyn ScriptRuntime,
        value: ScriptValue,
        expected: Signature,
    ) -> Option<NativeAddr> {
        match self.expect_object(rt, value, expected) {
            Ok(addr) => Some(addr),
            Err(err) => {
                trace!("check_object: no match ({})", err);
                None
            }
        }
    }

    /// Predicate check. `None` matches any live handle that has a signature.
    pub fn is_object(
        &self,
        rt: &dyn ScriptRuntime,
        value: ScriptValue,
        signature: Option<Signature>,
    ) -> bool {
        match self.get_object(rt, value) {
            Ok(ObjectInfo {
                signature: Some(found),
                ..
            }) => signature.map_or(true, |wanted| wanted == found),
            _ => false,
        }
    }

    /// Read the pointer slot without shape, liveness, or signature checks.
    ///
    /// For call sites that validated `value` by other means. Returns
    /// [`NativeAddr::NULL`] if `value` is not a cell.
    pub fn get_object_unsafe(&self, rt: &dyn ScriptRuntime, value: ScriptValue) -> NativeAddr {
        rt.handle_slot(value).unwrap_or(NativeAddr::NULL)
    }

    // ========================================================================
    // Member access (read/write resolvers)
    // ========================================================================

    /// Read a member through the handle's dispatch table.
    ///
    /// Returns null when the member is absent.
    pub fn get_member(
        &self,
        rt: &mut dyn ScriptRuntime,
        handle: ScriptValue,
        name: &str,
    ) -> BridgeResult<ScriptValue> {
        let table = self.live_table(rt, handle)?;
        Ok(match table.read_member(name) {
            Some(member) => rt.member_value(&member),
            None => ScriptValue::null(),
        })
    }

    /// Write a member through the handle's dispatch table.
    ///
    /// Visible through every alias of the same object.
    pub fn set_member(
        &self,
        rt: &mut dyn ScriptRuntime,
        handle: ScriptValue,
        name: &str,
        value: ScriptValue,
    ) -> BridgeResult<()> {
        let table = self.live_table(rt, handle)?;
        table.write_member(name, value)
    }

    fn live_table(
        &self,
        rt: &dyn ScriptRuntime,
        handle: ScriptValue,
    ) -> BridgeResult<Arc<DispatchTable>> {
        self.get_object(rt, handle)?;
        rt.descriptor(handle).ok_or(BridgeError::MissingSignature)
    }

    // ========================================================================
    // Finalizer Hook
    // ========================================================================

    /// Collector hook. Validates the handle and leaves the object alone.
    pub fn on_collect(&self, rt: &dyn ScriptRuntime, value: ScriptValue) -> BridgeResult<()> {
        finalizer::on_collect(rt, value)
    }

    // ========================================================================
    // Callback Resolution
    // ========================================================================

    /// Look up `name` on a registered object for a native-to-script callback.
    ///
    /// Pushes the callable (null if absent) followed by a fresh receiver
    /// handle, and returns both.
    pub fn resolve(
        &self,
        rt: &mut dyn ScriptRuntime,
        addr: NativeAddr,
        name: &str,
    ) -> BridgeResult<Callback> {
        let entry = self
            .registry
            .get(addr)
            .ok_or(BridgeError::Unregistered { addr, kind: None })?;
        let table = entry
            .table()
            .cloned()
            .ok_or(BridgeError::IntegrityViolation { addr })?;

        let callable = table.read_member(name);
        let receiver = self.new_handle(rt, addr, table)?;

        let callee = match &callable {
            Some(member) => rt.member_value(member),
            None => ScriptValue::null(),
        };
        rt.push(callee);
        rt.push(receiver);

        trace!(
            "resolve: {} on {} -> {}",
            name,
            addr,
            if callable.is_some() { "found" } else { "absent" }
        );
        Ok(Callback { callable, receiver })
    }

    // ========================================================================
    // External invalidation
    // ========================================================================

    /// Forget a native object the external subsystem has freed.
    ///
    /// Existing handles become stale and fail liveness checks. Returns
    /// `true` if an entry was removed.
    pub fn invalidate(&self, addr: NativeAddr) -> bool {
        let removed = self.registry.remove(addr).is_some();
        if removed {
            debug!("invalidate: {} removed from registry", addr);
        }
        removed
    }
}

impl Default for Bridge {
    fn default() -> Self {
        Self::new()
    }
}
