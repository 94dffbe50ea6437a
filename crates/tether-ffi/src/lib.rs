//! C FFI bindings for the tether handle bridge
//!
//! This module provides a C-compatible API for native subsystems that hand
//! their objects to a script runtime through the bridge.
//! The API follows these principles:
//! - ABI-stable (uses only C-compatible types)
//! - Script values cross the boundary as NaN-boxed `uint64_t`
//! - Error handling via out-parameters
//! - Opaque pointers for bridge state
//! - Produced values (new handles, callable + receiver pairs) are pushed on
//!   the bridge's value stack and read back with `tether_pop()`
//!
//! Calls are single-threaded: a bridge must not be used from two threads at
//! once. A C operation registered through `TetherReg` must not pass the
//! bridge pointer back into `tether_*` while it runs; it validates its
//! arguments through the `TetherCallCtx` it receives (`tether_ctx_*`).

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int, c_void};
use std::path::Path;
use std::ptr;
use std::sync::{Arc, Weak};

use log::{debug, trace};
use tether_core::{
    Bridge, BridgeConfig, BridgeError, ConfigError, LocalRuntime, Member, NativeAddr, OpTable,
    ScriptRuntime, ScriptValue, Signature,
};

// ============================================================================
// Opaque Types
// ============================================================================

/// Opaque handle to a bridge instance (bridge state plus its runtime)
#[repr(C)]
pub struct TetherBridge {
    _private: [u8; 0],
}

/// Error information
#[repr(C)]
pub struct TetherError {
    message: *mut c_char,
}

/// Query context handed to a running C operation.
///
/// Only valid for the duration of that call.
#[repr(C)]
pub struct TetherCallCtx {
    _private: [u8; 0],
}

/// Native operation callable from scripts.
///
/// Receives the call context and the call arguments as NaN-boxed values
/// (receiver first), and returns the produced value. If the operation
/// raised through the context, the returned value is discarded.
pub type TetherCFn =
    extern "C" fn(ctx: *const TetherCallCtx, args: *const u64, nargs: usize) -> u64;

/// Named operation; arrays of these end with an entry whose `name` is NULL.
#[repr(C)]
pub struct TetherReg {
    /// Null-terminated operation name (NULL ends the array)
    pub name: *const c_char,
    /// Operation, or NULL to skip the entry
    pub func: Option<TetherCFn>,
}

// Internal representation of the bridge (not exposed to C)
struct BridgeHandle {
    bridge: Arc<Bridge>,
    runtime: LocalRuntime,
}

// Internal representation of `TetherCallCtx`
struct CallContext<'a> {
    bridge: &'a Bridge,
    runtime: &'a dyn ScriptRuntime,
    raised: RefCell<Option<BridgeError>>,
}

impl CallContext<'_> {
    fn raise(&self, err: BridgeError) {
        trace!("C operation raised: {}", err);
        let mut raised = self.raised.borrow_mut();
        if raised.is_none() {
            *raised = Some(err);
        }
    }
}

/// Errors raised at the C boundary
#[derive(Debug, thiserror::Error)]
enum FfiError {
    #[error("Invalid arguments (null pointer)")]
    NullArgument,

    #[error("Invalid UTF-8 in {0}")]
    InvalidUtf8(&'static str),

    #[error("signature 0 is reserved")]
    ReservedSignature,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Convert Rust string to C string (caller must free)
unsafe fn rust_to_c_string(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(c_str) => c_str.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Create error from string
unsafe fn create_error_str(msg: &str) -> *mut TetherError {
    let message = rust_to_c_string(msg);
    let err = Box::new(TetherError { message });
    Box::into_raw(err)
}

/// Set error out-parameter, prefixing bridge errors with the bridge label
unsafe fn set_error(error_out: *mut *mut TetherError, bridge: Option<&Bridge>, error: FfiError) {
    if error_out.is_null() {
        return;
    }
    let msg = match (&error, bridge) {
        (FfiError::Bridge(e), Some(b)) => b.describe_error(e),
        _ => error.to_string(),
    };
    *error_out = create_error_str(&msg);
}

unsafe fn handle_mut<'a>(bridge: *mut TetherBridge) -> Option<&'a mut BridgeHandle> {
    (bridge as *mut BridgeHandle).as_mut()
}

unsafe fn handle_ref<'a>(bridge: *const TetherBridge) -> Option<&'a BridgeHandle> {
    (bridge as *const BridgeHandle).as_ref()
}

unsafe fn call_ctx<'a>(ctx: *const TetherCallCtx) -> Option<&'a CallContext<'a>> {
    (ctx as *const CallContext<'a>).as_ref()
}

unsafe fn c_str<'a>(s: *const c_char, what: &'static str) -> Result<&'a str, FfiError> {
    if s.is_null() {
        return Err(FfiError::NullArgument);
    }
    CStr::from_ptr(s)
        .to_str()
        .map_err(|_| FfiError::InvalidUtf8(what))
}

fn into_raw_bridge(config: BridgeConfig) -> *mut TetherBridge {
    let handle = Box::new(BridgeHandle {
        bridge: Arc::new(Bridge::with_config(config)),
        runtime: LocalRuntime::new(),
    });
    Box::into_raw(handle) as *mut TetherBridge
}

/// Wrap a C function as a dispatch member.
///
/// The member holds the bridge weakly: dispatch tables live inside the
/// bridge's own registry.
fn c_member(bridge: Weak<Bridge>, func: TetherCFn) -> Member {
    Member::native(move |rt, args| {
        let bridge = bridge
            .upgrade()
            .ok_or_else(|| BridgeError::from("bridge already destroyed"))?;
        let bits: Vec<u64> = args.iter().map(|v| v.to_bits()).collect();
        let ctx = CallContext {
            bridge: &*bridge,
            runtime: &*rt,
            raised: RefCell::new(None),
        };
        let ret = func(
            &ctx as *const CallContext<'_> as *const TetherCallCtx,
            bits.as_ptr(),
            bits.len(),
        );
        match ctx.raised.into_inner() {
            Some(err) => Err(err),
            None => Ok(ScriptValue::from_bits(ret)),
        }
    })
}

/// Shared body of `tether_get_object` and `tether_ctx_get_object`
unsafe fn get_object_raw(
    bridge: &Bridge,
    rt: &dyn ScriptRuntime,
    value: u64,
    signature: *mut u32,
) -> Result<*mut c_void, BridgeError> {
    let info = bridge.get_object(rt, ScriptValue::from_bits(value))?;
    if !signature.is_null() {
        *signature = Signature::raw_or_zero(info.signature);
    }
    Ok(info.addr.as_ptr())
}

fn check_object_raw(
    bridge: &Bridge,
    rt: &dyn ScriptRuntime,
    value: u64,
    signature: u32,
) -> *mut c_void {
    Signature::from_raw(signature)
        .and_then(|sig| bridge.check_object(rt, ScriptValue::from_bits(value), sig))
        .map_or(ptr::null_mut(), |addr| addr.as_ptr())
}

fn is_object_raw(bridge: &Bridge, rt: &dyn ScriptRuntime, value: u64, signature: u32) -> c_int {
    bridge.is_object(
        rt,
        ScriptValue::from_bits(value),
        Signature::from_raw(signature),
    ) as c_int
}

/// Read a NULL-terminated `TetherReg` array into an operation fragment
unsafe fn read_reg_array(
    bridge: &Arc<Bridge>,
    regs: *const TetherReg,
) -> Result<OpTable, FfiError> {
    let mut table = OpTable::new();
    if regs.is_null() {
        return Ok(table);
    }
    let mut cursor = regs;
    while !(*cursor).name.is_null() {
        let reg = &*cursor;
        let name = c_str(reg.name, "operation name")?;
        if let Some(func) = reg.func {
            table.insert(name, c_member(Arc::downgrade(bridge), func));
        }
        cursor = cursor.add(1);
    }
    Ok(table)
}

// ============================================================================
// Bridge Lifecycle Functions
// ============================================================================

/// Create a new bridge
///
/// # Arguments
/// * `config` - Optional null-terminated TOML configuration (may be NULL)
/// * `error` - Optional pointer to receive error information
///
/// # Returns
/// * Non-null pointer to TetherBridge on success
/// * NULL on failure (check error parameter)
///
/// # Safety
/// The returned bridge must be freed with `tether_bridge_destroy()`
///
/// # Example (C)
/// ```c
/// TetherError* error = NULL;
/// TetherBridge* bridge = tether_bridge_new("label = \"libui\"", &error);
/// if (bridge == NULL) {
///     fprintf(stderr, "Failed to create bridge: %s\n", tether_error_message(error));
///     tether_error_free(error);
///     return 1;
/// }
/// ```
#[no_mangle]
pub unsafe extern "C" fn tether_bridge_new(
    config: *const c_char,
    error: *mut *mut TetherError,
) -> *mut TetherBridge {
    let config = if config.is_null() {
        BridgeConfig::default()
    } else {
        let parsed = c_str(config, "config")
            .and_then(|text| BridgeConfig::from_str(text).map_err(FfiError::from));
        match parsed {
            Ok(config) => config,
            Err(e) => {
                set_error(error, None, e);
                return ptr::null_mut();
            }
        }
    };

    into_raw_bridge(config)
}

/// Create a new bridge from a TOML configuration file
///
/// # Safety
/// - Path must be a valid null-terminated string
/// - The returned bridge must be freed with `tether_bridge_destroy()`
#[no_mangle]
pub unsafe extern "C" fn tether_bridge_from_file(
    path: *const c_char,
    error: *mut *mut TetherError,
) -> *mut TetherBridge {
    let loaded = c_str(path, "path")
        .and_then(|p| BridgeConfig::from_file(Path::new(p)).map_err(FfiError::from));
    match loaded {
        Ok(config) => into_raw_bridge(config),
        Err(e) => {
            set_error(error, None, e);
            ptr::null_mut()
        }
    }
}

/// Destroy a bridge.
///
/// Native objects are not touched; they stay owned by the caller.
///
/// # Safety
/// - Bridge pointer must be valid (created by `tether_bridge_new()`)
/// - Bridge must not be used after this call
#[no_mangle]
pub unsafe extern "C" fn tether_bridge_destroy(bridge: *mut TetherBridge) {
    if bridge.is_null() {
        return;
    }

    let handle = Box::from_raw(bridge as *mut BridgeHandle);
    debug!(
        "tether_bridge_destroy: {} registered objects left to their owner",
        handle.bridge.registry().len()
    );
    drop(handle);
}

// ============================================================================
// Handle Factory / Aliasing
// ============================================================================

/// Wrap a native object in a new handle and push it
///
/// # Arguments
/// * `bridge` - Pointer to TetherBridge (must not be NULL)
/// * `object` - Native object address
/// * `signature` - Non-zero kind tag
/// * `tables` - Array of `ntables` pointers to NULL-terminated `TetherReg`
///   arrays, merged left to right (later entries override earlier ones)
/// * `error` - Optional pointer to receive error information
///
/// # Returns
/// * `object` on success
/// * NULL on failure (check error parameter)
///
/// # Safety
/// - Bridge pointer must be valid
/// - `tables` must point to `ntables` valid (or NULL) `TetherReg` arrays
#[no_mangle]
pub unsafe extern "C" fn tether_create(
    bridge: *mut TetherBridge,
    object: *mut c_void,
    signature: u32,
    tables: *const *const TetherReg,
    ntables: usize,
    error: *mut *mut TetherError,
) -> *mut c_void {
    let Some(handle) = handle_mut(bridge) else {
        set_error(error, None, FfiError::NullArgument);
        return ptr::null_mut();
    };
    let Some(signature) = Signature::from_raw(signature) else {
        set_error(error, Some(&*handle.bridge), FfiError::ReservedSignature);
        return ptr::null_mut();
    };

    let mut fragments = Vec::with_capacity(ntables);
    if !tables.is_null() {
        for i in 0..ntables {
            match read_reg_array(&handle.bridge, *tables.add(i)) {
                Ok(table) => fragments.push(table),
                Err(e) => {
                    set_error(error, Some(&*handle.bridge), e);
                    return ptr::null_mut();
                }
            }
        }
    }
    let refs: Vec<&OpTable> = fragments.iter().collect();

    let created = handle.bridge.create(
        &mut handle.runtime,
        NativeAddr::from_ptr(object),
        signature,
        &refs,
    );
    match created {
        Ok(addr) => addr.as_ptr(),
        Err(e) => {
            set_error(error, Some(&*handle.bridge), e.into());
            ptr::null_mut()
        }
    }
}

/// Push another handle for an already registered object
///
/// # Returns
/// * 1 if a handle was pushed
/// * 0 if the object is not registered
///
/// # Safety
/// - Bridge pointer must be valid
#[no_mangle]
pub unsafe extern "C" fn tether_alias(bridge: *mut TetherBridge, object: *mut c_void) -> c_int {
    let Some(handle) = handle_mut(bridge) else {
        return 0;
    };
    handle
        .bridge
        .alias(&mut handle.runtime, NativeAddr::from_ptr(object))
        .is_some() as c_int
}

// ============================================================================
// Lookup & Validation
// ============================================================================

/// Extract the native object from a handle, checking shape and liveness
///
/// # Arguments
/// * `signature` - Optional out-parameter receiving the handle's signature
///   (0 if it has none)
///
/// # Returns
/// * Native object address on success
/// * NULL on failure (check error parameter)
///
/// # Safety
/// - Bridge pointer must be valid
#[no_mangle]
pub unsafe extern "C" fn tether_get_object(
    bridge: *const TetherBridge,
    value: u64,
    signature: *mut u32,
    error: *mut *mut TetherError,
) -> *mut c_void {
    let Some(handle) = handle_ref(bridge) else {
        set_error(error, None, FfiError::NullArgument);
        return ptr::null_mut();
    };

    match get_object_raw(&handle.bridge, &handle.runtime, value, signature) {
        Ok(object) => object,
        Err(e) => {
            set_error(error, Some(&*handle.bridge), e.into());
            ptr::null_mut()
        }
    }
}

/// Extract the native object if the handle is live and of the given kind
///
/// # Returns
/// * Native object address on match
/// * NULL otherwise (never reports an error)
///
/// # Safety
/// - Bridge pointer must be valid
#[no_mangle]
pub unsafe extern "C" fn tether_check_object(
    bridge: *const TetherBridge,
    value: u64,
    signature: u32,
) -> *mut c_void {
    handle_ref(bridge).map_or(ptr::null_mut(), |handle| {
        check_object_raw(&handle.bridge, &handle.runtime, value, signature)
    })
}

/// Check whether a value is a live handle of the given kind (0 = any kind)
///
/// # Returns
/// * 1 on match, 0 otherwise
///
/// # Safety
/// - Bridge pointer must be valid
#[no_mangle]
pub unsafe extern "C" fn tether_is_object(
    bridge: *const TetherBridge,
    value: u64,
    signature: u32,
) -> c_int {
    handle_ref(bridge).map_or(0, |handle| {
        is_object_raw(&handle.bridge, &handle.runtime, value, signature)
    })
}

/// Read the handle's pointer slot without any checks
///
/// # Safety
/// - Bridge pointer must be valid
/// - The caller must already know `value` is a live handle
#[no_mangle]
pub unsafe extern "C" fn tether_get_object_unsafe(
    bridge: *const TetherBridge,
    value: u64,
) -> *mut c_void {
    handle_ref(bridge).map_or(ptr::null_mut(), |handle| {
        handle
            .bridge
            .get_object_unsafe(&handle.runtime, ScriptValue::from_bits(value))
            .as_ptr()
    })
}

// ============================================================================
// Queries From Inside a C Operation
// ============================================================================

/// Like `tether_get_object`, for use inside a running C operation.
///
/// On failure the error is raised: it is recorded on the context, NULL is
/// returned, and the call that invoked the operation fails with it.
///
/// # Safety
/// - `ctx` must be the context passed to the running operation
#[no_mangle]
pub unsafe extern "C" fn tether_ctx_get_object(
    ctx: *const TetherCallCtx,
    value: u64,
    signature: *mut u32,
) -> *mut c_void {
    let Some(ctx) = call_ctx(ctx) else {
        return ptr::null_mut();
    };
    match get_object_raw(ctx.bridge, ctx.runtime, value, signature) {
        Ok(object) => object,
        Err(e) => {
            ctx.raise(e);
            ptr::null_mut()
        }
    }
}

/// Typed extract-and-check that raises on failure (wrong kind included)
///
/// Intended for validating a method's receiver. Signature 0 is rejected.
///
/// # Safety
/// - `ctx` must be the context passed to the running operation
#[no_mangle]
pub unsafe extern "C" fn tether_ctx_expect_object(
    ctx: *const TetherCallCtx,
    value: u64,
    signature: u32,
) -> *mut c_void {
    let Some(ctx) = call_ctx(ctx) else {
        return ptr::null_mut();
    };
    let Some(expected) = Signature::from_raw(signature) else {
        ctx.raise(FfiError::ReservedSignature.to_string().into());
        return ptr::null_mut();
    };
    match ctx
        .bridge
        .expect_object(ctx.runtime, ScriptValue::from_bits(value), expected)
    {
        Ok(addr) => addr.as_ptr(),
        Err(e) => {
            ctx.raise(e);
            ptr::null_mut()
        }
    }
}

/// Like `tether_check_object`, for use inside a running C operation
///
/// # Safety
/// - `ctx` must be the context passed to the running operation
#[no_mangle]
pub unsafe extern "C" fn tether_ctx_check_object(
    ctx: *const TetherCallCtx,
    value: u64,
    signature: u32,
) -> *mut c_void {
    call_ctx(ctx).map_or(ptr::null_mut(), |ctx| {
        check_object_raw(ctx.bridge, ctx.runtime, value, signature)
    })
}

/// Like `tether_is_object`, for use inside a running C operation
///
/// # Safety
/// - `ctx` must be the context passed to the running operation
#[no_mangle]
pub unsafe extern "C" fn tether_ctx_is_object(
    ctx: *const TetherCallCtx,
    value: u64,
    signature: u32,
) -> c_int {
    call_ctx(ctx).map_or(0, |ctx| is_object_raw(ctx.bridge, ctx.runtime, value, signature))
}

/// Like `tether_get_object_unsafe`, for use inside a running C operation
///
/// # Safety
/// - `ctx` must be the context passed to the running operation
#[no_mangle]
pub unsafe extern "C" fn tether_ctx_get_object_unsafe(
    ctx: *const TetherCallCtx,
    value: u64,
) -> *mut c_void {
    call_ctx(ctx).map_or(ptr::null_mut(), |ctx| {
        ctx.bridge
            .get_object_unsafe(ctx.runtime, ScriptValue::from_bits(value))
            .as_ptr()
    })
}

/// Raise an error from inside a running C operation
///
/// The first raised error wins; the call that invoked the operation fails
/// with it and the operation's return value is discarded.
///
/// # Safety
/// - `ctx` must be the context passed to the running operation
/// - `message` must be a valid null-terminated string
#[no_mangle]
pub unsafe extern "C" fn tether_ctx_raise(ctx: *const TetherCallCtx, message: *const c_char) {
    let Some(ctx) = call_ctx(ctx) else {
        return;
    };
    match c_str(message, "message") {
        Ok(text) => ctx.raise(text.into()),
        Err(e) => ctx.raise(e.to_string().into()),
    }
}

// ============================================================================
// Callback Resolution
// ============================================================================

/// Push the operation `name` of a registered object followed by a fresh
/// receiver handle (callable first, receiver second; the callable is null
/// when the object has no such member)
///
/// # Returns
/// * 0 on success
/// * -1 on failure (check error parameter)
///
/// # Safety
/// - Bridge pointer must be valid
/// - Name must be a valid null-terminated string
#[no_mangle]
pub unsafe extern "C" fn tether_resolve(
    bridge: *mut TetherBridge,
    object: *mut c_void,
    name: *const c_char,
    error: *mut *mut TetherError,
) -> c_int {
    let Some(handle) = handle_mut(bridge) else {
        set_error(error, None, FfiError::NullArgument);
        return -1;
    };
    let name = match c_str(name, "operation name") {
        Ok(name) => name,
        Err(e) => {
            set_error(error, Some(&*handle.bridge), e);
            return -1;
        }
    };

    let resolved = handle
        .bridge
        .resolve(&mut handle.runtime, NativeAddr::from_ptr(object), name);
    match resolved {
        Ok(_) => 0,
        Err(e) => {
            set_error(error, Some(&*handle.bridge), e.into());
            -1
        }
    }
}

/// Call a callable value with arguments
///
/// # Returns
/// * 0 on success (`result` receives the produced value)
/// * -1 on failure (check error parameter)
///
/// # Safety
/// - Bridge pointer must be valid
/// - `args` must point to `nargs` values (may be NULL when `nargs` is 0)
#[no_mangle]
pub unsafe extern "C" fn tether_call(
    bridge: *mut TetherBridge,
    callee: u64,
    args: *const u64,
    nargs: usize,
    result: *mut u64,
    error: *mut *mut TetherError,
) -> c_int {
    let Some(handle) = handle_mut(bridge) else {
        set_error(error, None, FfiError::NullArgument);
        return -1;
    };
    let args: Vec<ScriptValue> = if args.is_null() || nargs == 0 {
        Vec::new()
    } else {
        std::slice::from_raw_parts(args, nargs)
            .iter()
            .map(|bits| ScriptValue::from_bits(*bits))
            .collect()
    };

    match handle.runtime.call(ScriptValue::from_bits(callee), &args) {
        Ok(value) => {
            if !result.is_null() {
                *result = value.to_bits();
            }
            0
        }
        Err(e) => {
            set_error(error, Some(&*handle.bridge), e.into());
            -1
        }
    }
}

// ============================================================================
// Finalizer Hook / Collection
// ============================================================================

/// Run the finalizer validation on a value
///
/// # Returns
/// * 0 if `value` is a handle with a signature
/// * -1 otherwise (check error parameter)
///
/// # Safety
/// - Bridge pointer must be valid
#[no_mangle]
pub unsafe extern "C" fn tether_on_collect(
    bridge: *mut TetherBridge,
    value: u64,
    error: *mut *mut TetherError,
) -> c_int {
    let Some(handle) = handle_mut(bridge) else {
        set_error(error, None, FfiError::NullArgument);
        return -1;
    };
    match handle
        .bridge
        .on_collect(&handle.runtime, ScriptValue::from_bits(value))
    {
        Ok(()) => 0,
        Err(e) => {
            set_error(error, Some(&*handle.bridge), e.into());
            -1
        }
    }
}

/// Release an unreachable handle, running its finalizer entry once.
///
/// The native object and its registry entry are unaffected.
///
/// # Safety
/// - Bridge pointer must be valid
#[no_mangle]
pub unsafe extern "C" fn tether_collect(
    bridge: *mut TetherBridge,
    value: u64,
    error: *mut *mut TetherError,
) -> c_int {
    let Some(handle) = handle_mut(bridge) else {
        set_error(error, None, FfiError::NullArgument);
        return -1;
    };
    match handle.runtime.collect(ScriptValue::from_bits(value)) {
        Ok(()) => 0,
        Err(e) => {
            set_error(error, Some(&*handle.bridge), e.into());
            -1
        }
    }
}

/// Tell the bridge a native object has been freed
///
/// Existing handles for it become stale. Call this before the address can
/// be handed out again by the native allocator.
///
/// # Returns
/// * 1 if the object was registered, 0 otherwise
///
/// # Safety
/// - Bridge pointer must be valid
#[no_mangle]
pub unsafe extern "C" fn tether_invalidate(
    bridge: *mut TetherBridge,
    object: *mut c_void,
) -> c_int {
    let Some(handle) = handle_mut(bridge) else {
        return 0;
    };
    handle.bridge.invalidate(NativeAddr::from_ptr(object)) as c_int
}

// ============================================================================
// Produced Values
// ============================================================================

/// Pop the most recently produced value (null if none)
///
/// # Safety
/// - Bridge pointer must be valid
#[no_mangle]
pub unsafe extern "C" fn tether_pop(bridge: *mut TetherBridge) -> u64 {
    handle_mut(bridge)
        .and_then(|handle| handle.runtime.pop())
        .unwrap_or_default()
        .to_bits()
}

/// Number of produced values waiting to be popped
///
/// # Safety
/// - Bridge pointer must be valid
#[no_mangle]
pub unsafe extern "C" fn tether_stack_len(bridge: *mut TetherBridge) -> usize {
    handle_mut(bridge).map_or(0, |handle| handle.runtime.stack().len())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get error message
///
/// # Returns
/// * Null-terminated error message (owned by the error)
/// * NULL if `error` is NULL
///
/// # Safety
/// - Error pointer must be valid (or NULL)
#[no_mangle]
pub unsafe extern "C" fn tether_error_message(error: *const TetherError) -> *const c_char {
    if error.is_null() {
        return ptr::null();
    }
    (*error).message
}

/// Free an error
///
/// # Safety
/// - Error pointer must be valid (created by a tether function)
/// - Error must not be used after this call
#[no_mangle]
pub unsafe extern "C" fn tether_error_free(error: *mut TetherError) {
    if error.is_null() {
        return;
    }

    let err = Box::from_raw(error);
    if !err.message.is_null() {
        drop(CString::from_raw(err.message));
    }
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the library version string
///
/// # Safety
/// - The returned string is a static string and must not be freed
#[no_mangle]
pub unsafe extern "C" fn tether_version() -> *const c_char {
    static VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");
    VERSION.as_ptr() as *const c_char
}

// ============================================================================
// Tests
// ============================================================================
