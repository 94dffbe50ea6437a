//! Integration tests for the handle bridge
//!
//! Drives the bridge through `LocalRuntime` the way an embedding would:
//! create handles, pass them back in, alias them, collect them, and resolve
//! native-to-script callbacks.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tether_core::{
    Bridge, BridgeError, ErrorKind, LocalRuntime, Member, NativeAddr, OpTable, ScriptRuntime,
    ScriptValue, Signature, FINALIZER_KEY,
};

const WINDOW: Signature = Signature::new(1);
const BUTTON: Signature = Signature::new(2);
const KIND_42: Signature = Signature::new(42);

fn addr(bits: usize) -> NativeAddr {
    NativeAddr::from_bits(bits)
}

/// Create a handle and take it off the produced-value stack
fn make(
    bridge: &Bridge,
    rt: &mut LocalRuntime,
    at: usize,
    sig: Signature,
    tables: &[&OpTable],
) -> ScriptValue {
    bridge.create(rt, addr(at), sig, tables).unwrap();
    rt.pop().unwrap()
}

#[test]
fn test_round_trip() {
    let bridge = Bridge::new();
    let mut rt = LocalRuntime::new();

    for (i, sig) in [WINDOW, BUTTON, KIND_42].into_iter().enumerate() {
        let at = 0x1000 + i * 0x100;
        let h = make(&bridge, &mut rt, at, sig, &[]);
        let info = bridge.get_object(&rt, h).unwrap();
        assert_eq!(info.addr, addr(at));
        assert_eq!(info.signature, Some(sig));
    }
}

#[test]
fn test_alias_preserves_identity() {
    let bridge = Bridge::new();
    let mut rt = LocalRuntime::new();
    let methods = OpTable::new().with("title", |_rt, _args| Ok(ScriptValue::i32(7)));
    let original = make(&bridge, &mut rt, 0x1000, WINDOW, &[&methods]);

    let alias = bridge.alias(&mut rt, addr(0x1000)).unwrap();
    assert_eq!(rt.pop(), Some(alias));
    assert_ne!(alias, original);

    assert_eq!(bridge.check_object(&rt, alias, WINDOW), Some(addr(0x1000)));
    let a = rt.descriptor(original).unwrap();
    let b = rt.descriptor(alias).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(bridge.registry().len(), 1);

    let via_original = bridge.get_member(&mut rt, original, "title").unwrap();
    let via_alias = bridge.get_member(&mut rt, alias, "title").unwrap();
    assert_eq!(via_original, via_alias);
    assert_eq!(rt.call(via_alias, &[alias]).unwrap().as_i32(), Some(7));
}

#[test]
fn test_alias_of_unregistered_object() {
    let bridge = Bridge::new();
    let mut rt = LocalRuntime::new();
    assert!(bridge.alias(&mut rt, addr(0x5000)).is_none());
    assert!(rt.stack().is_empty());
    assert!(bridge.registry().is_empty());
}

#[test]
fn test_unregistered_rejection() {
    let bridge = Bridge::new();
    let mut rt = LocalRuntime::new();
    make(&bridge, &mut rt, 0x1000, WINDOW, &[]);

    // hand-crafted handle around an address that was never created
    let forged = rt.alloc_handle(addr(0x7000));
    let err = bridge.get_object(&rt, forged).unwrap_err();
    assert_eq!(
        err,
        BridgeError::Unregistered {
            addr: addr(0x7000),
            kind: None,
        }
    );
    assert_eq!(err.kind(), ErrorKind::Unregistered);
    assert!(!bridge.is_object(&rt, forged, None));
    assert!(bridge.check_object(&rt, forged, WINDOW).is_none());
}

#[test]
fn test_forged_handle_with_borrowed_descriptor_is_still_rejected() {
    let bridge = Bridge::new();
    let mut rt = LocalRuntime::new();
    let real = make(&bridge, &mut rt, 0x1000, WINDOW, &[]);

    let forged = rt.alloc_handle(addr(0x7000));
    let table = rt.descriptor(real).unwrap();
    rt.attach_descriptor(forged, table).unwrap();

    assert!(bridge.get_object(&rt, forged).unwrap_err().is_unregistered());
    assert!(!bridge.is_object(&rt, forged, Some(WINDOW)));
    assert!(bridge.check_object(&rt, forged, WINDOW).is_none());
}

#[test]
fn test_signature_discrimination() {
    let bridge = Bridge::new();
    let mut rt = LocalRuntime::new();
    let h = make(&bridge, &mut rt, 0x1000, WINDOW, &[]);

    assert_eq!(bridge.check_object(&rt, h, WINDOW), Some(addr(0x1000)));
    assert_eq!(bridge.check_object(&rt, h, BUTTON), None);
    assert!(bridge.is_object(&rt, h, Some(WINDOW)));
    assert!(!bridge.is_object(&rt, h, Some(BUTTON)));
}

#[test]
fn test_null_pointer_safety() {
    let bridge = Bridge::new();
    let mut rt = LocalRuntime::new();
    let h = make(&bridge, &mut rt, 0x1000, WINDOW, &[]);
    rt.set_slot(h, NativeAddr::NULL).unwrap();

    let err = bridge.get_object(&rt, h).unwrap_err();
    assert_eq!(
        err,
        BridgeError::NullPointer {
            kind: Some("signature 1".to_string()),
        }
    );
    assert!(err.is_unregistered());
    assert!(!bridge.is_object(&rt, h, None));
    assert!(bridge.check_object(&rt, h, WINDOW).is_none());
    assert!(bridge.get_member(&mut rt, h, "anything").is_err());
}

#[test]
fn test_null_pointer_even_if_null_registered() {
    let bridge = Bridge::new();
    let mut rt = LocalRuntime::new();
    let h = make(&bridge, &mut rt, 0, WINDOW, &[]);
    let err = bridge.get_object(&rt, h).unwrap_err();
    assert!(matches!(err, BridgeError::NullPointer { .. }));
}

#[test]
fn test_query_variants_on_non_handles() {
    let bridge = Bridge::new();
    let rt = LocalRuntime::new();
    for value in [
        ScriptValue::null(),
        ScriptValue::bool(true),
        ScriptValue::i32(0x1000),
        ScriptValue::f64(4096.0),
        ScriptValue::function(0),
    ] {
        assert!(!bridge.is_object(&rt, value, None));
        assert!(bridge.check_object(&rt, value, WINDOW).is_none());
        let err = bridge.get_object(&rt, value).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Shape);
    }
}

#[test]
fn test_negative_nan_is_not_a_handle() {
    let bridge = Bridge::new();
    let mut rt = LocalRuntime::new();
    // the first cell ever allocated shares its payload with a sign-bit NaN
    make(&bridge, &mut rt, 0x1000, WINDOW, &[]);

    for nan in [-f64::NAN, f64::from_bits(0xFFF8_0000_0000_0000)] {
        let value = ScriptValue::f64(nan);
        let err = bridge.get_object(&rt, value).unwrap_err();
        assert_eq!(err, BridgeError::NotAHandle { got: "float" });
        assert!(!bridge.is_object(&rt, value, None));
        assert!(bridge.check_object(&rt, value, WINDOW).is_none());
    }
}

#[test]
fn test_stale_handle_names_its_kind() {
    let bridge = Bridge::new();
    let mut rt = LocalRuntime::new();
    bridge
        .create_kind(&mut rt, addr(0x1000), Signature::new(7), Some("window"), &[])
        .unwrap();
    let h = rt.pop().unwrap();
    bridge.invalidate(addr(0x1000));

    let message = bridge.describe_error(&bridge.get_object(&rt, h).unwrap_err());
    assert!(message.starts_with("tether window (signature 7): "));
    assert!(message.contains("0x1000 is not valid in registry"));
}

#[test]
fn test_finalizer_inertness() {
    let bridge = Bridge::new();
    let mut rt = LocalRuntime::new();
    let h = make(&bridge, &mut rt, 0x1000, WINDOW, &[]);
    let alias = bridge.alias(&mut rt, addr(0x1000)).unwrap();

    bridge.on_collect(&rt, h).unwrap();
    rt.collect(h).unwrap();

    assert!(bridge.registry().contains(addr(0x1000)));
    assert_eq!(bridge.get_object(&rt, alias).unwrap().addr, addr(0x1000));
    assert!(bridge.alias(&mut rt, addr(0x1000)).is_some());
}

#[test]
fn test_finalizer_rejects_malformed_values() {
    let bridge = Bridge::new();
    let mut rt = LocalRuntime::new();
    assert_eq!(
        bridge.on_collect(&rt, ScriptValue::bool(false)).unwrap_err(),
        BridgeError::NotAHandle { got: "bool" }
    );
    let bare = rt.alloc_handle(addr(0x1000));
    assert_eq!(
        bridge.on_collect(&rt, bare).unwrap_err(),
        BridgeError::MissingSignature
    );
}

#[test]
fn test_finalizer_override_runs_once_per_collect() {
    let bridge = Bridge::new();
    let mut rt = LocalRuntime::new();
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = runs.clone();
    let gc = OpTable::new().with(FINALIZER_KEY, move |rt, args| {
        tether_core::on_collect(rt, args[0])?;
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(ScriptValue::null())
    });

    let h = make(&bridge, &mut rt, 0x1000, WINDOW, &[&gc]);
    let alias = bridge.alias(&mut rt, addr(0x1000)).unwrap();

    rt.collect(h).unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    rt.collect(alias).unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 2);
    assert!(rt.collect(alias).is_err());
    assert_eq!(runs.load(Ordering::SeqCst), 2);
    assert!(bridge.registry().contains(addr(0x1000)));
}

#[test]
fn test_script_finalizer_runs_once_per_collect() {
    let bridge = Bridge::new();
    let mut rt = LocalRuntime::new();
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = runs.clone();
    let script_gc = rt.register_function(move |rt, args| {
        tether_core::on_collect(rt, args[0])?;
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(ScriptValue::null())
    });
    let gc = OpTable::new().with_member(FINALIZER_KEY, Member::Value(script_gc));

    let h = make(&bridge, &mut rt, 0x1000, WINDOW, &[&gc]);
    assert_eq!(
        rt.descriptor(h).unwrap().finalizer().as_value(),
        Some(script_gc)
    );

    rt.collect(h).unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert!(rt.collect(h).is_err());
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    assert!(bridge.registry().contains(addr(0x1000)));
    let alias = bridge.alias(&mut rt, addr(0x1000)).unwrap();
    assert_eq!(bridge.check_object(&rt, alias, WINDOW), Some(addr(0x1000)));
}

#[test]
fn test_resolve_scenario() {
    let bridge = Bridge::new();
    let mut rt = LocalRuntime::new();
    let foo = Member::native(|_rt, _args| Ok(ScriptValue::i32(1)));
    let table = OpTable::new().with_member("foo", foo.clone());
    let original = make(&bridge, &mut rt, 0x1000, KIND_42, &[&table]);

    let cb = bridge.resolve(&mut rt, addr(0x1000), "foo").unwrap();
    assert!(cb.callable.as_ref().unwrap().same_as(&foo));
    assert_ne!(cb.receiver, original);
    assert_eq!(bridge.check_object(&rt, cb.receiver, KIND_42), Some(addr(0x1000)));

    // callable first, receiver second
    let pushed = rt.stack().to_vec();
    assert_eq!(pushed.len(), 2);
    assert!(pushed[0].is_function());
    assert_eq!(pushed[1], cb.receiver);
    assert_eq!(bridge.registry().len(), 1);
}

#[test]
fn test_resolve_unregistered() {
    let bridge = Bridge::new();
    let mut rt = LocalRuntime::new();
    let err = bridge.resolve(&mut rt, addr(0x1000), "foo").unwrap_err();
    assert_eq!(
        err,
        BridgeError::Unregistered {
            addr: addr(0x1000),
            kind: None,
        }
    );
    assert!(rt.stack().is_empty());
}

#[test]
fn test_script_callback_reaches_native_side() {
    let bridge = Bridge::new();
    let mut rt = LocalRuntime::new();
    let button = make(&bridge, &mut rt, 0x2000, BUTTON, &[]);

    let clicks = Arc::new(AtomicUsize::new(0));
    let seen = clicks.clone();
    let on_click = rt.register_function(move |_rt, args| {
        assert!(args[0].is_cell());
        seen.fetch_add(1, Ordering::SeqCst);
        Ok(ScriptValue::bool(true))
    });
    bridge.set_member(&mut rt, button, "onClicked", on_click).unwrap();

    let cb = bridge.resolve(&mut rt, addr(0x2000), "onClicked").unwrap();
    let result = cb.invoke(&mut rt, &[]).unwrap();
    assert_eq!(result, Some(ScriptValue::bool(true)));
    assert_eq!(clicks.load(Ordering::SeqCst), 1);
}

#[test]
fn test_member_written_through_alias_is_shared() {
    let bridge = Bridge::new();
    let mut rt = LocalRuntime::new();
    let h = make(&bridge, &mut rt, 0x3000, WINDOW, &[]);
    let alias = bridge.alias(&mut rt, addr(0x3000)).unwrap();

    bridge.set_member(&mut rt, alias, "tag", ScriptValue::i32(99)).unwrap();
    assert_eq!(bridge.get_member(&mut rt, h, "tag").unwrap(), ScriptValue::i32(99));
    assert!(bridge.get_member(&mut rt, h, "missing").unwrap().is_null());
}

#[test]
fn test_fragments_merge_left_to_right() {
    let bridge = Bridge::new();
    let mut rt = LocalRuntime::new();
    let control = OpTable::new()
        .with("show", |_rt, _args| Ok(ScriptValue::i32(1)))
        .with("enabled", |_rt, _args| Ok(ScriptValue::i32(1)));
    let window = OpTable::new().with("show", |_rt, _args| Ok(ScriptValue::i32(2)));

    let h = make(&bridge, &mut rt, 0x4000, WINDOW, &[&control, &window]);
    let show = bridge.get_member(&mut rt, h, "show").unwrap();
    let enabled = bridge.get_member(&mut rt, h, "enabled").unwrap();
    assert_eq!(rt.call(show, &[h]).unwrap(), ScriptValue::i32(2));
    assert_eq!(rt.call(enabled, &[h]).unwrap(), ScriptValue::i32(1));

    let h2 = make(&bridge, &mut rt, 0x4100, WINDOW, &[&window, &control]);
    let show = bridge.get_member(&mut rt, h2, "show").unwrap();
    assert_eq!(rt.call(show, &[h2]).unwrap(), ScriptValue::i32(1));
}

#[test]
fn test_native_method_validates_receiver() {
    let bridge = Arc::new(Bridge::new());
    let mut rt = LocalRuntime::new();
    let checker = bridge.clone();
    let methods = OpTable::new().with("address", move |rt, args| {
        let target = checker.expect_object(rt, args[0], WINDOW)?;
        Ok(ScriptValue::i32(target.to_bits() as i32))
    });

    let win = make(&bridge, &mut rt, 0x1000, WINDOW, &[&methods]);
    let btn = make(&bridge, &mut rt, 0x2000, BUTTON, &[]);
    let method = bridge.get_member(&mut rt, win, "address").unwrap();

    assert_eq!(rt.call(method, &[win]).unwrap(), ScriptValue::i32(0x1000));
    let err = rt.call(method, &[btn]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SignatureMismatch);
}

#[test]
fn test_invalidate_makes_handles_stale() {
    let bridge = Bridge::new();
    let mut rt = LocalRuntime::new();
    let h = make(&bridge, &mut rt, 0x1000, WINDOW, &[]);

    assert!(bridge.invalidate(addr(0x1000)));
    assert!(!bridge.invalidate(addr(0x1000)));
    assert!(bridge.get_object(&rt, h).unwrap_err().is_unregistered());
    assert!(bridge.alias(&mut rt, addr(0x1000)).is_none());
    assert!(bridge.resolve(&mut rt, addr(0x1000), "x").is_err());
}

#[test]
fn test_address_reuse_overwrites_kind() {
    let bridge = Bridge::new();
    let mut rt = LocalRuntime::new();
    let old = make(&bridge, &mut rt, 0x1000, WINDOW, &[]);
    let new = make(&bridge, &mut rt, 0x1000, BUTTON, &[]);

    assert_eq!(bridge.registry().len(), 1);
    let alias = bridge.alias(&mut rt, addr(0x1000)).unwrap();
    assert_eq!(bridge.check_object(&rt, alias, BUTTON), Some(addr(0x1000)));
    assert_eq!(bridge.check_object(&rt, new, BUTTON), Some(addr(0x1000)));
    // the old handle still carries its own table and signature
    assert_eq!(bridge.check_object(&rt, old, WINDOW), Some(addr(0x1000)));
}
