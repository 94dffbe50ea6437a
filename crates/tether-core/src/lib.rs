//! Tether - handle bridge for externally owned native objects
//!
//! Lets a garbage-collected script runtime hold, pass around, and
//! type-check references to objects whose memory belongs to an external,
//! non-collected subsystem. The bridge tracks identity and liveness; it
//! never frees a native object.
//!
//! # Example
//!
//! ```ignore
//! use tether_core::{Bridge, LocalRuntime, NativeAddr, OpTable, Signature, ScriptValue};
//!
//! const WINDOW: Signature = Signature::new(1);
//!
//! let bridge = Bridge::new();
//! let mut rt = LocalRuntime::new();
//! let methods = OpTable::new().with("show", |_rt, _args| Ok(ScriptValue::null()));
//!
//! let window = NativeAddr::from_bits(0x1000);
//! bridge.create(&mut rt, window, WINDOW, &[&methods])?;
//! let handle = rt.pop().unwrap();
//! assert_eq!(bridge.check_object(&rt, handle, WINDOW), Some(window));
//! ```

#![warn(missing_docs)]

pub mod address;
pub mod bridge;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod finalizer;
pub mod local;
pub mod registry;
pub mod runtime;
pub mod signature;
pub mod value;

pub use address::NativeAddr;
pub use bridge::{Bridge, Callback, ObjectInfo};
pub use config::{BridgeConfig, ConfigError, ReusePolicy};
pub use dispatch::{DispatchTable, Member, NativeOp, OpTable, FINALIZER_KEY};
pub use error::{BridgeError, BridgeResult, ErrorKind};
pub use finalizer::on_collect;
pub use local::LocalRuntime;
pub use registry::{Registry, RegistryEntry};
pub use runtime::ScriptRuntime;
pub use signature::Signature;
pub use value::ScriptValue;
