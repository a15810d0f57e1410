//! Process-wide registry of codec error handlers.
//!
//! Mirrors Python's `codecs.register_error` / `codecs.lookup_error`. The
//! registry starts with the handlers every Python build has (`strict`,
//! `ignore`, `replace`, `backslashreplace`); `surrogateescape` is added by
//! [`register_surrogateescape`], which any number of initialization paths may
//! call.

use super::surrogateescape::SurrogateEscape;
use super::{
    DecodeFault, DecodeRecovery, EncodeFault, EncodeRecovery, EncodeReplacement, SURROGATE_ESCAPE,
};
use crate::error::{FutureError, FutureResult};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use smallvec::{SmallVec, smallvec};
use std::sync::{Arc, LazyLock};
use tracing::{debug, trace};

/// A codec error handler.
///
/// Handlers either return a replacement and the position to resume from, or
/// an error (usually the fault's own `to_error()`).
pub trait ErrorHandler: Send + Sync {
    /// Recover from undecodable bytes.
    fn handle_decode(&self, fault: &DecodeFault<'_>) -> FutureResult<DecodeRecovery>;

    /// Recover from unencodable code points.
    fn handle_encode(&self, fault: &EncodeFault<'_>) -> FutureResult<EncodeRecovery>;
}

// =============================================================================
// Registry
// =============================================================================

/// Thread-safe map from handler name to handler.
pub struct HandlerRegistry {
    handlers: RwLock<FxHashMap<String, Arc<dyn ErrorHandler>>>,
}

impl HandlerRegistry {
    /// Create a registry holding the built-in handlers.
    #[must_use]
    pub fn new() -> Self {
        let mut handlers: FxHashMap<String, Arc<dyn ErrorHandler>> = FxHashMap::default();
        handlers.insert("strict".to_string(), Arc::new(Strict));
        handlers.insert("ignore".to_string(), Arc::new(Ignore));
        handlers.insert("replace".to_string(), Arc::new(Replace));
        handlers.insert("backslashreplace".to_string(), Arc::new(BackslashReplace));
        Self {
            handlers: RwLock::new(handlers),
        }
    }

    /// Look up a handler by name.
    pub fn lookup(&self, name: &str) -> FutureResult<Arc<dyn ErrorHandler>> {
        self.handlers
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| FutureError::lookup(format!("unknown error handler name '{name}'")))
    }

    /// Register (or replace) a handler.
    pub fn register(&self, name: &str, handler: Arc<dyn ErrorHandler>) {
        self.handlers.write().insert(name.to_string(), handler);
        debug!(handler = name, "registered codec error handler");
    }

    /// Register a handler unless one with the same name exists.
    ///
    /// Returns true when this call performed the registration.
    pub fn register_if_absent(
        &self,
        name: &str,
        make: impl FnOnce() -> Arc<dyn ErrorHandler>,
    ) -> bool {
        if self.handlers.read().contains_key(name) {
            return false;
        }
        let mut handlers = self.handlers.write();
        // Another thread may have won the race between the two locks.
        if handlers.contains_key(name) {
            return false;
        }
        handlers.insert(name.to_string(), make());
        debug!(handler = name, "registered codec error handler");
        true
    }

    /// Check whether a handler is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.read().contains_key(name)
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// The global handler registry.
pub static GLOBAL_REGISTRY: LazyLock<HandlerRegistry> = LazyLock::new(HandlerRegistry::new);

/// Look up an error handler in the global registry.
pub fn lookup_error(name: &str) -> FutureResult<Arc<dyn ErrorHandler>> {
    GLOBAL_REGISTRY.lookup(name)
}

/// Register an error handler in the global registry.
pub fn register_error(name: &str, handler: Arc<dyn ErrorHandler>) {
    GLOBAL_REGISTRY.register(name, handler);
}

/// Make the `surrogateescape` handler available.
///
/// Idempotent: when a handler with that name already exists (registered by an
/// earlier call or supplied by the host) this does nothing.
pub fn register_surrogateescape() {
    let registered = GLOBAL_REGISTRY.register_if_absent(SURROGATE_ESCAPE, || Arc::new(SurrogateEscape));
    if !registered {
        trace!("surrogateescape handler already present");
    }
}

// =============================================================================
// Built-in Handlers
// =============================================================================

/// Raise the fault as an error.
struct Strict;

impl ErrorHandler for Strict {
    fn handle_decode(&self, fault: &DecodeFault<'_>) -> FutureResult<DecodeRecovery> {
        Err(fault.to_error())
    }

    fn handle_encode(&self, fault: &EncodeFault<'_>) -> FutureResult<EncodeRecovery> {
        Err(fault.to_error())
    }
}

/// Drop the faulty range.
struct Ignore;

impl ErrorHandler for Ignore {
    fn handle_decode(&self, fault: &DecodeFault<'_>) -> FutureResult<DecodeRecovery> {
        Ok(DecodeRecovery {
            replacement: SmallVec::new(),
            resume: fault.end,
        })
    }

    fn handle_encode(&self, fault: &EncodeFault<'_>) -> FutureResult<EncodeRecovery> {
        Ok(EncodeRecovery {
            replacement: EncodeReplacement::Bytes(SmallVec::new()),
            resume: fault.end,
        })
    }
}

/// U+FFFD when decoding, `?` per code point when encoding.
struct Replace;

impl ErrorHandler for Replace {
    fn handle_decode(&self, fault: &DecodeFault<'_>) -> FutureResult<DecodeRecovery> {
        Ok(DecodeRecovery {
            replacement: smallvec![0xFFFD],
            resume: fault.end,
        })
    }

    fn handle_encode(&self, fault: &EncodeFault<'_>) -> FutureResult<EncodeRecovery> {
        Ok(EncodeRecovery {
            replacement: EncodeReplacement::Text(smallvec![u32::from(b'?'); fault.end - fault.start]),
            resume: fault.end,
        })
    }
}

/// Python-style backslash escapes.
struct BackslashReplace;

impl ErrorHandler for BackslashReplace {
    fn handle_decode(&self, fault: &DecodeFault<'_>) -> FutureResult<DecodeRecovery> {
        let mut replacement = SmallVec::new();
        for byte in fault.bytes() {
            replacement.extend(format!("\\x{byte:02x}").chars().map(u32::from));
        }
        Ok(DecodeRecovery {
            replacement,
            resume: fault.end,
        })
    }

    fn handle_encode(&self, fault: &EncodeFault<'_>) -> FutureResult<EncodeRecovery> {
        let mut replacement = SmallVec::new();
        for &cp in fault.code_points() {
            let escaped = if cp < 0x100 {
                format!("\\x{cp:02x}")
            } else if cp < 0x10000 {
                format!("\\u{cp:04x}")
            } else {
                format!("\\U{cp:08x}")
            };
            replacement.extend(escaped.chars().map(u32::from));
        }
        Ok(EncodeRecovery {
            replacement: EncodeReplacement::Text(replacement),
            resume: fault.end,
        })
    }
}
