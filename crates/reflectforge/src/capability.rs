//! Process-wide runtime code generation capability.
//!
//! The host is probed at most once per publication: concurrent first callers
//! may each probe, but only the first result to be published is kept and
//! every later read returns it.

use std::sync::atomic::{AtomicU8, Ordering};

use tracing::{debug, info};

const UNKNOWN: u8 = 0;
const GRANTED: u8 = 1;
const DENIED: u8 = 2;

/// Code generation needs the `jit` feature and a host that can map
/// executable memory.
const SUPPORTED: bool = cfg!(all(feature = "jit", not(target_family = "wasm")));

static CAPABILITY: AtomicU8 = AtomicU8::new(UNKNOWN);

/// Tri-state view of the capability flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Not probed yet.
    Unknown,
    Granted,
    Denied,
}

impl Capability {
    /// Current flag state. Never probes.
    pub fn current() -> Self {
        if !SUPPORTED {
            return Capability::Denied;
        }
        match CAPABILITY.load(Ordering::Acquire) {
            GRANTED => Capability::Granted,
            DENIED => Capability::Denied,
            _ => Capability::Unknown,
        }
    }
}

/// Returns true if runtime code generation works in this process.
///
/// Probes on first use and memoizes the answer. Any failure while probing,
/// including a panic, counts as denied.
pub fn dynamic_code_generation() -> bool {
    if !SUPPORTED {
        return false;
    }
    resolve(&CAPABILITY, probe)
}

/// Settles `flag` from UNKNOWN to GRANTED or DENIED.
///
/// Racing callers may each run `check`, but only the first published value
/// wins and every caller returns it.
fn resolve(flag: &AtomicU8, check: impl FnOnce() -> bool) -> bool {
    match flag.load(Ordering::Acquire) {
        GRANTED => return true,
        DENIED => return false,
        _ => {}
    }

    let granted = check();
    info!(event = "capability_probe", granted);
    let computed = if granted { GRANTED } else { DENIED };
    match flag.compare_exchange(UNKNOWN, computed, Ordering::AcqRel, Ordering::Acquire) {
        Ok(_) => granted,
        Err(published) => {
            debug!(event = "capability_race_lost", published = published == GRANTED);
            published == GRANTED
        }
    }
}

#[cfg(feature = "jit")]
fn probe() -> bool {
    use std::panic::{catch_unwind, AssertUnwindSafe};

    const PROBE_VALUE: i64 = 0x5EED_CAFE;

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        crate::jit::compile_constant(PROBE_VALUE).map(|f| f.call_0())
    }));
    match outcome {
        Ok(Ok(value)) => value == PROBE_VALUE,
        Ok(Err(e)) => {
            debug!(event = "capability_probe_failed", error = %e);
            false
        }
        Err(_) => {
            debug!(event = "capability_probe_failed", error = "panic");
            false
        }
    }
}

#[cfg(not(feature = "jit"))]
fn probe() -> bool {
    false
}
