//! The process-wide registry handle.

use crate::Registry;

// The one and only process-wide registry. Uninitialized until `init` or the
// first register call, and never reset afterwards.
static PROCESS_REGISTRY: Registry = Registry::new();

/// Handle to the process-wide registry.
///
/// The returned registry follows the same contract as any other: exactly one
/// initialization (explicit `init` or implicit through a register call) for
/// the lifetime of the process.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use bindery::global;
///
/// struct AppName(&'static str);
///
/// global()
///     .register_instance::<AppName>(Arc::new(AppName("demo")))
///     .unwrap();
///
/// assert_eq!(global().resolve::<AppName>().unwrap().0, "demo");
/// ```
pub fn global() -> &'static Registry {
    &PROCESS_REGISTRY
}
