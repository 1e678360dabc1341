//! Link-time auto-discovery of contract declarations.
//!
//! Modules submit a [`DeclarationSet`] through `inventory::submit!`; every
//! set linked into the final binary is collected here and applied to a
//! registry in priority order. This replaces hand-maintained registration
//! call sites with a compiler-checked table: adding a module to the build is
//! what registers its contracts.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use bindery::{AutoDiscovery, Declaration, DeclarationSet, Registry};
//!
//! trait Clock: Send + Sync {
//!     fn now_millis(&self) -> u64;
//! }
//!
//! struct FixedClock;
//!
//! impl Clock for FixedClock {
//!     fn now_millis(&self) -> u64 {
//!         0
//!     }
//! }
//!
//! fn clock_declarations() -> Vec<Declaration> {
//!     vec![Declaration::lazy::<dyn Clock, _>(|| Ok(Arc::new(FixedClock)))]
//! }
//!
//! inventory::submit! {
//!     DeclarationSet::new("clock", clock_declarations)
//! }
//!
//! let registry = Registry::new();
//! registry.init(AutoDiscovery::Enabled).unwrap();
//! assert!(registry.is_registered::<dyn Clock>());
//! ```

use std::any::{type_name, TypeId};
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::binding::{erase, erase_instance, Binding, Constructor, Slot};
use crate::{Lifecycle, Registry, RegistryError, RegistryResult};

/// Whether [`Registry::init`] runs the discovery scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoDiscovery {
    Enabled,
    Disabled,
}

/// One declared contract binding, produced by a [`DeclarationSet`].
///
/// The typed constructors pin the declared contract to the supplied
/// implementation at compile time, so a declaration can never pair a
/// contract with a value of the wrong type.
pub struct Declaration {
    key: TypeId,
    contract: &'static str,
    form: Form,
}

enum Form {
    Instance(Slot),
    Eager(Constructor),
    Lazy(Constructor),
    Factory(Constructor),
}

impl Declaration {
    /// Declare a pre-built instance (eager lifecycle).
    pub fn instance<C>(instance: Arc<C>) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
    {
        Self {
            key: TypeId::of::<C>(),
            contract: type_name::<C>(),
            form: Form::Instance(erase_instance(instance)),
        }
    }

    /// Declare an eagerly constructed singleton; the constructor runs during
    /// the scan.
    pub fn eager<C, F>(construct: F) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
        F: Fn() -> anyhow::Result<Arc<C>> + Send + Sync + 'static,
    {
        Self {
            key: TypeId::of::<C>(),
            contract: type_name::<C>(),
            form: Form::Eager(erase(construct)),
        }
    }

    /// Declare a lazy singleton.
    pub fn lazy<C, F>(construct: F) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
        F: Fn() -> anyhow::Result<Arc<C>> + Send + Sync + 'static,
    {
        Self {
            key: TypeId::of::<C>(),
            contract: type_name::<C>(),
            form: Form::Lazy(erase(construct)),
        }
    }

    /// Declare a transient factory.
    pub fn factory<C, F>(construct: F) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
        F: Fn() -> anyhow::Result<Arc<C>> + Send + Sync + 'static,
    {
        Self {
            key: TypeId::of::<C>(),
            contract: type_name::<C>(),
            form: Form::Factory(erase(construct)),
        }
    }

    /// Declared contract name.
    pub fn contract(&self) -> &'static str {
        self.contract
    }

    /// Declared lifecycle.
    pub fn lifecycle(&self) -> Lifecycle {
        match self.form {
            Form::Instance(_) | Form::Eager(_) => Lifecycle::Eager,
            Form::Lazy(_) => Lifecycle::Lazy,
            Form::Factory(_) => Lifecycle::Factory,
        }
    }

    pub(crate) fn key(&self) -> TypeId {
        self.key
    }

    /// Convert into a binding; eager declarations construct here.
    pub(crate) fn into_binding(self) -> RegistryResult<(TypeId, Binding)> {
        let binding = match self.form {
            Form::Instance(slot) => Binding::eager(self.contract, slot),
            Form::Eager(construct) => {
                let slot = construct().map_err(|source| RegistryError::Activation {
                    contract: self.contract,
                    source,
                })?;
                Binding::eager(self.contract, slot)
            }
            Form::Lazy(construct) => Binding::lazy(self.contract, construct),
            Form::Factory(construct) => Binding::factory(self.contract, construct),
        };
        Ok((self.key, binding))
    }
}

impl fmt::Debug for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Declaration")
            .field("contract", &self.contract)
            .field("lifecycle", &self.lifecycle())
            .finish()
    }
}

/// A named group of declarations submitted through `inventory`.
///
/// Sets are applied in ascending priority order (lower value first, default
/// 100); sets sharing a priority keep their collection order.
#[derive(Debug)]
pub struct DeclarationSet {
    /// Name of the declaring module, used in logs and diagnostics.
    pub name: &'static str,
    /// Produces the set's declarations at scan time.
    pub provide: fn() -> Vec<Declaration>,
    /// Scan ordering; lower runs earlier.
    pub priority: u32,
}

impl DeclarationSet {
    /// Create a set with the default priority of 100.
    pub const fn new(name: &'static str, provide: fn() -> Vec<Declaration>) -> Self {
        Self {
            name,
            provide,
            priority: 100,
        }
    }

    /// Create a set with an explicit priority.
    pub const fn with_priority(
        name: &'static str,
        provide: fn() -> Vec<Declaration>,
        priority: u32,
    ) -> Self {
        Self {
            name,
            provide,
            priority,
        }
    }
}

inventory::collect!(DeclarationSet);

/// Apply every collected declaration set to `registry`.
///
/// Sets run in priority order; the first failing declaration aborts the
/// whole scan and surfaces its error. Declarations applied before the
/// failure stay registered, since the registry has no unregistration path.
pub fn apply_declarations(registry: &Registry) -> RegistryResult<()> {
    let mut sets: Vec<&DeclarationSet> = inventory::iter::<DeclarationSet>().collect();
    // Stable sort keeps collection order within equal priorities.
    sets.sort_by_key(|set| set.priority);

    info!("Discovered {} declaration sets via inventory", sets.len());

    for set in sets {
        debug!(
            "Applying declaration set '{}' (priority: {})",
            set.name, set.priority
        );
        for declaration in (set.provide)() {
            registry.apply_declaration(declaration)?;
        }
    }

    info!("All discovered declarations applied");
    Ok(())
}

/// Number of collected declaration sets.
pub fn declaration_set_count() -> usize {
    inventory::iter::<DeclarationSet>().count()
}

/// Names of all collected declaration sets.
pub fn declaration_set_names() -> Vec<&'static str> {
    inventory::iter::<DeclarationSet>()
        .map(|set| set.name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe_declarations() -> Vec<Declaration> {
        vec![Declaration::instance::<String>(Arc::new(
            "probe".to_string(),
        ))]
    }

    inventory::submit! {
        DeclarationSet::new("discovery_probe", probe_declarations)
    }

    #[test]
    fn collected_sets_include_probe() {
        assert!(declaration_set_names().contains(&"discovery_probe"));
        assert!(declaration_set_count() >= 1);
    }

    #[test]
    fn scan_applies_probe_set() {
        let registry = Registry::new();
        apply_declarations(&registry).unwrap();
        assert!(registry.is_registered::<String>());
        assert_eq!(*registry.resolve::<String>().unwrap(), "probe");
    }

    #[test]
    fn declaration_reports_contract_and_lifecycle() {
        let declaration = Declaration::lazy::<String, _>(|| Ok(Arc::new("lazy".to_string())));
        assert!(declaration.contract().contains("String"));
        assert_eq!(declaration.lifecycle(), Lifecycle::Lazy);
    }
}
