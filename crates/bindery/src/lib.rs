//! Process-wide contract registry.
//!
//! This crate provides a service locator pattern implementation: concrete
//! implementations are registered against abstract contract types and later
//! retrieved by contract identity alone. Three lifecycles are supported
//! behind one thread-safe, initialize-once registry:
//!
//! - **Eager**: the instance exists from registration onward
//! - **Lazy**: the instance is constructed on first resolve, at most once
//! - **Factory**: a fresh instance is constructed on every resolve
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use bindery::{AutoDiscovery, Registry};
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! struct English;
//!
//! impl Greeter for English {
//!     fn greet(&self) -> String {
//!         "hello".to_string()
//!     }
//! }
//!
//! let registry = Registry::new();
//! registry.init(AutoDiscovery::Disabled).unwrap();
//! registry
//!     .register_instance::<dyn Greeter>(Arc::new(English))
//!     .unwrap();
//!
//! let greeter = registry.resolve::<dyn Greeter>().unwrap();
//! assert_eq!(greeter.greet(), "hello");
//! ```
//!
//! See the [`usage`] module for detailed usage examples.

use std::any::{type_name, TypeId};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use tracing::{debug, info};

pub mod discovery;
pub mod provider;
pub mod usage;

mod binding;
mod global;

pub use binding::Lifecycle;
pub use discovery::{
    apply_declarations, declaration_set_count, declaration_set_names, AutoDiscovery, Declaration,
    DeclarationSet,
};
pub use global::global;
pub use provider::{ContractProvider, ProviderSet};

use binding::{erase, erase_instance, Binding};

/// Errors that can occur during registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// A second initialization attempt, including after a register call
    /// already self-initialized the registry.
    #[error("Registry already initialized")]
    AlreadyInitialized,

    #[error("Registry not initialized")]
    NotInitialized,

    #[error("Contract already registered: {contract}")]
    AlreadyRegistered { contract: &'static str },

    #[error("Contract not registered: {contract}")]
    NotRegistered { contract: &'static str },

    /// A constructor failed while materializing a binding.
    #[error("Activation failed for contract: {contract}")]
    Activation {
        contract: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// A stored value failed the downcast back to its contract type.
    #[error("Implementation does not satisfy contract: {contract}")]
    ContractMismatch { contract: &'static str },
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Shared state created at initialization time.
///
/// The bindings map exists exactly when the registry is initialized, so
/// "initialized" never has to be tracked separately from the map itself.
struct RegistryState {
    bindings: DashMap<TypeId, Arc<Binding>>,
}

impl RegistryState {
    fn new() -> Self {
        Self {
            bindings: DashMap::new(),
        }
    }

    /// Insert under first-committer-wins semantics.
    fn insert(&self, key: TypeId, binding: Binding) -> RegistryResult<()> {
        match self.bindings.entry(key) {
            Entry::Occupied(_) => Err(RegistryError::AlreadyRegistered {
                contract: binding.contract(),
            }),
            Entry::Vacant(vacant) => {
                debug!(
                    "Registered contract: {} ({:?})",
                    binding.contract(),
                    binding.lifecycle()
                );
                vacant.insert(Arc::new(binding));
                Ok(())
            }
        }
    }
}

/// The contract registry.
///
/// A registry starts uninitialized. [`Registry::init`] publishes the empty
/// bindings map exactly once, and any register call self-initializes an
/// untouched registry with auto-discovery disabled. Registration and
/// resolution are safe from arbitrary threads; operations on unrelated
/// contracts do not contend with each other.
pub struct Registry {
    state: OnceCell<RegistryState>,
}

impl Registry {
    /// Create a new, uninitialized registry.
    ///
    /// `const` so a registry can live in a `static`; see [`global()`].
    pub const fn new() -> Self {
        Self {
            state: OnceCell::new(),
        }
    }

    /// Initialize the registry.
    ///
    /// With [`AutoDiscovery::Enabled`] the call then applies every
    /// declaration set collected via `inventory`. The first scan error
    /// aborts the scan and surfaces here while the registry itself stays
    /// initialized; declarations applied before the failure remain, since
    /// there is no unregistration.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AlreadyInitialized`] on any second call,
    /// including after a register call self-initialized the registry.
    pub fn init(&self, mode: AutoDiscovery) -> RegistryResult<()> {
        self.state
            .set(RegistryState::new())
            .map_err(|_| RegistryError::AlreadyInitialized)?;
        info!("Registry initialized (auto-discovery {:?})", mode);
        if mode == AutoDiscovery::Enabled {
            discovery::apply_declarations(self)?;
        }
        Ok(())
    }

    /// Bindings map, created on first use.
    ///
    /// Registration self-initializes an untouched registry with
    /// auto-discovery disabled; a later explicit `init` then reports
    /// `AlreadyInitialized`.
    fn state_or_init(&self) -> &RegistryState {
        self.state.get_or_init(|| {
            debug!("Registry self-initialized by first registration");
            RegistryState::new()
        })
    }

    /// Register a pre-built instance under contract `C` (eager lifecycle).
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AlreadyRegistered`] if `C` already has a
    /// binding; the existing binding is untouched.
    pub fn register_instance<C>(&self, instance: Arc<C>) -> RegistryResult<()>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        self.state_or_init().insert(
            TypeId::of::<C>(),
            Binding::eager(type_name::<C>(), erase_instance(instance)),
        )
    }

    /// Register contract `C` with an eager lifecycle.
    ///
    /// The constructor runs synchronously inside this call.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Activation`] if the constructor fails; no
    /// binding is left behind and a later register may try again. Returns
    /// [`RegistryError::AlreadyRegistered`] if `C` already has a binding.
    pub fn register_eager<C, F>(&self, construct: F) -> RegistryResult<()>
    where
        C: ?Sized + Send + Sync + 'static,
        F: FnOnce() -> anyhow::Result<Arc<C>>,
    {
        let state = self.state_or_init();
        // Do not construct when the contract is already bound; the entry
        // API below still decides races.
        if state.bindings.contains_key(&TypeId::of::<C>()) {
            return Err(RegistryError::AlreadyRegistered {
                contract: type_name::<C>(),
            });
        }
        let instance = construct().map_err(|source| RegistryError::Activation {
            contract: type_name::<C>(),
            source,
        })?;
        state.insert(
            TypeId::of::<C>(),
            Binding::eager(type_name::<C>(), erase_instance(instance)),
        )
    }

    /// Register contract `C` with a lazy-singleton lifecycle.
    ///
    /// The constructor runs on the first resolve, at most once even under
    /// concurrent first resolves, and the instance is cached for the
    /// registry's lifetime. A failed construction caches nothing and the
    /// next resolve retries.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AlreadyRegistered`] if `C` already has a
    /// binding.
    pub fn register_lazy<C, F>(&self, construct: F) -> RegistryResult<()>
    where
        C: ?Sized + Send + Sync + 'static,
        F: Fn() -> anyhow::Result<Arc<C>> + Send + Sync + 'static,
    {
        self.state_or_init().insert(
            TypeId::of::<C>(),
            Binding::lazy(type_name::<C>(), erase(construct)),
        )
    }

    /// Register contract `C` with a transient-factory lifecycle.
    ///
    /// The constructor runs on every resolve; nothing is cached.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AlreadyRegistered`] if `C` already has a
    /// binding.
    pub fn register_factory<C, F>(&self, construct: F) -> RegistryResult<()>
    where
        C: ?Sized + Send + Sync + 'static,
        F: Fn() -> anyhow::Result<Arc<C>> + Send + Sync + 'static,
    {
        self.state_or_init().insert(
            TypeId::of::<C>(),
            Binding::factory(type_name::<C>(), erase(construct)),
        )
    }

    /// Register contract `C` under an explicit lifecycle selector.
    ///
    /// Dispatches to [`Registry::register_eager`], [`Registry::register_lazy`],
    /// or [`Registry::register_factory`] according to `lifecycle`.
    pub fn register_with<C, F>(&self, lifecycle: Lifecycle, construct: F) -> RegistryResult<()>
    where
        C: ?Sized + Send + Sync + 'static,
        F: Fn() -> anyhow::Result<Arc<C>> + Send + Sync + 'static,
    {
        match lifecycle {
            Lifecycle::Eager => self.register_eager::<C, F>(construct),
            Lifecycle::Lazy => self.register_lazy::<C, F>(construct),
            Lifecycle::Factory => self.register_factory::<C, F>(construct),
        }
    }

    /// Resolve the binding for contract `C`.
    ///
    /// Eager bindings return the stored instance. Lazy bindings construct on
    /// the first call and return the cached instance afterwards. Factory
    /// bindings construct a fresh instance per call.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotInitialized`] before any init or register
    /// call, [`RegistryError::NotRegistered`] when `C` has no binding, and
    /// [`RegistryError::Activation`] when a lazy or factory constructor
    /// fails.
    pub fn resolve<C>(&self) -> RegistryResult<Arc<C>>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        let state = self.state.get().ok_or(RegistryError::NotInitialized)?;
        let binding = state
            .bindings
            .get(&TypeId::of::<C>())
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(RegistryError::NotRegistered {
                contract: type_name::<C>(),
            })?;
        // The shard guard is gone by now; constructors run unlocked.
        binding.materialize::<C>()
    }

    /// Whether a binding exists for contract `C`.
    ///
    /// Returns `false` rather than an error when the registry was never
    /// initialized, and never has side effects.
    pub fn is_registered<C>(&self) -> bool
    where
        C: ?Sized + Send + Sync + 'static,
    {
        self.state
            .get()
            .map_or(false, |state| state.bindings.contains_key(&TypeId::of::<C>()))
    }

    /// Whether the registry has been initialized, explicitly or through a
    /// register call.
    pub fn is_initialized(&self) -> bool {
        self.state.get().is_some()
    }

    /// Number of registered contracts.
    pub fn contract_count(&self) -> usize {
        self.state.get().map_or(0, |state| state.bindings.len())
    }

    /// Names of all registered contracts, for diagnostics.
    pub fn contracts(&self) -> Vec<&'static str> {
        self.state.get().map_or_else(Vec::new, |state| {
            state
                .bindings
                .iter()
                .map(|entry| entry.value().contract())
                .collect()
        })
    }

    /// Insertion path for discovered declarations.
    ///
    /// Applies the same uniqueness and lifecycle rules as the register
    /// family without going through the typed surface.
    pub(crate) fn apply_declaration(&self, declaration: Declaration) -> RegistryResult<()> {
        let state = self.state_or_init();
        // Same pre-check as register_eager: never construct for a contract
        // that is already bound.
        if state.bindings.contains_key(&declaration.key()) {
            return Err(RegistryError::AlreadyRegistered {
                contract: declaration.contract(),
            });
        }
        let (key, binding) = declaration.into_binding()?;
        state.insert(key, binding)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder over an initialized, discovery-free registry.
///
/// The explicit alternative to auto-discovery: startup code enumerates its
/// registrations and assembles the registry in one expression.
///
/// ## Example
///
/// ```rust
/// use std::sync::Arc;
/// use bindery::RegistryBuilder;
///
/// struct AppName(&'static str);
///
/// let registry = RegistryBuilder::new()
///     .register_instance::<AppName>(Arc::new(AppName("demo")))
///     .unwrap()
///     .build();
///
/// assert_eq!(registry.resolve::<AppName>().unwrap().0, "demo");
/// ```
pub struct RegistryBuilder {
    registry: Registry,
}

impl RegistryBuilder {
    /// Create a builder; the underlying registry is initialized immediately
    /// with auto-discovery disabled.
    pub fn new() -> Self {
        let registry = Registry::new();
        registry.state_or_init();
        Self { registry }
    }

    /// Register a pre-built instance under contract `C`.
    pub fn register_instance<C>(self, instance: Arc<C>) -> RegistryResult<Self>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        self.registry.register_instance::<C>(instance)?;
        Ok(self)
    }

    /// Register contract `C` eagerly; the constructor runs here.
    pub fn register_eager<C, F>(self, construct: F) -> RegistryResult<Self>
    where
        C: ?Sized + Send + Sync + 'static,
        F: FnOnce() -> anyhow::Result<Arc<C>>,
    {
        self.registry.register_eager::<C, F>(construct)?;
        Ok(self)
    }

    /// Register contract `C` lazily.
    pub fn register_lazy<C, F>(self, construct: F) -> RegistryResult<Self>
    where
        C: ?Sized + Send + Sync + 'static,
        F: Fn() -> anyhow::Result<Arc<C>> + Send + Sync + 'static,
    {
        self.registry.register_lazy::<C, F>(construct)?;
        Ok(self)
    }

    /// Register contract `C` as a transient factory.
    pub fn register_factory<C, F>(self, construct: F) -> RegistryResult<Self>
    where
        C: ?Sized + Send + Sync + 'static,
        F: Fn() -> anyhow::Result<Arc<C>> + Send + Sync + 'static,
    {
        self.registry.register_factory::<C, F>(construct)?;
        Ok(self)
    }

    /// Apply a provider's registrations.
    pub fn apply<P>(self, provider: &P) -> RegistryResult<Self>
    where
        P: ContractProvider + ?Sized,
    {
        provider.register(&self.registry)?;
        Ok(self)
    }

    /// Apply every declaration set collected via `inventory`.
    pub fn discover(self) -> RegistryResult<Self> {
        discovery::apply_declarations(&self.registry)?;
        Ok(self)
    }

    /// Finish and hand back the registry.
    pub fn build(self) -> Registry {
        self.registry
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
