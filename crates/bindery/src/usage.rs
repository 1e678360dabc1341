//! # Bindery Usage Guide
//!
//! The registry provides a unified way to wire implementations to contracts
//! across an application. Modules agree on contract types (usually traits)
//! and the composition root decides which implementations back them.
//!
//! ## Lifecycles
//!
//! Every binding carries one of three lifecycles, chosen at registration:
//!
//! - **Eager** - the instance exists from registration onward; every resolve
//!   returns the same `Arc`
//! - **Lazy** - the instance is constructed on first resolve, at most once,
//!   then cached; constructors never run for contracts nobody uses
//! - **Factory** - a fresh instance is constructed on every resolve
//!
//! ## Basic Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use bindery::{AutoDiscovery, Registry};
//!
//! trait Cache: Send + Sync {
//!     fn get(&self, key: &str) -> Option<String>;
//! }
//!
//! struct MemoryCache;
//!
//! impl Cache for MemoryCache {
//!     fn get(&self, _key: &str) -> Option<String> {
//!         None
//!     }
//! }
//!
//! struct RequestCounter(u64);
//!
//! let registry = Registry::new();
//! registry.init(AutoDiscovery::Disabled).unwrap();
//!
//! // Eager: hand over a finished instance.
//! registry
//!     .register_instance::<dyn Cache>(Arc::new(MemoryCache))
//!     .unwrap();
//!
//! // Lazy: construction waits for the first resolve.
//! registry
//!     .register_lazy::<RequestCounter, _>(|| Ok(Arc::new(RequestCounter(0))))
//!     .unwrap();
//!
//! let cache = registry.resolve::<dyn Cache>().unwrap();
//! assert!(cache.get("missing").is_none());
//! ```
//!
//! ## The Global Registry
//!
//! Most applications want exactly one registry for the whole process;
//! [`crate::global()`] hands out a `&'static Registry` backing that role. The
//! first register call initializes it implicitly, or startup code calls
//! `init` explicitly to opt into auto-discovery:
//!
//! ```rust
//! use std::sync::Arc;
//! use bindery::global;
//!
//! struct Settings {
//!     verbose: bool,
//! }
//!
//! global()
//!     .register_instance::<Settings>(Arc::new(Settings { verbose: false }))
//!     .unwrap();
//!
//! assert!(!global().resolve::<Settings>().unwrap().verbose);
//! ```
//!
//! ## Builder Pattern
//!
//! For locally owned registries, the builder assembles registration chains
//! in one expression:
//!
//! ```rust
//! use std::sync::Arc;
//! use bindery::RegistryBuilder;
//!
//! struct Settings {
//!     verbose: bool,
//! }
//!
//! struct Ticket(u32);
//!
//! let registry = RegistryBuilder::new()
//!     .register_instance::<Settings>(Arc::new(Settings { verbose: true }))
//!     .unwrap()
//!     .register_factory::<Ticket, _>(|| Ok(Arc::new(Ticket(0))))
//!     .unwrap()
//!     .build();
//!
//! assert_eq!(registry.contract_count(), 2);
//! ```
//!
//! ## Providers
//!
//! A [`crate::ContractProvider`] groups the registrations one module owns; a
//! [`crate::ProviderSet`] applies providers in priority order:
//!
//! ```rust
//! use std::sync::Arc;
//! use bindery::{ContractProvider, ProviderSet, Registry, RegistryResult};
//!
//! struct Mailer;
//!
//! struct MailProvider;
//!
//! impl ContractProvider for MailProvider {
//!     fn name(&self) -> &'static str {
//!         "mail"
//!     }
//!
//!     fn register(&self, registry: &Registry) -> RegistryResult<()> {
//!         registry.register_lazy::<Mailer, _>(|| Ok(Arc::new(Mailer)))
//!     }
//! }
//!
//! let mut providers = ProviderSet::new();
//! providers.add(MailProvider);
//!
//! let registry = Registry::new();
//! providers.register_all(&registry).unwrap();
//! assert!(registry.is_registered::<Mailer>());
//! ```
//!
//! ## Auto-Discovery
//!
//! Modules can submit a [`crate::DeclarationSet`] through
//! `inventory::submit!`; initializing with
//! [`crate::AutoDiscovery::Enabled`] applies every set linked into the
//! binary. See the [`crate::discovery`] module for details.
//!
//! ## Error Handling
//!
//! Every operation returns [`crate::RegistryResult`]; nothing panics on the
//! resolution path:
//!
//! ```rust
//! use bindery::{AutoDiscovery, Registry, RegistryError};
//!
//! struct Missing;
//!
//! let registry = Registry::new();
//! assert!(matches!(
//!     registry.resolve::<Missing>(),
//!     Err(RegistryError::NotInitialized)
//! ));
//!
//! registry.init(AutoDiscovery::Disabled).unwrap();
//! assert!(matches!(
//!     registry.resolve::<Missing>(),
//!     Err(RegistryError::NotRegistered { .. })
//! ));
//! ```
//!
//! ## Best Practices
//!
//! 1. **Initialize once at startup** so later `init` calls fail loudly
//! 2. **Register everything before the first resolve** to keep wiring errors
//!    out of request paths
//! 3. **Prefer trait contracts over concrete types** so implementations can
//!    be swapped in tests
//! 4. **Use lazy bindings for expensive services** that some runs never touch
//! 5. **Handle resolution errors** instead of unwrapping outside of tests
//!
//! ## Example Application Setup
//!
//! ```rust
//! use std::sync::Arc;
//! use bindery::{Registry, RegistryBuilder, RegistryResult};
//!
//! trait Clock: Send + Sync {
//!     fn now_millis(&self) -> u64;
//! }
//!
//! struct SystemClock;
//!
//! impl Clock for SystemClock {
//!     fn now_millis(&self) -> u64 {
//!         0
//!     }
//! }
//!
//! struct Settings {
//!     verbose: bool,
//! }
//!
//! fn wire() -> RegistryResult<Registry> {
//!     let registry = RegistryBuilder::new()
//!         .register_instance::<Settings>(Arc::new(Settings { verbose: false }))?
//!         .register_lazy::<dyn Clock, _>(|| Ok(Arc::new(SystemClock)))?
//!         .build();
//!     Ok(registry)
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = wire()?;
//!
//!     let clock = registry.resolve::<dyn Clock>()?;
//!     let _ = clock.now_millis();
//!
//!     Ok(())
//! }
//! ```

pub mod usage_examples {}
