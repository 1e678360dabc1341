//! Contract provider trait for grouped registration.
//!
//! This module defines the `ContractProvider` trait, a unified interface for
//! modules that contribute bindings to a registry, and `ProviderSet`, which
//! collects providers and applies them in priority order. Providers are the
//! hand-wired counterpart to auto-discovery: same grouping, no link-time
//! collection.
//!
//! ## Usage
//!
//! Implement `ContractProvider` for your module:
//!
//! ```rust
//! use std::sync::Arc;
//! use bindery::{ContractProvider, Registry, RegistryResult};
//!
//! struct Telemetry;
//!
//! pub struct TelemetryProvider;
//!
//! impl ContractProvider for TelemetryProvider {
//!     fn name(&self) -> &'static str {
//!         "telemetry"
//!     }
//!
//!     fn register(&self, registry: &Registry) -> RegistryResult<()> {
//!         registry.register_instance::<Telemetry>(Arc::new(Telemetry))
//!     }
//! }
//! ```
//!
//! ## Auto-Discovery
//!
//! For automatic registration, submit a [`crate::DeclarationSet`] instead;
//! see the [`crate::discovery`] module.

use std::sync::Arc;

use crate::{Registry, RegistryResult};

// ============================================================================
// ContractProvider Trait
// ============================================================================

/// Trait for types that contribute bindings to a registry.
///
/// Implement this trait to group the registrations one module owns behind a
/// single named unit.
pub trait ContractProvider: Send + Sync {
    /// Returns the name of this provider.
    ///
    /// Used for logging, debugging, and ordering diagnostics.
    fn name(&self) -> &'static str;

    /// Returns the priority of this provider.
    ///
    /// Lower values register first. Default is 100.
    fn priority(&self) -> u32 {
        100
    }

    /// Register this provider's contracts.
    fn register(&self, registry: &Registry) -> RegistryResult<()>;

    /// Optional: check that contracts this provider relies on are present.
    ///
    /// Called after every provider in the set has registered.
    #[allow(unused_variables)]
    fn validate(&self, registry: &Registry) -> RegistryResult<()> {
        Ok(())
    }
}

// ============================================================================
// ProviderSet
// ============================================================================

/// An ordered collection of contract providers.
///
/// Collects providers and applies them to a registry in priority order.
pub struct ProviderSet {
    providers: Vec<Arc<dyn ContractProvider>>,
}

impl ProviderSet {
    /// Create a new empty set.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Add a provider to the set.
    pub fn add<P: ContractProvider + 'static>(&mut self, provider: P) -> &mut Self {
        self.providers.push(Arc::new(provider));
        self
    }

    /// Add an already-shared provider to the set.
    pub fn add_arc(&mut self, provider: Arc<dyn ContractProvider>) -> &mut Self {
        self.providers.push(provider);
        self
    }

    /// Get the number of collected providers.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// List all provider names.
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Apply every provider to `registry`.
    ///
    /// Providers are sorted by priority and applied in order; the first
    /// failure aborts the run and surfaces its error. Afterwards each
    /// provider's `validate` hook runs once.
    pub fn register_all(&self, registry: &Registry) -> RegistryResult<()> {
        // Sort providers by priority
        let mut sorted: Vec<_> = self.providers.iter().collect();
        sorted.sort_by_key(|p| p.priority());

        tracing::info!("Registering {} contract providers", sorted.len());

        // Register each provider
        for provider in sorted {
            tracing::debug!(
                "Registering provider '{}' (priority: {})",
                provider.name(),
                provider.priority()
            );
            provider.register(registry)?;
        }

        // Validate all providers
        for provider in &self.providers {
            provider.validate(registry)?;
        }

        tracing::info!("All contract providers registered successfully");
        Ok(())
    }
}

impl Default for ProviderSet {
    fn default() -> Self {
        Self::new()
    }
}
