//! Binding storage: lifecycle policies and the type-erased slot machinery.
//!
//! A binding owns whatever its lifecycle needs. Eager singletons hold the
//! finished instance, lazy singletons hold a constructor plus a once-cell,
//! and transient factories hold a bare constructor. Values cross the erasure
//! boundary as a `Box<dyn Any>` wrapping an `Arc` of the contract type, which
//! is what lets trait-object contracts survive the round trip.

use std::any::Any;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::{RegistryError, RegistryResult};

/// Lifecycle policy attached to a binding at registration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Instance exists from registration onward; every resolve returns it.
    Eager,
    /// Instance is constructed on first resolve, at most once, then cached.
    Lazy,
    /// A fresh instance is constructed on every resolve; nothing is cached.
    Factory,
}

/// Type-erased stored value: a box over the `Arc<C>` for some contract `C`.
pub(crate) type Slot = Box<dyn Any + Send + Sync>;

/// Type-erased zero-argument constructor producing a slot.
pub(crate) type Constructor = Box<dyn Fn() -> anyhow::Result<Slot> + Send + Sync>;

/// Wrap a typed constructor into the erased [`Constructor`] form.
pub(crate) fn erase<C, F>(construct: F) -> Constructor
where
    C: ?Sized + Send + Sync + 'static,
    F: Fn() -> anyhow::Result<Arc<C>> + Send + Sync + 'static,
{
    Box::new(move || construct().map(|instance| Box::new(instance) as Slot))
}

/// Wrap an already-built instance into a slot.
pub(crate) fn erase_instance<C>(instance: Arc<C>) -> Slot
where
    C: ?Sized + Send + Sync + 'static,
{
    Box::new(instance)
}

enum Storage {
    Eager {
        slot: Slot,
    },
    Lazy {
        cell: OnceCell<Slot>,
        construct: Constructor,
    },
    Factory {
        construct: Constructor,
    },
}

/// One registered contract: its display name plus lifecycle storage.
pub(crate) struct Binding {
    contract: &'static str,
    storage: Storage,
}

impl Binding {
    pub(crate) fn eager(contract: &'static str, slot: Slot) -> Self {
        Self {
            contract,
            storage: Storage::Eager { slot },
        }
    }

    pub(crate) fn lazy(contract: &'static str, construct: Constructor) -> Self {
        Self {
            contract,
            storage: Storage::Lazy {
                cell: OnceCell::new(),
                construct,
            },
        }
    }

    pub(crate) fn factory(contract: &'static str, construct: Constructor) -> Self {
        Self {
            contract,
            storage: Storage::Factory { construct },
        }
    }

    pub(crate) fn contract(&self) -> &'static str {
        self.contract
    }

    pub(crate) fn lifecycle(&self) -> Lifecycle {
        match self.storage {
            Storage::Eager { .. } => Lifecycle::Eager,
            Storage::Lazy { .. } => Lifecycle::Lazy,
            Storage::Factory { .. } => Lifecycle::Factory,
        }
    }

    /// Materialize the binding as `Arc<C>` according to its lifecycle.
    ///
    /// Must not be called while a bindings-map shard is locked: the lazy and
    /// factory paths run user constructors.
    pub(crate) fn materialize<C>(&self) -> RegistryResult<Arc<C>>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        match &self.storage {
            Storage::Eager { slot } => shared(slot, self.contract),
            Storage::Lazy { cell, construct } => {
                // A failed construction leaves the cell empty, so the next
                // resolve retries; only a success is cached.
                let slot = cell.get_or_try_init(|| {
                    debug!("Constructing lazy binding: {}", self.contract);
                    construct().map_err(|source| RegistryError::Activation {
                        contract: self.contract,
                        source,
                    })
                })?;
                shared(slot, self.contract)
            }
            Storage::Factory { construct } => {
                let slot = construct().map_err(|source| RegistryError::Activation {
                    contract: self.contract,
                    source,
                })?;
                owned(slot, self.contract)
            }
        }
    }
}

/// Downcast a borrowed slot and clone the `Arc` out of it.
fn shared<C>(slot: &Slot, contract: &'static str) -> RegistryResult<Arc<C>>
where
    C: ?Sized + Send + Sync + 'static,
{
    slot.downcast_ref::<Arc<C>>()
        .cloned()
        .ok_or(RegistryError::ContractMismatch { contract })
}

/// Downcast an owned slot, consuming it.
fn owned<C>(slot: Slot, contract: &'static str) -> RegistryResult<Arc<C>>
where
    C: ?Sized + Send + Sync + 'static,
{
    slot.downcast::<Arc<C>>()
        .map(|boxed| *boxed)
        .map_err(|_| RegistryError::ContractMismatch { contract })
}
