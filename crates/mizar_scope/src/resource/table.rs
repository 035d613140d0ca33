//! Keys, payload erasure, and per-scope tables.

use core::any::{Any, TypeId, type_name};
use std::sync::Arc;

use hashbrown::HashMap;

use crate::resource::name::ResourceName;
use crate::scope::{RegisterError, Scope};

// ─────────────────────────────────────────────────────────────────────────────
// ResourceKey
// ─────────────────────────────────────────────────────────────────────────────

/// Identifies a resource by its registration type and name.
///
/// Two keys are equal when they name the same type under the same name.
/// The captured type name is carried for diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    type_id: TypeId,
    type_name: &'static str,
    name: ResourceName,
}

impl ResourceKey {
    /// Creates the key for type `T` under `name`.
    #[must_use]
    pub fn of<T: ?Sized + 'static>(name: ResourceName) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            name,
        }
    }

    /// The `TypeId` of the registration type.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The registration type's name, for diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The resource name.
    #[must_use]
    pub fn name(&self) -> &ResourceName {
        &self.name
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Payload erasure
// ─────────────────────────────────────────────────────────────────────────────

/// A type-erased resource payload: an `Arc<T>` behind `dyn Any`.
///
/// The outer `Arc` makes payloads cheaply clonable without knowing `T`;
/// keeping the `Arc<T>` itself as the `Any` value is what lets unsized
/// registration types (trait objects) round-trip through erasure.
pub(crate) type Payload = Arc<dyn Any + Send + Sync>;

/// Erases `value` into a [`Payload`].
pub(crate) fn erase<T>(value: Arc<T>) -> Payload
where
    T: ?Sized + Send + Sync + 'static,
{
    Arc::new(value)
}

/// Recovers an `Arc<T>` from a payload, if it was erased from one.
pub(crate) fn extract<T>(payload: &Payload) -> Option<Arc<T>>
where
    T: ?Sized + Send + Sync + 'static,
{
    payload.downcast_ref::<Arc<T>>().cloned()
}

// ─────────────────────────────────────────────────────────────────────────────
// FactorySlot
// ─────────────────────────────────────────────────────────────────────────────

/// A registered factory, shared down the chain by `Arc`.
///
/// The slot keeps the key and bound name it was registered with so a
/// materialization can record the produced value under the same key in the
/// requesting scope.
pub(crate) struct FactorySlot {
    pub(crate) key: ResourceKey,
    pub(crate) binding: Option<String>,
    produce: Box<dyn Fn(&Scope) -> Payload + Send + Sync>,
}

impl FactorySlot {
    pub(crate) fn new(
        key: ResourceKey,
        binding: Option<String>,
        produce: Box<dyn Fn(&Scope) -> Payload + Send + Sync>,
    ) -> Self {
        Self {
            key,
            binding,
            produce,
        }
    }

    /// Invokes the factory for `scope`. Callers must not hold any scope lock.
    pub(crate) fn produce(&self, scope: &Scope) -> Payload {
        (self.produce)(scope)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ResourceTable
// ─────────────────────────────────────────────────────────────────────────────

/// Per-scope storage for values, factories, and bound names.
///
/// Values and factories are separate namespaces: a value and a factory may
/// coexist under the same key in one scope, with the value winning lookups.
/// The same holds for value bindings and factory bindings. The table is pure
/// data; the owning scope serializes access.
#[derive(Default)]
pub(crate) struct ResourceTable {
    values: HashMap<ResourceKey, Payload>,
    factories: HashMap<ResourceKey, Arc<FactorySlot>>,
    bound_values: HashMap<String, Payload>,
    bound_factories: HashMap<String, Arc<FactorySlot>>,
}

impl ResourceTable {
    pub(crate) fn value(&self, key: &ResourceKey) -> Option<&Payload> {
        self.values.get(key)
    }

    pub(crate) fn factory(&self, key: &ResourceKey) -> Option<&Arc<FactorySlot>> {
        self.factories.get(key)
    }

    pub(crate) fn bound_value(&self, binding: &str) -> Option<&Payload> {
        self.bound_values.get(binding)
    }

    pub(crate) fn bound_factory(&self, binding: &str) -> Option<&Arc<FactorySlot>> {
        self.bound_factories.get(binding)
    }

    /// Inserts a concrete value, enforcing key and binding uniqueness.
    pub(crate) fn try_insert_value(
        &mut self,
        key: ResourceKey,
        binding: Option<&str>,
        payload: Payload,
    ) -> Result<(), RegisterError> {
        if self.values.contains_key(&key) {
            return Err(RegisterError::DuplicateKey {
                type_name: key.type_name(),
                name: key.name().clone(),
            });
        }
        if let Some(binding) = binding {
            if self.bound_values.contains_key(binding) {
                return Err(RegisterError::DuplicateBinding {
                    binding: binding.to_owned(),
                });
            }
            self.bound_values.insert(binding.to_owned(), payload.clone());
        }
        self.values.insert(key, payload);
        Ok(())
    }

    /// Inserts a factory slot, enforcing key and binding uniqueness.
    pub(crate) fn try_insert_factory(
        &mut self,
        slot: Arc<FactorySlot>,
    ) -> Result<(), RegisterError> {
        if self.factories.contains_key(&slot.key) {
            return Err(RegisterError::DuplicateKey {
                type_name: slot.key.type_name(),
                name: slot.key.name().clone(),
            });
        }
        if let Some(binding) = &slot.binding {
            if self.bound_factories.contains_key(binding) {
                return Err(RegisterError::DuplicateBinding {
                    binding: binding.clone(),
                });
            }
            self.bound_factories.insert(binding.clone(), slot.clone());
        }
        self.factories.insert(slot.key.clone(), slot);
        Ok(())
    }

    /// Records a materialized factory value under its key.
    ///
    /// If a value raced in under the same key, the stored one wins and the
    /// fresh payload is discarded. A bound name is overwritten, matching the
    /// original registration's behavior.
    pub(crate) fn memoize(
        &mut self,
        key: ResourceKey,
        binding: Option<&str>,
        payload: Payload,
    ) -> Payload {
        if let Some(existing) = self.values.get(&key) {
            return existing.clone();
        }
        if let Some(binding) = binding {
            self.bound_values.insert(binding.to_owned(), payload.clone());
        }
        self.values.insert(key, payload.clone());
        payload
    }

    /// All value entries registered under type `type_id`, any name.
    pub(crate) fn values_of(
        &self,
        type_id: TypeId,
    ) -> impl Iterator<Item = (&ResourceKey, &Payload)> {
        // Field access, not the method: probing `key.type_id()` on a `&&`
        // pattern binding would land on `Any::type_id` first.
        self.values
            .iter()
            .filter(move |(key, _)| key.type_id == type_id)
    }

    /// All factory slots registered under type `type_id`, any name.
    pub(crate) fn factories_of(&self, type_id: TypeId) -> impl Iterator<Item = &Arc<FactorySlot>> {
        self.factories
            .values()
            .filter(move |slot| slot.key.type_id() == type_id)
    }
}
