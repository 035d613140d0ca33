//! Resource identity and type-erased storage.
//!
//! Resources are keyed by `(type, name)`. The [`ResourceName`] newtype
//! validates names, [`ResourceKey`] pairs a name with the registration type,
//! and [`ResourceTable`](table) holds the per-scope entries behind type
//! erasure. The table is pure data; the owning [`Scope`](crate::scope::Scope)
//! serializes access to it.

/// Validated resource names.
pub mod name;

/// Keys, payload erasure, and per-scope tables.
pub mod table;

pub use name::{DEFAULT_NAME, InvalidName, ResourceName};
pub use table::ResourceKey;

pub(crate) use table::{FactorySlot, Payload, ResourceTable, erase, extract};
