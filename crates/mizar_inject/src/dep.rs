//! Dependency declarations for injected functions.

use core::any::{TypeId, type_name};
use core::fmt;
use core::marker::PhantomData;
use core::ops::Deref;
use std::sync::Arc;

use mizar_scope::{DEFAULT_NAME, Scope};
use variadics_please::all_tuples;

use crate::InjectError;

// ─────────────────────────────────────────────────────────────────────────────
// Labels
// ─────────────────────────────────────────────────────────────────────────────

/// A type-level resource name for [`Dep`] parameters.
///
/// `Dep<T>` resolves the default-named `T`. To depend on a resource under
/// another name, declare a unit struct carrying that name:
///
/// ```
/// use mizar_inject::{Dep, Label};
///
/// struct Replica;
///
/// impl Label for Replica {
///     const NAME: &'static str = "replica";
/// }
///
/// async fn report(pool: Dep<String, Replica>) -> usize {
///     pool.len()
/// }
/// ```
pub trait Label: 'static {
    /// The resource name this label selects.
    const NAME: &'static str;
}

/// The label behind plain `Dep<T>`: the default resource name.
pub struct DefaultName;

impl Label for DefaultName {
    const NAME: &'static str = DEFAULT_NAME;
}

// ─────────────────────────────────────────────────────────────────────────────
// Dep
// ─────────────────────────────────────────────────────────────────────────────

/// A resource parameter of an injected function.
///
/// Resolution fails the call if the resource is missing; wrap the parameter
/// in `Option` to make it optional. Derefs to the resource itself.
pub struct Dep<T, L = DefaultName>
where
    T: ?Sized + Send + Sync + 'static,
    L: Label,
{
    value: Arc<T>,
    _label: PhantomData<fn() -> L>,
}

impl<T, L> Dep<T, L>
where
    T: ?Sized + Send + Sync + 'static,
    L: Label,
{
    /// Consumes the parameter, keeping a shared handle to the resource.
    #[must_use]
    pub fn into_inner(self) -> Arc<T> {
        self.value
    }
}

impl<T, L> Deref for Dep<T, L>
where
    T: ?Sized + Send + Sync + 'static,
    L: Label,
{
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T, L> Clone for Dep<T, L>
where
    T: ?Sized + Send + Sync + 'static,
    L: Label,
{
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            _label: PhantomData,
        }
    }
}

impl<T, L> fmt::Debug for Dep<T, L>
where
    T: ?Sized + Send + Sync + fmt::Debug + 'static,
    L: Label,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dep")
            .field("name", &L::NAME)
            .field("value", &&*self.value)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Binding table rows
// ─────────────────────────────────────────────────────────────────────────────

/// One row of an injected function's binding table: a resource the function
/// consumes, keyed by type and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DepBinding {
    type_id: TypeId,
    type_name: &'static str,
    name: &'static str,
}

impl DepBinding {
    /// The binding for type `T` under `name`.
    #[must_use]
    pub fn of<T: ?Sized + 'static>(name: &'static str) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            name,
        }
    }

    /// The `TypeId` of the dependency.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The dependency type's name, for diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The resource name the dependency resolves under.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// FromScope
// ─────────────────────────────────────────────────────────────────────────────

/// Types an injected function can take as parameters.
///
/// Implemented for [`Dep`], `Option<Dep>`, [`Scope`] itself, and tuples of
/// these up to eight elements.
pub trait FromScope: Sized {
    /// Resolves the parameter from `scope`.
    fn from_scope(scope: &Scope) -> Result<Self, InjectError>;

    /// Appends the resources this parameter consumes to a binding table.
    fn bindings(out: &mut Vec<DepBinding>);
}

impl<T, L> FromScope for Dep<T, L>
where
    T: ?Sized + Send + Sync + 'static,
    L: Label,
{
    fn from_scope(scope: &Scope) -> Result<Self, InjectError> {
        let value = scope.require_resource_named::<T>(L::NAME)?;
        Ok(Self {
            value,
            _label: PhantomData,
        })
    }

    fn bindings(out: &mut Vec<DepBinding>) {
        out.push(DepBinding::of::<T>(L::NAME));
    }
}

/// An optional dependency: resolves to `None` instead of failing the call
/// when the resource is missing.
impl<T, L> FromScope for Option<Dep<T, L>>
where
    T: ?Sized + Send + Sync + 'static,
    L: Label,
{
    fn from_scope(scope: &Scope) -> Result<Self, InjectError> {
        Ok(scope.get_resource_named::<T>(L::NAME)?.map(|value| Dep {
            value,
            _label: PhantomData,
        }))
    }

    fn bindings(out: &mut Vec<DepBinding>) {
        out.push(DepBinding::of::<T>(L::NAME));
    }
}

/// The scope itself can be a parameter, for functions that register
/// resources or spawn children.
impl FromScope for Scope {
    fn from_scope(scope: &Scope) -> Result<Self, InjectError> {
        Ok(scope.clone())
    }

    fn bindings(_out: &mut Vec<DepBinding>) {}
}

// Unit type implementation
impl FromScope for () {
    fn from_scope(_scope: &Scope) -> Result<Self, InjectError> {
        Ok(())
    }

    fn bindings(_out: &mut Vec<DepBinding>) {}
}

// Tuple implementations for multiple parameters
macro_rules! impl_from_scope_tuple {
    ($($param:ident),*) => {
        impl<$($param: FromScope),*> FromScope for ($($param,)*) {
            fn from_scope(scope: &Scope) -> Result<Self, InjectError> {
                Ok(($($param::from_scope(scope)?,)*))
            }

            fn bindings(out: &mut Vec<DepBinding>) {
                $($param::bindings(out);)*
            }
        }
    };
}

// Generate impls for tuples of size 1 to 8
all_tuples!(impl_from_scope_tuple, 1, 8, P);
