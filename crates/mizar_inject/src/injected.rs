//! Wrapped async functions with scope-resolved parameters.

use core::future::Future;
use core::marker::PhantomData;

use mizar_scope::{Scope, current_scope};
use variadics_please::all_tuples;

use crate::InjectError;
use crate::dep::{DepBinding, FromScope};

// ─────────────────────────────────────────────────────────────────────────────
// InjectFn
// ─────────────────────────────────────────────────────────────────────────────

/// An async function callable with a resolved parameter tuple `P`.
///
/// Implemented for plain async functions and closures of up to eight
/// parameters whose parameter types all implement
/// [`FromScope`](crate::dep::FromScope).
pub trait InjectFn<P>: Send + Sync {
    /// What the function returns.
    type Output;

    /// The future the function evaluates to.
    type Future: Future<Output = Self::Output> + Send;

    /// Calls the function with an already resolved parameter tuple.
    fn invoke(&self, params: P) -> Self::Future;
}

// 0 parameters
impl<Func, Fut, Out> InjectFn<()> for Func
where
    Func: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Out> + Send,
{
    type Output = Out;
    type Future = Fut;

    fn invoke(&self, _params: ()) -> Self::Future {
        (self)()
    }
}

// Tuple implementations for 1 to 8 parameters
macro_rules! impl_inject_fn_tuple {
    ($($param:ident),*) => {
        impl<Func, Fut, Out, $($param),*> InjectFn<($($param,)*)> for Func
        where
            Func: Fn($($param),*) -> Fut + Send + Sync,
            Fut: Future<Output = Out> + Send,
        {
            type Output = Out;
            type Future = Fut;

            #[expect(non_snake_case, reason = "tuple elements reuse their type parameter names")]
            fn invoke(&self, params: ($($param,)*)) -> Self::Future {
                let ($($param,)*) = params;
                (self)($($param),*)
            }
        }
    };
}

all_tuples!(impl_inject_fn_tuple, 1, 8, P);

// ─────────────────────────────────────────────────────────────────────────────
// Injected
// ─────────────────────────────────────────────────────────────────────────────

/// An async function wrapped for injection.
///
/// Created by [`inject`]. The wrapper resolves the function's parameters
/// from a scope on every call, so repeated calls observe registrations made
/// in between. The binding table, by contrast, is fixed at wrap time.
pub struct Injected<F, P> {
    func: F,
    table: Vec<DepBinding>,
    _params: PhantomData<fn() -> P>,
}

impl<F, P> Injected<F, P>
where
    F: InjectFn<P>,
    P: FromScope,
{
    /// Wraps `func`, recording the resources it consumes.
    pub fn new(func: F) -> Self {
        let mut table = Vec::new();
        P::bindings(&mut table);
        Self {
            func,
            table,
            _params: PhantomData,
        }
    }

    /// The resources the wrapped function consumes, in parameter order.
    #[must_use]
    pub fn bindings(&self) -> &[DepBinding] {
        &self.table
    }

    /// Resolves the parameters from the task's active scope and calls the
    /// function.
    ///
    /// Fails with [`InjectError::NoActiveScope`] outside
    /// [`Scope::run`](mizar_scope::Scope::run).
    pub async fn call(&self) -> Result<F::Output, InjectError> {
        let scope = current_scope()?;
        self.call_in(&scope).await
    }

    /// Resolves the parameters from `scope` and calls the function.
    pub async fn call_in(&self, scope: &Scope) -> Result<F::Output, InjectError> {
        let params = P::from_scope(scope)?;
        Ok(self.func.invoke(params).await)
    }
}

/// Wraps an async function so its parameters resolve from a scope.
///
/// See the [crate docs](crate) for a full example.
pub fn inject<F, P>(func: F) -> Injected<F, P>
where
    F: InjectFn<P>,
    P: FromScope,
{
    Injected::new(func)
}
