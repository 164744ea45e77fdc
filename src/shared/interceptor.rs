//! Interceptor Chains
//!
//! Ordered middleware applied to an argument before a host surface acts on it.
//! Every host surface that can be hooked (dispatcher, clipboard, link builders,
//! content renderer) owns one chain for its argument type.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use super::error::AppError;

/// A transform applied to an argument in place.
pub trait Interceptor<A>: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Inspect and rewrite the argument.
    ///
    /// Errors are isolated by the chain: the argument keeps whatever changes
    /// were made before the failure and continues downstream.
    fn intercept(&self, arg: &mut A) -> Result<(), AppError>;
}

/// Handle returned on registration, used to unregister later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InterceptorId(u64);

/// Ordered list of interceptors for one argument type.
pub struct InterceptorChain<A> {
    entries: RwLock<Vec<(InterceptorId, Arc<dyn Interceptor<A>>)>>,
    next_id: AtomicU64,
}

impl<A> InterceptorChain<A> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Append an interceptor; it runs after every previously registered one.
    pub fn register(&self, interceptor: Arc<dyn Interceptor<A>>) -> InterceptorId {
        let id = InterceptorId(self.next_id.fetch_add(1, Ordering::SeqCst));
        tracing::debug!(interceptor = interceptor.name(), "Interceptor registered");
        self.entries.write().push((id, interceptor));
        id
    }

    /// Remove an interceptor. Returns false if it was not registered.
    pub fn unregister(&self, id: InterceptorId) -> bool {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Run every interceptor in registration order.
    ///
    /// Returns the number of interceptors that failed.
    pub fn run(&self, arg: &mut A) -> usize {
        // Snapshot so an interceptor may (un)register without deadlocking.
        let entries: Vec<Arc<dyn Interceptor<A>>> = self
            .entries
            .read()
            .iter()
            .map(|(_, interceptor)| Arc::clone(interceptor))
            .collect();

        let mut failures = 0;
        for interceptor in entries {
            if let Err(e) = interceptor.intercept(arg) {
                failures += 1;
                tracing::warn!(
                    interceptor = interceptor.name(),
                    error = %e,
                    "Interceptor failed; passing argument through"
                );
            }
        }
        failures
    }
}

impl<A> Default for InterceptorChain<A> {
    fn default() -> Self {
        Self::new()
    }
}
