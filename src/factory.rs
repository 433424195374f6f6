//! Factory types for creating bean instances
//!
//! Factories encapsulate how beans are created and how long they live.
//! Like the storage they are type-erased: every factory hands out
//! `Arc<dyn Any + Send + Sync>` and the context downcasts on lookup.

use crate::{ApplicationContext, BeanScope, Injectable, Result};
use once_cell::sync::OnceCell;
use std::any::Any;
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::{debug, trace};

/// A type-erased bean instance
pub type AnyBean = Arc<dyn Any + Send + Sync>;

/// Type-erased, context-aware factory function
type BeanFn = Arc<dyn Fn(&ApplicationContext) -> Result<AnyBean> + Send + Sync>;

fn erase<T: Injectable, F>(factory: F) -> BeanFn
where
    F: Fn(&ApplicationContext) -> Result<T> + Send + Sync + 'static,
{
    Arc::new(move |context| factory(context).map(|bean| Arc::new(bean) as AnyBean))
}

// =============================================================================
// Singleton Factory
// =============================================================================

/// Singleton factory - stores a single pre-created instance
pub struct SingletonFactory {
    instance: AnyBean,
}

impl SingletonFactory {
    /// Create from an Arc
    #[inline]
    pub fn from_arc<T: Injectable>(instance: Arc<T>) -> Self {
        Self {
            instance: instance as AnyBean,
        }
    }

    #[inline]
    pub fn resolve(&self) -> AnyBean {
        Arc::clone(&self.instance)
    }
}

// =============================================================================
// Lazy Factory
// =============================================================================

/// Lazy singleton factory - creates the instance once, on first resolve
pub struct LazyFactory {
    init: BeanFn,
    instance: OnceCell<AnyBean>,
    #[cfg(feature = "logging")]
    type_name: &'static str,
}

impl LazyFactory {
    #[inline]
    pub fn new<T: Injectable, F>(factory: F) -> Self
    where
        F: Fn(&ApplicationContext) -> Result<T> + Send + Sync + 'static,
    {
        Self {
            init: erase(factory),
            instance: OnceCell::new(),
            #[cfg(feature = "logging")]
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Get the instance, creating it if necessary.
    ///
    /// A failed creation leaves the cell empty so a later resolve retries.
    #[inline]
    pub fn resolve(&self, context: &ApplicationContext) -> Result<AnyBean> {
        if let Some(instance) = self.instance.get() {
            #[cfg(feature = "logging")]
            trace!(
                target: "injector_bundle",
                bean_type = self.type_name,
                "Lazy singleton already initialized, returning cached instance"
            );
            return Ok(Arc::clone(instance));
        }

        self.instance
            .get_or_try_init(|| {
                #[cfg(feature = "logging")]
                debug!(
                    target: "injector_bundle",
                    bean_type = self.type_name,
                    "Lazy singleton initializing on first access"
                );

                (self.init)(context)
            })
            .map(Arc::clone)
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.instance.get().is_some()
    }
}

// =============================================================================
// Prototype Factory
// =============================================================================

/// Prototype factory - creates a new instance every time
pub struct PrototypeFactory {
    factory: BeanFn,
    #[cfg(feature = "logging")]
    type_name: &'static str,
}

impl PrototypeFactory {
    #[inline]
    pub fn new<T: Injectable, F>(factory: F) -> Self
    where
        F: Fn(&ApplicationContext) -> Result<T> + Send + Sync + 'static,
    {
        Self {
            factory: erase(factory),
            #[cfg(feature = "logging")]
            type_name: std::any::type_name::<T>(),
        }
    }

    #[inline]
    pub fn create(&self, context: &ApplicationContext) -> Result<AnyBean> {
        #[cfg(feature = "logging")]
        trace!(
            target: "injector_bundle",
            bean_type = self.type_name,
            "Creating new prototype instance"
        );

        (self.factory)(context)
    }
}

// =============================================================================
// AnyFactory - Enum-based type erasure
// =============================================================================

/// Type-erased factory wrapper for storage
///
/// An enum instead of `Box<dyn Factory>`: three fixed variants, no vtable.
pub enum AnyFactory {
    Singleton(SingletonFactory),
    Lazy(LazyFactory),
    Prototype(PrototypeFactory),
}

impl AnyFactory {
    #[inline]
    pub fn singleton<T: Injectable>(instance: Arc<T>) -> Self {
        AnyFactory::Singleton(SingletonFactory::from_arc(instance))
    }

    #[inline]
    pub fn lazy<T: Injectable, F>(factory: F) -> Self
    where
        F: Fn(&ApplicationContext) -> Result<T> + Send + Sync + 'static,
    {
        AnyFactory::Lazy(LazyFactory::new(factory))
    }

    #[inline]
    pub fn prototype<T: Injectable, F>(factory: F) -> Self
    where
        F: Fn(&ApplicationContext) -> Result<T> + Send + Sync + 'static,
    {
        AnyFactory::Prototype(PrototypeFactory::new(factory))
    }

    /// Resolve the bean
    #[inline]
    pub fn resolve(&self, context: &ApplicationContext) -> Result<AnyBean> {
        match self {
            AnyFactory::Singleton(f) => Ok(f.resolve()),
            AnyFactory::Lazy(f) => f.resolve(context),
            AnyFactory::Prototype(f) => f.create(context),
        }
    }

    #[inline]
    pub fn scope(&self) -> BeanScope {
        match self {
            AnyFactory::Singleton(_) => BeanScope::Singleton,
            AnyFactory::Lazy(_) => BeanScope::Lazy,
            AnyFactory::Prototype(_) => BeanScope::Prototype,
        }
    }

    /// Whether resolving would run user code
    #[inline]
    pub fn is_initialized(&self) -> bool {
        match self {
            AnyFactory::Singleton(_) => true,
            AnyFactory::Lazy(f) => f.is_initialized(),
            AnyFactory::Prototype(_) => false,
        }
    }
}
