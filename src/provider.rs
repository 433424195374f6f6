//! Provider traits for beans
//!
//! These traits define what types can be registered as beans and how long
//! an instance lives.

/// Marker trait for types that can be registered in the
/// [`ApplicationContext`](crate::ApplicationContext).
///
/// This is automatically implemented for all types that are `Send + Sync + 'static`.
/// You never need to implement this manually.
pub trait Injectable: Send + Sync + 'static {
    /// Returns the type name for debugging and health check keys
    #[inline]
    fn type_name_of() -> &'static str
    where
        Self: Sized,
    {
        std::any::type_name::<Self>()
    }
}

// Blanket implementation - everything that's Send + Sync + 'static is Injectable
impl<T: Send + Sync + 'static> Injectable for T {}

/// How long a bean instance lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BeanScope {
    /// Pre-built instance handed to the context
    Singleton,

    /// Created once, at refresh or on first lookup, then shared
    #[default]
    Lazy,

    /// New instance created on every lookup
    Prototype,
}

impl BeanScope {
    /// Whether `refresh` instantiates beans of this scope up front
    #[inline]
    pub fn is_eager(&self) -> bool {
        !matches!(self, BeanScope::Prototype)
    }
}

impl std::fmt::Display for BeanScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            BeanScope::Singleton => "singleton",
            BeanScope::Lazy => "lazy_singleton",
            BeanScope::Prototype => "prototype",
        };
        f.write_str(label)
    }
}
