//! Bean definitions
//!
//! A [`BeanDefinition`] describes one named bean: how to build it, which
//! trait-object views it can be looked up as, and which markers it carries.
//! The context stores definitions type-erased.

use crate::factory::{AnyBean, AnyFactory};
use crate::{ApplicationContext, BeanScope, Injectable, Result};
use std::any::{Any, TypeId};
use std::marker::PhantomData;
use std::sync::Arc;

/// Tags that make a bean discoverable without a shared trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// The bean is an HTTP provider (message body readers, exception mappers, ...)
    HttpProvider,
    /// The bean is an HTTP resource bound to a path
    HttpResource,
}

impl std::fmt::Display for Marker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Marker::HttpProvider => f.write_str("provider"),
            Marker::HttpResource => f.write_str("resource"),
        }
    }
}

/// Type-erased cast from the concrete bean to one of its views.
///
/// Returns the view as a boxed `Arc<A>`, or `None` if the bean is not of the
/// definition's type.
type Caster = Arc<dyn Fn(AnyBean) -> Option<Box<dyn Any + Send + Sync>> + Send + Sync>;

/// One lookup type a bean answers to
#[derive(Clone)]
pub(crate) struct Alias {
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
    cast: Caster,
}

impl Alias {
    fn new<T: Injectable, A: ?Sized + Send + Sync + 'static>(cast: fn(Arc<T>) -> Arc<A>) -> Self {
        Self {
            type_id: TypeId::of::<A>(),
            type_name: std::any::type_name::<A>(),
            cast: Arc::new(move |bean: AnyBean| {
                bean.downcast::<T>()
                    .ok()
                    .map(|typed| Box::new(cast(typed)) as Box<dyn Any + Send + Sync>)
            }),
        }
    }
}

fn identity<T: Injectable>(bean: Arc<T>) -> Arc<T> {
    bean
}

/// Builder for a named bean of concrete type `T`.
///
/// # Examples
///
/// ```rust
/// use injector_bundle::{ApplicationContext, BeanDefinition};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct English;
///
/// impl Greeter for English {
///     fn greet(&self) -> String {
///         "hello".into()
///     }
/// }
///
/// let context = ApplicationContext::new();
/// context
///     .register(
///         BeanDefinition::lazy("english", |_| Ok(English))
///             .alias::<dyn Greeter>(|g: Arc<English>| -> Arc<dyn Greeter> { g }),
///     )
///     .unwrap();
///
/// let greeter = context.bean_of_type::<dyn Greeter>().unwrap();
/// assert_eq!(greeter.greet(), "hello");
/// ```
pub struct BeanDefinition<T: Injectable> {
    name: String,
    factory: AnyFactory,
    aliases: Vec<Alias>,
    markers: Vec<Marker>,
    _type: PhantomData<fn() -> T>,
}

impl<T: Injectable> BeanDefinition<T> {
    fn with_factory(name: impl Into<String>, factory: AnyFactory) -> Self {
        Self {
            name: name.into(),
            factory,
            aliases: Vec::new(),
            markers: Vec::new(),
            _type: PhantomData,
        }
    }

    /// A pre-built instance.
    pub fn singleton(name: impl Into<String>, instance: T) -> Self {
        Self::singleton_arc(name, Arc::new(instance))
    }

    /// A pre-built, already shared instance.
    pub fn singleton_arc(name: impl Into<String>, instance: Arc<T>) -> Self {
        Self::with_factory(name, AnyFactory::singleton(instance))
    }

    /// A singleton created at refresh, or on first lookup if that comes earlier.
    pub fn lazy<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&ApplicationContext) -> Result<T> + Send + Sync + 'static,
    {
        Self::with_factory(name, AnyFactory::lazy(factory))
    }

    /// A bean created anew on every lookup.
    pub fn prototype<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&ApplicationContext) -> Result<T> + Send + Sync + 'static,
    {
        Self::with_factory(name, AnyFactory::prototype(factory))
    }

    /// Make the bean discoverable as `A`, usually a `dyn Trait` it implements.
    pub fn alias<A: ?Sized + Send + Sync + 'static>(mut self, cast: fn(Arc<T>) -> Arc<A>) -> Self {
        let alias = Alias::new::<T, A>(cast);
        if !self.aliases.iter().any(|a| a.type_id == alias.type_id) {
            self.aliases.push(alias);
        }
        self
    }

    /// Tag the bean with a marker.
    pub fn marker(mut self, marker: Marker) -> Self {
        if !self.markers.contains(&marker) {
            self.markers.push(marker);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scope(&self) -> BeanScope {
        self.factory.scope()
    }

    pub(crate) fn into_entry(self) -> BeanEntry {
        let mut aliases = Vec::with_capacity(self.aliases.len() + 1);
        aliases.push(Alias::new::<T, T>(identity::<T>));
        aliases.extend(self.aliases);

        BeanEntry {
            name: self.name,
            type_name: std::any::type_name::<T>(),
            factory: self.factory,
            aliases,
            markers: self.markers,
        }
    }
}

impl<T: Injectable> std::fmt::Debug for BeanDefinition<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BeanDefinition")
            .field("name", &self.name)
            .field("type", &std::any::type_name::<T>())
            .field("scope", &self.scope())
            .field("aliases", &self.aliases.iter().map(|a| a.type_name).collect::<Vec<_>>())
            .field("markers", &self.markers)
            .finish()
    }
}

/// A registered, type-erased bean definition
pub(crate) struct BeanEntry {
    pub(crate) name: String,
    pub(crate) type_name: &'static str,
    pub(crate) factory: AnyFactory,
    aliases: Vec<Alias>,
    markers: Vec<Marker>,
}

impl BeanEntry {
    #[inline]
    pub(crate) fn answers_to(&self, type_id: TypeId) -> bool {
        self.aliases.iter().any(|a| a.type_id == type_id)
    }

    #[inline]
    pub(crate) fn has_marker(&self, marker: Marker) -> bool {
        self.markers.contains(&marker)
    }

    /// View a resolved instance of this bean as `A`.
    pub(crate) fn view<A: ?Sized + 'static>(&self, bean: AnyBean) -> Option<Arc<A>> {
        let alias = self.aliases.iter().find(|a| a.type_id == TypeId::of::<A>())?;
        let boxed = (alias.cast)(bean)?;
        boxed.downcast::<Arc<A>>().ok().map(|view| *view)
    }
}
