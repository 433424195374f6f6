//! Dependency injection context
//!
//! The `ApplicationContext` stores named bean definitions, builds them on
//! demand or at refresh, and answers lookups by name, by type (including
//! `dyn Trait` views) and by marker. It also owns the ordered property
//! sources used to resolve `${...}` placeholders.

use crate::definition::BeanEntry;
use crate::factory::AnyBean;
use crate::property::PropertySources;
use crate::storage::BeanStorage;
use crate::{BeanDefinition, DiError, Injectable, Marker, Result};
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

#[cfg(feature = "logging")]
use tracing::{debug, trace};

// =============================================================================
// Creation tracking
// =============================================================================

thread_local! {
    /// Beans being created on this thread, keyed by storage address and name.
    ///
    /// A bean that shows up twice is part of a dependency cycle.
    static CREATION_STACK: RefCell<Vec<(usize, String)>> = const { RefCell::new(Vec::new()) };
}

/// Pops the creation stack on drop, including on early return.
struct CreationGuard;

impl CreationGuard {
    fn enter(storage_ptr: usize, name: &str) -> Result<Self> {
        CREATION_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.iter().any(|(ptr, n)| *ptr == storage_ptr && n == name) {
                return Err(DiError::circular(name));
            }
            stack.push((storage_ptr, name.to_string()));
            Ok(CreationGuard)
        })
    }
}

impl Drop for CreationGuard {
    fn drop(&mut self) {
        CREATION_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

// =============================================================================
// Lookup results
// =============================================================================

/// A bean returned from a type or marker lookup, with its registration details.
pub struct NamedBean<A: ?Sized> {
    /// Name the bean is registered under
    pub name: String,
    /// Concrete type of the bean
    pub type_name: &'static str,
    pub bean: Arc<A>,
}

/// A bean found by marker, as an untyped instance
pub type BeanRef = NamedBean<dyn Any + Send + Sync>;

impl<A: ?Sized> Clone for NamedBean<A> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            type_name: self.type_name,
            bean: Arc::clone(&self.bean),
        }
    }
}

impl<A: ?Sized> std::fmt::Debug for NamedBean<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamedBean")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .finish()
    }
}

// =============================================================================
// ApplicationContext
// =============================================================================

const INACTIVE: u8 = 0;
const REFRESHING: u8 = 1;
const ACTIVE: u8 = 2;

/// Named-bean dependency injection context.
///
/// Clones share the same beans, state and property sources.
///
/// # Examples
///
/// ```rust
/// use injector_bundle::{ApplicationContext, BeanDefinition};
///
/// struct Greeting(String);
/// struct Greeter {
///     greeting: std::sync::Arc<Greeting>,
/// }
///
/// let context = ApplicationContext::new();
/// context.register_singleton("greeting", Greeting("hello".into())).unwrap();
/// context
///     .register(BeanDefinition::lazy("greeter", |ctx| {
///         Ok(Greeter { greeting: ctx.get::<Greeting>("greeting")? })
///     }))
///     .unwrap();
///
/// context.refresh().unwrap();
/// assert!(context.is_active());
///
/// let greeter = context.get::<Greeter>("greeter").unwrap();
/// assert_eq!(greeter.greeting.0, "hello");
/// ```
#[derive(Clone)]
pub struct ApplicationContext {
    storage: Arc<BeanStorage>,
    property_sources: Arc<PropertySources>,
    state: Arc<AtomicU8>,
    running: Arc<AtomicBool>,
}

impl ApplicationContext {
    /// Create a new, inactive context.
    pub fn new() -> Self {
        #[cfg(feature = "logging")]
        debug!(target: "injector_bundle", "Creating new application context");

        Self {
            storage: Arc::new(BeanStorage::new()),
            property_sources: Arc::new(PropertySources::new()),
            state: Arc::new(AtomicU8::new(INACTIVE)),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    // =========================================================================
    // Registration Methods
    // =========================================================================

    /// Register a bean definition.
    ///
    /// Fails with `Locked` once the context is active (or refreshing) and with
    /// `AlreadyRegistered` if the name is taken.
    pub fn register<T: Injectable>(&self, definition: BeanDefinition<T>) -> Result<()> {
        if self.state.load(Ordering::Acquire) != INACTIVE {
            return Err(DiError::Locked);
        }

        #[cfg(feature = "logging")]
        let scope = definition.scope();

        let entry = definition.into_entry();
        let name = entry.name.clone();

        #[cfg(feature = "logging")]
        let type_name = entry.type_name;

        if !self.storage.insert(entry) {
            return Err(DiError::already_registered(name));
        }

        #[cfg(feature = "logging")]
        debug!(
            target: "injector_bundle",
            bean = %name,
            bean_type = type_name,
            scope = %scope,
            bean_count = self.storage.len(),
            "Registered bean definition"
        );

        Ok(())
    }

    /// Bind a pre-built instance under `name`.
    #[inline]
    pub fn register_singleton<T: Injectable>(&self, name: impl Into<String>, instance: T) -> Result<()> {
        self.register(BeanDefinition::singleton(name, instance))
    }

    /// Bind an already shared instance under `name`.
    #[inline]
    pub fn register_singleton_arc<T: Injectable>(&self, name: impl Into<String>, instance: Arc<T>) -> Result<()> {
        self.register(BeanDefinition::singleton_arc(name, instance))
    }

    // =========================================================================
    // Resolution Methods
    // =========================================================================

    fn storage_ptr(&self) -> usize {
        Arc::as_ptr(&self.storage) as usize
    }

    fn resolve_entry(&self, entry: &BeanEntry) -> Result<AnyBean> {
        if entry.factory.is_initialized() {
            #[cfg(feature = "logging")]
            trace!(
                target: "injector_bundle",
                bean = %entry.name,
                "Bean resolved from existing instance"
            );
            return entry.factory.resolve(self);
        }

        let _guard = CreationGuard::enter(self.storage_ptr(), &entry.name)?;

        #[cfg(feature = "logging")]
        trace!(
            target: "injector_bundle",
            bean = %entry.name,
            bean_type = entry.type_name,
            "Creating bean"
        );

        entry.factory.resolve(self)
    }

    fn view<A: ?Sized + 'static>(&self, entry: &BeanEntry) -> Result<NamedBean<A>> {
        let bean = self.resolve_entry(entry)?;
        let view = entry.view::<A>(bean).ok_or_else(|| DiError::TypeMismatch {
            name: entry.name.clone(),
            expected: std::any::type_name::<A>(),
            actual: entry.type_name,
        })?;

        Ok(NamedBean {
            name: entry.name.clone(),
            type_name: entry.type_name,
            bean: view,
        })
    }

    /// Resolve a bean by name.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use injector_bundle::ApplicationContext;
    ///
    /// let context = ApplicationContext::new();
    /// context.register_singleton("answer", 42u32).unwrap();
    ///
    /// assert_eq!(*context.get::<u32>("answer").unwrap(), 42);
    /// assert!(context.get::<String>("answer").is_err());
    /// ```
    pub fn get<T: Injectable>(&self, name: &str) -> Result<Arc<T>> {
        let entry = self.storage.get(name).ok_or_else(|| DiError::not_found(name))?;
        let bean = self.resolve_entry(&entry)?;

        bean.downcast::<T>().map_err(|_| DiError::TypeMismatch {
            name: name.to_string(),
            expected: std::any::type_name::<T>(),
            actual: entry.type_name,
        })
    }

    /// Try to resolve by name, returning None on any failure.
    #[inline]
    pub fn try_get<T: Injectable>(&self, name: &str) -> Option<Arc<T>> {
        self.get::<T>(name).ok()
    }

    /// Resolve the single bean viewable as `A`.
    ///
    /// `A` is a concrete bean type or a `dyn Trait` declared with
    /// [`BeanDefinition::alias`].
    pub fn bean_of_type<A: ?Sized + 'static>(&self) -> Result<Arc<A>> {
        let type_id = TypeId::of::<A>();
        let mut candidates: Vec<_> = self
            .storage
            .entries()
            .into_iter()
            .filter(|e| e.answers_to(type_id))
            .collect();

        match candidates.len() {
            0 => Err(DiError::no_bean_of_type::<A>()),
            1 => {
                let entry = candidates.remove(0);
                self.view::<A>(&entry).map(|named| named.bean)
            }
            _ => Err(DiError::Ambiguous {
                type_name: std::any::type_name::<A>(),
                candidates: candidates.iter().map(|e| e.name.clone()).collect(),
            }),
        }
    }

    /// Resolve every bean viewable as `A`, in registration order.
    pub fn beans_of_type<A: ?Sized + 'static>(&self) -> Result<Vec<NamedBean<A>>> {
        let type_id = TypeId::of::<A>();
        let beans = self
            .storage
            .entries()
            .into_iter()
            .filter(|e| e.answers_to(type_id))
            .map(|e| self.view::<A>(&e))
            .collect::<Result<Vec<_>>>()?;

        #[cfg(feature = "logging")]
        trace!(
            target: "injector_bundle",
            lookup_type = std::any::type_name::<A>(),
            matches = beans.len(),
            "Resolved beans of type"
        );

        Ok(beans)
    }

    /// Resolve every bean carrying `marker`, in registration order.
    pub fn beans_with_marker(&self, marker: Marker) -> Result<Vec<BeanRef>> {
        self.storage
            .entries()
            .into_iter()
            .filter(|e| e.has_marker(marker))
            .map(|e| {
                Ok(NamedBean {
                    name: e.name.clone(),
                    type_name: e.type_name,
                    bean: self.resolve_entry(&e)?,
                })
            })
            .collect()
    }

    // =========================================================================
    // Query Methods
    // =========================================================================

    #[inline]
    pub fn contains_bean(&self, name: &str) -> bool {
        self.storage.contains(name)
    }

    /// Bean names in registration order
    pub fn bean_names(&self) -> Vec<String> {
        self.storage.names()
    }

    /// Concrete type name of a registered bean
    pub fn type_name_of(&self, name: &str) -> Option<&'static str> {
        self.storage.get(name).map(|e| e.type_name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    // =========================================================================
    // Lifecycle Methods
    // =========================================================================

    /// Whether `refresh` has completed successfully.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.state.load(Ordering::Acquire) == ACTIVE
    }

    /// Whether the context is active and has not been stopped.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Build every non-prototype bean in registration order, then mark the
    /// context active and running.
    ///
    /// On failure the context goes back to inactive; beans created before the
    /// failure are kept.
    pub fn refresh(&self) -> Result<()> {
        if self
            .state
            .compare_exchange(INACTIVE, REFRESHING, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(DiError::AlreadyActive);
        }

        #[cfg(feature = "logging")]
        debug!(
            target: "injector_bundle",
            bean_count = self.storage.len(),
            "Refreshing application context"
        );

        for entry in self.storage.entries() {
            if !entry.factory.scope().is_eager() {
                continue;
            }
            if let Err(err) = self.resolve_entry(&entry) {
                #[cfg(feature = "logging")]
                debug!(
                    target: "injector_bundle",
                    bean = %entry.name,
                    error = %err,
                    "Context refresh failed"
                );

                self.state.store(INACTIVE, Ordering::Release);
                return Err(err);
            }
        }

        self.state.store(ACTIVE, Ordering::Release);
        self.running.store(true, Ordering::Release);

        #[cfg(feature = "logging")]
        debug!(target: "injector_bundle", "Application context refreshed");

        Ok(())
    }

    /// Stop the context. Beans stay resolvable; calling it twice is harmless.
    pub fn stop(&self) {
        #[cfg(feature = "logging")]
        {
            let was_running = self.running.swap(false, Ordering::AcqRel);
            debug!(
                target: "injector_bundle",
                was_running = was_running,
                "Application context stopped"
            );
        }

        #[cfg(not(feature = "logging"))]
        self.running.store(false, Ordering::Release);
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// The ordered property sources, highest precedence first.
    #[inline]
    pub fn property_sources(&self) -> &PropertySources {
        &self.property_sources
    }

    /// The value of `key` from the first property source that defines it.
    #[inline]
    pub fn get_property(&self, key: &str) -> Option<String> {
        self.property_sources.property(key)
    }

    /// Replace `${key}` and `${key:default}` placeholders in `text`.
    ///
    /// Substituted values are inserted as-is, never resolved again. An
    /// unterminated `${` is kept literally.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use injector_bundle::{ApplicationContext, MapPropertySource};
    /// use std::sync::Arc;
    ///
    /// let context = ApplicationContext::new();
    /// context
    ///     .property_sources()
    ///     .add_first(Arc::new(MapPropertySource::from_pairs("app", [("server.port", "9090")])));
    ///
    /// let url = context.resolve_placeholders("http://${server.host:localhost}:${server.port}").unwrap();
    /// assert_eq!(url, "http://localhost:9090");
    /// ```
    pub fn resolve_placeholders(&self, text: &str) -> Result<String> {
        let mut resolved = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(start) = rest.find("${") {
            resolved.push_str(&rest[..start]);
            let after = &rest[start + 2..];

            let Some(end) = after.find('}') else {
                resolved.push_str(&rest[start..]);
                return Ok(resolved);
            };

            let expression = &after[..end];
            let (key, default) = match expression.split_once(':') {
                Some((key, default)) => (key, Some(default)),
                None => (expression, None),
            };

            match self.get_property(key).or_else(|| default.map(str::to_owned)) {
                Some(value) => resolved.push_str(&value),
                None => {
                    return Err(DiError::UnresolvablePlaceholder {
                        key: key.to_string(),
                        text: text.to_string(),
                    });
                }
            }

            rest = &after[end + 1..];
        }

        resolved.push_str(rest);
        Ok(resolved)
    }
}

impl Default for ApplicationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ApplicationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApplicationContext")
            .field("bean_count", &self.len())
            .field("active", &self.is_active())
            .field("running", &self.is_running())
            .field("property_sources", &self.property_sources.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MapPropertySource;
    use std::sync::atomic::AtomicU32;

    #[derive(Clone)]
    struct TestService {
        value: String,
    }

    trait Speaker: Send + Sync {
        fn speak(&self) -> String;
    }

    struct Dog;
    struct Cat;

    impl Speaker for Dog {
        fn speak(&self) -> String {
            "woof".into()
        }
    }

    impl Speaker for Cat {
        fn speak(&self) -> String {
            "meow".into()
        }
    }

    fn dog_speaker(dog: Arc<Dog>) -> Arc<dyn Speaker> {
        dog
    }

    fn cat_speaker(cat: Arc<Cat>) -> Arc<dyn Speaker> {
        cat
    }

    #[test]
    fn test_singleton() {
        let context = ApplicationContext::new();
        context
            .register_singleton("service", TestService { value: "test".into() })
            .unwrap();

        let s1 = context.get::<TestService>("service").unwrap();
        let s2 = context.get::<TestService>("service").unwrap();

        assert_eq!(s1.value, "test");
        assert!(Arc::ptr_eq(&s1, &s2));
    }

    #[test]
    fn test_lazy_resolves_dependencies() {
        let context = ApplicationContext::new();
        context
            .register(BeanDefinition::lazy("outer", |ctx| {
                let inner = ctx.get::<TestService>("inner")?;
                Ok(TestService {
                    value: format!("outer({})", inner.value),
                })
            }))
            .unwrap();
        context
            .register_singleton("inner", TestService { value: "inner".into() })
            .unwrap();

        let outer = context.get::<TestService>("outer").unwrap();
        assert_eq!(outer.value, "outer(inner)");
    }

    #[test]
    fn test_prototype() {
        static COUNTER: AtomicU32 = AtomicU32::new(0);

        let context = ApplicationContext::new();
        context
            .register(BeanDefinition::prototype("counter", |_| {
                Ok(COUNTER.fetch_add(1, Ordering::SeqCst))
            }))
            .unwrap();

        let a = context.get::<u32>("counter").unwrap();
        let b = context.get::<u32>("counter").unwrap();
        assert_ne!(*a, *b);
    }

    #[test]
    fn test_not_found_and_type_mismatch() {
        let context = ApplicationContext::new();
        context.register_singleton("number", 1u8).unwrap();

        assert!(matches!(
            context.get::<u8>("missing"),
            Err(DiError::NotFound { .. })
        ));
        assert!(matches!(
            context.get::<String>("number"),
            Err(DiError::TypeMismatch { .. })
        ));
        assert!(context.try_get::<String>("number").is_none());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let context = ApplicationContext::new();
        context.register_singleton("dup", 1u8).unwrap();

        let err = context.register_singleton("dup", 2u8).unwrap_err();
        assert_eq!(err, DiError::already_registered("dup"));
        assert_eq!(*context.get::<u8>("dup").unwrap(), 1);
    }

    #[test]
    fn test_refresh_builds_eager_beans() {
        static CREATED: AtomicU32 = AtomicU32::new(0);

        let context = ApplicationContext::new();
        context
            .register(BeanDefinition::lazy("lazy", |_| {
                CREATED.fetch_add(1, Ordering::SeqCst);
                Ok(TestService { value: "lazy".into() })
            }))
            .unwrap();
        context
            .register(BeanDefinition::prototype("proto", |_| {
                CREATED.fetch_add(100, Ordering::SeqCst);
                Ok(0u8)
            }))
            .unwrap();

        assert!(!context.is_active());
        context.refresh().unwrap();

        assert_eq!(CREATED.load(Ordering::SeqCst), 1);
        assert!(context.is_active());
        assert!(context.is_running());
    }

    #[test]
    fn test_active_context_is_locked() {
        let context = ApplicationContext::new();
        context.refresh().unwrap();

        assert_eq!(context.register_singleton("late", 1u8).unwrap_err(), DiError::Locked);
        assert_eq!(context.refresh().unwrap_err(), DiError::AlreadyActive);
    }

    #[test]
    fn test_failed_refresh_leaves_context_inactive() {
        let context = ApplicationContext::new();
        context
            .register(BeanDefinition::lazy("broken", |_| -> Result<u8> {
                Err(DiError::creation_failed("broken", "boom"))
            }))
            .unwrap();

        let err = context.refresh().unwrap_err();
        assert!(matches!(err, DiError::CreationFailed { .. }));
        assert!(!context.is_active());
        assert!(!context.is_running());
    }

    #[test]
    fn test_missing_dependency_fails_refresh() {
        let context = ApplicationContext::new();
        context
            .register(BeanDefinition::lazy("needy", |ctx| {
                ctx.get::<TestService>("absent").map(|s| s.value.clone())
            }))
            .unwrap();

        assert_eq!(context.refresh().unwrap_err(), DiError::not_found("absent"));
    }

    #[test]
    fn test_circular_dependency_detected() {
        let context = ApplicationContext::new();
        context
            .register(BeanDefinition::lazy("a", |ctx| {
                ctx.get::<String>("b").map(|b| format!("a->{b}"))
            }))
            .unwrap();
        context
            .register(BeanDefinition::lazy("b", |ctx| {
                ctx.get::<String>("a").map(|a| format!("b->{a}"))
            }))
            .unwrap();

        let err = context.get::<String>("a").unwrap_err();
        assert_eq!(err, DiError::circular("a"));

        // the creation stack unwound, so unrelated lookups still work
        context.register_singleton("c", "c".to_string()).unwrap();
        assert_eq!(*context.get::<String>("c").unwrap(), "c");
    }

    #[test]
    fn test_beans_of_type_by_alias() {
        let context = ApplicationContext::new();
        context
            .register(BeanDefinition::singleton("dog", Dog).alias::<dyn Speaker>(dog_speaker))
            .unwrap();
        context
            .register(BeanDefinition::singleton("cat", Cat).alias::<dyn Speaker>(cat_speaker))
            .unwrap();
        context.register_singleton("other", 5u8).unwrap();

        let speakers = context.beans_of_type::<dyn Speaker>().unwrap();
        let spoken: Vec<_> = speakers.iter().map(|s| (s.name.as_str(), s.bean.speak())).collect();
        assert_eq!(spoken, vec![("dog", "woof".to_string()), ("cat", "meow".to_string())]);
        assert_eq!(speakers[0].type_name, std::any::type_name::<Dog>());

        assert!(context.beans_of_type::<String>().unwrap().is_empty());
    }

    #[test]
    fn test_bean_of_type_requires_single_match() {
        let context = ApplicationContext::new();
        assert!(matches!(
            context.bean_of_type::<dyn Speaker>(),
            Err(DiError::NoBeanOfType { .. })
        ));

        context
            .register(BeanDefinition::singleton("dog", Dog).alias::<dyn Speaker>(dog_speaker))
            .unwrap();
        assert_eq!(context.bean_of_type::<dyn Speaker>().unwrap().speak(), "woof");
        assert!(context.bean_of_type::<Dog>().is_ok());

        context
            .register(BeanDefinition::singleton("cat", Cat).alias::<dyn Speaker>(cat_speaker))
            .unwrap();
        match context.bean_of_type::<dyn Speaker>() {
            Err(DiError::Ambiguous { candidates, .. }) => assert_eq!(candidates, vec!["dog", "cat"]),
            other => panic!("expected ambiguity, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_beans_with_marker() {
        let context = ApplicationContext::new();
        context
            .register(BeanDefinition::singleton("resource", TestService { value: "r".into() }).marker(Marker::HttpResource))
            .unwrap();
        context
            .register(BeanDefinition::singleton("provider", 1u8).marker(Marker::HttpProvider))
            .unwrap();

        let resources = context.beans_with_marker(Marker::HttpResource).unwrap();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].name, "resource");

        let resource = Arc::clone(&resources[0].bean).downcast::<TestService>().unwrap();
        assert_eq!(resource.value, "r");
    }

    #[test]
    fn test_stop() {
        let context = ApplicationContext::new();
        context.refresh().unwrap();

        context.stop();
        assert!(!context.is_running());
        assert!(context.is_active());

        context.stop();
        assert!(!context.is_running());
    }

    #[test]
    fn test_concurrent_register_and_type_lookup() {
        let context = ApplicationContext::new();

        std::thread::scope(|scope| {
            for t in 0..4u32 {
                let context = &context;
                scope.spawn(move || {
                    for i in 0..250u32 {
                        context.register_singleton(format!("value-{t}-{i}"), t * 1000 + i).unwrap();
                    }
                });
            }
            for _ in 0..4 {
                let context = &context;
                scope.spawn(move || {
                    for _ in 0..250 {
                        let found = context.beans_of_type::<u32>().unwrap();
                        assert!(found.len() <= 1000);
                    }
                });
            }
        });

        assert_eq!(context.len(), 1000);
        assert_eq!(context.beans_of_type::<u32>().unwrap().len(), 1000);
    }

    #[test]
    fn test_clones_share_state() {
        let context = ApplicationContext::new();
        let clone = context.clone();
        context.register_singleton("shared", 3u8).unwrap();
        clone.refresh().unwrap();

        assert!(context.is_active());
        assert_eq!(*clone.get::<u8>("shared").unwrap(), 3);
        assert_eq!(context.bean_names(), vec!["shared"]);
        assert_eq!(context.type_name_of("shared"), Some("u8"));
    }

    #[test]
    fn test_resolve_placeholders() {
        let context = ApplicationContext::new();
        context.property_sources().add_first(Arc::new(MapPropertySource::from_pairs(
            "test",
            [("a", "1"), ("b.c[0]", "x"), ("nested", "${a}")],
        )));

        assert_eq!(context.resolve_placeholders("plain").unwrap(), "plain");
        assert_eq!(context.resolve_placeholders("${a}-${b.c[0]}").unwrap(), "1-x");
        assert_eq!(context.resolve_placeholders("${missing:dflt}").unwrap(), "dflt");
        assert_eq!(context.resolve_placeholders("${missing:}").unwrap(), "");
        assert_eq!(context.resolve_placeholders("${nested}").unwrap(), "${a}");
        assert_eq!(context.resolve_placeholders("open ${a").unwrap(), "open ${a");

        let err = context.resolve_placeholders("x ${missing}").unwrap_err();
        assert_eq!(
            err,
            DiError::UnresolvablePlaceholder {
                key: "missing".into(),
                text: "x ${missing}".into()
            }
        );
    }
}
