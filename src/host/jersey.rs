//! HTTP layer registries
//!
//! Providers and resources are registered as untyped beans; binders and
//! response filters go to the resource configuration, which drives them.

use crate::BeanRef;
use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

#[cfg(feature = "logging")]
use tracing::debug;

/// Instances a binder makes injectable into resources, keyed by type.
#[derive(Default)]
pub struct Bindings {
    instances: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `instance` as the injectable value of type `T`, replacing any earlier one.
    pub fn bind<T: Any + Send + Sync>(&mut self, instance: Arc<T>) {
        self.instances.insert(TypeId::of::<T>(), instance);
    }

    pub fn get<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        let instance = self.instances.get(&TypeId::of::<T>())?;
        Arc::clone(instance).downcast::<T>().ok()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

impl std::fmt::Debug for Bindings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bindings").field("count", &self.len()).finish()
    }
}

/// Contributes injectable instances to the HTTP layer.
pub trait Binder: Send + Sync {
    fn configure(&self, bindings: &mut Bindings);
}

/// Response being sent back by the HTTP layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseContext {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
}

impl ResponseContext {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
    }
}

/// Rewrites responses on their way out.
pub trait ContainerResponseFilter: Send + Sync {
    fn filter(&self, response: &mut ResponseContext);
}

/// A component the resource configuration accepts
#[derive(Clone)]
pub enum JerseyComponent {
    Binder(Arc<dyn Binder>),
    ResponseFilter(Arc<dyn ContainerResponseFilter>),
}

impl std::fmt::Debug for JerseyComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JerseyComponent::Binder(_) => f.write_str("Binder"),
            JerseyComponent::ResponseFilter(_) => f.write_str("ResponseFilter"),
        }
    }
}

/// Binders and response filters, in registration order
#[derive(Default)]
pub struct ResourceConfig {
    components: RwLock<Vec<JerseyComponent>>,
}

impl ResourceConfig {
    pub fn register(&self, component: JerseyComponent) {
        #[cfg(feature = "logging")]
        debug!(target: "injector_bundle", component = ?component, "Registered resource config component");

        self.components
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(component);
    }

    pub fn components(&self) -> Vec<JerseyComponent> {
        self.components.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn binders(&self) -> Vec<Arc<dyn Binder>> {
        self.components()
            .into_iter()
            .filter_map(|c| match c {
                JerseyComponent::Binder(b) => Some(b),
                JerseyComponent::ResponseFilter(_) => None,
            })
            .collect()
    }

    pub fn response_filters(&self) -> Vec<Arc<dyn ContainerResponseFilter>> {
        self.components()
            .into_iter()
            .filter_map(|c| match c {
                JerseyComponent::ResponseFilter(f) => Some(f),
                JerseyComponent::Binder(_) => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.components.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ResourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.components()).finish()
    }
}

/// The HTTP environment: registered providers and resources plus the
/// resource configuration.
#[derive(Default)]
pub struct JerseyEnvironment {
    registered: RwLock<Vec<BeanRef>>,
    resource_config: ResourceConfig,
}

impl JerseyEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider or resource instance.
    pub fn register(&self, component: BeanRef) {
        #[cfg(feature = "logging")]
        debug!(
            target: "injector_bundle",
            bean = %component.name,
            bean_type = component.type_name,
            "Registered HTTP component"
        );

        self.registered
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(component);
    }

    /// Registered providers and resources, in registration order
    pub fn registered(&self) -> Vec<BeanRef> {
        self.registered.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn registered_names(&self) -> Vec<String> {
        self.registered
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|c| c.name.clone())
            .collect()
    }

    #[inline]
    pub fn resource_config(&self) -> &ResourceConfig {
        &self.resource_config
    }

    /// Run every binder, in registration order, into one set of bindings.
    pub fn configure_binders(&self) -> Bindings {
        let mut bindings = Bindings::new();
        for binder in self.resource_config.binders() {
            binder.configure(&mut bindings);
        }
        bindings
    }

    /// Pass a response through every filter, in registration order.
    pub fn apply_response_filters(&self, response: &mut ResponseContext) {
        for filter in self.resource_config.response_filters() {
            filter.filter(response);
        }
    }
}

impl std::fmt::Debug for JerseyEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JerseyEnvironment")
            .field("registered", &self.registered_names())
            .field("resource_config", &self.resource_config)
            .finish()
    }
}
