//! Capability helpers for bean definitions
//!
//! Each helper declares the matching host trait as a view of the bean, so the
//! bundle finds it when it harvests the context. `http_provider` and
//! `http_resource` tag the bean with a [`Marker`] instead.
//!
//! ```rust
//! use injector_bundle::host::{HealthCheck, HealthResult};
//! use injector_bundle::{ApplicationContext, BeanDefinition};
//!
//! struct DatabaseCheck;
//!
//! impl HealthCheck for DatabaseCheck {
//!     fn check(&self) -> HealthResult {
//!         HealthResult::healthy()
//!     }
//! }
//!
//! let context = ApplicationContext::new();
//! context
//!     .register(BeanDefinition::singleton("databaseCheck", DatabaseCheck).health_check())
//!     .unwrap();
//!
//! assert_eq!(context.beans_of_type::<dyn HealthCheck>().unwrap().len(), 1);
//! ```

use crate::host::{
    Binder, ContainerResponseFilter, HealthCheck, LifeCycle, Managed, ServerLifecycleListener, Task,
};
use crate::{BeanDefinition, Injectable, Marker};
use std::sync::Arc;

fn as_managed<T: Managed + 'static>(bean: Arc<T>) -> Arc<dyn Managed> {
    bean
}

fn as_lifecycle<T: LifeCycle + 'static>(bean: Arc<T>) -> Arc<dyn LifeCycle> {
    bean
}

fn as_listener<T: ServerLifecycleListener + 'static>(bean: Arc<T>) -> Arc<dyn ServerLifecycleListener> {
    bean
}

fn as_task<T: Task + 'static>(bean: Arc<T>) -> Arc<dyn Task> {
    bean
}

fn as_health_check<T: HealthCheck + 'static>(bean: Arc<T>) -> Arc<dyn HealthCheck> {
    bean
}

fn as_binder<T: Binder + 'static>(bean: Arc<T>) -> Arc<dyn Binder> {
    bean
}

fn as_response_filter<T: ContainerResponseFilter + 'static>(bean: Arc<T>) -> Arc<dyn ContainerResponseFilter> {
    bean
}

impl<T: Injectable + Managed> BeanDefinition<T> {
    /// Start and stop the bean with the host server.
    pub fn managed(self) -> Self {
        self.alias::<dyn Managed>(as_managed::<T>)
    }
}

impl<T: Injectable + LifeCycle> BeanDefinition<T> {
    /// Start and stop the bean with the host server, as a lifecycle component.
    pub fn lifecycle(self) -> Self {
        self.alias::<dyn LifeCycle>(as_lifecycle::<T>)
    }
}

impl<T: Injectable + ServerLifecycleListener> BeanDefinition<T> {
    pub fn server_lifecycle_listener(self) -> Self {
        self.alias::<dyn ServerLifecycleListener>(as_listener::<T>)
    }
}

impl<T: Injectable + Task> BeanDefinition<T> {
    /// Expose the bean as an admin task.
    pub fn task(self) -> Self {
        self.alias::<dyn Task>(as_task::<T>)
    }
}

impl<T: Injectable + HealthCheck> BeanDefinition<T> {
    /// Register the bean as a health check named after its type.
    pub fn health_check(self) -> Self {
        self.alias::<dyn HealthCheck>(as_health_check::<T>)
    }
}

impl<T: Injectable + Binder> BeanDefinition<T> {
    pub fn binder(self) -> Self {
        self.alias::<dyn Binder>(as_binder::<T>)
    }
}

impl<T: Injectable + ContainerResponseFilter> BeanDefinition<T> {
    pub fn response_filter(self) -> Self {
        self.alias::<dyn ContainerResponseFilter>(as_response_filter::<T>)
    }
}

impl<T: Injectable> BeanDefinition<T> {
    /// Register the bean with the HTTP layer as a provider.
    pub fn http_provider(self) -> Self {
        self.marker(Marker::HttpProvider)
    }

    /// Register the bean with the HTTP layer as a resource.
    pub fn http_resource(self) -> Self {
        self.marker(Marker::HttpResource)
    }
}

#[cfg(test)]
mod tests {
    use crate::host::{HealthResult, TaskParameters};
    use crate::{ApplicationContext, BoxError};

    use super::*;

    struct Janitor;

    impl Managed for Janitor {}

    impl Task for Janitor {
        fn name(&self) -> &str {
            "sweep"
        }

        fn execute(&self, _: &TaskParameters, output: &mut String) -> Result<(), BoxError> {
            output.push_str("swept");
            Ok(())
        }
    }

    impl HealthCheck for Janitor {
        fn check(&self) -> HealthResult {
            HealthResult::healthy()
        }
    }

    #[test]
    fn test_one_bean_many_capabilities() {
        let context = ApplicationContext::new();
        context
            .register(
                BeanDefinition::singleton("janitor", Janitor)
                    .managed()
                    .task()
                    .health_check()
                    .http_provider(),
            )
            .unwrap();

        assert_eq!(context.beans_of_type::<dyn Managed>().unwrap().len(), 1);
        assert_eq!(context.bean_of_type::<dyn Task>().unwrap().name(), "sweep");
        assert!(context.bean_of_type::<dyn HealthCheck>().unwrap().check().is_healthy());
        assert!(context.beans_of_type::<dyn Binder>().unwrap().is_empty());

        let providers = context.beans_with_marker(Marker::HttpProvider).unwrap();
        assert_eq!(providers[0].name, "janitor");
        assert!(context.beans_with_marker(Marker::HttpResource).unwrap().is_empty());
    }

    #[test]
    fn test_capability_views_share_the_instance() {
        let context = ApplicationContext::new();
        context
            .register(BeanDefinition::lazy("janitor", |_| Ok(Janitor)).managed().task())
            .unwrap();

        let concrete = context.get::<Janitor>("janitor").unwrap();
        let task = context.bean_of_type::<dyn Task>().unwrap();
        assert_eq!(
            Arc::as_ptr(&concrete) as *const (),
            Arc::as_ptr(&task) as *const ()
        );
    }
}
