//! Host service-container runtime
//!
//! The registries a bundle hands components to: lifecycle, admin tasks,
//! health checks and the HTTP layer. An [`Environment`] bundles them with the
//! JSON mapper and is cheap to clone.

mod admin;
mod health;
mod jersey;
mod lifecycle;

pub use admin::{AdminEnvironment, Task, TaskParameters};
pub use health::{HealthCheck, HealthCheckRegistry, HealthResult};
pub use jersey::{
    Binder, Bindings, ContainerResponseFilter, JerseyComponent, JerseyEnvironment, ResourceConfig,
    ResponseContext,
};
pub use lifecycle::{LifeCycle, LifecycleEnvironment, Managed, ServerInfo, ServerLifecycleListener};

use crate::ObjectMapper;
use std::sync::Arc;

/// Runtime environment of a host application.
#[derive(Debug, Clone)]
pub struct Environment {
    name: String,
    object_mapper: ObjectMapper,
    lifecycle: Arc<LifecycleEnvironment>,
    admin: Arc<AdminEnvironment>,
    health_checks: Arc<HealthCheckRegistry>,
    jersey: Arc<JerseyEnvironment>,
}

impl Environment {
    pub fn new(name: impl Into<String>, object_mapper: ObjectMapper) -> Self {
        Self {
            name: name.into(),
            object_mapper,
            lifecycle: Arc::default(),
            admin: Arc::default(),
            health_checks: Arc::default(),
            jersey: Arc::default(),
        }
    }

    /// Application name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn object_mapper(&self) -> &ObjectMapper {
        &self.object_mapper
    }

    pub fn lifecycle(&self) -> &LifecycleEnvironment {
        &self.lifecycle
    }

    pub fn admin(&self) -> &AdminEnvironment {
        &self.admin
    }

    pub fn health_checks(&self) -> &HealthCheckRegistry {
        &self.health_checks
    }

    pub fn jersey(&self) -> &JerseyEnvironment {
        &self.jersey
    }
}
