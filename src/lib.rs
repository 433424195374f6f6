//! # Injector Bundle - Configuration and Components for a DI Context
//!
//! Connects a host service container to a named-bean dependency injection
//! context. The bundle exposes the host's parsed configuration to the context
//! as flat, dotted properties and hands every bean that is a managed object,
//! task, health check or HTTP component to the host registry that runs it.
//!
//! ## Features
//!
//! - **Property projection** - any `Serialize` configuration becomes dotted
//!   keys, with `[i]` indices and a comma-joined entry for every list
//! - **Named beans** - singleton, lazy and prototype scopes, lock-free lookups
//! - **Trait-object lookups** - beans declare `dyn Trait` views and are found by them
//! - **Placeholders** - `${key}` and `${key:default}` resolved against property sources
//! - **Capability harvest** - lifecycle, admin, health and HTTP registration in one call
//! - **Observable** - optional tracing integration with JSON or pretty output
//!
//! ## Quick Start
//!
//! ```rust
//! use injector_bundle::host::{Environment, HealthCheck, HealthResult};
//! use injector_bundle::{ApplicationContext, BeanDefinition, ContextBundle, ObjectMapper};
//! use serde::Serialize;
//! use std::sync::Arc;
//!
//! #[derive(Serialize)]
//! struct AppConfig {
//!     database: Database,
//! }
//!
//! #[derive(Serialize)]
//! struct Database {
//!     url: String,
//!     replicas: Vec<String>,
//! }
//!
//! struct DatabaseCheck {
//!     url: String,
//! }
//!
//! impl HealthCheck for DatabaseCheck {
//!     fn check(&self) -> HealthResult {
//!         HealthResult::healthy_with(self.url.clone())
//!     }
//! }
//!
//! let context = ApplicationContext::new();
//! context
//!     .register(
//!         BeanDefinition::lazy("databaseCheck", |ctx| {
//!             Ok(DatabaseCheck { url: ctx.resolve_placeholders("${database.url}")? })
//!         })
//!         .health_check(),
//!     )
//!     .unwrap();
//!
//! let environment = Environment::new("app", ObjectMapper::new());
//! let config = Arc::new(AppConfig {
//!     database: Database {
//!         url: "postgres://primary".into(),
//!         replicas: vec!["r1".into(), "r2".into()],
//!     },
//! });
//!
//! ContextBundle::new(context.clone()).run(config, &environment).unwrap();
//!
//! assert_eq!(context.get_property("database.replicas").as_deref(), Some("r1,r2"));
//! assert_eq!(context.get_property("database.replicas[1]").as_deref(), Some("r2"));
//!
//! let results = environment.health_checks().run_health_checks();
//! assert!(results.values().all(|r| r.message() == Some("postgres://primary")));
//! ```
//!
//! ## Bean Scopes
//!
//! ```rust
//! use injector_bundle::{ApplicationContext, BeanDefinition};
//! use std::sync::atomic::{AtomicU64, Ordering};
//!
//! static COUNTER: AtomicU64 = AtomicU64::new(0);
//!
//! struct RequestId(u64);
//!
//! let context = ApplicationContext::new();
//!
//! // Singleton - pre-built, shared everywhere
//! context.register_singleton("greeting", String::from("hello")).unwrap();
//!
//! // Lazy singleton - built at refresh or on first lookup
//! context
//!     .register(BeanDefinition::lazy("shout", |ctx| {
//!         Ok(ctx.get::<String>("greeting")?.to_uppercase())
//!     }))
//!     .unwrap();
//!
//! // Prototype - new instance every time
//! context
//!     .register(BeanDefinition::prototype("requestId", |_| {
//!         Ok(RequestId(COUNTER.fetch_add(1, Ordering::SeqCst)))
//!     }))
//!     .unwrap();
//!
//! context.refresh().unwrap();
//! assert_eq!(*context.get::<String>("shout").unwrap(), "HELLO");
//! ```

mod bundle;
mod capability;
mod context;
mod definition;
mod error;
mod factory;
pub mod host;
#[cfg(feature = "logging")]
pub mod logging;
mod mapper;
mod projector;
mod property;
mod provider;
mod storage;

pub use bundle::*;
pub use context::*;
pub use definition::{BeanDefinition, Marker};
pub use error::*;
pub use factory::AnyBean;
pub use mapper::*;
pub use projector::*;
pub use property::*;
pub use provider::*;

// Re-export tracing macros for convenience when logging feature is enabled
#[cfg(feature = "logging")]
pub use tracing::{debug, error, info, trace, warn};

// Re-export for convenience
pub use std::sync::Arc;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::host::{
        Binder, ContainerResponseFilter, Environment, HealthCheck, HealthResult, LifeCycle, Managed,
        ServerLifecycleListener, Task,
    };
    pub use crate::{
        ApplicationContext, BeanDefinition, BeanScope, BundleError, ContextBundle, DiError, Injectable,
        Marker, ObjectMapper, PropertySource, Result,
    };
    pub use std::sync::Arc;
}
