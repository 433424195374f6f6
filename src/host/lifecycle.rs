//! Lifecycle of the host service container
//!
//! Managed objects start in registration order when the server starts and
//! stop in reverse order when it shuts down. Server lifecycle listeners are
//! told once the server accepts connections.

use crate::{BoxError, HostError};
use std::sync::{Arc, RwLock};

#[cfg(feature = "logging")]
use tracing::{debug, warn};

/// An object whose lifetime follows the server's.
pub trait Managed: Send + Sync {
    /// Called before the server accepts connections
    fn start(&self) -> Result<(), BoxError> {
        Ok(())
    }

    /// Called after the server stops accepting connections
    fn stop(&self) -> Result<(), BoxError> {
        Ok(())
    }
}

/// A stateful component with its own running flag.
pub trait LifeCycle: Send + Sync {
    fn start(&self) -> Result<(), BoxError>;

    fn stop(&self) -> Result<(), BoxError>;

    fn is_running(&self) -> bool;
}

/// Ports and name of the started server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub name: String,
    pub application_port: u16,
    pub admin_port: u16,
}

/// Notified when the server has started.
pub trait ServerLifecycleListener: Send + Sync {
    fn server_started(&self, server: &ServerInfo);
}

#[derive(Clone)]
enum Component {
    Managed(Arc<dyn Managed>),
    LifeCycle(Arc<dyn LifeCycle>),
}

impl Component {
    fn start(&self) -> Result<(), BoxError> {
        match self {
            Component::Managed(m) => m.start(),
            Component::LifeCycle(l) => l.start(),
        }
    }

    fn stop(&self) -> Result<(), BoxError> {
        match self {
            Component::Managed(m) => m.stop(),
            Component::LifeCycle(l) => l.stop(),
        }
    }

    fn label(&self, index: usize) -> String {
        match self {
            Component::Managed(_) => format!("managed[{index}]"),
            Component::LifeCycle(_) => format!("lifecycle[{index}]"),
        }
    }
}

/// Registry of managed objects and server listeners.
#[derive(Default)]
pub struct LifecycleEnvironment {
    components: RwLock<Vec<Component>>,
    listeners: RwLock<Vec<Arc<dyn ServerLifecycleListener>>>,
}

impl LifecycleEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object to start and stop with the server.
    pub fn manage(&self, managed: Arc<dyn Managed>) {
        self.push(Component::Managed(managed));
    }

    /// Add a lifecycle component to start and stop with the server.
    pub fn manage_lifecycle(&self, lifecycle: Arc<dyn LifeCycle>) {
        self.push(Component::LifeCycle(lifecycle));
    }

    fn push(&self, component: Component) {
        let mut components = self.components.write().unwrap_or_else(|e| e.into_inner());
        components.push(component);

        #[cfg(feature = "logging")]
        debug!(
            target: "injector_bundle",
            managed_count = components.len(),
            "Added managed component"
        );
    }

    pub fn add_server_lifecycle_listener(&self, listener: Arc<dyn ServerLifecycleListener>) {
        self.listeners
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(listener);
    }

    /// Number of managed objects and lifecycle components
    pub fn managed_count(&self) -> usize {
        self.components.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn snapshot(&self) -> Vec<Component> {
        self.components.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Start every component in registration order, stopping at the first failure.
    pub fn start_all(&self) -> Result<(), HostError> {
        for (index, component) in self.snapshot().iter().enumerate() {
            component.start().map_err(|e| HostError::Lifecycle {
                component: component.label(index),
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }

    /// Stop every component in reverse registration order.
    ///
    /// Every component is asked to stop; the first failure is returned.
    pub fn stop_all(&self) -> Result<(), HostError> {
        let mut first_error = None;

        for (index, component) in self.snapshot().iter().enumerate().rev() {
            if let Err(e) = component.stop() {
                #[cfg(feature = "logging")]
                warn!(
                    target: "injector_bundle",
                    component = %component.label(index),
                    error = %e,
                    "Managed component failed to stop"
                );

                first_error.get_or_insert(HostError::Lifecycle {
                    component: component.label(index),
                    reason: e.to_string(),
                });
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    /// Tell every listener that the server is up.
    pub fn notify_server_started(&self, server: &ServerInfo) {
        let listeners = self.listeners.read().unwrap_or_else(|e| e.into_inner()).clone();
        for listener in listeners {
            listener.server_started(server);
        }
    }
}

impl std::fmt::Debug for LifecycleEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleEnvironment")
            .field("managed", &self.managed_count())
            .field("listeners", &self.listener_count())
            .finish()
    }
}
