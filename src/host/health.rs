//! Health checks
//!
//! Each check reports whether one dependency of the service is usable. The
//! registry runs them all and reports results sorted by name.

use crate::HostError;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

#[cfg(feature = "logging")]
use tracing::{debug, warn};

/// Outcome of a single health check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthResult {
    healthy: bool,
    message: Option<String>,
}

impl HealthResult {
    pub fn healthy() -> Self {
        Self {
            healthy: true,
            message: None,
        }
    }

    pub fn healthy_with(message: impl Into<String>) -> Self {
        Self {
            healthy: true,
            message: Some(message.into()),
        }
    }

    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            healthy: false,
            message: Some(message.into()),
        }
    }

    #[inline]
    pub fn is_healthy(&self) -> bool {
        self.healthy
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// A check of one dependency.
pub trait HealthCheck: Send + Sync {
    fn check(&self) -> HealthResult;
}

/// Named health checks.
#[derive(Default)]
pub struct HealthCheckRegistry {
    checks: RwLock<BTreeMap<String, Arc<dyn HealthCheck>>>,
}

impl HealthCheckRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a check under `name`. Names are unique.
    pub fn register(&self, name: impl Into<String>, check: Arc<dyn HealthCheck>) -> Result<(), HostError> {
        let name = name.into();
        let mut checks = self.checks.write().unwrap_or_else(|e| e.into_inner());
        if checks.contains_key(&name) {
            return Err(HostError::DuplicateHealthCheck { name });
        }

        #[cfg(feature = "logging")]
        debug!(target: "injector_bundle", health_check = %name, "Registered health check");

        checks.insert(name, check);
        Ok(())
    }

    pub fn unregister(&self, name: &str) -> bool {
        self.checks
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(name)
            .is_some()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        self.checks
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect()
    }

    pub fn run_health_check(&self, name: &str) -> Option<HealthResult> {
        let check = self.checks.read().unwrap_or_else(|e| e.into_inner()).get(name).cloned()?;
        Some(check.check())
    }

    /// Run every check, keyed by name.
    pub fn run_health_checks(&self) -> BTreeMap<String, HealthResult> {
        let checks = self.checks.read().unwrap_or_else(|e| e.into_inner()).clone();

        checks
            .into_iter()
            .map(|(name, check)| {
                let result = check.check();

                #[cfg(feature = "logging")]
                if !result.is_healthy() {
                    warn!(
                        target: "injector_bundle",
                        health_check = %name,
                        message = result.message().unwrap_or_default(),
                        "Health check failed"
                    );
                }

                (name, result)
            })
            .collect()
    }
}

impl std::fmt::Debug for HealthCheckRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthCheckRegistry")
            .field("names", &self.names())
            .finish()
    }
}
