//! Error types for the bundle, the DI context and the host registries

use thiserror::Error;

/// Errors raised by the [`ApplicationContext`](crate::ApplicationContext)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiError {
    /// No bean registered under the requested name
    #[error("No bean named '{name}' is defined")]
    NotFound { name: String },

    /// No bean can be viewed as the requested type
    #[error("No bean of type {type_name} is defined")]
    NoBeanOfType { type_name: &'static str },

    /// More than one bean matches a single-bean lookup
    #[error("Expected a single bean of type {type_name} but found {}: {candidates:?}", candidates.len())]
    Ambiguous {
        type_name: &'static str,
        candidates: Vec<String>,
    },

    /// The named bean exists but holds a different type
    #[error("Bean '{name}' is of type {actual}, not {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Circular dependency detected during creation
    #[error("Circular dependency detected while creating bean '{name}'")]
    CircularDependency { name: String },

    /// A bean factory failed
    #[error("Failed to create bean '{name}': {reason}")]
    CreationFailed { name: String, reason: String },

    /// Attempted to register a second bean under the same name
    #[error("Bean already registered: {name}")]
    AlreadyRegistered { name: String },

    /// The context is active and does not accept new beans
    #[error("Context is active - cannot register new beans")]
    Locked,

    /// `refresh` was called on an already active context
    #[error("Context has already been refreshed")]
    AlreadyActive,

    /// A `${...}` placeholder has no value and no default
    #[error("Could not resolve placeholder '{key}' in value \"{text}\"")]
    UnresolvablePlaceholder { key: String, text: String },
}

impl DiError {
    /// Create a NotFound error for a bean name
    #[inline]
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Create a CreationFailed error
    #[inline]
    pub fn creation_failed(name: impl Into<String>, reason: impl ToString) -> Self {
        Self::CreationFailed {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an AlreadyRegistered error
    #[inline]
    pub fn already_registered(name: impl Into<String>) -> Self {
        Self::AlreadyRegistered { name: name.into() }
    }

    /// Create a CircularDependency error
    #[inline]
    pub fn circular(name: impl Into<String>) -> Self {
        Self::CircularDependency { name: name.into() }
    }

    /// Create a NoBeanOfType error for a type
    #[inline]
    pub fn no_bean_of_type<T: ?Sized + 'static>() -> Self {
        Self::NoBeanOfType {
            type_name: std::any::type_name::<T>(),
        }
    }
}

/// Errors raised by the host registries
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("A health check named {name} already exists")]
    DuplicateHealthCheck { name: String },

    #[error("A task named {name} already exists")]
    DuplicateTask { name: String },

    #[error("No task named {name}")]
    UnknownTask { name: String },

    #[error("Task {name} failed: {reason}")]
    TaskFailed { name: String, reason: String },

    /// A managed object failed to start or stop
    #[error("Lifecycle component {component} failed: {reason}")]
    Lifecycle { component: String, reason: String },
}

/// Errors surfaced by [`ContextBundle::run`](crate::ContextBundle::run)
///
/// Every kind except `InvalidArgument` is forwarded from its origin unchanged.
#[derive(Error, Debug)]
pub enum BundleError {
    /// The configuration could not be converted to a property tree
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// The bundle was asked to register beans on an active context
    #[error("{0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Container(#[from] DiError),

    #[error(transparent)]
    Host(#[from] HostError),
}

/// Boxed error returned by user supplied lifecycle components and tasks
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type alias for DI operations
pub type Result<T> = std::result::Result<T, DiError>;
