//! The context bundle
//!
//! [`ContextBundle`] connects an [`ApplicationContext`] to a host
//! [`Environment`]. On `run` it binds the configuration, environment and
//! mapper as named beans, installs the configuration's property projection
//! ahead of every other property source, refreshes the context and hands each
//! capability bean to the host registry that runs it.

use crate::host::{
    Binder, ContainerResponseFilter, Environment, HealthCheck, JerseyComponent, LifeCycle, Managed,
    ServerLifecycleListener, Task,
};
use crate::{ApplicationContext, BoxError, BundleError, ConfigurationPropertySource, Marker};
use serde::Serialize;
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::{debug, info};

/// Default bean name of the configuration
pub const DEFAULT_CONFIGURATION_BEAN_NAME: &str = "dw";
/// Default bean name of the host environment
pub const DEFAULT_ENVIRONMENT_BEAN_NAME: &str = "dwEnv";
/// Default bean name of the host JSON mapper
pub const DEFAULT_OBJECT_MAPPER_BEAN_NAME: &str = "dwObjectMapper";

const ACTIVE_CONTEXT_MESSAGE: &str =
    "Context must be not active in order to register configuration, environment, or objectmapper";

/// Stops the context when the host stops its managed objects.
struct ContextStopper {
    context: ApplicationContext,
}

impl Managed for ContextStopper {
    fn stop(&self) -> Result<(), BoxError> {
        #[cfg(feature = "logging")]
        debug!(target: "injector_bundle", "Stopping application context");

        self.context.stop();
        Ok(())
    }
}

/// Wires an application context into a host environment.
///
/// # Examples
///
/// ```rust
/// use injector_bundle::host::Environment;
/// use injector_bundle::{ApplicationContext, ContextBundle, ObjectMapper};
/// use serde::Serialize;
/// use std::sync::Arc;
///
/// #[derive(Serialize)]
/// struct HelloConfiguration {
///     template: String,
/// }
///
/// let context = ApplicationContext::new();
/// let bundle = ContextBundle::new(context.clone());
/// let environment = Environment::new("hello", ObjectMapper::new());
///
/// let configuration = Arc::new(HelloConfiguration { template: "Hello, %s!".into() });
/// bundle.run(configuration, &environment).unwrap();
///
/// assert!(context.is_active());
/// assert_eq!(context.get_property("template").as_deref(), Some("Hello, %s!"));
/// assert!(context.get::<HelloConfiguration>("dw").is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ContextBundle {
    context: ApplicationContext,
    register_configuration: bool,
    register_environment: bool,
    register_object_mapper: bool,
    configuration_bean_name: String,
    environment_bean_name: String,
    object_mapper_bean_name: String,
}

impl ContextBundle {
    /// A bundle registering all three host beans under their default names.
    pub fn new(context: ApplicationContext) -> Self {
        Self {
            context,
            register_configuration: true,
            register_environment: true,
            register_object_mapper: true,
            configuration_bean_name: DEFAULT_CONFIGURATION_BEAN_NAME.to_string(),
            environment_bean_name: DEFAULT_ENVIRONMENT_BEAN_NAME.to_string(),
            object_mapper_bean_name: DEFAULT_OBJECT_MAPPER_BEAN_NAME.to_string(),
        }
    }

    /// Bind the configuration and install its property projection.
    pub fn register_configuration(mut self, register: bool) -> Self {
        self.register_configuration = register;
        self
    }

    pub fn register_environment(mut self, register: bool) -> Self {
        self.register_environment = register;
        self
    }

    pub fn register_object_mapper(mut self, register: bool) -> Self {
        self.register_object_mapper = register;
        self
    }

    pub fn with_configuration_bean_name(mut self, name: impl Into<String>) -> Self {
        self.configuration_bean_name = name.into();
        self
    }

    pub fn with_environment_bean_name(mut self, name: impl Into<String>) -> Self {
        self.environment_bean_name = name.into();
        self
    }

    pub fn with_object_mapper_bean_name(mut self, name: impl Into<String>) -> Self {
        self.object_mapper_bean_name = name.into();
        self
    }

    pub fn context(&self) -> &ApplicationContext {
        &self.context
    }

    pub fn configuration_bean_name(&self) -> &str {
        &self.configuration_bean_name
    }

    pub fn environment_bean_name(&self) -> &str {
        &self.environment_bean_name
    }

    pub fn object_mapper_bean_name(&self) -> &str {
        &self.object_mapper_bean_name
    }

    fn registers_anything(&self) -> bool {
        self.register_configuration || self.register_environment || self.register_object_mapper
    }

    /// Bootstrap hook of the host bundle lifecycle. Nothing happens before `run`.
    pub fn initialize(&self) {}

    /// Wire the context into `environment`.
    ///
    /// Fails with [`BundleError::InvalidArgument`] before touching anything if
    /// a registration is enabled and the context is already active. Later
    /// failures are forwarded as they come and are not rolled back.
    pub fn run<C>(&self, configuration: Arc<C>, environment: &Environment) -> Result<(), BundleError>
    where
        C: Serialize + Send + Sync + 'static,
    {
        if self.registers_anything() && self.context.is_active() {
            return Err(BundleError::InvalidArgument(ACTIVE_CONTEXT_MESSAGE.to_string()));
        }

        self.register_host_beans(configuration, environment)?;

        if !self.context.is_active() {
            self.context.refresh()?;
        }

        self.harvest(environment)?;

        environment.lifecycle().manage(Arc::new(ContextStopper {
            context: self.context.clone(),
        }));

        #[cfg(feature = "logging")]
        info!(
            target: "injector_bundle",
            application = environment.name(),
            bean_count = self.context.len(),
            "Application context wired into environment"
        );

        Ok(())
    }

    fn register_host_beans<C>(&self, configuration: Arc<C>, environment: &Environment) -> Result<(), BundleError>
    where
        C: Serialize + Send + Sync + 'static,
    {
        if self.register_configuration {
            let projection = ConfigurationPropertySource::new(&*configuration, environment.object_mapper())?;

            #[cfg(feature = "logging")]
            debug!(
                target: "injector_bundle",
                bean = %self.configuration_bean_name,
                property_count = projection.len(),
                "Registering configuration"
            );

            self.context
                .register_singleton_arc(self.configuration_bean_name.clone(), configuration)?;
            self.context.property_sources().add_first(Arc::new(projection));
        }

        if self.register_environment {
            self.context
                .register_singleton(self.environment_bean_name.clone(), environment.clone())?;
        }

        if self.register_object_mapper {
            self.context.register_singleton(
                self.object_mapper_bean_name.clone(),
                environment.object_mapper().clone(),
            )?;
        }

        Ok(())
    }

    fn harvest(&self, environment: &Environment) -> Result<(), BundleError> {
        let context = &self.context;

        for managed in context.beans_of_type::<dyn Managed>()? {
            #[cfg(feature = "logging")]
            info!(target: "injector_bundle", bean = %managed.name, "Registering managed object");
            environment.lifecycle().manage(managed.bean);
        }

        for lifecycle in context.beans_of_type::<dyn LifeCycle>()? {
            if lifecycle.name == self.environment_bean_name {
                continue;
            }
            #[cfg(feature = "logging")]
            info!(target: "injector_bundle", bean = %lifecycle.name, "Registering lifecycle component");
            environment.lifecycle().manage_lifecycle(lifecycle.bean);
        }

        for listener in context.beans_of_type::<dyn ServerLifecycleListener>()? {
            if listener.name == self.environment_bean_name {
                continue;
            }
            #[cfg(feature = "logging")]
            info!(target: "injector_bundle", bean = %listener.name, "Registering server lifecycle listener");
            environment.lifecycle().add_server_lifecycle_listener(listener.bean);
        }

        for task in context.beans_of_type::<dyn Task>()? {
            #[cfg(feature = "logging")]
            info!(target: "injector_bundle", bean = %task.name, task = task.bean.name(), "Registering task");
            environment.admin().add_task(task.bean)?;
        }

        for check in context.beans_of_type::<dyn HealthCheck>()? {
            #[cfg(feature = "logging")]
            info!(target: "injector_bundle", bean = %check.name, health_check = check.type_name, "Registering health check");
            environment.health_checks().register(check.type_name, check.bean)?;
        }

        for binder in context.beans_of_type::<dyn Binder>()? {
            #[cfg(feature = "logging")]
            info!(target: "injector_bundle", bean = %binder.name, "Registering binder");
            environment
                .jersey()
                .resource_config()
                .register(JerseyComponent::Binder(binder.bean));
        }

        for provider in context.beans_with_marker(Marker::HttpProvider)? {
            #[cfg(feature = "logging")]
            info!(target: "injector_bundle", bean = %provider.name, "Registering provider");
            environment.jersey().register(provider);
        }

        for filter in context.beans_of_type::<dyn ContainerResponseFilter>()? {
            #[cfg(feature = "logging")]
            info!(target: "injector_bundle", bean = %filter.name, "Registering response filter");
            environment
                .jersey()
                .resource_config()
                .register(JerseyComponent::ResponseFilter(filter.bean));
        }

        for resource in context.beans_with_marker(Marker::HttpResource)? {
            #[cfg(feature = "logging")]
            info!(target: "injector_bundle", bean = %resource.name, "Registering resource");
            environment.jersey().register(resource);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{
        Bindings, HealthResult, ResponseContext, ServerInfo, TaskParameters,
    };
    use crate::{BeanDefinition, DiError, HostError, MapPropertySource, ObjectMapper};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Serialize)]
    struct TestConfiguration {
        test: Section,
    }

    #[derive(Serialize)]
    struct Section {
        first: String,
        second: Vec<String>,
        third: u32,
    }

    fn configuration() -> Arc<TestConfiguration> {
        Arc::new(TestConfiguration {
            test: Section {
                first: "test1".into(),
                second: vec!["test2".into(), "test3".into()],
                third: 4,
            },
        })
    }

    fn environment() -> Environment {
        Environment::new("test", ObjectMapper::new())
    }

    struct Clock;
    impl Managed for Clock {}

    struct Pool(AtomicBool);

    impl LifeCycle for Pool {
        fn start(&self) -> Result<(), BoxError> {
            self.0.store(true, Ordering::SeqCst);
            Ok(())
        }

        fn stop(&self) -> Result<(), BoxError> {
            self.0.store(false, Ordering::SeqCst);
            Ok(())
        }

        fn is_running(&self) -> bool {
            self.0.load(Ordering::SeqCst)
        }
    }

    struct Announcer(Mutex<Option<u16>>);

    impl ServerLifecycleListener for Announcer {
        fn server_started(&self, server: &ServerInfo) {
            *self.0.lock().unwrap() = Some(server.application_port);
        }
    }

    struct Flush;

    impl Task for Flush {
        fn name(&self) -> &str {
            "flush"
        }

        fn execute(&self, _: &TaskParameters, output: &mut String) -> Result<(), BoxError> {
            output.push_str("flushed");
            Ok(())
        }
    }

    struct DatabaseCheck;

    impl HealthCheck for DatabaseCheck {
        fn check(&self) -> HealthResult {
            HealthResult::healthy()
        }
    }

    struct Greeting(String);

    struct GreetingBinder;

    impl Binder for GreetingBinder {
        fn configure(&self, bindings: &mut Bindings) {
            bindings.bind(Arc::new(Greeting("hi".into())));
        }
    }

    struct PoweredBy;

    impl ContainerResponseFilter for PoweredBy {
        fn filter(&self, response: &mut ResponseContext) {
            response.set_header("x-powered-by", "injector-bundle");
        }
    }

    struct JsonProvider;
    struct HelloResource;

    #[test]
    fn test_registers_host_beans_and_projection() {
        let context = ApplicationContext::new();
        let environment = environment();
        let configuration = configuration();

        ContextBundle::new(context.clone())
            .run(configuration.clone(), &environment)
            .unwrap();

        let bound = context.get::<TestConfiguration>("dw").unwrap();
        assert!(Arc::ptr_eq(&bound, &configuration));
        assert_eq!(context.get::<Environment>("dwEnv").unwrap().name(), "test");
        assert!(context.get::<ObjectMapper>("dwObjectMapper").is_ok());

        assert_eq!(context.get_property("test.first").as_deref(), Some("test1"));
        assert_eq!(context.get_property("test.second").as_deref(), Some("test2,test3"));
        assert_eq!(context.get_property("test.second[1]").as_deref(), Some("test3"));
        assert_eq!(context.get_property("test.third").as_deref(), Some("4"));
        assert!(context.is_active());
        assert!(context.is_running());
    }

    #[test]
    fn test_projection_shadows_existing_sources() {
        let context = ApplicationContext::new();
        context.property_sources().add_first(Arc::new(MapPropertySource::from_pairs(
            "defaults",
            [("test.first", "default"), ("only.here", "yes")],
        )));

        ContextBundle::new(context.clone())
            .run(configuration(), &environment())
            .unwrap();

        assert_eq!(
            context.property_sources().names(),
            vec!["dwConfigurationPropertySource", "defaults"]
        );
        assert_eq!(context.get_property("test.first").as_deref(), Some("test1"));
        assert_eq!(context.get_property("only.here").as_deref(), Some("yes"));
    }

    #[test]
    fn test_custom_bean_names() {
        let context = ApplicationContext::new();
        let bundle = ContextBundle::new(context.clone())
            .with_configuration_bean_name("config")
            .with_environment_bean_name("env")
            .with_object_mapper_bean_name("mapper");

        bundle.run(configuration(), &environment()).unwrap();

        assert_eq!(context.bean_names(), vec!["config", "env", "mapper"]);
        assert_eq!(bundle.configuration_bean_name(), "config");
    }

    #[test]
    fn test_disabled_registrations() {
        let context = ApplicationContext::new();
        ContextBundle::new(context.clone())
            .register_configuration(false)
            .register_environment(false)
            .register_object_mapper(false)
            .run(configuration(), &environment())
            .unwrap();

        assert!(context.is_empty());
        assert!(context.property_sources().is_empty());
        assert!(context.is_active());
    }

    #[test]
    fn test_active_context_rejected_before_side_effects() {
        for flag in 0..3 {
            let context = ApplicationContext::new();
            context.refresh().unwrap();
            let environment = environment();

            let bundle = ContextBundle::new(context.clone())
                .register_configuration(flag == 0)
                .register_environment(flag == 1)
                .register_object_mapper(flag == 2);

            let err = bundle.run(configuration(), &environment).unwrap_err();
            match err {
                BundleError::InvalidArgument(message) => assert_eq!(message, ACTIVE_CONTEXT_MESSAGE),
                other => panic!("expected invalid argument, got {other}"),
            }

            assert!(context.is_empty());
            assert!(context.property_sources().is_empty());
            assert_eq!(environment.lifecycle().managed_count(), 0);
        }
    }

    #[test]
    fn test_active_context_without_registrations_is_harvested() {
        let context = ApplicationContext::new();
        context
            .register(BeanDefinition::singleton("clock", Clock).managed())
            .unwrap();
        context.refresh().unwrap();
        let environment = environment();

        ContextBundle::new(context.clone())
            .register_configuration(false)
            .register_environment(false)
            .register_object_mapper(false)
            .run(configuration(), &environment)
            .unwrap();

        // the clock plus the shutdown hook
        assert_eq!(environment.lifecycle().managed_count(), 2);
    }

    #[test]
    fn test_serialization_failure_has_no_side_effects() {
        let context = ApplicationContext::new();
        let environment = environment();

        let err = ContextBundle::new(context.clone())
            .run(Arc::new(vec![1, 2, 3]), &environment)
            .unwrap_err();

        assert!(matches!(err, BundleError::Serialization(_)));
        assert!(context.is_empty());
        assert!(!context.is_active());
    }

    #[test]
    fn test_container_errors_forwarded() {
        let context = ApplicationContext::new();
        context.register_singleton("dw", 0u8).unwrap();

        let err = ContextBundle::new(context)
            .run(configuration(), &environment())
            .unwrap_err();
        assert!(matches!(err, BundleError::Container(DiError::AlreadyRegistered { .. })));
    }

    #[test]
    fn test_harvests_every_capability() {
        let context = ApplicationContext::new();
        let pool = Arc::new(Pool(AtomicBool::new(false)));
        let announcer = Arc::new(Announcer(Mutex::new(None)));

        context.register(BeanDefinition::singleton("clock", Clock).managed()).unwrap();
        context
            .register(BeanDefinition::singleton_arc("pool", pool.clone()).lifecycle())
            .unwrap();
        context
            .register(BeanDefinition::singleton_arc("announcer", announcer.clone()).server_lifecycle_listener())
            .unwrap();
        context.register(BeanDefinition::lazy("flush", |_| Ok(Flush)).task()).unwrap();
        context
            .register(BeanDefinition::singleton("databaseCheck", DatabaseCheck).health_check())
            .unwrap();
        context
            .register(BeanDefinition::singleton("greetingBinder", GreetingBinder).binder())
            .unwrap();
        context
            .register(BeanDefinition::singleton("json", JsonProvider).http_provider())
            .unwrap();
        context
            .register(BeanDefinition::singleton("poweredBy", PoweredBy).response_filter())
            .unwrap();
        context
            .register(BeanDefinition::singleton("hello", HelloResource).http_resource())
            .unwrap();

        let environment = environment();
        ContextBundle::new(context.clone())
            .run(configuration(), &environment)
            .unwrap();

        // clock, pool, then the shutdown hook
        assert_eq!(environment.lifecycle().managed_count(), 3);
        environment.lifecycle().start_all().unwrap();
        assert!(pool.is_running());

        environment.lifecycle().notify_server_started(&ServerInfo {
            name: "test".into(),
            application_port: 8080,
            admin_port: 8081,
        });
        assert_eq!(*announcer.0.lock().unwrap(), Some(8080));

        assert_eq!(
            environment.admin().execute("flush", &TaskParameters::new()).unwrap(),
            "flushed"
        );

        let checks = environment.health_checks().names();
        assert_eq!(checks, vec![std::any::type_name::<DatabaseCheck>().to_string()]);

        assert_eq!(environment.jersey().configure_binders().get::<Greeting>().unwrap().0, "hi");
        let mut response = ResponseContext::new(200);
        environment.jersey().apply_response_filters(&mut response);
        assert_eq!(response.header("x-powered-by"), Some("injector-bundle"));

        assert_eq!(environment.jersey().registered_names(), vec!["json", "hello"]);
    }

    #[test]
    fn test_host_errors_forwarded() {
        let context = ApplicationContext::new();
        context.register(BeanDefinition::singleton("flush", Flush).task()).unwrap();
        let environment = environment();
        environment.admin().add_task(Arc::new(Flush)).unwrap();

        let err = ContextBundle::new(context)
            .run(configuration(), &environment)
            .unwrap_err();
        assert!(matches!(err, BundleError::Host(HostError::DuplicateTask { .. })));
    }

    #[test]
    fn test_environment_bean_is_not_self_managed() {
        struct HostRuntime;

        impl LifeCycle for HostRuntime {
            fn start(&self) -> Result<(), BoxError> {
                Ok(())
            }

            fn stop(&self) -> Result<(), BoxError> {
                Ok(())
            }

            fn is_running(&self) -> bool {
                true
            }
        }

        let context = ApplicationContext::new();
        context
            .register(BeanDefinition::singleton("runtime", HostRuntime).lifecycle())
            .unwrap();
        let environment = environment();

        ContextBundle::new(context)
            .register_environment(false)
            .with_environment_bean_name("runtime")
            .run(configuration(), &environment)
            .unwrap();

        // only the shutdown hook
        assert_eq!(environment.lifecycle().managed_count(), 1);
    }

    #[test]
    fn test_environment_bean_is_not_a_listener() {
        let context = ApplicationContext::new();
        context
            .register(
                BeanDefinition::singleton("runtime", Announcer(Mutex::new(None))).server_lifecycle_listener(),
            )
            .unwrap();
        context
            .register(BeanDefinition::singleton("announcer", Announcer(Mutex::new(None))).server_lifecycle_listener())
            .unwrap();
        let environment = environment();

        ContextBundle::new(context)
            .register_environment(false)
            .with_environment_bean_name("runtime")
            .run(configuration(), &environment)
            .unwrap();

        assert_eq!(environment.lifecycle().listener_count(), 1);
    }

    #[test]
    fn test_providers_registered_before_resources() {
        let context = ApplicationContext::new();
        context
            .register(BeanDefinition::singleton("hello", HelloResource).http_resource())
            .unwrap();
        context
            .register(BeanDefinition::singleton("json", JsonProvider).http_provider())
            .unwrap();
        let environment = environment();

        ContextBundle::new(context)
            .run(configuration(), &environment)
            .unwrap();

        assert_eq!(environment.jersey().registered_names(), vec!["json", "hello"]);
    }

    #[test]
    fn test_shutdown_hook_stops_context() {
        let context = ApplicationContext::new();
        let environment = environment();
        let bundle = ContextBundle::new(context.clone());
        bundle.initialize();
        bundle.run(configuration(), &environment).unwrap();

        environment.lifecycle().start_all().unwrap();
        assert!(context.is_running());

        environment.lifecycle().stop_all().unwrap();
        assert!(!context.is_running());
    }
}
