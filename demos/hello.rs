//! A hello-world service wired through the context bundle
//!
//! Run with pretty logging:
//! ```bash
//! cargo run --example hello --features logging-pretty
//! ```
//!
//! Run with JSON logging:
//! ```bash
//! cargo run --example hello --features logging-json
//! ```

use injector_bundle::host::{
    ContainerResponseFilter, Environment, HealthCheck, HealthResult, ResponseContext, ServerInfo,
    ServerLifecycleListener, Task, TaskParameters,
};
use injector_bundle::{ApplicationContext, BeanDefinition, BoxError, ContextBundle, DiError, ObjectMapper};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const CONFIGURATION: &str = r#"{
    "template": "Hello, %s!",
    "defaultName": "Stranger",
    "server": {
        "applicationConnectors": [ { "type": "http", "port": 8080 } ],
        "adminConnectors": [ { "type": "http", "port": 8081 } ]
    }
}"#;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HelloConfiguration {
    template: String,
    default_name: String,
    server: serde_json::Value,
}

struct Greeter {
    template: String,
    default_name: String,
}

impl Greeter {
    fn greet(&self, name: Option<&str>) -> String {
        self.template.replace("%s", name.unwrap_or(&self.default_name))
    }
}

/// Resource served at `/hello-world`
struct HelloWorldResource {
    greeter: Arc<Greeter>,
}

struct TemplateCheck {
    greeter: Arc<Greeter>,
}

impl HealthCheck for TemplateCheck {
    fn check(&self) -> HealthResult {
        if self.greeter.greet(Some("test")).contains("test") {
            HealthResult::healthy()
        } else {
            HealthResult::unhealthy("template doesn't include a name")
        }
    }
}

struct GreetTask {
    greeter: Arc<Greeter>,
}

impl Task for GreetTask {
    fn name(&self) -> &str {
        "greet"
    }

    fn execute(&self, parameters: &TaskParameters, output: &mut String) -> Result<(), BoxError> {
        let name = parameters.get("name").and_then(|v| v.first()).map(String::as_str);
        output.push_str(&self.greeter.greet(name));
        Ok(())
    }
}

struct StartupBanner;

impl ServerLifecycleListener for StartupBanner {
    fn server_started(&self, server: &ServerInfo) {
        println!("  [App] {} listening on {}", server.name, server.application_port);
    }
}

struct ServedBy;

impl ContainerResponseFilter for ServedBy {
    fn filter(&self, response: &mut ResponseContext) {
        response.set_header("x-served-by", "hello");
    }
}

fn register_beans(context: &ApplicationContext) -> injector_bundle::Result<()> {
    context.register(BeanDefinition::lazy("greeter", |ctx| {
        Ok(Greeter {
            template: ctx.resolve_placeholders("${template}")?,
            default_name: ctx.resolve_placeholders("${defaultName:Stranger}")?,
        })
    }))?;

    context.register(
        BeanDefinition::lazy("helloWorldResource", |ctx| {
            Ok(HelloWorldResource {
                greeter: ctx.get("greeter")?,
            })
        })
        .http_resource(),
    )?;

    context.register(
        BeanDefinition::lazy("templateCheck", |ctx| {
            Ok(TemplateCheck {
                greeter: ctx.get("greeter")?,
            })
        })
        .health_check(),
    )?;

    context.register(
        BeanDefinition::lazy("greetTask", |ctx| {
            Ok(GreetTask {
                greeter: ctx.get("greeter")?,
            })
        })
        .task(),
    )?;

    context.register(BeanDefinition::singleton("startupBanner", StartupBanner).server_lifecycle_listener())?;
    context.register(BeanDefinition::singleton("servedBy", ServedBy).response_filter())?;

    Ok(())
}

fn main() -> Result<(), BoxError> {
    #[cfg(feature = "logging")]
    {
        injector_bundle::logging::init();
    }

    println!("=== Injector Bundle Hello Demo ===\n");

    let mapper = ObjectMapper::new();
    let configuration: HelloConfiguration = mapper.read_value(CONFIGURATION)?;
    let environment = Environment::new("hello-world", mapper);

    let context = ApplicationContext::new();
    register_beans(&context)?;

    let bundle = ContextBundle::new(context.clone());
    bundle.initialize();
    bundle.run(Arc::new(configuration), &environment)?;

    let port: u16 = context
        .resolve_placeholders("${server.applicationConnectors[0].port}")?
        .parse()
        .map_err(|e| DiError::creation_failed("server", e))?;
    let admin_port: u16 = context
        .resolve_placeholders("${server.adminConnectors[0].port}")?
        .parse()
        .map_err(|e| DiError::creation_failed("server", e))?;

    environment.lifecycle().start_all()?;
    environment.lifecycle().notify_server_started(&ServerInfo {
        name: environment.name().to_string(),
        application_port: port,
        admin_port,
    });

    let resources = environment.jersey().registered();
    for resource in &resources {
        if let Ok(hello) = Arc::clone(&resource.bean).downcast::<HelloWorldResource>() {
            let mut response = ResponseContext::new(200);
            environment.jersey().apply_response_filters(&mut response);
            println!(
                "  [GET /hello-world] {} ({:?})",
                hello.greeter.greet(None),
                response.headers
            );
        }
    }

    let mut parameters = TaskParameters::new();
    parameters.insert("name".into(), vec!["Ada".into()]);
    println!("  [POST /tasks/greet] {}", environment.admin().execute("greet", &parameters)?);

    for (name, result) in environment.health_checks().run_health_checks() {
        println!("  [healthcheck] {name}: healthy={}", result.is_healthy());
    }

    environment.lifecycle().stop_all()?;
    println!("\n  context running after shutdown: {}", context.is_running());

    Ok(())
}
