//! A small service to poke at with curl.
//!
//! ```text
//! cargo run -p entangle-server --example greetings
//! curl -X POST localhost:8080/api/hello -d '[]'
//! curl -X POST localhost:8080/api/greetings -d '["Ada"]'
//! curl -X POST localhost:8080/api/greetings/fail -d '[]'
//! ```

use entangle_server::{
    procedure, serve, Args, Contexts, ErrorClass, RestError, ServeConfig, Service, ServiceBranch,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let contexts = Contexts::new();
    let grumpy = ErrorClass::with_status("GrumpyError", 418);

    let greet = {
        let contexts = contexts.clone();
        procedure(move |args: Args| {
            let contexts = contexts.clone();
            async move {
                let name: Option<String> = args.parse(0)?;
                let agent = contexts
                    .current()?
                    .header("user-agent")
                    .unwrap_or("someone")
                    .to_string();
                match name {
                    Some(name) => Ok(format!("Hello {}, from {}", name, agent)),
                    None => Err(RestError::bad_input("Who should I greet?").into()),
                }
            }
        })
        .with_params(["name"])
    };

    let fail = {
        let grumpy = grumpy.clone();
        procedure(move |_args: Args| {
            let grumpy = grumpy.clone();
            async move {
                Err::<(), _>(
                    grumpy
                        .create("Not before coffee")
                        .with_field("cups", 0i64)
                        .into(),
                )
            }
        })
    };

    let tree = ServiceBranch::new()
        .with("hello", procedure(|_args: Args| async { Ok("Hello World!") }))
        .with(
            "greetings",
            ServiceBranch::new()
                .with("default", greet)
                .with("fail", fail),
        )
        .with(
            "errors",
            ServiceBranch::new().error_type("GrumpyError", grumpy),
        );

    let service = Service::new(tree)?.with_contexts(contexts);
    println!("{}", serde_json::to_string_pretty(service.manifest())?);

    serve(service, ServeConfig::from_env()?).await?;
    Ok(())
}
