use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};

pub trait ContextProvider<Config> {
    fn new(config: Config) -> impl Future<Output = Self>;
}

/// Initialize the application context with configuration from environment variables.
/// The configuration starts from `Config::default()` and every field can be
/// overridden by the environment variable of the same name, upper-cased.
///
/// # Returns
/// The application context with the configuration as specified by the trait.
///
/// # Errors
/// If an environment variable cannot be converted to the type of the field it
/// overrides.
///
pub async fn create_app_context<A, Config>() -> Result<A, figment::Error>
where
    A: ContextProvider<Config>,
    Config: Serialize + for<'de> Deserialize<'de> + Default,
{
    init_tracing();

    let config: Config = load_config()?;

    tracing::debug!("configuration loaded");

    let context = A::new(config).await;

    Ok(context)
}

/// Extract the configuration without touching the global subscriber.
///
/// # Errors
/// If an environment variable cannot be converted to the type of the field it
/// overrides.
pub fn load_config<Config>() -> Result<Config, figment::Error>
where
    Config: Serialize + for<'de> Deserialize<'de> + Default,
{
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Env::raw())
        .extract()
}

fn init_tracing() {
    // `try_init` so that a second context in the same process (tests, the
    // CLI running several commands) does not panic.
    let _ = tracing_subscriber::fmt()
        .json()
        // allow log level to be overridden by RUST_LOG env var
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        // this needs to be set to remove duplicated information in the log.
        .with_current_span(false)
        // remove the name of the function from every log entry
        .with_target(false)
        .try_init();
}
