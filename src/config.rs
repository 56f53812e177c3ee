use std::env;

/// Runtime configuration, read from the environment. A missing provider key
/// disables that source without being treated as an error.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub prime_intellect_api_key: Option<String>,
    pub lambda_api_key: Option<String>,
    pub tensordock_api_key: Option<String>,
    pub runpod_api_key: Option<String>,
    pub vast_api_key: Option<String>,
    pub listen_addr: String,
    pub refresh_interval_seconds: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            prime_intellect_api_key: non_empty_var("PRIME_INTELLECT_API_KEY"),
            lambda_api_key: non_empty_var("LAMBDA_API_KEY"),
            tensordock_api_key: non_empty_var("TENSORDOCK_API_KEY"),
            runpod_api_key: non_empty_var("RUNPOD_API_KEY"),
            vast_api_key: non_empty_var("VAST_API_KEY"),
            listen_addr: env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into()),
            refresh_interval_seconds: env::var("REFRESH_INTERVAL_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
        }
    }

    /// Number of sources that will actually hit the network with this config.
    pub fn configured_source_count(&self) -> usize {
        [
            &self.prime_intellect_api_key,
            &self.lambda_api_key,
            &self.tensordock_api_key,
            &self.runpod_api_key,
            &self.vast_api_key,
        ]
        .iter()
        .filter(|k| k.is_some())
        .count()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
