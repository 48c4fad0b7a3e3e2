//! Yarn storefront library.
//!
//! The ordering API behind the Yarn Uniforms storefront: the session cart,
//! checkout into the remote document store and order tracking. Exposed as a
//! library so the binary, the CLI and the integration tests share it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support {
    use std::net::{IpAddr, Ipv4Addr};

    use secrecy::SecretString;

    use crate::config::{BackendConfig, StorefrontConfig};

    /// Configuration pointing at an unreachable local backend.
    pub fn config() -> StorefrontConfig {
        StorefrontConfig {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            session_secret: SecretString::from("k3Jx9!pQ2#vL7@wR4$mN8^tB1&zY6*hC"),
            backend: BackendConfig {
                base_url: "http://127.0.0.1:9/v1".to_string(),
                project_id: "yarn-test".to_string(),
                api_key: SecretString::from("test-api-key"),
                orders_collection: "orders".to_string(),
            },
            email: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }
}
