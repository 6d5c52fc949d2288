//! Command-line and environment configuration for the server binary.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::auth::{Credentials, DEFAULT_PASSWORD, DEFAULT_TOKEN, DEFAULT_USERNAME};

/// In-memory todo API guarded by a static bearer token.
#[derive(Debug, Clone, Parser)]
#[command(name = "todo-server", author, version, about, long_about = None)]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 3001)]
    pub port: u16,

    /// Token accepted on `/items` and returned by `/login`
    #[arg(long, env = "TODO_TOKEN", default_value = DEFAULT_TOKEN, hide_env_values = true)]
    pub token: String,

    /// Username accepted by `/login`
    #[arg(long, env = "TODO_USERNAME", default_value = DEFAULT_USERNAME)]
    pub username: String,

    /// Password accepted by `/login`
    #[arg(long, env = "TODO_PASSWORD", default_value = DEFAULT_PASSWORD, hide_env_values = true)]
    pub password: String,

    /// Default log filter; `RUST_LOG` takes precedence when set
    #[arg(long, env = "TODO_LOG", default_value = "info")]
    pub log_level: String,
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            username: self.username.clone(),
            password: self.password.clone(),
            token: self.token.clone(),
        }
    }

    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.log_level))
    }
}
