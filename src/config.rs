// Copyright (C) 2025 Kevin Exton
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
use crate::tracer::trace_enabled;
use tracing::info;

pub const DEFAULT_PORT: &str = "8080";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_SCYLLA_URI: &str = "127.0.0.1:9042";
pub const TRACE_ENV: &str = "WRAP_BUFFER_TRACE_ENABLE";

pub const KEYSPACE: &str = "demo";
pub const REPLICATION_FACTOR: u32 = 1;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: String,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub server: ServerConfig,
    pub scylla_uri: String,
    pub keyspace: String,
    pub replication_factor: u32,
    pub trace_enabled: bool,
}

impl Settings {
    /// Reads the settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the settings from an arbitrary key lookup. Empty values are
    /// treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let port = match non_empty("PORT") {
            Some(port) => {
                info!(%port, "PORT set");
                port
            }
            None => {
                info!("PORT not set, using {}", DEFAULT_PORT);
                DEFAULT_PORT.to_string()
            }
        };
        let host = match non_empty("HOST") {
            Some(host) => {
                info!(%host, "HOST set");
                host
            }
            None => {
                info!("HOST not set, binding all interfaces");
                DEFAULT_HOST.to_string()
            }
        };
        let scylla_uri = non_empty("SCYLLA_URI").unwrap_or_else(|| DEFAULT_SCYLLA_URI.to_string());
        let trace_enabled = trace_enabled(lookup(TRACE_ENV).as_deref());

        Settings {
            server: ServerConfig { host, port },
            scylla_uri,
            keyspace: KEYSPACE.to_string(),
            replication_factor: REPLICATION_FACTOR,
            trace_enabled,
        }
    }
}
