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
use crate::tracer::TraceContext;
use anyhow::{Context, Result};
use scylla::client::execution_profile::ExecutionProfile;
use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;
use scylla::statement::Consistency;
use std::sync::Arc;
use tracing::info;

/// Keyspace that exists on every node; used for administrative work.
const SYSTEM_KEYSPACE: &str = "system";

#[derive(Clone)]
pub struct ScyllaManager {
    pub session: Arc<Session>,
}

// Every statement runs at LOCAL_QUORUM so reads and writes stay in the local datacenter.
fn session_builder(uris: &[&str]) -> SessionBuilder {
    let profile = ExecutionProfile::builder()
        .consistency(Consistency::LocalQuorum)
        .build();
    SessionBuilder::new()
        .known_nodes(uris)
        .default_execution_profile_handle(profile.into_handle())
}

impl ScyllaManager {
    /// Creates the keyspace with `SimpleStrategy` if it does not exist yet.
    ///
    /// The administrative session only lives for the duration of this call.
    pub async fn ensure_keyspace(
        uris: &[&str],
        keyspace: &str,
        replication_factor: u32,
        trace: &TraceContext,
    ) -> Result<()> {
        let admin = session_builder(uris)
            .use_keyspace(SYSTEM_KEYSPACE, false)
            .build()
            .await
            .context(format!("Failed to connect to {:?}", uris))?;

        let statement = trace.statement(format!(
            "CREATE KEYSPACE IF NOT EXISTS {} WITH replication = {{'class': 'SimpleStrategy', 'replication_factor': {}}}",
            keyspace, replication_factor
        ));
        let result = admin
            .query_unpaged(statement, &[])
            .await
            .context(format!("Failed to create keyspace {}", keyspace))?;
        trace.report(&admin, "create keyspace", &result).await;

        info!(%keyspace, replication_factor, "keyspace ensured");
        Ok(())
    }

    /// Connects to the cluster and selects `keyspace` for the session.
    ///
    /// # Arguments
    /// * `uris` - ScyllaDB node addresses (e.g., `&["127.0.0.1:9042"]`).
    /// * `keyspace` - The keyspace to use; it must already exist.
    pub async fn new(uris: &[&str], keyspace: &str) -> Result<Self> {
        let session = session_builder(uris)
            .build()
            .await
            .context(format!("Failed to connect to {:?}", uris))?;

        session
            .use_keyspace(keyspace, false)
            .await
            .context(format!("Failed to use keyspace {}", keyspace))?;
        info!(%keyspace, "connected to ScyllaDB");
        Ok(ScyllaManager { session: Arc::new(session) })
    }
}
