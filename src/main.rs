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
use std::io::{self, Write};
use std::sync::Arc;
use anyhow::{anyhow, Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
use config::Settings;

mod scylla_connector;
use scylla_connector::ScyllaManager;

mod http_server;
mod schema;
use schema::printer;

mod tracer;
use tracer::TraceContext;

mod users;
use users::UserDirectory;

#[tokio::main]
async fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env).init();

    let settings = Settings::from_env();
    let trace = TraceContext::new(settings.trace_enabled);
    info!(enabled = trace.is_enabled(), "request tracing");

    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let work_dir = http_server::prepare_work_dir(&cwd).await?;
    info!("Starting HTTP server on {}...", settings.server.bind_addr());
    let server = tokio::spawn(http_server::run_server(settings.server.clone(), work_dir));

    // Held until exit so the keyspace session stays open while the server runs.
    let _scylla_manager = run_demo(&settings, trace).await?;

    // The file server is the only long-lived task; the process ends when it does.
    server.await.context("HTTP server task panicked")??;
    info!("HTTP server stopped");
    Ok(())
}

async fn run_demo(settings: &Settings, trace: TraceContext) -> Result<Arc<ScyllaManager>> {
    let uris = [settings.scylla_uri.as_str()];
    info!("Attempting to connect to ScyllaDB at {}...", settings.scylla_uri);
    ScyllaManager::ensure_keyspace(
        &uris,
        &settings.keyspace,
        settings.replication_factor,
        &trace,
    )
    .await?;

    let scylla_manager = Arc::new(ScyllaManager::new(&uris, &settings.keyspace).await?);
    let users = UserDirectory::new(scylla_manager.clone(), trace).await?;

    let user = users.insert_sample().await?;
    let (firstname, age) = users.sample_first_name_and_age().await?;
    println!("{} {}", firstname, age);

    let found = users
        .find_sample()
        .await?
        .ok_or_else(|| anyhow!("User {} not found after insert", user.lastname))?;
    println!(
        "{} {} {} {} {}",
        found.firstname, found.lastname, found.age, found.email, found.city
    );

    let keyspace = schema::fetch_keyspace(&scylla_manager.session, &settings.keyspace).await?;
    println!("{}", printer::render_json(&keyspace)?);

    let mut out = io::stdout().lock();
    printer::print_keyspace(&mut out, &keyspace)?;
    out.flush()?;

    Ok(scylla_manager)
}
