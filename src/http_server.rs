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
use crate::config::ServerConfig;
use anyhow::{Context, Result};
use axum::Router;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

pub const WORK_DIR_NAME: &str = "work";

/// Creates `<base>/work` if needed and returns its path. An existing
/// directory is fine.
pub async fn prepare_work_dir(base: &Path) -> Result<PathBuf> {
    let work_dir = base.join(WORK_DIR_NAME);
    let mut builder = tokio::fs::DirBuilder::new();
    #[cfg(unix)]
    builder.mode(0o700);
    match builder.create(&work_dir).await {
        Ok(()) => info!(dir = %work_dir.display(), "created work directory"),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            info!(dir = %work_dir.display(), "work directory already exists")
        }
        Err(e) => {
            return Err(e).context(format!("Failed to create {}", work_dir.display()));
        }
    }
    Ok(work_dir)
}

fn router(work_dir: &Path) -> Router {
    Router::new()
        .fallback_service(ServeDir::new(work_dir))
        .layer(TraceLayer::new_for_http())
}

/// Serves `work_dir` at `/` on `config`'s address until the listener fails.
pub async fn run_server(config: ServerConfig, work_dir: PathBuf) -> Result<()> {
    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .context(format!("Failed to bind {}", addr))?;
    serve(listener, work_dir).await
}

async fn serve(listener: TcpListener, work_dir: PathBuf) -> Result<()> {
    info!(
        "HTTP server listening on {}, serving {}",
        listener.local_addr()?,
        work_dir.display()
    );
    axum::serve(listener, router(&work_dir).into_make_service()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    async fn get(addr: std::net::SocketAddr, path: &str) -> Result<String> {
        let mut stream = TcpStream::connect(addr).await?;
        let request = format!(
            "GET {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
            path
        );
        stream.write_all(request.as_bytes()).await?;
        let mut response = String::new();
        stream.read_to_string(&mut response).await?;
        Ok(response)
    }

    #[tokio::test]
    async fn test_prepare_work_dir_is_idempotent() -> Result<()> {
        let base = tempfile::tempdir()?;
        let first = prepare_work_dir(base.path()).await?;
        let second = prepare_work_dir(base.path()).await?;
        assert_eq!(first, base.path().join("work"));
        assert_eq!(first, second);
        assert!(first.is_dir());
        Ok(())
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_work_dir_is_private() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;
        let base = tempfile::tempdir()?;
        let work_dir = prepare_work_dir(base.path()).await?;
        let mode = std::fs::metadata(&work_dir)?.permissions().mode();
        // umask can only clear bits
        assert_eq!(mode & 0o077, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_prepare_work_dir_fails_when_base_is_missing() {
        let base = tempfile::tempdir().unwrap();
        let missing = base.path().join("does-not-exist");
        assert!(prepare_work_dir(&missing).await.is_err());
    }

    #[tokio::test]
    async fn test_serves_files_from_work_dir() -> Result<()> {
        let base = tempfile::tempdir()?;
        let work_dir = prepare_work_dir(base.path()).await?;
        std::fs::write(work_dir.join("hello.txt"), "hello from work")?;

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let server = tokio::spawn(serve(listener, work_dir));

        let found = get(addr, "/hello.txt").await?;
        assert!(found.starts_with("HTTP/1.1 200 OK"), "{found}");
        assert!(found.ends_with("hello from work"), "{found}");

        let missing = get(addr, "/nope.txt").await?;
        assert!(missing.starts_with("HTTP/1.1 404"), "{missing}");

        server.abort();
        Ok(())
    }

    #[tokio::test]
    async fn test_run_server_reports_bind_failure() -> Result<()> {
        let taken = TcpListener::bind("127.0.0.1:0").await?;
        let port = taken.local_addr()?.port().to_string();
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port,
        };
        let base = tempfile::tempdir()?;
        assert!(run_server(config, base.path().to_path_buf()).await.is_err());
        Ok(())
    }
}
