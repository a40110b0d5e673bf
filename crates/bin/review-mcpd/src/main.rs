//! Daemon entry point for the GitLab review MCP server.
//!
//! Loads configuration from flags and the environment, builds the GitLab
//! client, and serves the MCP protocol over stdio and/or streamable HTTP.

mod config;

use review_core::control::ReviewControlPlane;
use review_core::gitlab::GitlabClient;
use review_mcp::server::{serve_stdio, serve_streamable_http};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::config::ReviewConfig;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = ReviewConfig::from_args()?;

    tracing_subscriber::fmt()
        .with_env_filter(config.env_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!(
        gitlab = %config.gitlab.base_url,
        default_project = config.default_project.as_deref().unwrap_or("<none>"),
        stdio = config.enable_stdio,
        http = config.http_serve,
        "starting review-mcpd"
    );

    let client = GitlabClient::new(config.gitlab.clone())?;
    let control = ReviewControlPlane::new(client).with_default_project(config.default_project.clone());

    let http_task = config.http_serve.then(|| {
        let control = control.clone();
        let http = config.http.clone();
        tokio::spawn(async move {
            let result = serve_streamable_http(control, http).await;
            if let Err(err) = &result {
                error!("streamable HTTP server failed: {err}");
            }
            result
        })
    });

    run_transports(config.enable_stdio, http_task, serve_stdio(control)).await
}

/// Runs stdio when enabled; otherwise waits on the HTTP task and returns its
/// outcome.
async fn run_transports<S>(
    enable_stdio: bool,
    http_task: Option<JoinHandle<Result<(), BoxError>>>,
    stdio: S,
) -> Result<(), BoxError>
where
    S: Future<Output = Result<(), BoxError>>,
{
    if enable_stdio {
        stdio.await
    } else if let Some(task) = http_task {
        task.await?
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future;
    use std::net::TcpListener;

    use review_core::gitlab::GitlabConfig;
    use review_mcp::server::McpHttpServerConfig;

    fn control() -> ReviewControlPlane {
        let config = GitlabConfig::new("https://gitlab.example.com", "token").expect("config");
        ReviewControlPlane::new(GitlabClient::new(config).expect("client"))
    }

    #[tokio::test]
    async fn http_only_reports_server_failure() {
        let taken = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
        let addr = taken.local_addr().expect("local addr");
        let task = tokio::spawn(serve_streamable_http(control(), McpHttpServerConfig::new(addr)));

        let result = run_transports(false, Some(task), future::ready(Ok(()))).await;

        assert!(result.is_err(), "bind failure on {addr} should surface");
    }

    #[tokio::test]
    async fn stdio_outcome_wins_when_enabled() {
        let result = run_transports(true, None, future::ready(Err::<(), BoxError>("closed".into()))).await;

        assert_eq!(result.expect_err("stdio error").to_string(), "closed");
    }
}
