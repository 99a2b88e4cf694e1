//! The `runserver` management command.
//!
//! Serves the configured tree over HTTP on a configurable host and port.

use std::sync::Arc;

use async_trait::async_trait;
use mptt_urls_core::MpttResult;
use mptt_urls_views::url_mptt;

use crate::command::ManagementCommand;
use crate::project::Project;

/// Starts the development server.
///
/// By default, the server binds to `127.0.0.1:8000`. The address and port
/// can be configured via the `--host` and `--port` options.
pub struct RunserverCommand;

/// Returns the bind address selected by `matches`.
fn bind_address(matches: &clap::ArgMatches) -> String {
    let host = matches
        .get_one::<String>("host")
        .map_or("127.0.0.1", String::as_str);
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8000);
    format!("{host}:{port}")
}

/// Builds the router the server would run.
pub fn build_router(project: &Project) -> MpttResult<axum::Router> {
    let store = project.open_store(None)?;
    let resolver = Arc::new(project.resolver(Arc::new(store))?);
    Ok(url_mptt(&project.settings().url_prefix, resolver))
}

#[async_trait]
impl ManagementCommand for RunserverCommand {
    fn name(&self) -> &'static str {
        "runserver"
    }

    fn help(&self) -> &'static str {
        "Serve the tree over HTTP"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("host")
                .long("host")
                .default_value("127.0.0.1")
                .help("Host to bind to"),
        )
        .arg(
            clap::Arg::new("port")
                .long("port")
                .default_value("8000")
                .value_parser(clap::value_parser!(u16))
                .help("Port to bind to"),
        )
    }

    async fn handle(&self, matches: &clap::ArgMatches, project: &Project) -> MpttResult<()> {
        let addr = bind_address(matches);
        let router = build_router(project)?;

        tracing::info!(
            prefix = %project.settings().url_prefix,
            debug = project.settings().debug,
            "Starting development server at http://{addr}/"
        );
        mptt_urls_views::run(router, &addr).await
    }
}
