//! The `resolve` management command.
//!
//! Resolves one path against the configured database and prints what a
//! browser would receive, without starting a server.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use mptt_urls_core::{MpttError, MpttResult};
use mptt_urls_http::{HttpRequest, HttpResponse};
use mptt_urls_tree::{absolute_url, TreeStore};

use crate::command::ManagementCommand;
use crate::project::Project;

/// Resolves a tree path and prints the response.
pub struct ResolveCommand;

/// Resolves `path` (relative to the configured URL prefix) over `store`.
///
/// A query string after `?` is passed through to the request.
pub fn resolve_path(
    project: &Project,
    store: Arc<dyn TreeStore>,
    path: &str,
) -> MpttResult<HttpResponse> {
    let resolver = project.resolver(store)?;
    let (path, query) = path.split_once('?').unwrap_or((path, ""));
    let url = absolute_url(resolver.prefix(), path.trim_start_matches('/'));
    let request = HttpRequest::builder()
        .path(&url)
        .query_string(query)
        .meta("SERVER_NAME", "localhost")
        .build();
    tracing::debug!(url = %url, "resolving from the command line");
    resolver.handle(&request)
}

#[async_trait]
impl ManagementCommand for ResolveCommand {
    fn name(&self) -> &'static str {
        "resolve"
    }

    fn help(&self) -> &'static str {
        "Resolve a tree path and print the response"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("path")
                .required(true)
                .value_name("PATH")
                .help("Path below the URL prefix, e.g. level1/level2/photo1"),
        )
        .arg(
            clap::Arg::new("database")
                .long("database")
                .value_name("FILE")
                .help("SQLite database to read instead of database.path"),
        )
    }

    async fn handle(&self, matches: &clap::ArgMatches, project: &Project) -> MpttResult<()> {
        let path = matches
            .get_one::<String>("path")
            .ok_or_else(|| MpttError::ConfigurationError("PATH is required".to_string()))?;
        let database = matches.get_one::<String>("database").map(Path::new);

        let store: Arc<dyn TreeStore> = Arc::new(project.open_store(database)?);
        let response = resolve_path(project, store, path)?;

        println!("{}", response.status());
        println!("{}", response.text().unwrap_or_default());

        if response.status().is_success() {
            Ok(())
        } else {
            Err(MpttError::OperationalError(format!(
                "'{path}' resolved with status {}",
                response.status()
            )))
        }
    }
}
