//! The `check` management command.
//!
//! Binds the routing settings and inspects the surrounding configuration
//! (templates, database) for problems that would otherwise only show up on the
//! first request.

use async_trait::async_trait;
use mptt_urls_core::{ConfigError, MpttError, MpttResult};
use mptt_urls_views::{Engine, RenderSpec};

use crate::command::ManagementCommand;
use crate::project::Project;

/// Runs system checks against the project configuration.
pub struct CheckCommand;

/// The result of a single system check.
#[derive(Debug, Clone)]
pub struct CheckMessage {
    /// The severity level of this check result.
    pub level: CheckLevel,
    /// A human-readable description of the issue.
    pub msg: String,
    /// An optional hint for how to resolve the issue.
    pub hint: Option<String>,
    /// A unique identifier for this check (e.g. "mptt_urls.E001").
    pub id: String,
}

/// Severity levels for system check results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CheckLevel {
    /// A warning that may indicate a problem.
    Warning,
    /// An error that must be resolved.
    Error,
}

impl std::fmt::Display for CheckLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

impl std::fmt::Display for CheckMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.level, self.id, self.msg)?;
        if let Some(hint) = &self.hint {
            write!(f, "\n\tHINT: {hint}")?;
        }
        Ok(())
    }
}

fn config_hint(err: &ConfigError) -> Option<String> {
    match err {
        ConfigError::MissingRoleConfig { role } => Some(format!("Add a [mptt_urls.{role}] table")),
        ConfigError::MissingModel { role } => Some(format!("Set mptt_urls.{role}.model")),
        ConfigError::RedundantRenderSpec { role } | ConfigError::MissingRenderSpec { role } => {
            Some(format!("Set exactly one of mptt_urls.{role}.template or mptt_urls.{role}.view"))
        }
        ConfigError::UnknownView(_) => {
            Some("Register the view with the ViewRegistry passed to the CLI".to_string())
        }
        ConfigError::UnknownModel(_) | ConfigError::InvalidTableName(_) => None,
    }
}

/// Runs system checks against the given project.
pub fn run_checks(project: &Project) -> Vec<CheckMessage> {
    let mut messages = Vec::new();

    let config = match project.config() {
        Ok(config) => config,
        Err(err) => {
            messages.push(CheckMessage {
                level: CheckLevel::Error,
                hint: config_hint(&err),
                msg: err.to_string(),
                id: "mptt_urls.E001".to_string(),
            });
            return messages;
        }
    };

    if config.node().render.is_none() {
        messages.push(CheckMessage {
            level: CheckLevel::Warning,
            msg: "'node' settings have no \"template\" or \"view\"; paths ending with '/' will fail"
                .to_string(),
            hint: Some("Set mptt_urls.node.template or mptt_urls.node.view".to_string()),
            id: "mptt_urls.W001".to_string(),
        });
    }

    match Engine::from_settings(&project.settings().templates) {
        Ok(engine) => {
            for level in [config.node(), config.leaf()] {
                if let Some(RenderSpec::Template(name)) = &level.render {
                    if !engine.has_template(name) {
                        messages.push(CheckMessage {
                            level: CheckLevel::Error,
                            msg: format!("template '{name}' was not found"),
                            hint: Some("Check templates.dirs".to_string()),
                            id: "mptt_urls.E002".to_string(),
                        });
                    }
                }
            }
        }
        Err(err) => messages.push(CheckMessage {
            level: CheckLevel::Error,
            msg: err.to_string(),
            hint: None,
            id: "mptt_urls.E003".to_string(),
        }),
    }

    let database = &project.settings().database.path;
    if database.to_str() != Some(":memory:") && !database.exists() {
        messages.push(CheckMessage {
            level: CheckLevel::Warning,
            msg: format!("database '{}' does not exist", database.display()),
            hint: Some("resolve and runserver open it read-only; create it first".to_string()),
            id: "mptt_urls.W002".to_string(),
        });
    }

    messages
}

#[async_trait]
impl ManagementCommand for CheckCommand {
    fn name(&self) -> &'static str {
        "check"
    }

    fn help(&self) -> &'static str {
        "Run system checks"
    }

    async fn handle(&self, _matches: &clap::ArgMatches, project: &Project) -> MpttResult<()> {
        let messages = run_checks(project);

        if messages.is_empty() {
            println!("System check identified no issues.");
            return Ok(());
        }

        let errors = messages.iter().filter(|m| m.level >= CheckLevel::Error).count();
        for msg in &messages {
            println!("{msg}");
        }
        println!("System check identified {} issue(s).", messages.len());

        if errors > 0 {
            return Err(MpttError::ConfigurationError(format!(
                "System check found {errors} error(s)"
            )));
        }
        Ok(())
    }
}
