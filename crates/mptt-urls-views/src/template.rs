//! Template rendering.
//!
//! [`Engine`] wraps a [`tera::Tera`] instance. Templates come from the
//! directories listed in [`TemplateSettings`] or are registered from strings,
//! which is what tests and embedded deployments do.

use std::error::Error as _;
use std::path::Path;

use mptt_urls_core::settings::TemplateSettings;
use mptt_urls_core::{MpttError, MpttResult};

/// The template engine.
///
/// # Examples
///
/// ```
/// use mptt_urls_views::template::Engine;
///
/// let mut engine = Engine::new();
/// engine.add_string_template("hello.html", "Hello {{ name }}!").unwrap();
///
/// let mut ctx = tera::Context::new();
/// ctx.insert("name", "World");
/// assert_eq!(engine.render_to_string("hello.html", &ctx).unwrap(), "Hello World!");
/// ```
#[derive(Debug, Default)]
pub struct Engine {
    tera: tera::Tera,
}

impl Engine {
    /// Creates an engine with no templates.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every text file below each configured directory.
    ///
    /// Template names are paths relative to their directory, joined with `/`.
    /// When two directories hold the same name, the first listed wins.
    /// Directories that do not exist and files that are not UTF-8 (databases,
    /// images, editor swap files) are skipped with a warning.
    pub fn from_settings(settings: &TemplateSettings) -> MpttResult<Self> {
        let mut engine = Self::new();
        for dir in &settings.dirs {
            if !dir.is_dir() {
                tracing::warn!(dir = %dir.display(), "template directory not found");
                continue;
            }
            let mut found = Vec::new();
            collect_templates(dir, dir, &mut found)?;
            let fresh: Vec<(String, String)> = found
                .into_iter()
                .filter(|(name, _)| !engine.has_template(name))
                .collect();
            engine.tera.add_raw_templates(fresh).map_err(template_error)?;
        }
        tracing::debug!(count = engine.tera.get_template_names().count(), "templates loaded");
        Ok(engine)
    }

    /// Registers a template from a string.
    pub fn add_string_template(&mut self, name: &str, source: &str) -> MpttResult<()> {
        self.tera
            .add_raw_template(name, source)
            .map_err(template_error)
    }

    /// Returns `true` if a template with this name is loaded.
    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|n| n == name)
    }

    /// Renders the named template.
    ///
    /// A name that is not loaded yields [`MpttError::TemplateDoesNotExist`].
    pub fn render_to_string(&self, name: &str, context: &tera::Context) -> MpttResult<String> {
        if !self.has_template(name) {
            return Err(MpttError::TemplateDoesNotExist(name.to_string()));
        }
        self.tera.render(name, context).map_err(template_error)
    }
}

fn collect_templates(root: &Path, dir: &Path, out: &mut Vec<(String, String)>) -> MpttResult<()> {
    let mut entries = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            collect_templates(root, &path, out)?;
            continue;
        }
        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        match String::from_utf8(std::fs::read(&path)?) {
            Ok(source) => out.push((name, source)),
            Err(_) => tracing::warn!(file = %path.display(), "skipping non-UTF-8 file in template directory"),
        }
    }
    Ok(())
}

fn template_error(err: tera::Error) -> MpttError {
    if let tera::ErrorKind::TemplateNotFound(name) = &err.kind {
        return MpttError::TemplateDoesNotExist(name.clone());
    }
    // Tera keeps the useful part of the message in the source chain.
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    MpttError::TemplateError(message)
}
