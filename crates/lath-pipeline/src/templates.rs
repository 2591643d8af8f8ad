//! Handlebars rendering for top-level page templates.

use std::fs;
use std::path::Path;

use handlebars::{handlebars_helper, Handlebars};
use serde_json::Value;

use crate::config::SiteLayout;
use crate::task::{PipelineError, TaskReport};
use crate::walk;

handlebars_helper!(uppercase: |s: String| s.to_uppercase());

handlebars_helper!(lowercase: |s: String| s.to_lowercase());

handlebars_helper!(capitalize: |s: String| {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
});

handlebars_helper!(fallback: |value: Json, default_value: Json| {
    if value.is_null() { default_value.clone() } else { value.clone() }
});

handlebars_helper!(join: |items: Json, separator: String| {
    match items.as_array() {
        Some(values) => values
            .iter()
            .map(|v| match v.as_str() {
                Some(s) => s.to_string(),
                None => v.to_string(),
            })
            .collect::<Vec<_>>()
            .join(&separator),
        None => String::new(),
    }
});

/// Template engine with the helper library registered.
pub struct TemplateEngine {
    registry: Handlebars<'static>,
}

impl TemplateEngine {
    pub fn new() -> Self {
        let mut registry = Handlebars::new();
        registry.register_helper("uppercase", Box::new(uppercase));
        registry.register_helper("lowercase", Box::new(lowercase));
        registry.register_helper("capitalize", Box::new(capitalize));
        registry.register_helper("default", Box::new(fallback));
        registry.register_helper("join", Box::new(join));
        Self { registry }
    }

    /// Render template source against a context value.
    pub fn render(&self, source: &str, context: &Value) -> Result<String, handlebars::RenderError> {
        self.registry.render_template(source, context)
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Load the shared template context from the data file.
///
/// The file is read on every call so edits show up on the next render
/// without a restart. A missing file is an empty context.
pub fn load_context(path: &Path) -> Result<Value, PipelineError> {
    if !path.exists() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    let raw = fs::read_to_string(path).map_err(|e| PipelineError::read(path, e))?;
    serde_json::from_str(&raw).map_err(|e| PipelineError::DataError {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Render every top-level `.hbs` template into the output root, switching
/// the extension to `.html`. Templates in subdirectories are left alone;
/// only files directly under the source root are pages.
pub fn render_templates(layout: &SiteLayout) -> Result<TaskReport, PipelineError> {
    let templates = walk::files_with_extension(layout.source_root(), "hbs", false);
    if templates.is_empty() {
        return Ok(TaskReport::default());
    }

    let context = load_context(&layout.data_file())?;
    let engine = TemplateEngine::new();
    let out_root = layout.output_root();
    fs::create_dir_all(out_root).map_err(|e| PipelineError::write(out_root, e))?;

    let mut written = 0;
    for file in templates {
        let source = fs::read_to_string(&file).map_err(|e| PipelineError::read(&file, e))?;
        let html = engine
            .render(&source, &context)
            .map_err(|e| PipelineError::TemplateError {
                path: file.display().to_string(),
                message: e.to_string(),
            })?;

        let stem = file.file_stem().and_then(|s| s.to_str()).unwrap_or("index");
        let out = out_root.join(format!("{stem}.html"));
        fs::write(&out, html).map_err(|e| PipelineError::write(&out, e))?;
        written += 1;
    }

    Ok(TaskReport { written, skipped: 0 })
}
