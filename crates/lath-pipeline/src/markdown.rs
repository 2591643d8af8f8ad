//! Markdown rendering into complete, styled pages.

use std::fs;

use pulldown_cmark::{html, Options, Parser};

use crate::config::SiteLayout;
use crate::task::{PipelineError, TaskReport};
use crate::walk;

/// Render markdown source to an HTML fragment.
pub fn render_markdown(source: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS;

    let parser = Parser::new_ext(source, options);
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

/// Wrap rendered markdown in the fixed page shell. The stylesheet link is
/// relative, so documents land in the output root next to `assets/`.
pub fn render_page(source: &str, title: &str) -> String {
    let body = render_markdown(source);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta http-equiv="X-UA-Compatible" content="ie=edge">
    <title>{title}</title>
    <link rel="stylesheet" href="assets/css/main.css">
  </head>
  <body class="article">
{body}  </body>
</html>
"#
    )
}

/// Render every markdown document under `md/` into the output root,
/// preserving relative paths and switching the extension to `.html`.
pub fn render_documents(layout: &SiteLayout, title: &str) -> Result<TaskReport, PipelineError> {
    let md_dir = layout.md_dir();
    let mut written = 0;

    for file in walk::files_with_extension(&md_dir, "md", true) {
        let source = fs::read_to_string(&file).map_err(|e| PipelineError::read(&file, e))?;
        let page = render_page(&source, title);

        let rel = file.strip_prefix(&md_dir).unwrap_or(&file);
        let mut out = layout.output_root().join(rel);
        out.set_extension("html");
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent).map_err(|e| PipelineError::write(parent, e))?;
        }
        fs::write(&out, page).map_err(|e| PipelineError::write(&out, e))?;
        written += 1;
    }

    Ok(TaskReport { written, skipped: 0 })
}
