//! Script transpilation and minification.

use std::fmt;
use std::fs;
use std::path::Path;

use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_minifier::{Minifier, MinifierOptions};
use oxc_parser::Parser;
use oxc_semantic::SemanticBuilder;
use oxc_span::SourceType;
use oxc_transformer::{TransformOptions, Transformer};

use crate::config::SiteLayout;
use crate::task::{PipelineError, TaskReport};
use crate::walk;

/// Options for the scripts task.
#[derive(Debug, Clone)]
pub struct ScriptOptions {
    /// Language level to lower to, e.g. `"es5"` or `"es2018"`.
    pub target: String,
    pub minify: bool,
    /// Also emit the click-to-copy helper into the js output.
    pub copy_helper: bool,
}

impl Default for ScriptOptions {
    fn default() -> Self {
        Self {
            target: "es5".to_string(),
            minify: true,
            copy_helper: false,
        }
    }
}

/// Name the click-to-copy helper is emitted under.
pub const COPY_HELPER_NAME: &str = "copycode.js";

/// Transpile and minify every script under the js directory, preserving
/// relative paths in the output.
pub fn compile_scripts(
    layout: &SiteLayout,
    options: &ScriptOptions,
) -> Result<TaskReport, PipelineError> {
    let js_dir = layout.js_dir();
    let dest = layout.out_js_dir();
    let mut written = 0;

    for file in walk::files_with_extension(&js_dir, "js", true) {
        let source = fs::read_to_string(&file).map_err(|e| PipelineError::read(&file, e))?;
        let compiled = compile_script(&source, &file, options)?;

        let rel = file.strip_prefix(&js_dir).unwrap_or(&file);
        let out = dest.join(rel);
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent).map_err(|e| PipelineError::write(parent, e))?;
        }
        fs::write(&out, compiled).map_err(|e| PipelineError::write(&out, e))?;
        written += 1;
    }

    if options.copy_helper {
        let helper_path = dest.join(COPY_HELPER_NAME);
        let helper = compile_script(
            &lath_copycode::browser_script(),
            Path::new(COPY_HELPER_NAME),
            options,
        )?;
        fs::create_dir_all(&dest).map_err(|e| PipelineError::write(&dest, e))?;
        fs::write(&helper_path, helper).map_err(|e| PipelineError::write(&helper_path, e))?;
        written += 1;
    }

    Ok(TaskReport { written, skipped: 0 })
}

/// Compile one script: parse, lower to the target, optionally minify.
pub fn compile_script(
    source: &str,
    path: &Path,
    options: &ScriptOptions,
) -> Result<String, PipelineError> {
    let allocator = Allocator::default();
    // Output loads through classic script tags, so parse with the script goal.
    let source_type = SourceType::cjs();

    let parsed = Parser::new(&allocator, source, source_type).parse();
    if parsed.panicked || !parsed.errors.is_empty() {
        return Err(script_error(path, &parsed.errors));
    }
    let mut program = parsed.program;

    let semantic = SemanticBuilder::new().build(&program);
    if !semantic.errors.is_empty() {
        return Err(script_error(path, &semantic.errors));
    }
    let scoping = semantic.semantic.into_scoping();

    let transform_options =
        TransformOptions::from_target(&options.target).map_err(|e| PipelineError::ScriptError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
    let transformed =
        Transformer::new(&allocator, path, &transform_options).build_with_scoping(scoping, &mut program);
    if !transformed.errors.is_empty() {
        return Err(script_error(path, &transformed.errors));
    }

    let code = if options.minify {
        let minified = Minifier::new(MinifierOptions::default()).build(&allocator, &mut program);
        Codegen::new()
            .with_options(CodegenOptions {
                minify: true,
                ..CodegenOptions::default()
            })
            .with_scoping(minified.scoping)
            .build(&program)
            .code
    } else {
        Codegen::new().build(&program).code
    };
    Ok(code)
}

fn script_error(path: &Path, diagnostics: &[impl fmt::Display]) -> PipelineError {
    let message = diagnostics
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    PipelineError::ScriptError {
        path: path.display().to_string(),
        message,
    }
}
