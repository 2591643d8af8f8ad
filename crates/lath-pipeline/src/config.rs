//! Site configuration and source tree layout.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::task::PipelineError;

/// Top-level configuration, loaded from `site.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub site: SiteSection,
    #[serde(default)]
    pub build: BuildSection,
    #[serde(default)]
    pub serve: ServeSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteSection {
    /// Root of the source tree.
    #[serde(default = "default_source")]
    pub source: PathBuf,
    /// Root of the build output.
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// Page title used for rendered markdown documents.
    #[serde(default = "default_title")]
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BuildSection {
    /// Language level scripts are lowered to before minification.
    #[serde(default = "default_script_target")]
    pub script_target: String,
    /// Emit the click-to-copy helper script alongside compiled scripts.
    #[serde(default)]
    pub copy_helper: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServeSection {
    /// Port the preview server listens on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Open the site in the default browser once serving.
    #[serde(default = "default_open")]
    pub open: bool,
}

fn default_source() -> PathBuf {
    PathBuf::from("source")
}

fn default_output() -> PathBuf {
    PathBuf::from("build")
}

fn default_title() -> String {
    "Documentation".to_string()
}

fn default_script_target() -> String {
    "es5".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_open() -> bool {
    true
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            source: default_source(),
            output: default_output(),
            title: default_title(),
        }
    }
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            script_target: default_script_target(),
            copy_helper: false,
        }
    }
}

impl Default for ServeSection {
    fn default() -> Self {
        Self {
            port: default_port(),
            open: default_open(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from `path`. A missing file yields the defaults;
    /// a file that exists but does not parse is an error.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path).map_err(|e| PipelineError::read(path, e))?;
        toml::from_str(&raw).map_err(|e| PipelineError::ConfigError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    pub fn layout(&self) -> SiteLayout {
        SiteLayout::new(&self.site.source, &self.site.output)
    }
}

/// Where each file category lives under the source and output roots.
///
/// The layout is fixed: only the two roots move. Watchers rely on these
/// paths to map a changed file back to the task that owns it.
#[derive(Debug, Clone)]
pub struct SiteLayout {
    source: PathBuf,
    output: PathBuf,
}

impl SiteLayout {
    pub fn new(source: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            output: output.into(),
        }
    }

    pub fn source_root(&self) -> &Path {
        &self.source
    }

    pub fn output_root(&self) -> &Path {
        &self.output
    }

    pub fn scss_dir(&self) -> PathBuf {
        self.source.join("assets").join("scss")
    }

    pub fn css_dir(&self) -> PathBuf {
        self.source.join("assets").join("css")
    }

    pub fn js_dir(&self) -> PathBuf {
        self.source.join("assets").join("js")
    }

    pub fn img_dir(&self) -> PathBuf {
        self.source.join("assets").join("img")
    }

    pub fn fonts_dir(&self) -> PathBuf {
        self.source.join("assets").join("fonts")
    }

    pub fn md_dir(&self) -> PathBuf {
        self.source.join("md")
    }

    /// Template context shared by every `.hbs` render.
    pub fn data_file(&self) -> PathBuf {
        self.source.join("assets").join("data").join("data.json")
    }

    pub fn out_css_dir(&self) -> PathBuf {
        self.output.join("assets").join("css")
    }

    pub fn out_js_dir(&self) -> PathBuf {
        self.output.join("assets").join("js")
    }

    pub fn out_img_dir(&self) -> PathBuf {
        self.output.join("assets").join("img")
    }

    pub fn out_fonts_dir(&self) -> PathBuf {
        self.output.join("assets").join("fonts")
    }
}
