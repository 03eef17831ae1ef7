//! Server-side HTML rendering.
//!
//! Templates live in a directory on disk, one `<view>.html` file per
//! [`View`]. Every interpolated value is HTML-escaped; JSON meant for chart
//! scripts is prepared in [`context`] and inserted with `|safe`.
//!
//! In live-reload mode the template directory is re-read on every render, so
//! edits show up without a restart.

pub mod context;

use std::path::{Path, PathBuf};

use minijinja::{AutoEscape, Environment};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};

pub use context::{script_safe_json, ChartView, DetailPage, FactorPage, Notice};

/// The pages the application can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    /// Full listing with chart and average.
    Index,
    /// A single record.
    Detail,
    /// Yearly emissions.
    Year,
    /// Listing sorted by ascending tonnage.
    Sort,
    /// Listing sorted by descending tonnage.
    ReverseSort,
}

impl View {
    /// Every view, for startup checks.
    pub const ALL: [View; 5] = [
        View::Index,
        View::Detail,
        View::Year,
        View::Sort,
        View::ReverseSort,
    ];

    /// File name of the template backing this view.
    #[must_use]
    pub fn template_name(self) -> &'static str {
        match self {
            Self::Index => "index.html",
            Self::Detail => "detail.html",
            Self::Year => "year.html",
            Self::Sort => "sort.html",
            Self::ReverseSort => "reverseSort.html",
        }
    }
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = self.template_name();
        write!(f, "{}", name.trim_end_matches(".html"))
    }
}

/// Renders [`View`]s from a template directory.
pub struct Renderer {
    directory: PathBuf,
    live_reload: bool,
    env: Environment<'static>,
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("directory", &self.directory)
            .field("live_reload", &self.live_reload)
            .finish_non_exhaustive()
    }
}

impl Renderer {
    /// Create a renderer over `directory`.
    ///
    /// Every view's template is loaded once up front so a missing or broken
    /// file fails at startup rather than on the first request.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory does not exist or a template fails
    /// to parse.
    pub fn new(directory: impl Into<PathBuf>, live_reload: bool) -> Result<Self> {
        let directory = directory.into();
        if !directory.is_dir() {
            return Err(Error::ConfigValidation {
                message: format!("template directory {} does not exist", directory.display()),
            });
        }

        let env = build_environment(&directory);
        for view in View::ALL {
            env.get_template(view.template_name())?;
        }

        info!(
            "Templates loaded from {} (live reload: {})",
            directory.display(),
            live_reload
        );
        Ok(Self {
            directory,
            live_reload,
            env,
        })
    }

    /// The template directory.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Whether templates are re-read on every render.
    #[must_use]
    pub fn live_reload(&self) -> bool {
        self.live_reload
    }

    /// Render `view` with the given context.
    ///
    /// # Errors
    ///
    /// Returns an error if the template cannot be loaded or rendering fails.
    pub fn render<S: Serialize>(&self, view: View, ctx: S) -> Result<String> {
        debug!("Rendering view {}", view);
        if self.live_reload {
            let env = build_environment(&self.directory);
            render_with(&env, view, ctx)
        } else {
            render_with(&self.env, view, ctx)
        }
    }
}

/// Characters left alone when encoding a single path segment.
const SEGMENT_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// `path_segment` filter: percent-encode a value for use as one URL path
/// segment, `/` included.
fn path_segment(value: &str) -> String {
    utf8_percent_encode(value, SEGMENT_SAFE).to_string()
}

fn build_environment(directory: &Path) -> Environment<'static> {
    let mut env = Environment::new();
    env.set_loader(minijinja::path_loader(directory));
    env.set_auto_escape_callback(|_| AutoEscape::Html);
    env.add_filter("path_segment", path_segment);
    env
}

fn render_with<S: Serialize>(env: &Environment<'static>, view: View, ctx: S) -> Result<String> {
    let template = env.get_template(view.template_name())?;
    Ok(template.render(ctx)?)
}
