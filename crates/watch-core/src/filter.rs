//! Path filter chain
//!
//! Every change path goes through the same ordered rules:
//!
//! 1. built-in noise (`kind`, `apiVersion`, `metadata.resourceVersion`,
//!    `metadata.generation`, `metadata.managedFields`) is dropped on exact
//!    match, then on prefix match, when metadata is ignored
//! 2. `metadata.annotations` is dropped when annotations are disabled
//! 3. a user prefix keeps only paths under it and strips it for display
//! 4. segments are re-joined with `/` and a leading `Object/` is removed
//! 5. a user template regex keeps only matching display paths
//!
//! Matching is case-insensitive. The chain holds no state besides its
//! configuration, so the same path always gets the same decision.

use crate::config::WatchConfig;
use crate::error::WatchError;
use regex::Regex;

/// Separator between path segments while filtering
pub const SPLIT: &str = ",";

/// Separator between path segments on screen
pub const SPLIT_PRINT: &str = "/";

/// Wrapper field some snapshots nest their content under
const WRAPPER_PREFIX: &str = "Object/";

const IGNORED_PATHS: [&str; 5] = [
    "kind",
    "apiversion",
    "metadata,resourceversion",
    "metadata,generation",
    "metadata,managedfields",
];

const ANNOTATIONS_PATH: &str = "metadata,annotations";

/// Compiled filter chain for one watch session.
#[derive(Debug, Clone)]
pub struct PathFilter {
    ignored: Vec<String>,
    enable_annotations: bool,
    prefix: String,
    template: Option<Regex>,
}

impl PathFilter {
    /// Builds the chain from configuration.
    ///
    /// The template is compiled once here; an invalid one is an error.
    pub fn new(config: &WatchConfig) -> Result<Self, WatchError> {
        let ignored = if config.ignore_metadata {
            IGNORED_PATHS
                .iter()
                .flat_map(|p| [p.to_string(), format!("object{SPLIT}{p}")])
                .collect()
        } else {
            Vec::new()
        };

        let template = match config.path_template.as_str() {
            "" => None,
            t => Some(Regex::new(t)?),
        };

        Ok(Self {
            ignored,
            enable_annotations: config.enable_annotations,
            prefix: config.path_prefix.to_ascii_lowercase(),
            template,
        })
    }

    /// Runs `path` through the chain.
    ///
    /// Returns the display path when the change survives, `None` when it is
    /// dropped.
    pub fn apply<S: AsRef<str>>(&self, path: &[S]) -> Option<String> {
        let joined = path
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(SPLIT);
        self.apply_joined(&joined)
    }

    /// Same as [`PathFilter::apply`] for an already comma-joined path.
    pub fn apply_joined(&self, path: &str) -> Option<String> {
        let lower = path.to_ascii_lowercase();

        if self.ignored.iter().any(|p| *p == lower) {
            return None;
        }
        if self.ignored.iter().any(|p| lower.starts_with(p.as_str())) {
            return None;
        }
        if !self.enable_annotations && lower.starts_with(ANNOTATIONS_PATH) {
            return None;
        }

        let mut display = path;
        if !self.prefix.is_empty() {
            if !lower.starts_with(&self.prefix) {
                return None;
            }
            // ASCII lowercasing keeps byte offsets, so the stripped length
            // is valid in the original-case path.
            display = &path[self.prefix.len()..];
        }

        let display = display.replace(SPLIT, SPLIT_PRINT);
        let display = display
            .strip_prefix(WRAPPER_PREFIX)
            .map(str::to_string)
            .unwrap_or(display);

        match &self.template {
            Some(t) if !t.is_match(&display) => None,
            _ => Some(display),
        }
    }
}
