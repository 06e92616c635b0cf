//! Command line interface.
//!
//! Every flag can also be set through an environment variable.

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use watch_core::WatchConfig;
use watch_core::config::{DEFAULT_GROUP_VERSION, DEFAULT_METRICS_ADDRESS};

/// Terminal size used when stdout is not a terminal
const FALLBACK_SIZE: (u16, u16) = (80, 24);

/// Watch Kubernetes resources and print every field change as a live table.
#[derive(Debug, Parser)]
#[command(name = "kubewatch", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Watch resources and print field changes
    Watch(WatchArgs),
    /// Print shell completion suggestions, one per line
    Complete(CompleteArgs),
}

/// Which objects to look at.
#[derive(Debug, Clone, Args)]
pub struct SelectionArgs {
    /// Only objects whose namespace contains this
    #[arg(short, long, env = "WATCH_NAMESPACE", default_value = "")]
    pub namespace: String,

    /// Group-version to discover kinds in
    #[arg(short, long, env = "WATCH_GROUP_VERSION", default_value = DEFAULT_GROUP_VERSION)]
    pub group_version: String,

    /// Kinds to watch, comma separated names or aliases (all when empty)
    #[arg(short, long = "kind", env = "WATCH_KINDS", default_value = "")]
    pub kinds: String,

    /// Kinds to skip, comma separated names or aliases
    #[arg(long = "exclude-kind", env = "WATCH_EXCLUDE_KINDS", default_value = "")]
    pub exclude_kinds: String,

    /// Kubeconfig context to use
    #[arg(long, env = "KUBE_CONTEXT")]
    pub context: Option<String>,

    /// Only objects whose name contains one of these
    #[arg(value_name = "NAME")]
    pub names: Vec<String>,
}

#[derive(Debug, Clone, Args)]
pub struct WatchArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Only show field paths under this prefix (segments separated by `,`)
    #[arg(short, long, env = "WATCH_PATH_PREFIX", default_value = "")]
    pub path_prefix: String,

    /// Only show display paths matching this regex
    #[arg(short = 't', long, env = "WATCH_PATH_TEMPLATE", default_value = "")]
    pub path_template: String,

    /// Metrics listen address, empty or `0` to disable
    #[arg(short, long, env = "WATCH_METRICS_ADDRESS", default_value = DEFAULT_METRICS_ADDRESS)]
    pub metrics_address: String,

    /// Show changes under metadata.annotations
    #[arg(short = 'a', long, env = "WATCH_ENABLE_ANNOTATIONS", default_value_t = true, action = ArgAction::Set)]
    pub enable_annotations: bool,

    /// Hide resourceVersion, generation and managedFields changes
    #[arg(short, long, env = "WATCH_IGNORE_METADATA", default_value_t = true, action = ArgAction::Set)]
    pub ignore_metadata: bool,

    /// Compare lists element by element instead of ignoring order
    #[arg(long, env = "WATCH_SLICE_ORDERING", default_value_t = true, action = ArgAction::Set)]
    pub slice_ordering: bool,

    /// Maximum cell width (default: a quarter of the terminal width)
    #[arg(long, env = "WATCH_COLUMN_WIDTH_MAX")]
    pub column_width_max: Option<usize>,

    /// Maximum line width (default: the terminal width)
    #[arg(long, env = "WATCH_ROW_WIDTH_MAX")]
    pub row_width_max: Option<usize>,

    /// Rows kept on screen (default: the terminal height minus 4)
    #[arg(long, env = "WATCH_MAX_ROWS")]
    pub max_rows: Option<usize>,
}

impl WatchArgs {
    /// Session configuration, with terminal-sized defaults filled in
    pub fn config(&self) -> WatchConfig {
        let (cols, rows) = terminal_size();
        let mut config = self.selection.config();
        config.path_prefix = self.path_prefix.clone();
        config.path_template = self.path_template.clone();
        config.metrics_address = self.metrics_address.clone();
        config.enable_annotations = self.enable_annotations;
        config.ignore_metadata = self.ignore_metadata;
        config.slice_ordering = self.slice_ordering;
        config.column_width_max = self.column_width_max.unwrap_or(cols / 4);
        config.row_width_max = self.row_width_max.unwrap_or(cols);
        config.max_rows = self.max_rows.unwrap_or(rows.saturating_sub(4));
        config
    }
}

/// What to complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CompletionTarget {
    Kind,
    Namespace,
    GroupVersion,
    PathPrefix,
    Name,
}

#[derive(Debug, Clone, Args)]
pub struct CompleteArgs {
    /// What to complete
    #[arg(value_enum)]
    pub target: CompletionTarget,

    /// Partial word being completed
    #[arg(long, default_value = "")]
    pub to_complete: String,

    #[command(flatten)]
    pub selection: SelectionArgs,
}

impl SelectionArgs {
    /// Configuration carrying only the selection
    pub fn config(&self) -> WatchConfig {
        WatchConfig {
            kinds: self.kinds.clone(),
            exclude_kinds: self.exclude_kinds.clone(),
            namespace: self.namespace.clone(),
            group_version: self.group_version.clone(),
            names: self.names.clone(),
            ..Default::default()
        }
    }
}

fn terminal_size() -> (usize, usize) {
    let (cols, rows) = crossterm::terminal::size().unwrap_or(FALLBACK_SIZE);
    (usize::from(cols), usize::from(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("kubewatch").chain(args.iter().copied()))
            .expect("valid arguments")
    }

    #[test]
    fn test_watch_defaults() {
        let Command::Watch(args) = parse(&["watch"]).command else {
            panic!("expected watch");
        };
        let config = args.config();
        assert_eq!(config.group_version, "v1");
        assert_eq!(config.metrics_address, ":6666");
        assert!(config.enable_annotations);
        assert!(config.ignore_metadata);
        assert!(config.slice_ordering);
        assert!(config.names.is_empty());
    }

    #[test]
    fn test_watch_flags() {
        let Command::Watch(args) = parse(&[
            "watch",
            "-k",
            "deploy,cm",
            "-n",
            "prod",
            "--exclude-kind",
            "pod",
            "-p",
            "spec,",
            "-t",
            "replicas$",
            "--enable-annotations",
            "false",
            "--max-rows",
            "7",
            "--column-width-max",
            "12",
            "--row-width-max",
            "100",
            "web",
            "api",
        ])
        .command
        else {
            panic!("expected watch");
        };

        let config = args.config();
        assert_eq!(config.kinds, "deploy,cm");
        assert_eq!(config.namespace, "prod");
        assert_eq!(config.exclude_kinds, "pod");
        assert_eq!(config.path_prefix, "spec,");
        assert_eq!(config.path_template, "replicas$");
        assert!(!config.enable_annotations);
        assert_eq!(config.max_rows, 7);
        assert_eq!(config.column_width_max, 12);
        assert_eq!(config.row_width_max, 100);
        assert_eq!(config.names, vec!["web", "api"]);
    }

    #[test]
    fn test_complete_args() {
        let Command::Complete(args) =
            parse(&["complete", "kind", "--to-complete", "deploy,c", "-g", "apps/v1"]).command
        else {
            panic!("expected complete");
        };
        assert_eq!(args.target, CompletionTarget::Kind);
        assert_eq!(args.to_complete, "deploy,c");
        assert_eq!(args.selection.group_version, "apps/v1");
    }

    #[test]
    fn test_complete_targets_use_kebab_case() {
        let Command::Complete(args) = parse(&["complete", "group-version"]).command else {
            panic!("expected complete");
        };
        assert_eq!(args.target, CompletionTarget::GroupVersion);
    }
}
