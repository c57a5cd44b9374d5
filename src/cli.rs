use clap::{Parser, Subcommand};

/// `--version` text: the release tag, or the package version plus the commit
/// and branch it was built from.
fn get_version() -> &'static str {
    match option_env!("PYTHONUP_GIT_TAG") {
        Some(tag) => tag,
        None => {
            let build = format!(
                "v{}-{} ({})",
                env!("CARGO_PKG_VERSION"),
                option_env!("PYTHONUP_GIT_COMMIT").unwrap_or("unknown"),
                option_env!("PYTHONUP_GIT_BRANCH").unwrap_or("unknown"),
            );
            // clap wants 'static; computed once per process
            Box::leak(build.into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "pythonup")]
#[command(about = "Manage side-by-side Python versions")]
#[command(version = get_version(), propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (use multiple times for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Reduce output to errors only
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Install a Python version
    #[command(after_help = "Examples:\n  pythonup install 3.6\n  pythonup install 3.6.3-32")]
    Install {
        /// Version name from the catalog (e.g., '3.6.3')
        #[arg(id = "version_name", value_name = "VERSION")]
        version: String,
    },

    /// Uninstall a Python version
    Uninstall {
        /// Installed version to remove
        #[arg(id = "version_name", value_name = "VERSION")]
        version: String,
    },

    /// Set or show the active versions, in precedence order
    #[command(after_help = "Examples:\n  pythonup use 3.6 2.7\n  pythonup use\n  pythonup use --reset")]
    Use {
        /// Versions to activate; the first one wins name collisions
        versions: Vec<String>,
        /// Deactivate every version
        #[arg(long, conflicts_with = "versions")]
        reset: bool,
    },

    /// Publish the pinned commands of a version (e.g., python3.6, pip3.6)
    Link {
        #[arg(id = "version_name", value_name = "VERSION")]
        version: String,
    },

    /// Remove the pinned commands of a version
    Unlink {
        #[arg(id = "version_name", value_name = "VERSION")]
        version: String,
    },

    /// List installed versions
    List {
        /// Show every catalog version, installed or not
        #[arg(short, long)]
        all: bool,
    },

    /// Print the interpreter path of an installed version
    Where {
        #[arg(id = "version_name", value_name = "VERSION")]
        version: String,
    },

    /// Manage pythonup's configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show the current version
    Version,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a configuration setting
    Get {
        /// Key to get (if omitted, shows all settings)
        key: Option<String>,
    },
    /// Set a configuration setting
    Set {
        /// Key and value (e.g., 'scripts-dir=C:\bin' or 'force-32bit true')
        #[arg(trailing_var_arg = true, required = true)]
        args: Vec<String>,
    },
    /// Reset a configuration setting to its default
    Unset {
        /// Key to unset (e.g., 'scripts-dir')
        key: String,
    },
    /// Show full configuration
    Show {
        /// Output format (json, yaml, plain)
        #[arg(long, default_value = "json")]
        format: String,
    },
}
