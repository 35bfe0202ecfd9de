//! Command-line interface for recipebox.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// recipebox - recipe sharing community backend
#[derive(Parser)]
#[command(name = "recipebox")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a config file (defaults to the first of the standard locations)
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP API server (default)
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Apply database migrations and exit
    Migrate,

    /// Grant the ADMIN role to an account
    Promote {
        /// Login id of the account
        login_id: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["recipebox"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn promote_takes_login_id() {
        let cli =
            Cli::try_parse_from(["recipebox", "--config", "/tmp/rb.toml", "promote", "alice"])
                .unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Promote {
                login_id: "alice".to_string()
            })
        );
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/rb.toml")));
    }

    #[test]
    fn promote_requires_login_id() {
        assert!(Cli::try_parse_from(["recipebox", "promote"]).is_err());
    }
}
