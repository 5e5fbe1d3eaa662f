use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::logging::Mode;
use crate::middleware::csrf::CsrfConfig;

#[derive(Debug, Parser)]
#[command(name = "todo-api", version, about = "REST backend for todos and todo statuses")]
pub struct Cli {
    #[command(flatten)]
    pub config: Config,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Args)]
pub struct Config {
    /// Address the HTTP server listens on
    #[arg(long, env = "TODO_API_BIND", default_value = "0.0.0.0:3000")]
    pub bind: SocketAddr,

    /// SQLite database file (`:memory:` for a throwaway store)
    #[arg(long, env = "DATABASE_PATH", default_value = "todo.db")]
    pub database: PathBuf,

    /// Log filter directives, e.g. `info` or `todo_api=debug,tower_http=debug`
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    #[arg(long, env = "TODO_API_LOG_MODE", value_enum, default_value_t = Mode::Default)]
    pub log_mode: Mode,

    /// Mark the CSRF cookie `Secure` (HTTPS deployments)
    #[arg(long, env = "CSRF_COOKIE_SECURE")]
    pub csrf_cookie_secure: bool,
}

impl Config {
    pub fn csrf(&self) -> CsrfConfig {
        CsrfConfig {
            cookie_secure: self.csrf_cookie_secure,
            ..CsrfConfig::default()
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Insert demo todos
    Seed {
        #[arg(long, default_value_t = 2000)]
        count: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["todo-api"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.config.csrf().cookie_secure);
    }

    #[test]
    fn seed_subcommand() {
        let cli = Cli::try_parse_from([
            "todo-api",
            "--database",
            ":memory:",
            "--csrf-cookie-secure",
            "seed",
            "--count",
            "50",
        ])
        .unwrap();
        assert!(matches!(cli.command, Some(Command::Seed { count: 50 })));
        assert!(cli.config.csrf().cookie_secure);
    }
}
