//! Apply pending chatmap schema migrations without starting the server.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;

use chatmap::outbound::persistence::run_pending_migrations;
use clap::Parser;
use color_eyre::eyre::{Context, Result, eyre};
use tokio::runtime::Builder;

const DATABASE_URL_ENV: &str = "CHATMAP_DATABASE_URL";

/// `chatmap-migrate` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "chatmap-migrate",
    about = "Apply pending chatmap database migrations",
    version
)]
struct CliArgs {
    /// Database connection URL. Falls back to `CHATMAP_DATABASE_URL` when omitted.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = CliArgs::parse();
    let database_url = resolve_database_url(args.database_url, env::var(DATABASE_URL_ENV).ok())?;
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime
        .block_on(run_pending_migrations(&database_url))
        .wrap_err("apply migrations")
}

fn resolve_database_url(flag: Option<String>, from_env: Option<String>) -> Result<String> {
    flag.or(from_env)
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| eyre!("pass --database-url or set {DATABASE_URL_ENV}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some("postgres://flag"), Some("postgres://env"), "postgres://flag")]
    #[case(None, Some("postgres://env"), "postgres://env")]
    fn flag_takes_precedence_over_environment(
        #[case] flag: Option<&str>,
        #[case] from_env: Option<&str>,
        #[case] expected: &str,
    ) {
        let url = resolve_database_url(flag.map(str::to_owned), from_env.map(str::to_owned))
            .expect("database url");
        assert_eq!(url, expected);
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some("  "), None)]
    fn missing_url_is_reported(#[case] flag: Option<&str>, #[case] from_env: Option<&str>) {
        let err = resolve_database_url(flag.map(str::to_owned), from_env.map(str::to_owned))
            .expect_err("missing url");
        assert!(err.to_string().contains(DATABASE_URL_ENV));
    }

    #[rstest]
    fn arguments_parse() {
        let args = CliArgs::try_parse_from(["chatmap-migrate", "--database-url", "postgres://x"])
            .expect("parse");
        assert_eq!(args.database_url.as_deref(), Some("postgres://x"));
    }
}
