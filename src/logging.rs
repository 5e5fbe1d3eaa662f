use std::str::FromStr;

use tracing_subscriber::EnvFilter;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Mode {
    #[default]
    Default,
    Json,
    Pretty,
    Compact,
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid log filter: {0}")]
    InvalidFilter(#[from] tracing_subscriber::filter::ParseError),
    #[error("failed to init logger: {0}")]
    Init(#[from] Box<dyn std::error::Error + Send + Sync>),
}

pub fn init(level: &str, mode: Mode) -> Result<(), LoggingError> {
    let filter = EnvFilter::from_str(level)?;
    let builder = tracing_subscriber::fmt()
        .with_line_number(true)
        .with_file(true)
        .with_env_filter(filter);

    match mode {
        Mode::Default => builder.try_init()?,
        Mode::Json => builder.json().try_init()?,
        Mode::Pretty => builder.pretty().try_init()?,
        Mode::Compact => builder.compact().try_init()?,
    }

    Ok(())
}
