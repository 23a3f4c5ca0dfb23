use clap::{Args, Parser};
use std::path::PathBuf;

use crate::telemetry::logging::{LogConfig, LogLevel};

#[derive(Parser, Debug)]
#[command(
    name = "shore",
    about = "🐚 Attach an interactive terminal to a remote shell server",
    version
)]
pub struct Cli {
    #[arg(
        long,
        env = "SHORE_SESSION_SERVER",
        default_value = "http://localhost:8080",
        help = "Base URL of the terminal server"
    )]
    pub server: String,

    #[arg(
        long = "retry-attempts",
        env = "SHORE_RETRY_ATTEMPTS",
        default_value_t = 5,
        help = "Connection attempts before giving up"
    )]
    pub retry_attempts: u32,

    #[arg(
        long = "retry-delay-ms",
        env = "SHORE_RETRY_DELAY_MS",
        default_value_t = 1000,
        help = "Delay between connection attempts in milliseconds"
    )]
    pub retry_delay_ms: u64,

    #[arg(
        long = "ping-interval-secs",
        env = "SHORE_PING_INTERVAL_SECS",
        default_value_t = 30,
        help = "Keepalive ping interval in seconds"
    )]
    pub ping_interval_secs: u64,

    #[command(flatten)]
    pub logging: LoggingArgs,
}

#[derive(Args, Debug, Clone)]
pub struct LoggingArgs {
    #[arg(
        long = "log-level",
        value_enum,
        env = "SHORE_LOG_LEVEL",
        default_value_t = LogLevel::Warn,
        help = "Minimum log level (error, warn, info, debug, trace)"
    )]
    pub level: LogLevel,

    #[arg(
        long = "log-file",
        value_name = "PATH",
        env = "SHORE_LOG_FILE",
        help = "Write structured logs to the specified file"
    )]
    pub file: Option<PathBuf>,
}

impl LoggingArgs {
    pub fn to_config(&self) -> LogConfig {
        LogConfig {
            level: self.level,
            file: self.file.clone(),
        }
    }
}
