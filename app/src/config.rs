//! Global command-line options and the resolved configuration.

use std::io::IsTerminal;
use std::time::Duration;

use clap::{Args, ValueEnum};
use scheduler_core::{TaskUpdateMode, UpdateMethod};

pub const DEFAULT_API_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UpdateMethodArg {
    Put,
    Patch,
}

impl From<UpdateMethodArg> for UpdateMethod {
    fn from(arg: UpdateMethodArg) -> Self {
        match arg {
            UpdateMethodArg::Put => UpdateMethod::Put,
            UpdateMethodArg::Patch => UpdateMethod::Patch,
        }
    }
}

/// Options shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// Base URL of the appointment API
    #[arg(long, env = "SCHEDULER_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// Per-request timeout in milliseconds
    #[arg(long, env = "SCHEDULER_TIMEOUT_MS", default_value_t = 8000, global = true)]
    pub timeout_ms: u64,

    /// Extra attempts for a failed request, one second apart
    #[arg(long, env = "SCHEDULER_RETRIES", default_value_t = 0, global = true)]
    pub retries: u32,

    /// HTTP verb used to update appointments
    #[arg(long, value_enum, default_value = "put", global = true)]
    pub update_method: UpdateMethodArg,

    /// Extra request header as NAME:VALUE (repeatable)
    #[arg(long = "header", value_name = "NAME:VALUE", value_parser = parse_header, global = true)]
    pub headers: Vec<(String, String)>,

    /// Wait for the server before showing task changes
    #[arg(long, global = true)]
    pub confirm_tasks: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected NAME:VALUE, got `{raw}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing header name in `{raw}`"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Typed settings handed to the service and the views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_url: String,
    pub timeout: Duration,
    pub retries: u32,
    pub update_method: UpdateMethod,
    pub headers: Vec<(String, String)>,
    pub task_mode: TaskUpdateMode,
    pub color: bool,
    pub verbose: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: crate::fetch::DEFAULT_TIMEOUT,
            retries: 0,
            update_method: UpdateMethod::default(),
            headers: Vec::new(),
            task_mode: TaskUpdateMode::default(),
            color: false,
            verbose: false,
        }
    }
}

impl From<&GlobalArgs> for AppConfig {
    fn from(args: &GlobalArgs) -> Self {
        Self {
            api_url: args.api_url.clone(),
            timeout: Duration::from_millis(args.timeout_ms),
            retries: args.retries,
            update_method: args.update_method.into(),
            headers: args.headers.clone(),
            task_mode: if args.confirm_tasks {
                TaskUpdateMode::ConfirmThenRefresh
            } else {
                TaskUpdateMode::Optimistic
            },
            color: !args.no_color && std::io::stdout().is_terminal(),
            verbose: args.verbose,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        global: GlobalArgs,
    }

    #[test]
    fn flags_resolve_to_typed_config() {
        let cli = TestCli::parse_from([
            "scheduler",
            "--api-url",
            "http://api.test/",
            "--timeout-ms",
            "250",
            "--retries",
            "2",
            "--update-method",
            "patch",
            "--confirm-tasks",
            "--no-color",
            "--header",
            "Authorization: Bearer abc",
            "--header",
            "x-trace:1",
        ]);
        let config = AppConfig::from(&cli.global);
        assert_eq!(config.api_url, "http://api.test/");
        assert_eq!(config.timeout, Duration::from_millis(250));
        assert_eq!(config.retries, 2);
        assert_eq!(config.update_method, UpdateMethod::Patch);
        assert_eq!(config.task_mode, TaskUpdateMode::ConfirmThenRefresh);
        assert!(!config.color);
        assert_eq!(
            config.headers,
            vec![
                ("Authorization".to_string(), "Bearer abc".to_string()),
                ("x-trace".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn header_without_separator_is_rejected() {
        assert!(parse_header("no-colon").is_err());
        assert!(parse_header(":value").is_err());
        assert_eq!(parse_header("a:b:c").unwrap(), ("a".to_string(), "b:c".to_string()));
    }
}
