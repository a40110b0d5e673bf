use clap::{ArgAction, Parser, builder::BoolishValueParser};
use review_core::gitlab::GitlabConfig;
use review_mcp::server::McpHttpServerConfig;
use review_model::schema::{DEFAULT_PER_PAGE, MAX_PER_PAGE};
use std::error::Error;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const DEFAULT_GITLAB_URL: &str = "https://gitlab.com";
const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:4020";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOG: &str = "info";

#[derive(Parser, Debug)]
#[command(name = "review-mcpd", version, about = "GitLab review MCP daemon.")]
struct CliArgs {
    #[arg(long, env = "PR_MCP_GITLAB_TOKEN", hide_env_values = true, default_value = "")]
    gitlab_token: String,

    #[arg(long, env = "PR_MCP_GITLAB_PROJECT_ID")]
    gitlab_project_id: Option<String>,

    #[arg(long, env = "PR_MCP_GITLAB_URL", default_value = DEFAULT_GITLAB_URL)]
    gitlab_url: String,

    #[arg(
        long,
        env = "PR_MCP_REQUEST_TIMEOUT_SECS",
        default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS
    )]
    request_timeout_secs: u64,

    #[arg(long, env = "PR_MCP_PER_PAGE", default_value_t = DEFAULT_PER_PAGE)]
    per_page: u32,

    #[arg(
        long = "stdio",
        env = "PR_MCP_STDIO",
        default_value_t = true,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    enable_stdio: bool,

    #[arg(
        long = "http",
        env = "PR_MCP_HTTP_SERVE",
        default_value_t = false,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    http_serve: bool,

    #[arg(long, env = "PR_MCP_HTTP_ADDR", default_value = DEFAULT_HTTP_ADDR)]
    http_addr: SocketAddr,

    #[arg(long, env = "PR_MCP_LOG", default_value = DEFAULT_LOG)]
    log: String,
}

/// Runtime configuration loaded from CLI arguments and environment variables.
#[derive(Clone)]
pub struct ReviewConfig {
    pub gitlab: GitlabConfig,
    pub default_project: Option<String>,
    pub enable_stdio: bool,
    pub http_serve: bool,
    pub http: McpHttpServerConfig,
    pub log: String,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingSetting(&'static str),
    InvalidSetting { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSetting(name) => write!(f, "missing required setting: {name}"),
            Self::InvalidSetting { name, value } => {
                write!(f, "invalid {name} value: {value}")
            }
        }
    }
}

impl Error for ConfigError {}

impl ReviewConfig {
    pub fn from_args() -> Result<Self, ConfigError> {
        let args = CliArgs::parse();
        Self::try_from(args)
    }

    #[must_use]
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::new(&self.log)
    }
}

impl TryFrom<CliArgs> for ReviewConfig {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let token = args.gitlab_token.trim();
        if token.is_empty() {
            return Err(ConfigError::MissingSetting("PR_MCP_GITLAB_TOKEN"));
        }

        if args.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "PR_MCP_REQUEST_TIMEOUT_SECS",
                value: args.request_timeout_secs.to_string(),
            });
        }

        if !(1..=MAX_PER_PAGE).contains(&args.per_page) {
            return Err(ConfigError::InvalidSetting {
                name: "PR_MCP_PER_PAGE",
                value: args.per_page.to_string(),
            });
        }

        if !args.enable_stdio && !args.http_serve {
            return Err(ConfigError::InvalidSetting {
                name: "PR_MCP_STDIO",
                value: "false (PR_MCP_HTTP_SERVE is also disabled)".to_string(),
            });
        }

        if EnvFilter::try_new(&args.log).is_err() {
            return Err(ConfigError::InvalidSetting {
                name: "PR_MCP_LOG",
                value: args.log,
            });
        }

        let gitlab = GitlabConfig::new(args.gitlab_url.trim(), token)
            .map_err(|_| ConfigError::InvalidSetting {
                name: "PR_MCP_GITLAB_URL",
                value: args.gitlab_url.clone(),
            })?
            .with_timeout(Duration::from_secs(args.request_timeout_secs))
            .with_per_page(args.per_page);

        let default_project = args
            .gitlab_project_id
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        Ok(Self {
            gitlab,
            default_project,
            enable_stdio: args.enable_stdio,
            http_serve: args.http_serve,
            http: McpHttpServerConfig::new(args.http_addr),
            log: args.log,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> CliArgs {
        CliArgs {
            gitlab_token: "glpat-test".to_string(),
            gitlab_project_id: None,
            gitlab_url: DEFAULT_GITLAB_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            per_page: DEFAULT_PER_PAGE,
            enable_stdio: true,
            http_serve: false,
            http_addr: DEFAULT_HTTP_ADDR.parse().expect("valid HTTP addr"),
            log: DEFAULT_LOG.to_string(),
        }
    }

    #[test]
    fn defaults_produce_stdio_config() {
        let config = ReviewConfig::try_from(base_args()).expect("config should parse");

        assert!(config.enable_stdio);
        assert!(!config.http_serve);
        assert_eq!(config.gitlab.base_url.as_str(), "https://gitlab.com/");
        assert_eq!(config.gitlab.per_page, 100);
        assert_eq!(config.gitlab.timeout, Duration::from_secs(30));
        assert!(config.default_project.is_none());
    }

    #[test]
    fn blank_token_is_missing() {
        let mut args = base_args();
        args.gitlab_token = "   ".to_string();

        let err = ReviewConfig::try_from(args).err().expect("blank token should fail");

        assert!(matches!(err, ConfigError::MissingSetting("PR_MCP_GITLAB_TOKEN")));
        assert_eq!(err.to_string(), "missing required setting: PR_MCP_GITLAB_TOKEN");
    }

    #[test]
    fn blank_project_id_is_absent() {
        let mut args = base_args();
        args.gitlab_project_id = Some("  ".to_string());

        let config = ReviewConfig::try_from(args).expect("config should parse");

        assert!(config.default_project.is_none());
    }

    #[test]
    fn project_id_is_trimmed() {
        let mut args = base_args();
        args.gitlab_project_id = Some(" group/app ".to_string());

        let config = ReviewConfig::try_from(args).expect("config should parse");

        assert_eq!(config.default_project.as_deref(), Some("group/app"));
    }

    #[test]
    fn rejects_unparsable_url() {
        let mut args = base_args();
        args.gitlab_url = "not a url".to_string();

        let err = ReviewConfig::try_from(args).err().expect("bad url should fail");

        assert!(matches!(
            err,
            ConfigError::InvalidSetting { name: "PR_MCP_GITLAB_URL", .. }
        ));
    }

    #[test]
    fn rejects_per_page_out_of_range() {
        for per_page in [0, MAX_PER_PAGE + 1] {
            let mut args = base_args();
            args.per_page = per_page;

            let err = ReviewConfig::try_from(args).err().expect("per_page should fail");

            assert!(matches!(
                err,
                ConfigError::InvalidSetting { name: "PR_MCP_PER_PAGE", .. }
            ));
        }
    }

    #[test]
    fn per_page_accepts_gitlab_maximum() {
        let mut args = base_args();
        args.per_page = MAX_PER_PAGE;

        let config = ReviewConfig::try_from(args).expect("config should parse");

        assert_eq!(config.gitlab.per_page, MAX_PER_PAGE);
    }

    #[test]
    fn rejects_zero_timeout() {
        let mut args = base_args();
        args.request_timeout_secs = 0;

        assert!(ReviewConfig::try_from(args).is_err());
    }

    #[test]
    fn rejects_disabling_every_transport() {
        let mut args = base_args();
        args.enable_stdio = false;

        let err = ReviewConfig::try_from(args).err().expect("no transport should fail");

        assert!(matches!(
            err,
            ConfigError::InvalidSetting { name: "PR_MCP_STDIO", .. }
        ));
    }

    #[test]
    fn http_only_is_allowed() {
        let mut args = base_args();
        args.enable_stdio = false;
        args.http_serve = true;
        args.http_addr = "0.0.0.0:9000".parse().expect("valid addr");

        let config = ReviewConfig::try_from(args).expect("config should parse");

        assert!(config.http_serve);
        assert_eq!(config.http.addr.port(), 9000);
    }

    #[test]
    fn parses_flags_from_command_line() {
        let args = CliArgs::try_parse_from([
            "review-mcpd",
            "--gitlab-token",
            "glpat-cli",
            "--stdio",
            "false",
            "--http",
            "--per-page",
            "50",
        ])
        .expect("flags should parse");

        let config = ReviewConfig::try_from(args).expect("config should parse");

        assert!(!config.enable_stdio);
        assert!(config.http_serve);
        assert_eq!(config.gitlab.per_page, 50);
    }
}
