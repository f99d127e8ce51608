use std::env;
use std::time::Duration;
use tracing::warn;

/// Client configuration from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Upper bound for the login POST.
    pub login_timeout: Duration,
    /// Upper bound for each page GET.
    pub page_timeout: Duration,
    /// User-Agent sent to the switch.
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            login_timeout: Duration::from_secs(5),
            page_timeout: Duration::from_secs(6),
            user_agent: concat!("essstat/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Config {
    /// Creates Config from environment variables with defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            login_timeout: secs_var("ESSSTAT_LOGIN_TIMEOUT_SECS", defaults.login_timeout),
            page_timeout: secs_var("ESSSTAT_PAGE_TIMEOUT_SECS", defaults.page_timeout),
            user_agent: env::var("ESSSTAT_USER_AGENT").unwrap_or(defaults.user_agent),
        }
    }
}

fn secs_var(name: &str, default: Duration) -> Duration {
    match env::var(name) {
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(secs) => Duration::from_secs(secs),
            Err(_) => {
                warn!("Ignoring {}={:?}: not a number of seconds", name, raw);
                default
            }
        },
        Err(_) => default,
    }
}
