use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, REFERER, UPGRADE_INSECURE_REQUESTS};
use reqwest::{Client, StatusCode};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::EssStatError;

const LOGIN_PATH: &str = "/logon.cgi";
const LOGOUT_PATH: &str = "/Logout.htm";
const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Administrative pages the switch serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchPage {
    PortStatistics,
    SystemInfo,
}

impl SwitchPage {
    pub fn path(self) -> &'static str {
        match self {
            SwitchPage::PortStatistics => "/PortStatisticsRpm.htm",
            SwitchPage::SystemInfo => "/SystemInfoRpm.htm",
        }
    }
}

/// Cookie-holding HTTP session with one switch.
pub struct SwitchClient {
    base_url: String,
    client: Client,
    config: Config,
}

impl SwitchClient {
    pub fn new(target: &str, config: Config) -> Result<Self, EssStatError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .cookie_store(true)
            .build()?;

        Ok(Self {
            base_url: base_url(target),
            client,
            config,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Posts the login form. The switch answers 200 whether or not the
    /// credentials are accepted; a rejected login only shows on the next
    /// page fetch.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), EssStatError> {
        let url = format!("{}{}", self.base_url, LOGIN_PATH);
        let referer = format!("{}{}", self.base_url, LOGOUT_PATH);
        let form: &[(&str, &str)] = &[
            ("logon", "Login"),
            ("username", username),
            ("password", password),
        ];

        info!("Logging in to {} as '{}'", self.base_url, username);
        let resp = self
            .client
            .post(&url)
            .header(REFERER, HeaderValue::from_str(&referer)?)
            .form(form)
            .timeout(self.config.login_timeout)
            .send()
            .await?;
        debug!("Login response: {}", resp.status());
        Ok(())
    }

    /// Fetches one page body; anything but 200 means the session is not
    /// authenticated.
    pub async fn fetch(&self, page: SwitchPage) -> Result<String, EssStatError> {
        let url = format!("{}{}", self.base_url, page.path());

        let mut headers = HeaderMap::new();
        headers.insert(REFERER, HeaderValue::from_str(&format!("{}/", self.base_url))?);
        headers.insert(ACCEPT, HeaderValue::from_static(HTML_ACCEPT));
        headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

        info!("Fetching {}", url);
        let resp = self
            .client
            .get(&url)
            .headers(headers)
            .timeout(self.config.page_timeout)
            .send()
            .await?;

        let status = resp.status();
        debug!("{} -> {}", url, status);
        if status != StatusCode::OK {
            return Err(EssStatError::LoginRejected(status));
        }
        Ok(resp.text().await?)
    }

    /// Ends the session so the switch frees its login slot. Failures are
    /// logged and otherwise ignored.
    pub async fn logout(&self) {
        let url = format!("{}{}", self.base_url, LOGOUT_PATH);
        match self
            .client
            .get(&url)
            .timeout(self.config.page_timeout)
            .send()
            .await
        {
            Ok(resp) => debug!("Logout response: {}", resp.status()),
            Err(e) => warn!("Logout from {} failed: {}", self.base_url, e),
        }
    }
}

/// `http://<target>` unless the target already names a scheme.
pub fn base_url(target: &str) -> String {
    let target = target.trim().trim_end_matches('/');
    if target.contains("://") {
        target.to_string()
    } else {
        format!("http://{}", target)
    }
}
