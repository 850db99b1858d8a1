pub mod loader;

use lettre::Address;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

use crate::failure::DEFAULT_FAILURE_EVENT_PRIORITY;
use crate::transport::TransportRegistry;

pub use loader::ConfigLoader;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub transports: TransportRegistry,
    pub supervisor: SupervisorConfig,
    #[serde(default)]
    pub mailer: MailerConfig,
    #[serde(default = "default_failure_event_priority")]
    pub failure_event_priority: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SupervisorConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Request timeout, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MailerConfig {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub to: Vec<String>,
    #[serde(default = "default_subject")]
    pub subject: String,
    /// Where the SMTP sink delivers, e.g. `smtp://localhost:25`.
    #[serde(default = "default_dsn")]
    pub dsn: String,
}

fn default_failure_event_priority() -> i32 {
    DEFAULT_FAILURE_EVENT_PRIORITY
}

fn default_port() -> u16 {
    9001
}

fn default_timeout() -> u64 {
    3600
}

fn default_subject() -> String {
    "[Supervisor][<server>][<program>] Error".to_string()
}

fn default_dsn() -> String {
    "smtp://localhost:25".to_string()
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(address) => vec![address],
        OneOrMany::Many(addresses) => addresses,
    })
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            from: None,
            to: Vec::new(),
            subject: default_subject(),
            dsn: default_dsn(),
        }
    }
}

impl SupervisorConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: default_port(),
            username: None,
            password: None,
            timeout: default_timeout(),
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}/RPC2", self.host, self.port)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Username and password, which are only valid together.
    pub fn credentials(&self) -> crate::Result<Option<(&str, &str)>> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (None, None) => Ok(None),
            (Some(username), Some(password)) => Ok(Some((username, password))),
            _ => Err(crate::Error::Config(
                "Missing username or password".to_string(),
            )),
        }
    }
}

impl Config {
    pub fn from_json(content: &str) -> crate::Result<Self> {
        let config: Config = serde_json::from_str(content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.supervisor.host.trim().is_empty() {
            return Err(crate::Error::Config(
                "supervisor.host cannot be empty".to_string(),
            ));
        }
        self.supervisor.credentials()?;

        if let Some(from) = &self.mailer.from
            && !is_email(from)
        {
            return Err(crate::Error::Config(format!("Invalid email {}", from)));
        }
        if let Some(to) = self.mailer.to.iter().find(|to| !is_email(to)) {
            return Err(crate::Error::Config(format!("Invalid email {}", to)));
        }

        if !self.transports.is_empty() && (self.mailer.from.is_none() || self.mailer.to.is_empty())
        {
            return Err(crate::Error::Config(
                "mailer option must be configured".to_string(),
            ));
        }

        Ok(())
    }
}

/// Parsed the way the SMTP sink parses recipients.
fn is_email(value: &str) -> bool {
    value.parse::<Address>().is_ok()
}
