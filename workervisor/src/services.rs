use anyhow::Context;
use std::sync::Arc;
use tracing::debug;
use workervisor_core::{Config, FailureListener, Supervisor};
use workervisor_mail::SmtpMailer;
use workervisor_rpc::XmlRpcSupervisorApi;

/// Everything built once from the configuration at boot.
pub struct Services {
    config: Config,
    supervisor: Arc<Supervisor>,
}

impl Services {
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let api = XmlRpcSupervisorApi::from_config(&config.supervisor)
            .context("Failed to configure the Supervisor client")?;
        debug!("Supervisor XML-RPC endpoint: {}", api.url());

        let transports = Arc::new(config.transports.clone());
        let supervisor = Arc::new(Supervisor::new(api, transports));
        Ok(Self { config, supervisor })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn supervisor(&self) -> &Arc<Supervisor> {
        &self.supervisor
    }

    /// Failure hook for a worker host, sharing this facade.
    pub fn failure_listener(&self) -> anyhow::Result<FailureListener> {
        let mailer = SmtpMailer::from_config(&self.config.mailer)
            .context("Failed to configure the mailer")?;

        Ok(FailureListener::new(
            Arc::clone(&self.supervisor),
            mailer,
            self.config.mailer.clone(),
        )
        .with_priority(self.config.failure_event_priority))
    }
}
