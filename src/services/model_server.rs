use parking_lot::Mutex;
use std::process::Stdio;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::process::{Child, Command};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::models::config::ModelServerConfig;
use crate::services::ocr::HttpOcrClient;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum ModelServerError {
    #[error("Model server not reachable at {base_url} and no launch command configured")]
    NotReachable { base_url: String },

    #[error("Failed to start model server: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Model server exited during startup ({0})")]
    Exited(std::process::ExitStatus),

    #[error("Model server failed to become healthy within {secs} seconds")]
    StartupTimeout { secs: u64 },
}

/// Model server manager
/// Handles launch, readiness polling and shutdown of the recognizer sidecar
pub struct ModelServerManager {
    process: Mutex<Option<Child>>,
    client: HttpOcrClient,
    config: ModelServerConfig,
}

impl ModelServerManager {
    pub fn new(client: HttpOcrClient, config: ModelServerConfig) -> Self {
        Self {
            process: Mutex::new(None),
            client,
            config,
        }
    }

    /// Make sure the model server answers `/health`
    ///
    /// An already running server is reused. Otherwise the configured command is
    /// spawned and polled until healthy, it exits, or the startup timeout passes.
    pub async fn start(&self) -> Result<(), ModelServerError> {
        if self.is_server_running().await {
            info!("Model server already running at {}", self.client.base_url());
            return Ok(());
        }

        let Some(program) = self.config.command.as_deref() else {
            return Err(ModelServerError::NotReachable {
                base_url: self.client.base_url().to_string(),
            });
        };

        info!("Starting model server: {} {}", program, self.config.args.join(" "));
        let mut command = Command::new(program);
        command
            .args(&self.config.args)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        if let Some(dir) = &self.config.working_dir {
            command.current_dir(dir);
        }

        let child = command.spawn()?;
        *self.process.lock() = Some(child);

        self.wait_for_ready().await?;
        info!("Model server ready at {}", self.client.base_url());
        Ok(())
    }

    async fn is_server_running(&self) -> bool {
        match self.client.health_check().await {
            Ok(()) => true,
            Err(e) => {
                debug!("Model server health check failed: {}", e);
                false
            }
        }
    }

    async fn wait_for_ready(&self) -> Result<(), ModelServerError> {
        let secs = self.config.startup_timeout_secs;
        let deadline = Instant::now() + Duration::from_secs(secs);
        let mut attempt = 0u32;

        loop {
            if self.is_server_running().await {
                debug!("Model server ready after {} attempts", attempt + 1);
                return Ok(());
            }

            if let Some(status) = self.exit_status()? {
                self.process.lock().take();
                return Err(ModelServerError::Exited(status));
            }

            if Instant::now() >= deadline {
                self.stop();
                return Err(ModelServerError::StartupTimeout { secs });
            }

            attempt += 1;
            if attempt % 10 == 0 {
                debug!("Waiting for model server... ({} attempts)", attempt);
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    fn exit_status(&self) -> Result<Option<std::process::ExitStatus>, ModelServerError> {
        match self.process.lock().as_mut() {
            Some(child) => Ok(child.try_wait()?),
            None => Ok(None),
        }
    }

    /// Kill the spawned server, if this manager launched one
    pub fn stop(&self) {
        if let Some(mut child) = self.process.lock().take() {
            match child.start_kill() {
                Ok(()) => info!("Model server stopped"),
                Err(e) => warn!("Failed to stop model server: {}", e),
            }
        }
    }

    /// Whether this manager owns a running child process
    pub fn is_managed(&self) -> bool {
        self.process.lock().is_some()
    }
}

impl Drop for ModelServerManager {
    fn drop(&mut self) {
        self.stop();
    }
}
