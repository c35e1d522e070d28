//! Directory service lifecycle: reload and shutdown.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};

use crate::handler::DirectoryHandler;
use flatdir_core::{DirectoryConfig, Result};
use flatdir_store::{Backend, DirectoryStore};

/// Running directory service.
///
/// Owns the backend and the request handler built on top of it. A protocol
/// engine serves requests through [`DirectoryService::handler`] until
/// [`DirectoryService::closed`] resolves.
pub struct DirectoryService {
    backend: Arc<dyn Backend>,
    handler: Arc<DirectoryHandler>,
    closed: watch::Sender<bool>,
}

impl std::fmt::Debug for DirectoryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryService")
            .field("handler", &self.handler)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl DirectoryService {
    /// Creates a service serving `backend`.
    ///
    /// # Errors
    ///
    /// Returns an error if the handler cannot be built from `config`.
    pub fn new(config: &DirectoryConfig, backend: Arc<dyn Backend>) -> Result<Self> {
        let handler = DirectoryHandler::new(config, Arc::clone(&backend))?;
        let (closed, _) = watch::channel(false);

        Ok(Self {
            backend,
            handler: Arc::new(handler),
            closed,
        })
    }

    /// Loads the configured sources into a [`DirectoryStore`] and serves it.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial load fails.
    pub async fn open(config: &DirectoryConfig) -> Result<Self> {
        let store = DirectoryStore::open(config.sources()).await?;
        Self::new(config, Arc::new(store))
    }

    /// Request handler for the protocol engine.
    #[must_use]
    pub fn handler(&self) -> Arc<DirectoryHandler> {
        Arc::clone(&self.handler)
    }

    /// Reloads the backend. On failure the previous data stays live.
    ///
    /// # Errors
    ///
    /// Returns the backend's reload error.
    pub async fn reload(&self) -> Result<()> {
        info!("reloading directory data");
        self.backend.reload().await.map_err(|err| {
            error!("reload failed, keeping previous data: {err}");
            err
        })
    }

    /// Marks the service closed. Calling it again has no effect.
    pub fn close(&self) {
        if !self.closed.send_replace(true) {
            info!("directory service closed");
        }
    }

    /// Whether [`DirectoryService::close`] has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// Resolves once the service is closed.
    pub async fn closed(&self) {
        let mut closed = self.closed.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = closed.wait_for(|closed| *closed).await;
    }
}

/// Spawns a task translating process signals into lifecycle calls.
///
/// `SIGHUP`, `SIGUSR1` and `SIGUSR2` reload the data; `SIGTERM` and `SIGINT` close
/// the service. The task ends once the service is closed, whatever closed it.
///
/// # Errors
///
/// Returns [`flatdir_core::Error::InternalError`] if a signal handler cannot be
/// installed.
#[cfg(unix)]
pub fn spawn_signal_listener(
    service: Arc<DirectoryService>,
) -> Result<tokio::task::JoinHandle<()>> {
    use flatdir_core::Error;
    use tokio::signal::unix::{signal, SignalKind};

    let install = |kind: SignalKind| {
        signal(kind).map_err(|err| {
            Error::InternalError(format!("failed to install signal handler: {err}"))
        })
    };

    let mut hangup = install(SignalKind::hangup())?;
    let mut user1 = install(SignalKind::user_defined1())?;
    let mut user2 = install(SignalKind::user_defined2())?;
    let mut terminate = install(SignalKind::terminate())?;
    let mut interrupt = install(SignalKind::interrupt())?;

    Ok(tokio::spawn(async move {
        loop {
            let reload_signal = tokio::select! {
                _ = hangup.recv() => "SIGHUP",
                _ = user1.recv() => "SIGUSR1",
                _ = user2.recv() => "SIGUSR2",
                _ = terminate.recv() => {
                    info!("received SIGTERM, shutting down");
                    service.close();
                    break;
                }
                _ = interrupt.recv() => {
                    info!("received SIGINT, shutting down");
                    service.close();
                    break;
                }
                () = service.closed() => break,
            };

            info!("received {reload_signal}, reloading");
            // Failures are logged by reload; the listener keeps running.
            let _ = service.reload().await;
        }
    }))
}
