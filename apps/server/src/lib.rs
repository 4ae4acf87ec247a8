//! # Cutout Server
//!
//! HTTP server for the cutout service, built on `Axum`. It wires configuration, logging and
//! the feature slices together and serves them over HTTP or HTTPS.
//!
//! ## Example
//! ```no_run
//! use cutout_server::Server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Server::builder()
//!         .port(4583)
//!         .build()
//!         .await?
//!         .run()
//!         .await
//! }
//! ```

mod router;

use anyhow::{Context, Result, anyhow, bail};
use axum::Router;
use axum_server::Handle;
use cutout::domain::config::{ApiConfig, LoggingConfig};
use cutout::kernel::server::ApiState;
use cutout_logger::{LevelFilter, Logger};
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};

/// Builds the global logger from the `logging` section.
///
/// `level` is either a plain level (`debug`) or a full filter directive
/// (`cutout=debug,tower_http=info`).
///
/// # Errors
/// Fails if a subscriber is already installed or the directive is invalid.
pub fn init_logger(cfg: &LoggingConfig) -> Result<Logger> {
    let builder = Logger::builder().name(env!("CARGO_PKG_NAME"));
    let builder = match cfg.level.parse::<LevelFilter>() {
        Ok(level) => builder.level(level),
        Err(_) => builder.env_filter(cfg.level.as_str()),
    };

    let logger = match &cfg.dir {
        Some(dir) => builder.path(dir).json(cfg.json).init(),
        None => builder.init(),
    };

    logger.context("Failed to initialize logging")
}

/// A fluent builder for configuring and initializing the [`Server`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct ServerBuilder {
    cfg: ApiConfig,
}

impl ServerBuilder {
    pub fn config(mut self, cfg: ApiConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.cfg.server.port = port;
        self
    }

    fn validate_credentials(&self) -> Result<()> {
        if self.cfg.removal.api_key.trim().is_empty() {
            bail!("removal.api_key is required (set CUTOUT__REMOVAL__API_KEY)");
        }
        Ok(())
    }

    fn validate_ssl_config(&self) -> Result<()> {
        if let Some(ssl) = &self.cfg.server.ssl {
            if !ssl.cert.exists() {
                bail!("SSL certificate not found at: {}", ssl.cert.display());
            }
            if !ssl.key.exists() {
                bail!("SSL key not found at: {}", ssl.key.display());
            }

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let metadata = ssl.key.metadata()?;
                if metadata.permissions().mode() & 0o077 != 0 {
                    tracing::warn!(
                        "SECURITY: SSL Private Key {} has insecure permissions (should be 600)",
                        ssl.key.display()
                    );
                }
            }
        }
        Ok(())
    }

    /// Consumes the builder and initializes the server.
    ///
    /// # Process
    /// 1. Fails fast on a missing removal credential or unreadable TLS material
    /// 2. Initializes the feature slices (object store, removal client)
    /// 3. Constructs the shared application state
    ///
    /// # Errors
    /// Returns an error if:
    /// * `removal.api_key` is empty
    /// * SSL certificate/key files are missing
    /// * The object store root cannot be created
    pub async fn build(self) -> Result<Server> {
        self.validate_credentials()?;
        self.validate_ssl_config()?;

        let address = SocketAddr::new(self.cfg.server.address, self.cfg.server.port);
        info!(address = %address, removal = ?self.cfg.removal, "Initializing server");

        let slices =
            cutout::init(&self.cfg).await.map_err(|e| anyhow!("Platform bootstrap failed: {e}"))?;

        let state = ApiState::builder()
            .config(self.cfg)
            .register_slices(slices)
            .build()
            .context("Failed to finalize API state registry")?;

        Ok(Server { state })
    }
}

/// A fully initialized server instance ready to run.
#[must_use = "call .run().await to start the server"]
#[derive(Debug)]
pub struct Server {
    state: ApiState,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// The fully assembled application router.
    pub fn router(&self) -> Router {
        router::init(self.state.clone())
    }

    /// Starts the server and runs until the shutdown signal is received.
    ///
    /// # Errors
    /// Returns an error if the server fails to bind to the configured address
    /// or if TLS setup fails.
    pub async fn run(self) -> Result<()> {
        let cfg = self.state.config.clone();
        let address = SocketAddr::new(cfg.server.address, cfg.server.port);

        let app = self.router();

        let handle = Handle::<SocketAddr>::new();
        let shutdown_handle = handle.clone();

        tokio::spawn(async move {
            if let Err(e) = shutdown_signal().await {
                error!("Error while waiting for shutdown signal: {e}");
                return;
            }
            info!("Shutdown signal received, starting graceful shutdown...");
            shutdown_handle.graceful_shutdown(Some(std::time::Duration::from_secs(30)));
        });

        if let Some(ssl_config) = &cfg.server.ssl {
            info!("Starting HTTPS server on https://{address}");

            let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
                &ssl_config.cert,
                &ssl_config.key,
            )
            .await
            .context("Failed to load SSL/TLS certificates")?;

            axum_server::bind_rustls(address, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .context("HTTPS server failed")?;
        } else {
            info!("Starting HTTP server on http://{address}");

            axum_server::bind(address)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .context("HTTP server failed")?;
        }

        info!("Server shutdown complete");
        Ok(())
    }

    #[must_use]
    pub const fn state(&self) -> &ApiState {
        &self.state
    }
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM.
async fn shutdown_signal() -> Result<()> {
    let ctrl_c = async { signal::ctrl_c().await.context("Failed to install Ctrl+C handler") };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?
            .recv()
            .await;
        Ok::<_, anyhow::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<()>>();

    tokio::select! {
        res = ctrl_c => {
            res.context("Ctrl+C signal received")?;
        },
        res = terminate => {
            res.context("SIGTERM signal received")?;
        },
    }

    Ok(())
}
