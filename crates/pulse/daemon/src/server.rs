//! Server setup and lifecycle management

use std::collections::BTreeMap;

use pulse_monitor::{
    MetricsRegistry, Monitor, MonitorContext, MonitorRunner, Sampler, StopHandle,
};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::api::{create_router, AppState, MonitorHandles};
use crate::config::DaemonConfig;
use crate::error::{DaemonError, DaemonResult};
use crate::sources::SimulatedSource;

/// Pulse daemon server
pub struct Server {
    config: DaemonConfig,
    registry: MetricsRegistry,
    runners: Vec<MonitorRunner>,
}

impl Server {
    /// Build every configured monitor.
    pub fn new(config: DaemonConfig) -> DaemonResult<Self> {
        config.validate()?;
        let registry = MetricsRegistry::with_prefix(&config.metrics.prefix)?;

        let mut runners = Vec::with_capacity(config.monitors.len());
        for spec in &config.monitors {
            let context = MonitorContext::new(spec.monitor.clone(), registry.metrics())?;

            let mut sampler = Sampler::new(context.config.sampler.clone());
            for source in &spec.sources {
                sampler.add_source(Box::new(SimulatedSource::new(source.clone())))?;
            }

            tracing::info!(
                monitor = %spec.monitor.name,
                sources = sampler.len(),
                tick_rate_hz = spec.monitor.tick_rate_hz,
                "Monitor configured"
            );
            runners.push(MonitorRunner::new(Monitor::new(context, sampler)?));
        }

        Ok(Self {
            config,
            registry,
            runners,
        })
    }

    /// Run monitors and the HTTP server until a shutdown signal arrives.
    pub async fn run(self) -> DaemonResult<()> {
        let addr = self.config.server.listen_addr;

        // Runners start only once the listener is bound
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Pulse daemon listening on {}", addr);

        let mut handles = BTreeMap::new();
        let mut tasks: Vec<(StopHandle, JoinHandle<Monitor>)> = Vec::new();
        for runner in self.runners {
            let name = runner.status_handle().get_status().monitor;
            handles.insert(
                name,
                MonitorHandles {
                    status: runner.status_handle(),
                    events: runner.events(),
                },
            );
            let stop = runner.stop_handle();
            tasks.push((stop, tokio::spawn(runner.run())));
        }

        // Create router
        let state = AppState::new(handles, self.registry.clone());
        let app = create_router(state, self.config.server.enable_cors);

        // Run server with graceful shutdown
        let served = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| DaemonError::Server(e.to_string()));

        tracing::info!("Pulse daemon shutting down");

        // Stop monitors; each finishes its in-flight tick
        for (stop, _) in &tasks {
            stop.stop();
        }
        for (_, task) in tasks {
            match task.await {
                Ok(monitor) => tracing::debug!(
                    monitor = %monitor.name(),
                    issues = monitor.tracker().len(),
                    "Monitor released"
                ),
                Err(e) => tracing::error!(error = %e, "Monitor task failed"),
            }
        }

        served
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
