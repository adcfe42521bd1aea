//! Configuration for pulse-daemon

use std::net::{Ipv4Addr, SocketAddr};

use pulse_monitor::{MonitorConfig, WeightTable};
use serde::{Deserialize, Serialize};

use crate::error::{DaemonError, DaemonResult};

/// Main daemon configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Monitor loops to run
    #[serde(default = "default_monitors")]
    pub monitors: Vec<MonitorSpec>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            metrics: MetricsConfig::default(),
            logging: LoggingConfig::default(),
            monitors: default_monitors(),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            enable_cors: true,
        }
    }
}

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Prefix for every exported metric name
    #[serde(default = "default_metrics_prefix")]
    pub prefix: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            prefix: default_metrics_prefix(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// One monitor loop and the sources feeding it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorSpec {
    /// Monitor configuration
    pub monitor: MonitorConfig,

    /// Simulated metric sources
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

/// Simulated metric source: a sine wave around a baseline with noise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Metric name
    pub name: String,

    /// Centre of the wave
    #[serde(default = "default_baseline")]
    pub baseline: f64,

    /// Wave amplitude
    #[serde(default)]
    pub amplitude: f64,

    /// Wave period in seconds
    #[serde(default = "default_period")]
    pub period_secs: f64,

    /// Uniform noise half-width
    #[serde(default)]
    pub noise: f64,

    /// Probability that a read fails
    #[serde(default)]
    pub dropout: f64,

    /// Simulated read latency
    #[serde(default)]
    pub latency_ms: u64,
}

impl SourceConfig {
    pub fn new(name: impl Into<String>, baseline: f64) -> Self {
        Self {
            name: name.into(),
            baseline,
            amplitude: 0.0,
            period_secs: default_period(),
            noise: 0.0,
            dropout: 0.0,
            latency_ms: 0,
        }
    }

    fn validate(&self) -> DaemonResult<()> {
        if self.name.trim().is_empty() {
            return Err(DaemonError::Config("source name is empty".into()));
        }
        if !(0.0..=1.0).contains(&self.dropout) {
            return Err(DaemonError::Config(format!(
                "dropout for {} must be within [0, 1], got {}",
                self.name, self.dropout
            )));
        }
        if !(0.0..=1.0).contains(&self.baseline) {
            return Err(DaemonError::Config(format!(
                "baseline for {} must be within [0, 1], got {}",
                self.name, self.baseline
            )));
        }
        if !(-1.0..=1.0).contains(&self.amplitude) {
            return Err(DaemonError::Config(format!(
                "amplitude for {} must be within [-1, 1], got {}",
                self.name, self.amplitude
            )));
        }
        if !(0.0..=1.0).contains(&self.noise) {
            return Err(DaemonError::Config(format!(
                "noise for {} must be within [0, 1], got {}",
                self.name, self.noise
            )));
        }
        if !self.period_secs.is_finite() || self.period_secs <= 0.0 {
            return Err(DaemonError::Config(format!(
                "period for {} must be positive, got {}",
                self.name, self.period_secs
            )));
        }
        Ok(())
    }
}

// Default value helpers
fn default_true() -> bool {
    true
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::LOCALHOST, 9464))
}

fn default_metrics_prefix() -> String {
    "pulse".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_baseline() -> f64 {
    0.9
}

fn default_period() -> f64 {
    60.0
}

fn default_monitors() -> Vec<MonitorSpec> {
    let composites = vec![
        WeightTable::new("overall")
            .with_weight("cpu", 0.3)
            .with_weight("latency", 0.25)
            .with_weight("errors", 0.25)
            .with_weight("saturation", 0.2),
        WeightTable::new("responsiveness")
            .with_weight("latency", 0.6)
            .with_weight("errors", 0.4),
    ];

    vec![MonitorSpec {
        monitor: MonitorConfig::new("demo", composites),
        sources: vec![
            SourceConfig {
                amplitude: 0.08,
                noise: 0.02,
                ..SourceConfig::new("cpu", 0.85)
            },
            SourceConfig {
                amplitude: 0.3,
                period_secs: 120.0,
                noise: 0.03,
                ..SourceConfig::new("latency", 0.75)
            },
            SourceConfig {
                noise: 0.01,
                dropout: 0.05,
                ..SourceConfig::new("errors", 0.95)
            },
            SourceConfig {
                amplitude: 0.05,
                noise: 0.02,
                ..SourceConfig::new("saturation", 0.8)
            },
        ],
    }]
}

impl DaemonConfig {
    /// Load configuration: defaults, then an optional file, then `PULSE_*`
    /// environment variables (`__` separates nested keys).
    pub fn load(path: Option<&str>) -> DaemonResult<Self> {
        let mut builder = config::Config::builder();

        // Add default configuration
        builder = builder.add_source(config::Config::try_from(&DaemonConfig::default())?);

        // Add file configuration if provided
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        // Add environment variables with PULSE_ prefix
        builder = builder.add_source(
            config::Environment::with_prefix("PULSE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: DaemonConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check monitor names are unique and every monitor is valid.
    pub fn validate(&self) -> DaemonResult<()> {
        let mut names = std::collections::BTreeSet::new();
        for spec in &self.monitors {
            if !names.insert(spec.monitor.name.as_str()) {
                return Err(DaemonError::Config(format!(
                    "duplicate monitor name {}",
                    spec.monitor.name
                )));
            }
            spec.monitor.validate()?;
            for source in &spec.sources {
                source.validate()?;
            }
        }
        Ok(())
    }
}
