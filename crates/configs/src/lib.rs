use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub datastore: DatastoreConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Log every fetched/listed record when set.
    #[serde(default)]
    pub debug: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

/// Which datastore implementation backs the entity stores.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Memory,
    File,
}

impl BackendKind {
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(BackendKind::Memory),
            "file" => Ok(BackendKind::File),
            other => Err(anyhow!("unknown datastore backend `{other}`; expected memory or file")),
        }
    }
}

/// Connection target for the backing document store.
#[derive(Debug, Clone, Deserialize)]
pub struct DatastoreConfig {
    /// Namespace all keys live in (the datastore "project").
    #[serde(default = "default_project_id")]
    pub project_id: String,
    #[serde(default)]
    pub backend: BackendKind,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for DatastoreConfig {
    fn default() -> Self {
        Self { project_id: default_project_id(), backend: BackendKind::Memory, data_dir: default_data_dir() }
    }
}

fn default_project_id() -> String { "shelf-dev".to_string() }
fn default_data_dir() -> String { "data".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { format: default_log_format() }
    }
}

fn default_log_format() -> String { "compact".to_string() }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `config.toml` when present, otherwise start from defaults; then
    /// apply environment overrides and validate.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = match load_default() {
            Ok(cfg) => cfg,
            Err(e) if is_missing_file(&e) => AppConfig::default(),
            Err(e) => return Err(e),
        };
        cfg.apply_env(|key| std::env::var(key).ok())?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Environment fallbacks. `lookup` is injected so tests need not touch
    /// the process environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT") {
            self.server.port = port
                .parse::<u16>()
                .map_err(|e| anyhow!("SERVER_PORT is not a valid port: {e}"))?;
        }
        if let Some(w) = lookup("TOKIO_WORKER_THREADS").and_then(|v| v.parse::<usize>().ok()) {
            self.server.worker_threads = Some(w);
        }
        if let Some(project) = lookup("DATASTORE_PROJECT_ID") {
            self.datastore.project_id = project;
        }
        if let Some(backend) = lookup("DATASTORE_BACKEND") {
            self.datastore.backend = BackendKind::parse(&backend)?;
        }
        if let Some(dir) = lookup("DATASTORE_DATA_DIR") {
            self.datastore.data_dir = dir;
        }
        if let Some(debug) = lookup("APP_DEBUG") {
            self.debug = matches!(debug.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            self.logging.format = format;
        }
        Ok(())
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.datastore.validate()?;
        Ok(())
    }
}

fn is_missing_file(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .map(|io| io.kind() == std::io::ErrorKind::NotFound)
        .unwrap_or(false)
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl DatastoreConfig {
    pub fn validate(&self) -> Result<()> {
        let project = self.project_id.trim();
        if project.is_empty() {
            return Err(anyhow!("datastore.project_id is empty; set it in config.toml or DATASTORE_PROJECT_ID"));
        }
        // the project id doubles as a file name for the file backend
        if project.contains(['/', '\\']) || project.starts_with('.') {
            return Err(anyhow!("datastore.project_id `{project}` must not contain path separators"));
        }
        if self.backend == BackendKind::File && self.data_dir.trim().is_empty() {
            return Err(anyhow!("datastore.data_dir is required for the file backend"));
        }
        Ok(())
    }
}
