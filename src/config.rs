use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::DashboardError;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_SNAPSHOT: &str = "dashboard.bin.gz";

/// Where the dataset is kept between cycles
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreKind {
    /// One dataset in process memory, shared by every visitor.
    Memory,
    /// One dataset per browser session.
    Session,
    /// A `services` table in the SQLite database at this path.
    Sqlite(PathBuf),
    /// A compressed snapshot file at this path.
    File(PathBuf),
}

impl StoreKind {
    pub fn label(&self) -> &'static str {
        match self {
            StoreKind::Memory => "memory",
            StoreKind::Session => "session",
            StoreKind::Sqlite(_) => "sqlite",
            StoreKind::File(_) => "file",
        }
    }
}

/// Process configuration read from the environment
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub store: StoreKind,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            port: DEFAULT_PORT,
            store: StoreKind::Session,
        }
    }
}

impl AppConfig {
    /// Reads `PORT`, `DASHBOARD_STORE`, `DATABASE_URL` and `DASHBOARD_SNAPSHOT`.
    pub fn from_env() -> Result<Self, DashboardError> {
        Self::from_vars(&std::env::vars().collect())
    }

    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, DashboardError> {
        let port = vars
            .get("PORT")
            .and_then(|p| u16::from_str(p.trim()).ok())
            .unwrap_or(DEFAULT_PORT);

        let kind = vars
            .get("DASHBOARD_STORE")
            .map(|s| s.trim().to_ascii_lowercase())
            .unwrap_or_else(|| "session".to_string());

        let store = match kind.as_str() {
            "memory" => StoreKind::Memory,
            "session" => StoreKind::Session,
            "sqlite" | "database" => {
                let url = vars.get("DATABASE_URL").ok_or_else(|| {
                    DashboardError::Config("DATABASE_URL is required for the sqlite store".into())
                })?;
                StoreKind::Sqlite(PathBuf::from(database_path(url)))
            }
            "file" => StoreKind::File(PathBuf::from(
                vars.get("DASHBOARD_SNAPSHOT")
                    .map(String::as_str)
                    .unwrap_or(DEFAULT_SNAPSHOT),
            )),
            other => {
                return Err(DashboardError::Config(format!("unknown store kind '{}'", other)));
            }
        };

        Ok(AppConfig { port, store })
    }

    /// Listener address: every interface on the configured port.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}

/// Strips a `sqlite://` or `sqlite:` scheme from a connection string.
pub fn database_path(url: &str) -> &str {
    let url = url.trim();
    url.strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url)
}
