use std::env;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

pub const DEFAULT_PORT: u16 = 3000;

/// Which Record Store backend the process runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Supabase,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "in-memory" | "in_memory" => Ok(StorageBackend::Memory),
            "supabase" | "postgrest" => Ok(StorageBackend::Supabase),
            other => Err(format!("unknown storage backend: {}", other)),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Memory => write!(f, "memory"),
            StorageBackend::Supabase => write!(f, "supabase"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub storage_backend: StorageBackend,
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_backend: StorageBackend::Memory,
            supabase_url: String::new(),
            supabase_service_key: String::new(),
            port: DEFAULT_PORT,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut config = Self {
            storage_backend: env::var("STORAGE_BACKEND")
                .ok()
                .map(|raw| {
                    raw.parse().unwrap_or_else(|e| {
                        warn!("{}, falling back to memory", e);
                        StorageBackend::Memory
                    })
                })
                .unwrap_or(StorageBackend::Memory),
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_service_key: env::var("SUPABASE_SERVICE_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_SERVICE_KEY not set, using empty value");
                    String::new()
                }),
            port: match env::var("PORT") {
                Ok(raw) => raw.parse().unwrap_or_else(|_| {
                    warn!("PORT={} is not a valid port, using {}", raw, DEFAULT_PORT);
                    DEFAULT_PORT
                }),
                Err(_) => DEFAULT_PORT,
            },
        };

        if config.storage_backend == StorageBackend::Supabase && !config.is_configured() {
            warn!("Supabase backend selected but not configured - falling back to memory");
            config.storage_backend = StorageBackend::Memory;
        }

        config
    }

    /// Supabase settings are complete enough to build a PostgREST client.
    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_service_key.is_empty()
    }

    pub fn supabase(url: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self {
            storage_backend: StorageBackend::Supabase,
            supabase_url: url.into(),
            supabase_service_key: service_key.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend_names() {
        assert_eq!("memory".parse::<StorageBackend>(), Ok(StorageBackend::Memory));
        assert_eq!("Supabase".parse::<StorageBackend>(), Ok(StorageBackend::Supabase));
        assert!("sqlite".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn default_config_is_memory_and_unconfigured() {
        let config = AppConfig::default();
        assert_eq!(config.storage_backend, StorageBackend::Memory);
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(!config.is_configured());
    }

    #[test]
    fn supabase_constructor_is_configured() {
        let config = AppConfig::supabase("http://localhost:54321", "service-key");
        assert_eq!(config.storage_backend, StorageBackend::Supabase);
        assert!(config.is_configured());
    }
}
