use std::env;
use std::error::Error;
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_ENGINE: &str = "zola";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RunMode {
    Production,
    Development,
}

impl RunMode {
    // Only the exact production marker counts, anything else is development.
    pub fn parse(mode: &str) -> Self {
        if mode == "production" {
            RunMode::Production
        } else {
            RunMode::Development
        }
    }
}

/// Settings read once from the environment at process start. Missing or
/// unparsable values fall back to their defaults, nothing is rejected.
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub run_mode: RunMode,
    pub engine: String,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = lookup("PORT")
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let run_mode = RunMode::parse(lookup("RUN_MODE").as_deref().unwrap_or("production"));
        let engine = lookup("ENGINE").unwrap_or_else(|| DEFAULT_ENGINE.to_string());

        Settings {
            host,
            port,
            run_mode,
            engine,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Everything ambient the launcher needs, captured once and passed along
/// instead of re-reading process state from scattered call sites.
pub struct StartupContext {
    pub root: PathBuf,
    pub settings: Settings,
}

impl StartupContext {
    pub fn from_env() -> Result<Self, Box<dyn Error>> {
        let root = env::current_dir()
            .map_err(|e| format!("Failed to resolve the working directory: {}", e))?;
        Ok(StartupContext {
            root,
            settings: Settings::from_env(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            pairs
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| value.to_string())
        }
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let settings = Settings::from_lookup(|_| None);
        assert_eq!(settings.port, 4000);
        assert_eq!(settings.host, "0.0.0.0");
        assert_eq!(settings.run_mode, RunMode::Production);
        assert_eq!(settings.engine, "zola");
    }

    #[test]
    fn environment_overrides_are_picked_up() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("PORT", "8080"),
            ("HOST", "127.0.0.1"),
            ("RUN_MODE", "development"),
            ("ENGINE", "hugo"),
        ]));
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.host, "127.0.0.1");
        assert_eq!(settings.run_mode, RunMode::Development);
        assert_eq!(settings.engine, "hugo");
    }

    #[test]
    fn unparsable_port_falls_back_to_default() {
        let settings = Settings::from_lookup(lookup_from(&[("PORT", "not-a-port")]));
        assert_eq!(settings.port, 4000);
    }

    #[test]
    fn only_the_exact_production_marker_is_production() {
        assert_eq!(RunMode::parse("production"), RunMode::Production);
        assert_eq!(RunMode::parse("Production"), RunMode::Development);
        assert_eq!(RunMode::parse("staging"), RunMode::Development);
        assert_eq!(RunMode::parse(""), RunMode::Development);
    }

    #[test]
    fn url_combines_host_and_port() {
        let settings = Settings::from_lookup(|_| None);
        assert_eq!(settings.url(), "http://0.0.0.0:4000");
    }
}
