//! Server configuration from the environment.

use std::net::SocketAddr;

use algoviz_player::SpeedLevel;

use crate::error::{Error, Result};

pub const ADDR_VAR: &str = "ALGOVIZ_ADDR";
pub const SPEED_VAR: &str = "ALGOVIZ_SPEED";
pub const SEED_VAR: &str = "ALGOVIZ_SEED";

/// Configuration for the visualization server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisConfig {
    /// Address to listen on
    pub addr: SocketAddr,
    /// Initial speed level (1 = slowest, 10 = fastest)
    pub speed: SpeedLevel,
    /// Seed for generated inputs
    pub seed: u64,
}

impl Default for VisConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            speed: SpeedLevel::default(),
            seed: 42,
        }
    }
}

impl VisConfig {
    /// Read `ALGOVIZ_ADDR`, `ALGOVIZ_SPEED` and `ALGOVIZ_SEED`, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(addr) = lookup(ADDR_VAR) {
            config.addr = addr
                .trim()
                .parse()
                .map_err(|e| Error::Config(format!("{}={:?}: {}", ADDR_VAR, addr, e)))?;
        }
        if let Some(speed) = lookup(SPEED_VAR) {
            let level: u8 = speed
                .trim()
                .parse()
                .map_err(|e| Error::Config(format!("{}={:?}: {}", SPEED_VAR, speed, e)))?;
            config.speed = SpeedLevel::try_from(level).map_err(Error::Config)?;
        }
        if let Some(seed) = lookup(SEED_VAR) {
            config.seed = seed
                .trim()
                .parse()
                .map_err(|e| Error::Config(format!("{}={:?}: {}", SEED_VAR, seed, e)))?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_without_variables() {
        assert_eq!(VisConfig::from_lookup(lookup(&[])).unwrap(), VisConfig::default());
    }

    #[test]
    fn reads_every_variable() {
        let config = VisConfig::from_lookup(lookup(&[
            (ADDR_VAR, "0.0.0.0:8080"),
            (SPEED_VAR, "9"),
            (SEED_VAR, "7"),
        ]))
        .unwrap();
        assert_eq!(config.addr.port(), 8080);
        assert_eq!(config.speed.get(), 9);
        assert_eq!(config.seed, 7);
    }

    #[test]
    fn invalid_values_are_config_errors() {
        for vars in [
            [(ADDR_VAR, "nowhere")],
            [(SPEED_VAR, "11")],
            [(SPEED_VAR, "fast")],
            [(SEED_VAR, "-1")],
        ] {
            assert!(matches!(VisConfig::from_lookup(lookup(&vars)), Err(Error::Config(_))));
        }
    }
}
