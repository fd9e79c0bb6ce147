use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use storynest_api::session::MAX_SESSION_DAYS;

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub db_path: PathBuf,
    pub session_days: i64,
    pub secure_cookies: bool,
    pub seed: bool,
    pub argon2: Option<Argon2Cost>,
}

#[derive(Debug, Clone, Copy)]
pub struct Argon2Cost {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = get("STORYNEST_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = get("STORYNEST_PORT")
            .unwrap_or_else(|| "5000".into())
            .parse()
            .context("STORYNEST_PORT must be a port number")?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .context("STORYNEST_HOST must be an IP address")?;

        let db_path = get("STORYNEST_DB_PATH").unwrap_or_else(|| "storynest.db".into()).into();

        let session_days: i64 = match get("STORYNEST_SESSION_DAYS") {
            Some(v) => v.trim().parse().context("STORYNEST_SESSION_DAYS must be an integer")?,
            None => 30,
        };
        if !(1..=MAX_SESSION_DAYS).contains(&session_days) {
            bail!(
                "STORYNEST_SESSION_DAYS must be between 1 and {}, got {}",
                MAX_SESSION_DAYS,
                session_days
            );
        }

        let argon2 = match (
            get("STORYNEST_ARGON2_MEMORY_KIB"),
            get("STORYNEST_ARGON2_ITERATIONS"),
            get("STORYNEST_ARGON2_PARALLELISM"),
        ) {
            (None, None, None) => None,
            (m, t, p) => Some(Argon2Cost {
                memory_kib: parse_or(m, argon2_default::MEMORY_KIB, "STORYNEST_ARGON2_MEMORY_KIB")?,
                iterations: parse_or(t, argon2_default::ITERATIONS, "STORYNEST_ARGON2_ITERATIONS")?,
                parallelism: parse_or(p, argon2_default::PARALLELISM, "STORYNEST_ARGON2_PARALLELISM")?,
            }),
        };

        Ok(Self {
            addr,
            db_path,
            session_days,
            secure_cookies: flag(get("STORYNEST_SECURE_COOKIES"), false),
            seed: flag(get("STORYNEST_SEED"), true),
            argon2,
        })
    }
}

/// Cost values of `Argon2::default()`, used when only some knobs are set.
mod argon2_default {
    pub const MEMORY_KIB: u32 = 19 * 1024;
    pub const ITERATIONS: u32 = 2;
    pub const PARALLELISM: u32 = 1;
}

fn parse_or(value: Option<String>, default: u32, key: &str) -> Result<u32> {
    match value {
        Some(v) => v.parse().with_context(|| format!("{} must be a positive integer", key)),
        None => Ok(default),
    }
}

fn flag(value: Option<String>, default: bool) -> bool {
    match value.as_deref().map(str::trim) {
        Some("1") | Some("true") | Some("yes") | Some("on") => true,
        Some("0") | Some("false") | Some("no") | Some("off") => false,
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.addr.to_string(), "0.0.0.0:5000");
        assert_eq!(cfg.db_path, PathBuf::from("storynest.db"));
        assert_eq!(cfg.session_days, 30);
        assert!(cfg.seed);
        assert!(!cfg.secure_cookies);
        assert!(cfg.argon2.is_none());
    }

    #[test]
    fn overrides() {
        let cfg = config(&[
            ("STORYNEST_HOST", "127.0.0.1"),
            ("STORYNEST_PORT", "8080"),
            ("STORYNEST_SEED", "false"),
            ("STORYNEST_ARGON2_ITERATIONS", "4"),
        ])
        .unwrap();
        assert_eq!(cfg.addr.to_string(), "127.0.0.1:8080");
        assert!(!cfg.seed);
        let cost = cfg.argon2.unwrap();
        assert_eq!(cost.iterations, 4);
        assert_eq!(cost.memory_kib, argon2_default::MEMORY_KIB);
    }

    #[test]
    fn bad_port_is_an_error() {
        assert!(config(&[("STORYNEST_PORT", "http")]).is_err());
    }

    #[test]
    fn session_days_must_be_in_range() {
        assert_eq!(config(&[("STORYNEST_SESSION_DAYS", "3650")]).unwrap().session_days, 3650);
        for days in ["0", "-1", "3651", "100000000", "9223372036854775807", "soon"] {
            assert!(config(&[("STORYNEST_SESSION_DAYS", days)]).is_err(), "{days}");
        }
    }
}
