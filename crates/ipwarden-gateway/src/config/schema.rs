use std::net::SocketAddr;

use ipnet::IpNet;
use serde::Deserialize;
use ipwarden_core::error::{Result, WardenError};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub safety: SafetySection,

    #[serde(default)]
    pub expiry: ExpirySection,
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(WardenError::BadConfig(format!(
                "unsupported config version {} (expected 1)",
                self.version
            )));
        }

        self.server.validate()?;
        self.safety.validate()?;
        self.expiry.validate()?;

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr().map(|_| ())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|_| {
            WardenError::BadConfig(format!(
                "server.listen must be a socket address (got {:?})",
                self.listen
            ))
        })
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}

/// Operator-supplied protected ranges, added to the built-in ones.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct SafetySection {
    #[serde(default)]
    pub extra_ranges: Vec<String>,
}

impl SafetySection {
    pub fn validate(&self) -> Result<()> {
        self.parsed_ranges().map(|_| ())
    }

    /// Entries may be CIDR blocks or bare addresses (taken as /32 or /128).
    pub fn parsed_ranges(&self) -> Result<Vec<IpNet>> {
        self.extra_ranges
            .iter()
            .map(|raw| {
                let s = raw.trim();
                s.parse::<IpNet>()
                    .or_else(|_| s.parse::<std::net::IpAddr>().map(IpNet::from))
                    .map_err(|_| {
                        WardenError::BadConfig(format!(
                            "invalid safety.extra_ranges entry: {raw} (expected CIDR or address)"
                        ))
                    })
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExpirySection {
    /// Full-store sweep period. 0 disables the sweep (lazy expiration only).
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for ExpirySection {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl ExpirySection {
    pub fn validate(&self) -> Result<()> {
        if self.sweep_interval_secs > 86_400 {
            return Err(WardenError::BadConfig(
                "expiry.sweep_interval_secs must be between 0 and 86400".into(),
            ));
        }
        Ok(())
    }
}

fn default_sweep_interval_secs() -> u64 {
    60
}
