/*! Transport settings.
*/

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use shroud_packet::transport::PACKET_OVERHEAD;

/// Default size of a packet: an ethernet MTU minus IPv4 and UDP headers.
pub const DEFAULT_PACKET_SIZE: usize = 1472;

/// Default parity shards per group of 256.
pub const DEFAULT_PARITY: u8 = 64;

/// Default time to wait for missing packets of a transmission, in seconds.
pub const DEFAULT_REASSEMBLY_TIMEOUT: u64 = 30;

/// Error that can happen when loading `TransmissionConfig`.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ConfigError {
    /// Packets can't carry any data.
    #[error("Packet size {packet_size} must be greater than {min}")]
    PacketTooSmall {
        /// Configured packet size.
        packet_size: usize,
        /// Packet overhead.
        min: usize,
    },
    /// Transmissions would expire immediately.
    #[error("Reassembly timeout must not be zero")]
    ZeroTimeout,
    /// Config is not valid YAML or has wrong fields.
    #[error("Invalid config: {0}")]
    Yaml(String),
}

/** How payloads are split into packets and put back together.

```yaml
packet-size: 1472
parity: 64
reassembly-timeout: 30
```
*/
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct TransmissionConfig {
    /// Size of every packet including its overhead
    pub packet_size: usize,
    /// Parity shards per group of 256
    pub parity: u8,
    /// Seconds to wait for missing packets
    pub reassembly_timeout: u64,
}

impl Default for TransmissionConfig {
    fn default() -> Self {
        TransmissionConfig {
            packet_size: DEFAULT_PACKET_SIZE,
            parity: DEFAULT_PARITY,
            reassembly_timeout: DEFAULT_REASSEMBLY_TIMEOUT,
        }
    }
}

impl TransmissionConfig {
    /// Parse and validate config. Missing fields get their defaults.
    pub fn from_yaml(yaml: &str) -> Result<TransmissionConfig, ConfigError> {
        let config: TransmissionConfig = serde_yaml::from_str(yaml)
            .map_err(|e| ConfigError::Yaml(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that packets can carry data and transmissions can complete.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.packet_size <= PACKET_OVERHEAD {
            return Err(ConfigError::PacketTooSmall { packet_size: self.packet_size, min: PACKET_OVERHEAD })
        }
        if self.reassembly_timeout == 0 {
            return Err(ConfigError::ZeroTimeout)
        }
        Ok(())
    }

    /// Reassembly timeout as `Duration`.
    pub fn reassembly_timeout(&self) -> Duration {
        Duration::from_secs(self.reassembly_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = TransmissionConfig::from_yaml("{}").unwrap();
        assert_eq!(config, TransmissionConfig::default());
        assert_eq!(config.reassembly_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn partial_yaml() {
        let config = TransmissionConfig::from_yaml("packet-size: 512\nparity: 0\n").unwrap();
        assert_eq!(config.packet_size, 512);
        assert_eq!(config.parity, 0);
        assert_eq!(config.reassembly_timeout, DEFAULT_REASSEMBLY_TIMEOUT);
    }

    #[test]
    fn packet_too_small() {
        assert_eq!(
            TransmissionConfig::from_yaml("packet-size: 91"),
            Err(ConfigError::PacketTooSmall { packet_size: 91, min: PACKET_OVERHEAD })
        );
    }

    #[test]
    fn zero_timeout() {
        assert_eq!(TransmissionConfig::from_yaml("reassembly-timeout: 0"), Err(ConfigError::ZeroTimeout));
    }

    #[test]
    fn invalid_yaml() {
        assert!(matches!(TransmissionConfig::from_yaml("parity: 300"), Err(ConfigError::Yaml(_))));
        assert!(matches!(TransmissionConfig::from_yaml("mtu: 1500"), Err(ConfigError::Yaml(_))));
    }
}
