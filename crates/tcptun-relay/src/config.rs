use tcptun_frame::MAX_PACKET_SIZE;

use crate::error::{RelayError, Result};

/// Configuration for a relay session.
///
/// Fixed for the lifetime of the session; pass it at construction.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Size of the device read buffer, i.e. the largest packet the device may
    /// produce. Default and upper bound: 65535, the largest framable packet.
    pub max_packet_size: usize,
    /// Log every transfer at debug level.
    pub debug_packets: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            max_packet_size: MAX_PACKET_SIZE,
            debug_packets: false,
        }
    }
}

impl RelayConfig {
    /// Enable or disable per-packet debug logging.
    pub fn with_debug_packets(mut self, enabled: bool) -> Self {
        self.debug_packets = enabled;
        self
    }

    /// Override the device read buffer size.
    pub fn with_max_packet_size(mut self, size: usize) -> Self {
        self.max_packet_size = size;
        self
    }

    /// Reject configurations the wire format cannot carry.
    pub fn validate(&self) -> Result<()> {
        if self.max_packet_size == 0 {
            return Err(RelayError::InvalidConfig(
                "max_packet_size must be at least 1".to_string(),
            ));
        }
        if self.max_packet_size > MAX_PACKET_SIZE {
            return Err(RelayError::InvalidConfig(format!(
                "max_packet_size {} exceeds the 16-bit frame limit of {MAX_PACKET_SIZE}",
                self.max_packet_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = RelayConfig::default();
        assert_eq!(config.max_packet_size, 65535);
        assert!(!config.debug_packets);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_buffer_rejected() {
        let config = RelayConfig::default().with_max_packet_size(0);
        assert!(matches!(config.validate(), Err(RelayError::InvalidConfig(_))));
    }

    #[test]
    fn buffer_above_frame_limit_rejected() {
        let config = RelayConfig::default().with_max_packet_size(65536);
        assert!(matches!(config.validate(), Err(RelayError::InvalidConfig(_))));
    }

    #[test]
    fn builder_methods_apply() {
        let config = RelayConfig::default()
            .with_debug_packets(true)
            .with_max_packet_size(2000);
        assert!(config.debug_packets);
        assert_eq!(config.max_packet_size, 2000);
        assert!(config.validate().is_ok());
    }
}
