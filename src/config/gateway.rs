//! Connection gateway configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::adapters::websocket::HubConfig;

/// Queue sizing for the room hub.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Events queued per connection before further deliveries are dropped
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer: usize,

    /// Commands queued for the hub task
    #[serde(default = "default_command_buffer")]
    pub command_buffer: usize,
}

impl GatewayConfig {
    pub fn hub(&self) -> HubConfig {
        HubConfig {
            command_buffer: self.command_buffer,
            outbound_buffer: self.outbound_buffer,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.outbound_buffer == 0 || self.command_buffer == 0 {
            return Err(ValidationError::InvalidBufferSize);
        }
        Ok(())
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            outbound_buffer: default_outbound_buffer(),
            command_buffer: default_command_buffer(),
        }
    }
}

fn default_outbound_buffer() -> usize {
    64
}

fn default_command_buffer() -> usize {
    1024
}
