//! Engine configuration

use crate::error::ConnectError;
use fixture_state::RendererId;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Connection engine settings
///
/// ```toml
/// poll_interval_ms = 50
/// until_timeout_ms = 1000
/// event_buffer = 64
/// command_buffer = 64
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectConfig {
    /// Renderer identity; generated when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renderer_id: Option<RendererId>,
    /// Change detector poll cadence while watching
    pub poll_interval_ms: u64,
    /// Hard timeout for best-effort waits
    pub until_timeout_ms: u64,
    /// Outbound event channel capacity
    pub event_buffer: usize,
    /// Inbound command channel capacity
    pub command_buffer: usize,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            renderer_id: None,
            poll_interval_ms: 50,
            until_timeout_ms: 1000,
            event_buffer: 64,
            command_buffer: 64,
        }
    }
}

impl ConnectConfig {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// `ConnectError::ConfigParse` on bad TOML, `ConnectError::InvalidConfig`
    /// on out-of-range values
    pub fn from_toml_str(text: &str) -> Result<Self, ConnectError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// I/O failures plus everything [`ConnectConfig::from_toml_str`] reports
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConnectError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Render as TOML
    ///
    /// # Errors
    /// `ConnectError::ConfigEncode` if serialization fails
    pub fn to_toml(&self) -> Result<String, ConnectError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values the engine cannot run with
    ///
    /// # Errors
    /// `ConnectError::InvalidConfig` naming the offending field
    pub fn validate(&self) -> Result<(), ConnectError> {
        if self.poll_interval_ms == 0 {
            return Err(ConnectError::InvalidConfig(
                "poll_interval_ms must be positive".to_string(),
            ));
        }
        if self.event_buffer == 0 || self.command_buffer == 0 {
            return Err(ConnectError::InvalidConfig(
                "channel buffers must be positive".to_string(),
            ));
        }
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn with_renderer_id(mut self, renderer_id: RendererId) -> Self {
        self.renderer_id = Some(renderer_id);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_until_timeout(mut self, timeout: Duration) -> Self {
        self.until_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_event_buffer(mut self, capacity: usize) -> Self {
        self.event_buffer = capacity;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_command_buffer(mut self, capacity: usize) -> Self {
        self.command_buffer = capacity;
        self
    }

    #[inline]
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[inline]
    #[must_use]
    pub fn until_timeout(&self) -> Duration {
        Duration::from_millis(self.until_timeout_ms)
    }

    /// Configured renderer id, or a fresh one
    #[must_use]
    pub fn renderer_id_or_generate(&self) -> RendererId {
        self.renderer_id.clone().unwrap_or_else(RendererId::generate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let config = ConnectConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_millis(50));
        assert_eq!(config.until_timeout(), Duration::from_secs(1));
        assert_eq!(config.event_buffer, 64);
        assert_eq!(config.command_buffer, 64);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = ConnectConfig::from_toml_str("poll_interval_ms = 10\nrenderer_id = \"r1\"").unwrap();
        assert_eq!(config.poll_interval_ms, 10);
        assert_eq!(config.until_timeout_ms, 1000);
        assert_eq!(config.renderer_id, Some(RendererId::new("r1")));
    }

    #[test]
    fn toml_round_trip() {
        let config = ConnectConfig::new()
            .with_poll_interval(Duration::from_millis(20))
            .with_event_buffer(8);
        let text = config.to_toml().unwrap();
        assert_eq!(ConnectConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn rejects_zero_poll_interval() {
        let err = ConnectConfig::from_toml_str("poll_interval_ms = 0").unwrap_err();
        assert!(matches!(err, ConnectError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_bad_toml() {
        let err = ConnectConfig::from_toml_str("poll_interval_ms = \"fast\"").unwrap_err();
        assert!(matches!(err, ConnectError::ConfigParse(_)));
    }

    #[test]
    fn generates_renderer_id_when_absent() {
        let config = ConnectConfig::default();
        assert_ne!(config.renderer_id_or_generate(), config.renderer_id_or_generate());

        let fixed = config.with_renderer_id(RendererId::new("r1"));
        assert_eq!(fixed.renderer_id_or_generate(), RendererId::new("r1"));
    }
}
