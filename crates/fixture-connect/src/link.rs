//! Wiring a session to a control surface

use crate::config::ConnectConfig;
use crate::error::ConnectError;
use crate::session::{ConnectHandle, FixtureConnect};
use crate::surface::ControlSurface;
use fixture_protocol::{BoxTransport, ChannelTransport, DuplexTransport};
use fixture_sandbox::RenderEnvironment;
use std::fmt;
use std::str::FromStr;

/// In-memory pipe size for stream links
pub const STREAM_BUFFER_BYTES: usize = 64 * 1024;

/// Which transport carries the protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportKind {
    /// In-process mpsc channels
    #[default]
    Channel,
    /// Newline-delimited JSON over a byte stream
    Stream,
}

impl TransportKind {
    pub const ALL: [TransportKind; 2] = [TransportKind::Channel, TransportKind::Stream];

    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TransportKind::Channel => "channel",
            TransportKind::Stream => "stream",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportKind {
    type Err = ConnectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "channel" => Ok(TransportKind::Channel),
            "stream" => Ok(TransportKind::Stream),
            other => Err(ConnectError::InvalidConfig(format!("unknown transport '{other}'"))),
        }
    }
}

/// Connected ends: `(control surface, engine)`
#[must_use]
pub fn transport_pair(kind: TransportKind, config: &ConnectConfig) -> (BoxTransport, BoxTransport) {
    match kind {
        TransportKind::Channel => {
            let (surface, engine) =
                ChannelTransport::pair_with(config.command_buffer, config.event_buffer);
            (Box::new(surface), Box::new(engine))
        }
        TransportKind::Stream => {
            let (surface, engine) = DuplexTransport::duplex(STREAM_BUFFER_BYTES);
            (Box::new(surface), Box::new(engine))
        }
    }
}

/// Spawn a session over `env` and return it with its control surface
///
/// Must be called inside a tokio runtime.
///
/// # Errors
/// `ConnectError::InvalidConfig` if the config does not validate
pub fn connect<E: RenderEnvironment>(
    env: E,
    kind: TransportKind,
    config: &ConnectConfig,
) -> Result<(ConnectHandle, ControlSurface<BoxTransport>), ConnectError> {
    config.validate()?;
    let renderer_id = config.renderer_id_or_generate();
    let config = config.clone().with_renderer_id(renderer_id.clone());

    let (surface, engine) = transport_pair(kind, &config);
    let handle = FixtureConnect::new(env, engine, &config).spawn();
    let surface = ControlSurface::new(surface, renderer_id, config.until_timeout());
    Ok((handle, surface))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_kind_parses() {
        for kind in TransportKind::ALL {
            assert_eq!(kind.as_str().parse::<TransportKind>().unwrap(), kind);
        }
        assert!("carrier-pigeon".parse::<TransportKind>().is_err());
    }
}
