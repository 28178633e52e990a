//! Serial port channel.

use std::io;
use std::thread;
use std::time::Duration;

use serialport::SerialPort;

use super::{ByteChannel, StreamChannel};
use crate::core::{DEFAULT_BAUD_RATE, DEFAULT_PORT, DEFAULT_SETTLE_DELAY, DEFAULT_TIMEOUT};
use crate::engine::ProtocolError;

/// Connection parameters for the accelerator's UART.
///
/// These are configuration, not protocol: the wire format does not change
/// with any of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    path: String,
    baud_rate: u32,
    timeout: Duration,
    settle_delay: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PORT)
    }
}

impl SerialConfig {
    /// Default parameters for the device at `path`.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: DEFAULT_TIMEOUT,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    /// Set the baud rate.
    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Set the per-word read timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the pause between opening the port and the first exchange.
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Device path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Configured baud rate.
    pub fn get_baud_rate(&self) -> u32 {
        self.baud_rate
    }

    /// Configured read timeout.
    pub fn get_timeout(&self) -> Duration {
        self.timeout
    }

    /// Open the port described by this configuration.
    pub fn open(&self) -> Result<SerialChannel, ProtocolError> {
        SerialChannel::open(self)
    }
}

/// A [`ByteChannel`] over a serial port.
pub struct SerialChannel {
    inner: StreamChannel<Box<dyn SerialPort>>,
    path: String,
}

impl std::fmt::Debug for SerialChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialChannel")
            .field("path", &self.path)
            .field("timeout", &self.inner.timeout())
            .finish()
    }
}

impl SerialChannel {
    /// Open and configure the port, then wait out the settle delay.
    pub fn open(config: &SerialConfig) -> Result<Self, ProtocolError> {
        let port = serialport::new(config.path.as_str(), config.baud_rate)
            .timeout(config.timeout)
            .open()
            .map_err(|e| ProtocolError::ChannelUnavailable {
                path: config.path.clone(),
                reason: e.to_string(),
            })?;

        if !config.settle_delay.is_zero() {
            thread::sleep(config.settle_delay);
        }
        tracing::info!(
            "Connected to {} at {} baud",
            config.path,
            config.baud_rate
        );

        Ok(Self {
            inner: StreamChannel::with_timeout(port, config.timeout),
            path: config.path.clone(),
        })
    }

    /// Device path this channel was opened on.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl ByteChannel for SerialChannel {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.inner.write(bytes)
    }

    fn read_exactly(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read_exactly(buf)
    }

    fn close(&mut self) -> io::Result<()> {
        self.inner.close()?;
        tracing::info!("Connection to {} closed", self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = SerialConfig::default();
        assert_eq!(config.path(), DEFAULT_PORT);
        assert_eq!(config.get_baud_rate(), 115_200);
        assert_eq!(config.get_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn test_config_builder() {
        let config = SerialConfig::new("/dev/ttyS3")
            .baud_rate(9600)
            .timeout(Duration::from_millis(500))
            .settle_delay(Duration::ZERO);

        assert_eq!(config.path(), "/dev/ttyS3");
        assert_eq!(config.get_baud_rate(), 9600);
        assert_eq!(config.get_timeout(), Duration::from_millis(500));
    }

    #[test]
    fn test_open_missing_port() {
        let config = SerialConfig::new("/dev/vpu-does-not-exist").settle_delay(Duration::ZERO);
        let err = config.open().unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::ChannelUnavailable { ref path, .. } if path == "/dev/vpu-does-not-exist"
        ));
    }
}
