// ABOUTME: Serial port link to a GSM modem using blocking serialport I/O off the async runtime
// ABOUTME: Saves the device's terminal settings on open and puts them back on close

use crate::client::ModemLink;
use bytes::BytesMut;
use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::fmt;
use std::io;
use std::time::Duration;
use tracing::{debug, warn};

/// Largest chunk taken from the port per read
const READ_CHUNK: usize = 256;

/// Modem link over a character device, 8N1 without flow control
///
/// Every transfer runs on tokio's blocking pool with the port's own timeout
/// set to the time left, so a silent modem never blocks longer than asked.
pub struct SerialLink {
    device: String,
    port: Option<Box<dyn SerialPort>>,
    #[cfg(unix)]
    saved: Option<termios::SavedTermios>,
}

impl SerialLink {
    pub fn open(device: &str, baud_rate: u32) -> io::Result<Self> {
        let with_context =
            |e: io::Error| io::Error::new(e.kind(), format!("Can't open serial port '{device}': {e}"));

        #[cfg(unix)]
        let saved = termios::SavedTermios::capture(device).map_err(with_context)?;

        let port = serialport::new(device, baud_rate)
            .data_bits(DataBits::Eight)
            .stop_bits(StopBits::One)
            .parity(Parity::None)
            .flow_control(FlowControl::None)
            .timeout(Duration::from_secs(1))
            .open()
            .map_err(|e| with_context(e.into()))?;

        // Drop whatever the modem sent before we were listening
        port.clear(ClearBuffer::Input)?;
        debug!("Serial port {} open at {} baud", device, baud_rate);

        Ok(SerialLink {
            device: device.to_string(),
            port: Some(port),
            #[cfg(unix)]
            saved: Some(saved),
        })
    }

    /// Run `f` against the port on the blocking pool
    async fn with_port<T, F>(&mut self, f: F) -> io::Result<T>
    where
        F: FnOnce(&mut dyn SerialPort) -> io::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let mut port = self
            .port
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "serial port closed"))?;

        let (port, result) = tokio::task::spawn_blocking(move || {
            let result = f(port.as_mut());
            (port, result)
        })
        .await
        .map_err(io::Error::other)?;

        self.port = Some(port);
        result
    }
}

impl ModemLink for SerialLink {
    async fn send(&mut self, data: &[u8], timeout: Duration) -> io::Result<()> {
        let data = data.to_vec();
        self.with_port(move |port| {
            port.set_timeout(timeout)?;
            port.write_all(&data)?;
            port.flush()
        })
        .await
    }

    async fn recv(&mut self, buf: &mut BytesMut, timeout: Duration) -> io::Result<usize> {
        let chunk = self
            .with_port(move |port| {
                port.set_timeout(timeout)?;
                let mut chunk = [0u8; READ_CHUNK];
                let n = port.read(&mut chunk)?;
                Ok(chunk[..n].to_vec())
            })
            .await?;

        buf.extend_from_slice(&chunk);
        Ok(chunk.len())
    }

    async fn close(&mut self) -> io::Result<()> {
        drop(self.port.take());

        #[cfg(unix)]
        {
            if let Some(saved) = self.saved.take() {
                saved.restore(&self.device)?;
            }
        }

        debug!("Serial port {} closed", self.device);
        Ok(())
    }
}

impl Drop for SerialLink {
    fn drop(&mut self) {
        drop(self.port.take());

        #[cfg(unix)]
        {
            if let Some(saved) = self.saved.take() {
                if let Err(e) = saved.restore(&self.device) {
                    warn!("Restoring terminal settings of {}: {}", self.device, e);
                }
            }
        }
    }
}

impl fmt::Debug for SerialLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialLink")
            .field("device", &self.device)
            .field("open", &self.port.is_some())
            .finish()
    }
}

#[cfg(unix)]
mod termios {
    use std::fs::{File, OpenOptions};
    use std::io;
    use std::mem::MaybeUninit;
    use std::os::unix::fs::OpenOptionsExt;
    use std::os::unix::io::AsRawFd;

    /// Terminal settings of a device as found before we touched it
    pub struct SavedTermios(libc::termios);

    fn open_device(device: &str) -> io::Result<File> {
        OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY | libc::O_NONBLOCK)
            .open(device)
    }

    impl SavedTermios {
        pub fn capture(device: &str) -> io::Result<Self> {
            let file = open_device(device)?;
            let mut tio = MaybeUninit::<libc::termios>::uninit();
            // SAFETY: the fd is open for the lifetime of `file` and tcgetattr
            // fills the whole struct on success.
            if unsafe { libc::tcgetattr(file.as_raw_fd(), tio.as_mut_ptr()) } != 0 {
                return Err(io::Error::last_os_error());
            }
            Ok(SavedTermios(unsafe { tio.assume_init() }))
        }

        pub fn restore(&self, device: &str) -> io::Result<()> {
            let file = open_device(device)?;
            // SAFETY: the fd is open and `self.0` came from tcgetattr.
            if unsafe { libc::tcsetattr(file.as_raw_fd(), libc::TCSANOW, &self.0) } != 0 {
                return Err(io::Error::last_os_error());
            }
            Ok(())
        }
    }
}
