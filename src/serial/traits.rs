//! Serial port trait for abstraction and testability
//!
//! The command reader works against [`SerialPort`]; on the device it is
//! backed by [`IoPort`] over the USB Serial JTAG halves, in tests by
//! `MockSerialPort`.

use core::future::Future;

/// Errors that can occur during serial operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialError {
    /// Framing error in received data
    FramingError,
    /// Buffer overflow
    OverflowError,
    /// Read error reported by the transport
    ReadError,
    /// Write error
    WriteError,
}

/// Abstract serial port interface
pub trait SerialPort {
    /// Read bytes into buffer
    ///
    /// Returns the number of bytes actually read, which may be fewer than
    /// the buffer size.
    fn read(&mut self, buf: &mut [u8]) -> impl Future<Output = Result<usize, SerialError>>;

    /// Write all bytes from buffer
    fn write(&mut self, data: &[u8]) -> impl Future<Output = Result<(), SerialError>>;

    fn flush(&mut self) -> impl Future<Output = Result<(), SerialError>>;
}

/// A serial port built from separate `embedded_io_async` read and write halves
#[cfg(feature = "embedded")]
pub struct IoPort<R, W> {
    rx: R,
    tx: W,
}

#[cfg(feature = "embedded")]
impl<R, W> IoPort<R, W>
where
    R: embedded_io_async::Read,
    W: embedded_io_async::Write,
{
    pub fn new(rx: R, tx: W) -> Self {
        Self { rx, tx }
    }
}

#[cfg(feature = "embedded")]
impl<R, W> SerialPort for IoPort<R, W>
where
    R: embedded_io_async::Read,
    W: embedded_io_async::Write,
{
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, SerialError> {
        self.rx.read(buf).await.map_err(|_| SerialError::ReadError)
    }

    async fn write(&mut self, data: &[u8]) -> Result<(), SerialError> {
        self.tx
            .write_all(data)
            .await
            .map_err(|_| SerialError::WriteError)
    }

    async fn flush(&mut self) -> Result<(), SerialError> {
        self.tx.flush().await.map_err(|_| SerialError::WriteError)
    }
}
