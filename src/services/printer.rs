use std::fmt::Write as _;
use std::future::Future;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::models::job::LabelSpec;

/// Physical label printer capability.
pub trait Printer: Send + Sync + 'static {
    /// Print every copy of the label described by `spec`.
    fn print(&self, spec: &LabelSpec) -> impl Future<Output = Result<(), PrinterError>> + Send;

    /// Advisory reachability check used before accepting a job.
    fn device_reachable(
        &self,
        vendor_id: &str,
        product_id: &str,
    ) -> impl Future<Output = bool> + Send;
}

/// TSPL label printer reached over a raw TCP socket (port 9100 style).
pub struct TsplPrinter {
    addr: String,
    io_timeout: Duration,
}

impl TsplPrinter {
    pub fn new(addr: impl Into<String>, io_timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            io_timeout,
        }
    }

    async fn connect(&self) -> Result<TcpStream, PrinterError> {
        timeout(self.io_timeout, TcpStream::connect(&self.addr))
            .await
            .map_err(|_| PrinterError::Timeout(self.io_timeout))?
            .map_err(PrinterError::Connect)
    }
}

impl Printer for TsplPrinter {
    async fn print(&self, spec: &LabelSpec) -> Result<(), PrinterError> {
        let program = render_tspl(spec);
        let mut stream = self.connect().await?;

        timeout(self.io_timeout, async {
            stream.write_all(program.as_bytes()).await?;
            stream.flush().await?;
            stream.shutdown().await
        })
        .await
        .map_err(|_| PrinterError::Timeout(self.io_timeout))?
        .map_err(PrinterError::Io)?;

        tracing::debug!(
            printer = %self.addr,
            bytes = program.len(),
            copies = spec.print_count,
            "TSPL program sent"
        );
        Ok(())
    }

    async fn device_reachable(&self, vendor_id: &str, product_id: &str) -> bool {
        match self.connect().await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(
                    printer = %self.addr,
                    vendor_id,
                    product_id,
                    error = %e,
                    "Printer not reachable"
                );
                false
            }
        }
    }
}

/// Render a TSPL program for one label spec: optional heading text above a
/// Code 128 barcode, repeated `print_count` times.
pub fn render_tspl(spec: &LabelSpec) -> String {
    let mut out = String::new();
    let _ = write!(out, "SIZE {} mm, {} mm\r\n", spec.width_mm, spec.height_mm);
    out.push_str("GAP 2 mm, 0 mm\r\n");
    let _ = write!(out, "DIRECTION {}\r\n", i16::from(spec.orientation));
    out.push_str("CLS\r\n");

    let barcode_y = if spec.top_text.is_empty() {
        10
    } else {
        let _ = write!(out, "TEXT 10,10,\"3\",0,1,1,\"{}\"\r\n", escape(&spec.top_text));
        50
    };

    let _ = write!(
        out,
        "BARCODE 10,{},\"128\",50,1,0,2,2,\"{}\"\r\n",
        barcode_y,
        escape(&spec.barcode_data)
    );
    let _ = write!(out, "PRINT {},1\r\n", spec.print_count);
    out
}

// TSPL string literals: quotes use the \["] escape, line breaks would end the command.
fn escape(text: &str) -> String {
    text.chars()
        .filter(|c| *c != '\r' && *c != '\n')
        .fold(String::with_capacity(text.len()), |mut acc, c| {
            if c == '"' {
                acc.push_str("\\[\"]");
            } else {
                acc.push(c);
            }
            acc
        })
}

#[derive(Debug, thiserror::Error)]
pub enum PrinterError {
    #[error("Failed to connect to printer: {0}")]
    Connect(std::io::Error),

    #[error("Printer I/O failed: {0}")]
    Io(std::io::Error),

    #[error("Printer did not respond within {0:?}")]
    Timeout(Duration),
}
