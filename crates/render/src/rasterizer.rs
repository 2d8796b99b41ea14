//! Turning rendered HTML into the downloadable file. PDF conversion goes
//! through wkhtmltopdf when it is available; the HTML itself is the fallback.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::{error, info, warn};

use cotiza_core::config::RasterizerMode;

#[derive(Debug, Error)]
pub enum RasterizeError {
    #[error("conversion error: {0}")]
    Conversion(String),
    #[error("wkhtmltopdf not found")]
    WkhtmltopdfNotFound,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of rasterization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderedFile {
    Pdf(Vec<u8>),
    Html(String),
}

impl RenderedFile {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf(_) => "pdf",
            Self::Html(_) => "html",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Pdf(_) => "application/pdf",
            Self::Html(_) => "text/html; charset=utf-8",
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Pdf(bytes) => bytes,
            Self::Html(html) => html.as_bytes(),
        }
    }
}

#[async_trait]
pub trait Rasterizer: Send + Sync {
    fn name(&self) -> &'static str;

    async fn rasterize(&self, html: &str) -> Result<RenderedFile, RasterizeError>;
}

/// Hands the HTML through unchanged, for printing from a browser.
#[derive(Clone, Debug, Default)]
pub struct HtmlRasterizer;

#[async_trait]
impl Rasterizer for HtmlRasterizer {
    fn name(&self) -> &'static str {
        "html"
    }

    async fn rasterize(&self, html: &str) -> Result<RenderedFile, RasterizeError> {
        Ok(RenderedFile::Html(html.to_owned()))
    }
}

#[derive(Clone, Debug)]
pub struct WkhtmltopdfRasterizer {
    binary: PathBuf,
    fallback_to_html: bool,
}

impl WkhtmltopdfRasterizer {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self { binary: binary.into(), fallback_to_html: false }
    }

    /// Finds `wkhtmltopdf` on `PATH`.
    pub fn detect() -> Option<Self> {
        which::which("wkhtmltopdf").ok().map(Self::new)
    }

    /// Returns the HTML instead of failing when the conversion breaks.
    pub fn with_html_fallback(mut self) -> Self {
        self.fallback_to_html = true;
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    async fn convert_html_to_pdf(&self, html: &str) -> Result<Vec<u8>, RasterizeError> {
        let temp_dir = std::env::temp_dir();
        let job = uuid::Uuid::new_v4();
        let html_path = temp_dir.join(format!("cotizacion_{job}.html"));
        let pdf_path = temp_dir.join(format!("cotizacion_{job}.pdf"));

        tokio::fs::write(&html_path, html).await?;

        // A4 at 96 dpi is the 794x1122 px page the template is laid out for.
        let output = Command::new(&self.binary)
            .args(["--page-size", "A4"])
            .args(["--orientation", "Portrait"])
            .args(["--margin-top", "0", "--margin-bottom", "0"])
            .args(["--margin-left", "0", "--margin-right", "0"])
            .args(["--encoding", "utf-8"])
            .arg("--enable-local-file-access")
            .arg(&html_path)
            .arg(&pdf_path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        let output = match output {
            Ok(output) => output,
            Err(err) => {
                let _ = tokio::fs::remove_file(&html_path).await;
                return Err(err.into());
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(event_name = "render.pdf_conversion_failed", stderr = %stderr, "wkhtmltopdf failed");
            let _ = tokio::fs::remove_file(&html_path).await;
            let _ = tokio::fs::remove_file(&pdf_path).await;
            return Err(RasterizeError::Conversion(stderr.to_string()));
        }

        let pdf_bytes = tokio::fs::read(&pdf_path).await;

        let _ = tokio::fs::remove_file(&html_path).await;
        let _ = tokio::fs::remove_file(&pdf_path).await;

        let pdf_bytes = pdf_bytes?;
        info!(event_name = "render.pdf_generated", size = pdf_bytes.len(), "PDF generated successfully");
        Ok(pdf_bytes)
    }
}

#[async_trait]
impl Rasterizer for WkhtmltopdfRasterizer {
    fn name(&self) -> &'static str {
        "wkhtmltopdf"
    }

    async fn rasterize(&self, html: &str) -> Result<RenderedFile, RasterizeError> {
        match self.convert_html_to_pdf(html).await {
            Ok(bytes) => Ok(RenderedFile::Pdf(bytes)),
            Err(e) if self.fallback_to_html => {
                warn!(error = %e, "PDF conversion failed, falling back to HTML");
                Ok(RenderedFile::Html(html.to_owned()))
            }
            Err(e) => Err(e),
        }
    }
}

pub fn is_wkhtmltopdf_available() -> bool {
    which::which("wkhtmltopdf").is_ok()
}

/// Picks the rasterizer for the configured mode. `Auto` never fails: without
/// wkhtmltopdf it degrades to HTML output.
pub fn rasterizer_for(mode: RasterizerMode) -> Result<Box<dyn Rasterizer>, RasterizeError> {
    match mode {
        RasterizerMode::Html => Ok(Box::new(HtmlRasterizer)),
        RasterizerMode::Wkhtmltopdf => WkhtmltopdfRasterizer::detect()
            .map(|rasterizer| Box::new(rasterizer) as Box<dyn Rasterizer>)
            .ok_or(RasterizeError::WkhtmltopdfNotFound),
        RasterizerMode::Auto => match WkhtmltopdfRasterizer::detect() {
            Some(rasterizer) => {
                info!(path = %rasterizer.binary().display(), "wkhtmltopdf found");
                Ok(Box::new(rasterizer.with_html_fallback()))
            }
            None => {
                warn!("wkhtmltopdf not found in PATH - exports will be written as HTML");
                Ok(Box::new(HtmlRasterizer))
            }
        },
    }
}
