use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chromiumoxide::{
    browser::{Browser, BrowserConfig},
    cdp::browser_protocol::page::{CaptureScreenshotFormat, PrintToPdfParamsBuilder},
    error::CdpError,
    page::ScreenshotParams,
};
use futures::StreamExt;
use thiserror::Error;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::cnfg::{AppConfig, AppEnv};

/// Process-isolation flags for containerized production hosts. Development
/// launches with chromiumoxide defaults.
const PRODUCTION_ARGS: [&str; 4] = [
    "--no-sandbox",
    "--disable-setuid-sandbox",
    "--single-process",
    "--no-zygote",
];

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid browser configuration: {0}")]
    Config(String),

    #[error("failed to launch browser: {0}")]
    Launch(#[source] CdpError),

    #[error("navigation failed: {0}")]
    Navigate(#[source] CdpError),

    #[error("capture failed: {0}")]
    Capture(#[source] CdpError),

    #[error("scratch file error: {0}")]
    Scratch(#[from] std::io::Error),
}

/// Produces render output bytes for the two routes. The seam exists so the
/// router can be exercised without a Chrome binary.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Full-page PNG of the page at `url`.
    async fn screenshot(&self, url: &str) -> Result<Vec<u8>, RenderError>;

    /// A4 PDF of the supplied markup.
    async fn document(&self, html: &str) -> Result<Vec<u8>, RenderError>;
}

/// One browser process serving one request. Capture methods borrow the job;
/// [`RenderJob::shutdown`] consumes it, so the process is closed on every
/// exit path before the capture result propagates.
struct RenderJob {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl RenderJob {
    async fn launch(env: AppEnv, executable: Option<&Path>) -> Result<Self, RenderError> {
        let mut builder = BrowserConfig::builder().viewport(None);

        if env == AppEnv::Production {
            if let Some(path) = executable {
                builder = builder.chrome_executable(path);
            }
            builder = builder.args(PRODUCTION_ARGS);
        }

        let config = builder.build().map_err(RenderError::Config)?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(RenderError::Launch)?;

        // The CDP event stream must be polled for the browser to make any
        // progress. WebSocket deserialization errors show up on it routinely
        // and are not fatal, so the loop ignores item results.
        let handler = tokio::task::spawn(async move {
            while handler.next().await.is_some() {}
        });

        Ok(RenderJob { browser, handler })
    }

    async fn capture_screenshot(&self, url: &str) -> Result<Vec<u8>, RenderError> {
        let page = self
            .browser
            .new_page(url)
            .await
            .map_err(RenderError::Navigate)?;
        page.wait_for_navigation()
            .await
            .map_err(RenderError::Navigate)?;

        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build();

        page.screenshot(params).await.map_err(RenderError::Capture)
    }

    async fn capture_pdf(&self, file_url: &str) -> Result<Vec<u8>, RenderError> {
        let page = self
            .browser
            .new_page(file_url)
            .await
            .map_err(RenderError::Navigate)?;
        page.wait_for_navigation()
            .await
            .map_err(RenderError::Navigate)?;

        // A4 portrait, keeping CSS backgrounds.
        let params = PrintToPdfParamsBuilder::default()
            .paper_width(8.27)
            .paper_height(11.7)
            .print_background(true)
            .build();

        page.pdf(params).await.map_err(RenderError::Capture)
    }

    async fn shutdown(mut self) {
        if let Err(err) = self.browser.close().await {
            // A failed CDP close must not leave the child process running.
            tracing::error!("failed to close browser: {err}");
            if let Some(Err(err)) = self.browser.kill().await {
                tracing::error!("failed to kill browser process: {err}");
            }
        }
        if let Err(err) = self.browser.wait().await {
            tracing::error!("browser did not exit cleanly: {err}");
        }
        self.handler.abort();
    }
}

/// Temporary HTML file under the uploads directory for document renders.
/// Removed explicitly after the capture; `Drop` is a best-effort fallback so
/// no exit path leaks the file.
pub struct ScratchFile {
    path: PathBuf,
    removed: bool,
}

impl ScratchFile {
    pub async fn create(dir: &Path, html: &str) -> Result<Self, RenderError> {
        tokio::fs::create_dir_all(dir).await?;
        // Chrome needs an absolute path for file:// navigation.
        let dir = tokio::fs::canonicalize(dir).await?;
        let path = dir.join(format!("{}.html", Uuid::new_v4()));
        tokio::fs::write(&path, html).await?;

        Ok(ScratchFile {
            path,
            removed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn url(&self) -> String {
        format!("file://{}", self.path.display())
    }

    pub async fn remove(mut self) {
        self.removed = true;
        if let Err(err) = tokio::fs::remove_file(&self.path).await {
            tracing::error!(
                "failed to remove scratch file {}: {err}",
                self.path.display()
            );
        }
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if !self.removed {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

/// Production [`Renderer`]: one dedicated browser process per request, torn
/// down before the response is sent.
pub struct ChromeRenderer {
    env: AppEnv,
    executable: Option<PathBuf>,
    uploads_dir: PathBuf,
}

impl ChromeRenderer {
    pub fn new(config: &AppConfig) -> Self {
        ChromeRenderer {
            env: config.env,
            executable: config.chrome_executable.clone(),
            uploads_dir: config.uploads_dir.clone(),
        }
    }

    async fn launch(&self) -> Result<RenderJob, RenderError> {
        RenderJob::launch(self.env, self.executable.as_deref()).await
    }
}

#[async_trait]
impl Renderer for ChromeRenderer {
    async fn screenshot(&self, url: &str) -> Result<Vec<u8>, RenderError> {
        let job = self.launch().await?;
        let result = job.capture_screenshot(url).await;
        job.shutdown().await;
        result
    }

    async fn document(&self, html: &str) -> Result<Vec<u8>, RenderError> {
        let scratch = ScratchFile::create(&self.uploads_dir, html).await?;

        let job = match self.launch().await {
            Ok(job) => job,
            Err(err) => {
                scratch.remove().await;
                return Err(err);
            }
        };

        let result = job.capture_pdf(&scratch.url()).await;
        job.shutdown().await;
        scratch.remove().await;

        result
    }
}
