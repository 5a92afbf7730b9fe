//! Fetch strategy coordination.
//!
//! Target pages lazy-load their media and sometimes gate content behind
//! client-side rendering, so retrieval tries a full headless-browser render
//! first: navigate, scroll to the bottom until the page stops growing, give
//! late content a moment to land, then capture the final markup. If the
//! rendered path fails for any reason (no browser binary, launch failure,
//! navigation timeout), a plain HTTP GET with a realistic browser identity
//! is the fallback. Each path is attempted at most once per call, and the
//! browser session is closed on every exit path.

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::options::FetchOptions;

/// Marker element whose presence signals that module content finished
/// mounting. Waiting for it is best-effort; expiry is not a failure.
const CONTENT_MARKER_SELECTOR: &str = "#project-modules";

/// A retrieved document plus the strategy that produced it.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    /// Full page markup.
    pub html: String,
    /// Which retrieval path succeeded; on fallback this records the error
    /// that made the rendered path give up.
    pub strategy: String,
}

/// Retrieve a page, rendered if possible, plain otherwise.
///
/// Only the final, unrecoverable failure (both paths exhausted) surfaces as
/// an error; a rendered-path failure is folded into the returned strategy
/// string for diagnostics.
pub async fn fetch_document(url: &str, options: &FetchOptions) -> Result<FetchedDocument> {
    match rendered_fetch(url, options).await {
        Ok(html) => {
            info!(url, "rendered fetch succeeded");
            Ok(FetchedDocument {
                html,
                strategy: "rendered fetch".to_string(),
            })
        }
        Err(render_err) => {
            warn!(url, error = %render_err, "rendered fetch failed, trying plain fetch");
            let html = plain_fetch(url, options).await?;
            info!(url, "plain fetch succeeded");
            Ok(FetchedDocument {
                html,
                strategy: format!("plain fetch (rendered fetch failed: {render_err})"),
            })
        }
    }
}

/// Plain HTTP GET with browser-like identity and accept headers. Non-2xx
/// is a hard failure for this path.
pub async fn plain_fetch(url: &str, options: &FetchOptions) -> Result<String> {
    let client = reqwest::Client::builder()
        .timeout(options.request_timeout)
        .user_agent(&options.user_agent)
        .build()?;

    let response = client
        .get(url)
        .header(
            reqwest::header::ACCEPT,
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::Retrieval(format!("GET {url} returned {status}")));
    }
    Ok(response.text().await?)
}

/// Rendered-path errors stay as strings: they are diagnostics for the
/// strategy record, never surfaced to callers directly.
async fn rendered_fetch(url: &str, options: &FetchOptions) -> std::result::Result<String, String> {
    let mut builder = BrowserConfig::builder()
        .arg(format!("--user-agent={}", options.user_agent))
        .arg("--no-sandbox")
        .arg("--disable-gpu");
    if let Some(path) = &options.chrome_executable {
        builder = builder.chrome_executable(path.as_str());
    }
    let config = builder
        .build()
        .map_err(|e| format!("browser config: {e}"))?;

    let (mut browser, mut handler) = Browser::launch(config)
        .await
        .map_err(|e| format!("browser launch: {e}"))?;

    // The CDP event loop has to be polled for the session to make progress.
    let events = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if event.is_err() {
                break;
            }
        }
    });

    let result = render_page(&browser, url, options).await;

    // The browser process is owned by this call alone; close it on success
    // and failure alike so repeated failures cannot leak OS processes.
    if let Err(e) = browser.close().await {
        debug!(error = %e, "browser close reported an error");
    }
    let _ = browser.wait().await;
    events.abort();

    result
}

async fn render_page(
    browser: &Browser,
    url: &str,
    options: &FetchOptions,
) -> std::result::Result<String, String> {
    let page = timeout(options.navigation_timeout, browser.new_page(url))
        .await
        .map_err(|_| "navigation timed out".to_string())?
        .map_err(|e| format!("navigation: {e}"))?;

    // Bounded wait for the network to settle; slow pages proceed anyway.
    let _ = timeout(options.navigation_timeout, page.wait_for_navigation()).await;

    // An error page renders fine, so the document status has to be checked
    // explicitly; non-2xx fails this path and routes to the plain fetch.
    let status: i64 = page
        .evaluate("performance.getEntriesByType('navigation')[0]?.responseStatus ?? 0")
        .await
        .map_err(|e| format!("status probe: {e}"))?
        .into_value()
        .map_err(|e| format!("status decode: {e}"))?;
    check_document_status(u16::try_from(status).unwrap_or(0))?;

    scroll_to_bottom(&page, options).await?;
    sleep(options.settle_delay).await;

    // Best effort only: absence of the marker is not fatal.
    if timeout(options.marker_timeout, page.find_element(CONTENT_MARKER_SELECTOR))
        .await
        .map_or(true, |found| found.is_err())
    {
        debug!(url, "content marker did not appear, capturing anyway");
    }

    page.content()
        .await
        .map_err(|e| format!("content capture: {e}"))
}

/// Main-document status gate for the rendered path. A zero status means
/// the engine did not report one (the navigation timing field is absent on
/// older engines), which is not evidence of failure; anything reported
/// outside 2xx is a hard failure for this path.
fn check_document_status(status: u16) -> std::result::Result<(), String> {
    if status == 0 || (200..300).contains(&status) {
        Ok(())
    } else {
        Err(format!("document responded with HTTP {status}"))
    }
}

/// Scroll in fixed increments until the page bottom is reached and the
/// measured scroll height stops growing. "Height stopped growing" counts
/// as completion even if some lazy images never resolved; the iteration
/// cap keeps infinite feeds from pinning the session.
async fn scroll_to_bottom(page: &Page, options: &FetchOptions) -> std::result::Result<(), String> {
    let mut last_height = 0.0_f64;

    for _ in 0..options.max_scroll_steps {
        let step = format!("window.scrollBy(0, {})", options.scroll_step);
        page.evaluate(step.as_str())
            .await
            .map_err(|e| format!("scroll: {e}"))?;
        sleep(options.scroll_delay).await;

        let height: f64 = page
            .evaluate("document.body.scrollHeight")
            .await
            .map_err(|e| format!("scroll height probe: {e}"))?
            .into_value()
            .map_err(|e| format!("scroll height decode: {e}"))?;

        let at_bottom: bool = page
            .evaluate("window.scrollY + window.innerHeight >= document.body.scrollHeight - 1")
            .await
            .map_err(|e| format!("scroll position probe: {e}"))?
            .into_value()
            .map_err(|e| format!("scroll position decode: {e}"))?;

        if at_bottom && (height - last_height).abs() < f64::EPSILON {
            break;
        }
        last_height = height;
    }

    Ok(())
}
