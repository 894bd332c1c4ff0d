//! Page loading and lazy-content discovery.

use crate::error::{ScrapeError, ScrapeResult};
use chromiumoxide::cdp::browser_protocol::page::EventLifecycleEvent;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Budget for reaching a parseable DOM. Exceeding it aborts the run.
pub const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Best-effort trailing wait for network quiescence.
pub const NETWORK_IDLE_TIMEOUT: Duration = Duration::from_millis(1500);

/// Scrolls in 800px steps every 100ms until the measured document height is
/// covered, capped at 8000px for pathological infinite-scroll pages.
const AUTO_SCROLL_JS: &str = r#"
(async () => {
  const step = 800;
  const cap = 8000;
  let scrolled = 0;
  while (scrolled < cap) {
    const height = document.body ? document.body.scrollHeight : 0;
    window.scrollBy(0, step);
    scrolled += step;
    await new Promise((resolve) => setTimeout(resolve, 100));
    if (scrolled >= height) break;
  }
  return scrolled;
})()
"#;

/// Resolves once the DOM is constructed; full load is not required.
const DOM_READY_JS: &str = r#"
new Promise((resolve) => {
  if (document.readyState === 'complete' || document.readyState === 'interactive') {
    resolve(document.readyState);
  } else {
    document.addEventListener('DOMContentLoaded', () => resolve(document.readyState));
  }
})
"#;

/// Load `url` to a usable state within [`NAVIGATION_TIMEOUT`].
///
/// Waits for DOM construction, not the full load event. A timeout is
/// fatal to the pipeline.
pub async fn navigate(page: &Page, url: &str) -> ScrapeResult<()> {
    let start = Instant::now();

    match tokio::time::timeout(NAVIGATION_TIMEOUT, page.goto(url)).await {
        Ok(Ok(_)) => {}
        Ok(Err(source)) => {
            return Err(ScrapeError::Navigation {
                url: url.to_string(),
                source,
            })
        }
        Err(_) => {
            return Err(ScrapeError::NavigationTimeout {
                url: url.to_string(),
                timeout: NAVIGATION_TIMEOUT,
            })
        }
    }

    let remaining = NAVIGATION_TIMEOUT.saturating_sub(start.elapsed());
    match tokio::time::timeout(remaining, page.evaluate(DOM_READY_JS)).await {
        Ok(Ok(ready)) => {
            let state: String = ready.into_value().unwrap_or_default();
            debug!("dom ready ({state}) after {:.1}s", start.elapsed().as_secs_f64());
            Ok(())
        }
        Ok(Err(source)) => Err(ScrapeError::Navigation {
            url: url.to_string(),
            source,
        }),
        Err(_) => Err(ScrapeError::NavigationTimeout {
            url: url.to_string(),
            timeout: NAVIGATION_TIMEOUT,
        }),
    }
}

/// Scroll down in fixed increments to trigger lazy-load observers.
pub async fn auto_scroll(page: &Page) -> ScrapeResult<()> {
    let result = page.evaluate(AUTO_SCROLL_JS).await?;
    if let Ok(scrolled) = result.into_value::<u64>() {
        debug!("auto-scroll covered {scrolled}px");
    }
    Ok(())
}

/// Wait briefly for network quiescence.
///
/// Never fails the pipeline: a page that keeps polling analytics forever is
/// still perfectly parseable. Every swallowed outcome is logged.
pub async fn await_network_idle(page: &Page) {
    let mut lifecycle = match page.event_listener::<EventLifecycleEvent>().await {
        Ok(events) => events,
        Err(e) => {
            warn!("lifecycle listener unavailable ({e}); skipping network-idle wait");
            return;
        }
    };

    let idle = async {
        while let Some(event) = lifecycle.next().await {
            if event.name == "networkIdle" {
                break;
            }
        }
    };

    if tokio::time::timeout(NETWORK_IDLE_TIMEOUT, idle).await.is_err() {
        warn!(
            "network not idle within {}ms; proceeding anyway",
            NETWORK_IDLE_TIMEOUT.as_millis()
        );
    }
}
