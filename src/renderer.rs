use std::sync::Arc;

use async_trait::async_trait;
use log::warn;

use crate::{
    errors::{DiscoveryError, FetchError, LaunchError},
    record::Record,
};

/// Launches rendering sessions against the catalog.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Sets up the shared session resource, routed through `proxy` if given.
    async fn launch(&self, proxy: Option<&str>) -> Result<Arc<dyn RenderSession>, LaunchError>;
}

/// A live session. Each page fetch uses its own page-scoped handle and
/// releases it before returning, so fetches are independent of each other.
#[async_trait]
pub trait RenderSession: Send + Sync {
    /// Highest page number advertised by the catalog's pagination control.
    async fn discover_total_pages(&self) -> Result<u32, DiscoveryError>;

    /// Loads one page and extracts its records, skipping malformed items.
    async fn fetch_page_records(&self, page: u32) -> Result<Vec<Record>, FetchError>;

    async fn close(&self);
}

/// Owns a session for one scrape and makes sure it is closed exactly once.
///
/// Call [`SessionGuard::close`] on the normal path. If the guard is dropped
/// instead (the scrape future was cancelled, or a panic unwound through it),
/// the close is spawned onto the current runtime.
pub struct SessionGuard {
    session: Arc<dyn RenderSession>,
    closed: bool,
}

impl SessionGuard {
    pub fn new(session: Arc<dyn RenderSession>) -> Self {
        Self {
            session,
            closed: false,
        }
    }

    pub fn session(&self) -> &Arc<dyn RenderSession> {
        &self.session
    }

    pub async fn close(mut self) {
        self.closed = true;
        self.session.close().await;
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        let session = Arc::clone(&self.session);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move { session.close().await });
            }
            Err(_) => warn!("Rendering session dropped outside a runtime; it was not closed"),
        }
    }
}
