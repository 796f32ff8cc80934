//! Transient notifications.
//!
//! Notices are queued in the session by the request that produced them and
//! drained by the next page render, so they survive a post/redirect/get.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::StoreError;
use crate::models::session_keys;

/// Notice severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
}

/// A user-visible message with a severity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    /// CSS modifier class for the notice banner.
    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        match self.level {
            NoticeLevel::Success => "notice--success",
            NoticeLevel::Error => "notice--error",
            NoticeLevel::Info => "notice--info",
        }
    }

    /// ARIA role: errors interrupt, everything else is polite.
    #[must_use]
    pub const fn role(&self) -> &'static str {
        match self.level {
            NoticeLevel::Error => "alert",
            NoticeLevel::Success | NoticeLevel::Info => "status",
        }
    }
}

/// Session-backed notice queue.
///
/// Session failures are logged and swallowed: a lost notice never fails the
/// request that produced it.
#[derive(Clone, Copy)]
pub struct Notices<'a> {
    session: &'a Session,
}

impl<'a> Notices<'a> {
    #[must_use]
    pub const fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Queue a notice for the next page.
    pub async fn push(&self, notice: Notice) {
        let mut queued = self.peek().await;
        queued.push(notice);
        if let Err(e) = self.session.insert(session_keys::NOTICES, &queued).await {
            tracing::error!("Failed to queue notice: {e}");
        }
    }

    pub async fn success(&self, message: impl Into<String>) {
        self.push(Notice::success(message)).await;
    }

    pub async fn error(&self, message: impl Into<String>) {
        self.push(Notice::error(message)).await;
    }

    pub async fn info(&self, message: impl Into<String>) {
        self.push(Notice::info(message)).await;
    }

    /// Queue the error notice for a failed store operation.
    pub async fn failure(&self, err: &StoreError, fallback: &str) {
        tracing::warn!(error = %err, "{fallback}");
        self.error(err.user_message(fallback)).await;
    }

    /// Remove and return every queued notice, oldest first.
    pub async fn take(&self) -> Vec<Notice> {
        match self.session.remove::<Vec<Notice>>(session_keys::NOTICES).await {
            Ok(queued) => queued.unwrap_or_default(),
            Err(e) => {
                tracing::error!("Failed to read notices: {e}");
                Vec::new()
            }
        }
    }

    async fn peek(&self) -> Vec<Notice> {
        self.session
            .get::<Vec<Notice>>(session_keys::NOTICES)
            .await
            .ok()
            .flatten()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_notices_drain_in_order() {
        let session = session();
        let notices = Notices::new(&session);
        notices.success("Product added successfully to your cart").await;
        notices.error("Failed to fetch wishlist.").await;

        let drained = notices.take().await;
        assert_eq!(
            drained,
            vec![
                Notice::success("Product added successfully to your cart"),
                Notice::error("Failed to fetch wishlist."),
            ]
        );
        assert!(notices.take().await.is_empty());
    }

    #[tokio::test]
    async fn test_failure_uses_fallback() {
        let session = session();
        let notices = Notices::new(&session);
        notices
            .failure(&StoreError::EmptyCart, "Failed to initiate checkout.")
            .await;
        let drained = notices.take().await;
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].level, NoticeLevel::Error);
        assert_eq!(drained[0].message, "Your cart is empty.");
    }

    #[test]
    fn test_css_class_and_role() {
        assert_eq!(Notice::error("x").css_class(), "notice--error");
        assert_eq!(Notice::error("x").role(), "alert");
        assert_eq!(Notice::info("x").role(), "status");
    }
}
