//! Driver Module
//!
//! 세션 단위 상태: 북마크 추적과 북마크 매니저
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use boltwire::driver::{BookmarkManager, InMemoryBookmarkManager, SessionBookmarks};
//!
//! // 세션 간 공유 매니저
//! let manager: Arc<dyn BookmarkManager> = Arc::new(InMemoryBookmarkManager::default());
//!
//! // 세션 생성 시 추적기 생성
//! let mut bookmarks = SessionBookmarks::new(Some(manager), Vec::<String>::new());
//!
//! // 작업 단위 전: 보낼 북마크 조회
//! let previous = bookmarks.fetch_for_run().await?;
//!
//! // 작업 단위 후: 서버가 준 북마크로 교체
//! bookmarks.replace(&previous, "bookmark:tx42").await?;
//! ```

mod bookmark_manager;
mod bookmarks;
mod error;

// Re-exports
pub use bookmark_manager::{
    BookmarkConsumer, BookmarkManager, BookmarkManagerConfig, BookmarkManagerResult,
    BookmarkSupplier, Bookmarks, InMemoryBookmarkManager,
};
pub use bookmarks::SessionBookmarks;
pub use error::{BookmarkManagerError, DriverError, DriverResult};
