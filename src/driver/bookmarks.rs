//! Session Bookmarks
//!
//! 세션 하나의 북마크 상태와 외부 매니저 동기화

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use super::bookmark_manager::{BookmarkManager, Bookmarks};
use super::error::DriverResult;

/// 세션 북마크 추적기
///
/// 로컬 집합은 마지막 작업 단위의 북마크로 통째로 바뀌며 병합되지 않는다.
/// 빈 북마크는 저장하지 않는다.
pub struct SessionBookmarks {
    bookmarks: Bookmarks,
    manager: Option<Arc<dyn BookmarkManager>>,
}

impl SessionBookmarks {
    /// 새 추적기 생성. 초기 북마크에서 빈 문자열은 제거된다.
    pub fn new<I, S>(manager: Option<Arc<dyn BookmarkManager>>, initial: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let bookmarks = initial
            .into_iter()
            .map(Into::into)
            .filter(|b: &String| !b.is_empty())
            .collect();
        Self { bookmarks, manager }
    }

    /// 현재 북마크
    pub fn current(&self) -> &[String] {
        &self.bookmarks
    }

    /// 마지막 북마크. 없으면 빈 문자열.
    pub fn last(&self) -> &str {
        self.bookmarks.last().map(String::as_str).unwrap_or("")
    }

    /// 매니저 연결 여부
    pub fn has_manager(&self) -> bool {
        self.manager.is_some()
    }

    /// 작업 단위 완료 후 북마크 교체
    ///
    /// 로컬 상태를 먼저 바꾼 뒤 매니저에 알린다. 매니저 호출이 실패해도
    /// 로컬 상태는 되돌리지 않는다.
    pub async fn replace(
        &mut self,
        previous: &[String],
        new: impl Into<String>,
    ) -> DriverResult<()> {
        let new = new.into();
        if new.is_empty() {
            return Ok(());
        }

        debug!(bookmark = %new, "Replacing session bookmarks");
        self.bookmarks = vec![new];

        if let Some(manager) = &self.manager {
            if let Err(e) = manager.update_bookmarks(previous, &self.bookmarks).await {
                warn!(error = %e, "Bookmark manager update failed");
                return Err(e.into());
            }
        }
        Ok(())
    }

    /// 다음 작업 단위에 보낼 북마크
    pub async fn fetch_for_run(&self) -> DriverResult<Bookmarks> {
        match &self.manager {
            Some(manager) => manager.get_bookmarks().await.map_err(|e| {
                warn!(error = %e, "Bookmark manager lookup failed");
                e.into()
            }),
            None => Ok(self.bookmarks.clone()),
        }
    }

    /// 매니저가 아는 모든 북마크. 매니저가 없으면 로컬 북마크.
    pub async fn fetch_all(&self) -> DriverResult<Bookmarks> {
        match &self.manager {
            Some(manager) => manager.get_all_bookmarks().await.map_err(|e| {
                warn!(error = %e, "Bookmark manager lookup failed");
                e.into()
            }),
            None => Ok(self.bookmarks.clone()),
        }
    }
}

impl fmt::Debug for SessionBookmarks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionBookmarks")
            .field("bookmarks", &self.bookmarks)
            .field("manager", &self.manager.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::bookmark_manager::{
        BookmarkManagerConfig, BookmarkManagerResult, InMemoryBookmarkManager,
    };
    use crate::driver::error::{BookmarkManagerError, DriverError};
    use async_trait::async_trait;
    use parking_lot::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Update(Bookmarks, Bookmarks),
        Get,
        GetAll,
        Forget,
    }

    #[derive(Default)]
    struct RecordingManager {
        calls: Mutex<Vec<Call>>,
        fail_updates: bool,
    }

    impl RecordingManager {
        fn count(&self, call: &Call) -> usize {
            self.calls.lock().iter().filter(|c| *c == call).count()
        }
    }

    #[async_trait]
    impl BookmarkManager for RecordingManager {
        async fn update_bookmarks(
            &self,
            previous: &[String],
            new: &[String],
        ) -> BookmarkManagerResult<()> {
            self.calls
                .lock()
                .push(Call::Update(previous.to_vec(), new.to_vec()));
            if self.fail_updates {
                return Err(BookmarkManagerError::new("update rejected"));
            }
            Ok(())
        }

        async fn get_bookmarks(&self) -> BookmarkManagerResult<Bookmarks> {
            self.calls.lock().push(Call::Get);
            Ok(Vec::new())
        }

        async fn get_all_bookmarks(&self) -> BookmarkManagerResult<Bookmarks> {
            self.calls.lock().push(Call::GetAll);
            Ok(Vec::new())
        }

        async fn forget(&self) -> BookmarkManagerResult<()> {
            self.calls.lock().push(Call::Forget);
            Ok(())
        }
    }

    fn strings(items: &[&str]) -> Bookmarks {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_initial_bookmarks_cleaned_up() {
        let bookmarks = SessionBookmarks::new(None, ["", "bookmark", "", "deutschmark", ""]);

        assert_eq!(bookmarks.current(), strings(&["bookmark", "deutschmark"]).as_slice());
        assert_eq!(bookmarks.last(), "deutschmark");
    }

    #[tokio::test]
    async fn test_replace_with_non_empty() {
        let mut bookmarks = SessionBookmarks::new(None, ["", "bookmark", "", "deutschmark", ""]);

        bookmarks.replace(&[], "booking mark").await.unwrap();

        assert_eq!(bookmarks.current(), strings(&["booking mark"]).as_slice());
        assert_eq!(bookmarks.last(), "booking mark");
    }

    #[tokio::test]
    async fn test_replace_with_empty_is_noop() {
        let mut bookmarks = SessionBookmarks::new(None, ["book marking"]);

        bookmarks.replace(&[], "").await.unwrap();

        assert_eq!(bookmarks.current(), strings(&["book marking"]).as_slice());
        assert_eq!(bookmarks.last(), "book marking");
    }

    #[test]
    fn test_last_without_bookmarks() {
        let bookmarks = SessionBookmarks::new(None, Vec::<String>::new());
        assert_eq!(bookmarks.last(), "");
        assert!(bookmarks.current().is_empty());
    }

    #[tokio::test]
    async fn test_manager_notified_of_update() {
        let manager = Arc::new(RecordingManager::default());
        let mut bookmarks = SessionBookmarks::new(
            Some(manager.clone() as Arc<dyn BookmarkManager>),
            Vec::<String>::new(),
        );

        bookmarks.replace(&strings(&["b1", "b2"]), "b3").await.unwrap();

        let expected = Call::Update(strings(&["b1", "b2"]), strings(&["b3"]));
        assert_eq!(manager.count(&expected), 1);
        assert_eq!(manager.calls.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_replace_skips_manager() {
        let manager = Arc::new(RecordingManager::default());
        let mut bookmarks =
            SessionBookmarks::new(Some(manager.clone() as Arc<dyn BookmarkManager>), ["b1"]);

        bookmarks.replace(&strings(&["b1"]), "").await.unwrap();

        assert!(manager.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_for_run_asks_manager() {
        let manager = Arc::new(RecordingManager::default());
        let bookmarks =
            SessionBookmarks::new(Some(manager.clone() as Arc<dyn BookmarkManager>), ["local"]);

        let fetched = bookmarks.fetch_for_run().await.unwrap();

        assert!(fetched.is_empty());
        assert_eq!(manager.count(&Call::Get), 1);
        assert_eq!(manager.calls.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_all_asks_manager() {
        let manager = Arc::new(RecordingManager::default());
        let bookmarks =
            SessionBookmarks::new(Some(manager.clone() as Arc<dyn BookmarkManager>), ["local"]);

        bookmarks.fetch_all().await.unwrap();

        assert_eq!(manager.count(&Call::GetAll), 1);
        assert_eq!(manager.count(&Call::Forget), 0);
    }

    #[tokio::test]
    async fn test_fetch_without_manager_uses_local() {
        let bookmarks = SessionBookmarks::new(None, ["a", "b"]);
        assert_eq!(bookmarks.fetch_for_run().await.unwrap(), strings(&["a", "b"]));
        assert_eq!(bookmarks.fetch_all().await.unwrap(), strings(&["a", "b"]));
    }

    #[tokio::test]
    async fn test_manager_error_keeps_local_update() {
        let manager = Arc::new(RecordingManager {
            fail_updates: true,
            ..Default::default()
        });
        let mut bookmarks =
            SessionBookmarks::new(Some(manager.clone() as Arc<dyn BookmarkManager>), ["old"]);

        let err = bookmarks.replace(&strings(&["old"]), "new").await.unwrap_err();

        assert!(matches!(err, DriverError::BookmarkManager(_)));
        assert_eq!(bookmarks.last(), "new");
        assert_eq!(bookmarks.current(), strings(&["new"]).as_slice());
    }

    #[tokio::test]
    async fn test_sessions_share_in_memory_manager() {
        let manager: Arc<dyn BookmarkManager> = Arc::new(InMemoryBookmarkManager::new(
            BookmarkManagerConfig::new().with_initial_bookmarks(["seed"]),
        ));
        let mut first = SessionBookmarks::new(Some(Arc::clone(&manager)), Vec::<String>::new());
        let mut second = SessionBookmarks::new(Some(Arc::clone(&manager)), Vec::<String>::new());

        let for_first = first.fetch_for_run().await.unwrap();
        first.replace(&for_first, "tx1").await.unwrap();
        second.replace(&[], "tx2").await.unwrap();

        let mut all = second.fetch_for_run().await.unwrap();
        all.sort();
        assert_eq!(all, strings(&["tx1", "tx2"]));
        assert_eq!(first.last(), "tx1");
    }
}
