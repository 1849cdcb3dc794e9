//! Bookmark Manager
//!
//! 세션 간 인과적 일관성을 위한 북마크 공유 인터페이스

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use super::error::BookmarkManagerError;

/// 북마크 목록 (순서 유지)
pub type Bookmarks = Vec<String>;

/// 매니저 결과 타입
pub type BookmarkManagerResult<T> = Result<T, BookmarkManagerError>;

// ============================================================================
// BookmarkManager - 북마크 매니저 트레이트
// ============================================================================

/// 여러 세션이 공유하는 북마크 저장소
///
/// 구현체는 여러 태스크에서 동시에 호출될 수 있다.
#[async_trait]
pub trait BookmarkManager: Send + Sync {
    /// 작업 단위 완료 후 호출. `previous`를 `new`로 대체한다.
    async fn update_bookmarks(
        &self,
        previous: &[String],
        new: &[String],
    ) -> BookmarkManagerResult<()>;

    /// 다음 작업 단위에 사용할 북마크
    async fn get_bookmarks(&self) -> BookmarkManagerResult<Bookmarks>;

    /// 매니저가 추적 중인 모든 북마크
    async fn get_all_bookmarks(&self) -> BookmarkManagerResult<Bookmarks>;

    /// 추적 중인 북마크 전부 삭제
    async fn forget(&self) -> BookmarkManagerResult<()>;
}

/// 외부 북마크 공급 함수
pub type BookmarkSupplier = Arc<dyn Fn() -> BookmarkManagerResult<Bookmarks> + Send + Sync>;

/// 갱신된 북마크 통지 함수
pub type BookmarkConsumer = Arc<dyn Fn(&[String]) -> BookmarkManagerResult<()> + Send + Sync>;

// ============================================================================
// BookmarkManagerConfig - 매니저 설정
// ============================================================================

/// [`InMemoryBookmarkManager`] 설정
#[derive(Clone, Default)]
pub struct BookmarkManagerConfig {
    /// 초기 북마크
    pub initial_bookmarks: Bookmarks,
    /// `get_bookmarks` 호출 시 추가로 합쳐질 북마크 공급자
    pub supplier: Option<BookmarkSupplier>,
    /// 갱신 후 전체 북마크를 전달받는 소비자
    pub consumer: Option<BookmarkConsumer>,
}

impl BookmarkManagerConfig {
    /// 새 설정 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 초기 북마크 설정
    pub fn with_initial_bookmarks<I, S>(mut self, bookmarks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.initial_bookmarks = bookmarks.into_iter().map(Into::into).collect();
        self
    }

    /// 공급자 설정
    pub fn with_supplier<F>(mut self, supplier: F) -> Self
    where
        F: Fn() -> BookmarkManagerResult<Bookmarks> + Send + Sync + 'static,
    {
        self.supplier = Some(Arc::new(supplier));
        self
    }

    /// 소비자 설정
    pub fn with_consumer<F>(mut self, consumer: F) -> Self
    where
        F: Fn(&[String]) -> BookmarkManagerResult<()> + Send + Sync + 'static,
    {
        self.consumer = Some(Arc::new(consumer));
        self
    }
}

impl fmt::Debug for BookmarkManagerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BookmarkManagerConfig")
            .field("initial_bookmarks", &self.initial_bookmarks)
            .field("supplier", &self.supplier.is_some())
            .field("consumer", &self.consumer.is_some())
            .finish()
    }
}

// ============================================================================
// InMemoryBookmarkManager - 기본 구현
// ============================================================================

/// 프로세스 내 북마크 매니저
///
/// 추적 중인 북마크는 삽입 순서를 유지하며 중복을 허용하지 않는다.
#[derive(Debug)]
pub struct InMemoryBookmarkManager {
    bookmarks: RwLock<TrackedBookmarks>,
    config: BookmarkManagerConfig,
}

impl InMemoryBookmarkManager {
    /// 새 매니저 생성
    pub fn new(config: BookmarkManagerConfig) -> Self {
        let mut bookmarks = TrackedBookmarks::default();
        bookmarks.extend(&config.initial_bookmarks);
        Self {
            bookmarks: RwLock::new(bookmarks),
            config,
        }
    }

    /// 추적 중인 북마크 스냅샷
    pub fn tracked(&self) -> Bookmarks {
        self.bookmarks.read().order.clone()
    }
}

impl Default for InMemoryBookmarkManager {
    fn default() -> Self {
        Self::new(BookmarkManagerConfig::default())
    }
}

/// 삽입 순서 목록과 중복 검사용 집합
#[derive(Debug, Clone, Default)]
struct TrackedBookmarks {
    order: Bookmarks,
    seen: HashSet<String>,
}

impl TrackedBookmarks {
    /// 빈 문자열과 중복을 건너뛰고 추가
    fn extend(&mut self, items: &[String]) {
        for item in items {
            if !item.is_empty() && self.seen.insert(item.clone()) {
                self.order.push(item.clone());
            }
        }
    }

    fn remove_all(&mut self, items: &[String]) {
        if items.is_empty() {
            return;
        }
        let removed: HashSet<&str> = items.iter().map(String::as_str).collect();
        self.order.retain(|b| !removed.contains(b.as_str()));
        self.seen.retain(|b| !removed.contains(b.as_str()));
    }

    fn clear(&mut self) {
        self.order.clear();
        self.seen.clear();
    }
}

#[async_trait]
impl BookmarkManager for InMemoryBookmarkManager {
    async fn update_bookmarks(
        &self,
        previous: &[String],
        new: &[String],
    ) -> BookmarkManagerResult<()> {
        if new.iter().all(String::is_empty) {
            return Ok(());
        }

        let snapshot = {
            let mut bookmarks = self.bookmarks.write();
            bookmarks.remove_all(previous);
            bookmarks.extend(new);
            bookmarks.order.clone()
        };
        debug!(tracked = snapshot.len(), "Bookmark manager updated");

        if let Some(consumer) = &self.config.consumer {
            consumer(&snapshot)?;
        }
        Ok(())
    }

    async fn get_bookmarks(&self) -> BookmarkManagerResult<Bookmarks> {
        let Some(supplier) = &self.config.supplier else {
            return Ok(self.tracked());
        };
        let extra = supplier()?;
        let mut bookmarks = self.bookmarks.read().clone();
        bookmarks.extend(&extra);
        Ok(bookmarks.order)
    }

    async fn get_all_bookmarks(&self) -> BookmarkManagerResult<Bookmarks> {
        Ok(self.tracked())
    }

    async fn forget(&self) -> BookmarkManagerResult<()> {
        self.bookmarks.write().clear();
        Ok(())
    }
}
