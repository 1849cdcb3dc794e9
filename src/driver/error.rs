//! Driver Error Types
//!
//! 드라이버 에러 정의

use std::error::Error as StdError;

use thiserror::Error;

use crate::bolt::BoltError;

// ============================================================================
// BookmarkManagerError - 북마크 매니저 에러
// ============================================================================

/// 북마크 매니저 에러
///
/// 매니저 구현체가 반환한 원인 에러를 그대로 감싼다.
#[derive(Error, Debug)]
#[error("Bookmark manager error: {0}")]
pub struct BookmarkManagerError(#[source] Box<dyn StdError + Send + Sync>);

impl BookmarkManagerError {
    /// 원인 에러로 생성
    pub fn new(source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self(source.into())
    }

    /// 원인 에러
    pub fn inner(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.0.as_ref()
    }
}

// ============================================================================
// DriverError - 드라이버 에러
// ============================================================================

/// 드라이버 에러
#[derive(Error, Debug)]
pub enum DriverError {
    /// 와이어 계층 에러
    ///
    /// 세션 계층 연산은 만들지 않는다. 호출자가 [`crate::MessageStream`] 에러와
    /// 북마크 에러를 하나의 [`DriverResult`]로 합칠 때 `?`로 변환된다.
    #[error(transparent)]
    Bolt(#[from] BoltError),

    /// 북마크 매니저 에러
    #[error(transparent)]
    BookmarkManager(#[from] BookmarkManagerError),
}

impl DriverError {
    /// 연결을 더 이상 쓸 수 없는지 여부
    pub fn is_fatal(&self) -> bool {
        match self {
            DriverError::Bolt(e) => e.is_fatal(),
            DriverError::BookmarkManager(_) => false,
        }
    }
}

/// 드라이버 결과 타입
pub type DriverResult<T> = Result<T, DriverError>;
