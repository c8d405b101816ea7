use crate::{RepoItem, StdResult};

/// A trait for fetching pages of repositories from a remote source.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RepositoryFetcher: Sync + Send {
    /// Fetches the repositories of the given page.
    ///
    /// An empty list means the page is past the end of the results.
    async fn fetch(&self, page: u32) -> StdResult<Vec<RepoItem>>;
}
