use std::fmt::Display;

use serde::Deserialize;

/// The number of the first page of results.
pub const FIRST_PAGE: u32 = 1;

/// Metadata of a GitHub repository listed on a page.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RepoItem {
    /// The name of the repository.
    name: String,

    /// The login of the repository owner.
    owner: String,

    /// The number of stars the repository has.
    total_stars: u32,

    /// The description of the repository, if any.
    description: Option<String>,
}

impl RepoItem {
    /// Creates a new `RepoItem` instance.
    pub fn new(name: &str, owner: &str, total_stars: u32, description: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            owner: owner.to_string(),
            total_stars,
            description: description.map(str::to_string),
        }
    }

    /// Retrieves the repository name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Retrieves the owner login.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Retrieves the total stars of the repository.
    pub fn total_stars(&self) -> u32 {
        self.total_stars
    }

    /// Retrieves the description of the repository.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Creates a dummy `RepoItem` for testing purposes.
    #[cfg(test)]
    pub(crate) fn dummy(index: u32) -> Self {
        Self::new(
            &format!("repository-{index}"),
            "org-1",
            index * 10,
            Some("dummy repository"),
        )
    }
}

impl Display for RepoItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} ({} stars)", self.owner, self.name, self.total_stars)?;
        if let Some(description) = &self.description {
            write!(f, ": {description}")?;
        }

        Ok(())
    }
}

/// The pagination state tracked by a presenter.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PageState {
    /// The last page successfully displayed, `0` when nothing has been loaded yet.
    pub(crate) current_page: u32,

    /// Whether remote fetching is suppressed in favor of local data.
    pub(crate) is_local_data_mode: bool,

    /// Whether an empty page has been received.
    pub(crate) is_last_page: bool,
}

impl PageState {
    /// Returns the page a next page request should target, `None` once page numbers are exhausted.
    pub fn next_page(&self) -> Option<u32> {
        if self.current_page == 0 {
            Some(FIRST_PAGE)
        } else {
            self.current_page.checked_add(1)
        }
    }
}

impl Display for PageState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PageState: current_page={}, local={}, last_page={}",
            self.current_page, self.is_local_data_mode, self.is_last_page
        )
    }
}
