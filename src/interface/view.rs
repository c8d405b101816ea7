use crate::RepoItem;

/// A trait for the display surface driven by a presenter.
#[cfg_attr(test, mockall::automock)]
pub trait RepositoryView: Sync + Send {
    /// Shows or hides the full-screen loading indicator.
    fn show_loading_bar(&self, is_loading: bool);

    /// Shows or hides the loading indicator at the bottom of the list.
    fn start_bottom_loading(&self, is_loading: bool);

    /// Displays the repositories of a page.
    fn show_data(&self, items: &[RepoItem], page: u32);

    /// Notifies whether the last page has been reached.
    fn last_page(&self, is_last_page: bool);

    /// Handles an error raised while fetching a page.
    fn handle_error_behaviour(&self, cause: anyhow::Error);
}
