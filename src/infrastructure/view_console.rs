use log::{error, info};

use crate::{RepoItem, RepositoryView};

/// A view rendering repositories to the terminal.
#[derive(Debug, Default)]
pub struct ConsoleView;

impl ConsoleView {
    /// Creates a new `ConsoleView` instance.
    pub fn new() -> Self {
        Self
    }

    fn format_row(item: &RepoItem, page: u32) -> String {
        format!("[page {page}] {item}")
    }
}

impl RepositoryView for ConsoleView {
    fn show_loading_bar(&self, is_loading: bool) {
        if is_loading {
            info!("Loading repositories...");
        } else {
            info!("Repositories loaded");
        }
    }

    fn start_bottom_loading(&self, is_loading: bool) {
        if is_loading {
            info!("Loading more repositories...");
        } else {
            info!("More repositories loaded");
        }
    }

    fn show_data(&self, items: &[RepoItem], page: u32) {
        for item in items {
            println!("{}", Self::format_row(item, page));
        }
    }

    fn last_page(&self, is_last_page: bool) {
        if is_last_page {
            info!("No more repositories to load");
        }
    }

    fn handle_error_behaviour(&self, cause: anyhow::Error) {
        error!("Failed to load repositories: {cause:?}");
    }
}
