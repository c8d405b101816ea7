use std::sync::{Arc, Weak};

use log::{debug, info, warn};

use crate::{FIRST_PAGE, PageState, RepositoryFetcher, RepositoryView};

/// A presenter that pages through repositories and drives a view.
///
/// The view is held weakly: the presenter never keeps a display surface alive on its own,
/// and a view dropped by its owner is treated as detached.
pub struct MainPresenter {
    fetcher: Arc<dyn RepositoryFetcher>,
    view: Option<Weak<dyn RepositoryView>>,
    state: PageState,
}

impl MainPresenter {
    /// Creates a new `MainPresenter` instance with the given fetcher and no view attached.
    pub fn new(fetcher: Arc<dyn RepositoryFetcher>) -> Self {
        Self {
            fetcher,
            view: None,
            state: PageState::default(),
        }
    }

    /// Binds the view, replacing any previous binding.
    pub fn attach_view(&mut self, view: Arc<dyn RepositoryView>) {
        debug!("Attaching view");
        self.view = Some(Arc::downgrade(&view));
    }

    /// Clears the view binding.
    pub fn detach_view(&mut self) {
        debug!("Detaching view");
        self.view = None;
    }

    /// Retrieves the attached view, if it is still alive.
    pub fn view(&self) -> Option<Arc<dyn RepositoryView>> {
        self.view.as_ref().and_then(Weak::upgrade)
    }

    /// Toggles the local data mode, which suppresses remote fetching.
    pub fn set_local_data_mode(&mut self, is_local_data_mode: bool) {
        self.state.is_local_data_mode = is_local_data_mode;
    }

    /// Sets the current page counter and resumes paging from it.
    pub fn set_current_page(&mut self, page: u32) {
        self.state.current_page = page;
        self.state.is_last_page = false;
    }

    /// Retrieves the last page successfully displayed.
    pub fn current_page(&self) -> u32 {
        self.state.current_page
    }

    /// Whether an empty page has been received.
    pub fn is_last_page(&self) -> bool {
        self.state.is_last_page
    }

    /// Whether remote fetching is suppressed.
    pub fn is_local_data_mode(&self) -> bool {
        self.state.is_local_data_mode
    }

    /// Fetches the given page and forwards the outcome to the view.
    pub async fn request_page(&mut self, page: u32) {
        let is_first_page = page == FIRST_PAGE;
        self.toggle_loading(is_first_page, true);
        info!("Requesting page {page}");
        let fetched = self.fetcher.fetch(page).await;
        self.toggle_loading(is_first_page, false);

        match fetched {
            Ok(items) if items.is_empty() => {
                info!("No repositories on page {page}, last page reached");
                self.state.is_last_page = true;
                self.with_view(|view| view.last_page(true));
            }
            Ok(items) => {
                info!("Fetched {} repositories on page {page}", items.len());
                self.state.current_page = page;
                self.state.is_last_page = false;
                self.with_view(|view| {
                    view.last_page(false);
                    view.show_data(&items, page);
                });
            }
            Err(e) => {
                warn!("Failed to fetch page {page}: {e}");
                self.with_view(move |view| view.handle_error_behaviour(e));
            }
        }
        debug!("{}", self.state);
    }

    /// Fetches the page following the last one displayed.
    ///
    /// Nothing happens in local data mode. Once the last page has been reached, only a
    /// forced request goes back to the remote source.
    pub async fn request_next_page(&mut self, force_remote: bool) {
        if self.state.is_local_data_mode {
            debug!("Local data mode, skipping remote fetch");
            return;
        }
        if self.state.is_last_page && !force_remote {
            debug!("Last page already reached, skipping remote fetch");
            return;
        }

        match self.state.next_page() {
            Some(page) => self.request_page(page).await,
            None => {
                warn!("No page after page {}, last page reached", self.state.current_page);
                self.state.is_last_page = true;
                self.with_view(|view| view.last_page(true));
            }
        }
    }

    fn toggle_loading(&self, is_first_page: bool, is_loading: bool) {
        self.with_view(|view| {
            if is_first_page {
                view.show_loading_bar(is_loading);
            } else {
                view.start_bottom_loading(is_loading);
            }
        });
    }

    fn with_view<F: FnOnce(&dyn RepositoryView)>(&self, f: F) {
        match self.view() {
            Some(view) => f(view.as_ref()),
            None => debug!("No view attached, skipping display"),
        }
    }
}
