use std::sync::Arc;

use clap::Parser;
use log::{debug, info, warn};

use github_repo_pager::{
    ConsoleView, GITHUB_GRAPHQL_ENDPOINT, GraphQlFetcher, MainPresenter, RepositoryView,
    StdResult,
};

/// Command line arguments for the GitHub repository pager
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Search query used to list repositories
    #[arg(short, long, default_value = "stars:>1000")]
    query: String,

    /// Number of repositories fetched per page
    #[arg(short, long, default_value_t = 30)]
    per_page: u16,

    /// Maximum number of pages to display
    #[arg(short, long, default_value_t = 3)]
    max_pages: u32,

    /// GitHub GraphQL endpoint
    #[arg(short, long, default_value = GITHUB_GRAPHQL_ENDPOINT)]
    endpoint: String,

    /// GitHub API token
    #[arg(long, env = "GITHUB_API_TOKEN", hide_env_values = true)]
    github_api_token: String,

    /// Start in local data mode, without fetching remote repositories
    #[arg(short, long)]
    local: bool,
}

#[tokio::main]
async fn main() -> StdResult<()> {
    env_logger::init();
    info!("Starting GitHub repository pager");
    let args = Args::parse();
    debug!(
        "Query: {}, per page: {}, max pages: {}",
        args.query, args.per_page, args.max_pages
    );

    let fetcher = Arc::new(GraphQlFetcher::new(
        &args.endpoint,
        &args.github_api_token,
        &args.query,
        args.per_page,
    ));
    let view: Arc<dyn RepositoryView> = Arc::new(ConsoleView::new());
    let mut presenter = MainPresenter::new(fetcher);
    presenter.attach_view(view.clone());
    presenter.set_local_data_mode(args.local);

    if presenter.is_local_data_mode() {
        info!("Local data mode, no remote repositories fetched");
    }
    while !presenter.is_local_data_mode()
        && presenter.current_page() < args.max_pages
        && !presenter.is_last_page()
    {
        let previous_page = presenter.current_page();
        presenter.request_next_page(false).await;
        if presenter.current_page() == previous_page {
            if !presenter.is_last_page() {
                warn!("No progress after page {previous_page}, stopping");
            }
            break;
        }
    }
    presenter.detach_view();
    info!("Paging completed at page {}", presenter.current_page());

    Ok(())
}
