#![allow(non_snake_case)]

use std::collections::HashMap;

use anyhow::anyhow;
use gql_client::{Client, GraphQLError};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::{FIRST_PAGE, RepoItem, RepositoryFetcher, StdResult};

/// The GraphQL production endpoint for GitHub.
pub const GITHUB_GRAPHQL_ENDPOINT: &str = "https://api.github.com/graphql";

const SEARCH_QUERY: &str = r#"
query ($query: String!, $first: Int!, $after: String) {
  search(query: $query, type: REPOSITORY, first: $first, after: $after) {
    edges {
      node {
        ... on Repository {
          name
          owner {
            login
          }
          stargazerCount
          description
        }
      }
    }
    pageInfo {
      endCursor
      hasNextPage
    }
  }
}
"#;

/// Fetcher error
#[derive(Error, Debug)]
pub enum FetcherError {
    /// Parse error
    #[error("Parsing error: {0}")]
    Parse(String),
    /// Remote error
    #[error("Remote error: {0}")]
    Remote(String),
    /// Invalid page error
    #[error("Invalid page: {0}")]
    InvalidPage(u32),
}

impl From<GraphQLError> for FetcherError {
    fn from(error: GraphQLError) -> Self {
        let message = error.message().to_string();
        match message.contains("Failed to parse response") {
            true => FetcherError::Parse(message),
            false => FetcherError::Remote(message),
        }
    }
}

#[derive(Deserialize, Debug)]
struct SearchQueryData {
    search: SearchResult,
}

#[derive(Deserialize, Debug)]
struct SearchResult {
    edges: Vec<Option<SearchEdge>>,
    pageInfo: PageInfo,
}

#[derive(Deserialize, Debug)]
struct SearchEdge {
    node: RepositoryNode,
}

#[derive(Deserialize, Debug)]
struct RepositoryNode {
    name: String,
    owner: Owner,
    stargazerCount: u32,
    description: Option<String>,
}

#[derive(Deserialize, Debug)]
struct Owner {
    login: String,
}

#[derive(Deserialize, Debug)]
struct PageInfo {
    endCursor: Option<String>,
    hasNextPage: bool,
}

impl From<RepositoryNode> for RepoItem {
    fn from(node: RepositoryNode) -> Self {
        RepoItem::new(
            &node.name,
            &node.owner.login,
            node.stargazerCount,
            node.description.as_deref(),
        )
    }
}

/// A GraphQL query for searching GitHub
#[derive(Debug, Serialize)]
struct GraphQlSearchQuery {
    /// The search query string.
    query: String,
    /// The number of repositories to return.
    first: u16,
    /// The cursor for pagination.
    after: Option<String>,
}

/// The cursors known for each page, learned while fetching pages in order.
#[derive(Debug, Default)]
struct PageCursors {
    /// The `after` cursor to send for a page, for every page past the first one.
    after: HashMap<u32, String>,

    /// The last page that has results, once the end of the results is known.
    last_page: Option<u32>,
}

impl PageCursors {
    /// Returns the highest page not above `page` whose cursor is known, with that cursor.
    fn closest_known(&self, page: u32) -> (u32, Option<String>) {
        self.after
            .iter()
            .filter(|(known_page, _)| **known_page <= page)
            .max_by_key(|(known_page, _)| **known_page)
            .map(|(known_page, cursor)| (*known_page, Some(cursor.to_owned())))
            .unwrap_or((FIRST_PAGE, None))
    }

    fn is_past_the_end(&self, page: u32) -> bool {
        self.last_page.is_some_and(|last_page| page > last_page)
    }

    fn record(&mut self, page: u32, page_info: &PageInfo) {
        match (page_info.hasNextPage, &page_info.endCursor) {
            (true, Some(cursor)) => {
                self.after.insert(page + 1, cursor.to_owned());
            }
            _ => self.last_page = Some(page),
        }
    }
}

/// Fetches pages of repositories from the GitHub GraphQL search API.
///
/// GitHub paginates with opaque cursors, so page numbers are resolved by remembering the
/// end cursor of every page fetched.
pub struct GraphQlFetcher {
    client: Client,
    query: String,
    per_page: u16,
    cursors: Mutex<PageCursors>,
}

impl GraphQlFetcher {
    /// Creates a new `GraphQlFetcher` instance searching `query`, `per_page` repositories at a time.
    pub fn new(endpoint: &str, github_api_token: &str, query: &str, per_page: u16) -> Self {
        let bearer_token = format!("Bearer {}", github_api_token);
        let mut headers = HashMap::from([("User-Agent", "gql-client")]);
        headers.insert("Authorization", &bearer_token);
        let client = Client::new_with_headers(endpoint, headers);

        Self {
            client,
            query: query.to_string(),
            per_page,
            cursors: Mutex::new(PageCursors::default()),
        }
    }

    async fn fetch_page(
        &self,
        page: u32,
        after: Option<String>,
        cursors: &mut PageCursors,
    ) -> StdResult<Vec<RepoItem>> {
        debug!("Fetching page {page} after cursor {after:?}");
        let variables = GraphQlSearchQuery {
            query: self.query.to_owned(),
            first: self.per_page,
            after,
        };
        let fetched_data = self
            .client
            .query_with_vars_unwrap::<SearchQueryData, GraphQlSearchQuery>(
                SEARCH_QUERY,
                variables,
            )
            .await
            .map_err(|e| anyhow!(FetcherError::from(e)))?;
        cursors.record(page, &fetched_data.search.pageInfo);

        Ok(fetched_data
            .search
            .edges
            .into_iter()
            .filter_map(|edge| edge.map(|edge| edge.node.into()))
            .collect())
    }
}

#[async_trait::async_trait]
impl RepositoryFetcher for GraphQlFetcher {
    async fn fetch(&self, page: u32) -> StdResult<Vec<RepoItem>> {
        if page < FIRST_PAGE {
            return Err(anyhow!(FetcherError::InvalidPage(page)));
        }

        let mut cursors = self.cursors.lock().await;
        let (mut known_page, mut after) = cursors.closest_known(page);
        while known_page < page && !cursors.is_past_the_end(page) {
            info!("Cursor for page {page} unknown, walking through page {known_page}");
            self.fetch_page(known_page, after, &mut cursors).await?;
            known_page += 1;
            after = cursors.after.get(&known_page).cloned();
        }
        if cursors.is_past_the_end(page) {
            debug!("Page {page} is past the end of the results");
            return Ok(vec![]);
        }

        self.fetch_page(page, after, &mut cursors).await
    }
}

#[cfg(test)]
mod tests {
    use httpmock::MockServer;
    use serde_json::json;

    use super::*;

    fn mock_json_value(end_cursor: &str, has_next_page: bool) -> serde_json::Value {
        json!({
            "data": {
                "search": {
                    "edges": [
                        {
                            "node": {
                                "name": "repository-1",
                                "owner": {
                                    "login": "org-1"
                                },
                                "stargazerCount": 100,
                                "description": "first"
                            }
                        },
                        null,
                        {
                            "node": {
                                "name": "repository-2",
                                "owner": {
                                    "login": "org-1"
                                },
                                "stargazerCount": 200,
                                "description": null
                            }
                        }
                    ],
                    "pageInfo": {
                        "endCursor": end_cursor,
                        "hasNextPage": has_next_page
                    }
                }
            }
        })
    }

    fn expected_items() -> Vec<RepoItem> {
        vec![
            RepoItem::new("repository-1", "org-1", 100, Some("first")),
            RepoItem::new("repository-2", "org-1", 200, None),
        ]
    }

    fn build_fetcher(server: &MockServer) -> GraphQlFetcher {
        GraphQlFetcher::new(&server.url("/"), "credentials", "stars:>100", 10)
    }

    #[tokio::test]
    async fn fetch_first_page() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method("POST")
                .path("/")
                .header("Authorization", "Bearer credentials")
                .body_contains(r#""after":null"#);
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(mock_json_value("cursor-1", true));
        });
        let fetcher = build_fetcher(&server);

        let items = fetcher.fetch(FIRST_PAGE).await.unwrap();

        mock.assert();
        assert_eq!(expected_items(), items);
    }

    #[tokio::test]
    async fn fetch_next_page_uses_previous_end_cursor() {
        let server = MockServer::start();
        let first_page_mock = server.mock(|when, then| {
            when.method("POST").path("/").body_contains(r#""after":null"#);
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(mock_json_value("cursor-1", true));
        });
        let second_page_mock = server.mock(|when, then| {
            when.method("POST")
                .path("/")
                .body_contains(r#""after":"cursor-1""#);
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(mock_json_value("cursor-2", true));
        });
        let fetcher = build_fetcher(&server);

        fetcher.fetch(FIRST_PAGE).await.unwrap();
        let items = fetcher.fetch(2).await.unwrap();

        first_page_mock.assert_hits(1);
        second_page_mock.assert_hits(1);
        assert_eq!(expected_items(), items);
    }

    #[tokio::test]
    async fn fetch_unknown_page_walks_through_previous_pages() {
        let server = MockServer::start();
        let first_page_mock = server.mock(|when, then| {
            when.method("POST").path("/").body_contains(r#""after":null"#);
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(mock_json_value("cursor-1", true));
        });
        let second_page_mock = server.mock(|when, then| {
            when.method("POST")
                .path("/")
                .body_contains(r#""after":"cursor-1""#);
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(mock_json_value("cursor-2", true));
        });
        let third_page_mock = server.mock(|when, then| {
            when.method("POST")
                .path("/")
                .body_contains(r#""after":"cursor-2""#);
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(mock_json_value("cursor-3", false));
        });
        let fetcher = build_fetcher(&server);

        let items = fetcher.fetch(3).await.unwrap();

        first_page_mock.assert_hits(1);
        second_page_mock.assert_hits(1);
        third_page_mock.assert_hits(1);
        assert_eq!(expected_items(), items);
    }

    #[tokio::test]
    async fn fetch_past_the_end_returns_empty_page_without_request() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method("POST").path("/");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(mock_json_value("cursor-1", false));
        });
        let fetcher = build_fetcher(&server);

        fetcher.fetch(FIRST_PAGE).await.unwrap();
        let items = fetcher.fetch(2).await.unwrap();

        mock.assert_hits(1);
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn fetch_page_zero_fails() {
        let server = MockServer::start();
        let fetcher = build_fetcher(&server);

        let error = fetcher
            .fetch(0)
            .await
            .expect_err("Page zero should be rejected");

        assert!(matches!(
            error.downcast_ref::<FetcherError>(),
            Some(FetcherError::InvalidPage(0))
        ));
    }

    #[tokio::test]
    async fn fetch_remote_error_is_propagated() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method("POST").path("/");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "data": null,
                    "errors": [{ "message": "API rate limit exceeded" }]
                }));
        });
        let fetcher = build_fetcher(&server);

        fetcher
            .fetch(FIRST_PAGE)
            .await
            .expect_err("Remote error should be propagated");

        mock.assert();
    }

    mod page_cursors {
        use super::*;

        #[test]
        fn closest_known_defaults_to_first_page() {
            let cursors = PageCursors::default();

            assert_eq!((FIRST_PAGE, None), cursors.closest_known(5));
        }

        #[test]
        fn record_last_page_when_no_next_page() {
            let mut cursors = PageCursors::default();

            cursors.record(
                2,
                &PageInfo {
                    endCursor: Some("cursor-2".to_string()),
                    hasNextPage: false,
                },
            );

            assert!(!cursors.is_past_the_end(2));
            assert!(cursors.is_past_the_end(3));
        }

        #[test]
        fn closest_known_picks_highest_page_below() {
            let mut cursors = PageCursors::default();
            cursors.after.insert(2, "cursor-1".to_string());
            cursors.after.insert(4, "cursor-3".to_string());

            assert_eq!(
                (2, Some("cursor-1".to_string())),
                cursors.closest_known(3)
            );
        }
    }
}
