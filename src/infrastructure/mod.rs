mod fetcher_graphql;
mod view_console;

pub use fetcher_graphql::*;
pub use view_console::*;
