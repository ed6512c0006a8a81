//! Project boards flattened into enriched issues.

pub mod crawl;
pub mod deps;
pub mod enrich;
pub mod issue;

pub use crawl::{repository_urls, ColumnCrawler};
pub use issue::Issue;
