//! Remote key-set retrieval

mod http_fetcher;

pub use http_fetcher::HttpJwksFetcher;
