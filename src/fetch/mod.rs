pub mod fetcher;

pub use fetcher::{FetchEntries, HttpFeedFetcher};

#[cfg(test)]
pub use fetcher::MockFetchEntries;
