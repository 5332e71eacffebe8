pub mod fetchers;
mod page;

pub use fetchers::RequestFetcher;
pub use page::PageText;
