pub mod csv_store;
pub mod http_fetcher;
