pub mod client;
pub mod integrity;
pub mod rate_limiter;

pub use client::{join_relative, pretty_json, write_bytes, DownloadEntry, Downloader};
pub use integrity::HashAlgorithm;
pub use rate_limiter::RateLimiter;
