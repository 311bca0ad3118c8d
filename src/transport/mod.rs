pub mod webtransport;
