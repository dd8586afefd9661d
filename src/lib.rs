pub mod bracket;
pub mod config;
pub mod data_files;
pub mod dataset;
pub mod export;
pub mod metric;
pub mod names;
pub mod persist;
pub mod scoring;
pub mod simulate;
