pub mod config;
pub mod efficiency;
pub mod error;
pub mod event;
pub mod game;
pub mod ingest;
pub mod names;
pub mod output;
pub mod percentile;
pub mod repair;
pub mod rollup;
pub mod segment;
pub mod stats;
pub mod tracker;
pub mod vocab;
