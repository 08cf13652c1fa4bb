pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod matcher;
pub mod normalize;
pub mod ocr;
pub mod retrieve;
pub mod roll;
pub mod scanner;
pub mod scoring;
