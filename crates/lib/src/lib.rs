//! Shrink core library: query augmentation for tool-calling datasets, with the translation
//! and encyclopedia clients, configuration, and dataset I/O used by the CLI.

pub mod augment;
pub mod config;
pub mod dataset;
mod http;
pub mod init;
pub mod knowledge;
pub mod orchestrator;
pub mod translate;
