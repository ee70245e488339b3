//! Configuration objects and loading for treecache containers
//!
//! This crate defines the cache and container configuration values the
//! engine is built from, and loads them from JSON files.

pub mod config;
pub mod loader;
pub mod mode;

pub use config::{
    CacheConfiguration, CacheConfigurationBuilder, ClusteringConfiguration, ConfigSource,
    ContainerConfiguration, GlobalConfiguration, GlobalConfigurationBuilder,
};
pub use loader::ConfigLoader;
pub use mode::CacheMode;
