//! # Core Engine Module
//!
//! Shared abstractions used by every subsystem.
//!
//! ## Organization
//!
//! - **Config**: Unified configuration system for all engine subsystems
//! - **Foundation**: Low-level utilities (math, time, logging)

pub mod config;

pub use crate::foundation;

pub use config::{
    ApplicationConfig, AssetConfig, Config, ConfigError, EngineConfig, SceneConfig, ViewConfig,
};
