//! ECS resources made available to systems.
//!
//! Overview
//! - `highlight` – entity currently under the pointer
//! - `imageregistry` – image reference to renderer handle maps
//! - `reanimconfig` – INI-backed engine settings
//! - `reanimstore` – loaded definitions shared across entities
//! - `worldtime` – simulation time and delta
pub mod highlight;
pub mod imageregistry;
pub mod reanimconfig;
pub mod reanimstore;
pub mod worldtime;
