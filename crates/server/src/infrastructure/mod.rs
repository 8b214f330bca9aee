//! Infrastructure layer: ports and their concrete adapters.

pub mod archive;
pub mod cache;
pub mod clock;
pub mod pool_api;
pub mod ports;
pub mod sqlite;
pub mod wynncraft;
