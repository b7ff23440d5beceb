//! Data loading and session management for the Armada strategy engine.
//!
//! [`loader`] reads technology data files (RON/JSON/TOML) into
//! declarations, [`schema`] defines their on-disk shape, and [`session`]
//! ties the loaded graph and the populated specification cache together
//! into one [`session::GameSession`] context object.

pub mod loader;
pub mod schema;
pub mod session;

pub use loader::{DataLoadError, load_tech_declarations};
pub use session::{GameSession, SessionError};
