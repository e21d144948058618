pub mod config;
pub mod days;
pub mod display;
pub mod error;
pub mod planner;
pub mod reconcile;
pub mod store;
pub mod trip_lock;
pub mod validate;

pub use config::*;
pub use days::*;
pub use display::*;
pub use error::*;
pub use planner::*;
pub use reconcile::*;
pub use store::*;
pub use trip_lock::*;
pub use validate::*;
