//! Data models for Stockroom

mod activity;
mod category;
mod item;
mod report;
mod session;
mod user;

pub use activity::*;
pub use category::*;
pub use item::*;
pub use report::*;
pub use session::*;
pub use user::*;
