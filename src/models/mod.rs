pub mod actor;
pub mod appointment;
pub mod capacity;
pub mod coupon;
pub mod interval;
pub mod service;
pub mod settings;
pub mod staff;

pub use actor::*;
pub use appointment::*;
pub use capacity::*;
pub use coupon::*;
pub use interval::*;
pub use service::*;
pub use settings::*;
pub use staff::*;
