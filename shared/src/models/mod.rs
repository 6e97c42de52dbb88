//! Domain models for the GACP Certification Platform

mod application;
mod assessment;
mod notification;
mod payment;
mod user;

pub use application::*;
pub use assessment::*;
pub use notification::*;
pub use payment::*;
pub use user::*;
