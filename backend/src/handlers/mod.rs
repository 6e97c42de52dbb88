//! HTTP handlers

pub mod application;
pub mod assessment;
pub mod health;
pub mod notification;
pub mod payment;
pub mod workflow;

pub use application::*;
pub use assessment::*;
pub use health::*;
pub use notification::*;
pub use payment::*;
pub use workflow::*;
