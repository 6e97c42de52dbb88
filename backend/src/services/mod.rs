//! Business logic services for the GACP Certification Platform

pub mod application;
pub mod assessment;
pub mod notification;
pub mod payment;
pub mod workflow;
