//! Booking lifecycle, availability, and pricing engine for a marina dock-slip
//! rental platform.
//!
//! The browsing UI, authentication, email delivery, and database provisioning
//! live outside this crate; they are consumed through the traits in
//! [`booking::repository`] and [`booking::payments`].

pub mod booking;
pub mod config;
pub mod error;
pub mod telemetry;
