//! Mailchimp Import Library
//!
//! This library provides functionality to read, parse, and import Mailchimp
//! subscriber exports into the mailing-list PostgreSQL database used by the
//! Attendly email service.
//!

pub mod config;
pub mod error;
pub mod parse;
pub mod import;
