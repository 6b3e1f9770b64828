//! A client for the [vMix](https://www.vmix.com) web API.
//!
//! vMix exposes an HTTP endpoint (port 8088 by default) that accepts function calls as query
//! strings and serves its current state as an XML document. This crate covers the calls needed
//! to drive title inputs: setting text fields and controlling countdown timers, plus listing the
//! inputs and their fields.
//!
//! ```rust,no_run
//! # async fn example() -> Result<(), vmix_api::Error> {
//! let vmix = vmix_api::Vmix::new("http://192.168.1.20:8088")?;
//! for input in vmix.inputs().await? {
//!     if let Some(field) = input.text.first() {
//!         let key = input.key().unwrap_or_default();
//!         vmix.set_text(key, field.name().unwrap_or("0"), "Live!").await?;
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! See: <https://www.vmix.com/help17/index.htm?DeveloperAPI.html>

pub mod client;
pub mod document;
pub mod error;
pub mod inputs;
pub mod query;

pub use client::Vmix;
pub use document::{Element, ParseError, ServerInfo};
pub use error::Error;
pub use inputs::{Input, TextField};
pub use query::{
    Function, Options, TextFieldSelector, build_query_string, countdown_duration,
    parse_query_string,
};
