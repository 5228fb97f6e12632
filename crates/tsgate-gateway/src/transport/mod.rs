//! Transport layer (HTTP).
//!
//! Decodes requests, hands them to the timeseries service, and renders replies.

pub mod http;
