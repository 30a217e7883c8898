//! # Request Module
//!
//! [`Request`] is one incoming call after routing: the verb and path, the
//! named path parameters bound from the matched route, the raw request data
//! (query string merged with the body) and, once the router has run them,
//! the normalized and model-validated list parameters.
//!
//! Format detection and normalization live in [`params`].

mod core;
mod ids;
pub mod params;

pub use core::{ParamVec, Request, MAX_INLINE_PARAMS};
pub use ids::RequestId;
