//! Sample changer controller types.
//!
//! This module contains the types describing a CATS/ISARA/ISARA2 controller
//! as seen by the protocol client.

pub mod config;
pub mod consts;
pub mod error;
pub mod model;
pub mod status;
