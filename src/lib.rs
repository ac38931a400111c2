//! Manbo - voice reply plugin for chat bots
//!
//! This crate answers `/曼波 <text>` chat commands with a clip synthesized by a
//! text-to-speech API. Calls to the API are gated per chat group by an
//! in-process fixed-window rate limiter.

pub mod bot;
pub mod config;
pub mod error;
pub mod ratelimit;
pub mod voice;
