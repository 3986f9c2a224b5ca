//! Simple to use tracker for habits and recurring tasks. Activities get a rhythm saying when they
//! are due, logged completions and minutes are checked against it to tell whether the activity is
//! on track.
//!

pub mod cli;
pub mod error;
pub mod model;
pub mod progress;
pub mod storage;
pub mod tracker;
pub mod utils;
