//! Terminal client for taking exams.
//!
//! Login, the exam list and the exam screen, driven by a single async event
//! loop over terminal input, background API results and session ticks.

mod client;
mod state;
mod ui;

pub use client::run;
