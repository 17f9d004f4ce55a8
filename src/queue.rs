//! Play queue controller.
//!
//! `QueueController` owns the ordered track list, the cursor into it and
//! the single playback session, and keeps the three consistent. It is
//! generic over the audio backend so the bookkeeping can be exercised
//! without an output device.

mod controller;
mod poll;

pub use controller::*;
pub use poll::SeekPoll;

#[cfg(test)]
mod tests;
