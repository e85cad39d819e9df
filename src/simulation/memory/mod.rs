//! Memory systems of the learning agent.
//!
//! This module provides:
//! - The associative h-value field with its glow eligibility trace
//! - Bounded ring buffers for the reward traces shown to the user

pub mod field;
mod ring_buffer;

pub use field::MemoryField;
pub use ring_buffer::RingBuffer;
