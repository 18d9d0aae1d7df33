//! A CHIP-8 virtual machine core: sixteen 8-bit registers, a 12-bit address
//! space, a bounded call stack, two countdown timers, a 64x32 monochrome
//! XOR display and a 16-key keypad.
//!
//! The interpreter in [`core::interpreter`] owns the register file, program
//! counter, call stack and timers, and drives a fetch-decode-execute cycle
//! through a masked-key opcode table. Memory, display and keyboard are
//! shared components, and an [`core::observer::Observer`] is notified
//! synchronously after every state mutation so a front end can mirror the
//! machine without polling.
//!
//! An external driver decides the cadence: it calls
//! [`core::interpreter::Interpreter::cycle`] for instructions and
//! `cycle_delay` / `cycle_sound` at its refresh rate for the timers. The
//! core itself never blocks; the only stall is the get-key instruction,
//! which rewinds the program counter until a key press is observed.

pub mod consts;
pub mod core;
pub mod utils;

#[cfg(feature = "display")]
pub mod external;
