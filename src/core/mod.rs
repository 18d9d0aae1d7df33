pub mod display;
pub mod interpreter;
pub mod keyboard;
pub mod memory;
pub mod observer;
pub mod opcode;
pub mod rom;
