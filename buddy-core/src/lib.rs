#![no_std]

// Shared logic for the Study Buddy timer appliance.
//
// This crate stays portable across MCU firmware and host tooling by avoiding the
// Rust standard library. Hardware is reached only through the traits in `hal`,
// so the session machine runs unchanged on the STM32 board, in the terminal
// emulator, and under scripted test fakes.

pub mod countdown;
pub mod display;
pub mod editor;
pub mod feedback;
pub mod hal;
pub mod input;
pub mod session;
pub mod telemetry;
pub mod tick;
