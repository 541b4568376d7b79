//! Session telemetry for the firmware target.
//!
//! Events land in a small in-memory ring and are mirrored to defmt over RTT
//! (or stdout on host builds) so an attached debugger shows state transitions
//! and cues as they happen. Per-second countdown ticks are kept in the ring
//! but only logged when explicitly enabled.

#![cfg_attr(not(target_os = "none"), allow(dead_code))]

use buddy_core::telemetry::{SessionEvent, TelemetryRecorder, TelemetrySink};

/// Events retained in memory on the device.
pub const FIRMWARE_RING_CAPACITY: usize = 32;

pub struct DefmtTelemetry {
    recorder: TelemetryRecorder<FIRMWARE_RING_CAPACITY>,
    log_ticks: bool,
}

impl DefmtTelemetry {
    pub const fn new() -> Self {
        Self {
            recorder: TelemetryRecorder::new(),
            log_ticks: false,
        }
    }

    /// Also logs the once-per-second countdown events.
    #[must_use]
    pub const fn with_tick_logging(mut self, log_ticks: bool) -> Self {
        self.log_ticks = log_ticks;
        self
    }

    pub const fn recorder(&self) -> &TelemetryRecorder<FIRMWARE_RING_CAPACITY> {
        &self.recorder
    }

    fn should_log(&self, event: SessionEvent) -> bool {
        self.log_ticks || !event.is_periodic()
    }
}

impl Default for DefmtTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetrySink for DefmtTelemetry {
    fn record(&mut self, event: SessionEvent) {
        self.recorder.record(event);
        if self.should_log(event) {
            emit_log(event);
        }
    }
}

#[cfg(target_os = "none")]
fn emit_log(event: SessionEvent) {
    defmt::info!(
        "telemetry:session {=u16:#06x} {}",
        event.to_raw(),
        defmt::Display2Format(&event)
    );
}

#[cfg(not(target_os = "none"))]
fn emit_log(event: SessionEvent) {
    println!("telemetry:session {:#06x} {event}", event.to_raw());
}
