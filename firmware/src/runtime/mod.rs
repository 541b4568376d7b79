use cortex_m::interrupt;
use cortex_m::register::primask;
use critical_section::{self, RawRestoreState};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_stm32 as hal;

use crate::hw;
use crate::telemetry::DefmtTelemetry;

mod session_task;
mod tick_task;

critical_section::set_impl!(InterruptCriticalSection);

struct InterruptCriticalSection;

unsafe impl critical_section::Impl for InterruptCriticalSection {
    unsafe fn acquire() -> RawRestoreState {
        let primask = primask::read();
        interrupt::disable();
        primask.is_active()
    }

    unsafe fn release(restore_state: RawRestoreState) {
        if restore_state {
            unsafe {
                interrupt::enable();
            }
        }
    }
}

#[embassy_executor::main]
pub async fn main(spawner: Spawner) {
    let config = hal::Config::default();
    let board = hw::init_board(hal::init(config));

    defmt::info!("study buddy: peripherals ready");

    spawner
        .spawn(tick_task::run())
        .expect("failed to spawn tick task");

    spawner
        .spawn(session_task::run(board, DefmtTelemetry::new()))
        .expect("failed to spawn session task");

    core::future::pending::<()>().await;
}
