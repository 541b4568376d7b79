use buddy_core::session::StudySession;

use crate::hw::StudyBoard;
use crate::telemetry::DefmtTelemetry;

#[embassy_executor::task]
pub async fn run(board: StudyBoard, telemetry: DefmtTelemetry) {
    let mut session = StudySession::new(board, telemetry);
    session.run().await;
}
