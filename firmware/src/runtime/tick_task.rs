use embassy_time::{Duration, Ticker};

use crate::tick::mark_second;

#[embassy_executor::task]
pub async fn run() -> ! {
    let mut ticker = Ticker::every(Duration::from_secs(1));
    loop {
        ticker.next().await;
        mark_second();
    }
}
