//! Fixed-interval cycle loop.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;

use super::Director;
use crate::common::panic_message;

/// Run cycles until `shutdown` resolves, sleeping `interval` after each one.
///
/// A cycle that panics is logged and the loop carries on. Shutdown is
/// honoured mid-cycle as well as during the sleep. Returns how many cycles
/// were started.
pub async fn run_scheduler<F>(director: &Director, interval: Duration, shutdown: F) -> u64
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut cycles = 0u64;

    tracing::info!(
        interval_secs = interval.as_secs_f64(),
        profile = %director.settings().profile_name,
        "Director started"
    );

    loop {
        cycles += 1;
        let cycle = AssertUnwindSafe(director.run_cycle()).catch_unwind();

        tokio::select! {
            result = cycle => {
                if let Err(payload) = result {
                    tracing::error!(
                        cycle = cycles,
                        panic = %panic_message(payload.as_ref()),
                        "Cycle panicked"
                    );
                }
            }
            _ = &mut shutdown => {
                tracing::info!(cycle = cycles, "Shutdown during cycle");
                break;
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = &mut shutdown => break,
        }
    }

    tracing::info!(cycles, "Director stopped");
    cycles
}
