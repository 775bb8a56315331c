//! Streaming evaluation with concurrent progress reporting.

mod evaluator;
mod progress;

pub use evaluator::{Evaluator, Tally};
pub use progress::{
    CompletionGuard, ProgressConfig, ProgressReporter, ProgressState, DEFAULT_POLL_INTERVAL,
    DEFAULT_UPDATE_INTERVAL, MINIMUM_POLL_INTERVAL,
};

use std::any::Any;
use std::io::{Read, Write};
use std::thread;

use tracing::warn;

use crate::error::{FillrateError, Result};
use crate::input::RowReader;

/// Evaluate `rows` on a worker thread while reporting progress to `writer`.
///
/// The reporter runs on the calling thread and stops when the worker signals
/// completion. Worker errors and panics are returned only after the reporter
/// has finished.
pub fn run<R, W>(
    evaluator: &Evaluator<'_>,
    mut rows: RowReader<R>,
    progress: &ProgressConfig,
    writer: W,
) -> Result<Tally>
where
    R: Read + Send,
    W: Write,
{
    let state = ProgressState::new();

    thread::scope(|scope| {
        let state = &state;
        let worker = scope.spawn(move || {
            let _guard = CompletionGuard::new(state);
            evaluator.run(&mut rows, state)
        });

        if progress.enabled {
            let mut reporter = ProgressReporter::new(writer, progress.clone());
            if let Err(e) = reporter.watch(state) {
                warn!(error = %e, "progress output failed");
            }
        }

        match worker.join() {
            Ok(result) => result,
            Err(payload) => Err(FillrateError::Worker(panic_message(payload.as_ref()))),
        }
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "worker panicked".to_string()
    }
}
