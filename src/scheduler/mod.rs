//! Periodic task scheduler.
//!
//! Every loaded task runs in its own tokio task as a strictly sequential loop:
//! an optional first cycle right away, then forever `sleep(interval)` followed by
//! one cycle. The sleep starts when the previous cycle ends, so cycles of a task
//! never overlap. Tasks do not wait on or exclude each other.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::module::{registry::LoadedTask, ModuleContext};

/// Starts the run loop of every task that is not running yet.
///
/// A task is only ever queued once; tasks that were queued before are skipped, so
/// calling this again (for instance after a gateway reconnect fires `ready` a
/// second time) does not start a second loop.
///
/// # Arguments
/// - `tasks` - Loaded tasks from the module registry
/// - `ctx` - Context handed to every cycle
///
/// # Returns
/// - `Vec<JoinHandle<()>>` - Handles of the loops started by this call. The loops
///   never finish on their own.
pub fn queue_tasks(tasks: &[Arc<LoadedTask>], ctx: &ModuleContext) -> Vec<JoinHandle<()>> {
    let mut handles = Vec::new();

    for task in tasks {
        if !task.run_state.mark_queued() {
            continue;
        }

        tracing::debug!(
            "Queueing task {} every {:?}",
            task.manifest.name,
            task.interval
        );
        handles.push(tokio::spawn(run_task_loop(task.clone(), ctx.clone())));
    }

    handles
}

async fn run_task_loop(task: Arc<LoadedTask>, ctx: ModuleContext) {
    if task.manifest.run_on_startup {
        run_cycle(&task, &ctx).await;
    }

    loop {
        tokio::time::sleep(task.interval).await;
        run_cycle(&task, &ctx).await;
    }
}

/// Runs one cycle and contains any failure to it.
///
/// The cycle counter is incremented before the run, whether or not the run
/// succeeds.
async fn run_cycle(task: &LoadedTask, ctx: &ModuleContext) {
    let cycle = task.run_state.next_cycle();
    let run = task.task.run(cycle, ctx).instrument(task.span.clone());

    match AssertUnwindSafe(run).catch_unwind().await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            tracing::warn!(
                "Error during queued task (name={}, cycle={}): {}",
                task.manifest.name,
                cycle,
                e
            );
        }
        Err(panic) => {
            tracing::error!(
                "Queued task panicked (name={}, cycle={}): {}",
                task.manifest.name,
                cycle,
                panic_message(panic.as_ref())
            );
        }
    }
}

/// Extracts the message of a caught panic.
pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
