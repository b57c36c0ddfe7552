//! Observe the progress of a simulation.

use crate::{types::Message, Epoch};
use std::{fmt, future::Future};
use tracing::info;

/// Reporter receives activity from the [Scheduler](crate::Scheduler) as it happens.
///
/// A reporter is scoped to a single run and is the only channel through which the scheduler
/// emits its delivery log.
pub trait Reporter: Clone + Send + 'static {
    /// Activity observed by the scheduler.
    type Activity;

    /// Report some activity.
    fn report(&mut self, activity: Self::Activity) -> impl Future<Output = ()> + Send;
}

/// Scheduler activity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Activity {
    /// A message was popped from the queue and delivered.
    Delivered { epoch: Epoch, message: Message },

    /// The queue drained for the epoch.
    Exhausted { epoch: Epoch },
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Activity::Delivered { epoch, message } => write!(f, "epoch={epoch} | {message}"),
            Activity::Exhausted { epoch } => write!(f, "epoch={epoch} | Queue exhausted."),
        }
    }
}

/// Emit one log line per activity.
#[derive(Clone, Copy, Debug, Default)]
pub struct Logger;

impl Reporter for Logger {
    type Activity = Activity;

    async fn report(&mut self, activity: Self::Activity) {
        info!("{activity}");
    }
}

/// Reporting is a no-op if the [Reporter] is `None`.
impl<R> Reporter for Option<R>
where
    R: Reporter,
    R::Activity: Send,
{
    type Activity = R::Activity;

    async fn report(&mut self, activity: Self::Activity) {
        let Some(reporter) = self else {
            return;
        };
        reporter.report(activity).await;
    }
}
