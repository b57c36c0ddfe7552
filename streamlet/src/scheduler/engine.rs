use super::{actor::Actor, ingress::Mailbox, metrics};
use crate::{types::Message, Activity, Config, Error, Node, Reporter, Time};
use commonware_runtime::{Metrics, Spawner};
use futures::future::join_all;
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Discrete-event driver of a simulation.
///
/// Each iteration of the loop is one epoch:
/// 1. Invoke every node at the current time and enqueue what they produce
/// 2. Deliver queued messages (FIFO) until the queue is empty
/// 3. Stop once the epoch budget is reached, otherwise advance time by `2Δ`
pub struct Scheduler<E: Spawner + Metrics, R: Reporter<Activity = Activity>> {
    context: E,
    config: Config,
    reporter: R,

    time: Time,
    queue: VecDeque<Message>,

    metrics: metrics::Metrics,
}

impl<E: Spawner + Metrics, R: Reporter<Activity = Activity>> Scheduler<E, R> {
    /// Create a scheduler starting at `config.start_time`.
    pub fn new(context: E, config: Config, reporter: R) -> Self {
        let metrics = metrics::Metrics::init(context.clone());
        Self {
            context,
            time: config.start_time,
            config,
            reporter,
            queue: VecDeque::new(),
            metrics,
        }
    }

    /// Run `nodes` until the epoch budget is exhausted.
    ///
    /// Every node runs in its own actor. Results of each fan-out are joined (in ascending
    /// node index order) before the scheduler proceeds. On success, the nodes are returned
    /// (sorted by index) for inspection. The first error produced by any node halts the run.
    pub async fn run<N: Node>(mut self, mut nodes: Vec<N>) -> Result<Vec<N>, Error> {
        self.config.validate()?;
        nodes.sort_by_key(|node| node.index());

        // Start actors
        let mut mailboxes = Vec::with_capacity(nodes.len());
        let mut handles = Vec::with_capacity(nodes.len());
        for node in nodes {
            let index = node.index();
            let (actor, mailbox) = Actor::new(
                self.context.with_label(&format!("node_{index}")),
                node,
                self.config.mailbox_size,
            );
            handles.push((index, actor.start()));
            mailboxes.push(mailbox);
        }

        // Drive until the budget is exhausted (or a node fails)
        let result = self.drive(&mut mailboxes).await;
        drop(mailboxes);
        if let Err(err) = result {
            warn!(?err, time = self.time, "halting");
            return Err(err);
        }

        // Collect nodes once actors observe their closed mailboxes
        let mut nodes = Vec::with_capacity(handles.len());
        for (index, handle) in handles {
            let node = handle.await.map_err(|_| Error::NodeStopped(index))?;
            nodes.push(node);
        }
        Ok(nodes)
    }

    async fn drive(&mut self, mailboxes: &mut [Mailbox]) -> Result<(), Error> {
        loop {
            let epoch = self.config.epoch(self.time);
            self.metrics.epoch.set(epoch as i64);

            // Tick every node
            let t = self.time;
            let produced = join_all(mailboxes.iter_mut().map(|mailbox| mailbox.at_time(t))).await;
            for messages in produced {
                self.enqueue(messages?);
            }

            // Deliver until quiescent
            while let Some(message) = self.queue.pop_front() {
                let Some(mailbox) = mailboxes
                    .iter_mut()
                    .find(|mailbox| mailbox.index() == message.to)
                else {
                    warn!(
                        epoch,
                        from = message.from,
                        to = message.to,
                        "dropping message for unknown node"
                    );
                    continue;
                };
                self.reporter
                    .report(Activity::Delivered {
                        epoch,
                        message: message.clone(),
                    })
                    .await;
                self.metrics.delivered.inc();
                let messages = mailbox.deliver(message).await?;
                self.enqueue(messages);
            }
            self.reporter.report(Activity::Exhausted { epoch }).await;

            if epoch >= self.config.epoch_budget {
                debug!(epoch, time = self.time, "epoch budget exhausted");
                return Ok(());
            }
            self.time = self.config.next_epoch(self.time)?;
        }
    }

    fn enqueue(&mut self, messages: Vec<Message>) {
        self.metrics.produced.inc_by(messages.len() as u64);
        self.queue.extend(messages);
    }
}
