//! Drive a node population through simulated time.
//!
//! The [Scheduler] owns the virtual clock and the only message queue. Nodes run in their own
//! actors and are reached through mailboxes. Within one epoch, every cascade a proposal
//! triggers (votes, notarization, finalization) settles before the clock advances, which
//! models synchronous rounds where every message sent within an epoch arrives within it.

mod actor;
mod engine;
pub use engine::Scheduler;
mod ingress;
mod metrics;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        audit,
        mocks::{Impostor, Recorder},
        types::{Message, Payload},
        Activity, Config, Elector, Epoch, Error, Hashed, HonestNode, Index, Logger, Node,
        OfflineNode, Participant, RoundRobin,
    };
    use commonware_macros::test_traced;
    use commonware_runtime::{deterministic, Metrics, Runner};

    fn honest<E: Elector>(
        context: &deterministic::Context,
        config: &Config,
        elector: E,
    ) -> Vec<HonestNode<deterministic::Context, E>> {
        (0..config.node_count)
            .map(|index| HonestNode::new(context.clone(), index, elector.clone(), config.clone()))
            .collect()
    }

    fn scenario() -> Config {
        Config {
            node_count: 4,
            max_dishonest: 1,
            epoch_duration: 1,
            start_time: 0,
            epoch_budget: 5,
            ..Default::default()
        }
    }

    fn epochs(blocks: &[crate::types::Block]) -> Vec<Epoch> {
        blocks.iter().map(|block| block.epoch).collect()
    }

    #[test_traced]
    fn test_all_honest() {
        let executor = deterministic::Runner::seeded(0);
        executor.start(|context| async move {
            let config = Config::default();
            let nodes = honest(&context, &config, RoundRobin);
            let scheduler = Scheduler::new(context.with_label("scheduler"), config.clone(), Logger);
            let nodes = scheduler.run(nodes).await.unwrap();

            // Safety and liveness
            let chains = audit::finalized_chains(&nodes);
            assert_eq!(chains.len(), 1);
            assert_eq!(chains[0].len() as u64, config.epoch_budget - 1);
            for node in &nodes {
                assert_eq!(node.finalized(), &chains[0][..]);
            }
        });
    }

    #[test_traced]
    fn test_all_honest_hashed() {
        let executor = deterministic::Runner::seeded(1);
        executor.start(|context| async move {
            let config = Config {
                node_count: 7,
                max_dishonest: 2,
                epoch_duration: 3,
                epoch_budget: 50,
                ..Default::default()
            };
            let nodes = honest(&context, &config, Hashed);
            let scheduler = Scheduler::new(
                context.with_label("scheduler"),
                config.clone(),
                None::<Logger>,
            );
            let nodes = scheduler.run(nodes).await.unwrap();

            let chains = audit::finalized_chains(&nodes);
            assert_eq!(chains.len(), 1);
            assert_eq!(chains[0].len() as u64, config.epoch_budget - 1);
            assert_eq!(epochs(&chains[0]), (0..49).collect::<Vec<_>>());
        });
    }

    #[test_traced]
    fn test_offline() {
        let executor = deterministic::Runner::seeded(2);
        executor.start(|context| async move {
            let config = Config::default();
            let online = config.node_count - config.max_dishonest;
            let nodes = (0..config.node_count)
                .map(|index| {
                    if index < online {
                        Participant::Honest(HonestNode::new(
                            context.clone(),
                            index,
                            Hashed,
                            config.clone(),
                        ))
                    } else {
                        Participant::Offline(OfflineNode::new(index, Hashed, config.clone()))
                    }
                })
                .collect();
            let scheduler = Scheduler::new(
                context.with_label("scheduler"),
                config.clone(),
                None::<Logger>,
            );
            let nodes = scheduler.run(nodes).await.unwrap();

            // Offline leadership matches the elector
            let skipped: u64 = nodes
                .iter()
                .map(|node| match node {
                    Participant::Offline(node) => node.leader_count(),
                    Participant::Honest(_) => 0,
                })
                .sum();
            let expected = (0..=config.epoch_budget)
                .filter(|epoch| Hashed.leader(*epoch, config.node_count) >= online)
                .count() as u64;
            assert_eq!(skipped, expected);
            assert!(skipped > 0);

            // At most one chain, shortened by every skipped epoch
            let chains = audit::finalized_chains(&nodes);
            assert!(chains.len() <= 1);
            let length = chains.first().map_or(0, |chain| chain.len()) as u64;
            assert!(length <= (config.epoch_budget - 1) - skipped);
        });
    }

    #[test_traced]
    fn test_offline_round_robin() {
        let executor = deterministic::Runner::seeded(3);
        executor.start(|context| async move {
            // Node 3 leads (and skips) epochs 3 and 7
            let config = Config {
                epoch_budget: 9,
                ..scenario()
            };
            let mut nodes: Vec<_> = honest(&context, &config, RoundRobin)
                .into_iter()
                .take(3)
                .map(Participant::Honest)
                .collect();
            nodes.push(Participant::Offline(OfflineNode::new(3, RoundRobin, config.clone())));
            let scheduler = Scheduler::new(context.with_label("scheduler"), config, None::<Logger>);
            let nodes = scheduler.run(nodes).await.unwrap();

            // Notarized epochs 0,1,2,4,5,6,8,9: the last consecutive group seen (4,5,6)
            // finalizes through epoch 4, and 8,9 never complete a group
            let chains = audit::finalized_chains(&nodes);
            assert_eq!(chains.len(), 1);
            assert_eq!(epochs(&chains[0]), vec![0, 1, 2, 4]);
        });
    }

    #[test_traced]
    fn test_concrete_scenario() {
        let executor = deterministic::Runner::seeded(4);
        executor.start(|context| async move {
            let config = scenario();
            let recorder = Recorder::default();
            let nodes = honest(&context, &config, RoundRobin);
            let scheduler =
                Scheduler::new(context.with_label("scheduler"), config, recorder.clone());
            let nodes = scheduler.run(nodes).await.unwrap();

            let chains = audit::finalized_chains(&nodes);
            assert_eq!(chains.len(), 1);
            assert_eq!(epochs(&chains[0]), vec![0, 1, 2, 3]);
            for node in &nodes {
                assert_eq!(epochs(node.finalized()), vec![0, 1, 2, 3]);
            }

            // 4 proposals and 16 votes per epoch, 6 epochs
            let activities = recorder.activities();
            let delivered = activities
                .iter()
                .filter(|activity| matches!(activity, Activity::Delivered { .. }))
                .count();
            assert_eq!(delivered, 120);
            assert_eq!(activities.len(), 126);
            assert_eq!(activities.last(), Some(&Activity::Exhausted { epoch: 5 }));
            let metrics = context.encode();
            assert!(metrics.contains("delivered_total 120"));
            assert!(metrics.contains("produced_total 120"));
        });
    }

    /// Epoch, sender, recipient and kind of every delivery.
    type Shape = (Epoch, Index, Index, bool);

    fn shape(activities: &[Activity]) -> Vec<Shape> {
        activities
            .iter()
            .filter_map(|activity| match activity {
                Activity::Delivered {
                    epoch,
                    message: Message { from, to, payload },
                } => Some((*epoch, *from, *to, matches!(payload, Payload::Block(_)))),
                Activity::Exhausted { .. } => None,
            })
            .collect()
    }

    fn record(seed: u64) -> Vec<Activity> {
        let executor = deterministic::Runner::seeded(seed);
        executor.start(|context| async move {
            let config = scenario();
            let recorder = Recorder::default();
            let nodes = honest(&context, &config, RoundRobin);
            let scheduler =
                Scheduler::new(context.with_label("scheduler"), config, recorder.clone());
            scheduler.run(nodes).await.unwrap();
            recorder.activities()
        })
    }

    #[test_traced]
    fn test_delivery_order() {
        let activities = record(5);
        let shape = shape(&activities);

        // Proposal fans out in index order, then votes queue behind it in index order
        let expected: Vec<Shape> = (0..4)
            .map(|to| (0, 0, to, true))
            .chain((0..4).flat_map(|from| (0..4).map(move |to| (0, from, to, false))))
            .collect();
        assert_eq!(&shape[..20], &expected[..]);
        assert_eq!(shape[20], (1, 1, 0, true));
    }

    #[test_traced]
    fn test_determinism() {
        let first = record(6);
        assert_eq!(first, record(6));

        // Identifiers change with the seed, ordering does not
        let other = record(7);
        assert_ne!(first, other);
        assert_eq!(shape(&first), shape(&other));
    }

    #[test_traced]
    fn test_halts_on_vote_without_proposal() {
        let executor = deterministic::Runner::seeded(8);
        executor.start(|context| async move {
            let config = scenario();
            let mut nodes: Vec<Box<dyn Node>> = vec![Box::new(Impostor {
                index: 0,
                target: 1,
            })];
            for node in honest(&context, &config, RoundRobin).into_iter().skip(1) {
                nodes.push(Box::new(node));
            }
            let recorder = Recorder::default();
            let scheduler =
                Scheduler::new(context.with_label("scheduler"), config, recorder.clone());
            let result = scheduler.run(nodes).await;
            assert!(matches!(result, Err(Error::VoteWithoutProposal(0))));

            // Halted during the first delivery
            assert_eq!(recorder.activities().len(), 1);
        });
    }

    #[test_traced]
    fn test_drops_message_for_unknown_node() {
        let executor = deterministic::Runner::seeded(12);
        executor.start(|context| async move {
            let config = scenario();
            let mut nodes: Vec<Box<dyn Node>> = vec![Box::new(Impostor {
                index: 0,
                target: 7,
            })];
            for node in honest(&context, &config, RoundRobin).into_iter().skip(1) {
                nodes.push(Box::new(node));
            }
            let recorder = Recorder::default();
            let scheduler =
                Scheduler::new(context.with_label("scheduler"), config, recorder.clone());
            let nodes = scheduler.run(nodes).await.unwrap();
            assert_eq!(nodes.len(), 4);

            // Nothing reaches node 7, so epoch 0 settles without a delivery
            let activities = recorder.activities();
            assert_eq!(activities[0], Activity::Exhausted { epoch: 0 });
            let delivered = shape(&activities);
            assert!(delivered.iter().all(|(_, _, to, _)| *to != 7));
            let metrics = context.encode();
            assert!(metrics.contains(&format!("delivered_total {}", delivered.len())));
        });
    }

    #[test_traced]
    fn test_start_after_budget() {
        let executor = deterministic::Runner::seeded(9);
        executor.start(|context| async move {
            let config = Config {
                start_time: 20,
                ..scenario()
            };
            let recorder = Recorder::default();
            let nodes = honest(&context, &config, RoundRobin);
            let scheduler =
                Scheduler::new(context.with_label("scheduler"), config, recorder.clone());
            let nodes = scheduler.run(nodes).await.unwrap();

            // A single epoch (10) runs: its block is notarized but nothing finalizes
            assert_eq!(
                recorder.activities().last(),
                Some(&Activity::Exhausted { epoch: 10 })
            );
            for node in &nodes {
                assert_eq!(node.notarized().len(), 1);
                assert!(node.finalized().is_empty());
            }
        });
    }

    #[test_traced]
    fn test_halts_on_time_overflow() {
        let executor = deterministic::Runner::seeded(11);
        executor.start(|context| async move {
            let config = Config {
                start_time: u64::MAX - 1,
                epoch_budget: u64::MAX,
                ..scenario()
            };
            let recorder = Recorder::default();
            let nodes = honest(&context, &config, RoundRobin);
            let scheduler =
                Scheduler::new(context.with_label("scheduler"), config, recorder.clone());
            let result = scheduler.run(nodes).await;
            assert!(matches!(result, Err(Error::TimeOverflow(t)) if t == u64::MAX - 1));

            // The last representable epoch still settles before the halt
            let epoch = (u64::MAX - 1) / 2;
            assert_eq!(
                recorder.activities().last(),
                Some(&Activity::Exhausted { epoch })
            );
        });
    }

    #[test_traced]
    fn test_rejects_invalid_config() {
        let executor = deterministic::Runner::seeded(10);
        executor.start(|context| async move {
            let config = Config {
                epoch_duration: 0,
                ..scenario()
            };
            let nodes = honest(&context, &scenario(), RoundRobin);
            let scheduler = Scheduler::new(context.with_label("scheduler"), config, Logger);
            let result = scheduler.run(nodes).await;
            assert!(matches!(result, Err(Error::InvalidEpochDuration)));
        });
    }
}
