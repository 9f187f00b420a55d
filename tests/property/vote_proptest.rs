//! Property-based tests for votes

use crate::common::{new_record, TestProvider};
use feedkit::client::offline::OptimisticManager;
use feedkit::client::VoteOutcome;
use feedkit::shared::{FeedbackExtra, FeedbackType};
use proptest::prelude::*;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn test_repeated_votes_count_once(repeats in 1usize..6) {
        runtime().block_on(async {
            let t = TestProvider::new(None, true);
            let record = t
                .provider
                .submit_feedback("vote for me", FeedbackType::Feature, FeedbackExtra::default())
                .await
                .unwrap();

            let mut applied = 0;
            for _ in 0..repeats {
                if t.provider.vote_feedback(&record.id).await.unwrap() == VoteOutcome::Applied {
                    applied += 1;
                }
            }

            let after = &t.provider.feedbacks().await[0];
            prop_assert_eq!(applied, 1);
            prop_assert_eq!(after.votes, 1);
            prop_assert_eq!(after.voters.len(), 1);
            Ok(())
        })?;
    }

    #[test]
    fn test_votes_always_match_voters(
        ops in prop::collection::vec((0usize..4, any::<bool>()), 0..30),
    ) {
        runtime().block_on(async {
            let manager = OptimisticManager::new();
            let mut records = vec![new_record("counted")];
            let id = records[0].id.clone();

            for (voter, rollback) in ops {
                let voter = format!("voter_{}", voter);
                manager.apply_vote(&mut records, &id, &voter).await;
                if rollback {
                    manager.rollback_vote(&mut records, &id, &voter).await;
                } else {
                    manager.confirm_vote(&id, &voter).await;
                }
                prop_assert_eq!(records[0].votes as usize, records[0].voters.len());
            }
            Ok(())
        })?;
    }
}
