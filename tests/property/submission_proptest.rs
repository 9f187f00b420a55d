//! Property-based tests for submissions

use crate::common::TestProvider;
use feedkit::shared::{FeedbackExtra, FeedbackType};
use proptest::prelude::*;
use std::collections::HashSet;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn feedback_type() -> impl Strategy<Value = FeedbackType> {
    prop_oneof![
        Just(FeedbackType::Bug),
        Just(FeedbackType::Feature),
        Just(FeedbackType::Improvement),
        Just(FeedbackType::Other),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_each_submission_adds_one_record_with_fresh_id(
        messages in prop::collection::vec("[ ]{0,3}[a-zA-Z0-9][a-zA-Z0-9 .,!?]{0,60}", 1..8),
        kind in feedback_type(),
    ) {
        runtime().block_on(async {
            let t = TestProvider::new(None, false);
            let mut ids = HashSet::new();

            for (i, message) in messages.iter().enumerate() {
                let record = t
                    .provider
                    .submit_feedback(message, kind, FeedbackExtra::default())
                    .await
                    .unwrap();
                prop_assert!(ids.insert(record.id.clone()));
                prop_assert_eq!(t.provider.feedbacks().await.len(), i + 1);
                prop_assert_eq!(record.message, message.trim());
            }
            Ok(())
        })?;
    }

    #[test]
    fn test_blank_messages_never_create_records(message in "[ \t\r\n]{0,20}") {
        runtime().block_on(async {
            let t = TestProvider::new(None, false);
            let result = t
                .provider
                .submit_feedback(&message, FeedbackType::Bug, FeedbackExtra::default())
                .await;

            prop_assert!(result.is_err());
            prop_assert!(t.provider.feedbacks().await.is_empty());
            prop_assert!(t.provider.error().await.is_some());
            prop_assert!(t.store.load_all().await.is_empty());
            Ok(())
        })?;
    }
}
