//! Property-based tests for the pending store

use feedkit::client::{MemoryStore, PendingStore};
use feedkit::shared::{
    Attachment, FeedbackConfig, FeedbackExtra, FeedbackRecord, FeedbackType, SubmissionStatus,
};
use proptest::prelude::*;
use std::sync::Arc;

fn feedback_type() -> impl Strategy<Value = FeedbackType> {
    prop_oneof![
        Just(FeedbackType::Bug),
        Just(FeedbackType::Feature),
        Just(FeedbackType::Improvement),
        Just(FeedbackType::Other),
    ]
}

fn submission_status() -> impl Strategy<Value = SubmissionStatus> {
    prop_oneof![Just(SubmissionStatus::Pending), Just(SubmissionStatus::Failed)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_saved_record_loads_unchanged(
        message in "\\PC{1,200}",
        kind in feedback_type(),
        status in submission_status(),
        filenames in prop::collection::vec("[a-z]{1,8}\\.png", 0..3),
    ) {
        prop_assume!(!message.trim().is_empty());

        tokio_test::block_on(async {
            let store = PendingStore::new(Arc::new(MemoryStore::new()), &FeedbackConfig::default());
            let extra = FeedbackExtra {
                attachments: filenames
                    .iter()
                    .map(|f| Attachment::new(f.as_str(), "image/png", 1024))
                    .collect(),
                ..FeedbackExtra::default()
            };
            let mut record = FeedbackRecord::new(&message, kind, extra);
            record.submission_status = status;

            store.save(&record).await;
            let loaded = store.get(&record.id).await;

            prop_assert_eq!(loaded, Some(record));
            Ok(())
        })?;
    }
}
