//! Integration tests
//!
//! End-to-end flows against a mock feedback endpoint

mod auto_sync_test;
mod offline_test;
mod storage_test;
mod sync_test;
mod vote_test;
