//! Property-based tests

mod storage_proptest;
mod submission_proptest;
mod vote_proptest;
