/// Unit tests for the pure calculators and the record store

mod targets_tests;
mod streak_tests;
mod trend_tests;
mod storage_tests;
