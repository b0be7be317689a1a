pub mod advanced_stats;
pub mod advice;
pub mod box_score;
pub mod demo;
pub mod fake_advice;
pub mod http_client;
pub mod match_store;
pub mod persist;
pub mod report_export;
pub mod season;
pub mod shot_ledger;
pub mod state;
