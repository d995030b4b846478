//! BMI Assist — conversational pediatric BMI intake.

pub mod chart;
pub mod chat;
pub mod config;
pub mod error;
pub mod intake;
pub mod percentile;
pub mod report;
