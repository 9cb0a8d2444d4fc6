//! CLI functionality for the cohort tool
//!
//! This module contains all CLI-related functionality including:
//! - Input loading
//! - Resource matching
//! - Scoring and ranking
//! - Validation
//! - Output formatting

pub mod input;
pub mod matching;
pub mod output;
pub mod rank;
pub mod score;
pub mod validate;
