//! # Kondate Meal Planner
//!
//! Core of a Japanese home-cooking meal planner. Recipes come from a
//! text-generation provider; this crate normalizes their free-text amounts,
//! filters them through a quality gate, repairs under-specified dishes with
//! static trust rules, estimates cost and nutrition from a composition table,
//! and assembles single-day suggestions or a budget-constrained weekly plan
//! with a shopping list.
//!
//! ## Usage
//!
//! ```rust
//! use kondate::config::PlannerConfig;
//! use kondate::planner::Planner;
//! use kondate::provider::FallbackProvider;
//!
//! let config = PlannerConfig {
//!     num_days: 3,
//!     budget_yen: 100_000,
//!     ..Default::default()
//! };
//! let planner = Planner::new(FallbackProvider, config);
//! let plan = planner.plan_week().unwrap();
//! assert_eq!(plan.days.len(), 3);
//! assert!(plan.within_budget());
//! ```

pub mod circuit_breaker;
pub mod classifier;
pub mod composition;
pub mod config;
pub mod cost;
pub mod equipment;
pub mod errors;
pub mod estimator;
pub mod formatting;
pub mod messages;
pub mod normalizer;
pub mod nutrition;
pub mod planner;
pub mod provider;
pub mod quality;
pub mod quantity;
pub mod quantity_patterns;
pub mod recipe_model;
pub mod shopping;
pub mod trust;
