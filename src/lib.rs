// Allow unwrap, float comparison and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::float_cmp))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! War Advisor: a deterministic strategy recommender for force compositions.
//!
//! Every unit and every strategy is a point in an eight-dimensional
//! attribute space. An army is the mean of its units; battlefield
//! conditions reshape that profile; strategies are ranked by how close
//! their ideal profile lies.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │   Advisor (request → recommendation)     │
//! ├──────────────┬──────────────┬────────────┤
//! │  army        │  modifiers   │  ranking   │
//! │  (aggregate) │  (conditions)│  (+affinity)│
//! ├──────────────┴──────────────┴────────────┤
//! │   Dataset (units, strategies, tables)    │
//! └──────────────────────────────────────────┘
//! ```
//!
//! The [`Dataset`] is loaded once and only ever borrowed, so any number of
//! requests (see [`batch`]) can be evaluated in parallel against it.

pub mod advisor;
pub mod affinity;
pub mod army;
pub mod attributes;
pub mod batch;
pub mod catalog;
pub mod dataset;
pub mod error;
pub mod modifiers;
pub mod ranking;
pub mod report;

pub use advisor::{Advisor, Recommendation, Request};
pub use affinity::{AffinityConfig, compute_adjustment};
pub use army::aggregate;
pub use attributes::{ATTRIBUTE_COUNT, Attribute, AttributeVector};
pub use catalog::{Strategy, Unit, UnitCatalog};
pub use dataset::Dataset;
pub use error::{AdvisorError, AdvisorResult, ConfigError};
pub use modifiers::{
    ConditionKind, Conditions, CriticalWarning, ModifiedProfile, ModifierTable, apply_modifiers,
};
pub use ranking::{RankedStrategy, rank};
