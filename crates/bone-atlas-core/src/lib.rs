//! # Bone Atlas Core
//!
//! Pure logic for turning heterogeneous bone identifiers (3D mesh names,
//! detection labels) into canonical catalog records, and for condensing a
//! batch of detections into a seed message for a chat collaborator.
//!
//! This crate contains no database, runtime, or filesystem dependencies.
//! All catalog access goes through the [`catalog::BoneCatalog`] trait,
//! which the host application implements.
//!
//! ## Pipeline
//!
//! ```text
//! RawDetection ──▶ normalize ──▶ resolve ──▶ aggregate ──▶ summarize
//!                                  │
//!                                  ▼
//!                            BoneCatalog (injected)
//! ```

pub mod aggregate;
pub mod catalog;
pub mod group;
pub mod ids;
pub mod models;
pub mod normalize;
pub mod resolve;
pub mod spine;
pub mod summarize;

#[cfg(test)]
pub(crate) mod test_support;
