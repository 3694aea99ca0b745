//! Business logic and collaborator trait definitions for Leadline.
//!
//! This crate defines the "ports" (repository, feed, text-generation and
//! visitor-state traits) that the infrastructure layer implements, plus the
//! sync engine, reply-suggestion adapter, embed bridge and identity binding
//! built on them. It depends only on `leadline-types` -- never on
//! `leadline-infra` or any database/IO crate.

pub mod embed;
pub mod identity;
pub mod repository;
pub mod suggest;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;
