//! xephyr-graph - task dependency graph and critical path scheduling.
//!
//! The engine takes an immutable [`domain::Snapshot`] of one project's tasks
//! and dependency edges and answers questions about it: is a proposed edge
//! acyclic, what is the critical path, what would a change do to the
//! schedule, which tasks are blocked. [`engine::Engine`] is the synchronous
//! entry point; [`service::GraphDependencyService`] wraps it for async callers
//! that load snapshots from a [`service::SnapshotStore`].

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod cancel;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod graph;
pub mod id_generation;
pub mod report;
pub mod schedule;
pub mod service;
pub mod status;

// Public CLI module (needed by binary)
pub mod cli;

pub mod app;
pub mod output;
