//! Agents built on the state graph.

pub mod plan;
