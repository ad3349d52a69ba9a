//! Pagetree Kernel Library
//!
//! A hierarchical, multilingual page tree: nodes, their per-language
//! translations and version snapshots, slug and URL resolution, and
//! permission-filtered navigation menus.
//!
//! The `pagetree` binary serves the tree over HTTP.

pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod menu;
pub mod models;
pub mod permissions;
pub mod resolver;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
