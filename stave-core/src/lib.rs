//! # stave-core
//!
//! History engine for structured project documents. Provides per-item-type
//! diff and merge logic, a revision tree with head and stashes, persistence,
//! and live project objects usable as tracked items.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stave_core::config::Config;
//! use stave_core::project::{MidiTrack, Project};
//! use stave_core::vcs::{VcsNotification, VersionControl};
//!
//! // 1. History for a new project, settings passed in explicitly
//! let config = Config::load();
//! let (tx, rx) = std::sync::mpsc::channel::<VcsNotification>();
//! let mut vcs = VersionControl::new(config.vcs_settings()).with_notifier(tx);
//! let mut project = Project::new("Demo");
//!
//! // 2. Record the initial items in the root revision
//! vcs.quick_amend_item(&project.info);
//! vcs.quick_amend_item(&project.timeline);
//!
//! // 3. Edit, inspect, commit
//! project.add_track(MidiTrack::piano("Lead"));
//! let changes = vcs.head_diff(&project);
//! let all: Vec<usize> = (0..changes.len()).collect();
//! vcs.commit(&all, "add lead", &project);
//!
//! // 4. Persist
//! stave_core::persistence::save_pack(&path, &vcs.to_pack(), &config.storage_options())?;
//! ```

pub mod config;
pub mod error;
pub mod persistence;
pub mod project;
pub mod vcs;

pub use error::{VcsError, VcsResult};
