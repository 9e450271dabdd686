//! # Motion Profile Editor Core
//!
//! Time-indexed motion curves for a set of motors, edited through an
//! undo/redo history, repaired against value and slope limits, and saved or
//! exported as fixed-rate samples.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────┐  push   ┌──────────────┐  apply/invert  ┌──────────────┐
//! │   Session    ├────────►│ CommandStack ├───────────────►│MotionDocument│
//! │ (front end)  │ undo/   │  undo │ redo │                │  profiles    │
//! └──────┬───────┘ redo    └──────────────┘                │  active      │
//!        │                                                 └──────┬───────┘
//!        │ drag / snap   ┌──────────────┐                         │
//!        └──────────────►│  transform   │                  ┌──────▼───────┐
//!                        └──────────────┘                  │ MotorProfile │
//!                                                          │ nodes+limits │
//!                                                          └──────────────┘
//! ```
//!
//! - [`profile`] holds the sorted nodes, the range/slope limits, the repair
//!   sweep and interpolation.
//! - [`command`] holds the four undoable edits and the history stack.
//! - [`document`] owns the profiles and the active selection.
//! - [`persist`] and [`export`] read and write JSON or TOML files.
//! - [`session`] ties document, history and configuration together.
//!
//! Everything is single-threaded and synchronous: listeners registered with
//! `subscribe` run before the mutating call returns.
//!
//! ## Usage
//!
//! ```rust
//! use mpo_editor::{MotionNode, Session};
//!
//! let mut session = Session::default();
//! let motor = session.add_motor("Motor 1");
//! session.add_node(motor, MotionNode::new(2000.0, 50.0)).unwrap();
//! session.undo().unwrap();
//! assert_eq!(session.document().profile(motor).unwrap().len(), 1);
//! ```

#![warn(clippy::all)]

pub mod command;
pub mod document;
pub mod error;
pub mod events;
pub mod export;
pub mod node;
pub mod palette;
pub mod persist;
pub mod profile;
pub mod session;
pub mod transform;

pub use command::{Command, CommandKind, CommandStack, PushOutcome};
pub use document::{MotionDocument, ProfileId};
pub use error::{EditError, EditResult, ExportError, PersistError, PersistResult};
pub use events::{DocumentEvent, ProfileEvent, SubscriptionId};
pub use export::ExportRequest;
pub use node::{MotionNode, NodeId};
pub use palette::{Color, HueSequence};
pub use profile::MotorProfile;
pub use session::Session;
pub use transform::{DisplayPoint, Grid, SnapAxes};
