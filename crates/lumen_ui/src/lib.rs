//! # LUMEN UI
//!
//! Retained-mode views for directional (non-pointer) navigation:
//! - [`View`]: boundary, parent link, focus flag and the five hooks
//! - [`Label`]: measured, elided, ticker-scrolling text
//! - [`LayerView`]: one active child out of many
//! - [`Application`]: style, theme, animation clock, focus and input gate
//!
//! ## Frame
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │ Application::tick   → animation/timer callbacks            │
//! │ Application::frame  → queued focus requests resolved       │
//! │                     → root.frame: layout? → draw → outline │
//! │                        LayerView narrows to active layer   │
//! └────────────────────────────────────────────────────────────┘
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod app;
pub mod view;
pub mod widget;

pub use app::{Application, Coordinator, FocusChange, FocusRequest, InputBlock};
pub use view::{find_view_mut, FocusDirection, FrameContext, View, ViewBase, ViewHandle, ViewId};
pub use widget::{Label, LabelAnimation, LabelStyle, LayerView};
