//! # LUMEN Core
//!
//! Collaborators the view layer is built on:
//! - Geometry shared by views and the canvas
//! - Style and theme snapshot, loadable from TOML
//! - Tag-keyed animation scheduler (tweens and timers)
//! - Typed event bus with drop-to-unsubscribe handles
//! - Immediate-mode canvas contract plus a recording implementation
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      FRAME LOOP                           │
//! ├──────────────────────────────────────────────────────────┤
//! │  Animator::tick → callbacks mutate view state            │
//! │  EventBus::emit → subscribers filter on their parent     │
//! │  View::frame    → Canvas commands (content, then focus)  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here runs on one loop. Shared records are `Arc` + `parking_lot`
//! locks only because callbacks outlive the borrow that scheduled them; no
//! lock is held while a callback runs.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod animation;
pub mod canvas;
pub mod error;
pub mod events;
pub mod geometry;
pub mod style;

pub use animation::{AnimationTag, Animator, Easing, Tween};
pub use canvas::{
    Canvas, CommandCanvas, HorizontalAlign, MonospaceMetrics, RenderCommand, TextMetrics,
    VerticalAlign,
};
pub use error::{UiError, UiResult};
pub use events::{EventBus, Subscription, SubscriptionId};
pub use geometry::{Boundary, Rect, TextBounds};
pub use style::{Color, Config, FontId, FontStash, Style, Theme};
