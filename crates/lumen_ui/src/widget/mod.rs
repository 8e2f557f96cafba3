//! Concrete views.

mod label;
mod layer_view;

pub use label::{ellipsis_fraction, elide, Label, LabelAnimation, LabelStyle, ELLIPSIS};
pub use layer_view::LayerView;
