//! Time-driven page animations
//!
//! ## Primitives
//! - `easing` - Pure easing curves mapping [0, 1] to [0, 1]
//! - `timing` - Progress and interpolation helpers
//!
//! ## Animators
//! - `counter` - Metric display count-up
//! - `visibility` - One-shot reveal of elements entering the viewport
//! - `scroll` - Smooth viewport scrolling
//!
//! Animators never read the clock themselves; callers pass the frame time,
//! which keeps every animation replayable on a virtual clock.

pub mod easing;
pub mod timing;

pub mod counter;
pub mod scroll;
pub mod visibility;

pub use counter::{CounterAnimator, MetricDisplay, MetricUnit};
pub use easing::{ease_out_quart, EasingType, EasingTypeExt};
pub use scroll::SmoothScroller;
pub use visibility::{ObserverOptions, VisibilityAnimator};
