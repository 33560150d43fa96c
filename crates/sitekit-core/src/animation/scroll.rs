//! Smooth scrolling of the viewport offset
//!
//! Call `scroll_to()` to begin an animation, then `update()` each frame to
//! get the current interpolated offset.

use std::time::Duration;

use tokio::time::Instant;

use super::easing::{EasingType, EasingTypeExt};
use super::timing::{lerp, progress};
use crate::config::NavigationConfig;

/// Active scroll animation state
#[derive(Debug, Clone)]
struct ActiveAnimation {
    start: Instant,
    from: f64,
    to: f64,
    duration: Duration,
    easing: EasingType,
}

#[derive(Debug, Clone)]
pub struct SmoothScroller {
    animation: Option<ActiveAnimation>,
    smooth_enabled: bool,
    duration: Duration,
    easing: EasingType,
}

impl Default for SmoothScroller {
    fn default() -> Self {
        Self::from_config(&NavigationConfig::default())
    }
}

impl SmoothScroller {
    pub fn new(smooth_enabled: bool, duration: Duration, easing: EasingType) -> Self {
        Self {
            animation: None,
            smooth_enabled,
            duration,
            easing,
        }
    }

    pub fn from_config(config: &NavigationConfig) -> Self {
        Self::new(
            config.smooth_enabled,
            Duration::from_millis(config.smooth_duration_ms),
            config.easing,
        )
    }

    /// Check if smooth scrolling is effectively enabled
    #[inline]
    pub fn is_smooth(&self) -> bool {
        self.smooth_enabled && !self.duration.is_zero()
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Final offset of the running animation
    pub fn target(&self) -> Option<f64> {
        self.animation.as_ref().map(|a| a.to)
    }

    /// Begin scrolling from `from` to `target` (clamped to `[0, max_scroll]`).
    ///
    /// Returns the new offset when the move happens at once (smooth
    /// scrolling disabled). A new target replaces any running animation,
    /// starting from `from`.
    pub fn scroll_to(&mut self, from: f64, target: f64, max_scroll: f64, now: Instant) -> Option<f64> {
        let target = target.clamp(0.0, max_scroll.max(0.0));

        if !self.is_smooth() {
            self.animation = None;
            return Some(target);
        }

        if (from - target).abs() < f64::EPSILON {
            self.animation = None;
            return None;
        }

        self.animation = Some(ActiveAnimation {
            start: now,
            from,
            to: target,
            duration: self.duration,
            easing: self.easing,
        });
        None
    }

    /// Advance the animation and return the offset for this frame
    pub fn update(&mut self, now: Instant) -> Option<f64> {
        let anim = self.animation.as_ref()?;
        let t = progress(anim.start, now, anim.duration);
        if t >= 1.0 {
            let to = anim.to;
            self.animation = None;
            return Some(to);
        }
        Some(lerp(anim.from, anim.to, anim.easing.apply(t)))
    }

    /// Cancel any active animation
    pub fn cancel(&mut self) {
        self.animation = None;
    }
}
