//! Pure easing functions for page animations

pub use crate::config::EasingType;

/// Extension trait for EasingType with calculation methods
pub trait EasingTypeExt {
    /// Apply the easing function to a progress value in [0, 1]
    fn apply(&self, t: f64) -> f64;
}

impl EasingTypeExt for EasingType {
    #[inline]
    fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            EasingType::Linear => t,
            EasingType::Cubic => cubic_ease_out(t),
            EasingType::Quartic => ease_out_quart(t),
            EasingType::Quintic => quintic_ease_out(t),
        }
    }
}

/// Cubic ease-out: f(t) = 1 - (1-t)³
#[inline]
fn cubic_ease_out(t: f64) -> f64 {
    let inv = 1.0 - t;
    1.0 - inv * inv * inv
}

/// Quartic ease-out: f(t) = 1 - (1-t)⁴
#[inline]
pub fn ease_out_quart(t: f64) -> f64 {
    let inv = 1.0 - t;
    1.0 - inv * inv * inv * inv
}

/// Quintic ease-out: f(t) = 1 - (1-t)⁵
#[inline]
fn quintic_ease_out(t: f64) -> f64 {
    let inv = 1.0 - t;
    1.0 - inv * inv * inv * inv * inv
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ease_out_quart_endpoints() {
        assert_eq!(ease_out_quart(0.0), 0.0);
        assert_eq!(ease_out_quart(1.0), 1.0);
        assert!((ease_out_quart(0.5) - 0.9375).abs() < 1e-12);
    }

    #[test]
    fn test_ease_out_quart_monotonic() {
        let mut prev = ease_out_quart(0.0);
        for i in 1..=1000 {
            let v = ease_out_quart(i as f64 / 1000.0);
            assert!(v >= prev, "not monotonic at step {}", i);
            prev = v;
        }
    }

    #[test]
    fn test_easing_boundaries() {
        for easing in [
            EasingType::Linear,
            EasingType::Cubic,
            EasingType::Quartic,
            EasingType::Quintic,
        ] {
            assert!(easing.apply(0.0).abs() < 0.001, "{:?} at t=0", easing);
            assert!((easing.apply(1.0) - 1.0).abs() < 0.001, "{:?} at t=1", easing);
        }
    }

    #[test]
    fn test_apply_clamps_input() {
        assert_eq!(EasingType::Quartic.apply(-0.5), 0.0);
        assert_eq!(EasingType::Quartic.apply(1.5), 1.0);
    }
}
