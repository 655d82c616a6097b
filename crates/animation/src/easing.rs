//! Easing curves mapping linear progress onto eased progress.
//!
//! Every curve maps `[0, 1]` onto `[0, 1]`, is non-decreasing, and hits the
//! endpoints exactly: `apply(0) == 0` and `apply(1) == 1`.

use paramsurf_core::{Error, Result};

/// Steepness of the logistic [`Easing::Smooth`] curve.
const SMOOTH_INFLECTION: f32 = 10.0;

/// Samples used when checking a custom curve.
const VALIDATION_SAMPLES: usize = 256;

/// Tolerance for custom curve endpoint and monotonicity checks.
const VALIDATION_TOLERANCE: f32 = 1e-4;

/// An easing curve.
#[derive(Clone, Copy, Debug, Default)]
pub enum Easing {
    /// Constant speed
    Linear,
    /// Logistic ease-in-out, slow at both ends
    #[default]
    Smooth,
    /// Cubic Hermite `3t² - 2t³`
    SmoothStep,
    /// Cubic ease-in-out
    EaseInOutCubic,
    /// First half of [`Easing::Smooth`] stretched over the whole interval
    RushInto,
    /// Second half of [`Easing::Smooth`] stretched over the whole interval
    RushFrom,
    /// Caller-supplied curve; checked by [`Easing::validate`]
    Custom(fn(f32) -> f32),
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

fn smooth(t: f32) -> f32 {
    let error = sigmoid(-SMOOTH_INFLECTION / 2.0);
    ((sigmoid(SMOOTH_INFLECTION * (t - 0.5)) - error) / (1.0 - 2.0 * error)).clamp(0.0, 1.0)
}

impl Easing {
    /// Eased progress for linear progress `t`, clamped to `[0, 1]`.
    pub fn apply(&self, t: f32) -> f32 {
        if t.is_nan() || t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        match self {
            Easing::Linear => t,
            Easing::Smooth => smooth(t),
            Easing::SmoothStep => t * t * (3.0 - 2.0 * t),
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::RushInto => 2.0 * smooth(t / 2.0),
            Easing::RushFrom => 2.0 * smooth(t / 2.0 + 0.5) - 1.0,
            Easing::Custom(f) => f(t),
        }
    }

    /// Check that the curve is usable for a tween.
    ///
    /// Built-in curves always pass. A custom curve must be finite, start at
    /// 0, end at 1 and never decrease.
    pub fn validate(&self) -> Result<()> {
        let Easing::Custom(f) = self else {
            return Ok(());
        };

        let start = f(0.0);
        let end = f(1.0);
        if !start.is_finite() || start.abs() > VALIDATION_TOLERANCE {
            return Err(Error::InvalidTween(format!(
                "easing must start at 0, got {start}"
            )));
        }
        if !end.is_finite() || (end - 1.0).abs() > VALIDATION_TOLERANCE {
            return Err(Error::InvalidTween(format!("easing must end at 1, got {end}")));
        }

        let mut previous = start;
        for i in 1..=VALIDATION_SAMPLES {
            let t = i as f32 / VALIDATION_SAMPLES as f32;
            let value = f(t);
            if !value.is_finite() {
                return Err(Error::InvalidTween(format!(
                    "easing is not finite at t = {t}"
                )));
            }
            if value < previous - VALIDATION_TOLERANCE {
                return Err(Error::InvalidTween(format!(
                    "easing decreases near t = {t} ({previous} -> {value})"
                )));
            }
            previous = value;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUILTIN: [Easing; 6] = [
        Easing::Linear,
        Easing::Smooth,
        Easing::SmoothStep,
        Easing::EaseInOutCubic,
        Easing::RushInto,
        Easing::RushFrom,
    ];

    #[test]
    fn test_endpoints_exact() {
        for easing in BUILTIN {
            assert_eq!(easing.apply(0.0), 0.0, "{:?}", easing);
            assert_eq!(easing.apply(1.0), 1.0, "{:?}", easing);
        }
    }

    #[test]
    fn test_builtins_monotonic() {
        for easing in BUILTIN {
            let mut previous = 0.0;
            for i in 0..=100 {
                let value = easing.apply(i as f32 / 100.0);
                assert!(value >= previous - 1e-6, "{:?} decreased at step {}", easing, i);
                assert!((0.0..=1.0).contains(&value));
                previous = value;
            }
            assert!(easing.validate().is_ok());
        }
    }

    #[test]
    fn test_smooth_is_symmetric() {
        assert!((Easing::Smooth.apply(0.5) - 0.5).abs() < 1e-6);
        let a = Easing::Smooth.apply(0.2);
        let b = Easing::Smooth.apply(0.8);
        assert!((a + b - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_input_clamped() {
        assert_eq!(Easing::Linear.apply(-0.5), 0.0);
        assert_eq!(Easing::Linear.apply(1.5), 1.0);
        assert_eq!(Easing::Smooth.apply(f32::NAN), 0.0);
    }

    #[test]
    fn test_custom_validation() {
        fn quad(t: f32) -> f32 {
            t * t
        }
        fn there_and_back(t: f32) -> f32 {
            if t < 0.5 { 2.0 * t } else { 2.0 - 2.0 * t }
        }
        fn offset(t: f32) -> f32 {
            0.5 + t / 2.0
        }

        assert!(Easing::Custom(quad).validate().is_ok());
        assert!(matches!(
            Easing::Custom(there_and_back).validate(),
            Err(Error::InvalidTween(_))
        ));
        assert!(matches!(
            Easing::Custom(offset).validate(),
            Err(Error::InvalidTween(_))
        ));
    }
}
