//! Easing curves applied to segment progress.
//!
//! Every curve maps `0 → 0` and `1 → 1`. `Elastic` and `Back` overshoot in between.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Easing curve, named `<Family><In|Out|InOut>` (plus `Linear`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum Easing {
    #[default]
    Linear,
    QuadraticIn,
    QuadraticOut,
    QuadraticInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    QuarticIn,
    QuarticOut,
    QuarticInOut,
    QuinticIn,
    QuinticOut,
    QuinticInOut,
    SinusoidalIn,
    SinusoidalOut,
    SinusoidalInOut,
    ExponentialIn,
    ExponentialOut,
    ExponentialInOut,
    CircularIn,
    CircularOut,
    CircularInOut,
    ElasticIn,
    ElasticOut,
    ElasticInOut,
    BackIn,
    BackOut,
    BackInOut,
    BounceIn,
    BounceOut,
    BounceInOut,
}

static NAMES: [(&str, Easing); 31] = [
    ("Linear", Easing::Linear),
    ("QuadraticIn", Easing::QuadraticIn),
    ("QuadraticOut", Easing::QuadraticOut),
    ("QuadraticInOut", Easing::QuadraticInOut),
    ("CubicIn", Easing::CubicIn),
    ("CubicOut", Easing::CubicOut),
    ("CubicInOut", Easing::CubicInOut),
    ("QuarticIn", Easing::QuarticIn),
    ("QuarticOut", Easing::QuarticOut),
    ("QuarticInOut", Easing::QuarticInOut),
    ("QuinticIn", Easing::QuinticIn),
    ("QuinticOut", Easing::QuinticOut),
    ("QuinticInOut", Easing::QuinticInOut),
    ("SinusoidalIn", Easing::SinusoidalIn),
    ("SinusoidalOut", Easing::SinusoidalOut),
    ("SinusoidalInOut", Easing::SinusoidalInOut),
    ("ExponentialIn", Easing::ExponentialIn),
    ("ExponentialOut", Easing::ExponentialOut),
    ("ExponentialInOut", Easing::ExponentialInOut),
    ("CircularIn", Easing::CircularIn),
    ("CircularOut", Easing::CircularOut),
    ("CircularInOut", Easing::CircularInOut),
    ("ElasticIn", Easing::ElasticIn),
    ("ElasticOut", Easing::ElasticOut),
    ("ElasticInOut", Easing::ElasticInOut),
    ("BackIn", Easing::BackIn),
    ("BackOut", Easing::BackOut),
    ("BackInOut", Easing::BackInOut),
    ("BounceIn", Easing::BounceIn),
    ("BounceOut", Easing::BounceOut),
    ("BounceInOut", Easing::BounceInOut),
];

const ELASTIC_PERIOD: f64 = 0.4;
const BACK_OVERSHOOT: f64 = 1.70158;

impl Easing {
    /// Every curve, in declaration order.
    pub fn all() -> impl Iterator<Item = Easing> {
        NAMES.iter().map(|&(_, e)| e)
    }

    pub fn name(self) -> &'static str {
        NAMES
            .iter()
            .find(|&&(_, e)| e == self)
            .map_or("Linear", |&(name, _)| name)
    }

    /// Eased value of progress `k` (expected in `[0, 1]`).
    pub fn apply(self, k: f64) -> f64 {
        use Easing::*;
        match self {
            Linear => k,

            QuadraticIn => k * k,
            QuadraticOut => k * (2.0 - k),
            QuadraticInOut => in_out(k, |k| k * k),

            CubicIn => k.powi(3),
            CubicOut => (k - 1.0).powi(3) + 1.0,
            CubicInOut => in_out(k, |k| k.powi(3)),

            QuarticIn => k.powi(4),
            QuarticOut => 1.0 - (k - 1.0).powi(4),
            QuarticInOut => in_out(k, |k| k.powi(4)),

            QuinticIn => k.powi(5),
            QuinticOut => (k - 1.0).powi(5) + 1.0,
            QuinticInOut => in_out(k, |k| k.powi(5)),

            SinusoidalIn => 1.0 - (k * PI / 2.0).cos(),
            SinusoidalOut => (k * PI / 2.0).sin(),
            SinusoidalInOut => 0.5 * (1.0 - (PI * k).cos()),

            ExponentialIn => endpoints(k).unwrap_or_else(|| 1024f64.powf(k - 1.0)),
            ExponentialOut => endpoints(k).unwrap_or_else(|| 1.0 - 2f64.powf(-10.0 * k)),
            ExponentialInOut => endpoints(k).unwrap_or_else(|| in_out(k, |k| 1024f64.powf(k - 1.0))),

            CircularIn => 1.0 - (1.0 - k * k).max(0.0).sqrt(),
            CircularOut => (1.0 - (k - 1.0).powi(2)).max(0.0).sqrt(),
            CircularInOut => in_out(k, |k| 1.0 - (1.0 - k * k).max(0.0).sqrt()),

            ElasticIn => endpoints(k).unwrap_or_else(|| elastic_in(k)),
            ElasticOut => endpoints(k).unwrap_or_else(|| 1.0 - elastic_in(1.0 - k)),
            ElasticInOut => endpoints(k).unwrap_or_else(|| in_out(k, elastic_in)),

            BackIn => back_in(k, BACK_OVERSHOOT),
            BackOut => 1.0 - back_in(1.0 - k, BACK_OVERSHOOT),
            BackInOut => in_out(k, |k| back_in(k, BACK_OVERSHOOT * 1.525)),

            BounceIn => 1.0 - bounce_out(1.0 - k),
            BounceOut => bounce_out(k),
            BounceInOut => {
                if k < 0.5 {
                    (1.0 - bounce_out(1.0 - 2.0 * k)) * 0.5
                } else {
                    bounce_out(2.0 * k - 1.0) * 0.5 + 0.5
                }
            }
        }
    }
}

/// Mirrors an ease-in curve into an in-out one.
fn in_out(k: f64, ease_in: impl Fn(f64) -> f64) -> f64 {
    if k < 0.5 {
        0.5 * ease_in(2.0 * k)
    } else {
        1.0 - 0.5 * ease_in(2.0 - 2.0 * k)
    }
}

fn endpoints(k: f64) -> Option<f64> {
    if k <= 0.0 {
        Some(0.0)
    } else if k >= 1.0 {
        Some(1.0)
    } else {
        None
    }
}

fn elastic_in(k: f64) -> f64 {
    let s = ELASTIC_PERIOD / 4.0;
    let k = k - 1.0;
    -(2f64.powf(10.0 * k) * ((k - s) * (2.0 * PI) / ELASTIC_PERIOD).sin())
}

fn back_in(k: f64, s: f64) -> f64 {
    k * k * ((s + 1.0) * k - s)
}

fn bounce_out(k: f64) -> f64 {
    const N: f64 = 7.5625;
    const D: f64 = 2.75;
    if k < 1.0 / D {
        N * k * k
    } else if k < 2.0 / D {
        let k = k - 1.5 / D;
        N * k * k + 0.75
    } else if k < 2.5 / D {
        let k = k - 2.25 / D;
        N * k * k + 0.9375
    } else {
        let k = k - 2.625 / D;
        N * k * k + 0.984375
    }
}

#[derive(Debug, Error)]
#[error("unknown easing {0:?}")]
pub struct UnknownEasing(pub String);

impl FromStr for Easing {
    type Err = UnknownEasing;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NAMES
            .iter()
            .find(|(name, _)| *name == s)
            .map(|&(_, e)| e)
            .ok_or_else(|| UnknownEasing(s.to_owned()))
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
