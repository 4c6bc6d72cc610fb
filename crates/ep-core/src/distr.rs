//! Configurable distributions for transition delays, per-person multipliers
//! and age-dependent branch probabilities.
//!
//! The configuration forms (`DelayDistribution`, `MultiplierDistribution`)
//! are plain serde data.  [`Sampler`] is the validated, ready-to-draw form,
//! built once at startup so invalid parameters fail before day 0.

use rand::Rng;
use serde::{Deserialize, Serialize};
use statrs::distribution::{Gamma, LogNormal};

use crate::{EpError, EpResult};

// ── Configuration forms ───────────────────────────────────────────────────────

/// Delay (in days) until a scheduled disease transition fires.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DelayDistribution {
    Fixed { days: u32 },
    /// Lognormal parameterised by its mean and the sigma of the underlying normal.
    LogNormal { mean: f64, sigma: f64 },
    Gamma { shape: f64, rate: f64 },
}

/// Per-person infectiousness / susceptibility factor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MultiplierDistribution {
    Constant { value: f64 },
    LogNormal { mean: f64, sigma: f64 },
}

impl Default for MultiplierDistribution {
    fn default() -> Self {
        MultiplierDistribution::Constant { value: 1.0 }
    }
}

/// Branch probability, optionally by age band.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Probability {
    Constant(f64),
    ByAge(Vec<AgeBand>),
}

/// Applies to persons aged `min_age` or older, up to the next band.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgeBand {
    pub min_age:     u8,
    pub probability: f64,
}

// ── Sampler ───────────────────────────────────────────────────────────────────

/// A validated distribution ready to draw from.
#[derive(Clone, Debug)]
pub enum Sampler {
    Constant(f64),
    LogNormal(LogNormal),
    Gamma(Gamma),
}

impl Sampler {
    /// Lognormal with the given mean; `mu = ln(mean) − sigma²/2`.
    pub fn log_normal_from_mean(mean: f64, sigma: f64) -> EpResult<Self> {
        if !(mean.is_finite() && mean > 0.0) {
            return Err(EpError::Distribution(format!("lognormal mean must be positive, got {mean}")));
        }
        if !(sigma.is_finite() && sigma >= 0.0) {
            return Err(EpError::Distribution(format!("lognormal sigma must be non-negative, got {sigma}")));
        }
        if sigma == 0.0 {
            return Ok(Sampler::Constant(mean));
        }
        let mu = mean.ln() - sigma * sigma / 2.0;
        LogNormal::new(mu, sigma)
            .map(Sampler::LogNormal)
            .map_err(|e| EpError::Distribution(e.to_string()))
    }

    pub fn gamma(shape: f64, rate: f64) -> EpResult<Self> {
        Gamma::new(shape, rate)
            .map(Sampler::Gamma)
            .map_err(|e| EpError::Distribution(format!("gamma(shape={shape}, rate={rate}): {e}")))
    }

    #[inline]
    pub fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        match self {
            Sampler::Constant(v) => *v,
            Sampler::LogNormal(d) => rng.sample(d),
            Sampler::Gamma(d) => rng.sample(d),
        }
    }
}

impl DelayDistribution {
    pub fn sampler(&self) -> EpResult<Sampler> {
        match *self {
            DelayDistribution::Fixed { days } => Ok(Sampler::Constant(f64::from(days))),
            DelayDistribution::LogNormal { mean, sigma } => Sampler::log_normal_from_mean(mean, sigma),
            DelayDistribution::Gamma { shape, rate } => Sampler::gamma(shape, rate),
        }
    }
}

/// Round a sampled delay to whole days, at least one.
#[inline]
pub fn delay_days(sample: f64) -> u32 {
    if !sample.is_finite() || sample < 1.5 {
        return 1;
    }
    sample.round().min(f64::from(u32::MAX)) as u32
}

impl MultiplierDistribution {
    pub fn sampler(&self) -> EpResult<Sampler> {
        match *self {
            MultiplierDistribution::Constant { value } => {
                if value.is_finite() && value >= 0.0 {
                    Ok(Sampler::Constant(value))
                } else {
                    Err(EpError::Distribution(format!("multiplier must be non-negative, got {value}")))
                }
            }
            MultiplierDistribution::LogNormal { mean, sigma } => Sampler::log_normal_from_mean(mean, sigma),
        }
    }
}

impl Probability {
    /// Probability for a person of `age`.  Unknown age uses the youngest band.
    pub fn for_age(&self, age: Option<u8>) -> f64 {
        match self {
            Probability::Constant(p) => *p,
            Probability::ByAge(bands) => {
                let mut chosen = bands.iter().min_by_key(|b| b.min_age).map_or(0.0, |b| b.probability);
                if let Some(age) = age {
                    let mut best: Option<&AgeBand> = None;
                    for band in bands.iter().filter(|b| b.min_age <= age) {
                        if best.is_none_or(|cur| band.min_age >= cur.min_age) {
                            best = Some(band);
                        }
                    }
                    if let Some(band) = best {
                        chosen = band.probability;
                    }
                }
                chosen
            }
        }
    }

    /// Ages at which the value can change (band thresholds).
    pub fn breakpoints(&self) -> Vec<u8> {
        match self {
            Probability::Constant(_) => vec![],
            Probability::ByAge(bands) => bands.iter().map(|b| b.min_age).collect(),
        }
    }

    pub fn validate(&self) -> EpResult<()> {
        let check = |p: f64| {
            if (0.0..=1.0).contains(&p) {
                Ok(())
            } else {
                Err(EpError::Config(format!("probability {p} outside [0, 1]")))
            }
        };
        match self {
            Probability::Constant(p) => check(*p),
            Probability::ByAge(bands) => {
                if bands.is_empty() {
                    return Err(EpError::Config("age-band probability table is empty".into()));
                }
                bands.iter().try_for_each(|b| check(b.probability))
            }
        }
    }
}
