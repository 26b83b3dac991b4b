//! Spectral graph wavelets.
//!
//! A wavelet bank is a [`Filter`] made of one low-pass kernel \(h\) plus band-pass kernels
//! \(g(s_j \lambda)\) at geometrically spaced scales \(s_j\). Analysis and synthesis are the
//! generic [`Filter::analyze`] / [`Filter::synthesize`], exact or Chebyshev.

use crate::filter::{Filter, Kernel};
use crate::{Error, Result};

/// `n` scales, log-spaced and decreasing from `2 / lmin` to `1 / lmax`.
///
/// The coarsest band kernel then peaks near `lmin` and the finest near `lmax`.
pub fn log_scales(lmin: f64, lmax: f64, n: usize) -> Result<Vec<f64>> {
    if !(lmin.is_finite() && lmax.is_finite()) || lmin <= 0.0 || lmin >= lmax {
        return Err(Error::InvalidParameter(format!(
            "log_scales requires 0 < lmin < lmax (lmin={lmin} lmax={lmax})"
        )));
    }
    if n == 0 {
        return Err(Error::InvalidParameter("n must be > 0".to_string()));
    }
    let (hi, lo) = ((2.0 / lmin).ln(), (1.0 / lmax).ln());
    if n == 1 {
        return Ok(vec![hi.exp()]);
    }
    let step = (lo - hi) / (n - 1) as f64;
    Ok((0..n).map(|i| (hi + step * i as f64).exp()).collect())
}

#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MexicanHatConfig {
    /// Total kernels, including the low-pass one.
    pub n_filters: usize,
    /// `lmin = lambda_max / lowpass_factor` sets the low-pass cutoff and the coarsest scale.
    pub lowpass_factor: f64,
}

impl Default for MexicanHatConfig {
    fn default() -> Self {
        Self {
            n_filters: 6,
            lowpass_factor: 20.0,
        }
    }
}

impl MexicanHatConfig {
    pub fn validate(&self) -> Result<()> {
        if self.n_filters < 2 {
            return Err(Error::InvalidParameter(
                "n_filters must be >= 2".to_string(),
            ));
        }
        if !self.lowpass_factor.is_finite() || self.lowpass_factor <= 1.0 {
            return Err(Error::InvalidParameter(
                "lowpass_factor must be finite and > 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Mexican-hat wavelet bank on \([0, \lambda_{max}]\).
///
/// - low pass: \(h(\lambda) = 1.2\,e^{-1} \exp(-(\lambda / 0.4\,l_{min})^4)\)
/// - band pass: \(g(s\lambda)\) with \(g(x) = x e^{-x}\), one per scale from
///   [`log_scales`]`(lmin, lambda_max, n_filters - 1)`
pub fn mexican_hat(lambda_max: f64, config: MexicanHatConfig) -> Result<Filter> {
    config.validate()?;
    if !lambda_max.is_finite() || lambda_max <= 0.0 {
        return Err(Error::InvalidParameter(
            "lambda_max must be finite and > 0".to_string(),
        ));
    }
    let lmin = lambda_max / config.lowpass_factor;
    let scales = log_scales(lmin, lambda_max, config.n_filters - 1)?;

    let cutoff = 0.4 * lmin;
    let gain = 1.2 * (-1.0f64).exp();
    let mut kernels: Vec<Kernel> = Vec::with_capacity(config.n_filters);
    kernels.push(Box::new(move |l: f64| gain * (-(l / cutoff).powi(4)).exp()));
    for s in scales {
        kernels.push(Box::new(move |l: f64| {
            let x = s * l;
            x * (-x).exp()
        }));
    }
    tracing::debug!(
        lambda_max,
        n_filters = config.n_filters,
        lmin,
        "built mexican hat wavelet bank"
    );
    Filter::new(kernels)
}
