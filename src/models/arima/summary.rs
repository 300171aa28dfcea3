//! Text summary of a fitted SARIMA model: coefficient table with
//! asymptotic inference plus residual diagnostics.

use crate::error::{ForecastError, Result};
use crate::features::autocorrelation::autocorrelation;
use crate::features::basic::{moment_kurtosis, moment_skewness};
use crate::models::arima::sarima::SARIMA;
use crate::models::Forecaster;
use statrs::distribution::{ChiSquared, ContinuousCDF, FisherSnedecor, Normal};
use std::fmt;

/// One row of the coefficient table.
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientRow {
    pub name: String,
    pub estimate: f64,
    pub std_error: f64,
    pub z: f64,
    pub p_value: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
}

/// A test statistic with its p-value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestResult {
    pub statistic: f64,
    pub p_value: f64,
}

/// Everything printed in the model summary.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSummary {
    pub label: String,
    pub series_label: String,
    pub observations: usize,
    pub log_likelihood: f64,
    pub aic: f64,
    pub bic: f64,
    pub hqic: f64,
    pub converged: bool,
    pub coefficients: Vec<CoefficientRow>,
    /// Ljung-Box Q at lag 1.
    pub ljung_box: TestResult,
    pub jarque_bera: TestResult,
    /// Heteroskedasticity test comparing the last and first thirds.
    pub heteroskedasticity: TestResult,
    pub skew: f64,
    pub kurtosis: f64,
}

impl ModelSummary {
    /// Build the summary for a fitted model.
    pub fn from_model(model: &SARIMA) -> Result<Self> {
        let diagnostics = model.diagnostics().ok_or(ForecastError::FitRequired)?;
        let residuals = model.residuals().ok_or(ForecastError::FitRequired)?;
        let series = model.training_series().ok_or(ForecastError::FitRequired)?;
        let spec = model.spec();

        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| ForecastError::ComputationError(e.to_string()))?;
        let z_crit = normal.inverse_cdf(0.975);

        let coefficients = spec
            .param_names()
            .into_iter()
            .zip(model.params())
            .zip(diagnostics.std_errors.iter().copied())
            .map(|((name, estimate), std_error)| {
                let z = estimate / std_error;
                let p_value = if z.is_finite() {
                    2.0 * (1.0 - normal.cdf(z.abs()))
                } else {
                    f64::NAN
                };
                CoefficientRow {
                    name,
                    estimate,
                    std_error,
                    z,
                    p_value,
                    ci_lower: estimate - z_crit * std_error,
                    ci_upper: estimate + z_crit * std_error,
                }
            })
            .collect();

        Ok(Self {
            label: spec.to_string(),
            series_label: series.label().unwrap_or("y").to_string(),
            observations: series.len(),
            log_likelihood: diagnostics.log_likelihood,
            aic: diagnostics.aic,
            bic: diagnostics.bic,
            hqic: diagnostics.hqic,
            converged: diagnostics.converged,
            coefficients,
            ljung_box: ljung_box(residuals, 1),
            jarque_bera: jarque_bera(residuals),
            heteroskedasticity: heteroskedasticity(residuals),
            skew: moment_skewness(residuals),
            kurtosis: moment_kurtosis(residuals),
        })
    }
}

/// Ljung-Box portmanteau test up to `lags`.
pub fn ljung_box(residuals: &[f64], lags: usize) -> TestResult {
    let n = residuals.len();
    if lags == 0 || n <= lags + 1 {
        return TestResult {
            statistic: f64::NAN,
            p_value: f64::NAN,
        };
    }
    let nf = n as f64;
    let q = nf
        * (nf + 2.0)
        * (1..=lags)
            .map(|k| autocorrelation(residuals, k).powi(2) / (nf - k as f64))
            .sum::<f64>();
    TestResult {
        statistic: q,
        p_value: chi_squared_sf(q, lags as f64),
    }
}

/// Jarque-Bera normality test.
pub fn jarque_bera(residuals: &[f64]) -> TestResult {
    let n = residuals.len() as f64;
    let skew = moment_skewness(residuals);
    let excess = moment_kurtosis(residuals) - 3.0;
    let statistic = n / 6.0 * (skew * skew + excess * excess / 4.0);
    TestResult {
        statistic,
        p_value: chi_squared_sf(statistic, 2.0),
    }
}

/// Ratio of the residual sum of squares in the last third to the first
/// third, with a two-sided F test.
pub fn heteroskedasticity(residuals: &[f64]) -> TestResult {
    let h = (residuals.len() as f64 / 3.0).round() as usize;
    if h == 0 {
        return TestResult {
            statistic: f64::NAN,
            p_value: f64::NAN,
        };
    }
    let ss = |part: &[f64]| part.iter().map(|e| e * e).sum::<f64>();
    let denominator = ss(&residuals[..h]);
    let statistic = ss(&residuals[residuals.len() - h..]) / denominator;
    if denominator == 0.0 || !statistic.is_finite() {
        return TestResult {
            statistic: f64::NAN,
            p_value: f64::NAN,
        };
    }
    let p_value = FisherSnedecor::new(h as f64, h as f64)
        .map(|f| {
            let lower = f.cdf(statistic);
            2.0 * lower.min(1.0 - lower)
        })
        .unwrap_or(f64::NAN);
    TestResult { statistic, p_value }
}

fn chi_squared_sf(statistic: f64, df: f64) -> f64 {
    if !statistic.is_finite() {
        return f64::NAN;
    }
    ChiSquared::new(df)
        .map(|d| 1.0 - d.cdf(statistic))
        .unwrap_or(f64::NAN)
}

impl fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(78);
        let thin = "-".repeat(78);
        writeln!(f, "{:^78}", "SARIMAX Results")?;
        writeln!(f, "{}", rule)?;
        writeln!(
            f,
            "{:<16}{:>22}   {:<18}{:>20}",
            "Dep. Variable:", self.series_label, "No. Observations:", self.observations
        )?;
        writeln!(
            f,
            "{:<16}{:>22}   {:<18}{:>20.3}",
            "Model:", self.label, "Log Likelihood", self.log_likelihood
        )?;
        writeln!(
            f,
            "{:<16}{:>22}   {:<18}{:>20.3}",
            "Converged:", self.converged, "AIC", self.aic
        )?;
        writeln!(f, "{:<41}{:<18}{:>20.3}", "", "BIC", self.bic)?;
        writeln!(f, "{:<41}{:<18}{:>20.3}", "", "HQIC", self.hqic)?;
        writeln!(f, "{}", rule)?;
        writeln!(
            f,
            "{:<12}{:>11}{:>11}{:>10}{:>10}{:>12}{:>12}",
            "", "coef", "std err", "z", "P>|z|", "[0.025", "0.975]"
        )?;
        writeln!(f, "{}", thin)?;
        for row in &self.coefficients {
            writeln!(
                f,
                "{:<12}{:>11.4}{:>11.3}{:>10.3}{:>10.3}{:>12.3}{:>12.3}",
                row.name, row.estimate, row.std_error, row.z, row.p_value, row.ci_lower, row.ci_upper
            )?;
        }
        writeln!(f, "{}", rule)?;
        writeln!(
            f,
            "{:<28}{:>10.2}   {:<26}{:>11.2}",
            "Ljung-Box (L1) (Q):",
            self.ljung_box.statistic,
            "Jarque-Bera (JB):",
            self.jarque_bera.statistic
        )?;
        writeln!(
            f,
            "{:<28}{:>10.2}   {:<26}{:>11.2}",
            "Prob(Q):", self.ljung_box.p_value, "Prob(JB):", self.jarque_bera.p_value
        )?;
        writeln!(
            f,
            "{:<28}{:>10.2}   {:<26}{:>11.2}",
            "Heteroskedasticity (H):", self.heteroskedasticity.statistic, "Skew:", self.skew
        )?;
        writeln!(
            f,
            "{:<28}{:>10.2}   {:<26}{:>11.2}",
            "Prob(H) (two-sided):", self.heteroskedasticity.p_value, "Kurtosis:", self.kurtosis
        )?;
        write!(f, "{}", rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TimeSeries;
    use crate::models::arima::sarima::SARIMASpec;
    use approx::assert_relative_eq;
    use chrono::{Duration, NaiveDate};

    fn lcg_noise(n: usize, seed: u64) -> Vec<f64> {
        let mut state = seed;
        (0..n)
            .map(|_| {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                (state >> 33) as f64 / (1u64 << 31) as f64 - 0.5
            })
            .collect()
    }

    fn fitted_model() -> SARIMA {
        let base = NaiveDate::from_ymd_opt(2022, 4, 1).unwrap();
        let eps = lcg_noise(80, 5);
        let values: Vec<f64> = (0..80)
            .map(|i| 1000.0 + 5.0 * i as f64 + 60.0 * ((i % 7) as f64 - 3.0) + 20.0 * eps[i])
            .collect();
        let dates = (0..80).map(|i| base + Duration::days(i as i64)).collect();
        let ts = TimeSeries::new(dates, values)
            .unwrap()
            .with_label("Instagram reach");
        let mut model = SARIMA::new(SARIMASpec::new(1, 1, 1, 1, 1, 1, 7));
        model.fit(&ts).unwrap();
        model
    }

    #[test]
    fn summary_lists_every_parameter() {
        let summary = ModelSummary::from_model(&fitted_model()).unwrap();
        let names: Vec<&str> = summary.coefficients.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["ar.L1", "ma.L1", "ar.S.L7", "ma.S.L7", "sigma2"]);
        assert_eq!(summary.observations, 80);
        assert_eq!(summary.label, "SARIMAX(1, 1, 1)x(1, 1, 1, 7)");

        for row in &summary.coefficients {
            if row.std_error.is_finite() {
                assert!(row.ci_lower <= row.estimate && row.estimate <= row.ci_upper);
                assert!((0.0..=1.0).contains(&row.p_value));
            }
        }
    }

    #[test]
    fn summary_renders_table() {
        let text = ModelSummary::from_model(&fitted_model()).unwrap().to_string();
        assert!(text.contains("SARIMAX Results"));
        assert!(text.contains("Instagram reach"));
        assert!(text.contains("ma.S.L7"));
        assert!(text.contains("Ljung-Box (L1) (Q):"));
        assert!(text.contains("Kurtosis:"));
    }

    #[test]
    fn summary_requires_fit() {
        let model = SARIMA::default();
        assert!(matches!(
            ModelSummary::from_model(&model),
            Err(ForecastError::FitRequired)
        ));
    }

    #[test]
    fn ljung_box_flags_autocorrelated_residuals() {
        let white = lcg_noise(200, 9);
        let mut ar = vec![0.0; 200];
        for t in 1..200 {
            ar[t] = 0.8 * ar[t - 1] + white[t];
        }
        assert!(ljung_box(&white, 1).p_value > 0.01);
        assert!(ljung_box(&ar, 1).p_value < 0.001);
        assert!(ljung_box(&[1.0, 2.0], 1).statistic.is_nan());
    }

    #[test]
    fn jarque_bera_of_symmetric_uniform() {
        let values = lcg_noise(500, 1);
        let jb = jarque_bera(&values);
        // Uniform kurtosis 1.8 gives JB close to n/24 * 1.44.
        assert!(jb.statistic > 20.0);
        assert!(jb.p_value < 0.001);
    }

    #[test]
    fn heteroskedasticity_ratio() {
        let mut residuals = vec![1.0; 30];
        for r in residuals.iter_mut().skip(20) {
            *r = 2.0;
        }
        let h = heteroskedasticity(&residuals);
        assert_relative_eq!(h.statistic, 4.0, epsilon = 1e-12);
        assert!(h.p_value < 0.05);

        let flat = heteroskedasticity(&[1.0; 30]);
        assert_relative_eq!(flat.statistic, 1.0, epsilon = 1e-12);
        assert_relative_eq!(flat.p_value, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn heteroskedasticity_with_zero_leading_residuals() {
        let zeros = heteroskedasticity(&[0.0; 30]);
        assert!(zeros.statistic.is_nan());
        assert!(zeros.p_value.is_nan());

        let mut residuals = vec![0.0; 30];
        for r in residuals.iter_mut().skip(20) {
            *r = 3.0;
        }
        let h = heteroskedasticity(&residuals);
        assert!(h.statistic.is_nan());
        assert!(h.p_value.is_nan());
    }

    fn fit_daily(values: Vec<f64>) -> SARIMA {
        let base = NaiveDate::from_ymd_opt(2022, 4, 1).unwrap();
        let dates = (0..values.len())
            .map(|i| base + Duration::days(i as i64))
            .collect();
        let ts = TimeSeries::new(dates, values).unwrap();
        let mut model = SARIMA::default();
        model.fit(&ts).unwrap();
        model
    }

    #[test]
    fn summary_of_constant_series() {
        let model = fit_daily(vec![100.0; 60]);
        let summary = ModelSummary::from_model(&model).unwrap();
        assert_eq!(summary.observations, 60);
        assert!(summary.heteroskedasticity.p_value.is_nan());
        assert!(summary.to_string().contains("SARIMAX Results"));
    }

    #[test]
    fn summary_of_linear_series() {
        let model = fit_daily((0..60).map(|i| 1000.0 + 5.0 * i as f64).collect());
        let summary = ModelSummary::from_model(&model).unwrap();
        assert_eq!(summary.coefficients.len(), 5);
        assert!(summary.heteroskedasticity.statistic.is_nan());
        assert!(summary.to_string().contains("Heteroskedasticity (H):"));
    }
}
