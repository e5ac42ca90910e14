//! Ordinary least squares with classical inference.
//!
//! `estimate` takes the dependent values and the independent columns after
//! listwise deletion (equal lengths, no missing values) and solves the
//! normal equations directly: XᵗX is accumulated into a dense matrix and
//! inverted by Gauss-Jordan elimination with partial pivoting, so a
//! singular design surfaces as the collinearity error rather than a
//! garbage estimate. Inference uses the Student-t and F distributions.

use faer::Mat;
use statrs::distribution::{ContinuousCDF, FisherSnedecor, StudentsT};

use rustata_types::error::{Result, RustataError};

/// Pivot magnitude below which XᵗX is treated as singular.
const SINGULARITY_EPS: f64 = 1e-12;

/// A fitted regression: coefficients in regressor order (the constant, when
/// present, is last), per-coefficient inference, and the ANOVA decomposition.
/// `f` and `f_prob` are NaN when the model has zero model degrees of freedom.
#[derive(Debug, Clone)]
pub struct OlsFit {
    pub n: usize,
    pub k: usize,
    pub beta: Vec<f64>,
    pub std_err: Vec<f64>,
    pub t: Vec<f64>,
    pub p: Vec<f64>,
    pub ci_low: Vec<f64>,
    pub ci_high: Vec<f64>,
    pub sst: f64,
    pub ssr: f64,
    pub sse: f64,
    pub df_total: usize,
    pub df_model: usize,
    pub df_resid: usize,
    pub ms_total: f64,
    pub ms_model: f64,
    pub ms_resid: f64,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    pub f: f64,
    pub f_prob: f64,
    pub root_mse: f64,
}

/// Estimate y on the given regressors, appending a constant column when
/// `constant` is set. Fails when there are no more observations than
/// parameters or when the regressors are collinear.
pub fn estimate(y: &[f64], xs: &[Vec<f64>], constant: bool) -> Result<OlsFit> {
    let n = y.len();
    let k = xs.len() + usize::from(constant);
    if n <= k {
        return Err(RustataError::Computation(
            "insufficient observations".into(),
        ));
    }

    // Design matrix: regressors in varlist order, the constant last.
    let x = Mat::from_fn(n, k, |row, col| {
        if col < xs.len() { xs[col][row] } else { 1.0 }
    });

    let mut xtx = Mat::<f64>::zeros(k, k);
    for i in 0..k {
        for j in 0..k {
            let mut sum = 0.0;
            for row in 0..n {
                sum += x.read(row, i) * x.read(row, j);
            }
            xtx.write(i, j, sum);
        }
    }
    let mut xty = vec![0.0; k];
    for (j, slot) in xty.iter_mut().enumerate() {
        let mut sum = 0.0;
        for (row, &yv) in y.iter().enumerate() {
            sum += x.read(row, j) * yv;
        }
        *slot = sum;
    }

    let inv = invert(&xtx)?;
    let mut beta = vec![0.0; k];
    for (i, slot) in beta.iter_mut().enumerate() {
        let mut sum = 0.0;
        for (j, &rhs) in xty.iter().enumerate() {
            sum += inv.read(i, j) * rhs;
        }
        *slot = sum;
    }

    // Residuals e = Xβ − y and the grand-mean-centered decomposition.
    let mut fitted = vec![0.0; n];
    let mut sse = 0.0;
    for (row, slot) in fitted.iter_mut().enumerate() {
        let mut pred = 0.0;
        for (j, &b) in beta.iter().enumerate() {
            pred += x.read(row, j) * b;
        }
        *slot = pred;
        let e = pred - y[row];
        sse += e * e;
    }
    let y_mean = y.iter().sum::<f64>() / n as f64;
    let sst: f64 = y.iter().map(|v| (v - y_mean).powi(2)).sum();
    let fitted_mean = fitted.iter().sum::<f64>() / n as f64;
    let ssr: f64 = fitted.iter().map(|v| (v - fitted_mean).powi(2)).sum();

    let df_total = n - 1;
    let df_model = k - 1;
    let df_resid = n - k;
    let ms_total = sst / df_total as f64;
    let ms_model = if df_model > 0 {
        ssr / df_model as f64
    } else {
        f64::NAN
    };
    let ms_resid = sse / df_resid as f64;

    let sigma_sq = sse / df_resid as f64;
    let t_dist = StudentsT::new(0.0, 1.0, df_resid as f64).ok();
    let t_crit = t_dist
        .as_ref()
        .map_or(f64::NAN, |d| d.inverse_cdf(0.975));
    let mut std_err = vec![0.0; k];
    let mut t = vec![0.0; k];
    let mut p = vec![0.0; k];
    let mut ci_low = vec![0.0; k];
    let mut ci_high = vec![0.0; k];
    for i in 0..k {
        std_err[i] = (sigma_sq * inv.read(i, i)).sqrt();
        t[i] = beta[i] / std_err[i];
        p[i] = t_dist
            .as_ref()
            .map_or(f64::NAN, |d| 2.0 * (1.0 - d.cdf(t[i].abs())));
        ci_low[i] = beta[i] - t_crit * std_err[i];
        ci_high[i] = beta[i] + t_crit * std_err[i];
    }

    let r_squared = ssr / sst;
    let adj_r_squared =
        1.0 - (df_total as f64 / df_resid as f64) * (1.0 - r_squared);
    let (f, f_prob) = if df_model > 0 {
        let f = (r_squared / df_model as f64)
            / ((1.0 - r_squared) / df_resid as f64);
        let prob = FisherSnedecor::new(df_model as f64, df_resid as f64)
            .ok()
            .map_or(f64::NAN, |d| 1.0 - d.cdf(f));
        (f, prob)
    } else {
        (f64::NAN, f64::NAN)
    };

    Ok(OlsFit {
        n,
        k,
        beta,
        std_err,
        t,
        p,
        ci_low,
        ci_high,
        sst,
        ssr,
        sse,
        df_total,
        df_model,
        df_resid,
        ms_total,
        ms_model,
        ms_resid,
        r_squared,
        adj_r_squared,
        f,
        f_prob,
        root_mse: ms_resid.sqrt(),
    })
}

/// Gauss-Jordan inversion with partial pivoting. A pivot below
/// [`SINGULARITY_EPS`] means the normal equations have no unique solution.
fn invert(a: &Mat<f64>) -> Result<Mat<f64>> {
    let k = a.nrows();
    let mut work = a.clone();
    let mut inv = Mat::from_fn(k, k, |i, j| if i == j { 1.0 } else { 0.0 });

    for col in 0..k {
        let mut pivot = col;
        for row in col + 1..k {
            if work.read(row, col).abs() > work.read(pivot, col).abs() {
                pivot = row;
            }
        }
        if work.read(pivot, col).abs() < SINGULARITY_EPS {
            return Err(RustataError::Computation(
                "collinearity exists, no estimation can be carried out".into(),
            ));
        }
        if pivot != col {
            for j in 0..k {
                let tmp = work.read(col, j);
                work.write(col, j, work.read(pivot, j));
                work.write(pivot, j, tmp);
                let tmp = inv.read(col, j);
                inv.write(col, j, inv.read(pivot, j));
                inv.write(pivot, j, tmp);
            }
        }
        let diag = work.read(col, col);
        for j in 0..k {
            work.write(col, j, work.read(col, j) / diag);
            inv.write(col, j, inv.read(col, j) / diag);
        }
        for row in 0..k {
            if row == col {
                continue;
            }
            let factor = work.read(row, col);
            if factor == 0.0 {
                continue;
            }
            for j in 0..k {
                work.write(row, j, work.read(row, j) - factor * work.read(col, j));
                inv.write(row, j, inv.read(row, j) - factor * inv.read(col, j));
            }
        }
    }
    Ok(inv)
}
