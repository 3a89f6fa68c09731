use std::collections::HashMap;
use std::io::BufRead;
use std::sync::Arc;

use log::{debug, info};

use surpass_io::open_file;

use crate::errors::DataError;

/// A 1-D function interpolated with the Catmull-Rom cubic scheme.
///
/// Samples must lie on a uniform grid; outside the grid the boundary values
/// are returned, so a potential stays flat beyond its tabulated range.
#[derive(Clone, Debug)]
pub struct Interpolate1D {
    x_min: f64,
    dx: f64,
    y: Vec<f64>,
}

impl Interpolate1D {
    /// Creates an interpolator from uniformly spaced samples.
    pub fn new(x_min: f64, dx: f64, y: Vec<f64>) -> Interpolate1D {
        assert!(y.len() >= 2, "interpolation requires at least two samples");
        assert!(dx > 0.0, "grid spacing must be positive");
        Interpolate1D { x_min, dx, y }
    }

    /// Evaluates the interpolated function at a given point.
    pub fn value(&self, x: f64) -> f64 {
        let n = self.y.len();
        if x <= self.x_min { return self.y[0]; }
        let x_max = self.x_min + self.dx * (n - 1) as f64;
        if x >= x_max { return self.y[n - 1]; }

        let t = (x - self.x_min) / self.dx;
        let k = t.floor() as usize;
        let mu = t - k as f64;
        let y0 = self.y[k.saturating_sub(1)];
        let y1 = self.y[k];
        let y2 = self.y[(k + 1).min(n - 1)];
        let y3 = self.y[(k + 2).min(n - 1)];

        let mu2 = mu * mu;
        let a0 = -0.5 * y0 + 1.5 * y1 - 1.5 * y2 + 0.5 * y3;
        let a1 = y0 - 2.5 * y1 + 2.0 * y2 - 0.5 * y3;
        let a2 = -0.5 * y0 + 0.5 * y2;
        let a3 = y1;

        a0 * mu * mu2 + a1 * mu2 + a2 * mu + a3
    }
}

/// Knowledge-based energy functions held in a dictionary under string keys.
///
/// Loaded from a parameter file that provides a `POTENTIAL <name>` header and
/// then, for every key, a `KEY <tag>` line followed by `x y` sample pairs.
/// When a non-negative pseudocount fraction is given the samples are treated
/// as a probability distribution and converted to energies on load:
/// `E = -ln((p + a*p̄) / ((1 + a)*p̄))` where `p̄` is the mean probability of
/// the distribution and `a` the pseudocount fraction. A negative fraction
/// loads the values as energies, verbatim.
#[derive(Clone, Debug, Default)]
pub struct MeanFieldDistributions {
    name: String,
    ff: HashMap<String, Arc<Interpolate1D>>,
}

impl MeanFieldDistributions {
    /// Name of this potential, as recorded in the header of its input file
    pub fn name(&self) -> &str { &self.name }

    /// Registers a new energy component under a given key
    pub fn add_component(&mut self, key: &str, distribution: Arc<Interpolate1D>) {
        self.ff.insert(key.to_string(), distribution);
    }

    /// True when a distribution has been registered under the given key
    pub fn contains_distribution(&self, key: &str) -> bool { self.ff.contains_key(key) }

    /// Returns the component registered under a key, or a [`DataError`](DataError)
    /// listing the known keys.
    pub fn at(&self, key: &str) -> Result<Arc<Interpolate1D>, DataError> {
        match self.ff.get(key) {
            Some(d) => Ok(d.clone()),
            None => Err(DataError::MissingDistribution {
                key: key.to_string(),
                known: self.known_distributions().join(" "),
            }),
        }
    }

    /// All keys known to this container, sorted
    pub fn known_distributions(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.ff.keys().cloned().collect();
        keys.sort();
        keys
    }
}

/// Loads a set of 1-D distributions from a parameter file.
///
/// See [`MeanFieldDistributions`](MeanFieldDistributions) for the file format
/// and the probability-to-energy conversion rule.
pub fn load_1d_distributions(fname: &str, pseudocount_fraction: f64) -> Result<MeanFieldDistributions, DataError> {
    let reader = open_file(fname)
        .map_err(|_| DataError::ParameterFileMissing { path: fname.to_string() })?;

    let mut out = MeanFieldDistributions::default();
    let mut current_key: Option<String> = None;
    let mut xs: Vec<f64> = Vec::new();
    let mut ys: Vec<f64> = Vec::new();

    let commit = |key: &Option<String>, xs: &mut Vec<f64>, ys: &mut Vec<f64>,
                      out: &mut MeanFieldDistributions| -> Result<(), DataError> {
        if let Some(key) = key {
            let spline = build_spline(fname, key, xs, ys, pseudocount_fraction)?;
            out.add_component(key, Arc::new(spline));
        }
        xs.clear();
        ys.clear();
        Ok(())
    };

    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') { continue; }
        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        match tokens[0] {
            "POTENTIAL" => {
                out.name = tokens.get(1).unwrap_or(&"").to_string();
            }
            "KEY" => {
                commit(&current_key, &mut xs, &mut ys, &mut out)?;
                match tokens.get(1) {
                    Some(k) => current_key = Some(k.to_string()),
                    None => return Err(DataError::MalformedTable {
                        path: fname.to_string(),
                        detail: String::from("KEY line without a tag"),
                    }),
                }
            }
            _ => {
                if tokens.len() != 2 {
                    return Err(DataError::MalformedTable {
                        path: fname.to_string(),
                        detail: format!("expected an 'x y' pair, got: {}", trimmed),
                    });
                }
                let x = tokens[0].parse::<f64>();
                let y = tokens[1].parse::<f64>();
                match (x, y) {
                    (Ok(x), Ok(y)) => { xs.push(x); ys.push(y); }
                    _ => return Err(DataError::MalformedTable {
                        path: fname.to_string(),
                        detail: format!("can't parse an 'x y' pair: {}", trimmed),
                    }),
                }
            }
        }
    }
    commit(&current_key, &mut xs, &mut ys, &mut out)?;

    info!("{} distributions of the {} potential loaded from {}",
        out.ff.len(), out.name(), fname);

    Ok(out)
}

fn build_spline(fname: &str, key: &str, xs: &[f64], ys: &[f64],
                pseudocount_fraction: f64) -> Result<Interpolate1D, DataError> {
    if xs.len() < 2 {
        return Err(DataError::MalformedTable {
            path: fname.to_string(),
            detail: format!("distribution {} has fewer than two samples", key),
        });
    }
    let dx = xs[1] - xs[0];
    for w in xs.windows(2) {
        if ((w[1] - w[0]) - dx).abs() > 1e-6 * dx.abs() {
            return Err(DataError::MalformedTable {
                path: fname.to_string(),
                detail: format!("distribution {} is not on a uniform grid", key),
            });
        }
    }

    let values: Vec<f64> = if pseudocount_fraction >= 0.0 {
        let p_mean = ys.iter().sum::<f64>() / ys.len() as f64;
        debug!("converting {} to energies with pseudocount fraction {}", key, pseudocount_fraction);
        ys.iter()
            .map(|p| -((p + pseudocount_fraction * p_mean) / ((1.0 + pseudocount_fraction) * p_mean)).ln())
            .collect()
    } else {
        ys.to_vec()
    };

    Ok(Interpolate1D::new(xs[0], dx, values))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolation_passes_through_the_samples() {
        let f = Interpolate1D::new(0.0, 1.0, vec![0.0, 1.0, 4.0, 9.0, 16.0]);
        assert!((f.value(2.0) - 4.0).abs() < 1e-12);
        assert!((f.value(3.0) - 9.0).abs() < 1e-12);
        // clamped beyond the grid
        assert!((f.value(-5.0) - 0.0).abs() < 1e-12);
        assert!((f.value(50.0) - 16.0).abs() < 1e-12);
    }

    #[test]
    fn interpolation_is_smooth_between_samples() {
        let f = Interpolate1D::new(0.0, 1.0, vec![0.0, 1.0, 4.0, 9.0, 16.0]);
        let mid = f.value(2.5);
        assert!(mid > 4.0 && mid < 9.0);
    }

    #[test]
    fn flat_probability_converts_to_zero_energy() {
        // p == p_mean everywhere gives E = -ln((1+a)/(1+a)) = 0
        let fname = "flat-test";
        let xs = [0.0, 1.0, 2.0];
        let ys = [0.25, 0.25, 0.25];
        let spline = build_spline(fname, "XX.YY", &xs, &ys, 0.01).unwrap();
        assert!(spline.value(1.0).abs() < 1e-12);
    }
}
