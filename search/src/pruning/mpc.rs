// Multi-ProbCut
// A shallow search predicts the deep score through deep ~ slope * shallow + bias.
// If the prediction clears the window by threshold * std, the node is cut.
// <https://www.chessprogramming.org/ProbCut>

use std::fmt;
use std::str::FromStr;

use crate::{SearchError, SCORE_MAX};

/// Empty-square buckets of width 8 (0..=60 empties).
pub const EMPTIES_BUCKETS: usize = 8;
/// Deepest target depth the model covers.
pub const MODEL_DEPTHS: usize = 32;

const MIN_STD: f32 = 0.5;
const MIN_SLOPE: f32 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MpcParams {
    pub slope: f32,
    pub bias: f32,
    pub std: f32,
}

impl MpcParams {
    fn prior(empties: u32, depth: usize) -> Self {
        Self {
            slope: 1.0,
            bias: 0.0,
            std: 1.0 + 0.06 * empties as f32 + 0.25 * depth as f32,
        }
    }

    /// Smallest shallow score that predicts `deep >= beta` with the given confidence.
    pub fn high_cut(&self, beta: i32, threshold: f32) -> i32 {
        ((beta as f32 + threshold * self.std - self.bias) / self.slope).ceil() as i32
    }

    /// Largest shallow score that predicts `deep <= alpha` with the given confidence.
    pub fn low_cut(&self, alpha: i32, threshold: f32) -> i32 {
        ((alpha as f32 - threshold * self.std - self.bias) / self.slope).floor() as i32
    }
}

/// One calibration observation: the same node scored at two depths.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MpcSample {
    pub empties: u32,
    pub depth: u8,
    pub shallow: i32,
    pub deep: i32,
}

/// Linear shallow-to-deep model per (empties bucket, target depth).
#[derive(Clone, Debug, PartialEq)]
pub struct MpcModel {
    params: Vec<MpcParams>,
}

impl Default for MpcModel {
    fn default() -> Self {
        let mut params = Vec::with_capacity(EMPTIES_BUCKETS * MODEL_DEPTHS);
        for bucket in 0..EMPTIES_BUCKETS {
            let empties = (bucket * 8 + 4) as u32;
            for depth in 0..MODEL_DEPTHS {
                params.push(MpcParams::prior(empties, depth));
            }
        }
        Self { params }
    }
}

#[inline(always)]
fn slot(empties: u32, depth: u8) -> usize {
    let bucket = (empties as usize / 8).min(EMPTIES_BUCKETS - 1);
    let depth = (depth as usize).min(MODEL_DEPTHS - 1);
    bucket * MODEL_DEPTHS + depth
}

impl MpcModel {
    #[inline(always)]
    pub fn params(&self, empties: u32, depth: u8) -> MpcParams {
        self.params[slot(empties, depth)]
    }

    /// Depth of the verification search for a node searched at `depth`.
    #[inline(always)]
    pub fn shallow_depth(depth: u8) -> u8 {
        (depth / 2).max(1)
    }

    /// Least-squares fit per bucket. Buckets with fewer than two samples keep the prior.
    pub fn fit(samples: &[MpcSample]) -> Self {
        #[derive(Clone, Copy, Default)]
        struct Sums {
            n: f64,
            x: f64,
            y: f64,
            xx: f64,
            xy: f64,
        }

        let mut sums = vec![Sums::default(); EMPTIES_BUCKETS * MODEL_DEPTHS];
        for sample in samples {
            let s = &mut sums[slot(sample.empties, sample.depth)];
            let (x, y) = (sample.shallow as f64, sample.deep as f64);
            s.n += 1.0;
            s.x += x;
            s.y += y;
            s.xx += x * x;
            s.xy += x * y;
        }

        let mut model = Self::default();
        for (index, s) in sums.iter().enumerate() {
            if s.n < 2.0 {
                continue;
            }

            let denominator = s.n * s.xx - s.x * s.x;
            let mut slope = if denominator.abs() > f64::EPSILON {
                (s.n * s.xy - s.x * s.y) / denominator
            } else {
                1.0
            };
            if slope < MIN_SLOPE as f64 {
                slope = 1.0;
            }
            let bias = (s.y - slope * s.x) / s.n;

            model.params[index].slope = slope as f32;
            model.params[index].bias = bias as f32;
        }

        // Residuals need the fitted line, so a second pass
        let mut residuals = vec![(0.0f64, 0.0f64); sums.len()];
        for sample in samples {
            let index = slot(sample.empties, sample.depth);
            let p = model.params[index];
            let predicted = p.slope as f64 * sample.shallow as f64 + p.bias as f64;
            let error = sample.deep as f64 - predicted;
            residuals[index].0 += error * error;
            residuals[index].1 += 1.0;
        }
        for (index, (squared, n)) in residuals.into_iter().enumerate() {
            if n >= 2.0 {
                model.params[index].std = ((squared / n).sqrt() as f32).max(MIN_STD);
            }
        }

        model
    }
}

/// One line per slot: `bucket depth slope bias std`.
impl fmt::Display for MpcModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# bucket depth slope bias std")?;
        for (index, p) in self.params.iter().enumerate() {
            writeln!(
                f,
                "{} {} {} {} {}",
                index / MODEL_DEPTHS,
                index % MODEL_DEPTHS,
                p.slope,
                p.bias,
                p.std
            )?;
        }
        Ok(())
    }
}

/// Slots missing from the text keep the prior.
impl FromStr for MpcModel {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut model = Self::default();

        for (number, line) in s.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let invalid = |reason: &str| SearchError::InvalidModel {
                line: number + 1,
                reason: reason.to_string(),
            };

            let fields: Vec<&str> = line.split_whitespace().collect();
            let &[bucket, depth, slope, bias, std] = fields.as_slice() else {
                return Err(invalid("expected 5 fields"));
            };

            let bucket: usize = bucket.parse().map_err(|_| invalid("bad bucket"))?;
            let depth: usize = depth.parse().map_err(|_| invalid("bad depth"))?;
            if bucket >= EMPTIES_BUCKETS || depth >= MODEL_DEPTHS {
                return Err(invalid("slot out of range"));
            }

            let parse = |field: &str, name: &str| {
                field
                    .parse::<f32>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| invalid(name))
            };
            let params = MpcParams {
                slope: parse(slope, "bad slope")?,
                bias: parse(bias, "bad bias")?,
                std: parse(std, "bad std")?,
            };
            if params.slope <= 0.0 || params.std <= 0.0 {
                return Err(invalid("slope and std must be positive"));
            }

            model.params[bucket * MODEL_DEPTHS + depth] = params;
        }

        Ok(model)
    }
}

/// MPC applies inside the depth band, away from the root, and not inside
/// too many nested verification searches.
#[inline(always)]
pub fn can_probcut(
    depth: u8,
    min_depth: u8,
    max_depth: u8,
    distance_from_root: usize,
    root_distance: u8,
    nesting: u8,
    max_nesting: u8,
) -> bool {
    depth >= min_depth
        && depth <= max_depth
        && distance_from_root >= root_distance as usize
        && nesting < max_nesting
}

/// Whether a cut bound can still be proven by a shallow search.
#[inline(always)]
pub fn provable(bound: i32) -> bool {
    (-SCORE_MAX..=SCORE_MAX).contains(&bound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prior_widens_with_depth_and_empties() {
        let model = MpcModel::default();
        assert!(model.params(40, 10).std > model.params(40, 4).std);
        assert!(model.params(50, 6).std > model.params(20, 6).std);
        assert_eq!(model.params(30, 6).slope, 1.0);
    }

    #[test]
    fn test_fit_recovers_line() {
        let samples: Vec<MpcSample> = (-10..=10)
            .map(|x| MpcSample {
                empties: 30,
                depth: 6,
                shallow: x,
                deep: 2 * x + 3,
            })
            .collect();

        let model = MpcModel::fit(&samples);
        let params = model.params(30, 6);
        assert!((params.slope - 2.0).abs() < 1e-4);
        assert!((params.bias - 3.0).abs() < 1e-4);
        assert_eq!(params.std, MIN_STD);

        // Other buckets untouched
        assert_eq!(model.params(50, 6), MpcModel::default().params(50, 6));
    }

    #[test]
    fn test_single_sample_keeps_prior() {
        let samples = [MpcSample {
            empties: 30,
            depth: 6,
            shallow: 4,
            deep: 40,
        }];
        assert_eq!(MpcModel::fit(&samples), MpcModel::default());
    }

    #[test]
    fn test_fitted_model_survives_text_form() {
        let samples: Vec<MpcSample> = (-10..=10)
            .map(|x| MpcSample {
                empties: 22,
                depth: 5,
                shallow: x,
                deep: x + (x % 3),
            })
            .collect();
        let model = MpcModel::fit(&samples);

        let parsed: MpcModel = model.to_string().parse().unwrap();
        assert_eq!(parsed, model);
    }

    #[test]
    fn test_partial_model_keeps_prior() {
        let model: MpcModel = "# comment\n\n3 6 1.5 -0.5 2.25\n".parse().unwrap();

        let params = model.params(24, 6);
        assert_eq!(params.slope, 1.5);
        assert_eq!(params.bias, -0.5);
        assert_eq!(params.std, 2.25);
        assert_eq!(model.params(40, 6), MpcModel::default().params(40, 6));
    }

    #[test]
    fn test_malformed_model_rejected() {
        let cases = [
            "3 6 1.5 -0.5",
            "8 6 1.0 0.0 1.0",
            "3 32 1.0 0.0 1.0",
            "3 6 x 0.0 1.0",
            "3 6 1.0 0.0 0.0",
            "3 6 1.0 NaN 1.0",
        ];
        for text in cases {
            let result = format!("1 1 1.0 0.0 1.0\n{}", text).parse::<MpcModel>();
            assert!(
                matches!(result, Err(SearchError::InvalidModel { line: 2, .. })),
                "{}",
                text
            );
        }
    }

    #[test]
    fn test_cut_bounds() {
        let params = MpcParams {
            slope: 1.0,
            bias: 0.0,
            std: 2.0,
        };
        assert_eq!(params.high_cut(10, 1.5), 13);
        assert_eq!(params.low_cut(10, 1.5), 7);
    }

    #[test]
    fn test_can_probcut_gates() {
        assert!(can_probcut(6, 3, 20, 4, 2, 0, 2));
        assert!(!can_probcut(2, 3, 20, 4, 2, 0, 2));
        assert!(!can_probcut(21, 3, 20, 4, 2, 0, 2));
        assert!(!can_probcut(6, 3, 20, 1, 2, 0, 2));
        assert!(!can_probcut(6, 3, 20, 4, 2, 2, 2));
    }
}
