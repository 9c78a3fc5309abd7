//! Derivative-free minimisation used for model parameter estimation.

use std::cmp::Ordering;

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Configuration for the Nelder-Mead simplex search.
#[derive(Debug, Clone, Copy)]
pub struct SimplexConfig {
    /// Maximum number of iterations.
    pub max_iter: usize,
    /// Stop when the spread of objective values or vertex positions falls below this.
    pub tolerance: f64,
    /// Initial simplex edge, relative to each coordinate (absolute for zero coordinates).
    pub initial_step: f64,
}

impl Default for SimplexConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tolerance: 1e-8,
            initial_step: 0.05,
        }
    }
}

/// Outcome of a simplex search.
#[derive(Debug, Clone)]
pub struct SimplexResult {
    /// Best point found.
    pub point: Vec<f64>,
    /// Objective value at `point`.
    pub value: f64,
    /// Iterations performed.
    pub iterations: usize,
    /// Whether a tolerance criterion was met before `max_iter`.
    pub converged: bool,
}

#[derive(Debug, Clone)]
struct Vertex {
    point: Vec<f64>,
    value: f64,
}

/// Minimise `objective` starting from `initial`, keeping every coordinate
/// inside `bounds` (an empty slice means unbounded; missing entries are
/// unbounded too).
///
/// Non-finite objective values are treated as `+inf`, so an objective can
/// reject a region by returning NaN or infinity.
///
/// # Example
/// ```
/// use follower_forecast::utils::optimization::{nelder_mead, SimplexConfig};
///
/// let result = nelder_mead(
///     |x| (x[0] - 2.0).powi(2) + (x[1] + 1.0).powi(2),
///     &[0.0, 0.0],
///     &[],
///     SimplexConfig::default(),
/// );
/// assert!(result.converged);
/// assert!((result.point[0] - 2.0).abs() < 1e-3);
/// assert!((result.point[1] + 1.0).abs() < 1e-3);
/// ```
pub fn nelder_mead<F>(
    mut objective: F,
    initial: &[f64],
    bounds: &[(f64, f64)],
    config: SimplexConfig,
) -> SimplexResult
where
    F: FnMut(&[f64]) -> f64,
{
    let dim = initial.len();
    if dim == 0 {
        return SimplexResult {
            point: Vec::new(),
            value: f64::NAN,
            iterations: 0,
            converged: false,
        };
    }

    let mut eval = |point: Vec<f64>| -> Vertex {
        let point = clamp(point, bounds);
        let value = objective(&point);
        let value = if value.is_finite() { value } else { f64::INFINITY };
        Vertex { point, value }
    };

    let mut simplex = Vec::with_capacity(dim + 1);
    simplex.push(eval(initial.to_vec()));
    for i in 0..dim {
        let mut point = initial.to_vec();
        let step = if point[i].abs() > 1e-10 {
            config.initial_step * point[i].abs()
        } else {
            config.initial_step
        };
        point[i] += step;
        // A vertex pushed back onto the initial point by a bound would
        // collapse the simplex, so step the other way instead.
        let mut vertex = eval(point);
        if vertex.point == initial {
            let mut point = initial.to_vec();
            point[i] -= step;
            vertex = eval(point);
        }
        simplex.push(vertex);
    }

    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        iterations += 1;
        simplex.sort_by(|a, b| a.value.partial_cmp(&b.value).unwrap_or(Ordering::Equal));

        let best = simplex[0].value;
        let worst = simplex[dim].value;
        let second_worst = simplex[dim - 1].value;

        let centroid = centroid(&simplex[..dim]);
        if (worst - best).abs() < config.tolerance
            || simplex
                .iter()
                .all(|v| distance(&v.point, &centroid) < config.tolerance)
        {
            converged = true;
            break;
        }

        let reflected = eval(towards(&centroid, &simplex[dim].point, -REFLECTION));

        if reflected.value < best {
            let expanded = eval(towards(&centroid, &reflected.point, EXPANSION));
            simplex[dim] = if expanded.value < reflected.value {
                expanded
            } else {
                reflected
            };
            continue;
        }

        if reflected.value < second_worst {
            simplex[dim] = reflected;
            continue;
        }

        if reflected.value < worst {
            let outside = eval(towards(&centroid, &reflected.point, CONTRACTION));
            if outside.value <= reflected.value {
                simplex[dim] = outside;
                continue;
            }
        } else {
            let inside = eval(towards(&centroid, &simplex[dim].point, CONTRACTION));
            if inside.value < worst {
                simplex[dim] = inside;
                continue;
            }
        }

        let anchor = simplex[0].point.clone();
        for vertex in simplex.iter_mut().skip(1) {
            let shrunk = towards(&anchor, &vertex.point, SHRINK);
            *vertex = eval(shrunk);
        }
    }

    let best = simplex
        .into_iter()
        .min_by(|a, b| a.value.partial_cmp(&b.value).unwrap_or(Ordering::Equal))
        .map(|v| (v.point, v.value))
        .unwrap_or_else(|| (initial.to_vec(), f64::INFINITY));

    SimplexResult {
        point: best.0,
        value: best.1,
        iterations,
        converged,
    }
}

/// `origin + factor * (target - origin)`.
fn towards(origin: &[f64], target: &[f64], factor: f64) -> Vec<f64> {
    origin
        .iter()
        .zip(target)
        .map(|(o, t)| o + factor * (t - o))
        .collect()
}

fn centroid(vertices: &[Vertex]) -> Vec<f64> {
    let dim = vertices[0].point.len();
    let mut c = vec![0.0; dim];
    for vertex in vertices {
        for (acc, x) in c.iter_mut().zip(&vertex.point) {
            *acc += x;
        }
    }
    let n = vertices.len() as f64;
    c.iter_mut().for_each(|x| *x /= n);
    c
}

fn clamp(mut point: Vec<f64>, bounds: &[(f64, f64)]) -> Vec<f64> {
    for (x, &(lo, hi)) in point.iter_mut().zip(bounds) {
        *x = x.clamp(lo, hi);
    }
    point
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}
