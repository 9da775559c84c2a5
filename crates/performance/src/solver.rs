//! One-dimensional root finding shared by the equilibrium and throttle solvers.
//!
//! The secant method converges fast on the smooth residuals of a propulsion unit,
//! but it is run inside a sign bracket: any step that is not finite, leaves the
//! bracket, or comes after [`SECANT_STEPS`] iterations is replaced by bisection.
//! A residual that is not finite stops the solve; the sign test that maintains the
//! bracket means nothing for NaN.

use crate::PerformanceError;

/// Relative change between consecutive iterates that counts as converged.
pub const TOLERANCE: f64 = 1e-6;
/// Iterations after which a solve is reported as non-converged.
pub const MAX_ITERATIONS: usize = 1000;
/// Secant steps allowed before the solver falls back to bisection only.
pub const SECANT_STEPS: usize = 50;

/// End point of a bracket together with its residual.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Bound {
    pub x: f64,
    pub residual: f64,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Root {
    pub x: f64,
    pub iterations: usize,
}

/// Find a root of `f` inside `[lower, upper]`.
///
/// The residuals at the two bounds must not share a strict sign. Seeds are clamped
/// into the bracket before use. Any non-finite residual, at a bound or an iterate,
/// is a [`PerformanceError::NonFiniteResidual`].
pub(crate) fn bracketed_secant<F>(
    solver: &'static str,
    mut f: F,
    lower: Bound,
    upper: Bound,
    seeds: (f64, f64),
) -> Result<Root, PerformanceError>
where
    F: FnMut(f64) -> f64,
{
    for bound in [lower, upper] {
        if !bound.residual.is_finite() {
            return Err(PerformanceError::NonFiniteResidual { solver, x: bound.x });
        }
    }
    if lower.residual == 0.0 {
        return Ok(Root {
            x: lower.x,
            iterations: 0,
        });
    }
    if upper.residual == 0.0 {
        return Ok(Root {
            x: upper.x,
            iterations: 0,
        });
    }
    debug_assert!(lower.residual.signum() != upper.residual.signum());

    let mut bracket = (lower, upper);

    let x0 = seeds.0.clamp(lower.x, upper.x);
    let mut previous = evaluate(solver, &mut f, x0)?;
    if previous.residual == 0.0 {
        return Ok(Root { x: x0, iterations: 0 });
    }
    tighten(&mut bracket, previous);

    let x1 = seeds.1.clamp(lower.x, upper.x);
    let mut current = evaluate(solver, &mut f, x1)?;
    if current.residual == 0.0 {
        return Ok(Root { x: x1, iterations: 0 });
    }
    tighten(&mut bracket, current);

    for iteration in 1..=MAX_ITERATIONS {
        let (lo, hi) = span(&bracket);
        let secant = current.x
            - current.residual * (current.x - previous.x) / (current.residual - previous.residual);
        let x = if iteration <= SECANT_STEPS && secant.is_finite() && secant > lo && secant < hi {
            secant
        } else {
            0.5 * (lo + hi)
        };

        let next = evaluate(solver, &mut f, x)?;
        let scale = x.abs().max(TOLERANCE);
        if next.residual == 0.0
            || (next.x - current.x).abs() < TOLERANCE * scale
            || (hi - lo) < TOLERANCE * scale
        {
            return Ok(Root {
                x,
                iterations: iteration,
            });
        }

        tighten(&mut bracket, next);
        previous = current;
        current = next;
    }

    Err(PerformanceError::NonConvergence {
        solver,
        iterations: MAX_ITERATIONS,
    })
}

fn evaluate<F>(solver: &'static str, f: &mut F, x: f64) -> Result<Bound, PerformanceError>
where
    F: FnMut(f64) -> f64,
{
    let residual = f(x);
    if residual.is_finite() {
        Ok(Bound { x, residual })
    } else {
        Err(PerformanceError::NonFiniteResidual { solver, x })
    }
}

fn span(bracket: &(Bound, Bound)) -> (f64, f64) {
    (
        bracket.0.x.min(bracket.1.x),
        bracket.0.x.max(bracket.1.x),
    )
}

/// Replace the bracket end that shares the sign of `point`. Points outside the
/// current bracket are ignored.
fn tighten(bracket: &mut (Bound, Bound), point: Bound) {
    let (lo, hi) = span(bracket);
    if point.x <= lo || point.x >= hi {
        return;
    }
    if point.residual.signum() == bracket.0.residual.signum() {
        bracket.0 = point;
    } else {
        bracket.1 = point;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bound(f: impl Fn(f64) -> f64, x: f64) -> Bound {
        Bound { x, residual: f(x) }
    }

    #[test]
    fn secant_finds_smooth_root() {
        let f = |x: f64| x * x - 2.0;
        let root = bracketed_secant("test", f, bound(f, 0.0), bound(f, 2.0), (1.0, 1.1))
            .expect("root");
        assert!((root.x - 2f64.sqrt()).abs() < 1e-6);
        assert!(root.iterations < 20);
    }

    #[test]
    fn flat_residuals_fall_back_to_bisection() {
        let f = |x: f64| if x < 0.3 { -1.0 } else { 1.0 };
        let root = bracketed_secant("test", f, bound(f, 0.0), bound(f, 1.0), (0.5, 0.55))
            .expect("root");
        assert!((root.x - 0.3).abs() < 1e-3, "x = {}", root.x);
        assert!(root.iterations < MAX_ITERATIONS);
    }

    #[test]
    fn zero_residual_at_bound_returns_immediately() {
        let f = |x: f64| x - 1.0;
        let root = bracketed_secant("test", f, bound(f, 1.0), bound(f, 3.0), (2.0, 2.5))
            .expect("root");
        assert_eq!(root.x, 1.0);
        assert_eq!(root.iterations, 0);
    }

    #[test]
    fn nan_region_is_reported_instead_of_converging() {
        let f = |x: f64| if x > 0.2 && x < 0.9 { f64::NAN } else { x - 0.5 };
        let err = bracketed_secant("test", f, bound(f, 0.0), bound(f, 1.0), (0.5, 0.55))
            .unwrap_err();
        assert_eq!(
            err,
            PerformanceError::NonFiniteResidual {
                solver: "test",
                x: 0.5
            }
        );
    }

    #[test]
    fn non_finite_bound_residual_is_rejected() {
        let f = |x: f64| x - 0.5;
        let upper = Bound {
            x: 1.0,
            residual: f64::INFINITY,
        };
        assert!(matches!(
            bracketed_secant("test", f, bound(f, 0.0), upper, (0.5, 0.55)),
            Err(PerformanceError::NonFiniteResidual { x, .. }) if x == 1.0
        ));
    }

    #[test]
    fn iteration_cap_reports_non_convergence() {
        // a jump at zero with a bracket too wide to halve down within the cap
        let f = |x: f64| if x < 0.0 { -1.0 } else { 1.0 };
        let err = bracketed_secant(
            "test",
            f,
            bound(f, -1e300),
            bound(f, 1e300),
            (0.5, 0.55),
        )
        .unwrap_err();
        assert_eq!(
            err,
            PerformanceError::NonConvergence {
                solver: "test",
                iterations: MAX_ITERATIONS
            }
        );
    }

    #[test]
    fn seeds_outside_the_bracket_are_clamped() {
        let f = |x: f64| x - 0.25;
        let root = bracketed_secant("test", f, bound(f, 0.0), bound(f, 1.0), (300.0, 330.0))
            .expect("root");
        assert!((root.x - 0.25).abs() < 1e-9);
    }
}
