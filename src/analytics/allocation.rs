//! Break-even capital injection per category
//!
//! Finds the smallest non-negative amount to add to each category so that
//! every category with an allocation target reaches at least its target share
//! of the portfolio after the injection:
//!
//! ```text
//! minimize   Σ x_j
//! subject to d_i · (A + Σ x_j) − (a_i + x_i) ≤ 0   for every category with d_i > 0
//!            0 ≤ x_j ≤ A
//! ```
//!
//! where `a_i` is the category's invested amount, `A = Σ a_i` and `d_i` its
//! target fraction. The linear program is handed to clarabel; amounts cross
//! into `f64` only for the solve.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::composition::CategoryCompositionRow;
use crate::utils::round_display;

const MAX_ITERATIONS: u32 = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakEvenRow {
    pub category: String,
    pub allocation_break_even: Decimal,
}

/// Solver outcome. When `converged` is false every injection is 0 and
/// `status` holds the solver's report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllocationPlan {
    pub converged: bool,
    pub status: String,
    pub rows: Vec<BreakEvenRow>,
}

impl AllocationPlan {
    fn zeroed(categories: &[CategoryCompositionRow], converged: bool, status: String) -> Self {
        Self {
            converged,
            status,
            rows: categories
                .iter()
                .map(|c| BreakEvenRow {
                    category: c.category.clone(),
                    allocation_break_even: Decimal::ZERO,
                })
                .collect(),
        }
    }

    /// Sum of all injections
    pub fn total_injection(&self) -> Decimal {
        self.rows.iter().map(|r| r.allocation_break_even).sum()
    }

    pub fn injection_for(&self, category: &str) -> Option<Decimal> {
        self.rows
            .iter()
            .find(|r| r.category == category)
            .map(|r| r.allocation_break_even)
    }
}

/// Break-even injection for each category row.
///
/// Categories without a target receive no constraint but still appear in the
/// plan. Solver failures are reported through [`AllocationPlan::converged`].
///
/// When the targets sum to 100 and an untargeted category (such as
/// `Unknown`) holds capital, no injection can satisfy every target: the
/// program is infeasible and the plan comes back unconverged with all zeros.
pub fn solve_break_even(categories: &[CategoryCompositionRow]) -> AllocationPlan {
    let invested: Vec<f64> = categories
        .iter()
        .map(|c| c.invested_amount.to_f64().unwrap_or(0.0))
        .collect();
    let targets: Vec<f64> = categories
        .iter()
        .map(|c| c.desired_allocation.to_f64().unwrap_or(0.0) / 100.0)
        .collect();

    let targeted: Vec<usize> = (0..categories.len()).filter(|&i| targets[i] > 0.0).collect();
    if targeted.is_empty() {
        debug!("No category targets set; nothing to solve");
        return AllocationPlan::zeroed(categories, true, "NoTargets".to_string());
    }

    match solve_program(&invested, &targets, &targeted) {
        Ok(x) => {
            info!("Allocation break-even solved for {} categories", categories.len());
            AllocationPlan {
                converged: true,
                status: "Solved".to_string(),
                rows: categories
                    .iter()
                    .zip(x)
                    .map(|(c, amount)| BreakEvenRow {
                        category: c.category.clone(),
                        allocation_break_even: Decimal::from_f64(amount.max(0.0))
                            .map(round_display)
                            .unwrap_or(Decimal::ZERO)
                            .max(Decimal::ZERO),
                    })
                    .collect(),
            }
        }
        Err(status) => {
            warn!("Allocation break-even did not converge: {}", status);
            AllocationPlan::zeroed(categories, false, status)
        }
    }
}

/// Solve the program; `Err` carries the solver status on failure
fn solve_program(invested: &[f64], targets: &[f64], targeted: &[usize]) -> Result<Vec<f64>, String> {
    use clarabel::algebra::*;
    use clarabel::solver::*;

    let n = invested.len();
    let total: f64 = invested.iter().sum();

    // d_i·(A + Σx) − (a_i + x_i) ≤ 0  ⇔  Σ_j (d_i − δ_ij)·x_j ≤ a_i − d_i·A
    let target_constraint = |i: usize| -> (Vec<f64>, f64) {
        let coefficients = (0..n)
            .map(|j| if i == j { targets[i] - 1.0 } else { targets[i] })
            .collect();
        (coefficients, invested[i] - targets[i] * total)
    };

    let mut rows: Vec<Vec<f64>> = Vec::with_capacity(targeted.len() + 2 * n);
    let mut b: Vec<f64> = Vec::with_capacity(targeted.len() + 2 * n);

    for &i in targeted {
        let (coefficients, bound) = target_constraint(i);
        rows.push(coefficients);
        b.push(bound);
    }
    // -x_j ≤ 0
    for j in 0..n {
        rows.push((0..n).map(|k| if k == j { -1.0 } else { 0.0 }).collect());
        b.push(0.0);
    }
    // x_j ≤ A
    for j in 0..n {
        rows.push((0..n).map(|k| if k == j { 1.0 } else { 0.0 }).collect());
        b.push(total);
    }

    let m = rows.len();

    // Column by column (CSC format)
    let mut a_data = Vec::new();
    let mut a_indices = Vec::new();
    let mut a_indptr = vec![0];
    for j in 0..n {
        for (i, row) in rows.iter().enumerate() {
            if row[j] != 0.0 {
                a_data.push(row[j]);
                a_indices.push(i);
            }
        }
        a_indptr.push(a_data.len());
    }
    let a = CscMatrix::new(m, n, a_indptr, a_indices, a_data);

    let p = CscMatrix::<f64>::zeros((n, n));
    let q = vec![1.0; n];
    let cones = [NonnegativeConeT(m)];

    let settings = DefaultSettingsBuilder::default()
        .max_iter(MAX_ITERATIONS)
        .verbose(false)
        .build()
        .map_err(|e| format!("invalid solver settings: {}", e))?;

    let mut solver = DefaultSolver::new(&p, &q, &a, &b, &cones, settings)
        .map_err(|e| format!("solver setup failed: {:?}", e))?;

    solver.solve();

    match &solver.solution.status {
        SolverStatus::Solved | SolverStatus::AlmostSolved => Ok(solver.solution.x.clone()),
        status => Err(format!("{:?}", status)),
    }
}
