//! Pseudo-Boolean constraint encoding
//!
//! Turns weighted sums over literals into CNF. The workhorse is a sequential
//! weighted counter: auxiliary registers track reachable prefix sums, and an
//! overflow clause per item rules out sums past the bound. Small cardinality
//! shapes (at-least-one, at-most-one) short-circuit to their classic
//! clause-only encodings.

use super::constraints::Clause;

/// Append clauses enforcing `lo <= sum(weights[i] * lits[i]) <= hi`, where a
/// literal counts its weight when assigned true.
///
/// All weights must be positive. Auxiliary variables are allocated from
/// `next_var` upward; the new high-water mark is returned and must be carried
/// forward by the caller so later allocations stay fresh.
pub fn encode_both(
    weights: &[i64],
    lits: &[i32],
    lo: i64,
    hi: i64,
    clauses: &mut Vec<Clause>,
    mut next_var: i32,
) -> i32 {
    assert_eq!(weights.len(), lits.len());
    debug_assert!(weights.iter().all(|&w| w > 0));
    debug_assert!(lo <= hi);

    let total: i64 = weights.iter().sum();

    next_var = encode_at_most(weights, lits, hi, clauses, next_var);

    if lo == 1 {
        // At least one weighted literal must hold
        clauses.push(Clause::new(lits.to_vec()));
    } else if lo > 0 {
        // sum >= lo  <=>  complemented sum <= total - lo
        let negated: Vec<i32> = lits.iter().map(|&lit| -lit).collect();
        next_var = encode_at_most(weights, &negated, total - lo, clauses, next_var);
    }

    next_var
}

/// Append clauses enforcing `sum(weights[i] * lits[i]) <= bound`
pub fn encode_at_most(
    weights: &[i64],
    lits: &[i32],
    bound: i64,
    clauses: &mut Vec<Clause>,
    next_var: i32,
) -> i32 {
    assert_eq!(weights.len(), lits.len());

    let total: i64 = weights.iter().sum();
    if bound >= total {
        return next_var;
    }

    if bound < 0 {
        // No assignment can satisfy the constraint
        if let Some(&lit) = lits.first() {
            clauses.push(Clause::unit(lit));
            clauses.push(Clause::unit(-lit));
        } else {
            clauses.push(Clause::new(Vec::new()));
        }
        return next_var;
    }

    if bound == 0 {
        for &lit in lits {
            clauses.push(Clause::unit(-lit));
        }
        return next_var;
    }

    if bound == 1 && weights.iter().all(|&w| w == 1) {
        // Pairwise at-most-one needs no auxiliary variables
        for (i, &a) in lits.iter().enumerate() {
            for &b in &lits[i + 1..] {
                clauses.push(Clause::binary(-a, -b));
            }
        }
        return next_var;
    }

    sequential_counter(weights, lits, bound, clauses, next_var)
}

/// Sequential weighted counter for `sum <= bound` with `bound >= 1`.
///
/// `reg(i, j)` reads "the sum of items `0..=i` reaches at least `j + 1`".
/// Register rows exist for every item but the last; the overflow clause for
/// item `i` consults row `i - 1`.
fn sequential_counter(
    weights: &[i64],
    lits: &[i32],
    bound: i64,
    clauses: &mut Vec<Clause>,
    next_var: i32,
) -> i32 {
    let n = lits.len();
    let k = bound as usize;

    // Items too heavy for the bound can never be true
    for (&w, &lit) in weights.iter().zip(lits) {
        if w > bound {
            clauses.push(Clause::unit(-lit));
        }
    }

    if n <= 1 {
        return next_var;
    }

    let reg = |item: usize, j: usize| next_var + (item * k + j) as i32;
    let high_water = next_var + ((n - 1) * k) as i32;

    // Item 0 seeds its register row
    if weights[0] <= bound {
        for j in 0..weights[0] as usize {
            clauses.push(Clause::binary(-lits[0], reg(0, j)));
        }
    }

    for i in 1..n {
        let w = weights[i];

        if i < n - 1 {
            // Carry the previous row forward
            for j in 0..k {
                clauses.push(Clause::binary(-reg(i - 1, j), reg(i, j)));
            }

            if w <= bound {
                let w = w as usize;
                // The item on its own
                for j in 0..w.min(k) {
                    clauses.push(Clause::binary(-lits[i], reg(i, j)));
                }
                // The item added onto a reached prefix sum
                for j in 0..k.saturating_sub(w) {
                    clauses.push(Clause::new(vec![-lits[i], -reg(i - 1, j), reg(i, j + w)]));
                }
            }
        }

        // Overflow: the item would push the prefix sum past the bound
        if w <= bound {
            clauses.push(Clause::binary(-lits[i], -reg(i - 1, k - w as usize)));
        }
    }

    high_water
}

/// Exactly one of the literals is true: the `lo == hi == 1` cardinality case
pub fn encode_exactly_one(lits: &[i32], clauses: &mut Vec<Clause>, next_var: i32) -> i32 {
    let weights = vec![1; lits.len()];
    encode_both(&weights, lits, 1, 1, clauses, next_var)
}
