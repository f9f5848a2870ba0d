//! Seeded random rule tables and lattices.

use crate::table::RuleTable;
use rca_core::{AutomatonParams, Cell, Error, Lattice, Result};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

fn check_probability(name: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(Error::InvalidParameter(format!(
            "{} must lie in [0, 1], got {}",
            name, value
        )));
    }
    Ok(())
}

/// Uniform non-zero value of a `states`-symbol alphabet
fn non_quiescent(states: u32, rng: &mut ChaCha8Rng) -> Cell {
    rng.gen_range(1..states) as Cell
}

/// Total table where each neighborhood maps to a non-zero value with probability `lambda`.
pub fn random_table(
    params: AutomatonParams,
    lambda: f64,
    rng: &mut ChaCha8Rng,
) -> Result<RuleTable> {
    check_probability("lambda", lambda)?;
    let table = RuleTable::from_fn(params, |_| {
        if rng.gen::<f64>() < lambda {
            non_quiescent(params.states, rng)
        } else {
            0
        }
    })?;
    debug!(%params, lambda, actual_lambda = table.lambda(), "generated random rule table");
    Ok(table)
}

/// Lattice where each cell is non-zero with probability `density`.
pub fn random_lattice(
    size: usize,
    states: u32,
    density: f64,
    rng: &mut ChaCha8Rng,
) -> Result<Lattice> {
    check_probability("density", density)?;
    if states < 2 {
        return Err(Error::InvalidParameter(format!(
            "alphabet size must be at least 2, got {}",
            states
        )));
    }
    Ok((0..size)
        .map(|_| {
            if rng.gen::<f64>() < density {
                non_quiescent(states, rng)
            } else {
                0
            }
        })
        .collect())
}

/// Replace each set entry with a different value with probability `rate`.
///
/// Returns the number of entries changed. Empty entries stay empty.
pub fn mutate_table(table: &mut RuleTable, rate: f64, rng: &mut ChaCha8Rng) -> Result<usize> {
    check_probability("rate", rate)?;
    let states = table.states();
    let mut changed = 0;
    for slot in table.outputs_mut().iter_mut() {
        let Some(current) = *slot else { continue };
        if rng.gen::<f64>() < rate {
            // Draw from the k - 1 other values.
            let offset = rng.gen_range(1..states) as Cell;
            *slot = Some(((current as u32 + offset as u32) % states) as Cell);
            changed += 1;
        }
    }
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate_rule;
    use rand::SeedableRng;

    #[test]
    fn test_random_table_is_total_and_seeded() {
        let params = AutomatonParams::new(3, 1);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let a = random_table(params, 0.5, &mut rng).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let b = random_table(params, 0.5, &mut rng).unwrap();

        assert_eq!(a, b);
        assert!(validate_rule(&a, params).is_ok());
    }

    #[test]
    fn test_random_table_lambda_extremes() {
        let params = AutomatonParams::new(4, 1);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(random_table(params, 0.0, &mut rng).unwrap().lambda(), 0.0);
        assert_eq!(random_table(params, 1.0, &mut rng).unwrap().lambda(), 1.0);
        assert!(random_table(params, 1.5, &mut rng).is_err());
    }

    #[test]
    fn test_random_lattice() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let lattice = random_lattice(100, 3, 0.3, &mut rng).unwrap();
        assert_eq!(lattice.len(), 100);
        assert!(lattice.check_alphabet(3).is_ok());

        let empty = random_lattice(50, 2, 0.0, &mut rng).unwrap();
        assert!(empty.cells().iter().all(|&c| c == 0));
        assert!(random_lattice(10, 1, 0.5, &mut rng).is_err());
    }

    #[test]
    fn test_mutate_table() {
        let params = AutomatonParams::new(2, 2);
        let original = RuleTable::new(params).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let mut unchanged = original.clone();
        assert_eq!(mutate_table(&mut unchanged, 0.0, &mut rng).unwrap(), 0);
        assert_eq!(unchanged, original);

        let mut flipped = original.clone();
        assert_eq!(mutate_table(&mut flipped, 1.0, &mut rng).unwrap(), 32);
        assert!(flipped.entries().all(|(_, v)| v == Some(1)));
    }

    #[test]
    fn test_mutate_keeps_missing_entries_missing() {
        let params = AutomatonParams::elementary();
        let mut table = RuleTable::from_entries(params, [("000", 0), ("111", 1)]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        assert_eq!(mutate_table(&mut table, 1.0, &mut rng).unwrap(), 2);
        assert_eq!(table.missing_keys().len(), 6);
        assert_eq!(table.output_for("000").unwrap(), Some(1));
        assert_eq!(table.output_for("111").unwrap(), Some(0));
    }
}
