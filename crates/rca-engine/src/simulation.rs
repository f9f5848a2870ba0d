//! Driver that repeatedly applies the engine and records a history.

use crate::history::History;
use crate::lattice::{evolve, resize};
use rca_core::{AutomatonParams, Lattice, Result, RuleSpec, SimulationConfig};
use rca_rules::{build_rule, validate_rule, RuleTable};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Outcome of one call to [`Simulation::run`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Steps evolved during this run
    pub steps_run: usize,
    /// Length of the history after the run
    pub history_len: usize,
    /// Last state in the history
    pub final_state: Lattice,
    /// Number of cells holding each value in the final state
    pub counts: Vec<usize>,
}

/// A validated automaton: geometry, lattice size and a total rule table
#[derive(Debug, Clone)]
pub struct Simulation {
    params: AutomatonParams,
    size: usize,
    rule: RuleTable,
}

impl Simulation {
    pub fn new(params: AutomatonParams, size: usize, rule: RuleTable) -> Result<Self> {
        params.validate_for_size(size)?;
        validate_rule(&rule, params)?;
        Ok(Self { params, size, rule })
    }

    /// Build the rule described by `source` for the configured geometry
    pub fn from_config(config: &SimulationConfig, source: &RuleSpec) -> Result<Self> {
        let params = config.params();
        params.validate_for_size(config.size)?;
        let rule = build_rule(params, source)?;
        Self::new(params, config.size, rule)
    }

    pub fn params(&self) -> AutomatonParams {
        self.params
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn rule(&self) -> &RuleTable {
        &self.rule
    }

    /// One evolution step from `state`
    pub fn step(&self, state: &Lattice) -> Result<Lattice> {
        evolve(state.cells(), &self.rule, self.params.radius, self.size)
    }

    /// Evolve `steps` times, appending every new state to `history`.
    ///
    /// An empty history first receives `initial` (resized to the lattice
    /// size); otherwise evolution continues from the last recorded state and
    /// `initial` is ignored. A failing step stops the run; the states already
    /// appended stay in the history.
    #[instrument(skip(self, history, initial), fields(params = %self.params, size = self.size))]
    pub fn run(
        &self,
        history: &mut History,
        initial: &Lattice,
        steps: usize,
    ) -> Result<RunSummary> {
        let mut state = match history.last() {
            Some(last) => {
                debug!(history_len = history.len(), "continuing from last recorded state");
                last.clone()
            }
            None => {
                initial.check_alphabet(self.params.states)?;
                let start = resize(initial.cells(), self.size);
                history.push(start.clone());
                start
            }
        };

        info!("Running {} steps", steps);

        for step in 0..steps {
            state = match self.step(&state) {
                Ok(next) => next,
                Err(e) => {
                    warn!(step, error = %e, "evolution stopped");
                    return Err(e);
                }
            };
            history.push(state.clone());

            if step % 1000 == 0 {
                debug!(step, steps, "evolution progress");
            }
        }

        let counts = state.counts(self.params.states);
        info!(
            event = "run_summary",
            steps_run = steps,
            history_len = history.len(),
            counts = ?counts,
            "Run complete"
        );

        Ok(RunSummary {
            steps_run: steps,
            history_len: history.len(),
            final_state: state,
            counts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rca_core::Error;
    use rca_rules::{random_lattice, Preset};

    fn rule90_sim(size: usize) -> Simulation {
        let params = AutomatonParams::elementary();
        Simulation::new(params, size, Preset::Elementary(90).build(params).unwrap()).unwrap()
    }

    #[test]
    fn test_fresh_run_records_initial_plus_steps() {
        let sim = rule90_sim(5);
        let mut history = History::new();
        let summary = sim
            .run(&mut history, &Lattice::new(vec![0, 0, 1, 0, 0]), 3)
            .unwrap();

        assert_eq!(summary.steps_run, 3);
        assert_eq!(history.len(), 4);
        assert_eq!(history.get(0).unwrap().cells(), &[0, 0, 1, 0, 0]);
        assert_eq!(history.get(1).unwrap().cells(), &[0, 1, 0, 1, 0]);
        assert_eq!(summary.final_state, *history.last().unwrap());
        assert_eq!(summary.counts.iter().sum::<usize>(), 5);
    }

    #[test]
    fn test_continuation_does_not_duplicate_last_state() {
        let sim = rule90_sim(7);
        let mut history = History::new();
        let seed = Lattice::single_seed(7, 1);
        sim.run(&mut history, &seed, 2).unwrap();
        let last = history.last().unwrap().clone();

        // The initial state is ignored once a history exists.
        sim.run(&mut history, &Lattice::zeros(7), 2).unwrap();
        assert_eq!(history.len(), 5);
        assert_eq!(history.get(3).unwrap(), &sim.step(&last).unwrap());
    }

    #[test]
    fn test_initial_state_is_resized() {
        let sim = rule90_sim(6);
        let mut history = History::new();
        sim.run(&mut history, &Lattice::new(vec![1, 1]), 0).unwrap();
        assert_eq!(history.get(0).unwrap().cells(), &[1, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn test_clear_restarts_from_initial() {
        let sim = rule90_sim(5);
        let mut history = History::new();
        sim.run(&mut history, &Lattice::single_seed(5, 1), 4).unwrap();
        history.clear();
        sim.run(&mut history, &Lattice::zeros(5), 1).unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|s| s.cells().iter().all(|&c| c == 0)));
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        let params = AutomatonParams::elementary();
        let rule = Preset::Elementary(90).build(params).unwrap();
        assert!(matches!(
            Simulation::new(params, 1, rule.clone()),
            Err(Error::InvalidParameter(_))
        ));
        assert!(Simulation::new(AutomatonParams::new(2, 2), 10, rule).is_err());
    }

    #[test]
    fn test_rejects_incomplete_rule_up_front() {
        let params = AutomatonParams::elementary();
        let mut rule = Preset::Identity.build(params).unwrap();
        rule.unset("101").unwrap();
        assert!(matches!(
            Simulation::new(params, 5, rule),
            Err(Error::RuleIncomplete { .. })
        ));
    }

    #[test]
    fn test_initial_outside_alphabet() {
        let sim = rule90_sim(5);
        let mut history = History::new();
        let err = sim
            .run(&mut history, &Lattice::new(vec![0, 3, 0, 0, 0]), 1)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
        assert!(history.is_empty());
    }

    #[test]
    fn test_foreign_history_stops_with_partial_progress() {
        // History produced under a 3-state rule, continued under a binary one.
        let mut history = History::new();
        history.push(Lattice::new(vec![0, 2, 0, 0, 0]));
        let sim = rule90_sim(5);
        let err = sim.run(&mut history, &Lattice::zeros(5), 3).unwrap_err();
        assert!(matches!(err, Error::RuleIncomplete { .. }));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_from_config() {
        let config = SimulationConfig {
            states: 3,
            radius: 2,
            size: 20,
            steps: 5,
        };
        let sim = Simulation::from_config(&config, &RuleSpec::Preset("cyclic".into())).unwrap();
        assert_eq!(sim.params(), AutomatonParams::new(3, 2));
        assert_eq!(sim.rule().len(), 243);

        let err = Simulation::from_config(&config, &RuleSpec::Preset("rule90".into())).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[test]
    fn test_runs_are_deterministic() {
        let config = SimulationConfig {
            states: 4,
            radius: 1,
            size: 32,
            steps: 20,
        };
        let source = RuleSpec::Random { lambda: 0.6, seed: 5 };
        let sim = Simulation::from_config(&config, &source).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let initial = random_lattice(32, 4, 0.5, &mut rng).unwrap();

        let mut a = History::new();
        let mut b = History::new();
        sim.run(&mut a, &initial, config.steps).unwrap();
        sim.run(&mut b, &initial, config.steps).unwrap();
        assert_eq!(a, b);
    }
}
