use crate::{Grid, Result, Rule, State};
use ndarray::Array2;
use std::time::{Duration, Instant};
use tracing::debug;

/// The grid as it was at one generation.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot<V> {
    pub generation: u64,
    pub grid: Grid<V>,
    /// Wall-clock time the step producing this generation took. Zero for
    /// generation 0.
    pub exec_time: Duration,
}

/// Runs a rule over a grid and keeps every generation it has produced.
///
/// `history()[0]` is always the initial grid and there is exactly one
/// snapshot per generation.
#[derive(Clone, Debug)]
pub struct Simulation<V> {
    grid: Grid<V>,
    rule: Rule,
    generation: u64,
    history: Vec<Snapshot<V>>,
}

impl<V: State> Simulation<V> {
    /// Make a new simulation at generation 0. Fails if the rule's window
    /// does not fit the grid.
    pub fn new(grid: Grid<V>, rule: Rule) -> Result<Self> {
        rule.check_grid(&grid)?;
        let initial = Snapshot {
            generation: 0,
            grid: grid.clone(),
            exec_time: Duration::default(),
        };
        Ok(Self {
            grid,
            rule,
            generation: 0,
            history: vec![initial],
        })
    }

    /// Advance one generation.
    ///
    /// If the rule cannot be evaluated nothing changes: the grid, the
    /// generation and the history stay as they were.
    pub fn step(&mut self) -> Result<&Snapshot<V>> {
        let start = Instant::now();
        let updates = self.rule.evaluate(&self.grid)?;
        let changed = updates.len();
        self.grid.update_cells(updates)?;
        let exec_time = start.elapsed();
        self.generation += 1;
        debug!(
            generation = self.generation,
            changed,
            ?exec_time,
            "stepped simulation"
        );
        self.history.push(Snapshot {
            generation: self.generation,
            grid: self.grid.clone(),
            exec_time,
        });
        Ok(self.current())
    }

    /// Step exactly `n` times.
    pub fn run(&mut self, n: usize) -> Result<&Snapshot<V>> {
        self.run_with_progress(n, |_| {})
    }

    /// Step exactly `n` times, calling `progress` after each step.
    pub fn run_with_progress<F>(&mut self, n: usize, mut progress: F) -> Result<&Snapshot<V>>
    where
        F: FnMut(&Snapshot<V>),
    {
        for _ in 0..n {
            progress(self.step()?);
        }
        Ok(self.current())
    }

    /// Go back to generation 0, dropping every later snapshot.
    pub fn reset(&mut self) {
        self.history.truncate(1);
        self.grid = self.history[0].grid.clone();
        self.generation = 0;
        debug!("reset simulation");
    }

    /// Replace the rule. The grid and history are kept.
    pub fn set_rule(&mut self, rule: Rule) -> Result<()> {
        rule.check_grid(&self.grid)?;
        debug!(rule = ?rule.name(), "changed rule");
        self.rule = rule;
        Ok(())
    }

    #[inline]
    pub fn grid(&self) -> &Grid<V> {
        &self.grid
    }

    #[inline]
    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn history(&self) -> &[Snapshot<V>] {
        &self.history
    }

    /// The latest snapshot.
    #[inline]
    pub fn current(&self) -> &Snapshot<V> {
        &self.history[self.history.len() - 1]
    }

    /// One 8-bit frame per generation, oldest first.
    pub fn frames(&self) -> impl Iterator<Item = Array2<u8>> + '_ {
        self.history.iter().map(|snapshot| snapshot.grid.to_image())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, GridParams, Liveness, Window, WindowRule};

    fn glider() -> Simulation<f64> {
        let grid = Grid::with_live_cells(
            &[8, 8],
            GridParams::default(),
            vec![(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)],
        )
        .unwrap();
        Simulation::new(grid, Rule::life(2).unwrap()).unwrap()
    }

    #[test]
    fn history_tracks_generations() {
        let mut sim = glider();
        assert_eq!(sim.history().len(), 1);
        sim.run(5).unwrap();
        assert_eq!(sim.generation(), 5);
        assert_eq!(sim.history().len(), 6);
        for (t, snapshot) in sim.history().iter().enumerate() {
            assert_eq!(snapshot.generation, t as u64);
        }
        assert_eq!(&sim.current().grid, sim.grid());
    }

    #[test]
    fn glider_moves_diagonally() {
        let mut sim = glider();
        sim.run(4).unwrap();
        let expected = Grid::with_live_cells(
            &[8, 8],
            GridParams::<f64>::default(),
            vec![(1, 2), (2, 3), (3, 1), (3, 2), (3, 3)],
        )
        .unwrap();
        assert_eq!(sim.grid().values(), expected.values());
    }

    #[test]
    fn progress_is_reported_per_step() {
        let mut sim = glider();
        let mut seen = Vec::new();
        sim.run_with_progress(3, |snapshot| seen.push(snapshot.generation))
            .unwrap();
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[test]
    fn reset_restores_initial_grid() {
        let mut sim = glider();
        let initial = sim.grid().values();
        sim.run(7).unwrap();
        assert_ne!(sim.grid().values(), initial);
        sim.reset();
        assert_eq!(sim.generation(), 0);
        assert_eq!(sim.history().len(), 1);
        assert_eq!(sim.grid().values(), initial);
        sim.step().unwrap();
        assert_eq!(sim.history().len(), 2);
    }

    #[test]
    fn snapshots_are_not_aliased() {
        let mut sim = glider();
        let initial = sim.history()[0].grid.values();
        sim.run(2).unwrap();
        assert_eq!(sim.history()[0].grid.values(), initial);
    }

    #[test]
    fn mismatched_rule_is_rejected() {
        let grid = Grid::new(&[4, 4], GridParams::<f64>::default()).unwrap();
        let rule = Rule::Ratio(
            WindowRule::new(Window::unit(3).unwrap(), Liveness::Threshold(0.5)).unwrap(),
        );
        assert!(matches!(
            Simulation::new(grid.clone(), rule.clone()),
            Err(Error::DimensionMismatch { .. })
        ));

        let mut sim = Simulation::new(grid, Rule::life(2).unwrap()).unwrap();
        assert!(sim.set_rule(rule).is_err());
        assert_eq!(sim.rule(), &Rule::life(2).unwrap());
    }

    #[test]
    fn frames_follow_history() {
        let mut sim = glider();
        sim.run(2).unwrap();
        let frames: Vec<Array2<u8>> = sim.frames().collect();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0][(0, 1)], 255);
        assert_eq!(frames[0][(0, 0)], 0);
        assert_eq!(frames[0].dim(), (8, 8));
    }
}
