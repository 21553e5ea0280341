/// Counters collected over a single simulator run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunMetrics {
    pub rounds_executed: u32,
    pub initial_infected: u32,
    pub activations: u64,
    pub recoveries: u64,
    pub peak_infected: u32,
    pub final_infected: u32,
}

impl RunMetrics {
    pub fn seeded(initial_infected: usize) -> Self {
        Self {
            initial_infected: initial_infected as u32,
            peak_infected: initial_infected as u32,
            final_infected: initial_infected as u32,
            ..Default::default()
        }
    }

    /// `infected_after_activation` is sampled between the two passes, which
    /// is where a round's infected count peaks.
    pub fn record_round(
        &mut self,
        activations: usize,
        infected_after_activation: usize,
        recoveries: usize,
        infected_at_end: usize,
    ) {
        self.rounds_executed += 1;
        self.activations += activations as u64;
        self.recoveries += recoveries as u64;
        self.peak_infected = self.peak_infected.max(infected_after_activation as u32);
        self.final_infected = infected_at_end as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_round_accumulates_and_tracks_peak() {
        let mut metrics = RunMetrics::seeded(2);
        metrics.record_round(3, 5, 1, 4);
        metrics.record_round(0, 4, 4, 0);
        assert_eq!(metrics.rounds_executed, 2);
        assert_eq!(metrics.activations, 3);
        assert_eq!(metrics.recoveries, 5);
        assert_eq!(metrics.peak_infected, 5);
        assert_eq!(metrics.final_infected, 0);
        assert_eq!(metrics.initial_infected, 2);
    }
}
