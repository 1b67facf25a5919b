//! Play Simulator
//!
//! Samples the outcome of one offensive play from the two team profiles and
//! the current situation. Pass plays draw a pocket state from the pressure
//! baselines, then resolve through the matching shrunk quarterback split;
//! yardage comes from a normal draw whose location is adjusted by line grade
//! *deltas* (raw grades would double-count strength already in EPA).

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::pressure::{InjuryReport, LineRanks, PressureBaselines};
use crate::profile::record::TeamWeekRecord;
use crate::sim::adjust::MatchupAdjustment;
use crate::sim::situation::Situation;

/// Yards of pass location shift per full grade-point of line delta.
const PASS_BLOCK_DELTA_YARDS: f64 = 2.0;
const RUN_BLOCK_DELTA_YARDS: f64 = 1.5;

/// Base fumble rate per offensive play.
const FUMBLE_BASE: f64 = 0.010;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayCall {
    Pass,
    Run,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnoverKind {
    Interception,
    Fumble,
}

/// One sampled play.
#[derive(Debug, Clone, Copy)]
pub struct PlayOutcome {
    pub call: PlayCall,
    pub yards: i16,
    pub turnover: Option<TurnoverKind>,
    /// Gain reached the opposing end zone.
    pub touchdown: bool,
    /// Gain covered the line to gain.
    pub first_down: bool,
    pub pressured: bool,
    /// Game seconds consumed, including between-play runoff.
    pub elapsed: u16,
    /// Incompletions stop the clock.
    pub clock_stopped: bool,
}

/// Samples plays for one offense against one defense.
///
/// Matchup-adjusted locations are precomputed once; `simulate` is then a pure
/// function of (situation, rng) and is called thousands of times per trial
/// batch.
pub struct PlaySimulator<'a> {
    offense: &'a TeamWeekRecord,
    defense: &'a TeamWeekRecord,
    baselines: &'a PressureBaselines,
    injuries: Option<InjuryReport>,
    line_ranks: Option<LineRanks>,

    pass_block_delta: f64,
    run_yards_mu: f64,
    explosive_pass: f64,
    explosive_rush: f64,
    interception_adj: f64,
    fumble_rate: f64,
    /// Backup-quarterback discount on passing location, 1.0 = starter.
    qb_downgrade: f64,
}

impl<'a> PlaySimulator<'a> {
    pub fn new(
        offense: &'a TeamWeekRecord,
        defense: &'a TeamWeekRecord,
        baselines: &'a PressureBaselines,
        adjustment: MatchupAdjustment,
        injuries: Option<InjuryReport>,
        line_ranks: Option<LineRanks>,
    ) -> Self {
        let pass_block_delta = (offense.grades.pass_block - defense.grades.pass_rush) / 100.0;
        let run_block_delta = (offense.grades.run_block - defense.grades.run_defense) / 100.0;

        let run_yards_mu = offense.yards_per_rush + RUN_BLOCK_DELTA_YARDS * run_block_delta;
        let explosive_pass =
            (offense.explosive_pass_rate + adjustment.explosive).clamp(0.01, 0.30);
        let explosive_rush =
            (offense.explosive_rush_rate + adjustment.explosive / 2.0).clamp(0.005, 0.25);

        // Turnover regression pulls an outlier rate back toward the league
        // before the matchup adjustment is applied.
        let fumble_rate = (FUMBLE_BASE * offense.turnover_regression + adjustment.turnover)
            .clamp(0.002, 0.06);

        let qb_downgrade = injuries
            .map_or(1.0, |report| report.qb_downgrade)
            .clamp(0.5, 1.1);

        Self {
            offense,
            defense,
            baselines,
            injuries,
            line_ranks,
            pass_block_delta,
            run_yards_mu,
            explosive_pass,
            explosive_rush,
            interception_adj: adjustment.turnover,
            fumble_rate,
            qb_downgrade,
        }
    }

    pub fn offense(&self) -> &TeamWeekRecord {
        self.offense
    }

    /// Sample one play.
    pub fn simulate(&self, situation: &Situation, rng: &mut ChaCha8Rng) -> PlayOutcome {
        let pass_rate = self.offense.tendencies.pass_rate(&situation.key()).pass_rate;
        if rng.gen::<f64>() < pass_rate {
            self.pass_play(situation, rng)
        } else {
            self.run_play(situation, rng)
        }
    }

    fn pass_play(&self, situation: &Situation, rng: &mut ChaCha8Rng) -> PlayOutcome {
        let p_pressure = self.baselines.pressure_probability(
            &self.offense.team,
            &self.defense.team,
            situation,
            self.injuries.as_ref(),
            self.line_ranks.as_ref(),
        );
        let pressured = rng.gen::<f64>() < p_pressure;
        let rates = if pressured {
            &self.offense.qb.pressured
        } else {
            &self.offense.qb.clean
        };

        let roll: f64 = rng.gen();
        if roll < rates.sack {
            let yards = self.clamp_yards(normal(rng, -6.5, 2.0).min(-1.0), situation);
            return self.outcome(PlayCall::Pass, yards, None, pressured, situation, rng, false);
        }
        if roll < rates.sack + rates.scramble {
            let yards = self.clamp_yards(normal(rng, 5.5, 3.0), situation);
            return self.outcome(PlayCall::Pass, yards, None, pressured, situation, rng, false);
        }

        // Dropback resolved as a throw.
        let interception =
            (rates.interception * self.offense.turnover_regression + self.interception_adj)
                .clamp(0.001, 0.15);
        let attempt: f64 = rng.gen();
        if attempt < interception {
            return self.outcome(
                PlayCall::Pass,
                0,
                Some(TurnoverKind::Interception),
                pressured,
                situation,
                rng,
                false,
            );
        }
        if attempt < interception + rates.completion {
            let ypa = (rates.yards_per_attempt + PASS_BLOCK_DELTA_YARDS * self.pass_block_delta)
                * self.qb_downgrade;
            // Location of a completed pass, not of an attempt.
            let mu = ypa / rates.completion.max(0.30);
            let mut yards = normal(rng, mu, 6.0);
            if rng.gen::<f64>() < self.explosive_pass {
                yards = normal(rng, 32.0, 14.0).max(20.0);
            }
            let yards = self.clamp_yards(yards, situation);
            let fumble = rng.gen::<f64>() < self.fumble_rate;
            let turnover = fumble.then_some(TurnoverKind::Fumble);
            return self.outcome(PlayCall::Pass, yards, turnover, pressured, situation, rng, false);
        }

        // Incompletion stops the clock.
        self.outcome(PlayCall::Pass, 0, None, pressured, situation, rng, true)
    }

    fn run_play(&self, situation: &Situation, rng: &mut ChaCha8Rng) -> PlayOutcome {
        let mut yards = normal(rng, self.run_yards_mu, 4.0);
        if rng.gen::<f64>() < self.explosive_rush {
            yards = normal(rng, 24.0, 10.0).max(15.0);
        }
        let yards = self.clamp_yards(yards, situation);
        let fumble = rng.gen::<f64>() < self.fumble_rate;
        let turnover = fumble.then_some(TurnoverKind::Fumble);
        self.outcome(PlayCall::Run, yards, turnover, false, situation, rng, false)
    }

    #[allow(clippy::too_many_arguments)]
    fn outcome(
        &self,
        call: PlayCall,
        yards: i16,
        turnover: Option<TurnoverKind>,
        pressured: bool,
        situation: &Situation,
        rng: &mut ChaCha8Rng,
        clock_stopped: bool,
    ) -> PlayOutcome {
        let base = if clock_stopped {
            7.0
        } else if situation.two_minute() {
            14.0
        } else {
            self.offense.seconds_per_play
        };
        let elapsed = (base + rng.gen_range(-3.0..3.0)).clamp(4.0, 45.0) as u16;
        let touchdown = turnover.is_none() && yards >= situation.yards_to_goal() as i16;
        PlayOutcome {
            call,
            yards,
            turnover,
            touchdown,
            first_down: turnover.is_none() && yards >= situation.distance as i16,
            pressured,
            elapsed,
            clock_stopped,
        }
    }

    /// Yards can never pass the opposing end zone, nor retreat past the
    /// offense's own goal line.
    fn clamp_yards(&self, yards: f64, situation: &Situation) -> i16 {
        let forward_limit = situation.yards_to_goal() as f64;
        let backward_limit = -(situation.yardline as f64);
        yards.clamp(backward_limit, forward_limit).round() as i16
    }
}

fn normal(rng: &mut ChaCha8Rng, mu: f64, sd: f64) -> f64 {
    let z: f64 = StandardNormal.sample(rng);
    mu + sd * z
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PressureConfig, ShrinkageConfig};
    use crate::data::repository::MetricRepository;
    use crate::data::table::{FeatureTable, TableKind};
    use crate::pressure::PressureCalibrator;
    use crate::profile::builder::ProfileBuilder;
    use rand::SeedableRng;

    fn league_record(team: &str) -> TeamWeekRecord {
        let repo = MetricRepository::empty();
        ProfileBuilder::new(&repo, &ShrinkageConfig::default())
            .unwrap()
            .build(team, 2024, 1)
            .unwrap()
    }

    fn league_baselines() -> PressureBaselines {
        let table = FeatureTable::new(TableKind::Efficiency);
        PressureCalibrator::new(&PressureConfig::default())
            .refit(&table, 2024, 1)
            .unwrap()
    }

    fn simulator<'a>(
        offense: &'a TeamWeekRecord,
        defense: &'a TeamWeekRecord,
        baselines: &'a PressureBaselines,
    ) -> PlaySimulator<'a> {
        PlaySimulator::new(
            offense,
            defense,
            baselines,
            MatchupAdjustment::default(),
            None,
            None,
        )
    }

    #[test]
    fn test_yards_never_exceed_field() {
        let offense = league_record("KC");
        let defense = league_record("BUF");
        let baselines = league_baselines();
        let sim = simulator(&offense, &defense, &baselines);

        let mut situation = Situation::opening();
        situation.yardline = 95;
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..2000 {
            let play = sim.simulate(&situation, &mut rng);
            assert!(play.yards <= 5, "gained past the end zone: {}", play.yards);
            assert!(play.yards >= -95);
        }
    }

    #[test]
    fn test_same_seed_same_plays() {
        let offense = league_record("KC");
        let defense = league_record("BUF");
        let baselines = league_baselines();
        let sim = simulator(&offense, &defense, &baselines);
        let situation = Situation::opening();

        let mut a = ChaCha8Rng::seed_from_u64(99);
        let mut b = ChaCha8Rng::seed_from_u64(99);
        for _ in 0..500 {
            let pa = sim.simulate(&situation, &mut a);
            let pb = sim.simulate(&situation, &mut b);
            assert_eq!(pa.yards, pb.yards);
            assert_eq!(pa.call, pb.call);
            assert_eq!(pa.turnover, pb.turnover);
        }
    }

    #[test]
    fn test_plays_average_plausible_yardage() {
        let offense = league_record("KC");
        let defense = league_record("BUF");
        let baselines = league_baselines();
        let sim = simulator(&offense, &defense, &baselines);
        let situation = Situation::opening();

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let n = 20_000;
        let total: i64 = (0..n)
            .map(|_| sim.simulate(&situation, &mut rng).yards as i64)
            .sum();
        let mean = total as f64 / n as f64;
        // League-average offenses gain roughly 4-7 yards per play.
        assert!((3.0..8.0).contains(&mean), "mean yards {mean}");
    }

    #[test]
    fn test_better_pass_blocking_gains_more() {
        let mut strong = league_record("KC");
        strong.grades.pass_block = 90.0;
        let mut weak = league_record("CHI");
        weak.grades.pass_block = 30.0;
        // Force every play to be a pass so the comparison isolates blocking.
        strong.tendencies = crate::profile::tendency::TendencyTable::league(1.0);
        weak.tendencies = crate::profile::tendency::TendencyTable::league(1.0);

        let defense = league_record("BUF");
        let baselines = league_baselines();
        let situation = Situation::opening();

        let sim_strong = simulator(&strong, &defense, &baselines);
        let sim_weak = simulator(&weak, &defense, &baselines);

        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let n = 30_000;
        let strong_total: i64 = (0..n)
            .map(|_| sim_strong.simulate(&situation, &mut rng).yards as i64)
            .sum();
        let weak_total: i64 = (0..n)
            .map(|_| sim_weak.simulate(&situation, &mut rng).yards as i64)
            .sum();
        assert!(strong_total > weak_total);
    }

    #[test]
    fn test_turnovers_occur_at_plausible_rate() {
        let offense = league_record("KC");
        let defense = league_record("BUF");
        let baselines = league_baselines();
        let sim = simulator(&offense, &defense, &baselines);
        let situation = Situation::opening();

        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let n = 50_000;
        let turnovers = (0..n)
            .filter(|_| sim.simulate(&situation, &mut rng).turnover.is_some())
            .count();
        let rate = turnovers as f64 / n as f64;
        // League turnover rate per play sits near 2-3%.
        assert!((0.005..0.06).contains(&rate), "turnover rate {rate}");
    }
}
