//! Game Situation
//!
//! Small copy type describing the state a play is snapped from, shared by the
//! pressure model, the tendency lookup, and the play simulator.

use crate::profile::tendency::SituationKey;

#[derive(Debug, Clone, Copy)]
pub struct Situation {
    pub down: u8,
    /// Yards to go for a first down.
    pub distance: u8,
    /// Yards from the offense's own goal line (1-99).
    pub yardline: u8,
    /// Offense score minus defense score.
    pub score_diff: i16,
    /// 1 or 2.
    pub half: u8,
    pub seconds_left_half: u16,
    pub play_action: bool,
    pub shotgun: bool,
}

impl Situation {
    /// Opening snap: 1st-and-10 from the 25, level score.
    pub fn opening() -> Self {
        Self {
            down: 1,
            distance: 10,
            yardline: 25,
            score_diff: 0,
            half: 1,
            seconds_left_half: 1800,
            play_action: false,
            shotgun: false,
        }
    }

    pub fn two_minute(&self) -> bool {
        self.seconds_left_half <= 120
    }

    /// Yards between the ball and the opposing end zone.
    pub fn yards_to_goal(&self) -> u8 {
        100 - self.yardline
    }

    pub fn key(&self) -> SituationKey {
        SituationKey::from_raw(self.down, self.distance, self.score_diff, self.seconds_left_half)
    }
}
