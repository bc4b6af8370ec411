use crate::model::player::Team;

pub const TRICKS_PER_DEAL: u8 = 5;

/// Points awarded for a finished deal, indexed by team.
///
/// The calling side takes 1 point for three or four tricks and 2 for all
/// five (4 when playing alone); the defenders take 2 when the caller is
/// euchred.
pub fn score(team_tricks: [u8; 2], caller: Team, alone: bool) -> [u8; 2] {
    let mut points = [0u8; 2];
    let made = team_tricks[caller.index()];
    if made >= 3 {
        points[caller.index()] = match (made, alone) {
            (TRICKS_PER_DEAL, true) => 4,
            (TRICKS_PER_DEAL, false) => 2,
            _ => 1,
        };
    } else {
        points[caller.opponent().index()] = 2;
    }
    points
}

/// Caller-relative signed result: -2 when euchred, otherwise the caller's points.
pub fn caller_points(team_points: [u8; 2], caller: Team) -> i8 {
    let own = team_points[caller.index()];
    if own > 0 {
        own as i8
    } else {
        -(team_points[caller.opponent().index()] as i8)
    }
}

/// Running team totals for a game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreBoard {
    totals: [u32; 2],
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(&self, team: Team) -> u32 {
        self.totals[team.index()]
    }

    pub fn totals(&self) -> [u32; 2] {
        self.totals
    }

    pub fn apply_deal(&mut self, points: [u8; 2]) {
        for team in Team::BOTH {
            self.totals[team.index()] += u32::from(points[team.index()]);
        }
    }

    pub fn leading_team(&self) -> Option<Team> {
        match self.totals[0].cmp(&self.totals[1]) {
            std::cmp::Ordering::Greater => Some(Team::NorthSouth),
            std::cmp::Ordering::Less => Some(Team::EastWest),
            std::cmp::Ordering::Equal => None,
        }
    }
}
