//! League standings aggregation.
//!
//! A pure, single-pass fold over completed matches. The output depends only
//! on the set of matches, not their order, so the handler can feed rows in
//! whatever order the database returns them.

use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

use crate::types::TeamId;

/// A completed match as the aggregator sees it: two teams and the ordered
/// set scores (games won per side).
#[derive(Debug, Clone)]
pub struct CompletedMatch {
    pub home_team: TeamId,
    pub away_team: TeamId,
    pub sets: Vec<(i16, i16)>,
}

impl CompletedMatch {
    /// Sets won per side.
    fn set_tally(&self) -> (u32, u32) {
        let mut home = 0;
        let mut away = 0;
        for (home_games, away_games) in &self.sets {
            if home_games > away_games {
                home += 1;
            } else if away_games > home_games {
                away += 1;
            }
            // A drawn set counts for neither side.
        }
        (home, away)
    }
}

/// One row of the standings table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct StandingsRow {
    #[schema(value_type = Uuid)]
    pub team_id: TeamId,
    pub played: u32,
    pub wins: u32,
    pub losses: u32,
    pub points: u32,
    pub sets_won: u32,
    pub sets_lost: u32,
    pub games_won: u32,
    pub games_lost: u32,
}

impl StandingsRow {
    fn new(team_id: TeamId) -> Self {
        Self {
            team_id,
            played: 0,
            wins: 0,
            losses: 0,
            points: 0,
            sets_won: 0,
            sets_lost: 0,
            games_won: 0,
            games_lost: 0,
        }
    }
}

// Winning a match is worth 2 points, losing (but playing) 1.
const POINTS_WIN: u32 = 2;
const POINTS_LOSS: u32 = 1;

/// Aggregate completed matches into sorted standings.
///
/// Matches whose sets do not produce a winner (equal sets won) are ignored.
/// Ordering: points desc, wins desc, sets won desc, games won desc, then
/// team id so equal rows still sort deterministically.
pub fn compute_standings(matches: &[CompletedMatch]) -> Vec<StandingsRow> {
    let mut table: HashMap<TeamId, StandingsRow> = HashMap::new();

    for m in matches {
        let (home_sets, away_sets) = m.set_tally();
        if home_sets == away_sets {
            continue;
        }

        let (home_games, away_games) = m
            .sets
            .iter()
            .fold((0u32, 0u32), |(h, a), &(hg, ag)| (h + hg as u32, a + ag as u32));

        let home_won = home_sets > away_sets;
        for (team, won, sets_won, sets_lost, games_won, games_lost) in [
            (m.home_team, home_won, home_sets, away_sets, home_games, away_games),
            (m.away_team, !home_won, away_sets, home_sets, away_games, home_games),
        ] {
            let row = table.entry(team).or_insert_with(|| StandingsRow::new(team));
            row.played += 1;
            row.sets_won += sets_won;
            row.sets_lost += sets_lost;
            row.games_won += games_won;
            row.games_lost += games_lost;
            if won {
                row.wins += 1;
                row.points += POINTS_WIN;
            } else {
                row.losses += 1;
                row.points += POINTS_LOSS;
            }
        }
    }

    let mut rows: Vec<StandingsRow> = table.into_values().collect();
    rows.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then(b.wins.cmp(&a.wins))
            .then(b.sets_won.cmp(&a.sets_won))
            .then(b.games_won.cmp(&a.games_won))
            .then(a.team_id.cmp(&b.team_id))
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn team(n: u128) -> TeamId {
        Uuid::from_u128(n)
    }

    fn m(home: TeamId, away: TeamId, sets: &[(i16, i16)]) -> CompletedMatch {
        CompletedMatch {
            home_team: home,
            away_team: away,
            sets: sets.to_vec(),
        }
    }

    #[test]
    fn test_single_match_tallies() {
        let (a, b) = (team(1), team(2));
        let rows = compute_standings(&[m(a, b, &[(6, 3), (4, 6), (6, 2)])]);

        assert_eq!(rows.len(), 2);
        let winner = &rows[0];
        assert_eq!(winner.team_id, a);
        assert_eq!(winner.wins, 1);
        assert_eq!(winner.losses, 0);
        assert_eq!(winner.points, POINTS_WIN);
        assert_eq!(winner.sets_won, 2);
        assert_eq!(winner.sets_lost, 1);
        assert_eq!(winner.games_won, 16);
        assert_eq!(winner.games_lost, 11);

        let loser = &rows[1];
        assert_eq!(loser.team_id, b);
        assert_eq!(loser.points, POINTS_LOSS);
        assert_eq!(loser.played, 1);
    }

    #[test]
    fn test_ordering_falls_through_tiebreaks() {
        let (a, b, d, e) = (team(1), team(2), team(3), team(4));
        // a and d both have one win (2 points each), but a took 2 sets to
        // d's 1. b and e both have one loss (1 point, 0 wins, 0 sets) and
        // fall through to the games tiebreak: e won 4 games, b none.
        let rows = compute_standings(&[
            m(a, b, &[(6, 0), (6, 0)]),
            m(d, e, &[(6, 4)]),
        ]);

        let order: Vec<_> = rows.iter().map(|r| r.team_id).collect();
        assert_eq!(order, vec![a, d, e, b]);
        assert_eq!(rows[0].points, POINTS_WIN);
        assert_eq!(rows[3].points, POINTS_LOSS);
    }

    #[test]
    fn test_order_independence() {
        let (a, b, c, d) = (team(1), team(2), team(3), team(4));
        let mut matches = vec![
            m(a, b, &[(6, 2), (6, 3)]),
            m(c, d, &[(3, 6), (6, 4), (6, 1)]),
            m(a, c, &[(6, 7), (6, 4), (2, 6)]),
            m(b, d, &[(6, 0), (0, 6), (6, 4)]),
            m(a, d, &[(6, 1), (6, 1)]),
        ];

        let baseline = compute_standings(&matches);

        // Any permutation of the input must produce identical standings.
        matches.reverse();
        assert_eq!(compute_standings(&matches), baseline);

        matches.swap(0, 2);
        matches.swap(1, 4);
        assert_eq!(compute_standings(&matches), baseline);
    }

    #[test]
    fn test_undecided_matches_are_ignored() {
        let (a, b) = (team(1), team(2));
        let rows = compute_standings(&[m(a, b, &[(6, 4), (4, 6)])]);

        assert!(rows.is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(compute_standings(&[]).is_empty());
    }
}
