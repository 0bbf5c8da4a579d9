//! Change detection between consecutive snapshots
//!
//! Ball detection diffs the batting side's `(over, ball)` pair converted to a
//! total-balls-faced integer. Score text is never diffed to detect balls; it
//! only feeds score-change and innings-change detection.

use super::events::{BallEvent, EndReason, MatchEvent};
use super::state::ProgressMark;
use crate::config::MatchFormat;
use crate::snapshot::{CardOutcome, Snapshot, TeamScore};

/// Ball and over events from a strict progress increase.
///
/// At most one `BallPlayed` is derived per tick: only the newest glyph is
/// observable, so when the counter jumps by more than one a `BallGap` reports
/// the missed balls instead of assuming them away.
pub fn progress_events(
    prev: ProgressMark,
    batting: &TeamScore,
    innings: u8,
    last_ball: Option<CardOutcome>,
) -> Vec<MatchEvent> {
    let mut events = Vec::new();

    let current = ProgressMark::new(batting.over, batting.ball);
    let delta = current.total_balls().saturating_sub(prev.total_balls());

    if delta > 0 {
        if delta > 1 {
            events.push(MatchEvent::BallGap { missed: delta - 1 });
        }
        events.push(MatchEvent::BallPlayed(BallEvent {
            innings,
            over: current.over,
            ball: current.ball,
            position_in_over: if current.ball > 0 { current.ball } else { 6 },
            outcome: last_ball.unwrap_or(CardOutcome::Unknown),
        }));
    }

    // Over completes when the ball counter resets to 0 and the over counter
    // strictly increases past a positive value.
    if current.ball == 0 && current.over > prev.over && current.over > 0 {
        events.push(MatchEvent::OverCompleted {
            innings,
            over_number: current.over,
        });
    }

    events
}

/// Innings 2 begins the moment team 2 shows any over/ball progress while the
/// tracker still thinks it is innings 1.
pub fn innings_changed(snapshot: &Snapshot, innings: u8) -> bool {
    if innings != 1 {
        return false;
    }
    snapshot
        .team2
        .as_ref()
        .map(|t| t.over > 0 || t.ball > 0)
        .unwrap_or(false)
}

/// Structural score comparison; any difference in either team's score text
/// counts, not just the runs value.
pub fn score_changed(
    prev: Option<&(Option<String>, Option<String>)>,
    snapshot: &Snapshot,
) -> bool {
    let current = snapshot.score_pair();
    match prev {
        Some((p1, p2)) => p1.as_deref() != current.0 || p2.as_deref() != current.1,
        None => current.0.is_some() || current.1.is_some(),
    }
}

/// Match-end check for the current snapshot.
///
/// The match ends when innings 2 ends: the caps apply to innings 1 too, but
/// there they end the innings (detected through team 2's counters moving),
/// not the match. The chase-complete condition requires strictly greater
/// runs: an exact tie never ends the match early, it plays out to the
/// over/wicket caps.
pub fn end_reason(snapshot: &Snapshot, innings: u8, format: &MatchFormat) -> Option<EndReason> {
    if innings == 2 {
        if let Some(team2) = snapshot.team2.as_ref() {
            if let Some(team1) = snapshot.team1.as_ref() {
                if team2.runs > team1.runs {
                    return Some(EndReason::TargetChased);
                }
            }

            if team2.wickets >= format.wickets_cap {
                return Some(EndReason::AllOut);
            }

            if team2.over >= format.overs_per_innings {
                return Some(EndReason::OversComplete);
            }
        }
    }

    if let Some(status) = snapshot.status_text.as_deref() {
        let lower = status.to_lowercase();
        if lower.contains("won") || lower.contains("lost") {
            return Some(EndReason::ResultDeclared);
        }
    }

    None
}
