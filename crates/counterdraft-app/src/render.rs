// Plain-text rendering of the draft and its derived report.

use std::fmt::Write;

use counterdraft_core::draft::{DraftReport, DraftState, Team};

const EMPTY_SLOT: &str = "-";

fn slots(values: &[String]) -> String {
    values
        .iter()
        .map(|v| {
            let v = v.trim();
            if v.is_empty() {
                EMPTY_SLOT
            } else {
                v
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render the rosters, the counter suggestion and the win estimate.
pub fn report(state: &DraftState, report: &DraftReport) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_report(&mut out, state, report);
    out
}

fn write_report(out: &mut String, state: &DraftState, report: &DraftReport) -> std::fmt::Result {
    writeln!(out, "Room: {}  (suggesting up to {})", state.room, state.max_picks)?;
    for team in [Team::A, Team::B] {
        writeln!(
            out,
            "{}: [{}]  bans: [{}]",
            team,
            slots(state.picks(team)),
            slots(state.bans(team))
        )?;
    }

    let suggestion = &report.suggestion;
    if suggestion.assignment.is_empty() {
        writeln!(out, "Counters: no enemy picks yet")?;
    } else {
        let mode = if report.lane_constrained {
            "one per lane"
        } else {
            "any lane"
        };
        writeln!(out, "Counters vs {} ({}):", Team::B, mode)?;
        for entry in &suggestion.assignment {
            match &entry.counter {
                Some(pick) => {
                    let lane = pick.role.map(|r| format!(" [{}]", r)).unwrap_or_default();
                    writeln!(out, "  {} <- {}{} {:+.2}", entry.enemy, pick.hero, lane, pick.score)?;
                }
                None => writeln!(out, "  {} <- no counter", entry.enemy)?,
            }
        }
        writeln!(out, "  total {:+.2}", suggestion.total)?;
    }

    match &report.estimate {
        Some(estimate) => {
            writeln!(
                out,
                "Win estimate for {}: {:.1}% (pairing total {:+.2})",
                Team::A,
                estimate.win_probability * 100.0,
                estimate.total
            )?;
            for pair in &estimate.pairs {
                writeln!(out, "  {} vs {} {:+.2}", pair.own, pair.opposing, pair.score)?;
            }
            let adv = &report.advantage;
            writeln!(
                out,
                "Cross advantage: A {:+.2}, B {:+.2}, net {:+.2}",
                adv.a_over_b, adv.b_over_a, adv.net
            )?;
        }
        None => writeln!(out, "Win estimate: needs at least one pick on each team")?,
    }
    Ok(())
}
