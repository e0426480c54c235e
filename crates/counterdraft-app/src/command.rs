// Text commands typed by a participant.
//
// Slots are written 1-based (`pick a 1 Aamon`) and stored 0-based. Hero names
// may contain spaces; everything after the slot is taken as the name.

use counterdraft_core::draft::{Team, ROSTER_SIZE};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Set a pick slot and snap it to a known hero.
    Pick { team: Team, slot: usize, hero: String },
    /// Set a pick slot to raw text, leaving correction for a later `commit`.
    Type { team: Team, slot: usize, text: String },
    Clear { team: Team, slot: usize },
    /// Set a ban slot and snap it to a known hero.
    Ban { team: Team, slot: usize, hero: String },
    Commit { team: Team, slot: usize },
    MaxPicks(usize),
    Reset,
    Room(String),
    Show,
    Json,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command `{0}` (try `help`)")]
    Unknown(String),

    #[error("`{command}` needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("unknown team `{0}` (use a or b)")]
    InvalidTeam(String),

    #[error("slot `{0}` is not between 1 and {max}", max = ROSTER_SIZE)]
    InvalidSlot(String),

    #[error("`{0}` is not a number")]
    InvalidNumber(String),
}

pub const HELP: &str = "\
commands:
  pick <a|b> <slot> <hero>   set a pick and correct the name
  type <a|b> <slot> <text>   set a pick without correcting it
  commit <a|b> <slot>        correct a typed pick
  clear <a|b> <slot>         empty a pick slot
  ban <a|b> <slot> <hero>    set a ban
  k <n>                      suggest at most n counters (1-5)
  room <name>                switch rooms
  reset                      clear the draft
  show | json | help | quit";

/// Parse one input line.
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Err(CommandError::Empty);
    };
    let verb = verb.to_lowercase();
    let rest: Vec<&str> = words.collect();

    match verb.as_str() {
        "pick" | "p" => {
            let (team, slot, hero) = slot_with_text(&rest, "pick", "a hero name")?;
            Ok(Command::Pick { team, slot, hero })
        }
        "type" | "t" => {
            let (team, slot, text) = slot_with_text(&rest, "type", "some text")?;
            Ok(Command::Type { team, slot, text })
        }
        "ban" | "b" => {
            let (team, slot, hero) = slot_with_text(&rest, "ban", "a hero name")?;
            Ok(Command::Ban { team, slot, hero })
        }
        "clear" | "c" => {
            let (team, slot) = team_and_slot(&rest, "clear")?;
            Ok(Command::Clear { team, slot })
        }
        "commit" => {
            let (team, slot) = team_and_slot(&rest, "commit")?;
            Ok(Command::Commit { team, slot })
        }
        "k" | "max" => {
            let raw = rest.first().ok_or(CommandError::MissingArgument {
                command: "k",
                argument: "a number",
            })?;
            let k = raw
                .parse::<usize>()
                .map_err(|_| CommandError::InvalidNumber(raw.to_string()))?;
            Ok(Command::MaxPicks(k))
        }
        "room" | "join" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument {
                    command: "room",
                    argument: "a room name",
                });
            }
            Ok(Command::Room(rest.join(" ")))
        }
        "reset" => Ok(Command::Reset),
        "show" | "s" => Ok(Command::Show),
        "json" => Ok(Command::Json),
        "help" | "?" => Ok(Command::Help),
        "quit" | "q" | "exit" => Ok(Command::Quit),
        _ => Err(CommandError::Unknown(verb)),
    }
}

fn team_and_slot(args: &[&str], command: &'static str) -> Result<(Team, usize), CommandError> {
    let (Some(team), Some(slot)) = (args.first(), args.get(1)) else {
        return Err(CommandError::MissingArgument {
            command,
            argument: "a team and a slot",
        });
    };
    let team =
        Team::from_str_team(team).ok_or_else(|| CommandError::InvalidTeam(team.to_string()))?;
    let slot = match slot.parse::<usize>() {
        Ok(n @ 1..=ROSTER_SIZE) => n - 1,
        _ => return Err(CommandError::InvalidSlot(slot.to_string())),
    };
    Ok((team, slot))
}

fn slot_with_text(
    args: &[&str],
    command: &'static str,
    argument: &'static str,
) -> Result<(Team, usize, String), CommandError> {
    let (team, slot) = team_and_slot(args, command)?;
    if args.len() < 3 {
        return Err(CommandError::MissingArgument { command, argument });
    }
    Ok((team, slot, args[2..].join(" ")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pick_with_one_based_slot() {
        assert_eq!(
            parse_command("pick a 1 Aamon").unwrap(),
            Command::Pick { team: Team::A, slot: 0, hero: "Aamon".into() }
        );
    }

    #[test]
    fn hero_names_keep_inner_spaces() {
        assert_eq!(
            parse_command("  ban  enemy 5   Yi Sun-shin ").unwrap(),
            Command::Ban { team: Team::B, slot: 4, hero: "Yi Sun-shin".into() }
        );
    }

    #[test]
    fn verbs_are_case_insensitive_and_have_short_forms() {
        assert_eq!(
            parse_command("TYPE b 2 aamo").unwrap(),
            Command::Type { team: Team::B, slot: 1, text: "aamo".into() }
        );
        assert_eq!(parse_command("c a 3").unwrap(), Command::Clear { team: Team::A, slot: 2 });
        assert_eq!(parse_command("q").unwrap(), Command::Quit);
    }

    #[test]
    fn parses_simple_commands() {
        assert_eq!(
            parse_command("commit a 1").unwrap(),
            Command::Commit { team: Team::A, slot: 0 }
        );
        assert_eq!(parse_command("k 3").unwrap(), Command::MaxPicks(3));
        assert_eq!(parse_command("reset").unwrap(), Command::Reset);
        assert_eq!(parse_command("room scrim night").unwrap(), Command::Room("scrim night".into()));
        assert_eq!(parse_command("show").unwrap(), Command::Show);
        assert_eq!(parse_command("json").unwrap(), Command::Json);
        assert_eq!(parse_command("help").unwrap(), Command::Help);
    }

    #[test]
    fn rejects_empty_and_unknown() {
        assert_eq!(parse_command("   "), Err(CommandError::Empty));
        assert_eq!(parse_command("draft a 1"), Err(CommandError::Unknown("draft".into())));
    }

    #[test]
    fn rejects_bad_team_and_slot() {
        assert_eq!(parse_command("pick c 1 Aamon"), Err(CommandError::InvalidTeam("c".into())));
        assert_eq!(parse_command("pick a 0 Aamon"), Err(CommandError::InvalidSlot("0".into())));
        assert_eq!(parse_command("pick a 6 Aamon"), Err(CommandError::InvalidSlot("6".into())));
        assert_eq!(parse_command("clear a x"), Err(CommandError::InvalidSlot("x".into())));
        assert_eq!(
            CommandError::InvalidSlot("0".into()).to_string(),
            "slot `0` is not between 1 and 5"
        );
    }

    #[test]
    fn rejects_missing_arguments() {
        assert!(matches!(
            parse_command("pick a 1"),
            Err(CommandError::MissingArgument { command: "pick", .. })
        ));
        assert!(matches!(
            parse_command("commit a"),
            Err(CommandError::MissingArgument { command: "commit", .. })
        ));
        assert!(matches!(parse_command("room"), Err(CommandError::MissingArgument { .. })));
        assert_eq!(parse_command("k three"), Err(CommandError::InvalidNumber("three".into())));
    }
}
