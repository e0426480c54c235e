// Lane/role mapping: hero name -> normalized lane label.

use std::collections::HashMap;
use std::fmt;
use std::io::Read;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::table::{read_table, strip_quotes};

const HERO_COLUMNS: &[&str] = &["hero", "hero_name", "name", "my_hero"];
const LANE_COLUMNS: &[&str] = &["lane", "role", "position"];

/// The five canonical lanes a hero can be assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    Gold,
    Exp,
    Mid,
    Jungle,
    Roam,
}

impl Role {
    pub const ALL: [Role; 5] = [Role::Gold, Role::Exp, Role::Mid, Role::Jungle, Role::Roam];

    /// Parse a raw lane label through the synonym table.
    pub fn from_label(raw: &str) -> Option<Self> {
        let key = raw
            .to_lowercase()
            .replace(['-', '_'], " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        match key.as_str() {
            "gold" | "gold lane" | "goldlane" | "gold laner" | "marksman" | "mm" | "adc" => {
                Some(Role::Gold)
            }
            "exp" | "exp lane" | "explane" | "exp laner" | "experience" | "offlane" | "top" => {
                Some(Role::Exp)
            }
            "mid" | "mid lane" | "midlane" | "mid laner" | "middle" | "mage" => Some(Role::Mid),
            "jungle" | "jungler" | "jg" | "jungling" => Some(Role::Jungle),
            "roam" | "roamer" | "roaming" | "support" | "sup" => Some(Role::Roam),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Gold => "Gold",
            Role::Exp => "EXP",
            Role::Mid => "Mid",
            Role::Jungle => "Jungle",
            Role::Roam => "Roam",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A hero's lane: one of the canonical five, or an unrecognized label kept
/// (title-cased) for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lane {
    Canonical(Role),
    Other(String),
}

impl Lane {
    pub fn role(&self) -> Option<Role> {
        match self {
            Lane::Canonical(role) => Some(*role),
            Lane::Other(_) => None,
        }
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lane::Canonical(role) => f.write_str(role.label()),
            Lane::Other(label) => f.write_str(label),
        }
    }
}

/// Normalize a raw lane label; unknown labels pass through title-cased.
pub fn normalize_lane(raw: &str) -> Lane {
    match Role::from_label(raw) {
        Some(role) => Lane::Canonical(role),
        None => Lane::Other(title_case(raw)),
    }
}

fn title_case(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Mapping from lower-cased hero name to lane.
#[derive(Debug, Clone, Default)]
pub struct RoleMap {
    lanes: HashMap<String, Lane>,
}

impl RoleMap {
    /// Build from `(hero, raw lane)` pairs. Later pairs for the same hero win.
    pub fn from_pairs<I, H, L>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (H, L)>,
        H: AsRef<str>,
        L: AsRef<str>,
    {
        let mut map = RoleMap::default();
        for (hero, lane) in pairs {
            map.insert(hero.as_ref(), lane.as_ref());
        }
        map
    }

    fn insert(&mut self, hero: &str, raw_lane: &str) {
        let hero = hero.trim();
        let raw_lane = raw_lane.trim();
        if hero.is_empty() || raw_lane.is_empty() {
            return;
        }
        self.lanes.insert(hero.to_lowercase(), normalize_lane(raw_lane));
    }

    pub fn lane_of(&self, hero: &str) -> Option<&Lane> {
        self.lanes.get(&hero.trim().to_lowercase())
    }

    /// The hero's canonical role, if its lane is one of the five.
    pub fn role_of(&self, hero: &str) -> Option<Role> {
        self.lane_of(hero).and_then(Lane::role)
    }

    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }
}

/// Parse a two-column lane table. A header naming a hero column and a lane
/// column is required; without it the map is empty.
pub fn parse_lane_table<R: Read>(rdr: R) -> RoleMap {
    let Some(table) = read_table(rdr, "lane") else {
        return RoleMap::default();
    };
    let (Some(idx_hero), Some(idx_lane)) = (table.column(HERO_COLUMNS), table.column(LANE_COLUMNS))
    else {
        warn!("lane table header {:?} lacks a hero or lane column", table.headers);
        return RoleMap::default();
    };

    let mut map = RoleMap::default();
    for record in &table.records {
        let (Some(hero), Some(lane)) = (record.get(idx_hero), record.get(idx_lane)) else {
            debug!("skipping short lane row {:?}", record);
            continue;
        };
        map.insert(strip_quotes(hero), strip_quotes(lane));
    }
    debug!("parsed {} hero lanes", map.len());
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synonyms_normalize_to_canonical_roles() {
        assert_eq!(normalize_lane("Gold Lane"), Lane::Canonical(Role::Gold));
        assert_eq!(normalize_lane("marksman"), Lane::Canonical(Role::Gold));
        assert_eq!(normalize_lane("EXP"), Lane::Canonical(Role::Exp));
        assert_eq!(normalize_lane("exp-lane"), Lane::Canonical(Role::Exp));
        assert_eq!(normalize_lane("Mid_Lane"), Lane::Canonical(Role::Mid));
        assert_eq!(normalize_lane(" jungler "), Lane::Canonical(Role::Jungle));
        assert_eq!(normalize_lane("Roamer"), Lane::Canonical(Role::Roam));
        assert_eq!(normalize_lane("support"), Lane::Canonical(Role::Roam));
    }

    #[test]
    fn unknown_labels_pass_through_title_cased() {
        assert_eq!(normalize_lane("flex pick"), Lane::Other("Flex Pick".into()));
        assert_eq!(normalize_lane("SIDE"), Lane::Other("Side".into()));
    }

    #[test]
    fn parses_header_and_rows() {
        let csv_data = "\
hero,lane
Aamon,Jungle
Khufra,roam
Layla,gold lane
Chou,flex";

        let map = parse_lane_table(csv_data.as_bytes());
        assert_eq!(map.len(), 4);
        assert_eq!(map.role_of("aamon"), Some(Role::Jungle));
        assert_eq!(map.role_of("KHUFRA"), Some(Role::Roam));
        assert_eq!(map.role_of("Layla"), Some(Role::Gold));
        assert_eq!(map.role_of("Chou"), None);
        assert_eq!(map.lane_of("Chou"), Some(&Lane::Other("Flex".into())));
        assert_eq!(map.lane_of("Fanny"), None);
    }

    #[test]
    fn header_is_required() {
        let csv_data = "\
Aamon,Jungle
Khufra,Roam";

        assert!(parse_lane_table(csv_data.as_bytes()).is_empty());
    }

    #[test]
    fn role_header_synonym_and_semicolons() {
        let csv_data = "\
Name;Role
Aamon;Jungle";

        let map = parse_lane_table(csv_data.as_bytes());
        assert_eq!(map.role_of("Aamon"), Some(Role::Jungle));
    }

    #[test]
    fn later_rows_override_earlier_ones() {
        let csv_data = "\
hero,lane
Chou,exp
chou,roam";

        let map = parse_lane_table(csv_data.as_bytes());
        assert_eq!(map.len(), 1);
        assert_eq!(map.role_of("Chou"), Some(Role::Roam));
    }

    #[test]
    fn short_and_blank_rows_are_ignored() {
        let csv_data = "\
hero,lane
Aamon
,Mid
Layla,";

        assert!(parse_lane_table(csv_data.as_bytes()).is_empty());
    }

    #[test]
    fn display_labels() {
        assert_eq!(Role::Exp.to_string(), "EXP");
        assert_eq!(Lane::Other("Flex".into()).to_string(), "Flex");
        assert_eq!(Lane::Canonical(Role::Mid).to_string(), "Mid");
    }
}
