use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Pipeline state of a deal. Declaration order is the pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Lead,
    PreQualification,
    Underwriting,
    Approved,
    Active,
    Monitoring,
    Collection,
    ClosedWon,
    ClosedLost,
    Default,
}

impl Stage {
    pub const fn ordered() -> [Self; 10] {
        [
            Self::Lead,
            Self::PreQualification,
            Self::Underwriting,
            Self::Approved,
            Self::Active,
            Self::Monitoring,
            Self::Collection,
            Self::ClosedWon,
            Self::ClosedLost,
            Self::Default,
        ]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lead => "lead",
            Self::PreQualification => "pre_qualification",
            Self::Underwriting => "underwriting",
            Self::Approved => "approved",
            Self::Active => "active",
            Self::Monitoring => "monitoring",
            Self::Collection => "collection",
            Self::ClosedWon => "closed_won",
            Self::ClosedLost => "closed_lost",
            Self::Default => "default",
        }
    }

    /// Human form of the stage key: underscores become spaces, words title-cased.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Lead => "Lead",
            Self::PreQualification => "Pre Qualification",
            Self::Underwriting => "Underwriting",
            Self::Approved => "Approved",
            Self::Active => "Active",
            Self::Monitoring => "Monitoring",
            Self::Collection => "Collection",
            Self::ClosedWon => "Closed Won",
            Self::ClosedLost => "Closed Lost",
            Self::Default => "Default",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::ClosedWon | Self::ClosedLost)
    }

    /// Legal destinations from this stage, excluding the no-op move to itself.
    pub fn valid_targets(self) -> &'static BTreeSet<Stage> {
        // every stage has an entry, terminal ones map to the empty set
        &valid_transitions()[&self]
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown pipeline stage '{0}'")]
pub struct UnknownStage(pub String);

impl FromStr for Stage {
    type Err = UnknownStage;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let key = raw.trim().to_ascii_lowercase();
        Self::ordered()
            .into_iter()
            .find(|stage| stage.as_str() == key)
            .ok_or_else(|| UnknownStage(raw.to_string()))
    }
}

pub const TERMINAL_STAGES: [Stage; 2] = [Stage::ClosedWon, Stage::ClosedLost];

pub const NON_TERMINAL_STAGES: [Stage; 8] = [
    Stage::Lead,
    Stage::PreQualification,
    Stage::Underwriting,
    Stage::Approved,
    Stage::Active,
    Stage::Monitoring,
    Stage::Collection,
    Stage::Default,
];

/// Precomputed stage -> legal destinations map, built on first use.
pub fn valid_transitions() -> &'static BTreeMap<Stage, BTreeSet<Stage>> {
    static TRANSITIONS: OnceLock<BTreeMap<Stage, BTreeSet<Stage>>> = OnceLock::new();
    TRANSITIONS.get_or_init(|| {
        Stage::ordered()
            .into_iter()
            .map(|from| {
                let targets = if from.is_terminal() {
                    BTreeSet::new()
                } else {
                    Stage::ordered()
                        .into_iter()
                        .filter(|to| *to != from)
                        .collect()
                };
                (from, targets)
            })
            .collect()
    })
}

/// Result of checking a proposed stage change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionCheck {
    pub allowed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl TransitionCheck {
    fn allowed() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    fn rejected(reason: String) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
        }
    }
}

/// Decide whether a deal may move from `from` to `to`.
///
/// Staying put is always legal and terminal stages can never be left. Every
/// other move is permitted, including backward moves such as `active -> lead`.
pub fn validate_transition(from: Stage, to: Stage) -> TransitionCheck {
    if from == to {
        return TransitionCheck::allowed();
    }

    if from.is_terminal() {
        return TransitionCheck::rejected(format!(
            "Cannot move a deal out of {}: it is a terminal stage",
            from.label()
        ));
    }

    TransitionCheck::allowed()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title_case(key: &str) -> String {
        key.split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn labels_are_title_cased_keys() {
        for stage in Stage::ordered() {
            assert_eq!(stage.label(), title_case(stage.as_str()));
        }
    }

    #[test]
    fn terminal_and_non_terminal_sets_partition_the_pipeline() {
        for stage in Stage::ordered() {
            assert_eq!(TERMINAL_STAGES.contains(&stage), stage.is_terminal());
            assert_eq!(NON_TERMINAL_STAGES.contains(&stage), !stage.is_terminal());
        }
        assert_eq!(TERMINAL_STAGES.len() + NON_TERMINAL_STAGES.len(), 10);
    }

    #[test]
    fn transition_map_matches_predicate() {
        let map = valid_transitions();
        assert_eq!(map.len(), Stage::ordered().len());
        for from in Stage::ordered() {
            for to in Stage::ordered() {
                if from == to {
                    assert!(!map[&from].contains(&to));
                    continue;
                }
                assert_eq!(
                    map[&from].contains(&to),
                    validate_transition(from, to).allowed,
                    "{from} -> {to}"
                );
            }
        }
        assert!(Stage::ClosedWon.valid_targets().is_empty());
        assert_eq!(Stage::Lead.valid_targets().len(), 9);
    }

    #[test]
    fn rejection_names_the_terminal_stage() {
        let check = validate_transition(Stage::ClosedLost, Stage::Active);
        assert!(!check.allowed);
        assert!(check
            .reason
            .as_deref()
            .unwrap_or_default()
            .contains("Closed Lost"));
    }

    #[test]
    fn backward_moves_between_open_stages_are_allowed() {
        assert!(validate_transition(Stage::Active, Stage::Lead).allowed);
        assert!(validate_transition(Stage::Default, Stage::Collection).allowed);
    }

    #[test]
    fn parses_snake_case_keys() {
        assert_eq!("pre_qualification".parse::<Stage>(), Ok(Stage::PreQualification));
        assert_eq!(" Closed_Won ".parse::<Stage>(), Ok(Stage::ClosedWon));
        assert_eq!(
            "archived".parse::<Stage>(),
            Err(UnknownStage("archived".to_string()))
        );
    }

    #[test]
    fn serializes_as_snake_case() {
        let json = serde_json::to_string(&Stage::ClosedWon).expect("serializes");
        assert_eq!(json, "\"closed_won\"");
        let stage: Stage = serde_json::from_str("\"default\"").expect("deserializes");
        assert_eq!(stage, Stage::Default);
    }
}
