//! Early-career classifier. Derives level tags from a job title and decides
//! whether the posting belongs in the tracker.
//!
//! The policy is a rule table (`rules::EARLY_CAREER_RULES`) compiled once.
//! Matching is case-insensitive, word-bounded, and looks at the title only.

pub mod rules;

use std::fmt;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

pub use rules::{Rule, RuleKind, EARLY_CAREER_RULES};

/// A seniority / programme label attached to a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LevelTag {
    Intern,
    #[serde(rename = "New Grad")]
    NewGrad,
    #[serde(rename = "Entry Level")]
    EntryLevel,
    Junior,
    Associate,
    Apprentice,
    Fellow,
    #[serde(rename = "Co-op")]
    CoOp,
}

impl LevelTag {
    pub fn label(&self) -> &'static str {
        match self {
            LevelTag::Intern => "Intern",
            LevelTag::NewGrad => "New Grad",
            LevelTag::EntryLevel => "Entry Level",
            LevelTag::Junior => "Junior",
            LevelTag::Associate => "Associate",
            LevelTag::Apprentice => "Apprentice",
            LevelTag::Fellow => "Fellow",
            LevelTag::CoOp => "Co-op",
        }
    }
}

impl fmt::Display for LevelTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of running a title through the policy.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Classification {
    /// Tags in order of first detection, without duplicates.
    pub levels: Vec<LevelTag>,
    pub include: bool,
}

struct CompiledRule {
    pattern: Regex,
    kind: RuleKind,
}

/// A compiled rule table.
pub struct Policy {
    rules: Vec<CompiledRule>,
}

impl Policy {
    /// Compiles a rule table. Patterns are matched case-insensitively.
    pub fn compile(rules: &[Rule]) -> Result<Self, regex::Error> {
        let rules = rules
            .iter()
            .map(|rule| {
                Ok(CompiledRule {
                    pattern: RegexBuilder::new(rule.pattern)
                        .case_insensitive(true)
                        .build()?,
                    kind: rule.kind,
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self { rules })
    }

    /// Evaluates every rule once against the title.
    ///
    /// 1. Explicit markers add their tag.
    /// 2. Without any marker, a generic role noun and no exclusion marker
    ///    yields `Entry Level`.
    /// 3. An exclusion marker always forces `include = false`.
    pub fn classify(&self, title: &str) -> Classification {
        let mut levels: Vec<LevelTag> = Vec::new();
        let mut has_role_noun = false;
        let mut excluded = false;

        for rule in &self.rules {
            if !rule.pattern.is_match(title) {
                continue;
            }
            match rule.kind {
                RuleKind::Marker(tag) => {
                    if !levels.contains(&tag) {
                        levels.push(tag);
                    }
                }
                RuleKind::RoleNoun => has_role_noun = true,
                RuleKind::Exclusion => excluded = true,
            }
        }

        if levels.is_empty() && has_role_noun && !excluded {
            levels.push(LevelTag::EntryLevel);
        }

        let include = !levels.is_empty() && !excluded;
        Classification { levels, include }
    }
}

static EARLY_CAREER: LazyLock<Policy> = LazyLock::new(|| {
    Policy::compile(EARLY_CAREER_RULES).expect("built-in early-career rules must compile")
});

/// The built-in early-career policy.
pub fn early_career_policy() -> &'static Policy {
    &EARLY_CAREER
}

/// Classifies a title under the built-in early-career policy.
pub fn classify(title: &str) -> Classification {
    EARLY_CAREER.classify(title)
}

/// Level tags for display. Recomputed on every call.
pub fn levels(title: &str) -> Vec<LevelTag> {
    classify(title).levels
}

/// Human-facing rendering of a tag set; an empty set reads as "General".
pub fn format_levels(levels: &[LevelTag]) -> String {
    if levels.is_empty() {
        return "General".to_string();
    }
    levels
        .iter()
        .map(LevelTag::label)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_senior_title_is_excluded_without_tags() {
        let result = classify("Senior Software Engineer");
        assert!(result.levels.is_empty());
        assert!(!result.include);
    }

    #[test]
    fn test_intern_title_is_included() {
        let result = classify("Software Engineer Intern");
        assert_eq!(result.levels, vec![LevelTag::Intern]);
        assert!(result.include);
    }

    #[test]
    fn test_generic_role_defaults_to_entry_level() {
        let result = classify("Data Engineer");
        assert_eq!(result.levels, vec![LevelTag::EntryLevel]);
        assert!(result.include);
    }

    #[test]
    fn test_seniority_marker_beats_early_career_marker() {
        let result = classify("Staff Data Engineer, New Grad Program");
        assert_eq!(result.levels, vec![LevelTag::NewGrad]);
        assert!(!result.include);
    }

    #[test]
    fn test_internal_does_not_match_intern() {
        let result = classify("Internal Tools Engineer");
        assert_eq!(result.levels, vec![LevelTag::EntryLevel]);

        let result = classify("Internal Communications");
        assert!(result.levels.is_empty());
        assert!(!result.include);
    }

    #[test]
    fn test_internship_matches_intern() {
        assert_eq!(levels("Summer Internship 2025"), vec![LevelTag::Intern]);
    }

    #[test]
    fn test_no_marker_and_no_role_noun_is_excluded() {
        let result = classify("Account Executive");
        assert!(result.levels.is_empty());
        assert!(!result.include);

        let result = classify("Barista");
        assert!(result.levels.is_empty());
        assert!(!result.include);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        assert_eq!(levels("NEW GRADUATE Software Developer"), vec![LevelTag::NewGrad]);
        assert_eq!(levels("entry-level analyst"), vec![LevelTag::EntryLevel]);
    }

    #[test]
    fn test_co_op_spellings() {
        for title in ["Co-op Engineer", "Co op Engineer", "Coop Engineer"] {
            assert_eq!(levels(title), vec![LevelTag::CoOp], "{title}");
        }
    }

    #[test]
    fn test_tags_follow_detection_order_without_duplicates() {
        let result = classify("Junior Associate Engineer, Entry Level, entry-level");
        assert_eq!(
            result.levels,
            vec![LevelTag::EntryLevel, LevelTag::Junior, LevelTag::Associate]
        );
        assert!(result.include);
    }

    #[test]
    fn test_explicit_marker_suppresses_default_entry_level() {
        let result = classify("Apprentice Developer");
        assert_eq!(result.levels, vec![LevelTag::Apprentice]);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let title = "Machine Learning Fellow / Research Intern";
        assert_eq!(classify(title), classify(title));
        assert_eq!(
            classify(title).levels,
            vec![LevelTag::Intern, LevelTag::Fellow]
        );
    }

    #[test]
    fn test_every_seniority_marker_excludes() {
        for title in [
            "Lead Engineer",
            "Principal Analyst",
            "Engineering Manager",
            "Director of Engineering",
            "Solutions Architect",
            "Head of Data",
            "Chief Engineer",
            "VP Engineering",
            "Sr. Developer",
        ] {
            let result = classify(title);
            assert!(!result.include, "{title} should be excluded");
            assert!(result.levels.is_empty(), "{title} should carry no tags");
        }
    }

    #[test]
    fn test_experience_requirement_excludes() {
        let result = classify("Backend Engineer (5+ years)");
        assert!(!result.include);
        assert!(classify("Backend Engineer (2 years)").include);
    }

    #[test]
    fn test_custom_policy_is_swappable() {
        let rules = [
            Rule {
                pattern: r"\bresident\b",
                kind: RuleKind::Marker(LevelTag::Fellow),
            },
            Rule {
                pattern: r"\bsenior\b",
                kind: RuleKind::Exclusion,
            },
        ];
        let policy = Policy::compile(&rules).unwrap();

        assert_eq!(
            policy.classify("AI Resident"),
            Classification {
                levels: vec![LevelTag::Fellow],
                include: true
            }
        );
        assert!(!policy.classify("Senior AI Resident").include);
        assert!(!policy.classify("Software Engineer").include);
    }

    #[test]
    fn test_format_levels() {
        assert_eq!(format_levels(&[]), "General");
        assert_eq!(
            format_levels(&[LevelTag::Intern, LevelTag::CoOp]),
            "Intern, Co-op"
        );
    }

    #[test]
    fn test_level_tag_serializes_as_label() {
        let json = serde_json::to_string(&[LevelTag::NewGrad, LevelTag::CoOp]).unwrap();
        assert_eq!(json, r#"["New Grad","Co-op"]"#);
    }
}
