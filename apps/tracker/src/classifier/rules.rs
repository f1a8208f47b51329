use super::LevelTag;

/// What a matching rule contributes to a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// Explicit early-career marker.
    Marker(LevelTag),
    /// Generic role noun eligible for the default `Entry Level` tag.
    RoleNoun,
    /// Seniority marker. Any match excludes the posting.
    Exclusion,
}

#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub pattern: &'static str,
    pub kind: RuleKind,
}

const fn marker(pattern: &'static str, tag: LevelTag) -> Rule {
    Rule {
        pattern,
        kind: RuleKind::Marker(tag),
    }
}

const fn exclusion(pattern: &'static str) -> Rule {
    Rule {
        pattern,
        kind: RuleKind::Exclusion,
    }
}

/// Markers are listed in detection order, which is also the order tags are reported in.
pub const EARLY_CAREER_RULES: &[Rule] = &[
    marker(r"\bintern(ship)?s?\b", LevelTag::Intern),
    marker(r"\bnew\s+grad(uate)?s?\b", LevelTag::NewGrad),
    marker(r"\bentry[\s-]level\b", LevelTag::EntryLevel),
    marker(r"\bjunior\b", LevelTag::Junior),
    marker(r"\bassociates?\b", LevelTag::Associate),
    marker(r"\bapprentice(ship)?s?\b", LevelTag::Apprentice),
    marker(r"\bfellow(ship)?s?\b", LevelTag::Fellow),
    marker(r"\bco[\s-]?op\b", LevelTag::CoOp),
    Rule {
        pattern: r"\b(engineer|developer|analyst|specialist|coordinator)s?\b",
        kind: RuleKind::RoleNoun,
    },
    exclusion(
        r"\b(senior|sr|staff|principal|lead|manager|director|architect|head|chief|vp|executive)\b",
    ),
    exclusion(r"\b([5-9]|10)\+?\s*(years?|yrs?)\b"),
];
