//! Base-pair and stacking annotations produced by MC-Annotate, and the Interaction Network
//! Fidelity computed from them.

use super::external::{ExternalTool, ToolError};
use std::collections::HashSet;
use std::path::Path;

/// Nucleotide pairs forming canonical (Watson-Crick and wobble) base pairs.
const CANONICAL_PAIRS: [(&str, &str); 6] = [
    ("G", "C"),
    ("C", "G"),
    ("A", "U"),
    ("U", "A"),
    ("G", "U"),
    ("U", "G"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    /// Cis Watson-Crick/Watson-Crick pairing between canonical partners.
    CanonicalPair,
    NonCanonicalPair,
    Stacking,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Interaction {
    pub kind: InteractionKind,
    pub first: String,
    pub second: String,
    /// Faces and orientation for pairs, stacking direction for stackings.
    pub descriptor: String,
}

/// Which interactions an INF value is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionFilter {
    All,
    Canonical,
    NonCanonical,
    Stacking,
}

impl InteractionFilter {
    fn accepts(self, kind: InteractionKind) -> bool {
        match self {
            InteractionFilter::All => true,
            InteractionFilter::Canonical => kind == InteractionKind::CanonicalPair,
            InteractionFilter::NonCanonical => kind == InteractionKind::NonCanonicalPair,
            InteractionFilter::Stacking => kind == InteractionKind::Stacking,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Other,
    Stackings,
    BasePairs,
}

/// The interactions found in one structure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotation {
    interactions: HashSet<Interaction>,
}

/// Splits `A12-A13` into its two residue labels.
///
/// The separator is the first `-` not followed by a digit, so negative residue numbers such as
/// `A-1` stay attached to their chain.
fn split_residue_pair(token: &str) -> Option<(String, String)> {
    let bytes = token.as_bytes();
    let split = (1..bytes.len()).find(|&i| {
        bytes[i] == b'-' && bytes.get(i + 1).is_some_and(|next| !next.is_ascii_digit())
    })?;
    let (first, second) = (&token[..split], &token[split + 1..]);
    if first.is_empty() || second.is_empty() {
        return None;
    }
    Some((first.to_string(), second.to_string()))
}

fn parse_stacking(residues: &str, detail: &str) -> Option<Interaction> {
    let (first, second) = split_residue_pair(residues)?;
    let descriptor = detail.split_whitespace().last()?.to_string();
    Some(Interaction {
        kind: InteractionKind::Stacking,
        first,
        second,
        descriptor,
    })
}

fn parse_base_pair(residues: &str, detail: &str) -> Option<Interaction> {
    let (first, second) = split_residue_pair(residues)?;
    let tokens: Vec<&str> = detail.split_whitespace().collect();
    let nucleotides = tokens.first()?.split_once('-');
    let faces = tokens.get(1).filter(|t| t.contains('/')).copied();
    let orientation = tokens
        .iter()
        .find(|t| **t == "cis" || **t == "trans")
        .copied()
        .unwrap_or("");

    let canonical = faces == Some("Ww/Ww")
        && orientation == "cis"
        && nucleotides.is_some_and(|pair| CANONICAL_PAIRS.contains(&pair));

    let descriptor = match faces {
        Some(faces) => format!("{} {}", faces, orientation).trim_end().to_string(),
        None => tokens.get(1..).map(|rest| rest.join(" ")).unwrap_or_default(),
    };

    Some(Interaction {
        kind: if canonical {
            InteractionKind::CanonicalPair
        } else {
            InteractionKind::NonCanonicalPair
        },
        first,
        second,
        descriptor,
    })
}

impl Annotation {
    /// Parses the standard output of MC-Annotate.
    ///
    /// Only the stacking and base-pair sections are read; malformed entries are ignored.
    pub fn parse(output: &str) -> Self {
        let mut section = Section::Other;
        let mut interactions = HashSet::new();

        for line in output.lines() {
            let trimmed = line.trim();
            if trimmed.ends_with("---") || trimmed.starts_with("Number of") {
                section = if trimmed.starts_with("Adjacent stackings")
                    || trimmed.starts_with("Non-Adjacent stackings")
                {
                    Section::Stackings
                } else if trimmed.starts_with("Base-pairs") {
                    Section::BasePairs
                } else {
                    Section::Other
                };
                continue;
            }
            let Some((residues, detail)) = trimmed.split_once(" : ") else {
                continue;
            };
            let parsed = match section {
                Section::Stackings => parse_stacking(residues.trim(), detail),
                Section::BasePairs => parse_base_pair(residues.trim(), detail),
                Section::Other => None,
            };
            if let Some(interaction) = parsed {
                interactions.insert(interaction);
            }
        }
        Self { interactions }
    }

    pub fn len(&self) -> usize {
        self.interactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty()
    }

    pub fn filtered(&self, filter: InteractionFilter) -> HashSet<&Interaction> {
        self.interactions
            .iter()
            .filter(|i| filter.accepts(i.kind))
            .collect()
    }
}

/// Interaction Network Fidelity: `sqrt(PPV * STY)` of the predicted interactions against the
/// reference ones.
///
/// `None` when undefined, that is when nothing matches and either side has no interaction.
pub fn interaction_network_fidelity(
    predicted: &Annotation,
    reference: &Annotation,
    filter: InteractionFilter,
) -> Option<f64> {
    let predicted = predicted.filtered(filter);
    let reference = reference.filtered(filter);

    let true_positives = predicted.intersection(&reference).count() as f64;
    let false_positives = predicted.len() as f64 - true_positives;
    let false_negatives = reference.len() as f64 - true_positives;

    if true_positives == 0.0 && (false_positives == 0.0 || false_negatives == 0.0) {
        return None;
    }
    let ppv = true_positives / (true_positives + false_positives);
    let sensitivity = true_positives / (true_positives + false_negatives);
    Some((ppv * sensitivity).sqrt())
}

/// Runs MC-Annotate on structure files.
#[derive(Debug, Clone)]
pub struct McAnnotate {
    tool: ExternalTool,
}

impl McAnnotate {
    pub fn new(program: &Path) -> Self {
        Self {
            tool: ExternalTool::new(program),
        }
    }

    pub fn annotate(&self, structure: &Path) -> Result<Annotation, ToolError> {
        let output = self.tool.run([structure])?;
        Ok(Annotation::parse(&output))
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// A trimmed MC-Annotate report: one helix of three canonical pairs closed by a
    /// non-canonical pair, with adjacent stackings along both strands.
    pub const HAIRPIN: &str = "\
Residue conformations -------------------------------------------
A1 : G C3p_endo anti
A2 : G C3p_endo anti
Adjacent stackings ----------------------------------------------
A1-A2 : adjacent_5p upward
A2-A3 : adjacent_5p upward
A10-A11 : adjacent_5p upward
Non-Adjacent stackings ------------------------------------------
A3-A10 : inward
Number of stackings = 4
Number of adjacent stackings = 3
Number of non adjacent stackings = 1
Base-pairs ------------------------------------------------------
A1-A12 : G-C Ww/Ww pairing antiparallel cis XIX
A2-A11 : G-U Ww/Ww pairing antiparallel cis XXVIII
A3-A10 : C-G Ww/Ww pairing antiparallel cis XIX
A4-A9 : U-A Ww/Hh pairing parallel trans XXIII
A5-A8 : G-A O2'/Bh adjacent_5p pairing
Residue conformations -------------------------------------------
";

    /// The same helix with a shifted closing pair and one stacking missing.
    pub const SHIFTED: &str = "\
Adjacent stackings ----------------------------------------------
A1-A2 : adjacent_5p upward
A2-A3 : adjacent_5p upward
Base-pairs ------------------------------------------------------
A1-A12 : G-C Ww/Ww pairing antiparallel cis XIX
A2-A11 : G-U Ww/Ww pairing antiparallel cis XXVIII
A3-A9 : C-A Ww/Ww pairing antiparallel cis
A4-A9 : U-A Ww/Hh pairing parallel trans XXIII
";
}
