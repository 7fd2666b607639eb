use super::{Invocation, MetricPlugin, MetricScores, PluginSkip, read_structure, timed};
use crate::core::models::structure::Structure;
use crate::core::utils::geometry::distance;
use crate::core::utils::stats::round_to;
use nalgebra::Point3;
use tracing::debug;

/// Inter-chain atom pairs closer than this overlap.
pub const CLASH_DISTANCE: f64 = 2.0;
/// Inter-chain atom pairs closer than this are in contact.
pub const CONTACT_DISTANCE: f64 = 4.0;

const FIRST_CHAIN: char = 'A';
const SECOND_CHAIN: char = 'B';

fn chain_positions(structure: &Structure, chain: char) -> Vec<Point3<f64>> {
    structure
        .residues()
        .iter()
        .filter(|r| r.chain_id == chain)
        .flat_map(|r| r.atoms().iter().filter(|a| !a.hetero).map(|a| a.position))
        .collect()
}

/// Fraction of contacting atoms of the smaller of chains A and B that overlap the other chain,
/// rounded to three decimals.
///
/// When no atom is in contact the raw overlap count (zero) is returned.
pub fn clash_fraction(structure: &Structure) -> f64 {
    let first = chain_positions(structure, FIRST_CHAIN);
    let second = chain_positions(structure, SECOND_CHAIN);
    let (less, more) = if first.len() > second.len() {
        (second, first)
    } else {
        (first, second)
    };

    let mut overlaps = 0usize;
    let mut contacts = 0usize;
    for atom in &less {
        let nearest = more
            .iter()
            .map(|other| distance(atom, other))
            .fold(f64::INFINITY, f64::min);
        if nearest <= CLASH_DISTANCE {
            overlaps += 1;
            contacts += 1;
        } else if nearest <= CONTACT_DISTANCE {
            contacts += 1;
        }
    }

    if contacts == 0 {
        debug!(overlaps, "No inter-chain contacts, reporting the overlap count");
        return overlaps as f64;
    }
    round_to(overlaps as f64 / contacts as f64, 3)
}

/// Clash score of the candidate alone; the reference is not used.
#[derive(Debug, Clone, Default)]
pub struct ClashPlugin;

impl ClashPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl MetricPlugin for ClashPlugin {
    fn name(&self) -> &'static str {
        "CLASH"
    }

    fn compute(&self, invocation: &Invocation<'_>) -> Result<MetricScores, PluginSkip> {
        let structure = read_structure(invocation.candidate)?;
        let (value, elapsed) = timed(|| clash_fraction(&structure));
        Ok(MetricScores::single("CLASH", value, elapsed))
    }
}
