//! Metrics of the RNA-Puzzles assessment suite computed in-process: RMSD after optimal
//! superposition, its P-VALUE, the Interaction Network Fidelity and the Deformation Index.

use super::annotation::{Annotation, InteractionFilter, McAnnotate, interaction_network_fidelity};
use super::{Invocation, MetricPlugin, MetricScores, PluginSkip, read_structure, timed};
use crate::core::models::structure::Structure;
use crate::core::utils::geometry::superposed_rmsd;
use crate::core::utils::stats::normal_cdf;
use crate::engine::config::PValueSign;
use nalgebra::Point3;
use std::path::Path;
use tracing::debug;

/// Sequence lengths the RMSD/length fit was derived from (exclusive bounds).
const P_VALUE_TRUSTED_LENGTHS: (usize, usize) = (35, 161);

/// Parses the reference and the candidate, in that order.
fn load_pair(invocation: &Invocation<'_>) -> Result<(Structure, Structure), PluginSkip> {
    Ok((
        read_structure(invocation.reference)?,
        read_structure(invocation.candidate)?,
    ))
}

/// Heavy-atom coordinates paired residue by residue and atom name by atom name.
///
/// `None` when the structures do not have the same number of residues.
fn paired_coordinates(
    reference: &Structure,
    candidate: &Structure,
) -> Option<(Vec<Point3<f64>>, Vec<Point3<f64>>)> {
    if reference.residues().len() != candidate.residues().len() {
        return None;
    }
    let mut reference_coords = Vec::new();
    let mut candidate_coords = Vec::new();
    for (ref_residue, cand_residue) in reference.residues().iter().zip(candidate.residues()) {
        for atom in ref_residue.atoms().iter().filter(|a| !a.is_hydrogen()) {
            if let Some(matching) = cand_residue.atom(&atom.name) {
                reference_coords.push(atom.position);
                candidate_coords.push(matching.position);
            }
        }
    }
    Some((reference_coords, candidate_coords))
}

/// RMSD of the candidate superposed onto the reference, `None` when the structures cannot be
/// paired.
pub fn structure_rmsd(reference: &Structure, candidate: &Structure) -> Option<f64> {
    let (reference_coords, candidate_coords) = paired_coordinates(reference, candidate)?;
    superposed_rmsd(&candidate_coords, &reference_coords)
}

/// Probability of reaching `rmsd` by chance for a molecule of `length` nucleotides
/// (Hajdin et al., 2010).
pub fn p_value(rmsd: f64, length: usize, sign: PValueSign) -> f64 {
    let (a, b) = match sign {
        PValueSign::Minus => (6.4, 12.7),
        PValueSign::Plus => (5.1, 15.8),
    };
    let expected_rmsd = a * (length as f64).powf(0.41) - b;
    let z = (rmsd - expected_rmsd) / 1.8;
    normal_cdf(z)
}

#[derive(Debug, Clone, Default)]
pub struct RmsdPlugin;

impl RmsdPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl MetricPlugin for RmsdPlugin {
    fn name(&self) -> &'static str {
        "RMSD"
    }

    fn compute(&self, invocation: &Invocation<'_>) -> Result<MetricScores, PluginSkip> {
        let (reference, candidate) = load_pair(invocation)?;
        let (rmsd, elapsed) = timed(|| structure_rmsd(&reference, &candidate));
        if rmsd.is_none() {
            debug!(
                candidate = %invocation.candidate.display(),
                "RMSD undefined: residue counts differ or no atoms match"
            );
        }
        Ok(MetricScores::single(
            "RMSD",
            rmsd.unwrap_or(f64::NAN),
            elapsed,
        ))
    }
}

#[derive(Debug, Clone)]
pub struct PValuePlugin {
    sign: PValueSign,
}

impl PValuePlugin {
    pub fn new(sign: PValueSign) -> Self {
        Self { sign }
    }
}

impl MetricPlugin for PValuePlugin {
    fn name(&self) -> &'static str {
        "P-VALUE"
    }

    fn compute(&self, invocation: &Invocation<'_>) -> Result<MetricScores, PluginSkip> {
        let (reference, candidate) = load_pair(invocation)?;
        let (value, elapsed) = timed(|| {
            let length = reference.sequence().len();
            if length != candidate.sequence().len() {
                debug!("P-VALUE undefined: sequence lengths differ");
                return f64::NAN;
            }
            let (low, high) = P_VALUE_TRUSTED_LENGTHS;
            if length <= low || length >= high {
                debug!(
                    length,
                    "P-VALUE not trustable: length outside the range the fit was derived from"
                );
            }
            structure_rmsd(&reference, &candidate)
                .map_or(f64::NAN, |rmsd| p_value(rmsd, length, self.sign))
        });
        Ok(MetricScores::single("P-VALUE", value, elapsed))
    }
}

fn annotate_pair(
    annotator: &McAnnotate,
    invocation: &Invocation<'_>,
) -> Option<(Annotation, Annotation)> {
    let annotate = |path: &Path| {
        annotator
            .annotate(path)
            .map_err(|e| debug!(error = %e, "MC-Annotate failed"))
            .ok()
    };
    Some((annotate(invocation.reference)?, annotate(invocation.candidate)?))
}

const INF_SUB_METRICS: [(&str, InteractionFilter); 4] = [
    ("INF-ALL", InteractionFilter::All),
    ("INF-WC", InteractionFilter::Canonical),
    ("INF-NWC", InteractionFilter::NonCanonical),
    ("INF-STACK", InteractionFilter::Stacking),
];

#[derive(Debug, Clone)]
pub struct InfPlugin {
    annotator: McAnnotate,
}

impl InfPlugin {
    pub fn new(mc_annotate: &Path) -> Self {
        Self {
            annotator: McAnnotate::new(mc_annotate),
        }
    }
}

impl MetricPlugin for InfPlugin {
    fn name(&self) -> &'static str {
        "INF"
    }

    fn compute(&self, invocation: &Invocation<'_>) -> Result<MetricScores, PluginSkip> {
        load_pair(invocation)?;
        let (annotations, elapsed) = timed(|| annotate_pair(&self.annotator, invocation));

        let names = INF_SUB_METRICS.map(|(name, _)| name);
        let Some((reference, candidate)) = annotations else {
            return Ok(MetricScores::failed(&names, elapsed));
        };
        let values: Vec<f64> = INF_SUB_METRICS
            .iter()
            .map(|(_, filter)| {
                interaction_network_fidelity(&candidate, &reference, *filter).unwrap_or(f64::NAN)
            })
            .collect();
        Ok(MetricScores::from_shared_call(&names, &values, elapsed))
    }
}

#[derive(Debug, Clone)]
pub struct DiPlugin {
    annotator: McAnnotate,
}

impl DiPlugin {
    pub fn new(mc_annotate: &Path) -> Self {
        Self {
            annotator: McAnnotate::new(mc_annotate),
        }
    }
}

/// Deformation Index: RMSD scaled by the inverse of INF-ALL.
pub fn deformation_index(rmsd: f64, inf_all: f64) -> f64 {
    if rmsd.is_nan() || inf_all.is_nan() || inf_all == 0.0 {
        return f64::NAN;
    }
    rmsd / inf_all
}

impl MetricPlugin for DiPlugin {
    fn name(&self) -> &'static str {
        "DI"
    }

    fn compute(&self, invocation: &Invocation<'_>) -> Result<MetricScores, PluginSkip> {
        let (reference, candidate) = load_pair(invocation)?;
        let (di, elapsed) = timed(|| {
            let rmsd = structure_rmsd(&reference, &candidate).unwrap_or(f64::NAN);
            let inf_all = annotate_pair(&self.annotator, invocation)
                .and_then(|(ref_ann, cand_ann)| {
                    interaction_network_fidelity(&cand_ann, &ref_ann, InteractionFilter::All)
                })
                .unwrap_or(f64::NAN);
            let di = deformation_index(rmsd, inf_all);
            if di.is_nan() {
                debug!(rmsd, inf_all, "DI undefined");
            }
            di
        });
        Ok(MetricScores::single("DI", di, elapsed))
    }
}
