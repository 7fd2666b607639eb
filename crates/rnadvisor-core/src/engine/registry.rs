use super::config::ToolConfig;
use crate::plugins::MetricPlugin;
use crate::plugins::barnaba::BarnabaPlugin;
use crate::plugins::clash::ClashPlugin;
use crate::plugins::energies::{CgRnaspPlugin, DfirePlugin, RaspPlugin, RsRnaspPlugin};
use crate::plugins::mcq4structures::{LcsTaPlugin, McqPlugin};
use crate::plugins::openstructure::OstPlugin;
use crate::plugins::rna_assessment::{DiPlugin, InfPlugin, PValuePlugin, RmsdPlugin};
use crate::plugins::tb_mcq::TbMcqPlugin;
use crate::plugins::voronota::CadPlugin;
use crate::plugins::zhanggroup::{GdtTsPlugin, TmScorePlugin};
use itertools::Itertools;
use phf::{Map, phf_map};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

/// Every scoring method known to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricKind {
    Rmsd,
    PValue,
    Inf,
    Di,
    Mcq,
    GdtTs,
    Cad,
    Rasp,
    Clash,
    Barnaba,
    Dfire,
    RsRnasp,
    Lddt,
    TmScoreOst,
    TmScore,
    QsScore,
    LcsTa,
    CgRnasp,
    TbMcq,
}

static METRIC_NAMES: Map<&'static str, MetricKind> = phf_map! {
    "RMSD" => MetricKind::Rmsd,
    "P-VALUE" => MetricKind::PValue,
    "INF" => MetricKind::Inf,
    "DI" => MetricKind::Di,
    "MCQ" => MetricKind::Mcq,
    "GDT-TS" => MetricKind::GdtTs,
    "CAD" => MetricKind::Cad,
    "RASP" => MetricKind::Rasp,
    "CLASH" => MetricKind::Clash,
    "BARNABA" => MetricKind::Barnaba,
    "DFIRE" => MetricKind::Dfire,
    "rsRNASP" => MetricKind::RsRnasp,
    "lDDT" => MetricKind::Lddt,
    "TM-SCORE (OST)" => MetricKind::TmScoreOst,
    "TM-SCORE" => MetricKind::TmScore,
    "QS-SCORE" => MetricKind::QsScore,
    "LCS-TA" => MetricKind::LcsTa,
    "CGRNASP" => MetricKind::CgRnasp,
    "TB-MCQ" => MetricKind::TbMcq,
};

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown metric name: '{0}'")]
pub struct UnknownMetricError(pub String);

impl MetricKind {
    /// All registered metrics in declaration order.
    pub const ALL: [MetricKind; 19] = [
        MetricKind::Rmsd,
        MetricKind::PValue,
        MetricKind::Inf,
        MetricKind::Di,
        MetricKind::Mcq,
        MetricKind::GdtTs,
        MetricKind::Cad,
        MetricKind::Rasp,
        MetricKind::Clash,
        MetricKind::Barnaba,
        MetricKind::Dfire,
        MetricKind::RsRnasp,
        MetricKind::Lddt,
        MetricKind::TmScoreOst,
        MetricKind::TmScore,
        MetricKind::QsScore,
        MetricKind::LcsTa,
        MetricKind::CgRnasp,
        MetricKind::TbMcq,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MetricKind::Rmsd => "RMSD",
            MetricKind::PValue => "P-VALUE",
            MetricKind::Inf => "INF",
            MetricKind::Di => "DI",
            MetricKind::Mcq => "MCQ",
            MetricKind::GdtTs => "GDT-TS",
            MetricKind::Cad => "CAD",
            MetricKind::Rasp => "RASP",
            MetricKind::Clash => "CLASH",
            MetricKind::Barnaba => "BARNABA",
            MetricKind::Dfire => "DFIRE",
            MetricKind::RsRnasp => "rsRNASP",
            MetricKind::Lddt => "lDDT",
            MetricKind::TmScoreOst => "TM-SCORE (OST)",
            MetricKind::TmScore => "TM-SCORE",
            MetricKind::QsScore => "QS-SCORE",
            MetricKind::LcsTa => "LCS-TA",
            MetricKind::CgRnasp => "CGRNASP",
            MetricKind::TbMcq => "TB-MCQ",
        }
    }

    /// Report columns the plugin emits, in emission order.
    pub fn sub_metrics(self) -> &'static [&'static str] {
        match self {
            MetricKind::Rmsd => &["RMSD"],
            MetricKind::PValue => &["P-VALUE"],
            MetricKind::Inf => &["INF-ALL", "INF-WC", "INF-NWC", "INF-STACK"],
            MetricKind::Di => &["DI"],
            MetricKind::Mcq => &["MCQ"],
            MetricKind::GdtTs => &["GDT-TS", "GDT-TS@1", "GDT-TS@2", "GDT-TS@4", "GDT-TS@8"],
            MetricKind::Cad => &["CAD"],
            MetricKind::Rasp => &["RASP-ENERGY", "RASP-NB-CONTACTS", "RASP-NORMALIZED-ENERGY"],
            MetricKind::Clash => &["CLASH"],
            MetricKind::Barnaba => &["BARNABA-RMSD", "BARNABA-eRMSD", "BARNABA-eSCORE"],
            MetricKind::Dfire => &["DFIRE"],
            MetricKind::RsRnasp => &["rsRNASP"],
            MetricKind::Lddt => &["lDDT"],
            MetricKind::TmScoreOst => &["TM-score (OST)"],
            MetricKind::TmScore => &["TM-score"],
            MetricKind::QsScore => &["QS-score"],
            MetricKind::LcsTa => &["LCS-TA-COVERAGE", "LCS-TA-RESIDUES"],
            MetricKind::CgRnasp => &["cgRNASP", "cgRNASP-C", "cgRNASP-PC"],
            MetricKind::TbMcq => &["TB-MCQ"],
        }
    }

    /// Groups (other than `ALL`) the metric belongs to.
    pub fn groups(self) -> Vec<MetricGroup> {
        [MetricGroup::Metrics, MetricGroup::Energies]
            .into_iter()
            .filter(|g| g.members().contains(&self))
            .collect()
    }

    /// Instantiates the plugin from the run's tool configuration.
    pub fn build(self, tools: &ToolConfig) -> Box<dyn MetricPlugin> {
        match self {
            MetricKind::Rmsd => Box::new(RmsdPlugin::new()),
            MetricKind::PValue => Box::new(PValuePlugin::new(tools.p_value_sign)),
            MetricKind::Inf => Box::new(InfPlugin::new(&tools.mc_annotate)),
            MetricKind::Di => Box::new(DiPlugin::new(&tools.mc_annotate)),
            MetricKind::Mcq => Box::new(McqPlugin::new(&tools.mcq_local, tools.mcq_mode)),
            MetricKind::GdtTs => Box::new(GdtTsPlugin::new(&tools.tm_score)),
            MetricKind::Cad => Box::new(CadPlugin::new(&tools.cad_score)),
            MetricKind::Rasp => Box::new(RaspPlugin::new(&tools.rasp)),
            MetricKind::Clash => Box::new(ClashPlugin::new()),
            MetricKind::Barnaba => Box::new(BarnabaPlugin::new(&tools.barnaba)),
            MetricKind::Dfire => Box::new(DfirePlugin::new(&tools.dfire)),
            MetricKind::RsRnasp => Box::new(RsRnaspPlugin::new(&tools.rs_rnasp)),
            MetricKind::Lddt => Box::new(OstPlugin::lddt(&tools.ost)),
            MetricKind::TmScoreOst => Box::new(OstPlugin::tm_score(&tools.ost)),
            MetricKind::TmScore => Box::new(TmScorePlugin::new(&tools.us_align)),
            MetricKind::QsScore => Box::new(OstPlugin::qs_score(&tools.ost)),
            MetricKind::LcsTa => Box::new(LcsTaPlugin::new(&tools.mcq_lcs, tools.lcs_threshold)),
            MetricKind::CgRnasp => Box::new(CgRnaspPlugin::new(&tools.cg_rnasp_dir)),
            MetricKind::TbMcq => Box::new(TbMcqPlugin::new(&tools.tb_mcq)),
        }
    }
}

impl FromStr for MetricKind {
    type Err = UnknownMetricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        METRIC_NAMES
            .get(s.trim())
            .copied()
            .ok_or_else(|| UnknownMetricError(s.trim().to_string()))
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Named selections expanding to a fixed, ordered list of metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricGroup {
    All,
    Metrics,
    Energies,
}

static GROUP_NAMES: Map<&'static str, MetricGroup> = phf_map! {
    "ALL" => MetricGroup::All,
    "METRICS" => MetricGroup::Metrics,
    "ENERGIES" => MetricGroup::Energies,
};

const METRICS_GROUP: [MetricKind; 13] = [
    MetricKind::Rmsd,
    MetricKind::PValue,
    MetricKind::Inf,
    MetricKind::Di,
    MetricKind::Mcq,
    MetricKind::TmScore,
    MetricKind::Cad,
    MetricKind::Barnaba,
    MetricKind::Clash,
    MetricKind::GdtTs,
    MetricKind::Lddt,
    MetricKind::QsScore,
    MetricKind::LcsTa,
];

const ENERGIES_GROUP: [MetricKind; 6] = [
    MetricKind::Barnaba,
    MetricKind::Dfire,
    MetricKind::RsRnasp,
    MetricKind::Rasp,
    MetricKind::CgRnasp,
    MetricKind::TbMcq,
];

impl MetricGroup {
    pub fn name(self) -> &'static str {
        match self {
            MetricGroup::All => "ALL",
            MetricGroup::Metrics => "METRICS",
            MetricGroup::Energies => "ENERGIES",
        }
    }

    pub fn members(self) -> &'static [MetricKind] {
        match self {
            MetricGroup::All => &MetricKind::ALL,
            MetricGroup::Metrics => &METRICS_GROUP,
            MetricGroup::Energies => &ENERGIES_GROUP,
        }
    }

    pub fn lookup(name: &str) -> Option<Self> {
        GROUP_NAMES.get(name.trim()).copied()
    }
}

/// Resolves selection tokens into an ordered, duplicate-free list of metrics.
///
/// Group aliases expand in place and unknown tokens are dropped with a warning.
pub fn resolve<S: AsRef<str>>(tokens: &[S]) -> Vec<MetricKind> {
    tokens
        .iter()
        .map(|t| t.as_ref().trim())
        .filter(|t| !t.is_empty())
        .flat_map(|token| {
            if let Some(group) = MetricGroup::lookup(token) {
                return group.members().to_vec();
            }
            match token.parse::<MetricKind>() {
                Ok(kind) => vec![kind],
                Err(e) => {
                    warn!(token, "{}, ignoring it", e);
                    Vec::new()
                }
            }
        })
        .unique()
        .collect()
}

/// Builds one plugin per resolved metric, in resolution order.
pub fn build_plugins(kinds: &[MetricKind], tools: &ToolConfig) -> Vec<Box<dyn MetricPlugin>> {
    kinds.iter().map(|kind| kind.build(tools)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn all_expands_to_every_registered_metric_in_order() {
        assert_eq!(resolve(&["ALL"]), MetricKind::ALL.to_vec());
        assert_eq!(METRIC_NAMES.len(), MetricKind::ALL.len());
    }

    #[test]
    fn names_round_trip_through_the_lookup_table() {
        for kind in MetricKind::ALL {
            assert_eq!(kind.name().parse::<MetricKind>(), Ok(kind));
            assert_eq!(kind.to_string(), kind.name());
        }
    }

    #[test]
    fn groups_only_contain_registered_metrics_without_duplicates() {
        for group in [MetricGroup::Metrics, MetricGroup::Energies] {
            let members = group.members();
            let unique: HashSet<_> = members.iter().collect();
            assert_eq!(unique.len(), members.len(), "{} has duplicates", group.name());
            assert!(members.iter().all(|m| MetricKind::ALL.contains(m)));
        }
    }

    #[test]
    fn group_names_are_not_metric_names() {
        for name in ["ALL", "METRICS", "ENERGIES"] {
            assert!(name.parse::<MetricKind>().is_err());
            assert!(MetricGroup::lookup(name).is_some());
        }
    }

    #[test]
    fn aliases_expand_in_place_and_duplicates_keep_first_occurrence() {
        let resolved = resolve(&["DFIRE", "ENERGIES", "RMSD", "DFIRE"]);
        assert_eq!(
            resolved,
            vec![
                MetricKind::Dfire,
                MetricKind::Barnaba,
                MetricKind::RsRnasp,
                MetricKind::Rasp,
                MetricKind::CgRnasp,
                MetricKind::TbMcq,
                MetricKind::Rmsd,
            ]
        );
    }

    #[test]
    fn unknown_tokens_are_dropped() {
        let resolved = resolve(&["RMSD", "NOT-A-METRIC", " INF ", ""]);
        assert_eq!(resolved, vec![MetricKind::Rmsd, MetricKind::Inf]);
    }

    #[test]
    fn overlapping_groups_resolve_without_duplicates() {
        let resolved = resolve(&["METRICS", "ENERGIES"]);
        let unique: HashSet<_> = resolved.iter().collect();
        assert_eq!(unique.len(), resolved.len());
        assert_eq!(resolved.len(), 18);
        assert_eq!(resolved[0], MetricKind::Rmsd);
    }

    #[test]
    fn names_are_case_sensitive() {
        assert!("rmsd".parse::<MetricKind>().is_err());
        assert_eq!("rsRNASP".parse::<MetricKind>(), Ok(MetricKind::RsRnasp));
    }

    #[test]
    fn barnaba_belongs_to_both_groups() {
        assert_eq!(
            MetricKind::Barnaba.groups(),
            vec![MetricGroup::Metrics, MetricGroup::Energies]
        );
        assert!(MetricKind::TmScoreOst.groups().is_empty());
    }

    #[test]
    fn built_plugins_report_their_registry_name() {
        let tools = ToolConfig::default();
        let plugins = build_plugins(&MetricKind::ALL, &tools);
        for (kind, plugin) in MetricKind::ALL.iter().zip(plugins.iter()) {
            assert_eq!(plugin.name(), kind.name());
        }
    }
}
