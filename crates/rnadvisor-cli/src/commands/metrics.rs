use crate::error::Result;
use rnadvisor::engine::registry::{MetricGroup, MetricKind};

pub async fn run() -> Result<()> {
    for line in catalogue_lines() {
        println!("{}", line);
    }
    Ok(())
}

fn catalogue_lines() -> Vec<String> {
    let mut lines = vec![format!("{:<16} {:<18} {}", "METRIC", "GROUPS", "COLUMNS")];
    lines.extend(MetricKind::ALL.iter().map(|kind| {
        let groups = std::iter::once(MetricGroup::All)
            .chain(kind.groups())
            .map(MetricGroup::name)
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "{:<16} {:<18} {}",
            kind.name(),
            groups,
            kind.sub_metrics().join(", ")
        )
    }));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_metric_is_listed_once_with_its_groups() {
        let lines = catalogue_lines();
        assert_eq!(lines.len(), MetricKind::ALL.len() + 1);

        let barnaba = lines.iter().find(|l| l.starts_with("BARNABA ")).unwrap();
        assert!(barnaba.contains("ALL,METRICS,ENERGIES"));
        assert!(barnaba.contains("BARNABA-eRMSD"));

        let dfire = lines.iter().find(|l| l.starts_with("DFIRE ")).unwrap();
        assert!(dfire.contains("ALL,ENERGIES"));
        assert!(!dfire.contains("METRICS"));
    }
}
