use super::external::{ExternalTool, ToolError, score_call};
use super::{Invocation, MetricPlugin, MetricScores, PluginSkip};
use std::ffi::OsString;
use std::path::Path;

/// Output prefix passed to `-o`; barnaba appends `.<COMMAND>.out`.
const OUTPUT_PREFIX: &str = "bb";

/// Sub-metric name, barnaba sub-command and the flag carrying the native structure, in emission
/// order. ESCORE fits its potential on the structures given to `--ft`.
const COMMANDS: [(&str, &str, &str); 3] = [
    ("BARNABA-RMSD", "RMSD", "--ref"),
    ("BARNABA-eRMSD", "ERMSD", "--ref"),
    ("BARNABA-eSCORE", "ESCORE", "--ft"),
];

/// RMSD, eRMSD and eSCORE from the barnaba command line, one timed call per score.
#[derive(Debug, Clone)]
pub struct BarnabaPlugin {
    tool: ExternalTool,
}

impl BarnabaPlugin {
    pub fn new(barnaba: &Path) -> Self {
        Self {
            tool: ExternalTool::new(barnaba),
        }
    }

    /// The value of the last data row of a barnaba `.out` file. Comment rows start with `#`.
    pub fn parse_output(&self, content: &str) -> Result<f64, ToolError> {
        let row = content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .last()
            .ok_or_else(|| self.tool.parse_error("no data rows"))?;
        self.tool.last_token(row)
    }

    fn arguments(command: &str, reference_flag: &str, invocation: &Invocation<'_>) -> Vec<OsString> {
        let prefix = invocation.scratch_dir.join(OUTPUT_PREFIX);
        vec![
            OsString::from(command),
            OsString::from(reference_flag),
            invocation.reference.as_os_str().to_os_string(),
            OsString::from("--pdb"),
            invocation.candidate.as_os_str().to_os_string(),
            OsString::from("-o"),
            prefix.into_os_string(),
        ]
    }

    fn run(
        &self,
        command: &str,
        reference_flag: &str,
        invocation: &Invocation<'_>,
    ) -> Result<f64, ToolError> {
        self.tool.run(Self::arguments(command, reference_flag, invocation))?;
        let output_path = invocation
            .scratch_dir
            .join(format!("{}.{}.out", OUTPUT_PREFIX, command));
        let content =
            std::fs::read_to_string(&output_path).map_err(|e| ToolError::OutputFile {
                path: output_path.to_string_lossy().to_string(),
                source: e,
            })?;
        self.parse_output(&content)
    }
}

impl MetricPlugin for BarnabaPlugin {
    fn name(&self) -> &'static str {
        "BARNABA"
    }

    fn compute(&self, invocation: &Invocation<'_>) -> Result<MetricScores, PluginSkip> {
        let mut scores = MetricScores::new();
        for (name, command, reference_flag) in COMMANDS {
            scores.extend(score_call(name, &[name], || {
                Ok(vec![self.run(command, reference_flag, invocation)?])
            }));
        }
        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_output_skips_comments() {
        let plugin = BarnabaPlugin::new(Path::new("barnaba"));
        let content = "# Reference: native.pdb\n# frame eRMSD\nmodel.pdb 1.2345\n\n";
        assert_eq!(plugin.parse_output(content).unwrap(), 1.2345);
    }

    #[test]
    fn parse_output_without_rows_is_an_error() {
        let plugin = BarnabaPlugin::new(Path::new("barnaba"));
        assert!(plugin.parse_output("# header only\n").is_err());
    }

    #[test]
    fn escore_fits_on_the_native_structure() {
        let invocation = Invocation {
            candidate: Path::new("model.pdb"),
            reference: Path::new("native.pdb"),
            scratch_dir: Path::new("/scratch/c0-p9"),
        };
        let args_of = |command: &str| -> Vec<String> {
            let (_, _, flag) = COMMANDS.iter().find(|(_, c, _)| *c == command).unwrap();
            BarnabaPlugin::arguments(command, flag, &invocation)
                .into_iter()
                .map(|a| a.to_string_lossy().into_owned())
                .collect()
        };

        assert_eq!(
            args_of("ESCORE"),
            vec!["ESCORE", "--ft", "native.pdb", "--pdb", "model.pdb", "-o", "/scratch/c0-p9/bb"]
        );
        assert_eq!(args_of("RMSD")[1], "--ref");
        assert_eq!(args_of("ERMSD")[1], "--ref");
    }

    #[cfg(unix)]
    #[test]
    fn each_command_writes_its_own_output_file() {
        use crate::plugins::external::test_support::{fake_tool, touch_pdb};

        let dir = tempfile::tempdir().unwrap();
        // $1 is the command, $2 the reference flag and $7 the output prefix; ESCORE fails.
        let program = fake_tool(
            dir.path(),
            "barnaba",
            "case \"$1$2\" in\n\
             RMSD--ref) printf '# rmsd\\nm 2.5\\n' > \"$7.RMSD.out\" ;;\n\
             ERMSD--ref) printf '# ermsd\\nm 0.75\\n' > \"$7.ERMSD.out\" ;;\n\
             *) exit 1 ;;\n\
             esac",
        );
        let pdb = touch_pdb(dir.path(), "m.pdb");
        let scores = BarnabaPlugin::new(&program)
            .compute(&Invocation {
                candidate: &pdb,
                reference: &pdb,
                scratch_dir: dir.path(),
            })
            .unwrap();

        let names: Vec<&str> = scores.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["BARNABA-RMSD", "BARNABA-eRMSD", "BARNABA-eSCORE"]);
        assert_eq!(scores.get("BARNABA-RMSD"), Some(2.5));
        assert_eq!(scores.get("BARNABA-eRMSD"), Some(0.75));
        assert!(scores.get("BARNABA-eSCORE").unwrap().is_nan());
    }
}
