use crate::session::{AnalysisRun, Notice, SectionOutcome};
use crate::types::AnalysisOption;
use anyhow::Result;
use chrono::Local;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Everything one CLI run produced, for `--json` output and report files.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Timestamp when the report was generated
    pub generated_at: String,
    /// Path to the input file
    pub input_file: String,
    /// Shape of the uploaded table, if one was loaded
    pub shape: Option<(usize, usize)>,
    /// Options that were selected, in execution order
    pub options: Vec<AnalysisOption>,
    /// Run-level notices (no data, not started)
    pub notices: Vec<Notice>,
    pub sections: Vec<SectionOutcome>,
}

impl AnalysisReport {
    pub fn build(
        input_file: &str,
        shape: Option<(usize, usize)>,
        options: &[AnalysisOption],
        run: AnalysisRun,
    ) -> Self {
        Self {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_file: input_file.to_string(),
            shape,
            options: options.to_vec(),
            notices: run.notices,
            sections: run.sections,
        }
    }

    /// Number of sections that failed.
    pub fn failure_count(&self) -> usize {
        self.sections.iter().filter(|s| s.is_failure()).count()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report as `<dir>/<base_name>_report.json`.
    pub fn write_to_file(&self, dir: &Path, base_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;

        let path = dir.join(format!("{}_report.json", base_name));
        let mut file = File::create(&path)?;
        file.write_all(self.to_json()?.as_bytes())?;

        info!("Report saved: {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Section;
    use crate::types::TablePreview;

    fn run() -> AnalysisRun {
        AnalysisRun {
            notices: Vec::new(),
            sections: vec![
                SectionOutcome {
                    option: AnalysisOption::RawData,
                    section: Some(Section::RawData {
                        table: TablePreview {
                            columns: vec!["a".to_string()],
                            dtypes: vec!["i64".to_string()],
                            total_rows: 1,
                            rows: vec![vec![Some("1".to_string())]],
                        },
                    }),
                    notices: Vec::new(),
                },
                SectionOutcome {
                    option: AnalysisOption::ColumnView,
                    section: None,
                    notices: vec![Notice::Failed {
                        code: "UNSUPPORTED_OPERATION".to_string(),
                        message: "Box Plot is only available for numeric columns".to_string(),
                    }],
                },
            ],
        }
    }

    #[test]
    fn test_report_json_shape() {
        let report = AnalysisReport::build(
            "data.csv",
            Some((1, 1)),
            &[AnalysisOption::RawData, AnalysisOption::ColumnView],
            run(),
        );
        assert_eq!(report.failure_count(), 1);

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["input_file"], "data.csv");
        assert_eq!(json["options"][0], "raw_data");
        assert_eq!(json["sections"][0]["section"]["section"], "raw_data");
        assert_eq!(json["sections"][1]["notices"][0]["notice"], "failed");
        assert_eq!(
            json["sections"][1]["notices"][0]["code"],
            "UNSUPPORTED_OPERATION"
        );
    }

    #[test]
    fn test_write_to_file() {
        let dir = std::env::temp_dir().join(format!("lex-explore-report-{}", std::process::id()));
        let report = AnalysisReport::build("data.csv", None, &[], run());
        let path = report.write_to_file(&dir, "data").unwrap();

        assert!(path.ends_with("data_report.json"));
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"generated_at\""));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
