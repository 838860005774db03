//! OutputHandle step: write generated outputs to a directory

use crate::workflow::{OutputMap, OutputStep, StepConfig, WorkflowStep};
use crate::{GreinaError, GreinaResult};
use std::path::PathBuf;

pub struct DiskWriter {
    directory: Option<PathBuf>,
}

impl DiskWriter {
    pub fn new() -> Self {
        Self { directory: None }
    }
}

impl Default for DiskWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowStep for DiskWriter {
    fn name(&self) -> &str {
        "Disk writer"
    }

    fn configure(&mut self, config: &StepConfig) -> GreinaResult<()> {
        self.directory = Some(PathBuf::from(config.require("output_dir")?));
        Ok(())
    }
}

impl OutputStep for DiskWriter {
    fn handle(&mut self, outputs: &OutputMap) -> GreinaResult<()> {
        let directory = self.directory.clone().ok_or_else(|| {
            GreinaError::Configuration("Disk writer was never configured".into())
        })?;
        std::fs::create_dir_all(&directory)?;

        for (name, content) in outputs {
            let path = directory.join(name);
            std::fs::write(&path, content)?;
            tracing::info!("Wrote {} ({} bytes)", path.display(), content.len());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_every_output() {
        let dir = tempfile::tempdir().unwrap();
        let mut step = DiskWriter::new();
        step.configure(&StepConfig::new().with("output_dir", dir.path().to_string_lossy()))
            .unwrap();

        let mut outputs = OutputMap::new();
        outputs.insert("report.json".into(), "{}".into());
        outputs.insert("notices.txt".into(), "NOTICE".into());
        step.handle(&outputs).unwrap();

        assert_eq!(std::fs::read_to_string(dir.path().join("report.json")).unwrap(), "{}");
        assert_eq!(std::fs::read_to_string(dir.path().join("notices.txt")).unwrap(), "NOTICE");
    }

    #[test]
    fn test_missing_output_dir_fails_fast() {
        let mut step = DiskWriter::new();
        assert!(step.configure(&StepConfig::new()).is_err());
    }
}
