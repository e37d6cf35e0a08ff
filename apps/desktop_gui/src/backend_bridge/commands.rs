//! Backend commands queued from UI to backend worker.

use shared::domain::{ExportFormat, FollowUpStep};
use std::path::PathBuf;

pub enum BackendCommand {
    GenerateScreenplay {
        story: String,
        genre: String,
    },
    GenerateFollowUp {
        step: FollowUpStep,
    },
    ExportBible {
        format: ExportFormat,
        destination: PathBuf,
    },
}
