//! Session-scoped merge orchestration
//!
//! Holds the two file selections and the merged artifact, and drives a
//! [`MergeView`] as they change. A merge runs in two halves so the host can
//! read file contents asynchronously in between without holding a borrow:
//!
//! 1. [`MergeOrchestrator::begin_merge`] validates and returns a [`MergeTicket`]
//! 2. the host reads both files named by the ticket
//! 3. [`MergeOrchestrator::complete_merge`] (or [`MergeOrchestrator::fail_merge`])

use crate::engine::PdfEngine;
use crate::error::MergeError;
use crate::merge::merge_pair;
use crate::naming::merged_file_name;
use crate::view::{MergeView, StatusLevel};
use crate::Slot;
use std::error::Error as _;
use tracing::{error, info, warn};

pub const STATUS_LOADED: &str = "Ready. Select two PDFs, then click Merge.";
pub const STATUS_SELECT_BOTH: &str = "Please select both PDFs (PDF 1 and PDF 2).";
pub const STATUS_READY: &str = "Ready to merge. Click Merge.";
pub const STATUS_MERGING: &str = "Merging PDFs…";
pub const STATUS_NOTHING_TO_DOWNLOAD: &str = "Nothing to download yet. Click Merge first.";
pub const LOG_LOADED: &str = "Merge script loaded.";

/// A file chosen in one of the two inputs
pub trait SelectedFile: Clone {
    fn name(&self) -> String;
}

/// Bytes and name produced by a successful merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedArtifact {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub page_count: u32,
}

/// Proof that a merge was started, carrying the files to read
#[derive(Debug, Clone)]
pub struct MergeTicket<F> {
    id: u64,
    pub first: F,
    pub second: F,
}

impl<F> MergeTicket<F> {
    pub fn id(&self) -> u64 {
        self.id
    }
}

pub struct MergeOrchestrator<E, V, F> {
    engine: E,
    view: V,
    first: Option<F>,
    second: Option<F>,
    artifact: Option<MergedArtifact>,
    in_flight: Option<u64>,
    next_ticket: u64,
}

impl<E, V, F> MergeOrchestrator<E, V, F>
where
    E: PdfEngine,
    V: MergeView,
    F: SelectedFile,
{
    pub fn new(engine: E, view: V) -> Self {
        Self {
            engine,
            view,
            first: None,
            second: None,
            artifact: None,
            in_flight: None,
            next_ticket: 0,
        }
    }

    /// Initial status and log line, then a selection refresh
    pub fn start(&mut self) {
        self.view.set_status(STATUS_LOADED, StatusLevel::Info);
        self.view.append_log(LOG_LOADED);
        self.refresh_selection();
    }

    pub fn select(&mut self, slot: Slot, file: Option<F>) {
        match slot {
            Slot::First => self.first = file,
            Slot::Second => self.second = file,
        }
        self.refresh_selection();
    }

    pub fn both_selected(&self) -> bool {
        self.first.is_some() && self.second.is_some()
    }

    pub fn refresh_selection(&mut self) {
        if !self.both_selected() {
            self.view.set_status(STATUS_SELECT_BOTH, StatusLevel::Warn);
            self.view.set_download_enabled(false);
            return;
        }
        self.view.set_status(STATUS_READY, StatusLevel::Info);
    }

    pub fn begin_merge(&mut self) -> Result<MergeTicket<F>, MergeError> {
        if self.in_flight.is_some() {
            warn!("merge requested while another is in flight");
            let err = MergeError::Busy;
            self.view.set_status(&err.to_string(), StatusLevel::Warn);
            return Err(err);
        }

        let (Some(first), Some(second)) = (self.first.clone(), self.second.clone()) else {
            let err = MergeError::MissingInput;
            self.view.set_status(&err.to_string(), StatusLevel::Warn);
            return Err(err);
        };

        if !self.engine.is_available() {
            let err = MergeError::LibraryUnavailable("PDF engine is not available".into());
            self.report_failure(&err);
            return Err(err);
        }

        self.view.set_status(STATUS_MERGING, StatusLevel::Info);
        self.view.set_download_enabled(false);
        self.artifact = None;

        self.next_ticket += 1;
        let id = self.next_ticket;
        self.in_flight = Some(id);

        info!(ticket = id, first = %first.name(), second = %second.name(), "merge started");
        Ok(MergeTicket { id, first, second })
    }

    pub fn complete_merge(
        &mut self,
        ticket: MergeTicket<F>,
        first_bytes: &[u8],
        second_bytes: &[u8],
    ) -> Result<&MergedArtifact, MergeError> {
        self.redeem(&ticket)?;

        let output = match merge_pair(&self.engine, first_bytes, second_bytes) {
            Ok(output) => output,
            Err(err) => {
                self.report_failure(&err);
                return Err(err);
            }
        };

        let first_name = ticket.first.name();
        let second_name = ticket.second.name();
        let file_name = merged_file_name(&first_name, &second_name);

        // An input cleared mid-merge keeps download off until it is reselected.
        let both_selected = self.both_selected();
        self.view.set_download_enabled(both_selected);
        self.view.set_status(
            &format!("Done.\nMerged: {} + {}", first_name, second_name),
            StatusLevel::Info,
        );
        self.view.append_log(&format!(
            "Merged {} + {} into {} ({} pages, {} bytes)",
            first_name,
            second_name,
            file_name,
            output.page_count,
            output.bytes.len()
        ));
        info!(
            ticket = ticket.id,
            pages = output.page_count,
            size = output.bytes.len(),
            file_name = %file_name,
            "merge finished"
        );

        Ok(self.artifact.insert(MergedArtifact {
            bytes: output.bytes,
            file_name,
            page_count: output.page_count,
        }))
    }

    /// Abort an in-flight merge because its inputs could not be read
    pub fn fail_merge(&mut self, ticket: MergeTicket<F>, err: MergeError) {
        if self.redeem(&ticket).is_ok() {
            self.report_failure(&err);
        }
    }

    /// The artifact to save, or a warning if there is none yet
    pub fn download(&mut self) -> Option<&MergedArtifact> {
        if self.artifact.is_none() {
            self.view
                .set_status(STATUS_NOTHING_TO_DOWNLOAD, StatusLevel::Warn);
            return None;
        }
        self.artifact.as_ref()
    }

    pub fn artifact(&self) -> Option<&MergedArtifact> {
        self.artifact.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Clear the in-flight marker if `ticket` owns it
    fn redeem(&mut self, ticket: &MergeTicket<F>) -> Result<(), MergeError> {
        if self.in_flight != Some(ticket.id) {
            warn!(ticket = ticket.id, "ignoring stale merge ticket");
            return Err(MergeError::Busy);
        }
        self.in_flight = None;
        Ok(())
    }

    fn report_failure(&mut self, err: &MergeError) {
        error!(error = %err, fatal = err.is_fatal(), "merge failed");

        self.artifact = None;
        self.view.set_download_enabled(false);
        self.view
            .set_status(&format!("Error: {}", err), StatusLevel::Error);
        self.view.append_log(&format!("Error: {}", detail_chain(err)));
    }
}

/// Message, debug form and any source errors, for the log
fn detail_chain(err: &MergeError) -> String {
    let mut detail = format!("{} ({:?})", err, err);
    let mut source = err.source();
    while let Some(cause) = source {
        detail.push_str(&format!("\n  caused by: {}", cause));
        source = cause.source();
    }
    detail
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::mock::MockEngine;
    use crate::view::RecordingView;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone)]
    struct NamedFile(&'static str);

    impl SelectedFile for NamedFile {
        fn name(&self) -> String {
            self.0.to_string()
        }
    }

    type TestOrchestrator = MergeOrchestrator<MockEngine, RecordingView, NamedFile>;

    fn orchestrator() -> TestOrchestrator {
        MergeOrchestrator::new(MockEngine::default(), RecordingView::new())
    }

    fn with_both_selected() -> TestOrchestrator {
        let mut orch = orchestrator();
        orch.start();
        orch.select(Slot::First, Some(NamedFile("report.PDF")));
        orch.select(Slot::Second, Some(NamedFile("appendix.pdf")));
        orch
    }

    #[test]
    fn test_start_prompts_for_files() {
        let mut orch = orchestrator();
        orch.start();

        assert_eq!(orch.view().status_message(), Some(STATUS_SELECT_BOTH));
        assert_eq!(orch.view().status_level(), Some(StatusLevel::Warn));
        assert_eq!(orch.view().log, vec![LOG_LOADED]);
        assert!(!orch.view().download_enabled);
    }

    #[test]
    fn test_selecting_both_is_ready() {
        let orch = with_both_selected();
        assert!(orch.both_selected());
        assert_eq!(orch.view().status_message(), Some(STATUS_READY));
        assert_eq!(orch.view().status_level(), Some(StatusLevel::Info));
    }

    #[test]
    fn test_clearing_a_selection_disables_download() {
        let mut orch = with_both_selected();
        let ticket = orch.begin_merge().unwrap();
        orch.complete_merge(ticket, b"PDF:a1", b"PDF:b1").unwrap();
        assert!(orch.view().download_enabled);

        orch.select(Slot::Second, None);
        assert!(!orch.view().download_enabled);
        assert_eq!(orch.view().status_message(), Some(STATUS_SELECT_BOTH));
    }

    #[test]
    fn test_input_cleared_during_merge_keeps_download_off() {
        let mut orch = with_both_selected();
        let ticket = orch.begin_merge().unwrap();
        orch.select(Slot::First, None);

        orch.complete_merge(ticket, b"PDF:a1", b"PDF:b1").unwrap();
        assert!(orch.artifact().is_some());
        assert!(!orch.view().download_enabled);

        orch.select(Slot::First, Some(NamedFile("report.pdf")));
        let ticket = orch.begin_merge().unwrap();
        orch.complete_merge(ticket, b"PDF:a1", b"PDF:b1").unwrap();
        assert!(orch.view().download_enabled);
    }

    #[test]
    fn test_merge_without_inputs_has_no_side_effects() {
        let mut orch = orchestrator();
        orch.select(Slot::First, Some(NamedFile("a.pdf")));

        let err = orch.begin_merge().unwrap_err();
        assert_eq!(err, MergeError::MissingInput);
        assert_eq!(
            orch.view().status_message(),
            Some("Please select both PDFs first.")
        );
        assert!(orch.artifact().is_none());
        assert!(!orch.is_busy());
    }

    #[test]
    fn test_successful_merge_stores_artifact() {
        let mut orch = with_both_selected();

        let ticket = orch.begin_merge().unwrap();
        assert!(orch.is_busy());
        assert_eq!(orch.view().status_message(), Some(STATUS_MERGING));

        let artifact = orch
            .complete_merge(ticket, b"PDF:a1,a2", b"PDF:b1,b2,b3")
            .unwrap();
        assert_eq!(artifact.page_count, 5);
        assert_eq!(artifact.file_name, "report+appendix-merged.pdf");
        assert_eq!(artifact.bytes, b"PDF:a1,a2,b1,b2,b3".to_vec());

        assert!(!orch.is_busy());
        assert!(orch.view().download_enabled);
        assert_eq!(
            orch.view().status_message(),
            Some("Done.\nMerged: report.PDF + appendix.pdf")
        );
    }

    #[test]
    fn test_parse_failure_leaves_artifact_empty() {
        let mut orch = with_both_selected();

        let ticket = orch.begin_merge().unwrap();
        let err = orch
            .complete_merge(ticket, b"PDF:a1", b"garbage")
            .unwrap_err();

        assert!(matches!(err, MergeError::ParseError { input: Slot::Second, .. }));
        assert!(orch.artifact().is_none());
        assert!(!orch.view().download_enabled);
        assert_eq!(orch.view().status_level(), Some(StatusLevel::Error));
        assert!(orch
            .view()
            .status_message()
            .unwrap()
            .starts_with("Error: Failed to parse PDF 2"));
        assert!(orch.view().log.last().unwrap().starts_with("Error: "));
    }

    #[test]
    fn test_new_attempt_invalidates_previous_artifact() {
        let mut orch = with_both_selected();
        let ticket = orch.begin_merge().unwrap();
        orch.complete_merge(ticket, b"PDF:a1", b"PDF:b1").unwrap();
        assert!(orch.artifact().is_some());

        let ticket = orch.begin_merge().unwrap();
        assert!(orch.artifact().is_none());
        assert!(!orch.view().download_enabled);

        orch.complete_merge(ticket, b"broken", b"PDF:b1").unwrap_err();
        assert!(orch.artifact().is_none());
    }

    #[test]
    fn test_retry_after_failure() {
        let mut orch = with_both_selected();
        let ticket = orch.begin_merge().unwrap();
        orch.complete_merge(ticket, b"broken", b"PDF:b1").unwrap_err();

        let ticket = orch.begin_merge().unwrap();
        let artifact = orch.complete_merge(ticket, b"PDF:a1", b"PDF:b1").unwrap();
        assert_eq!(artifact.page_count, 2);
    }

    #[test]
    fn test_second_merge_while_busy_is_rejected() {
        let mut orch = with_both_selected();
        let ticket = orch.begin_merge().unwrap();

        let err = orch.begin_merge().unwrap_err();
        assert_eq!(err, MergeError::Busy);
        assert_eq!(orch.view().status_level(), Some(StatusLevel::Warn));

        // The first attempt still completes.
        assert!(orch.complete_merge(ticket, b"PDF:a1", b"PDF:b1").is_ok());
    }

    #[test]
    fn test_stale_ticket_cannot_overwrite() {
        let mut orch = with_both_selected();
        let stale = orch.begin_merge().unwrap();
        orch.fail_merge(stale.clone(), MergeError::FileRead {
            input: Slot::First,
            detail: "NotReadableError".into(),
        });

        let current = orch.begin_merge().unwrap();
        assert!(orch.complete_merge(stale, b"PDF:x", b"PDF:y").is_err());
        assert!(orch.is_busy());

        let artifact = orch.complete_merge(current, b"PDF:a", b"PDF:b").unwrap();
        assert_eq!(artifact.bytes, b"PDF:a,b".to_vec());
    }

    #[test]
    fn test_read_failure_is_reported() {
        let mut orch = with_both_selected();
        let ticket = orch.begin_merge().unwrap();
        orch.fail_merge(
            ticket,
            MergeError::FileRead {
                input: Slot::Second,
                detail: "NotReadableError".into(),
            },
        );

        assert!(!orch.is_busy());
        assert_eq!(
            orch.view().status_message(),
            Some("Error: Failed to read PDF 2: NotReadableError")
        );
    }

    #[test]
    fn test_unavailable_engine_fails_before_reading() {
        let engine = MockEngine {
            unavailable: true,
            ..MockEngine::default()
        };
        let mut orch: TestOrchestrator = MergeOrchestrator::new(engine, RecordingView::new());
        orch.select(Slot::First, Some(NamedFile("a.pdf")));
        orch.select(Slot::Second, Some(NamedFile("b.pdf")));

        let err = orch.begin_merge().unwrap_err();
        assert!(matches!(err, MergeError::LibraryUnavailable(_)));
        assert!(err.is_fatal());
        assert!(!orch.is_busy());
        assert_eq!(orch.view().status_level(), Some(StatusLevel::Error));
    }

    #[test]
    fn test_download_without_artifact_warns() {
        let mut orch = with_both_selected();
        assert!(orch.download().is_none());
        assert_eq!(
            orch.view().status_message(),
            Some(STATUS_NOTHING_TO_DOWNLOAD)
        );
        assert_eq!(orch.view().status_level(), Some(StatusLevel::Warn));
    }

    #[test]
    fn test_download_can_repeat() {
        let mut orch = with_both_selected();
        let ticket = orch.begin_merge().unwrap();
        orch.complete_merge(ticket, b"PDF:a1", b"PDF:b1").unwrap();

        let first = orch.download().cloned().unwrap();
        let second = orch.download().cloned().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.file_name, "report+appendix-merged.pdf");
    }

    #[test]
    fn test_instances_are_independent() {
        let mut one = with_both_selected();
        let two = with_both_selected();

        let ticket = one.begin_merge().unwrap();
        one.complete_merge(ticket, b"PDF:a", b"PDF:b").unwrap();

        assert!(one.artifact().is_some());
        assert!(two.artifact().is_none());
    }
}
