//! KYC Wizard Orchestrator.
//!
//! Four linear steps, each gated by validation before forward
//! progress: Identity, Selfie, Document, Confirmation. The wizard
//! owns the submission draft, drives one capture session at a time,
//! and assembles the final payload for the verification service.

mod submit;

pub use submit::{
    IdType, KycSubmission, MockVerificationService, SubmissionError, SubmissionReceipt,
    VerificationService,
};

use crate::capture::{CapturedPhoto, CaptureTarget};
use thiserror::Error;

/// Wizard steps, in order. Backward navigation is unconditional;
/// forward navigation validates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Step {
    /// Name, document type, document number.
    #[default]
    Identity,
    /// Live selfie capture.
    Selfie,
    /// Document front capture (back side optional).
    Document,
    /// Review and consent.
    Confirmation,
}

impl Step {
    /// 1-based step number shown to the user.
    pub fn number(self) -> u8 {
        match self {
            Step::Identity => 1,
            Step::Selfie => 2,
            Step::Document => 3,
            Step::Confirmation => 4,
        }
    }

    fn next(self) -> Step {
        match self {
            Step::Identity => Step::Selfie,
            Step::Selfie => Step::Document,
            Step::Document | Step::Confirmation => Step::Confirmation,
        }
    }

    fn previous(self) -> Step {
        match self {
            Step::Identity | Step::Selfie => Step::Identity,
            Step::Document => Step::Selfie,
            Step::Confirmation => Step::Document,
        }
    }
}

/// Errors surfaced by wizard operations.
#[derive(Debug, Error)]
pub enum WizardError {
    #[error("full name is required")]
    MissingFullName,
    #[error("ID number is required")]
    MissingIdNumber,
    #[error("selfie has not been captured")]
    MissingSelfie,
    #[error("document front has not been captured")]
    MissingDocumentFront,
    #[error("consent must be accepted before submitting")]
    ConsentRequired,
    #[error("a capture is already in progress for {0}")]
    CaptureInProgress(CaptureTarget),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

/// Result of a successful submission call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Accepted by the service; the wizard has been reset.
    Completed {
        /// Status string reported by the service, if any.
        status: Option<String>,
    },
    /// The verification service rejected the photos. Wizard state is
    /// preserved so the user can retake and resubmit.
    Rejected,
}

/// The KYC wizard: submission draft plus step state.
///
/// Created when the flow opens and reset wholesale on close or
/// successful submission; there is no resume.
#[derive(Debug, Default)]
pub struct KycWizard {
    step: Step,
    full_name: String,
    id_type: IdType,
    id_number: String,
    selfie: Option<CapturedPhoto>,
    document_front: Option<CapturedPhoto>,
    document_back: Option<CapturedPhoto>,
    consent_accepted: bool,
    camera_target: Option<CaptureTarget>,
}

impl KycWizard {
    /// Opens a fresh wizard at the Identity step.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current step.
    pub fn step(&self) -> Step {
        self.step
    }

    /// Sets the applicant's full name.
    pub fn set_full_name(&mut self, name: impl Into<String>) {
        self.full_name = name.into();
    }

    /// Sets the identity document type.
    pub fn set_id_type(&mut self, id_type: IdType) {
        self.id_type = id_type;
    }

    /// Sets the identity document number.
    pub fn set_id_number(&mut self, number: impl Into<String>) {
        self.id_number = number.into();
    }

    /// Records the consent checkbox.
    pub fn set_consent(&mut self, accepted: bool) {
        self.consent_accepted = accepted;
    }

    /// Advances to the next step if the current step validates.
    /// On failure the step is unchanged and the error names the
    /// missing field.
    pub fn advance(&mut self) -> Result<Step, WizardError> {
        let current = self.step();
        match current {
            Step::Identity => {
                if self.full_name.trim().is_empty() {
                    return Err(WizardError::MissingFullName);
                }
                if self.id_number.trim().is_empty() {
                    return Err(WizardError::MissingIdNumber);
                }
            }
            Step::Selfie => {
                if self.selfie.is_none() {
                    return Err(WizardError::MissingSelfie);
                }
            }
            Step::Document => {
                if self.document_front.is_none() {
                    return Err(WizardError::MissingDocumentFront);
                }
            }
            Step::Confirmation => {}
        }

        let next = current.next();
        self.step = next;
        tracing::debug!(step = next.number(), "Wizard advanced");
        Ok(next)
    }

    /// Goes back one step. Never validates, never fails.
    pub fn back(&mut self) -> Step {
        let previous = self.step().previous();
        self.step = previous;
        previous
    }

    /// Marks a capture session as open for the given target.
    ///
    /// At most one camera target is held at a time; the previous
    /// session must have ended (photo attached or capture cancelled).
    pub fn begin_capture(&mut self, target: CaptureTarget) -> Result<(), WizardError> {
        if let Some(open) = self.camera_target {
            return Err(WizardError::CaptureInProgress(open));
        }
        self.camera_target = Some(target);
        Ok(())
    }

    /// Abandons the open capture session, if any.
    pub fn cancel_capture(&mut self) {
        self.camera_target = None;
    }

    /// The capture target currently holding the camera, if any.
    pub fn camera_target(&self) -> Option<CaptureTarget> {
        self.camera_target
    }

    /// Stores a completed capture and auto-advances the step.
    ///
    /// Selfie and document-front captures move the wizard to at least
    /// the following step but never regress it, so retaking a photo
    /// from the Confirmation step stays on Confirmation. The document
    /// back never affects the step.
    pub fn attach_photo(&mut self, target: CaptureTarget, photo: CapturedPhoto) {
        self.camera_target = None;
        tracing::info!(%target, file = photo.suggested_file_name(), "Photo attached");

        match target {
            CaptureTarget::Selfie => {
                self.selfie = Some(photo);
                self.step = self.step.max(Step::Document);
            }
            CaptureTarget::DocumentFront => {
                self.document_front = Some(photo);
                self.step = self.step.max(Step::Confirmation);
            }
            CaptureTarget::DocumentBack => {
                self.document_back = Some(photo);
            }
        }
    }

    /// Checks that the draft is submittable: selfie and document
    /// front present, consent accepted, identity fields filled.
    pub fn validate_submission(&self) -> Result<(), WizardError> {
        if self.full_name.trim().is_empty() {
            return Err(WizardError::MissingFullName);
        }
        if self.id_number.trim().is_empty() {
            return Err(WizardError::MissingIdNumber);
        }
        if self.selfie.is_none() {
            return Err(WizardError::MissingSelfie);
        }
        if self.document_front.is_none() {
            return Err(WizardError::MissingDocumentFront);
        }
        if !self.consent_accepted {
            return Err(WizardError::ConsentRequired);
        }
        Ok(())
    }

    /// Builds the submission payload from the current draft.
    fn build_submission(&self) -> KycSubmission {
        KycSubmission {
            full_name: self.full_name.trim().to_string(),
            id_type: self.id_type,
            id_number: self.id_number.trim().to_string(),
            selfie_url: self
                .selfie
                .as_ref()
                .map(|p| p.encoded_payload().to_string())
                .unwrap_or_default(),
            document_front_url: self
                .document_front
                .as_ref()
                .map(|p| p.encoded_payload().to_string())
                .unwrap_or_default(),
            document_back_url: self
                .document_back
                .as_ref()
                .map(|p| p.encoded_payload().to_string()),
        }
    }

    /// Submits the draft to the verification service.
    ///
    /// A response whose status reads "rejected" (case-insensitive) is
    /// a normal variant, not an error: the wizard keeps its state so
    /// the user can retake photos and resubmit. Transport and
    /// validation errors also preserve state. Any other success
    /// resets the wizard.
    pub async fn submit<S: VerificationService>(
        &mut self,
        service: &mut S,
    ) -> Result<SubmitOutcome, WizardError> {
        self.validate_submission()?;

        let request = self.build_submission();
        let receipt = match service.submit(&request).await {
            Ok(receipt) => receipt,
            Err(e) => {
                tracing::warn!(error = %e.user_message(), "KYC submission failed");
                return Err(e.into());
            }
        };

        let rejected = receipt
            .kyc_status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("rejected"));
        if rejected {
            tracing::warn!("KYC submission rejected, retake clearer photos");
            return Ok(SubmitOutcome::Rejected);
        }

        let status = receipt.kyc_status;
        tracing::info!(status = status.as_deref().unwrap_or("unknown"), "KYC submitted");
        self.reset();
        Ok(SubmitOutcome::Completed { status })
    }

    /// Discards all state: step back to Identity, photos dropped,
    /// consent cleared. Also the close path; there is no resume.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Applicant's full name.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Selected document type.
    pub fn id_type(&self) -> IdType {
        self.id_type
    }

    /// Document number.
    pub fn id_number(&self) -> &str {
        &self.id_number
    }

    /// Captured selfie, if any.
    pub fn selfie(&self) -> Option<&CapturedPhoto> {
        self.selfie.as_ref()
    }

    /// Captured document front, if any.
    pub fn document_front(&self) -> Option<&CapturedPhoto> {
        self.document_front.as_ref()
    }

    /// Captured document back, if any.
    pub fn document_back(&self) -> Option<&CapturedPhoto> {
        self.document_back.as_ref()
    }

    /// Whether consent has been accepted.
    pub fn consent_accepted(&self) -> bool {
        self.consent_accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn test_photo(target: CaptureTarget, name: &str) -> CapturedPhoto {
        let path = std::env::temp_dir().join(format!(
            "kyc_wizard_test_{}_{}.jpg",
            std::process::id(),
            name
        ));
        std::fs::write(&path, [0xFF, 0xD8, 0xFF, 0xE0, 1, 2, 3, 4]).unwrap();
        let photo = CapturedPhoto::from_file(PathBuf::from(&path), target).unwrap();
        std::fs::remove_file(path).ok();
        photo
    }

    fn filled_wizard() -> KycWizard {
        let mut wizard = KycWizard::new();
        wizard.set_full_name("Ama Mensah");
        wizard.set_id_type(IdType::Passport);
        wizard.set_id_number("P1234567");
        wizard.attach_photo(CaptureTarget::Selfie, test_photo(CaptureTarget::Selfie, "s"));
        wizard.attach_photo(
            CaptureTarget::DocumentFront,
            test_photo(CaptureTarget::DocumentFront, "f"),
        );
        wizard.set_consent(true);
        wizard
    }

    #[test]
    fn test_identity_gate_blocks_empty_name() {
        let mut wizard = KycWizard::new();
        wizard.set_id_number("123");

        assert!(matches!(wizard.advance(), Err(WizardError::MissingFullName)));
        assert_eq!(wizard.step(), Step::Identity);

        wizard.set_full_name("   ");
        assert!(matches!(wizard.advance(), Err(WizardError::MissingFullName)));

        wizard.set_full_name("Ama Mensah");
        assert_eq!(wizard.advance().unwrap(), Step::Selfie);
    }

    #[test]
    fn test_identity_gate_blocks_empty_id_number() {
        let mut wizard = KycWizard::new();
        wizard.set_full_name("Ama Mensah");
        assert!(matches!(wizard.advance(), Err(WizardError::MissingIdNumber)));
        assert_eq!(wizard.step(), Step::Identity);
    }

    #[test]
    fn test_capture_gates() {
        let mut wizard = KycWizard::new();
        wizard.set_full_name("Ama Mensah");
        wizard.set_id_number("123");
        wizard.advance().unwrap();

        assert!(matches!(wizard.advance(), Err(WizardError::MissingSelfie)));
        wizard.attach_photo(CaptureTarget::Selfie, test_photo(CaptureTarget::Selfie, "g1"));
        // attach already advanced past Selfie
        assert_eq!(wizard.step(), Step::Document);

        assert!(matches!(
            wizard.advance(),
            Err(WizardError::MissingDocumentFront)
        ));
    }

    #[test]
    fn test_back_is_unconditional() {
        let mut wizard = KycWizard::new();
        assert_eq!(wizard.back(), Step::Identity); // floor

        wizard.set_full_name("A");
        wizard.set_id_number("1");
        wizard.advance().unwrap();
        assert_eq!(wizard.step(), Step::Selfie);

        // No selfie captured, but back never validates
        assert_eq!(wizard.back(), Step::Identity);
    }

    #[test]
    fn test_attach_never_regresses_step() {
        let mut wizard = filled_wizard();
        assert_eq!(wizard.step(), Step::Confirmation);

        // Retake the selfie from the Confirmation step
        wizard.attach_photo(CaptureTarget::Selfie, test_photo(CaptureTarget::Selfie, "r"));
        assert_eq!(wizard.step(), Step::Confirmation);
    }

    #[test]
    fn test_document_back_never_moves_step() {
        let mut wizard = KycWizard::new();
        assert_eq!(wizard.step(), Step::Identity);

        wizard.attach_photo(
            CaptureTarget::DocumentBack,
            test_photo(CaptureTarget::DocumentBack, "b"),
        );
        assert_eq!(wizard.step(), Step::Identity);
        assert!(wizard.document_back().is_some());
    }

    #[test]
    fn test_single_camera_target() {
        let mut wizard = KycWizard::new();
        wizard.begin_capture(CaptureTarget::Selfie).unwrap();

        assert!(matches!(
            wizard.begin_capture(CaptureTarget::DocumentFront),
            Err(WizardError::CaptureInProgress(CaptureTarget::Selfie))
        ));

        wizard.cancel_capture();
        wizard.begin_capture(CaptureTarget::DocumentFront).unwrap();
        assert_eq!(wizard.camera_target(), Some(CaptureTarget::DocumentFront));
    }

    #[test]
    fn test_consent_required_for_submission() {
        let mut wizard = filled_wizard();
        wizard.set_consent(false);
        assert!(matches!(
            wizard.validate_submission(),
            Err(WizardError::ConsentRequired)
        ));
    }

    #[tokio::test]
    async fn test_submit_payload_shape() {
        let mut wizard = filled_wizard();
        let mut service = MockVerificationService::approving("verified");

        let outcome = wizard.submit(&mut service).await.unwrap();
        assert_eq!(
            outcome,
            SubmitOutcome::Completed {
                status: Some("verified".to_string())
            }
        );

        let request = &service.requests()[0];
        let json = serde_json::to_value(request).unwrap();
        assert_eq!(json["fullName"], "Ama Mensah");
        assert_eq!(json["idType"], "passport");
        assert!(json["selfieUrl"]
            .as_str()
            .unwrap()
            .starts_with("data:image/"));
        assert!(json["documentFrontUrl"]
            .as_str()
            .unwrap()
            .starts_with("data:image/"));
        // No back photo captured: the key is omitted entirely
        assert!(json.get("documentBackUrl").is_none());

        // Successful submission resets the wizard
        assert_eq!(wizard.step(), Step::Identity);
        assert!(wizard.selfie().is_none());
        assert!(!wizard.consent_accepted());
    }

    #[tokio::test]
    async fn test_submit_includes_optional_back() {
        let mut wizard = filled_wizard();
        wizard.attach_photo(
            CaptureTarget::DocumentBack,
            test_photo(CaptureTarget::DocumentBack, "ob"),
        );
        let mut service = MockVerificationService::approving("verified");

        wizard.submit(&mut service).await.unwrap();

        let json = serde_json::to_value(&service.requests()[0]).unwrap();
        assert!(json["documentBackUrl"]
            .as_str()
            .unwrap()
            .starts_with("data:image/"));
    }

    #[tokio::test]
    async fn test_rejection_preserves_state() {
        let mut wizard = filled_wizard();
        let mut service = MockVerificationService::rejecting();

        let outcome = wizard.submit(&mut service).await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Rejected);

        // Photos kept so the user can retake and resubmit
        assert_eq!(wizard.step(), Step::Confirmation);
        assert!(wizard.selfie().is_some());
        assert!(wizard.document_front().is_some());
        assert!(wizard.consent_accepted());
    }

    #[tokio::test]
    async fn test_rejection_status_is_case_insensitive() {
        let mut wizard = filled_wizard();
        let mut service = MockVerificationService::with_status("REJECTED");

        let outcome = wizard.submit(&mut service).await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Rejected);
    }

    #[tokio::test]
    async fn test_transport_error_preserves_state() {
        let mut wizard = filled_wizard();
        let mut service = MockVerificationService::failing("service unavailable");

        let result = wizard.submit(&mut service).await;
        assert!(matches!(result, Err(WizardError::Submission(_))));
        assert!(wizard.selfie().is_some());
        assert_eq!(wizard.step(), Step::Confirmation);
    }
}
