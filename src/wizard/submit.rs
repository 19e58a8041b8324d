//! Submission payload and verification-service seam.
//!
//! The backend call itself is an external collaborator; this module
//! defines the single request/response shape the wizard needs and a
//! mock service for tests and the demo.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identity document types accepted by the verification service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdType {
    /// National identity card.
    #[default]
    NationalId,
    /// International passport.
    Passport,
    /// Driver's license.
    DriverLicense,
    /// Voter registration card.
    VoterCard,
}

/// The KYC submission request.
///
/// Image fields carry base64 data URLs; the document back is omitted
/// from the wire payload entirely when it was not captured.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KycSubmission {
    /// Applicant's full legal name.
    pub full_name: String,
    /// Identity document type.
    pub id_type: IdType,
    /// Identity document number.
    pub id_number: String,
    /// Selfie image as a base64 data URL.
    pub selfie_url: String,
    /// Document front image as a base64 data URL.
    pub document_front_url: String,
    /// Optional document back image as a base64 data URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_back_url: Option<String>,
}

/// Response from a successful submission call.
///
/// `kyc_status` is checked case-insensitively for the literal value
/// `"rejected"`; any other value (or none) counts as accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    /// Verification status reported by the service, if any.
    pub kyc_status: Option<String>,
    /// Human-readable message from the service, if any.
    pub message: Option<String>,
}

/// Errors from the submission transport.
#[derive(Debug, Clone, Error)]
pub enum SubmissionError {
    /// The service returned an error with a message for the user.
    #[error("submission rejected by service: {message}")]
    Service {
        /// Server-provided error message.
        message: String,
    },
    /// Network-level failure with no usable server message.
    #[error("submission transport error: {0}")]
    Transport(String),
}

impl SubmissionError {
    /// Message to surface to the user, with a generic fallback when
    /// the server did not provide one.
    pub fn user_message(&self) -> &str {
        match self {
            SubmissionError::Service { message } if !message.is_empty() => message,
            _ => "Submission failed. Please check your connection and try again",
        }
    }
}

/// Trait for the KYC verification endpoint.
pub trait VerificationService {
    /// Submits the payload and returns the service's receipt.
    fn submit(
        &mut self,
        request: &KycSubmission,
    ) -> impl std::future::Future<Output = Result<SubmissionReceipt, SubmissionError>> + Send;
}

/// Scripted verification service for tests and the demo binary.
///
/// Records every request it receives and replays a fixed outcome.
#[derive(Debug, Default)]
pub struct MockVerificationService {
    outcome: Option<Result<SubmissionReceipt, SubmissionError>>,
    requests: Vec<KycSubmission>,
}

impl MockVerificationService {
    /// Service that approves with the given status string.
    pub fn approving(status: &str) -> Self {
        Self::with_status(status)
    }

    /// Service that answers with the given `kyc_status` verbatim.
    pub fn with_status(status: &str) -> Self {
        Self {
            outcome: Some(Ok(SubmissionReceipt {
                kyc_status: Some(status.to_string()),
                message: None,
            })),
            requests: Vec::new(),
        }
    }

    /// Service that rejects every submission.
    pub fn rejecting() -> Self {
        Self::with_status("rejected")
    }

    /// Service that fails at the transport level.
    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Some(Err(SubmissionError::Transport(message.to_string()))),
            requests: Vec::new(),
        }
    }

    /// Requests received so far.
    pub fn requests(&self) -> &[KycSubmission] {
        &self.requests
    }
}

impl VerificationService for MockVerificationService {
    async fn submit(
        &mut self,
        request: &KycSubmission,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        self.requests.push(request.clone());
        match &self.outcome {
            Some(Ok(receipt)) => Ok(receipt.clone()),
            Some(Err(e)) => Err(e.clone()),
            None => Ok(SubmissionReceipt::default()),
        }
    }
}
