//! KYC Capture CLI
//!
//! Command-line demonstration of the capture pipeline against mock
//! hardware: a scripted face detector drives the selfie and document
//! sessions through auto-capture, and the assembled submission goes
//! to a mock verification service.

use clap::Parser;
use kyc_capture::{
    analysis::{EdgeSampleHeuristic, Face, FaceBox, FrameAnalyzer, MockFaceDetector},
    capture::{CaptureTarget, FileConfig, Frame, MockCamera},
    session::{CaptureMode, CaptureSession},
    wizard::{IdType, KycWizard, MockVerificationService, SubmitOutcome},
    CapturedPhoto,
};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "kyc-capture", about = "KYC capture pipeline demo (mock hardware)")]
struct Args {
    /// Optional TOML config with detection and decision overrides.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum preview frames per capture session.
    #[arg(long, default_value_t = 40)]
    max_frames: u32,
}

/// A face centered in a 640x480 preview, well inside the alignment
/// thresholds.
fn subject_face() -> Face {
    Face {
        bounding_box: FaceBox {
            x: 192.0,
            y: 144.0,
            width: 256.0,
            height: 192.0,
        },
        yaw: 3.0,
        roll: -2.0,
    }
}

/// The small portrait printed on an ID card.
fn card_portrait() -> Face {
    Face {
        bounding_box: FaceBox {
            x: 300.0,
            y: 210.0,
            width: 70.0,
            height: 60.0,
        },
        yaw: 0.0,
        roll: 0.0,
    }
}

/// Runs one capture session to completion, feeding synthetic preview
/// frames until the decision engine auto-captures.
async fn run_capture(
    config: &FileConfig,
    target: CaptureTarget,
    detector: MockFaceDetector,
    max_frames: u32,
) -> Option<CapturedPhoto> {
    let analyzer = FrameAnalyzer::new(
        detector,
        EdgeSampleHeuristic::new(config.heuristic.clone()),
        config.detection.clone(),
    );
    let mut session = CaptureSession::new(MockCamera::new(), analyzer, config.decision.clone());

    if let Err(e) = session.open(target) {
        warn!(%target, error = %e, "Could not open capture session");
        return None;
    }
    if let Some(hint) = session.hint() {
        info!(%target, %hint, "Session opened");
    }

    let interval =
        std::time::Duration::from_millis(config.detection.analysis_interval_ms);

    for sequence in 0..u64::from(max_frames) {
        let frame = Frame::new(vec![128u8; 640 * 480], 640, 480, sequence);
        if let Some(hint) = session.process_frame(&frame) {
            info!(%target, %hint, "Guidance");
        }

        match session.deadline() {
            Some(deadline) => {
                tokio::time::sleep_until(deadline).await;
                if session.fire_timer() {
                    match session.capture_now(CaptureMode::Auto) {
                        Ok(Some(photo)) => {
                            info!(
                                %target,
                                mime = photo.mime_type(),
                                file = photo.suggested_file_name(),
                                "Auto-capture complete"
                            );
                            return Some(photo);
                        }
                        Ok(None) => {}
                        Err(e) => {
                            warn!(%target, error = %e, "Capture failed, retry available");
                        }
                    }
                }
            }
            None => tokio::time::sleep(interval).await,
        }
    }

    warn!(%target, "No capture within the frame budget");
    session.close();
    None
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    info!("KYC Capture Pipeline v{}", kyc_capture::VERSION);
    info!("This is a demonstration using mock camera input");

    let config = match &args.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config: {}", e);
                std::process::exit(1);
            }
        },
        None => FileConfig::default(),
    };

    let mut wizard = KycWizard::new();
    wizard.set_full_name("Ama Mensah");
    wizard.set_id_type(IdType::NationalId);
    wizard.set_id_number("GHA-123456789-0");

    if let Err(e) = wizard.advance() {
        eprintln!("Identity step rejected: {}", e);
        std::process::exit(1);
    }

    // Selfie: detector misses twice, then holds alignment
    let selfie_script = MockFaceDetector::scripted(vec![
        vec![],
        vec![],
        vec![subject_face()],
    ]);
    if let Err(e) = wizard.begin_capture(CaptureTarget::Selfie) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
    match run_capture(&config, CaptureTarget::Selfie, selfie_script, args.max_frames).await {
        Some(photo) => wizard.attach_photo(CaptureTarget::Selfie, photo),
        None => {
            wizard.cancel_capture();
            eprintln!("Selfie capture did not complete");
            std::process::exit(1);
        }
    }

    // Document front: the card portrait carries the detection
    let document_script = MockFaceDetector::always(vec![card_portrait()]);
    if let Err(e) = wizard.begin_capture(CaptureTarget::DocumentFront) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
    match run_capture(
        &config,
        CaptureTarget::DocumentFront,
        document_script,
        args.max_frames,
    )
    .await
    {
        Some(photo) => wizard.attach_photo(CaptureTarget::DocumentFront, photo),
        None => {
            wizard.cancel_capture();
            eprintln!("Document capture did not complete");
            std::process::exit(1);
        }
    }

    info!(step = wizard.step().number(), "Captures complete");
    wizard.set_consent(true);

    let mut service = MockVerificationService::approving("pending");
    match wizard.submit(&mut service).await {
        Ok(SubmitOutcome::Completed { status }) => {
            info!(
                status = status.as_deref().unwrap_or("unknown"),
                "KYC submission accepted"
            );
            println!(
                "Submission accepted (status: {})",
                status.as_deref().unwrap_or("unknown")
            );
        }
        Ok(SubmitOutcome::Rejected) => {
            warn!("Verification service rejected the photos");
            println!("Submission rejected: retake clearer photos and resubmit");
        }
        Err(e) => {
            warn!(error = %e, "Submission failed");
            println!("Submission failed: {}", e);
        }
    }
}
