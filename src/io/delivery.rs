//! Artifact delivery
//!
//! Hands a finished export to the platform: a native share target on
//! mobile-class clients, a file save everywhere else. A failed or cancelled
//! share always falls back to saving.

use crate::core::errors::{SignatureError, SignatureResult};
use crate::rendering::artifact::ExportArtifact;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Title passed to share targets
pub const SHARE_TITLE: &str = "Signature";

/// Description passed to share targets
pub const SHARE_TEXT: &str = "My generated signature";

/// Kind of client the artifact is delivered to
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ClientKind {
    #[default]
    Desktop,
    Mobile,
}

/// A native share surface
pub trait ShareTarget: Send + Sync {
    /// Offer `artifact` to the user. Cancellation is reported as
    /// [`SignatureError::ShareCancelledOrFailed`] like any other failure.
    fn share(&self, artifact: &ExportArtifact, title: &str, text: &str) -> SignatureResult<()>;
}

/// Share target that runs an external command with the artifact's path
/// appended to its arguments.
///
/// The artifact is written to a temporary file that is removed once the
/// command returns. Title and text are passed in `SIGGEN_SHARE_TITLE` and
/// `SIGGEN_SHARE_TEXT`.
#[derive(Debug, Clone)]
pub struct CommandShareTarget {
    program: String,
    args: Vec<String>,
}

impl CommandShareTarget {
    /// Build from a command line split into words; `None` if it is empty
    pub fn from_command(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

impl ShareTarget for CommandShareTarget {
    fn share(&self, artifact: &ExportArtifact, title: &str, text: &str) -> SignatureResult<()> {
        let failed = |reason: String| SignatureError::ShareCancelledOrFailed(reason);

        let mut file = tempfile::Builder::new()
            .prefix("siggen-")
            .suffix(&format!("-{}", artifact.suggested_filename))
            .tempfile()
            .map_err(|e| failed(format!("cannot stage artifact: {e}")))?;
        file.write_all(&artifact.bytes)
            .and_then(|()| file.flush())
            .map_err(|e| failed(format!("cannot stage artifact: {e}")))?;

        debug!("Sharing {} via {}", artifact.suggested_filename, self.program);
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(file.path())
            .env("SIGGEN_SHARE_TITLE", title)
            .env("SIGGEN_SHARE_TEXT", text)
            .env("SIGGEN_SHARE_MIME", artifact.mime_type)
            .status()
            .map_err(|e| failed(format!("cannot run {}: {e}", self.program)))?;

        if status.success() {
            Ok(())
        } else {
            Err(failed(format!("{} exited with {status}", self.program)))
        }
    }
}

/// Writes artifacts into an output directory
#[derive(Debug, Clone)]
pub struct FileSaver {
    output_dir: PathBuf,
}

impl FileSaver {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Save under the artifact's suggested filename, replacing any existing
    /// file. The bytes go to a temporary file in the same directory first,
    /// which is renamed into place or removed on failure.
    pub fn save(&self, artifact: &ExportArtifact) -> SignatureResult<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;
        let target = self.output_dir.join(&artifact.suggested_filename);

        let mut file = tempfile::NamedTempFile::new_in(&self.output_dir)?;
        file.write_all(&artifact.bytes)?;
        file.flush()?;
        file.persist(&target).map_err(|e| SignatureError::Io(e.error))?;

        Ok(target)
    }
}

/// How an artifact reached the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Shared,
    Saved(PathBuf),
}

/// Share-or-save policy for finished exports
pub struct Delivery {
    client: ClientKind,
    share_target: Option<Box<dyn ShareTarget>>,
    saver: FileSaver,
}

impl Delivery {
    pub fn new(client: ClientKind, saver: FileSaver) -> Self {
        Self {
            client,
            share_target: None,
            saver,
        }
    }

    pub fn with_share_target(mut self, target: Box<dyn ShareTarget>) -> Self {
        self.share_target = Some(target);
        self
    }

    pub fn saver(&self) -> &FileSaver {
        &self.saver
    }

    /// Deliver `artifact`, consuming it
    pub fn deliver(&self, artifact: ExportArtifact) -> SignatureResult<DeliveryOutcome> {
        if self.client == ClientKind::Mobile {
            if let Some(target) = &self.share_target {
                match target.share(&artifact, SHARE_TITLE, SHARE_TEXT) {
                    Ok(()) => {
                        info!("Shared {}", artifact.suggested_filename);
                        return Ok(DeliveryOutcome::Shared);
                    }
                    Err(e) => debug!("{e}; saving instead"),
                }
            }
        }

        let path = self.saver.save(&artifact)?;
        info!("Saved {} ({})", path.display(), artifact.mime_type);
        Ok(DeliveryOutcome::Saved(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::artifact::ExportFormat;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct RecordingShare {
        calls: Arc<AtomicUsize>,
        succeed: bool,
    }

    impl ShareTarget for RecordingShare {
        fn share(&self, _: &ExportArtifact, title: &str, text: &str) -> SignatureResult<()> {
            assert_eq!(title, SHARE_TITLE);
            assert_eq!(text, SHARE_TEXT);
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.succeed {
                Ok(())
            } else {
                Err(SignatureError::ShareCancelledOrFailed("user cancelled".into()))
            }
        }
    }

    fn artifact() -> ExportArtifact {
        ExportArtifact::new(b"<svg/>".to_vec(), ExportFormat::Svg, "Ada")
    }

    fn delivery(dir: &Path, client: ClientKind, succeed: Option<bool>) -> (Delivery, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut delivery = Delivery::new(client, FileSaver::new(dir));
        if let Some(succeed) = succeed {
            delivery = delivery.with_share_target(Box::new(RecordingShare {
                calls: Arc::clone(&calls),
                succeed,
            }));
        }
        (delivery, calls)
    }

    #[test]
    fn test_save_writes_file_without_leftovers() {
        let dir = tempfile::tempdir().expect("tempdir");
        let saver = FileSaver::new(dir.path().join("out"));
        let path = saver.save(&artifact()).expect("save");

        assert_eq!(path, dir.path().join("out").join("Ada.svg"));
        assert_eq!(std::fs::read(&path).expect("read"), b"<svg/>");
        let entries = std::fs::read_dir(dir.path().join("out")).expect("read dir").count();
        assert_eq!(entries, 1, "temporary files should not remain");
    }

    #[test]
    fn test_save_overwrites_previous_export() {
        let dir = tempfile::tempdir().expect("tempdir");
        let saver = FileSaver::new(dir.path());
        saver.save(&artifact()).expect("first save");
        let second = ExportArtifact::new(b"<svg></svg>".to_vec(), ExportFormat::Svg, "Ada");
        let path = saver.save(&second).expect("second save");
        assert_eq!(std::fs::read(path).expect("read"), b"<svg></svg>");
    }

    #[test]
    fn test_desktop_never_shares() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (delivery, calls) = delivery(dir.path(), ClientKind::Desktop, Some(true));
        let outcome = delivery.deliver(artifact()).expect("deliver");
        assert_eq!(outcome, DeliveryOutcome::Saved(dir.path().join("Ada.svg")));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_mobile_shares_when_possible() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (delivery, calls) = delivery(dir.path(), ClientKind::Mobile, Some(true));
        let outcome = delivery.deliver(artifact()).expect("deliver");
        assert_eq!(outcome, DeliveryOutcome::Shared);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!dir.path().join("Ada.svg").exists());
    }

    #[test]
    fn test_cancelled_share_falls_back_to_save() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (delivery, calls) = delivery(dir.path(), ClientKind::Mobile, Some(false));
        let outcome = delivery.deliver(artifact()).expect("cancel is not an error");
        assert_eq!(outcome, DeliveryOutcome::Saved(dir.path().join("Ada.svg")));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_mobile_without_share_target_saves() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (delivery, _) = delivery(dir.path(), ClientKind::Mobile, None);
        let outcome = delivery.deliver(artifact()).expect("deliver");
        assert!(matches!(outcome, DeliveryOutcome::Saved(_)));
    }

    #[test]
    fn test_command_share_target_needs_a_program() {
        assert!(CommandShareTarget::from_command(&[]).is_none());
        let target = CommandShareTarget::from_command(&["kdeconnect-cli".into(), "--share".into()])
            .expect("target");
        assert_eq!(target.program, "kdeconnect-cli");
        assert_eq!(target.args, vec!["--share".to_string()]);
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_share_command_is_a_share_error() {
        let target = CommandShareTarget::from_command(&["false".into()]).expect("target");
        let result = target.share(&artifact(), SHARE_TITLE, SHARE_TEXT);
        assert!(matches!(
            result,
            Err(SignatureError::ShareCancelledOrFailed(_))
        ));
    }
}
