//! 生成済みPDFをOSの既定アプリで開く

use std::io;
use std::path::Path;
use tracing::info;

use crate::error::OpenError;

/// ビューアーの起動方法
pub trait Launcher {
    fn launch(&self, path: &Path) -> io::Result<()>;
}

/// OSの既定アプリ (`open` クレート)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn launch(&self, path: &Path) -> io::Result<()> {
        open::that_detached(path)
    }
}

/// 成果物オープナー
#[derive(Debug, Clone, Default)]
pub struct ArtifactOpener<L = SystemLauncher> {
    launcher: L,
}

impl<L: Launcher> ArtifactOpener<L> {
    pub fn new(launcher: L) -> Self {
        Self { launcher }
    }

    /// ファイルを開く（ビューアーの終了は待たない）
    pub fn open(&self, path: &Path) -> Result<(), OpenError> {
        if !path.is_file() {
            return Err(OpenError::NotFound(path.to_path_buf()));
        }

        self.launcher.launch(path).map_err(|source| OpenError::Launch {
            path: path.to_path_buf(),
            source,
        })?;

        info!(path = %path.display(), "PDFを開きました");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::path::PathBuf;

    #[derive(Default)]
    struct Recording(RefCell<Vec<PathBuf>>);

    impl Launcher for Recording {
        fn launch(&self, path: &Path) -> io::Result<()> {
            self.0.borrow_mut().push(path.to_path_buf());
            Ok(())
        }
    }

    struct Broken;

    impl Launcher for Broken {
        fn launch(&self, _path: &Path) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::NotFound, "no viewer"))
        }
    }

    #[test]
    fn test_open_missing_file() {
        let opener = ArtifactOpener::new(Recording::default());
        let err = opener.open(Path::new("/nonexistent/label.pdf")).unwrap_err();
        assert!(matches!(err, OpenError::NotFound(_)));
        assert!(opener.launcher.0.borrow().is_empty());
    }

    #[test]
    fn test_open_directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let opener = ArtifactOpener::new(Recording::default());
        assert!(matches!(opener.open(dir.path()), Err(OpenError::NotFound(_))));
    }

    #[test]
    fn test_open_delegates_to_launcher() {
        let file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        let opener = ArtifactOpener::new(Recording::default());
        opener.open(file.path()).unwrap();
        assert_eq!(*opener.launcher.0.borrow(), vec![file.path().to_path_buf()]);
    }

    #[test]
    fn test_launch_failure() {
        let file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        let err = ArtifactOpener::new(Broken).open(file.path()).unwrap_err();
        assert!(matches!(err, OpenError::Launch { .. }));
    }
}
