//! Side-effecting collaborators: saving a raster and showing it.
//!
//! Both sit behind narrow traits so encoding and rendering stay free of any
//! file system or display dependency.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

use image::{ImageFormat, RgbImage};

use crate::error::{DisplayError, RenderError};

/// Persists a rendered raster.
pub trait ImageSink {
    fn save(&self, raster: &RgbImage, path: &Path) -> Result<(), RenderError>;
}

/// Shows a rendered raster to the user.
pub trait ImageViewer {
    fn display(&self, raster: &RgbImage) -> Result<(), DisplayError>;
}

/// Writes PNG files, creating missing parent directories.
#[derive(Clone, Copy, Debug, Default)]
pub struct PngFile;

impl ImageSink for PngFile {
    fn save(&self, raster: &RgbImage, path: &Path) -> Result<(), RenderError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        let mut writer = BufWriter::new(File::create(path)?);
        raster.write_to(&mut writer, ImageFormat::Png)?;
        // Errors from a drop-time flush would be lost
        writer.flush()?;
        tracing::info!(path = %path.display(), width = raster.width(), "saved image");
        Ok(())
    }
}

/// Opens images with the host's default viewer.
///
/// The raster is written to a fresh temporary PNG and the platform opener
/// (`xdg-open`, `open`, or `cmd /C start`) is spawned without blocking the
/// caller. The file is kept after the call since the viewer may still be
/// reading it, and the child is reaped on a background thread.
#[derive(Clone, Debug)]
pub struct SystemViewer {
    dir: PathBuf,
}

impl Default for SystemViewer {
    fn default() -> Self {
        Self { dir: std::env::temp_dir() }
    }
}

impl SystemViewer {
    /// Uses `dir` for the temporary files handed to the viewer.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Writes `raster` to a new uniquely named PNG in the viewer's directory.
    fn write_temp_png(&self, raster: &RgbImage) -> Result<PathBuf, DisplayError> {
        let file = tempfile::Builder::new()
            .prefix("qrmint-")
            .suffix(".png")
            .tempfile_in(&self.dir)?;
        let mut writer = BufWriter::new(file);
        raster.write_to(&mut writer, ImageFormat::Png)?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        let (_, path) = file.keep().map_err(|e| e.error)?;
        Ok(path)
    }

    fn command(path: &Path) -> Command {
        if cfg!(target_os = "windows") {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", ""]).arg(path);
            cmd
        } else if cfg!(target_os = "macos") {
            let mut cmd = Command::new("open");
            cmd.arg(path);
            cmd
        } else {
            let mut cmd = Command::new("xdg-open");
            cmd.arg(path);
            cmd
        }
    }
}

impl ImageViewer for SystemViewer {
    fn display(&self, raster: &RgbImage) -> Result<(), DisplayError> {
        let path = self.write_temp_png(raster)?;
        let mut cmd = Self::command(&path);
        let program = cmd.get_program().to_string_lossy().into_owned();
        let mut child = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| DisplayError::Spawn { program, source })?;
        thread::spawn(move || {
            if let Err(err) = child.wait() {
                tracing::debug!(error = %err, "could not reap image viewer");
            }
        });
        Ok(())
    }
}

/// Displays `raster`, logging instead of returning any failure.
pub fn show(viewer: &dyn ImageViewer, raster: &RgbImage) {
    if let Err(err) = viewer.display(raster) {
        tracing::warn!(error = %err, "could not display image");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use std::cell::Cell;
    use tempfile::tempdir;

    struct FailingViewer {
        calls: Cell<u32>,
    }

    impl ImageViewer for FailingViewer {
        fn display(&self, _raster: &RgbImage) -> Result<(), DisplayError> {
            self.calls.set(self.calls.get() + 1);
            Err(DisplayError::Spawn {
                program: "nowhere".into(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
            })
        }
    }

    #[test]
    fn test_png_file_creates_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("qr.png");
        let raster = RgbImage::from_pixel(12, 12, Rgb([255, 255, 255]));
        PngFile.save(&raster, &path).unwrap();
        let loaded = image::open(&path).unwrap();
        assert_eq!((loaded.width(), loaded.height()), (12, 12));
    }

    #[test]
    fn test_png_file_reports_io_errors() {
        let dir = tempdir().unwrap();
        // A directory where the file should go
        let path = dir.path().join("taken");
        fs::create_dir_all(&path).unwrap();
        let raster = RgbImage::from_pixel(4, 4, Rgb([0, 0, 0]));
        assert!(matches!(PngFile.save(&raster, &path), Err(RenderError::Io(_))));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_png_file_reports_full_disk() {
        // Small enough to sit in the write buffer until the final flush
        let raster = RgbImage::from_pixel(33, 33, Rgb([255, 255, 255]));
        let result = PngFile.save(&raster, Path::new("/dev/full"));
        assert!(matches!(result, Err(RenderError::Io(_))), "{:?}", result);
    }

    #[test]
    fn test_temp_pngs_are_unique() {
        let dir = tempdir().unwrap();
        let viewer = SystemViewer::with_dir(dir.path());
        let raster = RgbImage::from_pixel(8, 8, Rgb([0, 0, 0]));
        let first = viewer.write_temp_png(&raster).unwrap();
        let second = viewer.write_temp_png(&raster).unwrap();
        assert_ne!(first, second);
        for path in [&first, &second] {
            assert!(path.starts_with(dir.path()));
            assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));
            assert_eq!(image::open(path).unwrap().width(), 8);
        }
    }

    #[test]
    fn test_show_swallows_display_errors() {
        let viewer = FailingViewer { calls: Cell::new(0) };
        let raster = RgbImage::from_pixel(4, 4, Rgb([0, 0, 0]));
        show(&viewer, &raster);
        assert_eq!(viewer.calls.get(), 1);
    }
}
