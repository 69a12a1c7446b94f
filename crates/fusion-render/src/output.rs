// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Image Output
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Atomic image writing.
//!
//! Figures are drawn into a temporary file next to the target and renamed
//! into place only after the backend has flushed. A failed or panicking
//! draw leaves no file at the target path.

use fusion_types::error::{FusionError, FusionResult};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::io;
use std::panic;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Bmp,
    Gif,
    Svg,
}

impl ImageFormat {
    pub fn from_path(path: &Path) -> FusionResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("png") => Ok(ImageFormat::Png),
            Some("bmp") => Ok(ImageFormat::Bmp),
            Some("gif") => Ok(ImageFormat::Gif),
            Some("svg") => Ok(ImageFormat::Svg),
            _ => Err(FusionError::ConfigError(format!(
                "Unsupported image extension for {} (expected png, bmp, gif or svg)",
                path.display()
            ))),
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            ImageFormat::Png => ".png",
            ImageFormat::Bmp => ".bmp",
            ImageFormat::Gif => ".gif",
            ImageFormat::Svg => ".svg",
        }
    }
}

/// Something that can draw itself on any plotters backend.
pub trait Figure {
    fn draw<DB: DrawingBackend>(&self, root: DrawingArea<DB, Shift>) -> FusionResult<()>;
}

pub(crate) fn render_err<E: std::fmt::Display>(err: E) -> FusionError {
    FusionError::Render(err.to_string())
}

/// Nothing to plot is reported as an I/O error against the target path.
pub(crate) fn empty_input(path: &Path, what: &str) -> FusionError {
    FusionError::io(
        path,
        io::Error::new(io::ErrorKind::InvalidInput, what.to_string()),
    )
}

/// Run `draw` against a staging file next to `path` and rename it into
/// place once `draw` returns `Ok`.
fn staged_write<D>(path: &Path, format: ImageFormat, draw: D) -> FusionResult<()>
where
    D: FnOnce(&Path) -> FusionResult<()>,
{
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !parent.is_dir() {
        return Err(FusionError::io(
            path,
            io::Error::new(io::ErrorKind::NotFound, "parent directory does not exist"),
        ));
    }

    let staging = tempfile::Builder::new()
        .prefix(".fusion-render-")
        .suffix(format.suffix())
        .tempfile_in(parent)
        .map_err(|e| FusionError::io(path, e))?
        .into_temp_path();

    // Font lookup in the bitmap backend can panic on headless hosts.
    panic::catch_unwind(panic::AssertUnwindSafe(|| draw(&staging)))
        .map_err(|_| FusionError::Render("plotting backend panicked".to_string()))??;

    staging
        .persist(path)
        .map_err(|e| FusionError::io(path, e.error))?;
    tracing::info!(path = %path.display(), ?format, "image written");
    Ok(())
}

/// Render `figure` to `path`; the file appears only when drawing succeeded.
pub fn write_figure<F: Figure>(figure: &F, path: &Path, size: (u32, u32)) -> FusionResult<()> {
    let format = ImageFormat::from_path(path)?;
    staged_write(path, format, |staging| match format {
        ImageFormat::Png | ImageFormat::Bmp => {
            figure.draw(BitMapBackend::new(staging, size).into_drawing_area())
        }
        ImageFormat::Gif => {
            let backend = BitMapBackend::gif(staging, size, 0).map_err(render_err)?;
            figure.draw(backend.into_drawing_area())
        }
        ImageFormat::Svg => figure.draw(SVGBackend::new(staging, size).into_drawing_area()),
    })
}

/// Render `frames` as a looping GIF, one `present` per frame.
pub fn write_animation<F: Figure>(
    frames: &[F],
    path: &Path,
    size: (u32, u32),
    frame_delay_ms: u32,
) -> FusionResult<()> {
    let format = ImageFormat::from_path(path)?;
    if format != ImageFormat::Gif {
        return Err(FusionError::ConfigError(format!(
            "Animations are written as GIF, got {}",
            path.display()
        )));
    }
    if frames.is_empty() {
        return Err(empty_input(path, "animation has no frames"));
    }
    staged_write(path, format, |staging| {
        let root = BitMapBackend::gif(staging, size, frame_delay_ms)
            .map_err(render_err)?
            .into_drawing_area();
        for frame in frames {
            frame.draw(root.clone())?;
        }
        tracing::debug!(
            frames = frames.len(),
            frame_delay_ms,
            "animation frames encoded"
        );
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Blank;

    impl Figure for Blank {
        fn draw<DB: DrawingBackend>(&self, root: DrawingArea<DB, Shift>) -> FusionResult<()> {
            root.fill(&WHITE).map_err(render_err)?;
            root.present().map_err(render_err)
        }
    }

    struct Failing;

    impl Figure for Failing {
        fn draw<DB: DrawingBackend>(&self, _root: DrawingArea<DB, Shift>) -> FusionResult<()> {
            Err(FusionError::Render("boom".to_string()))
        }
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ImageFormat::from_path(Path::new("a/b.PNG")).unwrap(),
            ImageFormat::Png
        );
        assert_eq!(
            ImageFormat::from_path(Path::new("b.svg")).unwrap(),
            ImageFormat::Svg
        );
        assert_eq!(
            ImageFormat::from_path(Path::new("b.gif")).unwrap(),
            ImageFormat::Gif
        );
        assert!(ImageFormat::from_path(Path::new("b.tiff")).is_err());
        assert!(ImageFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_write_png() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("blank.png");
        write_figure(&Blank, &path, (64, 64)).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..4], b"\x89PNG");
        // Only the target remains; the staging file was renamed.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_missing_parent_is_io_error() {
        let err = write_figure(&Blank, Path::new("/nonexistent/dir/out.png"), (64, 64))
            .unwrap_err();
        match err {
            FusionError::Io { path, .. } => assert!(path.ends_with("out.png")),
            other => panic!("Unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_failed_draw_leaves_nothing() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("failed.png");
        assert!(write_figure(&Failing, &path, (64, 64)).is_err());
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_animation_requires_gif_and_frames() {
        let dir = tempfile::TempDir::new().unwrap();
        let png = dir.path().join("a.png");
        let err = write_animation(&[Blank], &png, (64, 64), 100).unwrap_err();
        assert!(matches!(err, FusionError::ConfigError(_)));

        let path = dir.path().join("a.gif");
        let frames: [Blank; 0] = [];
        match write_animation(&frames, &path, (64, 64), 100).unwrap_err() {
            FusionError::Io { path: p, source } => {
                assert_eq!(p, path);
                assert_eq!(source.kind(), io::ErrorKind::InvalidInput);
            }
            other => panic!("Unexpected error: {other:?}"),
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_failed_frame_leaves_nothing() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("failed.gif");
        assert!(write_animation(&[Failing], &path, (64, 64), 100).is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
