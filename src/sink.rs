use std::path::{Path, PathBuf};

use crate::error::{RayfanError, RayfanResult};
use crate::surface::FrameRef;

/// Destination for completed repaints.
///
/// `begin` acquires the presentation target; it is the one step whose
/// failure the driver tolerates silently (the backdrop is decorative, a host
/// without a target just stays blank). `present` receives each completed
/// frame in paint order.
pub trait PresentSink {
    /// Called once when the driver mounts.
    fn begin(&mut self) -> RayfanResult<()>;
    /// Receive one completed frame.
    fn present(&mut self, frame: FrameRef<'_>) -> RayfanResult<()>;
    /// Called once when the driver stops.
    fn end(&mut self) -> RayfanResult<()>;
}

/// Owned copy of a presented frame, premultiplied RGBA8.
#[derive(Clone, Debug)]
pub struct OwnedFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct MemorySink {
    frames: Vec<OwnedFrame>,
    begun: bool,
    ended: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames in presentation order.
    pub fn frames(&self) -> &[OwnedFrame] {
        &self.frames
    }

    pub fn last(&self) -> Option<&OwnedFrame> {
        self.frames.last()
    }

    pub fn begun(&self) -> bool {
        self.begun
    }

    pub fn ended(&self) -> bool {
        self.ended
    }
}

impl PresentSink for MemorySink {
    fn begin(&mut self) -> RayfanResult<()> {
        self.begun = true;
        self.ended = false;
        self.frames.clear();
        Ok(())
    }

    fn present(&mut self, frame: FrameRef<'_>) -> RayfanResult<()> {
        self.frames.push(OwnedFrame {
            width: frame.width,
            height: frame.height,
            data: frame.data.to_vec(),
        });
        Ok(())
    }

    fn end(&mut self) -> RayfanResult<()> {
        self.ended = true;
        Ok(())
    }
}

/// Writes each presented frame as `frame_NNNN.png` under a directory.
#[derive(Debug)]
pub struct PngDirSink {
    dir: PathBuf,
    next_index: u64,
}

impl PngDirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            next_index: 0,
        }
    }

    pub fn frames_written(&self) -> u64 {
        self.next_index
    }
}

impl PresentSink for PngDirSink {
    fn begin(&mut self) -> RayfanResult<()> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| RayfanError::present(format!("create '{}': {e}", self.dir.display())))?;
        self.next_index = 0;
        Ok(())
    }

    fn present(&mut self, frame: FrameRef<'_>) -> RayfanResult<()> {
        let path = self.dir.join(format!("frame_{:04}.png", self.next_index));
        write_png(&path, frame)?;
        self.next_index += 1;
        Ok(())
    }

    fn end(&mut self) -> RayfanResult<()> {
        Ok(())
    }
}

/// Straightens alpha and writes a PNG. Viewers composite straight-alpha
/// PNGs, so premultiplied channels are divided back out first.
pub fn write_png(path: &Path, frame: FrameRef<'_>) -> RayfanResult<()> {
    let mut out = Vec::with_capacity(frame.data.len());
    for px in frame.data.chunks_exact(4) {
        let a = px[3];
        if a == 0 {
            out.extend_from_slice(&[0, 0, 0, 0]);
        } else {
            let un = |c: u8| ((u32::from(c) * 255 + u32::from(a) / 2) / u32::from(a)).min(255) as u8;
            out.extend_from_slice(&[un(px[0]), un(px[1]), un(px[2]), a]);
        }
    }
    let img = image::RgbaImage::from_raw(frame.width, frame.height, out)
        .ok_or_else(|| RayfanError::present("frame data does not match its dimensions"))?;
    img.save(path)
        .map_err(|e| RayfanError::present(format!("write '{}': {e}", path.display())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_records_lifecycle_and_frames() {
        let mut sink = MemorySink::new();
        assert!(!sink.begun());
        sink.begin().unwrap();
        assert!(sink.begun());
        assert!(!sink.ended());

        let data = vec![1u8; 2 * 2 * 4];
        sink.present(FrameRef {
            width: 2,
            height: 2,
            data: &data,
        })
        .unwrap();
        assert_eq!(sink.frames().len(), 1);
        assert_eq!(sink.last().unwrap().width, 2);
        assert_eq!(sink.last().unwrap().data, data);

        sink.end().unwrap();
        assert!(sink.ended());

        // A fresh begin clears recorded frames.
        sink.begin().unwrap();
        assert!(sink.frames().is_empty());
        assert!(!sink.ended());
    }

    #[test]
    fn write_png_round_trips_through_straight_alpha() {
        let dir = std::env::temp_dir().join("rayfan_sink_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("px.png");

        // One premultiplied half-alpha red pixel next to a transparent one.
        let data = [64u8, 0, 0, 128, 0, 0, 0, 0];
        write_png(
            &path,
            FrameRef {
                width: 2,
                height: 1,
                data: &data,
            },
        )
        .unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (2, 1));
        let p = img.get_pixel(0, 0);
        // 64 * 255 / 128 rounds to 128.
        assert_eq!(p.0, [128, 0, 0, 128]);
        assert_eq!(img.get_pixel(1, 0).0, [0, 0, 0, 0]);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn png_dir_sink_numbers_frames() {
        let dir = std::env::temp_dir().join(format!("rayfan_pngdir_{}", std::process::id()));
        let mut sink = PngDirSink::new(&dir);
        sink.begin().unwrap();

        let data = vec![255u8; 4];
        let frame = FrameRef {
            width: 1,
            height: 1,
            data: &data,
        };
        sink.present(frame).unwrap();
        sink.present(frame).unwrap();
        sink.end().unwrap();

        assert_eq!(sink.frames_written(), 2);
        assert!(dir.join("frame_0000.png").exists());
        assert!(dir.join("frame_0001.png").exists());
        std::fs::remove_dir_all(&dir).ok();
    }
}
