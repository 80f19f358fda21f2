use anyhow::Result;
use image::GrayImage;
use std::path::{Path, PathBuf};

/// Intermediate images written by [`DebugDump`], in pipeline order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    HsvMask,
    Cleaned,
    Background,
    Edges,
}

impl Stage {
    pub fn index(&self) -> usize {
        match self {
            Stage::HsvMask => 1,
            Stage::Cleaned => 2,
            Stage::Background => 3,
            Stage::Edges => 4,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Stage::HsvMask => "hsv_mask",
            Stage::Cleaned => "cleaned",
            Stage::Background => "background",
            Stage::Edges => "edges",
        }
    }

    /// Directory name, e.g. `02_cleaned`
    pub fn dir_name(&self) -> String {
        format!("{:02}_{}", self.index(), self.name())
    }
}

/// Saves every stage image of every processed frame under one directory.
///
/// Layout is `NN_stage/frame_NNNN.png`, one frame number per processed
/// frame. Write failures are logged and otherwise ignored.
#[derive(Debug)]
pub struct DebugDump {
    output_dir: PathBuf,
    frame: u64,
}

impl DebugDump {
    /// The directory must be empty or non-existent
    pub fn new(output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(anyhow::anyhow!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                ));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        Ok(Self {
            output_dir,
            frame: 0,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Start numbering images for the next frame
    pub fn next_frame(&mut self) {
        self.frame += 1;
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn save(&self, stage: Stage, image: &GrayImage) {
        if let Err(e) = self.try_save(stage, image) {
            log::warn!("failed to save {} debug image: {}", stage.name(), e);
        }
    }

    fn try_save(&self, stage: Stage, image: &GrayImage) -> Result<()> {
        let step_dir = self.output_dir.join(stage.dir_name());
        std::fs::create_dir_all(&step_dir)?;

        let filename = format!("frame_{:04}.png", self.frame);
        image
            .save(step_dir.join(&filename))
            .map_err(|e| anyhow::anyhow!("Failed to save debug image: {}", e))?;

        log::trace!("debug: saved {}/{}", stage.dir_name(), filename);
        Ok(())
    }
}
