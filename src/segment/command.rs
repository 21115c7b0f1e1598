use std::process::{Command, Stdio};

use anyhow::Context;

use crate::assets::decode::decode_image;
use crate::assets::raster::RasterImage;
use crate::encode::png::encode_png_premul;
use crate::foundation::error::{TbiError, TbiResult};
use crate::segment::segmenter::{Segmenter, ensure_same_size};

const INPUT_PLACEHOLDER: &str = "{input}";
const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Runs an external background-removal program, e.g. `rembg i {input} {output}`.
///
/// The source is written as PNG into a private temp directory; `{input}` and `{output}` in the
/// argument list are replaced by the file paths. Without placeholders both paths are appended.
#[derive(Clone, Debug)]
pub struct CommandSegmenter {
    program: String,
    args: Vec<String>,
}

impl CommandSegmenter {
    /// Build from an argv-style list; the first element is the program.
    pub fn new(argv: Vec<String>) -> TbiResult<Self> {
        let mut it = argv.into_iter();
        let program = it
            .next()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| TbiError::validation("segmenter command must name a program"))?;
        let mut args: Vec<String> = it.collect();
        let has_placeholders = args
            .iter()
            .any(|a| a.contains(INPUT_PLACEHOLDER) || a.contains(OUTPUT_PLACEHOLDER));
        if !has_placeholders {
            args.push(INPUT_PLACEHOLDER.to_owned());
            args.push(OUTPUT_PLACEHOLDER.to_owned());
        }
        Ok(Self { program, args })
    }

    /// Program that will be spawned.
    pub fn program(&self) -> &str {
        &self.program
    }

    fn expand_args(&self, input: &str, output: &str) -> Vec<String> {
        self.args
            .iter()
            .map(|a| {
                a.replace(INPUT_PLACEHOLDER, input)
                    .replace(OUTPUT_PLACEHOLDER, output)
            })
            .collect()
    }
}

impl Segmenter for CommandSegmenter {
    fn name(&self) -> &str {
        &self.program
    }

    #[tracing::instrument(skip(self, image), fields(program = %self.program))]
    fn segment(&self, image: &RasterImage) -> TbiResult<RasterImage> {
        let dir = tempfile::tempdir().context("create segmentation temp dir")?;
        let input = dir.path().join("input.png");
        let output = dir.path().join("output.png");

        let png = encode_png_premul(image.width(), image.height(), image.premul_bytes())?;
        std::fs::write(&input, png)
            .with_context(|| format!("write segmentation input '{}'", input.display()))?;

        let args = self.expand_args(&input.to_string_lossy(), &output.to_string_lossy());
        let out = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                TbiError::segmentation(format!("failed to spawn '{}': {e}", self.program))
            })?;

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            return Err(TbiError::segmentation(format!(
                "'{}' exited with {}: {}",
                self.program,
                out.status,
                stderr.trim()
            )));
        }

        let bytes = std::fs::read(&output).map_err(|e| {
            TbiError::segmentation(format!(
                "'{}' did not produce '{}': {e}",
                self.program,
                output.display()
            ))
        })?;
        let cutout = decode_image(&bytes)
            .map_err(|e| TbiError::segmentation(format!("decode cutout: {e}")))?;
        ensure_same_size(image, &cutout)?;
        Ok(cutout)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/segment/command.rs"]
mod tests;
