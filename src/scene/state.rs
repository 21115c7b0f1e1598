use std::collections::HashSet;

use crate::assets::raster::RasterImage;
use crate::foundation::error::{TbiError, TbiResult};
use crate::scene::layer::{LayerAttr, LayerId, TextLayer};

/// Identifies one cutout request by the image generation it was issued for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CutoutTicket {
    epoch: u64,
}

impl CutoutTicket {
    /// Image generation this request belongs to.
    pub fn epoch(self) -> u64 {
        self.epoch
    }
}

/// Where the subject cutout stands for the current image.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum CutoutSlot {
    /// No image loaded yet.
    #[default]
    Empty,
    /// A request for this image generation is in flight.
    Pending {
        /// Generation the outstanding request was issued for.
        epoch: u64,
    },
    /// Cutout with the same dimensions as the source.
    Ready(RasterImage),
    /// Segmentation failed; the original image is used alone.
    Unavailable {
        /// Why no cutout is available.
        reason: String,
    },
}

/// Coarse view of [`CutoutSlot`] without the pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CutoutStatus {
    /// No image loaded.
    NoImage,
    /// Request in flight.
    Pending,
    /// Cutout available.
    Ready,
    /// Segmentation failed or produced an unusable result.
    Unavailable,
}

/// Root aggregate: source image, subject cutout and ordered text layers.
///
/// Every update consumes the state and returns the next one. Images are shared, so cloning a
/// state to keep history is cheap.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EditorState {
    source: Option<RasterImage>,
    cutout: CutoutSlot,
    layers: Vec<TextLayer>,
    epoch: u64,
}

impl EditorState {
    /// Empty editor: no image, no layers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loaded source image.
    pub fn source(&self) -> Option<&RasterImage> {
        self.source.as_ref()
    }

    /// Natural `(width, height)` of the source image.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.source.as_ref().map(RasterImage::dimensions)
    }

    /// Cutout slot for the current image.
    pub fn cutout_slot(&self) -> &CutoutSlot {
        &self.cutout
    }

    /// The cutout image, when segmentation succeeded.
    pub fn cutout(&self) -> Option<&RasterImage> {
        match &self.cutout {
            CutoutSlot::Ready(img) => Some(img),
            _ => None,
        }
    }

    /// Coarse cutout status.
    pub fn cutout_status(&self) -> CutoutStatus {
        match self.cutout {
            CutoutSlot::Empty => CutoutStatus::NoImage,
            CutoutSlot::Pending { .. } => CutoutStatus::Pending,
            CutoutSlot::Ready(_) => CutoutStatus::Ready,
            CutoutSlot::Unavailable { .. } => CutoutStatus::Unavailable,
        }
    }

    /// Current image generation; bumped on every image load.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Ticket of the outstanding cutout request, if one is pending.
    pub fn pending_ticket(&self) -> Option<CutoutTicket> {
        match self.cutout {
            CutoutSlot::Pending { epoch } => Some(CutoutTicket { epoch }),
            _ => None,
        }
    }

    /// All layers in z-order.
    pub fn layers(&self) -> &[TextLayer] {
        &self.layers
    }

    /// Layers that the compositor draws; empty until the source dimensions are known.
    pub fn renderable_layers(&self) -> &[TextLayer] {
        if self.source.is_some() {
            &self.layers
        } else {
            &[]
        }
    }

    /// Layer with `id`.
    pub fn layer(&self, id: LayerId) -> Option<&TextLayer> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// Id the next added or duplicated layer receives.
    ///
    /// Fails once the largest id is `u32::MAX`; ids are never reused while that layer exists.
    pub fn next_layer_id(&self) -> TbiResult<LayerId> {
        let max = self.layers.iter().map(|l| l.id.0).max().unwrap_or(0);
        max.checked_add(1)
            .map(LayerId)
            .ok_or_else(|| TbiError::validation("text layer ids exhausted"))
    }

    /// Store a newly loaded image and clear any previous cutout.
    ///
    /// Returns the ticket under which segmentation must be requested for this image.
    pub fn with_image(mut self, image: RasterImage) -> (Self, CutoutTicket) {
        self.epoch = self.epoch.wrapping_add(1);
        self.source = Some(image);
        self.cutout = CutoutSlot::Pending { epoch: self.epoch };
        let ticket = CutoutTicket { epoch: self.epoch };
        (self, ticket)
    }

    /// Apply the outcome of the cutout request issued under `ticket`.
    ///
    /// Results for superseded images are discarded. Failures and cutouts whose size differs from
    /// the source downgrade to [`CutoutSlot::Unavailable`].
    pub fn with_cutout(mut self, ticket: CutoutTicket, result: TbiResult<RasterImage>) -> Self {
        if self.pending_ticket() != Some(ticket) {
            tracing::debug!(
                ticket_epoch = ticket.epoch,
                current_epoch = self.epoch,
                "discarding stale cutout result"
            );
            return self;
        }
        let Some(source) = self.source.as_ref() else {
            return self;
        };

        self.cutout = match result {
            Ok(cutout) if cutout.dimensions() == source.dimensions() => CutoutSlot::Ready(cutout),
            Ok(cutout) => {
                let (cw, ch) = cutout.dimensions();
                let (sw, sh) = source.dimensions();
                let reason = format!("cutout is {cw}x{ch} but source is {sw}x{sh}");
                tracing::warn!(%reason, "ignoring cutout, using original image only");
                CutoutSlot::Unavailable { reason }
            }
            Err(e) => {
                tracing::warn!(error = %e, "background removal failed, using original image only");
                CutoutSlot::Unavailable {
                    reason: e.to_string(),
                }
            }
        };
        self
    }

    /// Append a layer with default styling; returns its id.
    pub fn add_text_layer(mut self) -> TbiResult<(Self, LayerId)> {
        let id = self.next_layer_id()?;
        self.layers.push(TextLayer::with_defaults(id));
        Ok((self, id))
    }

    /// Append a copy of layer `id` under a fresh id. No-op when `id` is absent.
    pub fn duplicate_text_layer(mut self, id: LayerId) -> TbiResult<(Self, Option<LayerId>)> {
        let Some(original) = self.layer(id).cloned() else {
            return Ok((self, None));
        };
        let new_id = self.next_layer_id()?;
        self.layers.push(TextLayer {
            id: new_id,
            ..original
        });
        Ok((self, Some(new_id)))
    }

    /// Remove layer `id`. No-op when absent.
    pub fn remove_text_layer(mut self, id: LayerId) -> Self {
        self.layers.retain(|l| l.id != id);
        self
    }

    /// Replace one field of layer `id`. No-op when absent.
    pub fn set_attribute(mut self, id: LayerId, attr: LayerAttr) -> Self {
        if let Some(layer) = self.layers.iter_mut().find(|l| l.id == id) {
            layer.apply(attr);
        }
        self
    }

    /// String-keyed variant of [`EditorState::set_attribute`]; unknown keys are rejected.
    pub fn set_attribute_raw(
        self,
        id: LayerId,
        key: &str,
        value: serde_json::Value,
    ) -> TbiResult<Self> {
        let attr = LayerAttr::parse(key, value)?;
        Ok(self.set_attribute(id, attr))
    }

    /// Replace all layers, e.g. when restoring a project. Ids must be unique.
    pub fn with_layers(mut self, layers: Vec<TextLayer>) -> TbiResult<Self> {
        let mut seen = HashSet::new();
        for l in &layers {
            if !seen.insert(l.id) {
                return Err(TbiError::validation(format!(
                    "duplicate text layer id {}",
                    l.id
                )));
            }
        }
        self.layers = layers;
        Ok(self)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/state.rs"]
mod tests;
