//! Render passes and draw-order layers that layered effects are bucketed by.

use crate::error::EffectError;

/// The render pass an effect is drawn in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum RenderTarget {
    /// UI compositing pass.
    Overlay,
    /// In-scene pass.
    WorldSpace,
}

impl RenderTarget {
    /// All targets, in bucket index order.
    pub const ALL: [RenderTarget; 2] = [RenderTarget::Overlay, RenderTarget::WorldSpace];

    pub(crate) fn index(self) -> usize {
        match self {
            RenderTarget::Overlay => 0,
            RenderTarget::WorldSpace => 1,
        }
    }
}

/// Draw-order group within a render target. Lower layers draw first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct Layer(u8);

impl Layer {
    /// Number of layers per render target.
    pub const COUNT: usize = 3;

    /// All layers in draw order.
    pub const ALL: [Layer; Self::COUNT] = [Layer(0), Layer(1), Layer(2)];

    /// Validate a layer ordinal.
    pub fn new(ordinal: u8) -> Result<Self, EffectError> {
        if (ordinal as usize) < Self::COUNT {
            Ok(Self(ordinal))
        } else {
            Err(EffectError::InvalidLayer(ordinal))
        }
    }

    /// The raw ordinal.
    pub fn ordinal(self) -> u8 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_accepts_valid_ordinals() {
        for ordinal in 0..3 {
            assert_eq!(Layer::new(ordinal).unwrap().ordinal(), ordinal);
        }
    }

    #[test]
    fn test_layer_rejects_out_of_range() {
        assert!(matches!(Layer::new(3), Err(EffectError::InvalidLayer(3))));
        assert!(matches!(Layer::new(255), Err(EffectError::InvalidLayer(255))));
    }

    #[test]
    fn test_default_layer_is_zero() {
        assert_eq!(Layer::default(), Layer::ALL[0]);
    }

    #[test]
    fn test_layers_sort_in_draw_order() {
        let mut layers = vec![Layer::ALL[2], Layer::ALL[0], Layer::ALL[1]];
        layers.sort();
        assert_eq!(layers, Layer::ALL.to_vec());
    }
}
