//! March: left and right halves take turns.

use rand::RngCore;

use super::Scene;
use crate::indicator::{IndicatorId, PsiImage, RowFill};
use crate::render::{DisplayId, Grid, ROWS};

/// Columns left of the midpoint; the right half gets the rest
pub(super) fn left_mask(id: DisplayId) -> u32 {
    (1u32 << (id.width() / 2)) - 1
}

fn half(id: DisplayId, left: bool) -> Grid {
    let mask = if left {
        left_mask(id)
    } else {
        id.mask() & !left_mask(id)
    };
    [mask; ROWS]
}

pub(super) fn render<R: RngCore + ?Sized>(phase: u16, scene: &mut Scene<'_, R>) {
    let left = phase % 2 == 0;
    scene.all_displays(|id| half(id, left));

    let fill = if left { RowFill::Color1 } else { RowFill::Color2 };
    for id in IndicatorId::ALL {
        let colors = scene.profile.psi_colors[id.index()];
        scene.indicator(id, &PsiImage::filled(fill), colors);
    }
}
