//! Alarm: everything flashes.

use rand::RngCore;

use super::Scene;
use crate::indicator::palette::{BLUE, RED};
use crate::indicator::{IndicatorId, PsiImage, RowFill};
use crate::render::full_grid;

/// Even phases all on with indicators in color 1, odd phases all off with
/// indicators in color 2. Indicator colors are fixed red/blue.
pub(super) fn render<R: RngCore + ?Sized>(phase: u16, scene: &mut Scene<'_, R>) {
    let on = phase % 2 == 0;
    scene.all_displays(|id| if on { full_grid(id) } else { [0; 5] });

    let fill = if on { RowFill::Color1 } else { RowFill::Color2 };
    for id in IndicatorId::ALL {
        scene.indicator(id, &PsiImage::filled(fill), [RED, BLUE]);
    }
}
