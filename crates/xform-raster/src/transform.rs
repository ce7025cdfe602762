//! Back-side transforms for duplex output.
//!
//! The sheet-back keyword names how the hardware presents the back of a
//! sheet; the engine compensates with an affine transform in points space.
//! Every matrix the keyword table produces is one of four axis-aligned
//! remaps, which is what the band filler actually applies.

use crate::header::SheetBack;
use kurbo::Affine;

/// The pixel remap a back-side matrix denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformSteps {
    None,
    FlipVertical,
    FlipHorizontal,
    Rotate180,
}

/// Remap applied to the back side of a duplex sheet.
pub fn back_transform_steps(sheet_back: SheetBack, tumble: bool) -> TransformSteps {
    match (sheet_back, tumble) {
        (SheetBack::Flipped, false) => TransformSteps::FlipVertical,
        (SheetBack::Flipped, true) => TransformSteps::FlipHorizontal,
        (SheetBack::ManualTumble, true) => TransformSteps::Rotate180,
        (SheetBack::Rotated, false) => TransformSteps::Rotate180,
        _ => TransformSteps::None,
    }
}

/// Back-side affine transform in points space for a `width` x `height` page.
pub fn back_transform(
    sheet_back: SheetBack,
    tumble: bool,
    width: f64,
    height: f64,
) -> Affine {
    match back_transform_steps(sheet_back, tumble) {
        TransformSteps::None => Affine::IDENTITY,
        TransformSteps::FlipVertical => Affine::new([1.0, 0.0, 0.0, -1.0, 0.0, height]),
        TransformSteps::FlipHorizontal => Affine::new([-1.0, 0.0, 0.0, 1.0, width, 0.0]),
        TransformSteps::Rotate180 => Affine::new([-1.0, 0.0, 0.0, -1.0, width, height]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flipped_no_tumble_is_vertical_flip() {
        let m = back_transform(SheetBack::Flipped, false, 612.0, 792.0);
        assert_eq!(m.as_coeffs(), [1.0, 0.0, 0.0, -1.0, 0.0, 792.0]);
    }

    #[test]
    fn test_flipped_tumble_is_horizontal_flip() {
        let m = back_transform(SheetBack::Flipped, true, 612.0, 792.0);
        assert_eq!(m.as_coeffs(), [-1.0, 0.0, 0.0, 1.0, 612.0, 0.0]);
    }

    #[test]
    fn test_manual_tumble_rotates() {
        let m = back_transform(SheetBack::ManualTumble, true, 612.0, 792.0);
        assert_eq!(m.as_coeffs(), [-1.0, 0.0, 0.0, -1.0, 612.0, 792.0]);
    }

    #[test]
    fn test_rotated_no_tumble_rotates() {
        let m = back_transform(SheetBack::Rotated, false, 612.0, 792.0);
        assert_eq!(m.as_coeffs(), [-1.0, 0.0, 0.0, -1.0, 612.0, 792.0]);
    }

    #[test]
    fn test_normal_is_identity() {
        assert_eq!(
            back_transform(SheetBack::Normal, false, 612.0, 792.0),
            Affine::IDENTITY
        );
        assert_eq!(
            back_transform(SheetBack::ManualTumble, false, 612.0, 792.0),
            Affine::IDENTITY
        );
        assert_eq!(
            back_transform(SheetBack::Rotated, true, 612.0, 792.0),
            Affine::IDENTITY
        );
    }
}
