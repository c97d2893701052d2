use crate::{common::*, Pixel, HW, XY};

/// Axis-aligned scale and translation between two pixel spaces.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Transform<T> {
    pub sy: T,
    pub sx: T,
    pub ty: T,
    pub tx: T,
}

impl<T> Transform<T>
where
    T: Copy + Num + PartialOrd,
{
    /// Stretch `src_size` onto `tgt_size` without preserving the aspect ratio.
    pub fn from_sizes_exact(src_size: &Pixel<HW<T>>, tgt_size: &Pixel<HW<T>>) -> Result<Self> {
        ensure!(src_size.is_positive(), "source size must be positive");

        Ok(Self {
            sy: tgt_size.h() / src_size.h(),
            sx: tgt_size.w() / src_size.w(),
            ty: T::zero(),
            tx: T::zero(),
        })
    }
}

impl<T> Mul<&Pixel<XY<T>>> for &Transform<T>
where
    T: Copy + Num,
{
    type Output = Pixel<XY<T>>;

    fn mul(self, rhs: &Pixel<XY<T>>) -> Self::Output {
        Pixel(XY::new(
            rhs.x() * self.sx + self.tx,
            rhs.y() * self.sy + self.ty,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn resize_exact() {
        let transform = Transform::from_sizes_exact(
            &Pixel(HW::from_hw([80.0, 80.0])),
            &Pixel(HW::from_hw([20.0, 40.0])),
        )
        .unwrap();
        let expect = Transform {
            sx: 0.5,
            sy: 0.25,
            tx: 0.0,
            ty: 0.0,
        };
        assert_eq!(transform, expect);
    }

    #[test]
    fn resize_point() {
        let transform = Transform::from_sizes_exact(
            &Pixel(HW::from_hw([720.0, 1280.0])),
            &Pixel(HW::from_hw([224.0, 224.0])),
        )
        .unwrap();
        let point = &transform * &Pixel(XY::new(640.0, 360.0));
        assert_abs_diff_eq!(point.x(), 112.0);
        assert_abs_diff_eq!(point.y(), 112.0);
    }

    #[test]
    fn empty_source_is_rejected() {
        let result = Transform::from_sizes_exact(
            &Pixel(HW::from_hw([0.0, 1280.0])),
            &Pixel(HW::from_hw([224.0, 224.0])),
        );
        assert!(result.is_err());
    }
}
