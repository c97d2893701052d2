//! Unit wrappers that keep pixel-space and ratio-space values apart.

use crate::{common::*, HW, XY};

/// Declare a transparent newtype that tags a value with a unit.
///
#[macro_export]
macro_rules! unit_wrapper {
    ($name:ident) => { $crate::unit_wrapper!(() $name); };
    (pub $name:ident) => { $crate::unit_wrapper!((pub) $name); };
    (($($vis:tt)*) $name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        $($vis)* struct $name<T>(pub T);

        impl<T> From<T> for $name<T> {
            fn from(value: T) -> Self {
                Self(value)
            }
        }

        impl<T> std::ops::Deref for $name<T> {
            type Target = T;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }
    };
}

unit_wrapper!(pub Pixel);
unit_wrapper!(pub Ratio);

impl<T> Pixel<XY<T>>
where
    T: Copy + Num + PartialOrd,
{
    /// Express a pixel position as a fraction of the image size.
    pub fn to_ratio(&self, size: &Pixel<HW<T>>) -> Ratio<XY<T>> {
        Ratio(XY::new(self.x() / size.w(), self.y() / size.h()))
    }
}

impl<T> Ratio<XY<T>>
where
    T: Copy + Num + PartialOrd,
{
    /// Check if both components lie in [0, 1].
    pub fn is_unit_range(&self) -> bool {
        let range = T::zero()..=T::one();
        range.contains(&self.x()) && range.contains(&self.y())
    }
}
