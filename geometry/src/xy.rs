use crate::common::*;

/// A position in image coordinates, x to the right and y downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct XY<T> {
    x: T,
    y: T,
}

impl<T> XY<T> {
    pub fn new(x: T, y: T) -> Self {
        Self { x, y }
    }

    pub fn try_cast<U>(self) -> Option<XY<U>>
    where
        T: ToPrimitive,
        U: NumCast,
    {
        Some(XY {
            x: U::from(self.x)?,
            y: U::from(self.y)?,
        })
    }

    pub fn cast<U>(self) -> XY<U>
    where
        T: ToPrimitive,
        U: NumCast,
    {
        self.try_cast().unwrap()
    }
}

impl<T> XY<T>
where
    T: Copy,
{
    pub fn x(&self) -> T {
        self.x
    }

    pub fn y(&self) -> T {
        self.y
    }

    pub fn xy(&self) -> [T; 2] {
        [self.x, self.y]
    }
}
