//! Ball annotation types shared by the aligner and the dataset index.

use anyhow::{bail, Error, Result};
use geometry::{Pixel, Ratio, Transform, HW, XY};
use num_traits::Num;
use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, fmt, ops::Mul, path::PathBuf};

/// How well the ball can be seen in a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// The ball is not within the frame.
    Invisible,
    Visible,
    /// Visible but hard to identify, e.g. motion blur.
    Blurred,
    Occluded,
}

impl Visibility {
    pub fn code(&self) -> u8 {
        match self {
            Self::Invisible => 0,
            Self::Visible => 1,
            Self::Blurred => 2,
            Self::Occluded => 3,
        }
    }
}

impl TryFrom<u8> for Visibility {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        let visibility = match code {
            0 => Self::Invisible,
            1 => Self::Visible,
            2 => Self::Blurred,
            3 => Self::Occluded,
            _ => bail!("invalid visibility code {}", code),
        };
        Ok(visibility)
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Invisible => "invisible",
            Self::Visible => "visible",
            Self::Blurred => "blurred",
            Self::Occluded => "occluded",
        };
        f.write_str(name)
    }
}

/// The motion phase of the ball in a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionPhase {
    Flying,
    Hit,
    Bouncing,
}

impl MotionPhase {
    pub fn code(&self) -> u8 {
        match self {
            Self::Flying => 0,
            Self::Hit => 1,
            Self::Bouncing => 2,
        }
    }
}

impl TryFrom<u8> for MotionPhase {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        let phase = match code {
            0 => Self::Flying,
            1 => Self::Hit,
            2 => Self::Bouncing,
            _ => bail!("invalid status code {}", code),
        };
        Ok(phase)
    }
}

impl fmt::Display for MotionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Flying => "flying",
            Self::Hit => "hit",
            Self::Bouncing => "bouncing",
        };
        f.write_str(name)
    }
}

/// One row of a clip's `Label.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRow {
    #[serde(rename = "file name")]
    pub file_name: PathBuf,
    #[serde(default)]
    pub visibility: Option<u8>,
    #[serde(rename = "x-coordinate")]
    pub x: Option<f64>,
    #[serde(rename = "y-coordinate")]
    pub y: Option<f64>,
    #[serde(default)]
    pub status: Option<u8>,
}

impl AnnotationRow {
    /// Build the pixel-space label of this row.
    ///
    /// It returns `Ok(None)` if the row carries no coordinates.
    pub fn to_pixel_label(&self) -> Result<Option<PixelLabel<f64>>> {
        let visibility = self.visibility.map(Visibility::try_from).transpose()?;
        let status = self.status.map(MotionPhase::try_from).transpose()?;

        let point = match (self.x, self.y) {
            (Some(x), Some(y)) => {
                if !(x.is_finite() && y.is_finite()) {
                    bail!(
                        "non-finite coordinate ({}, {}) for '{}'",
                        x,
                        y,
                        self.file_name.display()
                    );
                }
                Pixel(XY::new(x, y))
            }
            (None, None) => return Ok(None),
            _ => bail!(
                "only one of the coordinates is present for '{}'",
                self.file_name.display()
            ),
        };

        Ok(Some(Label {
            point,
            visibility,
            status,
        }))
    }
}

/// One row of the normalized copy of a clip's annotation table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRow {
    #[serde(rename = "file name")]
    pub file_name: PathBuf,
    pub visibility: Option<Visibility>,
    pub status: Option<MotionPhase>,
    #[serde(rename = "x-coordinate")]
    pub x: f32,
    #[serde(rename = "y-coordinate")]
    pub y: f32,
}

/// A ball position with optional per-frame metadata.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Label<P> {
    pub point: P,
    pub visibility: Option<Visibility>,
    pub status: Option<MotionPhase>,
}

pub type PixelLabel<T> = Label<Pixel<XY<T>>>;
pub type RatioLabel<T> = Label<Ratio<XY<T>>>;

impl<T> PixelLabel<T>
where
    T: Copy + Num + PartialOrd,
{
    /// Express the position as a fraction of `size`.
    pub fn to_ratio_label(&self, size: &Pixel<HW<T>>) -> RatioLabel<T> {
        Label {
            point: self.point.to_ratio(size),
            visibility: self.visibility,
            status: self.status,
        }
    }
}

impl<'a, T> Mul<&'a PixelLabel<T>> for &'a Transform<T>
where
    T: Copy + Num,
{
    type Output = PixelLabel<T>;

    fn mul(self, rhs: &'a PixelLabel<T>) -> Self::Output {
        Label {
            point: self * &rhs.point,
            visibility: rhs.visibility,
            status: rhs.status,
        }
    }
}
