pub use anyhow::{ensure, Result};
pub use num_traits::{Num, NumCast, ToPrimitive};
pub use serde::{Deserialize, Serialize};
pub use std::ops::Mul;
