//! Forward-only matrix operations used by brains.
//!
//! Every operation is a plain function over `Array2<f32>`; there is no
//! computation graph and no gradient bookkeeping.

use std::fmt;
use std::str::FromStr;

use ndarray::Array2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Errors raised by the numeric engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NumericError {
    /// Operand shapes do not line up.
    #[error("dimension mismatch in {operation}: left is {left:?}, right is {right:?}")]
    DimensionMismatch {
        /// Name of the failing operation.
        operation: &'static str,
        /// Shape of the left operand.
        left: (usize, usize),
        /// Shape of the right operand.
        right: (usize, usize),
    },
    /// A filter tag outside the known catalog.
    #[error("invalid filter type: {0}")]
    InvalidFilterType(String),
}

/// Activation applied elementwise to a layer's pre-activation values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FilterType {
    /// Hyperbolic tangent, output in [-1, 1].
    Tanh,
    /// Rectified linear unit, output in [0, inf).
    Relu,
    /// Logistic sigmoid, output in [0, 1].
    Sigmoid,
}

impl FilterType {
    /// Every filter a brain may choose from.
    pub const ALL: [FilterType; 3] = [FilterType::Tanh, FilterType::Relu, FilterType::Sigmoid];

    /// Stable string tag used in persisted brains.
    pub fn as_str(self) -> &'static str {
        match self {
            FilterType::Tanh => "tanh",
            FilterType::Relu => "relu",
            FilterType::Sigmoid => "sigmoid",
        }
    }

    /// Draws one filter uniformly from [`FilterType::ALL`].
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    #[inline]
    fn apply(self, x: f32) -> f32 {
        match self {
            FilterType::Tanh => x.tanh(),
            FilterType::Relu => x.max(0.0),
            FilterType::Sigmoid => 1.0 / (1.0 + (-x).exp()),
        }
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterType {
    type Err = NumericError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|filter| filter.as_str() == s)
            .ok_or_else(|| NumericError::InvalidFilterType(s.to_string()))
    }
}

impl TryFrom<String> for FilterType {
    type Error = NumericError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FilterType> for String {
    fn from(filter: FilterType) -> Self {
        filter.as_str().to_string()
    }
}

/// Creates a `rows × cols` matrix of zeros.
pub fn zeros(rows: usize, cols: usize) -> Array2<f32> {
    Array2::zeros((rows, cols))
}

/// Creates a `rows × cols` matrix with entries drawn uniformly from
/// `[mean - scale, mean + scale)`.
pub fn random_uniform<R: Rng + ?Sized>(
    rows: usize,
    cols: usize,
    mean: f32,
    scale: f32,
    rng: &mut R,
) -> Array2<f32> {
    Array2::from_shape_simple_fn((rows, cols), || {
        mean + (rng.random::<f32>() * 2.0 - 1.0) * scale
    })
}

/// Standard matrix product `a · b`.
pub fn multiply(a: &Array2<f32>, b: &Array2<f32>) -> Result<Array2<f32>, NumericError> {
    if a.ncols() != b.nrows() {
        return Err(NumericError::DimensionMismatch {
            operation: "multiply",
            left: a.dim(),
            right: b.dim(),
        });
    }
    Ok(a.dot(b))
}

/// Adds the column vector `bias` (`rows × 1`) to every column of `a`.
pub fn add_broadcast_column(
    a: &Array2<f32>,
    bias: &Array2<f32>,
) -> Result<Array2<f32>, NumericError> {
    if bias.ncols() != 1 || bias.nrows() != a.nrows() {
        return Err(NumericError::DimensionMismatch {
            operation: "add_broadcast_column",
            left: a.dim(),
            right: bias.dim(),
        });
    }
    Ok(a + bias)
}

/// Applies `filter` elementwise, returning a new matrix.
pub fn apply_filter(a: &Array2<f32>, filter: FilterType) -> Array2<f32> {
    a.mapv(|x| filter.apply(x))
}
