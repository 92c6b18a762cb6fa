//! Dense linear model with a lazily applied L2 scale factor.
//!
//! [`LinearModel`] stores its weights as an unscaled vector `v` plus a single
//! multiplier `scale`, so the true weight at index `i` is `scale * v[i]`.
//! Shrinking every weight by a constant is then a single multiplication on
//! `scale`, and a sparse update touches only the coordinates of one example.
//! Every read path ([`LinearModel::score`], [`LinearModel::weights`],
//! [`LinearModel::save`]) observes the resolved values.
//!
//! # Artifact Format
//!
//! [`LinearModel::save`] writes a little-endian binary artifact:
//!
//! - `[u8; 4]` magic `SGDM`
//! - `u32` format version
//! - `u64` width
//! - `u8` bias flag (0 or 1)
//! - `f64` bias
//! - `width × f64` resolved weights

use std::io::{self, Read, Write};

use crate::error::{Result, SgdError};
use crate::feature::FeatureVector;

/// Magic bytes at the start of every binary model artifact.
pub const MODEL_MAGIC: [u8; 4] = *b"SGDM";

/// Current binary artifact version.
pub const MODEL_FORMAT_VERSION: u32 = 1;

/// Below this the scale factor is folded back into the stored weights.
const MIN_SCALE: f64 = 1e-9;

/// A linear model `s = w·x + b` over a fixed-width feature space.
#[derive(Debug, Clone)]
pub struct LinearModel {
    /// Unscaled weights; the true weight is `scale * weights[i]`.
    weights: Vec<f64>,

    /// Running multiplier applied to every weight.
    scale: f64,

    /// The bias term (always zero when `use_bias` is false).
    bias: f64,

    /// Whether the model carries a bias term.
    use_bias: bool,
}

impl LinearModel {
    /// Creates a zero-initialized model with a bias term.
    ///
    /// # Errors
    ///
    /// Returns [`SgdError::Configuration`] if `width` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use sgdtk_core::{FeatureVector, LinearModel};
    ///
    /// let model = LinearModel::new(4).unwrap();
    /// let fv = FeatureVector::from_pairs(1.0, [(3, 2.0)]).unwrap();
    /// assert_eq!(model.score(&fv).unwrap(), 0.0);
    /// ```
    pub fn new(width: usize) -> Result<Self> {
        Self::with_bias(width, true)
    }

    /// Creates a zero-initialized model, optionally without a bias term.
    pub fn with_bias(width: usize, use_bias: bool) -> Result<Self> {
        if width == 0 {
            return Err(SgdError::config("model width must be at least 1"));
        }
        Ok(Self {
            weights: vec![0.0; width],
            scale: 1.0,
            bias: 0.0,
            use_bias,
        })
    }

    /// Builds a model from resolved weights and a bias.
    ///
    /// Passing `None` for `bias` builds a model without a bias term.
    pub fn from_parts(weights: Vec<f64>, bias: Option<f64>) -> Result<Self> {
        if weights.is_empty() {
            return Err(SgdError::config("model width must be at least 1"));
        }
        Ok(Self {
            weights,
            scale: 1.0,
            bias: bias.unwrap_or(0.0),
            use_bias: bias.is_some(),
        })
    }

    /// Returns the width of the feature space.
    #[inline]
    pub fn width(&self) -> usize {
        self.weights.len()
    }

    /// Returns whether the model carries a bias term.
    #[inline]
    pub fn has_bias(&self) -> bool {
        self.use_bias
    }

    /// Returns the bias term (zero when the model has none).
    #[inline]
    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Returns the resolved weight at `index`.
    pub fn weight(&self, index: usize) -> Result<f64> {
        self.weights
            .get(index)
            .map(|v| self.scale * v)
            .ok_or(SgdError::Dimension {
                index,
                width: self.width(),
            })
    }

    /// Returns a copy of all resolved weights.
    pub fn weights(&self) -> Vec<f64> {
        self.weights.iter().map(|v| self.scale * v).collect()
    }

    /// Computes `w·x + b` over the non-zero entries of `fv`.
    ///
    /// # Errors
    ///
    /// Returns [`SgdError::Dimension`] if any index of `fv` is not below the
    /// model width.
    pub fn score(&self, fv: &FeatureVector) -> Result<f64> {
        let mut dot = 0.0;
        for (index, value) in fv.iter() {
            let v = self.weights.get(index).ok_or(SgdError::Dimension {
                index,
                width: self.width(),
            })?;
            dot += self.scale * v * value;
        }
        Ok(dot + self.bias)
    }

    /// Returns `‖w‖²` over the resolved weights, excluding the bias.
    pub fn squared_norm(&self) -> f64 {
        let sum: f64 = self.weights.iter().map(|v| v * v).sum();
        sum * self.scale * self.scale
    }

    /// Multiplies every weight by `factor` in constant time.
    ///
    /// When the running scale collapses to zero or underflows, it is folded
    /// into the stored weights, which costs one pass over the vector.
    pub(crate) fn scale_weights(&mut self, factor: f64) {
        let scale = self.scale * factor;
        if scale == 0.0 {
            self.weights.fill(0.0);
            self.scale = 1.0;
        } else if scale.abs() < MIN_SCALE {
            self.scale = scale;
            self.normalize();
        } else {
            self.scale = scale;
        }
    }

    /// Adds `coeff * x[i]` to the resolved weight of every entry of `fv`.
    pub(crate) fn add_scaled(&mut self, fv: &FeatureVector, coeff: f64) -> Result<()> {
        let width = self.width();
        let inv_scale = 1.0 / self.scale;
        for (index, value) in fv.iter() {
            let v = self
                .weights
                .get_mut(index)
                .ok_or(SgdError::Dimension { index, width })?;
            *v += coeff * value * inv_scale;
        }
        Ok(())
    }

    /// Adds `delta` to the bias, if the model has one.
    pub(crate) fn add_bias(&mut self, delta: f64) {
        if self.use_bias {
            self.bias += delta;
        }
    }

    /// Multiplies the bias by `factor`, if the model has one.
    pub(crate) fn scale_bias(&mut self, factor: f64) {
        if self.use_bias {
            self.bias *= factor;
        }
    }

    /// Folds the running scale into the stored weights.
    pub fn normalize(&mut self) {
        if self.scale != 1.0 {
            let scale = self.scale;
            self.weights.iter_mut().for_each(|v| *v *= scale);
            self.scale = 1.0;
        }
    }

    /// Writes the binary model artifact.
    ///
    /// The output depends only on the resolved weights and bias, never on
    /// the internal scale factor.
    pub fn save<W: Write>(&self, mut sink: W) -> Result<()> {
        sink.write_all(&MODEL_MAGIC)?;
        sink.write_all(&MODEL_FORMAT_VERSION.to_le_bytes())?;
        sink.write_all(&(self.width() as u64).to_le_bytes())?;
        sink.write_all(&[u8::from(self.use_bias)])?;
        sink.write_all(&self.bias.to_le_bytes())?;
        for v in &self.weights {
            sink.write_all(&(self.scale * v).to_le_bytes())?;
        }
        sink.flush()?;
        Ok(())
    }

    /// Reads a binary model artifact written by [`LinearModel::save`].
    ///
    /// # Errors
    ///
    /// Returns [`SgdError::Format`] on a bad magic, an unsupported version,
    /// truncated input, or trailing bytes after the last weight.
    pub fn load<R: Read>(mut source: R) -> Result<Self> {
        let mut magic = [0u8; 4];
        read_field(&mut source, &mut magic, "magic")?;
        if magic != MODEL_MAGIC {
            return Err(SgdError::format(format!("bad magic {:?}", magic)));
        }

        let mut buf4 = [0u8; 4];
        read_field(&mut source, &mut buf4, "version")?;
        let version = u32::from_le_bytes(buf4);
        if version != MODEL_FORMAT_VERSION {
            return Err(SgdError::format(format!(
                "unsupported format version {} (expected {})",
                version, MODEL_FORMAT_VERSION
            )));
        }

        let mut buf8 = [0u8; 8];
        read_field(&mut source, &mut buf8, "width")?;
        let width = usize::try_from(u64::from_le_bytes(buf8))
            .map_err(|_| SgdError::format("width does not fit in memory"))?;
        if width == 0 {
            return Err(SgdError::format("width must be at least 1"));
        }

        let mut flag = [0u8; 1];
        read_field(&mut source, &mut flag, "bias flag")?;
        let use_bias = match flag[0] {
            0 => false,
            1 => true,
            other => return Err(SgdError::format(format!("invalid bias flag {}", other))),
        };

        read_field(&mut source, &mut buf8, "bias")?;
        let bias = f64::from_le_bytes(buf8);

        // Grow incrementally so a corrupt width cannot force a huge allocation.
        let mut weights = Vec::with_capacity(width.min(1 << 20));
        for _ in 0..width {
            read_field(&mut source, &mut buf8, "weights")?;
            weights.push(f64::from_le_bytes(buf8));
        }

        let mut trailing = [0u8; 1];
        if source.read(&mut trailing)? != 0 {
            return Err(SgdError::format("trailing bytes after weights"));
        }

        Ok(Self {
            weights,
            scale: 1.0,
            bias,
            use_bias,
        })
    }
}

fn read_field<R: Read>(source: &mut R, buf: &mut [u8], field: &str) -> Result<()> {
    source.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => SgdError::format(format!("truncated {}", field)),
        _ => SgdError::Io(e),
    })
}
