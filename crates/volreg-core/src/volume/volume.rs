//! Volume type backed by a 3D tensor.
//!
//! Volumes are indexed `[row, column, depth]`. Boolean volumes (masks) are
//! stored as `0.0` / `1.0` floats; any voxel above `0.5` counts as set.

use burn::tensor::backend::Backend;
use burn::tensor::{ElementConversion, Tensor, TensorData};

use crate::error::{CoreError, Result};

/// Value above which a voxel is considered "on" in a boolean volume.
pub const MASK_THRESHOLD: f32 = 0.5;

/// 3D scalar or boolean volume.
///
/// # Type Parameters
/// * `B` - The backend (CPU or GPU) for tensor operations
///
/// # Examples
/// ```rust
/// use volreg_core::Volume;
/// use burn_ndarray::NdArray;
///
/// type Backend = NdArray<f32>;
///
/// let device = Default::default();
/// let volume = Volume::<Backend>::zeros([4, 5, 6], &device);
/// assert_eq!(volume.shape(), [4, 5, 6]);
/// ```
#[derive(Debug, Clone)]
pub struct Volume<B: Backend> {
    data: Tensor<B, 3>,
}

impl<B: Backend> Volume<B> {
    /// Wrap an existing `[rows, cols, depth]` tensor.
    pub fn new(data: Tensor<B, 3>) -> Self {
        Self { data }
    }

    /// Volume of zeros.
    pub fn zeros(shape: [usize; 3], device: &B::Device) -> Self {
        Self::new(Tensor::zeros(shape, device))
    }

    /// Build from a row-major buffer of intensities.
    pub fn from_f32(values: Vec<f32>, shape: [usize; 3], device: &B::Device) -> Result<Self> {
        validate_shape(shape)?;
        let expected = shape.iter().product::<usize>();
        if values.len() != expected {
            return Err(CoreError::invalid_volume(format!(
                "buffer holds {} voxels but shape {:?} needs {}",
                values.len(),
                shape,
                expected
            )));
        }
        let data = Tensor::<B, 3>::from_data(TensorData::new(values, shape), device);
        Ok(Self::new(data))
    }

    /// Build a boolean volume from a row-major buffer.
    pub fn from_bools(values: &[bool], shape: [usize; 3], device: &B::Device) -> Result<Self> {
        let floats = values.iter().map(|&v| if v { 1.0 } else { 0.0 }).collect();
        Self::from_f32(floats, shape, device)
    }

    /// Build by evaluating `f(row, col, depth)` for every voxel.
    pub fn from_fn<F>(shape: [usize; 3], device: &B::Device, f: F) -> Result<Self>
    where
        F: Fn(usize, usize, usize) -> f32,
    {
        validate_shape(shape)?;
        let [rows, cols, depth] = shape;
        let mut values = Vec::with_capacity(rows * cols * depth);
        for r in 0..rows {
            for c in 0..cols {
                for k in 0..depth {
                    values.push(f(r, c, k));
                }
            }
        }
        Self::from_f32(values, shape, device)
    }

    /// Get the volume data tensor.
    pub fn data(&self) -> &Tensor<B, 3> {
        &self.data
    }

    pub fn into_tensor(self) -> Tensor<B, 3> {
        self.data
    }

    /// Shape as `[rows, cols, depth]`.
    pub fn shape(&self) -> [usize; 3] {
        self.data.dims()
    }

    pub fn num_voxels(&self) -> usize {
        self.shape().iter().product()
    }

    pub fn device(&self) -> B::Device {
        self.data.device()
    }

    /// Fail with `ShapeMismatch` unless `other` has the same shape.
    pub fn ensure_same_shape(&self, other: &Self) -> Result<()> {
        let (expected, actual) = (self.shape(), other.shape());
        if expected != actual {
            return Err(CoreError::shape_mismatch(expected, actual));
        }
        Ok(())
    }

    /// Fail with `InvalidVolume` if any axis has length zero.
    ///
    /// `new` and `zeros` accept any shape, so consumers that index into the
    /// volume check this first.
    pub fn ensure_non_empty(&self) -> Result<()> {
        validate_shape(self.shape())
    }

    /// Binarise: voxels strictly above `threshold` become 1, the rest 0.
    pub fn to_mask(&self, threshold: f32) -> Self {
        Self::new(self.data.clone().greater_elem(threshold).float())
    }

    /// Number of voxels that are set in a boolean volume.
    pub fn count_true(&self) -> usize {
        let total = self
            .data
            .clone()
            .greater_elem(MASK_THRESHOLD)
            .int()
            .sum()
            .into_scalar()
            .elem::<i64>();
        total as usize
    }

    /// Copy all voxels out in row-major order.
    pub fn to_vec(&self) -> Vec<f32> {
        self.data.clone().into_data().iter::<f32>().collect()
    }

    /// Read one voxel; `None` outside the volume.
    pub fn value_at(&self, index: [usize; 3]) -> Option<f32> {
        let [rows, cols, depth] = self.shape();
        let [r, c, k] = index;
        if r >= rows || c >= cols || k >= depth {
            return None;
        }
        let voxel = self.data.clone().slice([r..r + 1, c..c + 1, k..k + 1]);
        Some(voxel.into_scalar().elem::<f32>())
    }
}

fn validate_shape(shape: [usize; 3]) -> Result<()> {
    if shape.iter().any(|&len| len == 0) {
        return Err(CoreError::invalid_volume(format!(
            "every axis needs at least one voxel, got {:?}",
            shape
        )));
    }
    Ok(())
}
