use burn::tensor::backend::Backend;
use burn::tensor::{Int, Tensor};

use crate::transform::Transform;

/// Generate the voxel coordinates of every voxel in a volume.
///
/// Returns a tensor of shape `[N, 3]` holding `(x, y, z) = (col, row, depth)`
/// in row-major voxel order, so row `i` of the result belongs to flat voxel
/// `i` of a `[rows, cols, depth]` tensor.
///
/// # Arguments
/// * `shape` - The volume shape `[rows, cols, depth]`
/// * `device` - The device to create the tensor on
pub fn voxel_coordinates<B: Backend>(shape: [usize; 3], device: &B::Device) -> Tensor<B, 2> {
    let [rows, cols, depth] = shape;
    let total = rows * cols * depth;

    let r_range = Tensor::<B, 1, Int>::arange(0..rows as i64, device);
    let c_range = Tensor::<B, 1, Int>::arange(0..cols as i64, device);
    let k_range = Tensor::<B, 1, Int>::arange(0..depth as i64, device);

    let r_grid = r_range.reshape([rows, 1, 1]).repeat(&[1, cols, depth]).reshape([total]);
    let c_grid = c_range.reshape([1, cols, 1]).repeat(&[rows, 1, depth]).reshape([total]);
    let k_grid = k_range.reshape([1, 1, depth]).repeat(&[rows, cols, 1]).reshape([total]);

    Tensor::cat(
        vec![
            c_grid.float().unsqueeze_dim(1),
            r_grid.float().unsqueeze_dim(1),
            k_grid.float().unsqueeze_dim(1),
        ],
        1,
    )
}

/// Source coordinates to sample for every voxel of an output volume.
///
/// Built fresh for each resampling call: output voxel coordinates are pushed
/// through the (already inverted) transform to find where each output voxel
/// comes from in the source volume.
#[derive(Debug, Clone)]
pub struct SamplingGrid<B: Backend> {
    shape: [usize; 3],
    points: Tensor<B, 2>,
}

impl<B: Backend> SamplingGrid<B> {
    /// Map every voxel of an output volume of `shape` through `source_from_output`.
    pub fn new<T: Transform<B>>(
        shape: [usize; 3],
        source_from_output: &T,
        device: &B::Device,
    ) -> Self {
        let points = source_from_output.transform_points(voxel_coordinates::<B>(shape, device));
        Self { shape, points }
    }

    /// Output shape the grid was built for.
    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// Source points as a `[N, 3]` tensor of `(x, y, z)`.
    pub fn points(&self) -> &Tensor<B, 2> {
        &self.points
    }

    pub fn into_points(self) -> Tensor<B, 2> {
        self.points
    }

    /// Source x (column) coordinate of each output voxel.
    pub fn x(&self) -> Tensor<B, 3> {
        self.axis(0)
    }

    /// Source y (row) coordinate of each output voxel.
    pub fn y(&self) -> Tensor<B, 3> {
        self.axis(1)
    }

    /// Source z (depth) coordinate of each output voxel.
    pub fn z(&self) -> Tensor<B, 3> {
        self.axis(2)
    }

    fn axis(&self, column: usize) -> Tensor<B, 3> {
        let [n, _] = self.points.dims();
        self.points
            .clone()
            .slice([0..n, column..column + 1])
            .reshape(self.shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::HomogeneousTransform;
    use burn_ndarray::NdArray;

    type Backend = NdArray<f32>;

    #[test]
    fn test_voxel_coordinates_order() {
        let device = Default::default();
        let grid = voxel_coordinates::<Backend>([2, 3, 2], &device);
        assert_eq!(grid.dims(), [12, 3]);

        let data = grid.into_data();
        let slice = data.as_slice::<f32>().unwrap();
        // voxel 0 -> (col 0, row 0, depth 0)
        assert_eq!(&slice[0..3], &[0.0, 0.0, 0.0]);
        // voxel 1 -> depth advances fastest
        assert_eq!(&slice[3..6], &[0.0, 0.0, 1.0]);
        // voxel 2 -> next column
        assert_eq!(&slice[6..9], &[1.0, 0.0, 0.0]);
        // voxel 6 -> next row
        assert_eq!(&slice[18..21], &[0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_identity_grid_axes() {
        let device = Default::default();
        let grid = SamplingGrid::<Backend>::new([3, 4, 5], &HomogeneousTransform::identity(), &device);
        assert_eq!(grid.shape(), [3, 4, 5]);
        assert_eq!(grid.x().dims(), [3, 4, 5]);

        let y = grid.y().into_data();
        let y = y.as_slice::<f32>().unwrap();
        // flat index of (row 2, col 1, depth 3)
        let idx = 2 * 20 + 1 * 5 + 3;
        assert_eq!(y[idx], 2.0);

        let x = grid.x().into_data();
        assert_eq!(x.as_slice::<f32>().unwrap()[idx], 1.0);

        let z = grid.z().into_data();
        assert_eq!(z.as_slice::<f32>().unwrap()[idx], 3.0);
    }
}
