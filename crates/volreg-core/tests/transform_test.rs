use burn::tensor::Tensor;
use burn_ndarray::NdArray;
use std::f64::consts::FRAC_PI_2;
use volreg_core::transform::Transform;
use volreg_core::{CoreError, HomogeneousTransform, ParameterVector, TransformBuilder};

type B = NdArray<f32>;

#[test]
fn test_identity_parameters_build_exact_identity() {
    for shape in [[10, 10, 10], [7, 12, 5], [1, 1, 1]] {
        let transform = TransformBuilder::new(shape).build(&ParameterVector::IDENTITY);
        assert_eq!(
            *transform.matrix(),
            *HomogeneousTransform::identity().matrix(),
            "identity mismatch for shape {:?}",
            shape
        );
    }
}

#[test]
fn test_translation_maps_points() {
    let transform =
        TransformBuilder::new([9, 9, 9]).build(&ParameterVector::from_translation([2.0, -1.0, 0.5]));
    let mapped = transform.apply_point([3.0, 4.0, 5.0]);
    let expected = [5.0, 3.0, 5.5];
    for i in 0..3 {
        assert!(
            (mapped[i] - expected[i]).abs() < 1e-12,
            "axis {} mismatch: got {}, expected {}",
            i,
            mapped[i],
            expected[i]
        );
    }
}

#[test]
fn test_rotation_pivots_on_midpoint() {
    // midpoint of an 11-voxel axis is 5
    let builder = TransformBuilder::new([11, 11, 11]);
    let transform = builder.build(&ParameterVector::from_rotation([0.0, 0.0, FRAC_PI_2]));

    let center = transform.apply_point([5.0, 5.0, 5.0]);
    assert!((center[0] - 5.0).abs() < 1e-12 && (center[1] - 5.0).abs() < 1e-12);

    // one step along +x turns into one step along +y
    let moved = transform.apply_point([6.0, 5.0, 5.0]);
    assert!((moved[0] - 5.0).abs() < 1e-12, "X mismatch: got {}, expected 5", moved[0]);
    assert!((moved[1] - 6.0).abs() < 1e-12, "Y mismatch: got {}, expected 6", moved[1]);
    assert!((moved[2] - 5.0).abs() < 1e-12, "Z mismatch: got {}, expected 5", moved[2]);
}

#[test]
fn test_even_axis_midpoint_truncates() {
    let builder = TransformBuilder::new([10, 4, 1]);
    assert_eq!(builder.midpoint(), [1.0, 4.0, 0.0]);
}

#[test]
fn test_built_transform_inverts() {
    let params = ParameterVector::new([0.1, -0.2, 0.3], [1.0, 2.0, -3.0], [1.1, 0.9, 1.05]);
    let forward = TransformBuilder::new([12, 14, 16]).build(&params);
    let inverse = forward.try_inverse().unwrap();

    let product = forward.compose(&inverse);
    let identity = HomogeneousTransform::identity();
    for (a, b) in product.matrix().iter().zip(identity.matrix().iter()) {
        assert!((a - b).abs() < 1e-10, "M·M⁻¹ entry {} differs from {}", a, b);
    }
    assert_eq!(inverse.reference_shape(), Some([12, 14, 16]));
}

#[test]
fn test_zero_scale_is_singular() {
    let params = ParameterVector::new([0.3, 0.0, 0.0], [0.0; 3], [1.0, 0.0, 1.0]);
    let transform = TransformBuilder::new([8, 8, 8]).build(&params);
    let err = transform.try_inverse().unwrap_err();
    assert!(matches!(err, CoreError::SingularTransform(_)));
}

#[test]
fn test_tensor_points_match_single_point_mapping() {
    let device = Default::default();
    let params = ParameterVector::new([0.2, 0.1, -0.4], [1.5, 0.0, -2.0], [1.0, 1.2, 0.8]);
    let transform = TransformBuilder::new([10, 10, 10]).build(&params);

    let inputs = [[0.0, 0.0, 0.0], [3.0, 7.0, 1.0], [9.0, 2.0, 5.0]];
    let points = Tensor::<B, 2>::from_floats(
        [
            [0.0f32, 0.0, 0.0],
            [3.0, 7.0, 1.0],
            [9.0, 2.0, 5.0],
        ],
        &device,
    );
    let mapped = Transform::<B>::transform_points(&transform, points).into_data();
    let mapped = mapped.as_slice::<f32>().unwrap();

    for (i, input) in inputs.iter().enumerate() {
        let expected = transform.apply_point(*input);
        for axis in 0..3 {
            let actual = mapped[i * 3 + axis] as f64;
            assert!(
                (actual - expected[axis]).abs() < 1e-4,
                "point {} axis {}: got {}, expected {}",
                i,
                axis,
                actual,
                expected[axis]
            );
        }
    }
}

#[test]
fn test_parameter_vector_rejects_wrong_length() {
    let err = ParameterVector::from_slice(&[0.0; 6]).unwrap_err();
    assert!(matches!(err, CoreError::InvalidParameters(_)));

    let params = ParameterVector::from_slice(&[0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 1.0, 1.0, 1.0]).unwrap();
    assert_eq!(params.translation(), [1.0, 2.0, 3.0]);
}
