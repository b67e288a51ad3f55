use burn_ndarray::NdArray;
use proptest::prelude::*;
use volreg_core::{resample, ParameterVector, TransformBuilder, Volume};

type Backend = NdArray<f32>;

const SHAPE: [usize; 3] = [6, 7, 5];

fn params() -> impl Strategy<Value = ParameterVector> {
    (
        prop::array::uniform3(-3.14f64..3.14),
        prop::array::uniform3(-20.0f64..20.0),
        prop::array::uniform3(0.5f64..2.0),
    )
        .prop_map(|(rotation, translation, scale)| ParameterVector::new(rotation, translation, scale))
}

fn shape() -> impl Strategy<Value = [usize; 3]> {
    prop::array::uniform3(1usize..40)
}

proptest! {
    #[test]
    fn test_inverse_recovers_point(
        params in params(),
        shape in shape(),
        px in -50.0f64..50.0, py in -50.0f64..50.0, pz in -50.0f64..50.0
    ) {
        let forward = TransformBuilder::new(shape).build(&params);
        let inverse = forward.try_inverse().unwrap();

        let point = [px, py, pz];
        let recovered = inverse.apply_point(forward.apply_point(point));

        prop_assert!((point[0] - recovered[0]).abs() < 1e-6, "X mismatch: {} vs {}", point[0], recovered[0]);
        prop_assert!((point[1] - recovered[1]).abs() < 1e-6, "Y mismatch: {} vs {}", point[1], recovered[1]);
        prop_assert!((point[2] - recovered[2]).abs() < 1e-6, "Z mismatch: {} vs {}", point[2], recovered[2]);
    }

    #[test]
    fn test_rotation_fixes_midpoint(
        rotation in prop::array::uniform3(-3.14f64..3.14),
        shape in shape()
    ) {
        let builder = TransformBuilder::new(shape);
        let center = builder.midpoint();
        let mapped = builder.build(&ParameterVector::from_rotation(rotation)).apply_point(center);

        for axis in 0..3 {
            prop_assert!((mapped[axis] - center[axis]).abs() < 1e-9, "axis {}: {:?} vs {:?}", axis, mapped, center);
        }
    }

    #[test]
    fn test_resample_preserves_shape(params in params()) {
        let device = Default::default();
        let volume = Volume::<Backend>::from_fn(SHAPE, &device, |r, c, k| ((r + c + k) % 2) as f32).unwrap();

        let result = resample(&volume, &params).unwrap();
        prop_assert_eq!(result.shape(), SHAPE);
    }

    #[test]
    fn test_identity_resample_is_exact(
        voxels in prop::collection::vec(any::<bool>(), SHAPE[0] * SHAPE[1] * SHAPE[2])
    ) {
        let device = Default::default();
        let volume = Volume::<Backend>::from_bools(&voxels, SHAPE, &device).unwrap();

        let result = resample(&volume, &ParameterVector::IDENTITY).unwrap();
        prop_assert_eq!(result.to_vec(), volume.to_vec());
    }
}
