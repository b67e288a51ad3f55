//! Synthetic Registration Example
//!
//! Registers two synthetic "head" volumes that differ by a small rigid motion:
//!
//! 1. Build a reference intensity volume (ellipsoid with a brighter core)
//! 2. Derive the moving volume by applying a known transform
//! 3. Threshold both into boolean masks
//! 4. Register the moving mask onto the reference mask
//! 5. Apply the result to the moving intensity volume
//!
//! Usage:
//!   cargo run --example synthetic_registration
//!   RUST_LOG=volreg_registration=debug cargo run --example synthetic_registration

use std::sync::Arc;

use burn_ndarray::{NdArray, NdArrayDevice};
use tracing_subscriber::EnvFilter;
use volreg_core::{build_volume_mask, resample, ParameterVector, ThresholdMaskBuilder, Volume};
use volreg_registration::{HistoryObserver, Metric, OverlapMetric, Registration, RegistrationConfig};

type Backend = NdArray<f32>;

const SHAPE: [usize; 3] = [32, 32, 32];

fn head(device: &NdArrayDevice) -> anyhow::Result<Volume<Backend>> {
    let volume = Volume::from_fn(SHAPE, device, |r, c, k| {
        let x = (c as f64 - 15.0) / 9.0;
        let y = (r as f64 - 15.0) / 8.0;
        let z = (k as f64 - 15.0) / 7.0;
        let outer = x * x + y * y + z * z;

        let cx = (c as f64 - 13.0) / 3.0;
        let cy = (r as f64 - 16.0) / 3.0;
        let cz = (k as f64 - 15.0) / 3.0;
        let core = cx * cx + cy * cy + cz * cz;

        if core <= 1.0 {
            2.0
        } else if outer <= 1.0 {
            1.0
        } else {
            0.0
        }
    })?;
    Ok(volume)
}

fn main() -> anyhow::Result<()> {
    println!("Synthetic Rigid Registration Example");
    println!("====================================\n");

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let device = Default::default();

    // =======================================================================
    // Step 1-2: Build volumes
    // =======================================================================
    let reference = head(&device)?;
    let motion = ParameterVector::new([0.0, 0.0, 0.08], [-2.0, 1.0, 0.0], [1.0, 1.0, 1.0]);
    let moving = resample(&reference, &motion)?;
    println!("Reference shape: {:?}", reference.shape());
    println!("Applied motion:  {}\n", motion);

    // =======================================================================
    // Step 3: Masks
    // =======================================================================
    let mask_builder = ThresholdMaskBuilder::new(0.5);
    let reference_mask = build_volume_mask(&mask_builder, &reference)?;
    let moving_mask = build_volume_mask(&mask_builder, &moving)?;
    println!(
        "Mask voxels: reference {}, moving {}",
        reference_mask.count_true(),
        moving_mask.count_true()
    );

    let metric = OverlapMetric::default();
    let before = metric.evaluate(&reference_mask, &moving_mask)?;
    let best_possible = metric.evaluate(&reference_mask, &reference_mask)?;
    println!(
        "Overlap before: {} / {} (cost {:.3})\n",
        before.overlap, best_possible.overlap, before.cost
    );

    // =======================================================================
    // Step 4: Register
    // =======================================================================
    let history = Arc::new(HistoryObserver::new());
    let mut registration = Registration::<Backend>::new(RegistrationConfig::new())
        .with_tracing()
        .with_observer(history.clone());

    let outcome = registration.execute(&reference_mask, &moving_mask, &ParameterVector::IDENTITY)?;

    println!("Status:       {:?}", outcome.status);
    println!("Parameters:   {}", outcome.params);
    println!(
        "Overlap:      {} / {} (cost {:.3})",
        outcome.overlap, best_possible.overlap, outcome.cost
    );
    println!(
        "Evaluations:  {} ({} iterations, {} restarts, {} recorded)",
        outcome.evaluations,
        outcome.iterations,
        outcome.restarts,
        history.len()
    );

    // =======================================================================
    // Step 5: Apply to the intensity volume
    // =======================================================================
    let aligned = outcome.apply(&moving)?;
    let agreeing = reference
        .to_vec()
        .iter()
        .zip(aligned.to_vec().iter())
        .filter(|(a, b)| a == b)
        .count();
    println!(
        "\nIntensity voxels agreeing after alignment: {} / {}",
        agreeing,
        reference.num_voxels()
    );

    Ok(())
}
