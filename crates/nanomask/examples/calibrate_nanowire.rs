//! Calibrate a nanowire's end points against the four alignment markers.
//!
//! Usage: `calibrate_nanowire [config.json]`. Without a config the example
//! uses corner readings taken from a y-down screenshot of a 300 µm die.

use std::env;

use log::info;
use nanomask::calib::{CalibrateConfig, CalibrationReport};
use nanomask::{CalibrationParams, InputAxes, Point2};

fn builtin_config() -> CalibrateConfig {
    CalibrateConfig {
        // bl, br, tl, tr in screen pixels
        markers: vec![[196.0, 952.0], [1124.0, 974.0], [219.0, 21.0], [1148.0, 46.0]],
        features: vec![[737.0, 540.0], [763.0, 522.0]],
        params: CalibrationParams {
            input_axes: InputAxes::YDown,
            ..CalibrationParams::default()
        },
        output_path: None,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "tracing")]
    nanomask::init_tracing(false);
    #[cfg(not(feature = "tracing"))]
    nanomask::init_logging(log::LevelFilter::Info)?;

    let config = match env::args().nth(1) {
        Some(path) => CalibrateConfig::load_json(path)?,
        None => builtin_config(),
    };

    let result = config.run()?;
    for (i, p) in result.features.iter().enumerate() {
        info!("feature {i}: ({:.3}, {:.3}) µm", p.x, p.y);
    }
    if let Some(nw) = result.feature_segment(0, 1) {
        let mid: Point2<f64> = nw.midpoint();
        info!(
            "nanowire length {:.3} µm, angle {:.2}°, centre ({:.3}, {:.3})",
            nw.length(),
            nw.angle().to_degrees(),
            mid.x,
            mid.y
        );
    }

    let report = CalibrationReport::new(&result, &config.params);
    let out = config.output_path();
    report.write_json(&out)?;
    info!("report written to {}", out.display());
    Ok(())
}
