//! End-to-end checks of the composed irradiance for a single location.

use approx::assert_relative_eq;
use chrono::{Duration, TimeZone, Utc};
use ndarray::Array1;
use rest2_core::{
    CloudParameters, LocationAtmosphericState, RadiationType, Rest2Model, TimeAxis, Timeseries,
};
use std::sync::Arc;

fn hourly_axis() -> Arc<TimeAxis> {
    Arc::new(TimeAxis::regular(
        Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap(),
        Duration::hours(1),
        24,
    ))
}

fn mid_range_state(cod: Timeseries) -> LocationAtmosphericState {
    let axis = Arc::clone(cod.time_axis());
    let c = |v: f64| Timeseries::constant(v, Arc::clone(&axis));
    LocationAtmosphericState {
        latitude: -22.5,
        longitude: -45.5,
        cod,
        surface_albedo: c(0.2),
        angstrom_exponent: Some(c(1.3)),
        pressure: c(1013.25),
        water_vapour: c(1.0),
        ozone: c(0.3),
        nitrogen_dioxide: c(0.001),
        optical_depth_550nm: c(0.2),
    }
}

fn night_mask(model: &Rest2Model) -> Vec<bool> {
    model
        .geometry()
        .zenith_angle
        .iter()
        .map(|z| z.to_degrees() > 90.0)
        .collect()
}

#[test]
fn cloud_free_day_is_zero_at_night_and_positive_by_day() {
    let state = mid_range_state(Timeseries::constant(0.0, hourly_axis()));
    let model = Rest2Model::new(&state).unwrap();
    let result = model.convert_radiation(&CloudParameters::default());
    let night = night_mask(&model);

    assert!(night.iter().any(|n| *n));
    assert!(night.iter().any(|n| !*n));

    for radiation_type in [RadiationType::Dni, RadiationType::Dhi, RadiationType::Ghi] {
        let values = result.get(radiation_type).values();
        for (i, is_night) in night.iter().enumerate() {
            if *is_night {
                assert_eq!(values[i], 0.0, "{radiation_type} at hour {i}");
            } else {
                assert!(values[i] > 0.0, "{radiation_type} at hour {i}: {}", values[i]);
            }
        }
    }
}

#[test]
fn energy_identity_holds_for_both_skies() {
    let cod = Timeseries::new(Array1::linspace(0.0, 23.0, 24), hourly_axis()).unwrap();
    let model = Rest2Model::new(&mid_range_state(cod)).unwrap();
    let composed = model.compose(&CloudParameters::default());
    let cos_zenith = model.geometry().zenith_angle.mapv(f64::cos);

    for sky in [&composed.clear_sky, &composed.cloud_sky] {
        for i in 0..model.len() {
            assert_relative_eq!(
                sky.ghi[i],
                sky.dni[i] * cos_zenith[i] + sky.dhi[i],
                epsilon = 1e-9
            );
        }
    }
}

#[test]
fn night_components_are_zero_before_quality_control() {
    let cod = Timeseries::constant(10.0, hourly_axis());
    let model = Rest2Model::new(&mid_range_state(cod)).unwrap();
    let composed = model.compose(&CloudParameters::new(0.4, 0.3));

    for (i, is_night) in night_mask(&model).into_iter().enumerate() {
        if !is_night {
            continue;
        }
        for sky in [&composed.clear_sky, &composed.cloud_sky] {
            assert_eq!(sky.dni[i], 0.0);
            assert_eq!(sky.dhi[i], 0.0);
            assert_eq!(sky.direct_horizontal[i], 0.0);
        }
    }
}

#[test]
fn negative_diffuse_is_reported_missing() {
    // 1 / (1 + 4) - exp(-1 / 5.5) < 0: the cloud diffuse factor is negative
    let cod = Timeseries::constant(1.0, hourly_axis());
    let model = Rest2Model::new(&mid_range_state(cod)).unwrap();
    let result = model.convert_radiation(&CloudParameters::new(5.0, -3.0));
    let night = night_mask(&model);

    let dhi = result.get(RadiationType::Dhi).values();
    let day_missing = night
        .iter()
        .zip(dhi.iter())
        .filter(|(is_night, v)| !**is_night && v.is_nan())
        .count();
    assert!(day_missing > 0);

    // Clear sky is unaffected by the cloud parameters
    assert!(result.dhi_cs.values().iter().all(|v| !v.is_nan()));
}

#[test]
fn inputs_outside_physical_bounds_are_clipped() {
    let axis = hourly_axis();
    let mut state = mid_range_state(Timeseries::constant(0.0, Arc::clone(&axis)));
    let reference = Rest2Model::new(&state)
        .unwrap()
        .convert_radiation(&CloudParameters::default());

    state.nitrogen_dioxide = Timeseries::constant(0.5, Arc::clone(&axis));
    let clipped = Rest2Model::new(&state)
        .unwrap()
        .convert_radiation(&CloudParameters::default());

    state.nitrogen_dioxide = Timeseries::constant(0.03, axis);
    let at_bound = Rest2Model::new(&state)
        .unwrap()
        .convert_radiation(&CloudParameters::default());

    assert_eq!(clipped.ghi.values(), at_bound.ghi.values());
    assert_ne!(clipped.ghi.values(), reference.ghi.values());
}

#[test]
fn result_serializes_with_stream_keys() {
    let state = mid_range_state(Timeseries::constant(1.0, hourly_axis()));
    let result = Rest2Model::new(&state)
        .unwrap()
        .convert_radiation(&CloudParameters::default());

    let json = serde_json::to_value(&result).unwrap();
    for radiation_type in RadiationType::ALL {
        assert!(json.get(radiation_type.key()).is_some(), "{radiation_type}");
    }
}
