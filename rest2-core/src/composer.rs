//! Combination of band transmittances and cloud transmittance into broadband
//! irradiance.
//!
//! Per band, the direct beam, the diffuse irradiance on a perfectly absorbing
//! ground and the ground-atmosphere multiple reflections are computed for the
//! clear sky and again with the cloud factors applied. Both bands are then
//! summed into DNI, DHI, GHI and tracker GHI.

use crate::air_mass::AirMassSet;
use crate::bands::{Band1, Band2, BandInputs, BandTransmittance, SpectralBand};
use crate::cloud::CloudTransmittance;
use crate::parameters::CloudParameters;
use crate::solar::SolarGeometry;
use crate::state::AtmosphericInputs;
use crate::timeseries::FloatValue;
use ndarray::{Array1, Zip};

/// Irradiance components of one band (W/m²).
#[derive(Debug, Clone)]
pub struct BandIrradiance {
    pub direct_beam: Array1<FloatValue>,
    pub diffuse_on_absorbing_ground: Array1<FloatValue>,
    pub multiple_reflections: Array1<FloatValue>,
}

/// Clear-sky and cloud-sky components of one band.
#[derive(Debug, Clone)]
pub struct BandComposition {
    pub clear_sky: BandIrradiance,
    pub cloud_sky: BandIrradiance,
}

/// `rg rs (Ebn cos z + Edp) / (1 - rg rs)`
fn multiple_reflections(
    ground_sky_albedo: &Array1<FloatValue>,
    direct_beam: &Array1<FloatValue>,
    cos_zenith: &Array1<FloatValue>,
    diffuse: &Array1<FloatValue>,
) -> Array1<FloatValue> {
    Zip::from(ground_sky_albedo)
        .and(direct_beam)
        .and(cos_zenith)
        .and(diffuse)
        .map_collect(|&rho, &ebn, &mu, &edp| rho * (ebn * mu + edp) / (1.0 - rho))
}

fn diffuse_on_absorbing_ground(
    band_extraterrestrial: &Array1<FloatValue>,
    cos_zenith: &Array1<FloatValue>,
    t: &BandTransmittance,
) -> Array1<FloatValue> {
    let rayleigh_part = Zip::from(&t.rayleigh_forward_scatter)
        .and(&t.rayleigh)
        .and(&t.aerosol)
        .map_collect(|&br, &tr, &ta| br * (1.0 - tr) * ta.powf(0.25));
    let aerosol_part = Zip::from(&t.aerosol_forward_scatter)
        .and(&t.aerosol_scattering_correction)
        .and(&t.rayleigh)
        .and(&t.aerosol_scattering)
        .map_collect(|&ba, &f, &tr, &tas| ba * f * tr * (1.0 - tas.powf(0.25)));

    band_extraterrestrial
        * cos_zenith
        * &t.ozone
        * &t.mixed_gas
        * &t.nitrogen_dioxide_reference
        * &t.water_vapour_reference
        * &(rayleigh_part + aerosol_part)
}

/// Clear-sky and cloud-sky irradiance of a single band.
pub fn compose_band<B: SpectralBand>(
    band: &B,
    extraterrestrial_irradiance: &Array1<FloatValue>,
    cos_zenith: &Array1<FloatValue>,
    inputs: &BandInputs,
    surface_albedo: &Array1<FloatValue>,
    cloud: &CloudTransmittance,
) -> BandComposition {
    let t = band.transmittance(inputs);
    let band_extraterrestrial = extraterrestrial_irradiance * B::EXTRATERRESTRIAL_FRACTION;
    let ground_sky_albedo = surface_albedo * &t.sky_albedo;

    let direct_beam = &band_extraterrestrial * &t.direct_beam_product();
    let diffuse = diffuse_on_absorbing_ground(&band_extraterrestrial, cos_zenith, &t);
    let reflections = multiple_reflections(&ground_sky_albedo, &direct_beam, cos_zenith, &diffuse);

    let direct_beam_cloud = &direct_beam * &cloud.direct;
    let diffuse_cloud = &diffuse * &cloud.diffuse;
    let reflections_cloud = multiple_reflections(
        &ground_sky_albedo,
        &direct_beam_cloud,
        cos_zenith,
        &diffuse_cloud,
    );

    BandComposition {
        clear_sky: BandIrradiance {
            direct_beam,
            diffuse_on_absorbing_ground: diffuse,
            multiple_reflections: reflections,
        },
        cloud_sky: BandIrradiance {
            direct_beam: direct_beam_cloud,
            diffuse_on_absorbing_ground: diffuse_cloud,
            multiple_reflections: reflections_cloud,
        },
    }
}

/// Broadband irradiance of one sky condition (W/m²).
#[derive(Debug, Clone)]
pub struct BroadbandIrradiance {
    pub ghi: Array1<FloatValue>,
    pub ghi_tracker: Array1<FloatValue>,
    pub dni: Array1<FloatValue>,
    pub dhi: Array1<FloatValue>,
    /// Direct beam projected on the horizontal
    pub direct_horizontal: Array1<FloatValue>,
}

impl BroadbandIrradiance {
    /// Sum both bands, zeroing direct and diffuse components at night.
    pub fn aggregate(
        cos_zenith: &Array1<FloatValue>,
        is_night: &Array1<bool>,
        band1: &BandIrradiance,
        band2: &BandIrradiance,
    ) -> Self {
        let mut dni = &band1.direct_beam + &band2.direct_beam;
        let mut direct_horizontal = &dni * cos_zenith;
        let mut dhi = &band1.diffuse_on_absorbing_ground
            + &band1.multiple_reflections
            + &band2.diffuse_on_absorbing_ground
            + &band2.multiple_reflections;

        Zip::from(&mut dni)
            .and(&mut direct_horizontal)
            .and(&mut dhi)
            .and(is_night)
            .for_each(|dni, ebh, dhi, &night| {
                if night {
                    *dni = 0.0;
                    *ebh = 0.0;
                    *dhi = 0.0;
                }
            });

        Self {
            ghi: &direct_horizontal + &dhi,
            ghi_tracker: &dni + &dhi,
            dni,
            dhi,
            direct_horizontal,
        }
    }

    /// Replace negative GHI, tracker GHI, DNI and DHI with NaN.
    pub fn apply_quality_control(&mut self) {
        for values in [
            &mut self.ghi,
            &mut self.ghi_tracker,
            &mut self.dni,
            &mut self.dhi,
        ] {
            values.mapv_inplace(|v| if v < 0.0 { FloatValue::NAN } else { v });
        }
    }
}

/// Clear-sky and cloud-sky broadband irradiance.
#[derive(Debug, Clone)]
pub struct ComposedIrradiance {
    pub clear_sky: BroadbandIrradiance,
    pub cloud_sky: BroadbandIrradiance,
}

impl ComposedIrradiance {
    pub fn apply_quality_control(&mut self) {
        self.clear_sky.apply_quality_control();
        self.cloud_sky.apply_quality_control();
    }
}

/// Runs the full composition for one set of cloud parameters.
///
/// Air masses, band transmittances and cloud transmittance are rebuilt on every
/// call and dropped before it returns.
#[derive(Debug, Clone, Copy)]
pub struct IrradianceComposer<'a> {
    geometry: &'a SolarGeometry,
    inputs: &'a AtmosphericInputs,
}

impl<'a> IrradianceComposer<'a> {
    pub fn new(geometry: &'a SolarGeometry, inputs: &'a AtmosphericInputs) -> Self {
        Self { geometry, inputs }
    }

    /// Compose irradiance without quality control.
    pub fn compose(&self, parameters: &CloudParameters) -> ComposedIrradiance {
        let zenith = &self.geometry.zenith_angle;
        let cos_zenith = zenith.mapv(f64::cos);
        let is_night = self.geometry.is_night();
        let extraterrestrial = &self.geometry.extraterrestrial_irradiance;

        let air_masses = AirMassSet::evaluate(
            zenith,
            &self.inputs.angstrom_exponent,
            &self.inputs.pressure,
            &self.inputs.optical_depth_550nm,
        );
        let band_inputs = BandInputs {
            zenith_angle: zenith,
            air_masses: &air_masses,
            angstrom_exponent: &self.inputs.angstrom_exponent,
            water_vapour: &self.inputs.water_vapour,
            ozone: &self.inputs.ozone,
            nitrogen_dioxide: &self.inputs.nitrogen_dioxide,
        };
        let cloud = CloudTransmittance::evaluate(&self.inputs.cod, parameters);

        let albedo = &self.inputs.surface_albedo;
        let band1 = compose_band(
            &Band1,
            extraterrestrial,
            &cos_zenith,
            &band_inputs,
            albedo,
            &cloud,
        );
        let band2 = compose_band(
            &Band2,
            extraterrestrial,
            &cos_zenith,
            &band_inputs,
            albedo,
            &cloud,
        );

        ComposedIrradiance {
            clear_sky: BroadbandIrradiance::aggregate(
                &cos_zenith,
                &is_night,
                &band1.clear_sky,
                &band2.clear_sky,
            ),
            cloud_sky: BroadbandIrradiance::aggregate(
                &cos_zenith,
                &is_night,
                &band1.cloud_sky,
                &band2.cloud_sky,
            ),
        }
    }

    /// Compose irradiance and mark negative values as missing.
    pub fn compose_checked(&self, parameters: &CloudParameters) -> ComposedIrradiance {
        let mut composed = self.compose(parameters);
        composed.apply_quality_control();
        composed
    }
}
