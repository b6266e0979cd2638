//! Physical constants and input bounds shared by the model components.

use chrono_tz::Tz;

/// Solar constant (W/m²), Gueymard (2018).
pub const SOLAR_CONSTANT: f64 = 1366.1;

/// Timezone whose local clock time drives the apparent solar time calculation.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::Sao_Paulo;

/// Zenith angle (degrees) beyond which a timestep is treated as night.
pub const NIGHT_ZENITH_DEGREES: f64 = 90.0;

/// Air mass at which the diffuse-path NO2 and water vapour transmittances are evaluated.
pub const REFERENCE_AIR_MASS: f64 = 1.66;

/// Standard sea-level pressure (hPa).
pub const STANDARD_PRESSURE: f64 = 1013.25;

/// Closed interval a physical input is clipped to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    pub const fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Clip `value` into the interval. NaN passes through unchanged.
    pub fn clip(&self, value: f64) -> f64 {
        value.clamp(self.lower, self.upper)
    }
}

pub const ANGSTROM_EXPONENT_BOUNDS: Bounds = Bounds::new(0.0, 2.5);
/// hPa
pub const SURFACE_PRESSURE_BOUNDS: Bounds = Bounds::new(300.0, 1100.0);
/// atm-cm
pub const WATER_VAPOUR_BOUNDS: Bounds = Bounds::new(0.0, 10.0);
/// atm-cm
pub const OZONE_BOUNDS: Bounds = Bounds::new(0.0, 10.0);
/// atm-cm
pub const NITROGEN_DIOXIDE_BOUNDS: Bounds = Bounds::new(0.0, 0.03);
pub const SURFACE_ALBEDO_BOUNDS: Bounds = Bounds::new(0.0, 1.0);
pub const COD_BOUNDS: Bounds = Bounds::new(0.0, 160.0);
/// Angstrom turbidity is capped rather than rejected.
pub const ANGSTROM_TURBIDITY_BOUNDS: Bounds = Bounds::new(0.0, 1.1);
