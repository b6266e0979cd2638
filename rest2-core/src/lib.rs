pub mod air_mass;
pub mod bands;
pub mod cloud;
pub mod composer;
pub mod constants;
pub mod model;
pub mod numeric;
pub mod parameters;
pub mod result;
pub mod solar;
pub mod state;
pub mod timeseries;

pub mod errors;

pub use errors::{Rest2Error, Rest2Result};
pub use model::Rest2Model;
pub use parameters::CloudParameters;
pub use result::{IrradianceResult, RadiationType};
pub use state::LocationAtmosphericState;
pub use timeseries::{FloatValue, Time, TimeAxis, Timeseries};
