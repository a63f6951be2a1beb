// hen-core/src/units.rs

use uom::si::f64::{
    Energy as UomEnergy, HeatTransfer as UomHeatTransfer, Power as UomPower,
    TemperatureInterval as UomTemperatureInterval,
    ThermodynamicTemperature as UomThermodynamicTemperature, Time as UomTime,
};

// Public canonical unit types (SI, f64)
pub type Energy = UomEnergy;
pub type FilmCoefficient = UomHeatTransfer;
pub type Power = UomPower;
pub type TempInterval = UomTemperatureInterval;
pub type Temperature = UomThermodynamicTemperature;
pub type Time = UomTime;

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn degc(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::degree_celsius;
    Temperature::new::<degree_celsius>(v)
}

#[inline]
pub fn hours(v: f64) -> Time {
    use uom::si::time::hour;
    Time::new::<hour>(v)
}

#[inline]
pub fn kw(v: f64) -> Power {
    use uom::si::power::kilowatt;
    Power::new::<kilowatt>(v)
}

/// Film coefficient given in kW/(m²·K).
#[inline]
pub fn kw_per_m2k(v: f64) -> FilmCoefficient {
    use uom::si::heat_transfer::watt_per_square_meter_kelvin;
    FilmCoefficient::new::<watt_per_square_meter_kelvin>(v * 1e3)
}

/// Accessors back to the raw engineering units the network model works in.
pub mod raw {
    use super::*;

    #[inline]
    pub fn kelvin(t: Temperature) -> f64 {
        use uom::si::thermodynamic_temperature::kelvin;
        t.get::<kelvin>()
    }

    #[inline]
    pub fn celsius(t: Temperature) -> f64 {
        use uom::si::thermodynamic_temperature::degree_celsius;
        t.get::<degree_celsius>()
    }

    #[inline]
    pub fn hours(t: Time) -> f64 {
        use uom::si::time::hour;
        t.get::<hour>()
    }

    #[inline]
    pub fn kilowatt_hours(e: Energy) -> f64 {
        use uom::si::energy::kilowatt_hour;
        e.get::<kilowatt_hour>()
    }

    #[inline]
    pub fn kw_per_m2k(h: FilmCoefficient) -> f64 {
        use uom::si::heat_transfer::watt_per_square_meter_kelvin;
        h.get::<watt_per_square_meter_kelvin>() * 1e-3
    }
}
