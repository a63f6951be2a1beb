//! Exchanger operation: areas, mixer resolution and feasibility checks.
//!
//! The exchanger is sized for its most demanding operating case. In every
//! other case the installed area is larger than needed, so a bypass or
//! admixer on one side reduces the effective driving force. The mixed-side
//! terminal temperature follows from inverting the log-mean temperature
//! difference with the Lambert W function.

use crate::case_study::{CaseStudy, StreamKind};
use crate::feasibility::Infeasibility;
use crate::thermo::{BoundaryTemperatures, StageTemperatures};
use crate::topology::ExchangerAddress;
use hen_core::{Real, Tolerances, lambert_w0, lambert_wm1, nearly_equal};
use nalgebra::DMatrix;
use rand::Rng;

/// Ratios beyond this overflow `exp` in the inversion.
pub const MAX_EXP_RATIO: Real = 709.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MixerType {
    #[default]
    None,
    BypassHot,
    AdmixerHot,
    BypassCold,
    AdmixerCold,
}

impl MixerType {
    pub fn side(self) -> Option<StreamKind> {
        match self {
            MixerType::None => None,
            MixerType::BypassHot | MixerType::AdmixerHot => Some(StreamKind::Hot),
            MixerType::BypassCold | MixerType::AdmixerCold => Some(StreamKind::Cold),
        }
    }

    fn on(side: StreamKind, bypass: bool) -> Self {
        match (side, bypass) {
            (StreamKind::Hot, true) => MixerType::BypassHot,
            (StreamKind::Hot, false) => MixerType::AdmixerHot,
            (StreamKind::Cold, true) => MixerType::BypassCold,
            (StreamKind::Cold, false) => MixerType::AdmixerCold,
        }
    }
}

/// Overall heat transfer coefficient from two film coefficients.
pub fn overall_coefficient(h_hot: Real, h_cold: Real) -> Real {
    1.0 / (1.0 / h_hot + 1.0 / h_cold)
}

/// Temperature difference at one exchanger end that, together with the
/// fixed difference at the other end, yields `target_lmtd`.
///
/// Returns NaN when no positive solution exists or the ratio would overflow.
pub fn invert_log_mean(target_lmtd: Real, fixed_dt: Real) -> Real {
    if !(target_lmtd > 0.0 && fixed_dt > 0.0) {
        return Real::NAN;
    }
    let ratio = fixed_dt / target_lmtd;
    if !ratio.is_finite() || ratio > MAX_EXP_RATIO {
        return Real::NAN;
    }
    if nearly_equal(ratio, 1.0, Tolerances::default()) {
        return fixed_dt;
    }
    let z = -ratio * (-ratio).exp();
    // the other root of r·e^(-r) = z is the fixed end itself
    let w = if fixed_dt > target_lmtd {
        lambert_w0(z)
    } else {
        lambert_wm1(z)
    };
    -w * target_lmtd
}

/// State of one exchanger in one operating case.
#[derive(Clone, Debug, PartialEq)]
pub struct OperatingPoint {
    pub heat_load: Real,
    pub overall_coefficient: Real,
    /// Stage-boundary temperatures of both streams
    pub stage: BoundaryTemperatures,
    /// Terminal temperatures seen by the exchanger itself
    pub terminal: BoundaryTemperatures,
    pub lmtd_no_mixer: Real,
    pub needed_area: Real,
    pub mixer: MixerType,
    pub mixer_fraction: Real,
}

impl OperatingPoint {
    /// Log-mean temperature difference at the exchanger terminals.
    pub fn lmtd(&self) -> Real {
        self.terminal.log_mean()
    }

    /// Temperature rebuilt on the mixed side, if any.
    pub fn mixed_temperature(&self) -> Option<Real> {
        match self.mixer {
            MixerType::None => None,
            MixerType::BypassHot => Some(self.terminal.hot_out),
            MixerType::AdmixerHot => Some(self.terminal.hot_in),
            MixerType::BypassCold => Some(self.terminal.cold_out),
            MixerType::AdmixerCold => Some(self.terminal.cold_in),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExchangerOperation {
    pub exists: bool,
    pub points: Vec<OperatingPoint>,
    /// Governing area: largest area needed over all operating cases
    pub area: Real,
    pub temperature_check: Infeasibility,
    pub mixer_check: Infeasibility,
}

impl ExchangerOperation {
    /// Resolve one exchanger slot from its duty row and the stage temperatures.
    pub fn resolve<R: Rng + ?Sized>(
        case: &CaseStudy,
        index: usize,
        address: &ExchangerAddress,
        duties: &DMatrix<Real>,
        temperatures: &StageTemperatures,
        rng: &mut R,
    ) -> Self {
        let n_oc = case.number_operating_cases();
        let hot = case.stream(StreamKind::Hot, address.hot_stream);
        let cold = case.stream(StreamKind::Cold, address.cold_stream);

        let mut points: Vec<OperatingPoint> = (0..n_oc)
            .map(|oc| {
                let heat_load = if address.exists {
                    duties[(index, oc)]
                } else {
                    0.0
                };
                let stage = temperatures.boundary(address, oc);
                let u = overall_coefficient(hot.film_coefficients[oc], cold.film_coefficients[oc]);
                let lmtd = stage.log_mean();
                let needed_area = if heat_load > 0.0 && lmtd > 0.0 {
                    heat_load / (u * lmtd)
                } else {
                    0.0
                };
                OperatingPoint {
                    heat_load,
                    overall_coefficient: u,
                    stage,
                    terminal: stage,
                    lmtd_no_mixer: lmtd,
                    needed_area,
                    mixer: MixerType::None,
                    mixer_fraction: 0.0,
                }
            })
            .collect();

        let area = points.iter().map(|p| p.needed_area).fold(0.0, Real::max);

        if !address.exists {
            return Self {
                exists: false,
                points,
                area: 0.0,
                temperature_check: Infeasibility::default(),
                mixer_check: Infeasibility::default(),
            };
        }

        let one_mixer = case.restrictions.one_mixer_per_exchanger;
        let mut shared_mixer: Option<MixerType> = None;
        for (oc, point) in points.iter_mut().enumerate() {
            if point.heat_load <= 0.0 || nearly_equal(point.needed_area, area, Tolerances::default())
            {
                continue;
            }
            let mixer = match shared_mixer {
                Some(m) => m,
                None => {
                    let m = choose_mixer(hot.heat_capacity_flow(oc), cold.heat_capacity_flow(oc), rng);
                    if one_mixer {
                        shared_mixer = Some(m);
                    }
                    m
                }
            };
            apply_mixer(point, mixer, area);
        }

        let restrictions = &case.restrictions;
        let mut temperature_check = Infeasibility::default();
        let mut mixer_check = Infeasibility::default();
        for (oc, point) in points.iter().enumerate() {
            if point.heat_load <= 0.0 {
                continue;
            }
            for dt in [point.terminal.dt_cold_end(), point.terminal.dt_hot_end()] {
                temperature_check.record(!(dt >= restrictions.dt_lower_bound));
            }
            mixer_check += check_mixer(
                point,
                hot.extreme_temperatures[oc],
                cold.extreme_temperatures[oc],
                restrictions.max_bypass_fraction,
                restrictions.max_admix_fraction,
            );
        }

        Self {
            exists: true,
            points,
            area,
            temperature_check,
            mixer_check,
        }
    }

    pub fn is_feasible(&self) -> bool {
        !self.temperature_check.is_infeasible() && !self.mixer_check.is_infeasible()
    }

    pub fn quadratic_distance(&self) -> Real {
        self.temperature_check.quadratic_distance() + self.mixer_check.quadratic_distance()
    }

    pub fn uses(&self, mixer: MixerType) -> bool {
        self.points.iter().any(|p| p.mixer == mixer)
    }

    pub fn heat_loads(&self) -> Vec<Real> {
        self.points.iter().map(|p| p.heat_load).collect()
    }
}

/// Mixer goes on the stream with the larger heat capacity flow, ties are
/// decided at random, and bypass vs. admixer is a fair coin.
fn choose_mixer<R: Rng + ?Sized>(cp_hot: Real, cp_cold: Real, rng: &mut R) -> MixerType {
    let side = if cp_hot > cp_cold {
        StreamKind::Hot
    } else if cp_cold > cp_hot {
        StreamKind::Cold
    } else if rng.random_bool(0.5) {
        StreamKind::Hot
    } else {
        StreamKind::Cold
    };
    MixerType::on(side, rng.random_bool(0.5))
}

fn apply_mixer(point: &mut OperatingPoint, mixer: MixerType, area: Real) {
    let s = point.stage;
    let target = if area > 0.0 {
        point.heat_load / (point.overall_coefficient * area)
    } else {
        Real::NAN
    };
    let mut terminal = s;
    let fraction = match mixer {
        MixerType::None => 0.0,
        MixerType::BypassHot => {
            let x = s.cold_in + invert_log_mean(target, s.dt_hot_end());
            terminal.hot_out = x;
            (s.hot_out - x) / (s.hot_in - x)
        }
        MixerType::AdmixerHot => {
            let x = s.cold_out + invert_log_mean(target, s.dt_cold_end());
            terminal.hot_in = x;
            (s.hot_in - x) / (x - s.hot_out)
        }
        MixerType::BypassCold => {
            let x = s.hot_in - invert_log_mean(target, s.dt_cold_end());
            terminal.cold_out = x;
            (x - s.cold_out) / (x - s.cold_in)
        }
        MixerType::AdmixerCold => {
            let x = s.hot_out - invert_log_mean(target, s.dt_hot_end());
            terminal.cold_in = x;
            (x - s.cold_in) / (s.cold_out - x)
        }
    };
    point.mixer = mixer;
    point.terminal = terminal;
    point.mixer_fraction = fraction;
}

fn check_mixer(
    point: &OperatingPoint,
    hot_extreme: Real,
    cold_extreme: Real,
    max_bypass: Real,
    max_admix: Real,
) -> Infeasibility {
    let mut check = Infeasibility::default();
    let Some(x) = point.mixed_temperature() else {
        return check;
    };
    if !x.is_finite() || !point.mixer_fraction.is_finite() {
        check.record(true);
        return check;
    }
    let s = point.stage;
    let f = point.mixer_fraction;
    match point.mixer {
        MixerType::None => {}
        MixerType::BypassHot => {
            check.record(!(x > s.cold_in && x <= s.hot_out));
            check.record(x < hot_extreme);
            check.record(!(0.0..=max_bypass).contains(&f));
        }
        MixerType::AdmixerHot => {
            check.record(!(x >= s.hot_out && x <= s.hot_in));
            check.record(!(0.0..=max_admix).contains(&f));
        }
        MixerType::BypassCold => {
            check.record(!(x >= s.cold_out && x < s.hot_in));
            check.record(x > cold_extreme);
            check.record(!(0.0..=max_bypass).contains(&f));
        }
        MixerType::AdmixerCold => {
            check.record(!(x >= s.cold_in && x <= s.cold_out));
            check.record(!(0.0..=max_admix).contains(&f));
        }
    }
    check
}
