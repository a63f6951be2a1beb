//! Case-study data consumed by the network model and the optimizers.
//!
//! Every per-operating-case quantity is stored as one value per case.
//! Temperatures are absolute (K), duties in kW, film coefficients in
//! kW/(m²·K), durations in hours and utility demand in kWh.

use crate::error::{ModelError, ModelResult};
use crate::topology::{ExchangerAddress, Topology};
use hen_core::{Real, annuity_factor, ensure_finite};
use nalgebra::DMatrix;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Hot,
    Cold,
}

impl StreamKind {
    pub fn opposite(self) -> Self {
        match self {
            StreamKind::Hot => StreamKind::Cold,
            StreamKind::Cold => StreamKind::Hot,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct OperatingCase {
    pub start_hours: Real,
    pub end_hours: Real,
}

impl OperatingCase {
    pub fn duration(&self) -> Real {
        self.end_hours - self.start_hours
    }
}

/// Specific price and emission factor of a utility stream.
#[derive(Clone, Debug, PartialEq)]
pub struct UtilityPricing {
    /// Cost per kWh, one value per operating case
    pub cost_per_kwh: Vec<Real>,
    /// tCO₂ per kWh, one value per operating case
    pub emissions_per_kwh: Vec<Real>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Stream {
    pub name: String,
    pub kind: StreamKind,
    pub supply_temperatures: Vec<Real>,
    pub target_temperatures: Vec<Real>,
    pub film_coefficients: Vec<Real>,
    /// Specific heat capacity (kJ/(kg·K))
    pub heat_capacities: Vec<Real>,
    /// Mass flow (kg/s)
    pub mass_flows: Vec<Real>,
    /// Coldest reachable temperature for hot streams, hottest for cold
    /// streams. Unconstrained streams carry ∓∞.
    pub extreme_temperatures: Vec<Real>,
    pub utility: Option<UtilityPricing>,
}

impl Stream {
    /// Heat capacity flow CP = cp·ṁ (kW/K).
    pub fn heat_capacity_flow(&self, operating_case: usize) -> Real {
        self.heat_capacities[operating_case] * self.mass_flows[operating_case]
    }

    /// Enthalpy released or absorbed between supply and target (kW).
    pub fn enthalpy_flow(&self, operating_case: usize) -> Real {
        self.heat_capacity_flow(operating_case)
            * (self.target_temperatures[operating_case] - self.supply_temperatures[operating_case])
                .abs()
    }

    pub fn is_utility(&self) -> bool {
        self.utility.is_some()
    }
}

/// Retrofit cost coefficients attached to one exchanger slot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExchangerCosts {
    pub base: Real,
    pub specific_area: Real,
    pub degression: Real,
    pub remove: Real,
    pub base_split: Real,
    pub remove_split: Real,
    pub base_bypass: Real,
    pub remove_bypass: Real,
    pub base_admixer: Real,
    pub remove_admixer: Real,
    pub base_repipe: Real,
    pub base_resequence: Real,
}

impl ExchangerCosts {
    /// Cost of enlarging (or newly installing) area beyond what is installed.
    pub fn area_cost(&self, area: Real, installed_area: Real) -> Real {
        self.base + self.specific_area * (area - installed_area).powf(self.degression)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct InitialExchanger {
    pub address: ExchangerAddress,
    pub area: Real,
    pub costs: ExchangerCosts,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UtilityKind {
    /// Hot utility closing the gap of a cold stream to its target
    Heating,
    /// Cold utility closing the gap of a hot stream to its target
    Cooling,
}

impl UtilityKind {
    /// Side of the process stream the balance exchanger is attached to.
    pub fn process_side(self) -> StreamKind {
        match self {
            UtilityKind::Heating => StreamKind::Cold,
            UtilityKind::Cooling => StreamKind::Hot,
        }
    }
}

/// Utility exchanger at the end of a process stream that absorbs whatever
/// duty the process exchangers leave to reach the stream target.
#[derive(Clone, Debug, PartialEq)]
pub struct BalanceUtility {
    pub kind: UtilityKind,
    pub stream: usize,
    pub initial_area: Real,
    pub base_cost: Real,
    pub specific_area_cost: Real,
    pub degression: Real,
    pub remove_cost: Real,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Economics {
    pub interest_rate: Real,
    pub depreciation_years: Real,
}

impl Economics {
    pub fn annuity_factor(&self) -> Real {
        annuity_factor(self.interest_rate, self.depreciation_years)
    }
}

/// Design rules applied to every candidate network.
#[derive(Clone, Debug, PartialEq)]
pub struct Restrictions {
    /// Allowed splits per stream and stage (branches - 1)
    pub max_splits: usize,
    pub max_bypass_fraction: Real,
    pub max_admix_fraction: Real,
    /// Upper bound on exchanger end temperature differences (K)
    pub dt_upper_bound: Real,
    /// Minimal approach temperature at either exchanger end (K)
    pub dt_lower_bound: Real,
    /// Smallest non-zero duty of an existing exchanger (kW)
    pub minimal_heat_load: Real,
    /// Use one mixer type for all operating cases of an exchanger
    pub one_mixer_per_exchanger: bool,
}

impl Default for Restrictions {
    fn default() -> Self {
        Self {
            max_splits: 1,
            max_bypass_fraction: 0.9,
            max_admix_fraction: 0.9,
            dt_upper_bound: 300.0,
            dt_lower_bound: 5.0,
            minimal_heat_load: 0.0,
            one_mixer_per_exchanger: false,
        }
    }
}

/// Utility demand of the as-built network (kWh per operating case).
#[derive(Clone, Debug, PartialEq)]
pub struct UtilityDemand {
    pub hot: Vec<Real>,
    pub cold: Vec<Real>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CaseStudy {
    pub name: String,
    pub operating_cases: Vec<OperatingCase>,
    pub hot_streams: Vec<Stream>,
    pub cold_streams: Vec<Stream>,
    pub enthalpy_stages: usize,
    pub exchangers: Vec<InitialExchanger>,
    pub balance_utilities: Vec<BalanceUtility>,
    /// One-time cost of a new match, indexed (cold stream, hot stream)
    pub match_costs: DMatrix<Real>,
    pub economics: Economics,
    pub restrictions: Restrictions,
    /// As-built duties, exchangers × operating cases
    pub initial_duties: DMatrix<Real>,
    pub initial_utility_demand: UtilityDemand,
}

impl CaseStudy {
    /// Check dimensions and index ranges. Called once at the input boundary;
    /// the model assumes a validated case afterwards.
    pub fn validated(self) -> ModelResult<Self> {
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> ModelResult<()> {
        let n_oc = self.number_operating_cases();
        if n_oc == 0 {
            return Err(invalid("at least one operating case is required"));
        }
        if self.enthalpy_stages == 0 {
            return Err(invalid("at least one enthalpy stage is required"));
        }
        for oc in &self.operating_cases {
            if !(oc.duration() > 0.0) {
                return Err(invalid("operating case durations must be positive"));
            }
        }

        if self.hot_streams.is_empty() || self.cold_streams.is_empty() {
            return Err(invalid("at least one hot and one cold stream are required"));
        }
        for stream in self.hot_streams.iter().chain(&self.cold_streams) {
            validate_stream(stream, n_oc)?;
        }
        if self.hot_streams.iter().any(|s| s.kind != StreamKind::Hot)
            || self.cold_streams.iter().any(|s| s.kind != StreamKind::Cold)
        {
            return Err(invalid("stream kind does not match its list"));
        }

        let (n_hot, n_cold) = (self.hot_streams.len(), self.cold_streams.len());
        for exchanger in &self.exchangers {
            let a = exchanger.address;
            check_index("exchanger hot stream", a.hot_stream, n_hot)?;
            check_index("exchanger cold stream", a.cold_stream, n_cold)?;
            check_index("exchanger enthalpy stage", a.stage, self.enthalpy_stages)?;
            if exchanger.area < 0.0 {
                return Err(invalid("installed exchanger area must be non-negative"));
            }
        }

        for balance in &self.balance_utilities {
            let side = balance.kind.process_side();
            check_index("balance utility stream", balance.stream, self.streams(side).len())?;
            if self.utility_indices(side.opposite()).is_empty() {
                return Err(invalid(
                    "balance utility exchanger requires a utility stream of the opposite kind",
                ));
            }
        }

        check_dimension("match cost rows (cold streams)", n_cold, self.match_costs.nrows())?;
        check_dimension("match cost columns (hot streams)", n_hot, self.match_costs.ncols())?;
        check_dimension(
            "initial duty rows",
            self.exchangers.len(),
            self.initial_duties.nrows(),
        )?;
        check_dimension("initial duty columns", n_oc, self.initial_duties.ncols())?;
        check_dimension("initial hot utility demand", n_oc, self.initial_utility_demand.hot.len())?;
        check_dimension(
            "initial cold utility demand",
            n_oc,
            self.initial_utility_demand.cold.len(),
        )?;

        let r = &self.restrictions;
        if r.dt_lower_bound < 0.0 || r.dt_upper_bound < r.dt_lower_bound {
            return Err(invalid("temperature difference bounds must satisfy 0 <= dTLb <= dTUb"));
        }
        if r.max_bypass_fraction < 0.0 || r.max_admix_fraction < 0.0 || r.minimal_heat_load < 0.0
        {
            return Err(invalid("mixer fractions and minimal heat load must be non-negative"));
        }
        if !(self.economics.depreciation_years > 0.0) || self.economics.interest_rate < 0.0 {
            return Err(invalid("economics require a positive lifetime and non-negative interest"));
        }
        ensure_finite(self.economics.annuity_factor(), "annuity factor")?;
        Ok(())
    }

    pub fn number_operating_cases(&self) -> usize {
        self.operating_cases.len()
    }

    pub fn number_exchangers(&self) -> usize {
        self.exchangers.len()
    }

    pub fn streams(&self, kind: StreamKind) -> &[Stream] {
        match kind {
            StreamKind::Hot => &self.hot_streams,
            StreamKind::Cold => &self.cold_streams,
        }
    }

    pub fn stream(&self, kind: StreamKind, index: usize) -> &Stream {
        &self.streams(kind)[index]
    }

    pub fn is_utility(&self, kind: StreamKind, index: usize) -> bool {
        self.streams(kind).get(index).is_some_and(Stream::is_utility)
    }

    pub fn utility_indices(&self, kind: StreamKind) -> Vec<usize> {
        self.streams(kind)
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_utility())
            .map(|(i, _)| i)
            .collect()
    }

    /// Utility used by balance exchangers of the given kind.
    pub fn balance_utility_stream(&self, kind: UtilityKind) -> Option<&Stream> {
        let side = kind.process_side().opposite();
        self.utility_indices(side)
            .first()
            .map(|&index| self.stream(side, index))
    }

    pub fn initial_topology(&self) -> Topology {
        self.exchangers.iter().map(|e| e.address).collect()
    }

    /// Upper duty bound of an exchanger slot: the smaller of the two stream
    /// enthalpy flows, zero for empty slots.
    pub fn max_heat_load(&self, address: &ExchangerAddress, operating_case: usize) -> Real {
        if !address.exists {
            return 0.0;
        }
        let hot = self.hot_streams[address.hot_stream].enthalpy_flow(operating_case);
        let cold = self.cold_streams[address.cold_stream].enthalpy_flow(operating_case);
        hot.min(cold)
    }

    pub fn initial_operating_costs(&self) -> Real {
        self.price_initial_demand(|p| &p.cost_per_kwh)
    }

    pub fn initial_operating_emissions(&self) -> Real {
        self.price_initial_demand(|p| &p.emissions_per_kwh)
    }

    fn price_initial_demand(&self, factor: impl Fn(&UtilityPricing) -> &Vec<Real>) -> Real {
        let mut total = 0.0;
        let sides = [
            (UtilityKind::Heating, &self.initial_utility_demand.hot),
            (UtilityKind::Cooling, &self.initial_utility_demand.cold),
        ];
        for (kind, demand) in sides {
            if let Some(pricing) = self
                .balance_utility_stream(kind)
                .and_then(|s| s.utility.as_ref())
            {
                let specific = factor(pricing);
                total += demand.iter().zip(specific).map(|(d, c)| d * c).sum::<Real>();
            }
        }
        total
    }
}

fn validate_stream(stream: &Stream, n_oc: usize) -> ModelResult<()> {
    let columns: [(&str, &Vec<Real>); 6] = [
        ("supply temperatures", &stream.supply_temperatures),
        ("target temperatures", &stream.target_temperatures),
        ("film coefficients", &stream.film_coefficients),
        ("heat capacities", &stream.heat_capacities),
        ("mass flows", &stream.mass_flows),
        ("extreme temperatures", &stream.extreme_temperatures),
    ];
    for (what, values) in columns {
        check_dimension(&format!("stream '{}' {}", stream.name, what), n_oc, values.len())?;
    }
    if let Some(pricing) = &stream.utility {
        check_dimension(
            &format!("stream '{}' utility costs", stream.name),
            n_oc,
            pricing.cost_per_kwh.len(),
        )?;
        check_dimension(
            &format!("stream '{}' utility emissions", stream.name),
            n_oc,
            pricing.emissions_per_kwh.len(),
        )?;
    }
    for oc in 0..n_oc {
        if !(stream.film_coefficients[oc] > 0.0) || !(stream.heat_capacity_flow(oc) > 0.0) {
            return Err(ModelError::InvalidCase {
                what: format!(
                    "stream '{}' needs positive film coefficient and heat capacity flow",
                    stream.name
                ),
            });
        }
    }
    Ok(())
}

fn check_dimension(what: &str, expected: usize, found: usize) -> ModelResult<()> {
    if expected == found {
        Ok(())
    } else {
        Err(ModelError::Dimension {
            what: what.to_string(),
            expected,
            found,
        })
    }
}

fn check_index(what: &'static str, index: usize, len: usize) -> ModelResult<()> {
    if index < len {
        Ok(())
    } else {
        Err(ModelError::StreamIndex { what, index, len })
    }
}

fn invalid(what: &str) -> ModelError {
    ModelError::InvalidCase {
        what: what.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::two_stream_case;

    #[test]
    fn stream_flows() {
        let case = two_stream_case();
        let hot = &case.hot_streams[0];
        assert_eq!(hot.heat_capacity_flow(0), 50.0);
        assert!((hot.enthalpy_flow(0) - 50.0 * 104.0).abs() < 1e-9);
        assert!(!hot.is_utility());
        assert!(case.hot_streams[1].is_utility());
    }

    #[test]
    fn max_heat_load_is_smaller_enthalpy_flow() {
        let case = two_stream_case();
        let address = ExchangerAddress::new(0, 0, 0);
        // hot: 50 * 104 = 5200, cold: 40 * 110 = 4400
        assert!((case.max_heat_load(&address, 0) - 4400.0).abs() < 1e-9);
        assert_eq!(case.max_heat_load(&ExchangerAddress::removed(), 0), 0.0);
    }

    #[test]
    fn initial_operating_figures_price_first_utility() {
        let case = two_stream_case();
        assert!((case.initial_operating_costs() - 480_000.0).abs() < 1e-6);
        assert!((case.initial_operating_emissions() - 1_530.0).abs() < 1e-6);
    }

    #[test]
    fn validation_rejects_bad_dimensions() {
        let mut case = two_stream_case();
        case.initial_duties = DMatrix::zeros(1, 2);
        assert!(matches!(
            case.validate(),
            Err(ModelError::Dimension { .. })
        ));

        let mut case = two_stream_case();
        case.exchangers[0].address.stage = 7;
        assert!(matches!(
            case.validate(),
            Err(ModelError::StreamIndex { .. })
        ));

        let mut case = two_stream_case();
        case.restrictions.dt_lower_bound = 500.0;
        assert!(case.validate().is_err());
    }

    #[test]
    fn fixture_is_valid() {
        assert!(two_stream_case().validated().is_ok());
    }
}
