//! hen-model: thermodynamic and cost model of a heat-exchanger network.
//!
//! Contains:
//! - case_study (streams, operating cases, as-built exchangers, economics)
//! - topology (exchanger addresses and the topology screens)
//! - thermo (enthalpy-stage temperature propagation)
//! - exchanger (areas, mixer resolution, temperature and mixer checks)
//! - balance (heaters and coolers closing each stream to its target)
//! - costs / sequence (retrofit capital costs)
//! - network (one evaluated network state per topology and duty matrix)

pub mod balance;
pub mod case_study;
pub mod costs;
pub mod error;
pub mod exchanger;
pub mod feasibility;
pub mod network;
pub mod sequence;
pub mod thermo;
pub mod topology;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use balance::BalanceOperation;
pub use case_study::{
    BalanceUtility, CaseStudy, Economics, ExchangerCosts, InitialExchanger, OperatingCase,
    Restrictions, Stream, StreamKind, UtilityDemand, UtilityKind, UtilityPricing,
};
pub use costs::CapitalCosts;
pub use error::{ModelError, ModelResult};
pub use exchanger::{ExchangerOperation, MixerType, OperatingPoint};
pub use feasibility::Infeasibility;
pub use network::NetworkState;
pub use thermo::{BoundaryTemperatures, StageTemperatures};
pub use topology::{ADDRESS_COLUMNS, ExchangerAddress, Topology};
