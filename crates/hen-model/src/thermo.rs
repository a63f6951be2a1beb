//! Enthalpy-stage temperature propagation.
//!
//! Every stream carries `K + 1` stage-boundary temperatures per operating
//! case. Hot streams enter at boundary `K` and cool towards boundary 0, cold
//! streams enter at boundary 0 and heat up towards boundary `K`. An exchanger
//! in stage `k` sits between boundaries `k` and `k + 1` of both streams.

use crate::case_study::{CaseStudy, StreamKind};
use crate::topology::{ExchangerAddress, Topology};
use hen_core::Real;
use nalgebra::DMatrix;

/// Four terminal temperatures of one exchanger in one operating case (K).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundaryTemperatures {
    pub hot_in: Real,
    pub hot_out: Real,
    pub cold_in: Real,
    pub cold_out: Real,
}

impl BoundaryTemperatures {
    /// Difference at the hot-outlet / cold-inlet end.
    pub fn dt_cold_end(&self) -> Real {
        self.hot_out - self.cold_in
    }

    /// Difference at the hot-inlet / cold-outlet end.
    pub fn dt_hot_end(&self) -> Real {
        self.hot_in - self.cold_out
    }

    pub fn log_mean(&self) -> Real {
        hen_core::log_mean(self.dt_cold_end(), self.dt_hot_end())
    }
}

/// Stage-boundary temperatures, one matrix per stream with operating cases
/// as rows and stage boundaries as columns.
#[derive(Clone, Debug, PartialEq)]
pub struct StageTemperatures {
    hot: Vec<DMatrix<Real>>,
    cold: Vec<DMatrix<Real>>,
}

impl StageTemperatures {
    /// Walk every stream through its stages. Duties of empty slots are
    /// ignored; `duties` is exchangers × operating cases.
    pub fn propagate(case: &CaseStudy, topology: &Topology, duties: &DMatrix<Real>) -> Self {
        let n_oc = case.number_operating_cases();
        let n_stages = case.enthalpy_stages;

        let stage_duty = |kind: StreamKind, stream: usize, stage: usize, oc: usize| -> Real {
            topology
                .members(kind, stream, stage)
                .into_iter()
                .map(|exchanger| duties[(exchanger, oc)])
                .sum()
        };

        let hot = case
            .hot_streams
            .iter()
            .enumerate()
            .map(|(index, stream)| {
                let mut t = DMatrix::zeros(n_oc, n_stages + 1);
                for oc in 0..n_oc {
                    let cp = stream.heat_capacity_flow(oc);
                    t[(oc, n_stages)] = stream.supply_temperatures[oc];
                    for stage in (0..n_stages).rev() {
                        t[(oc, stage)] =
                            t[(oc, stage + 1)] - stage_duty(StreamKind::Hot, index, stage, oc) / cp;
                    }
                }
                t
            })
            .collect();

        let cold = case
            .cold_streams
            .iter()
            .enumerate()
            .map(|(index, stream)| {
                let mut t = DMatrix::zeros(n_oc, n_stages + 1);
                for oc in 0..n_oc {
                    let cp = stream.heat_capacity_flow(oc);
                    t[(oc, 0)] = stream.supply_temperatures[oc];
                    for stage in 0..n_stages {
                        t[(oc, stage + 1)] =
                            t[(oc, stage)] + stage_duty(StreamKind::Cold, index, stage, oc) / cp;
                    }
                }
                t
            })
            .collect();

        Self { hot, cold }
    }

    pub fn stream(&self, kind: StreamKind, stream: usize) -> &DMatrix<Real> {
        match kind {
            StreamKind::Hot => &self.hot[stream],
            StreamKind::Cold => &self.cold[stream],
        }
    }

    /// Temperature of a stream at a stage boundary.
    pub fn at(&self, kind: StreamKind, stream: usize, boundary: usize, operating_case: usize) -> Real {
        self.stream(kind, stream)[(operating_case, boundary)]
    }

    /// Hot stream temperature after its last stage (boundary 0).
    pub fn hot_outlet(&self, stream: usize, operating_case: usize) -> Real {
        self.hot[stream][(operating_case, 0)]
    }

    /// Cold stream temperature after its last stage (boundary K).
    pub fn cold_outlet(&self, stream: usize, operating_case: usize) -> Real {
        let t = &self.cold[stream];
        t[(operating_case, t.ncols() - 1)]
    }

    pub fn boundary(&self, address: &ExchangerAddress, operating_case: usize) -> BoundaryTemperatures {
        let hot = &self.hot[address.hot_stream];
        let cold = &self.cold[address.cold_stream];
        BoundaryTemperatures {
            hot_in: hot[(operating_case, address.stage + 1)],
            hot_out: hot[(operating_case, address.stage)],
            cold_in: cold[(operating_case, address.stage)],
            cold_out: cold[(operating_case, address.stage + 1)],
        }
    }
}
