//! Case-study file validation: ids, references and list lengths.

use crate::schema::{CaseStudyDef, StreamDef, StreamKindDef, UtilityKindDef};
use std::collections::{HashMap, HashSet};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

pub fn validate_case(case: &CaseStudyDef) -> Result<(), ValidationError> {
    if case.enthalpy_stages == 0 {
        return Err(invalid("enthalpy_stages", "0", "at least one stage is required"));
    }
    if case.operating_cases.is_empty() {
        return Err(invalid("operating_cases", "[]", "at least one operating case is required"));
    }

    let mut oc_ids = HashSet::new();
    for oc in &case.operating_cases {
        if !oc_ids.insert(&oc.id) {
            return Err(duplicate(&oc.id, "operating_cases"));
        }
        if !(oc.end_h > oc.start_h) {
            return Err(invalid(
                &format!("operating case '{}' end_h", oc.id),
                &oc.end_h.to_string(),
                "must be after start_h",
            ));
        }
    }
    let n_oc = case.operating_cases.len();

    let mut kinds: HashMap<&str, StreamKindDef> = HashMap::new();
    for stream in &case.streams {
        if kinds.insert(&stream.id, stream.kind).is_some() {
            return Err(duplicate(&stream.id, "streams"));
        }
        validate_stream(stream, n_oc)?;
    }

    let mut exchanger_ids = HashSet::new();
    for exchanger in &case.exchangers {
        let context = format!("exchanger '{}'", exchanger.id);
        if !exchanger_ids.insert(&exchanger.id) {
            return Err(duplicate(&exchanger.id, "exchangers"));
        }
        check_stream_ref(&kinds, &exchanger.hot, StreamKindDef::Hot, &context)?;
        check_stream_ref(&kinds, &exchanger.cold, StreamKindDef::Cold, &context)?;
        if exchanger.stage >= case.enthalpy_stages {
            return Err(invalid(
                &format!("{context} stage"),
                &exchanger.stage.to_string(),
                "must be below enthalpy_stages",
            ));
        }
        if exchanger.area_m2 < 0.0 {
            return Err(invalid(
                &format!("{context} area_m2"),
                &exchanger.area_m2.to_string(),
                "must be non-negative",
            ));
        }
        check_len(&format!("{context} duties_kw"), exchanger.duties_kw.len(), n_oc)?;
    }

    for balance in &case.balance_utilities {
        let context = format!("{:?} balance utility", balance.kind).to_lowercase();
        let side = match balance.kind {
            UtilityKindDef::Heating => StreamKindDef::Cold,
            UtilityKindDef::Cooling => StreamKindDef::Hot,
        };
        check_stream_ref(&kinds, &balance.stream, side, &context)?;
    }

    for entry in &case.match_costs {
        check_stream_ref(&kinds, &entry.hot, StreamKindDef::Hot, "match_costs")?;
        check_stream_ref(&kinds, &entry.cold, StreamKindDef::Cold, "match_costs")?;
    }

    let demand = &case.initial_utility_demand;
    check_len("initial_utility_demand.hot_kwh", demand.hot_kwh.len(), n_oc)?;
    check_len("initial_utility_demand.cold_kwh", demand.cold_kwh.len(), n_oc)?;

    Ok(())
}

fn validate_stream(stream: &StreamDef, n_oc: usize) -> Result<(), ValidationError> {
    let mut columns = vec![
        ("supply_c", stream.supply_c.len()),
        ("target_c", stream.target_c.len()),
        ("film_coefficient", stream.film_coefficient.len()),
        ("heat_capacity", stream.heat_capacity.len()),
        ("mass_flow", stream.mass_flow.len()),
    ];
    if let Some(extreme) = &stream.extreme_c {
        columns.push(("extreme_c", extreme.len()));
    }
    if let Some(utility) = &stream.utility {
        columns.push(("utility.cost_per_kwh", utility.cost_per_kwh.len()));
        columns.push(("utility.emissions_per_kwh", utility.emissions_per_kwh.len()));
    }
    for (field, len) in columns {
        check_len(&format!("stream '{}' {field}", stream.id), len, n_oc)?;
    }
    Ok(())
}

fn check_stream_ref(
    kinds: &HashMap<&str, StreamKindDef>,
    id: &str,
    expected: StreamKindDef,
    context: &str,
) -> Result<(), ValidationError> {
    match kinds.get(id) {
        None => Err(ValidationError::MissingReference {
            id: id.to_string(),
            context: context.to_string(),
        }),
        Some(kind) if *kind != expected => Err(invalid(
            &format!("{context} stream"),
            id,
            &format!("expected a {expected:?} stream").to_lowercase(),
        )),
        Some(_) => Ok(()),
    }
}

fn check_len(field: &str, found: usize, expected: usize) -> Result<(), ValidationError> {
    if found == expected {
        Ok(())
    } else {
        Err(invalid(
            field,
            &format!("{found} values"),
            &format!("expected one per operating case ({expected})"),
        ))
    }
}

fn duplicate(id: &str, context: &str) -> ValidationError {
    ValidationError::DuplicateId {
        id: id.to_string(),
        context: context.to_string(),
    }
}

fn invalid(field: &str, value: &str, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
