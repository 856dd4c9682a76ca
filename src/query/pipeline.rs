use crate::collection::Collection;
use bson::{Bson, Document as BsonDocument};
use std::cmp::Ordering;
use std::sync::Arc;

use super::eval::{compare_bson, eval_filter};
use super::types::Filter;

/// A stage of the aggregation pipeline, applied in sequence.
#[derive(Debug, Clone)]
pub enum Stage {
    /// Keep only documents matching the filter.
    Match(Filter),
    /// Collapse documents into per-key groups of accumulated values.
    Group(GroupSpec),
    /// Keep only the named output fields.
    Project(Vec<String>),
}

/// Group stage: `key = None` folds the whole input into a single group.
#[derive(Debug, Clone)]
pub struct GroupSpec {
    pub key: Option<String>,
    pub accumulators: Vec<(String, Accumulator)>,
}

#[derive(Debug, Clone)]
pub enum Accumulator {
    /// Number of documents in the group.
    Count,
    /// Arithmetic mean of a numeric field; documents without a numeric
    /// value for the field are ignored. Null when none contribute.
    Avg(String),
    /// Distinct values of a field, in first-encounter order.
    AddToSet(String),
}

/// Runs the stages over a snapshot of the collection's record bodies.
pub fn run_pipeline(col: &Arc<Collection>, stages: &[Stage]) -> Vec<BsonDocument> {
    let mut docs: Vec<BsonDocument> =
        col.get_all_documents().into_iter().map(|d| d.data).collect();
    for stage in stages {
        docs = match stage {
            Stage::Match(filter) => {
                docs.into_iter().filter(|d| eval_filter(d, filter)).collect()
            }
            Stage::Group(spec) => run_group(&docs, spec),
            Stage::Project(fields) => docs
                .into_iter()
                .map(|d| {
                    let mut out = BsonDocument::new();
                    for f in fields {
                        if let Some(v) = d.get(f.as_str()) {
                            out.insert(f.clone(), v.clone());
                        }
                    }
                    out
                })
                .collect(),
        };
    }
    log::debug!("pipeline on {}: {} stages -> {} docs", col.name_str(), stages.len(), docs.len());
    docs
}

fn run_group(docs: &[BsonDocument], spec: &GroupSpec) -> Vec<BsonDocument> {
    // A grouped pass over zero documents yields zero groups, matching the
    // store convention callers rely on for the empty-set case.
    if docs.is_empty() {
        return Vec::new();
    }
    let mut groups: Vec<(Bson, Vec<&BsonDocument>)> = Vec::new();
    for doc in docs {
        let key = match &spec.key {
            Some(field) => doc.get(field.as_str()).cloned().unwrap_or(Bson::Null),
            None => Bson::Null,
        };
        match groups.iter().position(|(k, _)| compare_bson(k, &key) == Ordering::Equal) {
            Some(i) => groups[i].1.push(doc),
            None => groups.push((key, vec![doc])),
        }
    }
    groups
        .into_iter()
        .map(|(key, members)| {
            let mut out = BsonDocument::new();
            out.insert("_id".to_string(), key);
            for (name, acc) in &spec.accumulators {
                out.insert(name.clone(), finalize(acc, &members));
            }
            out
        })
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn finalize(acc: &Accumulator, members: &[&BsonDocument]) -> Bson {
    match acc {
        Accumulator::Count => Bson::Int64(members.len() as i64),
        Accumulator::Avg(field) => {
            let values: Vec<f64> =
                members.iter().filter_map(|d| numeric(d.get(field.as_str()))).collect();
            if values.is_empty() {
                Bson::Null
            } else {
                Bson::Double(values.iter().sum::<f64>() / values.len() as f64)
            }
        }
        Accumulator::AddToSet(field) => {
            let mut set: Vec<Bson> = Vec::new();
            for d in members {
                if let Some(v) = d.get(field.as_str())
                    && !set.iter().any(|x| compare_bson(x, v) == Ordering::Equal)
                {
                    set.push(v.clone());
                }
            }
            Bson::Array(set)
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn numeric(v: Option<&Bson>) -> Option<f64> {
    match v {
        Some(Bson::Int32(i)) => Some(f64::from(*i)),
        Some(Bson::Int64(i)) => Some(*i as f64),
        Some(Bson::Double(f)) => Some(*f),
        _ => None,
    }
}
