use crate::errors::DbError;
use bson::Bson;
use serde_json::Value;

use super::types::{CmpOp, Filter, MAX_IN_SET, UpdateDoc};

/// Parses a caller query into a [`Filter`].
///
/// The dialect is the store's native one, per field: a scalar means
/// equality, an object of `$`-operators (`$eq`, `$ne`, `$gt`, `$gte`, `$lt`,
/// `$lte`, `$in`, `$nin`, `$exists`) means the conjunction of those
/// predicates. Multiple fields are implicitly ANDed. `$or` is the one
/// top-level operator: an array of sub-queries, each parsed by these rules.
///
/// # Errors
/// Returns `DbError::InvalidQuery` when `query` is not a JSON object or
/// contains an unknown operator; malformed queries are caller bugs, not
/// store failures.
pub fn parse_query(query: &Value) -> Result<Filter, DbError> {
    let Some(obj) = query.as_object() else {
        return Err(DbError::InvalidQuery("query must be a JSON object".into()));
    };
    let mut filters = Vec::with_capacity(obj.len());
    for (field, cond) in obj {
        if field == "$or" {
            filters.push(parse_or(cond)?);
            continue;
        }
        if field.starts_with('$') {
            return Err(DbError::InvalidQuery(format!("unsupported top-level operator: {field}")));
        }
        filters.push(parse_field(field, cond)?);
    }
    Ok(match filters.len() {
        0 => Filter::True,
        1 => filters.remove(0),
        _ => Filter::And(filters),
    })
}

fn parse_or(cond: &Value) -> Result<Filter, DbError> {
    let Some(branches) = cond.as_array() else {
        return Err(DbError::InvalidQuery("$or requires an array of queries".into()));
    };
    if branches.is_empty() {
        return Err(DbError::InvalidQuery("$or requires at least one branch".into()));
    }
    Ok(Filter::Or(branches.iter().map(parse_query).collect::<Result<Vec<_>, _>>()?))
}

fn parse_field(field: &str, cond: &Value) -> Result<Filter, DbError> {
    // An object whose keys are all $-operators is a predicate set; any other
    // value (including a plain object) is matched by equality.
    if let Some(ops) = cond.as_object()
        && !ops.is_empty()
        && ops.keys().all(|k| k.starts_with('$'))
    {
        let mut parts = Vec::with_capacity(ops.len());
        for (op, arg) in ops {
            parts.push(parse_op(field, op, arg)?);
        }
        return Ok(if parts.len() == 1 { parts.remove(0) } else { Filter::And(parts) });
    }
    Ok(Filter::Cmp { path: field.to_string(), op: CmpOp::Eq, value: to_bson(cond)? })
}

fn parse_op(field: &str, op: &str, arg: &Value) -> Result<Filter, DbError> {
    let cmp = |o: CmpOp, v: &Value| -> Result<Filter, DbError> {
        Ok(Filter::Cmp { path: field.to_string(), op: o, value: to_bson(v)? })
    };
    match op {
        "$eq" => cmp(CmpOp::Eq, arg),
        "$gt" => cmp(CmpOp::Gt, arg),
        "$gte" => cmp(CmpOp::Gte, arg),
        "$lt" => cmp(CmpOp::Lt, arg),
        "$lte" => cmp(CmpOp::Lte, arg),
        "$ne" => Ok(Filter::Not(Box::new(cmp(CmpOp::Eq, arg)?))),
        "$in" => Ok(Filter::In { path: field.to_string(), values: to_bson_set(arg)? }),
        "$nin" => Ok(Filter::Nin { path: field.to_string(), values: to_bson_set(arg)? }),
        "$exists" => match arg.as_bool() {
            Some(exists) => Ok(Filter::Exists { path: field.to_string(), exists }),
            None => Err(DbError::InvalidQuery("$exists requires a boolean".into())),
        },
        other => Err(DbError::InvalidQuery(format!("unsupported operator: {other}"))),
    }
}

fn to_bson_set(arg: &Value) -> Result<Vec<Bson>, DbError> {
    let Some(items) = arg.as_array() else {
        return Err(DbError::InvalidQuery("$in/$nin require an array".into()));
    };
    items.iter().take(MAX_IN_SET).map(to_bson).collect()
}

fn to_bson(v: &Value) -> Result<Bson, DbError> {
    Bson::try_from(v.clone()).map_err(|e| DbError::InvalidQuery(format!("bad value: {e}")))
}

/// Parses a `$set` patch: a flat JSON object of fields to write.
///
/// # Errors
/// Returns `DbError::InvalidQuery` when `patch` is not a JSON object or
/// names a `$`-prefixed field.
pub fn parse_update(patch: &Value) -> Result<UpdateDoc, DbError> {
    let Some(obj) = patch.as_object() else {
        return Err(DbError::InvalidQuery("update data must be a JSON object".into()));
    };
    let mut out = UpdateDoc::default();
    for (k, v) in obj {
        if k.starts_with('$') {
            return Err(DbError::InvalidQuery(format!("operators not allowed in patch: {k}")));
        }
        out.set.push((k.clone(), to_bson(v)?));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_query_is_true() {
        assert!(matches!(parse_query(&json!({})).unwrap(), Filter::True));
    }

    #[test]
    fn scalar_is_equality() {
        let f = parse_query(&json!({"breed": "Boxer"})).unwrap();
        assert!(matches!(f, Filter::Cmp { path, op: CmpOp::Eq, .. } if path == "breed"));
    }

    #[test]
    fn range_and_set_predicates() {
        let f = parse_query(&json!({
            "age_upon_outcome_in_weeks": {"$gte": 26, "$lte": 156},
            "breed": {"$in": ["Newfoundland"]}
        }))
        .unwrap();
        let Filter::And(parts) = f else { panic!("expected And") };
        assert_eq!(parts.len(), 2);
    }

    #[test]
    fn or_combines_subqueries() {
        let f = parse_query(&json!({
            "$or": [{"breed": "Boxer"}, {"breed": "Husky"}]
        }))
        .unwrap();
        let Filter::Or(branches) = f else { panic!("expected Or") };
        assert_eq!(branches.len(), 2);
        assert!(parse_query(&json!({"$or": []})).is_err());
        assert!(parse_query(&json!({"$or": {"breed": "Boxer"}})).is_err());
    }

    #[test]
    fn non_object_rejected() {
        assert!(parse_query(&json!("breed")).is_err());
        assert!(parse_query(&json!(42)).is_err());
    }

    #[test]
    fn unknown_operator_rejected() {
        assert!(parse_query(&json!({"age": {"$wat": 1}})).is_err());
    }

    #[test]
    fn patch_rejects_operators() {
        assert!(parse_update(&json!({"$set": {"x": 1}})).is_err());
        let upd = parse_update(&json!({"sex_upon_outcome": "Neutered Male"})).unwrap();
        assert_eq!(upd.set.len(), 1);
    }
}
