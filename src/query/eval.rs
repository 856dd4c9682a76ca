use bson::{Bson, Document as BsonDocument};
use std::cmp::Ordering;

use super::types::{CmpOp, Filter, MAX_IN_SET, MAX_PATH_DEPTH, MAX_SORT_FIELDS, Order, SortSpec};

pub fn eval_filter(doc: &BsonDocument, filter: &Filter) -> bool {
    match filter {
        Filter::True => true,
        Filter::And(fs) => fs.iter().all(|f| eval_filter(doc, f)),
        Filter::Or(fs) => fs.iter().any(|f| eval_filter(doc, f)),
        Filter::Not(f) => !eval_filter(doc, f),
        Filter::Exists { path, exists } => get_path(doc, path).is_some() == *exists,
        Filter::In { path, values } => get_path(doc, path).is_some_and(|v| is_in_set(v, values)),
        Filter::Nin { path, values } => !get_path(doc, path).is_some_and(|v| is_in_set(v, values)),
        Filter::Cmp { path, op, value } => {
            if let Some(v) = get_path(doc, path) {
                match op {
                    CmpOp::Eq => compare_bson(v, value) == Ordering::Equal,
                    CmpOp::Gt => compare_bson(v, value) == Ordering::Greater,
                    CmpOp::Gte => compare_bson(v, value) != Ordering::Less,
                    CmpOp::Lt => compare_bson(v, value) == Ordering::Less,
                    CmpOp::Lte => compare_bson(v, value) != Ordering::Greater,
                }
            } else {
                false
            }
        }
    }
}

/// Multi-key comparison for sorting; missing fields sort before present ones.
pub fn compare_docs(a: &BsonDocument, b: &BsonDocument, sort: &[SortSpec]) -> Ordering {
    for s in sort.iter().take(MAX_SORT_FIELDS) {
        let va = a.get(&s.field);
        let vb = b.get(&s.field);
        let ord = match (va, vb) {
            (Some(x), Some(y)) => compare_bson(x, y),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        };
        if ord != Ordering::Equal {
            return if matches!(s.order, Order::Asc) { ord } else { ord.reverse() };
        }
    }
    Ordering::Equal
}

fn is_in_set(v: &Bson, set: &[Bson]) -> bool {
    set.iter().take(MAX_IN_SET).any(|x| compare_bson(v, x) == Ordering::Equal)
}

/// Resolves a dotted path through nested documents; depth-capped.
fn get_path<'a>(doc: &'a BsonDocument, path: &str) -> Option<&'a Bson> {
    if path.is_empty() {
        return None;
    }
    if !path.contains('.') {
        return doc.get(path);
    }
    let mut cur = doc;
    let mut parts = path.split('.').peekable();
    let mut depth = 0usize;
    while let Some(part) = parts.next() {
        depth += 1;
        if depth > MAX_PATH_DEPTH {
            return None;
        }
        let v = cur.get(part)?;
        if parts.peek().is_none() {
            return Some(v);
        }
        match v {
            Bson::Document(d) => cur = d,
            _ => return None,
        }
    }
    None
}

/// Total order over BSON values: numerics compare across types, strings and
/// booleans compare natively, everything else falls back to a type rank.
pub fn compare_bson(a: &Bson, b: &Bson) -> Ordering {
    use bson::Bson as T;
    fn is_num(x: &T) -> bool {
        matches!(x, T::Int32(_) | T::Int64(_) | T::Double(_))
    }
    #[allow(clippy::cast_precision_loss)]
    fn as_f64_num(x: &T) -> f64 {
        match x {
            T::Int32(i) => f64::from(*i),
            T::Int64(i) => *i as f64,
            T::Double(f) => *f,
            _ => f64::NAN,
        }
    }
    if is_num(a) && is_num(b) {
        return as_f64_num(a).total_cmp(&as_f64_num(b));
    }
    match (a, b) {
        (T::String(x), T::String(y)) => x.cmp(y),
        (T::Boolean(x), T::Boolean(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(v: &Bson) -> u8 {
    use bson::Bson as T;
    match v {
        T::Null => 0,
        T::Boolean(_) => 1,
        T::Int32(_) | T::Int64(_) | T::Double(_) => 2,
        T::String(_) => 3,
        T::Array(_) => 4,
        T::Document(_) => 5,
        T::DateTime(_) => 6,
        _ => 7,
    }
}
