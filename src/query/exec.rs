use crate::collection::Collection;
use crate::document::Document;
use crate::types::DocumentId;
use std::sync::Arc;

use super::eval::{compare_bson, compare_docs, eval_filter};
use super::types::{DeleteReport, Filter, FindOptions, MAX_LIMIT, UpdateDoc, UpdateReport};
use std::cmp::Ordering;

/// Runs a filtered find: filter, then sort, then skip/limit.
/// Without a sort the collection's insertion order is preserved.
pub fn find_docs(col: &Arc<Collection>, filter: &Filter, opts: &FindOptions) -> Vec<Document> {
    let mut docs: Vec<Document> = col
        .get_all_documents()
        .into_iter()
        .filter(|d| eval_filter(&d.data, filter))
        .collect();

    if let Some(sort) = &opts.sort {
        docs.sort_by(|a, b| compare_docs(&a.data, &b.data, sort));
    }

    let skip = opts.skip.unwrap_or(0);
    let limit = opts.limit.unwrap_or(usize::MAX).min(MAX_LIMIT);
    let end = skip.saturating_add(limit).min(docs.len());
    let docs = if skip >= docs.len() { Vec::new() } else { docs[skip..end].to_vec() };
    log::debug!(
        "find on {}: skip={skip} limit={limit} -> {} docs",
        col.name_str(),
        docs.len()
    );
    docs
}

#[must_use]
pub fn count_docs(col: &Arc<Collection>, filter: &Filter) -> usize {
    col.get_all_documents().iter().filter(|d| eval_filter(&d.data, filter)).count()
}

/// Applies a `$set` merge to every matching document.
pub fn update_many(col: &Arc<Collection>, filter: &Filter, update: &UpdateDoc) -> UpdateReport {
    let mut matched = 0u64;
    let mut modified = 0u64;
    let ids: Vec<DocumentId> = col
        .list_ids()
        .into_iter()
        .filter(|id| col.find_document(id).is_some_and(|d| eval_filter(&d.data, filter)))
        .collect();
    for id in ids {
        if let Some(mut doc) = col.find_document(&id) {
            matched += 1;
            if apply_update(&mut doc, update) {
                modified += 1;
                col.update_document(&id, doc.data);
            }
        }
    }
    log::debug!("update_many on {}: matched={matched} modified={modified}", col.name_str());
    UpdateReport { matched, modified }
}

pub fn delete_many(col: &Arc<Collection>, filter: &Filter) -> DeleteReport {
    let mut deleted = 0u64;
    let ids: Vec<DocumentId> = col
        .list_ids()
        .into_iter()
        .filter(|id| col.find_document(id).is_some_and(|d| eval_filter(&d.data, filter)))
        .collect();
    for id in ids {
        if col.delete_document(&id) {
            deleted += 1;
        }
    }
    log::debug!("delete_many on {}: deleted={deleted}", col.name_str());
    DeleteReport { deleted }
}

/// Merges `upd.set` into the document body. Returns true when any field
/// actually changed value.
pub fn apply_update(doc: &mut Document, upd: &UpdateDoc) -> bool {
    let mut changed = false;
    for (k, v) in &upd.set {
        let prev = doc.data.get(k.as_str()).cloned();
        let is_change = prev.as_ref().is_none_or(|p| compare_bson(p, v) != Ordering::Equal);
        doc.data.insert(k.clone(), v.clone());
        if is_change {
            changed = true;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{CmpOp, Order, SortSpec};
    use bson::doc;

    fn seeded() -> Arc<Collection> {
        let col = Arc::new(Collection::new("u_exec".to_string()));
        col.insert_document(Document::new(doc! {"k": 1, "v": 3}));
        col.insert_document(Document::new(doc! {"k": 2, "v": 1}));
        col.insert_document(Document::new(doc! {"k": 3, "v": 2}));
        col
    }

    #[test]
    fn find_docs_sort_and_pagination() {
        let col = seeded();
        let opts = FindOptions {
            sort: Some(vec![SortSpec { field: "v".into(), order: Order::Asc }]),
            limit: Some(2),
            skip: Some(0),
        };
        let docs = find_docs(&col, &Filter::True, &opts);
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].data.get_i32("k").unwrap(), 2); // v asc => k=2 first
    }

    #[test]
    fn find_docs_skip_past_end_is_empty() {
        let col = seeded();
        let opts = FindOptions { sort: None, limit: Some(5), skip: Some(10) };
        assert!(find_docs(&col, &Filter::True, &opts).is_empty());
    }

    #[test]
    fn update_many_set_merge_counts_changes() {
        let col = seeded();
        let filter = Filter::Cmp { path: "k".into(), op: CmpOp::Gte, value: 2.into() };
        let upd = UpdateDoc { set: vec![("v".into(), bson::Bson::Int32(9))] };
        let rep = update_many(&col, &filter, &upd);
        assert_eq!(rep.matched, 2);
        assert_eq!(rep.modified, 2);
        // no-op second pass matches but modifies nothing
        let rep = update_many(&col, &filter, &upd);
        assert_eq!(rep.matched, 2);
        assert_eq!(rep.modified, 0);
    }

    #[test]
    fn update_many_inserts_absent_field() {
        let col = seeded();
        let filter = Filter::Cmp { path: "k".into(), op: CmpOp::Eq, value: 1.into() };
        let upd = UpdateDoc { set: vec![("tag".into(), bson::Bson::String("new".into()))] };
        let rep = update_many(&col, &filter, &upd);
        assert_eq!(rep.matched, 1);
        assert_eq!(rep.modified, 1);
        let doc = find_docs(&col, &filter, &FindOptions::default()).remove(0);
        assert_eq!(doc.data.get_str("tag").unwrap(), "new");
        // existing fields survive the merge
        assert_eq!(doc.data.get_i32("v").unwrap(), 3);
    }

    #[test]
    fn delete_many_removes_matches() {
        let col = seeded();
        let filter = Filter::Cmp { path: "v".into(), op: CmpOp::Lt, value: 3.into() };
        let rep = delete_many(&col, &filter);
        assert_eq!(rep.deleted, 2);
        assert_eq!(col.len(), 1);
    }
}
