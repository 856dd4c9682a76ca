use crate::engine::Engine;
use crate::errors::DbError;
use crate::query::{
    Accumulator, Filter, FindOptions, GroupSpec, SortSpec, Stage, parse_query, parse_update,
};
use crate::shelter::page::{Page, PageMetadata};
use crate::shelter::rescue::{RescueStats, profile_for};
use crate::store::{CollectionStore, DataStore};
use bson::Bson;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

/// Fields every record must carry at creation. `animal_id` is the
/// caller-facing key; the store's own identity never leaves this layer.
const REQUIRED_FIELDS: [&str; 3] = ["animal_id", "breed", "sex_upon_outcome"];

const AGE_FIELD: &str = "age_upon_outcome_in_weeks";

/// CRUD-plus-stats service over the animal collection.
///
/// Caller contract violations (non-object arguments, missing required
/// fields, malformed predicates) come back as `Err` before any store
/// access. Store-side failures never propagate: each operation catches
/// them, logs, and returns its safe default.
pub struct AnimalShelter {
    store: Box<dyn DataStore>,
}

impl AnimalShelter {
    #[must_use]
    pub fn new(store: Box<dyn DataStore>) -> Self {
        Self { store }
    }

    /// Binds the service to a named collection, creating it if absent.
    #[must_use]
    pub fn open(engine: &Engine, collection: &str) -> Self {
        let col = engine.create_collection(collection.to_string());
        Self::new(Box::new(CollectionStore::new(Arc::clone(&col))))
    }

    /// Inserts one record.
    ///
    /// Returns `Ok(true)` iff the store confirmed a new identity and
    /// `Ok(false)` when the store rejected the insert.
    ///
    /// # Errors
    /// `DbError::InvalidRecord` when `record` is not a JSON object or is
    /// missing a required field; raised before any store access.
    pub fn create(&self, record: &Value) -> Result<bool, DbError> {
        let Some(obj) = record.as_object() else {
            return Err(DbError::InvalidRecord("record must be a JSON object".into()));
        };
        for field in REQUIRED_FIELDS {
            if !obj.contains_key(field) {
                return Err(DbError::InvalidRecord(format!("missing required field: {field}")));
            }
        }
        let data = match Bson::try_from(record.clone()) {
            Ok(Bson::Document(d)) => d,
            _ => return Err(DbError::InvalidRecord("record is not a valid document".into())),
        };
        match self.store.insert_one(data) {
            Ok(id) => {
                log::debug!("created record {id}");
                Ok(true)
            }
            Err(e) => {
                log::error!("create failed: {e}");
                Ok(false)
            }
        }
    }

    /// Paginated, sorted, deduplicated read.
    ///
    /// `page` is clamped into `[1, total_pages]`; the returned page holds at
    /// most `page_size` records, unique by `animal_id`. Store failures
    /// degrade to an empty first-of-one page rather than an error.
    ///
    /// # Errors
    /// `DbError::InvalidQuery` when `query` is not a JSON object or uses an
    /// unknown operator; raised before any store access.
    pub fn read(
        &self,
        query: &Value,
        page: u64,
        page_size: usize,
        sort_by: Option<&[SortSpec]>,
    ) -> Result<Page, DbError> {
        let filter = parse_query(query)?;
        if page_size == 0 {
            log::error!("read degraded: page_size must be at least 1");
            return Ok(Page::degraded(page_size));
        }
        match self.read_page(&filter, page, page_size, sort_by) {
            Ok(result) => Ok(result),
            Err(e) => {
                log::error!("read degraded: {e}");
                Ok(Page::degraded(page_size))
            }
        }
    }

    fn read_page(
        &self,
        filter: &Filter,
        page: u64,
        page_size: usize,
        sort_by: Option<&[SortSpec]>,
    ) -> Result<Page, DbError> {
        let total_documents = self.store.count(filter)?;
        let total_pages = total_documents.div_ceil(page_size as u64).max(1);
        let current_page = page.clamp(1, total_pages);
        let skip = (current_page - 1) * page_size as u64;

        // Over-fetch at twice the page size so dedup can usually still fill
        // the page. Known limitation: a window that is more than half
        // duplicate animal_ids still yields a short page even when more
        // unique matches exist further on. The executor also caps any fetch
        // at 10_000 records, so a page_size above 5_000 gets less than a
        // doubled window and may come up short with no duplicates at all.
        let opts = FindOptions {
            sort: sort_by.map(<[SortSpec]>::to_vec),
            skip: Some(skip as usize),
            limit: Some(page_size * 2),
        };
        let fetched = self.store.find(filter, &opts)?;

        let mut seen: HashSet<String> = HashSet::with_capacity(page_size);
        let mut data = Vec::with_capacity(page_size);
        for doc in fetched {
            // Internal identity stays inside this layer; drop any stray
            // `_id` a bulk load may have left in the body.
            let mut body = doc.data;
            body.remove("_id");
            let animal_id = body
                .get_str("animal_id")
                .map_err(|_| DbError::QueryError("record has no animal_id".into()))?
                .to_string();
            if seen.insert(animal_id) {
                data.push(body);
                if data.len() == page_size {
                    break;
                }
            }
        }

        Ok(Page {
            data,
            metadata: PageMetadata {
                total_documents,
                total_pages,
                current_page,
                page_size,
                has_next: current_page < total_pages,
                has_prev: current_page > 1,
            },
        })
    }

    /// Bulk `$set` merge over every record matching `query`. Returns the
    /// count of records actually modified; 0 when the store fails.
    ///
    /// # Errors
    /// `DbError::InvalidQuery` unless both arguments are JSON objects.
    pub fn update(&self, query: &Value, update_data: &Value) -> Result<u64, DbError> {
        let filter = parse_query(query)?;
        let update = parse_update(update_data)?;
        match self.store.update_many(&filter, &update) {
            Ok(modified) => Ok(modified),
            Err(e) => {
                log::error!("update failed: {e}");
                Ok(0)
            }
        }
    }

    /// Bulk delete of every record matching `query`. Returns the count
    /// removed; 0 when the store fails.
    ///
    /// # Errors
    /// `DbError::InvalidQuery` unless `query` is a JSON object.
    pub fn delete(&self, query: &Value) -> Result<u64, DbError> {
        let filter = parse_query(query)?;
        match self.store.delete_many(&filter) {
            Ok(deleted) => Ok(deleted),
            Err(e) => {
                log::error!("delete failed: {e}");
                Ok(0)
            }
        }
    }

    /// One grouped pass over the record set, optionally pre-filtered by a
    /// named rescue profile. Unknown profile names aggregate unfiltered.
    /// Empty matching set and store failure both yield zeroed stats.
    #[must_use]
    pub fn aggregate_stats(&self, rescue_type: Option<&str>) -> RescueStats {
        let mut stages = Vec::with_capacity(3);
        if let Some(profile) = rescue_type.and_then(profile_for) {
            stages.push(Stage::Match(profile.filter()));
        }
        stages.push(Stage::Group(GroupSpec {
            key: None,
            accumulators: vec![
                ("total_animals".into(), Accumulator::Count),
                ("avg_age".into(), Accumulator::Avg(AGE_FIELD.into())),
                ("breeds".into(), Accumulator::AddToSet("breed".into())),
            ],
        }));
        stages.push(Stage::Project(vec![
            "total_animals".into(),
            "avg_age".into(),
            "breeds".into(),
        ]));

        match self.store.aggregate(&stages) {
            Ok(results) => results.first().map_or_else(RescueStats::default, |doc| {
                let mut breeds: Vec<String> = doc
                    .get_array("breeds")
                    .map(|arr| {
                        arr.iter()
                            .filter_map(|b| b.as_str().map(ToString::to_string))
                            .collect()
                    })
                    .unwrap_or_default();
                breeds.sort();
                RescueStats {
                    total_animals: doc.get_i64("total_animals").map_or(0, |n| n.max(0) as u64),
                    avg_age: doc.get_f64("avg_age").unwrap_or(0.0),
                    breeds,
                }
            }),
            Err(e) => {
                log::error!("aggregation failed: {e}");
                RescueStats::default()
            }
        }
    }
}
