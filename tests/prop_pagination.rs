use proptest::prelude::*;
use serde_json::json;
use shelterlite::Database;
use shelterlite::shelter::AnimalShelter;
use std::collections::HashSet;

fn seeded(ids: &[u8]) -> (Database, AnimalShelter) {
    let db = Database::new();
    let svc = db.shelter("animals");
    for id in ids {
        svc.create(&json!({
            "animal_id": format!("A{id:03}"),
            "breed": "Boxer",
            "sex_upon_outcome": "Intact Male",
        }))
        .unwrap();
    }
    (db, svc)
}

proptest! {
    #[test]
    fn prop_total_pages_formula(total in 0usize..120, page_size in 1usize..16) {
        let ids: Vec<u8> = (0..total).map(|i| i as u8).collect();
        let (_db, svc) = seeded(&ids);
        let page = svc.read(&json!({}), 1, page_size, None).unwrap();
        prop_assert_eq!(page.metadata.total_documents as usize, total);
        prop_assert_eq!(
            page.metadata.total_pages as usize,
            std::cmp::max(1, total.div_ceil(page_size))
        );
    }

    #[test]
    fn prop_requested_page_is_clamped(
        total in 0usize..100,
        page_size in 1usize..12,
        page in 0u64..40,
    ) {
        let ids: Vec<u8> = (0..total).map(|i| i as u8).collect();
        let (_db, svc) = seeded(&ids);
        let result = svc.read(&json!({}), page, page_size, None).unwrap();
        let m = &result.metadata;
        prop_assert!(m.current_page >= 1 && m.current_page <= m.total_pages);
        prop_assert_eq!(m.has_prev, m.current_page > 1);
        prop_assert_eq!(m.has_next, m.current_page < m.total_pages);
        // distinct seeds: the clamped page is full except possibly the last
        let skip = ((m.current_page - 1) as usize) * page_size;
        prop_assert_eq!(result.data.len(), page_size.min(total.saturating_sub(skip)));
    }

    #[test]
    fn prop_page_unique_and_bounded_under_duplicates(
        ids in proptest::collection::vec(0u8..20, 0..60),
        page_size in 1usize..8,
    ) {
        let (_db, svc) = seeded(&ids);
        let result = svc.read(&json!({}), 1, page_size, None).unwrap();

        prop_assert!(result.data.len() <= page_size);
        let returned: Vec<String> = result
            .data
            .iter()
            .map(|d| d.get_str("animal_id").unwrap().to_string())
            .collect();
        let unique: HashSet<&String> = returned.iter().collect();
        prop_assert_eq!(unique.len(), returned.len(), "duplicate animal_id in page");

        // dedup over the 2x over-fetch window keeps first occurrences, so
        // the page length is exactly min(page_size, distinct-in-window)
        let window: Vec<String> = ids
            .iter()
            .take(page_size * 2)
            .map(|id| format!("A{id:03}"))
            .collect();
        let mut seen = HashSet::new();
        let distinct_in_window = window.iter().filter(|id| seen.insert(*id)).count();
        prop_assert_eq!(result.data.len(), page_size.min(distinct_in_window));
    }
}
