use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::SqliteStore;
use crate::error::Result;
use crate::types::*;

/// Inserts sample catalog data. Each table is guarded by a row-count check,
/// so running init repeatedly never duplicates rows.
pub fn seed_sample_data(store: &SqliteStore) -> Result<()> {
    let now = Utc::now();

    if store.catalog_count::<Classroom>()? == 0 {
        for (name, building, capacity, facilities) in [
            ("A-101", "Main", 60, Some("projector, whiteboard")),
            ("A-102", "Main", 40, Some("whiteboard")),
            ("S-210", "Science", 80, Some("projector, audio system")),
        ] {
            store.catalog_insert(&Classroom {
                id: Uuid::new_v4().to_string(),
                name: name.to_string(),
                building: building.to_string(),
                capacity,
                facilities: facilities.map(str::to_string),
                created_at: now,
                updated_at: now,
            })?;
        }
        tracing::info!("Seeded sample classrooms");
    }

    if store.catalog_count::<Lab>()? == 0 {
        for (name, building, capacity, equipment) in [
            ("Computer Lab 1", "Science", 30, Some("30 workstations")),
            ("Physics Lab", "Science", 24, Some("oscilloscopes, benches")),
        ] {
            store.catalog_insert(&Lab {
                id: Uuid::new_v4().to_string(),
                name: name.to_string(),
                building: building.to_string(),
                capacity,
                equipment: equipment.map(str::to_string),
                created_at: now,
                updated_at: now,
            })?;
        }
        tracing::info!("Seeded sample labs");
    }

    if store.catalog_count::<BusRoute>()? == 0 {
        seed_bus_routes(store, now)?;
        tracing::info!("Seeded sample bus routes");
    }

    if store.catalog_count::<CafeteriaMenuItem>()? == 0 {
        for (day, meal, dish, price_cents) in [
            (Weekday::Monday, MealPeriod::Breakfast, "Oatmeal and fruit", 250),
            (Weekday::Monday, MealPeriod::Lunch, "Vegetable curry", 450),
            (Weekday::Monday, MealPeriod::Dinner, "Pasta bake", 500),
            (Weekday::Tuesday, MealPeriod::Lunch, "Chicken rice bowl", 480),
        ] {
            store.catalog_insert(&CafeteriaMenuItem {
                id: Uuid::new_v4().to_string(),
                day_of_week: day,
                meal,
                dish: dish.to_string(),
                price_cents: Some(price_cents),
                created_at: now,
                updated_at: now,
            })?;
        }
        tracing::info!("Seeded sample cafeteria menu");
    }

    if store.catalog_count::<CafeteriaInfo>()? == 0 {
        store.catalog_insert(&CafeteriaInfo {
            id: Uuid::new_v4().to_string(),
            name: "Central Cafeteria".to_string(),
            location: "Main Building, ground floor".to_string(),
            opening_hours: "07:00-20:00".to_string(),
            contact: Some("cafeteria@campus.example".to_string()),
            created_at: now,
            updated_at: now,
        })?;
        tracing::info!("Seeded cafeteria info");
    }

    Ok(())
}

fn seed_bus_routes(store: &SqliteStore, now: DateTime<Utc>) -> Result<()> {
    let routes: [(&str, Option<&str>, &[(&str, &str)]); 2] = [
        (
            "Campus Loop",
            Some("Clockwise loop around the main campus"),
            &[
                ("Main Gate", "08:00"),
                ("Library", "08:07"),
                ("Science Block", "08:12"),
                ("Dormitories", "08:20"),
            ],
        ),
        (
            "City Express",
            Some("Campus to city center"),
            &[("Main Gate", "08:30"), ("Central Station", "08:55")],
        ),
    ];

    for (name, description, stops) in routes {
        let route = BusRoute {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: description.map(str::to_string),
            created_at: now,
            updated_at: now,
        };
        store.catalog_insert(&route)?;

        let stops: Vec<BusStop> = stops
            .iter()
            .enumerate()
            .map(|(i, (stop_name, arrival))| BusStop {
                bus_id: route.id.clone(),
                position: i as i64,
                name: (*stop_name).to_string(),
                arrival_time: Some((*arrival).to_string()),
            })
            .collect();
        store.set_bus_stops(&route.id, &stops)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_seed_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let store = SqliteStore::new(temp.path().join("test.db")).unwrap();
        store.initialize().unwrap();

        seed_sample_data(&store).unwrap();
        let classrooms = store.catalog_count::<Classroom>().unwrap();
        let menu_items = store.catalog_count::<CafeteriaMenuItem>().unwrap();
        assert!(classrooms > 0);
        assert!(menu_items > 0);

        seed_sample_data(&store).unwrap();
        assert_eq!(store.catalog_count::<Classroom>().unwrap(), classrooms);
        assert_eq!(
            store.catalog_count::<CafeteriaMenuItem>().unwrap(),
            menu_items
        );
    }

    #[test]
    fn test_seeded_routes_have_ordered_stops() {
        let temp = TempDir::new().unwrap();
        let store = SqliteStore::new(temp.path().join("test.db")).unwrap();
        store.initialize().unwrap();
        seed_sample_data(&store).unwrap();

        let routes: Vec<BusRoute> = store.catalog_list().unwrap();
        assert_eq!(routes.len(), 2);
        for route in routes {
            let stops = store.list_bus_stops(&route.id).unwrap();
            assert!(!stops.is_empty());
            let positions: Vec<i64> = stops.iter().map(|s| s.position).collect();
            let mut sorted = positions.clone();
            sorted.sort_unstable();
            assert_eq!(positions, sorted);
        }
    }
}
