use cmms_core::AppResult;
use cmms_domain::EntityRecord;
use cmms_infrastructure::InMemoryEntityCollectionApi;
use serde_json::{Value, json};
use tracing::info;

/// Seeds the store with a small campus, returning the number of records.
///
/// Listing columns that a SQL backend would join in (building, room, person
/// names) are stored directly on the seeded rows.
pub async fn run(store: &InMemoryEntityCollectionApi) -> AppResult<usize> {
    let mut total = 0;

    for (collection, rows) in seed_rows() {
        let records = rows
            .into_iter()
            .map(EntityRecord::from_value)
            .collect::<AppResult<Vec<_>>>()?;
        let count = store.seed(collection, records).await?;
        info!(collection, count, "seeded collection");
        total += count;
    }

    Ok(total)
}

fn seed_rows() -> Vec<(&'static str, Vec<Value>)> {
    vec![
        (
            "schools",
            vec![
                json!({ "school_name": "School of Computing", "department": "COMP", "faculty": "Faculty of Engineering" }),
                json!({ "school_name": "School of Design", "department": "SD", "faculty": "Faculty of Design" }),
                json!({ "school_name": "Faculty of Business", "department": "FB", "faculty": "Faculty of Business" }),
                json!({ "school_name": "Department of Engineering", "department": "ENG", "faculty": "Faculty of Engineering" }),
            ],
        ),
        (
            "persons",
            vec![
                json!({ "personal_id": "P001", "name": "Alice Smith", "age": 30, "gender": "Female", "date_of_birth": "1993-05-15", "supervisor_id": null }),
                json!({ "personal_id": "P002", "name": "Bob Jones", "age": 45, "gender": "Male", "date_of_birth": "1978-11-20", "supervisor_id": null }),
                json!({ "personal_id": "P003", "name": "Charlie Brown", "age": 22, "gender": "Male", "date_of_birth": "2001-02-10", "supervisor_id": "P001" }),
                json!({ "personal_id": "P004", "name": "Diana Prince", "age": 28, "gender": "Female", "date_of_birth": "1995-08-25", "supervisor_id": "P002" }),
                json!({ "personal_id": "P005", "name": "Evan Wright", "age": 35, "gender": "Male", "date_of_birth": "1988-12-05", "supervisor_id": null }),
            ],
        ),
        (
            "locations",
            vec![
                json!({ "location_id": 1, "room": "101", "floor": "1", "building": "PQ Wing", "type": "Classroom", "campus": "Core Campus", "school_name": "School of Design" }),
                json!({ "location_id": 2, "room": "205", "floor": "2", "building": "Z Block", "type": "Laboratory", "campus": "North Campus", "school_name": "School of Computing" }),
                json!({ "location_id": 3, "room": "301", "floor": "3", "building": "V Block", "type": "Office", "campus": "South Campus", "school_name": "Faculty of Business" }),
                json!({ "location_id": 4, "room": "G01", "floor": "G", "building": "Y Block", "type": "Lecture Hall", "campus": "East Campus", "school_name": "Department of Engineering" }),
            ],
        ),
        (
            "activities",
            vec![
                json!({ "activity_id": "A001", "type": "Lecture", "time": "2024-11-01 10:00:00", "organiser_id": "P001", "organiser_name": "Alice Smith", "location_id": 1, "building": "PQ Wing", "room": "101", "floor": "1" }),
                json!({ "activity_id": "A002", "type": "Event", "time": "2024-12-05 14:00:00", "organiser_id": "P002", "organiser_name": "Bob Jones", "location_id": 3, "building": "V Block", "room": "301", "floor": "3" }),
                json!({ "activity_id": "A003", "type": "Seminar", "time": "2024-10-20 09:00:00", "organiser_id": "P001", "organiser_name": "Alice Smith", "location_id": 2, "building": "Z Block", "room": "205", "floor": "2" }),
                json!({ "activity_id": "A004", "type": "Workshop", "time": "2024-11-15 11:00:00", "organiser_id": "P005", "organiser_name": "Evan Wright", "location_id": 4, "building": "Y Block", "room": "G01", "floor": "G" }),
            ],
        ),
        (
            "maintenance",
            vec![
                json!({ "type": "Repair", "frequency": "Monthly", "location_id": 2, "building": "Z Block", "room": "205", "active_chemical": 0 }),
                json!({ "type": "Renovation", "frequency": "Yearly", "location_id": 1, "building": "PQ Wing", "room": "101", "active_chemical": 0 }),
                json!({ "type": "Cleaning", "frequency": "Weekly", "location_id": 3, "building": "V Block", "room": "301", "active_chemical": 1 }),
                json!({ "type": "Security", "frequency": "Daily", "location_id": 4, "building": "Y Block", "room": "G01", "active_chemical": 0 }),
            ],
        ),
        (
            "participations",
            vec![
                json!({ "personal_id": "P003", "activity_id": "A001", "person_name": "Charlie Brown", "activity_type": "Lecture", "activity_time": "2024-11-01 10:00:00", "building": "PQ Wing", "room": "101" }),
                json!({ "personal_id": "P001", "activity_id": "A002", "person_name": "Alice Smith", "activity_type": "Event", "activity_time": "2024-12-05 14:00:00", "building": "V Block", "room": "301" }),
                json!({ "personal_id": "P004", "activity_id": "A001", "person_name": "Diana Prince", "activity_type": "Lecture", "activity_time": "2024-11-01 10:00:00", "building": "PQ Wing", "room": "101" }),
                json!({ "personal_id": "P002", "activity_id": "A003", "person_name": "Bob Jones", "activity_type": "Seminar", "activity_time": "2024-10-20 09:00:00", "building": "Z Block", "room": "205" }),
            ],
        ),
        (
            "affiliations",
            vec![
                json!({ "personal_id": "P001", "school_name": "School of Computing", "person_name": "Alice Smith", "department": "COMP" }),
                json!({ "personal_id": "P002", "school_name": "Faculty of Business", "person_name": "Bob Jones", "department": "FB" }),
                json!({ "personal_id": "P003", "school_name": "School of Design", "person_name": "Charlie Brown", "department": "SD" }),
                json!({ "personal_id": "P005", "school_name": "Department of Engineering", "person_name": "Evan Wright", "department": "ENG" }),
            ],
        ),
    ]
}
