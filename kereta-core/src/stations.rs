use serde::{Deserialize, Serialize};

/// Static reference entity for a train station. Read-only data, not
/// persisted per session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    pub id: i64,
    pub name: String,
    pub city: String,
    pub code: String,
}

/// The demo station network, ordered by id.
pub fn reference_stations() -> Vec<Station> {
    let raw: [(i64, &str, &str, &str); 10] = [
        (1, "Gambir", "Jakarta", "GMR"),
        (2, "Bandung", "Bandung", "BD"),
        (3, "Surabaya Gubeng", "Surabaya", "SGU"),
        (4, "Yogyakarta", "Yogyakarta", "YK"),
        (5, "Malang", "Malang", "ML"),
        (6, "Semarang Tawang", "Semarang", "SMT"),
        (7, "Solo Balapan", "Solo", "SLO"),
        (8, "Cirebon", "Cirebon", "CN"),
        (9, "Bekasi", "Bekasi", "BKS"),
        (10, "Tangerang", "Tangerang", "TNG"),
    ];
    raw.iter()
        .map(|(id, name, city, code)| Station {
            id: *id,
            name: name.to_string(),
            city: city.to_string(),
            code: code.to_string(),
        })
        .collect()
}

/// Case-insensitive lookup by station code.
pub fn find_by_code(stations: &[Station], code: &str) -> Option<Station> {
    stations
        .iter()
        .find(|s| s.code.eq_ignore_ascii_case(code))
        .cloned()
}

/// Substring match on name or city, used by autocomplete-style queries.
pub fn search(stations: &[Station], term: &str) -> Vec<Station> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return stations.to_vec();
    }
    stations
        .iter()
        .filter(|s| s.name.to_lowercase().contains(&term) || s.city.to_lowercase().contains(&term))
        .cloned()
        .collect()
}
