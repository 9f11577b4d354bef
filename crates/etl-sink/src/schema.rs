//! Index schema documents used by `ensure_index` at pipeline startup.
//! These are intentionally minimal mappings — the search engine's query
//! behaviour over them is an external collaborator's concern, not this
//! pipeline's.

use serde_json::{json, Value};

pub fn movies_schema() -> Value {
    json!({
        "mappings": {
            "properties": {
                "id": { "type": "keyword" },
                "title": { "type": "text" },
                "description": { "type": "text" },
                "rating": { "type": "float" },
                "type": { "type": "keyword" },
                "creation_date": { "type": "date" },
                "genres": {
                    "properties": {
                        "id": { "type": "keyword" },
                        "name": { "type": "keyword" }
                    }
                },
                "actors": {
                    "properties": {
                        "id": { "type": "keyword" },
                        "name": { "type": "text" }
                    }
                },
                "writers": {
                    "properties": {
                        "id": { "type": "keyword" },
                        "name": { "type": "text" }
                    }
                },
                "directors": {
                    "properties": {
                        "id": { "type": "keyword" },
                        "name": { "type": "text" }
                    }
                },
                "actors_names": { "type": "text" },
                "writers_names": { "type": "text" },
                "directors_names": { "type": "text" }
            }
        }
    })
}

pub fn genres_schema() -> Value {
    json!({
        "mappings": {
            "properties": {
                "id": { "type": "keyword" },
                "name": { "type": "keyword" },
                "description": { "type": "text" },
                "film_works": { "type": "keyword" }
            }
        }
    })
}

pub fn persons_schema() -> Value {
    json!({
        "mappings": {
            "properties": {
                "id": { "type": "keyword" },
                "full_name": { "type": "text" },
                "roles": { "type": "keyword" },
                "film_ids": { "type": "keyword" }
            }
        }
    })
}
