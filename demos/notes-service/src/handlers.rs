use std::sync::Mutex;

use api_kit::{ApiEndpoint, ApiError, ApiResult, ParamType};
use axum::http::StatusCode;
use once_cell::sync::Lazy;

use crate::dtos::{Note, NoteDraft};

/// In-memory store standing in for a real database.
static STORE: Lazy<Mutex<Vec<Note>>> = Lazy::new(|| {
    Mutex::new(vec![
        Note {
            id: 1,
            title: "First note".to_string(),
            body: "Hello".to_string(),
            published: true,
        },
        Note {
            id: 2,
            title: "Draft".to_string(),
            body: "Not ready yet".to_string(),
            published: false,
        },
    ])
});

fn with_store<T>(f: impl FnOnce(&mut Vec<Note>) -> ApiResult<T>) -> ApiResult<T> {
    let mut store = STORE.lock().map_err(|_| ApiError::internal())?;
    f(&mut store)
}

pub fn list_notes() -> ApiEndpoint {
    ApiEndpoint::get("list_notes")
        .description("List notes, optionally filtered by publication state.")
        .optional_query_param("published", ParamType::Bool)
        .optional_query_param("page_size", ParamType::Int)
        .tag("notes")
        .handler(|req| async move {
            let published = req.boolean("published");
            let limit = req.int("page_size").unwrap_or(50).max(0) as usize;
            with_store(|notes| {
                Ok(notes
                    .iter()
                    .filter(|note| published.map_or(true, |p| p == note.published))
                    .take(limit)
                    .cloned()
                    .collect::<Vec<Note>>())
            })
        })
}

pub fn get_note() -> ApiEndpoint {
    ApiEndpoint::get("get_note")
        .description("Fetch a single note by id.")
        .tag("notes")
        .handler(|req| async move {
            let id = note_id(&req)?;
            with_store(|notes| {
                notes
                    .iter()
                    .find(|note| note.id == id)
                    .cloned()
                    .ok_or_else(ApiError::not_found)
            })
        })
}

pub fn create_note() -> ApiEndpoint {
    ApiEndpoint::post("create_note")
        .description("Create a note from a draft.")
        .tag("notes")
        .body::<NoteDraft>()
        .response_status(StatusCode::CREATED)
        .handler(|req| async move {
            let draft: NoteDraft = req.body()?;
            with_store(|notes| {
                let id = notes.iter().map(|note| note.id).max().unwrap_or(0) + 1;
                let note = Note {
                    id,
                    title: draft.title,
                    body: draft.body,
                    published: false,
                };
                notes.push(note.clone());
                Ok(note)
            })
        })
}

pub fn delete_note() -> ApiEndpoint {
    ApiEndpoint::delete("delete_note")
        .description("Delete a note.")
        .tag("notes")
        .empty_handler(|req| async move {
            let id = note_id(&req)?;
            with_store(|notes| {
                let before = notes.len();
                notes.retain(|note| note.id != id);
                if notes.len() == before {
                    return Err(ApiError::not_found());
                }
                Ok(())
            })
        })
}

pub fn publish_note() -> ApiEndpoint {
    ApiEndpoint::post("publish_note")
        .description("Mark a note as published.")
        .tag("notes")
        // clients of the public feed expect camelCase here
        .alias("published", "isPublished")
        .handler(|req| async move {
            let id = note_id(&req)?;
            with_store(|notes| {
                let note = notes
                    .iter_mut()
                    .find(|note| note.id == id)
                    .ok_or_else(ApiError::not_found)?;
                note.published = true;
                Ok(note.clone())
            })
        })
}

fn note_id(req: &api_kit::ApiRequest) -> ApiResult<i64> {
    req.path_param("id")
        .and_then(|raw| raw.parse::<i64>().ok())
        .ok_or_else(|| ApiError::bad_request("id must be an integer"))
}
