use crate::{
    data::{
        PageRequest,
        student::{SearchFilter, Student, StudentDetails},
    },
    error::{MissingStudentIdSnafu, MissingStudentSnafu, ParseStudentIdSnafu, RollbookResult},
    routes::sse::SseEvent,
    state::RollbookState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use snafu::{ResultExt, ensure};

#[derive(Deserialize)]
pub struct ListStudentsQuery {
    page: Option<i64>,
    limit: Option<i64>,
    keyword: Option<String>,
    name: Option<String>,
    address: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PagedStudents {
    pub data: Vec<Student>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

#[axum::debug_handler]
pub async fn post_student(
    State(state): State<RollbookState>,
    Json(details): Json<StudentDetails>,
) -> RollbookResult<impl IntoResponse> {
    let id = Student::insert_into_database(details, &mut *state.get_connection().await?).await?;
    state.send_sse_event(SseEvent::CrudStudent);
    info!(id, "Student added");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Student added successfully", "id": id })),
    ))
}

pub async fn get_students(
    State(state): State<RollbookState>,
    Query(query): Query<ListStudentsQuery>,
) -> RollbookResult<Json<PagedStudents>> {
    let filter = SearchFilter::from_params(query.keyword, query.name, query.address);
    let page = PageRequest::new(query.page, query.limit);

    let mut conn = state.get_connection().await?;
    let data = Student::get_page(&filter, page, &mut conn).await?;
    let total = Student::count_matching(&filter, &mut conn).await?;

    Ok(Json(PagedStudents {
        data,
        total,
        page: page.page,
        limit: page.limit,
        total_pages: page.total_pages(total),
    }))
}

pub async fn put_student(
    State(state): State<RollbookState>,
    Path(id): Path<i32>,
    Json(details): Json<StudentDetails>,
) -> RollbookResult<Json<Value>> {
    let updated =
        Student::update_in_database(id, details, &mut *state.get_connection().await?).await?;
    ensure!(updated, MissingStudentSnafu { id });

    state.send_sse_event(SseEvent::CrudStudent);
    Ok(Json(json!({ "message": "Student updated successfully" })))
}

pub async fn delete_student(
    State(state): State<RollbookState>,
    Path(id): Path<String>,
) -> RollbookResult<Json<Value>> {
    ensure!(!id.trim().is_empty(), MissingStudentIdSnafu);
    let id: i32 = id
        .trim()
        .parse()
        .context(ParseStudentIdSnafu { original: id.clone() })?;

    let removed = Student::remove_from_database(id, &mut *state.get_connection().await?).await?;
    ensure!(removed, MissingStudentSnafu { id });

    state.send_sse_event(SseEvent::CrudStudent);
    Ok(Json(json!({ "message": "Student deleted successfully" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paged_students_serialise_to_the_list_contract() {
        let page = PagedStudents {
            data: vec![Student {
                student_id: 1,
                name: "Ada".to_string(),
                address: "1 Infinite Loop".to_string(),
            }],
            total: 1,
            page: 1,
            limit: 5,
            total_pages: 1,
        };

        assert_eq!(
            serde_json::to_value(&page).unwrap(),
            json!({
                "data": [{"student_id": 1, "name": "Ada", "address": "1 Infinite Loop"}],
                "total": 1,
                "page": 1,
                "limit": 5,
                "total_pages": 1,
            })
        );
    }
}
