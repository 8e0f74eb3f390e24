use crate::{
    data::{
        DEFAULT_PAGE_LIMIT, PageRequest,
        student::{SearchFilter, Student, StudentDetails},
    },
    error::{MissingStudentSnafu, RollbookResult},
    maud_conveniences::{form_submit_button, render_table, simple_form_element, title},
    routes::sse::SseEvent,
    state::RollbookState,
    view::{LIMIT_ALL, ListView, ViewEvent},
};
use axum::{
    Form,
    extract::{Path, Query, State},
};
use maud::{Markup, html};
use serde::Deserialize;
use snafu::ensure;
use std::fmt::Write;

///Raw request params for the list fragment. `limit` arrives as text so the
///page-size select can offer an "all" option alongside the numeric ones.
#[derive(Deserialize)]
pub struct ListViewQuery {
    page: Option<i64>,
    limit: Option<String>,
    keyword: Option<String>,
    editing: Option<i32>,
    pending_delete: Option<i32>,
}

impl ListViewQuery {
    fn into_view(self) -> ListView {
        ListView {
            page: self.page.unwrap_or(1).max(1),
            limit: parse_limit(self.limit.as_deref()),
            keyword: self.keyword.unwrap_or_default(),
            editing: self.editing,
            pending_delete: self.pending_delete,
        }
    }
}

fn parse_limit(raw: Option<&str>) -> i64 {
    match raw {
        None | Some("") => DEFAULT_PAGE_LIMIT,
        Some("all") => LIMIT_ALL,
        Some(n) => n.parse().map_or(DEFAULT_PAGE_LIMIT, |limit: i64| limit.max(1)),
    }
}

pub async fn internal_get_students(
    State(state): State<RollbookState>,
    Query(query): Query<ListViewQuery>,
) -> RollbookResult<Markup> {
    render_student_list(&state, query.into_view()).await
}

pub async fn internal_get_add_student_form() -> Markup {
    add_student_form(None)
}

pub async fn internal_post_new_student(
    State(state): State<RollbookState>,
    Form(details): Form<StudentDetails>,
) -> RollbookResult<Markup> {
    let id = Student::insert_into_database(details, &mut *state.get_connection().await?).await?;
    state.send_sse_event(SseEvent::CrudStudent);

    Ok(add_student_form(Some(id)))
}

///The edit form's fields plus the slice params hx-include drags along.
#[derive(Deserialize)]
pub struct EditStudentForm {
    name: String,
    address: String,
    page: Option<i64>,
    limit: Option<String>,
    keyword: Option<String>,
}

pub async fn internal_put_student(
    State(state): State<RollbookState>,
    Path(id): Path<i32>,
    Form(form): Form<EditStudentForm>,
) -> RollbookResult<Markup> {
    let details = StudentDetails {
        name: form.name,
        address: form.address,
    };
    let updated =
        Student::update_in_database(id, details, &mut *state.get_connection().await?).await?;
    ensure!(updated, MissingStudentSnafu { id });

    state.send_sse_event(SseEvent::CrudStudent);

    let view = ListViewQuery {
        page: form.page,
        limit: form.limit,
        keyword: form.keyword,
        editing: None,
        pending_delete: None,
    }
    .into_view();
    render_student_list(&state, view).await
}

pub async fn internal_delete_student(
    State(state): State<RollbookState>,
    Path(id): Path<i32>,
    Query(query): Query<ListViewQuery>,
) -> RollbookResult<Markup> {
    let removed = Student::remove_from_database(id, &mut *state.get_connection().await?).await?;
    ensure!(removed, MissingStudentSnafu { id });

    state.send_sse_event(SseEvent::CrudStudent);
    render_student_list(&state, query.into_view()).await
}

async fn render_student_list(state: &RollbookState, view: ListView) -> RollbookResult<Markup> {
    let mut conn = state.get_connection().await?;

    let filter = SearchFilter::from_params(Some(view.keyword.clone()), None, None);
    let page = PageRequest {
        page: view.page,
        limit: view.limit,
    };

    let total = Student::count_matching(&filter, &mut conn).await?;
    let students = Student::get_page(&filter, page, &mut conn).await?;

    //the row being edited may live on another page, so it gets its own fetch
    let edit_target = match view.editing {
        Some(id) => Student::get_from_db_by_id(id, &mut conn).await?,
        None => None,
    };

    Ok(student_list(
        &view,
        &students,
        page.total_pages(total),
        edit_target.as_ref(),
    ))
}

///Serialises the numeric parts of the next view state for `hx-vals`.
///Keyword and page size ride along via hx-include on the live inputs instead,
///which keeps user text out of inline JSON.
fn hx_state_vals(view: &ListView) -> String {
    let mut vals = format!("{{\"page\": {}", view.page);
    if let Some(id) = view.editing {
        let _ = write!(vals, ", \"editing\": {id}");
    }
    if let Some(id) = view.pending_delete {
        let _ = write!(vals, ", \"pending_delete\": {id}");
    }
    vals.push('}');
    vals
}

fn student_list(
    view: &ListView,
    students: &[Student],
    total_pages: i64,
    edit_target: Option<&Student>,
) -> Markup {
    let refetch = |event: ViewEvent| hx_state_vals(&view.clone().apply(event, total_pages));

    let rows = students
        .iter()
        .map(|student| {
            [
                html! { (student.student_id) },
                html! { (student.name) },
                html! { (student.address) },
                html! {
                    button class="px-4 py-2 bg-blue-600 rounded hover:bg-blue-700 mr-2"
                        hx-get="/internal/get_students" hx-target="#student_list" hx-include="#keyword,#limit"
                        hx-vals=(refetch(ViewEvent::BeginEdit(student.student_id))) {
                        "Edit"
                    }
                    button class="px-4 py-2 bg-red-600 rounded hover:bg-red-700"
                        hx-get="/internal/get_students" hx-target="#student_list" hx-include="#keyword,#limit"
                        hx-vals=(refetch(ViewEvent::ArmDelete(student.student_id))) {
                        "Delete"
                    }
                },
            ]
        })
        .collect();

    html! {
        (title("Students List"))

        div class="mb-4 flex flex-row space-x-4" {
            input value=(view.keyword) type="search" name="keyword" id="keyword" placeholder="Search..."
                hx-get="/internal/get_students" hx-trigger="input changed delay:500ms, keyup[key=='Enter']"
                hx-target="#student_list" hx-include="#limit"
                hx-vals=(refetch(ViewEvent::SetKeyword(String::new())))
                class="shadow appearance-none border rounded w-full py-2 px-3 leading-tight focus:outline-none focus:shadow-outline bg-gray-700 border-gray-600";

            select name="limit" id="limit"
                hx-get="/internal/get_students" hx-trigger="change"
                hx-target="#student_list" hx-include="#keyword"
                hx-vals=(refetch(ViewEvent::SetLimit(view.limit)))
                class="shadow border rounded py-2 px-3 leading-tight focus:outline-none focus:shadow-outline bg-gray-700 border-gray-600" {
                @for size in [3_i64, 5, 10] {
                    option value=(size) selected[view.limit == size] {(size)}
                }
                option value="all" selected[view.limit == LIMIT_ALL] {"All"}
            }
        }

        (render_table(["Student Id", "Name", "Address", "Actions"], rows))

        (pagination(view, total_pages))

        @if let Some(student) = edit_target {
            (edit_form(view, student, total_pages))
        }

        @if view.pending_delete.is_some() {
            (delete_modal(view, total_pages))
        }
    }
}

fn pagination(view: &ListView, total_pages: i64) -> Markup {
    let refetch = |event: ViewEvent| hx_state_vals(&view.clone().apply(event, total_pages));

    let on_first = view.page <= 1;
    let on_last = total_pages == 0 || view.page >= total_pages;
    let window = view.window(total_pages);
    let more_after = *window.end() < total_pages;

    let page_turn_classes = |disabled: bool| {
        if disabled {
            "px-4 py-2 font-bold rounded bg-gray-600 cursor-not-allowed"
        } else {
            "px-4 py-2 font-bold rounded bg-blue-600 hover:bg-blue-700"
        }
    };

    html! {
        div class="mt-4 flex justify-center items-center" {
            button disabled[on_first] class=(page_turn_classes(on_first))
                hx-get="/internal/get_students" hx-target="#student_list" hx-include="#keyword,#limit"
                hx-vals=(refetch(ViewEvent::PrevPage)) {
                "Prev"
            }

            @for page in window {
                @if page == view.page {
                    button class="px-3 py-1 mx-1 rounded bg-blue-600" {(page)}
                } @else {
                    button class="px-3 py-1 mx-1 rounded bg-gray-700 hover:bg-gray-600"
                        hx-get="/internal/get_students" hx-target="#student_list" hx-include="#keyword,#limit"
                        hx-vals=(refetch(ViewEvent::GoToPage(page))) {
                        (page)
                    }
                }
            }
            @if more_after {
                span class="mx-1" {"..."}
            }

            button disabled[on_last] class=(page_turn_classes(on_last))
                hx-get="/internal/get_students" hx-target="#student_list" hx-include="#keyword,#limit"
                hx-vals=(refetch(ViewEvent::NextPage)) {
                "Next"
            }
        }
    }
}

fn edit_form(view: &ListView, student: &Student, total_pages: i64) -> Markup {
    let input_classes = "mt-1 block w-full bg-gray-700 border border-gray-600 rounded-md p-2 focus:ring-blue-500 focus:border-blue-500";

    html! {
        div class="mt-8" {
            h3 class="text-xl font-bold mb-4" {"Edit Student"}
            form hx-put={"/internal/students/" (student.student_id)} hx-target="#student_list" hx-include="#keyword,#limit" {
                input type="hidden" name="page" value=(view.page) {}

                div class="mb-4" {
                    label for="edit_name" class="block text-sm font-medium text-gray-300" {"Name:"}
                    input type="text" id="edit_name" name="name" value=(student.name) required class=(input_classes);
                }
                div class="mb-4" {
                    label for="edit_address" class="block text-sm font-medium text-gray-300" {"Address:"}
                    input type="text" id="edit_address" name="address" value=(student.address) required class=(input_classes);
                }

                div class="flex justify-end" {
                    button type="submit" class="bg-green-600 hover:bg-green-700 font-bold py-2 px-4 rounded mr-2" {
                        "Update Student"
                    }
                    button type="button" class="bg-gray-500 hover:bg-gray-600 font-bold py-2 px-4 rounded"
                        hx-get="/internal/get_students" hx-target="#student_list" hx-include="#keyword,#limit"
                        hx-vals=(hx_state_vals(&view.clone().apply(ViewEvent::CancelEdit, total_pages))) {
                        "Cancel"
                    }
                }
            }
        }
    }
}

fn delete_modal(view: &ListView, total_pages: i64) -> Markup {
    let Some(id) = view.pending_delete else {
        return html! {};
    };

    html! {
        div class="fixed inset-0 flex items-center justify-center bg-black bg-opacity-50" {
            div class="bg-gray-800 p-6 rounded-lg shadow-lg" {
                h3 class="text-lg font-bold mb-4" {"Confirm Deletion"}
                p class="mb-4" {"Are you sure you want to delete this student?"}
                div class="flex justify-end" {
                    button class="px-4 py-2 bg-gray-500 rounded hover:bg-gray-600 mr-2"
                        hx-get="/internal/get_students" hx-target="#student_list" hx-include="#keyword,#limit"
                        hx-vals=(hx_state_vals(&view.clone().apply(ViewEvent::CancelDelete, total_pages))) {
                        "Cancel"
                    }
                    button class="px-4 py-2 bg-red-600 rounded hover:bg-red-700"
                        hx-delete={"/internal/students/" (id)} hx-target="#student_list" hx-include="#keyword,#limit"
                        hx-vals=(hx_state_vals(&view.clone().apply(ViewEvent::FinishDelete, total_pages))) {
                        "Delete"
                    }
                }
            }
        }
    }
}

fn add_student_form(added: Option<i32>) -> Markup {
    html! {
        h2 class="text-xl font-bold mb-4 text-center" {"Add Student"}

        @if let Some(id) = added {
            div role="alert" class="bg-green-100 border border-green-400 text-green-700 px-4 py-3 rounded mb-4" {
                "Student added successfully (id " (id) ")"
            }
        }

        form hx-post="/internal/students" hx-target="#add_student" {
            (simple_form_element("name", "Name", true, None, None))
            (simple_form_element("address", "Address", true, None, None))
            (form_submit_button(Some("Add Student")))
        }
    }
}
