use crate::{maud_conveniences::title, state::RollbookState};
use axum::extract::State;
use maud::{Markup, html};

pub async fn get_index_route(State(state): State<RollbookState>) -> Markup {
    state.render(html! {
        div sse-connect="/sse_feed" class="mx-auto p-8 max-w-4xl w-full flex flex-col space-y-8" {
            div class="bg-gray-800 p-8 rounded shadow-md" {
                (title("Rollbook"))
                div id="add_student" hx-get="/internal/students/add_form" hx-trigger="load" {}
            }
            div class="bg-gray-800 p-8 rounded shadow-md" {
                div id="student_list" hx-get="/internal/get_students" hx-trigger="load, sse:crud_student" hx-include="#keyword,#limit" {}
            }
        }
    })
}
