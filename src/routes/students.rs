use crate::{
    data::{Student, StudentForm, StudentInput},
    error::{JsonBodySnafu, MissingStudentSnafu, StudentsResult},
    state::StudentsState,
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::IntoResponse,
};
use snafu::{OptionExt, ResultExt};
use uuid::Uuid;

fn read_input(payload: Result<Json<StudentForm>, JsonRejection>) -> StudentsResult<StudentInput> {
    let Json(form) = payload.context(JsonBodySnafu)?;
    StudentInput::try_from(form)
}

pub async fn get_students(State(state): State<StudentsState>) -> StudentsResult<Json<Vec<Student>>> {
    let students = state.list().await?;
    debug!(count = students.len(), "Listing students");
    Ok(Json(students))
}

/// An unknown id is answered with `200` and a `null` body rather than a `404`.
pub async fn get_student(
    State(state): State<StudentsState>,
    Path(id): Path<Uuid>,
) -> StudentsResult<Json<Option<Student>>> {
    let student = state.get_by_id(id).await?;
    if student.is_none() {
        debug!(%id, "No student with that id");
    }
    Ok(Json(student))
}

pub async fn post_student(
    State(state): State<StudentsState>,
    payload: Result<Json<StudentForm>, JsonRejection>,
) -> StudentsResult<impl IntoResponse> {
    let input = read_input(payload)?;
    let student = state.add(Student::new(input)).await?;
    info!(id = %student.id, "Added student");

    let location = format!("/Students/{}", student.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(student)))
}

pub async fn put_student(
    State(state): State<StudentsState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<StudentForm>, JsonRejection>,
) -> StudentsResult<Json<Student>> {
    let input = read_input(payload)?;
    let student = state
        .update(Student::with_id(id, input))
        .await?
        .context(MissingStudentSnafu { id })?;
    info!(%id, "Updated student");

    Ok(Json(student))
}

pub async fn delete_student(
    State(state): State<StudentsState>,
    Path(id): Path<Uuid>,
) -> StudentsResult<StatusCode> {
    if !state.remove(id).await? {
        return MissingStudentSnafu { id }.fail();
    }
    info!(%id, "Removed student");

    Ok(StatusCode::ACCEPTED)
}
