use crate::error::{MissingFieldSnafu, StudentsResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use snafu::OptionExt;
use uuid::Uuid;

#[derive(Serialize, Deserialize, sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub program: Option<String>,
}

impl Student {
    /// Makes a brand new student with a freshly generated id.
    pub fn new(input: StudentInput) -> Self {
        Self::with_id(Uuid::new_v4(), input)
    }

    pub fn with_id(id: Uuid, input: StudentInput) -> Self {
        let StudentInput {
            first_name,
            last_name,
            program,
        } = input;

        Self {
            id,
            first_name,
            last_name,
            program,
        }
    }
}

/// Request body for both creating and updating, before any checks.
///
/// Keys are matched ignoring ASCII case, so `FirstName`, `firstName` and `firstname` all fill
/// the same field. Unknown keys are ignored.
#[derive(Deserialize, Debug, Default)]
#[serde(try_from = "Map<String, Value>")]
pub struct StudentForm {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub program: Option<String>,
}

impl TryFrom<Map<String, Value>> for StudentForm {
    type Error = String;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let mut form = Self::default();

        for (key, value) in map {
            let field = if key.eq_ignore_ascii_case("firstName") {
                &mut form.first_name
            } else if key.eq_ignore_ascii_case("lastName") {
                &mut form.last_name
            } else if key.eq_ignore_ascii_case("program") {
                &mut form.program
            } else {
                continue;
            };

            *field = match value {
                Value::Null => None,
                Value::String(value) => Some(value),
                other => return Err(format!("The {key} field must be a string, found {other}")),
            };
        }

        Ok(form)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentInput {
    pub first_name: String,
    pub last_name: String,
    pub program: Option<String>,
}

impl TryFrom<StudentForm> for StudentInput {
    type Error = crate::error::StudentsError;

    fn try_from(form: StudentForm) -> StudentsResult<Self> {
        let StudentForm {
            first_name,
            last_name,
            program,
        } = form;

        let first_name = first_name
            .filter(|name| !name.trim().is_empty())
            .context(MissingFieldSnafu { name: "FirstName" })?;
        let last_name = last_name
            .filter(|name| !name.trim().is_empty())
            .context(MissingFieldSnafu { name: "LastName" })?;

        Ok(Self {
            first_name,
            last_name,
            program,
        })
    }
}
