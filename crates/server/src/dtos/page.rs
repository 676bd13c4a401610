use crate::{
    error::AppError,
    session::{self, Flash},
};
use axum::{
    Json,
    response::{IntoResponse, Response},
};
use models::forms::Form;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tower_sessions::Session;

/// Data a page template would be rendered with, returned as JSON
#[derive(Debug, Default, Serialize)]
pub struct Page {
    pub template: &'static str,
    pub string_map: BTreeMap<String, String>,
    pub int_map: BTreeMap<String, i64>,
    pub data: Map<String, Value>,
    pub form: Form,
    pub flash: Flash,
    pub is_authenticated: bool,
    /// First data value that failed to serialize
    #[serde(skip)]
    error: Option<serde_json::Error>,
}

impl Page {
    pub fn new(template: &'static str) -> Self {
        Self {
            template,
            ..Default::default()
        }
    }

    pub fn string(mut self, key: &str, value: impl Into<String>) -> Self {
        self.string_map.insert(key.to_owned(), value.into());
        self
    }

    pub fn int(mut self, key: &str, value: i64) -> Self {
        self.int_map.insert(key.to_owned(), value);
        self
    }

    pub fn data(mut self, key: &str, value: impl Serialize) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => {
                self.data.insert(key.to_owned(), value);
            }
            Err(e) => {
                self.error.get_or_insert(e);
            }
        }
        self
    }

    pub fn form(mut self, form: Form) -> Self {
        self.form = form;
        self
    }

    /// Attaches pending flash messages and the login state, then responds
    pub async fn render(mut self, session: &Session) -> Result<Response, AppError> {
        if let Some(e) = self.error.take() {
            return Err(e.into());
        }

        self.flash = session::take_flash(session).await?;
        self.is_authenticated = session::is_authenticated(session).await?;

        Ok(Json(self).into_response())
    }
}
