//! The five booking API actions exposed to the model.
//!
//! Every call resolves to an envelope `{"success": bool, "data"?, "error"?, "message"?}`;
//! failures are reported to the model rather than aborting the conversation.

use crate::error::AgentError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

pub const GET_TOURS: &str = "get_tours";
pub const GET_TOUR_DETAILS: &str = "get_tour_details";
pub const CREATE_BOOKING: &str = "create_booking";
pub const GET_BOOKING_DETAILS: &str = "get_booking_details";
pub const GET_USER_BOOKINGS: &str = "get_user_bookings";

const BACKEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Function tool in the OpenAI `tools` wire format.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    kind: &'static str,
    pub function: FunctionSpec,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

impl ToolDefinition {
    fn function(name: &'static str, description: &'static str, parameters: Value) -> Self {
        Self {
            kind: "function",
            function: FunctionSpec {
                name,
                description,
                parameters,
            },
        }
    }

    pub fn name(&self) -> &str {
        self.function.name
    }
}

pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::function(
            GET_TOURS,
            "Search tours. Use when the customer looks for tours or filters by country, price or dates. \
             Returns a page of tours with id, title, country, city, price, duration_days and description.",
            json!({
                "type": "object",
                "properties": {
                    "country": {"type": "string", "description": "Country name, partial match, case-insensitive"},
                    "min_price": {"type": "number", "description": "Minimum price per person"},
                    "max_price": {"type": "number", "description": "Maximum price per person"},
                    "start_date": {"type": "string", "description": "Earliest start date, YYYY-MM-DD"},
                    "end_date": {"type": "string", "description": "Latest end date, YYYY-MM-DD"},
                    "page": {"type": "integer", "description": "Page number, default 1"},
                    "page_size": {"type": "integer", "description": "Results per page, default 10, max 100"}
                }
            }),
        ),
        ToolDefinition::function(
            GET_TOUR_DETAILS,
            "Full details of one tour: description, dates, available slots and price. \
             Call before booking to confirm availability.",
            json!({
                "type": "object",
                "properties": {
                    "tour_id": {"type": "integer", "description": "Tour id"}
                },
                "required": ["tour_id"]
            }),
        ),
        ToolDefinition::function(
            CREATE_BOOKING,
            "Book a tour for a customer. Returns the booking id, total price and status.",
            json!({
                "type": "object",
                "properties": {
                    "tour_id": {"type": "integer"},
                    "customer_name": {"type": "string"},
                    "customer_email": {"type": "string"},
                    "customer_phone": {"type": "string"},
                    "number_of_people": {"type": "integer", "minimum": 1},
                    "notes": {"type": "string", "description": "Optional wishes"}
                },
                "required": ["tour_id", "customer_name", "customer_email", "customer_phone", "number_of_people"]
            }),
        ),
        ToolDefinition::function(
            GET_BOOKING_DETAILS,
            "Details and status of one booking by id.",
            json!({
                "type": "object",
                "properties": {
                    "booking_id": {"type": "integer"}
                },
                "required": ["booking_id"]
            }),
        ),
        ToolDefinition::function(
            GET_USER_BOOKINGS,
            "All bookings made with an email address, newest first.",
            json!({
                "type": "object",
                "properties": {
                    "email": {"type": "string"}
                },
                "required": ["email"]
            }),
        ),
    ]
}

#[async_trait]
pub trait ToolExecutor: Send + Sync {
    fn definitions(&self) -> Vec<ToolDefinition>;

    /// `arguments` is the raw JSON object produced by the model.
    async fn execute(&self, name: &str, arguments: &str) -> Value;
}

#[derive(Debug, Default, Deserialize)]
pub struct TourSearchArgs {
    pub country: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TourIdArgs {
    tour_id: i64,
}

#[derive(Debug, Deserialize)]
struct BookingIdArgs {
    booking_id: i64,
}

#[derive(Debug, Deserialize)]
struct EmailArgs {
    email: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct CreateBookingArgs {
    tour_id: i64,
    customer_name: String,
    customer_email: String,
    customer_phone: String,
    number_of_people: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
}

/// Calls the booking REST API over HTTP.
pub struct BackendTools {
    client: reqwest::Client,
    api_base: String,
}

impl BackendTools {
    pub fn new(backend_url: &str) -> Result<Self, AgentError> {
        let client = reqwest::Client::builder()
            .timeout(BACKEND_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            api_base: format!("{}/api/v1", backend_url.trim_end_matches('/')),
        })
    }

    async fn dispatch(&self, name: &str, arguments: &str) -> Result<Value, Value> {
        match name {
            GET_TOURS => Ok(self.get_tours(parse_args(arguments)?).await),
            GET_TOUR_DETAILS => Ok(self.get_tour_details(parse_args(arguments)?).await),
            CREATE_BOOKING => Ok(self.create_booking(parse_args(arguments)?).await),
            GET_BOOKING_DETAILS => Ok(self.get_booking_details(parse_args(arguments)?).await),
            GET_USER_BOOKINGS => Ok(self.get_user_bookings(parse_args(arguments)?).await),
            other => Err(failure(
                format!("unknown tool {}", other),
                format!("Tool {} does not exist", other),
            )),
        }
    }

    async fn get_tours(&self, args: TourSearchArgs) -> Value {
        let request = self
            .client
            .get(format!("{}/tours", self.api_base))
            .query(&search_params(&args));
        match send(request).await {
            Ok((status, body)) if status.is_success() => success(body),
            Ok((status, body)) => {
                let detail = api_error(status, &body);
                failure(detail.clone(), format!("Could not fetch tours: {}", detail))
            }
            Err(e) => failure(e.to_string(), format!("Could not fetch tours: {}", e)),
        }
    }

    async fn get_tour_details(&self, args: TourIdArgs) -> Value {
        let request = self
            .client
            .get(format!("{}/tours/{}", self.api_base, args.tour_id));
        match send(request).await {
            Ok((status, body)) if status.is_success() => success(body),
            Ok((status, _)) if status == StatusCode::NOT_FOUND => failure(
                "Tour not found",
                format!("Tour with ID {} was not found", args.tour_id),
            ),
            Ok((status, body)) => {
                let detail = api_error(status, &body);
                failure(detail.clone(), format!("Could not fetch the tour: {}", detail))
            }
            Err(e) => failure(e.to_string(), format!("Could not fetch the tour: {}", e)),
        }
    }

    async fn create_booking(&self, args: CreateBookingArgs) -> Value {
        let request = self
            .client
            .post(format!("{}/bookings", self.api_base))
            .json(&args);
        match send(request).await {
            Ok((status, body)) if status.is_success() => success(body),
            Ok((status, body)) => {
                let detail = api_error(status, &body);
                failure(detail.clone(), format!("Booking failed: {}", detail))
            }
            Err(e) => failure(e.to_string(), format!("Could not create the booking: {}", e)),
        }
    }

    async fn get_booking_details(&self, args: BookingIdArgs) -> Value {
        let request = self
            .client
            .get(format!("{}/bookings/{}", self.api_base, args.booking_id));
        match send(request).await {
            Ok((status, body)) if status.is_success() => success(body),
            Ok((status, _)) if status == StatusCode::NOT_FOUND => failure(
                "Booking not found",
                format!("Booking with ID {} was not found", args.booking_id),
            ),
            Ok((status, body)) => {
                let detail = api_error(status, &body);
                failure(detail.clone(), format!("Could not fetch the booking: {}", detail))
            }
            Err(e) => failure(e.to_string(), format!("Could not fetch the booking: {}", e)),
        }
    }

    async fn get_user_bookings(&self, args: EmailArgs) -> Value {
        let request = self
            .client
            .get(format!("{}/bookings", self.api_base))
            .query(&[("email", args.email.as_str())]);
        match send(request).await {
            Ok((status, body)) if status.is_success() => success(body),
            Ok((status, body)) => {
                let detail = api_error(status, &body);
                failure(detail.clone(), format!("Could not fetch bookings: {}", detail))
            }
            Err(e) => failure(e.to_string(), format!("Could not fetch bookings: {}", e)),
        }
    }
}

#[async_trait]
impl ToolExecutor for BackendTools {
    fn definitions(&self) -> Vec<ToolDefinition> {
        tool_definitions()
    }

    async fn execute(&self, name: &str, arguments: &str) -> Value {
        debug!(tool = name, "executing tool");
        let envelope = self
            .dispatch(name, arguments)
            .await
            .unwrap_or_else(|failed| failed);
        if envelope["success"] != Value::Bool(true) {
            warn!(tool = name, error = %envelope["error"], "tool call failed");
        }
        envelope
    }
}

async fn send(request: RequestBuilder) -> Result<(StatusCode, Value), reqwest::Error> {
    let response = request.send().await?;
    let status = response.status();
    let text = response.text().await?;
    let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
    Ok((status, body))
}

fn parse_args<T: DeserializeOwned>(arguments: &str) -> Result<T, Value> {
    let raw = if arguments.trim().is_empty() {
        "{}"
    } else {
        arguments
    };
    serde_json::from_str(raw).map_err(|e| {
        failure(
            format!("invalid arguments: {}", e),
            "The tool arguments could not be read; check the parameter names and types",
        )
    })
}

fn success(data: Value) -> Value {
    json!({"success": true, "data": data})
}

fn failure(error: impl Into<String>, message: impl Into<String>) -> Value {
    json!({"success": false, "error": error.into(), "message": message.into()})
}

/// The API's `{"error": ...}` text, or the status line when the body has none.
fn api_error(status: StatusCode, body: &Value) -> String {
    body.get("error")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| status.to_string())
}

/// Query string for `GET /tours`. Paging defaults to page 1 of 10; unreadable dates are dropped.
pub fn search_params(args: &TourSearchArgs) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("page", args.page.unwrap_or(1).to_string()),
        ("page_size", args.page_size.unwrap_or(10).to_string()),
    ];
    if let Some(country) = args.country.as_deref().filter(|c| !c.trim().is_empty()) {
        params.push(("country", country.to_string()));
    }
    if let Some(min) = args.min_price {
        params.push(("min_price", min.to_string()));
    }
    if let Some(max) = args.max_price {
        params.push(("max_price", max.to_string()));
    }
    if let Some(date) = args.start_date.as_deref().and_then(normalize_date) {
        params.push(("start_date", date));
    }
    if let Some(date) = args.end_date.as_deref().and_then(normalize_date) {
        params.push(("end_date", date));
    }
    params
}

/// Keeps ISO-8601 datetimes as given and widens a bare `YYYY-MM-DD` to midnight.
pub fn normalize_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if DateTime::parse_from_rfc3339(raw).is_ok()
        || NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
    {
        return Some(raw.to_string());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| format!("{}T00:00:00", d.format("%Y-%m-%d")))
}
