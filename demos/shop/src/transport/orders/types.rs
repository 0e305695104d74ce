// Code generated by httpbind-gen. DO NOT EDIT.
//! Payload, result and error types of the `orders` service.
#![allow(dead_code, unused_imports, unused_variables, clippy::all)]

use httpbind::runtime::{
    check_enum, check_length, check_pattern, check_range, field_path, Bytes, DecodeError,
    GenericError, WireValue,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPayload {
    pub store: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<serde_json::Value>,
    pub ids: Vec<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prices: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub total: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    pub orders: Vec<Order>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    pub lines: Vec<Line>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub sku: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnavailableError {
    pub reason: String,
}

impl SearchPayload {
    /// Check field constraints, then those of nested structs. `field` is
    /// the path of this value, empty at the top level.
    pub fn validate(&self, field: &str) -> Result<(), DecodeError> {
        Ok(())
    }
}

impl SearchResult {
    /// Check field constraints, then those of nested structs. `field` is
    /// the path of this value, empty at the top level.
    pub fn validate(&self, field: &str) -> Result<(), DecodeError> {
        {
            let path = field_path(field, "orders");
            let v = &self.orders;
            for (i0, item0) in v.iter().enumerate() {
                item0.validate(&format!("{}[{}]", &path, i0))?;
            }
        }
        Ok(())
    }
}

impl Order {
    /// Check field constraints, then those of nested structs. `field` is
    /// the path of this value, empty at the top level.
    pub fn validate(&self, field: &str) -> Result<(), DecodeError> {
        {
            let path = field_path(field, "lines");
            let v = &self.lines;
            for (i0, item0) in v.iter().enumerate() {
                item0.validate(&format!("{}[{}]", &path, i0))?;
            }
        }
        Ok(())
    }
}

impl Line {
    /// Check field constraints, then those of nested structs. `field` is
    /// the path of this value, empty at the top level.
    pub fn validate(&self, field: &str) -> Result<(), DecodeError> {
        {
            let path = field_path(field, "sku");
            let v = &self.sku;
            check_length(&path, v.chars().count(), Some(3), None)?;
        }
        {
            let path = field_path(field, "quantity");
            let v = &self.quantity;
            check_range(&path, *v as f64, Some(1.0), None)?;
        }
        Ok(())
    }
}

impl UnavailableError {
    /// Check field constraints, then those of nested structs. `field` is
    /// the path of this value, empty at the top level.
    pub fn validate(&self, field: &str) -> Result<(), DecodeError> {
        Ok(())
    }
}

/// Errors `search` can return.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchError {
    Locked(String),
    Unavailable(UnavailableError),
    /// Any error without a declared HTTP mapping.
    Generic(GenericError),
}

impl SearchError {
    /// Canonical name of the error.
    pub fn name(&self) -> &str {
        match self {
            SearchError::Locked(_) => "locked",
            SearchError::Unavailable(_) => "unavailable",
            SearchError::Generic(err) => &err.name,
        }
    }
}

impl From<GenericError> for SearchError {
    fn from(err: GenericError) -> Self {
        SearchError::Generic(err)
    }
}

impl From<DecodeError> for SearchError {
    fn from(err: DecodeError) -> Self {
        SearchError::Generic(err.into())
    }
}

/// Errors `place` can return.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaceError {
    Rejected(String),
    Locked(String),
    Unavailable(UnavailableError),
    /// Any error without a declared HTTP mapping.
    Generic(GenericError),
}

impl PlaceError {
    /// Canonical name of the error.
    pub fn name(&self) -> &str {
        match self {
            PlaceError::Rejected(_) => "rejected",
            PlaceError::Locked(_) => "locked",
            PlaceError::Unavailable(_) => "unavailable",
            PlaceError::Generic(err) => &err.name,
        }
    }
}

impl From<GenericError> for PlaceError {
    fn from(err: GenericError) -> Self {
        PlaceError::Generic(err)
    }
}

impl From<DecodeError> for PlaceError {
    fn from(err: DecodeError) -> Self {
        PlaceError::Generic(err.into())
    }
}

/// Errors `ping` can return.
#[derive(Debug, Clone, PartialEq)]
pub enum PingError {
    Locked(String),
    Unavailable(UnavailableError),
    /// Any error without a declared HTTP mapping.
    Generic(GenericError),
}

impl PingError {
    /// Canonical name of the error.
    pub fn name(&self) -> &str {
        match self {
            PingError::Locked(_) => "locked",
            PingError::Unavailable(_) => "unavailable",
            PingError::Generic(err) => &err.name,
        }
    }
}

impl From<GenericError> for PingError {
    fn from(err: GenericError) -> Self {
        PingError::Generic(err)
    }
}

impl From<DecodeError> for PingError {
    fn from(err: DecodeError) -> Self {
        PingError::Generic(err.into())
    }
}
