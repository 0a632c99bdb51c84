//! Threshold editor form state.
//!
//! Holds the text of each field while the operator types and validates it
//! into a [`Thresholds`] on submit. Nothing is sent until every field
//! parses.

use thiserror::Error;

use crate::data::Thresholds;

/// One editable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    TempMax,
    HumidityMin,
    LightMin,
    AirGood,
    AirModerate,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::TempMax,
        Field::HumidityMin,
        Field::LightMin,
        Field::AirGood,
        Field::AirModerate,
    ];

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            Field::TempMax => "Max temperature (°C)",
            Field::HumidityMin => "Min humidity (%)",
            Field::LightMin => "Min light",
            Field::AirGood => "Air good up to",
            Field::AirModerate => "Air moderate up to",
        }
    }

    /// Air bands may be left blank.
    pub fn optional(&self) -> bool {
        matches!(self, Field::AirGood | Field::AirModerate)
    }

    fn index(&self) -> usize {
        Field::ALL.iter().position(|f| f == self).unwrap_or(0)
    }
}

/// Why the form could not be submitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{0} must be a number")]
    NotANumber(&'static str),

    #[error("{0} must be a whole number")]
    NotAnInteger(&'static str),
}

/// Text-entry state for the threshold modal.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdEditor {
    values: [String; 5],
    focus: Field,
}

impl ThresholdEditor {
    /// Pre-fill the form from the current thresholds.
    pub fn new(current: &Thresholds) -> Self {
        let values = [
            current.temp_max.to_string(),
            current.humidity_min.to_string(),
            current.light_min.to_string(),
            current.air_good.map(|v| v.to_string()).unwrap_or_default(),
            current.air_moderate.map(|v| v.to_string()).unwrap_or_default(),
        ];
        Self {
            values,
            focus: Field::TempMax,
        }
    }

    /// The focused field.
    pub fn focus(&self) -> Field {
        self.focus
    }

    /// Text currently entered in `field`.
    pub fn value(&self, field: Field) -> &str {
        &self.values[field.index()]
    }

    pub fn focus_next(&mut self) {
        let next = (self.focus.index() + 1) % Field::ALL.len();
        self.focus = Field::ALL[next];
    }

    pub fn focus_prev(&mut self) {
        let prev = (self.focus.index() + Field::ALL.len() - 1) % Field::ALL.len();
        self.focus = Field::ALL[prev];
    }

    /// Type a character into the focused field. Only numeric input is kept.
    pub fn push(&mut self, c: char) {
        if c.is_ascii_digit() || c == '.' || c == '-' {
            self.values[self.focus.index()].push(c);
        }
    }

    /// Delete the last character of the focused field.
    pub fn pop(&mut self) {
        self.values[self.focus.index()].pop();
    }

    /// Validate every field into a threshold set.
    pub fn parse(&self) -> Result<Thresholds, EditorError> {
        Ok(Thresholds {
            temp_max: self.required_float(Field::TempMax)?,
            humidity_min: self.required_float(Field::HumidityMin)?,
            light_min: self.required_int(Field::LightMin)?,
            air_good: self.optional_float(Field::AirGood)?,
            air_moderate: self.optional_float(Field::AirModerate)?,
        })
    }

    fn text(&self, field: Field) -> &str {
        self.value(field).trim()
    }

    fn required_float(&self, field: Field) -> Result<f64, EditorError> {
        self.optional_float(field)?.ok_or(EditorError::Missing(field.label()))
    }

    fn optional_float(&self, field: Field) -> Result<Option<f64>, EditorError> {
        let text = self.text(field);
        if text.is_empty() {
            return Ok(None);
        }
        match text.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Some(v)),
            _ => Err(EditorError::NotANumber(field.label())),
        }
    }

    fn required_int(&self, field: Field) -> Result<i64, EditorError> {
        let text = self.text(field);
        if text.is_empty() {
            return Err(EditorError::Missing(field.label()));
        }
        text.parse::<i64>().map_err(|_| EditorError::NotAnInteger(field.label()))
    }
}
