//! FTR contract definitions.
//!
//! A [`ContractSpec`] describes a sink-minus-source spread position over a
//! UTC window at a fixed capacity. Only obligation-style contracts can be
//! constructed; the option variant is recognised so that it can be rejected
//! with a precise error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::ContractError;
use super::time::parse_datetime_utc;

/// FTR settlement style.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractType {
    /// Holder receives or pays the full spread.
    #[default]
    Obligation,
    /// Holder receives only positive spreads. Not constructible.
    Option,
}

impl ContractType {
    /// Lowercase name as used in records and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractType::Obligation => "obligation",
            ContractType::Option => "option",
        }
    }
}

impl FromStr for ContractType {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "obligation" => Ok(ContractType::Obligation),
            "option" => Ok(ContractType::Option),
            _ => Err(ContractError::UnknownContractType(s.to_string())),
        }
    }
}

impl fmt::Display for ContractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable FTR contract specification.
///
/// `contract_type()` is always [`ContractType::Obligation`] and the window
/// always contains at least one instant.
///
/// # Examples
///
/// ```
/// use ftr_core::types::{ContractSpec, ContractType};
/// use ftr_core::types::time::parse_datetime_utc;
///
/// let spec = ContractSpec::new(
///     "FR",
///     "DE_LU",
///     parse_datetime_utc("2024-01-01T00:00:00Z").unwrap(),
///     parse_datetime_utc("2024-02-01T00:00:00Z").unwrap(),
///     10.0,
///     ContractType::Obligation,
/// )
/// .unwrap()
/// .with_contract_id("FR-DE-JAN");
///
/// assert_eq!(spec.contract_id(), Some("FR-DE-JAN"));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ContractSpec {
    source: String,
    sink: String,
    start_utc: DateTime<Utc>,
    end_utc: DateTime<Utc>,
    mw: f64,
    contract_type: ContractType,
    contract_id: Option<String>,
}

impl ContractSpec {
    /// Creates a contract.
    ///
    /// # Errors
    ///
    /// - `ContractError::UnsupportedContractType` for anything but obligation
    /// - `ContractError::EmptyWindow` if `end_utc <= start_utc`
    pub fn new(
        source: impl Into<String>,
        sink: impl Into<String>,
        start_utc: DateTime<Utc>,
        end_utc: DateTime<Utc>,
        mw: f64,
        contract_type: ContractType,
    ) -> Result<Self, ContractError> {
        if contract_type != ContractType::Obligation {
            return Err(ContractError::UnsupportedContractType(
                contract_type.to_string(),
            ));
        }
        if end_utc <= start_utc {
            return Err(ContractError::EmptyWindow {
                start: start_utc.to_rfc3339(),
                end: end_utc.to_rfc3339(),
            });
        }
        Ok(Self {
            source: source.into(),
            sink: sink.into(),
            start_utc,
            end_utc,
            mw,
            contract_type,
            contract_id: None,
        })
    }

    /// Creates an obligation contract.
    pub fn obligation(
        source: impl Into<String>,
        sink: impl Into<String>,
        start_utc: DateTime<Utc>,
        end_utc: DateTime<Utc>,
        mw: f64,
    ) -> Result<Self, ContractError> {
        Self::new(source, sink, start_utc, end_utc, mw, ContractType::Obligation)
    }

    /// Attaches an identifier.
    pub fn with_contract_id(mut self, contract_id: impl Into<String>) -> Self {
        self.contract_id = Some(contract_id.into());
        self
    }

    /// Builds a contract from a loosely typed record.
    ///
    /// Timestamps without offset are read as UTC. A missing contract type
    /// defaults to obligation.
    pub fn from_record(record: &ContractSpecRecord) -> Result<Self, ContractError> {
        let start = parse_datetime_utc(&record.start_utc)
            .map_err(|_| ContractError::InvalidTimestamp(record.start_utc.clone()))?;
        let end = parse_datetime_utc(&record.end_utc)
            .map_err(|_| ContractError::InvalidTimestamp(record.end_utc.clone()))?;
        let contract_type = match record.contract_type.as_deref() {
            Some(raw) if !raw.trim().is_empty() => raw.parse()?,
            _ => ContractType::Obligation,
        };

        let spec = Self::new(
            record.source.clone(),
            record.sink.clone(),
            start,
            end,
            record.mw,
            contract_type,
        )?;
        Ok(match &record.contract_id {
            Some(id) if !id.is_empty() => spec.with_contract_id(id.clone()),
            _ => spec,
        })
    }

    /// Source zone (the leg that is subtracted).
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Sink zone.
    pub fn sink(&self) -> &str {
        &self.sink
    }

    /// Inclusive window start.
    pub fn start_utc(&self) -> DateTime<Utc> {
        self.start_utc
    }

    /// Exclusive window end.
    pub fn end_utc(&self) -> DateTime<Utc> {
        self.end_utc
    }

    /// Capacity in MW.
    pub fn mw(&self) -> f64 {
        self.mw
    }

    /// Settlement style.
    pub fn contract_type(&self) -> ContractType {
        self.contract_type
    }

    /// Optional identifier.
    pub fn contract_id(&self) -> Option<&str> {
        self.contract_id.as_deref()
    }

    /// Converts back to the record shape.
    pub fn to_record(&self) -> ContractSpecRecord {
        ContractSpecRecord {
            source: self.source.clone(),
            sink: self.sink.clone(),
            start_utc: self.start_utc.to_rfc3339(),
            end_utc: self.end_utc.to_rfc3339(),
            mw: self.mw,
            contract_type: Some(self.contract_type.to_string()),
            contract_id: self.contract_id.clone(),
        }
    }
}

/// Row shape of a contract specification in tabular inputs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContractSpecRecord {
    /// Source zone
    pub source: String,
    /// Sink zone
    pub sink: String,
    /// Window start (ISO 8601 or epoch seconds)
    pub start_utc: String,
    /// Window end, exclusive
    pub end_utc: String,
    /// Capacity in MW
    pub mw: f64,
    /// `obligation` (default) or `option`
    #[serde(default)]
    pub contract_type: Option<String>,
    /// Optional identifier
    #[serde(default)]
    pub contract_id: Option<String>,
}

impl ContractSpecRecord {
    /// Creates an obligation record without identifier.
    pub fn new(
        source: impl Into<String>,
        sink: impl Into<String>,
        start_utc: impl Into<String>,
        end_utc: impl Into<String>,
        mw: f64,
    ) -> Self {
        Self {
            source: source.into(),
            sink: sink.into(),
            start_utc: start_utc.into(),
            end_utc: end_utc.into(),
            mw,
            contract_type: None,
            contract_id: None,
        }
    }
}

impl TryFrom<&ContractSpecRecord> for ContractSpec {
    type Error = ContractError;

    fn try_from(record: &ContractSpecRecord) -> Result<Self, Self::Error> {
        ContractSpec::from_record(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(contract_type: Option<&str>) -> ContractSpecRecord {
        ContractSpecRecord {
            contract_type: contract_type.map(str::to_string),
            ..ContractSpecRecord::new("A", "B", "2024-01-01T00:00:00Z", "2024-01-01T03:00:00Z", 1.0)
        }
    }

    #[test]
    fn test_option_rejected_at_construction() {
        let err = ContractSpec::from_record(&record(Some("option"))).unwrap_err();
        assert!(matches!(err, ContractError::UnsupportedContractType(_)));
    }

    #[test]
    fn test_obligation_accepted() {
        let spec = ContractSpec::from_record(&record(Some("obligation"))).unwrap();
        assert_eq!(spec.contract_type(), ContractType::Obligation);
        assert_eq!(spec.source(), "A");
        assert_eq!(spec.sink(), "B");
        assert_eq!(spec.mw(), 1.0);
        assert_eq!(spec.contract_id(), None);
    }

    #[test]
    fn test_default_contract_type_is_obligation() {
        let spec = ContractSpec::from_record(&record(None)).unwrap();
        assert_eq!(spec.contract_type(), ContractType::Obligation);
    }

    #[test]
    fn test_unknown_contract_type() {
        let err = ContractSpec::from_record(&record(Some("swing"))).unwrap_err();
        assert_eq!(err, ContractError::UnknownContractType("swing".to_string()));
    }

    #[test]
    fn test_empty_window_rejected() {
        let mut rec = record(None);
        rec.end_utc = rec.start_utc.clone();
        assert!(matches!(
            ContractSpec::from_record(&rec),
            Err(ContractError::EmptyWindow { .. })
        ));
    }

    #[test]
    fn test_bad_timestamp() {
        let mut rec = record(None);
        rec.start_utc = "soon".to_string();
        assert_eq!(
            ContractSpec::from_record(&rec).unwrap_err(),
            ContractError::InvalidTimestamp("soon".to_string())
        );
    }

    #[test]
    fn test_record_round_trip_keeps_id() {
        let spec = ContractSpec::from_record(&record(None))
            .unwrap()
            .with_contract_id("C1");
        let back = ContractSpec::from_record(&spec.to_record()).unwrap();
        assert_eq!(back, spec);
    }
}
