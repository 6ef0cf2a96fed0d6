//! Per-contract input lookup for batch pricing.
//!
//! A batch either shares one table across every contract or asks a
//! provider for each contract. Tables implement the provider traits by
//! lending themselves; closures implement them by building a table per
//! contract.

use std::borrow::Cow;

use ftr_core::data::{CurveTable, PriceTable};
use ftr_core::types::{ContractSpec, FtrError};

/// Source of the price table used to value a contract.
pub trait PriceProvider {
    /// Price table for `spec`.
    fn prices_for(&self, spec: &ContractSpec) -> Result<Cow<'_, PriceTable>, FtrError>;
}

/// Source of the optional forward curve used to value a contract.
pub trait CurveProvider {
    /// Curve for `spec`, or `None` to fall back to the flat spread mean.
    fn curve_for(&self, spec: &ContractSpec) -> Result<Option<Cow<'_, CurveTable>>, FtrError>;
}

impl PriceProvider for PriceTable {
    fn prices_for(&self, _spec: &ContractSpec) -> Result<Cow<'_, PriceTable>, FtrError> {
        Ok(Cow::Borrowed(self))
    }
}

impl<F> PriceProvider for F
where
    F: Fn(&ContractSpec) -> Result<PriceTable, FtrError>,
{
    fn prices_for(&self, spec: &ContractSpec) -> Result<Cow<'_, PriceTable>, FtrError> {
        self(spec).map(Cow::Owned)
    }
}

impl CurveProvider for CurveTable {
    fn curve_for(&self, _spec: &ContractSpec) -> Result<Option<Cow<'_, CurveTable>>, FtrError> {
        Ok(Some(Cow::Borrowed(self)))
    }
}

/// Provider that never supplies a curve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoCurve;

impl CurveProvider for NoCurve {
    fn curve_for(&self, _spec: &ContractSpec) -> Result<Option<Cow<'_, CurveTable>>, FtrError> {
        Ok(None)
    }
}

impl<F> CurveProvider for F
where
    F: Fn(&ContractSpec) -> Result<Option<CurveTable>, FtrError>,
{
    fn curve_for(&self, spec: &ContractSpec) -> Result<Option<Cow<'_, CurveTable>>, FtrError> {
        Ok(self(spec)?.map(Cow::Owned))
    }
}
