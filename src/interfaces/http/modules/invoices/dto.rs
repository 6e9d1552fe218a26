//! Invoice GST DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::pricing::{
    CoverageClass, InvoiceBreakdown, InvoiceLineBreakdown, InvoiceLineRates, InvoiceLineRequest,
    InvoiceTotals, TaxClass,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLineDto {
    #[validate(length(max = 500, message = "description must be at most 500 characters"))]
    pub description: Option<String>,
    #[schema(value_type = Option<f64>, example = 2)]
    pub quantity: Option<Decimal>,
    #[schema(value_type = Option<f64>, example = 1000)]
    pub unit_price: Option<Decimal>,
    #[schema(value_type = Option<f64>, example = 10)]
    pub discount_percent: Option<Decimal>,
    /// `ZERO`, `FIVE`, `TWELVE`, `EIGHTEEN` or `TWENTY_EIGHT`; absent means exempt
    #[schema(example = "EIGHTEEN")]
    #[validate(length(max = 64))]
    pub gst_rate_type: Option<String>,
    /// Defaults to `true` (CGST + SGST)
    pub is_intra_jurisdiction: Option<bool>,
    #[validate(length(max = 64))]
    pub coverage_type: Option<String>,
}

impl InvoiceLineDto {
    pub fn to_domain(&self) -> InvoiceLineRequest {
        InvoiceLineRequest {
            description: self.description.clone(),
            quantity: self.quantity,
            unit_price: self.unit_price,
            discount_percent: self.discount_percent,
            tax_class: self.gst_rate_type.as_deref().map(TaxClass::parse),
            intra_jurisdiction: self.is_intra_jurisdiction,
            coverage: self.coverage_type.as_deref().map(CoverageClass::parse),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct InvoiceQuoteRequest {
    #[validate(length(min = 1, max = 500, message = "an invoice needs 1 to 500 lines"), nested)]
    pub lines: Vec<InvoiceLineDto>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLineRatesDto {
    #[schema(value_type = f64)]
    pub quantity: Decimal,
    #[schema(value_type = f64)]
    pub unit_price: Decimal,
    #[schema(value_type = f64)]
    pub discount_percent: Decimal,
    pub gst_rate_type: String,
    #[schema(value_type = f64)]
    pub gst_rate_percent: Decimal,
    /// `INTRA` or `INTER`
    pub jurisdiction: String,
    #[schema(value_type = Option<f64>)]
    pub coverage_fraction: Option<Decimal>,
    pub fallbacks: Vec<String>,
}

impl From<&InvoiceLineRates> for InvoiceLineRatesDto {
    fn from(r: &InvoiceLineRates) -> Self {
        Self {
            quantity: r.quantity,
            unit_price: r.unit_price,
            discount_percent: r.discount_percent,
            gst_rate_type: r.tax_class.to_string(),
            gst_rate_percent: r.tax_rate_percent,
            jurisdiction: r.jurisdiction.to_string(),
            coverage_fraction: r.coverage_fraction,
            fallbacks: r.fallbacks.iter().map(|f| f.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLineResponse {
    pub description: Option<String>,
    /// `quantity × unitPrice`, before discount
    #[schema(value_type = f64)]
    pub line_total: Decimal,
    #[schema(value_type = f64)]
    pub discount_amount: Decimal,
    #[schema(value_type = f64)]
    pub taxable_amount: Decimal,
    #[schema(value_type = f64)]
    pub cgst_amount: Decimal,
    #[schema(value_type = f64)]
    pub sgst_amount: Decimal,
    #[schema(value_type = f64)]
    pub igst_amount: Decimal,
    #[schema(value_type = f64)]
    pub tax_amount: Decimal,
    #[schema(value_type = f64)]
    pub insurance_coverage: Decimal,
    #[schema(value_type = f64)]
    pub patient_responsibility: Decimal,
    /// Taxable amount plus all tax
    #[schema(value_type = f64)]
    pub line_grand_total: Decimal,
    #[schema(value_type = f64)]
    pub amount_due: Decimal,
    pub rates: InvoiceLineRatesDto,
}

impl From<&InvoiceLineBreakdown> for InvoiceLineResponse {
    fn from(line: &InvoiceLineBreakdown) -> Self {
        let s = &line.settlement;
        Self {
            description: line.description.clone(),
            line_total: line.line_amount,
            discount_amount: s.discount_amount,
            taxable_amount: s.taxable_amount,
            cgst_amount: s.tax.cgst,
            sgst_amount: s.tax.sgst,
            igst_amount: s.tax.igst,
            tax_amount: s.tax_total,
            insurance_coverage: s.covered(),
            patient_responsibility: s.payer_responsibility(),
            line_grand_total: s.total,
            amount_due: s.amount_due,
            rates: (&line.rates).into(),
        }
    }
}

/// Column sums over every line
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTotalsDto {
    /// Sum of pre-discount line totals
    #[schema(value_type = f64)]
    pub line_total: Decimal,
    #[schema(value_type = f64)]
    pub discount_amount: Decimal,
    #[schema(value_type = f64)]
    pub taxable_amount: Decimal,
    #[schema(value_type = f64)]
    pub cgst_amount: Decimal,
    #[schema(value_type = f64)]
    pub sgst_amount: Decimal,
    #[schema(value_type = f64)]
    pub igst_amount: Decimal,
    #[schema(value_type = f64)]
    pub tax_amount: Decimal,
    #[schema(value_type = f64)]
    pub insurance_coverage: Decimal,
    #[schema(value_type = f64)]
    pub patient_responsibility: Decimal,
    #[schema(value_type = f64)]
    pub line_grand_total: Decimal,
    #[schema(value_type = f64)]
    pub amount_due: Decimal,
}

impl From<&InvoiceTotals> for InvoiceTotalsDto {
    fn from(t: &InvoiceTotals) -> Self {
        Self {
            line_total: t.line_amount,
            discount_amount: t.discount_amount,
            taxable_amount: t.taxable_amount,
            cgst_amount: t.cgst,
            sgst_amount: t.sgst,
            igst_amount: t.igst,
            tax_amount: t.tax_total,
            insurance_coverage: t.covered,
            patient_responsibility: t.payer_responsibility,
            line_grand_total: t.total,
            amount_due: t.amount_due,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceQuoteResponse {
    pub lines: Vec<InvoiceLineResponse>,
    pub totals: InvoiceTotalsDto,
    pub quoted_at: DateTime<Utc>,
}

impl InvoiceQuoteResponse {
    pub fn new(invoice: &InvoiceBreakdown, quoted_at: DateTime<Utc>) -> Self {
        Self {
            lines: invoice.lines.iter().map(Into::into).collect(),
            totals: (&invoice.totals).into(),
            quoted_at,
        }
    }
}
