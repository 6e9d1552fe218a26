//! Pricing pipeline
//!
//! Stage order is fixed: validate → base rate × time-of-day factor →
//! primary charge → surcharges → subtotal → discount → coverage → tax →
//! totals. Later stages consume earlier outputs, never raw inputs.

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::adjustment::classify_time_of_day;
use super::breakdown::{
    AmbulanceBreakdown, AmbulanceRates, Breakdown, Fallback, InvoiceBreakdown,
    InvoiceLineBreakdown, InvoiceLineRates, InvoiceTotals, Settlement,
};
use super::catalog::{
    CoverageClass, ServiceLevel, StaffType, TaxClass, TimeOfDay, VehicleType, Zone,
};
use super::error::{PricingError, PricingResult};
use super::money::{checked_add, checked_sub, money_mul, money_sum, percent_to_fraction};
use super::rate_table::Lookup;
use super::request::{AmbulanceRequest, InvoiceLineRequest, PricingRequest, StaffRequest};
use super::surcharge::{AddOn, SurchargeCalculator};
use super::tables::PricingTables;
use super::tax::{JurisdictionMode, TaxEngine};

const MAX_DISCOUNT_PERCENT: Decimal = dec!(100);

/// Stateless pricing engine over one immutable table snapshot.
///
/// Cloning is cheap; concurrent callers may share one instance.
#[derive(Debug, Clone)]
pub struct PricingEngine {
    tables: Arc<PricingTables>,
}

impl PricingEngine {
    pub fn new(tables: Arc<PricingTables>) -> Self {
        Self { tables }
    }

    pub fn standard() -> Self {
        Self::new(Arc::new(PricingTables::standard()))
    }

    pub fn tables(&self) -> &PricingTables {
        &self.tables
    }

    pub fn compute_breakdown(&self, request: &PricingRequest) -> PricingResult<Breakdown> {
        match request {
            PricingRequest::Ambulance(req) => self.quote_ambulance(req).map(Breakdown::Ambulance),
            PricingRequest::InvoiceLine(req) => {
                self.quote_invoice_line(req).map(Breakdown::InvoiceLine)
            }
        }
    }

    pub fn quote_ambulance(&self, req: &AmbulanceRequest) -> PricingResult<AmbulanceBreakdown> {
        // 1. validate
        let distance = required(req.distance, "distance")?;
        let waiting_minutes = optional(req.waiting_time, "waitingTime")?;
        let discount_percent = discount_percent(req.discount_percent)?;
        let staff = staff_add_ons(&req.medical_staff)?;

        let tables = &*self.tables;
        let vehicle_type = req.vehicle_type.unwrap_or(VehicleType::Unknown);
        let service_level = req.service_level.unwrap_or(ServiceLevel::Unknown);
        let zone = req.zone.unwrap_or(Zone::Urban);
        let time_of_day = req.time_of_day.unwrap_or_else(|| {
            req.requested_at
                .as_ref()
                .map(classify_time_of_day)
                .unwrap_or(TimeOfDay::Normal)
        });
        let mut fallbacks = Vec::new();

        // 2. base rate × time-of-day factor
        let base = note(
            tables.base_rates.resolve(vehicle_type, service_level),
            Fallback::BaseRate,
            &mut fallbacks,
        );
        let factor = note(
            tables.time_of_day.resolve(time_of_day),
            Fallback::TimeOfDay,
            &mut fallbacks,
        );
        let adjusted_base = money_mul(base, factor, "baseRate")?;

        // 3. distance charge; the per-km rate already encodes the zone
        let distance_rate = note(
            tables.distance_rates.resolve(vehicle_type, zone),
            Fallback::DistanceRate,
            &mut fallbacks,
        );
        let distance_charge = money_mul(distance, distance_rate, "distanceCharge")?;

        // 4. surcharges
        let waiting_charge =
            SurchargeCalculator::waiting(waiting_minutes, tables.waiting_rate_per_minute)?;

        let equipment: Vec<_> = req.equipment.iter().copied().map(AddOn::single).collect();
        if equipment
            .iter()
            .any(|add_on| tables.equipment_prices.resolve(add_on.kind).fallback)
        {
            fallbacks.push(Fallback::Equipment);
        }
        let equipment_charge = SurchargeCalculator::sum(&equipment, &tables.equipment_prices)?;

        if staff
            .iter()
            .any(|add_on| tables.staff_prices.resolve(add_on.kind).fallback)
        {
            fallbacks.push(Fallback::MedicalStaff);
        }
        let staff_charge = SurchargeCalculator::sum(&staff, &tables.staff_prices)?;

        let surcharge_total =
            money_sum([waiting_charge, equipment_charge, staff_charge], "surchargeTotal")?;

        // 5. subtotal
        let subtotal = money_sum([adjusted_base, distance_charge, surcharge_total], "subtotal")?;

        // 6-9. discount, coverage, tax, totals
        let tax_class = tables.ambulance_tax.class;
        let jurisdiction = JurisdictionMode::from_intra_flag(
            req.intra_jurisdiction
                .unwrap_or(tables.ambulance_tax.intra_jurisdiction),
        );
        let settlement = self.settle(
            subtotal,
            discount_percent,
            req.coverage,
            tax_class,
            jurisdiction,
            &mut fallbacks,
        )?;

        // 10. emit
        let rates = AmbulanceRates {
            tables_version: tables.version.clone(),
            vehicle_type,
            service_level,
            zone,
            time_of_day,
            base_rate: base,
            time_of_day_factor: factor,
            distance_rate,
            waiting_rate_per_minute: tables.waiting_rate_per_minute,
            discount_percent,
            tax_class,
            tax_rate_percent: tax_class.rate_percent(),
            jurisdiction,
            coverage_fraction: settlement.coverage.map(|c| c.fraction),
            fallbacks,
        };

        Ok(AmbulanceBreakdown {
            base_rate: adjusted_base,
            distance_charge,
            waiting_charge,
            equipment_charge,
            staff_charge,
            surcharge_total,
            settlement,
            rates,
        })
    }

    pub fn quote_invoice_line(
        &self,
        req: &InvoiceLineRequest,
    ) -> PricingResult<InvoiceLineBreakdown> {
        let quantity = required(req.quantity, "quantity")?;
        let unit_price = required(req.unit_price, "unitPrice")?;
        let discount_percent = discount_percent(req.discount_percent)?;
        let tax_class = req.tax_class.unwrap_or(TaxClass::Zero);
        let jurisdiction = JurisdictionMode::from_intra_flag(req.intra_jurisdiction.unwrap_or(true));
        let mut fallbacks = Vec::new();

        // Invoice lines have no base rate or surcharges; the line amount is
        // the whole subtotal.
        let line_amount = money_mul(quantity, unit_price, "lineAmount")?;

        let settlement = self.settle(
            line_amount,
            discount_percent,
            req.coverage,
            tax_class,
            jurisdiction,
            &mut fallbacks,
        )?;

        Ok(InvoiceLineBreakdown {
            description: req.description.clone(),
            line_amount,
            rates: InvoiceLineRates {
                quantity,
                unit_price,
                discount_percent,
                tax_class,
                tax_rate_percent: tax_class.rate_percent(),
                jurisdiction,
                coverage_fraction: settlement.coverage.map(|c| c.fraction),
                fallbacks,
            },
            settlement,
        })
    }

    /// Price every line and sum the columns. The first invalid line fails
    /// the whole invoice.
    pub fn quote_invoice(&self, lines: &[InvoiceLineRequest]) -> PricingResult<InvoiceBreakdown> {
        let lines = lines
            .iter()
            .enumerate()
            .map(|(index, line)| {
                self.quote_invoice_line(line)
                    .map_err(|err| err.at_line(index))
            })
            .collect::<PricingResult<Vec<_>>>()?;

        let totals = lines
            .iter()
            .try_fold(InvoiceTotals::default(), |totals, line| totals.accumulate(line))?;

        Ok(InvoiceBreakdown { lines, totals })
    }

    /// Stages 6-9. Tax is always computed on the full taxable amount;
    /// coverage only decides who pays it.
    fn settle(
        &self,
        subtotal: Decimal,
        discount_percent: Decimal,
        coverage: Option<CoverageClass>,
        tax_class: TaxClass,
        jurisdiction: JurisdictionMode,
        fallbacks: &mut Vec<Fallback>,
    ) -> PricingResult<Settlement> {
        let discount_amount = money_mul(
            subtotal,
            percent_to_fraction(discount_percent),
            "discountAmount",
        )?;
        let taxable_amount = checked_sub(subtotal, discount_amount, "taxableAmount")?;

        let coverage = coverage
            .map(|class| self.tables.coverage.resolve(taxable_amount, class))
            .transpose()?;
        if coverage.is_some_and(|c| c.fallback) {
            fallbacks.push(Fallback::Coverage);
        }

        if !tax_class.is_known() {
            fallbacks.push(Fallback::TaxClass);
        }
        let tax = TaxEngine::split(taxable_amount, tax_class, jurisdiction)?;
        let tax_total = tax.total()?;
        let total = checked_add(taxable_amount, tax_total, "totalAmount")?;

        let payer = coverage
            .map(|c| c.payer_responsibility)
            .unwrap_or(taxable_amount);
        let amount_due = checked_add(payer, tax_total, "amountDue")?;

        Ok(Settlement {
            subtotal,
            discount_amount,
            taxable_amount,
            coverage,
            tax,
            tax_total,
            total,
            amount_due,
        })
    }
}

fn note(lookup: Lookup, fallback: Fallback, fallbacks: &mut Vec<Fallback>) -> Decimal {
    if lookup.fallback {
        fallbacks.push(fallback);
    }
    lookup.value
}

fn required(value: Option<Decimal>, field: &'static str) -> PricingResult<Decimal> {
    let value = value.ok_or(PricingError::MissingField(field))?;
    non_negative(value, field)
}

fn optional(value: Option<Decimal>, field: &'static str) -> PricingResult<Decimal> {
    non_negative(value.unwrap_or(Decimal::ZERO), field)
}

fn non_negative(value: Decimal, field: &'static str) -> PricingResult<Decimal> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(PricingError::Negative { field, value });
    }
    Ok(value)
}

fn discount_percent(value: Option<Decimal>) -> PricingResult<Decimal> {
    let percent = value.unwrap_or(Decimal::ZERO);
    if percent < Decimal::ZERO || percent > MAX_DISCOUNT_PERCENT {
        return Err(PricingError::DiscountOutOfRange(percent));
    }
    Ok(percent)
}

fn staff_add_ons(staff: &[StaffRequest]) -> PricingResult<Vec<AddOn<StaffType>>> {
    staff
        .iter()
        .map(|member| {
            let count = member.count.unwrap_or(1);
            if count < 1 {
                return Err(PricingError::InvalidCount {
                    field: "medicalStaff.count",
                    value: count,
                });
            }
            let count = u32::try_from(count).map_err(|_| PricingError::Overflow("staffCharge"))?;
            Ok(AddOn::new(member.staff_type, count))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pricing::catalog::Equipment;
    use chrono::DateTime;

    fn engine() -> PricingEngine {
        PricingEngine::standard()
    }

    fn scenario_a() -> AmbulanceRequest {
        AmbulanceRequest {
            time_of_day: Some(TimeOfDay::Normal),
            zone: Some(Zone::Urban),
            waiting_time: Some(Decimal::ZERO),
            ..AmbulanceRequest::new(dec!(10), VehicleType::BasicLifeSupport, ServiceLevel::Standard)
        }
    }

    fn full_ambulance() -> AmbulanceRequest {
        AmbulanceRequest {
            time_of_day: Some(TimeOfDay::Night),
            zone: Some(Zone::Rural),
            waiting_time: Some(dec!(10)),
            equipment: vec![Equipment::Oxygen, Equipment::Defibrillator],
            medical_staff: vec![
                StaffRequest {
                    staff_type: StaffType::Paramedic,
                    count: Some(2),
                },
                StaffRequest {
                    staff_type: StaffType::Doctor,
                    count: None,
                },
            ],
            coverage: Some(CoverageClass::Standard),
            discount_percent: Some(dec!(10)),
            ..AmbulanceRequest::new(
                dec!(12.5),
                VehicleType::AdvancedLifeSupport,
                ServiceLevel::Emergency,
            )
        }
    }

    fn assert_identities(s: &Settlement) {
        assert_eq!(s.taxable_amount, s.subtotal - s.discount_amount);
        assert_eq!(s.total, s.taxable_amount + s.tax.total().unwrap());
        assert_eq!(s.tax_total, s.tax.cgst + s.tax.sgst + s.tax.igst);
        assert_eq!(s.total, s.covered() + s.amount_due);
        assert_eq!(s.covered() + s.payer_responsibility(), s.taxable_amount);
    }

    // ── Call-site scenarios ────────────────────────────────────

    #[test]
    fn scenario_a_basic_life_support_standard() {
        let b = engine().quote_ambulance(&scenario_a()).unwrap();
        assert_eq!(b.rates.base_rate, dec!(750));
        assert_eq!(b.rates.distance_rate, dec!(20));
        assert_eq!(b.base_rate, dec!(750));
        assert_eq!(b.distance_charge, dec!(200));
        assert_eq!(b.settlement.subtotal, dec!(950));
        assert_eq!(b.settlement.tax_total, dec!(47.5));
        assert_eq!(b.settlement.total, dec!(997.5));
        assert!(b.rates.fallbacks.is_empty());
        assert_identities(&b.settlement);
    }

    #[test]
    fn scenario_b_unknown_vehicle_falls_back() {
        let req = AmbulanceRequest {
            vehicle_type: Some(VehicleType::parse("UNKNOWN_TYPE")),
            ..scenario_a()
        };
        let b = engine().quote_ambulance(&req).unwrap();
        assert_eq!(b.rates.base_rate, dec!(500));
        assert_eq!(b.rates.distance_rate, dec!(20));
        assert_eq!(b.settlement.subtotal, dec!(700));
        assert_eq!(b.settlement.total, dec!(735));
        assert_eq!(b.rates.fallbacks, vec![Fallback::BaseRate, Fallback::DistanceRate]);
    }

    #[test]
    fn scenario_c_invoice_line_intra_state() {
        let req = InvoiceLineRequest {
            discount_percent: Some(dec!(10)),
            tax_class: Some(TaxClass::Eighteen),
            intra_jurisdiction: Some(true),
            ..InvoiceLineRequest::new(dec!(2), dec!(1000))
        };
        let line = engine().quote_invoice_line(&req).unwrap();
        assert_eq!(line.line_amount, dec!(2000));
        assert_eq!(line.settlement.discount_amount, dec!(200));
        assert_eq!(line.settlement.taxable_amount, dec!(1800));
        assert_eq!(line.settlement.tax.cgst, dec!(162));
        assert_eq!(line.settlement.tax.sgst, dec!(162));
        assert_eq!(line.settlement.tax.igst, Decimal::ZERO);
        assert_eq!(line.settlement.total, dec!(2124));
        assert_identities(&line.settlement);
    }

    #[test]
    fn scenario_d_standard_coverage_on_thousand() {
        let req = InvoiceLineRequest {
            coverage: Some(CoverageClass::Standard),
            ..InvoiceLineRequest::new(dec!(1), dec!(1000))
        };
        let line = engine().quote_invoice_line(&req).unwrap();
        let coverage = line.settlement.coverage.unwrap();
        assert_eq!(coverage.covered, dec!(800));
        assert_eq!(coverage.payer_responsibility, dec!(200));
        assert_identities(&line.settlement);
    }

    #[test]
    fn full_ambulance_quote() {
        let b = engine().quote_ambulance(&full_ambulance()).unwrap();
        assert_eq!(b.rates.base_rate, dec!(2500));
        assert_eq!(b.rates.time_of_day_factor, dec!(1.25));
        assert_eq!(b.base_rate, dec!(3125));
        assert_eq!(b.rates.distance_rate, dec!(45));
        assert_eq!(b.distance_charge, dec!(562.50));
        assert_eq!(b.waiting_charge, dec!(50));
        assert_eq!(b.equipment_charge, dec!(700));
        assert_eq!(b.staff_charge, dec!(2500));
        assert_eq!(b.surcharge_total, dec!(3250));

        let s = &b.settlement;
        assert_eq!(s.subtotal, dec!(6937.50));
        assert_eq!(s.discount_amount, dec!(693.75));
        assert_eq!(s.taxable_amount, dec!(6243.75));
        assert_eq!(s.covered(), dec!(4995));
        assert_eq!(s.payer_responsibility(), dec!(1248.75));
        assert_eq!(s.tax.cgst, dec!(156.09));
        assert_eq!(s.tax_total, dec!(312.18));
        assert_eq!(s.total, dec!(6555.93));
        assert_eq!(s.amount_due, dec!(1560.93));
        assert_identities(s);
    }

    // ── Stage semantics ────────────────────────────────────────

    #[test]
    fn tax_is_computed_on_full_taxable_amount_regardless_of_coverage() {
        let uncovered = engine().quote_ambulance(&scenario_a()).unwrap();
        let covered = engine()
            .quote_ambulance(&AmbulanceRequest {
                coverage: Some(CoverageClass::Premium),
                ..scenario_a()
            })
            .unwrap();
        assert_eq!(covered.settlement.tax, uncovered.settlement.tax);
        assert_eq!(covered.settlement.total, uncovered.settlement.total);
        assert_eq!(covered.settlement.covered(), dec!(855));
        assert_eq!(covered.settlement.amount_due, dec!(95) + dec!(47.5));
    }

    #[test]
    fn time_of_day_multiplies_base_only() {
        let night = engine()
            .quote_ambulance(&AmbulanceRequest {
                time_of_day: Some(TimeOfDay::Night),
                ..scenario_a()
            })
            .unwrap();
        assert_eq!(night.base_rate, dec!(937.50));
        assert_eq!(night.distance_charge, dec!(200));
    }

    #[test]
    fn zone_changes_distance_rate_not_base() {
        let rural = engine()
            .quote_ambulance(&AmbulanceRequest {
                zone: Some(Zone::Rural),
                ..scenario_a()
            })
            .unwrap();
        assert_eq!(rural.base_rate, dec!(750));
        assert_eq!(rural.rates.distance_rate, dec!(30));
        assert_eq!(rural.distance_charge, dec!(300));
    }

    #[test]
    fn zone_defaults_to_urban() {
        let b = engine()
            .quote_ambulance(&AmbulanceRequest {
                zone: None,
                ..scenario_a()
            })
            .unwrap();
        assert_eq!(b.rates.zone, Zone::Urban);
    }

    #[test]
    fn time_of_day_is_derived_from_requested_at() {
        let req = AmbulanceRequest {
            time_of_day: None,
            requested_at: Some(DateTime::parse_from_rfc3339("2024-03-13T23:15:00+05:30").unwrap()),
            ..scenario_a()
        };
        let b = engine().quote_ambulance(&req).unwrap();
        assert_eq!(b.rates.time_of_day, TimeOfDay::Night);
        assert_eq!(b.base_rate, dec!(937.50));
    }

    #[test]
    fn explicit_time_of_day_wins_over_requested_at() {
        let req = AmbulanceRequest {
            time_of_day: Some(TimeOfDay::Holiday),
            requested_at: Some(DateTime::parse_from_rfc3339("2024-03-13T23:15:00+05:30").unwrap()),
            ..scenario_a()
        };
        let b = engine().quote_ambulance(&req).unwrap();
        assert_eq!(b.rates.time_of_day, TimeOfDay::Holiday);
        assert_eq!(b.rates.time_of_day_factor, dec!(1.5));
    }

    #[test]
    fn inter_state_ambulance_uses_igst() {
        let b = engine()
            .quote_ambulance(&AmbulanceRequest {
                intra_jurisdiction: Some(false),
                ..scenario_a()
            })
            .unwrap();
        assert_eq!(b.settlement.tax.igst, dec!(47.5));
        assert_eq!(b.settlement.tax.cgst, Decimal::ZERO);
        assert_eq!(b.rates.jurisdiction, JurisdictionMode::Inter);
    }

    // ── Fallbacks ──────────────────────────────────────────────

    #[test]
    fn unknown_time_of_day_uses_factor_one() {
        let b = engine()
            .quote_ambulance(&AmbulanceRequest {
                time_of_day: Some(TimeOfDay::parse("DUSK")),
                ..scenario_a()
            })
            .unwrap();
        assert_eq!(b.rates.time_of_day_factor, Decimal::ONE);
        assert_eq!(b.rates.fallbacks, vec![Fallback::TimeOfDay]);
    }

    #[test]
    fn unknown_service_level_uses_default_base_but_known_distance() {
        let b = engine()
            .quote_ambulance(&AmbulanceRequest {
                service_level: Some(ServiceLevel::Unknown),
                ..scenario_a()
            })
            .unwrap();
        assert_eq!(b.rates.base_rate, dec!(500));
        assert_eq!(b.rates.fallbacks, vec![Fallback::BaseRate]);
    }

    #[test]
    fn unknown_add_ons_cost_nothing() {
        let b = engine()
            .quote_ambulance(&AmbulanceRequest {
                equipment: vec![Equipment::Unknown],
                medical_staff: vec![StaffRequest {
                    staff_type: StaffType::Unknown,
                    count: Some(3),
                }],
                ..scenario_a()
            })
            .unwrap();
        assert_eq!(b.surcharge_total, Decimal::ZERO);
        assert_eq!(b.settlement.total, dec!(997.5));
        assert_eq!(
            b.rates.fallbacks,
            vec![Fallback::Equipment, Fallback::MedicalStaff]
        );
    }

    #[test]
    fn unknown_coverage_uses_lowest_fraction() {
        let b = engine()
            .quote_ambulance(&AmbulanceRequest {
                coverage: Some(CoverageClass::parse("GOLD")),
                ..scenario_a()
            })
            .unwrap();
        assert_eq!(b.rates.coverage_fraction, Some(dec!(0.50)));
        assert_eq!(b.settlement.covered(), dec!(475));
        assert!(b.rates.fallbacks.contains(&Fallback::Coverage));
    }

    #[test]
    fn unknown_tax_class_is_exempt() {
        let line = engine()
            .quote_invoice_line(&InvoiceLineRequest {
                tax_class: Some(TaxClass::parse("THIRTY")),
                ..InvoiceLineRequest::new(dec!(3), dec!(100))
            })
            .unwrap();
        assert_eq!(line.settlement.tax_total, Decimal::ZERO);
        assert_eq!(line.settlement.total, dec!(300));
        assert_eq!(line.rates.fallbacks, vec![Fallback::TaxClass]);
    }

    #[test]
    fn absent_tax_class_is_exempt_without_fallback() {
        let line = engine()
            .quote_invoice_line(&InvoiceLineRequest::new(dec!(3), dec!(100)))
            .unwrap();
        assert_eq!(line.rates.tax_class, TaxClass::Zero);
        assert!(line.rates.fallbacks.is_empty());
    }

    // ── Validation ─────────────────────────────────────────────

    #[test]
    fn missing_distance_is_rejected() {
        let req = AmbulanceRequest {
            distance: None,
            ..scenario_a()
        };
        assert_eq!(
            engine().quote_ambulance(&req).unwrap_err(),
            PricingError::MissingField("distance")
        );
    }

    #[test]
    fn zero_distance_is_valid() {
        let req = AmbulanceRequest {
            distance: Some(Decimal::ZERO),
            ..scenario_a()
        };
        let b = engine().quote_ambulance(&req).unwrap();
        assert_eq!(b.distance_charge, Decimal::ZERO);
        assert_eq!(b.settlement.subtotal, dec!(750));
    }

    #[test]
    fn negative_inputs_are_rejected() {
        let negative_distance = AmbulanceRequest {
            distance: Some(dec!(-1)),
            ..scenario_a()
        };
        assert!(matches!(
            engine().quote_ambulance(&negative_distance),
            Err(PricingError::Negative { field: "distance", .. })
        ));

        let negative_wait = AmbulanceRequest {
            waiting_time: Some(dec!(-5)),
            ..scenario_a()
        };
        assert!(matches!(
            engine().quote_ambulance(&negative_wait),
            Err(PricingError::Negative { field: "waitingTime", .. })
        ));

        let negative_price = InvoiceLineRequest::new(dec!(1), dec!(-0.01));
        assert!(matches!(
            engine().quote_invoice_line(&negative_price),
            Err(PricingError::Negative { field: "unitPrice", .. })
        ));
    }

    #[test]
    fn staff_count_below_one_is_rejected() {
        let req = AmbulanceRequest {
            medical_staff: vec![StaffRequest {
                staff_type: StaffType::Nurse,
                count: Some(0),
            }],
            ..scenario_a()
        };
        assert_eq!(
            engine().quote_ambulance(&req).unwrap_err(),
            PricingError::InvalidCount {
                field: "medicalStaff.count",
                value: 0
            }
        );
    }

    #[test]
    fn discount_outside_range_is_rejected() {
        for percent in [dec!(-1), dec!(100.01)] {
            let req = InvoiceLineRequest {
                discount_percent: Some(percent),
                ..InvoiceLineRequest::new(dec!(1), dec!(10))
            };
            assert_eq!(
                engine().quote_invoice_line(&req).unwrap_err(),
                PricingError::DiscountOutOfRange(percent)
            );
        }
    }

    #[test]
    fn full_discount_zeroes_everything_after_subtotal() {
        let req = InvoiceLineRequest {
            discount_percent: Some(dec!(100)),
            tax_class: Some(TaxClass::TwentyEight),
            ..InvoiceLineRequest::new(dec!(4), dec!(250))
        };
        let line = engine().quote_invoice_line(&req).unwrap();
        assert_eq!(line.settlement.taxable_amount, Decimal::ZERO);
        assert_eq!(line.settlement.total, Decimal::ZERO);
    }

    #[test]
    fn missing_invoice_fields_are_rejected() {
        let no_quantity = InvoiceLineRequest {
            quantity: None,
            ..InvoiceLineRequest::new(dec!(1), dec!(10))
        };
        assert_eq!(
            engine().quote_invoice_line(&no_quantity).unwrap_err(),
            PricingError::MissingField("quantity")
        );

        let no_price = InvoiceLineRequest {
            unit_price: None,
            ..InvoiceLineRequest::new(dec!(1), dec!(10))
        };
        assert_eq!(
            engine().quote_invoice_line(&no_price).unwrap_err(),
            PricingError::MissingField("unitPrice")
        );
    }

    #[test]
    fn overflow_is_an_error_not_a_panic() {
        let req = InvoiceLineRequest::new(Decimal::MAX, dec!(10));
        assert!(matches!(
            engine().quote_invoice_line(&req),
            Err(PricingError::Overflow(_))
        ));
    }

    // ── Properties ─────────────────────────────────────────────

    #[test]
    fn identities_hold_across_inputs() {
        let distances = [dec!(0), dec!(0.333), dec!(7.77), dec!(49.995), dec!(250)];
        let discounts = [dec!(0), dec!(3.3), dec!(12.5), dec!(99.99)];
        let coverages = [None, Some(CoverageClass::Basic), Some(CoverageClass::Unknown)];

        for distance in distances {
            for discount in discounts {
                for coverage in coverages {
                    let req = AmbulanceRequest {
                        distance: Some(distance),
                        discount_percent: Some(discount),
                        coverage,
                        ..full_ambulance()
                    };
                    let b = engine().quote_ambulance(&req).unwrap();
                    assert_identities(&b.settlement);
                    assert_eq!(
                        b.settlement.subtotal,
                        b.base_rate + b.distance_charge + b.surcharge_total
                    );
                }
            }
        }
    }

    #[test]
    fn total_never_decreases_with_distance() {
        for discount in [dec!(0), dec!(15), dec!(33.33)] {
            let mut previous = Decimal::ZERO;
            for step in 0..400 {
                let req = AmbulanceRequest {
                    distance: Some(Decimal::new(step * 37, 2)),
                    discount_percent: Some(discount),
                    ..full_ambulance()
                };
                let total = engine().quote_ambulance(&req).unwrap().settlement.total;
                assert!(total >= previous, "total dropped at step {step}");
                previous = total;
            }
        }
    }

    #[test]
    fn total_never_increases_with_discount() {
        let mut previous = Decimal::MAX;
        for step in 0..=200 {
            let req = InvoiceLineRequest {
                discount_percent: Some(Decimal::new(step * 5, 1)),
                tax_class: Some(TaxClass::Twelve),
                ..InvoiceLineRequest::new(dec!(3), dec!(333.33))
            };
            let total = engine().quote_invoice_line(&req).unwrap().settlement.total;
            assert!(total <= previous, "total rose at step {step}");
            previous = total;
        }
    }

    #[test]
    fn permuting_add_ons_does_not_change_surcharges() {
        let base = AmbulanceRequest {
            equipment: vec![
                Equipment::Oxygen,
                Equipment::Ventilator,
                Equipment::Unknown,
                Equipment::CardiacMonitor,
            ],
            medical_staff: vec![
                StaffRequest {
                    staff_type: StaffType::Nurse,
                    count: Some(2),
                },
                StaffRequest {
                    staff_type: StaffType::Doctor,
                    count: None,
                },
                StaffRequest {
                    staff_type: StaffType::Emt,
                    count: Some(3),
                },
            ],
            ..scenario_a()
        };
        let expected = engine().quote_ambulance(&base).unwrap();

        for shift in 0..4 {
            let mut req = base.clone();
            req.equipment.rotate_left(shift);
            req.medical_staff.rotate_left(shift % 3);
            req.medical_staff.reverse();
            let b = engine().quote_ambulance(&req).unwrap();
            assert_eq!(b.surcharge_total, expected.surcharge_total);
            assert_eq!(b.settlement, expected.settlement);
        }
    }

    #[test]
    fn identical_requests_give_identical_breakdowns() {
        let engine = engine();
        let first = engine.quote_ambulance(&full_ambulance()).unwrap();
        let second = engine.quote_ambulance(&full_ambulance()).unwrap();
        assert_eq!(first, second);
    }

    // ── Dispatch & invoice aggregation ─────────────────────────

    #[test]
    fn compute_breakdown_dispatches_by_request_kind() {
        let engine = engine();
        let ambulance = engine
            .compute_breakdown(&PricingRequest::Ambulance(scenario_a()))
            .unwrap();
        assert!(matches!(ambulance, Breakdown::Ambulance(_)));
        assert_eq!(ambulance.settlement().total, dec!(997.5));

        let line = engine
            .compute_breakdown(&PricingRequest::InvoiceLine(InvoiceLineRequest::new(
                dec!(2),
                dec!(50),
            )))
            .unwrap();
        assert!(matches!(line, Breakdown::InvoiceLine(_)));
        assert_eq!(line.settlement().total, dec!(100));
        assert!(line.fallbacks().is_empty());
    }

    #[test]
    fn invoice_totals_sum_every_line() {
        let lines = vec![
            InvoiceLineRequest {
                discount_percent: Some(dec!(10)),
                tax_class: Some(TaxClass::Eighteen),
                ..InvoiceLineRequest::new(dec!(2), dec!(1000))
            },
            InvoiceLineRequest {
                tax_class: Some(TaxClass::Twelve),
                intra_jurisdiction: Some(false),
                coverage: Some(CoverageClass::Standard),
                ..InvoiceLineRequest::new(dec!(1), dec!(500))
            },
            InvoiceLineRequest::new(dec!(5), dec!(20)),
        ];
        let invoice = engine().quote_invoice(&lines).unwrap();
        let t = invoice.totals;

        assert_eq!(invoice.lines.len(), 3);
        assert_eq!(t.line_amount, dec!(2600));
        assert_eq!(t.discount_amount, dec!(200));
        assert_eq!(t.taxable_amount, dec!(2400));
        assert_eq!(t.cgst, dec!(162));
        assert_eq!(t.sgst, dec!(162));
        assert_eq!(t.igst, dec!(60));
        assert_eq!(t.tax_total, dec!(384));
        assert_eq!(t.total, dec!(2784));
        assert_eq!(t.covered, dec!(400));
        assert_eq!(t.payer_responsibility, dec!(2000));
        assert_eq!(t.total, t.covered + t.amount_due);
    }

    #[test]
    fn invalid_invoice_line_reports_its_index() {
        let lines = vec![
            InvoiceLineRequest::new(dec!(1), dec!(10)),
            InvoiceLineRequest {
                unit_price: None,
                ..InvoiceLineRequest::new(dec!(1), dec!(10))
            },
        ];
        let err = engine().quote_invoice(&lines).unwrap_err();
        assert_eq!(err, PricingError::MissingField("unitPrice").at_line(1));
    }

    #[test]
    fn empty_invoice_has_zero_totals() {
        let invoice = engine().quote_invoice(&[]).unwrap();
        assert!(invoice.lines.is_empty());
        assert_eq!(invoice.totals, InvoiceTotals::default());
    }
}
