use restaurant_pnl::*;
use std::collections::BTreeMap;

const EPSILON: f64 = 1e-6;

fn harbor_grill_plan() -> OpeningPlan {
    OpeningPlan::from_json(
        r#"{
            "business_name": "Harbor Grill",
            "opening_month": "2025-01",
            "operations": {
                "seats": 50,
                "lunch_check": 18.0,
                "dinner_check": 32.0,
                "occupancy_rate": 0.8,
                "turnover_rate": 2.0,
                "food_cogs_percent": 0.28,
                "beverage_cogs_percent": 0.22
            },
            "annual_operating_expenses": {
                "rent": 84000.0,
                "utilities": 30000.0,
                "insurance": 9600.0,
                "marketing": 18000.0,
                "card_processing": 21600.0
            },
            "annual_payroll": 420000.0,
            "startup_costs": {
                "leasehold_improvements": 168000.0,
                "kitchen_equipment": 90000.0,
                "initial_inventory": 7500.0,
                "deposits": 14000.0
            },
            "projection": {
                "labor": { "6110": 9000.0, "6115": 11000.0 }
            }
        }"#,
    )
    .expect("plan fixture parses")
}

fn sparse(entries: &[(&str, &str, f64)]) -> SparseRecord {
    let mut record = SparseRecord::new();
    for (section, code, value) in entries {
        record
            .entry(section.to_string())
            .or_default()
            .insert(code.to_string(), *value);
    }
    record
}

fn month(raw: &str) -> MonthKey {
    MonthKey::parse(raw).expect("valid month key")
}

#[test]
fn test_scenario_a_monthly_revenue() {
    let plan = harbor_grill_plan();
    let forecast = derive_monthly_forecast(&plan).unwrap();

    assert_eq!(forecast.average_check, 25.0);
    assert_eq!(forecast.daily_revenue, 2_000.0);
    assert_eq!(forecast.monthly_revenue.round(), 60_667.0);
    assert_eq!(forecast.operating_expenses, 13_600.0);
    assert_eq!(forecast.payroll, 35_000.0);
    assert!(
        (forecast.net_income - (forecast.gross_profit - 48_600.0)).abs() < EPSILON,
        "net income {} should be gross profit less opex and payroll",
        forecast.net_income
    );
}

#[test]
fn test_scenario_b_variance_sign_convention() {
    let revenue = Variance::compute(1_000.0, 1_200.0, true);
    assert_eq!(revenue.delta, 200.0);
    assert_eq!(revenue.delta_percent, 20.0);
    assert!(revenue.favorable);

    let labor_role = ChartOfAccounts::standard().section("labor").unwrap().role;
    let labor = Variance::compute(1_000.0, 1_200.0, labor_role.is_revenue_like());
    assert_eq!(labor.delta, 200.0);
    assert_eq!(labor.delta_percent, 20.0);
    assert!(!labor.favorable);
}

#[test]
fn test_scenario_c_startup_amortization() {
    let total: f64 = (0..12).map(|_| monthly_amount(12_000.0, 12)).sum();
    assert_eq!(monthly_amount(12_000.0, 12), 1_000.0);
    assert!((total - 12_000.0).abs() < EPSILON);
}

#[test]
fn test_scenario_d_empty_month_against_single_section_chart() -> anyhow::Result<()> {
    let chart = ChartOfAccounts::new(vec![Section::new(
        "revenue",
        "Revenue",
        "Total Revenue",
        SectionRole::Revenue,
        vec![AccountLine::new("4105", "Food Sales")],
    )])?;

    let book = ActualsBook::from_json(r#"{ "2025-03": { "pl": {} } }"#)?;
    let merged = book.actuals_for(&chart, &month("2025-03"));

    let expected: BTreeMap<String, BTreeMap<String, f64>> =
        serde_json::from_str(r#"{ "revenue": { "4105": 0.0 } }"#)?;
    assert_eq!(merged.as_map(), &expected);
    Ok(())
}

#[test]
fn test_scenario_e_zero_forecast() {
    let v = Variance::compute(0.0, 500.0, false);
    assert_eq!(v.delta, 500.0);
    assert_eq!(v.delta_percent, 0.0);
}

#[test]
fn test_merge_totality_for_assorted_inputs() {
    let chart = ChartOfAccounts::standard();
    let inputs = [
        SparseRecord::new(),
        sparse(&[("revenue", "4105", 1.0)]),
        sparse(&[("revenue", "4105", 1.0), ("unknown", "1", 2.0)]),
        sparse(&[("labor", "not-a-code", 3.0), ("otherExpenses", "9105", 4.0)]),
    ];

    for input in &inputs {
        for defaults in &inputs {
            let merged = merge(chart, input, defaults);
            assert_eq!(merged.as_map().len(), chart.sections().len());
            for section in chart.sections() {
                let lines = merged.section(&section.id).unwrap();
                let codes: Vec<&str> = lines.keys().map(|k| k.as_str()).collect();
                let mut expected: Vec<&str> = section.codes().collect();
                expected.sort();
                assert_eq!(codes, expected);
            }
        }
    }

    let zeros = merge(chart, &SparseRecord::new(), &SparseRecord::new());
    assert_eq!(
        StatementSummary::from_record(chart, &zeros),
        StatementSummary::default()
    );
}

#[test]
fn test_variance_identity_for_every_section() {
    let chart = ChartOfAccounts::standard();
    for section in chart.sections() {
        for forecast in [0.0, 42.0, 99_999.99] {
            let v = Variance::compute(forecast, forecast, section.role.is_revenue_like());
            assert_eq!(v.delta, 0.0);
            assert!(v.favorable, "{} should be on plan", section.id);
        }
    }
}

#[test]
fn test_amortization_conservation_and_zero_horizon() {
    for months in 1..=84 {
        let cost = 123_456.78;
        let total: f64 = (0..months).map(|m| amount_in_month(cost, months, m)).sum();
        assert!((total - cost).abs() < 1e-4, "{} months: {}", months, total);
    }
    for cost in [0.0, 1.0, -250.0, 1e12] {
        assert_eq!(monthly_amount(cost, 0), 0.0);
    }
}

#[test]
fn test_quarter_of_actuals_end_to_end() -> anyhow::Result<()> {
    let plan = harbor_grill_plan();
    let chart = ChartOfAccounts::standard();
    let processor = StatementProcessor::new(chart, &plan)?;

    let mut book = ActualsBook::new();
    let jan = month("2025-01");
    let feb = month("2025-02");
    let mar = month("2025-03");

    for (m, food, bev) in [(&jan, 40_000.0, 14_000.0), (&feb, 43_500.0, 15_250.0), (&mar, 47_000.0, 16_900.0)] {
        book.set_cell(chart, m, "revenue", "4105", food)?;
        book.set_cell(chart, m, "revenue", "4110", bev)?;
        book.set_cell(chart, m, "cogs", "5105", food * 0.3)?;
        book.set_cell(chart, m, "labor", "6110", 9_500.0)?;
        book.set_cell(chart, m, "labor", "6115", 11_200.0)?;
        book.set_cell_text(chart, m, "property", "7705", "$7,000")?;
    }

    let report = processor.month_report(&book, &mar);
    assert_eq!(report.actual_summary.total_revenue, 63_900.0);
    assert!((report.actual_summary.total_cogs - 14_100.0).abs() < EPSILON);
    assert_eq!(report.actual_summary.labor_total, 20_700.0);

    let labor = report.variance.section("labor").unwrap();
    assert_eq!(labor.forecast_total, 55_000.0);
    assert!(labor.total.favorable);

    let trend = processor.trend(&book, &jan, &month("2025-06"));
    assert_eq!(trend.points.len(), 6);
    assert_eq!(trend.months_with_actuals(), 3);
    let summed: f64 = trend.points.iter().map(|p| p.actual.total_revenue).sum();
    assert!((summed - trend.cumulative_actual.total_revenue).abs() < EPSILON);

    // Inventory is written off in the opening month only.
    let amortization_jan = trend.points[0].projection.other_expenses;
    let amortization_feb = trend.points[1].projection.other_expenses;
    assert!((amortization_jan - amortization_feb - 7_500.0).abs() < EPSILON);

    Ok(())
}

#[test]
fn test_month_report_csv_parses() -> anyhow::Result<()> {
    let plan = harbor_grill_plan();
    let chart = ChartOfAccounts::standard();
    let mut book = ActualsBook::new();
    let m = month("2025-02");
    book.set_cell(chart, &m, "revenue", "4105", 45_000.0)?;

    let report = process_month(&plan, &book, &m)?;
    let exported = report.to_csv();

    let mut reader = csv::Reader::from_reader(exported.as_bytes());
    let headers = reader.headers()?.clone();
    assert_eq!(&headers[0], "Month");
    assert_eq!(&headers[9], "% of Revenue");

    let rows: Vec<csv::StringRecord> = reader.records().collect::<std::result::Result<_, _>>()?;
    assert_eq!(rows.len(), chart.total_lines() + chart.sections().len());

    let food = rows
        .iter()
        .find(|r| &r[1] == "revenue" && &r[2] == "4105")
        .expect("food sales row");
    assert_eq!(&food[5], "45000.00");
    assert_eq!(&food[9], "100.0");

    let total_labor = rows
        .iter()
        .find(|r| &r[1] == "labor" && r[2].is_empty())
        .expect("labor total row");
    assert_eq!(&total_labor[3], "Total Labor");
    assert_eq!(&total_labor[8], "true");
    Ok(())
}

#[test]
fn test_actuals_persist_through_file() -> anyhow::Result<()> {
    let chart = ChartOfAccounts::standard();
    let mut book = ActualsBook::new();
    book.set_cell(chart, &month("2025-04"), "marketing", "7305", 1_250.0)?;
    book.set_cell(chart, &month("2025-05"), "otherIncome", "8110", 300.0)?;

    let path = std::env::temp_dir().join(format!("restaurant-pnl-actuals-{}.json", std::process::id()));
    book.save(&path)?;
    let restored = ActualsBook::load(&path)?;
    std::fs::remove_file(&path)?;

    assert_eq!(restored, book);
    let raw: serde_json::Value = serde_json::from_str(&book.to_json()?)?;
    assert_eq!(raw["2025-04"]["pl"]["marketing"]["7305"], 1_250.0);
    Ok(())
}

#[test]
fn test_schema_drift_is_ignored_in_views() -> anyhow::Result<()> {
    let chart = ChartOfAccounts::standard();
    let book = ActualsBook::from_json(
        r#"{ "2024-12": { "pl": {
            "revenue": { "4105": 100.0, "4999": 5.0 },
            "retiredSection": { "1234": 77.0 }
        } } }"#,
    )?;

    let actuals = book.actuals_for(chart, &month("2024-12"));
    assert!(actuals.section("retiredSection").is_none());
    assert_eq!(section_total(&actuals, "revenue"), 100.0);
    Ok(())
}

#[test]
fn test_invalid_inputs_surface_errors() {
    assert!(matches!(
        MonthKey::parse("2025-3"),
        Err(StatementError::InvalidMonthKey(_))
    ));
    assert!(matches!(
        ChartOfAccounts::standard().section("payroll"),
        Err(StatementError::SectionNotFound(_))
    ));
    assert!(matches!(
        OpeningPlan::from_json("{ not json"),
        Err(StatementError::SerializationError(_))
    ));
    assert!(matches!(
        OpeningPlan::load("/definitely/not/here.json"),
        Err(StatementError::IoError(_))
    ));
}
