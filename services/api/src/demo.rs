use crate::infra::load_region_table;
use clap::Args;
use mortgage_risk::error::AppError;
use mortgage_risk::lending::{
    LoanApplication, PolicyConfig, RegionDirectory, RegionRiskTable, RiskAssessment, RiskEngine,
};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// Residential properties the borrower already owns
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) existing_properties: i64,
    /// Region (city/county) the property is located in
    #[arg(long)]
    pub(crate) region: String,
    /// Total transaction price in NT$
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) price: i64,
    /// The unit is sold before construction completion
    #[arg(long)]
    pub(crate) presale: bool,
    /// Optional CSV snapshot replacing the embedded region table
    #[arg(long)]
    pub(crate) region_table: Option<PathBuf>,
    /// Print the assessment as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct RegionsArgs {
    /// Optional CSV snapshot replacing the embedded region table
    #[arg(long)]
    pub(crate) region_table: Option<PathBuf>,
    /// Print the watchlist as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Print each assessment as JSON after the summary
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let EvaluateArgs {
        existing_properties,
        region,
        price,
        presale,
        region_table,
        json,
    } = args;

    let engine = engine_for(region_table)?;
    let application = LoanApplication::new(existing_properties, region, price, presale);
    let assessment = engine.evaluate(&application)?;

    if json {
        print_json(&assessment);
    } else {
        render_assessment(&application, &assessment);
    }

    Ok(())
}

pub(crate) fn run_regions(args: RegionsArgs) -> Result<(), AppError> {
    let table = load_region_table(args.region_table.as_deref())?;
    let ranked = table.ranked(&PolicyConfig::standard());

    if args.json {
        match serde_json::to_string_pretty(&ranked) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("Watchlist payload unavailable: {err}"),
        }
        return Ok(());
    }

    println!("Regional overheat watchlist ({} regions)", ranked.len());
    for region in &ranked {
        println!(
            "{:>2}. {} | index {:>3} | YoY +{:.1}% | {} risk",
            region.rank,
            region.region_id,
            region.overheat_index,
            region.yoy_change_percent,
            region.band_label
        );
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let engine = RiskEngine::standard();

    println!("Mortgage risk engine demo");
    println!("Policy: standard selective credit controls, embedded region snapshot");

    for (title, application) in demo_applications() {
        println!("\n== {title}");
        match engine.evaluate(&application) {
            Ok(assessment) => {
                render_assessment(&application, &assessment);
                if args.json {
                    print_json(&assessment);
                }
            }
            Err(err) => println!("  Evaluation failed, no assessment produced: {err}"),
        }
    }

    Ok(())
}

fn engine_for(region_table: Option<PathBuf>) -> Result<RiskEngine, AppError> {
    let table: RegionRiskTable = load_region_table(region_table.as_deref())?;
    let engine = RiskEngine::new(PolicyConfig::standard(), RegionDirectory::new(table))?;
    Ok(engine)
}

fn demo_applications() -> Vec<(&'static str, LoanApplication)> {
    vec![
        (
            "First-time buyer in 台北市",
            LoanApplication::new(0, "台北市", 50_000_000, false),
        ),
        (
            "Second home, high-value 台北市 property",
            LoanApplication::new(1, "台北市", 75_000_000, false),
        ),
        (
            "Third home, pre-sale unit in 新竹市",
            LoanApplication::new(2, "新竹市", 30_000_000, true),
        ),
        (
            "Invalid submission with zero price",
            LoanApplication::new(0, "台北市", 0, false),
        ),
        (
            "Region missing from the snapshot",
            LoanApplication::new(0, "未知市", 20_000_000, false),
        ),
    ]
}

fn render_assessment(application: &LoanApplication, assessment: &RiskAssessment) {
    println!(
        "  Application: {} owned | {} | NT$ {} | pre-sale {}",
        application.existing_property_count,
        application.region_id,
        application.total_price,
        if application.is_presale { "yes" } else { "no" }
    );

    let region_note = if assessment.region.matched {
        "from snapshot"
    } else {
        "defaulted"
    };
    println!(
        "  Region overheat index: {} ({region_note})",
        assessment.region.overheat_index
    );
    println!(
        "  Grade {} | {} ({})",
        assessment.grade.label(),
        assessment.decision.label(),
        assessment.decision.summary()
    );
    println!(
        "  Max LTV {:.1}% | Risk weight {:.2} | Suggested loan NT$ {}",
        assessment.max_ltv_percent,
        assessment.risk_weight,
        assessment.suggested_loan_display()
    );
    println!("  Triggered rules:");
    for explanation in assessment.explanations() {
        println!("    - {explanation}");
    }
}

fn print_json(assessment: &RiskAssessment) {
    match serde_json::to_string_pretty(&assessment.view()) {
        Ok(json) => println!("{json}"),
        Err(err) => println!("  Assessment payload unavailable: {err}"),
    }
}
