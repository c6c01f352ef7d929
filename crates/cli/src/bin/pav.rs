use std::path::PathBuf;

use clap::Parser;
use pav_config::{ScanMode, load_missions, select_mission};
use pav_core::units::newtons_to_kg;
use pav_export::history::write_scan_history;
use pav_export::invoice::{format_money, write_invoice};
use pav_export::pricing::{Characteristics, estimate};
use pav_export::summary::{DesignSummary, write_summary};
use pav_sizing::parametric::size_mission;
use pav_sizing::{ConvergenceStatus, ScanHistory};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Size a personal aerial vehicle for a client mission and price it"
)]
struct Cli {
    /// Mission file (TOML record, YAML list) or directory of TOML records
    #[arg(long)]
    mission: PathBuf,

    /// Mission name to select from the manifest (case-insensitive)
    #[arg(long)]
    name: Option<String>,

    /// Run the mass/CG convergence loop regardless of the mission file
    #[arg(long, conflicts_with = "no_iterate")]
    iterate: bool,

    /// Return the first estimate without iterating
    #[arg(long)]
    no_iterate: bool,

    /// Directory receiving summary.json, scan_history.csv and invoice.txt
    #[arg(long, default_value = "artifacts")]
    output_dir: PathBuf,

    /// Evaluate the samples of each wing-position scan in parallel
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Log every scan sample
    #[arg(long, short, default_value_t = false)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let missions = load_missions(&cli.mission)?;
    let mut mission = select_mission(&missions, cli.name.as_deref())?;
    if cli.iterate {
        mission.inputs.iterate = true;
    }
    if cli.no_iterate {
        mission.inputs.iterate = false;
    }
    if cli.parallel {
        mission.sizing.scan_mode = ScanMode::Parallel;
    }

    let mut history = ScanHistory::new();
    let sized = size_mission(&mission, &mut history)?;
    let result = &sized.result;
    let configuration = &sized.configuration;

    let design = Characteristics::from_design(&mission.inputs, configuration);
    let cost = estimate(&design);

    println!("PAV '{}'", mission.name);
    match result.status {
        ConvergenceStatus::Converged => println!(
            "  Sizing: converged after {} outer iteration(s), {} evaluations",
            result.outer_iterations, result.evaluations
        ),
        ConvergenceStatus::IterationCapped => println!(
            "  Sizing: iteration cap reached after {} outer iteration(s), mass gap {:.1} N",
            result.outer_iterations, result.mass_gap_n
        ),
        ConvergenceStatus::Bypassed => println!("  Sizing: first estimate (iteration disabled)"),
    }
    println!("  Wing position:       {:.3} of fuselage length", result.wing_position);
    println!(
        "  Take-off mass:       {:.1} kg ({:.0} N)",
        newtons_to_kg(result.mass_n),
        result.mass_n
    );
    println!(
        "  Final vehicle mass:  {:.1} kg",
        configuration.resulting_mass_kg()
    );
    println!(
        "  Centre of gravity:   ({:.3}, {:.3}, {:.3}) m",
        result.cg[0], result.cg[1], result.cg[2]
    );
    println!("  Passengers:          {}", design.passengers);
    println!("  Baggage allowance:   {:.0} kg", design.baggage_allowance_kg);
    println!("  Range:               {:.0} km", design.range_km);
    println!("  Cruise velocity:     {:.0} km/h", design.cruise_velocity_kmh);
    println!("  Battery energy:      {:.0} kWh", design.battery_energy_kwh);
    println!("  Cabin quality:       {}", design.quality);
    println!(
        "  Wheels:              {}",
        if design.wheels_included { "Yes" } else { "No" }
    );
    println!("  Wing span:           {:.2} m", design.wing_span_m);
    println!("  Fuselage length:     {:.2} m", design.fuselage_length_m);
    println!(
        "  Tail areas:          {:.2} m² horizontal, {:.2} m² vertical",
        configuration.horizontal_tail_area_m2(),
        configuration.vertical_tail_area_m2()
    );
    println!(
        "  Propulsion:          {} cruise propellers, {} VTOL rotors",
        configuration.propellers.count, configuration.rotors.count
    );
    for warning in &configuration.warnings {
        println!("  Note: {warning}");
    }
    println!("  Total cost:          {}", format_money(cost.total));

    let summary_path = cli.output_dir.join("summary.json");
    let summary = DesignSummary::new(
        &mission.name,
        &mission.inputs,
        &mission.sizing,
        result,
        configuration,
        &design,
        &cost,
    );
    write_summary(&summary_path, &summary)?;

    let history_path = cli.output_dir.join("scan_history.csv");
    write_scan_history(&history_path, history.records())?;

    let invoice_path = cli.output_dir.join("invoice.txt");
    write_invoice(&invoice_path, &mission.name, &design, &cost)?;

    info!(
        summary = %summary_path.display(),
        history = %history_path.display(),
        invoice = %invoice_path.display(),
        "artifacts written"
    );
    Ok(())
}
