//! Export helpers for the cost estimate, invoice text and JSON/CSV artifacts.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Create a writer for the target path, handling stdout (`-`) by convention.
pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}

pub mod pricing {
    use pav_config::{MissionInputs, QualityLevel};
    use pav_sizing::PavConfiguration;
    use serde::Serialize;

    const PRICE_PER_METRE_AND_SEAT: f64 = 200.0;
    const PRICE_PER_KM_AND_KMH: f64 = 50.0;
    const BASE_FEE: f64 = 7_500.0;
    const BUSINESS_CABIN_PER_SEAT: f64 = 1_000.0;
    const WHEELS_PRICE: f64 = 3_000.0;
    const PRIMARY_COLOUR_PRICE: f64 = 500.0;
    const SECONDARY_COLOUR_PRICE: f64 = 250.0;
    const STANDARD_PRIMARY_COLOUR: &str = "white";
    const STANDARD_SECONDARY_COLOUR: &str = "red";

    /// Client-facing description of the delivered vehicle.
    ///
    /// Span and length are rounded to centimetres and range, velocity and
    /// battery energy to whole units, as printed on the invoice.
    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct Characteristics {
        pub passengers: u32,
        pub baggage_allowance_kg: f64,
        pub range_km: f64,
        pub cruise_velocity_kmh: f64,
        pub battery_energy_kwh: f64,
        pub quality: QualityLevel,
        pub wheels_included: bool,
        pub wing_span_m: f64,
        pub fuselage_length_m: f64,
        pub primary_colour: String,
        pub secondary_colour: String,
    }

    impl Characteristics {
        pub fn from_design(mission: &MissionInputs, configuration: &PavConfiguration) -> Self {
            Self {
                passengers: mission.number_of_passengers,
                baggage_allowance_kg: mission.baggage_allowance_kg().round(),
                range_km: mission.required_range_km.round(),
                cruise_velocity_kmh: mission.cruise_velocity_kmh.round(),
                battery_energy_kwh: configuration.battery_energy_kwh().round(),
                quality: mission.quality_level,
                wheels_included: mission.wheels_included,
                wing_span_m: round_to_cm(configuration.wing_span_m()),
                fuselage_length_m: round_to_cm(configuration.fuselage_length_m()),
                primary_colour: mission.primary_colour.clone(),
                secondary_colour: mission.secondary_colour.clone(),
            }
        }
    }

    fn round_to_cm(value: f64) -> f64 {
        (value * 100.0).round() / 100.0
    }

    /// Itemised price in dollars.
    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct CostEstimate {
        pub base: f64,
        pub cabin: f64,
        pub wheels: f64,
        pub primary_colour: f64,
        pub secondary_colour: f64,
        pub total: f64,
    }

    pub fn estimate(design: &Characteristics) -> CostEstimate {
        let seats = f64::from(design.passengers);
        let base = (design.wing_span_m + design.fuselage_length_m + 5.0 * seats)
            * PRICE_PER_METRE_AND_SEAT
            + (design.range_km + design.cruise_velocity_kmh) * PRICE_PER_KM_AND_KMH
            + BASE_FEE;
        let cabin = match design.quality {
            QualityLevel::Economy => 0.0,
            QualityLevel::Business => BUSINESS_CABIN_PER_SEAT * seats,
        };
        let wheels = if design.wheels_included { WHEELS_PRICE } else { 0.0 };
        let primary_colour = if design
            .primary_colour
            .eq_ignore_ascii_case(STANDARD_PRIMARY_COLOUR)
        {
            0.0
        } else {
            PRIMARY_COLOUR_PRICE
        };
        let secondary_colour = if design
            .secondary_colour
            .eq_ignore_ascii_case(STANDARD_SECONDARY_COLOUR)
        {
            0.0
        } else {
            SECONDARY_COLOUR_PRICE
        };

        CostEstimate {
            base,
            cabin,
            wheels,
            primary_colour,
            secondary_colour,
            total: base + cabin + wheels + primary_colour + secondary_colour,
        }
    }
}

pub mod invoice {
    use std::fmt::Write as _;
    use std::io::{self, Write};
    use std::path::Path;

    use chrono::NaiveDate;

    use super::pricing::{Characteristics, CostEstimate};

    /// Dollar amount with thousands separators, e.g. `$12,345.60`.
    pub fn format_money(amount: f64) -> String {
        let cents = (amount.abs() * 100.0).round() as u64;
        let whole = (cents / 100).to_string();
        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (index, digit) in whole.chars().enumerate() {
            if index > 0 && (whole.len() - index) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(digit);
        }
        let sign = if amount < 0.0 { "-" } else { "" };
        format!("{sign}${grouped}.{:02}", cents % 100)
    }

    fn capitalise(word: &str) -> String {
        let mut chars = word.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
            None => String::new(),
        }
    }

    /// Plain-text invoice: characteristics block, itemised costs and total.
    pub fn render(
        mission_name: &str,
        design: &Characteristics,
        cost: &CostEstimate,
        issued: NaiveDate,
    ) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Invoice for PAV '{mission_name}'");
        let _ = writeln!(out, "Date: {}", issued.format("%d-%m-%Y"));
        let _ = writeln!(out);
        let _ = writeln!(out, "PAV characteristics");
        let rows = [
            ("Number of passengers", design.passengers.to_string()),
            (
                "Total baggage allowance",
                format!("{:.0} kg", design.baggage_allowance_kg),
            ),
            ("Range", format!("{:.0} km", design.range_km)),
            ("Cruise velocity", format!("{:.0} km/h", design.cruise_velocity_kmh)),
            ("Battery energy", format!("{:.0} kWh", design.battery_energy_kwh)),
            ("Cabin quality", design.quality.to_string()),
            (
                "Wheels included",
                if design.wheels_included { "Yes" } else { "No" }.to_string(),
            ),
            ("Wing span", format!("{:.2} m", design.wing_span_m)),
            ("Fuselage length", format!("{:.2} m", design.fuselage_length_m)),
            ("Primary colour", capitalise(&design.primary_colour)),
            ("Secondary colour", capitalise(&design.secondary_colour)),
        ];
        for (label, value) in rows {
            let _ = writeln!(out, "  {:<28}{:>16}", format!("{label}:"), value);
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Costs");
        let mut lines = vec![
            ("Basic price", cost.base),
            ("Additional cost for cabin design", cost.cabin),
        ];
        if design.wheels_included {
            lines.push(("Additional cost for wheels", cost.wheels));
        }
        lines.push(("Additional cost for primary colour", cost.primary_colour));
        lines.push(("Additional cost for secondary colour", cost.secondary_colour));
        for (label, amount) in lines {
            let _ = writeln!(out, "  {:<40}{:>16}", format!("{label}:"), format_money(amount));
        }
        let _ = writeln!(out, "  {:<40}{:>16}", "Total:", format_money(cost.total));
        out
    }

    /// Render with today's local date and write to `path` (`-` for stdout).
    pub fn write_invoice(
        path: &Path,
        mission_name: &str,
        design: &Characteristics,
        cost: &CostEstimate,
    ) -> io::Result<()> {
        let today = chrono::Local::now().date_naive();
        let mut writer = super::writer_for_path(path)?;
        writer.write_all(render(mission_name, design, cost, today).as_bytes())?;
        writer.flush()
    }
}

pub mod summary {
    use std::path::Path;

    use pav_config::{MissionInputs, SizingConfig};
    use pav_sizing::{ConvergenceResult, PavConfiguration, SizingWarning};
    use pav_sizing::vehicle::mass::Component;
    use serde::Serialize;
    use serde_json::to_writer_pretty;

    use super::ExportError;
    use super::pricing::{Characteristics, CostEstimate};

    /// JSON document describing one sized vehicle.
    #[derive(Debug, Serialize)]
    pub struct DesignSummary<'a> {
        pub mission: &'a str,
        pub inputs: &'a MissionInputs,
        pub sizing: &'a SizingConfig,
        pub convergence: &'a ConvergenceResult,
        pub characteristics: &'a Characteristics,
        pub cost: &'a CostEstimate,
        pub horizontal_tail_area_m2: f64,
        pub vertical_tail_area_m2: f64,
        pub cruise_propellers: u32,
        pub vtol_rotors: u32,
        pub wheels: u32,
        pub components: &'a [Component],
        pub warnings: &'a [SizingWarning],
    }

    impl<'a> DesignSummary<'a> {
        pub fn new(
            mission: &'a str,
            inputs: &'a MissionInputs,
            sizing: &'a SizingConfig,
            convergence: &'a ConvergenceResult,
            configuration: &'a PavConfiguration,
            characteristics: &'a Characteristics,
            cost: &'a CostEstimate,
        ) -> Self {
            Self {
                mission,
                inputs,
                sizing,
                convergence,
                characteristics,
                cost,
                horizontal_tail_area_m2: configuration.horizontal_tail_area_m2(),
                vertical_tail_area_m2: configuration.vertical_tail_area_m2(),
                cruise_propellers: configuration.propellers.count,
                vtol_rotors: configuration.rotors.count,
                wheels: configuration.wheels.as_ref().map(|w| w.count()).unwrap_or(0),
                components: &configuration.mass.components,
                warnings: &configuration.warnings,
            }
        }
    }

    pub fn write_summary(path: &Path, summary: &DesignSummary<'_>) -> Result<(), ExportError> {
        let writer = super::writer_for_path(path)?;
        to_writer_pretty(writer, summary)?;
        Ok(())
    }
}

pub mod history {
    use std::path::Path;

    use pav_sizing::ScanRecord;

    use super::ExportError;

    /// Write every scan sample as CSV with a header row.
    pub fn write_scan_history(path: &Path, records: &[ScanRecord]) -> Result<(), ExportError> {
        let mut writer = csv::Writer::from_writer(super::writer_for_path(path)?);
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pav_config::QualityLevel;

    use super::invoice::{format_money, render};
    use super::pricing::{Characteristics, estimate};

    fn business_four_seater(wheels_included: bool) -> Characteristics {
        Characteristics {
            passengers: 4,
            baggage_allowance_kg: 120.0,
            range_km: 200.0,
            cruise_velocity_kmh: 300.0,
            battery_energy_kwh: 150.0,
            quality: QualityLevel::Business,
            wheels_included,
            wing_span_m: 10.0,
            fuselage_length_m: 5.05,
            primary_colour: "White".to_string(),
            secondary_colour: "blue".to_string(),
        }
    }

    #[test]
    fn money_uses_thousands_separators() {
        assert_eq!(format_money(0.0), "$0.00");
        assert_eq!(format_money(999.5), "$999.50");
        assert_eq!(format_money(1_234_567.891), "$1,234,567.89");
    }

    #[test]
    fn estimate_itemises_surcharges() {
        let cost = estimate(&business_four_seater(true));
        assert!((cost.base - 39_510.0).abs() < 1e-6);
        assert_eq!(cost.cabin, 4_000.0);
        assert_eq!(cost.wheels, 3_000.0);
        assert_eq!(cost.primary_colour, 0.0);
        assert_eq!(cost.secondary_colour, 250.0);
        assert!((cost.total - 46_760.0).abs() < 1e-6);
    }

    #[test]
    fn wheels_line_only_when_included() {
        let issued = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();

        let with = business_four_seater(true);
        let text = render("demo", &with, &estimate(&with), issued);
        assert!(text.contains("Date: 16-10-2026"));
        assert!(text.contains("Additional cost for wheels"));
        assert!(text.contains("$46,760.00"));
        assert!(text.contains("Secondary colour:"));
        assert!(text.contains("Blue"));

        let without = business_four_seater(false);
        let cost = estimate(&without);
        assert_eq!(cost.wheels, 0.0);
        let text = render("demo", &without, &cost, issued);
        assert!(!text.contains("Additional cost for wheels"));
        assert!(text.contains("$43,760.00"));
    }

    #[test]
    fn scan_history_has_header_and_one_row_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("scan_history.csv");
        let record = pav_sizing::ScanRecord {
            iteration: 1,
            position: 0.3,
            horizontal_tail_area_m2: 2.0,
            vertical_tail_area_m2: 0.5,
            combined_area_m2: 2.5,
            resulting_mass_n: 20_000.0,
            resulting_cg_x_m: 2.1,
            resulting_cg_y_m: 0.0,
            resulting_cg_z_m: 0.2,
            selected: true,
        };
        super::history::write_scan_history(&path, &[record.clone(), record]).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert!(lines.next().unwrap().starts_with("iteration,position,"));
        assert_eq!(lines.count(), 2);
    }
}
