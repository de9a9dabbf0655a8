//! The assessment command: wire the live data sources and score one point.

use std::io::Write;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use camino::Utf8PathBuf;
use clap::Parser;
use geo::Coord;
use log::debug;

use heliosite_core::{FeatureCategory, SubCriterion};
use heliosite_data::{
    ElevationClient, ElevationClientConfig, FetchCache, NearestFeatureResolver, OverpassClient,
    OverpassClientConfig, PowerClient, PowerClientConfig,
};
use heliosite_scorer::{ManualOverrides, ScoringEngine, SiteAssessment, SiteSources};

use crate::CliError;
use crate::session::SessionFile;

/// CLI arguments for a one-shot assessment.
#[derive(Debug, Clone, Parser)]
pub(crate) struct AssessArgs {
    /// Latitude of the candidate site, degrees.
    #[arg(value_name = "lat")]
    latitude: f64,
    /// Longitude of the candidate site, degrees.
    #[arg(value_name = "lon")]
    longitude: f64,
    /// Path to a JSON session file carrying weights, calibration, and
    /// overrides.
    #[arg(long, value_name = "path")]
    session: Option<Utf8PathBuf>,
    /// Override a normalized value, e.g. `--set land-cost=0.7`. Repeatable;
    /// takes precedence over session-file overrides.
    #[arg(long = "set", value_name = "sub-criterion=value")]
    set: Vec<String>,
    /// Per-field fetch timeout in seconds.
    #[arg(long, value_name = "secs", default_value_t = 25)]
    timeout_secs: u64,
    /// Emit the assessment as JSON instead of the text report.
    #[arg(long)]
    json: bool,
}

/// Resolved assessment configuration.
#[derive(Debug)]
struct AssessConfig {
    point: Coord<f64>,
    session: SessionFile,
    overrides: ManualOverrides,
    fetch_timeout: Duration,
    json: bool,
}

impl TryFrom<AssessArgs> for AssessConfig {
    type Error = CliError;

    fn try_from(args: AssessArgs) -> Result<Self, Self::Error> {
        validate_coordinate("latitude", args.latitude, 90.0)?;
        validate_coordinate("longitude", args.longitude, 180.0)?;

        let session = match &args.session {
            Some(path) => SessionFile::load(path)?,
            None => SessionFile::default(),
        };

        let mut overrides = ManualOverrides::new();
        for (&sub, raw) in &session.overrides {
            overrides.set(sub, raw.clone());
        }
        for entry in &args.set {
            let (sub, raw) = parse_override(entry)?;
            overrides.set(sub, raw);
        }

        Ok(Self {
            point: Coord {
                x: args.longitude,
                y: args.latitude,
            },
            session,
            overrides,
            fetch_timeout: Duration::from_secs(args.timeout_secs),
            json: args.json,
        })
    }
}

fn validate_coordinate(axis: &'static str, value: f64, limit: f64) -> Result<(), CliError> {
    if value.is_finite() && (-limit..=limit).contains(&value) {
        Ok(())
    } else {
        Err(CliError::CoordinateOutOfRange {
            axis,
            value,
            lo: -limit,
            hi: limit,
        })
    }
}

/// Split a `--set` argument into its sub-criterion and raw value.
///
/// The value half is deliberately not parsed here; the scorer tolerates
/// unparseable overrides by keeping the automatic value.
fn parse_override(entry: &str) -> Result<(SubCriterion, String), CliError> {
    let Some((name, raw)) = entry.split_once('=') else {
        return Err(CliError::MalformedOverride {
            entry: entry.to_owned(),
        });
    };
    let sub =
        SubCriterion::from_str(name.trim()).map_err(|source| CliError::UnknownSubCriterion {
            entry: entry.to_owned(),
            source,
        })?;
    Ok((sub, raw.trim().to_owned()))
}

pub(crate) fn run_assess(args: AssessArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = AssessConfig::try_from(args)?;
    debug!(
        "assessing ({:.5}, {:.5}) with {} override(s), {}s fetch timeout",
        config.point.y,
        config.point.x,
        config.overrides.len(),
        config.fetch_timeout.as_secs()
    );
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    let assessment = runtime.block_on(execute(&config))?;

    if config.json {
        let json =
            serde_json::to_string_pretty(&assessment).map_err(CliError::SerializeAssessment)?;
        writeln!(writer, "{json}").map_err(CliError::WriteReport)?;
    } else {
        write_report(writer, &assessment).map_err(CliError::WriteReport)?;
    }
    Ok(())
}

/// Build the live source stack and assess the configured point.
async fn execute(config: &AssessConfig) -> Result<SiteAssessment, CliError> {
    let cache = Arc::new(FetchCache::default());
    let timeout = config.fetch_timeout;

    let power = PowerClient::with_config(
        Arc::clone(&cache),
        PowerClientConfig::default().with_timeout(timeout),
    )?;
    let elevation = ElevationClient::with_config(
        Arc::clone(&cache),
        ElevationClientConfig {
            timeout,
            ..ElevationClientConfig::default()
        },
    )?;
    let overpass = OverpassClient::with_config(
        Arc::clone(&cache),
        OverpassClientConfig {
            timeout,
            ..OverpassClientConfig::default()
        },
    )?;
    let resolver = NearestFeatureResolver::new(overpass.clone());

    let sources = SiteSources {
        irradiance: Arc::new(power),
        slope: Arc::new(elevation),
        features: Arc::new(resolver),
        land_use: Arc::new(overpass),
    };

    let weights = config
        .session
        .weights
        .clone()
        .unwrap_or_default()
        .normalized();
    let calibration = config.session.calibration.clone().unwrap_or_default();
    let engine = ScoringEngine::new(sources)
        .with_weights(weights)
        .with_calibration(calibration)
        .with_fetch_timeout(timeout);

    Ok(engine.assess(config.point, &config.overrides).await)
}

fn fmt_measurement(value: Option<f64>, unit: &str) -> String {
    value.map_or_else(|| "unknown".to_owned(), |v| format!("{v:.2} {unit}"))
}

fn write_report(writer: &mut dyn Write, assessment: &SiteAssessment) -> std::io::Result<()> {
    writeln!(
        writer,
        "Site assessment for ({:.5}, {:.5})",
        assessment.latitude, assessment.longitude
    )?;
    writeln!(writer)?;
    writeln!(writer, "Raw measurements:")?;
    writeln!(
        writer,
        "  {:<22} {}",
        "irradiance",
        fmt_measurement(assessment.raw_layer.irradiance, "kWh/m\u{b2}/day")
    )?;
    writeln!(
        writer,
        "  {:<22} {}",
        "slope",
        fmt_measurement(assessment.raw_layer.slope_deg, "deg")
    )?;
    for category in FeatureCategory::ALL {
        writeln!(
            writer,
            "  {:<22} {}",
            category.label(),
            fmt_measurement(assessment.raw_layer.distance_km(category), "km")
        )?;
    }
    writeln!(
        writer,
        "  {:<22} {}",
        "land use",
        assessment.raw_layer.land_use.as_deref().unwrap_or("unknown")
    )?;
    writeln!(writer)?;
    writeln!(writer, "Normalized values:")?;
    for sub in SubCriterion::ALL {
        writeln!(
            writer,
            "  {:<26} {:.3}",
            sub.label(),
            assessment.site_values.get(sub)
        )?;
    }
    writeln!(writer)?;
    writeln!(writer, "Score: {:.3}", assessment.score)?;
    writeln!(writer, "Recommendation: {}", assessment.recommendation)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use heliosite_core::{RawLayer, Recommendation, SiteValues};

    use super::*;

    fn args(latitude: f64, longitude: f64) -> AssessArgs {
        AssessArgs {
            latitude,
            longitude,
            session: None,
            set: Vec::new(),
            timeout_secs: 25,
            json: false,
        }
    }

    #[rstest]
    #[case("slope=0.7", SubCriterion::Slope, "0.7")]
    #[case(" land-cost = 0.5 ", SubCriterion::LandCost, "0.5")]
    #[case("population-density=dense", SubCriterion::PopulationDensity, "dense")]
    fn parses_well_formed_overrides(
        #[case] entry: &str,
        #[case] expected_sub: SubCriterion,
        #[case] expected_raw: &str,
    ) {
        let (sub, raw) = parse_override(entry).expect("should parse");
        assert_eq!(sub, expected_sub);
        assert_eq!(raw, expected_raw);
    }

    #[rstest]
    fn rejects_override_without_separator() {
        let err = parse_override("slope0.7").expect_err("should fail");
        assert!(matches!(err, CliError::MalformedOverride { .. }));
    }

    #[rstest]
    fn rejects_unknown_sub_criterion() {
        let err = parse_override("steepness=0.7").expect_err("should fail");
        assert!(matches!(err, CliError::UnknownSubCriterion { .. }));
    }

    #[rstest]
    #[case(91.0, 0.0)]
    #[case(-91.0, 0.0)]
    #[case(0.0, 181.0)]
    #[case(0.0, -181.0)]
    fn rejects_out_of_range_coordinates(#[case] latitude: f64, #[case] longitude: f64) {
        let err = AssessConfig::try_from(args(latitude, longitude)).expect_err("should fail");
        assert!(matches!(err, CliError::CoordinateOutOfRange { .. }));
    }

    #[rstest]
    fn cli_overrides_take_precedence_over_session() {
        use std::io::Write as _;

        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        file.write_all(br#"{"overrides": {"slope": "0.1", "land-cost": "0.4"}}"#)
            .expect("write session");
        let path =
            Utf8PathBuf::from_path_buf(file.path().to_path_buf()).expect("utf-8 path");

        let mut cli_args = args(22.7, 75.9);
        cli_args.session = Some(path);
        cli_args.set = vec!["slope=0.9".to_owned()];

        let config = AssessConfig::try_from(cli_args).expect("should resolve");

        assert_eq!(config.overrides.parsed(SubCriterion::Slope), Some(0.9));
        assert_eq!(config.overrides.parsed(SubCriterion::LandCost), Some(0.4));
    }

    #[rstest]
    fn report_lists_every_field() {
        let assessment = SiteAssessment {
            latitude: 22.7,
            longitude: 75.9,
            raw_layer: RawLayer {
                irradiance: Some(5.2),
                ..RawLayer::default()
            },
            site_values: SiteValues::new().with_value(SubCriterion::SolarRadiation, 0.55),
            score: 0.55,
            recommendation: Recommendation::MarginallySuitable,
        };

        let mut buffer = Vec::new();
        write_report(&mut buffer, &assessment).expect("report should write");
        let report = String::from_utf8(buffer).expect("utf-8 report");

        assert!(report.contains("5.20 kWh/m\u{b2}/day"));
        assert!(report.contains("slope"));
        assert!(report.contains("unknown"));
        for sub in SubCriterion::ALL {
            assert!(report.contains(sub.label()));
        }
        assert!(report.contains("Score: 0.550"));
        assert!(report.contains("Recommendation: Marginally Suitable"));
    }
}
