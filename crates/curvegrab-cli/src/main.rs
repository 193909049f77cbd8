//! curvegrab CLI — digitize plotted curves from images.

use clap::{Args, Parser, Subcommand, ValueEnum};
use curvegrab::{
    fit_curve, render, AxisScales, BrushAction, BrushStroke, CalibrationInput, CurveSample,
    ExportFormat, FilterMode, PixelPoint, SessionConfig, Variable, MAX_ORDER,
};
use std::path::{Path, PathBuf};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "curvegrab")]
#[command(about = "Calibrate plot axes, extract a curve from an image and fit a polynomial to it")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the axis frame derived from a calibration file.
    Calibrate {
        /// Calibration JSON (axis points and graph values).
        #[arg(long)]
        calibration: PathBuf,
    },

    /// Convert derotated pixel positions into graph coordinates.
    Map(CliMapArgs),

    /// Derotate, filter, extract, map and fit a curve from an image.
    Extract(CliExtractArgs),

    /// Fit a polynomial to graph points read from a CSV file.
    Fit(CliFitArgs),
}

#[derive(Debug, Clone, Args)]
struct CliScaleArgs {
    /// Treat the x axis as logarithmic (base 10).
    #[arg(long)]
    x_log: bool,

    /// Treat the y axis as logarithmic (base 10).
    #[arg(long)]
    y_log: bool,
}

impl CliScaleArgs {
    /// `None` when neither flag is set, so config-file scales stay in effect.
    fn to_core(&self) -> Option<AxisScales> {
        if self.x_log || self.y_log {
            Some(AxisScales::from_lin_flags(!self.x_log, !self.y_log))
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Args)]
struct CliMapArgs {
    /// Calibration JSON (axis points and graph values).
    #[arg(long)]
    calibration: PathBuf,

    /// Pixel position as `x,y` (repeatable).
    #[arg(long = "pixel", value_parser = parse_pixel, required = true)]
    pixels: Vec<PixelPoint>,

    #[command(flatten)]
    scales: CliScaleArgs,
}

#[derive(Debug, Clone, Args)]
struct CliFitParams {
    /// Polynomial order (0..=5).
    #[arg(long)]
    order: Option<usize>,

    /// Independent variable of the polynomial.
    #[arg(long, value_enum)]
    independent: Option<VariableArg>,

    /// Print the fit in this text format.
    #[arg(long, value_enum)]
    format: Option<FormatArg>,
}

#[derive(Debug, Clone, Args)]
struct CliExtractArgs {
    /// Path to the input image.
    #[arg(long)]
    image: PathBuf,

    /// Calibration JSON (axis points and graph values).
    #[arg(long)]
    calibration: PathBuf,

    /// Session configuration JSON; CLI flags override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Curve isolation filter.
    #[arg(long, value_enum)]
    filter: Option<FilterArg>,

    /// Threshold level for `--filter threshold`.
    #[arg(long, default_value_t = 127)]
    level: u8,

    /// Canny low hysteresis threshold.
    #[arg(long, default_value_t = 50.0)]
    canny_low: f32,

    /// Canny high hysteresis threshold.
    #[arg(long, default_value_t = 150.0)]
    canny_high: f32,

    /// Select brush stamp as `x,y` or `x,y,r` (repeatable). Without any
    /// brush every contour pixel is used.
    #[arg(long = "brush", value_parser = parse_brush)]
    brushes: Vec<BrushArg>,

    /// Erase brush stamp as `x,y` or `x,y,r` (repeatable), applied after
    /// all select stamps.
    #[arg(long = "erase", value_parser = parse_brush)]
    erases: Vec<BrushArg>,

    /// Path to write the extraction report (JSON).
    #[arg(long)]
    out: PathBuf,

    /// Path to write the derotated image (PNG), with the projected axis points marked.
    #[arg(long)]
    derotated: Option<PathBuf>,

    #[command(flatten)]
    scales: CliScaleArgs,

    #[command(flatten)]
    fit: CliFitParams,
}

#[derive(Debug, Clone, Args)]
struct CliFitArgs {
    /// CSV with `x, y` columns; a non-numeric first line is a header.
    #[arg(long)]
    points: PathBuf,

    /// Path to write the fit (JSON). Printed to stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,

    #[command(flatten)]
    scales: CliScaleArgs,

    #[command(flatten)]
    fit: CliFitParams,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum VariableArg {
    X,
    Y,
}

impl VariableArg {
    fn to_core(self) -> Variable {
        match self {
            Self::X => Variable::X,
            Self::Y => Variable::Y,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FilterArg {
    None,
    Canny,
    Threshold,
    AdaptiveMean,
    AdaptiveGaussian,
    Otsu,
    OtsuGaussian,
}

impl FilterArg {
    fn to_core(self, args: &CliExtractArgs) -> FilterMode {
        match self {
            Self::None => FilterMode::None,
            Self::Canny => FilterMode::Canny {
                low: args.canny_low,
                high: args.canny_high,
            },
            Self::Threshold => FilterMode::GlobalThreshold { level: args.level },
            Self::AdaptiveMean => FilterMode::AdaptiveMean,
            Self::AdaptiveGaussian => FilterMode::AdaptiveGaussian,
            Self::Otsu => FilterMode::Otsu,
            Self::OtsuGaussian => FilterMode::OtsuGaussian,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Matlab,
    Python,
    Markdown,
    Latex,
    Excel,
    ExcelComma,
    PointsMatlab,
    PointsPython,
    PointsNumpy,
    PointsCsv,
    CoeffsMatlab,
    CoeffsPython,
    CoeffsNumpy,
    Poly1d,
}

impl FormatArg {
    fn to_core(self) -> ExportFormat {
        match self {
            Self::Matlab => ExportFormat::EquationMatlab,
            Self::Python => ExportFormat::EquationPython,
            Self::Markdown => ExportFormat::EquationMarkdown,
            Self::Latex => ExportFormat::EquationLatex,
            Self::Excel => ExportFormat::EquationExcelLambdaPoint,
            Self::ExcelComma => ExportFormat::EquationExcelLambdaComma,
            Self::PointsMatlab => ExportFormat::PointsMatlab,
            Self::PointsPython => ExportFormat::PointsPython,
            Self::PointsNumpy => ExportFormat::PointsNumpy,
            Self::PointsCsv => ExportFormat::PointsCsv,
            Self::CoeffsMatlab => ExportFormat::CoeffsMatlab,
            Self::CoeffsPython => ExportFormat::CoeffsPython,
            Self::CoeffsNumpy => ExportFormat::CoeffsNumpy,
            Self::Poly1d => ExportFormat::Poly1d,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct BrushArg {
    x: i32,
    y: i32,
    radius: Option<u32>,
}

impl BrushArg {
    fn to_core(self, action: BrushAction, default_radius: u32) -> BrushStroke {
        BrushStroke {
            x: self.x,
            y: self.y,
            radius: self.radius.unwrap_or(default_radius),
            action,
        }
    }
}

fn parse_pixel(s: &str) -> Result<PixelPoint, String> {
    let parts = split_ints(s)?;
    match parts[..] {
        [x, y] => Ok(PixelPoint::new(x, y)),
        _ => Err(format!("expected `x,y`, got '{}'", s)),
    }
}

fn parse_brush(s: &str) -> Result<BrushArg, String> {
    let parts = split_ints(s)?;
    match parts[..] {
        [x, y] => Ok(BrushArg { x, y, radius: None }),
        [x, y, r] if r > 0 => Ok(BrushArg {
            x,
            y,
            radius: Some(r as u32),
        }),
        _ => Err(format!("expected `x,y` or `x,y,r` with r > 0, got '{}'", s)),
    }
}

fn split_ints(s: &str) -> Result<Vec<i32>, String> {
    s.split(',')
        .map(|p| {
            p.trim()
                .parse::<i32>()
                .map_err(|e| format!("invalid integer '{}': {}", p.trim(), e))
        })
        .collect()
}

impl CliFitParams {
    fn apply(&self, config: &mut SessionConfig) -> CliResult<()> {
        if let Some(order) = self.order {
            if order > MAX_ORDER {
                return Err(format!("--order must be in 0..={}, got {}", MAX_ORDER, order).into());
            }
            config.fit.order = order;
        }
        if let Some(independent) = self.independent {
            config.fit.independent = independent.to_core();
        }
        Ok(())
    }
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Calibrate { calibration } => run_calibrate(&calibration),
        Commands::Map(args) => run_map(&args),
        Commands::Extract(args) => run_extract(&args),
        Commands::Fit(args) => run_fit(&args),
    }
}

// ── calibrate ──────────────────────────────────────────────────────────

fn run_calibrate(path: &Path) -> CliResult<()> {
    let input = CalibrationInput::from_json_file(path)?;
    let frame = input.frame()?;

    tracing::info!(
        "Axis angle {:.3} deg, origin ({:.2}, {:.2})",
        frame.angle().to_degrees(),
        frame.origin()[0],
        frame.origin()[1]
    );

    let report = serde_json::json!({
        "angle_rad": frame.angle(),
        "angle_deg": frame.angle().to_degrees(),
        "origin": frame.origin(),
        "x_extent": frame.x_extent(),
        "y_extent": frame.y_extent(),
        "projected_points": frame.projected_points(),
        "skew_disagreement_rad": frame.skew_disagreement(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

// ── map ────────────────────────────────────────────────────────────────

fn run_map(args: &CliMapArgs) -> CliResult<()> {
    let input = CalibrationInput::from_json_file(&args.calibration)?;
    let scales = args.scales.to_core().unwrap_or_default();
    let mapper = input.mapper(scales)?;

    let mut rows = Vec::with_capacity(args.pixels.len());
    for &p in &args.pixels {
        let graph = mapper.pixel_to_graph(p)?;
        rows.push(serde_json::json!({ "pixel": [p.x, p.y], "graph": graph }));
    }
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

// ── extract ────────────────────────────────────────────────────────────

fn run_extract(args: &CliExtractArgs) -> CliResult<()> {
    tracing::info!("Loading image: {}", args.image.display());

    let img = image::open(&args.image).map_err(|e| -> CliError {
        format!("Failed to open image {}: {}", args.image.display(), e).into()
    })?;
    let rgb = img.to_rgb8();
    tracing::info!("Image size: {}x{}", rgb.width(), rgb.height());

    let calibration = CalibrationInput::from_json_file(&args.calibration)?;
    let mut config = match &args.config {
        Some(path) => SessionConfig::from_json_file(path)?,
        None => SessionConfig::default(),
    };
    if let Some(filter) = args.filter {
        config.filter = filter.to_core(args);
    }
    if let Some(scales) = args.scales.to_core() {
        config.scales = scales;
    }
    args.fit.apply(&mut config)?;

    let radius = config.brush_radius_px;
    let strokes: Vec<BrushStroke> = args
        .brushes
        .iter()
        .map(|b| b.to_core(BrushAction::Select, radius))
        .chain(args.erases.iter().map(|b| b.to_core(BrushAction::Erase, radius)))
        .collect();
    if strokes.is_empty() {
        tracing::info!("No brush strokes given; using every contour pixel");
    }

    let out = curvegrab::digitize(&rgb, &calibration, &config, &strokes)?;
    tracing::info!(
        "Fitted order {} polynomial to {} samples, rms={:.3e}",
        out.fit.order,
        out.samples.len(),
        out.fit.rms_residual
    );

    let json = serde_json::to_string_pretty(&out)?;
    std::fs::write(&args.out, &json)?;
    tracing::info!("Results written to {}", args.out.display());

    if let Some(path) = &args.derotated {
        let mut overlay = out.derotated.clone();
        curvegrab::draw_markers(
            &mut overlay,
            &out.frame.projected_points(),
            3,
            image::Rgb([255, 0, 0]),
        );
        overlay.save(path)?;
        tracing::info!("Derotated image written to {}", path.display());
    }

    if let Some(format) = args.fit.format {
        let points: Vec<[f64; 2]> = out.samples.iter().map(|s| [s.x, s.y]).collect();
        println!("{}", render(format.to_core(), &out.fit, &points));
    }
    Ok(())
}

// ── fit ────────────────────────────────────────────────────────────────

fn run_fit(args: &CliFitArgs) -> CliResult<()> {
    let text = std::fs::read_to_string(&args.points)?;
    let samples = parse_csv_points(&text)?;
    tracing::info!("Read {} points from {}", samples.len(), args.points.display());

    let mut config = SessionConfig::default();
    if let Some(scales) = args.scales.to_core() {
        config.scales = scales;
    }
    args.fit.apply(&mut config)?;

    let fit = fit_curve(&samples, &config.fit, config.scales)?;
    let json = serde_json::to_string_pretty(&fit)?;
    match &args.out {
        Some(path) => {
            std::fs::write(path, &json)?;
            tracing::info!("Fit written to {}", path.display());
        }
        None => println!("{}", json),
    }

    if let Some(format) = args.fit.format {
        let points: Vec<[f64; 2]> = samples.iter().map(|s| [s.x, s.y]).collect();
        println!("{}", render(format.to_core(), &fit, &points));
    }
    Ok(())
}

fn parse_csv_points(text: &str) -> CliResult<Vec<CurveSample>> {
    let mut samples = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let parsed: Result<Vec<f64>, _> = fields.iter().map(|f| f.parse::<f64>()).collect();
        match (parsed, fields.len()) {
            (Ok(v), 2) => samples.push(CurveSample::new(v[0], v[1])),
            (Err(_), _) if i == 0 => continue,
            _ => return Err(format!("line {}: expected `x, y`, got '{}'", i + 1, line).into()),
        }
    }
    Ok(samples)
}
