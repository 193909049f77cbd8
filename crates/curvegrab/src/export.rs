//! Text renderings of a fit for pasting into other tools.

use serde::{Deserialize, Serialize};

use crate::fit::FitResult;

/// Output dialect for [`render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    EquationMatlab,
    EquationPython,
    EquationMarkdown,
    EquationLatex,
    EquationExcelLambdaPoint,
    EquationExcelLambdaComma,
    PointsMatlab,
    PointsPython,
    PointsNumpy,
    PointsCsv,
    CoeffsMatlab,
    CoeffsPython,
    CoeffsNumpy,
    Poly1d,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 14] = [
        Self::EquationMatlab,
        Self::EquationPython,
        Self::EquationMarkdown,
        Self::EquationLatex,
        Self::EquationExcelLambdaPoint,
        Self::EquationExcelLambdaComma,
        Self::PointsMatlab,
        Self::PointsPython,
        Self::PointsNumpy,
        Self::PointsCsv,
        Self::CoeffsMatlab,
        Self::CoeffsPython,
        Self::CoeffsNumpy,
        Self::Poly1d,
    ];
}

/// Render `fit` (and the extracted `points`, for point dialects).
pub fn render(format: ExportFormat, fit: &FitResult, points: &[[f64; 2]]) -> String {
    let var = fit.independent.name();
    let coeffs = &fit.coefficients;
    match format {
        ExportFormat::EquationMatlab => equation(coeffs, |c| c.to_string(), |o| power(var, "*", ".^", o, "")),
        ExportFormat::EquationPython => {
            equation(coeffs, |c| c.to_string(), |o| power(var, "*", "**(", o, ")"))
        }
        ExportFormat::EquationMarkdown => equation(
            coeffs,
            |c| sci(c, 2),
            |o| power(var, "", "<sup>", o, "</sup>"),
        ),
        ExportFormat::EquationLatex => format!(
            "${}$",
            equation(coeffs, |c| format!("{:.1}", c), |o| power(var, "", "^{", o, "}"))
        ),
        ExportFormat::EquationExcelLambdaPoint => format!(
            "=LAMBDA([{}], {})",
            var,
            equation(coeffs, |c| c.to_string(), |o| power(var, "*", "^(", o, ")"))
        ),
        ExportFormat::EquationExcelLambdaComma => format!(
            "=LAMBDA([{}]; {})",
            var,
            equation(coeffs, |c| c.to_string(), |o| power(var, "*", "^(", o, ")"))
        )
        .replace('.', ","),
        ExportFormat::PointsMatlab => format!(
            "x = [{}];\ny = [{}];",
            join(points.iter().map(|p| p[0]), " "),
            join(points.iter().map(|p| p[1]), " ")
        ),
        ExportFormat::PointsPython => format!(
            "x = [{}];\ny = [{}];",
            join(points.iter().map(|p| p[0]), ", "),
            join(points.iter().map(|p| p[1]), ", ")
        ),
        ExportFormat::PointsNumpy => format!(
            "pts = np.array([[{}], [{}]])",
            join(points.iter().map(|p| p[0]), ", "),
            join(points.iter().map(|p| p[1]), ", ")
        ),
        ExportFormat::PointsCsv => {
            let mut text = String::from("x, y\n");
            for p in points {
                text.push_str(&format!("{}, {}\n", p[0], p[1]));
            }
            text
        }
        ExportFormat::CoeffsMatlab => format!("[{}]", join(coeffs.iter().copied(), " ")),
        ExportFormat::CoeffsPython => format!("[{}]", join(coeffs.iter().copied(), ", ")),
        ExportFormat::CoeffsNumpy => format!("np.array([{}])", join(coeffs.iter().copied(), ", ")),
        ExportFormat::Poly1d => format!("p = np.poly1d([{}])", join(coeffs.iter().copied(), ", ")),
    }
}

/// Sum of terms, leading coefficient signed, later ones as ` + |c|` / ` - |c|`.
fn equation(
    coeffs: &[f64],
    num: impl Fn(f64) -> String,
    pow: impl Fn(usize) -> String,
) -> String {
    let order = coeffs.len().saturating_sub(1);
    let mut out = String::new();
    for (i, &c) in coeffs.iter().enumerate() {
        let o = order - i;
        if i == 0 {
            out.push_str(&num(c));
        } else {
            let sign = if c < 0.0 { '-' } else { '+' };
            out.push_str(&format!(" {} {}", sign, num(c.abs())));
        }
        out.push_str(&pow(o));
    }
    out
}

/// Power suffix: nothing for `o == 0`, `{mul}{var}` for 1, otherwise
/// `{mul}{var}{open}{o}{close}`.
fn power(var: &str, mul: &str, open: &str, o: usize, close: &str) -> String {
    match o {
        0 => String::new(),
        1 => format!("{}{}", mul, var),
        _ => format!("{}{}{}{}{}", mul, var, open, o, close),
    }
}

/// Scientific notation with a signed two-digit exponent (`1.23e+04`).
fn sci(v: f64, digits: usize) -> String {
    let s = format!("{:.*e}", digits, v);
    match s.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exp),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => s,
    }
}

fn join(values: impl Iterator<Item = f64>, sep: &str) -> String {
    values.map(|v| v.to_string()).collect::<Vec<_>>().join(sep)
}
