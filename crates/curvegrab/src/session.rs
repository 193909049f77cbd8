//! Interactive digitization session.
//!
//! A [`Session`] owns everything one calibration pass needs: the four
//! picked axis points, the coordinate mapper, the raw extracted pixels,
//! their graph-space samples and the current fit. Each parameter change
//! triggers exactly one mapping recomputation and/or one refit.

use crate::fit::{fit_curve, FitConfig, FitError, FitResult, Variable, MAX_ORDER};
use crate::frame::{calibrate_axes, CalibrationError, GraphFrame, PixelPoint};
use crate::mapping::{AxisScales, CoordinateMapper, CurveSample, GraphCoordinates, MappingError};

// ── State & errors ─────────────────────────────────────────────────────────

/// Progress of a session through the digitization workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Initial,
    /// Waiting for the four axis clicks.
    Started,
    /// All four axis points picked; waiting for graph values.
    AxesPicked,
    /// Mapping ready; waiting for a filter choice.
    FilterChoice,
    /// Painting curve pixels.
    EdgeSelection,
    /// At least one fit has been computed.
    Equation,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Initial => "initial",
            Self::Started => "started",
            Self::AxesPicked => "axes-picked",
            Self::FilterChoice => "filter-choice",
            Self::EdgeSelection => "edge-selection",
            Self::Equation => "equation",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    /// Operation not allowed in the current state.
    InvalidState {
        expected: &'static str,
        actual: SessionState,
    },
    Calibration(CalibrationError),
    Mapping(MappingError),
    Fit(FitError),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidState { expected, actual } => {
                write!(f, "session is {}, expected {}", actual, expected)
            }
            Self::Calibration(e) => write!(f, "{}", e),
            Self::Mapping(e) => write!(f, "{}", e),
            Self::Fit(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidState { .. } => None,
            Self::Calibration(e) => Some(e),
            Self::Mapping(e) => Some(e),
            Self::Fit(e) => Some(e),
        }
    }
}

impl From<CalibrationError> for SessionError {
    fn from(e: CalibrationError) -> Self {
        Self::Calibration(e)
    }
}

impl From<MappingError> for SessionError {
    fn from(e: MappingError) -> Self {
        Self::Mapping(e)
    }
}

impl From<FitError> for SessionError {
    fn from(e: FitError) -> Self {
        Self::Fit(e)
    }
}

// ── Session ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct Session {
    state: SessionState,
    axis_points: Vec<PixelPoint>,
    mapper: CoordinateMapper,
    fit_config: FitConfig,
    pixels: Vec<PixelPoint>,
    samples: Vec<CurveSample>,
    fit: Option<FitResult>,
    refits: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session that starts with the given fit parameters.
    pub fn with_fit_config(fit_config: FitConfig) -> Self {
        Self {
            fit_config,
            ..Self::default()
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    pub fn frame(&self) -> Option<&GraphFrame> {
        self.mapper.frame()
    }

    pub fn fit_config(&self) -> &FitConfig {
        &self.fit_config
    }

    /// Axis points picked so far, in X1, X2, Y1, Y2 order.
    pub fn axis_points(&self) -> &[PixelPoint] {
        &self.axis_points
    }

    /// Raw derotated pixels accumulated by [`Self::add_pixels`].
    pub fn pixels(&self) -> &[PixelPoint] {
        &self.pixels
    }

    pub fn samples(&self) -> &[CurveSample] {
        &self.samples
    }

    pub fn fit(&self) -> Option<&FitResult> {
        self.fit.as_ref()
    }

    /// Number of fits computed since the last [`Self::start`].
    pub fn refit_count(&self) -> u64 {
        self.refits
    }

    pub fn scales(&self) -> AxisScales {
        self.mapper.scales()
    }

    /// Reset everything and wait for axis clicks. Fit parameters and axis
    /// scales persist.
    pub fn start(&mut self) {
        *self = Self {
            state: SessionState::Started,
            mapper: CoordinateMapper::with_scales(self.mapper.scales()),
            fit_config: std::mem::take(&mut self.fit_config),
            ..Self::default()
        };
        tracing::info!("session started");
    }

    /// Record the next axis click (X1, X2, Y1, Y2). Returns how many points
    /// are still missing.
    pub fn pick_axis_point(&mut self, p: PixelPoint) -> Result<usize, SessionError> {
        self.require_state(SessionState::Started, "started")?;
        self.axis_points.push(p);
        let remaining = 4 - self.axis_points.len();
        tracing::debug!("axis point {} picked at ({}, {})", self.axis_points.len(), p.x, p.y);
        if remaining == 0 {
            self.state = SessionState::AxesPicked;
        }
        Ok(remaining)
    }

    /// Build the frame from the picked points, apply graph values and
    /// compute the mapping.
    pub fn confirm_calibration(&mut self, coords: GraphCoordinates) -> Result<(), SessionError> {
        self.require_state(SessionState::AxesPicked, "axes-picked")?;
        let pts = &self.axis_points;
        let frame = calibrate_axes([pts[0], pts[1]], [pts[2], pts[3]])?;
        self.mapper = CoordinateMapper::calibrated(frame, coords, self.mapper.scales())?;
        self.state = SessionState::FilterChoice;
        tracing::info!("calibration confirmed");
        Ok(())
    }

    pub fn begin_selection(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::FilterChoice | SessionState::EdgeSelection | SessionState::Equation => {
                self.state = SessionState::EdgeSelection;
                Ok(())
            }
            actual => Err(SessionError::InvalidState {
                expected: "filter-choice",
                actual,
            }),
        }
    }

    /// Map extracted pixels to graph space, append them and refit.
    pub fn add_pixels(&mut self, pixels: &[PixelPoint]) -> Result<&FitResult, SessionError> {
        if !matches!(self.state, SessionState::EdgeSelection | SessionState::Equation) {
            return Err(SessionError::InvalidState {
                expected: "edge-selection",
                actual: self.state,
            });
        }
        let mapped = self.mapper.samples_from_pixels(pixels)?;
        self.pixels.extend_from_slice(pixels);
        self.samples.extend(mapped);
        self.state = SessionState::Equation;
        self.refit()
    }

    /// Drop all extracted pixels, samples and the fit.
    pub fn clear_pixels(&mut self) {
        self.pixels.clear();
        self.samples.clear();
        self.fit = None;
        if self.state == SessionState::Equation {
            self.state = SessionState::EdgeSelection;
        }
    }

    /// Change axis scales: one mapping recompute, re-map of the raw
    /// pixels, then one refit when samples exist.
    ///
    /// If the new scales cannot be calibrated the previous scales, samples
    /// and fit are kept.
    pub fn set_scales(&mut self, scales: AxisScales) -> Result<(), SessionError> {
        let previous = self.mapper.scales();
        if let Err(e) = self.mapper.set_scales(scales) {
            tracing::warn!("rejected axis scales {:?}: {}", scales, e);
            self.mapper.set_scales(previous)?;
            return Err(e.into());
        }
        if self.mapper.is_calibrated() {
            self.samples = self.mapper.samples_from_pixels(&self.pixels)?;
        }
        self.refit_if_ready()
    }

    pub fn set_lin_log(&mut self, x_is_lin: bool, y_is_lin: bool) -> Result<(), SessionError> {
        self.set_scales(AxisScales::from_lin_flags(x_is_lin, y_is_lin))
    }

    pub fn set_order(&mut self, order: usize) -> Result<(), SessionError> {
        if order > MAX_ORDER {
            return Err(FitError::OrderOutOfRange {
                order,
                max: MAX_ORDER,
            }
            .into());
        }
        self.fit_config.order = order;
        self.refit_if_ready()
    }

    pub fn set_independent(&mut self, independent: Variable) -> Result<(), SessionError> {
        self.fit_config.independent = independent;
        self.refit_if_ready()
    }

    fn refit_if_ready(&mut self) -> Result<(), SessionError> {
        if self.samples.is_empty() {
            return Ok(());
        }
        self.refit().map(|_| ())
    }

    fn refit(&mut self) -> Result<&FitResult, SessionError> {
        self.fit = None;
        if !self.mapper.is_calibrated() {
            return Err(MappingError::NotCalibrated.into());
        }
        let fit = fit_curve(&self.samples, &self.fit_config, self.mapper.scales())?;
        self.refits += 1;
        tracing::info!(
            "refit #{}: order {} over {} samples",
            self.refits,
            fit.order,
            self.samples.len()
        );
        Ok(&*self.fit.insert(fit))
    }

    fn require_state(&self, state: SessionState, name: &'static str) -> Result<(), SessionError> {
        if self.state == state {
            Ok(())
        } else {
            Err(SessionError::InvalidState {
                expected: name,
                actual: self.state,
            })
        }
    }
}
