#![cfg(not(tarpaulin_include))]
#![cfg(feature = "web")]
use plotters::prelude::*;

use crate::error::DashboardError;
use crate::record::{RATING_MAX, RATING_MIN};
use crate::view::ChartPoint;

/// Configuration options for the scatter chart
#[derive(Clone, Debug)]
pub struct GraphOptions {
    /// Title displayed at the top of the chart
    pub title: String,

    /// Width of the chart in pixels
    pub width: u32,

    /// Height of the chart in pixels
    pub height: u32,

    /// Marker radius in pixels
    pub marker_size: i32,

    /// Rotation of the 3-D projection around the vertical axis
    pub yaw: f64,
}

impl Default for GraphOptions {
    /// Creates the dashboard's chart configuration
    ///
    /// # Returns
    /// * `GraphOptions` - 800x600 pixels, 8 px markers, a slight yaw
    fn default() -> Self {
        Self {
            title: "Service Ratings".to_string(),
            width: 800,
            height: 600,
            marker_size: 8,
            yaw: 0.5,
        }
    }
}

/// Marker colour for an uncertainty rating, from blue (1) to red (10)
///
/// # Arguments
/// * `value` - Uncertainty rating; values outside 1-10 are clamped
///
/// # Returns
/// * `HSLColor` - Hue interpolated between blue and red
pub fn uncertainty_color(value: u8) -> HSLColor {
    let span = f64::from(RATING_MAX - RATING_MIN);
    let t = (f64::from(value.clamp(RATING_MIN, RATING_MAX) - RATING_MIN)) / span;
    HSLColor((1.0 - t) * 0.66, 0.85, 0.5)
}

/// Renders the chart points as an SVG 3-D scatter plot
///
/// Urgency, resources and regulations are the x, y and z axes. Each marker is
/// coloured by uncertainty and labelled with the service name.
///
/// # Arguments
/// * `points` - Projected chart points, one marker each
/// * `options` - Title, size and projection settings
///
/// # Returns
/// * `Result<String, DashboardError>` - The SVG document, or a render error
///
/// # Examples
/// ```
/// use service_dashboard::graph::{GraphOptions, render_scatter_svg};
/// use service_dashboard::record::{Dataset, ServiceRecord};
/// use service_dashboard::view::project;
///
/// let data = Dataset::new(vec![ServiceRecord::new("X", 3, 7, 2, 9)]);
/// let svg = render_scatter_svg(&project(&data).chart, &GraphOptions::default()).unwrap();
/// assert!(svg.contains("<svg"));
/// ```
pub fn render_scatter_svg(
    points: &[ChartPoint],
    options: &GraphOptions,
) -> Result<String, DashboardError> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (options.width, options.height))
            .into_drawing_area();
        draw_scatter(&root, points, options)?;
        root.present().map_err(render_error)?;
    }
    Ok(svg)
}

fn render_error<E: std::fmt::Display>(e: E) -> DashboardError {
    DashboardError::Render(e.to_string())
}

fn draw_scatter(
    root: &DrawingArea<SVGBackend<'_>, plotters::coord::Shift>,
    points: &[ChartPoint],
    options: &GraphOptions,
) -> Result<(), DashboardError> {
    root.fill(&WHITE).map_err(render_error)?;

    // Axes run one step past the slider range so edge markers stay visible.
    let axis = f64::from(RATING_MIN - 1)..f64::from(RATING_MAX + 1);

    let mut chart = ChartBuilder::on(root)
        .caption(&options.title, ("sans-serif", 24).into_font())
        .margin(20)
        .build_cartesian_3d(axis.clone(), axis.clone(), axis)
        .map_err(render_error)?;

    let yaw = options.yaw;
    chart.with_projection(|mut pb| {
        pb.yaw = yaw;
        pb.scale = 0.9;
        pb.into_matrix()
    });

    chart
        .configure_axes()
        .light_grid_style(BLACK.mix(0.15))
        .max_light_lines(3)
        .draw()
        .map_err(render_error)?;

    let marker_size = options.marker_size;
    chart
        .draw_series(points.iter().map(|point| {
            let coord = (f64::from(point.x), f64::from(point.y), f64::from(point.z));
            EmptyElement::at(coord)
                + Circle::new((0, 0), marker_size, uncertainty_color(point.color).filled())
                + Text::new(
                    point.label.clone(),
                    (marker_size + 2, -marker_size),
                    ("sans-serif", 12).into_font(),
                )
        }))
        .map_err(render_error)?;

    Ok(())
}
