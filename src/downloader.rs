#![cfg(not(tarpaulin_include))]

use crate::record::Dataset;

/// Column headers shared by every export format.
pub const EXPORT_HEADERS: [&str; 5] = [
    "service",
    "urgency",
    "resources",
    "regulations",
    "uncertainty",
];

/// Convert the dataset to CSV
///
/// One header row followed by one row per record, in dataset order. Service
/// names containing commas, quotes or newlines are quoted.
///
/// # Arguments
/// * `dataset` - Records to export
///
/// # Returns
/// * `String` - CSV content
///
/// # Examples
/// ```
/// use service_dashboard::downloader::to_csv;
/// use service_dashboard::record::{Dataset, ServiceRecord};
///
/// let data = Dataset::new(vec![ServiceRecord::new("X", 3, 7, 2, 9)]);
/// assert_eq!(to_csv(&data), "service,urgency,resources,regulations,uncertainty\nX,3,7,2,9\n");
/// ```
pub fn to_csv(dataset: &Dataset) -> String {
    let mut csv_content = EXPORT_HEADERS.join(",");
    csv_content.push('\n');

    for record in dataset {
        csv_content.push_str(&escape_field(&record.name));
        for value in record.ratings() {
            csv_content.push(',');
            csv_content.push_str(&value.to_string());
        }
        csv_content.push('\n');
    }

    csv_content
}

fn escape_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Convert the dataset to an XLSX workbook with a single sheet
///
/// Ratings are written as numbers so they stay sortable in a spreadsheet.
///
/// # Arguments
/// * `dataset` - Records to export
///
/// # Returns
/// * `Result<Vec<u8>, DashboardError>` - Workbook bytes or an export error
#[cfg(feature = "web")]
pub fn to_xlsx(dataset: &Dataset) -> Result<Vec<u8>, crate::error::DashboardError> {
    use crate::error::DashboardError;
    use rust_xlsxwriter::Workbook;

    let export = |e: rust_xlsxwriter::XlsxError| DashboardError::Export(e.to_string());

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, header) in EXPORT_HEADERS.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header).map_err(export)?;
    }

    for (row, record) in dataset.records().iter().enumerate() {
        let row = row as u32 + 1;
        worksheet
            .write_string(row, 0, record.name.as_str())
            .map_err(export)?;
        for (col, value) in record.ratings().iter().enumerate() {
            worksheet
                .write_number(row, col as u16 + 1, f64::from(*value))
                .map_err(export)?;
        }
    }

    workbook.save_to_buffer().map_err(export)
}
