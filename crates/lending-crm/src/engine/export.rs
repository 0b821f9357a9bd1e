use std::io::Write;

use super::amortization::AmortizationResult;

const HEADER: [&str; 5] = ["month", "payment", "principal", "interest", "balance"];

/// Write an amortization schedule as CSV, one record per month.
pub fn write_schedule_csv<W: Write>(
    schedule: &AmortizationResult,
    writer: W,
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(HEADER)?;

    for row in &schedule.rows {
        csv_writer.write_record([
            row.month.to_string(),
            format!("{:.2}", row.payment),
            format!("{:.2}", row.principal),
            format!("{:.2}", row.interest),
            format!("{:.2}", row.balance),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}
