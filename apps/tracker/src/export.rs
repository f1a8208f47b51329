//! CSV export of query results.

use std::io::Write;

use crate::classifier::format_levels;
use crate::models::job::JobView;

pub const CSV_HEADER: [&str; 7] = [
    "Date Added",
    "Company",
    "Title",
    "Location",
    "Level(s)",
    "Status",
    "URL",
];

pub fn write_csv<W: Write>(jobs: &[JobView], writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(CSV_HEADER)?;

    for job in jobs {
        let date_added = job.date_added.format("%Y-%m-%d %H:%M:%S").to_string();
        let levels = format_levels(&job.levels);
        csv_writer.write_record([
            date_added.as_str(),
            job.company.as_str(),
            job.title.as_str(),
            job.location.as_str(),
            levels.as_str(),
            job.status.as_str(),
            job.url.as_str(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

pub fn to_csv_bytes(jobs: &[JobView]) -> Result<Vec<u8>, csv::Error> {
    let mut buffer = Vec::new();
    write_csv(jobs, &mut buffer)?;
    Ok(buffer)
}
