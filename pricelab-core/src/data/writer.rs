//! Render a [`Series`] back to the canonical CSV layout the loader reads.

use crate::domain::Series;

/// Write `date,open,high,low,close,volume` rows, dates as `%Y-%m-%d`.
pub fn write_csv(series: &Series) -> Result<String, csv::Error> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "open", "high", "low", "close", "volume"])?;
    for p in series.points() {
        wtr.write_record([
            p.date.format("%Y-%m-%d").to_string(),
            p.open.to_string(),
            p.high.to_string(),
            p.low.to_string(),
            p.close.to_string(),
            p.volume.to_string(),
        ])?;
    }
    let data = wtr
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&data).into_owned())
}
