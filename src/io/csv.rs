/*!
# I/O Utilities for Saving a Trace to CSV

Writes the accepted chain and the rejected log as two CSV files. Enable via the `csv` feature.
*/

use std::error::Error;
use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::distributions::Point;
use crate::metropolis::Rejection;

/**
Saves the accepted chain with header `step,x,y`, one row per point in chain order.

# Examples

```rust
use mini_metropolis::distributions::Point;
use mini_metropolis::io::csv::save_accepted_csv;

let points = [Point::new(0.3, 0.7), Point::new(-0.1, 0.2)];
save_accepted_csv(&points, "/tmp/accepted.csv").expect("Expecting saving data to succeed");
```
*/
pub fn save_accepted_csv<P: AsRef<Path>>(
    accepted: &[Point],
    filename: P,
) -> Result<(), Box<dyn Error>> {
    let mut wtr = Writer::from_writer(File::create(filename)?);
    wtr.write_record(["step", "x", "y"])?;
    for (i, p) in accepted.iter().enumerate() {
        wtr.write_record(&[i.to_string(), p.x.to_string(), p.y.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Saves the rejected log with header `step,from_x,from_y,to_x,to_y`.
pub fn save_rejected_csv<P: AsRef<Path>>(
    rejected: &[Rejection],
    filename: P,
) -> Result<(), Box<dyn Error>> {
    let mut wtr = Writer::from_writer(File::create(filename)?);
    wtr.write_record(["step", "from_x", "from_y", "to_x", "to_y"])?;
    for (i, r) in rejected.iter().enumerate() {
        wtr.write_record(&[
            i.to_string(),
            r.current.x.to_string(),
            r.current.y.to_string(),
            r.proposed.x.to_string(),
            r.proposed.y.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Saves both sequences as `accepted.csv` and `rejected.csv` inside `dir`.
pub fn save_trace_csv<P: AsRef<Path>>(
    accepted: &[Point],
    rejected: &[Rejection],
    dir: P,
) -> Result<(), Box<dyn Error>> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    save_accepted_csv(accepted, dir.join("accepted.csv"))?;
    save_rejected_csv(rejected, dir.join("rejected.csv"))?;
    Ok(())
}
