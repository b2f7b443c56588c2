//! Reading raw film rows from CSV.
//!
//! Headers are matched by name (`Id`, `Title`, `Overview`, `Runtime`,
//! `Tagline`, `Revenue`, `VoteAverage`, `ReleaseDate`, or their snake_case
//! forms); unknown columns are ignored and missing ones read as empty.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::info;

use crate::error::{MarqueeError, Result};
use crate::film::RawFilmRecord;

/// Read every row of a CSV file.
pub fn read_films_from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<RawFilmRecord>> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| MarqueeError::ingest(format!("cannot open {}: {e}", path.display())))?;
    let records = read_films(file)?;
    info!("read {} film rows from {}", records.len(), path.display());
    Ok(records)
}

/// Read every row of CSV data from `reader`.
pub fn read_films<R: Read>(reader: R) -> Result<Vec<RawFilmRecord>> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let mut records = Vec::new();
    for row in csv.deserialize() {
        records.push(row?);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_pascal_case_headers() {
        let data = "\
Id,Title,Overview,Runtime,Tagline,Revenue,VoteAverage,ReleaseDate,Popularity
438631,Dune,\"Paul Atreides, a brilliant young man\",155,Beyond fear,402027830,8.0,2021-09-15,99.1
";
        let rows = read_films(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "438631");
        assert_eq!(rows[0].overview, "Paul Atreides, a brilliant young man");
        assert_eq!(rows[0].vote_average, "8.0");
        assert_eq!(rows[0].release_date, "2021-09-15");
    }

    #[test]
    fn test_reads_snake_case_and_missing_columns() {
        let data = "id,title,runtime,vote_average\n1,Alien,abc,\n";
        let rows = read_films(data.as_bytes()).unwrap();
        assert_eq!(rows[0].title, "Alien");
        assert_eq!(rows[0].runtime, "abc");
        assert_eq!(rows[0].tagline, "");
        assert_eq!(rows[0].release_date, "");
    }

    #[test]
    fn test_missing_file() {
        let err = read_films_from_csv("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, MarqueeError::Ingest(_)));
    }
}
