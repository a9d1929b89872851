use std::io::Write;

use chumsai_core::{find_nearby, Coordinate, SearchParams};
use chumsai_source::{fetch_rows_or_empty, CsvSource, DataSource};

fn write_csv(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write csv");
    file
}

#[tokio::test]
async fn csv_rows_feed_the_nearby_search() {
    let file = write_csv(
        "\u{feff}chumsa,lat,lng\n\
         ชุมสายช้างเผือก,18.8000,98.9800\n\
         ชุมสายช้างเผือก,18.8100,98.9800\n\
         ชุมสายหายยา,18.7700,98.9850\n\
         ชุมสายลำพูน,18.5800,99.0100\n",
    );

    let source = DataSource::Csv(CsvSource::new(file.path()));
    assert_eq!(source.kind(), "csv");
    let rows = source.fetch_rows().await.expect("should read csv");
    assert_eq!(rows.len(), 4);

    let user = Coordinate::new(18.7950, 98.9800).unwrap();
    let sites = find_nearby(user, &rows, &SearchParams::default()).unwrap();

    let names: Vec<&str> = sites.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["ชุมสายช้างเผือก", "ชุมสายหายยา"]);
    assert_eq!(sites[0].point_count, 2);
}

#[tokio::test]
async fn missing_csv_yields_no_rows() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source = DataSource::Csv(CsvSource::new(dir.path().join("absent.csv")));
    assert!(fetch_rows_or_empty(&source).await.is_empty());
}
