use std::{
    error::Error,
    fmt::Display,
    io::{BufRead, Read},
};

use anyhow::{Context, Result};
use log::info;
use serde::Deserialize;
use serde_json::Value;

use crate::linalg::Matrix;

/// Number of numeric fields in an iris record.
pub const IRIS_FEATURES: usize = 4;

/// Feature rows and a parallel label per row.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledData {
    pub features: Matrix,
    /// `1` for the positive category, `0` otherwise.
    pub labels: Vec<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IrisRecord {
    sepal_length: f64,
    sepal_width: f64,
    petal_length: f64,
    petal_width: f64,
    species: String,
}

fn label_for(category: &str, positive_label: &str) -> i32 {
    if category == positive_label { 1 } else { 0 }
}

/// Read the first `samples` records of a JSON array of iris objects.
///
/// `features` counts numeric columns only and must equal [`IRIS_FEATURES`].
pub fn from_json<R: Read>(
    reader: R,
    samples: usize,
    features: usize,
    positive_label: &str,
) -> Result<LabeledData> {
    let context = "Parsing JSON dataset";

    if features != IRIS_FEATURES {
        return Err(DatasetError::FeatureCount {
            requested: features,
            available: IRIS_FEATURES,
        }).context(context);
    }
    if samples == 0 {
        return Err(DatasetError::NoData).context(context);
    }

    // only the first `samples` entries have to be well-formed records
    let records: Vec<Value> = serde_json::from_reader(reader).context(context)?;
    if records.len() < samples {
        return Err(DatasetError::NotEnoughRecords {
            expected: samples,
            found: records.len(),
        }).context(context);
    }

    let mut elements = Vec::with_capacity(samples * features);
    let mut labels = Vec::with_capacity(samples);
    for (i, value) in records.into_iter().take(samples).enumerate() {
        let record: IrisRecord = serde_json::from_value(value)
            .with_context(|| format!("Invalid record {}", i))
            .context(context)?;
        elements.extend_from_slice(&[
            record.sepal_length,
            record.sepal_width,
            record.petal_length,
            record.petal_width,
        ]);
        labels.push(label_for(&record.species, positive_label));
    }

    let features = Matrix::new(elements, samples, features).context(context)?;
    info!("imported {} samples from JSON", samples);
    Ok(LabeledData { features, labels })
}

/// Read the first `samples` rows of a delimited table whose last column is
/// the label and whose other `features` columns are numeric.
pub fn from_csv<R: BufRead>(
    reader: R,
    delimiter: &str,
    samples: usize,
    features: usize,
    positive_label: &str,
) -> Result<LabeledData> {
    let context = "Parsing CSV dataset";

    if samples == 0 {
        return Err(DatasetError::NoData).context(context);
    }

    let mut lines = reader.lines();
    let mut line_num = 0;
    let mut headers = String::from("#");
    while headers.starts_with('#') {
        line_num += 1;
        headers = match lines.next() {
            Some(l) => l.context(context)?,
            None => return Err(DatasetError::EmptyFile).context(context),
        };
    }
    let width = headers.split(delimiter).count();
    if width != features + 1 {
        return Err(DatasetError::FeatureCount {
            requested: features,
            available: width.saturating_sub(1),
        }).context(context);
    }

    // `samples` is caller supplied, so buffers grow with the rows actually read
    let mut elements = Vec::new();
    let mut labels = Vec::new();
    for line in lines {
        if labels.len() == samples {
            break;
        }
        line_num += 1;
        let line = line.context(context)?;
        if line.trim().is_empty() {
            continue;
        }
        let entries: Vec<&str> = line.split(delimiter).map(|e| e.trim()).collect();
        if entries.len() != width {
            return Err(DatasetError::LineSizeConflict(line_num)).context(context);
        }
        for (i, entry) in entries[..features].iter().enumerate() {
            let value: f64 = entry
                .parse()
                .context(format!(
                    "Failed to parse numeric on line {}, col {}",
                    line_num, i,
                ))
                .context(context)?;
            elements.push(value);
        }
        labels.push(label_for(entries[features], positive_label));
    }

    if labels.len() < samples {
        return Err(DatasetError::NotEnoughRecords {
            expected: samples,
            found: labels.len(),
        }).context(context);
    }

    let features = Matrix::new(elements, samples, features).context(context)?;
    info!("imported {} samples from CSV", samples);
    Ok(LabeledData { features, labels })
}

#[derive(Debug, Clone, PartialEq)]
pub enum DatasetError {
    EmptyFile,
    NoData,
    LineSizeConflict(usize),
    NotEnoughRecords { expected: usize, found: usize },
    FeatureCount { requested: usize, available: usize },
}

impl Display for DatasetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetError::EmptyFile => write!(f, "file is empty"),
            DatasetError::NoData => write!(f, "no samples requested"),
            DatasetError::LineSizeConflict(line) => {
                write!(f, "line {} does not match the header width", line)
            }
            DatasetError::NotEnoughRecords { expected, found } => {
                write!(f, "expected {} records but found {}", expected, found)
            }
            DatasetError::FeatureCount { requested, available } => write!(
                f,
                "requested {} features but the dataset provides {}",
                requested, available,
            ),
        }
    }
}

impl Error for DatasetError {}

#[cfg(test)]
mod tests {
    use super::*;

    const IRIS_JSON: &str = r#"[
        {"sepalLength": 5.1, "sepalWidth": 3.5, "petalLength": 1.4, "petalWidth": 0.2, "species": "setosa"},
        {"sepalLength": 7.0, "sepalWidth": 3.2, "petalLength": 4.7, "petalWidth": 1.4, "species": "versicolor"},
        {"sepalLength": 6.3, "sepalWidth": 3.3, "petalLength": 6.0, "petalWidth": 2.5, "species": "virginica"}
    ]"#;

    const IRIS_CSV: &str = "# iris excerpt
sepal_length,sepal_width,petal_length,petal_width,species
5.1,3.5,1.4,0.2,setosa
7.0,3.2,4.7,1.4,versicolor

6.3,3.3,6.0,2.5,virginica
";

    fn dataset_error(result: Result<LabeledData>) -> Option<DatasetError> {
        result.err().map(|e| e.downcast().unwrap())
    }

    #[test]
    fn test_from_json() {
        let data = from_json(IRIS_JSON.as_bytes(), 2, 4, "setosa").unwrap();

        let expected = Matrix::new(vec![
            5.1, 3.5, 1.4, 0.2,
            7.0, 3.2, 4.7, 1.4,
        ], 2, 4).unwrap();
        assert_eq!(data.features, expected);
        assert_eq!(data.labels, vec![1, 0]);
    }

    #[test]
    fn test_from_json_other_positive_label() {
        let data = from_json(IRIS_JSON.as_bytes(), 3, 4, "virginica").unwrap();

        assert_eq!(data.labels, vec![0, 0, 1]);
    }

    #[test]
    fn test_from_json_not_enough_records() {
        let err = dataset_error(from_json(IRIS_JSON.as_bytes(), 4, 4, "setosa"));

        assert_eq!(err, Some(DatasetError::NotEnoughRecords { expected: 4, found: 3 }));
    }

    #[test]
    fn test_from_json_wrong_feature_count() {
        let err = dataset_error(from_json(IRIS_JSON.as_bytes(), 2, 3, "setosa"));

        assert_eq!(err, Some(DatasetError::FeatureCount { requested: 3, available: 4 }));
    }

    #[test]
    fn test_from_json_malformed() {
        let result = from_json(r#"[{"sepalLength": 1.0}]"#.as_bytes(), 1, 4, "setosa");

        let err = result.err().unwrap();
        assert!(err.downcast_ref::<serde_json::Error>().is_some());
    }

    #[test]
    fn test_from_json_ignores_records_past_samples() {
        let json = r#"[
            {"sepalLength": 5.1, "sepalWidth": 3.5, "petalLength": 1.4, "petalWidth": 0.2, "species": "setosa"},
            {"sepalLength": 7.0}
        ]"#;

        let data = from_json(json.as_bytes(), 1, 4, "setosa").unwrap();

        assert_eq!(data.features, Matrix::new(vec![5.1, 3.5, 1.4, 0.2], 1, 4).unwrap());
        assert_eq!(data.labels, vec![1]);
    }

    #[test]
    fn test_from_json_huge_sample_count() {
        let err = dataset_error(from_json(IRIS_JSON.as_bytes(), usize::MAX / 16, 4, "setosa"));

        assert_eq!(err, Some(DatasetError::NotEnoughRecords {
            expected: usize::MAX / 16,
            found: 3,
        }));
    }

    #[test]
    fn test_from_csv() {
        let data = from_csv(IRIS_CSV.as_bytes(), ",", 3, 4, "setosa").unwrap();

        let expected = Matrix::new(vec![
            5.1, 3.5, 1.4, 0.2,
            7.0, 3.2, 4.7, 1.4,
            6.3, 3.3, 6.0, 2.5,
        ], 3, 4).unwrap();
        assert_eq!(data.features, expected);
        assert_eq!(data.labels, vec![1, 0, 0]);
    }

    #[test]
    fn test_from_csv_stops_after_samples() {
        let data = from_csv(IRIS_CSV.as_bytes(), ",", 1, 4, "setosa").unwrap();

        assert_eq!(data.features.shape(), (1, 4));
        assert_eq!(data.labels, vec![1]);
    }

    #[test]
    fn test_from_csv_line_size_conflict() {
        let csv = "a,b,label\n1.0,2.0,x\n3.0,y\n";

        let err = dataset_error(from_csv(csv.as_bytes(), ",", 2, 2, "x"));

        assert_eq!(err, Some(DatasetError::LineSizeConflict(3)));
    }

    #[test]
    fn test_from_csv_bad_numeric() {
        let csv = "a,b,label\n1.0,oops,x\n";

        let result = from_csv(csv.as_bytes(), ",", 1, 2, "x");

        let message = format!("{:#}", result.err().unwrap());
        assert!(message.contains("Failed to parse numeric on line 2, col 1"));
    }

    #[test]
    fn test_from_csv_huge_sample_count() {
        let csv = "a,b,label\n1.0,2.0,x\n";

        let err = dataset_error(from_csv(csv.as_bytes(), ",", usize::MAX / 16, 2, "x"));

        assert_eq!(err, Some(DatasetError::NotEnoughRecords {
            expected: usize::MAX / 16,
            found: 1,
        }));
    }

    #[test]
    fn test_from_csv_line_numbers_count_comments() {
        let csv = "# comment\na,b,label\n1.0,oops,x\n";

        let result = from_csv(csv.as_bytes(), ",", 1, 2, "x");

        let message = format!("{:#}", result.err().unwrap());
        assert!(message.contains("Failed to parse numeric on line 3, col 1"));
    }

    #[test]
    fn test_from_csv_empty() {
        let err = dataset_error(from_csv("# only a comment\n".as_bytes(), ",", 1, 2, "x"));

        assert_eq!(err, Some(DatasetError::EmptyFile));
    }

    #[test]
    fn test_from_csv_header_width() {
        let err = dataset_error(from_csv(IRIS_CSV.as_bytes(), ",", 1, 3, "setosa"));

        assert_eq!(err, Some(DatasetError::FeatureCount { requested: 3, available: 4 }));
    }

    #[test]
    fn test_from_csv_semicolon() {
        let csv = "a;b;label\n1.5;2.5;yes\n";

        let data = from_csv(csv.as_bytes(), ";", 1, 2, "yes").unwrap();

        assert_eq!(data.features, Matrix::new(vec![1.5, 2.5], 1, 2).unwrap());
        assert_eq!(data.labels, vec![1]);
    }
}
