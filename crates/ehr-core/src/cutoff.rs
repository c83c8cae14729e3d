use std::io::Write;

use polars::prelude::{Column, DataFrame, PolarsResult};

use ehr_model::{CUTOFF_COLUMNS, CutoffRecord, LabelValue};

use crate::error::Result;

/// Labelled instances with their cutoff times.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CutoffTable {
    pub records: Vec<CutoffRecord>,
    /// Target rows dropped because no cutoff time could be resolved.
    pub gaps: usize,
}

impl CutoffTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Renders the table as a frame with columns `instance_id`, `cutoff_time`
    /// and `label`.
    ///
    /// The label column is boolean or integer when every label is, and float
    /// otherwise.
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        let [id_name, time_name, label_name] = CUTOFF_COLUMNS;
        let ids: Vec<&str> = self
            .records
            .iter()
            .map(|record| record.instance_id.as_str())
            .collect();
        let times: Vec<String> = self
            .records
            .iter()
            .map(CutoffRecord::cutoff_time_string)
            .collect();
        DataFrame::new(vec![
            Column::new(id_name.into(), ids),
            Column::new(time_name.into(), times),
            self.label_column(label_name),
        ])
    }

    fn label_column(&self, name: &str) -> Column {
        let labels: Vec<LabelValue> = self.records.iter().map(|record| record.label).collect();
        let bools: Option<Vec<bool>> = labels
            .iter()
            .map(|label| match label {
                LabelValue::Bool(value) => Some(*value),
                _ => None,
            })
            .collect();
        if let Some(values) = bools {
            return Column::new(name.into(), values);
        }
        let ints: Option<Vec<i64>> = labels
            .iter()
            .map(|label| match label {
                LabelValue::Int(value) => Some(*value),
                _ => None,
            })
            .collect();
        if let Some(values) = ints {
            return Column::new(name.into(), values);
        }
        let floats: Vec<f64> = labels.into_iter().map(LabelValue::as_f64).collect();
        Column::new(name.into(), floats)
    }

    /// Writes the table as CSV with a header row.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(CUTOFF_COLUMNS)?;
        for record in &self.records {
            csv.write_record([
                record.instance_id.clone(),
                record.cutoff_time_string(),
                record.label.to_string(),
            ])?;
        }
        csv.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}
