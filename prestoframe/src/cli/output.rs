use super::OutputFormat;

use arrow::record_batch::RecordBatch;
use prestoframe::{PrestoframeError, PrestoframeErrorKind};
use std::io::Write;
use std::path::PathBuf;


/// Write `batch` to `writer` in the chosen format.
pub fn write_batch<W: Write>(batch: &RecordBatch, format: OutputFormat, mut writer: W) -> Result<(), PrestoframeError> {
    match format {
        OutputFormat::Table => {
            let table = arrow::util::pretty::pretty_format_batches(std::slice::from_ref(batch))?;
            writeln!(writer, "{table}").map_err(stdout_error)?;
        }
        OutputFormat::Csv => {
            let mut csv = arrow::csv::Writer::new(&mut writer);
            csv.write(batch)?;
        }
        OutputFormat::Json => {
            {
                let mut json = arrow::json::ArrayWriter::new(&mut writer);
                json.write(batch)?;
                json.finish()?;
            }
            writeln!(writer).map_err(stdout_error)?;
        }
        OutputFormat::Arrow => {
            let mut ipc = arrow_ipc::writer::StreamWriter::try_new(&mut writer, &batch.schema())?;
            ipc.write(batch)?;
            ipc.finish()?;
        }
    }

    writer.flush().map_err(stdout_error)?;
    Ok(())
}

fn stdout_error(source: std::io::Error) -> PrestoframeError {
    PrestoframeErrorKind::Io { source, path: PathBuf::from("<stdout>") }.into()
}


#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{ArrayRef, Int32Array, StringArray};
    use std::sync::Arc;

    fn batch() -> RecordBatch {
        RecordBatch::try_from_iter(vec![
            ("x", Arc::new(Int32Array::from(vec![1, 2])) as ArrayRef),
            ("y", Arc::new(StringArray::from(vec!["a", "b"])) as ArrayRef),
        ])
        .unwrap()
    }

    fn render(format: OutputFormat) -> Vec<u8> {
        let mut out = Vec::new();
        write_batch(&batch(), format, &mut out).unwrap();
        out
    }

    #[test]
    fn test_table() {
        let text = String::from_utf8(render(OutputFormat::Table)).unwrap();

        assert!(text.contains("| x | y |"), "{text}");
        assert!(text.contains("| 1 | a |"), "{text}");
        assert!(text.contains("| 2 | b |"), "{text}");
    }

    #[test]
    fn test_csv() {
        let text = String::from_utf8(render(OutputFormat::Csv)).unwrap();
        assert_eq!(text, "x,y\n1,a\n2,b\n");
    }

    #[test]
    fn test_json() {
        let text = String::from_utf8(render(OutputFormat::Json)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value, serde_json::json!([{"x": 1, "y": "a"}, {"x": 2, "y": "b"}]));
    }

    #[test]
    fn test_arrow_stream_can_be_read_back() {
        let bytes = render(OutputFormat::Arrow);

        let reader = arrow_ipc::reader::StreamReader::try_new(bytes.as_slice(), None).unwrap();
        let batches: Vec<RecordBatch> = reader.collect::<Result<_, _>>().unwrap();

        assert_eq!(batches, vec![batch()]);
    }
}
