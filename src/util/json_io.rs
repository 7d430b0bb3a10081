use anyhow::Context;
use std::io::{BufWriter, Write};
use std::fs::File;
use std::path::Path;

/// Saves a generic serializable struct to JSON, gzip compressed if the path ends in `.gz`.
/// # Arguments
/// * `data` - the data in memory
/// * `out_filename` - user provided path to write to
/// # Errors
/// * if opening or writing to the file throw errors
/// * if JSON serialization throws errors
pub fn save_json<T: serde::Serialize>(data: &T, out_filename: &Path) -> anyhow::Result<()> {
    let file: Box<dyn std::io::Write> = if out_filename.extension().unwrap_or_default() == "gz" {
        Box::new(
            flate2::write::GzEncoder::new(
                File::create(out_filename)?,
                flate2::Compression::best()
            )
        )
    } else {
        Box::new(File::create(out_filename)?)
    };
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data)
        .with_context(|| format!("Error while serializing {out_filename:?}:"))?;
    writer.flush()
        .with_context(|| format!("Error while flushing output to {out_filename:?}:"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(serde::Serialize)]
    struct Dummy {
        contig: String,
        distance: usize
    }

    #[test]
    fn test_save_json() {
        let out_dir = std::env::temp_dir().join(format!("vcfdist_json_{}", std::process::id()));
        std::fs::create_dir_all(&out_dir).unwrap();

        let data = Dummy { contig: "chr1".to_string(), distance: 7 };
        let plain = out_dir.join("data.json");
        save_json(&data, &plain).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&plain).unwrap()).unwrap();
        assert_eq!(parsed["contig"], "chr1");
        assert_eq!(parsed["distance"], 7);

        // gzip output should decode to the same content
        let compressed = out_dir.join("data.json.gz");
        save_json(&data, &compressed).unwrap();
        let decoder = flate2::read::MultiGzDecoder::new(File::open(&compressed).unwrap());
        let parsed: serde_json::Value = serde_json::from_reader(decoder).unwrap();
        assert_eq!(parsed["distance"], 7);

        std::fs::remove_dir_all(&out_dir).unwrap();
    }
}
