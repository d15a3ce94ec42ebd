//! File writers for accepted clusters.

use crate::{Error, Result};
use pixframe_algorithms::EventClusters;
use pixframe_core::cluster::ClusterRecord;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Output layout of a cluster file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One summary row per cluster.
    Csv,
    /// One JSON object per cluster, including the raster.
    JsonLines,
    /// Little-endian fixed-layout records, including the raster.
    Binary,
}

impl OutputFormat {
    /// Picks the format from a file extension (`csv`, `jsonl`/`json`, anything else binary).
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("csv") => OutputFormat::Csv,
            Some("jsonl" | "json") => OutputFormat::JsonLines,
            _ => OutputFormat::Binary,
        }
    }
}

const CSV_HEADER: &str =
    "event,sensor,cluster,x_seed,y_seed,x_size,y_size,quality,signal,noise2,centroid_x,centroid_y";

#[derive(Serialize)]
struct ClusterLine<'a> {
    event: u64,
    #[serde(flatten)]
    record: &'a ClusterRecord,
    centroid: (f64, f64),
}

/// Writer for clustering output.
pub struct ClusterFileWriter {
    writer: BufWriter<File>,
    format: OutputFormat,
    wrote_header: bool,
    clusters_written: usize,
}

impl ClusterFileWriter {
    /// Creates a writer, choosing the format from the file extension.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let format = OutputFormat::from_path(path.as_ref());
        Self::create_with_format(path, format)
    }

    /// Creates a writer with an explicit format.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created.
    pub fn create_with_format<P: AsRef<Path>>(path: P, format: OutputFormat) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            format,
            wrote_header: false,
            clusters_written: 0,
        })
    }

    /// Output format in use.
    #[must_use]
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Clusters written so far.
    #[must_use]
    pub fn clusters_written(&self) -> usize {
        self.clusters_written
    }

    /// Writes every cluster of one event.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_event(&mut self, clusters: &EventClusters) -> Result<()> {
        for record in clusters.iter() {
            match self.format {
                OutputFormat::Csv => self.write_csv(clusters.event_number, record)?,
                OutputFormat::JsonLines => self.write_json(clusters.event_number, record)?,
                OutputFormat::Binary => self.write_binary(clusters.event_number, record)?,
            }
            self.clusters_written += 1;
        }
        Ok(())
    }

    fn write_csv(&mut self, event: u64, c: &ClusterRecord) -> Result<()> {
        if !self.wrote_header {
            writeln!(self.writer, "{CSV_HEADER}")?;
            self.wrote_header = true;
        }
        let (cx, cy) = c.centroid();
        writeln!(
            self.writer,
            "{},{},{},{},{},{},{},{},{},{},{},{}",
            event,
            c.sensor_id,
            c.cluster_id,
            c.seed.x,
            c.seed.y,
            c.x_size,
            c.y_size,
            c.quality.bits(),
            c.signal,
            c.noise_variance,
            cx,
            cy
        )?;
        Ok(())
    }

    fn write_json(&mut self, event: u64, record: &ClusterRecord) -> Result<()> {
        let line = ClusterLine {
            event,
            record,
            centroid: record.centroid(),
        };
        serde_json::to_writer(&mut self.writer, &line)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    /// Format per cluster: u64 (event) + u32 (sensor) + u32 (cluster) + i32 (`x_seed`)
    /// + i32 (`y_seed`) + u16 (`x_size`) + u16 (`y_size`) + u8 (quality) + f64 (signal)
    /// + f64 (noise2) + `x_size * y_size` f64 charges.
    ///
    /// Fields that do not fit their slot fail before anything is written.
    fn write_binary(&mut self, event: u64, c: &ClusterRecord) -> Result<()> {
        let sensor = narrow::<u32>("sensor", c.sensor_id)?;
        let x_size = narrow::<u16>("x_size", c.x_size)?;
        let y_size = narrow::<u16>("y_size", c.y_size)?;

        self.writer.write_all(&event.to_le_bytes())?;
        self.writer.write_all(&sensor.to_le_bytes())?;
        self.writer.write_all(&c.cluster_id.to_le_bytes())?;
        self.writer.write_all(&c.seed.x.to_le_bytes())?;
        self.writer.write_all(&c.seed.y.to_le_bytes())?;
        self.writer.write_all(&x_size.to_le_bytes())?;
        self.writer.write_all(&y_size.to_le_bytes())?;
        self.writer.write_all(&[c.quality.bits()])?;
        self.writer.write_all(&c.signal.to_le_bytes())?;
        self.writer.write_all(&c.noise_variance.to_le_bytes())?;
        for charge in &c.charges {
            self.writer.write_all(&charge.to_le_bytes())?;
        }
        Ok(())
    }

    /// Flushes the writer.
    ///
    /// # Errors
    /// Returns an error if flushing fails.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

fn narrow<T: TryFrom<usize>>(field: &'static str, value: usize) -> Result<T> {
    T::try_from(value).map_err(|_| Error::ValueOutOfRange { field, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixframe_algorithms::SensorClusters;
    use pixframe_core::cluster::ClusterQuality;
    use pixframe_core::geometry::PixelCoord;
    use tempfile::NamedTempFile;

    fn sample_event() -> EventClusters {
        let record = ClusterRecord {
            sensor_id: 2,
            cluster_id: 0,
            seed: PixelCoord::new(5, 6),
            x_size: 1,
            y_size: 3,
            charges: vec![0.0, 20.0, 0.0],
            quality: ClusterQuality::BORDER,
            signal: 20.0,
            noise_variance: 2.0,
        };
        EventClusters {
            event_number: 9,
            sensors: vec![SensorClusters {
                sensor_id: 2,
                clusters: vec![record],
            }],
        }
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(OutputFormat::from_path(Path::new("a.CSV")), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_path(Path::new("a.jsonl")), OutputFormat::JsonLines);
        assert_eq!(OutputFormat::from_path(Path::new("a.bin")), OutputFormat::Binary);
        assert_eq!(OutputFormat::from_path(Path::new("a")), OutputFormat::Binary);
    }

    #[test]
    fn test_write_csv() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = ClusterFileWriter::create_with_format(file.path(), OutputFormat::Csv).unwrap();
        writer.write_event(&sample_event()).unwrap();
        writer.write_event(&sample_event()).unwrap();
        writer.flush().unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines[1], "9,2,0,5,6,1,3,4,20,2,5,6");
        assert_eq!(writer.clusters_written(), 2);
    }

    #[test]
    fn test_write_json_lines() {
        let file = NamedTempFile::new().unwrap();
        let mut writer =
            ClusterFileWriter::create_with_format(file.path(), OutputFormat::JsonLines).unwrap();
        writer.write_event(&sample_event()).unwrap();
        writer.flush().unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(content.trim()).unwrap();
        assert_eq!(value["event"], 9);
        assert_eq!(value["sensor_id"], 2);
        assert_eq!(value["quality"], 4);
        assert_eq!(value["charges"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_write_binary() {
        let file = NamedTempFile::new().unwrap();
        let mut writer =
            ClusterFileWriter::create_with_format(file.path(), OutputFormat::Binary).unwrap();
        writer.write_event(&sample_event()).unwrap();
        writer.flush().unwrap();

        let data = std::fs::read(file.path()).unwrap();
        // 8 + 4 + 4 + 4 + 4 + 2 + 2 + 1 + 8 + 8 = 45 bytes + 3 charges
        assert_eq!(data.len(), 45 + 3 * 8);
        assert_eq!(&data[0..8], &9u64.to_le_bytes());
        assert_eq!(&data[24..26], &1u16.to_le_bytes());
        assert_eq!(&data[26..28], &3u16.to_le_bytes());
        assert_eq!(data[28], 4);
    }

    #[test]
    fn test_binary_rejects_oversized_window() {
        let mut event = sample_event();
        let record = &mut event.sensors[0].clusters[0];
        record.x_size = 70_001;
        record.charges = vec![0.0; 70_001 * 3];

        let file = NamedTempFile::new().unwrap();
        let mut writer =
            ClusterFileWriter::create_with_format(file.path(), OutputFormat::Binary).unwrap();
        let err = writer.write_event(&event).unwrap_err();
        assert!(matches!(
            err,
            Error::ValueOutOfRange {
                field: "x_size",
                value: 70_001
            }
        ));
        writer.flush().unwrap();
        assert_eq!(writer.clusters_written(), 0);
        assert!(std::fs::read(file.path()).unwrap().is_empty());
    }
}
