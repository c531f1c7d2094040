use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use crate::domain::optical_model::reservation::wavelength_path_store::{WavelengthPathEvent, WavelengthPathListener};
use crate::error::Result;

const HEADERS: [&str; 8] = ["Time", "Event", "PathId", "GroupId", "FrequencyId", "Ingress", "Egress", "Submitted"];

/// Appends every wavelength-path store event to a semicolon separated CSV file.
pub struct EventJournal {
    writer: Mutex<csv::Writer<Box<dyn Write + Send>>>,
}

impl EventJournal {
    /// Opens `path` for appending. A new or empty file gets the header row first.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let needs_header = file.metadata()?.len() == 0;

        let journal = Self::from_writer(Box::new(file));
        if needs_header {
            journal.write_row(&HEADERS.map(String::from))?;
        }
        log::info!("Wavelength path events are journaled to {}", path.display());
        Ok(journal)
    }

    fn from_writer(writer: Box<dyn Write + Send>) -> Self {
        let writer = csv::WriterBuilder::new().delimiter(b';').has_headers(false).from_writer(writer);
        Self { writer: Mutex::new(writer) }
    }

    fn write_row(&self, row: &[String]) -> Result<()> {
        let mut writer = self.writer.lock().expect("Mutex poisoned");
        writer.write_record(row)?;
        writer.flush()?;
        Ok(())
    }

    fn row(event: &WavelengthPathEvent) -> Vec<String> {
        let path = event.path();
        vec![
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
            event.name().to_string(),
            path.id.to_string(),
            path.group_id.to_string(),
            path.frequency_id.to_string(),
            path.src_och().to_string(),
            path.dst_och().to_string(),
            path.submitted.to_string(),
        ]
    }
}

impl WavelengthPathListener for EventJournal {
    fn on_wavelength_path_event(&self, event: &WavelengthPathEvent) {
        if let Err(e) = self.write_row(&Self::row(event)) {
            log::error!("Journal Error: Failed to write record: {}", e);
        }
    }
}
