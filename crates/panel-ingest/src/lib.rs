//! Reading wave exports and the ID crosswalk, writing the merged output.

pub mod crosswalk;
pub mod error;
pub mod output;
pub mod wave;

pub use crosswalk::read_crosswalk;
pub use error::{IngestError, Result};
pub use output::write_csv;
pub use wave::{WaveReadOptions, clean_header, read_wave_csv, read_wave_csv_with_options};
