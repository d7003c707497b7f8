use log::LevelFilter;
use simplelog::{ConfigBuilder, WriteLogger};
use std::{fs::File, io, path::Path};

/// routes the `log` facade into `path`, truncating it
///
/// an inspector drawing to the terminal cannot share stderr with its own
/// diagnostics, so they go to a file. Fails if a logger is already installed.
pub fn init_file_logger(path: &Path, level: LevelFilter) -> io::Result<()> {
    let file = File::create(path)?;
    let config = ConfigBuilder::new()
        .set_thread_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .build();
    WriteLogger::init(level, config, file).map_err(io::Error::other)
}
